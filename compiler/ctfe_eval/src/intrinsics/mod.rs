//! Intrinsic functions.
//!
//! An intrinsic is a prelude declaration the interpreter implements
//! directly: IR operators (`EQEQ`, `CHECK_NOT_NULL`), array and enum
//! helpers, unsigned value classes and a few library functions. They are
//! resolved by fully qualified name, by origin or by owner, and evaluated
//! in the callee's frame by [`IrInterpreter::run_intrinsic`](crate::IrInterpreter).

mod eval;
pub mod text;

use ctfe_ir::{FunctionId, FunctionOrigin, FunctionOwner, IrModule, PrimitiveType, TypeKind};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Intrinsic {
    // IR operators
    Equals,
    Identical,
    Ieee754Equals,
    CheckNotNull,
    ThrowClassCast,
    ThrowNullPointer,
    NoWhenBranchMatched,
    UnsafeCast,

    // Arrays
    EmptyArray,
    ArrayOf,
    ArrayOfNulls,
    /// `Array(size)`, `IntArray(size)`, `Array(size) { init }`.
    ArrayConstructor,

    // Enums
    EnumValues,
    EnumValueOf,
    EnumCompareTo,
    EnumEquals,
    EnumHashCode,
    EnumToString,

    // Platform constructors
    LongFromParts,
    CharFromCode,

    // Library
    SourceLocation,
    Assert,
    DataClassArrayToString,
    DataClassArrayHashCode,
    TrimIndent,
    TrimMargin,

    // Unsigned value classes
    UnsignedConstructor,
    UnsignedToString,
    UnsignedToSigned,

    // Root members
    AnyToString,
    AnyEquals,
    AnyHashCode,
    ThrowableToString,
}

impl Intrinsic {
    pub fn name(self) -> &'static str {
        match self {
            Intrinsic::Equals => "EQEQ",
            Intrinsic::Identical => "EQEQEQ",
            Intrinsic::Ieee754Equals => "ieee754equals",
            Intrinsic::CheckNotNull => "CHECK_NOT_NULL",
            Intrinsic::ThrowClassCast => "THROW_CCE",
            Intrinsic::ThrowNullPointer => "THROW_NPE",
            Intrinsic::NoWhenBranchMatched => "noWhenBranchMatchedException",
            Intrinsic::UnsafeCast => "unsafeCast",
            Intrinsic::EmptyArray => "emptyArray",
            Intrinsic::ArrayOf => "arrayOf",
            Intrinsic::ArrayOfNulls => "arrayOfNulls",
            Intrinsic::ArrayConstructor => "Array.<init>",
            Intrinsic::EnumValues => "enumValues",
            Intrinsic::EnumValueOf => "enumValueOf",
            Intrinsic::EnumCompareTo => "Enum.compareTo",
            Intrinsic::EnumEquals => "Enum.equals",
            Intrinsic::EnumHashCode => "Enum.hashCode",
            Intrinsic::EnumToString => "Enum.toString",
            Intrinsic::LongFromParts => "Long.<init>",
            Intrinsic::CharFromCode => "Char.<init>",
            Intrinsic::SourceLocation => "sourceLocation",
            Intrinsic::Assert => "assert",
            Intrinsic::DataClassArrayToString => "dataClassArrayMemberToString",
            Intrinsic::DataClassArrayHashCode => "dataClassArrayMemberHashCode",
            Intrinsic::TrimIndent => "trimIndent",
            Intrinsic::TrimMargin => "trimMargin",
            Intrinsic::UnsignedConstructor => "unsigned.<init>",
            Intrinsic::UnsignedToString => "unsigned.toString",
            Intrinsic::UnsignedToSigned => "unsigned.toSigned",
            Intrinsic::AnyToString => "Any.toString",
            Intrinsic::AnyEquals => "Any.equals",
            Intrinsic::AnyHashCode => "Any.hashCode",
            Intrinsic::ThrowableToString => "Throwable.toString",
        }
    }
}

/// `kotlin.intArrayOf`, `kotlin.charArrayOf`, ...
fn is_primitive_array_factory(fq_name: &str) -> bool {
    let Some(name) = fq_name
        .strip_prefix("kotlin.")
        .and_then(|name| name.strip_suffix("Of"))
    else {
        return false;
    };
    PrimitiveType::ALL.iter().any(|p| {
        let array = p.array_name();
        let mut expected = array.chars();
        let mut actual = name.chars();
        let first = matches!(
            (actual.next(), expected.next()),
            (Some(a), Some(e)) if a == e.to_ascii_lowercase()
        );
        first && actual.eq(expected)
    })
}

/// The intrinsic implementing `function`, if any.
pub fn resolve(module: &IrModule, function: FunctionId) -> Option<Intrinsic> {
    let f = module.function(function);
    let name = module.name(f.name);

    if f.origin == FunctionOrigin::EnumSpecialMember {
        return match name {
            "values" => Some(Intrinsic::EnumValues),
            "valueOf" => Some(Intrinsic::EnumValueOf),
            _ => None,
        };
    }

    if let Some(class) = f.owner_class() {
        if module.prelude().unsigned_class(class).is_some() {
            return match name {
                _ if f.is_constructor() => Some(Intrinsic::UnsignedConstructor),
                "toString" => Some(Intrinsic::UnsignedToString),
                "toInt" | "toLong" => Some(Intrinsic::UnsignedToSigned),
                _ => None,
            };
        }
    }

    if let FunctionOwner::Builtin(ty) = f.owner {
        if f.is_constructor() {
            return match module.types.kind(ty) {
                TypeKind::Array(_) | TypeKind::PrimitiveArray(_) => Some(Intrinsic::ArrayConstructor),
                TypeKind::Primitive(PrimitiveType::Long) => Some(Intrinsic::LongFromParts),
                TypeKind::Primitive(PrimitiveType::Char) => Some(Intrinsic::CharFromCode),
                _ => None,
            };
        }
    }

    let fq_name = module.name(f.fq_name);
    let intrinsic = match fq_name {
        "kotlin.internal.ir.EQEQ" => Intrinsic::Equals,
        "kotlin.internal.ir.EQEQEQ" => Intrinsic::Identical,
        "kotlin.internal.ir.ieee754equals" => Intrinsic::Ieee754Equals,
        "kotlin.internal.ir.CHECK_NOT_NULL" => Intrinsic::CheckNotNull,
        "kotlin.internal.ir.THROW_CCE" => Intrinsic::ThrowClassCast,
        "kotlin.internal.ir.THROW_NPE" => Intrinsic::ThrowNullPointer,
        "kotlin.internal.ir.noWhenBranchMatchedException" => Intrinsic::NoWhenBranchMatched,
        "kotlin.internal.ir.dataClassArrayMemberToString" => Intrinsic::DataClassArrayToString,
        "kotlin.internal.ir.dataClassArrayMemberHashCode" => Intrinsic::DataClassArrayHashCode,
        "kotlin.js.unsafeCast" => Intrinsic::UnsafeCast,
        "kotlin.emptyArray" => Intrinsic::EmptyArray,
        "kotlin.arrayOf" => Intrinsic::ArrayOf,
        "kotlin.arrayOfNulls" => Intrinsic::ArrayOfNulls,
        "kotlin.enumValues" => Intrinsic::EnumValues,
        "kotlin.enumValueOf" => Intrinsic::EnumValueOf,
        "kotlin.Enum.compareTo" => Intrinsic::EnumCompareTo,
        "kotlin.Enum.equals" => Intrinsic::EnumEquals,
        "kotlin.Enum.hashCode" => Intrinsic::EnumHashCode,
        "kotlin.Enum.toString" => Intrinsic::EnumToString,
        "kotlin.experimental.sourceLocation" => Intrinsic::SourceLocation,
        "kotlin.assert" => Intrinsic::Assert,
        "kotlin.text.trimIndent" => Intrinsic::TrimIndent,
        "kotlin.text.trimMargin" => Intrinsic::TrimMargin,
        "kotlin.Any.toString" => Intrinsic::AnyToString,
        "kotlin.Any.equals" => Intrinsic::AnyEquals,
        "kotlin.Any.hashCode" => Intrinsic::AnyHashCode,
        "kotlin.Throwable.toString" => Intrinsic::ThrowableToString,
        fq if is_primitive_array_factory(fq) => Intrinsic::ArrayOf,
        _ => return None,
    };
    Some(intrinsic)
}
