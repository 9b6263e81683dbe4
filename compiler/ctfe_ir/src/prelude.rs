//! Builtin declarations every module starts with.
//!
//! The prelude is declared through the ordinary builder API. Bodiless
//! declarations are served by the evaluator: native-bridged classes and
//! `NATIVE_ONLY` functions by the host library, the `kotlin.internal.ir`
//! family and array or enum helpers by intrinsics, and a few library
//! functions through reference bodies.

use crate::{
    ClassFlags, ClassId, ClassKind, FieldId, FunctionFlags, FunctionId, FunctionOrigin,
    ModuleBuilder, PrimitiveType, TypeId,
};

/// Unsigned value class and the signed field that stores its bits.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct UnsignedClass {
    pub class: ClassId,
    pub data: FieldId,
    pub underlying: Option<PrimitiveType>,
}

/// Ids of prelude declarations the evaluator refers to directly.
#[derive(Copy, Clone, Debug, Default)]
pub struct Prelude {
    pub any: ClassId,
    pub any_constructor: FunctionId,
    pub any_to_string: FunctionId,
    pub any_equals: FunctionId,
    pub any_hash_code: FunctionId,

    pub throwable: ClassId,
    pub throwable_message: FieldId,
    pub throwable_cause: FieldId,
    pub throwable_to_string: FunctionId,
    pub exception: ClassId,
    pub runtime_exception: ClassId,
    pub error: ClassId,
    pub arithmetic_exception: ClassId,
    pub illegal_argument_exception: ClassId,
    pub illegal_state_exception: ClassId,
    pub null_pointer_exception: ClassId,
    pub class_cast_exception: ClassId,
    pub index_out_of_bounds_exception: ClassId,
    pub no_such_element_exception: ClassId,
    pub number_format_exception: ClassId,
    pub unsupported_operation_exception: ClassId,
    pub no_when_branch_matched_exception: ClassId,
    pub assertion_error: ClassId,
    pub not_implemented_error: ClassId,

    pub enum_class: ClassId,
    pub enum_name: FieldId,
    pub enum_ordinal: FieldId,
    pub enum_constructor: FunctionId,

    pub int_range: ClassId,
    pub long_range: ClassId,
    pub char_range: ClassId,

    pub unsigned: [UnsignedClass; 4],

    pub string_builder: ClassId,
    pub array_list: ClassId,
}

impl Prelude {
    pub fn unsigned_class(&self, class: ClassId) -> Option<UnsignedClass> {
        self.unsigned.iter().copied().find(|u| u.class == class)
    }

    /// Range class produced by `rangeTo` on a receiver of type `ty`.
    pub fn range_class(&self, ty: TypeId) -> Option<ClassId> {
        match ty {
            TypeId::BYTE | TypeId::SHORT | TypeId::INT => Some(self.int_range),
            TypeId::LONG => Some(self.long_range),
            TypeId::CHAR => Some(self.char_range),
            _ => None,
        }
    }
}

pub(crate) fn install(b: &mut ModuleBuilder) -> Prelude {
    let mut p = Prelude::default();
    install_any(b, &mut p);
    // Later declarations delegate to `Any.<init>`.
    b.module_mut().prelude = p;
    install_throwables(b, &mut p);
    install_enum(b, &mut p);
    install_ranges(b, &mut p);
    install_unsigned(b, &mut p);
    install_library_classes(b, &mut p);
    install_intrinsics(b);
    install_function_types(b);
    install_natives(b, &p);
    install_reference_bodies(b, &p);
    p
}

fn install_any(b: &mut ModuleBuilder, p: &mut Prelude) {
    p.any = b.class("kotlin.Any", ClassKind::Class, None);
    p.any_constructor = b.constructor(p.any, &[]);
    p.any_to_string = b.method(p.any, "toString", &[], TypeId::STRING);
    p.any_equals = b.method(p.any, "equals", &[("other", TypeId::NULLABLE_ANY)], TypeId::BOOLEAN);
    p.any_hash_code = b.method(p.any, "hashCode", &[], TypeId::INT);
    for f in [p.any_constructor, p.any_to_string, p.any_equals, p.any_hash_code] {
        b.set_origin(f, FunctionOrigin::Builtin);
    }
}

fn throwable_class(b: &mut ModuleBuilder, fq_name: &str, parent: ClassId, throwable_ty: TypeId) -> ClassId {
    let class = b.class(fq_name, ClassKind::Class, Some(parent));
    b.add_class_flags(class, ClassFlags::NATIVE_BRIDGED);
    let nullable_throwable = b.nullable(throwable_ty);
    b.constructor(class, &[]);
    b.constructor(class, &[("message", TypeId::NULLABLE_STRING)]);
    b.constructor(
        class,
        &[("message", TypeId::NULLABLE_STRING), ("cause", nullable_throwable)],
    );
    b.constructor(class, &[("cause", nullable_throwable)]);
    class
}

fn install_throwables(b: &mut ModuleBuilder, p: &mut Prelude) {
    let throwable = b.class("kotlin.Throwable", ClassKind::Class, Some(p.any));
    let throwable_ty = b.module().class(throwable).ty;
    let nullable_throwable = b.nullable(throwable_ty);
    b.add_class_flags(throwable, ClassFlags::NATIVE_BRIDGED);
    p.throwable = throwable;
    let (message, _) = b.property(throwable, "message", TypeId::NULLABLE_STRING, None);
    let (cause, _) = b.property(throwable, "cause", nullable_throwable, None);
    p.throwable_message = message;
    p.throwable_cause = cause;
    p.throwable_to_string = b.method(throwable, "toString", &[], TypeId::STRING);
    b.set_overrides(p.throwable_to_string, p.any_to_string);
    b.constructor(throwable, &[]);
    b.constructor(throwable, &[("message", TypeId::NULLABLE_STRING)]);
    b.constructor(
        throwable,
        &[("message", TypeId::NULLABLE_STRING), ("cause", nullable_throwable)],
    );
    b.constructor(throwable, &[("cause", nullable_throwable)]);

    p.exception = throwable_class(b, "kotlin.Exception", throwable, throwable_ty);
    p.error = throwable_class(b, "kotlin.Error", throwable, throwable_ty);
    p.runtime_exception = throwable_class(b, "kotlin.RuntimeException", p.exception, throwable_ty);
    let runtime = p.runtime_exception;
    p.arithmetic_exception = throwable_class(b, "kotlin.ArithmeticException", runtime, throwable_ty);
    p.illegal_argument_exception =
        throwable_class(b, "kotlin.IllegalArgumentException", runtime, throwable_ty);
    p.illegal_state_exception =
        throwable_class(b, "kotlin.IllegalStateException", runtime, throwable_ty);
    p.null_pointer_exception =
        throwable_class(b, "kotlin.NullPointerException", runtime, throwable_ty);
    p.class_cast_exception = throwable_class(b, "kotlin.ClassCastException", runtime, throwable_ty);
    p.index_out_of_bounds_exception =
        throwable_class(b, "kotlin.IndexOutOfBoundsException", runtime, throwable_ty);
    p.no_such_element_exception =
        throwable_class(b, "kotlin.NoSuchElementException", runtime, throwable_ty);
    p.number_format_exception = throwable_class(
        b,
        "kotlin.NumberFormatException",
        p.illegal_argument_exception,
        throwable_ty,
    );
    p.unsupported_operation_exception =
        throwable_class(b, "kotlin.UnsupportedOperationException", runtime, throwable_ty);
    p.no_when_branch_matched_exception =
        throwable_class(b, "kotlin.NoWhenBranchMatchedException", runtime, throwable_ty);
    p.assertion_error = throwable_class(b, "kotlin.AssertionError", p.error, throwable_ty);
    p.not_implemented_error = throwable_class(b, "kotlin.NotImplementedError", p.error, throwable_ty);
}

fn install_enum(b: &mut ModuleBuilder, p: &mut Prelude) {
    let class = b.class("kotlin.Enum", ClassKind::Class, Some(p.any));
    b.add_class_flags(class, ClassFlags::ABSTRACT);
    p.enum_class = class;
    let (name, _) = b.property(class, "name", TypeId::STRING, None);
    let (ordinal, _) = b.property(class, "ordinal", TypeId::INT, None);
    p.enum_name = name;
    p.enum_ordinal = ordinal;
    p.enum_constructor = b.constructor(class, &[]);
    let enum_ty = b.module().class(class).ty;
    b.method(class, "compareTo", &[("other", enum_ty)], TypeId::INT);
    let equals = b.method(class, "equals", &[("other", TypeId::NULLABLE_ANY)], TypeId::BOOLEAN);
    b.set_overrides(equals, p.any_equals);
    let hash_code = b.method(class, "hashCode", &[], TypeId::INT);
    b.set_overrides(hash_code, p.any_hash_code);
    let to_string = b.method(class, "toString", &[], TypeId::STRING);
    b.set_overrides(to_string, p.any_to_string);
}

/// `class XRange(start: T, endInclusive: T)` with an interpretable body.
fn range_class(b: &mut ModuleBuilder, fq_name: &str, element: TypeId, any_ctor: FunctionId) -> ClassId {
    let class = b.class(fq_name, ClassKind::Class, None);
    b.add_class_flags(class, ClassFlags::COMPILE_TIME);
    let (first, _) = b.property(class, "first", element, None);
    let (last, _) = b.property(class, "last", element, None);
    let ctor = b.constructor(class, &[("start", element), ("endInclusive", element)]);
    let this = b.this_of(ctor);
    let delegation = b.delegate(any_ctor, Vec::new());
    let this_read = b.get(this);
    let start = b.get(b.param(ctor, 0));
    let set_first = b.set_field(first, Some(this_read), start);
    let this_read = b.get(this);
    let end = b.get(b.param(ctor, 1));
    let set_last = b.set_field(last, Some(this_read), end);
    let body = b.block(vec![delegation, set_first, set_last]);
    b.set_body(ctor, body);
    class
}

fn install_ranges(b: &mut ModuleBuilder, p: &mut Prelude) {
    p.int_range = range_class(b, "kotlin.ranges.IntRange", TypeId::INT, p.any_constructor);
    p.long_range = range_class(b, "kotlin.ranges.LongRange", TypeId::LONG, p.any_constructor);
    p.char_range = range_class(b, "kotlin.ranges.CharRange", TypeId::CHAR, p.any_constructor);
    for class in [p.int_range, p.long_range, p.char_range] {
        b.module_mut().class_mut(class).superclass = Some(p.any);
    }
}

fn install_unsigned(b: &mut ModuleBuilder, p: &mut Prelude) {
    let kinds = [
        ("kotlin.UByte", PrimitiveType::Byte),
        ("kotlin.UShort", PrimitiveType::Short),
        ("kotlin.UInt", PrimitiveType::Int),
        ("kotlin.ULong", PrimitiveType::Long),
    ];
    for (slot, (fq_name, underlying)) in p.unsigned.iter_mut().zip(kinds) {
        let class = b.class(fq_name, ClassKind::Class, Some(p.any));
        b.add_class_flags(class, ClassFlags::VALUE_CLASS | ClassFlags::COMPILE_TIME);
        let (data, _) = b.property(class, "data", underlying.type_id(), None);
        b.constructor(class, &[("data", underlying.type_id())]);
        let to_string = b.method(class, "toString", &[], TypeId::STRING);
        b.set_overrides(to_string, p.any_to_string);
        let to_signed = if underlying == PrimitiveType::Long { "toLong" } else { "toInt" };
        let signed_ty = if underlying == PrimitiveType::Long { TypeId::LONG } else { TypeId::INT };
        b.method(class, to_signed, &[], signed_ty);
        *slot = UnsignedClass {
            class,
            data,
            underlying: Some(underlying),
        };
    }
}

fn install_library_classes(b: &mut ModuleBuilder, p: &mut Prelude) {
    let sb = b.class("kotlin.text.StringBuilder", ClassKind::Class, Some(p.any));
    b.add_class_flags(sb, ClassFlags::NATIVE_BRIDGED);
    let sb_ty = b.module().class(sb).ty;
    b.constructor(sb, &[]);
    b.constructor(sb, &[("content", TypeId::STRING)]);
    for ty in [
        TypeId::NULLABLE_STRING,
        TypeId::NULLABLE_ANY,
        TypeId::CHAR,
        TypeId::INT,
        TypeId::LONG,
        TypeId::BOOLEAN,
        TypeId::DOUBLE,
    ] {
        b.method(sb, "append", &[("value", ty)], sb_ty);
    }
    let to_string = b.method(sb, "toString", &[], TypeId::STRING);
    b.set_overrides(to_string, p.any_to_string);
    b.method(sb, "<get-length>", &[], TypeId::INT);
    b.method(sb, "reverse", &[], sb_ty);
    b.method(sb, "clear", &[], sb_ty);
    p.string_builder = sb;

    let list = b.class("kotlin.collections.ArrayList", ClassKind::Class, Some(p.any));
    b.add_class_flags(list, ClassFlags::NATIVE_BRIDGED);
    b.constructor(list, &[]);
    b.method(list, "add", &[("element", TypeId::NULLABLE_ANY)], TypeId::BOOLEAN);
    b.method(list, "get", &[("index", TypeId::INT)], TypeId::NULLABLE_ANY);
    b.method(
        list,
        "set",
        &[("index", TypeId::INT), ("element", TypeId::NULLABLE_ANY)],
        TypeId::NULLABLE_ANY,
    );
    b.method(list, "removeAt", &[("index", TypeId::INT)], TypeId::NULLABLE_ANY);
    b.method(list, "<get-size>", &[], TypeId::INT);
    b.method(list, "isEmpty", &[], TypeId::BOOLEAN);
    b.method(list, "contains", &[("element", TypeId::NULLABLE_ANY)], TypeId::BOOLEAN);
    b.method(list, "indexOf", &[("element", TypeId::NULLABLE_ANY)], TypeId::INT);
    b.method(list, "clear", &[], TypeId::UNIT);
    let to_string = b.method(list, "toString", &[], TypeId::STRING);
    b.set_overrides(to_string, p.any_to_string);
    p.array_list = list;
}

fn install_intrinsics(b: &mut ModuleBuilder) {
    let t0 = b.type_parameter(0);
    let nullable_t0 = b.nullable(t0);
    let array_t0 = b.array_of(t0);
    let array_nullable_t0 = b.array_of(nullable_t0);
    let fn0 = b.function_type(0);
    let fn1 = b.function_type(1);

    let generic = |b: &mut ModuleBuilder, f: FunctionId| {
        b.set_type_params(f, 1);
        b.set_origin(f, FunctionOrigin::Builtin);
        f
    };

    let any2 = [("arg0", TypeId::NULLABLE_ANY), ("arg1", TypeId::NULLABLE_ANY)];
    for fq in ["kotlin.internal.ir.EQEQ", "kotlin.internal.ir.EQEQEQ"] {
        let f = b.function(fq, &any2, TypeId::BOOLEAN);
        b.set_origin(f, FunctionOrigin::Builtin);
    }
    for ty in [TypeId::DOUBLE, TypeId::FLOAT] {
        let nullable = b.nullable(ty);
        let f = b.function(
            "kotlin.internal.ir.ieee754equals",
            &[("arg0", nullable), ("arg1", nullable)],
            TypeId::BOOLEAN,
        );
        b.set_origin(f, FunctionOrigin::Builtin);
    }
    let f = b.function("kotlin.internal.ir.CHECK_NOT_NULL", &[("arg0", nullable_t0)], t0);
    generic(b, f);
    for fq in [
        "kotlin.internal.ir.THROW_CCE",
        "kotlin.internal.ir.THROW_NPE",
        "kotlin.internal.ir.noWhenBranchMatchedException",
    ] {
        let f = b.function(fq, &[], TypeId::NOTHING);
        b.set_origin(f, FunctionOrigin::Builtin);
    }
    for fq in [
        "kotlin.internal.ir.dataClassArrayMemberToString",
        "kotlin.internal.ir.dataClassArrayMemberHashCode",
    ] {
        let ret = if fq.ends_with("ToString") { TypeId::STRING } else { TypeId::INT };
        let f = b.function(fq, &[("arg0", TypeId::NULLABLE_ANY)], ret);
        b.set_origin(f, FunctionOrigin::Builtin);
    }
    let f = b.extension("kotlin.js.unsafeCast", TypeId::NULLABLE_ANY, &[], t0);
    generic(b, f);

    // Arrays
    let f = b.function("kotlin.emptyArray", &[], array_t0);
    generic(b, f);
    let f = b.function("kotlin.arrayOf", &[("elements", array_t0)], array_t0);
    generic(b, f);
    b.set_vararg(f, 0);
    let f = b.function("kotlin.arrayOfNulls", &[("size", TypeId::INT)], array_nullable_t0);
    generic(b, f);
    let ctor = b.builtin_member(array_t0, "<init>", &[TypeId::INT, fn1], array_t0);
    b.set_type_params(ctor, 1);
    for p in PrimitiveType::ALL {
        let array = b.primitive_array(p);
        let name = p.array_name();
        let fq = format!(
            "kotlin.{}{}",
            name[..1].to_lowercase(),
            &name[1..].replacen("Array", "ArrayOf", 1)
        );
        let f = b.function(&fq, &[("elements", array)], array);
        b.set_vararg(f, 0);
        b.set_origin(f, FunctionOrigin::Builtin);
        b.builtin_member(array, "<init>", &[TypeId::INT], array);
        b.builtin_member(array, "<init>", &[TypeId::INT, fn1], array);
    }

    // Enums
    let f = b.function("kotlin.enumValues", &[], array_t0);
    generic(b, f);
    let f = b.function("kotlin.enumValueOf", &[("name", TypeId::STRING)], t0);
    generic(b, f);

    // Platform constructors
    b.builtin_member(TypeId::LONG, "<init>", &[TypeId::INT, TypeId::INT], TypeId::LONG);
    b.builtin_member(TypeId::CHAR, "<init>", &[TypeId::INT], TypeId::CHAR);

    // Diagnostics helpers
    let f = b.function("kotlin.experimental.sourceLocation", &[], TypeId::STRING);
    b.set_origin(f, FunctionOrigin::Builtin);
    let f = b.function("kotlin.assert", &[("value", TypeId::BOOLEAN)], TypeId::UNIT);
    b.set_origin(f, FunctionOrigin::Builtin);
    let f = b.function(
        "kotlin.assert",
        &[("value", TypeId::BOOLEAN), ("lazyMessage", fn0)],
        TypeId::UNIT,
    );
    b.set_origin(f, FunctionOrigin::Builtin);

    // String indentation
    let f = b.extension("kotlin.text.trimIndent", TypeId::STRING, &[], TypeId::STRING);
    b.set_origin(f, FunctionOrigin::Builtin);
    let f = b.extension(
        "kotlin.text.trimMargin",
        TypeId::STRING,
        &[("marginPrefix", TypeId::STRING)],
        TypeId::STRING,
    );
    b.set_origin(f, FunctionOrigin::Builtin);
    let bar = b.string("|");
    b.set_default(f, 0, bar);
}

fn install_function_types(b: &mut ModuleBuilder) {
    for arity in 0..=3u8 {
        let ty = b.function_type(arity);
        let params = vec![TypeId::NULLABLE_ANY; usize::from(arity)];
        b.builtin_member(ty, "invoke", &params, TypeId::NULLABLE_ANY);
        b.builtin_member(ty, "<get-name>", &[], TypeId::STRING);
    }
}

fn native(b: &mut ModuleBuilder, f: FunctionId) {
    b.add_flags(f, FunctionFlags::NATIVE_ONLY);
    b.set_origin(f, FunctionOrigin::Builtin);
}

fn install_natives(b: &mut ModuleBuilder, p: &Prelude) {
    let d = TypeId::DOUBLE;
    for name in [
        "sqrt", "sin", "cos", "tan", "exp", "ln", "log10", "floor", "ceil", "round",
    ] {
        let f = b.function(&format!("kotlin.math.{name}"), &[("x", d)], d);
        native(b, f);
    }
    for ty in [TypeId::INT, TypeId::LONG, TypeId::DOUBLE] {
        let f = b.function("kotlin.math.abs", &[("x", ty)], ty);
        native(b, f);
        for name in ["max", "min"] {
            let f = b.function(&format!("kotlin.math.{name}"), &[("a", ty), ("b", ty)], ty);
            native(b, f);
        }
    }
    let f = b.extension("kotlin.math.pow", d, &[("x", d)], d);
    native(b, f);

    let s = TypeId::STRING;
    let string_natives: &[(&str, &[(&str, TypeId)], TypeId)] = &[
        ("uppercase", &[], s),
        ("lowercase", &[], s),
        ("trim", &[], s),
        ("reversed", &[], s),
        ("repeat", &[("n", TypeId::INT)], s),
        ("startsWith", &[("prefix", s)], TypeId::BOOLEAN),
        ("endsWith", &[("suffix", s)], TypeId::BOOLEAN),
        ("contains", &[("other", s)], TypeId::BOOLEAN),
        ("indexOf", &[("string", s)], TypeId::INT),
        ("replace", &[("oldValue", s), ("newValue", s)], s),
        ("padStart", &[("length", TypeId::INT), ("padChar", TypeId::CHAR)], s),
        ("padEnd", &[("length", TypeId::INT), ("padChar", TypeId::CHAR)], s),
        ("substringBefore", &[("delimiter", s)], s),
        ("substringAfter", &[("delimiter", s)], s),
        ("isBlank", &[], TypeId::BOOLEAN),
        ("toInt", &[], TypeId::INT),
        ("toLong", &[], TypeId::LONG),
        ("toDouble", &[], TypeId::DOUBLE),
    ];
    for &(name, params, ret) in string_natives {
        let f = b.extension(&format!("kotlin.text.{name}"), s, params, ret);
        native(b, f);
        if name == "padStart" || name == "padEnd" {
            let space = b.char(' ');
            b.set_default(f, 1, space);
        }
    }
    let nullable_int = b.nullable(TypeId::INT);
    let f = b.extension("kotlin.text.toIntOrNull", s, &[], nullable_int);
    native(b, f);

    let f = b.function("kotlin.error", &[("message", TypeId::ANY)], TypeId::NOTHING);
    native(b, f);

    let list_ty = b.module().class(p.array_list).ty;
    let elements = b.array_of(TypeId::NULLABLE_ANY);
    let f = b.function("kotlin.collections.listOf", &[("elements", elements)], list_ty);
    b.set_vararg(f, 0);
    native(b, f);
}

/// Closest `(String?)` constructor of a prelude throwable.
fn message_constructor(b: &ModuleBuilder, class: ClassId) -> FunctionId {
    let module = b.module();
    let ctors = &module.class(class).constructors;
    ctors
        .iter()
        .copied()
        .find(|&c| {
            let f = module.function(c);
            f.params.len() == 1 && module.value(f.params[0].value).ty == TypeId::NULLABLE_STRING
        })
        .unwrap_or(ctors[0])
}

/// `fun name(value: Boolean) { if (!value) throw Failure(message) }`
fn precondition(b: &mut ModuleBuilder, fq_name: &str, failure: ClassId, message: &str) {
    let f = b.function(fq_name, &[("value", TypeId::BOOLEAN)], TypeId::UNIT);
    b.set_origin(f, FunctionOrigin::Builtin);
    b.add_flags(f, FunctionFlags::INLINE_ONLY);
    let value = b.get(b.param(f, 0));
    let failed = b.not(value);
    let text = b.string(message);
    let ctor = message_constructor(b, failure);
    let exception = b.construct(ctor, vec![text]);
    let throw = b.throw(exception);
    let body = b.when(vec![(failed, throw)], TypeId::UNIT);
    b.set_reference_body(f, body);
}

/// `fun name(value: Any?): Any { if (value == null) throw Failure(...) else value }`
fn not_null_precondition(b: &mut ModuleBuilder, fq_name: &str, failure: ClassId) {
    let f = b.function(fq_name, &[("value", TypeId::NULLABLE_ANY)], TypeId::ANY);
    b.set_origin(f, FunctionOrigin::Builtin);
    b.add_flags(f, FunctionFlags::INLINE_ONLY);
    let value = b.get(b.param(f, 0));
    let null = b.null();
    let is_null = b.eq(value, null);
    let text = b.string("Required value was null.");
    let ctor = message_constructor(b, failure);
    let exception = b.construct(ctor, vec![text]);
    let throw = b.throw(exception);
    let value = b.get(b.param(f, 0));
    let body = b.if_else(is_null, throw, value);
    b.set_reference_body(f, body);
}

fn install_reference_bodies(b: &mut ModuleBuilder, p: &Prelude) {
    precondition(b, "kotlin.require", p.illegal_argument_exception, "Failed requirement.");
    precondition(b, "kotlin.check", p.illegal_state_exception, "Check failed.");
    not_null_precondition(b, "kotlin.requireNotNull", p.illegal_argument_exception);
    not_null_precondition(b, "kotlin.checkNotNull", p.illegal_state_exception);

    let todo = b.function("kotlin.TODO", &[], TypeId::NOTHING);
    b.set_origin(todo, FunctionOrigin::Builtin);
    b.add_flags(todo, FunctionFlags::INLINE_ONLY);
    let text = b.string("An operation is not implemented.");
    let ctor = message_constructor(b, p.not_implemented_error);
    let exception = b.construct(ctor, vec![text]);
    let body = b.throw(exception);
    b.set_reference_body(todo, body);
}
