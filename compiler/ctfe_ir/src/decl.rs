//! Declarations: classes, functions, fields, values and enum entries.

use bitflags::bitflags;

use crate::{ClassId, EnumEntryId, ExprId, ExprRange, FieldId, FunctionId, Name, TypeId, ValueId};

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ClassKind {
    Class,
    Interface,
    /// Singleton `object` declaration.
    Object,
    Enum,
    /// Anonymous class body of an enum entry.
    EnumEntry,
}

bitflags! {
    /// Class properties relevant to evaluation.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
    pub struct ClassFlags: u8 {
        /// Instances live on the host side; members are served by the
        /// native bridge.
        const NATIVE_BRIDGED = 1 << 0;
        /// Annotated as evaluable at compile time.
        const COMPILE_TIME = 1 << 1;
        /// Inline value class wrapping a single `data` field.
        const VALUE_CLASS = 1 << 2;
        const DATA = 1 << 3;
        const ABSTRACT = 1 << 4;
    }
}

/// One step of a class's instance initialization, in declaration order.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Initializer {
    /// Evaluate the field's initializer and store it.
    Field(FieldId),
    /// Evaluate an anonymous `init { }` block.
    Block(ExprId),
}

#[derive(Clone, Debug)]
pub struct IrClass {
    pub name: Name,
    pub fq_name: Name,
    pub kind: ClassKind,
    pub flags: ClassFlags,
    /// Type of `this` inside the class.
    pub ty: TypeId,
    pub superclass: Option<ClassId>,
    pub interfaces: Vec<ClassId>,
    pub fields: Vec<FieldId>,
    pub constructors: Vec<FunctionId>,
    pub functions: Vec<FunctionId>,
    pub initializers: Vec<Initializer>,
    pub enum_entries: Vec<EnumEntryId>,
}

impl IrClass {
    #[inline]
    pub fn is_native_bridged(&self) -> bool {
        self.flags.contains(ClassFlags::NATIVE_BRIDGED)
    }

    #[inline]
    pub fn is_compile_time(&self) -> bool {
        self.flags.contains(ClassFlags::COMPILE_TIME)
    }

    /// The first declared constructor, treated as primary.
    pub fn primary_constructor(&self) -> Option<FunctionId> {
        self.constructors.first().copied()
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum FunctionKind {
    Function,
    Constructor,
    /// Property getter reading the given backing field.
    Getter(FieldId),
    /// Property setter writing the given backing field.
    Setter(FieldId),
}

/// Where a function came from.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum FunctionOrigin {
    #[default]
    Source,
    /// Compiler-generated `values()` / `valueOf()` / `entries` of an enum.
    EnumSpecialMember,
    /// Generated by the evaluator itself (function-reference adaptors).
    Synthesized,
    /// Prelude declaration without a user-visible source.
    Builtin,
}

/// Owner of a function declaration.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum FunctionOwner {
    TopLevel,
    Class(ClassId),
    /// Member of a builtin type (`Int.plus`, `String.length`, ...).
    Builtin(TypeId),
}

bitflags! {
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
    pub struct FunctionFlags: u8 {
        /// Body exists only to be inlined; never interpreted directly.
        const INLINE_ONLY = 1 << 0;
        /// Compiler-generated stub that fills in default arguments.
        const SYNTHETIC_DEFAULT = 1 << 1;
        /// Must be served by the native bridge even when a body is present.
        const NATIVE_ONLY = 1 << 2;
        const COMPILE_TIME = 1 << 3;
        const SUSPEND = 1 << 4;
        const OPERATOR = 1 << 5;
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct ValueParameter {
    pub value: ValueId,
    /// Default value, evaluated in the callee's frame when the call site
    /// leaves the slot empty.
    pub default: Option<ExprId>,
    pub is_vararg: bool,
}

#[derive(Clone, Debug)]
pub struct IrFunction {
    pub name: Name,
    pub fq_name: Name,
    pub kind: FunctionKind,
    pub origin: FunctionOrigin,
    pub owner: FunctionOwner,
    pub flags: FunctionFlags,
    pub dispatch_receiver: Option<ValueId>,
    pub extension_receiver: Option<ValueId>,
    pub params: Vec<ValueParameter>,
    pub type_params: u16,
    pub return_type: TypeId,
    pub body: Option<ExprId>,
    /// Body of the reference implementation, substituted when the
    /// declaration itself has none.
    pub reference_body: Option<ExprId>,
    /// Outer values a local function or lambda reads.
    pub captures: Vec<ValueId>,
    /// Functions this one directly overrides.
    pub overridden: Vec<FunctionId>,
}

impl IrFunction {
    #[inline]
    pub fn is_constructor(&self) -> bool {
        self.kind == FunctionKind::Constructor
    }

    #[inline]
    pub fn is_inline_only_stub(&self) -> bool {
        self.flags
            .intersects(FunctionFlags::INLINE_ONLY | FunctionFlags::SYNTHETIC_DEFAULT)
    }

    #[inline]
    pub fn owner_class(&self) -> Option<ClassId> {
        match self.owner {
            FunctionOwner::Class(class) => Some(class),
            _ => None,
        }
    }

    /// Backing field when this is a property accessor.
    pub fn accessed_field(&self) -> Option<FieldId> {
        match self.kind {
            FunctionKind::Getter(field) | FunctionKind::Setter(field) => Some(field),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct IrField {
    pub name: Name,
    /// `None` for top-level (static) properties.
    pub owner: Option<ClassId>,
    pub ty: TypeId,
    pub initializer: Option<ExprId>,
    pub is_const: bool,
}

#[derive(Clone, Debug)]
pub struct IrValue {
    pub name: Name,
    pub ty: TypeId,
    pub mutable: bool,
}

#[derive(Clone, Debug)]
pub struct IrEnumEntry {
    pub name: Name,
    pub owner: ClassId,
    pub ordinal: u32,
    /// Constructor invoked to initialize the entry.
    pub constructor: Option<FunctionId>,
    pub args: ExprRange,
    /// Anonymous subclass when the entry declares a body.
    pub class_body: Option<ClassId>,
}
