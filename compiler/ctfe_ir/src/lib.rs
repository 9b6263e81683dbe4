//! Lowered IR for compile-time constant evaluation.
//!
//! This crate holds the data the evaluator walks:
//! - Names for interned identifiers
//! - Interned types with fixed ids for builtins
//! - Class, function, field and value declarations
//! - Flattened expression nodes in an arena
//! - A builder that installs the language prelude
//!
//! # Design Philosophy
//!
//! - **Intern Everything**: Strings → Name(u32), Types → TypeId(u32)
//! - **Flatten Everything**: No Box<Expr>, use ExprId(u32) indices
//!
//! Types that contain floats store them as bits for Hash compatibility.

/// Compile-time assertion that a type has a specific size.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

mod builder;
mod decl;
mod expr;
mod ids;
mod interner;
mod module;
mod name;
mod prelude;
mod types;

pub use builder::{CallParts, ModuleBuilder};
pub use decl::{
    ClassFlags, ClassKind, FunctionFlags, FunctionKind, FunctionOrigin, FunctionOwner, Initializer,
    IrClass, IrEnumEntry, IrField, IrFunction, IrValue, ValueParameter,
};
pub use expr::{
    CatchClause, ConstValue, Expr, ExprArena, ExprKind, Span, TypeOperator, WhenBranch,
};
pub use ids::{
    ArgRange, BranchRange, CatchRange, ClassId, EnumEntryId, ExprId, ExprRange, FieldId,
    FunctionId, Range, TypeArgRange, ValueId,
};
pub use interner::{InternOverflow, SharedInterner, StringInterner};
pub use module::IrModule;
pub use name::Name;
pub use prelude::{Prelude, UnsignedClass};
pub use types::{PrimitiveType, TypeData, TypeId, TypeKind, TypePool};
