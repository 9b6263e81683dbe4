//! Call interception.
//!
//! Every call passes through [`call_path`] once its frame is set up and
//! its arguments are bound. The decision is made in a fixed order:
//!
//! 1. a method of a host object or of a native-bridged superclass,
//! 2. a `NATIVE_ONLY` function,
//! 3. an intrinsic,
//! 4. a reflective member of a function value (`invoke`, `name`),
//! 5. a builtin member on a primitive receiver,
//! 6. a bodiless property accessor,
//! 7. a declaration served by its reference body,
//! 8. the declaration's own body.
//!
//! Anything left is a suspend stub or unsupported. A host object is only
//! reachable through its natives (and the intrinsics every value answers),
//! so a host receiver never reaches steps 6 to 8.

mod constructor;

use ctfe_ir::{ExprId, FieldId, FunctionFlags, FunctionId, IrModule};

use crate::bridge::{NativeKind, NativeRegistry};
use crate::intrinsics::{self, Intrinsic};
use crate::state::State;

pub use constructor::{constructor_path, ConstructorPath};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CallPath {
    NativeMethod,
    NativeFunction,
    NativeConstructor,
    Intrinsic(Intrinsic),
    FunctionMember,
    Builtin,
    Accessor(FieldId),
    ReferenceBody(ExprId),
    Body(ExprId),
    /// Bodiless constructor of an interpreted class: yields `this`.
    TrivialConstructor,
    SuspendStub,
    Unsupported,
}

/// Reflective members answered directly for function values.
const FUNCTION_MEMBERS: &[&str] = &["invoke", "<get-name>", "toString"];

/// How `callee` is evaluated for a call with dispatch receiver `receiver`.
pub fn call_path(
    module: &IrModule,
    natives: &NativeRegistry,
    callee: FunctionId,
    receiver: Option<&State>,
) -> CallPath {
    let f = module.function(callee);

    if f.is_constructor() {
        return match constructor_path(module, callee) {
            ConstructorPath::Native => CallPath::NativeConstructor,
            ConstructorPath::Intrinsic(intrinsic) => CallPath::Intrinsic(intrinsic),
            ConstructorPath::Interpreted => f
                .body
                .or(f.reference_body)
                .map_or(CallPath::TrivialConstructor, CallPath::Body),
        };
    }

    if !f.is_inline_only_stub() && receiver.is_some_and(|r| is_native_method(module, natives, callee, r)) {
        return CallPath::NativeMethod;
    }
    if f.flags.contains(FunctionFlags::NATIVE_ONLY) {
        return CallPath::NativeFunction;
    }
    if let Some(intrinsic) = intrinsics::resolve(module, callee) {
        return CallPath::Intrinsic(intrinsic);
    }
    if matches!(receiver, Some(State::Function(_))) && FUNCTION_MEMBERS.contains(&module.name(f.name)) {
        return CallPath::FunctionMember;
    }

    match receiver {
        Some(State::Primitive(_)) => return CallPath::Builtin,
        Some(State::Wrapper(_)) if !f.is_inline_only_stub() => return CallPath::Unsupported,
        _ => {}
    }

    if let Some(body) = f.body {
        CallPath::Body(body)
    } else if let Some(field) = f.accessed_field() {
        CallPath::Accessor(field)
    } else if let Some(body) = f.reference_body {
        CallPath::ReferenceBody(body)
    } else if f.flags.contains(FunctionFlags::SUSPEND) {
        CallPath::SuspendStub
    } else {
        CallPath::Unsupported
    }
}

/// Whether the native registry serves `callee` on `receiver`.
fn is_native_method(module: &IrModule, natives: &NativeRegistry, callee: FunctionId, receiver: &State) -> bool {
    match receiver {
        State::Wrapper(wrapper) => {
            natives.contains(NativeKind::Method, wrapper.class_name(), &module.signature(callee))
        }
        State::Complex(object) => {
            let object = object.borrow();
            let Some(wrapper) = object.super_wrapper() else {
                return false;
            };
            let bridged_owner = module
                .function(callee)
                .owner_class()
                .is_some_and(|owner| module.class(owner).is_native_bridged());
            bridged_owner
                && natives.contains(NativeKind::Method, wrapper.class_name(), &module.signature(callee))
        }
        _ => false,
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
