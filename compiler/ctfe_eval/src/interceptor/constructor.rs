use ctfe_ir::{FunctionId, IrModule};

use crate::intrinsics::{self, Intrinsic};

/// How a constructor call produces its object.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ConstructorPath {
    /// The host library builds the object.
    Native,
    /// The interpreter computes the value directly (arrays, unsigned
    /// numbers, `Long(low, high)`).
    Intrinsic(Intrinsic),
    /// A fresh object is allocated and the constructor body runs on it.
    Interpreted,
}

pub fn constructor_path(module: &IrModule, constructor: FunctionId) -> ConstructorPath {
    if let Some(intrinsic) = intrinsics::resolve(module, constructor) {
        return ConstructorPath::Intrinsic(intrinsic);
    }
    let f = module.function(constructor);
    let bridged = f
        .owner_class()
        .map_or(true, |class| module.class(class).is_native_bridged());
    if bridged && f.body.is_none() {
        ConstructorPath::Native
    } else {
        ConstructorPath::Interpreted
    }
}
