use ctfe_ir::TypeId;

use crate::bridge::HostObject;

/// A host-side object reachable from interpreted code.
#[derive(Clone, Debug)]
pub struct Wrapper {
    object: HostObject,
    ty: TypeId,
}

impl Wrapper {
    pub fn new(object: HostObject, ty: TypeId) -> Self {
        Wrapper { object, ty }
    }

    #[inline]
    pub fn object(&self) -> &HostObject {
        &self.object
    }

    #[inline]
    pub fn ty(&self) -> TypeId {
        self.ty
    }

    /// Fully qualified host class name, the native dispatch key.
    #[inline]
    pub fn class_name(&self) -> &str {
        self.object.class_name()
    }
}
