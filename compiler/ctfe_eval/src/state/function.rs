use ctfe_ir::{FunctionId, TypeId, ValueId};

use super::State;

/// A function reference value with its bound receivers and captures.
#[derive(Clone, Debug)]
pub struct FunctionState {
    pub function: FunctionId,
    pub ty: TypeId,
    pub dispatch_receiver: Option<State>,
    pub extension_receiver: Option<State>,
    /// Outer values captured when the reference was created.
    pub captures: Vec<(ValueId, State)>,
}
