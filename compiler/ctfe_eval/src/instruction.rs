//! Work items of the interpreter loop.

use std::fmt;

use ctfe_ir::ExprId;

use crate::errors::EvalResult;
use crate::interpreter::IrInterpreter;

/// Host callback run in place of an IR node.
pub type CustomAction = Box<dyn FnOnce(&mut IrInterpreter) -> EvalResult<()>>;

/// A pending step of the work list.
///
/// - `Compound(node)` decomposes `node`: it pushes the node's children and
///   a terminal `Simple(node)` that consumes their values.
/// - `Simple(node)` evaluates `node` against values already on the stack.
/// - `Custom` runs a host callback, for steps that are not IR nodes
///   (binding a default argument, resuming an unwind after `finally`).
pub enum Instruction {
    Simple(ExprId),
    Compound(ExprId),
    Custom {
        label: &'static str,
        action: CustomAction,
    },
}

impl Instruction {
    pub fn custom(
        label: &'static str,
        action: impl FnOnce(&mut IrInterpreter) -> EvalResult<()> + 'static,
    ) -> Self {
        Instruction::Custom {
            label,
            action: Box::new(action),
        }
    }
}

impl fmt::Debug for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Simple(id) => write!(f, "Simple({id:?})"),
            Instruction::Compound(id) => write!(f, "Compound({id:?})"),
            Instruction::Custom { label, .. } => write!(f, "Custom({label})"),
        }
    }
}
