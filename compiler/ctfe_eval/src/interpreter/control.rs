//! Non-local exits.
//!
//! An [`Exit`] travels outward one scope at a time. Each scope kind
//! either consumes it, redirects it through a `finally` block, or drops
//! itself and lets the exit continue:
//!
//! | scope      | consumes                                  |
//! |------------|-------------------------------------------|
//! | `Loop`     | `break`/`continue` targeting the loop     |
//! | `Try`      | throws matching a catch clause            |
//! | `Function` | returns targeting the frame's function    |
//! | `Block`    | nothing                                   |
//!
//! A `Try` scope with a `finally` block runs it before letting any exit
//! past, then resumes the same exit.

use ctfe_ir::{CatchClause, ExprId, ExprKind, FunctionId};
use smallvec::SmallVec;
use tracing::trace;

use super::IrInterpreter;
use crate::errors::{invalid_state, EvalResult};
use crate::instruction::Instruction;
use crate::stack::{ScopeKind, TryStage};
use crate::state::{ExceptionState, Shared, State};

#[derive(Clone, Debug)]
pub(crate) enum Exit {
    Return { target: FunctionId, value: State },
    Break { target: ExprId },
    Continue { target: ExprId },
    Throw(Shared<ExceptionState>),
}

impl IrInterpreter {
    pub(crate) fn propagate(&mut self, exit: Exit) -> EvalResult<()> {
        loop {
            let Some(frame) = self.stack.current_frame() else {
                return self.finish_unwound(exit);
            };
            let kind = frame
                .scopes()
                .last()
                .map_or(ScopeKind::Function, |scope| scope.kind);
            trace!(?kind, ?exit, "unwinding");

            match kind {
                ScopeKind::Block => {
                    self.stack.pop_scope();
                }
                ScopeKind::Loop { node } => match exit {
                    Exit::Break { target } if target == node => {
                        self.stack.pop_scope();
                        return self.push_state(State::unit());
                    }
                    Exit::Continue { target } if target == node => {
                        let condition = match self.module().kind(node) {
                            ExprKind::While { condition, .. } | ExprKind::DoWhile { condition, .. } => condition,
                            _ => return Err(invalid_state("loop scope without a loop node")),
                        };
                        self.stack.scope_mut()?.reset();
                        self.push(Instruction::Simple(node))?;
                        return self.push_compound(condition);
                    }
                    _ => {
                        self.stack.pop_scope();
                    }
                },
                ScopeKind::Try { node, stage } => {
                    let (catches, finally) = self.try_parts(node)?;
                    if let (Exit::Throw(exception), TryStage::Body) = (&exit, stage) {
                        if let Some(clause) = self.matching_catch(&catches, exception) {
                            let exception = exception.clone();
                            let scope = self.stack.scope_mut()?;
                            scope.kind = ScopeKind::Try {
                                node,
                                stage: TryStage::Catch,
                            };
                            scope.reset();
                            self.bind(clause.parameter, State::Exception(exception))?;
                            self.push(Instruction::Simple(node))?;
                            return self.push_compound(clause.body);
                        }
                    }
                    match finally {
                        Some(finally) if stage != TryStage::Finally => {
                            let scope = self.stack.scope_mut()?;
                            scope.kind = ScopeKind::Try {
                                node,
                                stage: TryStage::Finally,
                            };
                            scope.reset();
                            self.push(Instruction::custom("resume after finally", move |interp| {
                                interp.pop_state()?;
                                interp.propagate(exit)
                            }))?;
                            return self.push_compound(finally);
                        }
                        _ => {
                            self.stack.pop_scope();
                        }
                    }
                }
                ScopeKind::Function => {
                    let frame = self
                        .stack
                        .pop_frame()
                        .ok_or_else(|| invalid_state("unwinding without a frame"))?;
                    match exit {
                        Exit::Return { target, value } if frame.function == Some(target) => {
                            let value = if frame.returns_unit { State::unit() } else { value };
                            return self.stack.deliver(value);
                        }
                        Exit::Break { .. } | Exit::Continue { .. } => {
                            return Err(invalid_state("break or continue escaped its function"));
                        }
                        _ => {}
                    }
                }
            }
        }
    }

    /// Exit that left the root frame: an uncaught exception becomes the
    /// result of the run.
    fn finish_unwound(&mut self, exit: Exit) -> EvalResult<()> {
        match exit {
            Exit::Throw(exception) => self.stack.deliver(State::Exception(exception)),
            Exit::Return { value, .. } => self.stack.deliver(value),
            Exit::Break { .. } | Exit::Continue { .. } => {
                Err(invalid_state("break or continue outside of a loop"))
            }
        }
    }

    fn try_parts(&self, node: ExprId) -> EvalResult<(SmallVec<[CatchClause; 2]>, Option<ExprId>)> {
        let module = self.module();
        match module.kind(node) {
            ExprKind::Try { catches, finally, .. } => Ok((module.exprs.catches(catches).into(), finally)),
            _ => Err(invalid_state("try scope without a try node")),
        }
    }

    /// First clause whose parameter type the exception conforms to.
    fn matching_catch(&self, catches: &[CatchClause], exception: &Shared<ExceptionState>) -> Option<CatchClause> {
        let state = State::Exception(exception.clone());
        catches
            .iter()
            .copied()
            .find(|clause| {
                let ty = self.module().value(clause.parameter).ty;
                self.is_instance(&state, ty)
            })
    }
}
