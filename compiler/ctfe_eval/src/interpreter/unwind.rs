//! Decomposition of compound nodes into work items.
//!
//! Children are pushed after the node's terminal `Simple` step and in
//! reverse, so they run first and left to right.

use ctfe_ir::{ExprId, ExprKind, Initializer};
use smallvec::SmallVec;

use super::IrInterpreter;
use crate::errors::{invalid_state, EvalResult};
use crate::instruction::Instruction;
use crate::stack::{ScopeKind, TryStage};
use crate::state::State;

type Children = SmallVec<[ExprId; 4]>;

impl IrInterpreter {
    pub(super) fn unwind(&mut self, id: ExprId) -> EvalResult<()> {
        let kind = self.module().kind(id);
        match kind {
            ExprKind::Const(_)
            | ExprKind::GetValue(_)
            | ExprKind::GetObject(_)
            | ExprKind::GetEnum(_)
            | ExprKind::Error(_)
            | ExprKind::Break { .. }
            | ExprKind::Continue { .. } => self.push(Instruction::Simple(id)),

            ExprKind::SetValue { value, .. } => self.push_then(id, &[value]),
            ExprKind::Variable { initializer, .. } => self.push_then(id, initializer.as_slice()),
            ExprKind::Return { value, .. } => self.push_then(id, &[value]),
            ExprKind::Throw(value) => self.push_then(id, &[value]),
            ExprKind::TypeOp { operand, .. } => self.push_then(id, &[operand]),

            ExprKind::Call {
                dispatch_receiver,
                extension_receiver,
                args,
                ..
            } => {
                let children: Children = {
                    let module = self.module();
                    dispatch_receiver
                        .into_iter()
                        .chain(extension_receiver)
                        .chain(module.exprs.args(args).iter().flatten().copied())
                        .collect()
                };
                self.push_then(id, &children)
            }
            ExprKind::ConstructorCall { args, .. } | ExprKind::DelegatingConstructorCall { args, .. } => {
                let children: Children = self.module().exprs.args(args).iter().flatten().copied().collect();
                self.push_then(id, &children)
            }
            ExprKind::FunctionReference {
                dispatch_receiver,
                extension_receiver,
                ..
            } => {
                let children: Children = dispatch_receiver.into_iter().chain(extension_receiver).collect();
                self.push_then(id, &children)
            }

            ExprKind::GetField { receiver, .. } => self.push_then(id, receiver.as_slice()),
            ExprKind::SetField { receiver, value, .. } => {
                let children: Children = receiver.into_iter().chain([value]).collect();
                self.push_then(id, &children)
            }
            ExprKind::Vararg(range) => {
                let children: Children = self.module().exprs.list(range).into();
                self.push_then(id, &children)
            }

            ExprKind::Block(range) => {
                let statements: SmallVec<[ExprId; 8]> = self.module().exprs.list(range).into();
                self.stack.push_scope(ScopeKind::Block)?;
                let Some((&last, rest)) = statements.split_last() else {
                    return Ok(());
                };
                self.push_compound(last)?;
                for &statement in rest.iter().rev() {
                    self.push(Self::discard())?;
                    self.push_compound(statement)?;
                }
                Ok(())
            }
            ExprKind::When(_) => self.push_when_branch(id, 0),
            ExprKind::While { condition, .. } => {
                self.stack.push_scope(ScopeKind::Loop { node: id })?;
                self.push(Instruction::Simple(id))?;
                self.push_compound(condition)
            }
            ExprKind::DoWhile { body, condition } => {
                self.stack.push_scope(ScopeKind::Loop { node: id })?;
                self.push(Instruction::Simple(id))?;
                self.push_compound(condition)?;
                self.push(Self::discard())?;
                self.push_compound(body)
            }
            ExprKind::Try { body, .. } => {
                self.stack.push_scope(ScopeKind::Try {
                    node: id,
                    stage: TryStage::Body,
                })?;
                self.push(Instruction::Simple(id))?;
                self.push_compound(body)
            }

            ExprKind::InstanceInitializer { class } => {
                let initializers: SmallVec<[(Initializer, Option<ExprId>); 4]> = {
                    let module = self.module();
                    module
                        .class(class)
                        .initializers
                        .iter()
                        .map(|&init| match init {
                            Initializer::Field(field) => (init, module.field(field).initializer),
                            Initializer::Block(body) => (init, Some(body)),
                        })
                        .collect()
                };
                self.push(Instruction::Simple(id))?;
                for (init, expr) in initializers.into_iter().rev() {
                    let Some(expr) = expr else { continue };
                    match init {
                        Initializer::Field(field) => {
                            self.push(Instruction::custom("initialize field", move |interp| {
                                let value = interp.pop_state()?;
                                let (_, this) = interp.current_this()?;
                                interp.write_field(&this, field, value)
                            }))?;
                        }
                        Initializer::Block(_) => self.push(Self::discard())?,
                    }
                    self.push_compound(expr)?;
                }
                Ok(())
            }
            ExprKind::StringConcat(range) => {
                let parts: Children = self.module().exprs.list(range).into();
                self.push(Instruction::Simple(id))?;
                for &part in parts.iter().rev() {
                    self.push(Instruction::custom("stringify", move |interp| {
                        let value = interp.pop_state()?;
                        interp.push_string_of(value, Some(id))
                    }))?;
                    self.push_compound(part)?;
                }
                Ok(())
            }
        }
    }

    /// Pushes `Simple(id)` and then `children` so they run first.
    fn push_then(&mut self, id: ExprId, children: &[ExprId]) -> EvalResult<()> {
        self.push(Instruction::Simple(id))?;
        for &child in children.iter().rev() {
            self.push_compound(child)?;
        }
        Ok(())
    }

    /// Tests branch `index` of `when`; falls through to the next branch
    /// when the condition is false. No matching branch yields `Unit`.
    fn push_when_branch(&mut self, when: ExprId, index: usize) -> EvalResult<()> {
        let branch = {
            let module = self.module();
            let ExprKind::When(branches) = module.kind(when) else {
                return Err(invalid_state("when branch of a non-when node"));
            };
            module.exprs.branches(branches).get(index).copied()
        };
        let Some(branch) = branch else {
            return self.push_state(State::unit());
        };
        self.push(Instruction::custom("when branch", move |interp| {
            if interp.pop_bool()? {
                interp.push_compound(branch.result)
            } else {
                interp.push_when_branch(when, index + 1)
            }
        }))?;
        self.push_compound(branch.condition)
    }
}
