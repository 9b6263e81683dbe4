//! Terminal steps: each consumes its children's values and pushes one
//! value or starts an unwind.

use ctfe_ir::{ExprId, ExprKind};
use tracing::trace;

use super::{Exit, IrInterpreter};
use crate::errors::{invalid_state, type_mismatch, EvalResult};
use crate::instruction::Instruction;
use crate::stack::{ScopeKind, TryStage};
use crate::state::{FunctionState, PrimitiveValue, State};

impl IrInterpreter {
    pub(super) fn eval_simple(&mut self, id: ExprId) -> EvalResult<()> {
        let expr = self.module().expr(id);
        match expr.kind {
            ExprKind::Const(value) => {
                let value = PrimitiveValue::from_const(value, &self.module());
                self.push_state(State::primitive(value, expr.ty))
            }
            ExprKind::GetValue(value) => {
                let state = self.load(value)?;
                self.push_state(state)
            }
            ExprKind::SetValue { target, .. } => {
                let state = self.pop_state()?;
                if !self.stack.rewrite_state(target, state) {
                    return Err(self.unbound(target));
                }
                self.push_state(State::unit())
            }
            ExprKind::Variable { value, initializer } => {
                let state = if initializer.is_some() {
                    self.pop_state()?
                } else {
                    State::null(self.module().value(value).ty)
                };
                self.bind(value, state)?;
                self.push_state(State::unit())
            }

            ExprKind::Call { .. } => self.eval_call(id, expr),
            ExprKind::ConstructorCall {
                constructor,
                args,
                type_args,
            } => {
                let (slots, type_args) = {
                    let module = self.module();
                    let slots: Vec<bool> = module.exprs.args(args).iter().map(Option::is_some).collect();
                    let type_args: Vec<_> = module.exprs.type_args(type_args).to_vec();
                    (slots, type_args)
                };
                let args = self.pop_arguments(&slots)?;
                let type_args = type_args.into_iter().map(|ty| self.substitute(ty)).collect();
                self.call_constructor(constructor, expr.ty, args, type_args, Some(id))
            }
            ExprKind::DelegatingConstructorCall { constructor, args } => {
                let slots: Vec<bool> = self.module().exprs.args(args).iter().map(Option::is_some).collect();
                let args = self.pop_arguments(&slots)?;
                self.eval_delegating(constructor, args, Some(id))
            }
            ExprKind::InstanceInitializer { .. } => self.push_state(State::unit()),

            ExprKind::GetField { field, receiver } => self.eval_get_field(field, receiver.is_some(), expr.ty),
            ExprKind::SetField { field, receiver, .. } => self.eval_set_field(field, receiver.is_some()),
            ExprKind::GetObject(class) => self.push_object(class),
            ExprKind::GetEnum(entry) => self.push_enum_entry(entry, Some(id)),

            ExprKind::Block(_) | ExprKind::When(_) => Err(invalid_state(format!(
                "{} has no terminal step",
                expr.kind.name()
            ))),

            ExprKind::Return { target, .. } => {
                let value = self.pop_state()?;
                self.propagate(Exit::Return { target, value })
            }
            ExprKind::While { condition, body } | ExprKind::DoWhile { body, condition } => {
                self.continue_loop(id, condition, body)
            }
            ExprKind::Break { target } => self.propagate(Exit::Break { target }),
            ExprKind::Continue { target } => self.propagate(Exit::Continue { target }),
            ExprKind::Try { finally, .. } => self.finish_try(finally),
            ExprKind::Throw(_) => {
                let value = self.pop_state()?;
                match value {
                    State::Exception(exception) => self.throw(exception, Some(id)),
                    _ if value.is_null() => {
                        let npe = self.module().prelude().null_pointer_exception;
                        self.throw_new(npe, None, Some(id))
                    }
                    other => Err(type_mismatch("Throwable", other.kind_name())),
                }
            }
            ExprKind::TypeOp {
                operator,
                operand_type,
                ..
            } => self.eval_type_op(operator, operand_type, expr.ty, id),

            ExprKind::StringConcat(range) => {
                let count = self.module().exprs.list(range).len();
                let parts = self.pop_states(count)?;
                let mut text = String::new();
                for part in &parts {
                    let piece = part
                        .as_str()
                        .ok_or_else(|| type_mismatch("String", part.kind_name()))?;
                    text.push_str(piece);
                }
                self.push_state(State::string(&text))
            }
            ExprKind::Vararg(range) => {
                let count = self.module().exprs.list(range).len();
                let elements = self.pop_states(count)?;
                self.push_state(State::array(elements, expr.ty))
            }
            ExprKind::FunctionReference {
                function,
                dispatch_receiver,
                extension_receiver,
            } => {
                let extension_receiver = extension_receiver.map(|_| self.pop_state()).transpose()?;
                let dispatch_receiver = dispatch_receiver.map(|_| self.pop_state()).transpose()?;
                let captured: Vec<_> = self.module().function(function).captures.clone();
                let captures = captured
                    .into_iter()
                    .map(|value| Ok((value, self.load(value)?)))
                    .collect::<EvalResult<Vec<_>>>()?;
                self.push_state(State::Function(std::rc::Rc::new(FunctionState {
                    function,
                    ty: expr.ty,
                    dispatch_receiver,
                    extension_receiver,
                    captures,
                })))
            }
            ExprKind::Error(message) => {
                let (throwable, message) = {
                    let module = self.module();
                    let text = module.name(message);
                    let message = (!text.is_empty()).then(|| text.to_owned());
                    (module.prelude().throwable, message)
                };
                trace!(?message, "reached an error node");
                self.throw_new(throwable, message, Some(id))
            }
        }
    }

    /// Pops one value per present slot and lays them out by slot.
    pub(super) fn pop_arguments(&mut self, slots: &[bool]) -> EvalResult<Vec<Option<State>>> {
        let present = slots.iter().filter(|&&slot| slot).count();
        let mut values = self.pop_states(present)?.into_iter();
        Ok(slots
            .iter()
            .map(|&slot| if slot { values.next() } else { None })
            .collect())
    }

    /// Terminal step of `while` and `do-while`: checks the condition just
    /// evaluated and schedules the next iteration.
    fn continue_loop(&mut self, node: ExprId, condition: ExprId, body: ExprId) -> EvalResult<()> {
        if self.pop_bool()? {
            self.push(Instruction::Simple(node))?;
            self.push_compound(condition)?;
            self.push(Self::discard())?;
            self.push_compound(body)
        } else {
            self.push_state(State::unit())
        }
    }

    /// Terminal step of `try`: the body or a catch clause completed
    /// normally, so the `finally` block runs with the value kept below it.
    fn finish_try(&mut self, finally: Option<ExprId>) -> EvalResult<()> {
        let Some(finally) = finally else {
            return Ok(());
        };
        let scope = self.stack.scope_mut()?;
        let ScopeKind::Try { node, stage } = scope.kind else {
            return Err(invalid_state("try completed outside its scope"));
        };
        if stage == TryStage::Finally {
            return Ok(());
        }
        scope.kind = ScopeKind::Try {
            node,
            stage: TryStage::Finally,
        };
        self.push(Self::discard())?;
        self.push_compound(finally)
    }
}
