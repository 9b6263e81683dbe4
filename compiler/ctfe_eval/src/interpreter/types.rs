//! Run-time type tests and casts.

use ctfe_ir::{ExprId, TypeId, TypeKind, TypeOperator};

use super::IrInterpreter;
use crate::errors::EvalResult;
use crate::state::State;

impl IrInterpreter {
    /// Whether `state` conforms to `ty`. Unresolved type parameters
    /// accept everything.
    pub(crate) fn is_instance(&self, state: &State, ty: TypeId) -> bool {
        let data = self.module().types.get(ty);
        if state.is_null() {
            return data.nullable;
        }
        match data.kind {
            TypeKind::Any => true,
            TypeKind::Nothing => false,
            TypeKind::Unit => state.is_unit(),
            TypeKind::String => state.as_str().is_some(),
            TypeKind::Primitive(p) => state.as_value().is_some_and(|value| value.type_name() == p.name()),
            TypeKind::Class(class) => match state {
                State::Complex(_) | State::Exception(_) => state
                    .class()
                    .is_some_and(|runtime| self.module().is_subclass(runtime, class)),
                State::Wrapper(wrapper) => {
                    let module = self.module();
                    module
                        .class_by_fq_name(wrapper.class_name())
                        .is_some_and(|runtime| module.is_subclass(runtime, class))
                }
                _ => false,
            },
            TypeKind::Array(_) | TypeKind::PrimitiveArray(_) => {
                let is_array = state.as_value().is_some_and(|value| value.as_array().is_some());
                let state_kind = self.module().types.kind(state.ty());
                is_array
                    && match (state_kind, data.kind) {
                        (TypeKind::Array(_), TypeKind::Array(_)) => true,
                        (TypeKind::PrimitiveArray(a), TypeKind::PrimitiveArray(b)) => a == b,
                        _ => false,
                    }
            }
            TypeKind::Function { .. } => matches!(state, State::Function(_)),
            TypeKind::Parameter(_) => {
                let actual = self.substitute(ty);
                actual == ty || self.is_instance(state, actual)
            }
        }
    }

    pub(super) fn eval_type_op(
        &mut self,
        operator: TypeOperator,
        operand_type: TypeId,
        result_type: TypeId,
        site: ExprId,
    ) -> EvalResult<()> {
        let value = self.pop_state()?;
        match operator {
            TypeOperator::InstanceOf => {
                let is = self.is_instance(&value, operand_type);
                self.push_state(State::boolean(is))
            }
            TypeOperator::NotInstanceOf => {
                let is = self.is_instance(&value, operand_type);
                self.push_state(State::boolean(!is))
            }
            TypeOperator::Cast => {
                if self.is_instance(&value, operand_type) {
                    return self.push_state(value);
                }
                let (class_cast, message) = {
                    let module = self.module();
                    let from = module.type_name(value.ty());
                    let to = module.type_name(operand_type);
                    (
                        module.prelude().class_cast_exception,
                        format!("{from} cannot be cast to {to}"),
                    )
                };
                self.throw_new(class_cast, Some(message), Some(site))
            }
            TypeOperator::SafeCast => {
                if self.is_instance(&value, operand_type) {
                    self.push_state(value)
                } else {
                    self.push_state(State::null(result_type))
                }
            }
            TypeOperator::ImplicitCoercionToUnit => self.push_state(State::unit()),
            TypeOperator::ImplicitNotNull => {
                if value.is_null() {
                    let npe = self.module().prelude().null_pointer_exception;
                    self.throw_new(npe, None, Some(site))
                } else {
                    self.push_state(value)
                }
            }
        }
    }
}
