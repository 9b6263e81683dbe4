//! `toString()` of arbitrary states.
//!
//! Objects with a user `toString` are stringified by calling it, so the
//! string may arrive only after a frame completes. Callers push a step
//! that consumes the string instead of reading it back immediately.

use std::rc::Rc;

use ctfe_ir::ExprId;

use super::{CallRequest, IrInterpreter};
use crate::builtins;
use crate::errors::{invalid_state, EvalResult};
use crate::instruction::Instruction;
use crate::state::{PrimitiveValue, State};

/// Identity hash of a reference state, derived from its address.
pub(crate) fn identity_hash(state: &State) -> i32 {
    let addr = match state {
        State::Complex(object) => object.addr(),
        State::Exception(exception) => exception.addr(),
        State::Wrapper(wrapper) => wrapper.object().addr(),
        State::Function(function) => Rc::as_ptr(function) as usize,
        State::Primitive(p) => p.value.as_array().map_or(0, |storage| storage.addr()),
    };
    let addr = addr as u64;
    (addr ^ (addr >> 32)) as i32
}

impl IrInterpreter {
    /// Pushes the string form of `state`, possibly by calling its
    /// `toString` override.
    pub(crate) fn push_string_of(&mut self, state: State, site: Option<ExprId>) -> EvalResult<()> {
        match &state {
            State::Primitive(p) => {
                if let PrimitiveValue::Array(storage) = &p.value {
                    let elements = storage.borrow().clone();
                    return self.push_array_string(elements, site);
                }
                let text = builtins::render(&p.value, self.env.platform())
                    .ok_or_else(|| invalid_state("primitive without a string form"))?;
                self.push_state(State::string(&text))
            }
            State::Wrapper(wrapper) => {
                let text = wrapper.object().render();
                self.push_state(State::string(&text))
            }
            State::Function(function) => {
                let name = {
                    let module = self.module();
                    module.name(module.function(function.function).name)
                };
                self.push_state(State::string(&format!("fun {name}")))
            }
            State::Complex(_) | State::Exception(_) => {
                let Some(class) = state.class() else {
                    return Err(invalid_state("object without a class"));
                };
                let (target, builtin) = {
                    let module = self.module();
                    let prelude = module.prelude();
                    let target = module.resolve_override(class, prelude.any_to_string);
                    (target, target == prelude.any_to_string || target == prelude.throwable_to_string)
                };
                if builtin {
                    let text = self.default_string(&state);
                    self.push_state(State::string(&text))
                } else {
                    self.enter_call(CallRequest::new(target, site).with_dispatch(state))
                }
            }
        }
    }

    /// `[a, b, c]` with each element stringified in order.
    fn push_array_string(&mut self, elements: Vec<State>, site: Option<ExprId>) -> EvalResult<()> {
        let count = elements.len();
        self.push(Instruction::custom("join elements", move |interp| {
            let parts = interp.pop_states(count)?;
            let parts: Vec<&str> = parts.iter().map(|part| part.as_str().unwrap_or_default()).collect();
            interp.push_state(State::string(&format!("[{}]", parts.join(", "))))
        }))?;
        for element in elements.into_iter().rev() {
            self.push(Instruction::custom("stringify element", move |interp| {
                interp.push_string_of(element, site)
            }))?;
        }
        Ok(())
    }

    /// `Any.toString()` and `Throwable.toString()`.
    pub(crate) fn default_string(&self, state: &State) -> String {
        match state {
            State::Exception(exception) => exception.borrow().render(),
            State::Complex(object) => {
                let object = object.borrow();
                if let Some(wrapper) = object.super_wrapper() {
                    return wrapper.object().render();
                }
                let module = self.module();
                format!(
                    "{}@{:x}",
                    module.class_fq_name(object.class()),
                    identity_hash(state) as u32
                )
            }
            State::Wrapper(wrapper) => wrapper.object().render(),
            State::Function(_) | State::Primitive(_) => {
                let hash = identity_hash(state) as u32;
                let module = self.module();
                format!("{}@{hash:x}", module.type_name(state.ty()))
            }
        }
    }
}
