//! Work-list interpreter for lowered IR.
//!
//! # Architecture
//!
//! Evaluation never recurses on the host stack. The interpreter pops one
//! [`Instruction`] at a time from the current scope of the current frame:
//!
//! - `Compound(e)` decomposes `e` in `unwind.rs`: it pushes a terminal
//!   `Simple(e)` and then the children, so the children run first and in
//!   source order.
//! - `Simple(e)` consumes the children's values in `simple.rs` and pushes
//!   exactly one value, or starts an unwind.
//! - `Custom` runs a host step (binding a default argument, storing an
//!   initialized field, resuming after `finally`).
//!
//! Calls push a frame and a `Custom` interception step at its bottom; once
//! the defaults are bound the interceptor picks the evaluation path
//! (`call.rs`, `crate::interceptor`).
//!
//! # Non-local exits
//!
//! `return`, `break`, `continue` and `throw` become an [`Exit`] that
//! `control.rs` propagates scope by scope: loops consume their own
//! `break`/`continue`, `try` scopes match catch clauses and run `finally`
//! blocks, function scopes consume returns that target them.
//!
//! # Borrowing
//!
//! The module lives in the [`Environment`] behind a `RefCell`. Helpers
//! copy what they need out of a short borrow before pushing work, and
//! nothing holds a module borrow across a call that may synthesize code.

mod builder;
mod call;
mod control;
mod exceptions;
mod objects;
mod result;
mod simple;
mod strings;
mod types;
mod unwind;

pub use builder::InterpreterBuilder;
pub use result::FoldResult;

pub(crate) use call::CallRequest;
use objects::PendingSingletons;
pub(crate) use control::Exit;
pub(crate) use strings::identity_hash;

use std::cell::Ref;

use ctfe_ir::{ExprId, FunctionId, IrModule, Name, TypeId, TypeKind, ValueId};
use tracing::{instrument, trace};

use crate::environment::Environment;
use crate::errors::{invalid_state, type_mismatch, unbound_value, EvalResult};
use crate::instruction::Instruction;
use crate::stack::{CallStack, Frame};
use crate::state::State;

/// Pre-interned member names for builtin and reflective dispatch.
///
/// Interned once at construction so dispatch compares `Name`s instead of
/// strings.
#[derive(Clone, Copy)]
pub(crate) struct MemberNames {
    pub(crate) range_to: Name,
    pub(crate) to_string: Name,
    pub(crate) equals: Name,
    pub(crate) plus: Name,
    pub(crate) invoke: Name,
    pub(crate) get_name: Name,
}

impl MemberNames {
    fn new(module: &IrModule) -> Self {
        Self {
            range_to: module.intern("rangeTo"),
            to_string: module.intern("toString"),
            equals: module.intern("equals"),
            plus: module.intern("plus"),
            invoke: module.intern("invoke"),
            get_name: module.intern("<get-name>"),
        }
    }
}

/// Folds IR expressions to constants.
///
/// # Example
///
/// ```ignore
/// let mut interpreter = InterpreterBuilder::new(module).build();
/// let state = interpreter.interpret(expr)?;
/// assert_eq!(state.as_value().and_then(PrimitiveValue::as_i32), Some(3));
/// ```
pub struct IrInterpreter {
    env: Environment,
    stack: CallStack,
    names: MemberNames,
    pending: PendingSingletons,
}

impl IrInterpreter {
    pub fn new(env: Environment) -> Self {
        let config = *env.config();
        let names = MemberNames::new(&env.module());
        IrInterpreter {
            env,
            stack: CallStack::new(config.max_stack, config.max_commands),
            names,
            pending: PendingSingletons::default(),
        }
    }

    pub fn builder(module: IrModule) -> InterpreterBuilder {
        InterpreterBuilder::new(module)
    }

    #[inline]
    pub fn environment(&self) -> &Environment {
        &self.env
    }

    /// A fresh interpreter sharing this one's environment and memo tables.
    #[must_use]
    pub fn copy_with_new_call_stack(&self) -> Self {
        IrInterpreter::new(self.env.clone())
    }

    /// Evaluates `expr` to a state.
    ///
    /// An uncaught exception of the evaluated program is an ordinary
    /// [`State::Exception`] result; `Err` is reserved for budget
    /// violations and code the interpreter cannot evaluate.
    #[instrument(level = "debug", skip(self))]
    pub fn interpret(&mut self, expr: ExprId) -> EvalResult<State> {
        let config = *self.env.config();
        self.stack = CallStack::new(config.max_stack, config.max_commands);
        self.pending.clear();
        self.stack.push_frame(Frame::new(None, None))?;
        self.stack.push_instruction(Instruction::Compound(expr))?;
        let outcome = self.run();
        // Singletons whose constructor did not return are never published.
        self.pending.clear();
        outcome?;
        trace!(commands = self.stack.commands(), "evaluation finished");
        self.stack
            .take_result()
            .ok_or_else(|| invalid_state("evaluation finished without a result"))
    }

    fn run(&mut self) -> EvalResult<()> {
        while let Some(instruction) = self.stack.next_instruction()? {
            trace!(?instruction, depth = self.stack.depth());
            match instruction {
                Instruction::Simple(expr) => self.eval_simple(expr)?,
                Instruction::Compound(expr) => self.unwind(expr)?,
                Instruction::Custom { action, .. } => action(self)?,
            }
        }
        Ok(())
    }

    // Stack helpers

    #[inline]
    pub(crate) fn module(&self) -> Ref<'_, IrModule> {
        self.env.module()
    }

    #[inline]
    pub(crate) fn push(&mut self, instruction: Instruction) -> EvalResult<()> {
        self.stack.push_instruction(instruction)
    }

    #[inline]
    pub(crate) fn push_compound(&mut self, expr: ExprId) -> EvalResult<()> {
        self.stack.push_instruction(Instruction::Compound(expr))
    }

    #[inline]
    pub(crate) fn push_state(&mut self, state: State) -> EvalResult<()> {
        self.stack.push_value(state)
    }

    #[inline]
    pub(crate) fn pop_state(&mut self) -> EvalResult<State> {
        self.stack.pop_value()
    }

    pub(crate) fn pop_states(&mut self, count: usize) -> EvalResult<Vec<State>> {
        self.stack.pop_values(count)
    }

    /// Step that drops the value on top of the stack.
    pub(crate) fn discard() -> Instruction {
        Instruction::custom("discard", |interp| interp.pop_state().map(drop))
    }

    pub(crate) fn bind(&mut self, value: ValueId, state: State) -> EvalResult<()> {
        self.stack.bind(value, state)
    }

    /// Nearest binding of `value` in the current or a calling frame.
    pub(crate) fn load(&self, value: ValueId) -> EvalResult<State> {
        self.stack
            .load_state(value)
            .cloned()
            .ok_or_else(|| self.unbound(value))
    }

    /// Binding of `value` in the current frame.
    pub(crate) fn load_local(&self, value: ValueId) -> EvalResult<State> {
        self.stack
            .local_state(value)
            .cloned()
            .ok_or_else(|| self.unbound(value))
    }

    fn unbound(&self, value: ValueId) -> crate::errors::InterpreterError {
        let module = self.module();
        unbound_value(module.name(module.value(value).name))
    }

    pub(crate) fn pop_bool(&mut self) -> EvalResult<bool> {
        let state = self.pop_state()?;
        state
            .as_bool()
            .ok_or_else(|| type_mismatch("Boolean", state.kind_name()))
    }

    /// Function of the current frame.
    pub(crate) fn current_function(&self) -> EvalResult<FunctionId> {
        self.stack
            .current_frame()
            .and_then(|frame| frame.function)
            .ok_or_else(|| invalid_state("no function is executing"))
    }

    /// `this` of the constructor or member running in the current frame.
    pub(crate) fn current_this(&self) -> EvalResult<(ValueId, State)> {
        let function = self.current_function()?;
        let this = self
            .module()
            .function(function)
            .dispatch_receiver
            .ok_or_else(|| invalid_state("current function has no receiver"))?;
        Ok((this, self.load_local(this)?))
    }

    /// `ty` with type parameters replaced by the current call's type
    /// arguments, one level into arrays.
    pub(crate) fn substitute(&self, ty: TypeId) -> TypeId {
        let kind = self.module().types.kind(ty);
        match kind {
            TypeKind::Parameter(index) => self.stack.type_argument(index).unwrap_or(ty),
            TypeKind::Array(element) => {
                let TypeKind::Parameter(index) = self.module().types.kind(element) else {
                    return ty;
                };
                match self.stack.type_argument(index) {
                    Some(actual) => self.env.module_mut().types.array_of(actual),
                    None => ty,
                }
            }
            _ => ty,
        }
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
