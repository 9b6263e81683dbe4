//! Explicit call stack of the work-list machine.
//!
//! A [`Frame`] is one active function call. Each frame holds a stack of
//! [`Scope`]s (the function body, nested blocks, loops and `try`
//! constructs), and each scope owns its pending instructions, its operand
//! values and the variables declared in it.
//!
//! When the top scope runs out of instructions it is dropped and its last
//! value (or `Unit`) moves to the enclosing scope; when a frame runs out of
//! scopes its result moves to the caller's current scope. The result of
//! the root frame is the result of the run.
//!
//! # Budgets
//!
//! `max_stack` bounds the number of live frames (the root frame included)
//! and is checked by [`CallStack::push_frame`]. `max_commands` bounds the
//! number of instructions popped over the whole run and is checked before
//! every pop, so a budget of zero fails on the first instruction.

use ctfe_ir::{ExprId, FunctionId, TypeId, ValueId};
use smallvec::SmallVec;

use crate::errors::{command_budget_exceeded, empty_value_stack, invalid_state, stack_overflow, EvalResult};
use crate::instruction::Instruction;
use crate::state::State;

/// Progress of a `try` construct.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TryStage {
    /// Running the protected body; exceptions may be caught.
    Body,
    /// Running a catch clause; only `finally` still applies.
    Catch,
    /// Running the `finally` block; nothing is intercepted.
    Finally,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ScopeKind {
    Function,
    Block,
    Loop { node: ExprId },
    Try { node: ExprId, stage: TryStage },
}

#[derive(Debug)]
pub struct Scope {
    pub kind: ScopeKind,
    instructions: Vec<Instruction>,
    values: Vec<State>,
    vars: SmallVec<[(ValueId, State); 4]>,
}

impl Scope {
    pub fn new(kind: ScopeKind) -> Self {
        Scope {
            kind,
            instructions: Vec::new(),
            values: Vec::new(),
            vars: SmallVec::new(),
        }
    }

    /// Drops pending work and operands, keeping the variables.
    pub fn reset(&mut self) {
        self.instructions.clear();
        self.values.clear();
    }

    fn lookup(&self, value: ValueId) -> Option<&State> {
        self.vars
            .iter()
            .rev()
            .find_map(|(id, state)| (*id == value).then_some(state))
    }

    fn lookup_mut(&mut self, value: ValueId) -> Option<&mut State> {
        self.vars
            .iter_mut()
            .rev()
            .find_map(|(id, state)| (*id == value).then_some(state))
    }
}

/// One active call.
#[derive(Debug)]
pub struct Frame {
    /// Function being executed; `None` for the root frame.
    pub function: Option<FunctionId>,
    /// Call expression that created the frame.
    pub call_site: Option<ExprId>,
    pub type_args: SmallVec<[TypeId; 2]>,
    /// Deliver `Unit` to the caller whatever the body produced.
    pub returns_unit: bool,
    scopes: Vec<Scope>,
}

impl Frame {
    pub fn new(function: Option<FunctionId>, call_site: Option<ExprId>) -> Self {
        Frame {
            function,
            call_site,
            type_args: SmallVec::new(),
            returns_unit: false,
            scopes: vec![Scope::new(ScopeKind::Function)],
        }
    }

    #[must_use]
    pub fn with_type_args(mut self, type_args: impl IntoIterator<Item = TypeId>) -> Self {
        self.type_args = type_args.into_iter().collect();
        self
    }

    #[must_use]
    pub fn returning_unit(mut self, returns_unit: bool) -> Self {
        self.returns_unit = returns_unit;
        self
    }

    #[inline]
    pub fn scopes(&self) -> &[Scope] {
        &self.scopes
    }

    #[inline]
    pub fn top_scope_mut(&mut self) -> Option<&mut Scope> {
        self.scopes.last_mut()
    }
}

/// Live frames plus run-wide budget counters.
///
/// # Example
///
/// ```ignore
/// let mut stack = CallStack::new(100, 10_000);
/// stack.push_frame(Frame::new(None, None))?;
/// stack.push_instruction(Instruction::Compound(root))?;
/// while let Some(instruction) = stack.next_instruction()? {
///     // evaluate
/// }
/// let result = stack.take_result();
/// ```
#[derive(Debug)]
pub struct CallStack {
    frames: Vec<Frame>,
    max_stack: usize,
    max_commands: u64,
    commands: u64,
    result: Option<State>,
}

impl CallStack {
    pub fn new(max_stack: usize, max_commands: u64) -> Self {
        CallStack {
            frames: Vec::new(),
            max_stack,
            max_commands,
            commands: 0,
            result: None,
        }
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Instructions popped so far.
    #[inline]
    pub fn commands(&self) -> u64 {
        self.commands
    }

    #[inline]
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    #[inline]
    pub fn current_frame(&self) -> Option<&Frame> {
        self.frames.last()
    }

    #[inline]
    pub fn current_frame_mut(&mut self) -> Option<&mut Frame> {
        self.frames.last_mut()
    }

    /// Pushes a call frame, failing without pushing when `max_stack`
    /// frames are already live.
    pub fn push_frame(&mut self, frame: Frame) -> EvalResult<()> {
        if self.frames.len() >= self.max_stack {
            return Err(stack_overflow(self.max_stack));
        }
        self.frames.push(frame);
        Ok(())
    }

    pub fn pop_frame(&mut self) -> Option<Frame> {
        self.frames.pop()
    }

    pub fn push_scope(&mut self, kind: ScopeKind) -> EvalResult<()> {
        let frame = self.frame_mut()?;
        frame.scopes.push(Scope::new(kind));
        Ok(())
    }

    pub fn pop_scope(&mut self) -> Option<Scope> {
        self.frames.last_mut().and_then(|frame| frame.scopes.pop())
    }

    /// Innermost scope of the current frame.
    pub fn scope_mut(&mut self) -> EvalResult<&mut Scope> {
        self.frame_mut()?
            .scopes
            .last_mut()
            .ok_or_else(|| invalid_state("frame has no active scope"))
    }

    pub fn push_instruction(&mut self, instruction: Instruction) -> EvalResult<()> {
        self.scope_mut()?.instructions.push(instruction);
        Ok(())
    }

    pub fn push_value(&mut self, state: State) -> EvalResult<()> {
        self.scope_mut()?.values.push(state);
        Ok(())
    }

    pub fn pop_value(&mut self) -> EvalResult<State> {
        self.scope_mut()?.values.pop().ok_or_else(empty_value_stack)
    }

    /// Pops `count` values, returned in push order.
    pub fn pop_values(&mut self, count: usize) -> EvalResult<Vec<State>> {
        let values = &mut self.scope_mut()?.values;
        if values.len() < count {
            return Err(empty_value_stack());
        }
        Ok(values.split_off(values.len() - count))
    }

    /// Hands a finished value to the current scope, or records it as the
    /// run's result when no frame is left.
    pub fn deliver(&mut self, state: State) -> EvalResult<()> {
        if self.frames.is_empty() {
            self.result = Some(state);
            Ok(())
        } else {
            self.push_value(state)
        }
    }

    /// Next instruction to execute, draining finished scopes and frames.
    ///
    /// Returns `Ok(None)` once the root frame has finished.
    pub fn next_instruction(&mut self) -> EvalResult<Option<Instruction>> {
        loop {
            let Some(frame) = self.frames.last_mut() else {
                return Ok(None);
            };
            let value = match frame.scopes.last_mut() {
                Some(scope) if !scope.instructions.is_empty() => {
                    if self.commands >= self.max_commands {
                        return Err(command_budget_exceeded(self.max_commands));
                    }
                    self.commands += 1;
                    return Ok(scope.instructions.pop());
                }
                Some(_) => {
                    let value = frame
                        .scopes
                        .pop()
                        .and_then(|mut scope| scope.values.pop())
                        .unwrap_or_else(State::unit);
                    if let Some(parent) = frame.scopes.last_mut() {
                        parent.values.push(value);
                        continue;
                    }
                    value
                }
                None => State::unit(),
            };
            let returns_unit = frame.returns_unit;
            self.frames.pop();
            self.deliver(if returns_unit { State::unit() } else { value })?;
        }
    }

    /// Binds `value` in the innermost scope.
    pub fn bind(&mut self, value: ValueId, state: State) -> EvalResult<()> {
        self.scope_mut()?.vars.push((value, state));
        Ok(())
    }

    /// Nearest binding of `value`, searching scopes innermost first and
    /// then the calling frames.
    pub fn load_state(&self, value: ValueId) -> Option<&State> {
        self.frames
            .iter()
            .rev()
            .flat_map(|frame| frame.scopes.iter().rev())
            .find_map(|scope| scope.lookup(value))
    }

    /// Binding of `value` in the current frame only.
    pub fn local_state(&self, value: ValueId) -> Option<&State> {
        self.frames
            .last()?
            .scopes
            .iter()
            .rev()
            .find_map(|scope| scope.lookup(value))
    }

    /// Replaces the nearest binding of `value`. Returns false when the
    /// value is not bound.
    pub fn rewrite_state(&mut self, value: ValueId, state: State) -> bool {
        let slot = self
            .frames
            .iter_mut()
            .rev()
            .flat_map(|frame| frame.scopes.iter_mut().rev())
            .find_map(|scope| scope.lookup_mut(value));
        match slot {
            Some(slot) => {
                *slot = state;
                true
            }
            None => false,
        }
    }

    /// Type argument `index` of the current call.
    pub fn type_argument(&self, index: u16) -> Option<TypeId> {
        self.frames
            .last()
            .and_then(|frame| frame.type_args.get(usize::from(index)).copied())
    }

    pub fn take_result(&mut self) -> Option<State> {
        self.result.take()
    }

    fn frame_mut(&mut self) -> EvalResult<&mut Frame> {
        self.frames
            .last_mut()
            .ok_or_else(|| invalid_state("no active frame"))
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
