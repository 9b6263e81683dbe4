use super::*;
use crate::errors::InterpreterError;
use crate::state::PrimitiveValue;
use ctfe_ir::ExprId;
use pretty_assertions::assert_eq;

fn int(state: &State) -> i32 {
    state.as_value().and_then(PrimitiveValue::as_i32).unwrap()
}

#[test]
fn frame_limit_counts_the_root_frame() {
    let mut stack = CallStack::new(2, 100);
    stack.push_frame(Frame::new(None, None)).unwrap();
    stack.push_frame(Frame::new(None, None)).unwrap();
    let err = stack.push_frame(Frame::new(None, None)).unwrap_err();
    assert_eq!(err, InterpreterError::StackOverflow { limit: 2 });
    assert_eq!(stack.depth(), 2);
}

#[test]
fn zero_command_budget_fails_on_first_pop() {
    let mut stack = CallStack::new(10, 0);
    stack.push_frame(Frame::new(None, None)).unwrap();
    stack.push_instruction(Instruction::Simple(ExprId::new(0))).unwrap();
    let err = stack.next_instruction().unwrap_err();
    assert_eq!(err, InterpreterError::CommandBudgetExceeded { limit: 0 });
}

#[test]
fn instructions_pop_in_lifo_order_and_count() {
    let mut stack = CallStack::new(10, 10);
    stack.push_frame(Frame::new(None, None)).unwrap();
    stack.push_instruction(Instruction::Simple(ExprId::new(1))).unwrap();
    stack.push_instruction(Instruction::Compound(ExprId::new(2))).unwrap();
    assert!(matches!(
        stack.next_instruction().unwrap(),
        Some(Instruction::Compound(id)) if id == ExprId::new(2)
    ));
    assert!(matches!(
        stack.next_instruction().unwrap(),
        Some(Instruction::Simple(id)) if id == ExprId::new(1)
    ));
    assert_eq!(stack.commands(), 2);
}

#[test]
fn drained_scope_moves_last_value_to_parent() {
    let mut stack = CallStack::new(10, 10);
    stack.push_frame(Frame::new(None, None)).unwrap();
    stack.push_scope(ScopeKind::Block).unwrap();
    stack.push_value(State::int(1)).unwrap();
    stack.push_value(State::int(2)).unwrap();
    assert!(stack.next_instruction().unwrap().is_none());
    assert_eq!(int(&stack.take_result().unwrap()), 2);
}

#[test]
fn finished_frame_delivers_to_caller() {
    let mut stack = CallStack::new(10, 10);
    stack.push_frame(Frame::new(None, None)).unwrap();
    stack.push_frame(Frame::new(None, None)).unwrap();
    stack.push_value(State::int(7)).unwrap();
    stack.push_instruction(Instruction::Simple(ExprId::new(0))).unwrap();

    // Pending work in the callee comes first.
    assert!(stack.next_instruction().unwrap().is_some());
    assert_eq!(stack.depth(), 2);
    assert!(stack.next_instruction().unwrap().is_none());
    assert_eq!(int(&stack.take_result().unwrap()), 7);
}

#[test]
fn unit_returning_frame_discards_its_value() {
    let mut stack = CallStack::new(10, 10);
    stack.push_frame(Frame::new(None, None)).unwrap();
    stack
        .push_frame(Frame::new(None, None).returning_unit(true))
        .unwrap();
    stack.push_value(State::int(7)).unwrap();
    stack.push_instruction(Instruction::Simple(ExprId::new(0))).unwrap();
    stack.next_instruction().unwrap();
    stack.next_instruction().unwrap();
    assert!(stack.take_result().unwrap().is_unit());
}

#[test]
fn lookup_prefers_nearest_binding_and_sees_callers() {
    let x = ValueId::new(0);
    let y = ValueId::new(1);
    let mut stack = CallStack::new(10, 10);
    stack.push_frame(Frame::new(None, None)).unwrap();
    stack.bind(x, State::int(1)).unwrap();
    stack.bind(y, State::int(10)).unwrap();
    stack.push_frame(Frame::new(None, None)).unwrap();
    stack.push_scope(ScopeKind::Block).unwrap();
    stack.bind(x, State::int(2)).unwrap();

    assert_eq!(int(stack.load_state(x).unwrap()), 2);
    assert_eq!(int(stack.load_state(y).unwrap()), 10);

    assert!(stack.rewrite_state(y, State::int(11)));
    assert_eq!(int(stack.load_state(y).unwrap()), 11);
    assert!(!stack.rewrite_state(ValueId::new(9), State::unit()));
    assert!(stack.local_state(y).is_none());
    assert_eq!(int(stack.local_state(x).unwrap()), 2);
}

#[test]
fn pop_values_keeps_push_order() {
    let mut stack = CallStack::new(10, 10);
    stack.push_frame(Frame::new(None, None)).unwrap();
    for i in 0..3 {
        stack.push_value(State::int(i)).unwrap();
    }
    let values: Vec<i32> = stack.pop_values(2).unwrap().iter().map(int).collect();
    assert_eq!(values, vec![1, 2]);
    assert!(stack.pop_values(5).is_err());
}
