//! End-to-end evaluation scenarios.
//!
//! Each test builds a small module with `ModuleBuilder`, interprets one
//! expression through the public API and checks the resulting state.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use ctfe_eval::{Configuration, FoldResult, InterpreterError, IrInterpreter, PrimitiveValue, State};
use ctfe_ir::{ClassKind, ExprId, ExprKind, ModuleBuilder, TypeId};
use pretty_assertions::assert_eq;

fn interpret(b: ModuleBuilder, expr: ExprId) -> Result<State, InterpreterError> {
    IrInterpreter::builder(b.finish()).build().interpret(expr)
}

/// `f1() = f2()`, ..., `fn() = 1`; returns the call of `f1`.
fn call_chain(b: &mut ModuleBuilder, depth: usize) -> ExprId {
    let functions: Vec<_> = (1..=depth)
        .map(|i| b.function(&format!("demo.f{i}"), &[], TypeId::INT))
        .collect();
    for pair in functions.windows(2) {
        let inner = b.call(pair[1], None, Vec::new());
        b.set_body(pair[0], inner);
    }
    let one = b.int(1);
    b.set_body(*functions.last().unwrap(), one);
    b.call(functions[0], None, Vec::new())
}

// -- Division by zero --

#[test]
fn integer_division_by_zero_is_an_uncaught_exception() {
    let mut b = ModuleBuilder::new("Scenario.kt");
    let five = b.int(5);
    let zero = b.int(0);
    let div = b.binary("div", five, zero, TypeId::INT);
    let State::Exception(exception) = interpret(b, div).unwrap() else {
        panic!("expected an uncaught exception");
    };
    assert!(exception.borrow().short_description().contains("division by zero"));
}

#[test]
fn double_division_by_zero_is_positive_infinity() {
    let mut b = ModuleBuilder::new("Scenario.kt");
    let five = b.double(5.0);
    let zero = b.double(0.0);
    let div = b.binary("div", five, zero, TypeId::DOUBLE);
    let state = interpret(b, div).unwrap();
    assert_eq!(state.as_value().and_then(PrimitiveValue::as_f64), Some(f64::INFINITY));
    assert_eq!(state.ty(), TypeId::DOUBLE);
}

// -- try/catch with a user exception --

#[test]
fn user_exception_is_caught_and_its_message_read() {
    let mut b = ModuleBuilder::new("Scenario.kt");
    let prelude = b.prelude();
    let class = b.class("demo.E", ClassKind::Class, Some(prelude.exception));
    let ctor = b.constructor(class, &[("message", TypeId::STRING)]);
    let base = b.prelude_overload("kotlin.Exception.<init>", &[TypeId::NULLABLE_STRING]);
    let message = b.get(b.param(ctor, 0));
    let delegation = b.delegate(base, vec![message]);
    let init = b.instance_init(class);
    let body = b.block(vec![delegation, init]);
    b.set_body(ctor, body);

    let x = b.string("x");
    let raised = b.construct(ctor, vec![x]);
    let throw = b.throw(raised);
    let e = b.catch_parameter("e", class);
    let caught = b.get(e);
    let read = b.get_field(prelude.throwable_message, Some(caught));
    let attempt = b.try_catch(throw, vec![(e, read)], None);

    let state = interpret(b, attempt).unwrap();
    assert_eq!(state.as_str(), Some("x"));
}

#[test]
fn exception_thrown_in_a_callee_is_caught_by_the_caller() {
    let mut b = ModuleBuilder::new("Scenario.kt");
    let prelude = b.prelude();
    let fail = b.function("demo.fail", &[], TypeId::INT);
    let ctor = b.prelude_overload("kotlin.IllegalArgumentException.<init>", &[TypeId::NULLABLE_STRING]);
    let text = b.string("nope");
    let raised = b.construct(ctor, vec![text]);
    let throw = b.throw(raised);
    b.set_body(fail, throw);

    let call = b.call(fail, None, Vec::new());
    let e = b.catch_parameter("e", prelude.runtime_exception);
    let fallback = b.int(-1);
    let attempt = b.try_catch(call, vec![(e, fallback)], None);
    let state = interpret(b, attempt).unwrap();
    assert_eq!(state.as_value().and_then(PrimitiveValue::as_i32), Some(-1));
}

// -- Singleton memoization --

#[test]
fn enum_references_in_one_run_are_identical() {
    let mut b = ModuleBuilder::new("Scenario.kt");
    let class = b.enum_class("demo.Direction");
    b.default_constructor(class, &[]);
    let north = b.enum_entry(class, "NORTH", None, Vec::new());
    b.enum_entry(class, "SOUTH", None, Vec::new());
    let first = b.get_enum(north);
    let second = b.get_enum(north);
    let array = b.array_of(TypeId::ANY);
    let both = b.vararg(vec![first, second], array);

    let state = interpret(b, both).unwrap();
    let storage = state.as_value().and_then(PrimitiveValue::as_array).unwrap();
    let elements = storage.borrow();
    assert_eq!(elements.len(), 2);
    assert!(elements[0].same_ref(&elements[1]));
}

#[test]
fn enum_entry_survives_between_runs() {
    let mut b = ModuleBuilder::new("Scenario.kt");
    let class = b.enum_class("demo.Direction");
    b.default_constructor(class, &[]);
    let north = b.enum_entry(class, "NORTH", None, Vec::new());
    let read = b.get_enum(north);
    let mut interpreter = IrInterpreter::builder(b.finish()).build();
    let first = interpreter.interpret(read).unwrap();
    let second = interpreter.interpret(read).unwrap();
    assert!(first.same_ref(&second));
}

// -- Unsupported code --

#[test]
fn unsupported_call_names_the_function() {
    let mut b = ModuleBuilder::new("Scenario.kt");
    let f = b.function("demo.readConfig", &[("key", TypeId::STRING)], TypeId::STRING);
    let key = b.string("home");
    let call = b.call(f, None, vec![key]);
    let err = interpret(b, call).unwrap_err();
    assert_eq!(
        err,
        InterpreterError::UnsupportedCall {
            function: "demo.readConfig".to_owned()
        }
    );
    assert!(err.to_string().contains("demo.readConfig"));
}

// -- Budgets --

#[test]
fn stack_limit_admits_exactly_max_stack_frames() {
    let mut b = ModuleBuilder::new("Scenario.kt");
    let call = call_chain(&mut b, 4);
    let module = b.finish();

    // Root frame plus four nested calls.
    let config = Configuration::default().with_max_stack(5);
    let mut fits = IrInterpreter::builder(module.clone()).config(config).build();
    let state = fits.interpret(call).unwrap();
    assert_eq!(state.as_value().and_then(PrimitiveValue::as_i32), Some(1));

    let config = Configuration::default().with_max_stack(4);
    let mut overflows = IrInterpreter::builder(module).config(config).build();
    assert_eq!(
        overflows.interpret(call).unwrap_err(),
        InterpreterError::StackOverflow { limit: 4 }
    );
}

#[test]
fn zero_command_budget_fails_before_any_work() {
    let mut b = ModuleBuilder::new("Scenario.kt");
    let two = b.int(2);
    let three = b.int(3);
    let sum = b.binary("plus", two, three, TypeId::INT);
    let config = Configuration::default().with_max_commands(0);
    let mut interpreter = IrInterpreter::builder(b.finish()).config(config).build();
    assert_eq!(
        interpreter.interpret(sum).unwrap_err(),
        InterpreterError::CommandBudgetExceeded { limit: 0 }
    );
}

// -- Library surface --

#[test]
fn require_failure_throws_illegal_argument() {
    let mut b = ModuleBuilder::new("Scenario.kt");
    let require = b.prelude_function("kotlin.require");
    let no = b.boolean(false);
    let call = b.call(require, None, vec![no]);
    let State::Exception(exception) = interpret(b, call).unwrap() else {
        panic!("expected an exception");
    };
    assert_eq!(
        exception.borrow().render(),
        "kotlin.IllegalArgumentException: Failed requirement."
    );
}

#[test]
fn string_builder_appends_through_the_native_bridge() {
    let mut b = ModuleBuilder::new("Scenario.kt");
    let sb_class = b.prelude().string_builder;
    let ctor = b.prelude_overload("kotlin.text.StringBuilder.<init>", &[]);
    let append_str = b.prelude_overload("kotlin.text.StringBuilder.append", &[TypeId::NULLABLE_STRING]);
    let append_int = b.prelude_overload("kotlin.text.StringBuilder.append", &[TypeId::INT]);
    let to_string = b.module().find_function("kotlin.text.StringBuilder.toString", &[]).unwrap();
    let sb_ty = b.module().class(sb_class).ty;

    let builder = b.value("sb", sb_ty);
    let created = b.construct(ctor, Vec::new());
    let declare = b.var(builder, Some(created));
    let receiver = b.get(builder);
    let text = b.string("n=");
    let first = b.call(append_str, Some(receiver), vec![text]);
    let receiver = b.get(builder);
    let seven = b.int(7);
    let second = b.call(append_int, Some(receiver), vec![seven]);
    let receiver = b.get(builder);
    let render = b.call(to_string, Some(receiver), Vec::new());
    let program = b.block(vec![declare, first, second, render]);

    assert_eq!(interpret(b, program).unwrap().as_str(), Some("n=7"));
}

#[test]
fn folding_a_long_expression_yields_a_long_constant() {
    let mut b = ModuleBuilder::new("Scenario.kt");
    let big = b.long(i64::MAX);
    let one = b.int(1);
    let sum = b.binary("plus", big, one, TypeId::LONG);
    let mut interpreter = IrInterpreter::builder(b.finish()).build();
    let FoldResult::Constant(node) = interpreter.fold(sum).unwrap() else {
        panic!("expected a constant");
    };
    let module = interpreter.environment().module();
    assert_eq!(module.kind(node), ExprKind::Const(ctfe_ir::ConstValue::Long(i64::MIN)));
    assert_eq!(module.expr(node).ty, TypeId::LONG);
}
