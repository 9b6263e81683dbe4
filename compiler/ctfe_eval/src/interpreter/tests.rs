use super::*;
use crate::config::{Configuration, Platform};
use crate::errors::InterpreterError;
use crate::state::PrimitiveValue;
use ctfe_ir::{CallParts, ClassKind, ConstValue, ExprKind, ModuleBuilder};
use pretty_assertions::assert_eq;

fn run(b: ModuleBuilder, expr: ExprId) -> EvalResult<State> {
    IrInterpreter::builder(b.finish()).build().interpret(expr)
}

fn run_with(b: ModuleBuilder, config: Configuration, expr: ExprId) -> EvalResult<State> {
    IrInterpreter::builder(b.finish()).config(config).build().interpret(expr)
}

fn int(state: &State) -> i32 {
    state.as_value().and_then(PrimitiveValue::as_i32).unwrap()
}

fn text(state: &State) -> String {
    state.as_str().unwrap().to_owned()
}

/// `fun forever(): Int = forever()` and a call to it.
fn endless_recursion(b: &mut ModuleBuilder) -> ExprId {
    let f = b.function("demo.forever", &[], TypeId::INT);
    let body = b.call(f, None, Vec::new());
    b.set_body(f, body);
    b.call(f, None, Vec::new())
}

// Expressions

#[test]
fn arithmetic_follows_call_order() {
    let mut b = ModuleBuilder::new("Test.kt");
    let one = b.int(1);
    let two = b.int(2);
    let three = b.int(3);
    let product = b.binary("times", two, three, TypeId::INT);
    let sum = b.binary("plus", one, product, TypeId::INT);
    assert_eq!(int(&run(b, sum).unwrap()), 7);
}

#[test]
fn int_overflow_wraps() {
    let mut b = ModuleBuilder::new("Test.kt");
    let max = b.int(i32::MAX);
    let one = b.int(1);
    let sum = b.binary("plus", max, one, TypeId::INT);
    assert_eq!(int(&run(b, sum).unwrap()), i32::MIN);
}

#[test]
fn string_template_stringifies_each_part() {
    let mut b = ModuleBuilder::new("Test.kt");
    let prefix = b.string("n=");
    let n = b.int(42);
    let flag = b.boolean(true);
    let template = b.concat(vec![prefix, n, flag]);
    assert_eq!(text(&run(b, template).unwrap()), "n=42true");
}

#[test]
fn when_takes_first_true_branch() {
    let mut b = ModuleBuilder::new("Test.kt");
    let no = b.boolean(false);
    let yes = b.boolean(true);
    let first = b.string("first");
    let second = b.string("second");
    let third = b.string("third");
    let also_yes = b.boolean(true);
    let when = b.when(vec![(no, first), (yes, second), (also_yes, third)], TypeId::STRING);
    assert_eq!(text(&run(b, when).unwrap()), "second");
}

#[test]
fn when_without_a_match_yields_unit() {
    let mut b = ModuleBuilder::new("Test.kt");
    let no = b.boolean(false);
    let one = b.int(1);
    let when = b.when(vec![(no, one)], TypeId::UNIT);
    assert!(run(b, when).unwrap().is_unit());
}

#[test]
fn while_loop_with_break_accumulates() {
    let mut b = ModuleBuilder::new("Test.kt");
    let i = b.mutable_value("i", TypeId::INT);
    let sum = b.mutable_value("sum", TypeId::INT);
    let zero = b.int(0);
    let init_i = b.var(i, Some(zero));
    let zero = b.int(0);
    let init_sum = b.var(sum, Some(zero));
    let lp = b.while_loop(|b, lp| {
        let always = b.boolean(true);
        let current = b.get(i);
        let five = b.int(5);
        let done = b.eq(current, five);
        let exit = b.break_loop(lp);
        let nothing = b.block(Vec::new());
        let check = b.if_else(done, exit, nothing);
        let acc = b.get(sum);
        let current = b.get(i);
        let added = b.binary("plus", acc, current, TypeId::INT);
        let store = b.set(sum, added);
        let current = b.get(i);
        let next = b.unary("inc", current, TypeId::INT);
        let step = b.set(i, next);
        let body = b.block(vec![check, store, step]);
        (always, body)
    });
    let result = b.get(sum);
    let program = b.block(vec![init_i, init_sum, lp, result]);
    assert_eq!(int(&run(b, program).unwrap()), 10);
}

#[test]
fn do_while_runs_body_before_condition() {
    let mut b = ModuleBuilder::new("Test.kt");
    let count = b.mutable_value("count", TypeId::INT);
    let zero = b.int(0);
    let init = b.var(count, Some(zero));
    let lp = b.do_while_loop(|b, _| {
        let current = b.get(count);
        let next = b.unary("inc", current, TypeId::INT);
        let body = b.set(count, next);
        let never = b.boolean(false);
        (body, never)
    });
    let result = b.get(count);
    let program = b.block(vec![init, lp, result]);
    assert_eq!(int(&run(b, program).unwrap()), 1);
}

// Calls

#[test]
fn default_argument_sees_earlier_parameters() {
    let mut b = ModuleBuilder::new("Test.kt");
    let f = b.function("demo.scaled", &[("a", TypeId::INT), ("factor", TypeId::INT)], TypeId::INT);
    let a = b.get(b.param(f, 0));
    let two = b.int(2);
    let default = b.binary("times", a, two, TypeId::INT);
    b.set_default(f, 1, default);
    let a = b.get(b.param(f, 0));
    let factor = b.get(b.param(f, 1));
    let body = b.binary("plus", a, factor, TypeId::INT);
    b.set_body(f, body);
    let three = b.int(3);
    let call = b.call_with(
        f,
        CallParts {
            args: vec![Some(three), None],
            ..CallParts::default()
        },
    );
    assert_eq!(int(&run(b, call).unwrap()), 9);
}

#[test]
fn return_leaves_the_function_early() {
    let mut b = ModuleBuilder::new("Test.kt");
    let f = b.function("demo.early", &[], TypeId::INT);
    let one = b.int(1);
    let ret = b.ret(f, one);
    let two = b.int(2);
    let body = b.block(vec![ret, two]);
    b.set_body(f, body);
    let call = b.call(f, None, Vec::new());
    assert_eq!(int(&run(b, call).unwrap()), 1);
}

#[test]
fn virtual_call_dispatches_to_override() {
    let mut b = ModuleBuilder::new("Test.kt");
    let base = b.class("demo.Shape", ClassKind::Class, None);
    b.default_constructor(base, &[]);
    let area = b.method(base, "area", &[], TypeId::INT);
    let zero = b.int(0);
    b.set_body(area, zero);
    let square = b.class("demo.Square", ClassKind::Class, Some(base));
    let ctor = b.default_constructor(square, &[]);
    let square_area = b.method(square, "area", &[], TypeId::INT);
    let four = b.int(4);
    b.set_body(square_area, four);
    b.set_overrides(square_area, area);
    let object = b.construct(ctor, Vec::new());
    let call = b.call(area, Some(object), Vec::new());
    assert_eq!(int(&run(b, call).unwrap()), 4);
}

#[test]
fn user_to_string_is_called_from_templates() {
    let mut b = ModuleBuilder::new("Test.kt");
    let class = b.class("demo.Point", ClassKind::Class, None);
    let ctor = b.default_constructor(class, &[]);
    let to_string = b.method(class, "toString", &[], TypeId::STRING);
    let body = b.string("(1, 2)");
    b.set_body(to_string, body);
    let any_to_string = b.prelude().any_to_string;
    b.set_overrides(to_string, any_to_string);
    let point = b.construct(ctor, Vec::new());
    let prefix = b.string("p=");
    let template = b.concat(vec![prefix, point]);
    assert_eq!(text(&run(b, template).unwrap()), "p=(1, 2)");
}

#[test]
fn bodiless_function_is_unsupported() {
    let mut b = ModuleBuilder::new("Test.kt");
    let f = b.function("demo.external", &[], TypeId::INT);
    let call = b.call(f, None, Vec::new());
    assert_eq!(
        run(b, call).unwrap_err(),
        InterpreterError::UnsupportedCall {
            function: "demo.external".to_owned()
        }
    );
}

#[test]
fn missing_argument_without_default_fails() {
    let mut b = ModuleBuilder::new("Test.kt");
    let f = b.function("demo.id", &[("x", TypeId::INT)], TypeId::INT);
    let x = b.get(b.param(f, 0));
    b.set_body(f, x);
    let call = b.call_with(
        f,
        CallParts {
            args: vec![None],
            ..CallParts::default()
        },
    );
    assert_eq!(
        run(b, call).unwrap_err(),
        InterpreterError::MissingArgument {
            function: "demo.id".to_owned(),
            parameter: "x".to_owned(),
        }
    );
}

// Budgets

#[test]
fn deep_recursion_overflows_the_stack() {
    let mut b = ModuleBuilder::new("Test.kt");
    let call = endless_recursion(&mut b);
    let config = Configuration::default().with_max_stack(20);
    assert_eq!(
        run_with(b, config, call).unwrap_err(),
        InterpreterError::StackOverflow { limit: 20 }
    );
}

#[test]
fn zero_command_budget_fails_immediately() {
    let mut b = ModuleBuilder::new("Test.kt");
    let one = b.int(1);
    let config = Configuration::default().with_max_commands(0);
    assert_eq!(
        run_with(b, config, one).unwrap_err(),
        InterpreterError::CommandBudgetExceeded { limit: 0 }
    );
}

#[test]
fn infinite_loop_exhausts_the_command_budget() {
    let mut b = ModuleBuilder::new("Test.kt");
    let lp = b.while_loop(|b, _| {
        let always = b.boolean(true);
        let body = b.block(Vec::new());
        (always, body)
    });
    let config = Configuration::default().with_max_commands(500);
    assert_eq!(
        run_with(b, config, lp).unwrap_err(),
        InterpreterError::CommandBudgetExceeded { limit: 500 }
    );
}

// Exceptions

#[test]
fn uncaught_exception_is_a_result() {
    let mut b = ModuleBuilder::new("Test.kt");
    let one = b.int(1);
    let zero = b.int(0);
    let div = b.binary("div", one, zero, TypeId::INT);
    let State::Exception(exception) = run(b, div).unwrap() else {
        panic!("expected an exception");
    };
    let exception = exception.borrow();
    assert_eq!(exception.fq_name(), "kotlin.ArithmeticException");
    assert!(exception.short_description().contains("division by zero"));
}

#[test]
fn catch_binds_the_exception_and_finally_runs() {
    let mut b = ModuleBuilder::new("Test.kt");
    let prelude = b.prelude();
    let ran = b.mutable_value("ran", TypeId::INT);
    let zero = b.int(0);
    let init = b.var(ran, Some(zero));

    let ctor = b.prelude_overload("kotlin.IllegalStateException.<init>", &[TypeId::NULLABLE_STRING]);
    let x = b.string("x");
    let exception = b.construct(ctor, vec![x]);
    let body = b.throw(exception);
    let e = b.catch_parameter("e", prelude.illegal_state_exception);
    let caught = b.get(e);
    let message = b.get_field(prelude.throwable_message, Some(caught));
    let one = b.int(1);
    let finally = b.set(ran, one);
    let attempt = b.try_catch(body, vec![(e, message)], Some(finally));

    let message = b.value("message", TypeId::NULLABLE_STRING);
    let bind = b.var(message, Some(attempt));
    let m = b.get(message);
    let r = b.get(ran);
    let result = b.concat(vec![m, r]);
    let program = b.block(vec![init, bind, result]);
    assert_eq!(text(&run(b, program).unwrap()), "x1");
}

#[test]
fn non_matching_catch_lets_the_exception_escape() {
    let mut b = ModuleBuilder::new("Test.kt");
    let prelude = b.prelude();
    let one = b.int(1);
    let zero = b.int(0);
    let body = b.binary("div", one, zero, TypeId::INT);
    let e = b.catch_parameter("e", prelude.illegal_argument_exception);
    let fallback = b.int(-1);
    let attempt = b.try_catch(body, vec![(e, fallback)], None);
    let state = run(b, attempt).unwrap();
    assert!(matches!(state, State::Exception(_)));
}

#[test]
fn finally_runs_while_returning() {
    let mut b = ModuleBuilder::new("Test.kt");
    let counter = b.static_field("counter", TypeId::INT, None);
    let f = b.function("demo.leave", &[], TypeId::INT);
    let seven = b.int(7);
    let ret = b.ret(f, seven);
    let eleven = b.int(11);
    let finally = b.set_field(counter, None, eleven);
    let attempt = b.try_catch(ret, Vec::new(), Some(finally));
    b.set_body(f, attempt);
    let call = b.call(f, None, Vec::new());
    let read = b.get_field(counter, None);
    let sum = b.binary("plus", call, read, TypeId::INT);
    assert_eq!(int(&run(b, sum).unwrap()), 18);
}

#[test]
fn user_exception_keeps_its_class_and_message() {
    let mut b = ModuleBuilder::new("Test.kt");
    let prelude = b.prelude();
    let class = b.class("demo.Boom", ClassKind::Class, Some(prelude.exception));
    let ctor = b.constructor(class, &[("reason", TypeId::STRING)]);
    let base = b.prelude_overload("kotlin.Exception.<init>", &[TypeId::NULLABLE_STRING]);
    let reason = b.get(b.param(ctor, 0));
    let delegation = b.delegate(base, vec![reason]);
    let init = b.instance_init(class);
    let body = b.block(vec![delegation, init]);
    b.set_body(ctor, body);

    let arg = b.string("bad input");
    let exception = b.construct(ctor, vec![arg]);
    let throw = b.throw(exception);
    let e = b.catch_parameter("e", prelude.exception);
    let caught = b.get(e);
    let prefix = b.string("caught ");
    let rendered = b.concat(vec![prefix, caught]);
    let attempt = b.try_catch(throw, vec![(e, rendered)], None);
    assert_eq!(text(&run(b, attempt).unwrap()), "caught demo.Boom: bad input");
}

#[test]
fn second_catch_clause_handles_what_the_first_skips() {
    let mut b = ModuleBuilder::new("Test.kt");
    let prelude = b.prelude();
    let ctor = b.prelude_overload("kotlin.IllegalStateException.<init>", &[TypeId::NULLABLE_STRING]);
    let x = b.string("x");
    let exception = b.construct(ctor, vec![x]);
    let body = b.throw(exception);
    let argument = b.catch_parameter("e", prelude.illegal_argument_exception);
    let one = b.int(1);
    let state = b.catch_parameter("e", prelude.illegal_state_exception);
    let two = b.int(2);
    let attempt = b.try_catch(body, vec![(argument, one), (state, two)], None);
    assert_eq!(int(&run(b, attempt).unwrap()), 2);
}

#[test]
fn uncaught_user_exception_records_the_throwing_frame() {
    let mut b = ModuleBuilder::new("Test.kt");
    let prelude = b.prelude();
    let class = b.class("demo.Boom", ClassKind::Class, Some(prelude.exception));
    let ctor = b.constructor(class, &[("reason", TypeId::STRING)]);
    let base = b.prelude_overload("kotlin.Exception.<init>", &[TypeId::NULLABLE_STRING]);
    let reason = b.get(b.param(ctor, 0));
    let delegation = b.delegate(base, vec![reason]);
    let init = b.instance_init(class);
    let body = b.block(vec![delegation, init]);
    b.set_body(ctor, body);

    let explode = b.function("demo.explode", &[], TypeId::NOTHING);
    b.at_line(7);
    let arg = b.string("late");
    let exception = b.construct(ctor, vec![arg]);
    let throw = b.throw(exception);
    b.set_body(explode, throw);
    b.at_line(12);
    let call = b.call(explode, None, Vec::new());

    let State::Exception(exception) = run(b, call).unwrap() else {
        panic!("expected an exception");
    };
    let exception = exception.borrow();
    assert_eq!(exception.fq_name(), "demo.Boom");
    assert_eq!(exception.long_description(), "demo.Boom: late\n\tat demo.explode(Test.kt:7)");
}

#[test]
fn error_node_throws() {
    let mut b = ModuleBuilder::new("Test.kt");
    let error = b.error("not lowered");
    let State::Exception(exception) = run(b, error).unwrap() else {
        panic!("expected an exception");
    };
    assert_eq!(exception.borrow().render(), "kotlin.Throwable: not lowered");
}

// Singletons

#[test]
fn enum_entries_are_memoized() {
    let mut b = ModuleBuilder::new("Test.kt");
    let class = b.enum_class("demo.Color");
    b.default_constructor(class, &[]);
    b.enum_entry(class, "RED", None, Vec::new());
    let green = b.enum_entry(class, "GREEN", None, Vec::new());
    let first = b.get_enum(green);
    let second = b.get_enum(green);
    let same = b.identical(first, second);
    let mut interpreter = IrInterpreter::builder(b.finish()).build();
    assert_eq!(interpreter.interpret(same).unwrap().as_bool(), Some(true));
    assert!(interpreter.environment().enum_entry(green).is_some());
}

#[test]
fn enum_entry_exposes_name_and_ordinal() {
    let mut b = ModuleBuilder::new("Test.kt");
    let prelude = b.prelude();
    let class = b.enum_class("demo.Color");
    b.default_constructor(class, &[]);
    b.enum_entry(class, "RED", None, Vec::new());
    let green = b.enum_entry(class, "GREEN", None, Vec::new());
    let entry = b.get_enum(green);
    let name = b.get_field(prelude.enum_name, Some(entry));
    let entry = b.get_enum(green);
    let ordinal = b.get_field(prelude.enum_ordinal, Some(entry));
    let template = b.concat(vec![name, ordinal]);
    assert_eq!(text(&run(b, template).unwrap()), "GREEN1");
}

#[test]
fn enum_value_of_finds_the_entry() {
    let mut b = ModuleBuilder::new("Test.kt");
    let class = b.enum_class("demo.Color");
    b.default_constructor(class, &[]);
    b.enum_entry(class, "RED", None, Vec::new());
    let green = b.enum_entry(class, "GREEN", None, Vec::new());
    let value_of = b.module().find_function("demo.Color.valueOf", &[TypeId::STRING]).unwrap();
    let name = b.string("GREEN");
    let found = b.call(value_of, None, vec![name]);
    let expected = b.get_enum(green);
    let same = b.identical(found, expected);
    assert_eq!(run(b, same).unwrap().as_bool(), Some(true));
}

#[test]
fn object_is_initialized_once() {
    let mut b = ModuleBuilder::new("Test.kt");
    let inits = b.static_field("inits", TypeId::INT, None);
    let zero = b.int(0);
    let reset = b.set_field(inits, None, zero);
    let object = b.class("demo.Registry", ClassKind::Object, None);
    b.default_constructor(object, &[]);
    let current = b.get_field(inits, None);
    let next = b.unary("inc", current, TypeId::INT);
    let bump = b.set_field(inits, None, next);
    b.init_block(object, bump);

    let first = b.get_object(object);
    let second = b.get_object(object);
    let count = b.get_field(inits, None);
    let program = b.block(vec![reset, first, second, count]);
    assert_eq!(int(&run(b, program).unwrap()), 1);
}

#[test]
fn object_shell_serves_const_fields() {
    let mut b = ModuleBuilder::new("Test.kt");
    let object = b.class("demo.Limits", ClassKind::Object, None);
    b.default_constructor(object, &[]);
    let value = b.int(64);
    let max = b.const_field(object, "MAX", value);
    let receiver = b.get_object(object);
    let read = b.get_field(max, Some(receiver));
    let config = Configuration::default().with_non_compile_time_objects(false);
    assert_eq!(int(&run_with(b, config, read).unwrap()), 64);
}

#[test]
fn copied_interpreter_shares_singletons() {
    let mut b = ModuleBuilder::new("Test.kt");
    let object = b.class("demo.Single", ClassKind::Object, None);
    b.default_constructor(object, &[]);
    let get = b.get_object(object);
    let mut interpreter = IrInterpreter::builder(b.finish()).build();
    let first = interpreter.interpret(get).unwrap();
    let mut copy = interpreter.copy_with_new_call_stack();
    let second = copy.interpret(get).unwrap();
    assert!(first.same_ref(&second));
}

#[test]
fn failed_object_initialization_is_retried() {
    let mut b = ModuleBuilder::new("Test.kt");
    let mode = b.static_field("mode", TypeId::INT, None);
    let object = b.class("demo.Cfg", ClassKind::Object, None);
    let current = b.get_field(mode, None);
    let one = b.int(1);
    let endless = b.eq(current, one);
    let overflow = endless_recursion(&mut b);
    let two = b.int(2);
    let initializer = b.if_else(endless, overflow, two);
    let y = b.field(object, "y", TypeId::INT, Some(initializer));
    b.default_constructor(object, &[]);

    let read = |b: &mut ModuleBuilder, value: i32| {
        let value = b.int(value);
        let set = b.set_field(mode, None, value);
        let receiver = b.get_object(object);
        let y = b.get_field(y, Some(receiver));
        b.block(vec![set, y])
    };
    let failing = read(&mut b, 1);
    let succeeding = read(&mut b, 0);
    let config = Configuration::default().with_max_stack(50);
    let mut interpreter = IrInterpreter::builder(b.finish()).config(config).build();
    assert_eq!(
        interpreter.interpret(failing).unwrap_err(),
        InterpreterError::StackOverflow { limit: 50 }
    );
    assert!(interpreter.environment().object(object).is_none());
    let mut copy = interpreter.copy_with_new_call_stack();
    assert_eq!(int(&copy.interpret(succeeding).unwrap()), 2);
}

#[test]
fn object_sees_itself_while_initializing() {
    let mut b = ModuleBuilder::new("Test.kt");
    let object = b.class("demo.Cfg", ClassKind::Object, None);
    let ty = b.class_type(object);
    let itself = b.get_object(object);
    let me = b.field(object, "me", ty, Some(itself));
    b.default_constructor(object, &[]);
    let receiver = b.get_object(object);
    let field = b.get_field(me, Some(receiver));
    let outside = b.get_object(object);
    let same = b.identical(field, outside);
    assert_eq!(run(b, same).unwrap().as_bool(), Some(true));
}

#[test]
fn enum_values_lists_entries_in_declaration_order() {
    let mut b = ModuleBuilder::new("Test.kt");
    let prelude = b.prelude();
    let class = b.enum_class("demo.Color");
    b.default_constructor(class, &[]);
    for name in ["RED", "GREEN", "BLUE"] {
        b.enum_entry(class, name, None, Vec::new());
    }
    let ty = b.class_type(class);
    let enum_values = b.prelude_function("kotlin.enumValues");
    let values = b.call_generic(enum_values, vec![ty], Vec::new());
    let State::Primitive(array) = run(b, values).unwrap() else {
        panic!("expected an array");
    };
    let entries = array.value.as_array().unwrap().borrow();
    let listed: Vec<(String, i32)> = entries
        .iter()
        .map(|entry| {
            let State::Complex(object) = entry else {
                panic!("expected an enum entry");
            };
            let object = object.borrow();
            (text(object.field(prelude.enum_name).unwrap()), int(object.field(prelude.enum_ordinal).unwrap()))
        })
        .collect();
    assert_eq!(
        listed,
        vec![("RED".to_owned(), 0), ("GREEN".to_owned(), 1), ("BLUE".to_owned(), 2)]
    );
}

// Arrays and ranges

/// `fun square(i: Int): Int = i * i` and `IntArray(size, ::square)`.
fn squares(b: &mut ModuleBuilder, size: i32) -> ExprId {
    let square = b.function("demo.square", &[("i", TypeId::INT)], TypeId::INT);
    let i = b.param(square, 0);
    let lhs = b.get(i);
    let rhs = b.get(i);
    let body = b.binary("times", lhs, rhs, TypeId::INT);
    b.set_body(square, body);
    let fn1 = b.function_type(1);
    let ctor = b.prelude_overload("kotlin.IntArray.<init>", &[TypeId::INT, fn1]);
    let size = b.int(size);
    let init = b.function_ref(square, None);
    b.construct(ctor, vec![size, init])
}

#[test]
fn array_initializer_runs_once_per_index() {
    let mut b = ModuleBuilder::new("Test.kt");
    let array = squares(&mut b, 4);
    let State::Primitive(array) = run(b, array).unwrap() else {
        panic!("expected an array");
    };
    let elements: Vec<i32> = array.value.as_array().unwrap().borrow().iter().map(int).collect();
    assert_eq!(elements, vec![0, 1, 4, 9]);
}

#[test]
fn huge_array_initializer_stops_at_the_command_budget() {
    let mut b = ModuleBuilder::new("Test.kt");
    let array = squares(&mut b, 20_000_000);
    let config = Configuration::default().with_max_commands(100);
    assert_eq!(
        run_with(b, config, array).unwrap_err(),
        InterpreterError::CommandBudgetExceeded { limit: 100 }
    );
}

#[test]
fn range_to_builds_an_int_range() {
    let mut b = ModuleBuilder::new("Test.kt");
    let range_class = b.prelude().range_class(TypeId::INT).unwrap();
    let range_ty = b.class_type(range_class);
    let field = |b: &ModuleBuilder, name: &str| {
        let module = b.module();
        module
            .class(range_class)
            .fields
            .iter()
            .copied()
            .find(|&f| module.name(module.field(f).name) == name)
            .unwrap()
    };
    let first = field(&b, "first");
    let last = field(&b, "last");
    let range_to = b.builtin_member(TypeId::INT, "rangeTo", &[TypeId::INT], range_ty);
    let range = b.value("range", range_ty);
    let one = b.int(1);
    let three = b.int(3);
    let made = b.call(range_to, Some(one), vec![three]);
    let bind = b.var(range, Some(made));
    let r = b.get(range);
    let lo = b.get_field(first, Some(r));
    let dots = b.string("..");
    let r = b.get(range);
    let hi = b.get_field(last, Some(r));
    let shown = b.concat(vec![lo, dots, hi]);
    let program = b.block(vec![bind, shown]);
    assert_eq!(text(&run(b, program).unwrap()), "1..3");
}

// Library calls

#[test]
fn trim_margin_rejects_a_blank_prefix() {
    let mut b = ModuleBuilder::new("Test.kt");
    let trim_margin = b.prelude_overload("kotlin.text.trimMargin", &[TypeId::STRING]);
    let receiver = b.string("  |a");
    let prefix = b.string(" ");
    let call = b.call_extension(trim_margin, receiver, vec![prefix]);
    let State::Exception(exception) = run(b, call).unwrap() else {
        panic!("expected an exception");
    };
    assert_eq!(
        exception.borrow().render(),
        "kotlin.IllegalArgumentException: marginPrefix must be non-blank string."
    );
}

// Folding

#[test]
fn fold_produces_a_constant() {
    let mut b = ModuleBuilder::new("Test.kt");
    let six = b.int(6);
    let seven = b.int(7);
    let product = b.binary("times", six, seven, TypeId::INT);
    let mut interpreter = IrInterpreter::builder(b.finish()).build();
    let FoldResult::Constant(node) = interpreter.fold(product).unwrap() else {
        panic!("expected a constant");
    };
    let module = interpreter.environment().module();
    assert_eq!(module.kind(node), ExprKind::Const(ConstValue::Int(42)));
    assert_eq!(module.expr(node).ty, TypeId::INT);
}

#[test]
fn fold_interns_strings() {
    let mut b = ModuleBuilder::new("Test.kt");
    let a = b.string("ab");
    let c = b.string("c");
    let joined = b.binary("plus", a, c, TypeId::STRING);
    let mut interpreter = IrInterpreter::builder(b.finish()).build();
    let node = interpreter.fold(joined).unwrap().expr();
    let module = interpreter.environment().module();
    let ExprKind::Const(ConstValue::String(name)) = module.kind(node) else {
        panic!("expected a string constant");
    };
    assert_eq!(module.name(name), "abc");
}

#[test]
fn fold_turns_uncaught_exceptions_into_error_nodes() {
    let mut b = ModuleBuilder::new("Test.kt");
    let one = b.int(1);
    let zero = b.int(0);
    let div = b.binary("rem", one, zero, TypeId::INT);
    let mut interpreter = IrInterpreter::builder(b.finish()).build();
    let FoldResult::Erroneous(node) = interpreter.fold(div).unwrap() else {
        panic!("expected an error node");
    };
    let module = interpreter.environment().module();
    let ExprKind::Error(message) = module.kind(node) else {
        panic!("expected an error node");
    };
    assert!(module
        .name(message)
        .starts_with("kotlin.ArithmeticException: division by zero"));
    assert_eq!(module.expr(node).ty, TypeId::NOTHING);
}

#[test]
fn fold_leaves_unit_alone() {
    let mut b = ModuleBuilder::new("Test.kt");
    let empty = b.block(Vec::new());
    let mut interpreter = IrInterpreter::builder(b.finish()).build();
    assert_eq!(interpreter.fold(empty).unwrap(), FoldResult::Original(empty));
}

#[test]
fn fold_keeps_float_on_jvm() {
    let mut b = ModuleBuilder::new("Test.kt");
    let half = b.float(0.5);
    let twice = b.binary("times", half, half, TypeId::FLOAT);
    let mut interpreter = IrInterpreter::builder(b.finish()).build();
    let node = interpreter.fold(twice).unwrap().expr();
    let module = interpreter.environment().module();
    assert_eq!(module.kind(node), ExprKind::Const(ConstValue::float(0.25)));
    assert_eq!(module.expr(node).ty, TypeId::FLOAT);
}

#[test]
fn fold_widens_float_to_a_double_node_on_js() {
    let mut b = ModuleBuilder::new("Test.kt");
    let quarter = b.float(0.25);
    let config = Configuration::default().with_platform(Platform::Js);
    let mut interpreter = IrInterpreter::builder(b.finish()).config(config).build();
    let node = interpreter.fold(quarter).unwrap().expr();
    let module = interpreter.environment().module();
    assert_eq!(module.kind(node), ExprKind::Const(ConstValue::double(0.25)));
    assert_eq!(module.expr(node).ty, TypeId::DOUBLE);
}

#[test]
fn unsigned_values_fold_to_their_data() {
    let mut b = ModuleBuilder::new("Test.kt");
    let uint = b.prelude().unsigned[2];
    let ctor = b.module().class(uint.class).constructors[0];
    let raw = b.int(-1);
    let value = b.construct(ctor, vec![raw]);
    let mut interpreter = IrInterpreter::builder(b.finish()).build();
    let FoldResult::Constant(node) = interpreter.fold(value).unwrap() else {
        panic!("expected a constant");
    };
    let module = interpreter.environment().module();
    assert_eq!(module.kind(node), ExprKind::Const(ConstValue::Int(-1)));
    assert_eq!(module.types.class_of(module.expr(node).ty), Some(uint.class));
}

#[test]
fn unsigned_to_string_is_zero_extended() {
    let mut b = ModuleBuilder::new("Test.kt");
    let uint = b.prelude().unsigned[2];
    let ctor = b.module().class(uint.class).constructors[0];
    let to_string = b.module().find_function("kotlin.UInt.toString", &[]).unwrap();
    let raw = b.int(-1);
    let value = b.construct(ctor, vec![raw]);
    let call = b.call(to_string, Some(value), Vec::new());
    assert_eq!(text(&run(b, call).unwrap()), "4294967295");
}
