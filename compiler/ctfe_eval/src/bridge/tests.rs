use super::*;
use crate::config::Configuration;
use crate::environment::Environment;
use crate::state::{Complex, ExceptionState};
use ctfe_ir::{ModuleBuilder, TypeId};
use pretty_assertions::assert_eq;

fn call<'a>(owner: &'a str, receiver: Option<&'a HostObject>, args: &'a [HostValue]) -> NativeCall<'a> {
    NativeCall {
        owner,
        receiver,
        args,
    }
}

fn invoke(
    registry: &NativeRegistry,
    kind: NativeKind,
    owner: &str,
    signature: &str,
    receiver: Option<&HostObject>,
    args: &[HostValue],
) -> HostResult {
    let f = registry.lookup(kind, owner, signature).unwrap();
    f(&call(owner, receiver, args))
}

fn object(value: HostResult) -> HostObject {
    match value.unwrap() {
        HostValue::Object(object) => object,
        other => panic!("expected host object, got {other:?}"),
    }
}

#[test]
fn every_throwable_has_four_constructors() {
    let registry = NativeRegistry::with_stdlib();
    for class in THROWABLE_CLASSES {
        for signature in [
            "<init>()",
            "<init>(kotlin.String?)",
            "<init>(kotlin.String?, kotlin.Throwable?)",
            "<init>(kotlin.Throwable?)",
        ] {
            assert!(
                registry.contains(NativeKind::Constructor, class, signature),
                "{class}.{signature}"
            );
        }
    }
}

#[test]
fn cause_only_constructor_uses_cause_as_message() {
    let registry = NativeRegistry::with_stdlib();
    let cause = Rc::new(HostException::new("kotlin.ArithmeticException", Some("boom".into())));
    let result = invoke(
        &registry,
        NativeKind::Constructor,
        "kotlin.IllegalStateException",
        "<init>(kotlin.Throwable?)",
        None,
        &[HostValue::Throwable(cause)],
    )
    .unwrap();
    let HostValue::Throwable(exception) = result else {
        panic!("expected throwable");
    };
    assert_eq!(exception.class_name, "kotlin.IllegalStateException");
    assert_eq!(
        exception.message.as_deref(),
        Some("kotlin.ArithmeticException: boom")
    );
    assert!(exception.cause.is_some());
}

#[test]
fn string_builder_appends_and_renders() {
    let registry = NativeRegistry::with_stdlib();
    let sb = "kotlin.text.StringBuilder";
    let builder = object(invoke(&registry, NativeKind::Constructor, sb, "<init>()", None, &[]));
    for (signature, arg) in [
        ("append(kotlin.String?)", HostValue::str("x=")),
        ("append(kotlin.Int)", HostValue::Int(4)),
        ("append(kotlin.Double)", HostValue::Double(1.5)),
        ("append(kotlin.Char)", HostValue::Char(u16::from(b'!'))),
    ] {
        invoke(&registry, NativeKind::Method, sb, signature, Some(&builder), &[arg]).unwrap();
    }
    let text = invoke(&registry, NativeKind::Method, sb, "toString()", Some(&builder), &[]).unwrap();
    assert_eq!(text.as_str(), Some("x=41.5!"));
    let len = invoke(&registry, NativeKind::Method, sb, "<get-length>()", Some(&builder), &[]).unwrap();
    assert_eq!(len.as_i32(), Some(7));
}

#[test]
fn array_list_reports_out_of_bounds() {
    let registry = NativeRegistry::with_stdlib();
    let owner = "kotlin.collections.ArrayList";
    let list = object(invoke(&registry, NativeKind::Constructor, owner, "<init>()", None, &[]));
    invoke(&registry, NativeKind::Method, owner, "add(kotlin.Any?)", Some(&list), &[HostValue::Int(1)]).unwrap();
    invoke(&registry, NativeKind::Method, owner, "add(kotlin.Any?)", Some(&list), &[HostValue::str("b")]).unwrap();
    assert_eq!(list.render(), "[1, b]");

    let err = invoke(&registry, NativeKind::Method, owner, "get(kotlin.Int)", Some(&list), &[HostValue::Int(2)])
        .unwrap_err();
    assert_eq!(err.class_name, "kotlin.IndexOutOfBoundsException");
    assert_eq!(err.message.as_deref(), Some("Index 2 out of bounds for length 2"));
}

#[test]
fn text_natives_use_utf16_indices() {
    let registry = NativeRegistry::with_stdlib();
    let index = invoke(
        &registry,
        NativeKind::Function,
        "kotlin.text",
        "indexOf(kotlin.String)",
        None,
        &[HostValue::str("\u{1F600}ab"), HostValue::str("b")],
    )
    .unwrap();
    assert_eq!(index.as_i32(), Some(3));

    let padded = invoke(
        &registry,
        NativeKind::Function,
        "kotlin.text",
        "padStart(kotlin.Int, kotlin.Char)",
        None,
        &[HostValue::str("7"), HostValue::Int(3), HostValue::Char(u16::from(b'0'))],
    )
    .unwrap();
    assert_eq!(padded.as_str(), Some("007"));
}

#[test]
fn number_parsing_failure_is_number_format_exception() {
    let registry = NativeRegistry::with_stdlib();
    let err = invoke(
        &registry,
        NativeKind::Function,
        "kotlin.text",
        "toInt()",
        None,
        &[HostValue::str("12a")],
    )
    .unwrap_err();
    assert_eq!(err.render(), "kotlin.NumberFormatException: For input string: \"12a\"");

    let none = invoke(
        &registry,
        NativeKind::Function,
        "kotlin.text",
        "toIntOrNull()",
        None,
        &[HostValue::str("12a")],
    )
    .unwrap();
    assert!(matches!(none, HostValue::Null));
}

#[test]
fn math_round_is_half_even() {
    let registry = NativeRegistry::with_stdlib();
    let round = |x: f64| {
        invoke(&registry, NativeKind::Function, "kotlin.math", "round(kotlin.Double)", None, &[HostValue::Double(x)])
            .unwrap()
            .as_f64()
            .unwrap()
    };
    assert_eq!(round(2.5), 2.0);
    assert_eq!(round(3.5), 4.0);
}

fn environment() -> Environment {
    Environment::new(
        ModuleBuilder::new("Test.kt").finish(),
        NativeRegistry::with_stdlib(),
        Configuration::default(),
    )
}

#[test]
fn exceptions_round_trip_by_identity() {
    let env = environment();
    let (state, host) = {
        let module = env.module();
        let class = module.prelude().illegal_state_exception;
        let state = State::exception(
            ExceptionState::new(class, module.class(class).ty, "kotlin.IllegalStateException")
                .with_message(Some("bad".into())),
        );
        let host = to_host(&state, &module);
        (state, host)
    };
    let HostValue::Throwable(exception) = &host else {
        panic!("expected throwable");
    };
    assert_eq!(exception.render(), "kotlin.IllegalStateException: bad");

    let back = from_host(host, TypeId::ANY, &env);
    assert!(back.same_ref(&state));
}

#[test]
fn registered_host_exception_keeps_its_class() {
    let env = environment();
    let host = HostException::new("kotlin.NumberFormatException", Some("For input string: \"x\"".into()));
    let state = exception_state(&host, &env);
    let class = state.borrow().class();
    assert_eq!(class, env.module().prelude().number_format_exception);
    assert!(env.is_exception_class(class));
}

#[test]
fn thrown_unknown_host_exception_falls_back_to_throwable() {
    let env = environment();
    let host = HostException::new("java.io.IOException", Some("disk".into()));
    let state = exception_state(&host, &env);
    let state = state.borrow();
    assert_eq!(state.class(), env.module().prelude().throwable);
    assert_eq!(state.render(), "java.io.IOException: disk");
}

#[test]
fn returned_unknown_host_throwable_stays_a_host_object() {
    let env = environment();
    let known = HostValue::Throwable(Rc::new(HostException::new("kotlin.IllegalStateException", None)));
    assert!(matches!(from_host(known, TypeId::ANY, &env), State::Exception(_)));

    let foreign = HostValue::Throwable(Rc::new(HostException::new("java.io.IOException", Some("disk".into()))));
    let State::Wrapper(wrapper) = from_host(foreign, TypeId::ANY, &env) else {
        panic!("expected a host object");
    };
    assert_eq!(wrapper.class_name(), "java.io.IOException");
    assert_eq!(wrapper.object().render(), "java.io.IOException: disk");
    assert!(wrapper.object().downcast_ref::<ForeignThrowable>().is_some());
}

#[test]
fn interpreted_objects_travel_as_proxies() {
    let env = environment();
    let (state, host) = {
        let module = env.module();
        let any = module.prelude().any;
        let state = State::complex(Complex::new(any, module.class(any).ty));
        let host = to_host(&state, &module);
        (state, host)
    };
    assert!(matches!(&host, HostValue::Proxy(_)));
    assert!(from_host(host, TypeId::ANY, &env).same_ref(&state));
}
