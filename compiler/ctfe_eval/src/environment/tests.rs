use super::*;
use crate::state::Complex;
use ctfe_ir::{ClassKind, ExprKind, ModuleBuilder, TypeId};
use pretty_assertions::assert_eq;

fn environment(build: impl FnOnce(&mut ModuleBuilder)) -> Environment {
    let mut b = ModuleBuilder::new("Test.kt");
    build(&mut b);
    Environment::new(b.finish(), NativeRegistry::with_stdlib(), Configuration::default())
}

#[test]
fn first_memoized_object_wins_and_is_shared_by_clones() {
    let env = environment(|_| {});
    let class = env.module().prelude().string_builder;
    let first = State::complex(Complex::new(class, TypeId::ANY));
    let second = State::complex(Complex::new(class, TypeId::ANY));

    let stored = env.memoize_object(class, first.clone());
    assert!(stored.same_ref(&first));
    let again = env.memoize_object(class, second);
    assert!(again.same_ref(&first));

    let clone = env.clone();
    assert!(clone.object(class).unwrap().same_ref(&first));
}

#[test]
fn static_fields_can_be_overwritten_explicitly() {
    let mut field = FieldId::default();
    let env = environment(|b| field = b.static_field("counter", TypeId::INT, None));
    env.memoize_static_field(field, State::int(1));
    env.memoize_static_field(field, State::int(2));
    assert_eq!(env.static_field(field).unwrap().as_value().and_then(|v| v.as_i32()), Some(1));
    env.set_static_field(field, State::int(3));
    assert_eq!(env.static_field(field).unwrap().as_value().and_then(|v| v.as_i32()), Some(3));
}

#[test]
fn exception_classes_include_user_subclasses() {
    let mut user = ClassId::default();
    let env = environment(|b| {
        let parent = b.prelude().illegal_state_exception;
        user = b.class("demo.Failure", ClassKind::Class, Some(parent));
    });
    let prelude = *env.module().prelude();
    assert!(env.is_exception_class(user));
    assert!(env.is_exception_class(prelude.throwable));
    assert!(!env.is_exception_class(prelude.string_builder));
}

#[test]
fn adaptors_are_cached_per_shape() {
    let mut target = FunctionId::default();
    let env = environment(|b| {
        let class = b.class("demo.Counter", ClassKind::Class, None);
        target = b.method(class, "add", &[("n", TypeId::INT)], TypeId::INT);
    });

    let unbound = env.function_adaptor(FunctionShape::call(target, false, false));
    let bound = env.function_adaptor(FunctionShape::call(target, true, false));
    assert_ne!(unbound, bound);
    assert_eq!(env.function_adaptor(FunctionShape::call(target, false, false)), unbound);
    assert_eq!(env.adaptor_count(), 2);

    let module = env.module();
    // Unbound receiver leads the parameter list.
    assert_eq!(module.function(unbound).params.len(), 2);
    assert!(module.function(unbound).captures.is_empty());
    assert_eq!(module.function(bound).params.len(), 1);
    assert_eq!(module.function(bound).captures.len(), 1);
    let body = module.function(bound).body.unwrap();
    assert!(matches!(module.kind(body), ExprKind::Call { callee, .. } if callee == target));
}

#[test]
fn delegating_adaptor_targets_the_constructor() {
    let mut ctor = FunctionId::default();
    let env = environment(|b| {
        let class = b.class("demo.Base", ClassKind::Class, None);
        ctor = b.default_constructor(class, &[("id", TypeId::INT)]);
    });
    let adaptor = env.function_adaptor(FunctionShape::delegating(ctor));
    let module = env.module();
    let f = module.function(adaptor);
    assert!(f.dispatch_receiver.is_some());
    assert_eq!(f.params.len(), 1);
    assert_eq!(f.return_type, TypeId::UNIT);
    assert!(matches!(
        module.kind(f.body.unwrap()),
        ExprKind::DelegatingConstructorCall { constructor, .. } if constructor == ctor
    ));
}
