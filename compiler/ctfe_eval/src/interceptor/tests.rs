use std::rc::Rc;

use super::*;
use crate::bridge::HostValue;
use crate::state::{FunctionState, Wrapper};
use ctfe_ir::{ClassKind, FunctionFlags, ModuleBuilder, TypeId};
use pretty_assertions::assert_eq;

fn path(b: &ModuleBuilder, callee: FunctionId, receiver: Option<&State>) -> CallPath {
    call_path(b.module(), &NativeRegistry::with_stdlib(), callee, receiver)
}

fn string_builder(b: &ModuleBuilder) -> State {
    let module = b.module();
    let ctor = module.find_function("kotlin.text.StringBuilder.<init>", &[]).unwrap();
    let native = NativeRegistry::with_stdlib()
        .lookup(NativeKind::Constructor, "kotlin.text.StringBuilder", &module.signature(ctor))
        .unwrap();
    let call = crate::bridge::NativeCall {
        owner: "kotlin.text.StringBuilder",
        receiver: None,
        args: &[],
    };
    let HostValue::Object(object) = native(&call).unwrap() else {
        panic!("expected a host object");
    };
    let ty = module.class(module.prelude().string_builder).ty;
    State::Wrapper(Rc::new(Wrapper::new(object, ty)))
}

#[test]
fn host_receivers_take_the_native_method_path() {
    let b = ModuleBuilder::new("Test.kt");
    let sb = string_builder(&b);
    let append = b.prelude_overload("kotlin.text.StringBuilder.append", &[TypeId::NULLABLE_STRING]);
    let to_string = b.prelude().any_to_string;
    assert_eq!(path(&b, append, Some(&sb)), CallPath::NativeMethod);
    assert_eq!(path(&b, to_string, Some(&sb)), CallPath::NativeMethod);
    let hash = b.prelude().any_hash_code;
    assert_eq!(path(&b, hash, Some(&sb)), CallPath::Intrinsic(Intrinsic::AnyHashCode));
}

#[test]
fn host_receivers_never_fall_back_to_bodies() {
    let mut b = ModuleBuilder::new("Test.kt");
    let sb = string_builder(&b);
    let class = b.prelude().string_builder;
    let demo = b.method(class, "demo", &[], TypeId::INT);
    let body = b.int(42);
    b.set_body(demo, body);
    assert_eq!(path(&b, demo, Some(&sb)), CallPath::Unsupported);
}

#[test]
fn native_only_functions_win_over_bodies() {
    let mut b = ModuleBuilder::new("Test.kt");
    let f = b.function("demo.host", &[], TypeId::INT);
    let one = b.int(1);
    b.set_body(f, one);
    b.add_flags(f, FunctionFlags::NATIVE_ONLY);
    assert_eq!(path(&b, f, None), CallPath::NativeFunction);
    let sqrt = b.prelude_function("kotlin.math.sqrt");
    assert_eq!(path(&b, sqrt, None), CallPath::NativeFunction);
}

#[test]
fn primitive_receivers_use_builtins_before_bodies() {
    let mut b = ModuleBuilder::new("Test.kt");
    let plus = b.builtin_member(TypeId::INT, "plus", &[TypeId::INT], TypeId::INT);
    let five = State::int(5);
    assert_eq!(path(&b, plus, Some(&five)), CallPath::Builtin);

    let zero = b.int(0);
    b.set_body(plus, zero);
    assert_eq!(path(&b, plus, Some(&five)), CallPath::Builtin);

    // An extension on Int has no dispatch receiver and runs its body.
    let twice = b.extension("demo.twice", TypeId::INT, &[], TypeId::INT);
    let body = b.int(0);
    b.set_body(twice, body);
    assert_eq!(path(&b, twice, None), CallPath::Body(body));
}

#[test]
fn function_values_answer_reflective_members() {
    let mut b = ModuleBuilder::new("Test.kt");
    let target = b.function("demo.f", &[], TypeId::INT);
    let fn0 = b.function_type(0);
    let invoke = b.builtin_member(fn0, "invoke", &[], TypeId::NULLABLE_ANY);
    let value = State::Function(Rc::new(FunctionState {
        function: target,
        ty: fn0,
        dispatch_receiver: None,
        extension_receiver: None,
        captures: Vec::new(),
    }));
    assert_eq!(path(&b, invoke, Some(&value)), CallPath::FunctionMember);
}

#[test]
fn accessors_reference_bodies_and_stubs() {
    let mut b = ModuleBuilder::new("Test.kt");
    let class = b.class("demo.Point", ClassKind::Class, None);
    let (field, getter) = b.property(class, "x", TypeId::INT, None);
    let pending = b.function("demo.pending", &[], TypeId::NULLABLE_ANY);
    b.add_flags(pending, FunctionFlags::SUSPEND);
    let missing = b.function("demo.missing", &[], TypeId::INT);

    assert_eq!(path(&b, getter, None), CallPath::Accessor(field));
    let require = b.prelude_function("kotlin.require");
    let body = b.module().function(require).reference_body.unwrap();
    assert_eq!(path(&b, require, None), CallPath::ReferenceBody(body));
    assert_eq!(path(&b, pending, None), CallPath::SuspendStub);
    assert_eq!(path(&b, missing, None), CallPath::Unsupported);
}

#[test]
fn constructor_paths() {
    let mut b = ModuleBuilder::new("Test.kt");
    let class = b.class("demo.Box", ClassKind::Class, None);
    let declared = b.default_constructor(class, &[]);
    let bare = b.constructor(class, &[("n", TypeId::INT)]);
    let prelude = b.prelude();
    let module = b.module();
    let exception = module.class(prelude.illegal_state_exception).constructors[1];
    let uint = module.class(prelude.unsigned[2].class).constructors[0];

    assert_eq!(constructor_path(module, exception), ConstructorPath::Native);
    assert_eq!(
        constructor_path(module, uint),
        ConstructorPath::Intrinsic(Intrinsic::UnsignedConstructor)
    );
    assert_eq!(constructor_path(module, declared), ConstructorPath::Interpreted);
    assert_eq!(path(&b, exception, None), CallPath::NativeConstructor);
    assert_eq!(path(&b, bare, None), CallPath::TrivialConstructor);
}
