use super::*;
use ctfe_ir::{ClassId, FieldId, TypeId};
use pretty_assertions::assert_eq;

#[test]
fn complex_field_writes_are_shared() {
    let object = State::complex(Complex::new(ClassId::new(3), TypeId::ANY));
    let alias = object.clone();
    let State::Complex(handle) = &object else {
        panic!("expected complex");
    };
    handle.borrow_mut().set_field(FieldId::new(0), State::int(7));

    let State::Complex(aliased) = &alias else {
        panic!("expected complex");
    };
    let field = aliased.borrow().field(FieldId::new(0)).cloned();
    assert!(matches!(
        field.as_ref().and_then(State::as_value),
        Some(PrimitiveValue::Int(7))
    ));
    assert!(object.same_ref(&alias));
}

#[test]
fn identity_distinguishes_objects_with_equal_fields() {
    let a = State::complex(Complex::new(ClassId::new(1), TypeId::ANY));
    let b = State::complex(Complex::new(ClassId::new(1), TypeId::ANY));
    assert!(!a.same_ref(&b));
    assert!(a.same_ref(&a.clone()));
}

#[test]
fn scalar_identity_compares_type_and_value() {
    assert!(State::int(1).same_ref(&State::int(1)));
    assert!(!State::int(1).same_ref(&State::long(1)));
    assert!(State::string("a").same_ref(&State::string("a")));
    assert!(State::null(TypeId::NULLABLE_ANY).same_ref(&State::null(TypeId::NULLABLE_STRING)));
    assert!(State::double(f64::NAN).same_ref(&State::double(f64::NAN)));
}

#[test]
fn arrays_share_storage() {
    let array = State::array(vec![State::int(1), State::int(2)], TypeId::ANY);
    let copy = array.clone();
    if let Some(PrimitiveValue::Array(storage)) = array.as_value() {
        storage.borrow_mut()[0] = State::int(9);
    }
    let Some(PrimitiveValue::Array(storage)) = copy.as_value() else {
        panic!("expected array");
    };
    assert!(matches!(
        storage.borrow()[0].as_value(),
        Some(PrimitiveValue::Int(9))
    ));
    assert!(array.same_ref(&copy));
}

#[test]
fn exception_descriptions() {
    let cause = ExceptionState::new(ClassId::new(1), TypeId::ANY, "kotlin.IllegalStateException")
        .with_message(Some("inner".to_owned()));
    let mut outer = ExceptionState::new(ClassId::new(2), TypeId::ANY, "kotlin.RuntimeException")
        .with_cause(Some(Shared::new(cause)));
    assert_eq!(outer.short_description(), "kotlin.RuntimeException");
    outer.set_message(Some("boom".to_owned()));
    outer.set_stack_trace(vec!["demo.f(Test.kt:3)".to_owned()]);
    assert_eq!(outer.short_description(), "boom");
    assert_eq!(
        outer.long_description(),
        "kotlin.RuntimeException: boom\n\tat demo.f(Test.kt:3)\nCaused by: kotlin.IllegalStateException: inner"
    );
}
