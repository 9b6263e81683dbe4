use super::*;
use crate::state::{Shared, State};
use pretty_assertions::assert_eq;

fn eval(name: &str, receiver: PrimitiveValue, args: &[PrimitiveValue]) -> BuiltinResult {
    evaluate(name, &receiver, args, Platform::Jvm).unwrap()
}

fn string(result: BuiltinResult) -> String {
    result.unwrap().as_str().unwrap().to_owned()
}

#[test]
fn integer_arithmetic_wraps() {
    let sum = eval("plus", PrimitiveValue::Int(i32::MAX), &[PrimitiveValue::Int(1)]).unwrap();
    assert!(matches!(sum, PrimitiveValue::Int(i32::MIN)));
    let quotient = eval("div", PrimitiveValue::Int(i32::MIN), &[PrimitiveValue::Int(-1)]).unwrap();
    assert!(matches!(quotient, PrimitiveValue::Int(i32::MIN)));
}

#[test]
fn mixed_operands_promote() {
    let long = eval("plus", PrimitiveValue::Int(1), &[PrimitiveValue::Long(2)]).unwrap();
    assert!(matches!(long, PrimitiveValue::Long(3)));
    let byte_sum = eval("plus", PrimitiveValue::Byte(100), &[PrimitiveValue::Byte(100)]).unwrap();
    assert!(matches!(byte_sum, PrimitiveValue::Int(200)));
    let float = eval("times", PrimitiveValue::Float(1.5), &[PrimitiveValue::Long(2)]).unwrap();
    assert!(matches!(float, PrimitiveValue::Float(v) if v == 3.0));
}

#[test]
fn integer_division_by_zero_throws() {
    let err = eval("div", PrimitiveValue::Int(5), &[PrimitiveValue::Int(0)]).unwrap_err();
    assert_eq!(err.kind, ThrownKind::Arithmetic);
    assert!(err.message.contains("division by zero"));
    let err = eval("rem", PrimitiveValue::Long(5), &[PrimitiveValue::Long(0)]).unwrap_err();
    assert_eq!(err.kind, ThrownKind::Arithmetic);
}

#[test]
fn float_division_by_zero_is_infinite() {
    let value = eval("div", PrimitiveValue::Double(5.0), &[PrimitiveValue::Double(0.0)]).unwrap();
    assert!(matches!(value, PrimitiveValue::Double(v) if v == f64::INFINITY));
}

#[test]
fn shifts_mask_distance() {
    let shl = eval("shl", PrimitiveValue::Int(1), &[PrimitiveValue::Int(33)]).unwrap();
    assert!(matches!(shl, PrimitiveValue::Int(2)));
    let ushr = eval("ushr", PrimitiveValue::Int(-1), &[PrimitiveValue::Int(28)]).unwrap();
    assert!(matches!(ushr, PrimitiveValue::Int(15)));
}

#[test]
fn compare_to_uses_total_order() {
    let nan = eval("compareTo", PrimitiveValue::Double(f64::NAN), &[PrimitiveValue::Double(1.0)]).unwrap();
    assert!(matches!(nan, PrimitiveValue::Int(1)));
    let zero = eval("compareTo", PrimitiveValue::Double(-0.0), &[PrimitiveValue::Double(0.0)]).unwrap();
    assert!(matches!(zero, PrimitiveValue::Int(-1)));
    let less = eval("less", PrimitiveValue::Double(f64::NAN), &[PrimitiveValue::Double(1.0)]).unwrap();
    assert!(matches!(less, PrimitiveValue::Boolean(false)));
}

#[test]
fn floats_compare_equal_by_bits() {
    assert!(equals(&PrimitiveValue::Double(f64::NAN), &PrimitiveValue::Double(f64::NAN)));
    assert!(!equals(&PrimitiveValue::Double(0.0), &PrimitiveValue::Double(-0.0)));
    assert!(!equals(&PrimitiveValue::Int(1), &PrimitiveValue::Long(1)));
}

#[test]
fn char_arithmetic() {
    let next = eval("plus", PrimitiveValue::Char(u16::from(b'a')), &[PrimitiveValue::Int(1)]).unwrap();
    assert!(matches!(next, PrimitiveValue::Char(c) if c == u16::from(b'b')));
    let distance = eval(
        "minus",
        PrimitiveValue::Char(u16::from(b'z')),
        &[PrimitiveValue::Char(u16::from(b'a'))],
    )
    .unwrap();
    assert!(matches!(distance, PrimitiveValue::Int(25)));
}

#[test]
fn conversions_truncate_and_saturate() {
    let byte = eval("toByte", PrimitiveValue::Int(300), &[]).unwrap();
    assert!(matches!(byte, PrimitiveValue::Byte(44)));
    let saturated = eval("toInt", PrimitiveValue::Double(1e20), &[]).unwrap();
    assert!(matches!(saturated, PrimitiveValue::Int(i32::MAX)));
    let nan = eval("toLong", PrimitiveValue::Double(f64::NAN), &[]).unwrap();
    assert!(matches!(nan, PrimitiveValue::Long(0)));
}

#[test]
fn jvm_float_rendering() {
    assert_eq!(string(eval("toString", PrimitiveValue::Double(1.0), &[])), "1.0");
    assert_eq!(string(eval("toString", PrimitiveValue::Double(1e10), &[])), "1.0E10");
    assert_eq!(string(eval("toString", PrimitiveValue::Double(1.5e-5), &[])), "1.5E-5");
    assert_eq!(string(eval("toString", PrimitiveValue::Double(0.001), &[])), "0.001");
    assert_eq!(string(eval("toString", PrimitiveValue::Float(1.1), &[])), "1.1");
    assert_eq!(string(eval("toString", PrimitiveValue::Double(-0.0), &[])), "-0.0");
    assert_eq!(string(eval("toString", PrimitiveValue::Double(f64::NAN), &[])), "NaN");
}

#[test]
fn js_number_rendering() {
    assert_eq!(format::js_number(1.0), "1");
    assert_eq!(format::js_number(1e21), "1e+21");
    assert_eq!(format::js_number(1.5e-7), "1.5e-7");
    assert_eq!(format::js_number(-0.0), "0");
    assert_eq!(format::js_number(f64::NEG_INFINITY), "-Infinity");
}

#[test]
fn float_poor_platform_widens() {
    let value = evaluate("toFloat", &PrimitiveValue::Int(3), &[], Platform::Js)
        .unwrap()
        .unwrap();
    assert!(matches!(value, PrimitiveValue::Double(v) if v == 3.0));
    let text = evaluate("toString", &PrimitiveValue::Float(2.0), &[], Platform::Js)
        .unwrap()
        .unwrap();
    assert_eq!(text.as_str(), Some("2"));
}

#[test]
fn string_members_use_utf16_units() {
    let smile = PrimitiveValue::string("\u{1F600}!");
    let len = eval("<get-length>", smile.clone(), &[]).unwrap();
    assert!(matches!(len, PrimitiveValue::Int(3)));
    let bang = eval("get", smile, &[PrimitiveValue::Int(2)]).unwrap();
    assert!(matches!(bang, PrimitiveValue::Char(c) if c == u16::from(b'!')));

    let sub = eval(
        "substring",
        PrimitiveValue::string("constant"),
        &[PrimitiveValue::Int(1), PrimitiveValue::Int(4)],
    );
    assert_eq!(string(sub), "ons");
    let err = eval("get", PrimitiveValue::string("ab"), &[PrimitiveValue::Int(2)]).unwrap_err();
    assert_eq!(err.kind, ThrownKind::IndexOutOfBounds);
}

#[test]
fn string_plus_renders_operand() {
    let text = eval("plus", PrimitiveValue::string("x="), &[PrimitiveValue::Double(2.0)]);
    assert_eq!(string(text), "x=2.0");
    let text = eval("plus", PrimitiveValue::string("n="), &[PrimitiveValue::Null]);
    assert_eq!(string(text), "n=null");
}

#[test]
fn hash_codes_follow_jvm() {
    assert_eq!(hash_code(&PrimitiveValue::string("ab")), Some(3105));
    assert_eq!(hash_code(&PrimitiveValue::Boolean(true)), Some(1231));
    assert_eq!(hash_code(&PrimitiveValue::Long(1 << 32)), Some(1));
    assert_eq!(hash_code(&PrimitiveValue::Double(1.0)), Some(1_072_693_248));
}

#[test]
fn unknown_member_is_not_a_builtin() {
    assert!(evaluate("frobnicate", &PrimitiveValue::Int(1), &[], Platform::Jvm).is_none());
}

#[test]
fn array_writes_are_shared() {
    let storage = Shared::new(vec![State::int(1), State::int(2)]);
    array_member("set", &storage, &[State::int(0), State::int(9)])
        .unwrap()
        .unwrap();
    let first = array_member("get", &storage, &[State::int(0)]).unwrap().unwrap();
    assert!(matches!(first.as_value(), Some(PrimitiveValue::Int(9))));
    let err = array_member("get", &storage, &[State::int(5)]).unwrap().unwrap_err();
    assert_eq!(err.message, "Index 5 out of bounds for length 2");
}
