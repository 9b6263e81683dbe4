//! Builtin operations on primitive values.
//!
//! A builtin is a bodiless member of a builtin type (`Int.plus`,
//! `String.get`, `Double.toString`) called with a primitive receiver.
//! [`evaluate`] dispatches on the member name and on the receiver and
//! argument kinds; `None` means no builtin exists for that shape.
//!
//! Failures the interpreted program can observe come back as [`Thrown`]
//! and are raised as emulated exceptions by the caller.

mod array;
pub mod format;
mod numeric;
mod string;

use ctfe_ir::{ClassId, Prelude};
use smallvec::SmallVec;

use crate::config::Platform;
use crate::state::PrimitiveValue;

pub use array::array_member;

/// Library exception a builtin raises.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ThrownKind {
    Arithmetic,
    IndexOutOfBounds,
    IllegalArgument,
    NumberFormat,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Thrown {
    pub kind: ThrownKind,
    pub message: String,
}

impl Thrown {
    pub fn new(kind: ThrownKind, message: impl Into<String>) -> Self {
        Thrown {
            kind,
            message: message.into(),
        }
    }

    #[cold]
    pub fn division_by_zero() -> Self {
        Thrown::new(ThrownKind::Arithmetic, "division by zero")
    }

    #[cold]
    pub fn index_out_of_bounds(index: i64, length: usize) -> Self {
        Thrown::new(
            ThrownKind::IndexOutOfBounds,
            format!("Index {index} out of bounds for length {length}"),
        )
    }

    /// Prelude class of the exception to raise.
    pub fn class(&self, prelude: &Prelude) -> ClassId {
        match self.kind {
            ThrownKind::Arithmetic => prelude.arithmetic_exception,
            ThrownKind::IndexOutOfBounds => prelude.index_out_of_bounds_exception,
            ThrownKind::IllegalArgument => prelude.illegal_argument_exception,
            ThrownKind::NumberFormat => prelude.number_format_exception,
        }
    }
}

pub type BuiltinResult<T = PrimitiveValue> = Result<T, Thrown>;

/// Evaluates `receiver.name(args)`.
///
/// On float-poor platforms `Float` operands are widened to `Double`
/// first and `toFloat` becomes `toDouble`.
pub fn evaluate(
    name: &str,
    receiver: &PrimitiveValue,
    args: &[PrimitiveValue],
    platform: Platform,
) -> Option<BuiltinResult> {
    let widen = platform.is_float_poor();
    let receiver = if widen { widen_float(receiver) } else { receiver.clone() };
    let name = if widen && name == "toFloat" { "toDouble" } else { name };
    let args: SmallVec<[PrimitiveValue; 2]> = args
        .iter()
        .map(|arg| if widen { widen_float(arg) } else { arg.clone() })
        .collect();

    match args.as_slice() {
        [] => unary(name, &receiver, platform),
        [arg] => binary(name, &receiver, arg, platform),
        [first, second] => ternary(name, &receiver, first, second),
        _ => None,
    }
}

fn widen_float(value: &PrimitiveValue) -> PrimitiveValue {
    match *value {
        PrimitiveValue::Float(v) => PrimitiveValue::Double(f64::from(v)),
        ref other => other.clone(),
    }
}

fn unary(name: &str, receiver: &PrimitiveValue, platform: Platform) -> Option<BuiltinResult> {
    match name {
        "toString" => render(receiver, platform).map(|s| Ok(PrimitiveValue::string(&s))),
        "hashCode" => hash_code(receiver).map(|h| Ok(PrimitiveValue::Int(h))),
        _ => match receiver {
            PrimitiveValue::String(s) => string::unary(name, s),
            PrimitiveValue::Boolean(b) => string::boolean_unary(name, *b),
            PrimitiveValue::Char(c) => numeric::char_unary(name, *c),
            _ => numeric::unary(name, receiver),
        },
    }
}

fn binary(
    name: &str,
    receiver: &PrimitiveValue,
    arg: &PrimitiveValue,
    platform: Platform,
) -> Option<BuiltinResult> {
    if name == "equals" {
        return Some(Ok(PrimitiveValue::Boolean(equals(receiver, arg))));
    }
    match receiver {
        PrimitiveValue::String(s) => {
            if name == "plus" {
                let rhs = render(arg, platform)?;
                return Some(Ok(PrimitiveValue::string(&format!("{s}{rhs}"))));
            }
            string::binary(name, s, arg)
        }
        PrimitiveValue::Boolean(b) => string::boolean_binary(name, *b, arg),
        PrimitiveValue::Char(c) => numeric::char_binary(name, *c, arg),
        _ => numeric::binary(name, receiver, arg),
    }
}

fn ternary(
    name: &str,
    receiver: &PrimitiveValue,
    first: &PrimitiveValue,
    second: &PrimitiveValue,
) -> Option<BuiltinResult> {
    match receiver {
        PrimitiveValue::String(s) => string::ternary(name, s, first, second),
        _ => None,
    }
}

/// `toString()` of a primitive; arrays have no stable rendering.
pub fn render(value: &PrimitiveValue, platform: Platform) -> Option<String> {
    let text = match value {
        PrimitiveValue::Unit => "kotlin.Unit".to_owned(),
        PrimitiveValue::Null => "null".to_owned(),
        PrimitiveValue::Boolean(b) => b.to_string(),
        PrimitiveValue::Char(c) => String::from_utf16_lossy(&[*c]),
        PrimitiveValue::Byte(v) => v.to_string(),
        PrimitiveValue::Short(v) => v.to_string(),
        PrimitiveValue::Int(v) => v.to_string(),
        PrimitiveValue::Long(v) => v.to_string(),
        PrimitiveValue::Float(v) if platform.is_float_poor() => format::js_number(f64::from(*v)),
        PrimitiveValue::Float(v) => format::jvm_float(*v),
        PrimitiveValue::Double(v) if platform.is_float_poor() => format::js_number(*v),
        PrimitiveValue::Double(v) => format::jvm_double(*v),
        PrimitiveValue::String(s) => s.to_string(),
        PrimitiveValue::Array(_) => return None,
    };
    Some(text)
}

/// `equals` of boxed primitives: same type and same value, floats by
/// total equality (`NaN == NaN`, `0.0 != -0.0`).
pub fn equals(lhs: &PrimitiveValue, rhs: &PrimitiveValue) -> bool {
    use PrimitiveValue as P;
    match (lhs, rhs) {
        (P::Unit, P::Unit) | (P::Null, P::Null) => true,
        (P::Boolean(a), P::Boolean(b)) => a == b,
        (P::Char(a), P::Char(b)) => a == b,
        (P::Byte(a), P::Byte(b)) => a == b,
        (P::Short(a), P::Short(b)) => a == b,
        (P::Int(a), P::Int(b)) => a == b,
        (P::Long(a), P::Long(b)) => a == b,
        (P::Float(a), P::Float(b)) => a.to_bits() == b.to_bits() || (a.is_nan() && b.is_nan()),
        (P::Double(a), P::Double(b)) => a.to_bits() == b.to_bits() || (a.is_nan() && b.is_nan()),
        (P::String(a), P::String(b)) => a == b,
        (P::Array(a), P::Array(b)) => a.ptr_eq(b),
        _ => false,
    }
}

/// `hashCode()` with the JVM's rules for boxed primitives and strings.
pub fn hash_code(value: &PrimitiveValue) -> Option<i32> {
    let hash = match *value {
        PrimitiveValue::Null => 0,
        PrimitiveValue::Boolean(b) => {
            if b {
                1231
            } else {
                1237
            }
        }
        PrimitiveValue::Char(c) => i32::from(c),
        PrimitiveValue::Byte(v) => i32::from(v),
        PrimitiveValue::Short(v) => i32::from(v),
        PrimitiveValue::Int(v) => v,
        PrimitiveValue::Long(v) => fold_long(v),
        PrimitiveValue::Float(v) => {
            let bits = if v.is_nan() { 0x7fc0_0000 } else { v.to_bits() };
            bits as i32
        }
        PrimitiveValue::Double(v) => {
            let bits = if v.is_nan() { 0x7ff8_0000_0000_0000 } else { v.to_bits() };
            fold_long(bits as i64)
        }
        PrimitiveValue::String(ref s) => s
            .encode_utf16()
            .fold(0i32, |h, unit| h.wrapping_mul(31).wrapping_add(i32::from(unit))),
        PrimitiveValue::Unit | PrimitiveValue::Array(_) => return None,
    };
    Some(hash)
}

fn fold_long(v: i64) -> i32 {
    (v ^ ((v as u64) >> 32) as i64) as i32
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
