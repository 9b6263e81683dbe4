//! String and Boolean builtins. Strings index by UTF-16 code unit.

use std::cmp::Ordering;

use super::{BuiltinResult, Thrown, ThrownKind};
use crate::state::PrimitiveValue;

fn units(text: &str) -> Vec<u16> {
    text.encode_utf16().collect()
}

fn from_units(units: &[u16]) -> PrimitiveValue {
    PrimitiveValue::string(&String::from_utf16_lossy(units))
}

pub(super) fn unary(op: &str, text: &str) -> Option<BuiltinResult> {
    let result = match op {
        "<get-length>" => PrimitiveValue::Int(text.encode_utf16().count() as i32),
        "isEmpty" => PrimitiveValue::Boolean(text.is_empty()),
        _ => return None,
    };
    Some(Ok(result))
}

/// `String.compareTo`: difference of the first differing code units,
/// otherwise of the lengths.
fn compare(lhs: &str, rhs: &str) -> i32 {
    let (l, r) = (units(lhs), units(rhs));
    l.iter()
        .zip(&r)
        .find(|(a, b)| a != b)
        .map_or(l.len() as i32 - r.len() as i32, |(a, b)| {
            i32::from(*a) - i32::from(*b)
        })
}

pub(super) fn binary(op: &str, text: &str, arg: &PrimitiveValue) -> Option<BuiltinResult> {
    match (op, arg) {
        ("get", _) => {
            let index = arg.as_i32()?;
            let units = units(text);
            let result = usize::try_from(index)
                .ok()
                .and_then(|i| units.get(i).copied())
                .map(PrimitiveValue::Char)
                .ok_or_else(|| Thrown::index_out_of_bounds(i64::from(index), units.len()));
            Some(result)
        }
        ("substring", _) => {
            let start = arg.as_i32()?;
            let len = text.encode_utf16().count() as i32;
            Some(substring(text, start, len))
        }
        ("compareTo", PrimitiveValue::String(other)) => {
            Some(Ok(PrimitiveValue::Int(compare(text, other))))
        }
        (_, PrimitiveValue::String(other)) => {
            let ordering = compare(text, other).cmp(&0);
            let result = match op {
                "less" => ordering == Ordering::Less,
                "lessOrEqual" => ordering != Ordering::Greater,
                "greater" => ordering == Ordering::Greater,
                "greaterOrEqual" => ordering != Ordering::Less,
                _ => return None,
            };
            Some(Ok(PrimitiveValue::Boolean(result)))
        }
        _ => None,
    }
}

pub(super) fn ternary(
    op: &str,
    text: &str,
    first: &PrimitiveValue,
    second: &PrimitiveValue,
) -> Option<BuiltinResult> {
    match op {
        "substring" | "subSequence" => Some(substring(text, first.as_i32()?, second.as_i32()?)),
        _ => None,
    }
}

fn substring(text: &str, start: i32, end: i32) -> BuiltinResult {
    let units = units(text);
    let len = units.len();
    match (usize::try_from(start), usize::try_from(end)) {
        (Ok(s), Ok(e)) if s <= e && e <= len => Ok(from_units(&units[s..e])),
        _ => Err(Thrown::new(
            ThrownKind::IndexOutOfBounds,
            format!("begin {start}, end {end}, length {len}"),
        )),
    }
}

pub(super) fn boolean_unary(op: &str, value: bool) -> Option<BuiltinResult> {
    match op {
        "not" => Some(Ok(PrimitiveValue::Boolean(!value))),
        _ => None,
    }
}

pub(super) fn boolean_binary(op: &str, value: bool, arg: &PrimitiveValue) -> Option<BuiltinResult> {
    let other = arg.as_bool()?;
    let result = match op {
        "and" => PrimitiveValue::Boolean(value & other),
        "or" => PrimitiveValue::Boolean(value | other),
        "xor" => PrimitiveValue::Boolean(value ^ other),
        "compareTo" => PrimitiveValue::Int(match value.cmp(&other) {
            Ordering::Less => -1,
            Ordering::Equal => 0,
            Ordering::Greater => 1,
        }),
        _ => return None,
    };
    Some(Ok(result))
}
