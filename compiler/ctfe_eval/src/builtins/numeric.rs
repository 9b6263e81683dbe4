//! Numeric and char builtins.
//!
//! Binary operators promote both operands to the wider of the two kinds
//! (`Int < Long < Float < Double`, with `Byte` and `Short` computing as
//! `Int`). Integer arithmetic wraps; integer division by zero throws.

use std::cmp::Ordering;

use super::{BuiltinResult, Thrown};
use crate::state::PrimitiveValue;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Rank {
    Int,
    Long,
    Float,
    Double,
}

#[derive(Copy, Clone, Debug)]
enum Num {
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
}

impl Num {
    fn of(value: &PrimitiveValue) -> Option<Num> {
        match *value {
            PrimitiveValue::Byte(v) => Some(Num::I32(i32::from(v))),
            PrimitiveValue::Short(v) => Some(Num::I32(i32::from(v))),
            PrimitiveValue::Int(v) => Some(Num::I32(v)),
            PrimitiveValue::Long(v) => Some(Num::I64(v)),
            PrimitiveValue::Float(v) => Some(Num::F32(v)),
            PrimitiveValue::Double(v) => Some(Num::F64(v)),
            _ => None,
        }
    }

    fn rank(self) -> Rank {
        match self {
            Num::I32(_) => Rank::Int,
            Num::I64(_) => Rank::Long,
            Num::F32(_) => Rank::Float,
            Num::F64(_) => Rank::Double,
        }
    }

    fn widen(self, rank: Rank) -> Num {
        match (self, rank) {
            (Num::I32(v), Rank::Long) => Num::I64(i64::from(v)),
            (Num::I32(v), Rank::Float) => Num::F32(v as f32),
            (Num::I32(v), Rank::Double) => Num::F64(f64::from(v)),
            (Num::I64(v), Rank::Float) => Num::F32(v as f32),
            (Num::I64(v), Rank::Double) => Num::F64(v as f64),
            (Num::F32(v), Rank::Double) => Num::F64(f64::from(v)),
            (same, _) => same,
        }
    }

    fn promote(lhs: Num, rhs: Num) -> (Num, Num) {
        let rank = lhs.rank().max(rhs.rank());
        (lhs.widen(rank), rhs.widen(rank))
    }
}

macro_rules! integral_arithmetic {
    ($name:ident, $ty:ty) => {
        fn $name(op: &str, l: $ty, r: $ty) -> Option<BuiltinResult<$ty>> {
            let value = match op {
                "plus" => l.wrapping_add(r),
                "minus" => l.wrapping_sub(r),
                "times" => l.wrapping_mul(r),
                "div" if r == 0 => return Some(Err(Thrown::division_by_zero())),
                "div" => l.wrapping_div(r),
                "rem" if r == 0 => return Some(Err(Thrown::division_by_zero())),
                "rem" => l.wrapping_rem(r),
                _ => return None,
            };
            Some(Ok(value))
        }
    };
}

macro_rules! float_arithmetic {
    ($name:ident, $ty:ty) => {
        fn $name(op: &str, l: $ty, r: $ty) -> Option<$ty> {
            match op {
                "plus" => Some(l + r),
                "minus" => Some(l - r),
                "times" => Some(l * r),
                "div" => Some(l / r),
                "rem" => Some(l % r),
                _ => None,
            }
        }
    };
}

integral_arithmetic!(int_arithmetic, i32);
integral_arithmetic!(long_arithmetic, i64);
float_arithmetic!(float_arithmetic, f32);
float_arithmetic!(double_arithmetic, f64);

fn ordering_int(ordering: Ordering) -> PrimitiveValue {
    PrimitiveValue::Int(match ordering {
        Ordering::Less => -1,
        Ordering::Equal => 0,
        Ordering::Greater => 1,
    })
}

/// `Double.compare`: `-0.0 < 0.0`, NaN above everything and equal to itself.
fn total_order(l: f64, r: f64) -> Ordering {
    match (l.is_nan(), r.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => l
            .partial_cmp(&r)
            .unwrap_or(Ordering::Equal)
            .then_with(|| l.is_sign_positive().cmp(&r.is_sign_positive())),
    }
}

/// IEEE comparison operators; any NaN operand makes them false.
fn comparison(op: &str, ordering: Option<Ordering>) -> Option<PrimitiveValue> {
    let result = match op {
        "less" => ordering == Some(Ordering::Less),
        "lessOrEqual" => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
        "greater" => ordering == Some(Ordering::Greater),
        "greaterOrEqual" => matches!(ordering, Some(Ordering::Greater | Ordering::Equal)),
        _ => return None,
    };
    Some(PrimitiveValue::Boolean(result))
}

pub(super) fn binary(op: &str, lhs: &PrimitiveValue, rhs: &PrimitiveValue) -> Option<BuiltinResult> {
    match op {
        "and" | "or" | "xor" => return bitwise(op, lhs, rhs).map(Ok),
        "shl" | "shr" | "ushr" => return shift(op, lhs, rhs).map(Ok),
        _ => {}
    }
    let (l, r) = Num::promote(Num::of(lhs)?, Num::of(rhs)?);
    if op == "compareTo" {
        let ordering = match (l, r) {
            (Num::I32(a), Num::I32(b)) => a.cmp(&b),
            (Num::I64(a), Num::I64(b)) => a.cmp(&b),
            (Num::F32(a), Num::F32(b)) => total_order(f64::from(a), f64::from(b)),
            (Num::F64(a), Num::F64(b)) => total_order(a, b),
            _ => return None,
        };
        return Some(Ok(ordering_int(ordering)));
    }
    let ordering = match (l, r) {
        (Num::I32(a), Num::I32(b)) => Some(a.cmp(&b)),
        (Num::I64(a), Num::I64(b)) => Some(a.cmp(&b)),
        (Num::F32(a), Num::F32(b)) => a.partial_cmp(&b),
        (Num::F64(a), Num::F64(b)) => a.partial_cmp(&b),
        _ => None,
    };
    if let Some(result) = comparison(op, ordering) {
        return Some(Ok(result));
    }
    match (l, r) {
        (Num::I32(a), Num::I32(b)) => int_arithmetic(op, a, b).map(|r| r.map(PrimitiveValue::Int)),
        (Num::I64(a), Num::I64(b)) => long_arithmetic(op, a, b).map(|r| r.map(PrimitiveValue::Long)),
        (Num::F32(a), Num::F32(b)) => float_arithmetic(op, a, b).map(|v| Ok(PrimitiveValue::Float(v))),
        (Num::F64(a), Num::F64(b)) => double_arithmetic(op, a, b).map(|v| Ok(PrimitiveValue::Double(v))),
        _ => None,
    }
}

fn bitwise(op: &str, lhs: &PrimitiveValue, rhs: &PrimitiveValue) -> Option<PrimitiveValue> {
    macro_rules! apply {
        ($l:expr, $r:expr) => {
            match op {
                "and" => $l & $r,
                "or" => $l | $r,
                _ => $l ^ $r,
            }
        };
    }
    match (lhs, rhs) {
        (PrimitiveValue::Int(l), PrimitiveValue::Int(r)) => Some(PrimitiveValue::Int(apply!(l, r))),
        (PrimitiveValue::Long(l), PrimitiveValue::Long(r)) => Some(PrimitiveValue::Long(apply!(l, r))),
        (PrimitiveValue::Short(l), PrimitiveValue::Short(r)) => Some(PrimitiveValue::Short(apply!(l, r))),
        (PrimitiveValue::Byte(l), PrimitiveValue::Byte(r)) => Some(PrimitiveValue::Byte(apply!(l, r))),
        _ => None,
    }
}

/// Shift distances are masked to the operand width.
fn shift(op: &str, lhs: &PrimitiveValue, rhs: &PrimitiveValue) -> Option<PrimitiveValue> {
    let distance = rhs.as_i32()? as u32;
    match *lhs {
        PrimitiveValue::Int(v) => Some(PrimitiveValue::Int(match op {
            "shl" => v.wrapping_shl(distance),
            "shr" => v.wrapping_shr(distance),
            _ => (v as u32).wrapping_shr(distance) as i32,
        })),
        PrimitiveValue::Long(v) => Some(PrimitiveValue::Long(match op {
            "shl" => v.wrapping_shl(distance),
            "shr" => v.wrapping_shr(distance),
            _ => (v as u64).wrapping_shr(distance) as i64,
        })),
        _ => None,
    }
}

pub(super) fn unary(op: &str, value: &PrimitiveValue) -> Option<BuiltinResult> {
    if let Some(converted) = convert(op, value) {
        return Some(Ok(converted));
    }
    let result = match (op, value.clone()) {
        ("unaryMinus", PrimitiveValue::Byte(v)) => PrimitiveValue::Int(-i32::from(v)),
        ("unaryMinus", PrimitiveValue::Short(v)) => PrimitiveValue::Int(-i32::from(v)),
        ("unaryMinus", PrimitiveValue::Int(v)) => PrimitiveValue::Int(v.wrapping_neg()),
        ("unaryMinus", PrimitiveValue::Long(v)) => PrimitiveValue::Long(v.wrapping_neg()),
        ("unaryMinus", PrimitiveValue::Float(v)) => PrimitiveValue::Float(-v),
        ("unaryMinus", PrimitiveValue::Double(v)) => PrimitiveValue::Double(-v),

        ("unaryPlus", PrimitiveValue::Byte(v)) => PrimitiveValue::Int(i32::from(v)),
        ("unaryPlus", PrimitiveValue::Short(v)) => PrimitiveValue::Int(i32::from(v)),
        ("unaryPlus", other) => other,

        ("inc", PrimitiveValue::Byte(v)) => PrimitiveValue::Byte(v.wrapping_add(1)),
        ("inc", PrimitiveValue::Short(v)) => PrimitiveValue::Short(v.wrapping_add(1)),
        ("inc", PrimitiveValue::Int(v)) => PrimitiveValue::Int(v.wrapping_add(1)),
        ("inc", PrimitiveValue::Long(v)) => PrimitiveValue::Long(v.wrapping_add(1)),
        ("inc", PrimitiveValue::Float(v)) => PrimitiveValue::Float(v + 1.0),
        ("inc", PrimitiveValue::Double(v)) => PrimitiveValue::Double(v + 1.0),

        ("dec", PrimitiveValue::Byte(v)) => PrimitiveValue::Byte(v.wrapping_sub(1)),
        ("dec", PrimitiveValue::Short(v)) => PrimitiveValue::Short(v.wrapping_sub(1)),
        ("dec", PrimitiveValue::Int(v)) => PrimitiveValue::Int(v.wrapping_sub(1)),
        ("dec", PrimitiveValue::Long(v)) => PrimitiveValue::Long(v.wrapping_sub(1)),
        ("dec", PrimitiveValue::Float(v)) => PrimitiveValue::Float(v - 1.0),
        ("dec", PrimitiveValue::Double(v)) => PrimitiveValue::Double(v - 1.0),

        ("inv", PrimitiveValue::Byte(v)) => PrimitiveValue::Byte(!v),
        ("inv", PrimitiveValue::Short(v)) => PrimitiveValue::Short(!v),
        ("inv", PrimitiveValue::Int(v)) => PrimitiveValue::Int(!v),
        ("inv", PrimitiveValue::Long(v)) => PrimitiveValue::Long(!v),
        _ => return None,
    };
    Some(Ok(result))
}

/// `toX()` conversions. Integral narrowing keeps the low bits; floating
/// to integral saturates with NaN as zero, narrowing below `Int` through
/// `toInt` first.
fn convert(op: &str, value: &PrimitiveValue) -> Option<PrimitiveValue> {
    let num = Num::of(value)?;
    let as_long = match num {
        Num::I32(v) => i64::from(v),
        Num::I64(v) => v,
        Num::F32(v) => v as i64,
        Num::F64(v) => v as i64,
    };
    let as_int = match num {
        Num::F32(v) => v as i32,
        Num::F64(v) => v as i32,
        _ => as_long as i32,
    };
    let as_double = match num {
        Num::I32(v) => f64::from(v),
        Num::I64(v) => v as f64,
        Num::F32(v) => f64::from(v),
        Num::F64(v) => v,
    };
    let converted = match op {
        "toByte" => PrimitiveValue::Byte(as_int as i8),
        "toShort" => PrimitiveValue::Short(as_int as i16),
        "toInt" => PrimitiveValue::Int(as_int),
        "toLong" => PrimitiveValue::Long(as_long),
        "toChar" => PrimitiveValue::Char(as_int as u16),
        "toFloat" => PrimitiveValue::Float(match num {
            Num::I32(v) => v as f32,
            Num::I64(v) => v as f32,
            Num::F32(v) => v,
            Num::F64(v) => v as f32,
        }),
        "toDouble" => PrimitiveValue::Double(as_double),
        _ => return None,
    };
    Some(converted)
}

pub(super) fn char_unary(op: &str, c: u16) -> Option<BuiltinResult> {
    let code = i32::from(c);
    let result = match op {
        "<get-code>" | "toInt" => PrimitiveValue::Int(code),
        "toLong" => PrimitiveValue::Long(i64::from(code)),
        "toShort" => PrimitiveValue::Short(c as i16),
        "toByte" => PrimitiveValue::Byte(c as i8),
        "toDouble" => PrimitiveValue::Double(f64::from(code)),
        "toFloat" => PrimitiveValue::Float(f32::from(c)),
        "toChar" => PrimitiveValue::Char(c),
        "inc" => PrimitiveValue::Char(c.wrapping_add(1)),
        "dec" => PrimitiveValue::Char(c.wrapping_sub(1)),
        _ => return None,
    };
    Some(Ok(result))
}

pub(super) fn char_binary(op: &str, c: u16, arg: &PrimitiveValue) -> Option<BuiltinResult> {
    let result = match (op, arg) {
        ("plus", _) => PrimitiveValue::Char((i32::from(c).wrapping_add(arg.as_i32()?)) as u16),
        ("minus", PrimitiveValue::Char(other)) => PrimitiveValue::Int(i32::from(c) - i32::from(*other)),
        ("minus", _) => PrimitiveValue::Char((i32::from(c).wrapping_sub(arg.as_i32()?)) as u16),
        ("compareTo", PrimitiveValue::Char(other)) => PrimitiveValue::Int(i32::from(c) - i32::from(*other)),
        (_, PrimitiveValue::Char(other)) => comparison(op, Some(c.cmp(other)))?,
        _ => return None,
    };
    Some(Ok(result))
}
