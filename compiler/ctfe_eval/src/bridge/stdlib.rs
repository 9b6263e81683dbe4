//! Host implementations of the prelude's native declarations.

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use super::{HostException, HostObject, HostResult, HostValue, NativeCall, NativeKind, NativeObject, NativeRegistry};

/// Throwable classes whose constructors are served natively.
pub const THROWABLE_CLASSES: &[&str] = &[
    "kotlin.Throwable",
    "kotlin.Exception",
    "kotlin.Error",
    "kotlin.RuntimeException",
    "kotlin.ArithmeticException",
    "kotlin.IllegalArgumentException",
    "kotlin.IllegalStateException",
    "kotlin.NullPointerException",
    "kotlin.ClassCastException",
    "kotlin.IndexOutOfBoundsException",
    "kotlin.NoSuchElementException",
    "kotlin.NumberFormatException",
    "kotlin.UnsupportedOperationException",
    "kotlin.NoWhenBranchMatchedException",
    "kotlin.AssertionError",
    "kotlin.NotImplementedError",
];

const STRING_BUILDER: &str = "kotlin.text.StringBuilder";
const ARRAY_LIST: &str = "kotlin.collections.ArrayList";

pub(super) fn install(registry: &mut NativeRegistry) {
    install_throwables(registry);
    install_string_builder(registry);
    install_array_list(registry);
    install_math(registry);
    install_text(registry);

    registry.register(NativeKind::Function, "kotlin", "error(kotlin.Any)", error);
    registry.register(
        NativeKind::Function,
        "kotlin.collections",
        "listOf(kotlin.Array<kotlin.Any?>)",
        list_of,
    );
}

fn fail(class_name: &str, message: impl Into<String>) -> HostException {
    HostException::new(class_name, Some(message.into()))
}

fn receiver_value(call: &NativeCall<'_>) -> HostValue {
    call.receiver
        .cloned()
        .map_or(HostValue::Null, HostValue::Object)
}

fn utf16_len(text: &str) -> usize {
    text.encode_utf16().count()
}

fn int_result(value: usize) -> HostValue {
    HostValue::Int(i32::try_from(value).unwrap_or(i32::MAX))
}

// Throwables

fn cause_arg(value: &HostValue) -> Option<Rc<HostException>> {
    match value {
        HostValue::Throwable(exception) => Some(Rc::clone(exception)),
        _ => None,
    }
}

fn message_arg(value: &HostValue) -> Option<String> {
    match value {
        HostValue::Null => None,
        other => Some(other.render()),
    }
}

fn throwable_empty(call: &NativeCall<'_>) -> HostResult {
    Ok(HostValue::Throwable(Rc::new(HostException::new(call.owner, None))))
}

fn throwable_message(call: &NativeCall<'_>) -> HostResult {
    let exception = HostException::new(call.owner, message_arg(call.arg(0)));
    Ok(HostValue::Throwable(Rc::new(exception)))
}

fn throwable_message_cause(call: &NativeCall<'_>) -> HostResult {
    let exception =
        HostException::new(call.owner, message_arg(call.arg(0))).with_cause(cause_arg(call.arg(1)));
    Ok(HostValue::Throwable(Rc::new(exception)))
}

fn throwable_cause(call: &NativeCall<'_>) -> HostResult {
    let cause = cause_arg(call.arg(0));
    let message = cause.as_ref().map(|c| c.render());
    let exception = HostException::new(call.owner, message).with_cause(cause);
    Ok(HostValue::Throwable(Rc::new(exception)))
}

fn install_throwables(registry: &mut NativeRegistry) {
    for &class in THROWABLE_CLASSES {
        let ctor = NativeKind::Constructor;
        registry.register(ctor, class, "<init>()", throwable_empty);
        registry.register(ctor, class, "<init>(kotlin.String?)", throwable_message);
        registry.register(
            ctor,
            class,
            "<init>(kotlin.String?, kotlin.Throwable?)",
            throwable_message_cause,
        );
        registry.register(ctor, class, "<init>(kotlin.Throwable?)", throwable_cause);
    }
}

// StringBuilder

#[derive(Debug, Default)]
struct StringBuilder {
    buffer: RefCell<String>,
}

impl NativeObject for StringBuilder {
    fn class_name(&self) -> &str {
        STRING_BUILDER
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn render(&self) -> String {
        self.buffer.borrow().clone()
    }
}

fn sb_new(_: &NativeCall<'_>) -> HostResult {
    Ok(HostValue::Object(HostObject::new(StringBuilder::default())))
}

fn sb_from(call: &NativeCall<'_>) -> HostResult {
    let builder = StringBuilder {
        buffer: RefCell::new(call.str_arg(0)?.to_owned()),
    };
    Ok(HostValue::Object(HostObject::new(builder)))
}

fn sb_append(call: &NativeCall<'_>) -> HostResult {
    let builder = call.receiver::<StringBuilder>()?;
    builder.buffer.borrow_mut().push_str(&call.arg(0).render());
    Ok(receiver_value(call))
}

fn sb_to_string(call: &NativeCall<'_>) -> HostResult {
    Ok(HostValue::str(call.receiver::<StringBuilder>()?.render()))
}

fn sb_length(call: &NativeCall<'_>) -> HostResult {
    Ok(int_result(utf16_len(&call.receiver::<StringBuilder>()?.buffer.borrow())))
}

fn sb_reverse(call: &NativeCall<'_>) -> HostResult {
    let builder = call.receiver::<StringBuilder>()?;
    let reversed: String = builder.buffer.borrow().chars().rev().collect();
    *builder.buffer.borrow_mut() = reversed;
    Ok(receiver_value(call))
}

fn sb_clear(call: &NativeCall<'_>) -> HostResult {
    call.receiver::<StringBuilder>()?.buffer.borrow_mut().clear();
    Ok(receiver_value(call))
}

fn install_string_builder(registry: &mut NativeRegistry) {
    registry.register(NativeKind::Constructor, STRING_BUILDER, "<init>()", sb_new);
    registry.register(NativeKind::Constructor, STRING_BUILDER, "<init>(kotlin.String)", sb_from);
    for ty in [
        "kotlin.String?",
        "kotlin.Any?",
        "kotlin.Char",
        "kotlin.Int",
        "kotlin.Long",
        "kotlin.Boolean",
        "kotlin.Double",
    ] {
        registry.register(NativeKind::Method, STRING_BUILDER, &format!("append({ty})"), sb_append);
    }
    let method = NativeKind::Method;
    registry.register(method, STRING_BUILDER, "toString()", sb_to_string);
    registry.register(method, STRING_BUILDER, "<get-length>()", sb_length);
    registry.register(method, STRING_BUILDER, "reverse()", sb_reverse);
    registry.register(method, STRING_BUILDER, "clear()", sb_clear);
}

// ArrayList

#[derive(Debug, Default)]
struct ArrayList {
    items: RefCell<Vec<HostValue>>,
}

impl NativeObject for ArrayList {
    fn class_name(&self) -> &str {
        ARRAY_LIST
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn render(&self) -> String {
        let parts: Vec<String> = self.items.borrow().iter().map(HostValue::render).collect();
        format!("[{}]", parts.join(", "))
    }
}

fn checked_index(call: &NativeCall<'_>, len: usize) -> Result<usize, HostException> {
    let index = call.int_arg(0)?;
    usize::try_from(index)
        .ok()
        .filter(|&i| i < len)
        .ok_or_else(|| {
            fail(
                "kotlin.IndexOutOfBoundsException",
                format!("Index {index} out of bounds for length {len}"),
            )
        })
}

fn list_new(_: &NativeCall<'_>) -> HostResult {
    Ok(HostValue::Object(HostObject::new(ArrayList::default())))
}

fn list_add(call: &NativeCall<'_>) -> HostResult {
    let list = call.receiver::<ArrayList>()?;
    list.items.borrow_mut().push(call.arg(0).clone());
    Ok(HostValue::Boolean(true))
}

fn list_get(call: &NativeCall<'_>) -> HostResult {
    let list = call.receiver::<ArrayList>()?;
    let items = list.items.borrow();
    let index = checked_index(call, items.len())?;
    Ok(items[index].clone())
}

fn list_set(call: &NativeCall<'_>) -> HostResult {
    let list = call.receiver::<ArrayList>()?;
    let mut items = list.items.borrow_mut();
    let index = checked_index(call, items.len())?;
    Ok(std::mem::replace(&mut items[index], call.arg(1).clone()))
}

fn list_remove_at(call: &NativeCall<'_>) -> HostResult {
    let list = call.receiver::<ArrayList>()?;
    let mut items = list.items.borrow_mut();
    let index = checked_index(call, items.len())?;
    Ok(items.remove(index))
}

fn list_size(call: &NativeCall<'_>) -> HostResult {
    Ok(int_result(call.receiver::<ArrayList>()?.items.borrow().len()))
}

fn list_is_empty(call: &NativeCall<'_>) -> HostResult {
    Ok(HostValue::Boolean(
        call.receiver::<ArrayList>()?.items.borrow().is_empty(),
    ))
}

fn list_index_of(call: &NativeCall<'_>) -> HostResult {
    let list = call.receiver::<ArrayList>()?;
    let needle = call.arg(0);
    let index = list
        .items
        .borrow()
        .iter()
        .position(|item| item.host_equals(needle));
    Ok(index.map_or(HostValue::Int(-1), int_result))
}

fn list_contains(call: &NativeCall<'_>) -> HostResult {
    let found = matches!(list_index_of(call)?, HostValue::Int(i) if i >= 0);
    Ok(HostValue::Boolean(found))
}

fn list_clear(call: &NativeCall<'_>) -> HostResult {
    call.receiver::<ArrayList>()?.items.borrow_mut().clear();
    Ok(HostValue::Unit)
}

fn list_to_string(call: &NativeCall<'_>) -> HostResult {
    Ok(HostValue::str(call.receiver::<ArrayList>()?.render()))
}

fn list_of(call: &NativeCall<'_>) -> HostResult {
    let items = match call.arg(0) {
        HostValue::Array(items) => items.clone(),
        _ => Vec::new(),
    };
    Ok(HostValue::Object(HostObject::new(ArrayList {
        items: RefCell::new(items),
    })))
}

fn install_array_list(registry: &mut NativeRegistry) {
    registry.register(NativeKind::Constructor, ARRAY_LIST, "<init>()", list_new);
    let method = NativeKind::Method;
    registry.register(method, ARRAY_LIST, "add(kotlin.Any?)", list_add);
    registry.register(method, ARRAY_LIST, "get(kotlin.Int)", list_get);
    registry.register(method, ARRAY_LIST, "set(kotlin.Int, kotlin.Any?)", list_set);
    registry.register(method, ARRAY_LIST, "removeAt(kotlin.Int)", list_remove_at);
    registry.register(method, ARRAY_LIST, "<get-size>()", list_size);
    registry.register(method, ARRAY_LIST, "isEmpty()", list_is_empty);
    registry.register(method, ARRAY_LIST, "contains(kotlin.Any?)", list_contains);
    registry.register(method, ARRAY_LIST, "indexOf(kotlin.Any?)", list_index_of);
    registry.register(method, ARRAY_LIST, "clear()", list_clear);
    registry.register(method, ARRAY_LIST, "toString()", list_to_string);
}

// kotlin.math

fn unary_math(call: &NativeCall<'_>, op: fn(f64) -> f64) -> HostResult {
    Ok(HostValue::Double(op(call.double_arg(0)?)))
}

fn math_sqrt(call: &NativeCall<'_>) -> HostResult {
    unary_math(call, f64::sqrt)
}

fn math_sin(call: &NativeCall<'_>) -> HostResult {
    unary_math(call, f64::sin)
}

fn math_cos(call: &NativeCall<'_>) -> HostResult {
    unary_math(call, f64::cos)
}

fn math_tan(call: &NativeCall<'_>) -> HostResult {
    unary_math(call, f64::tan)
}

fn math_exp(call: &NativeCall<'_>) -> HostResult {
    unary_math(call, f64::exp)
}

fn math_ln(call: &NativeCall<'_>) -> HostResult {
    unary_math(call, f64::ln)
}

fn math_log10(call: &NativeCall<'_>) -> HostResult {
    unary_math(call, f64::log10)
}

fn math_floor(call: &NativeCall<'_>) -> HostResult {
    unary_math(call, f64::floor)
}

fn math_ceil(call: &NativeCall<'_>) -> HostResult {
    unary_math(call, f64::ceil)
}

/// Rounds half to even.
fn math_round(call: &NativeCall<'_>) -> HostResult {
    unary_math(call, f64::round_ties_even)
}

fn math_pow(call: &NativeCall<'_>) -> HostResult {
    Ok(HostValue::Double(call.double_arg(0)?.powf(call.double_arg(1)?)))
}

fn math_abs_int(call: &NativeCall<'_>) -> HostResult {
    Ok(HostValue::Int(call.int_arg(0)?.wrapping_abs()))
}

fn math_abs_long(call: &NativeCall<'_>) -> HostResult {
    Ok(HostValue::Long(call.long_arg(0)?.wrapping_abs()))
}

fn math_abs_double(call: &NativeCall<'_>) -> HostResult {
    unary_math(call, f64::abs)
}

fn math_max_int(call: &NativeCall<'_>) -> HostResult {
    Ok(HostValue::Int(call.int_arg(0)?.max(call.int_arg(1)?)))
}

fn math_min_int(call: &NativeCall<'_>) -> HostResult {
    Ok(HostValue::Int(call.int_arg(0)?.min(call.int_arg(1)?)))
}

fn math_max_long(call: &NativeCall<'_>) -> HostResult {
    Ok(HostValue::Long(call.long_arg(0)?.max(call.long_arg(1)?)))
}

fn math_min_long(call: &NativeCall<'_>) -> HostResult {
    Ok(HostValue::Long(call.long_arg(0)?.min(call.long_arg(1)?)))
}

/// NaN-propagating, unlike `f64::max`.
fn math_max_double(call: &NativeCall<'_>) -> HostResult {
    let (a, b) = (call.double_arg(0)?, call.double_arg(1)?);
    Ok(HostValue::Double(if a.is_nan() || b.is_nan() { f64::NAN } else { a.max(b) }))
}

fn math_min_double(call: &NativeCall<'_>) -> HostResult {
    let (a, b) = (call.double_arg(0)?, call.double_arg(1)?);
    Ok(HostValue::Double(if a.is_nan() || b.is_nan() { f64::NAN } else { a.min(b) }))
}

fn install_math(registry: &mut NativeRegistry) {
    let f = NativeKind::Function;
    let math = "kotlin.math";
    registry.register(f, math, "sqrt(kotlin.Double)", math_sqrt);
    registry.register(f, math, "sin(kotlin.Double)", math_sin);
    registry.register(f, math, "cos(kotlin.Double)", math_cos);
    registry.register(f, math, "tan(kotlin.Double)", math_tan);
    registry.register(f, math, "exp(kotlin.Double)", math_exp);
    registry.register(f, math, "ln(kotlin.Double)", math_ln);
    registry.register(f, math, "log10(kotlin.Double)", math_log10);
    registry.register(f, math, "floor(kotlin.Double)", math_floor);
    registry.register(f, math, "ceil(kotlin.Double)", math_ceil);
    registry.register(f, math, "round(kotlin.Double)", math_round);
    registry.register(f, math, "pow(kotlin.Double)", math_pow);
    registry.register(f, math, "abs(kotlin.Int)", math_abs_int);
    registry.register(f, math, "abs(kotlin.Long)", math_abs_long);
    registry.register(f, math, "abs(kotlin.Double)", math_abs_double);
    registry.register(f, math, "max(kotlin.Int, kotlin.Int)", math_max_int);
    registry.register(f, math, "min(kotlin.Int, kotlin.Int)", math_min_int);
    registry.register(f, math, "max(kotlin.Long, kotlin.Long)", math_max_long);
    registry.register(f, math, "min(kotlin.Long, kotlin.Long)", math_min_long);
    registry.register(f, math, "max(kotlin.Double, kotlin.Double)", math_max_double);
    registry.register(f, math, "min(kotlin.Double, kotlin.Double)", math_min_double);
}

// kotlin.text

fn text_uppercase(call: &NativeCall<'_>) -> HostResult {
    Ok(HostValue::str(call.str_arg(0)?.to_uppercase()))
}

fn text_lowercase(call: &NativeCall<'_>) -> HostResult {
    Ok(HostValue::str(call.str_arg(0)?.to_lowercase()))
}

fn text_trim(call: &NativeCall<'_>) -> HostResult {
    Ok(HostValue::str(call.str_arg(0)?.trim()))
}

fn text_reversed(call: &NativeCall<'_>) -> HostResult {
    Ok(HostValue::str(call.str_arg(0)?.chars().rev().collect::<String>()))
}

fn text_repeat(call: &NativeCall<'_>) -> HostResult {
    let text = call.str_arg(0)?;
    let n = call.int_arg(1)?;
    let count = usize::try_from(n).map_err(|_| {
        fail(
            "kotlin.IllegalArgumentException",
            format!("Count 'n' must be non-negative, but was {n}."),
        )
    })?;
    Ok(HostValue::str(text.repeat(count)))
}

fn text_starts_with(call: &NativeCall<'_>) -> HostResult {
    Ok(HostValue::Boolean(call.str_arg(0)?.starts_with(call.str_arg(1)?)))
}

fn text_ends_with(call: &NativeCall<'_>) -> HostResult {
    Ok(HostValue::Boolean(call.str_arg(0)?.ends_with(call.str_arg(1)?)))
}

fn text_contains(call: &NativeCall<'_>) -> HostResult {
    Ok(HostValue::Boolean(call.str_arg(0)?.contains(call.str_arg(1)?)))
}

/// UTF-16 index of the first occurrence, `-1` when absent.
fn text_index_of(call: &NativeCall<'_>) -> HostResult {
    let text = call.str_arg(0)?;
    Ok(match text.find(call.str_arg(1)?) {
        Some(byte) => int_result(utf16_len(&text[..byte])),
        None => HostValue::Int(-1),
    })
}

fn text_replace(call: &NativeCall<'_>) -> HostResult {
    let text = call.str_arg(0)?;
    Ok(HostValue::str(text.replace(call.str_arg(1)?, call.str_arg(2)?)))
}

fn padding(call: &NativeCall<'_>) -> Result<String, HostException> {
    let text = call.str_arg(0)?;
    let length = call.int_arg(1)?;
    let target = usize::try_from(length).map_err(|_| {
        fail(
            "kotlin.IllegalArgumentException",
            format!("Desired length {length} is less than zero."),
        )
    })?;
    let pad = match call.arg(2) {
        HostValue::Char(c) => String::from_utf16_lossy(&[*c]),
        _ => " ".to_owned(),
    };
    let missing = target.saturating_sub(utf16_len(text));
    Ok(pad.repeat(missing))
}

fn text_pad_start(call: &NativeCall<'_>) -> HostResult {
    Ok(HostValue::str(padding(call)? + call.str_arg(0)?))
}

fn text_pad_end(call: &NativeCall<'_>) -> HostResult {
    Ok(HostValue::str(call.str_arg(0)?.to_owned() + &padding(call)?))
}

fn text_substring_before(call: &NativeCall<'_>) -> HostResult {
    let text = call.str_arg(0)?;
    let delimiter = call.str_arg(1)?;
    Ok(HostValue::str(text.split_once(delimiter).map_or(text, |(before, _)| before)))
}

fn text_substring_after(call: &NativeCall<'_>) -> HostResult {
    let text = call.str_arg(0)?;
    let delimiter = call.str_arg(1)?;
    Ok(HostValue::str(text.split_once(delimiter).map_or(text, |(_, after)| after)))
}

fn text_is_blank(call: &NativeCall<'_>) -> HostResult {
    Ok(HostValue::Boolean(call.str_arg(0)?.chars().all(char::is_whitespace)))
}

fn number_format(text: &str) -> HostException {
    fail(
        "kotlin.NumberFormatException",
        format!("For input string: \"{text}\""),
    )
}

fn text_to_int(call: &NativeCall<'_>) -> HostResult {
    let text = call.str_arg(0)?;
    text.parse::<i32>()
        .map(HostValue::Int)
        .map_err(|_| number_format(text))
}

fn text_to_int_or_null(call: &NativeCall<'_>) -> HostResult {
    Ok(call
        .str_arg(0)?
        .parse::<i32>()
        .map_or(HostValue::Null, HostValue::Int))
}

fn text_to_long(call: &NativeCall<'_>) -> HostResult {
    let text = call.str_arg(0)?;
    text.parse::<i64>()
        .map(HostValue::Long)
        .map_err(|_| number_format(text))
}

fn text_to_double(call: &NativeCall<'_>) -> HostResult {
    let text = call.str_arg(0)?;
    text.trim()
        .parse::<f64>()
        .map(HostValue::Double)
        .map_err(|_| number_format(text))
}

fn install_text(registry: &mut NativeRegistry) {
    let f = NativeKind::Function;
    let text = "kotlin.text";
    registry.register(f, text, "uppercase()", text_uppercase);
    registry.register(f, text, "lowercase()", text_lowercase);
    registry.register(f, text, "trim()", text_trim);
    registry.register(f, text, "reversed()", text_reversed);
    registry.register(f, text, "repeat(kotlin.Int)", text_repeat);
    registry.register(f, text, "startsWith(kotlin.String)", text_starts_with);
    registry.register(f, text, "endsWith(kotlin.String)", text_ends_with);
    registry.register(f, text, "contains(kotlin.String)", text_contains);
    registry.register(f, text, "indexOf(kotlin.String)", text_index_of);
    registry.register(f, text, "replace(kotlin.String, kotlin.String)", text_replace);
    registry.register(f, text, "padStart(kotlin.Int, kotlin.Char)", text_pad_start);
    registry.register(f, text, "padEnd(kotlin.Int, kotlin.Char)", text_pad_end);
    registry.register(f, text, "substringBefore(kotlin.String)", text_substring_before);
    registry.register(f, text, "substringAfter(kotlin.String)", text_substring_after);
    registry.register(f, text, "isBlank()", text_is_blank);
    registry.register(f, text, "toInt()", text_to_int);
    registry.register(f, text, "toIntOrNull()", text_to_int_or_null);
    registry.register(f, text, "toLong()", text_to_long);
    registry.register(f, text, "toDouble()", text_to_double);
}

fn error(call: &NativeCall<'_>) -> HostResult {
    Err(fail("kotlin.IllegalStateException", call.arg(0).render()))
}
