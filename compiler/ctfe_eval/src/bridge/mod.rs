//! Native bridge: host implementations of library classes and functions.
//!
//! Natives are plain function pointers keyed by `(owner, signature)`,
//! where the owner is a class fq name or a package and the signature is
//! the one [`IrModule::signature`](ctfe_ir::IrModule::signature) renders.
//! Values cross the boundary as [`HostValue`]s; host failures come back
//! as [`HostException`]s and become emulated exceptions.

mod convert;
mod stdlib;

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::builtins::format;
use crate::state::State;

pub use convert::{exception_state, from_host, to_host, ForeignThrowable};
pub use stdlib::THROWABLE_CLASSES;

/// A host-side object.
pub trait NativeObject: fmt::Debug {
    /// Fully qualified class name, the method dispatch key.
    fn class_name(&self) -> &str;

    fn as_any(&self) -> &dyn Any;

    /// `toString()` of the host object.
    fn render(&self) -> String;
}

/// Shared handle to a host object.
#[derive(Clone, Debug)]
pub struct HostObject(Rc<dyn NativeObject>);

impl HostObject {
    pub fn new<T: NativeObject + 'static>(object: T) -> Self {
        HostObject(Rc::new(object))
    }

    #[inline]
    pub fn class_name(&self) -> &str {
        self.0.class_name()
    }

    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref::<T>()
    }

    pub fn render(&self) -> String {
        self.0.render()
    }

    /// Same host object, ignoring vtable identity.
    pub fn same_object(&self, other: &HostObject) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(&self.0), Rc::as_ptr(&other.0))
    }

    pub fn addr(&self) -> usize {
        Rc::as_ptr(&self.0).cast::<()>() as usize
    }
}

/// A throwable raised or passed on the host side.
#[derive(Clone, Debug)]
pub struct HostException {
    pub class_name: String,
    pub message: Option<String>,
    pub cause: Option<Rc<HostException>>,
    /// Emulated exception this was converted from, if any.
    pub origin: Option<State>,
}

impl HostException {
    pub fn new(class_name: impl Into<String>, message: Option<String>) -> Self {
        HostException {
            class_name: class_name.into(),
            message,
            cause: None,
            origin: None,
        }
    }

    #[must_use]
    pub fn with_cause(mut self, cause: Option<Rc<HostException>>) -> Self {
        self.cause = cause;
        self
    }

    pub fn render(&self) -> String {
        match &self.message {
            Some(message) => format!("{}: {message}", self.class_name),
            None => self.class_name.clone(),
        }
    }
}

/// A value crossing the bridge.
#[derive(Clone, Debug)]
pub enum HostValue {
    Unit,
    Null,
    Boolean(bool),
    Char(u16),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Str(Rc<str>),
    Array(Vec<HostValue>),
    Object(HostObject),
    Throwable(Rc<HostException>),
    /// Interpreted state passed through opaquely.
    Proxy(State),
}

impl HostValue {
    pub fn str(text: impl AsRef<str>) -> Self {
        HostValue::Str(Rc::from(text.as_ref()))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            HostValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match *self {
            HostValue::Int(v) => Some(v),
            HostValue::Short(v) => Some(i32::from(v)),
            HostValue::Byte(v) => Some(i32::from(v)),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            HostValue::Long(v) => Some(v),
            _ => self.as_i32().map(i64::from),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            HostValue::Double(v) => Some(v),
            HostValue::Float(v) => Some(f64::from(v)),
            _ => None,
        }
    }

    /// `toString()` as the host library would render the value.
    pub fn render(&self) -> String {
        match self {
            HostValue::Unit => "kotlin.Unit".to_owned(),
            HostValue::Null => "null".to_owned(),
            HostValue::Boolean(b) => b.to_string(),
            HostValue::Char(c) => String::from_utf16_lossy(&[*c]),
            HostValue::Byte(v) => v.to_string(),
            HostValue::Short(v) => v.to_string(),
            HostValue::Int(v) => v.to_string(),
            HostValue::Long(v) => v.to_string(),
            HostValue::Float(v) => format::jvm_float(*v),
            HostValue::Double(v) => format::jvm_double(*v),
            HostValue::Str(s) => s.to_string(),
            HostValue::Array(items) => {
                let parts: Vec<String> = items.iter().map(HostValue::render).collect();
                format!("[{}]", parts.join(", "))
            }
            HostValue::Object(object) => object.render(),
            HostValue::Throwable(exception) => exception.render(),
            HostValue::Proxy(state) => match state {
                State::Exception(e) => e.borrow().render(),
                other => format!("<{}>", other.kind_name()),
            },
        }
    }

    /// `equals` as host collections apply it.
    pub fn host_equals(&self, other: &HostValue) -> bool {
        match (self, other) {
            (HostValue::Unit, HostValue::Unit) | (HostValue::Null, HostValue::Null) => true,
            (HostValue::Boolean(a), HostValue::Boolean(b)) => a == b,
            (HostValue::Char(a), HostValue::Char(b)) => a == b,
            (HostValue::Byte(a), HostValue::Byte(b)) => a == b,
            (HostValue::Short(a), HostValue::Short(b)) => a == b,
            (HostValue::Int(a), HostValue::Int(b)) => a == b,
            (HostValue::Long(a), HostValue::Long(b)) => a == b,
            (HostValue::Float(a), HostValue::Float(b)) => a.to_bits() == b.to_bits(),
            (HostValue::Double(a), HostValue::Double(b)) => a.to_bits() == b.to_bits(),
            (HostValue::Str(a), HostValue::Str(b)) => a == b,
            (HostValue::Object(a), HostValue::Object(b)) => a.same_object(b),
            (HostValue::Proxy(a), HostValue::Proxy(b)) => a.same_ref(b),
            _ => false,
        }
    }
}

pub type HostResult = Result<HostValue, HostException>;

/// Arguments of one native invocation.
pub struct NativeCall<'a> {
    /// Class fq name for constructors and methods, package for functions.
    pub owner: &'a str,
    pub receiver: Option<&'a HostObject>,
    /// Extension receiver first, then parameters.
    pub args: &'a [HostValue],
}

impl NativeCall<'_> {
    pub fn arg(&self, index: usize) -> &HostValue {
        self.args.get(index).unwrap_or(&HostValue::Null)
    }

    pub fn str_arg(&self, index: usize) -> Result<&str, HostException> {
        self.arg(index)
            .as_str()
            .ok_or_else(|| illegal_argument(index, "String"))
    }

    pub fn int_arg(&self, index: usize) -> Result<i32, HostException> {
        self.arg(index)
            .as_i32()
            .ok_or_else(|| illegal_argument(index, "Int"))
    }

    pub fn long_arg(&self, index: usize) -> Result<i64, HostException> {
        self.arg(index)
            .as_i64()
            .ok_or_else(|| illegal_argument(index, "Long"))
    }

    pub fn double_arg(&self, index: usize) -> Result<f64, HostException> {
        self.arg(index)
            .as_f64()
            .ok_or_else(|| illegal_argument(index, "Double"))
    }

    pub fn receiver<T: 'static>(&self) -> Result<&T, HostException> {
        self.receiver
            .and_then(HostObject::downcast_ref::<T>)
            .ok_or_else(|| {
                HostException::new(
                    "kotlin.ClassCastException",
                    Some(format!("receiver is not a {}", self.owner)),
                )
            })
    }
}

fn illegal_argument(index: usize, expected: &str) -> HostException {
    HostException::new(
        "kotlin.IllegalArgumentException",
        Some(format!("argument {index} is not a {expected}")),
    )
}

pub type NativeFn = fn(&NativeCall<'_>) -> HostResult;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum NativeKind {
    Constructor,
    Method,
    Function,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct NativeKey {
    pub kind: NativeKind,
    pub owner: String,
    pub signature: String,
}

/// Registry of host implementations.
#[derive(Clone, Default)]
pub struct NativeRegistry {
    entries: FxHashMap<NativeKey, NativeFn>,
}

impl NativeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the standard library natives.
    pub fn with_stdlib() -> Self {
        let mut registry = Self::new();
        stdlib::install(&mut registry);
        registry
    }

    pub fn register(&mut self, kind: NativeKind, owner: &str, signature: &str, f: NativeFn) {
        self.entries.insert(
            NativeKey {
                kind,
                owner: owner.to_owned(),
                signature: signature.to_owned(),
            },
            f,
        );
    }

    pub fn lookup(&self, kind: NativeKind, owner: &str, signature: &str) -> Option<NativeFn> {
        self.entries
            .get(&NativeKey {
                kind,
                owner: owner.to_owned(),
                signature: signature.to_owned(),
            })
            .copied()
    }

    pub fn contains(&self, kind: NativeKind, owner: &str, signature: &str) -> bool {
        self.lookup(kind, owner, signature).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for NativeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeRegistry({} entries)", self.entries.len())
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
