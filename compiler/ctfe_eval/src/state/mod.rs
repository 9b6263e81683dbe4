//! Values the interpreter manipulates.
//!
//! Heap-like states (`Complex`, `Exception`, arrays) are shared handles:
//! cloning a [`State`] clones the handle, so two states can be compared by
//! reference identity with [`State::same_ref`].

mod complex;
mod exception;
mod function;
mod primitive;
mod shared;
mod wrapper;

use std::rc::Rc;

use ctfe_ir::{ClassId, TypeId};

pub use complex::Complex;
pub use exception::ExceptionState;
pub use function::FunctionState;
pub use primitive::{ArrayStorage, Primitive, PrimitiveValue};
pub use shared::Shared;
pub use wrapper::Wrapper;

#[derive(Clone, Debug)]
pub enum State {
    /// Scalars, strings, null, unit and arrays.
    Primitive(Primitive),
    /// Instance of an interpretable class.
    Complex(Shared<Complex>),
    /// Host object.
    Wrapper(Rc<Wrapper>),
    /// Emulated exception.
    Exception(Shared<ExceptionState>),
    /// Function reference or lambda.
    Function(Rc<FunctionState>),
}

impl State {
    #[inline]
    pub fn unit() -> Self {
        State::Primitive(Primitive::new(PrimitiveValue::Unit, TypeId::UNIT))
    }

    #[inline]
    pub fn null(ty: TypeId) -> Self {
        State::Primitive(Primitive::new(PrimitiveValue::Null, ty))
    }

    #[inline]
    pub fn primitive(value: PrimitiveValue, ty: TypeId) -> Self {
        State::Primitive(Primitive::new(value, ty))
    }

    pub fn boolean(value: bool) -> Self {
        State::primitive(PrimitiveValue::Boolean(value), TypeId::BOOLEAN)
    }

    pub fn int(value: i32) -> Self {
        State::primitive(PrimitiveValue::Int(value), TypeId::INT)
    }

    pub fn long(value: i64) -> Self {
        State::primitive(PrimitiveValue::Long(value), TypeId::LONG)
    }

    pub fn double(value: f64) -> Self {
        State::primitive(PrimitiveValue::Double(value), TypeId::DOUBLE)
    }

    pub fn string(value: &str) -> Self {
        State::primitive(PrimitiveValue::string(value), TypeId::STRING)
    }

    pub fn array(elements: Vec<State>, ty: TypeId) -> Self {
        State::primitive(PrimitiveValue::Array(Shared::new(elements)), ty)
    }

    pub fn complex(object: Complex) -> Self {
        State::Complex(Shared::new(object))
    }

    pub fn exception(exception: ExceptionState) -> Self {
        State::Exception(Shared::new(exception))
    }

    /// Static type carried by the state.
    pub fn ty(&self) -> TypeId {
        match self {
            State::Primitive(p) => p.ty,
            State::Complex(c) => c.borrow().ty(),
            State::Wrapper(w) => w.ty(),
            State::Exception(e) => e.borrow().ty(),
            State::Function(f) => f.ty,
        }
    }

    /// Runtime class of objects and exceptions.
    pub fn class(&self) -> Option<ClassId> {
        match self {
            State::Complex(c) => Some(c.borrow().class()),
            State::Exception(e) => Some(e.borrow().class()),
            _ => None,
        }
    }

    #[inline]
    pub fn as_primitive(&self) -> Option<&Primitive> {
        match self {
            State::Primitive(p) => Some(p),
            _ => None,
        }
    }

    #[inline]
    pub fn as_value(&self) -> Option<&PrimitiveValue> {
        self.as_primitive().map(|p| &p.value)
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, State::Primitive(Primitive { value: PrimitiveValue::Null, .. }))
    }

    #[inline]
    pub fn is_unit(&self) -> bool {
        matches!(self, State::Primitive(Primitive { value: PrimitiveValue::Unit, .. }))
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.as_value().and_then(PrimitiveValue::as_bool)
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_value().and_then(PrimitiveValue::as_str)
    }

    /// Reference identity (`===`).
    ///
    /// Handles compare by pointer; scalars and strings by value, the way
    /// boxed values of the same constant compare on every target.
    pub fn same_ref(&self, other: &State) -> bool {
        match (self, other) {
            (State::Complex(a), State::Complex(b)) => a.ptr_eq(b),
            (State::Exception(a), State::Exception(b)) => a.ptr_eq(b),
            (State::Wrapper(a), State::Wrapper(b)) => Rc::ptr_eq(a, b) || a.object().same_object(b.object()),
            (State::Function(a), State::Function(b)) => Rc::ptr_eq(a, b),
            (State::Primitive(a), State::Primitive(b)) => match (&a.value, &b.value) {
                (PrimitiveValue::Array(x), PrimitiveValue::Array(y)) => x.ptr_eq(y),
                (PrimitiveValue::Null, PrimitiveValue::Null)
                | (PrimitiveValue::Unit, PrimitiveValue::Unit) => true,
                (PrimitiveValue::Boolean(x), PrimitiveValue::Boolean(y)) => x == y,
                (PrimitiveValue::Char(x), PrimitiveValue::Char(y)) => x == y,
                (PrimitiveValue::String(x), PrimitiveValue::String(y)) => x == y,
                (x, y) => match (x.as_i64(), y.as_i64()) {
                    (Some(l), Some(r)) => l == r && x.type_name() == y.type_name(),
                    _ => match (x.as_f64(), y.as_f64()) {
                        (Some(l), Some(r)) => l.to_bits() == r.to_bits(),
                        _ => false,
                    },
                },
            },
            _ => false,
        }
    }

    /// Short kind label for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            State::Primitive(p) => p.value.type_name(),
            State::Complex(_) => "object",
            State::Wrapper(_) => "host object",
            State::Exception(_) => "exception",
            State::Function(_) => "function",
        }
    }
}

#[cfg(test)]
mod tests;
