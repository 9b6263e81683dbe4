use std::rc::Rc;

use ctfe_ir::{ConstValue, IrModule, TypeId};

use super::{Shared, State};

/// Storage of an array state; shared so writes are visible through every
/// reference to the same array.
pub type ArrayStorage = Shared<Vec<State>>;

#[derive(Clone, Debug)]
pub enum PrimitiveValue {
    Unit,
    Null,
    Boolean(bool),
    /// UTF-16 code unit.
    Char(u16),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(Rc<str>),
    Array(ArrayStorage),
}

impl PrimitiveValue {
    pub fn string(text: &str) -> Self {
        PrimitiveValue::String(Rc::from(text))
    }

    pub fn from_const(value: ConstValue, module: &IrModule) -> Self {
        match value {
            ConstValue::Null => PrimitiveValue::Null,
            ConstValue::Boolean(b) => PrimitiveValue::Boolean(b),
            ConstValue::Char(c) => PrimitiveValue::Char(c),
            ConstValue::Byte(v) => PrimitiveValue::Byte(v),
            ConstValue::Short(v) => PrimitiveValue::Short(v),
            ConstValue::Int(v) => PrimitiveValue::Int(v),
            ConstValue::Long(v) => PrimitiveValue::Long(v),
            ConstValue::Float(bits) => PrimitiveValue::Float(f32::from_bits(bits)),
            ConstValue::Double(bits) => PrimitiveValue::Double(f64::from_bits(bits)),
            ConstValue::String(name) => PrimitiveValue::string(module.name(name)),
        }
    }

    /// Simple type name used as the builtin dispatch key.
    pub fn type_name(&self) -> &'static str {
        match self {
            PrimitiveValue::Unit => "Unit",
            PrimitiveValue::Null => "Nothing?",
            PrimitiveValue::Boolean(_) => "Boolean",
            PrimitiveValue::Char(_) => "Char",
            PrimitiveValue::Byte(_) => "Byte",
            PrimitiveValue::Short(_) => "Short",
            PrimitiveValue::Int(_) => "Int",
            PrimitiveValue::Long(_) => "Long",
            PrimitiveValue::Float(_) => "Float",
            PrimitiveValue::Double(_) => "Double",
            PrimitiveValue::String(_) => "String",
            PrimitiveValue::Array(_) => "Array",
        }
    }

    /// Builtin type of a scalar; arrays and null need context.
    pub fn natural_type(&self) -> TypeId {
        match self {
            PrimitiveValue::Unit => TypeId::UNIT,
            PrimitiveValue::Null => TypeId::NULLABLE_NOTHING,
            PrimitiveValue::Boolean(_) => TypeId::BOOLEAN,
            PrimitiveValue::Char(_) => TypeId::CHAR,
            PrimitiveValue::Byte(_) => TypeId::BYTE,
            PrimitiveValue::Short(_) => TypeId::SHORT,
            PrimitiveValue::Int(_) => TypeId::INT,
            PrimitiveValue::Long(_) => TypeId::LONG,
            PrimitiveValue::Float(_) => TypeId::FLOAT,
            PrimitiveValue::Double(_) => TypeId::DOUBLE,
            PrimitiveValue::String(_) => TypeId::STRING,
            PrimitiveValue::Array(_) => TypeId::ANY,
        }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, PrimitiveValue::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PrimitiveValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Integral value widened to `i64`; chars yield their code.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            PrimitiveValue::Byte(v) => Some(i64::from(v)),
            PrimitiveValue::Short(v) => Some(i64::from(v)),
            PrimitiveValue::Int(v) => Some(i64::from(v)),
            PrimitiveValue::Long(v) => Some(v),
            PrimitiveValue::Char(c) => Some(i64::from(c)),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match *self {
            PrimitiveValue::Byte(v) => Some(i32::from(v)),
            PrimitiveValue::Short(v) => Some(i32::from(v)),
            PrimitiveValue::Int(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            PrimitiveValue::Float(v) => Some(f64::from(v)),
            PrimitiveValue::Double(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PrimitiveValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayStorage> {
        match self {
            PrimitiveValue::Array(storage) => Some(storage),
            _ => None,
        }
    }
}

/// A primitive payload paired with its static type.
#[derive(Clone, Debug)]
pub struct Primitive {
    pub value: PrimitiveValue,
    pub ty: TypeId,
}

impl Primitive {
    pub fn new(value: PrimitiveValue, ty: TypeId) -> Self {
        Primitive { value, ty }
    }
}
