//! Interned types.
//!
//! Every type the IR mentions is interned into a [`TypePool`] and referred
//! to by a [`TypeId`]. Builtin types occupy fixed indices so the evaluator
//! can match on them without a pool lookup.

use rustc_hash::FxHashMap;
use std::fmt;

use crate::ClassId;

/// Interned type handle.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct TypeId(u32);

impl TypeId {
    pub const UNIT: TypeId = TypeId(0);
    pub const NOTHING: TypeId = TypeId(1);
    pub const ANY: TypeId = TypeId(2);
    pub const STRING: TypeId = TypeId(3);
    pub const BOOLEAN: TypeId = TypeId(4);
    pub const CHAR: TypeId = TypeId(5);
    pub const BYTE: TypeId = TypeId(6);
    pub const SHORT: TypeId = TypeId(7);
    pub const INT: TypeId = TypeId(8);
    pub const LONG: TypeId = TypeId(9);
    pub const FLOAT: TypeId = TypeId(10);
    pub const DOUBLE: TypeId = TypeId(11);
    /// `Any?`
    pub const NULLABLE_ANY: TypeId = TypeId(12);
    /// `String?`
    pub const NULLABLE_STRING: TypeId = TypeId(13);
    /// `Nothing?`, the type of the `null` literal.
    pub const NULLABLE_NOTHING: TypeId = TypeId(14);

    /// First index available for types interned at run time.
    pub const FIRST_COMPOUND: u32 = 15;

    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        TypeId(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn is_builtin(self) -> bool {
        self.0 < Self::FIRST_COMPOUND
    }
}

impl fmt::Debug for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeId({})", self.0)
    }
}

/// Primitive value kinds with a fixed machine representation.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum PrimitiveType {
    Boolean,
    Char,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
}

impl PrimitiveType {
    pub const ALL: [PrimitiveType; 8] = [
        PrimitiveType::Boolean,
        PrimitiveType::Char,
        PrimitiveType::Byte,
        PrimitiveType::Short,
        PrimitiveType::Int,
        PrimitiveType::Long,
        PrimitiveType::Float,
        PrimitiveType::Double,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "Boolean",
            PrimitiveType::Char => "Char",
            PrimitiveType::Byte => "Byte",
            PrimitiveType::Short => "Short",
            PrimitiveType::Int => "Int",
            PrimitiveType::Long => "Long",
            PrimitiveType::Float => "Float",
            PrimitiveType::Double => "Double",
        }
    }

    /// Simple name of the specialized array class (`IntArray`, ...).
    pub const fn array_name(self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "BooleanArray",
            PrimitiveType::Char => "CharArray",
            PrimitiveType::Byte => "ByteArray",
            PrimitiveType::Short => "ShortArray",
            PrimitiveType::Int => "IntArray",
            PrimitiveType::Long => "LongArray",
            PrimitiveType::Float => "FloatArray",
            PrimitiveType::Double => "DoubleArray",
        }
    }

    pub const fn type_id(self) -> TypeId {
        match self {
            PrimitiveType::Boolean => TypeId::BOOLEAN,
            PrimitiveType::Char => TypeId::CHAR,
            PrimitiveType::Byte => TypeId::BYTE,
            PrimitiveType::Short => TypeId::SHORT,
            PrimitiveType::Int => TypeId::INT,
            PrimitiveType::Long => TypeId::LONG,
            PrimitiveType::Float => TypeId::FLOAT,
            PrimitiveType::Double => TypeId::DOUBLE,
        }
    }
}

/// Structural description of an interned type.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TypeKind {
    Unit,
    Nothing,
    Any,
    String,
    Primitive(PrimitiveType),
    /// User or prelude class, interface, object or enum.
    Class(ClassId),
    /// `Array<T>`
    Array(TypeId),
    /// `IntArray`, `CharArray`, ...
    PrimitiveArray(PrimitiveType),
    /// `FunctionN<...>` of the given arity.
    Function { arity: u8 },
    /// Unresolved type parameter, e.g. `T` of `arrayOf<T>`.
    Parameter(u16),
}

/// A type kind plus its nullability.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct TypeData {
    pub kind: TypeKind,
    pub nullable: bool,
}

/// Type interning pool.
#[derive(Clone, Debug)]
pub struct TypePool {
    types: Vec<TypeData>,
    lookup: FxHashMap<TypeData, TypeId>,
}

impl TypePool {
    pub fn new() -> Self {
        let mut pool = TypePool {
            types: Vec::with_capacity(64),
            lookup: FxHashMap::default(),
        };
        let fixed = [
            (TypeKind::Unit, false),
            (TypeKind::Nothing, false),
            (TypeKind::Any, false),
            (TypeKind::String, false),
            (TypeKind::Primitive(PrimitiveType::Boolean), false),
            (TypeKind::Primitive(PrimitiveType::Char), false),
            (TypeKind::Primitive(PrimitiveType::Byte), false),
            (TypeKind::Primitive(PrimitiveType::Short), false),
            (TypeKind::Primitive(PrimitiveType::Int), false),
            (TypeKind::Primitive(PrimitiveType::Long), false),
            (TypeKind::Primitive(PrimitiveType::Float), false),
            (TypeKind::Primitive(PrimitiveType::Double), false),
            (TypeKind::Any, true),
            (TypeKind::String, true),
            (TypeKind::Nothing, true),
        ];
        for (kind, nullable) in fixed {
            pool.intern(TypeData { kind, nullable });
        }
        debug_assert_eq!(pool.types.len(), TypeId::FIRST_COMPOUND as usize);
        pool
    }

    /// Intern a type, returning the existing id when already present.
    pub fn intern(&mut self, data: TypeData) -> TypeId {
        if let Some(&id) = self.lookup.get(&data) {
            return id;
        }
        let raw = u32::try_from(self.types.len())
            .unwrap_or_else(|_| panic!("type pool exceeds u32::MAX entries"));
        let id = TypeId(raw);
        self.types.push(data);
        self.lookup.insert(data, id);
        id
    }

    pub fn intern_kind(&mut self, kind: TypeKind) -> TypeId {
        self.intern(TypeData {
            kind,
            nullable: false,
        })
    }

    /// The type's data. Unknown ids read as `Any?`.
    pub fn get(&self, id: TypeId) -> TypeData {
        self.types
            .get(id.0 as usize)
            .copied()
            .unwrap_or(TypeData {
                kind: TypeKind::Any,
                nullable: true,
            })
    }

    #[inline]
    pub fn kind(&self, id: TypeId) -> TypeKind {
        self.get(id).kind
    }

    #[inline]
    pub fn is_nullable(&self, id: TypeId) -> bool {
        self.get(id).nullable
    }

    pub fn nullable(&mut self, id: TypeId) -> TypeId {
        let data = self.get(id);
        self.intern(TypeData {
            kind: data.kind,
            nullable: true,
        })
    }

    pub fn non_null(&mut self, id: TypeId) -> TypeId {
        let data = self.get(id);
        self.intern(TypeData {
            kind: data.kind,
            nullable: false,
        })
    }

    /// The id of an already-interned non-null version, without interning.
    pub fn find_non_null(&self, id: TypeId) -> Option<TypeId> {
        let data = self.get(id);
        self.lookup
            .get(&TypeData {
                kind: data.kind,
                nullable: false,
            })
            .copied()
    }

    pub fn class_type(&mut self, class: ClassId) -> TypeId {
        self.intern_kind(TypeKind::Class(class))
    }

    pub fn array_of(&mut self, element: TypeId) -> TypeId {
        self.intern_kind(TypeKind::Array(element))
    }

    pub fn primitive_array(&mut self, element: PrimitiveType) -> TypeId {
        self.intern_kind(TypeKind::PrimitiveArray(element))
    }

    pub fn function_type(&mut self, arity: u8) -> TypeId {
        self.intern_kind(TypeKind::Function { arity })
    }

    /// Element type of an array type, if `id` is one.
    pub fn array_element(&self, id: TypeId) -> Option<TypeId> {
        match self.kind(id) {
            TypeKind::Array(element) => Some(element),
            TypeKind::PrimitiveArray(p) => Some(p.type_id()),
            _ => None,
        }
    }

    pub fn class_of(&self, id: TypeId) -> Option<ClassId> {
        match self.kind(id) {
            TypeKind::Class(class) => Some(class),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl Default for TypePool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests;
