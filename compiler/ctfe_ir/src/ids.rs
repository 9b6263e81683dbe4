//! Index newtypes into the module's declaration tables and expression arena.

macro_rules! define_index {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            #[inline]
            pub const fn new(index: u32) -> Self {
                $name(index)
            }

            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }

            #[inline]
            pub const fn raw(self) -> u32 {
                self.0
            }

            pub(crate) fn from_len(len: usize) -> Self {
                $name(u32::try_from(len).unwrap_or_else(|_| {
                    panic!(concat!(stringify!($name), " table exceeds u32::MAX entries"))
                }))
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }
    };
}

define_index!(
    /// Class, interface, object or enum declaration.
    ClassId
);
define_index!(
    /// Function, constructor or property accessor.
    FunctionId
);
define_index!(
    /// Backing field of a property.
    FieldId
);
define_index!(
    /// Enum entry declaration.
    EnumEntryId
);
define_index!(
    /// Value declaration: parameter, receiver parameter, local variable or
    /// catch parameter. The symbolic key the call stack binds states to.
    ValueId
);
define_index!(
    /// Expression node in the [`ExprArena`](crate::ExprArena).
    ExprId
);

/// Contiguous range into one of the arena's side tables.
///
/// Layout: 8 bytes (start + len), so every [`ExprKind`](crate::ExprKind)
/// variant that holds a list stays `Copy`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default, Debug)]
pub struct Range<const TAG: u8> {
    pub start: u32,
    pub len: u16,
}

impl<const TAG: u8> Range<TAG> {
    pub const EMPTY: Self = Range { start: 0, len: 0 };

    #[inline]
    pub const fn len(self) -> usize {
        self.len as usize
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.len == 0
    }

    #[inline]
    pub(crate) const fn bounds(self) -> std::ops::Range<usize> {
        let start = self.start as usize;
        start..start + self.len as usize
    }
}

/// Range of child expressions (block statements, concat parts, vararg elements).
pub type ExprRange = Range<0>;
/// Range of argument slots; a slot may be empty (use the parameter default).
pub type ArgRange = Range<1>;
/// Range of catch clauses of a try expression.
pub type CatchRange = Range<2>;
/// Range of branches of a when expression.
pub type BranchRange = Range<3>;
/// Range of explicit type arguments of a call.
pub type TypeArgRange = Range<4>;

crate::static_assert_size!(ExprId, 4);
crate::static_assert_size!(ExprRange, 8);
