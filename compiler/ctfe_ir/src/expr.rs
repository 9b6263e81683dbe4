//! Expression nodes.
//!
//! Nodes are flattened into an [`ExprArena`]: children are referenced by
//! [`ExprId`] and lists by ranges into side tables, so [`ExprKind`] is
//! `Copy` and can be copied out of the arena before dispatch.

use std::fmt;

use crate::{
    ArgRange, BranchRange, CatchRange, ClassId, EnumEntryId, ExprId, ExprRange, FieldId,
    FunctionId, Name, TypeArgRange, TypeId, ValueId,
};

/// Source position of a node.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default, Debug)]
pub struct Span {
    pub line: u32,
    pub column: u32,
}

impl Span {
    /// Span for nodes that have no source, such as synthesized bodies.
    pub const DUMMY: Span = Span { line: 0, column: 0 };

    pub const fn new(line: u32, column: u32) -> Self {
        Span { line, column }
    }
}

/// Literal value of a [`ExprKind::Const`] node.
///
/// Floats are stored as bits so the type stays `Eq + Hash`.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub enum ConstValue {
    Null,
    Boolean(bool),
    /// UTF-16 code unit.
    Char(u16),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(u32),
    Double(u64),
    String(Name),
}

impl ConstValue {
    pub fn float(value: f32) -> Self {
        ConstValue::Float(value.to_bits())
    }

    pub fn double(value: f64) -> Self {
        ConstValue::Double(value.to_bits())
    }

    /// Builtin type of the literal. `null` is `Nothing?`.
    pub fn type_id(self) -> TypeId {
        match self {
            ConstValue::Null => TypeId::NULLABLE_NOTHING,
            ConstValue::Boolean(_) => TypeId::BOOLEAN,
            ConstValue::Char(_) => TypeId::CHAR,
            ConstValue::Byte(_) => TypeId::BYTE,
            ConstValue::Short(_) => TypeId::SHORT,
            ConstValue::Int(_) => TypeId::INT,
            ConstValue::Long(_) => TypeId::LONG,
            ConstValue::Float(_) => TypeId::FLOAT,
            ConstValue::Double(_) => TypeId::DOUBLE,
            ConstValue::String(_) => TypeId::STRING,
        }
    }
}

impl fmt::Debug for ConstValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstValue::Null => write!(f, "null"),
            ConstValue::Boolean(b) => write!(f, "{b}"),
            ConstValue::Char(c) => write!(f, "Char({c})"),
            ConstValue::Byte(v) => write!(f, "{v}b"),
            ConstValue::Short(v) => write!(f, "{v}s"),
            ConstValue::Int(v) => write!(f, "{v}"),
            ConstValue::Long(v) => write!(f, "{v}L"),
            ConstValue::Float(bits) => write!(f, "{}f", f32::from_bits(*bits)),
            ConstValue::Double(bits) => write!(f, "{}", f64::from_bits(*bits)),
            ConstValue::String(name) => write!(f, "String({name:?})"),
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TypeOperator {
    InstanceOf,
    NotInstanceOf,
    Cast,
    SafeCast,
    ImplicitCoercionToUnit,
    ImplicitNotNull,
}

/// `catch (parameter: T) { body }`; the caught type is the parameter's type.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct CatchClause {
    pub parameter: ValueId,
    pub body: ExprId,
}

/// One `condition -> result` arm of a `when`.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct WhenBranch {
    pub condition: ExprId,
    pub result: ExprId,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum ExprKind {
    Const(ConstValue),
    GetValue(ValueId),
    SetValue {
        target: ValueId,
        value: ExprId,
    },
    Variable {
        value: ValueId,
        initializer: Option<ExprId>,
    },
    Call {
        callee: FunctionId,
        dispatch_receiver: Option<ExprId>,
        extension_receiver: Option<ExprId>,
        args: ArgRange,
        type_args: TypeArgRange,
        /// `super<T>.f()`: statically bound, no virtual dispatch.
        super_qualifier: Option<ClassId>,
    },
    ConstructorCall {
        constructor: FunctionId,
        args: ArgRange,
        type_args: TypeArgRange,
    },
    /// `super(...)` / `this(...)` from inside a constructor body.
    DelegatingConstructorCall {
        constructor: FunctionId,
        args: ArgRange,
    },
    /// Run the class's field initializers and init blocks on `this`.
    InstanceInitializer {
        class: ClassId,
    },
    GetField {
        field: FieldId,
        receiver: Option<ExprId>,
    },
    SetField {
        field: FieldId,
        receiver: Option<ExprId>,
        value: ExprId,
    },
    GetObject(ClassId),
    GetEnum(EnumEntryId),
    Block(ExprRange),
    Return {
        target: FunctionId,
        value: ExprId,
    },
    When(BranchRange),
    While {
        condition: ExprId,
        body: ExprId,
    },
    DoWhile {
        body: ExprId,
        condition: ExprId,
    },
    /// Leave the loop node `target`.
    Break {
        target: ExprId,
    },
    /// Restart the loop node `target` at its condition.
    Continue {
        target: ExprId,
    },
    Try {
        body: ExprId,
        catches: CatchRange,
        finally: Option<ExprId>,
    },
    Throw(ExprId),
    TypeOp {
        operator: TypeOperator,
        operand: ExprId,
        operand_type: TypeId,
    },
    StringConcat(ExprRange),
    /// Elements packed into an array of the node's type.
    Vararg(ExprRange),
    FunctionReference {
        function: FunctionId,
        dispatch_receiver: Option<ExprId>,
        extension_receiver: Option<ExprId>,
    },
    /// Erroneous node produced by an earlier phase.
    Error(Name),
}

impl ExprKind {
    /// Short node name used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            ExprKind::Const(_) => "Const",
            ExprKind::GetValue(_) => "GetValue",
            ExprKind::SetValue { .. } => "SetValue",
            ExprKind::Variable { .. } => "Variable",
            ExprKind::Call { .. } => "Call",
            ExprKind::ConstructorCall { .. } => "ConstructorCall",
            ExprKind::DelegatingConstructorCall { .. } => "DelegatingConstructorCall",
            ExprKind::InstanceInitializer { .. } => "InstanceInitializer",
            ExprKind::GetField { .. } => "GetField",
            ExprKind::SetField { .. } => "SetField",
            ExprKind::GetObject(_) => "GetObject",
            ExprKind::GetEnum(_) => "GetEnum",
            ExprKind::Block(_) => "Block",
            ExprKind::Return { .. } => "Return",
            ExprKind::When(_) => "When",
            ExprKind::While { .. } => "While",
            ExprKind::DoWhile { .. } => "DoWhile",
            ExprKind::Break { .. } => "Break",
            ExprKind::Continue { .. } => "Continue",
            ExprKind::Try { .. } => "Try",
            ExprKind::Throw(_) => "Throw",
            ExprKind::TypeOp { .. } => "TypeOp",
            ExprKind::StringConcat(_) => "StringConcat",
            ExprKind::Vararg(_) => "Vararg",
            ExprKind::FunctionReference { .. } => "FunctionReference",
            ExprKind::Error(_) => "Error",
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Expr {
    pub kind: ExprKind,
    pub ty: TypeId,
    pub span: Span,
}

/// Flat storage for expression nodes and their list side tables.
#[derive(Clone, Debug, Default)]
pub struct ExprArena {
    exprs: Vec<Expr>,
    expr_lists: Vec<ExprId>,
    args: Vec<Option<ExprId>>,
    catches: Vec<CatchClause>,
    branches: Vec<WhenBranch>,
    type_args: Vec<TypeId>,
}

fn range_len(len: usize) -> u16 {
    u16::try_from(len).unwrap_or_else(|_| panic!("list of {len} entries exceeds u16::MAX"))
}

fn range_start(len: usize) -> u32 {
    u32::try_from(len).unwrap_or_else(|_| panic!("side table exceeds u32::MAX entries"))
}

impl ExprArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, expr: Expr) -> ExprId {
        let id = ExprId::from_len(self.exprs.len());
        self.exprs.push(expr);
        id
    }

    /// The node. Out-of-range ids read as an error node.
    pub fn get(&self, id: ExprId) -> Expr {
        self.exprs.get(id.index()).copied().unwrap_or(Expr {
            kind: ExprKind::Error(Name::EMPTY),
            ty: TypeId::NOTHING,
            span: Span::DUMMY,
        })
    }

    pub fn replace(&mut self, id: ExprId, expr: Expr) {
        if let Some(slot) = self.exprs.get_mut(id.index()) {
            *slot = expr;
        }
    }

    pub fn alloc_list(&mut self, items: impl IntoIterator<Item = ExprId>) -> ExprRange {
        let start = self.expr_lists.len();
        self.expr_lists.extend(items);
        ExprRange {
            start: range_start(start),
            len: range_len(self.expr_lists.len() - start),
        }
    }

    pub fn alloc_args(&mut self, items: impl IntoIterator<Item = Option<ExprId>>) -> ArgRange {
        let start = self.args.len();
        self.args.extend(items);
        ArgRange {
            start: range_start(start),
            len: range_len(self.args.len() - start),
        }
    }

    pub fn alloc_catches(&mut self, items: impl IntoIterator<Item = CatchClause>) -> CatchRange {
        let start = self.catches.len();
        self.catches.extend(items);
        CatchRange {
            start: range_start(start),
            len: range_len(self.catches.len() - start),
        }
    }

    pub fn alloc_branches(&mut self, items: impl IntoIterator<Item = WhenBranch>) -> BranchRange {
        let start = self.branches.len();
        self.branches.extend(items);
        BranchRange {
            start: range_start(start),
            len: range_len(self.branches.len() - start),
        }
    }

    pub fn alloc_type_args(&mut self, items: impl IntoIterator<Item = TypeId>) -> TypeArgRange {
        let start = self.type_args.len();
        self.type_args.extend(items);
        TypeArgRange {
            start: range_start(start),
            len: range_len(self.type_args.len() - start),
        }
    }

    pub fn list(&self, range: ExprRange) -> &[ExprId] {
        self.expr_lists.get(range.bounds()).unwrap_or(&[])
    }

    pub fn args(&self, range: ArgRange) -> &[Option<ExprId>] {
        self.args.get(range.bounds()).unwrap_or(&[])
    }

    pub fn catches(&self, range: CatchRange) -> &[CatchClause] {
        self.catches.get(range.bounds()).unwrap_or(&[])
    }

    pub fn branches(&self, range: BranchRange) -> &[WhenBranch] {
        self.branches.get(range.bounds()).unwrap_or(&[])
    }

    pub fn type_args(&self, range: TypeArgRange) -> &[TypeId] {
        self.type_args.get(range.bounds()).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.exprs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exprs.is_empty()
    }
}

crate::static_assert_size!(ConstValue, 16);
