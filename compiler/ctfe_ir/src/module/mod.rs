//! A lowered compilation unit: declarations, types and expressions.

use rustc_hash::FxHashMap;

use crate::{
    ClassId, EnumEntryId, Expr, ExprArena, ExprId, ExprKind, FieldId, FunctionId, IrClass,
    IrEnumEntry, IrField, IrFunction, IrValue, Name, Prelude, SharedInterner, TypeId, TypeKind,
    TypePool, ValueId,
};

/// Owns everything the evaluator reads and the few things it synthesizes
/// (adaptor functions, accessor bodies, substituted reference bodies).
#[derive(Clone, Debug)]
pub struct IrModule {
    interner: SharedInterner,
    pub types: TypePool,
    pub exprs: ExprArena,
    classes: Vec<IrClass>,
    functions: Vec<IrFunction>,
    fields: Vec<IrField>,
    values: Vec<IrValue>,
    enum_entries: Vec<IrEnumEntry>,
    classes_by_fq_name: FxHashMap<Name, ClassId>,
    functions_by_fq_name: FxHashMap<Name, Vec<FunctionId>>,
    file_name: Name,
    pub(crate) prelude: Prelude,
}

impl IrModule {
    pub(crate) fn new(interner: SharedInterner, file_name: &str) -> Self {
        let file_name = interner.intern(file_name);
        IrModule {
            interner,
            types: TypePool::new(),
            exprs: ExprArena::new(),
            classes: Vec::new(),
            functions: Vec::new(),
            fields: Vec::new(),
            values: Vec::new(),
            enum_entries: Vec::new(),
            classes_by_fq_name: FxHashMap::default(),
            functions_by_fq_name: FxHashMap::default(),
            file_name,
            prelude: Prelude::default(),
        }
    }

    #[inline]
    pub fn interner(&self) -> &SharedInterner {
        &self.interner
    }

    #[inline]
    pub fn prelude(&self) -> &Prelude {
        &self.prelude
    }

    /// Source file the module was lowered from.
    pub fn file_name(&self) -> &'static str {
        self.interner.lookup(self.file_name)
    }

    #[inline]
    pub fn name(&self, name: Name) -> &'static str {
        self.interner.lookup(name)
    }

    #[inline]
    pub fn intern(&self, text: &str) -> Name {
        self.interner.intern(text)
    }

    // Declarations

    pub fn add_class(&mut self, class: IrClass) -> ClassId {
        let id = ClassId::from_len(self.classes.len());
        self.classes_by_fq_name.insert(class.fq_name, id);
        self.classes.push(class);
        id
    }

    pub fn add_function(&mut self, function: IrFunction) -> FunctionId {
        let id = FunctionId::from_len(self.functions.len());
        self.functions_by_fq_name
            .entry(function.fq_name)
            .or_default()
            .push(id);
        self.functions.push(function);
        id
    }

    pub fn add_field(&mut self, field: IrField) -> FieldId {
        let id = FieldId::from_len(self.fields.len());
        self.fields.push(field);
        id
    }

    pub fn add_value(&mut self, value: IrValue) -> ValueId {
        let id = ValueId::from_len(self.values.len());
        self.values.push(value);
        id
    }

    pub fn add_enum_entry(&mut self, entry: IrEnumEntry) -> EnumEntryId {
        let id = EnumEntryId::from_len(self.enum_entries.len());
        self.enum_entries.push(entry);
        id
    }

    #[inline]
    pub fn class(&self, id: ClassId) -> &IrClass {
        &self.classes[id.index()]
    }

    #[inline]
    pub fn class_mut(&mut self, id: ClassId) -> &mut IrClass {
        &mut self.classes[id.index()]
    }

    #[inline]
    pub fn function(&self, id: FunctionId) -> &IrFunction {
        &self.functions[id.index()]
    }

    #[inline]
    pub fn function_mut(&mut self, id: FunctionId) -> &mut IrFunction {
        &mut self.functions[id.index()]
    }

    #[inline]
    pub fn field(&self, id: FieldId) -> &IrField {
        &self.fields[id.index()]
    }

    #[inline]
    pub fn field_mut(&mut self, id: FieldId) -> &mut IrField {
        &mut self.fields[id.index()]
    }

    #[inline]
    pub fn value(&self, id: ValueId) -> &IrValue {
        &self.values[id.index()]
    }

    #[inline]
    pub fn enum_entry(&self, id: EnumEntryId) -> &IrEnumEntry {
        &self.enum_entries[id.index()]
    }

    #[inline]
    pub fn enum_entry_mut(&mut self, id: EnumEntryId) -> &mut IrEnumEntry {
        &mut self.enum_entries[id.index()]
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    pub fn function_count(&self) -> usize {
        self.functions.len()
    }

    pub fn class_ids(&self) -> impl Iterator<Item = ClassId> + '_ {
        (0..self.classes.len()).map(ClassId::from_len)
    }

    // Expressions

    pub fn alloc_expr(&mut self, expr: Expr) -> ExprId {
        self.exprs.alloc(expr)
    }

    #[inline]
    pub fn expr(&self, id: ExprId) -> Expr {
        self.exprs.get(id)
    }

    #[inline]
    pub fn kind(&self, id: ExprId) -> ExprKind {
        self.exprs.get(id).kind
    }

    /// Source line of a node, `0` when synthesized.
    pub fn line(&self, id: ExprId) -> u32 {
        self.exprs.get(id).span.line
    }

    // Lookup

    pub fn class_by_fq_name(&self, fq_name: &str) -> Option<ClassId> {
        let name = self.interner.get(fq_name)?;
        self.classes_by_fq_name.get(&name).copied()
    }

    pub fn functions_by_fq_name(&self, fq_name: &str) -> &[FunctionId] {
        self.interner
            .get(fq_name)
            .and_then(|name| self.functions_by_fq_name.get(&name))
            .map_or(&[], Vec::as_slice)
    }

    /// Find an overload by fully qualified name and parameter types.
    pub fn find_function(&self, fq_name: &str, params: &[TypeId]) -> Option<FunctionId> {
        self.functions_by_fq_name(fq_name)
            .iter()
            .copied()
            .find(|&id| {
                let f = self.function(id);
                f.params.len() == params.len()
                    && f
                        .params
                        .iter()
                        .zip(params)
                        .all(|(p, &ty)| self.value(p.value).ty == ty)
            })
    }

    pub fn fq_name(&self, function: FunctionId) -> &'static str {
        self.name(self.function(function).fq_name)
    }

    pub fn class_fq_name(&self, class: ClassId) -> &'static str {
        self.name(self.class(class).fq_name)
    }

    // Hierarchy

    /// `sub` equals `sup` or inherits it through superclasses or interfaces.
    pub fn is_subclass(&self, sub: ClassId, sup: ClassId) -> bool {
        if sub == sup {
            return true;
        }
        let class = self.class(sub);
        class.superclass.is_some_and(|parent| self.is_subclass(parent, sup))
            || class.interfaces.iter().any(|&i| self.is_subclass(i, sup))
    }

    /// Walk `class` and its superclasses, most derived first.
    pub fn superclass_chain(&self, class: ClassId) -> impl Iterator<Item = ClassId> + '_ {
        std::iter::successors(Some(class), |&c| self.class(c).superclass)
    }

    /// `function` overrides `base`, directly or transitively.
    pub fn overrides(&self, function: FunctionId, base: FunctionId) -> bool {
        self.function(function)
            .overridden
            .iter()
            .any(|&o| o == base || self.overrides(o, base))
    }

    /// Virtual dispatch: the most derived implementation of `callee`
    /// visible from `runtime_class`.
    pub fn resolve_override(&self, runtime_class: ClassId, callee: FunctionId) -> FunctionId {
        for class in self.superclass_chain(runtime_class) {
            let found = self
                .class(class)
                .functions
                .iter()
                .copied()
                .find(|&f| f == callee || self.overrides(f, callee));
            if let Some(f) = found {
                return f;
            }
        }
        callee
    }

    /// Class of the function's declaring type, for native dispatch keys.
    pub fn owner_fq_name(&self, function: FunctionId) -> String {
        let f = self.function(function);
        match f.owner {
            crate::FunctionOwner::Class(class) => self.class_fq_name(class).to_owned(),
            crate::FunctionOwner::Builtin(ty) => self.type_name(self.types.find_non_null(ty).unwrap_or(ty)),
            crate::FunctionOwner::TopLevel => {
                let fq = self.name(f.fq_name);
                fq.rsplit_once('.').map_or("", |(package, _)| package).to_owned()
            }
        }
    }

    // Rendering

    /// Fully qualified rendering of a type, with `?` when nullable.
    pub fn type_name(&self, ty: TypeId) -> String {
        let data = self.types.get(ty);
        let mut out = match data.kind {
            TypeKind::Unit => "kotlin.Unit".to_owned(),
            TypeKind::Nothing => "kotlin.Nothing".to_owned(),
            TypeKind::Any => "kotlin.Any".to_owned(),
            TypeKind::String => "kotlin.String".to_owned(),
            TypeKind::Primitive(p) => format!("kotlin.{}", p.name()),
            TypeKind::Class(class) => self.class_fq_name(class).to_owned(),
            TypeKind::Array(element) => format!("kotlin.Array<{}>", self.type_name(element)),
            TypeKind::PrimitiveArray(p) => format!("kotlin.{}", p.array_name()),
            TypeKind::Function { arity } => format!("kotlin.Function{arity}"),
            TypeKind::Parameter(index) => format!("T{index}"),
        };
        if data.nullable {
            out.push('?');
        }
        out
    }

    /// `name(kotlin.String?, kotlin.Int)`: the key native members are
    /// registered under.
    pub fn signature(&self, function: FunctionId) -> String {
        let f = self.function(function);
        let params: Vec<String> = f
            .params
            .iter()
            .map(|p| self.type_name(self.value(p.value).ty))
            .collect();
        format!("{}({})", self.name(f.name), params.join(", "))
    }
}
