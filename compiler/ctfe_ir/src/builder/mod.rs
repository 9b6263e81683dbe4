//! Ergonomic construction of [`IrModule`]s.
//!
//! The builder installs the prelude on creation, so every module it
//! produces can reference `kotlin.Any`, the throwable hierarchy, ranges,
//! intrinsics and the natively bridged library classes.

use rustc_hash::FxHashMap;

use crate::{
    CatchClause, ClassFlags, ClassId, ClassKind, ConstValue, EnumEntryId, Expr, ExprId, ExprKind,
    FieldId, FunctionFlags, FunctionId, FunctionKind, FunctionOrigin, FunctionOwner, Initializer,
    IrClass, IrEnumEntry, IrField, IrFunction, IrModule, IrValue, Name, Prelude, PrimitiveType,
    SharedInterner, Span, TypeId, TypeKind, TypeOperator, ValueId, ValueParameter, WhenBranch,
};

/// Key of a memoized builtin member: receiver, name, parameter types.
type BuiltinKey = (TypeId, Name, Vec<TypeId>);

/// Receivers and argument slots of a call under construction.
#[derive(Clone, Debug, Default)]
pub struct CallParts {
    pub dispatch_receiver: Option<ExprId>,
    pub extension_receiver: Option<ExprId>,
    /// One slot per parameter; `None` falls back to the default value.
    pub args: Vec<Option<ExprId>>,
    pub type_args: Vec<TypeId>,
    pub super_qualifier: Option<ClassId>,
}

pub struct ModuleBuilder {
    module: IrModule,
    builtin_members: FxHashMap<BuiltinKey, FunctionId>,
    span: Span,
}

impl ModuleBuilder {
    /// Create a builder for `file_name` with the prelude installed.
    pub fn new(file_name: &str) -> Self {
        Self::with_interner(SharedInterner::new(), file_name)
    }

    pub fn with_interner(interner: SharedInterner, file_name: &str) -> Self {
        let mut builder = ModuleBuilder {
            module: IrModule::new(interner, file_name),
            builtin_members: FxHashMap::default(),
            span: Span::DUMMY,
        };
        let prelude = crate::prelude::install(&mut builder);
        builder.module.prelude = prelude;
        builder
    }

    pub fn finish(self) -> IrModule {
        self.module
    }

    #[inline]
    pub fn module(&self) -> &IrModule {
        &self.module
    }

    #[inline]
    pub fn module_mut(&mut self) -> &mut IrModule {
        &mut self.module
    }

    #[inline]
    pub fn prelude(&self) -> Prelude {
        self.module.prelude
    }

    /// Spans of subsequently created nodes start at `line`.
    pub fn at_line(&mut self, line: u32) -> &mut Self {
        self.span = Span::new(line, 1);
        self
    }

    pub fn intern(&self, text: &str) -> Name {
        self.module.intern(text)
    }

    // Types

    pub fn nullable(&mut self, ty: TypeId) -> TypeId {
        self.module.types.nullable(ty)
    }

    pub fn class_type(&mut self, class: ClassId) -> TypeId {
        self.module.types.class_type(class)
    }

    pub fn array_of(&mut self, element: TypeId) -> TypeId {
        self.module.types.array_of(element)
    }

    pub fn primitive_array(&mut self, element: PrimitiveType) -> TypeId {
        self.module.types.primitive_array(element)
    }

    pub fn function_type(&mut self, arity: u8) -> TypeId {
        self.module.types.function_type(arity)
    }

    pub fn type_parameter(&mut self, index: u16) -> TypeId {
        self.module.types.intern_kind(TypeKind::Parameter(index))
    }

    // Values

    pub fn value(&mut self, name: &str, ty: TypeId) -> ValueId {
        let name = self.intern(name);
        self.module.add_value(IrValue {
            name,
            ty,
            mutable: false,
        })
    }

    pub fn mutable_value(&mut self, name: &str, ty: TypeId) -> ValueId {
        let name = self.intern(name);
        self.module.add_value(IrValue {
            name,
            ty,
            mutable: true,
        })
    }

    // Functions

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new_function(
        &mut self,
        fq_name: &str,
        owner: FunctionOwner,
        kind: FunctionKind,
        dispatch: Option<TypeId>,
        extension: Option<TypeId>,
        params: &[(&str, TypeId)],
        return_type: TypeId,
    ) -> FunctionId {
        let simple = fq_name.rsplit('.').next().unwrap_or(fq_name);
        let name = self.intern(simple);
        let fq_name = self.intern(fq_name);
        let dispatch_receiver = dispatch.map(|ty| self.value("<this>", ty));
        let extension_receiver = extension.map(|ty| self.value("<receiver>", ty));
        let params = params
            .iter()
            .map(|&(name, ty)| ValueParameter {
                value: self.value(name, ty),
                default: None,
                is_vararg: false,
            })
            .collect();
        self.module.add_function(IrFunction {
            name,
            fq_name,
            kind,
            origin: FunctionOrigin::Source,
            owner,
            flags: FunctionFlags::empty(),
            dispatch_receiver,
            extension_receiver,
            params,
            type_params: 0,
            return_type,
            body: None,
            reference_body: None,
            captures: Vec::new(),
            overridden: Vec::new(),
        })
    }

    /// Top-level function.
    pub fn function(&mut self, fq_name: &str, params: &[(&str, TypeId)], ret: TypeId) -> FunctionId {
        self.new_function(
            fq_name,
            FunctionOwner::TopLevel,
            FunctionKind::Function,
            None,
            None,
            params,
            ret,
        )
    }

    /// Top-level extension function on `receiver`.
    pub fn extension(
        &mut self,
        fq_name: &str,
        receiver: TypeId,
        params: &[(&str, TypeId)],
        ret: TypeId,
    ) -> FunctionId {
        self.new_function(
            fq_name,
            FunctionOwner::TopLevel,
            FunctionKind::Function,
            None,
            Some(receiver),
            params,
            ret,
        )
    }

    /// Member function with a dispatch receiver of the class's type.
    pub fn method(
        &mut self,
        class: ClassId,
        name: &str,
        params: &[(&str, TypeId)],
        ret: TypeId,
    ) -> FunctionId {
        let fq = format!("{}.{name}", self.module.class_fq_name(class));
        let this_ty = self.module.class(class).ty;
        let id = self.new_function(
            &fq,
            FunctionOwner::Class(class),
            FunctionKind::Function,
            Some(this_ty),
            None,
            params,
            ret,
        );
        self.module.class_mut(class).functions.push(id);
        id
    }

    /// Static member (no dispatch receiver), e.g. enum `values()`.
    pub fn static_method(
        &mut self,
        class: ClassId,
        name: &str,
        params: &[(&str, TypeId)],
        ret: TypeId,
    ) -> FunctionId {
        let fq = format!("{}.{name}", self.module.class_fq_name(class));
        let id = self.new_function(
            &fq,
            FunctionOwner::Class(class),
            FunctionKind::Function,
            None,
            None,
            params,
            ret,
        );
        self.module.class_mut(class).functions.push(id);
        id
    }

    /// Member of a builtin type, memoized by receiver, name and parameters.
    pub fn builtin_member(
        &mut self,
        receiver: TypeId,
        name: &str,
        params: &[TypeId],
        ret: TypeId,
    ) -> FunctionId {
        let key = (receiver, self.intern(name), params.to_vec());
        if let Some(&id) = self.builtin_members.get(&key) {
            return id;
        }
        let fq = format!("{}.{name}", self.module.type_name(receiver));
        let named: Vec<(String, TypeId)> = params
            .iter()
            .enumerate()
            .map(|(i, &ty)| (format!("p{i}"), ty))
            .collect();
        let named: Vec<(&str, TypeId)> = named.iter().map(|(n, ty)| (n.as_str(), *ty)).collect();
        let kind = if name == "<init>" {
            FunctionKind::Constructor
        } else {
            FunctionKind::Function
        };
        let dispatch = (kind == FunctionKind::Function).then_some(receiver);
        let id = self.new_function(
            &fq,
            FunctionOwner::Builtin(receiver),
            kind,
            dispatch,
            None,
            &named,
            ret,
        );
        self.module.function_mut(id).origin = FunctionOrigin::Builtin;
        self.builtin_members.insert(key, id);
        id
    }

    pub fn param(&self, function: FunctionId, index: usize) -> ValueId {
        self.module.function(function).params[index].value
    }

    /// The dispatch receiver (`this`) of a member or constructor.
    ///
    /// # Panics
    /// Panics if the function has no dispatch receiver.
    pub fn this_of(&self, function: FunctionId) -> ValueId {
        self.module
            .function(function)
            .dispatch_receiver
            .unwrap_or_else(|| panic!("{} has no dispatch receiver", self.module.fq_name(function)))
    }

    /// The extension receiver of an extension function.
    ///
    /// # Panics
    /// Panics if the function has no extension receiver.
    pub fn receiver_of(&self, function: FunctionId) -> ValueId {
        self.module
            .function(function)
            .extension_receiver
            .unwrap_or_else(|| panic!("{} has no extension receiver", self.module.fq_name(function)))
    }

    pub fn set_body(&mut self, function: FunctionId, body: ExprId) {
        self.module.function_mut(function).body = Some(body);
    }

    pub fn set_reference_body(&mut self, function: FunctionId, body: ExprId) {
        self.module.function_mut(function).reference_body = Some(body);
    }

    pub fn set_default(&mut self, function: FunctionId, index: usize, default: ExprId) {
        self.module.function_mut(function).params[index].default = Some(default);
    }

    pub fn set_vararg(&mut self, function: FunctionId, index: usize) {
        self.module.function_mut(function).params[index].is_vararg = true;
    }

    pub fn add_flags(&mut self, function: FunctionId, flags: FunctionFlags) {
        self.module.function_mut(function).flags |= flags;
    }

    pub fn set_origin(&mut self, function: FunctionId, origin: FunctionOrigin) {
        self.module.function_mut(function).origin = origin;
    }

    pub fn set_type_params(&mut self, function: FunctionId, count: u16) {
        self.module.function_mut(function).type_params = count;
    }

    pub fn set_overrides(&mut self, function: FunctionId, base: FunctionId) {
        self.module.function_mut(function).overridden.push(base);
    }

    /// Record that a local function or lambda reads `value` from its
    /// enclosing scope.
    pub fn add_capture(&mut self, function: FunctionId, value: ValueId) {
        self.module.function_mut(function).captures.push(value);
    }

    // Classes

    pub fn class(&mut self, fq_name: &str, kind: ClassKind, superclass: Option<ClassId>) -> ClassId {
        let simple = fq_name.rsplit('.').next().unwrap_or(fq_name);
        let name = self.intern(simple);
        let fq = self.intern(fq_name);
        let id = self.module.add_class(IrClass {
            name,
            fq_name: fq,
            kind,
            flags: ClassFlags::empty(),
            ty: TypeId::ANY,
            superclass,
            interfaces: Vec::new(),
            fields: Vec::new(),
            constructors: Vec::new(),
            functions: Vec::new(),
            initializers: Vec::new(),
            enum_entries: Vec::new(),
        });
        let ty = self.module.types.class_type(id);
        self.module.class_mut(id).ty = ty;
        id
    }

    pub fn add_class_flags(&mut self, class: ClassId, flags: ClassFlags) {
        self.module.class_mut(class).flags |= flags;
    }

    pub fn add_interface(&mut self, class: ClassId, interface: ClassId) {
        self.module.class_mut(class).interfaces.push(interface);
    }

    /// Constructor without a body.
    pub fn constructor(&mut self, class: ClassId, params: &[(&str, TypeId)]) -> FunctionId {
        let fq = format!("{}.<init>", self.module.class_fq_name(class));
        let this_ty = self.module.class(class).ty;
        let id = self.new_function(
            &fq,
            FunctionOwner::Class(class),
            FunctionKind::Constructor,
            Some(this_ty),
            None,
            params,
            this_ty,
        );
        self.module.class_mut(class).constructors.push(id);
        id
    }

    /// Constructor whose body delegates to the superclass's no-argument
    /// constructor and then runs the instance initializer.
    pub fn default_constructor(&mut self, class: ClassId, params: &[(&str, TypeId)]) -> FunctionId {
        let ctor = self.constructor(class, params);
        let delegate = self.super_constructor(class);
        let delegation = self.delegate(delegate, Vec::new());
        let init = self.instance_init(class);
        let body = self.block(vec![delegation, init]);
        self.set_body(ctor, body);
        ctor
    }

    /// No-argument constructor of the class's superclass (`Any` if none).
    pub fn super_constructor(&self, class: ClassId) -> FunctionId {
        let prelude = self.module.prelude;
        self.module
            .class(class)
            .superclass
            .and_then(|parent| {
                self.module
                    .class(parent)
                    .constructors
                    .iter()
                    .copied()
                    .find(|&c| self.module.function(c).params.is_empty())
            })
            .unwrap_or(prelude.any_constructor)
    }

    /// Backing field with an optional initializer, run in declaration order.
    pub fn field(
        &mut self,
        class: ClassId,
        name: &str,
        ty: TypeId,
        initializer: Option<ExprId>,
    ) -> FieldId {
        let name = self.intern(name);
        let id = self.module.add_field(IrField {
            name,
            owner: Some(class),
            ty,
            initializer,
            is_const: false,
        });
        let class = self.module.class_mut(class);
        class.fields.push(id);
        if initializer.is_some() {
            class.initializers.push(Initializer::Field(id));
        }
        id
    }

    /// `const val` member: usable on uninitialized object shells.
    pub fn const_field(&mut self, class: ClassId, name: &str, value: ExprId) -> FieldId {
        let ty = self.module.expr(value).ty;
        let id = self.field(class, name, ty, Some(value));
        self.mark_const(id);
        id
    }

    fn mark_const(&mut self, field: FieldId) {
        self.module.field_mut(field).is_const = true;
    }

    /// Top-level property with a lazily evaluated initializer.
    pub fn static_field(&mut self, name: &str, ty: TypeId, initializer: Option<ExprId>) -> FieldId {
        let name = self.intern(name);
        self.module.add_field(IrField {
            name,
            owner: None,
            ty,
            initializer,
            is_const: false,
        })
    }

    /// Property getter without a body; reads the backing field.
    pub fn getter(&mut self, class: ClassId, field: FieldId) -> FunctionId {
        let field_name = self.module.name(self.module.field(field).name);
        let ty = self.module.field(field).ty;
        let fq = format!("{}.<get-{field_name}>", self.module.class_fq_name(class));
        let this_ty = self.module.class(class).ty;
        let id = self.new_function(
            &fq,
            FunctionOwner::Class(class),
            FunctionKind::Getter(field),
            Some(this_ty),
            None,
            &[],
            ty,
        );
        self.module.class_mut(class).functions.push(id);
        id
    }

    /// Property setter without a body; writes the backing field.
    pub fn setter(&mut self, class: ClassId, field: FieldId) -> FunctionId {
        let field_name = self.module.name(self.module.field(field).name);
        let ty = self.module.field(field).ty;
        let fq = format!("{}.<set-{field_name}>", self.module.class_fq_name(class));
        let this_ty = self.module.class(class).ty;
        let id = self.new_function(
            &fq,
            FunctionOwner::Class(class),
            FunctionKind::Setter(field),
            Some(this_ty),
            None,
            &[("value", ty)],
            TypeId::UNIT,
        );
        self.module.class_mut(class).functions.push(id);
        id
    }

    /// Field plus bodiless getter.
    pub fn property(
        &mut self,
        class: ClassId,
        name: &str,
        ty: TypeId,
        initializer: Option<ExprId>,
    ) -> (FieldId, FunctionId) {
        let field = self.field(class, name, ty, initializer);
        let getter = self.getter(class, field);
        (field, getter)
    }

    pub fn init_block(&mut self, class: ClassId, body: ExprId) {
        self.module
            .class_mut(class)
            .initializers
            .push(Initializer::Block(body));
    }

    /// Enum class extending `kotlin.Enum`, with its `values()` and
    /// `valueOf(String)` special members.
    pub fn enum_class(&mut self, fq_name: &str) -> ClassId {
        let prelude = self.module.prelude;
        let class = self.class(fq_name, ClassKind::Enum, Some(prelude.enum_class));
        let ty = self.module.class(class).ty;
        let array = self.array_of(ty);
        let values = self.static_method(class, "values", &[], array);
        self.set_origin(values, FunctionOrigin::EnumSpecialMember);
        let value_of = self.static_method(class, "valueOf", &[("value", TypeId::STRING)], ty);
        self.set_origin(value_of, FunctionOrigin::EnumSpecialMember);
        class
    }

    /// Enum entry initialized by `constructor` (the class's primary one
    /// when `None`) with `args`.
    pub fn enum_entry(
        &mut self,
        class: ClassId,
        name: &str,
        constructor: Option<FunctionId>,
        args: Vec<ExprId>,
    ) -> EnumEntryId {
        let name = self.intern(name);
        let ordinal = u32::try_from(self.module.class(class).enum_entries.len()).unwrap_or(u32::MAX);
        let constructor = constructor.or_else(|| self.module.class(class).primary_constructor());
        let args = self.module.exprs.alloc_list(args);
        let id = self.module.add_enum_entry(IrEnumEntry {
            name,
            owner: class,
            ordinal,
            constructor,
            args,
            class_body: None,
        });
        self.module.class_mut(class).enum_entries.push(id);
        id
    }

    pub fn set_entry_body(&mut self, entry: EnumEntryId, body: ClassId) {
        self.module.enum_entry_mut(entry).class_body = Some(body);
    }

    // Expressions

    pub fn expr(&mut self, kind: ExprKind, ty: TypeId) -> ExprId {
        self.module.alloc_expr(Expr {
            kind,
            ty,
            span: self.span,
        })
    }

    pub fn constant(&mut self, value: ConstValue) -> ExprId {
        self.expr(ExprKind::Const(value), value.type_id())
    }

    pub fn int(&mut self, value: i32) -> ExprId {
        self.constant(ConstValue::Int(value))
    }

    pub fn long(&mut self, value: i64) -> ExprId {
        self.constant(ConstValue::Long(value))
    }

    pub fn byte(&mut self, value: i8) -> ExprId {
        self.constant(ConstValue::Byte(value))
    }

    pub fn short(&mut self, value: i16) -> ExprId {
        self.constant(ConstValue::Short(value))
    }

    pub fn double(&mut self, value: f64) -> ExprId {
        self.constant(ConstValue::double(value))
    }

    pub fn float(&mut self, value: f32) -> ExprId {
        self.constant(ConstValue::float(value))
    }

    pub fn boolean(&mut self, value: bool) -> ExprId {
        self.constant(ConstValue::Boolean(value))
    }

    /// Char literal; characters outside the BMP keep their first code unit.
    pub fn char(&mut self, value: char) -> ExprId {
        let mut units = [0u16; 2];
        let unit = value.encode_utf16(&mut units)[0];
        self.constant(ConstValue::Char(unit))
    }

    pub fn string(&mut self, value: &str) -> ExprId {
        let name = self.intern(value);
        self.constant(ConstValue::String(name))
    }

    pub fn null(&mut self) -> ExprId {
        self.constant(ConstValue::Null)
    }

    pub fn get(&mut self, value: ValueId) -> ExprId {
        let ty = self.module.value(value).ty;
        self.expr(ExprKind::GetValue(value), ty)
    }

    pub fn set(&mut self, target: ValueId, value: ExprId) -> ExprId {
        self.expr(ExprKind::SetValue { target, value }, TypeId::UNIT)
    }

    pub fn var(&mut self, value: ValueId, initializer: Option<ExprId>) -> ExprId {
        self.expr(ExprKind::Variable { value, initializer }, TypeId::UNIT)
    }

    pub fn call_with(&mut self, callee: FunctionId, parts: CallParts) -> ExprId {
        let ty = self.module.function(callee).return_type;
        let args = self.module.exprs.alloc_args(parts.args);
        let type_args = self.module.exprs.alloc_type_args(parts.type_args);
        self.expr(
            ExprKind::Call {
                callee,
                dispatch_receiver: parts.dispatch_receiver,
                extension_receiver: parts.extension_receiver,
                args,
                type_args,
                super_qualifier: parts.super_qualifier,
            },
            ty,
        )
    }

    /// Call with every argument slot filled.
    pub fn call(&mut self, callee: FunctionId, receiver: Option<ExprId>, args: Vec<ExprId>) -> ExprId {
        self.call_with(
            callee,
            CallParts {
                dispatch_receiver: receiver,
                args: args.into_iter().map(Some).collect(),
                ..CallParts::default()
            },
        )
    }

    pub fn call_extension(&mut self, callee: FunctionId, receiver: ExprId, args: Vec<ExprId>) -> ExprId {
        self.call_with(
            callee,
            CallParts {
                extension_receiver: Some(receiver),
                args: args.into_iter().map(Some).collect(),
                ..CallParts::default()
            },
        )
    }

    /// Call of a generic top-level function with explicit type arguments.
    pub fn call_generic(&mut self, callee: FunctionId, type_args: Vec<TypeId>, args: Vec<ExprId>) -> ExprId {
        self.call_with(
            callee,
            CallParts {
                args: args.into_iter().map(Some).collect(),
                type_args,
                ..CallParts::default()
            },
        )
    }

    pub fn construct(&mut self, constructor: FunctionId, args: Vec<ExprId>) -> ExprId {
        let ty = self.module.function(constructor).return_type;
        self.construct_typed(constructor, ty, args.into_iter().map(Some).collect(), Vec::new())
    }

    pub fn construct_typed(
        &mut self,
        constructor: FunctionId,
        ty: TypeId,
        args: Vec<Option<ExprId>>,
        type_args: Vec<TypeId>,
    ) -> ExprId {
        let args = self.module.exprs.alloc_args(args);
        let type_args = self.module.exprs.alloc_type_args(type_args);
        self.expr(
            ExprKind::ConstructorCall {
                constructor,
                args,
                type_args,
            },
            ty,
        )
    }

    pub fn delegate(&mut self, constructor: FunctionId, args: Vec<ExprId>) -> ExprId {
        let args = self.module.exprs.alloc_args(args.into_iter().map(Some));
        self.expr(
            ExprKind::DelegatingConstructorCall { constructor, args },
            TypeId::UNIT,
        )
    }

    pub fn instance_init(&mut self, class: ClassId) -> ExprId {
        self.expr(ExprKind::InstanceInitializer { class }, TypeId::UNIT)
    }

    pub fn get_field(&mut self, field: FieldId, receiver: Option<ExprId>) -> ExprId {
        let ty = self.module.field(field).ty;
        self.expr(ExprKind::GetField { field, receiver }, ty)
    }

    pub fn set_field(&mut self, field: FieldId, receiver: Option<ExprId>, value: ExprId) -> ExprId {
        self.expr(
            ExprKind::SetField {
                field,
                receiver,
                value,
            },
            TypeId::UNIT,
        )
    }

    pub fn get_object(&mut self, class: ClassId) -> ExprId {
        let ty = self.module.class(class).ty;
        self.expr(ExprKind::GetObject(class), ty)
    }

    pub fn get_enum(&mut self, entry: EnumEntryId) -> ExprId {
        let owner = self.module.enum_entry(entry).owner;
        let ty = self.module.class(owner).ty;
        self.expr(ExprKind::GetEnum(entry), ty)
    }

    /// Block whose value is its last statement's.
    pub fn block(&mut self, statements: Vec<ExprId>) -> ExprId {
        let ty = statements
            .last()
            .map_or(TypeId::UNIT, |&last| self.module.expr(last).ty);
        let range = self.module.exprs.alloc_list(statements);
        self.expr(ExprKind::Block(range), ty)
    }

    pub fn ret(&mut self, target: FunctionId, value: ExprId) -> ExprId {
        self.expr(ExprKind::Return { target, value }, TypeId::NOTHING)
    }

    pub fn when(&mut self, branches: Vec<(ExprId, ExprId)>, ty: TypeId) -> ExprId {
        let range = self.module.exprs.alloc_branches(
            branches
                .into_iter()
                .map(|(condition, result)| WhenBranch { condition, result }),
        );
        self.expr(ExprKind::When(range), ty)
    }

    /// `if (condition) then else otherwise`, as a two-branch `when`.
    pub fn if_else(&mut self, condition: ExprId, then: ExprId, otherwise: ExprId) -> ExprId {
        let ty = self.module.expr(then).ty;
        let always = self.boolean(true);
        self.when(vec![(condition, then), (always, otherwise)], ty)
    }

    /// `while` loop; `build` receives the loop node for `break`/`continue`
    /// and returns `(condition, body)`.
    pub fn while_loop(&mut self, build: impl FnOnce(&mut Self, ExprId) -> (ExprId, ExprId)) -> ExprId {
        let placeholder = self.expr(ExprKind::Error(Name::EMPTY), TypeId::UNIT);
        let (condition, body) = build(self, placeholder);
        let ty = TypeId::UNIT;
        self.module.exprs.replace(
            placeholder,
            Expr {
                kind: ExprKind::While { condition, body },
                ty,
                span: self.span,
            },
        );
        placeholder
    }

    /// `do { body } while (condition)`; `build` returns `(body, condition)`.
    pub fn do_while_loop(&mut self, build: impl FnOnce(&mut Self, ExprId) -> (ExprId, ExprId)) -> ExprId {
        let placeholder = self.expr(ExprKind::Error(Name::EMPTY), TypeId::UNIT);
        let (body, condition) = build(self, placeholder);
        self.module.exprs.replace(
            placeholder,
            Expr {
                kind: ExprKind::DoWhile { body, condition },
                ty: TypeId::UNIT,
                span: self.span,
            },
        );
        placeholder
    }

    pub fn break_loop(&mut self, target: ExprId) -> ExprId {
        self.expr(ExprKind::Break { target }, TypeId::NOTHING)
    }

    pub fn continue_loop(&mut self, target: ExprId) -> ExprId {
        self.expr(ExprKind::Continue { target }, TypeId::NOTHING)
    }

    pub fn try_catch(
        &mut self,
        body: ExprId,
        catches: Vec<(ValueId, ExprId)>,
        finally: Option<ExprId>,
    ) -> ExprId {
        let ty = self.module.expr(body).ty;
        let catches = self.module.exprs.alloc_catches(
            catches
                .into_iter()
                .map(|(parameter, body)| CatchClause { parameter, body }),
        );
        self.expr(
            ExprKind::Try {
                body,
                catches,
                finally,
            },
            ty,
        )
    }

    pub fn throw(&mut self, value: ExprId) -> ExprId {
        self.expr(ExprKind::Throw(value), TypeId::NOTHING)
    }

    pub fn type_op(&mut self, operator: TypeOperator, operand: ExprId, operand_type: TypeId) -> ExprId {
        let ty = match operator {
            TypeOperator::InstanceOf | TypeOperator::NotInstanceOf => TypeId::BOOLEAN,
            TypeOperator::Cast => operand_type,
            TypeOperator::SafeCast => self.nullable(operand_type),
            TypeOperator::ImplicitCoercionToUnit => TypeId::UNIT,
            TypeOperator::ImplicitNotNull => {
                let operand_ty = self.module.expr(operand).ty;
                self.module.types.non_null(operand_ty)
            }
        };
        self.expr(
            ExprKind::TypeOp {
                operator,
                operand,
                operand_type,
            },
            ty,
        )
    }

    pub fn concat(&mut self, parts: Vec<ExprId>) -> ExprId {
        let range = self.module.exprs.alloc_list(parts);
        self.expr(ExprKind::StringConcat(range), TypeId::STRING)
    }

    pub fn vararg(&mut self, elements: Vec<ExprId>, array_type: TypeId) -> ExprId {
        let range = self.module.exprs.alloc_list(elements);
        self.expr(ExprKind::Vararg(range), array_type)
    }

    /// `::function` or `receiver::function`.
    pub fn function_ref(&mut self, function: FunctionId, dispatch_receiver: Option<ExprId>) -> ExprId {
        let f = self.module.function(function);
        let unbound_receiver = f.dispatch_receiver.is_some() && dispatch_receiver.is_none();
        let arity = f.params.len() + usize::from(unbound_receiver) + usize::from(f.extension_receiver.is_some());
        let ty = self.function_type(u8::try_from(arity).unwrap_or(u8::MAX));
        self.expr(
            ExprKind::FunctionReference {
                function,
                dispatch_receiver,
                extension_receiver: None,
            },
            ty,
        )
    }

    pub fn error(&mut self, message: &str) -> ExprId {
        let name = self.intern(message);
        self.expr(ExprKind::Error(name), TypeId::NOTHING)
    }

    // Operator shorthands

    /// `lhs.op(rhs)` on a builtin receiver type.
    pub fn binary(&mut self, op: &str, lhs: ExprId, rhs: ExprId, ret: TypeId) -> ExprId {
        let lhs_ty = self.module.expr(lhs).ty;
        let rhs_ty = self.module.expr(rhs).ty;
        let callee = self.builtin_member(lhs_ty, op, &[rhs_ty], ret);
        self.call(callee, Some(lhs), vec![rhs])
    }

    /// `operand.op()` on a builtin receiver type.
    pub fn unary(&mut self, op: &str, operand: ExprId, ret: TypeId) -> ExprId {
        let ty = self.module.expr(operand).ty;
        let callee = self.builtin_member(ty, op, &[], ret);
        self.call(callee, Some(operand), Vec::new())
    }

    /// Prelude function by fully qualified name (first overload).
    ///
    /// # Panics
    /// Panics if the prelude declares no such function.
    pub fn prelude_function(&self, fq_name: &str) -> FunctionId {
        self.module
            .functions_by_fq_name(fq_name)
            .first()
            .copied()
            .unwrap_or_else(|| panic!("prelude declares no function {fq_name}"))
    }

    /// Prelude overload by fully qualified name and parameter types.
    ///
    /// # Panics
    /// Panics if no overload matches.
    pub fn prelude_overload(&self, fq_name: &str, params: &[TypeId]) -> FunctionId {
        self.module
            .find_function(fq_name, params)
            .unwrap_or_else(|| panic!("prelude declares no overload {fq_name}{params:?}"))
    }

    /// `lhs == rhs` through the `EQEQ` intrinsic.
    pub fn eq(&mut self, lhs: ExprId, rhs: ExprId) -> ExprId {
        let eqeq = self.prelude_function("kotlin.internal.ir.EQEQ");
        self.call(eqeq, None, vec![lhs, rhs])
    }

    /// `lhs === rhs` through the `EQEQEQ` intrinsic.
    pub fn identical(&mut self, lhs: ExprId, rhs: ExprId) -> ExprId {
        let eqeqeq = self.prelude_function("kotlin.internal.ir.EQEQEQ");
        self.call(eqeqeq, None, vec![lhs, rhs])
    }

    pub fn not(&mut self, operand: ExprId) -> ExprId {
        self.unary("not", operand, TypeId::BOOLEAN)
    }

    /// Value parameter for a catch clause catching `class`.
    pub fn catch_parameter(&mut self, name: &str, class: ClassId) -> ValueId {
        let ty = self.module.class(class).ty;
        self.value(name, ty)
    }
}

#[cfg(test)]
mod tests;
