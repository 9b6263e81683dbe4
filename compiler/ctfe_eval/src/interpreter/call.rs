//! Calls: frame setup, argument binding and interception.
//!
//! A call pushes the callee frame, binds receivers and supplied arguments,
//! then evaluates missing defaults inside the callee frame (so they see
//! earlier parameters). The `intercept` step at the bottom of the frame
//! runs last and picks how the callee is evaluated.

use std::rc::Rc;

use ctfe_ir::{Expr, ExprId, ExprKind, FieldId, FunctionId, Span, TypeId, ValueId};
use smallvec::SmallVec;
use tracing::debug;

use super::IrInterpreter;
use crate::bridge::{from_host, to_host, HostResult, HostValue, NativeCall, NativeKind};
use crate::builtins;
use crate::environment::FunctionShape;
use crate::errors::{
    invalid_state, missing_argument, type_mismatch, unsupported_call, unsupported_intrinsic, EvalResult,
};
use crate::instruction::Instruction;
use crate::interceptor::{call_path, constructor_path, CallPath, ConstructorPath};
use crate::stack::Frame;
use crate::state::{Complex, ExceptionState, FunctionState, PrimitiveValue, Shared, State, Wrapper};

/// A call about to enter its callee.
pub(crate) struct CallRequest {
    pub(crate) callee: FunctionId,
    pub(crate) site: Option<ExprId>,
    pub(crate) dispatch: Option<State>,
    pub(crate) extension: Option<State>,
    /// One slot per parameter; `None` takes the default.
    pub(crate) args: Vec<Option<State>>,
    pub(crate) type_args: SmallVec<[TypeId; 2]>,
    /// Extra bindings in the callee frame (captures, bound receivers).
    pub(crate) bindings: Vec<(ValueId, State)>,
}

impl CallRequest {
    pub(crate) fn new(callee: FunctionId, site: Option<ExprId>) -> Self {
        CallRequest {
            callee,
            site,
            dispatch: None,
            extension: None,
            args: Vec::new(),
            type_args: SmallVec::new(),
            bindings: Vec::new(),
        }
    }

    #[must_use]
    pub(crate) fn with_dispatch(mut self, receiver: State) -> Self {
        self.dispatch = Some(receiver);
        self
    }

    #[must_use]
    pub(crate) fn with_extension(mut self, receiver: Option<State>) -> Self {
        self.extension = receiver;
        self
    }

    #[must_use]
    pub(crate) fn with_args(mut self, args: Vec<Option<State>>) -> Self {
        self.args = args;
        self
    }

    #[must_use]
    pub(crate) fn with_values(self, args: Vec<State>) -> Self {
        self.with_args(args.into_iter().map(Some).collect())
    }

    #[must_use]
    pub(crate) fn with_type_args(mut self, type_args: SmallVec<[TypeId; 2]>) -> Self {
        self.type_args = type_args;
        self
    }
}

impl IrInterpreter {
    /// Terminal step of `Call`: receivers and arguments are on the stack.
    pub(super) fn eval_call(&mut self, id: ExprId, expr: Expr) -> EvalResult<()> {
        let ExprKind::Call {
            callee,
            dispatch_receiver,
            extension_receiver,
            args,
            type_args,
            super_qualifier,
        } = expr.kind
        else {
            return Err(invalid_state("call step on a non-call node"));
        };
        let (slots, type_args): (Vec<bool>, SmallVec<[TypeId; 2]>) = {
            let module = self.module();
            (
                module.exprs.args(args).iter().map(Option::is_some).collect(),
                module.exprs.type_args(type_args).iter().copied().collect(),
            )
        };
        let args = self.pop_arguments(&slots)?;
        let extension = extension_receiver.map(|_| self.pop_state()).transpose()?;
        let dispatch = dispatch_receiver.map(|_| self.pop_state()).transpose()?;

        let callee = match (&dispatch, super_qualifier) {
            (Some(receiver), None) => match receiver.class() {
                Some(class) => self.module().resolve_override(class, callee),
                None => callee,
            },
            _ => callee,
        };
        let type_args = type_args.into_iter().map(|ty| self.substitute(ty)).collect();

        let mut request = CallRequest::new(callee, Some(id))
            .with_extension(extension)
            .with_args(args)
            .with_type_args(type_args);
        request.dispatch = dispatch;
        self.enter_call(request)
    }

    /// Pushes the callee frame and schedules argument defaults and the
    /// interception step.
    pub(crate) fn enter_call(&mut self, request: CallRequest) -> EvalResult<()> {
        let CallRequest {
            callee,
            site,
            dispatch,
            extension,
            args,
            type_args,
            bindings,
        } = request;
        let f = self.module().function(callee).clone();
        let returns_unit = f.return_type == TypeId::UNIT && !f.is_constructor();
        let frame = Frame::new(Some(callee), site)
            .with_type_args(type_args)
            .returning_unit(returns_unit);
        self.stack.push_frame(frame)?;

        if let (Some(value), Some(state)) = (f.dispatch_receiver, dispatch) {
            self.bind(value, state)?;
        }
        if let (Some(value), Some(state)) = (f.extension_receiver, extension) {
            self.bind(value, state)?;
        }
        for (value, state) in bindings {
            self.bind(value, state)?;
        }
        self.push(Instruction::custom("intercept", move |interp| interp.intercept(callee, site)))?;

        let mut args = args.into_iter();
        let mut pending: SmallVec<[(ValueId, ExprId); 2]> = SmallVec::new();
        for param in &f.params {
            match (args.next().flatten(), param.default) {
                (Some(state), _) => self.bind(param.value, state)?,
                (None, Some(default)) => pending.push((param.value, default)),
                (None, None) if param.is_vararg => {
                    let ty = self.module().value(param.value).ty;
                    self.bind(param.value, State::array(Vec::new(), ty))?;
                }
                (None, None) => {
                    let module = self.module();
                    return Err(missing_argument(
                        module.fq_name(callee),
                        module.name(module.value(param.value).name),
                    ));
                }
            }
        }
        for (value, default) in pending.into_iter().rev() {
            self.push(Instruction::custom("bind default", move |interp| {
                let state = interp.pop_state()?;
                interp.bind(value, state)
            }))?;
            self.push_compound(default)?;
        }
        Ok(())
    }

    /// Values of the callee's parameters in the current frame.
    pub(crate) fn arguments(&self, callee: FunctionId) -> EvalResult<Vec<State>> {
        let params: SmallVec<[ValueId; 4]> = self.module().function(callee).params.iter().map(|p| p.value).collect();
        params.into_iter().map(|value| self.load_local(value)).collect()
    }

    pub(crate) fn dispatch_receiver_state(&self, callee: FunctionId) -> Option<State> {
        let value = self.module().function(callee).dispatch_receiver?;
        self.stack.local_state(value).cloned()
    }

    pub(crate) fn extension_receiver_state(&self, callee: FunctionId) -> Option<State> {
        let value = self.module().function(callee).extension_receiver?;
        self.stack.local_state(value).cloned()
    }

    /// Runs in the callee frame once every argument is bound.
    fn intercept(&mut self, callee: FunctionId, site: Option<ExprId>) -> EvalResult<()> {
        let receiver = self.dispatch_receiver_state(callee);
        let path = {
            let module = self.module();
            call_path(&module, self.env.natives(), callee, receiver.as_ref())
        };
        debug!(function = self.module().fq_name(callee), ?path, "intercepted call");

        match path {
            CallPath::NativeMethod => self.call_native_method(callee, receiver, site),
            CallPath::NativeFunction => self.call_native_function(callee, site),
            CallPath::NativeConstructor => self.call_native_constructor(callee, site),
            CallPath::Intrinsic(intrinsic) => self.run_intrinsic(intrinsic, callee, site),
            CallPath::FunctionMember => self.call_function_member(callee, receiver, site),
            CallPath::Builtin => self.call_builtin(callee, receiver, site),
            CallPath::Accessor(field) => {
                let body = self.synthesize_accessor(callee, field)?;
                self.push_compound(body)
            }
            CallPath::ReferenceBody(body) => {
                self.env.module_mut().function_mut(callee).body = Some(body);
                self.push(Instruction::custom("intercept", move |interp| interp.intercept(callee, site)))
            }
            CallPath::Body(body) => {
                if self.module().function(callee).is_constructor() {
                    self.push(Instruction::custom("yield this", move |interp| {
                        interp.pop_state()?;
                        let (_, this) = interp.current_this()?;
                        interp.push_state(this)
                    }))?;
                }
                self.push_compound(body)
            }
            CallPath::TrivialConstructor => {
                let (_, this) = self.current_this()?;
                self.push_state(this)
            }
            CallPath::SuspendStub => self.push_state(State::null(TypeId::NULLABLE_ANY)),
            CallPath::Unsupported => Err(unsupported_call(self.module().fq_name(callee))),
        }
    }

    /// Backing-field read or write standing in for a bodiless accessor;
    /// installed as the accessor's body.
    fn synthesize_accessor(&mut self, accessor: FunctionId, field: FieldId) -> EvalResult<ExprId> {
        let f = self.module().function(accessor).clone();
        let this = f
            .dispatch_receiver
            .ok_or_else(|| invalid_state("accessor without a receiver"))?;
        let mut module = self.env.module_mut();
        let this_ty = module.value(this).ty;
        let field_ty = module.field(field).ty;
        let receiver = module.alloc_expr(Expr {
            kind: ExprKind::GetValue(this),
            ty: this_ty,
            span: Span::DUMMY,
        });
        let body = match f.params.first() {
            Some(param) => {
                let value = module.alloc_expr(Expr {
                    kind: ExprKind::GetValue(param.value),
                    ty: field_ty,
                    span: Span::DUMMY,
                });
                module.alloc_expr(Expr {
                    kind: ExprKind::SetField {
                        field,
                        receiver: Some(receiver),
                        value,
                    },
                    ty: TypeId::UNIT,
                    span: Span::DUMMY,
                })
            }
            None => module.alloc_expr(Expr {
                kind: ExprKind::GetField {
                    field,
                    receiver: Some(receiver),
                },
                ty: field_ty,
                span: Span::DUMMY,
            }),
        };
        module.function_mut(accessor).body = Some(body);
        Ok(body)
    }

    // Natives

    fn host_args(&self, states: &[State]) -> Vec<HostValue> {
        let module = self.module();
        states.iter().map(|state| to_host(state, &module)).collect()
    }

    fn push_host_result(
        &mut self,
        result: HostResult,
        declared: TypeId,
        site: Option<ExprId>,
    ) -> EvalResult<()> {
        match result {
            Ok(value) => {
                let state = from_host(value, declared, &self.env);
                self.push_state(state)
            }
            Err(exception) => self.throw_host(&exception, site),
        }
    }

    fn call_native_method(&mut self, callee: FunctionId, receiver: Option<State>, site: Option<ExprId>) -> EvalResult<()> {
        let wrapper: Rc<Wrapper> = match &receiver {
            Some(State::Wrapper(wrapper)) => Rc::clone(wrapper),
            Some(State::Complex(object)) => object
                .borrow()
                .super_wrapper()
                .cloned()
                .ok_or_else(|| invalid_state("native method on an object without a host part"))?,
            _ => return Err(invalid_state("native method without a host receiver")),
        };
        let (signature, declared) = {
            let module = self.module();
            (module.signature(callee), module.function(callee).return_type)
        };
        let native = self
            .env
            .natives()
            .lookup(NativeKind::Method, wrapper.class_name(), &signature)
            .ok_or_else(|| unsupported_call(self.module().fq_name(callee)))?;
        let args = self.host_args(&self.arguments(callee)?);
        let result = native(&NativeCall {
            owner: wrapper.class_name(),
            receiver: Some(wrapper.object()),
            args: &args,
        });
        self.push_host_result(result, declared, site)
    }

    fn call_native_function(&mut self, callee: FunctionId, site: Option<ExprId>) -> EvalResult<()> {
        let (owner, signature, declared) = {
            let module = self.module();
            (
                module.owner_fq_name(callee),
                module.signature(callee),
                module.function(callee).return_type,
            )
        };
        let native = self
            .env
            .natives()
            .lookup(NativeKind::Function, &owner, &signature)
            .ok_or_else(|| unsupported_call(self.module().fq_name(callee)))?;
        let mut states: Vec<State> = self.extension_receiver_state(callee).into_iter().collect();
        states.extend(self.arguments(callee)?);
        let args = self.host_args(&states);
        let result = native(&NativeCall {
            owner: &owner,
            receiver: None,
            args: &args,
        });
        self.push_host_result(result, declared, site)
    }

    fn call_native_constructor(&mut self, callee: FunctionId, site: Option<ExprId>) -> EvalResult<()> {
        let (owner, signature, declared) = {
            let module = self.module();
            (
                module.owner_fq_name(callee),
                module.signature(callee),
                module.function(callee).return_type,
            )
        };
        let native = self
            .env
            .natives()
            .lookup(NativeKind::Constructor, &owner, &signature)
            .ok_or_else(|| unsupported_call(self.module().fq_name(callee)))?;
        let args = self.host_args(&self.arguments(callee)?);
        let result = native(&NativeCall {
            owner: &owner,
            receiver: None,
            args: &args,
        });
        self.push_host_result(result, declared, site)
    }

    // Function values

    fn call_function_member(&mut self, callee: FunctionId, receiver: Option<State>, site: Option<ExprId>) -> EvalResult<()> {
        let Some(State::Function(function)) = receiver else {
            return Err(invalid_state("function member without a function receiver"));
        };
        let name = self.module().function(callee).name;
        if name == self.names.invoke {
            let args = self.arguments(callee)?;
            self.invoke_function(function, args, site)
        } else if name == self.names.get_name {
            let text = {
                let module = self.module();
                module.name(module.function(function.function).name)
            };
            self.push_state(State::string(text))
        } else {
            self.push_string_of(State::Function(function), site)
        }
    }

    /// Calls a function value with `args`, binding its receivers and
    /// captured values.
    pub(crate) fn invoke_function(
        &mut self,
        function: Rc<FunctionState>,
        args: Vec<State>,
        site: Option<ExprId>,
    ) -> EvalResult<()> {
        let shape = FunctionShape::call(
            function.function,
            function.dispatch_receiver.is_some(),
            function.extension_receiver.is_some(),
        );
        let adaptor = self.env.function_adaptor(shape);
        let adaptor_captures = self.module().function(adaptor).captures.clone();
        let receivers = function
            .dispatch_receiver
            .iter()
            .chain(function.extension_receiver.iter())
            .cloned();
        let mut bindings: Vec<(ValueId, State)> = adaptor_captures.into_iter().zip(receivers).collect();
        bindings.extend(function.captures.iter().cloned());

        let mut request = CallRequest::new(adaptor, site).with_values(args);
        request.bindings = bindings;
        self.enter_call(request)
    }

    // Builtins

    fn call_builtin(&mut self, callee: FunctionId, receiver: Option<State>, site: Option<ExprId>) -> EvalResult<()> {
        let Some(State::Primitive(receiver)) = receiver else {
            return Err(invalid_state("builtin without a primitive receiver"));
        };
        let name = self.module().function(callee).name;
        let args = self.arguments(callee)?;

        if name == self.names.range_to {
            return self.construct_range(receiver.value, receiver.ty, args, site);
        }
        if name == self.names.to_string {
            return self.push_string_of(State::Primitive(receiver), site);
        }
        let name_text = self.module().name(name);
        if let PrimitiveValue::Array(storage) = &receiver.value {
            return match builtins::array_member(name_text, storage, &args) {
                Some(Ok(state)) => self.push_state(state),
                Some(Err(thrown)) => self.throw_builtin(thrown, site),
                None => Err(unsupported_call(self.module().fq_name(callee))),
            };
        }

        let mut values = Vec::with_capacity(args.len());
        for arg in &args {
            match arg {
                State::Primitive(p) => values.push(p.value.clone()),
                _ if name == self.names.equals => return self.push_state(State::boolean(false)),
                other if name == self.names.plus && receiver.value.as_str().is_some() => {
                    let prefix = receiver.value.as_str().unwrap_or_default().to_owned();
                    self.push(Instruction::custom("concatenate", move |interp| {
                        let suffix = interp.pop_state()?;
                        let suffix = suffix
                            .as_str()
                            .ok_or_else(|| type_mismatch("String", suffix.kind_name()))?;
                        interp.push_state(State::string(&format!("{prefix}{suffix}")))
                    }))?;
                    return self.push_string_of(other.clone(), site);
                }
                _ => return Err(unsupported_call(self.module().fq_name(callee))),
            }
        }

        let declared = self.module().function(callee).return_type;
        match builtins::evaluate(name_text, &receiver.value, &values, self.env.platform()) {
            Some(Ok(value)) => {
                let ty = if value.is_null() { declared } else { value.natural_type() };
                self.push_state(State::primitive(value, ty))
            }
            Some(Err(thrown)) => self.throw_builtin(thrown, site),
            None => Err(unsupported_call(self.module().fq_name(callee))),
        }
    }

    /// `a..b` through the range class's interpreted constructor.
    fn construct_range(&mut self, start: PrimitiveValue, ty: TypeId, args: Vec<State>, site: Option<ExprId>) -> EvalResult<()> {
        let (constructor, element) = {
            let module = self.module();
            let class = module
                .prelude()
                .range_class(ty)
                .ok_or_else(|| unsupported_call(format!("{}.rangeTo", module.type_name(ty))))?;
            let constructor = module
                .class(class)
                .primary_constructor()
                .ok_or_else(|| invalid_state("range class without a constructor"))?;
            let start = module
                .function(constructor)
                .params
                .first()
                .ok_or_else(|| invalid_state("range constructor without parameters"))?;
            let element = module.value(start.value).ty;
            (constructor, element)
        };
        let end = args
            .first()
            .and_then(State::as_value)
            .ok_or_else(|| invalid_state("rangeTo without an end"))?;
        let convert = |value: &PrimitiveValue| -> EvalResult<State> {
            let converted = match element {
                TypeId::INT => value.as_i64().map(|v| PrimitiveValue::Int(v as i32)),
                TypeId::LONG => value.as_i64().map(PrimitiveValue::Long),
                TypeId::CHAR => value.as_i64().map(|v| PrimitiveValue::Char(v as u16)),
                _ => None,
            };
            converted
                .map(|value| State::primitive(value, element))
                .ok_or_else(|| type_mismatch("integral range bound", value.type_name()))
        };
        let args = vec![convert(&start)?, convert(end)?];
        let range_ty = self.module().function(constructor).return_type;
        self.call_constructor(constructor, range_ty, args.into_iter().map(Some).collect(), SmallVec::new(), site)
    }

    // Constructors

    /// `ConstructorCall`: interpreted classes get a fresh object bound as
    /// `this`; native and intrinsic constructors produce their own value.
    pub(crate) fn call_constructor(
        &mut self,
        constructor: FunctionId,
        ty: TypeId,
        args: Vec<Option<State>>,
        type_args: SmallVec<[TypeId; 2]>,
        site: Option<ExprId>,
    ) -> EvalResult<()> {
        let (interpreted, owner) = {
            let module = self.module();
            let path = constructor_path(&module, constructor);
            (
                path == ConstructorPath::Interpreted,
                module.function(constructor).owner_class(),
            )
        };
        let mut request = CallRequest::new(constructor, site)
            .with_args(args)
            .with_type_args(type_args);
        if let (true, Some(class)) = (interpreted, owner) {
            let class_ty = self.module().class(class).ty;
            let ty = if self.module().types.class_of(ty) == Some(class) { ty } else { class_ty };
            request.dispatch = Some(State::complex(Complex::new(class, ty)));
        }
        self.enter_call(request)
    }

    /// `super(...)`/`this(...)` inside a constructor, acting on the
    /// current `this`.
    pub(super) fn eval_delegating(&mut self, constructor: FunctionId, args: Vec<Option<State>>, site: Option<ExprId>) -> EvalResult<()> {
        let (this_value, this) = self.current_this()?;
        let (is_root, path) = {
            let module = self.module();
            let prelude = module.prelude();
            (
                constructor == prelude.any_constructor || constructor == prelude.enum_constructor,
                constructor_path(&module, constructor),
            )
        };
        if is_root {
            return self.push_state(State::unit());
        }
        match path {
            ConstructorPath::Native => {
                self.push(Instruction::custom("adopt host part", move |interp| {
                    let host = interp.pop_state()?;
                    interp.adopt_host_part(this_value, this, host)
                }))?;
                let request = CallRequest::new(constructor, site).with_args(args);
                self.enter_call(request)
            }
            ConstructorPath::Intrinsic(intrinsic) => {
                Err(unsupported_intrinsic(intrinsic.name()))
            }
            ConstructorPath::Interpreted => {
                self.push(Instruction::custom("rebind this", move |interp| {
                    let updated = interp.pop_state()?;
                    interp.stack.rewrite_state(this_value, updated);
                    interp.push_state(State::unit())
                }))?;
                let request = CallRequest::new(constructor, site).with_args(args).with_dispatch(this);
                self.enter_call(request)
            }
        }
    }

    /// Merges the result of a native superclass constructor into `this`.
    ///
    /// A throwable result turns `this` into an exception of the derived
    /// class; any other host object becomes the object's host part.
    fn adopt_host_part(&mut self, this_value: ValueId, this: State, host: State) -> EvalResult<()> {
        match (host, &this) {
            (State::Exception(base), State::Complex(object)) => {
                let object = object.borrow();
                let (ty, fq_name) = {
                    let module = self.module();
                    (object.ty(), module.class_fq_name(object.class()))
                };
                let base = base.borrow();
                let mut exception = ExceptionState::new(object.class(), ty, fq_name)
                    .with_message(base.message().map(str::to_owned))
                    .with_cause(base.cause().cloned());
                for (field, value) in object.fields() {
                    exception.set_field(*field, value.clone());
                }
                drop(object);
                self.stack
                    .rewrite_state(this_value, State::Exception(Shared::new(exception)));
            }
            (State::Exception(base), State::Exception(current)) => {
                let base = base.borrow();
                let mut current = current.borrow_mut();
                current.set_message(base.message().map(str::to_owned));
                current.set_cause(base.cause().cloned());
            }
            (State::Wrapper(wrapper), State::Complex(object)) => {
                object.borrow_mut().set_super_wrapper(wrapper);
            }
            (host, _) => return Err(type_mismatch("host superclass instance", host.kind_name())),
        }
        self.push_state(State::unit())
    }
}
