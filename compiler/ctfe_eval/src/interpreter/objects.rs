//! Fields, object singletons and enum entries.
//!
//! A singleton under construction sits in the run's [`PendingSingletons`],
//! so an initializer that refers back to its own object or entry sees the
//! instance being built instead of starting a second one. It reaches the
//! environment only when its constructor returns; the pending table is
//! dropped when the run ends, so a failed initializer leaves nothing
//! behind.

use ctfe_ir::{ClassId, EnumEntryId, ExprId, FieldId, FunctionId, TypeId};
use rustc_hash::FxHashMap;
use tracing::debug;

use super::{CallRequest, IrInterpreter};
use crate::environment::FunctionShape;
use crate::errors::{invalid_state, type_mismatch, unsupported_call, EvalResult};
use crate::instruction::Instruction;
use crate::state::{Complex, PrimitiveValue, State};

/// Singletons whose constructor is still running in the current run.
#[derive(Debug, Default)]
pub(super) struct PendingSingletons {
    objects: FxHashMap<ClassId, State>,
    enum_entries: FxHashMap<EnumEntryId, State>,
}

impl PendingSingletons {
    pub(super) fn clear(&mut self) {
        self.objects.clear();
        self.enum_entries.clear();
    }
}

impl IrInterpreter {
    pub(super) fn eval_get_field(&mut self, field: FieldId, has_receiver: bool, ty: TypeId) -> EvalResult<()> {
        if !has_receiver {
            return self.push_static_field(field);
        }
        let receiver = self.pop_state()?;
        let (message, cause) = {
            let prelude = *self.module().prelude();
            (prelude.throwable_message, prelude.throwable_cause)
        };
        let value = match &receiver {
            State::Complex(object) => object.borrow().field(field).cloned(),
            State::Exception(exception) => {
                let exception = exception.borrow();
                if field == message {
                    Some(
                        exception
                            .message()
                            .map_or_else(|| State::null(ty), State::string),
                    )
                } else if field == cause {
                    Some(
                        exception
                            .cause()
                            .map_or_else(|| State::null(ty), |cause| State::Exception(cause.clone())),
                    )
                } else {
                    exception.field(field).cloned()
                }
            }
            State::Wrapper(wrapper) => {
                let field_name = {
                    let module = self.module();
                    module.name(module.field(field).name)
                };
                return Err(unsupported_call(format!("{}.{field_name}", wrapper.class_name())));
            }
            other => return Err(type_mismatch("object", other.kind_name())),
        };
        match value {
            Some(value) => self.push_state(value),
            None => self.push_uninitialized_field(field),
        }
    }

    /// Read of a field the object never initialized: a `const` member of an
    /// object shell evaluates its initializer, anything else is a bug in
    /// the evaluated code's lowering.
    fn push_uninitialized_field(&mut self, field: FieldId) -> EvalResult<()> {
        let (is_const, initializer, name) = {
            let module = self.module();
            let info = module.field(field);
            (info.is_const, info.initializer, module.name(info.name))
        };
        match (is_const, initializer) {
            (true, Some(initializer)) => self.push_compound(initializer),
            _ => Err(invalid_state(format!("field `{name}` read before initialization"))),
        }
    }

    /// Top-level property: initialized on first read, then memoized.
    fn push_static_field(&mut self, field: FieldId) -> EvalResult<()> {
        if let Some(state) = self.env.static_field(field) {
            return self.push_state(state);
        }
        let (initializer, name) = {
            let module = self.module();
            let info = module.field(field);
            (info.initializer, module.name(info.name))
        };
        let Some(initializer) = initializer else {
            return Err(invalid_state(format!("static field `{name}` has no value")));
        };
        debug!(field = name, "initializing static field");
        self.push(Instruction::custom("memoize static field", move |interp| {
            let state = interp.pop_state()?;
            let state = interp.env.memoize_static_field(field, state);
            interp.push_state(state)
        }))?;
        self.push_compound(initializer)
    }

    pub(super) fn eval_set_field(&mut self, field: FieldId, has_receiver: bool) -> EvalResult<()> {
        let value = self.pop_state()?;
        if has_receiver {
            let receiver = self.pop_state()?;
            self.write_field(&receiver, field, value)?;
        } else {
            self.env.set_static_field(field, value);
        }
        self.push_state(State::unit())
    }

    /// Stores `value` into `field` of `receiver`.
    pub(crate) fn write_field(&mut self, receiver: &State, field: FieldId, value: State) -> EvalResult<()> {
        let (message, cause) = {
            let prelude = *self.module().prelude();
            (prelude.throwable_message, prelude.throwable_cause)
        };
        match receiver {
            State::Complex(object) => {
                object.borrow_mut().set_field(field, value);
                Ok(())
            }
            State::Exception(exception) => {
                let mut exception = exception.borrow_mut();
                if field == message {
                    exception.set_message(value.as_str().map(str::to_owned));
                } else if field == cause {
                    let cause = match value {
                        State::Exception(cause) => Some(cause),
                        _ => None,
                    };
                    exception.set_cause(cause);
                } else {
                    exception.set_field(field, value);
                }
                Ok(())
            }
            other => Err(type_mismatch("object", other.kind_name())),
        }
    }

    /// `GetObject`: the singleton of `class`, constructed on first use.
    ///
    /// Classes that are not compile-time evaluable become empty shells
    /// unless the configuration asks for real objects; a shell only serves
    /// reads of its `const` members.
    pub(super) fn push_object(&mut self, class: ClassId) -> EvalResult<()> {
        let known = self
            .env
            .object(class)
            .or_else(|| self.pending.objects.get(&class).cloned());
        if let Some(state) = known {
            return self.push_state(state);
        }
        let (ty, constructor, compile_time, name) = {
            let module = self.module();
            let info = module.class(class);
            (
                info.ty,
                info.primary_constructor(),
                info.is_compile_time(),
                module.class_fq_name(class),
            )
        };
        let object = State::complex(Complex::new(class, ty));
        let construct = compile_time || self.env.config().create_non_compile_time_objects;
        debug!(object = name, construct, "initializing object");
        match constructor {
            Some(constructor) if construct => {
                self.pending.objects.insert(class, object.clone());
                let built = object.clone();
                self.push(Instruction::custom("publish object", move |interp| {
                    interp.pop_state()?;
                    interp.pending.objects.remove(&class);
                    let object = interp.env.memoize_object(class, built);
                    interp.push_state(object)
                }))?;
                self.enter_call(CallRequest::new(constructor, None).with_dispatch(object))
            }
            _ => {
                let object = self.env.memoize_object(class, object);
                self.push_state(object)
            }
        }
    }

    /// `GetEnum`: the entry's singleton, constructed on first use.
    pub(crate) fn push_enum_entry(&mut self, entry: EnumEntryId, site: Option<ExprId>) -> EvalResult<()> {
        let known = self
            .env
            .enum_entry(entry)
            .or_else(|| self.pending.enum_entries.get(&entry).cloned());
        if let Some(state) = known {
            return self.push_state(state);
        }
        let (name, ordinal, runtime_class, ty, constructor, args, has_body) = {
            let module = self.module();
            let info = module.enum_entry(entry);
            let runtime_class = info.class_body.unwrap_or(info.owner);
            (
                module.name(info.name),
                info.ordinal,
                runtime_class,
                module.class(runtime_class).ty,
                info.constructor,
                module.exprs.list(info.args).to_vec(),
                info.class_body.is_some(),
            )
        };
        let (name_field, ordinal_field) = {
            let prelude = *self.module().prelude();
            (prelude.enum_name, prelude.enum_ordinal)
        };
        let mut object = Complex::new(runtime_class, ty);
        object.set_field(name_field, State::string(name));
        object.set_field(
            ordinal_field,
            State::primitive(PrimitiveValue::Int(i32::try_from(ordinal).unwrap_or(i32::MAX)), TypeId::INT),
        );
        let object = State::complex(object);
        debug!(entry = name, "initializing enum entry");

        let Some(constructor) = constructor else {
            let object = self.env.memoize_enum_entry(entry, object);
            return self.push_state(object);
        };
        self.pending.enum_entries.insert(entry, object.clone());
        let count = args.len();
        let built = object.clone();
        self.push(Instruction::custom("construct enum entry", move |interp| {
            let args = interp.pop_states(count)?.into_iter().map(Some).collect();
            interp.push(Instruction::custom("publish enum entry", move |interp| {
                interp.pop_state()?;
                interp.pending.enum_entries.remove(&entry);
                let object = interp.env.memoize_enum_entry(entry, built);
                interp.push_state(object)
            }))?;
            interp.construct_entry(constructor, object, args, has_body, site)
        }))?;
        for arg in args.into_iter().rev() {
            self.push_compound(arg)?;
        }
        Ok(())
    }

    /// Runs the enum constructor on `object`. An entry with a body is an
    /// instance of an anonymous subclass whose constructor delegates to the
    /// enum's, so it goes through a delegating adaptor.
    fn construct_entry(
        &mut self,
        constructor: FunctionId,
        object: State,
        args: Vec<Option<State>>,
        has_body: bool,
        site: Option<ExprId>,
    ) -> EvalResult<()> {
        if !has_body {
            return self.enter_call(CallRequest::new(constructor, site).with_args(args).with_dispatch(object));
        }
        let adaptor = self.env.function_adaptor(FunctionShape::delegating(constructor));
        self.enter_call(CallRequest::new(adaptor, site).with_args(args).with_dispatch(object))
    }
}
