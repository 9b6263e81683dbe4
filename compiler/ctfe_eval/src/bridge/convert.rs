//! Conversion between interpreter states and host values.

use std::any::Any;
use std::rc::Rc;

use ctfe_ir::{IrModule, TypeId};

use super::{HostException, HostObject, HostValue, NativeObject};
use crate::environment::Environment;
use crate::state::{ExceptionState, PrimitiveValue, Shared, State, Wrapper};

/// Lowers a state to the value a native receives.
///
/// Interpreted objects and functions travel as opaque proxies; emulated
/// exceptions keep a back reference so they come back as the same state.
pub fn to_host(state: &State, module: &IrModule) -> HostValue {
    match state {
        State::Primitive(p) => match &p.value {
            PrimitiveValue::Unit => HostValue::Unit,
            PrimitiveValue::Null => HostValue::Null,
            PrimitiveValue::Boolean(b) => HostValue::Boolean(*b),
            PrimitiveValue::Char(c) => HostValue::Char(*c),
            PrimitiveValue::Byte(v) => HostValue::Byte(*v),
            PrimitiveValue::Short(v) => HostValue::Short(*v),
            PrimitiveValue::Int(v) => HostValue::Int(*v),
            PrimitiveValue::Long(v) => HostValue::Long(*v),
            PrimitiveValue::Float(v) => HostValue::Float(*v),
            PrimitiveValue::Double(v) => HostValue::Double(*v),
            PrimitiveValue::String(s) => HostValue::Str(Rc::clone(s)),
            PrimitiveValue::Array(storage) => HostValue::Array(
                storage
                    .borrow()
                    .iter()
                    .map(|element| to_host(element, module))
                    .collect(),
            ),
        },
        State::Wrapper(wrapper) => HostValue::Object(wrapper.object().clone()),
        State::Exception(exception) => {
            HostValue::Throwable(Rc::new(host_exception(exception, Some(state.clone()))))
        }
        State::Complex(_) | State::Function(_) => HostValue::Proxy(state.clone()),
    }
}

fn host_exception(exception: &Shared<ExceptionState>, origin: Option<State>) -> HostException {
    let e = exception.borrow();
    let cause = e
        .cause()
        .map(|cause| Rc::new(host_exception(cause, Some(State::Exception(cause.clone())))));
    HostException {
        class_name: e.fq_name().to_owned(),
        message: e.message().map(str::to_owned),
        cause,
        origin,
    }
}

/// Lifts a host value into a state of the `declared` type.
///
/// Throwables of a registered exception class become emulated
/// exceptions; any other host throwable stays a host object.
pub fn from_host(value: HostValue, declared: TypeId, env: &Environment) -> State {
    let module = env.module();
    match value {
        HostValue::Unit => State::unit(),
        HostValue::Null => State::null(declared),
        HostValue::Boolean(b) => State::boolean(b),
        HostValue::Char(c) => State::primitive(PrimitiveValue::Char(c), TypeId::CHAR),
        HostValue::Byte(v) => State::primitive(PrimitiveValue::Byte(v), TypeId::BYTE),
        HostValue::Short(v) => State::primitive(PrimitiveValue::Short(v), TypeId::SHORT),
        HostValue::Int(v) => State::int(v),
        HostValue::Long(v) => State::long(v),
        HostValue::Float(v) => State::primitive(PrimitiveValue::Float(v), TypeId::FLOAT),
        HostValue::Double(v) => State::double(v),
        HostValue::Str(s) => State::primitive(PrimitiveValue::String(s), TypeId::STRING),
        HostValue::Array(items) => {
            let element = module
                .types
                .array_element(declared)
                .unwrap_or(TypeId::NULLABLE_ANY);
            let elements = items
                .into_iter()
                .map(|item| from_host(item, element, env))
                .collect();
            State::array(elements, declared)
        }
        HostValue::Object(object) => {
            let ty = module
                .class_by_fq_name(object.class_name())
                .map_or(declared, |class| module.class(class).ty);
            State::Wrapper(Rc::new(Wrapper::new(object, ty)))
        }
        HostValue::Throwable(exception) => {
            let registered =
                exception.origin.is_some() || env.exception_class_named(&exception.class_name).is_some();
            if registered {
                State::Exception(exception_state(&exception, env))
            } else {
                let object = HostObject::new(ForeignThrowable(exception));
                State::Wrapper(Rc::new(Wrapper::new(object, declared)))
            }
        }
        HostValue::Proxy(state) => state,
    }
}

/// Emulated exception for a host throwable.
///
/// Classes the environment does not register as exception classes fall
/// back to `kotlin.Throwable` while keeping the host class name.
pub fn exception_state(exception: &HostException, env: &Environment) -> Shared<ExceptionState> {
    if let Some(State::Exception(origin)) = &exception.origin {
        return origin.clone();
    }
    let cause = exception
        .cause
        .as_ref()
        .map(|cause| exception_state(cause, env));
    let module = env.module();
    let class = env
        .exception_class_named(&exception.class_name)
        .unwrap_or(module.prelude().throwable);
    let state = ExceptionState::new(class, module.class(class).ty, exception.class_name.clone())
        .with_message(exception.message.clone())
        .with_cause(cause);
    Shared::new(state)
}

/// Host throwable of a class outside the registered exception hierarchy,
/// carried as an opaque host object.
#[derive(Debug)]
pub struct ForeignThrowable(pub Rc<HostException>);

impl NativeObject for ForeignThrowable {
    fn class_name(&self) -> &str {
        &self.0.class_name
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn render(&self) -> String {
        self.0.render()
    }
}
