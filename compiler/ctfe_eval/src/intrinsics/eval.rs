//! Evaluation of intrinsics in the callee's frame.
//!
//! Arguments are bound as parameters of the intrinsic declaration. An
//! intrinsic either pushes its value or schedules further work (enum
//! entries, `init` lambdas, interpreted `equals` overrides) whose result
//! becomes the frame's value.

use std::rc::Rc;

use ctfe_ir::{ClassId, ExprId, FunctionId, PrimitiveType, TypeId, TypeKind};

use super::text;
use super::Intrinsic;
use crate::builtins;
use crate::errors::{invalid_state, type_mismatch, unsupported_intrinsic, EvalResult};
use crate::instruction::Instruction;
use crate::interpreter::{identity_hash, CallRequest, IrInterpreter};
use crate::state::{Complex, FunctionState, PrimitiveValue, State};

fn int_arg(state: &State) -> EvalResult<i32> {
    state
        .as_value()
        .and_then(PrimitiveValue::as_i32)
        .ok_or_else(|| type_mismatch("Int", state.kind_name()))
}

fn string_arg(state: &State) -> EvalResult<&str> {
    state
        .as_str()
        .ok_or_else(|| type_mismatch("String", state.kind_name()))
}

fn function_arg(state: &State) -> EvalResult<Rc<FunctionState>> {
    match state {
        State::Function(function) => Ok(Rc::clone(function)),
        other => Err(type_mismatch("function", other.kind_name())),
    }
}

/// Zero value of a primitive array element.
fn default_element(element: PrimitiveType) -> State {
    let value = match element {
        PrimitiveType::Boolean => PrimitiveValue::Boolean(false),
        PrimitiveType::Char => PrimitiveValue::Char(0),
        PrimitiveType::Byte => PrimitiveValue::Byte(0),
        PrimitiveType::Short => PrimitiveValue::Short(0),
        PrimitiveType::Int => PrimitiveValue::Int(0),
        PrimitiveType::Long => PrimitiveValue::Long(0),
        PrimitiveType::Float => PrimitiveValue::Float(0.0),
        PrimitiveType::Double => PrimitiveValue::Double(0.0),
    };
    State::primitive(value, element.type_id())
}

/// Decimal form of an unsigned value stored in its signed counterpart.
fn unsigned_string(data: &PrimitiveValue) -> Option<String> {
    let text = match *data {
        PrimitiveValue::Byte(v) => (v as u8).to_string(),
        PrimitiveValue::Short(v) => (v as u16).to_string(),
        PrimitiveValue::Int(v) => (v as u32).to_string(),
        PrimitiveValue::Long(v) => (v as u64).to_string(),
        _ => return None,
    };
    Some(text)
}

/// `toInt()`/`toLong()` of an unsigned value: zero-extended.
fn unsigned_to_signed(data: &PrimitiveValue) -> Option<State> {
    let state = match *data {
        PrimitiveValue::Byte(v) => State::int(i32::from(v as u8)),
        PrimitiveValue::Short(v) => State::int(i32::from(v as u16)),
        PrimitiveValue::Int(v) => State::int(v),
        PrimitiveValue::Long(v) => State::long(v),
        _ => return None,
    };
    Some(state)
}

impl IrInterpreter {
    pub(crate) fn run_intrinsic(&mut self, intrinsic: Intrinsic, callee: FunctionId, site: Option<ExprId>) -> EvalResult<()> {
        let args = self.arguments(callee)?;
        let arg = |index: usize| {
            args.get(index)
                .cloned()
                .ok_or_else(|| invalid_state(format!("{} without argument {index}", intrinsic.name())))
        };
        let prelude = *self.module().prelude();

        match intrinsic {
            Intrinsic::Equals => self.push_equals(arg(0)?, arg(1)?, site),
            Intrinsic::Identical => {
                let same = arg(0)?.same_ref(&arg(1)?);
                self.push_state(State::boolean(same))
            }
            Intrinsic::Ieee754Equals => {
                let (lhs, rhs) = (arg(0)?, arg(1)?);
                let equal = match (lhs.as_value().and_then(PrimitiveValue::as_f64), rhs.as_value().and_then(PrimitiveValue::as_f64)) {
                    (Some(l), Some(r)) => l == r,
                    _ => lhs.is_null() && rhs.is_null(),
                };
                self.push_state(State::boolean(equal))
            }
            Intrinsic::CheckNotNull => {
                let value = arg(0)?;
                if value.is_null() {
                    self.throw_new(prelude.null_pointer_exception, None, site)
                } else {
                    self.push_state(value)
                }
            }
            Intrinsic::ThrowClassCast => self.throw_new(prelude.class_cast_exception, None, site),
            Intrinsic::ThrowNullPointer => self.throw_new(prelude.null_pointer_exception, None, site),
            Intrinsic::NoWhenBranchMatched => self.throw_new(prelude.no_when_branch_matched_exception, None, site),
            Intrinsic::UnsafeCast => {
                let receiver = self
                    .extension_receiver_state(callee)
                    .ok_or_else(|| invalid_state("unsafeCast without a receiver"))?;
                self.push_state(receiver)
            }

            Intrinsic::EmptyArray => {
                let ty = self.return_type(callee);
                self.push_state(State::array(Vec::new(), ty))
            }
            Intrinsic::ArrayOf => {
                let elements = arg(0)?;
                let elements = elements
                    .as_value()
                    .and_then(PrimitiveValue::as_array)
                    .map(|storage| storage.borrow().clone())
                    .ok_or_else(|| type_mismatch("array", elements.kind_name()))?;
                let ty = self.return_type(callee);
                self.push_state(State::array(elements, ty))
            }
            Intrinsic::ArrayOfNulls => {
                let size = int_arg(&arg(0)?)?;
                let ty = self.return_type(callee);
                let Ok(size) = usize::try_from(size) else {
                    return self.throw_negative_size(size, site);
                };
                let element = self.module().types.array_element(ty).unwrap_or(TypeId::NULLABLE_ANY);
                self.push_state(State::array(vec![State::null(element); size], ty))
            }
            Intrinsic::ArrayConstructor => {
                let size = int_arg(&arg(0)?)?;
                let init = args.get(1).map(function_arg).transpose()?;
                self.construct_array(callee, size, init, site)
            }

            Intrinsic::EnumValues => {
                let ty = self.return_type(callee);
                let class = self.enum_class_of(callee, ty)?;
                self.push_enum_values(class, ty, site)
            }
            Intrinsic::EnumValueOf => {
                let name = arg(0)?;
                let name = string_arg(&name)?.to_owned();
                let ty = self.return_type(callee);
                let class = self.enum_class_of(callee, ty)?;
                self.push_enum_value_of(class, &name, site)
            }
            Intrinsic::EnumCompareTo => {
                let this = self.receiver(callee)?;
                let ordinal = |state: &State| -> EvalResult<i32> {
                    let State::Complex(object) = state else {
                        return Err(type_mismatch("enum entry", state.kind_name()));
                    };
                    let object = object.borrow();
                    object
                        .field(prelude.enum_ordinal)
                        .map(int_arg)
                        .transpose()?
                        .ok_or_else(|| invalid_state("enum entry without an ordinal"))
                };
                let difference = ordinal(&this)?.wrapping_sub(ordinal(&arg(0)?)?);
                self.push_state(State::int(difference))
            }
            Intrinsic::EnumEquals | Intrinsic::AnyEquals => {
                let this = self.receiver(callee)?;
                let equal = match (&this, &arg(0)?) {
                    (State::Primitive(a), State::Primitive(b)) => builtins::equals(&a.value, &b.value),
                    (a, b) => a.same_ref(b),
                };
                self.push_state(State::boolean(equal))
            }
            Intrinsic::EnumHashCode => {
                let name = self.enum_name(&self.receiver(callee)?, prelude.enum_name)?;
                let hash = builtins::hash_code(&PrimitiveValue::string(&name)).unwrap_or_default();
                self.push_state(State::int(hash))
            }
            Intrinsic::EnumToString => {
                let name = self.enum_name(&self.receiver(callee)?, prelude.enum_name)?;
                self.push_state(State::string(&name))
            }

            Intrinsic::LongFromParts => {
                let (low, high) = (int_arg(&arg(0)?)?, int_arg(&arg(1)?)?);
                let value = (i64::from(high) << 32) | i64::from(low as u32);
                self.push_state(State::long(value))
            }
            Intrinsic::CharFromCode => {
                let code = int_arg(&arg(0)?)?;
                self.push_state(State::primitive(PrimitiveValue::Char(code as u16), TypeId::CHAR))
            }

            Intrinsic::SourceLocation => {
                let location = {
                    let module = self.module();
                    let line = site.map_or(0, |site| module.line(site));
                    format!("{}:{line}", module.file_name())
                };
                self.push_state(State::string(&location))
            }
            Intrinsic::Assert => {
                let value = arg(0)?;
                if value.as_bool().ok_or_else(|| type_mismatch("Boolean", value.kind_name()))? {
                    return self.push_state(State::unit());
                }
                match args.get(1).map(function_arg).transpose()? {
                    Some(lazy_message) => {
                        let error = prelude.assertion_error;
                        self.push(Instruction::custom("throw assertion error", move |interp| {
                            let message = interp.pop_state()?;
                            let message = string_arg(&message)?.to_owned();
                            interp.throw_new(error, Some(message), site)
                        }))?;
                        self.push(Instruction::custom("stringify assertion message", move |interp| {
                            let message = interp.pop_state()?;
                            interp.push_string_of(message, site)
                        }))?;
                        self.invoke_function(lazy_message, Vec::new(), site)
                    }
                    None => self.throw_new(prelude.assertion_error, Some("Assertion failed".to_owned()), site),
                }
            }
            Intrinsic::DataClassArrayToString => {
                let array = arg(0)?;
                if array.is_null() {
                    self.push_state(State::string("null"))
                } else {
                    self.push_string_of(array, site)
                }
            }
            Intrinsic::DataClassArrayHashCode => {
                let array = arg(0)?;
                let hash = match array.as_value().and_then(PrimitiveValue::as_array) {
                    Some(storage) => storage.borrow().iter().fold(1i32, |hash, element| {
                        let element_hash = match element {
                            State::Primitive(p) => builtins::hash_code(&p.value).unwrap_or_default(),
                            other => identity_hash(other),
                        };
                        hash.wrapping_mul(31).wrapping_add(element_hash)
                    }),
                    None if array.is_null() => 0,
                    None => return Err(type_mismatch("array", array.kind_name())),
                };
                self.push_state(State::int(hash))
            }
            Intrinsic::TrimIndent => {
                let receiver = self.extension_receiver(callee)?;
                let text = text::trim_indent(string_arg(&receiver)?);
                self.push_state(State::string(&text))
            }
            Intrinsic::TrimMargin => {
                let receiver = self.extension_receiver(callee)?;
                let prefix = arg(0)?;
                let prefix = string_arg(&prefix)?;
                if text::is_blank(prefix) {
                    let message = "marginPrefix must be non-blank string.".to_owned();
                    return self.throw_new(prelude.illegal_argument_exception, Some(message), site);
                }
                let text = text::trim_margin(string_arg(&receiver)?, prefix);
                self.push_state(State::string(&text))
            }

            Intrinsic::UnsignedConstructor => {
                let class = self
                    .module()
                    .function(callee)
                    .owner_class()
                    .ok_or_else(|| invalid_state("unsigned constructor without a class"))?;
                let unsigned = prelude
                    .unsigned_class(class)
                    .ok_or_else(|| unsupported_intrinsic(intrinsic.name()))?;
                let ty = self.module().class(class).ty;
                let mut object = Complex::new(class, ty);
                object.set_field(unsigned.data, arg(0)?);
                self.push_state(State::complex(object))
            }
            Intrinsic::UnsignedToString => {
                let data = self.unsigned_data(callee)?;
                let text = unsigned_string(&data).ok_or_else(|| unsupported_intrinsic(intrinsic.name()))?;
                self.push_state(State::string(&text))
            }
            Intrinsic::UnsignedToSigned => {
                let data = self.unsigned_data(callee)?;
                let state = unsigned_to_signed(&data).ok_or_else(|| unsupported_intrinsic(intrinsic.name()))?;
                self.push_state(state)
            }

            Intrinsic::AnyToString | Intrinsic::ThrowableToString => {
                let this = self.receiver(callee)?;
                match this {
                    State::Complex(_) | State::Exception(_) => {
                        let text = self.default_string(&this);
                        self.push_state(State::string(&text))
                    }
                    other => self.push_string_of(other, site),
                }
            }
            Intrinsic::AnyHashCode => {
                let this = self.receiver(callee)?;
                let hash = match &this {
                    State::Primitive(p) => builtins::hash_code(&p.value).unwrap_or_else(|| identity_hash(&this)),
                    other => identity_hash(other),
                };
                self.push_state(State::int(hash))
            }
        }
    }

    fn receiver(&self, callee: FunctionId) -> EvalResult<State> {
        self.dispatch_receiver_state(callee)
            .ok_or_else(|| invalid_state("member intrinsic without a receiver"))
    }

    fn extension_receiver(&self, callee: FunctionId) -> EvalResult<State> {
        self.extension_receiver_state(callee)
            .ok_or_else(|| invalid_state("extension intrinsic without a receiver"))
    }

    /// Declared return type with the call's type arguments applied.
    fn return_type(&self, callee: FunctionId) -> TypeId {
        let declared = self.module().function(callee).return_type;
        self.substitute(declared)
    }

    fn enum_name(&self, state: &State, field: ctfe_ir::FieldId) -> EvalResult<String> {
        let State::Complex(object) = state else {
            return Err(type_mismatch("enum entry", state.kind_name()));
        };
        let object = object.borrow();
        let name = object
            .field(field)
            .ok_or_else(|| invalid_state("enum entry without a name"))?;
        Ok(string_arg(name)?.to_owned())
    }

    fn unsigned_data(&self, callee: FunctionId) -> EvalResult<PrimitiveValue> {
        let this = self.receiver(callee)?;
        let State::Complex(object) = &this else {
            return Err(type_mismatch("unsigned value", this.kind_name()));
        };
        let object = object.borrow();
        let unsigned = self
            .module()
            .prelude()
            .unsigned_class(object.class())
            .ok_or_else(|| type_mismatch("unsigned value", "object"))?;
        object
            .field(unsigned.data)
            .and_then(State::as_value)
            .cloned()
            .ok_or_else(|| invalid_state("unsigned value without data"))
    }

    /// `==`: null-safe, by value for primitives and unsigned numbers,
    /// through an interpreted `equals` override when the left operand's
    /// class declares one, by identity otherwise.
    fn push_equals(&mut self, lhs: State, rhs: State, site: Option<ExprId>) -> EvalResult<()> {
        if lhs.is_null() || rhs.is_null() {
            return self.push_state(State::boolean(lhs.is_null() && rhs.is_null()));
        }
        match (&lhs, &rhs) {
            (State::Primitive(a), State::Primitive(b)) => {
                return self.push_state(State::boolean(builtins::equals(&a.value, &b.value)));
            }
            (State::Complex(_) | State::Exception(_), _) => {}
            _ => return self.push_state(State::boolean(lhs.same_ref(&rhs))),
        }
        let Some(class) = lhs.class() else {
            return Err(invalid_state("object without a class"));
        };
        let (target, identity, unsigned) = {
            let module = self.module();
            let prelude = module.prelude();
            let target = module.resolve_override(class, prelude.any_equals);
            let identity = target == prelude.any_equals || super::resolve(&module, target).is_some();
            (target, identity, prelude.unsigned_class(class))
        };
        if let Some(unsigned) = unsigned {
            let data = |state: &State| match state {
                State::Complex(object) => object.borrow().field(unsigned.data).and_then(State::as_value).cloned(),
                _ => None,
            };
            let equal = match (data(&lhs), data(&rhs)) {
                (Some(a), Some(b)) => lhs.class() == rhs.class() && builtins::equals(&a, &b),
                _ => false,
            };
            return self.push_state(State::boolean(equal));
        }
        if identity {
            return self.push_state(State::boolean(lhs.same_ref(&rhs)));
        }
        self.enter_call(CallRequest::new(target, site).with_dispatch(lhs).with_values(vec![rhs]))
    }

    fn throw_negative_size(&mut self, size: i32, site: Option<ExprId>) -> EvalResult<()> {
        let class = self.module().prelude().illegal_argument_exception;
        self.throw_new(class, Some(format!("Negative array size: {size}")), site)
    }

    /// `Array(size)` and `Array(size) { init }`: one `init` call per index,
    /// in ascending order. Only the next element's step is ever scheduled.
    fn construct_array(
        &mut self,
        callee: FunctionId,
        size: i32,
        init: Option<Rc<FunctionState>>,
        site: Option<ExprId>,
    ) -> EvalResult<()> {
        let ty = self.return_type(callee);
        let Ok(len) = usize::try_from(size) else {
            return self.throw_negative_size(size, site);
        };
        let Some(init) = init else {
            let element = match self.module().types.kind(ty) {
                TypeKind::PrimitiveArray(p) => default_element(p),
                _ => State::null(TypeId::NULLABLE_ANY),
            };
            return self.push_state(State::array(vec![element; len], ty));
        };
        self.initialize_element(init, Vec::new(), len, ty, site)
    }

    /// Calls `init` for the element after `elements`, or pushes the array
    /// once all `len` are computed.
    fn initialize_element(
        &mut self,
        init: Rc<FunctionState>,
        elements: Vec<State>,
        len: usize,
        ty: TypeId,
        site: Option<ExprId>,
    ) -> EvalResult<()> {
        let index = elements.len();
        if index == len {
            return self.push_state(State::array(elements, ty));
        }
        let next = Rc::clone(&init);
        self.push(Instruction::custom("store element", move |interp| {
            let mut elements = elements;
            elements.push(interp.pop_state()?);
            interp.initialize_element(next, elements, len, ty, site)
        }))?;
        let index = i32::try_from(index).unwrap_or(i32::MAX);
        self.invoke_function(init, vec![State::int(index)], site)
    }

    /// Enum class a `values`/`valueOf` call refers to: the owner of the
    /// special member, or the type argument of `enumValues<T>()`.
    fn enum_class_of(&self, callee: FunctionId, ty: TypeId) -> EvalResult<ClassId> {
        let module = self.module();
        if let Some(owner) = module.function(callee).owner_class() {
            return Ok(owner);
        }
        let element = module.types.array_element(ty).unwrap_or(ty);
        module
            .types
            .class_of(element)
            .ok_or_else(|| invalid_state(format!("`{}` is not an enum class", module.type_name(element))))
    }

    fn push_enum_values(&mut self, class: ClassId, ty: TypeId, site: Option<ExprId>) -> EvalResult<()> {
        let entries = self.module().class(class).enum_entries.clone();
        let count = entries.len();
        self.push(Instruction::custom("collect enum entries", move |interp| {
            let elements = interp.pop_states(count)?;
            interp.push_state(State::array(elements, ty))
        }))?;
        for entry in entries.into_iter().rev() {
            self.push(Instruction::custom("load enum entry", move |interp| {
                interp.push_enum_entry(entry, site)
            }))?;
        }
        Ok(())
    }

    fn push_enum_value_of(&mut self, class: ClassId, name: &str, site: Option<ExprId>) -> EvalResult<()> {
        let (entry, fq_name) = {
            let module = self.module();
            let entry = module
                .class(class)
                .enum_entries
                .iter()
                .copied()
                .find(|&entry| module.name(module.enum_entry(entry).name) == name);
            (entry, module.class_fq_name(class))
        };
        match entry {
            Some(entry) => self.push_enum_entry(entry, site),
            None => {
                let class = self.module().prelude().illegal_argument_exception;
                self.throw_new(class, Some(format!("No enum constant {fq_name}.{name}")), site)
            }
        }
    }
}
