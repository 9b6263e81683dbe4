use std::fmt::Write;

use ctfe_ir::{ClassId, FieldId, TypeId};

use super::{Shared, State};

/// An emulated exception: a throwable instance the program can catch.
#[derive(Clone, Debug)]
pub struct ExceptionState {
    class: ClassId,
    ty: TypeId,
    fq_name: String,
    message: Option<String>,
    cause: Option<Shared<ExceptionState>>,
    /// Fields declared by interpreted subclasses.
    fields: Vec<(FieldId, State)>,
    stack_trace: Vec<String>,
}

impl ExceptionState {
    pub fn new(class: ClassId, ty: TypeId, fq_name: impl Into<String>) -> Self {
        ExceptionState {
            class,
            ty,
            fq_name: fq_name.into(),
            message: None,
            cause: None,
            fields: Vec::new(),
            stack_trace: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_message(mut self, message: Option<String>) -> Self {
        self.message = message;
        self
    }

    #[must_use]
    pub fn with_cause(mut self, cause: Option<Shared<ExceptionState>>) -> Self {
        self.cause = cause;
        self
    }

    #[inline]
    pub fn class(&self) -> ClassId {
        self.class
    }

    #[inline]
    pub fn ty(&self) -> TypeId {
        self.ty
    }

    #[inline]
    pub fn fq_name(&self) -> &str {
        &self.fq_name
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn set_message(&mut self, message: Option<String>) {
        self.message = message;
    }

    pub fn cause(&self) -> Option<&Shared<ExceptionState>> {
        self.cause.as_ref()
    }

    pub fn set_cause(&mut self, cause: Option<Shared<ExceptionState>>) {
        self.cause = cause;
    }

    pub fn field(&self, field: FieldId) -> Option<&State> {
        self.fields
            .iter()
            .find_map(|(id, state)| (*id == field).then_some(state))
    }

    pub fn set_field(&mut self, field: FieldId, value: State) {
        match self.fields.iter_mut().find(|(id, _)| *id == field) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((field, value)),
        }
    }

    pub fn stack_trace(&self) -> &[String] {
        &self.stack_trace
    }

    pub fn has_stack_trace(&self) -> bool {
        !self.stack_trace.is_empty()
    }

    pub fn set_stack_trace(&mut self, trace: Vec<String>) {
        self.stack_trace = trace;
    }

    /// The message, or the class name when there is none.
    pub fn short_description(&self) -> String {
        self.message
            .clone()
            .unwrap_or_else(|| self.fq_name.clone())
    }

    /// `Throwable.toString()`: `fq.Name: message`.
    pub fn render(&self) -> String {
        match &self.message {
            Some(message) => format!("{}: {message}", self.fq_name),
            None => self.fq_name.clone(),
        }
    }

    /// Rendering with the captured frames and the cause chain.
    pub fn long_description(&self) -> String {
        let mut out = self.render();
        for frame in &self.stack_trace {
            let _ = write!(out, "\n\tat {frame}");
        }
        if let Some(cause) = &self.cause {
            let _ = write!(out, "\nCaused by: {}", cause.borrow().long_description());
        }
        out
    }
}
