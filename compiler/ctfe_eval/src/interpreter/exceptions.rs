//! Raising emulated exceptions.

use ctfe_ir::{ClassId, ExprId};
use tracing::warn;

use super::{Exit, IrInterpreter};
use crate::bridge::{exception_state, HostException};
use crate::builtins::Thrown;
use crate::errors::EvalResult;
use crate::state::{ExceptionState, Shared};

impl IrInterpreter {
    /// Throws `exception` from `site`, recording the stack trace on its
    /// first throw.
    pub(crate) fn throw(&mut self, exception: Shared<ExceptionState>, site: Option<ExprId>) -> EvalResult<()> {
        if !exception.borrow().has_stack_trace() {
            let trace = self.stack_trace(site);
            exception.borrow_mut().set_stack_trace(trace);
        }
        self.propagate(Exit::Throw(exception))
    }

    /// Throws a fresh instance of the library exception `class`.
    pub(crate) fn throw_new(&mut self, class: ClassId, message: Option<String>, site: Option<ExprId>) -> EvalResult<()> {
        let exception = self.new_exception(class, message);
        self.throw(exception, site)
    }

    pub(crate) fn new_exception(&self, class: ClassId, message: Option<String>) -> Shared<ExceptionState> {
        let module = self.module();
        let class_info = module.class(class);
        Shared::new(ExceptionState::new(class, class_info.ty, module.name(class_info.fq_name)).with_message(message))
    }

    pub(crate) fn throw_builtin(&mut self, thrown: Thrown, site: Option<ExprId>) -> EvalResult<()> {
        let class = thrown.class(self.module().prelude());
        self.throw_new(class, Some(thrown.message), site)
    }

    /// Throws the emulated counterpart of a host failure.
    pub(crate) fn throw_host(&mut self, exception: &HostException, site: Option<ExprId>) -> EvalResult<()> {
        if exception.origin.is_none() && self.env.exception_class_named(&exception.class_name).is_none() {
            warn!(class = %exception.class_name, "host exception of an unregistered class");
        }
        let state = exception_state(exception, &self.env);
        self.throw(state, site)
    }

    /// `fq.name(File.kt:line)` for the throw site and every calling frame,
    /// innermost first. The root frame contributes nothing.
    fn stack_trace(&self, site: Option<ExprId>) -> Vec<String> {
        let module = self.module();
        let file = module.file_name();
        let mut line_site = site;
        let mut trace = Vec::new();
        for frame in self.stack.frames().iter().rev() {
            let Some(function) = frame.function else {
                break;
            };
            let line = line_site.map_or(0, |expr| module.line(expr));
            trace.push(format!("{}({file}:{line})", module.fq_name(function)));
            line_site = frame.call_site;
        }
        trace
    }
}
