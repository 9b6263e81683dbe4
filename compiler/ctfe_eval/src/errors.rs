//! Structured failures of an evaluation.
//!
//! These abort the current run; they never describe emulated exceptions
//! raised by the evaluated program, which are ordinary
//! [`ExceptionState`](crate::ExceptionState) data.

use thiserror::Error;

/// Result of an evaluation step.
pub type EvalResult<T> = Result<T, InterpreterError>;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterpreterError {
    #[error("exceeded the call stack limit of {limit} frames")]
    StackOverflow { limit: usize },

    #[error("exceeded the budget of {limit} commands")]
    CommandBudgetExceeded { limit: u64 },

    #[error("unsupported intrinsic `{name}`")]
    UnsupportedIntrinsic { name: String },

    #[error("cannot evaluate call to `{function}`")]
    UnsupportedCall { function: String },

    #[error("cannot evaluate `{kind}` expressions")]
    UnsupportedNode { kind: &'static str },

    #[error("no argument for parameter `{parameter}` of `{function}`")]
    MissingArgument { function: String, parameter: String },

    #[error("invalid interpreter state: {message}")]
    InvalidState { message: String },
}

// Budget Errors

#[cold]
pub fn stack_overflow(limit: usize) -> InterpreterError {
    InterpreterError::StackOverflow { limit }
}

#[cold]
pub fn command_budget_exceeded(limit: u64) -> InterpreterError {
    InterpreterError::CommandBudgetExceeded { limit }
}

// Dispatch Errors

#[cold]
pub fn unsupported_intrinsic(name: impl Into<String>) -> InterpreterError {
    InterpreterError::UnsupportedIntrinsic { name: name.into() }
}

#[cold]
pub fn unsupported_call(function: impl Into<String>) -> InterpreterError {
    InterpreterError::UnsupportedCall {
        function: function.into(),
    }
}

#[cold]
pub fn unsupported_node(kind: &'static str) -> InterpreterError {
    InterpreterError::UnsupportedNode { kind }
}

#[cold]
pub fn missing_argument(function: impl Into<String>, parameter: impl Into<String>) -> InterpreterError {
    InterpreterError::MissingArgument {
        function: function.into(),
        parameter: parameter.into(),
    }
}

// Machine Errors

#[cold]
pub fn invalid_state(message: impl Into<String>) -> InterpreterError {
    InterpreterError::InvalidState {
        message: message.into(),
    }
}

#[cold]
pub fn empty_value_stack() -> InterpreterError {
    invalid_state("value stack is empty")
}

#[cold]
pub fn unbound_value(name: &str) -> InterpreterError {
    invalid_state(format!("value `{name}` is not bound in any frame"))
}

#[cold]
pub fn type_mismatch(expected: &str, found: &str) -> InterpreterError {
    invalid_state(format!("expected {expected}, found {found}"))
}
