//! CTFE Eval - Compile-time constant evaluator for lowered IR.
//!
//! This crate folds IR expressions into constants by interpreting them on
//! a bounded work-list machine instead of running the program.
//!
//! # Architecture
//!
//! The evaluator uses:
//! - `State`: closed set of interpreted values (primitives, objects, host
//!   objects, exceptions, function values)
//! - `CallStack`: frames of scopes, each with an instruction list and a
//!   value stack, bounded by `max_stack` and `max_commands`
//! - `Instruction`: `Simple`/`Compound`/`Custom` work items
//! - `call_path`: the interception order deciding how a call is evaluated
//! - `builtins`: primitive operations keyed by member name and operand kinds
//! - `Intrinsic`: declarations the interpreter implements directly
//! - `NativeRegistry`: host implementations of library functions
//! - `Environment`: memoized singletons and call adaptors shared between runs
//!
//! Emulated exceptions of the evaluated program are data
//! ([`ExceptionState`]); only budget violations and unsupported code are
//! [`InterpreterError`]s.

pub mod bridge;
pub mod builtins;
mod config;
mod environment;
pub mod errors;
mod instruction;
mod interceptor;
pub mod interpreter;
pub mod intrinsics;
mod stack;
pub mod state;

pub use bridge::{ForeignThrowable, HostException, HostObject, HostValue, NativeCall, NativeKind, NativeObject, NativeRegistry};
pub use config::{Configuration, Platform};
pub use environment::{Environment, FunctionShape};
pub use errors::{EvalResult, InterpreterError};
pub use instruction::Instruction;
pub use interceptor::{call_path, constructor_path, CallPath, ConstructorPath};
pub use interpreter::{FoldResult, InterpreterBuilder, IrInterpreter};
pub use intrinsics::Intrinsic;
pub use stack::{CallStack, Frame, Scope, ScopeKind, TryStage};
pub use state::{ExceptionState, PrimitiveValue, State};
