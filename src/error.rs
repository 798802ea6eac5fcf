//! Error taxonomy (§4.6, §7).
//!
//! Grounded on the teacher's `typechecker/error.rs` / `ast/parse_error.rs`:
//! a plain struct with a message and a position, manual `Display` and
//! `std::error::Error`, no `anyhow`/`thiserror`. All errors here are fatal to
//! the current evaluation (§7): the core never recovers from one internally,
//! it only ever returns it up the `?` chain to whatever external driver
//! called into the evaluator.
use std::fmt::{self, Display};

use log::error;

use crate::ast::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UndefinedVariable,
    Redeclaration,
    VariableTypeMismatch,
    ConstAssignment,
    VariableNotFound,
    ArgumentMismatch,
    BuiltinArgumentMismatch,
    ArgumentTypeMismatch,
    DefaultParameterType,
    ReturnTypeMismatch,
    ReturnOutsideFunction,
    ConditionType,
    NotAFunction,
    NotSupported,
    ValueError,
    RuntimeError,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::UndefinedVariable => "UndefinedVariable",
            ErrorKind::Redeclaration => "Redeclaration",
            ErrorKind::VariableTypeMismatch => "VariableTypeMismatch",
            ErrorKind::ConstAssignment => "ConstAssignment",
            ErrorKind::VariableNotFound => "VariableNotFound",
            ErrorKind::ArgumentMismatch => "ArgumentMismatch",
            ErrorKind::BuiltinArgumentMismatch => "BuiltinArgumentMismatch",
            ErrorKind::ArgumentTypeMismatch => "ArgumentTypeMismatch",
            ErrorKind::DefaultParameterType => "DefaultParameterType",
            ErrorKind::ReturnTypeMismatch => "ReturnTypeMismatch",
            ErrorKind::ReturnOutsideFunction => "ReturnOutsideFunction",
            ErrorKind::ConditionType => "ConditionType",
            ErrorKind::NotAFunction => "NotAFunction",
            ErrorKind::NotSupported => "NotSupported",
            ErrorKind::ValueError => "ValueError",
            ErrorKind::RuntimeError => "RuntimeError",
        };
        f.write_str(s)
    }
}

/// A fatal runtime error, tagged with its kind and the source position of
/// the AST node the evaluator was visiting when it occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalError {
    pub kind: ErrorKind,
    pub message: String,
    pub position: Position,
}

impl Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[Eve: {}] {} at {}", self.kind, self.message, self.position)
    }
}

impl std::error::Error for EvalError {}

/// Construct an `EvalError` at `position`, logging it the way the teacher's
/// `bin/why.rs` logs a `TypeError` right before aborting.
pub fn err(kind: ErrorKind, message: impl Into<String>, position: &Position) -> EvalError {
    let error = EvalError {
        kind,
        message: message.into(),
        position: position.clone(),
    };
    error!("{error}");
    error
}

/// Render a stack trace the way `Context::printStackTrace` is specified to:
/// one scope per line, innermost first.
pub fn render_stack_trace(scopes: &[String]) -> String {
    scopes.join("\n")
}
