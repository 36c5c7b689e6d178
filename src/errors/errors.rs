use std::{fmt::Display, io, path::PathBuf};

use thiserror::Error;

use crate::Position;

/// A fatal front-end error (lexing or parsing).
#[derive(Debug, Clone, Error)]
#[error("({position}) {internal_error}")]
pub struct Error {
    internal_error: ErrorImpl,
    position: Position,
}

impl Error {
    pub fn new(error_impl: ErrorImpl, position: Position) -> Self {
        Error {
            internal_error: error_impl,
            position,
        }
    }

    pub fn get_position(&self) -> &Position {
        &self.position
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => "UnrecognisedToken",
            ErrorImpl::UnexpectedToken { .. } => "UnexpectedToken",
            ErrorImpl::UnexpectedTokenDetailed { .. } => "UnexpectedTokenDetailed",
            ErrorImpl::NumberParseError { .. } => "NumberParseError",
            ErrorImpl::UnterminatedString => "UnterminatedString",
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => ErrorTip::None,
            ErrorImpl::UnexpectedToken { token } => ErrorTip::Suggestion(format!(
                "Unexpected token: `{}`, did you miss a semicolon?",
                token
            )),
            ErrorImpl::UnexpectedTokenDetailed { token, message } => {
                ErrorTip::Suggestion(format!("Unexpected token: `{}`, {}", token, message))
            }
            ErrorImpl::NumberParseError { token } => ErrorTip::Suggestion(format!(
                "Invalid number: `{}`, is it above the integer limit?",
                token
            )),
            ErrorImpl::UnterminatedString => {
                ErrorTip::Suggestion(String::from("String literal is missing its closing quote"))
            }
        }
    }
}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

#[derive(Error, Debug, Clone)]
pub enum ErrorImpl {
    #[error("unrecognised token: {token:?}")]
    UnrecognisedToken { token: String },
    #[error("unexpected token: {token:?}")]
    UnexpectedToken { token: String },
    #[error("unexpected token ({message}): {token:?}")]
    UnexpectedTokenDetailed { token: String, message: String },
    #[error("error parsing number: {token:?}")]
    NumberParseError { token: String },
    #[error("unterminated string literal")]
    UnterminatedString,
}

/// A recoverable type-check diagnostic.
///
/// The display form `(line:col) message` is relied upon by tooling and
/// snapshot tests, so it must not change.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("({position}) {message}")]
pub struct Diagnostic {
    pub position: Position,
    pub message: String,
}

impl Diagnostic {
    pub fn new(position: Position, message: impl Into<String>) -> Self {
        Diagnostic {
            position,
            message: message.into(),
        }
    }
}

/// Fatal failures while building the module graph.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("import cycle detected: {path}")]
    Cycle { path: String },
    #[error("failed to load module {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse module {path:?}: {error}")]
    Syntax { path: PathBuf, error: Error },
}

/// A broken internal invariant. Distinct from user diagnostics so a host can
/// report it without crashing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InternalFault {
    #[error("module graph is not a DAG: {module:?} was revisited while still in progress")]
    MalformedGraph { module: String },
    #[error("import {path:?} was never linked")]
    UnlinkedImport { path: String },
    #[error("no scope was recorded for function literal #{id}")]
    MissingFunctionScope { id: u32 },
    #[error("variable {name:?} has no cell")]
    MissingVariable { name: String },
    #[error("only variables can be assigned to")]
    InvalidAssignee,
    #[error("operator {operator:?} has no instruction")]
    UnknownOperator { operator: String },
    #[error("module {path:?} has not been checked")]
    UncheckedModule { path: String },
}

/// Faults raised while executing bytecode.
///
/// The checker is expected to prevent every one of these except host errors,
/// division by zero and call depth exhaustion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeFault {
    #[error("cell #{id} ({name}) is not reachable from the current environment")]
    MissingCell { id: u32, name: String },
    #[error("cell #{id} ({name}) was read before it was assigned")]
    UninitialisedCell { id: u32, name: String },
    #[error("operand stack underflow")]
    StackUnderflow,
    #[error("expected {expected} operand, got {received}")]
    WrongOperand {
        expected: &'static str,
        received: String,
    },
    #[error("cannot call a value of kind {received}")]
    NotCallable { received: String },
    #[error("`self` used outside of a function")]
    NoSelf,
    #[error("division by zero")]
    DivisionByZero,
    #[error("call depth exceeded {limit}")]
    CallDepthExceeded { limit: usize },
    #[error("builtin {name} failed: {message}")]
    Host { name: String, message: String },
    #[error("module {module:?} does not export {name:?}")]
    MissingExport { module: String, name: String },
}

/// Everything a full pipeline run can fail with.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("syntax error: {0}")]
    Syntax(#[from] Error),
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error("type checking failed with {} diagnostic(s)", .0.len())]
    Diagnostics(Vec<Diagnostic>),
    #[error("internal fault: {0}")]
    Internal(#[from] InternalFault),
    #[error("runtime fault: {0}")]
    Runtime(#[from] RuntimeFault),
}
