//! Runtime errors and the non-local exit type.
//!
//! `break`, `continue`, `return`, and raised errors all unwind through
//! statement execution as one tagged [`Exit`] value, propagated
//! explicitly by every statement call site. Each construct catches only
//! the exit kinds it handles: loops take `Break`/`Continue`, function
//! call boundaries take `Return`, `try` takes `Raise`; everything else
//! flows upward.

use std::fmt;

use nexus_diagnostic::{Diagnostic, ErrorCode};
use nexus_ir::Span;

use crate::Value;

/// Structured category of a runtime error.
///
/// Factory functions on [`RuntimeError`] populate both the kind and the
/// message; `Display` on the kind produces the message text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RuntimeErrorKind {
    UndefinedVariable { name: String },
    ConstRedeclaration { name: String },
    ConstAssignment { name: String },
    Type { detail: String },
    Arity { expected: usize, got: usize },
    NotCallable { kind: &'static str },
    UndefinedMethod { method: String, class: String },
    Conversion { detail: String },
    StackOverflow { limit: usize },
    Index { detail: String },
    /// A value raised by `throw` (or re-raised by `catch`-less unwinding).
    Thrown,
    BreakOutsideLoop,
    ContinueOutsideLoop,
    ReturnOutsideFunction,
}

impl RuntimeErrorKind {
    /// The diagnostic code for this error class.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            RuntimeErrorKind::UndefinedVariable { .. } => ErrorCode::E2001,
            RuntimeErrorKind::ConstRedeclaration { .. } => ErrorCode::E2002,
            RuntimeErrorKind::ConstAssignment { .. } => ErrorCode::E2003,
            RuntimeErrorKind::Type { .. } => ErrorCode::E2004,
            RuntimeErrorKind::Arity { .. } => ErrorCode::E2005,
            RuntimeErrorKind::NotCallable { .. } => ErrorCode::E2006,
            RuntimeErrorKind::UndefinedMethod { .. } => ErrorCode::E2007,
            RuntimeErrorKind::Conversion { .. } => ErrorCode::E2008,
            RuntimeErrorKind::StackOverflow { .. } => ErrorCode::E2009,
            RuntimeErrorKind::Index { .. } => ErrorCode::E2010,
            RuntimeErrorKind::Thrown => ErrorCode::E2011,
            RuntimeErrorKind::BreakOutsideLoop
            | RuntimeErrorKind::ContinueOutsideLoop
            | RuntimeErrorKind::ReturnOutsideFunction => ErrorCode::E2012,
        }
    }
}

impl fmt::Display for RuntimeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UndefinedVariable { name } => write!(f, "undefined variable '{name}'"),
            Self::ConstRedeclaration { name } => {
                write!(f, "cannot redeclare constant '{name}' in the same scope")
            }
            Self::ConstAssignment { name } => {
                write!(f, "cannot assign to constant '{name}'")
            }
            Self::Type { detail } => write!(f, "{detail}"),
            Self::Arity { expected, got } => {
                let word = if *expected == 1 { "argument" } else { "arguments" };
                write!(f, "expected {expected} {word}, got {got}")
            }
            Self::NotCallable { kind } => write!(f, "{kind} is not callable"),
            Self::UndefinedMethod { method, class } => {
                write!(f, "no method '{method}' on class {class}")
            }
            Self::Conversion { detail } => write!(f, "{detail}"),
            Self::StackOverflow { limit } => {
                write!(f, "maximum recursion depth exceeded (limit: {limit})")
            }
            Self::Index { detail } => write!(f, "{detail}"),
            Self::Thrown => write!(f, "uncaught exception"),
            Self::BreakOutsideLoop => write!(f, "'break' outside of a loop"),
            Self::ContinueOutsideLoop => write!(f, "'continue' outside of a loop"),
            Self::ReturnOutsideFunction => write!(f, "'return' outside of a function"),
        }
    }
}

/// A runtime error, ready to surface to a `catch` clause or a diagnostic.
#[derive(Clone, Debug)]
pub struct RuntimeError {
    pub kind: RuntimeErrorKind,
    /// Human-readable message; equals `kind.to_string()` except for
    /// `Thrown`, where it is the thrown value's string conversion.
    pub message: String,
    /// Source location where the error was raised.
    pub span: Span,
    /// The language-level value a `catch` clause binds. `Some` for
    /// `throw`; engine-raised errors bind their message string instead.
    pub thrown: Option<Value>,
}

impl RuntimeError {
    fn from_kind(kind: RuntimeErrorKind, span: Span) -> Self {
        let message = kind.to_string();
        RuntimeError {
            kind,
            message,
            span,
            thrown: None,
        }
    }

    pub fn undefined_variable(name: &str, span: Span) -> Self {
        Self::from_kind(
            RuntimeErrorKind::UndefinedVariable {
                name: name.to_owned(),
            },
            span,
        )
    }

    pub fn const_redeclaration(name: &str, span: Span) -> Self {
        Self::from_kind(
            RuntimeErrorKind::ConstRedeclaration {
                name: name.to_owned(),
            },
            span,
        )
    }

    pub fn const_assignment(name: &str, span: Span) -> Self {
        Self::from_kind(
            RuntimeErrorKind::ConstAssignment {
                name: name.to_owned(),
            },
            span,
        )
    }

    pub fn type_error(detail: impl Into<String>, span: Span) -> Self {
        Self::from_kind(
            RuntimeErrorKind::Type {
                detail: detail.into(),
            },
            span,
        )
    }

    pub fn arity_mismatch(expected: usize, got: usize, span: Span) -> Self {
        Self::from_kind(RuntimeErrorKind::Arity { expected, got }, span)
    }

    pub fn not_callable(kind: &'static str, span: Span) -> Self {
        Self::from_kind(RuntimeErrorKind::NotCallable { kind }, span)
    }

    pub fn undefined_method(method: &str, class: &str, span: Span) -> Self {
        Self::from_kind(
            RuntimeErrorKind::UndefinedMethod {
                method: method.to_owned(),
                class: class.to_owned(),
            },
            span,
        )
    }

    pub fn conversion_error(detail: impl Into<String>, span: Span) -> Self {
        Self::from_kind(
            RuntimeErrorKind::Conversion {
                detail: detail.into(),
            },
            span,
        )
    }

    pub fn stack_overflow(limit: usize, span: Span) -> Self {
        Self::from_kind(RuntimeErrorKind::StackOverflow { limit }, span)
    }

    pub fn index_error(detail: impl Into<String>, span: Span) -> Self {
        Self::from_kind(
            RuntimeErrorKind::Index {
                detail: detail.into(),
            },
            span,
        )
    }

    /// A user-thrown value. The message is the value's string conversion
    /// so uncaught throws still report something readable.
    pub fn thrown(value: Value, message: String, span: Span) -> Self {
        RuntimeError {
            kind: RuntimeErrorKind::Thrown,
            message,
            span,
            thrown: Some(value),
        }
    }

    pub fn break_outside_loop(span: Span) -> Self {
        Self::from_kind(RuntimeErrorKind::BreakOutsideLoop, span)
    }

    pub fn continue_outside_loop(span: Span) -> Self {
        Self::from_kind(RuntimeErrorKind::ContinueOutsideLoop, span)
    }

    pub fn return_outside_function(span: Span) -> Self {
        Self::from_kind(RuntimeErrorKind::ReturnOutsideFunction, span)
    }

    /// The value a `catch` clause binds for this error.
    pub fn catch_value(&self) -> Value {
        match &self.thrown {
            Some(value) => value.clone(),
            None => Value::string(self.message.clone()),
        }
    }

    /// Convert to a diagnostic for terminal reporting.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let message = match self.kind {
            RuntimeErrorKind::Thrown => format!("uncaught exception: {}", self.message),
            _ => self.message.clone(),
        };
        Diagnostic::error(self.kind.error_code())
            .with_message(message)
            .with_label(self.span, "raised here")
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for RuntimeError {}

/// Non-local exit signal unwinding through statement execution.
#[derive(Clone, Debug)]
pub enum Exit {
    /// `break`, carrying its source location for out-of-loop reporting.
    Break(Span),
    /// `continue`, carrying its source location.
    Continue(Span),
    /// `return`, carrying the returned value.
    Return(Value),
    /// A raised runtime error or thrown value.
    Raise(RuntimeError),
}

impl From<RuntimeError> for Exit {
    fn from(err: RuntimeError) -> Self {
        Exit::Raise(err)
    }
}

/// Result of executing a statement.
pub type ExecResult = Result<(), Exit>;

/// Result of evaluating an expression.
///
/// Expressions can only raise: `return`/`break`/`continue` inside an
/// expression always sit inside a function body, whose call boundary
/// consumes them before the expression completes.
pub type EvalResult = Result<Value, RuntimeError>;
