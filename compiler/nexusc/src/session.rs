//! A compile-and-run session: shared interner plus a persistent
//! interpreter.
//!
//! A session is created once per program run or once per REPL. The root
//! environment, and everything closures captured into it, survives
//! across `run_source` calls, which is exactly what the interactive
//! front end needs.

use std::io::{BufRead, Write};
use std::rc::Rc;

use nexus_diagnostic::Diagnostic;
use nexus_eval::{Interpreter, RuntimeError, Value};
use nexus_ir::{Module, StringInterner};
use nexus_lexer::LexError;
use nexus_parse::ParseError;

/// A frontend (pre-execution) failure: lexing or parsing.
#[derive(Debug, thiserror::Error)]
pub enum FrontendError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl FrontendError {
    /// Convert to a diagnostic for terminal reporting.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            FrontendError::Lex(e) => e.to_diagnostic(),
            FrontendError::Parse(e) => e.to_diagnostic(),
        }
    }
}

/// Any failure `run_source` can produce.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Frontend(#[from] FrontendError),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

impl SessionError {
    /// Convert to a diagnostic for terminal reporting.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            SessionError::Frontend(e) => e.to_diagnostic(),
            SessionError::Runtime(e) => e.to_diagnostic(),
        }
    }
}

/// Shared interner plus a persistent interpreter.
pub struct Session {
    interner: Rc<StringInterner>,
    interpreter: Interpreter,
}

impl Session {
    /// Create a session attached to the process stdio.
    pub fn new() -> Self {
        let interner = Rc::new(StringInterner::new());
        let interpreter = Interpreter::new(Rc::clone(&interner));
        Session {
            interner,
            interpreter,
        }
    }

    /// Create a session with explicit I/O handles (tests, embedders).
    pub fn with_io(stdin: Box<dyn BufRead>, stdout: Box<dyn Write>) -> Self {
        let interner = Rc::new(StringInterner::new());
        let interpreter = Interpreter::with_io(Rc::clone(&interner), stdin, stdout);
        Session {
            interner,
            interpreter,
        }
    }

    /// The session's interner.
    pub fn interner(&self) -> &StringInterner {
        &self.interner
    }

    /// Lex and parse source into a module, without executing it.
    pub fn compile(&self, source: &str) -> Result<Module, FrontendError> {
        let tokens = nexus_lexer::lex(source, &self.interner)?;
        Ok(nexus_parse::parse(&tokens)?)
    }

    /// Execute an already-parsed module in the persistent environment.
    pub fn run(&mut self, module: &Rc<Module>) -> Result<Option<Value>, RuntimeError> {
        self.interpreter.run_module(module)
    }

    /// Compile and execute source. Returns the final top-level
    /// expression-statement value for the REPL to echo.
    pub fn run_source(&mut self, source: &str) -> Result<Option<Value>, SessionError> {
        let module = Rc::new(self.compile(source)?);
        Ok(self.run(&module)?)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
