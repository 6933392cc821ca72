//! Recursive descent parser for Nexus.
//!
//! Consumes a [`TokenList`] and produces a [`Module`] (the flat arena
//! AST), or fails with a [`ParseError`] at the first malformed
//! construct. There is no error recovery: a program either parses
//! completely or not at all, so execution never starts on a partial AST.

mod cursor;
mod error;
mod grammar;

pub use cursor::Cursor;
pub use error::ParseError;

use nexus_ir::{AstArena, Module, TokenList};

/// Parser state: cursor over the tokens plus the arena being built.
pub struct Parser<'a> {
    pub(crate) cursor: Cursor<'a>,
    pub(crate) arena: AstArena,
}

impl<'a> Parser<'a> {
    /// Create a new parser.
    pub fn new(tokens: &'a TokenList) -> Self {
        Parser {
            cursor: Cursor::new(tokens),
            arena: AstArena::new(),
        }
    }

    /// Parse a whole program: an ordered sequence of top-level
    /// statements terminated by end of input.
    pub fn parse_module(mut self) -> Result<Module, ParseError> {
        let mut body = Vec::new();
        while !self.cursor.is_at_end() {
            body.push(self.parse_declaration()?);
        }
        let body = self.arena.alloc_stmt_list(body);
        Ok(Module {
            body,
            arena: self.arena,
        })
    }
}

/// Parse tokens into a module.
pub fn parse(tokens: &TokenList) -> Result<Module, ParseError> {
    tracing::debug!(tokens = tokens.len(), "parsing module");
    Parser::new(tokens).parse_module()
}
