//! Token cursor for navigating the token stream.
//!
//! Provides low-level token access, lookahead, and consumption methods.

use crate::ParseError;
use nexus_diagnostic::ErrorCode;
use nexus_ir::{Name, Span, Token, TokenKind, TokenList};

/// Cursor over a lexed token stream.
pub struct Cursor<'a> {
    tokens: &'a TokenList,
    pos: usize,
}

impl<'a> Cursor<'a> {
    /// Create a new cursor at the start of the token stream.
    pub fn new(tokens: &'a TokenList) -> Self {
        Cursor { tokens, pos: 0 }
    }

    // -------------------------------------------------------------------
    // Token access
    // -------------------------------------------------------------------

    /// The current token. The stream always ends with `Eof`, so this is
    /// total.
    pub fn current(&self) -> &Token {
        self.tokens
            .get(self.pos)
            .unwrap_or(&self.tokens[self.tokens.len() - 1])
    }

    /// The current token's kind.
    #[inline]
    pub fn current_kind(&self) -> TokenKind {
        self.current().kind
    }

    /// The current token's span.
    #[inline]
    pub fn current_span(&self) -> Span {
        self.current().span
    }

    /// The previous token's span (used to close node spans).
    pub fn previous_span(&self) -> Span {
        if self.pos > 0 {
            self.tokens[self.pos - 1].span
        } else {
            Span::DUMMY
        }
    }

    // -------------------------------------------------------------------
    // Lookahead
    // -------------------------------------------------------------------

    /// Check if at end of the token stream.
    pub fn is_at_end(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Eof)
    }

    /// Check if the current token matches the given kind, ignoring any
    /// literal payload.
    pub fn check(&self, kind: TokenKind) -> bool {
        std::mem::discriminant(&self.current_kind()) == std::mem::discriminant(&kind)
    }

    // -------------------------------------------------------------------
    // Consumption
    // -------------------------------------------------------------------

    /// Advance to the next token and return the consumed token.
    pub fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.pos += 1;
        }
        &self.tokens[self.pos - 1]
    }

    /// Consume the current token if it matches.
    pub fn match_kind(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Expect the current token to be of the given kind, advance and
    /// return it; expected-vs-found error otherwise.
    pub fn expect(&mut self, kind: TokenKind) -> Result<&Token, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(ParseError::new(
                ErrorCode::E1001,
                format!(
                    "expected {}, found {}",
                    kind.describe(),
                    self.current_kind().describe()
                ),
                self.current_span(),
            )
            .with_context(format!("expected {}", kind.describe())))
        }
    }

    /// Expect and consume an identifier, returning its interned name and
    /// span.
    pub fn expect_ident(&mut self, what: &str) -> Result<(Name, Span), ParseError> {
        if let TokenKind::Ident(name) = self.current_kind() {
            let span = self.current_span();
            self.advance();
            Ok((name, span))
        } else {
            Err(ParseError::new(
                ErrorCode::E1002,
                format!(
                    "expected {what}, found {}",
                    self.current_kind().describe()
                ),
                self.current_span(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nexus_ir::StringInterner;

    fn tokens_of(source: &str) -> (TokenList, StringInterner) {
        let interner = StringInterner::new();
        match nexus_lexer::lex(source, &interner) {
            Ok(tokens) => (tokens, interner),
            Err(e) => panic!("lex error: {e}"),
        }
    }

    #[test]
    fn test_cursor_navigation() {
        let (tokens, _interner) = tokens_of("var x = 42;");
        let mut cursor = Cursor::new(&tokens);

        assert!(cursor.check(TokenKind::Var));
        assert!(!cursor.is_at_end());

        cursor.advance();
        assert!(cursor.check(TokenKind::Ident(Name::EMPTY)));

        cursor.advance();
        assert!(cursor.check(TokenKind::Eq));

        cursor.advance();
        assert!(matches!(cursor.current_kind(), TokenKind::Number(_)));

        cursor.advance();
        cursor.advance();
        assert!(cursor.is_at_end());
        // Advancing at EOF stays put.
        cursor.advance();
        assert!(cursor.is_at_end());
    }

    #[test]
    fn test_expect_success_and_failure() {
        let (tokens, _interner) = tokens_of("var x");
        let mut cursor = Cursor::new(&tokens);

        assert!(cursor.expect(TokenKind::Var).is_ok());
        let err = match cursor.expect(TokenKind::If) {
            Err(e) => e,
            Ok(t) => panic!("expected error, got {t:?}"),
        };
        assert_eq!(err.code, ErrorCode::E1001);
        assert!(err.message.contains("expected 'if'"));
        assert!(err.message.contains("identifier"));
    }

    #[test]
    fn test_expect_ident() {
        let (tokens, interner) = tokens_of("count 5");
        let mut cursor = Cursor::new(&tokens);

        match cursor.expect_ident("variable name") {
            Ok((name, _span)) => assert_eq!(interner.lookup(name), "count"),
            Err(e) => panic!("unexpected error: {e}"),
        }
        let err = match cursor.expect_ident("variable name") {
            Err(e) => e,
            Ok(_) => panic!("expected error"),
        };
        assert_eq!(err.code, ErrorCode::E1002);
        assert!(err.message.contains("variable name"));
    }

    #[test]
    fn test_match_kind() {
        let (tokens, _interner) = tokens_of("1 + 2");
        let mut cursor = Cursor::new(&tokens);
        cursor.advance();
        assert!(cursor.match_kind(TokenKind::Plus));
        assert!(!cursor.match_kind(TokenKind::Minus));
        assert!(matches!(cursor.current_kind(), TokenKind::Number(_)));
    }
}
