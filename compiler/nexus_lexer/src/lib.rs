//! Lexer for Nexus using logos with string interning.
//!
//! Produces a [`TokenList`] terminated by `Eof`, or fails fast with a
//! [`LexError`] on the first unrecognized character or unterminated
//! string literal. Whitespace, including newlines (Nexus statements are
//! semicolon-terminated), and `//` line comments are skipped.

use logos::Logos;
use nexus_diagnostic::{Diagnostic, ErrorCode};
use nexus_ir::{Span, StringInterner, Token, TokenKind, TokenList};

/// Raw token from logos (before interning).
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
#[logos(skip r"//[^\n]*")]
enum RawToken {
    // === Keywords ===
    #[token("var")]
    Var,
    #[token("const")]
    Const,
    #[token("func")]
    Func,
    #[token("if")]
    If,
    #[token("elif")]
    Elif,
    #[token("else")]
    Else,
    #[token("while")]
    While,
    #[token("for")]
    For,
    #[token("break")]
    Break,
    #[token("continue")]
    Continue,
    #[token("return")]
    Return,
    #[token("class")]
    Class,
    #[token("try")]
    Try,
    #[token("catch")]
    Catch,
    #[token("throw")]
    Throw,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("null")]
    Null,

    // === Punctuation ===
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
    #[token(".")]
    Dot,

    // === Operators ===
    #[token("==")]
    EqEq,
    #[token("=")]
    Eq,
    #[token("!=")]
    NotEq,
    #[token("<=")]
    LtEq,
    #[token("<")]
    Lt,
    #[token(">=")]
    GtEq,
    #[token(">")]
    Gt,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("!")]
    Bang,
    #[token("&&")]
    AmpAmp,
    #[token("||")]
    PipePipe,

    // === Literals ===

    // Number: integer or decimal
    #[regex(r"[0-9]+(\.[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    Number(f64),

    // String literal: double-quoted, no escape processing
    #[regex(r#""[^"\n]*""#)]
    Str,

    // Identifier
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,
}

/// Kind of lexical failure.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum LexErrorKind {
    /// A character no token can start with.
    UnexpectedChar(char),
    /// A `"` without a closing `"` on the same line.
    UnterminatedString,
}

/// Lexical error with its source location.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct LexError {
    pub kind: LexErrorKind,
    pub span: Span,
}

impl LexError {
    /// Human-readable message.
    pub fn message(&self) -> String {
        match self.kind {
            LexErrorKind::UnexpectedChar(c) => format!("unrecognized character '{c}'"),
            LexErrorKind::UnterminatedString => "unterminated string literal".to_owned(),
        }
    }

    /// Convert to a full diagnostic for terminal reporting.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let code = match self.kind {
            LexErrorKind::UnexpectedChar(_) => ErrorCode::E0001,
            LexErrorKind::UnterminatedString => ErrorCode::E0002,
        };
        Diagnostic::error(code)
            .with_message(self.message())
            .with_label(self.span, "here")
    }
}

impl std::fmt::Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at {}", self.message(), self.span)
    }
}

impl std::error::Error for LexError {}

/// Lex source text into a token list terminated by `Eof`.
///
/// Fails on the first unrecognized character or unterminated string;
/// nothing downstream ever sees a partial token stream.
pub fn lex(source: &str, interner: &StringInterner) -> Result<TokenList, LexError> {
    let mut result = TokenList::new();
    let mut logos = RawToken::lexer(source);

    while let Some(token_result) = logos.next() {
        let span = Span::from_range(logos.span());
        let slice = logos.slice();

        match token_result {
            Ok(raw) => {
                let kind = convert_token(raw, slice, interner);
                result.push(Token::new(kind, span));
            }
            Err(()) => {
                return Err(error_at(source, span));
            }
        }
    }

    let eof_span = Span::point(source.len() as u32);
    result.push(Token::new(TokenKind::Eof, eof_span));

    Ok(result)
}

/// Classify the failure at an error span.
fn error_at(source: &str, span: Span) -> LexError {
    let rest = &source[span.start as usize..];
    let first = rest.chars().next().unwrap_or('\0');
    let kind = if first == '"' {
        LexErrorKind::UnterminatedString
    } else {
        LexErrorKind::UnexpectedChar(first)
    };
    LexError { kind, span }
}

/// Convert a raw token to a `TokenKind`, interning string payloads.
fn convert_token(raw: RawToken, slice: &str, interner: &StringInterner) -> TokenKind {
    match raw {
        // Literals
        RawToken::Number(n) => TokenKind::number(n),
        RawToken::Str => {
            // Strip the quotes; the body is taken verbatim (no escapes).
            let body = &slice[1..slice.len() - 1];
            TokenKind::Str(interner.intern(body))
        }
        RawToken::Ident => TokenKind::Ident(interner.intern(slice)),

        // Keywords
        RawToken::Var => TokenKind::Var,
        RawToken::Const => TokenKind::Const,
        RawToken::Func => TokenKind::Func,
        RawToken::If => TokenKind::If,
        RawToken::Elif => TokenKind::Elif,
        RawToken::Else => TokenKind::Else,
        RawToken::While => TokenKind::While,
        RawToken::For => TokenKind::For,
        RawToken::Break => TokenKind::Break,
        RawToken::Continue => TokenKind::Continue,
        RawToken::Return => TokenKind::Return,
        RawToken::Class => TokenKind::Class,
        RawToken::Try => TokenKind::Try,
        RawToken::Catch => TokenKind::Catch,
        RawToken::Throw => TokenKind::Throw,
        RawToken::True => TokenKind::True,
        RawToken::False => TokenKind::False,
        RawToken::Null => TokenKind::Null,

        // Punctuation
        RawToken::LParen => TokenKind::LParen,
        RawToken::RParen => TokenKind::RParen,
        RawToken::LBrace => TokenKind::LBrace,
        RawToken::RBrace => TokenKind::RBrace,
        RawToken::LBracket => TokenKind::LBracket,
        RawToken::RBracket => TokenKind::RBracket,
        RawToken::Comma => TokenKind::Comma,
        RawToken::Semicolon => TokenKind::Semicolon,
        RawToken::Dot => TokenKind::Dot,

        // Operators
        RawToken::Eq => TokenKind::Eq,
        RawToken::EqEq => TokenKind::EqEq,
        RawToken::NotEq => TokenKind::NotEq,
        RawToken::Lt => TokenKind::Lt,
        RawToken::LtEq => TokenKind::LtEq,
        RawToken::Gt => TokenKind::Gt,
        RawToken::GtEq => TokenKind::GtEq,
        RawToken::Plus => TokenKind::Plus,
        RawToken::Minus => TokenKind::Minus,
        RawToken::Star => TokenKind::Star,
        RawToken::Slash => TokenKind::Slash,
        RawToken::Bang => TokenKind::Bang,
        RawToken::AmpAmp => TokenKind::AmpAmp,
        RawToken::PipePipe => TokenKind::PipePipe,
    }
}
