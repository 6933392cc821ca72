//! Core data types for the Nexus interpreter.
//!
//! This crate defines the representation shared by every phase of the
//! pipeline: source [`Span`]s, interned [`Name`]s, lexer [`Token`]s, and
//! the flat arena AST ([`AstArena`], [`Module`]).
//!
//! With the `cache` feature enabled, [`Module`] and everything it contains
//! derive serde traits so a parsed program can be persisted to disk and
//! reloaded without re-parsing.

mod ast;
mod interner;
mod name;
mod span;
mod token;

pub use ast::{
    AstArena, BinaryOp, Expr, ExprId, ExprKind, ExprRange, FuncId, FuncRange, Function, LogicalOp,
    Module, Stmt, StmtId, StmtKind, StmtRange, UnaryOp,
};
pub use interner::StringInterner;
pub use name::Name;
pub use span::Span;
pub use token::{Token, TokenKind, TokenList};
