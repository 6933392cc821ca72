//! Nexus interpreter driver library.
//!
//! Ties the pipeline crates together: [`Session`] runs source through
//! lex → parse → evaluate against a persistent interpreter, [`cache`]
//! persists parsed programs to `.nvc` files, [`repl`] is the interactive
//! front end, and [`commands`] implements the CLI subcommands.

pub mod cache;
pub mod commands;
pub mod repl;
mod session;

pub use session::{FrontendError, Session, SessionError};
