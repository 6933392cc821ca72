//! Compiled-program cache: parse once, run many times.
//!
//! A `.nvc` file is a short magic header followed by the bincode
//! encoding of [`CompiledProgram`]. The interner snapshot travels with
//! the module so reloading reconstructs identical `Name` assignments;
//! the deserialized AST is behaviorally identical to the one the parser
//! produced.

use std::path::Path;

use serde::{Deserialize, Serialize};

use nexus_ir::Module;

/// File magic: "NVC" plus a format version byte.
const MAGIC: &[u8; 4] = b"NVC1";

/// A parsed program plus everything needed to run it elsewhere.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CompiledProgram {
    /// Original source text, kept so runtime diagnostics still map spans
    /// to lines when running from the cache.
    pub source: String,
    /// Interner snapshot in index order.
    pub names: Vec<String>,
    /// The parsed module.
    pub module: Module,
}

/// Cache read/write failure.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("not a Nexus compiled file (bad or missing header)")]
    BadMagic,
    #[error("cache decode failed: {0}")]
    Codec(#[from] bincode::Error),
}

/// Serialize a compiled program to `path`.
pub fn save(path: &Path, program: &CompiledProgram) -> Result<(), CacheError> {
    let mut bytes = Vec::with_capacity(4096);
    bytes.extend_from_slice(MAGIC);
    bincode::serialize_into(&mut bytes, program)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

/// Load a compiled program from `path`.
pub fn load(path: &Path) -> Result<CompiledProgram, CacheError> {
    let bytes = std::fs::read(path)?;
    let Some(payload) = bytes.strip_prefix(MAGIC) else {
        return Err(CacheError::BadMagic);
    };
    Ok(bincode::deserialize(payload)?)
}
