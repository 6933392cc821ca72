//! CLI subcommand implementations.
//!
//! Each command returns the process exit code; `main` hands it to
//! `std::process::exit`. Diagnostics go to stderr through the terminal
//! emitter with the relevant source attached, so every failure shows
//! `file:line:col` and the offending source line.

use std::path::{Path, PathBuf};
use std::rc::Rc;

use nexus_diagnostic::emitter::stderr_emitter;
use nexus_ir::StringInterner;

use crate::cache::{self, CompiledProgram};
use crate::Session;

/// `nexus run <file.nv>`: compile and execute a source file.
pub fn run_file(path: &str) -> i32 {
    let Some(source) = read_source(path) else {
        return 1;
    };
    tracing::debug!(path, bytes = source.len(), "running source file");
    let mut session = Session::new();
    match session.run_source(&source) {
        Ok(_) => 0,
        Err(err) => {
            let mut emitter = stderr_emitter(&source, path);
            emitter.emit(&err.to_diagnostic());
            emitter.flush();
            1
        }
    }
}

/// `nexus compile <file.nv> [-o out.nvc]`: parse and persist the AST.
pub fn compile_file(path: &str, output: Option<&str>) -> i32 {
    let Some(source) = read_source(path) else {
        return 1;
    };

    let interner = StringInterner::new();
    let tokens = match nexus_lexer::lex(&source, &interner) {
        Ok(tokens) => tokens,
        Err(err) => {
            let mut emitter = stderr_emitter(&source, path);
            emitter.emit(&err.to_diagnostic());
            emitter.flush();
            return 1;
        }
    };
    let module = match nexus_parse::parse(&tokens) {
        Ok(module) => module,
        Err(err) => {
            let mut emitter = stderr_emitter(&source, path);
            emitter.emit(&err.to_diagnostic());
            emitter.flush();
            return 1;
        }
    };

    let out_path = output
        .map(PathBuf::from)
        .unwrap_or_else(|| Path::new(path).with_extension("nvc"));
    let stmt_count = module.arena.stmt_count();
    let expr_count = module.arena.expr_count();
    let program = CompiledProgram {
        source,
        names: interner.dump(),
        module,
    };
    if let Err(err) = cache::save(&out_path, &program) {
        eprintln!("error: failed to write '{}': {err}", out_path.display());
        return 1;
    }

    println!(
        "compiled {path} -> {} ({stmt_count} statements, {expr_count} expressions)",
        out_path.display()
    );
    0
}

/// `nexus exec <file.nvc>`: run a previously compiled program.
pub fn exec_file(path: &str) -> i32 {
    let program = match cache::load(Path::new(path)) {
        Ok(program) => program,
        Err(err) => {
            eprintln!("error: cannot load '{path}': {err}");
            return 1;
        }
    };

    tracing::debug!(path, "loaded compiled program");
    let interner = Rc::new(StringInterner::from_dump(program.names));
    let module = Rc::new(program.module);
    let mut interpreter = nexus_eval::Interpreter::new(interner);
    match interpreter.run_module(&module) {
        Ok(_) => 0,
        Err(err) => {
            // Spans still resolve: the cache carries the source text.
            let mut emitter = stderr_emitter(&program.source, path);
            emitter.emit(&err.to_diagnostic());
            emitter.flush();
            1
        }
    }
}

fn read_source(path: &str) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(source) => Some(source),
        Err(err) => {
            eprintln!("error: cannot read '{path}': {err}");
            None
        }
    }
}
