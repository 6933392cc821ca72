//! Interactive read-eval-print loop.
//!
//! Feeds one line at a time into a persistent [`Session`]: bindings,
//! functions, and classes declared on earlier lines stay visible.
//! Errors are reported and the loop continues; `exit`/`quit` or end of
//! input leaves.

use std::io::Write;

use nexus_diagnostic::emitter::TerminalEmitter;
use nexus_eval::Value;

use crate::Session;

/// Run the REPL against process stdio. Returns the process exit code.
pub fn run_repl() -> i32 {
    println!("Nexus interactive interpreter v{}", env!("CARGO_PKG_VERSION"));
    println!("Type 'exit' or 'quit' to leave.");

    let mut session = Session::new();
    let stdin = std::io::stdin();

    loop {
        print!("nexus> ");
        let _ = std::io::stdout().flush();

        let mut line = String::new();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break, // end of input
            Ok(_) => {}
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "exit" || line == "quit" {
            break;
        }

        eval_line(&mut session, line);
    }

    0
}

/// Evaluate one line, echoing a non-null expression result.
fn eval_line(session: &mut Session, line: &str) {
    match session.run_source(line) {
        Ok(Some(value)) if !matches!(value, Value::Null) => {
            println!("{}", value.stringify(session.interner()));
        }
        Ok(_) => {}
        Err(err) => {
            let mut emitter = TerminalEmitter::new(std::io::stderr())
                .with_source(line)
                .with_file_path("<repl>");
            emitter.emit(&err.to_diagnostic());
            emitter.flush();
        }
    }
}
