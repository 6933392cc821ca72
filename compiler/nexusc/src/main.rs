//! Nexus interpreter CLI.

use nexusc::commands::{compile_file, exec_file, run_file};
use nexusc::repl::run_repl;

fn main() {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();

    // No arguments: interactive mode.
    if args.len() < 2 {
        std::process::exit(run_repl());
    }

    let command = args[1].as_str();
    let code = match command {
        "run" => {
            let Some(path) = args.get(2) else {
                eprintln!("Usage: nexus run <file.nv>");
                std::process::exit(1);
            };
            run_file(path)
        }
        "compile" => {
            let Some(path) = args.get(2) else {
                eprintln!("Usage: nexus compile <file.nv> [-o <file.nvc>]");
                std::process::exit(1);
            };
            let mut output = None;
            let mut i = 3;
            while i < args.len() {
                if args[i] == "-o" && i + 1 < args.len() {
                    output = Some(args[i + 1].as_str());
                    i += 2;
                } else {
                    eprintln!("error: unknown option '{}'", args[i]);
                    std::process::exit(1);
                }
            }
            compile_file(path, output)
        }
        "exec" => {
            let Some(path) = args.get(2) else {
                eprintln!("Usage: nexus exec <file.nvc>");
                std::process::exit(1);
            };
            exec_file(path)
        }
        "repl" => run_repl(),
        "help" | "--help" | "-h" => {
            print_usage();
            0
        }
        // Bare file arguments dispatch on extension.
        path if path.ends_with(".nv") => run_file(path),
        path if path.ends_with(".nvc") => exec_file(path),
        other => {
            eprintln!("error: unknown command '{other}'");
            print_usage();
            1
        }
    };
    std::process::exit(code);
}

fn print_usage() {
    println!("Nexus interpreter v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Usage:");
    println!("  nexus                          Start the interactive REPL");
    println!("  nexus run <file.nv>            Compile and run a source file");
    println!("  nexus compile <file.nv> [-o <file.nvc>]");
    println!("                                 Parse and save the AST for later runs");
    println!("  nexus exec <file.nvc>          Run a compiled program");
    println!("  nexus repl                     Start the interactive REPL");
    println!("  nexus <file.nv|file.nvc>       Shorthand for run / exec");
}

/// Tracing goes to stderr; `RUST_LOG` selects the filter (default: warn).
fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
