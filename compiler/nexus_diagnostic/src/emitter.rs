//! Terminal diagnostic emitter.
//!
//! Renders diagnostics in the familiar `error[EXXXX]: message` layout with
//! a `file:line:col` locus and a caret-underlined source line when the
//! emitter has been given the source text.

use crate::span_utils::LineOffsetTable;
use crate::Diagnostic;
use std::io::Write;

/// Writes diagnostics to a terminal-style output stream.
pub struct TerminalEmitter<W: Write> {
    out: W,
    source: Option<String>,
    table: Option<LineOffsetTable>,
    path: Option<String>,
    emitted: usize,
}

impl<W: Write> TerminalEmitter<W> {
    pub fn new(out: W) -> Self {
        TerminalEmitter {
            out,
            source: None,
            table: None,
            path: None,
            emitted: 0,
        }
    }

    /// Provide the source text for snippet rendering.
    #[must_use]
    pub fn with_source(mut self, source: &str) -> Self {
        self.table = Some(LineOffsetTable::build(source));
        self.source = Some(source.to_owned());
        self
    }

    /// Provide the file path for the locus line.
    #[must_use]
    pub fn with_file_path(mut self, path: &str) -> Self {
        self.path = Some(path.to_owned());
        self
    }

    /// Number of diagnostics emitted so far.
    pub fn emitted(&self) -> usize {
        self.emitted
    }

    /// Render one diagnostic.
    pub fn emit(&mut self, diag: &Diagnostic) {
        self.emitted += 1;
        // Header: error[E2001]: undefined variable 'x'
        let _ = writeln!(self.out, "{}[{}]: {}", diag.severity, diag.code, diag.message);

        if let Some(label) = diag.labels.first() {
            if let (Some(source), Some(table)) = (&self.source, &self.table) {
                let (line, col) = table.offset_to_line_col(source, label.span.start);
                let path = self.path.as_deref().unwrap_or("<input>");
                let _ = writeln!(self.out, "  --> {path}:{line}:{col}");

                if let Some(text) = line_text(source, table, line) {
                    let gutter = line.to_string();
                    let pad = " ".repeat(gutter.len());
                    let _ = writeln!(self.out, " {pad} |");
                    let _ = writeln!(self.out, " {gutter} | {text}");
                    let caret_pad = " ".repeat((col - 1) as usize);
                    let width = caret_width(label.span.len());
                    let carets = "^".repeat(width);
                    let _ = writeln!(self.out, " {pad} | {caret_pad}{carets} {}", label.message);
                }
            } else {
                // No source attached: still report the byte span.
                let _ = writeln!(self.out, "  --> offset {}", label.span.start);
            }
        }

        for note in &diag.notes {
            let _ = writeln!(self.out, "  = note: {note}");
        }
        let _ = writeln!(self.out);
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) {
        let _ = self.out.flush();
    }

    /// Consume the emitter, returning the output stream.
    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Convenience constructor for diagnostics destined for stderr.
pub fn stderr_emitter(source: &str, path: &str) -> TerminalEmitter<std::io::Stderr> {
    TerminalEmitter::new(std::io::stderr())
        .with_source(source)
        .with_file_path(path)
}

fn line_text<'a>(source: &'a str, table: &LineOffsetTable, line: u32) -> Option<&'a str> {
    let start = table.line_start_offset(line)? as usize;
    let rest = &source[start..];
    Some(rest.split('\n').next().unwrap_or(rest).trim_end_matches('\r'))
}

fn caret_width(span_len: u32) -> usize {
    (span_len.max(1)) as usize
}
