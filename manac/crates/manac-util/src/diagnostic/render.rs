//! Terminal rendering for diagnostics.
//!
//! The layout per diagnostic is:
//!
//! ```text
//! error[E0003]: cannot assign to immutable variable 'x'
//!   --> main.mana:3:5
//!    2 |     const x: i32 = 3
//!    3 |     x = 4
//!      |     ^
//!    4 |     return 0
//! ```
//!
//! One line of context is shown above and below the primary line when the
//! file has one. The caret line underlines `span.len` columns starting at
//! the diagnostic's column. Secondary spans render as additional indented
//! arrow blocks with their label; `help` and `suggestion` render as
//! trailing lines.

use super::{Diagnostic, Handler};
use std::fmt::Write;

/// Renders a single diagnostic against its source text.
pub fn render(diag: &Diagnostic, filename: &str, source: &str) -> String {
    let lines: Vec<&str> = source.lines().collect();
    let mut out = String::new();

    match &diag.code {
        Some(code) => {
            let _ = writeln!(out, "{}[{}]: {}", diag.level, code, diag.message);
        }
        None => {
            let _ = writeln!(out, "{}: {}", diag.level, diag.message);
        }
    }
    let _ = writeln!(
        out,
        "  --> {}:{}:{}",
        filename, diag.span.line, diag.span.column
    );

    render_snippet(&mut out, &lines, diag.span.line, diag.span.column, diag.span.len, None);

    for related in &diag.related {
        let _ = writeln!(
            out,
            "  --> {}:{}:{}",
            filename, related.span.line, related.span.column
        );
        render_snippet(
            &mut out,
            &lines,
            related.span.line,
            related.span.column,
            related.span.len,
            Some(&related.label),
        );
    }

    if let Some(help) = &diag.help {
        let _ = writeln!(out, "  help: {}", help);
    }
    if let Some(suggestion) = &diag.suggestion {
        let _ = writeln!(out, "  suggestion: {}", suggestion);
    }

    out
}

/// Renders every diagnostic in the handler, in insertion order.
pub fn render_all(handler: &Handler, filename: &str, source: &str) -> String {
    let mut out = String::new();
    for diag in handler.diagnostics() {
        out.push_str(&render(&diag, filename, source));
    }
    out
}

fn render_snippet(
    out: &mut String,
    lines: &[&str],
    line: u32,
    column: u32,
    len: u32,
    label: Option<&str>,
) {
    if line == 0 || line as usize > lines.len() {
        return;
    }
    let idx = (line - 1) as usize;
    // Gutter wide enough for the largest line number we will print.
    let max_shown = (line + 1).min(lines.len() as u32);
    let width = max_shown.to_string().len().max(2);

    if idx > 0 {
        let _ = writeln!(out, " {:>width$} | {}", line - 1, lines[idx - 1], width = width);
    }
    let _ = writeln!(out, " {:>width$} | {}", line, lines[idx], width = width);

    let caret_count = len.max(1) as usize;
    let pad = column.saturating_sub(1) as usize;
    let carets = "^".repeat(caret_count);
    match label {
        Some(label) => {
            let _ = writeln!(
                out,
                " {:>width$} | {}{} {}",
                "",
                " ".repeat(pad),
                carets,
                label,
                width = width
            );
        }
        None => {
            let _ = writeln!(
                out,
                " {:>width$} | {}{}",
                "",
                " ".repeat(pad),
                carets,
                width = width
            );
        }
    }

    if idx + 1 < lines.len() {
        let _ = writeln!(out, " {:>width$} | {}", line + 1, lines[idx + 1], width = width);
    }
}
