//! Terminal output utilities.

use std::io::Write;
use std::path::Path;

use console::{Style, Term};
use quill_render::{Diagnostic, Severity};

/// Terminal output formatter.
///
/// Status messages go to stderr; documents go to stdout or a file.
pub(crate) struct Output {
    term: Term,
    green: Style,
    yellow: Style,
    red: Style,
    dim: Style,
}

impl Output {
    /// Create a new output formatter.
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            green: Style::new().green(),
            yellow: Style::new().yellow(),
            red: Style::new().red(),
            dim: Style::new().dim(),
        }
    }

    /// Print an info message.
    pub(crate) fn info(&self, msg: &str) {
        let _ = self.term.write_line(&self.dim.apply_to(msg).to_string());
    }

    /// Print a success message (green).
    pub(crate) fn success(&self, msg: &str) {
        let _ = self.term.write_line(&self.green.apply_to(msg).to_string());
    }

    /// Print a warning message (yellow).
    pub(crate) fn warning(&self, msg: &str) {
        let _ = self.term.write_line(&self.yellow.apply_to(msg).to_string());
    }

    /// Print an error message (red).
    pub(crate) fn error(&self, msg: &str) {
        let _ = self.term.write_line(&self.red.apply_to(msg).to_string());
    }

    /// Print a diagnostic, colored by severity.
    pub(crate) fn diagnostic(&self, file: &Path, source: &str, diagnostic: &Diagnostic) {
        let line = format_diagnostic(file, source, diagnostic);
        if diagnostic.severity >= Severity::Error {
            self.error(&line);
        } else if diagnostic.severity >= Severity::Warning {
            self.warning(&line);
        } else {
            self.info(&line);
        }
    }

    /// Write a generated document to `path`, or to stdout if `None`.
    pub(crate) fn document(&self, path: Option<&Path>, text: &str) -> std::io::Result<()> {
        if let Some(path) = path {
            std::fs::write(path, text)?;
            self.success(&format!("Wrote {}", path.display()));
            return Ok(());
        }
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(text.as_bytes())?;
        if !text.ends_with('\n') {
            stdout.write_all(b"\n")?;
        }
        stdout.flush()
    }
}

/// Format a diagnostic as `file:line:column: severity[id]: message`.
pub(crate) fn format_diagnostic(file: &Path, source: &str, diagnostic: &Diagnostic) -> String {
    let location = match diagnostic.span {
        Some(span) => {
            let (line, column) = line_column(source, span.begin);
            format!("{}:{line}:{column}", file.display())
        }
        None => file.display().to_string(),
    };
    format!(
        "{location}: {}[{}]: {}",
        diagnostic.severity, diagnostic.id, diagnostic.message
    )
}

/// One-based line and column (in characters) of a byte offset.
fn line_column(source: &str, offset: usize) -> (usize, usize) {
    let mut end = offset.min(source.len());
    while !source.is_char_boundary(end) {
        end -= 1;
    }
    let before = &source[..end];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    let column = before[line_start..].chars().count() + 1;
    (line, column)
}
