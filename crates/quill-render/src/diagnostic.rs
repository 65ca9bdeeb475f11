//! Diagnostics and the loggers that receive them.
//!
//! Diagnostics are the user-facing channel: they describe problems in the
//! document being rendered (unknown directives, misplaced arguments, missing
//! files) and carry a stable identifier and a source span. Internal tracing of
//! the renderer goes through `tracing` instead.

use std::cell::RefCell;

use quill_syntax::SourceSpan;

/// Importance of a diagnostic.
///
/// Ordered from least to most severe; [`Severity::None`] is only used as a
/// minimum to disable logging entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Severity {
    Debug,
    /// A problem that is likely intentional, such as an ignored argument.
    SoftWarning,
    #[default]
    Warning,
    Error,
    None,
}

impl Severity {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::SoftWarning => "soft_warning",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::None => "none",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A message about the document being processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Location in the source, if the problem has one.
    pub span: Option<SourceSpan>,
    /// Stable identifier such as `directive_lookup.unresolved`.
    pub id: &'static str,
    pub message: String,
}

/// Receives diagnostics.
pub trait Logger {
    /// Diagnostics below this severity are not built or logged.
    fn min_severity(&self) -> Severity;

    fn can_log(&self, severity: Severity) -> bool {
        severity != Severity::None && severity >= self.min_severity()
    }

    fn log(&self, diagnostic: Diagnostic);
}

/// Discards all diagnostics.
#[derive(Debug, Clone, Copy, Default)]
pub struct IgnorantLogger;

impl Logger for IgnorantLogger {
    fn min_severity(&self) -> Severity {
        Severity::None
    }

    fn log(&self, _diagnostic: Diagnostic) {}
}

/// Forwards diagnostics to `tracing` events.
#[derive(Debug, Clone, Copy)]
pub struct TracingLogger {
    min_severity: Severity,
}

impl TracingLogger {
    #[must_use]
    pub fn new(min_severity: Severity) -> Self {
        Self { min_severity }
    }
}

impl Logger for TracingLogger {
    fn min_severity(&self) -> Severity {
        self.min_severity
    }

    fn log(&self, diagnostic: Diagnostic) {
        let begin = diagnostic.span.map(|s| s.begin);
        match diagnostic.severity {
            Severity::Debug => {
                tracing::debug!(id = diagnostic.id, begin = ?begin, "{}", diagnostic.message);
            }
            Severity::SoftWarning => {
                tracing::info!(id = diagnostic.id, begin = ?begin, "{}", diagnostic.message);
            }
            Severity::Warning => {
                tracing::warn!(id = diagnostic.id, begin = ?begin, "{}", diagnostic.message);
            }
            Severity::Error => {
                tracing::error!(id = diagnostic.id, begin = ?begin, "{}", diagnostic.message);
            }
            Severity::None => {}
        }
    }
}

/// Stores diagnostics for later inspection.
#[derive(Debug, Default)]
pub struct CollectingLogger {
    min_severity: Severity,
    diagnostics: RefCell<Vec<Diagnostic>>,
}

impl CollectingLogger {
    #[must_use]
    pub fn new(min_severity: Severity) -> Self {
        Self {
            min_severity,
            diagnostics: RefCell::new(Vec::new()),
        }
    }

    /// Removes and returns all collected diagnostics.
    #[must_use]
    pub fn take(&self) -> Vec<Diagnostic> {
        self.diagnostics.take()
    }

    /// Identifiers of the collected diagnostics, in order.
    #[must_use]
    pub fn ids(&self) -> Vec<&'static str> {
        self.diagnostics.borrow().iter().map(|d| d.id).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.diagnostics.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.diagnostics.borrow().is_empty()
    }
}

impl Logger for CollectingLogger {
    fn min_severity(&self) -> Severity {
        self.min_severity
    }

    fn log(&self, diagnostic: Diagnostic) {
        self.diagnostics.borrow_mut().push(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_order() {
        assert!(Severity::Debug < Severity::SoftWarning);
        assert!(Severity::SoftWarning < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
        assert!(Severity::Error < Severity::None);
    }

    #[test]
    fn test_can_log() {
        let logger = CollectingLogger::new(Severity::Warning);
        assert!(!logger.can_log(Severity::SoftWarning));
        assert!(logger.can_log(Severity::Warning));
        assert!(logger.can_log(Severity::Error));
        assert!(!logger.can_log(Severity::None));
    }

    #[test]
    fn test_ignorant_logger_logs_nothing() {
        let logger = IgnorantLogger;
        assert!(!logger.can_log(Severity::Error));
    }

    #[test]
    fn test_collecting_logger_take() {
        let logger = CollectingLogger::new(Severity::Debug);
        logger.log(Diagnostic {
            severity: Severity::Error,
            span: None,
            id: "test.id",
            message: "message".to_owned(),
        });
        assert_eq!(logger.ids(), vec!["test.id"]);
        assert_eq!(logger.take().len(), 1);
        assert!(logger.is_empty());
    }
}
