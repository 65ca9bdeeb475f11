//! `quill render` command implementation.

use std::path::{Path, PathBuf};

use clap::Args;
use quill_config::{CliSettings, Config};
use quill_render::{
    CollectingLogger, DocumentGenerator, GenerationConfig, HtmlMode, MarkupHighlighter,
    PlaintextStatus, Severity, escape_html,
};
use quill_syntax::HighlightOptions;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Path to the Quill document.
    file: PathBuf,

    /// Generate plaintext instead of HTML.
    #[arg(long)]
    plaintext: bool,

    /// HTML generation mode (overrides config).
    #[arg(long)]
    mode: Option<HtmlMode>,

    /// Wrap the HTML in a complete document (overrides config).
    #[arg(long)]
    standalone: bool,

    /// Minimum severity of reported diagnostics (overrides config).
    #[arg(long, value_parser = parse_severity)]
    min_severity: Option<Severity>,

    /// Write the result to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover quill.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl RenderArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            mode: self.mode,
            min_severity: self.min_severity,
            standalone: self.standalone.then_some(true),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        let source = std::fs::read_to_string(&self.file)?;
        tracing::info!(file = %self.file.display(), mode = %config.render_resolved.mode, "Rendering");

        let logger = CollectingLogger::new(config.diagnostics.min_severity);
        let highlighter = MarkupHighlighter::new(HighlightOptions {
            coalescing: config.highlight.coalesce,
        });
        let mut generator = DocumentGenerator::new(generation_config(&config, &self.file))
            .with_logger(&logger)
            .with_highlighter(&highlighter);

        let text = if self.plaintext {
            let document = generator.generate_plaintext(&source);
            if document.status == PlaintextStatus::SomeIgnored {
                output.warning("Some content has no plaintext form and was left out");
            }
            document.text
        } else {
            let html = generator.generate_html(&source);
            if config.output.standalone {
                standalone_document(&config.output.title, &html)
            } else {
                html
            }
        };

        let diagnostics = logger.take();
        for diagnostic in &diagnostics {
            output.diagnostic(&self.file, &source, diagnostic);
        }

        output.document(self.output.as_deref(), &text)?;

        let errors = diagnostics
            .iter()
            .filter(|d| d.severity >= Severity::Error)
            .count();
        if errors > 0 {
            return Err(CliError::Diagnostics {
                file: self.file.display().to_string(),
                count: errors,
            });
        }
        Ok(())
    }
}

/// Build the generator configuration for one document.
///
/// Included files resolve against the configured include directory, or the
/// directory of the document when none is set.
fn generation_config(config: &Config, file: &Path) -> GenerationConfig {
    let base_dir = config.render_resolved.include_dir.clone().unwrap_or_else(|| {
        file.parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
    });
    GenerationConfig::new()
        .with_base_dir(base_dir)
        .with_source_path(file)
        .with_mode(config.render_resolved.mode)
        .with_error_markup(config.render_resolved.error_markup)
}

/// Wrap an HTML fragment in a minimal document.
fn standalone_document(title: &str, body: &str) -> String {
    let title = escape_html(title);
    let body = body.trim_end_matches('\n');
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n</head>\n<body>\n{body}\n</body>\n</html>\n"
    )
}

fn parse_severity(s: &str) -> Result<Severity, String> {
    match s {
        "debug" => Ok(Severity::Debug),
        "soft_warning" | "soft-warning" => Ok(Severity::SoftWarning),
        "warning" => Ok(Severity::Warning),
        "error" => Ok(Severity::Error),
        "none" => Ok(Severity::None),
        _ => Err(format!(
            "unknown severity '{s}', expected one of: debug, soft_warning, warning, error, none"
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_standalone_document() {
        assert_eq!(
            standalone_document("A & B", "<p>x</p>\n"),
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>A &amp; B</title>\n</head>\n<body>\n<p>x</p>\n</body>\n</html>\n"
        );
    }

    #[test]
    fn test_generation_config_uses_document_directory() {
        let config = Config::default();
        let generation = generation_config(&config, Path::new("/notes/today.ql"));
        assert_eq!(generation.base_dir, PathBuf::from("/notes"));
        assert_eq!(generation.source_path, Some(PathBuf::from("/notes/today.ql")));
        assert_eq!(generation.mode, HtmlMode::Paragraphs);
        assert!(generation.error_markup);
    }

    #[test]
    fn test_generation_config_bare_file_name() {
        let config = Config::default();
        let generation = generation_config(&config, Path::new("today.ql"));
        assert_eq!(generation.base_dir, PathBuf::from("."));
    }

    #[test]
    fn test_generation_config_include_dir_and_mode() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("quill.toml");
        std::fs::write(
            &path,
            "[render]\nmode = \"trimmed\"\nerror_markup = false\ninclude_dir = \"shared\"\n",
        )
        .unwrap();
        let config = Config::load(Some(path.as_path()), None).unwrap();

        let generation = generation_config(&config, Path::new("/notes/today.ql"));

        assert_eq!(generation.base_dir, temp_dir.path().join("shared"));
        assert_eq!(generation.mode, HtmlMode::Trimmed);
        assert!(!generation.error_markup);
    }

    #[test]
    fn test_render_with_include() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(temp_dir.path().join("name.txt"), "Quill").unwrap();
        let file = temp_dir.path().join("doc.ql");

        let logger = CollectingLogger::new(Severity::Warning);
        let mut generator = DocumentGenerator::new(generation_config(&Config::default(), &file))
            .with_logger(&logger);
        let html = generator.generate_html("Hello \\b{\\include-text{name.txt}}");

        assert_eq!(html, "<p>Hello <b>Quill</b></p>");
        assert!(logger.is_empty());
    }

    #[test]
    fn test_parse_severity() {
        assert_eq!(parse_severity("soft-warning"), Ok(Severity::SoftWarning));
        assert_eq!(parse_severity("error"), Ok(Severity::Error));
        assert!(parse_severity("loud").is_err());
    }
}
