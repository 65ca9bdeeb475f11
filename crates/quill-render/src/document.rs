//! Whole-document generation.
//!
//! A [`DocumentGenerator`] runs the two passes over a document: preprocessing,
//! which lets directives such as `\set` take effect ahead of time, and
//! generation. Each pass gets a fresh [`Context`] over the same persistent
//! variables; the transient arena is reset after every pass.

use std::io;
use std::path::{Path, PathBuf};

use bumpalo::Bump;
use quill_syntax::{Content, parse_and_build};

use crate::behavior::{NameResolver, preprocess};
use crate::builtins::BuiltinDirectiveSet;
use crate::context::{
    Context, IGNORANT_LOGGER, NO_SUPPORT_HIGHLIGHTER, ReadFileFn, Variables, default_read_file,
};
use crate::diagnostic::Logger;
use crate::highlighter::SyntaxHighlighter;
use crate::html::{HtmlMode, to_html};
use crate::html_writer::HtmlWriter;
use crate::plaintext::{PlaintextStatus, to_plaintext};

/// Configuration for document generation.
pub struct GenerationConfig {
    /// Base directory for resolving relative paths (e.g., for `\include-text`).
    pub base_dir: PathBuf,
    /// Path to the source file being rendered (if known).
    pub source_path: Option<PathBuf>,
    /// Callback to read files from the file system.
    ///
    /// Default: `std::fs::read_to_string`
    pub read_file: Option<Box<ReadFileFn>>,
    /// Mode of the top-level HTML conversion.
    ///
    /// Default: [`HtmlMode::Paragraphs`]
    pub mode: HtmlMode,
    /// Render unresolved directives as `<error->` elements instead of dropping them.
    ///
    /// Default: `true`
    pub error_markup: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl GenerationConfig {
    #[must_use]
    pub fn new() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            source_path: None,
            read_file: None,
            mode: HtmlMode::Paragraphs,
            error_markup: true,
        }
    }

    #[must_use]
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    #[must_use]
    pub fn with_source_path(mut self, source_path: impl Into<PathBuf>) -> Self {
        self.source_path = Some(source_path.into());
        self
    }

    #[must_use]
    pub fn with_read_file<F>(mut self, read_file: F) -> Self
    where
        F: Fn(&Path) -> io::Result<String> + Send + 'static,
    {
        self.read_file = Some(Box::new(read_file));
        self
    }

    #[must_use]
    pub fn with_mode(mut self, mode: HtmlMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn with_error_markup(mut self, error_markup: bool) -> Self {
        self.error_markup = error_markup;
        self
    }
}

impl std::fmt::Debug for GenerationConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationConfig")
            .field("base_dir", &self.base_dir)
            .field("source_path", &self.source_path)
            .field("read_file", &self.read_file.as_ref().map(|_| "<fn>"))
            .field("mode", &self.mode)
            .field("error_markup", &self.error_markup)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pass {
    Preprocess,
    Generate,
}

/// Plaintext of a document with its completeness.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaintextDocument {
    pub text: String,
    pub status: PlaintextStatus,
}

/// Generates HTML or plaintext from Quill documents.
///
/// The builtin directives are always available; resolvers added with
/// [`with_resolver`](Self::with_resolver) take precedence over them.
///
/// # Example
///
/// ```
/// use quill_render::{DocumentGenerator, GenerationConfig};
///
/// let mut generator = DocumentGenerator::new(GenerationConfig::new());
/// let html = generator.generate_html("\\set[who]{world}Hello, \\b{\\get[who]}!");
/// assert_eq!(html, "<p>Hello, <b>world</b>!</p>");
/// ```
pub struct DocumentGenerator<'s> {
    config: GenerationConfig,
    builtins: BuiltinDirectiveSet,
    resolvers: Vec<&'s dyn NameResolver>,
    logger: &'s dyn Logger,
    highlighter: &'s dyn SyntaxHighlighter,
    variables: Variables,
    arena: Bump,
}

impl<'s> DocumentGenerator<'s> {
    #[must_use]
    pub fn new(config: GenerationConfig) -> Self {
        Self {
            config,
            builtins: BuiltinDirectiveSet::new(),
            resolvers: Vec::new(),
            logger: &IGNORANT_LOGGER,
            highlighter: &NO_SUPPORT_HIGHLIGHTER,
            variables: Variables::new(),
            arena: Bump::new(),
        }
    }

    #[must_use]
    pub fn with_resolver(mut self, resolver: &'s dyn NameResolver) -> Self {
        self.resolvers.push(resolver);
        self
    }

    #[must_use]
    pub fn with_logger(mut self, logger: &'s dyn Logger) -> Self {
        self.logger = logger;
        self
    }

    #[must_use]
    pub fn with_highlighter(mut self, highlighter: &'s dyn SyntaxHighlighter) -> Self {
        self.highlighter = highlighter;
        self
    }

    #[must_use]
    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Variables as left by the last generated document.
    #[must_use]
    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    /// Parses `source` and generates HTML in the configured mode.
    pub fn generate_html(&mut self, source: &str) -> String {
        let content = parse_and_build(source);
        self.preprocess(source, &content);
        let mode = self.config.mode;
        self.run_pass(source, Pass::Generate, |context| {
            let mut out = HtmlWriter::new();
            to_html(&mut out, &content, context, mode);
            out.into_string()
        })
    }

    /// Parses `source` and generates plaintext.
    pub fn generate_plaintext(&mut self, source: &str) -> PlaintextDocument {
        let content = parse_and_build(source);
        self.preprocess(source, &content);
        self.run_pass(source, Pass::Generate, |context| {
            let mut text = String::new();
            let status = to_plaintext(&mut text, &content, context);
            PlaintextDocument { text, status }
        })
    }

    fn preprocess(&mut self, source: &str, content: &[Content]) {
        self.variables = Variables::new();
        self.run_pass(source, Pass::Preprocess, |context| preprocess(content, context));
    }

    fn run_pass<R>(&mut self, source: &str, pass: Pass, f: impl FnOnce(&mut Context<'_>) -> R) -> R {
        tracing::debug!(pass = ?pass, source_len = source.len(), "starting pass");
        self.arena.reset();
        let result = {
            let read_file: &ReadFileFn = match &self.config.read_file {
                Some(read_file) => read_file.as_ref(),
                None => &default_read_file,
            };
            let mut context = Context::new(source, &mut self.variables, &self.arena)
                .with_resolver(&self.builtins)
                .with_logger(self.logger)
                .with_highlighter(self.highlighter)
                .with_read_file(read_file)
                .with_base_dir(&self.config.base_dir);
            for &resolver in &self.resolvers {
                context.push_resolver(resolver);
            }
            if let Some(source_path) = &self.config.source_path {
                context = context.with_source_path(source_path);
            }
            if self.config.error_markup {
                context = context.with_error_behavior(self.builtins.error_behavior());
            }
            f(&mut context)
        };
        tracing::debug!(pass = ?pass, arena_bytes = self.arena.allocated_bytes(), "finished pass");
        self.arena.reset();
        result
    }
}

impl std::fmt::Debug for DocumentGenerator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentGenerator")
            .field("config", &self.config)
            .field("resolvers", &self.resolvers.len())
            .field("variables", &self.variables)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use quill_syntax::{Directive, Display};

    use super::*;
    use crate::behavior::{Category, DirectiveBehavior};
    use crate::diagnostic::{CollectingLogger, Severity};
    use crate::highlighter::MarkupHighlighter;

    #[test]
    fn test_generate_html_paragraphs() {
        let mut generator = DocumentGenerator::new(GenerationConfig::new());
        assert_eq!(
            generator.generate_html("First \\i{para}.\n\nSecond."),
            "<p>First <i>para</i>.</p><p>Second.</p>"
        );
    }

    #[test]
    fn test_generate_html_direct_mode() {
        let mut generator =
            DocumentGenerator::new(GenerationConfig::new().with_mode(HtmlMode::Direct));
        assert_eq!(generator.generate_html("a\n\nb"), "a\n\nb");
    }

    #[test]
    fn test_variables_reset_between_documents() {
        let mut generator = DocumentGenerator::new(GenerationConfig::new());
        generator.generate_html("\\set[x]{1}");
        assert_eq!(generator.variables().get("x"), Some("1"));
        generator.generate_html("");
        assert!(generator.variables().is_empty());
    }

    #[test]
    fn test_generate_plaintext() {
        let mut generator = DocumentGenerator::new(GenerationConfig::new());
        let document = generator.generate_plaintext("\\b{a}\\html{<br>}\\nope");
        assert_eq!(document.text, "a");
        assert_eq!(document.status, PlaintextStatus::Error);
    }

    #[test]
    fn test_error_markup() {
        let logger = CollectingLogger::new(Severity::Warning);
        let mut generator = DocumentGenerator::new(GenerationConfig::new()).with_logger(&logger);
        assert_eq!(
            generator.generate_html("\\nope{x}"),
            "<p><error->\\nope{x}</error-></p>"
        );
        assert_eq!(logger.ids(), vec!["directive_lookup.unresolved"]);

        let mut generator = DocumentGenerator::new(GenerationConfig::new().with_error_markup(false));
        assert_eq!(generator.generate_html("a\\nope{x}"), "<p>a</p>");
    }

    #[test]
    fn test_custom_resolver_takes_precedence() {
        struct Shout;
        impl DirectiveBehavior for Shout {
            fn category(&self) -> Category {
                Category::Formatting
            }
            fn display(&self) -> Display {
                Display::Inline
            }
            fn render_plaintext(&self, out: &mut String, d: &Directive, context: &mut Context<'_>) {
                let mut inner = String::new();
                to_plaintext(&mut inner, &d.content, context);
                out.push_str(&inner.to_uppercase());
            }
            fn render_html(&self, out: &mut HtmlWriter, d: &Directive, context: &mut Context<'_>) {
                let mut inner = String::new();
                self.render_plaintext(&mut inner, d, context);
                out.write_inner_text(&inner);
            }
        }
        struct ShoutResolver(Shout);
        impl NameResolver for ShoutResolver {
            fn resolve(&self, name: &str) -> Option<&dyn DirectiveBehavior> {
                (name == "b").then_some(&self.0 as &dyn DirectiveBehavior)
            }
        }

        let resolver = ShoutResolver(Shout);
        let mut generator = DocumentGenerator::new(GenerationConfig::new().with_mode(HtmlMode::Direct))
            .with_resolver(&resolver);
        assert_eq!(generator.generate_html("\\b{hey}\\-b{x}"), "HEY<b>x</b>");
    }

    #[test]
    fn test_include_reads_through_config() {
        let config = GenerationConfig::new()
            .with_mode(HtmlMode::Direct)
            .with_read_file(|path| Ok(format!("<{}>", path.display())));
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(temp_dir.path().join("a.txt"), "").unwrap();
        let mut generator = DocumentGenerator::new(config.with_base_dir(temp_dir.path()));
        let html = generator.generate_html("\\include-text{a.txt}");
        assert!(html.starts_with("&lt;"));
        assert!(html.ends_with("a.txt&gt;"));
    }

    #[test]
    fn test_highlighted_codeblock() {
        let highlighter = MarkupHighlighter::default();
        let mut generator =
            DocumentGenerator::new(GenerationConfig::new()).with_highlighter(&highlighter);
        assert_eq!(
            generator.generate_html("\\codeblock[quill]{\n\\\\b\n}"),
            "<pre><code><h- data-h=tag>\\</h-><h- data-h=tag>b</h-></code></pre>"
        );
    }
}
