//! Plaintext and HTML generation for Quill documents.
//!
//! This crate turns the document tree of `quill-syntax` into output by
//! dispatching every directive to a [`DirectiveBehavior`] looked up by name.
//!
//! # Architecture
//!
//! - [`Context`]: state of one pass over a document. Holds the name resolvers,
//!   the persistent [`Variables`], a transient arena, and the injected
//!   services ([`Logger`], [`SyntaxHighlighter`], file loader).
//! - [`DirectiveBehavior`]: what a directive does. Every behavior declares a
//!   [`Category`] that tells consumers which kinds of output it produces.
//! - [`to_plaintext`], [`to_html`]: generation over content sequences.
//! - [`to_html_syntax_highlighted`]: highlights the plaintext inside content
//!   while keeping formatting directives intact.
//! - [`BuiltinDirectiveSet`]: the directives every document can use.
//! - [`DocumentGenerator`]: runs the preprocessing and generation passes over
//!   a whole document.
//!
//! # Example
//!
//! ```
//! use quill_render::{CollectingLogger, DocumentGenerator, GenerationConfig, HtmlMode, Severity};
//!
//! let logger = CollectingLogger::new(Severity::Warning);
//! let mut generator = DocumentGenerator::new(GenerationConfig::new().with_mode(HtmlMode::Direct))
//!     .with_logger(&logger);
//!
//! let html = generator.generate_html("\\b{bold} and \\bold{typo}");
//! assert_eq!(html, "<b>bold</b> and <error->\\bold{typo}</error->");
//! assert_eq!(logger.ids(), vec!["directive_lookup.unresolved"]);
//! ```

mod arguments;
mod behavior;
mod builtins;
mod context;
mod diagnostic;
mod document;
mod highlighter;
mod highlighting;
mod html;
mod html_writer;
mod plaintext;

pub use arguments::{ArgumentMatcher, ArgumentStatus};
pub use behavior::{
    Category, DirectiveBehavior, Distant, NameResolver, closest_match, preprocess,
    preprocess_arguments, preprocess_matched_arguments,
};
pub use builtins::{BUILTIN_PREFIX, BuiltinDirectiveSet};
pub use context::{Context, ReadFileFn, Variables};
pub use diagnostic::{
    CollectingLogger, Diagnostic, IgnorantLogger, Logger, Severity, TracingLogger,
};
pub use document::{DocumentGenerator, GenerationConfig, PlaintextDocument};
pub use highlighter::{HighlightError, MarkupHighlighter, NoSupportHighlighter, SyntaxHighlighter};
pub use highlighting::{to_html_syntax_highlighted, to_plaintext_mapped};
pub use html::{
    HtmlMode, ParagraphState, ParseHtmlModeError, argument_to_plaintext, arguments_to_attributes,
    directive_to_html, to_html, to_html_literally, to_html_with_state, trim_blank_text,
    trim_blank_text_left, trim_blank_text_right, try_render_error_html,
};
pub use html_writer::{AttributeStyle, AttributeWriter, HtmlWriter, escape_html};
pub use plaintext::{
    PlaintextMode, PlaintextStatus, directive_to_plaintext, to_plaintext, to_plaintext_with_mode,
    try_render_error_plaintext,
};
