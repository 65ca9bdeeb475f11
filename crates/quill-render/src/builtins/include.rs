use quill_syntax::{Directive, Display};

use crate::behavior::{Category, DirectiveBehavior, preprocess};
use crate::context::Context;
use crate::html_writer::HtmlWriter;
use crate::plaintext::to_plaintext;

/// `\include-text{path}`: the contents of a file, as plaintext.
///
/// The path is relative to the base directory of the context and may not
/// leave it.
#[derive(Debug, Clone, Copy)]
pub(super) struct IncludeTextBehavior;

impl IncludeTextBehavior {
    fn load(directive: &Directive, context: &mut Context<'_>) -> Option<String> {
        let mut path = String::new();
        to_plaintext(&mut path, &directive.content, context);
        let path = path.trim();
        if path.is_empty() {
            context.try_warning(
                "include.no_path",
                directive.span,
                "A file path must be given, such as \\include-text{notes.txt}.",
            );
            return None;
        }

        let Some(resolved) = context.resolve_path_safe(path) else {
            context.try_warning(
                "include.not_found",
                directive.span,
                format!("The file \"{path}\" does not exist or is outside the document directory."),
            );
            return None;
        };
        match context.read_file(&resolved) {
            Ok(text) => {
                tracing::debug!(path = %resolved.display(), "included file");
                Some(text)
            }
            Err(e) => {
                context.try_warning(
                    "include.read",
                    directive.span,
                    format!("The file \"{path}\" could not be read: {e}"),
                );
                None
            }
        }
    }
}

impl DirectiveBehavior for IncludeTextBehavior {
    fn category(&self) -> Category {
        Category::PurePlaintext
    }

    fn display(&self) -> Display {
        Display::Inline
    }

    fn preprocess(&self, directive: &Directive, context: &mut Context<'_>) {
        preprocess(&directive.content, context);
    }

    fn render_plaintext(&self, out: &mut String, directive: &Directive, context: &mut Context<'_>) {
        if let Some(text) = Self::load(directive, context) {
            out.push_str(&text);
        }
    }

    fn render_html(&self, out: &mut HtmlWriter, directive: &Directive, context: &mut Context<'_>) {
        if let Some(text) = Self::load(directive, context) {
            out.write_inner_text(&text);
        }
    }
}
