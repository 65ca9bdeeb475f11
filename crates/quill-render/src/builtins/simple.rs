use quill_syntax::{Directive, Display};

use super::unprefixed;
use crate::behavior::{Category, DirectiveBehavior};
use crate::context::Context;
use crate::html_writer::HtmlWriter;

/// Produces nothing and ignores its arguments and content.
#[derive(Debug, Clone, Copy)]
pub(super) struct DoNothingBehavior {
    category: Category,
    display: Display,
}

impl DoNothingBehavior {
    pub(super) const fn new(category: Category, display: Display) -> Self {
        Self { category, display }
    }
}

impl DirectiveBehavior for DoNothingBehavior {
    fn category(&self) -> Category {
        self.category
    }

    fn display(&self) -> Display {
        self.display
    }

    fn render_plaintext(&self, _out: &mut String, _directive: &Directive, _context: &mut Context<'_>) {}

    fn render_html(&self, _out: &mut HtmlWriter, _directive: &Directive, _context: &mut Context<'_>) {}
}

/// `\error{...}`: shows its content as source code in an `<error->` element.
///
/// Used as error behavior, it shows the whole source of the directive it
/// stands in for.
#[derive(Debug, Clone, Copy)]
pub(super) struct ErrorBehavior;

impl ErrorBehavior {
    const TAG: &'static str = "error-";
}

impl DirectiveBehavior for ErrorBehavior {
    fn category(&self) -> Category {
        Category::PureHtml
    }

    fn display(&self) -> Display {
        Display::Inline
    }

    fn render_plaintext(&self, _out: &mut String, _directive: &Directive, _context: &mut Context<'_>) {}

    fn render_html(&self, out: &mut HtmlWriter, directive: &Directive, context: &mut Context<'_>) {
        let source = context.source();
        out.open_tag(Self::TAG);
        if unprefixed(directive.name(source)) == "error" {
            for piece in &directive.content {
                out.write_inner_text(piece.source_text(source));
            }
        } else {
            out.write_inner_text(directive.source_text(source));
        }
        out.close_tag(Self::TAG);
    }
}
