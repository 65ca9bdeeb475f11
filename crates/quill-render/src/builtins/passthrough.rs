use quill_syntax::{Content, Directive, Display, GeneratedKind};

use super::unprefixed;
use crate::behavior::{Category, DirectiveBehavior, preprocess, preprocess_arguments};
use crate::context::Context;
use crate::html::{HtmlMode, arguments_to_attributes, directive_to_html, to_html};
use crate::html_writer::HtmlWriter;
use crate::plaintext::to_plaintext;

/// Where a passthrough directive takes its tag name from.
#[derive(Debug, Clone, Copy)]
enum TagName {
    /// The directive name with this prefix removed.
    Named(&'static str),
    Fixed(&'static str),
}

/// Wraps the content in an HTML element, with arguments as attributes.
///
/// `\i[id=123]{...}` becomes `<i id=123>...</i>`.
#[derive(Debug, Clone, Copy)]
pub(super) struct PassthroughBehavior {
    category: Category,
    display: Display,
    tag: TagName,
}

impl PassthroughBehavior {
    pub(super) const fn named(category: Category, display: Display, prefix: &'static str) -> Self {
        Self {
            category,
            display,
            tag: TagName::Named(prefix),
        }
    }

    pub(super) const fn fixed(category: Category, display: Display, tag: &'static str) -> Self {
        Self {
            category,
            display,
            tag: TagName::Fixed(tag),
        }
    }

    fn tag_name<'s>(&self, directive: &Directive, source: &'s str) -> &'s str {
        match self.tag {
            TagName::Named(prefix) => {
                let name = unprefixed(directive.name(source));
                name.strip_prefix(prefix).unwrap_or(name)
            }
            TagName::Fixed(tag) => tag,
        }
    }
}

impl DirectiveBehavior for PassthroughBehavior {
    fn category(&self) -> Category {
        self.category
    }

    fn display(&self) -> Display {
        self.display
    }

    fn preprocess(&self, directive: &Directive, context: &mut Context<'_>) {
        preprocess_arguments(directive, context);
        preprocess(&directive.content, context);
    }

    fn render_plaintext(&self, out: &mut String, directive: &Directive, context: &mut Context<'_>) {
        if self.category == Category::Formatting {
            to_plaintext(out, &directive.content, context);
        }
    }

    fn render_html(&self, out: &mut HtmlWriter, directive: &Directive, context: &mut Context<'_>) {
        let tag = self.tag_name(directive, context.source());
        if directive.arguments.is_empty() {
            out.open_tag(tag);
        } else {
            let mut attributes = out.open_tag_with_attributes(tag);
            arguments_to_attributes(&mut attributes, directive, context, None);
        }
        to_html(out, &directive.content, context, HtmlMode::Direct);
        out.close_tag(tag);
    }
}

/// `\html{...}`: text inside is written as raw HTML.
///
/// Directives inside still generate HTML as usual.
#[derive(Debug, Clone, Copy)]
pub(super) struct HtmlLiteralBehavior;

impl DirectiveBehavior for HtmlLiteralBehavior {
    fn category(&self) -> Category {
        Category::PureHtml
    }

    fn display(&self) -> Display {
        Display::Block
    }

    fn preprocess(&self, directive: &Directive, context: &mut Context<'_>) {
        if !directive.arguments.is_empty() {
            context.try_warning(
                "html.arguments_ignored",
                directive.span,
                "Arguments of \\html are ignored.",
            );
        }
        preprocess(&directive.content, context);
    }

    fn render_plaintext(&self, _out: &mut String, _directive: &Directive, _context: &mut Context<'_>) {}

    fn render_html(&self, out: &mut HtmlWriter, directive: &Directive, context: &mut Context<'_>) {
        let source = context.source();
        for piece in &directive.content {
            match piece {
                Content::Text(text) => out.write_inner_html(text.text(source)),
                Content::Escaped(escaped) => out.write_inner_html(escaped.char_str(source)),
                Content::Generated(generated) => match generated.kind {
                    GeneratedKind::Html => out.write_inner_html(&generated.data),
                    GeneratedKind::Plaintext => out.write_inner_text(&generated.data),
                },
                Content::Directive(inner) => directive_to_html(out, inner, context),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::super::tests::{render_html, render_plaintext};

    #[test]
    fn test_html_literal() {
        assert_eq!(
            render_html("\\html{<span class=\"x\">\\b{&amp;}\\}</span>}"),
            "<span class=\"x\"><b>&amp;amp;</b>}</span>"
        );
        assert_eq!(render_plaintext("\\html{<br>}"), "");
    }

    #[test]
    fn test_positional_argument_becomes_empty_attribute() {
        assert_eq!(
            render_html("\\html-details[open, class=note]{x}"),
            "<details open class=note>x</details>"
        );
    }

    #[test]
    fn test_argument_content_is_plaintext() {
        assert_eq!(
            render_html("\\b[title=a \\i{b}]{x}"),
            "<b title=\"a b\">x</b>"
        );
    }
}
