//! Builtin directives.
//!
//! Every builtin can also be written with a leading `-`, so `\-b{...}` is the
//! same as `\b{...}`. The prefixed form stays available when a document
//! defines its own directive of the same name.

mod code;
mod include;
mod passthrough;
mod simple;
mod variables;

use quill_syntax::chars::is_html_tag_name;

use self::code::CodeBehavior;
use self::include::IncludeTextBehavior;
use self::passthrough::{HtmlLiteralBehavior, PassthroughBehavior};
use self::simple::{DoNothingBehavior, ErrorBehavior};
use self::variables::{GetVariableBehavior, SetVariableBehavior};
use crate::behavior::{Category, DirectiveBehavior, Distant, NameResolver, closest_match};
use quill_syntax::Display;

/// Prefix that selects the builtin of the same name.
pub const BUILTIN_PREFIX: char = '-';

/// Prefix of `\html-NAME` directives.
const HTML_TAG_PREFIX: &str = "html-";

/// Formatting directives whose HTML tag is their name.
const FORMATTING_NAMES: &[&str] = &[
    "b", "em", "i", "ins", "kbd", "mark", "s", "small", "strong", "sub", "sup", "u",
];

/// HTML elements available directly under their name.
const HTML_NAMES: &[&str] = &["dd", "dl", "dt", "li", "ol", "ul"];

/// Every other builtin name, used for suggestions.
const OTHER_NAMES: &[&str] = &[
    "code",
    "codeblock",
    "comment",
    "error",
    "get",
    "html",
    "include-text",
    "set",
    "tt",
];

/// The directives that every document can use.
///
/// ```
/// use quill_render::{BuiltinDirectiveSet, NameResolver};
///
/// let builtins = BuiltinDirectiveSet::new();
/// assert!(builtins.resolve("strong").is_some());
/// assert!(builtins.resolve("-strong").is_some());
/// assert!(builtins.resolve("html-section").is_some());
/// assert!(builtins.resolve("nope").is_none());
/// ```
#[derive(Debug)]
pub struct BuiltinDirectiveSet {
    comment: DoNothingBehavior,
    error: ErrorBehavior,
    html: HtmlLiteralBehavior,
    formatting: PassthroughBehavior,
    tt: PassthroughBehavior,
    direct_html: PassthroughBehavior,
    html_tags: PassthroughBehavior,
    get: GetVariableBehavior,
    set: SetVariableBehavior,
    code: CodeBehavior,
    codeblock: CodeBehavior,
    include_text: IncludeTextBehavior,
}

impl Default for BuiltinDirectiveSet {
    fn default() -> Self {
        Self::new()
    }
}

impl BuiltinDirectiveSet {
    #[must_use]
    pub fn new() -> Self {
        Self {
            comment: DoNothingBehavior::new(Category::Meta, Display::None),
            error: ErrorBehavior,
            html: HtmlLiteralBehavior,
            formatting: PassthroughBehavior::named(Category::Formatting, Display::Inline, ""),
            tt: PassthroughBehavior::fixed(Category::Formatting, Display::Inline, "tt-"),
            direct_html: PassthroughBehavior::named(Category::PureHtml, Display::Inline, ""),
            html_tags: PassthroughBehavior::named(
                Category::PureHtml,
                Display::Block,
                HTML_TAG_PREFIX,
            ),
            get: GetVariableBehavior,
            set: SetVariableBehavior,
            code: CodeBehavior::inline(),
            codeblock: CodeBehavior::block(),
            include_text: IncludeTextBehavior,
        }
    }

    /// Behavior that renders unresolved directives as `<error->` elements.
    #[must_use]
    pub fn error_behavior(&self) -> &dyn DirectiveBehavior {
        &self.error
    }
}

/// Removes the builtin prefix, if any.
pub(crate) fn unprefixed(name: &str) -> &str {
    name.strip_prefix(BUILTIN_PREFIX).unwrap_or(name)
}

impl NameResolver for BuiltinDirectiveSet {
    fn resolve(&self, name: &str) -> Option<&dyn DirectiveBehavior> {
        let name = unprefixed(name);
        let behavior: &dyn DirectiveBehavior = match name {
            "code" => &self.code,
            "codeblock" => &self.codeblock,
            "comment" => &self.comment,
            "error" => &self.error,
            "get" => &self.get,
            "html" => &self.html,
            "include-text" => &self.include_text,
            "set" => &self.set,
            "tt" => &self.tt,
            _ if FORMATTING_NAMES.contains(&name) => &self.formatting,
            _ if HTML_NAMES.contains(&name) => &self.direct_html,
            _ if name
                .strip_prefix(HTML_TAG_PREFIX)
                .is_some_and(is_html_tag_name) =>
            {
                &self.html_tags
            }
            _ => return None,
        };
        Some(behavior)
    }

    fn fuzzy_resolve(&self, name: &str) -> Option<Distant<String>> {
        let candidates = FORMATTING_NAMES
            .iter()
            .chain(HTML_NAMES)
            .chain(OTHER_NAMES)
            .copied();
        closest_match(unprefixed(name), candidates).map(|best| Distant {
            value: best.value.to_owned(),
            distance: best.distance,
        })
    }
}

#[cfg(test)]
mod tests {
    use bumpalo::Bump;
    use pretty_assertions::assert_eq;
    use quill_syntax::parse_and_build;

    use super::*;
    use crate::context::{Context, Variables};
    use crate::html::{HtmlMode, to_html};
    use crate::html_writer::HtmlWriter;
    use crate::plaintext::to_plaintext;

    pub(super) fn render_html(source: &str) -> String {
        let content = parse_and_build(source);
        let builtins = BuiltinDirectiveSet::new();
        let mut variables = Variables::new();
        let arena = Bump::new();
        let mut context = Context::new(source, &mut variables, &arena).with_resolver(&builtins);
        let mut out = HtmlWriter::new();
        to_html(&mut out, &content, &mut context, HtmlMode::Direct);
        out.into_string()
    }

    pub(super) fn render_plaintext(source: &str) -> String {
        let content = parse_and_build(source);
        let builtins = BuiltinDirectiveSet::new();
        let mut variables = Variables::new();
        let arena = Bump::new();
        let mut context = Context::new(source, &mut variables, &arena).with_resolver(&builtins);
        let mut out = String::new();
        to_plaintext(&mut out, &content, &mut context);
        out
    }

    #[test]
    fn test_resolve_categories() {
        let builtins = BuiltinDirectiveSet::new();
        let category = |name| builtins.resolve(name).map(|b| b.category());
        assert_eq!(category("b"), Some(Category::Formatting));
        assert_eq!(category("-tt"), Some(Category::Formatting));
        assert_eq!(category("comment"), Some(Category::Meta));
        assert_eq!(category("ul"), Some(Category::PureHtml));
        assert_eq!(category("get"), Some(Category::PurePlaintext));
        assert_eq!(category("code"), Some(Category::Mixed));
        assert_eq!(category("html-"), None);
        assert_eq!(category("html-1x"), None);
        assert_eq!(category("--b"), None);
    }

    #[test]
    fn test_fuzzy_resolve() {
        let builtins = BuiltinDirectiveSet::new();
        let best = builtins.fuzzy_resolve("-codblock").unwrap();
        assert_eq!(best.value, "codeblock");
        assert_eq!(best.distance, 1);
    }

    #[test]
    fn test_formatting_passthrough() {
        assert_eq!(render_html("\\b{hi}"), "<b>hi</b>");
        assert_eq!(render_html("\\-em[id=x]{hi}"), "<em id=x>hi</em>");
        assert_eq!(render_html("\\tt{mono}"), "<tt->mono</tt->");
        assert_eq!(render_plaintext("\\strong[class=y]{a \\i{b}}"), "a b");
    }

    #[test]
    fn test_html_passthrough() {
        assert_eq!(
            render_html("\\ul{\\li{one}\\li{two}}"),
            "<ul><li>one</li><li>two</li></ul>"
        );
        assert_eq!(
            render_html("\\html-section[hidden]{x}"),
            "<section hidden>x</section>"
        );
        assert_eq!(render_plaintext("\\ul{\\li{one}}"), "");
    }

    #[test]
    fn test_comment() {
        assert_eq!(render_html("a\\comment{b}c"), "ac");
        assert_eq!(render_plaintext("a\\comment{b}c"), "ac");
    }

    #[test]
    fn test_error_directive() {
        assert_eq!(
            render_html("\\error{<\\b{x}>}"),
            "<error->&lt;\\b{x}&gt;</error->"
        );
        assert_eq!(render_plaintext("\\error{x}"), "");
    }
}
