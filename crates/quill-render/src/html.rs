//! Conversion of content to HTML.
//!
//! Content can be converted in one of four [`HtmlMode`]s. The paragraph modes
//! wrap inline content in `<p>` elements, splitting paragraphs at blank lines
//! and around block directives:
//!
//! ```
//! use bumpalo::Bump;
//! use quill_render::{BuiltinDirectiveSet, Context, HtmlMode, HtmlWriter, Variables, to_html};
//! use quill_syntax::parse_and_build;
//!
//! let source = "first \\b{bold}\n\nsecond";
//! let content = parse_and_build(source);
//! let builtins = BuiltinDirectiveSet::new();
//! let mut variables = Variables::new();
//! let arena = Bump::new();
//! let mut context = Context::new(source, &mut variables, &arena).with_resolver(&builtins);
//!
//! let mut out = HtmlWriter::new();
//! to_html(&mut out, &content, &mut context, HtmlMode::Paragraphs);
//! assert_eq!(out.as_str(), "<p>first <b>bold</b></p><p>second</p>");
//! ```

use std::fmt;
use std::str::FromStr;

use quill_syntax::chars::{
    find_blank_line_sequence, is_ascii_blank, is_html_attribute_name, trim_ascii_blank_left,
    trim_ascii_blank_right,
};
use quill_syntax::{Argument, Content, Directive, Display, Generated, GeneratedKind, Text};

use crate::arguments::ArgumentMatcher;
use crate::context::Context;
use crate::html_writer::{AttributeWriter, HtmlWriter};
use crate::plaintext::{PlaintextStatus, to_plaintext};

/// How a sequence of content is turned into HTML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum HtmlMode {
    /// Every piece is converted as is.
    #[default]
    Direct,
    /// Blank text at both ends is dropped and the remaining ends are trimmed.
    Trimmed,
    /// Inline content is grouped into `<p>` elements.
    Paragraphs,
    /// Like [`HtmlMode::Paragraphs`], with the first and last text trimmed.
    ParagraphsTrimmed,
}

impl HtmlMode {
    #[must_use]
    pub const fn is_trimmed(self) -> bool {
        matches!(self, Self::Trimmed | Self::ParagraphsTrimmed)
    }

    #[must_use]
    pub const fn is_paragraphed(self) -> bool {
        matches!(self, Self::Paragraphs | Self::ParagraphsTrimmed)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Trimmed => "trimmed",
            Self::Paragraphs => "paragraphs",
            Self::ParagraphsTrimmed => "paragraphs_trimmed",
        }
    }
}

impl fmt::Display for HtmlMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown [`HtmlMode`] name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown HTML mode '{0}', expected one of: direct, trimmed, paragraphs, paragraphs_trimmed")]
pub struct ParseHtmlModeError(String);

impl FromStr for HtmlMode {
    type Err = ParseHtmlModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "direct" => Ok(Self::Direct),
            "trimmed" => Ok(Self::Trimmed),
            "paragraphs" => Ok(Self::Paragraphs),
            "paragraphs_trimmed" | "paragraphs-trimmed" => Ok(Self::ParagraphsTrimmed),
            _ => Err(ParseHtmlModeError(s.to_owned())),
        }
    }
}

/// Whether a `<p>` element is currently open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParagraphState {
    #[default]
    Outside,
    Inside,
}

fn is_blank_piece(piece: &Content, source: &str) -> bool {
    match piece {
        Content::Text(text) => is_ascii_blank(text.text(source)),
        Content::Generated(generated) => is_ascii_blank(&generated.data),
        Content::Escaped(_) | Content::Directive(_) => false,
    }
}

/// Drops leading text and generated pieces that are entirely blank.
#[must_use]
pub fn trim_blank_text_left<'c>(mut content: &'c [Content], source: &str) -> &'c [Content] {
    while let [first, rest @ ..] = content {
        if !is_blank_piece(first, source) {
            break;
        }
        content = rest;
    }
    content
}

/// Drops trailing text and generated pieces that are entirely blank.
#[must_use]
pub fn trim_blank_text_right<'c>(mut content: &'c [Content], source: &str) -> &'c [Content] {
    while let [rest @ .., last] = content {
        if !is_blank_piece(last, source) {
            break;
        }
        content = rest;
    }
    content
}

#[must_use]
pub fn trim_blank_text<'c>(content: &'c [Content], source: &str) -> &'c [Content] {
    trim_blank_text_right(trim_blank_text_left(content, source), source)
}

/// Appends the HTML of `content` to `out`.
pub fn to_html(out: &mut HtmlWriter, content: &[Content], context: &mut Context<'_>, mode: HtmlMode) {
    to_html_with_state(out, content, context, mode, ParagraphState::Outside);
}

/// Like [`to_html`], starting the paragraph modes in `state`.
///
/// With [`ParagraphState::Inside`], the caller has already opened a `<p>`,
/// which is closed by the first block or blank line.
pub fn to_html_with_state(
    out: &mut HtmlWriter,
    content: &[Content],
    context: &mut Context<'_>,
    mode: HtmlMode,
    state: ParagraphState,
) {
    let content = if mode.is_trimmed() {
        trim_blank_text(content, context.source())
    } else {
        content
    };

    match mode {
        HtmlMode::Direct => {
            for piece in content {
                piece_to_html(out, piece, context);
            }
        }
        HtmlMode::Trimmed => to_html_trimmed(out, content, context),
        HtmlMode::Paragraphs | HtmlMode::ParagraphsTrimmed => {
            let mut paragraphs = ParagraphWriter {
                out,
                context,
                state,
            };
            let last = content.len().saturating_sub(1);
            for (i, piece) in content.iter().enumerate() {
                match piece {
                    Content::Text(text) if mode == HtmlMode::ParagraphsTrimmed => {
                        paragraphs.text(text, i == 0, i == last);
                    }
                    _ => paragraphs.piece(piece),
                }
            }
            paragraphs.flush();
        }
    }
}

fn piece_to_html(out: &mut HtmlWriter, piece: &Content, context: &mut Context<'_>) {
    match piece {
        Content::Text(text) => out.write_inner_text(text.text(context.source())),
        Content::Escaped(escaped) => out.write_inner_text(escaped.char_str(context.source())),
        Content::Generated(generated) => generated_to_html(out, generated, &generated.data),
        Content::Directive(directive) => directive_to_html(out, directive, context),
    }
}

fn generated_to_html(out: &mut HtmlWriter, generated: &Generated, data: &str) {
    match generated.kind {
        GeneratedKind::Plaintext => out.write_inner_text(data),
        GeneratedKind::Html => out.write_inner_html(data),
    }
}

/// Appends the HTML of a single directive, falling back to the error behavior.
pub fn directive_to_html(out: &mut HtmlWriter, directive: &Directive, context: &mut Context<'_>) {
    if let Some(behavior) = context.find_directive(directive) {
        behavior.render_html(out, directive, context);
        return;
    }
    context.try_lookup_error(directive);
    try_render_error_html(out, directive, context);
}

fn to_html_trimmed(out: &mut HtmlWriter, content: &[Content], context: &mut Context<'_>) {
    let last = content.len().saturating_sub(1);
    fn trim(mut text: &str, i: usize, last: usize) -> &str {
        if i == 0 {
            text = trim_ascii_blank_left(text);
        }
        if i == last {
            text = trim_ascii_blank_right(text);
        }
        text
    }

    for (i, piece) in content.iter().enumerate() {
        match piece {
            Content::Text(text) => out.write_inner_text(trim(text.text(context.source()), i, last)),
            Content::Generated(generated) => {
                generated_to_html(out, generated, trim(&generated.data, i, last));
            }
            Content::Escaped(_) | Content::Directive(_) => piece_to_html(out, piece, context),
        }
    }
}

struct ParagraphWriter<'o, 'c, 'a> {
    out: &'o mut HtmlWriter,
    context: &'c mut Context<'a>,
    state: ParagraphState,
}

impl ParagraphWriter<'_, '_, '_> {
    fn piece(&mut self, piece: &Content) {
        match piece {
            Content::Text(text) => self.text(text, false, false),
            Content::Escaped(escaped) => {
                self.transition(Display::Inline);
                self.out.write_inner_text(escaped.char_str(self.context.source()));
            }
            Content::Generated(generated) => {
                self.transition(generated.display);
                generated_to_html(self.out, generated, &generated.data);
            }
            Content::Directive(directive) => self.directive(directive),
        }
    }

    fn directive(&mut self, directive: &Directive) {
        let behavior = match self.context.find_directive(directive) {
            Some(behavior) => Some(behavior),
            None => {
                self.context.try_lookup_error(directive);
                self.context.error_behavior()
            }
        };
        if let Some(behavior) = behavior {
            self.transition(behavior.display());
            behavior.render_html(self.out, directive, self.context);
        }
    }

    /// Text is never a block in itself, but blank lines inside it separate paragraphs.
    ///
    /// Blanks before a break are trimmed; blanks after it stay at the start
    /// of the next paragraph.
    fn text(&mut self, text: &Text, trim_left: bool, trim_right: bool) {
        let mut text = text.text(self.context.source());
        if trim_left {
            text = trim_ascii_blank_left(text);
        }
        if trim_right {
            text = trim_ascii_blank_right(text);
        }

        // A lone leading newline only ends the line of whatever precedes the text.
        if let Some(rest) = text.strip_prefix('\n')
            && find_blank_line_sequence(text).is_some_and(|blank| blank.begin == 0 && blank.length == 1)
        {
            self.out.write_inner_text("\n");
            text = rest;
        }

        while !text.is_empty() {
            let Some(blank) = find_blank_line_sequence(text) else {
                self.transition(Display::Inline);
                self.out.write_inner_text(text);
                break;
            };
            if blank.begin != 0 {
                self.transition(Display::Inline);
                self.out.write_inner_text(trim_ascii_blank_right(&text[..blank.begin]));
            }
            self.transition(Display::Block);
            text = &text[blank.end()..];
        }
    }

    fn transition(&mut self, display: Display) {
        match (display, self.state) {
            (Display::Inline, ParagraphState::Outside) => {
                self.out.open_tag("p");
                self.state = ParagraphState::Inside;
            }
            (Display::Block, ParagraphState::Inside) => {
                self.out.close_tag("p");
                self.state = ParagraphState::Outside;
            }
            _ => {}
        }
    }

    fn flush(&mut self) {
        self.transition(Display::Block);
    }
}

/// Appends `content` without interpreting it as markup.
///
/// Text and escaped characters are written as raw HTML; directives are
/// written as their escaped source text.
pub fn to_html_literally(out: &mut HtmlWriter, content: &[Content], context: &Context<'_>) {
    let source = context.source();
    for piece in content {
        match piece {
            Content::Text(text) => out.write_inner_html(text.text(source)),
            Content::Escaped(escaped) => out.write_inner_html(escaped.char_str(source)),
            Content::Generated(generated) => generated_to_html(out, generated, &generated.data),
            Content::Directive(directive) => out.write_inner_text(directive.source_text(source)),
        }
    }
}

/// Writes every argument of `directive` as an HTML attribute.
///
/// Named arguments become `name=value` with the plaintext of their content as
/// value. Positional arguments become an empty attribute named by their
/// plaintext. Arguments whose name is rejected by `filter`, or is not a valid
/// attribute name, are skipped.
pub fn arguments_to_attributes(
    attributes: &mut AttributeWriter<'_>,
    directive: &Directive,
    context: &mut Context<'_>,
    filter: Option<&dyn Fn(&str) -> bool>,
) {
    let mut value = String::new();
    for argument in &directive.arguments {
        value.clear();
        argument_to_attribute(attributes, argument, &mut value, context, filter);
    }
}

/// Writes one argument as an attribute, returning whether it was written.
fn argument_to_attribute(
    attributes: &mut AttributeWriter<'_>,
    argument: &Argument,
    value: &mut String,
    context: &mut Context<'_>,
    filter: Option<&dyn Fn(&str) -> bool>,
) -> bool {
    let status = to_plaintext(value, &argument.content, context);
    if status != PlaintextStatus::Ok {
        tracing::debug!(status = ?status, begin = argument.span.begin, "lossy attribute value");
    }
    let accepts = |name: &str| is_html_attribute_name(name) && filter.is_none_or(|f| f(name));

    match argument.name(context.source()) {
        Some(name) if accepts(name) => {
            attributes.write_attribute(name, value.as_str());
            true
        }
        Some(_) => false,
        None if accepts(value.as_str()) => {
            attributes.write_empty_attribute(value.as_str());
            true
        }
        None => false,
    }
}

/// Appends the plaintext of the argument bound to `parameter`.
///
/// Returns `false` if no argument is bound to it.
pub fn argument_to_plaintext(
    out: &mut String,
    directive: &Directive,
    matcher: &ArgumentMatcher<'_, '_>,
    parameter: &str,
    context: &mut Context<'_>,
) -> bool {
    let Some(index) = matcher.argument_index(parameter) else {
        return false;
    };
    to_plaintext(out, &directive.arguments[index].content, context);
    true
}

/// Renders `directive` with the error behavior, if the context has one.
pub fn try_render_error_html(out: &mut HtmlWriter, directive: &Directive, context: &mut Context<'_>) {
    if let Some(behavior) = context.error_behavior() {
        behavior.render_html(out, directive, context);
    }
}
