//! Syntax highlighting of content that may contain directives.
//!
//! The content is first projected onto plaintext, remembering for every byte
//! of the projection which source byte produced it. The highlighter runs on
//! the projection, and the highlighted runs are mapped back onto a copy of the
//! content tree, which is then rendered as usual. Formatting directives such
//! as `\b` survive highlighting; their content is highlighted in place.

use bumpalo::collections::Vec as BumpVec;
use quill_syntax::{Content, Directive, Generated, HighlightSpan, SourceSpan};

use crate::behavior::Category;
use crate::context::Context;
use crate::highlighter::HighlightError;
use crate::html::{HtmlMode, to_html};
use crate::html_writer::HtmlWriter;

/// Tag wrapping each highlighted run.
const HIGHLIGHT_TAG: &str = "h-";

/// Renders `content` with the plaintext inside it highlighted as `language`.
///
/// On error, nothing is written to `out`.
///
/// ```
/// use bumpalo::Bump;
/// use quill_render::{
///     BuiltinDirectiveSet, Context, HtmlMode, HtmlWriter, MarkupHighlighter, Variables,
///     to_html_syntax_highlighted,
/// };
/// use quill_syntax::parse_and_build;
///
/// let source = "\\b{\\\\x}";
/// let content = parse_and_build(source);
/// let builtins = BuiltinDirectiveSet::new();
/// let highlighter = MarkupHighlighter::default();
/// let mut variables = Variables::new();
/// let arena = Bump::new();
/// let mut context = Context::new(source, &mut variables, &arena)
///     .with_resolver(&builtins)
///     .with_highlighter(&highlighter);
///
/// let mut out = HtmlWriter::new();
/// to_html_syntax_highlighted(&mut out, &content, "quill", &mut context, HtmlMode::Direct)?;
/// assert_eq!(
///     out.as_str(),
///     "<b><h- data-h=tag>\\</h-><h- data-h=tag>x</h-></b>"
/// );
/// # Ok::<(), quill_render::HighlightError>(())
/// ```
pub fn to_html_syntax_highlighted(
    out: &mut HtmlWriter,
    content: &[Content],
    language: &str,
    context: &mut Context<'_>,
    mode: HtmlMode,
) -> Result<(), HighlightError> {
    let arena = context.transient();
    let mut plaintext = String::new();
    let mut to_source = BumpVec::new_in(arena);
    to_plaintext_mapped(&mut plaintext, &mut to_source, content, context);

    let spans = context.highlighter().highlight(&plaintext, language)?;

    let mut to_span = BumpVec::new_in(arena);
    to_span.resize(plaintext.len(), None);
    for (id, span) in spans.iter().enumerate() {
        let in_bounds = span.end() <= plaintext.len()
            && plaintext.is_char_boundary(span.begin)
            && plaintext.is_char_boundary(span.end());
        if !in_bounds {
            tracing::debug!(begin = span.begin, length = span.length, "dropping invalid highlight span");
            continue;
        }
        for slot in &mut to_span[span.begin..span.end()] {
            *slot = Some(id);
        }
    }

    let mut copier = HighlightCopier {
        text: &plaintext,
        to_source: &to_source,
        to_span: &to_span,
        spans: &spans,
        index: 0,
    };
    let highlighted = copier.copy(content, context);
    to_html(out, &highlighted, context, mode);
    Ok(())
}

/// Appends the plaintext of `content` to `out` as seen by a highlighter.
///
/// For every byte appended to `out`, the index of the source byte responsible
/// for it is appended to `mapping`. Formatting directives contribute their
/// content. Pure plaintext directives contribute their output, all of which is
/// mapped to the start of the directive. Nothing else contributes.
pub fn to_plaintext_mapped(
    out: &mut String,
    mapping: &mut BumpVec<'_, usize>,
    content: &[Content],
    context: &mut Context<'_>,
) {
    for piece in content {
        match piece {
            Content::Text(text) => {
                out.push_str(text.text(context.source()));
                mapping.extend(text.span.begin..text.span.end());
            }
            Content::Escaped(escaped) => {
                let c = escaped.char_str(context.source());
                out.push_str(c);
                mapping.extend(std::iter::repeat_n(escaped.char_index(), c.len()));
            }
            Content::Generated(_) => {
                tracing::debug!("generated content is not highlighted");
            }
            Content::Directive(directive) => {
                directive_to_plaintext_mapped(out, mapping, directive, context);
            }
        }
    }
}

fn directive_to_plaintext_mapped(
    out: &mut String,
    mapping: &mut BumpVec<'_, usize>,
    directive: &Directive,
    context: &mut Context<'_>,
) {
    let Some(behavior) = context.find_directive(directive) else {
        return;
    };
    match behavior.category() {
        Category::Formatting => to_plaintext_mapped(out, mapping, &directive.content, context),
        Category::PurePlaintext => {
            let initial_len = out.len();
            behavior.render_plaintext(out, directive, context);
            let growth = out.len() - initial_len;
            mapping.extend(std::iter::repeat_n(directive.span.begin, growth));
        }
        Category::Meta | Category::PureHtml | Category::Mixed => {}
    }
}

/// Copies content, replacing highlighted text with generated HTML.
struct HighlightCopier<'h> {
    text: &'h str,
    to_source: &'h [usize],
    to_span: &'h [Option<usize>],
    spans: &'h [HighlightSpan],
    /// Position in the projection; never decreases.
    index: usize,
}

impl HighlightCopier<'_> {
    fn copy(&mut self, content: &[Content], context: &Context<'_>) -> Vec<Content> {
        let mut out = Vec::with_capacity(content.len());
        for piece in content {
            match piece {
                Content::Text(text) => self.append_highlighted_in(&mut out, text.span),
                Content::Escaped(escaped) => self.append_highlighted_in(&mut out, escaped.span),
                Content::Generated(_) => out.push(piece.clone()),
                Content::Directive(directive) => {
                    match context.find_directive(directive).map(|b| b.category()) {
                        Some(Category::Formatting) => {
                            let content = self.copy(&directive.content, context);
                            out.push(Content::Directive(Directive {
                                span: directive.span,
                                name_length: directive.name_length,
                                arguments: directive.arguments.clone(),
                                content,
                            }));
                        }
                        Some(Category::PurePlaintext) => {
                            self.append_highlighted_in(&mut out, directive.span);
                        }
                        _ => out.push(piece.clone()),
                    }
                }
            }
        }
        out
    }

    /// Consumes the projection bytes that map into `span`, one node per run.
    fn append_highlighted_in(&mut self, out: &mut Vec<Content>, span: SourceSpan) {
        let limit = self.to_source.len();
        while self.index < limit {
            let source_index = self.to_source[self.index];
            if source_index < span.begin {
                self.index += 1;
                continue;
            }
            if source_index >= span.end() {
                break;
            }
            let current = self.to_span[self.index];
            let begin = self.index;
            self.index += 1;
            while self.index < limit
                && self.to_source[self.index] < span.end()
                && self.to_span[self.index] == current
            {
                self.index += 1;
            }
            // Runs start and end on node or span boundaries, both char-aligned.
            debug_assert!(self.text.is_char_boundary(begin) && self.text.is_char_boundary(self.index));
            let span = current.map(|id| &self.spans[id]);
            out.push(Content::Generated(make_generated(&self.text[begin..self.index], span)));
        }
    }
}

fn make_generated(snippet: &str, span: Option<&HighlightSpan>) -> Generated {
    let mut out = HtmlWriter::new();
    if let Some(span) = span {
        out.open_tag_with_attributes(HIGHLIGHT_TAG)
            .write_attribute("data-h", span.kind.short_id());
    }
    out.write_inner_text(snippet);
    if span.is_some() {
        out.close_tag(HIGHLIGHT_TAG);
    }
    Generated::html(out.into_string())
}
