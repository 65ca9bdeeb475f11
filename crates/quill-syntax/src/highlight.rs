//! Highlight spans and the self-highlighter for the markup language.
//!
//! The markup highlighter works directly on the instruction stream: every
//! instruction knows how many source bytes it covers, so spans fall out of a
//! single walk with a running cursor.

use crate::instruction::{Instruction, InstructionKind};
use crate::parser::parse;

/// Semantic class of a highlighted span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum HighlightKind {
    /// Attribute name in markup.
    Attribute,
    Comment,
    /// Comment delimiters such as `//`.
    CommentDelimiter,
    /// Deleted line in a diff.
    Deletion,
    Identifier,
    /// Inserted line in a diff.
    Insertion,
    Keyword,
    /// Control flow keywords such as `if`.
    KeywordControl,
    /// Type keywords such as `int`.
    KeywordType,
    /// `true`, `false` and similar.
    KeywordBoolean,
    /// Non-boolean constants such as `nullptr`.
    KeywordConstant,
    /// Meta instructions such as preprocessor directives.
    Meta,
    Number,
    /// Unimportant punctuation.
    SymbolOther,
    /// Operators.
    SymbolNormal,
    /// Braces and brackets.
    SymbolImportant,
    String,
    /// Escape sequences in strings.
    StringEscape,
    /// Tag name in markup.
    Tag,
}

impl HighlightKind {
    /// Short identifier written into the `data-h` attribute of highlighted HTML.
    #[must_use]
    pub const fn short_id(self) -> &'static str {
        match self {
            Self::Attribute => "attr",
            Self::Comment => "cmt",
            Self::CommentDelimiter => "cmt_dlim",
            Self::Deletion => "del",
            Self::Identifier => "id",
            Self::Insertion => "ins",
            Self::Keyword => "kw",
            Self::KeywordControl => "kw_ctrl",
            Self::KeywordType => "kw_type",
            Self::KeywordBoolean => "kw_bool",
            Self::KeywordConstant => "kw_const",
            Self::Meta => "meta",
            Self::Number => "num",
            Self::SymbolOther => "sym_other",
            Self::SymbolNormal => "sym",
            Self::SymbolImportant => "sym_imp",
            Self::String => "str",
            Self::StringEscape => "str_esc",
            Self::Tag => "tag",
        }
    }
}

/// A highlighted byte range of highlighted code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HighlightSpan {
    pub begin: usize,
    pub length: usize,
    pub kind: HighlightKind,
}

impl HighlightSpan {
    #[must_use]
    pub const fn new(begin: usize, length: usize, kind: HighlightKind) -> Self {
        Self {
            begin,
            length,
            kind,
        }
    }

    #[must_use]
    pub const fn end(&self) -> usize {
        self.begin + self.length
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HighlightOptions {
    /// Merge adjacent spans of the same kind.
    pub coalescing: bool,
}

/// Highlights markup source.
///
/// # Example
///
/// ```
/// use quill_syntax::highlight::{highlight_markup_source, HighlightKind, HighlightOptions};
///
/// let spans = highlight_markup_source("\\b{x}", HighlightOptions::default());
/// let kinds: Vec<_> = spans.iter().map(|s| s.kind).collect();
/// assert_eq!(
///     kinds,
///     [HighlightKind::Tag, HighlightKind::SymbolImportant, HighlightKind::SymbolImportant]
/// );
/// ```
#[must_use]
pub fn highlight_markup_source(source: &str, options: HighlightOptions) -> Vec<HighlightSpan> {
    highlight_markup(source, &parse(source), options)
}

/// Highlights markup given its already parsed instruction stream.
#[must_use]
pub fn highlight_markup(
    source: &str,
    instructions: &[Instruction],
    options: HighlightOptions,
) -> Vec<HighlightSpan> {
    let mut emitter = SpanEmitter {
        out: Vec::new(),
        coalescing: options.coalescing,
    };
    let mut pos = 0;
    let mut depth = 0;
    let mut comment: Option<OpenComment> = None;

    for instruction in instructions {
        let start = pos;
        pos += instruction.advance();
        let kind = instruction.kind;

        if let Some(open) = &mut comment {
            match kind {
                InstructionKind::PushDirective => depth += 1,
                InstructionKind::PushBlock if depth == open.depth && open.block.is_none() => {
                    emitter.emit(open.start, pos - open.start, HighlightKind::CommentDelimiter);
                    open.block = Some(pos);
                }
                InstructionKind::PopBlock if depth == open.depth => {
                    if let Some(block) = open.block {
                        if start > block {
                            emitter.emit(block, start - block, HighlightKind::Comment);
                        }
                        emitter.emit(start, 1, HighlightKind::CommentDelimiter);
                    }
                }
                InstructionKind::PopDirective => {
                    if depth == open.depth {
                        if open.block.is_none() {
                            emitter.emit(open.start, pos - open.start, HighlightKind::CommentDelimiter);
                        }
                        comment = None;
                    }
                    depth -= 1;
                }
                _ => {}
            }
            continue;
        }

        let length = pos - start;
        match kind {
            InstructionKind::Escape => emitter.emit(start, length, HighlightKind::StringEscape),
            InstructionKind::ArgumentName => emitter.emit(start, length, HighlightKind::Attribute),
            InstructionKind::PushDirective => {
                depth += 1;
                let name = &source[start..pos];
                if name == "\\comment" || name == "\\-comment" {
                    comment = Some(OpenComment {
                        start,
                        depth,
                        block: None,
                    });
                } else {
                    emitter.emit(start, length, HighlightKind::Tag);
                }
            }
            InstructionKind::PopDirective => depth -= 1,
            InstructionKind::ArgumentEqual | InstructionKind::ArgumentComma => {
                emitter.emit(start, length, HighlightKind::SymbolNormal);
            }
            InstructionKind::PushArguments
            | InstructionKind::PopArguments
            | InstructionKind::PushBlock
            | InstructionKind::PopBlock => {
                emitter.emit(start, length, HighlightKind::SymbolImportant);
            }
            InstructionKind::Skip
            | InstructionKind::Text
            | InstructionKind::PushDocument
            | InstructionKind::PopDocument
            | InstructionKind::PushArgument
            | InstructionKind::PopArgument => {}
        }
    }

    emitter.out
}

/// A `\comment` directive being walked over.
struct OpenComment {
    start: usize,
    /// Directive depth of the comment itself.
    depth: usize,
    /// Position just after the `{` of the comment block, once seen.
    block: Option<usize>,
}

struct SpanEmitter {
    out: Vec<HighlightSpan>,
    coalescing: bool,
}

impl SpanEmitter {
    fn emit(&mut self, begin: usize, length: usize, kind: HighlightKind) {
        debug_assert!(length != 0, "empty highlight span");
        if self.coalescing {
            if let Some(last) = self.out.last_mut() {
                if last.kind == kind && last.end() == begin {
                    last.length += length;
                    return;
                }
            }
        }
        self.out.push(HighlightSpan::new(begin, length, kind));
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn spans(source: &str, coalescing: bool) -> Vec<(String, HighlightKind)> {
        highlight_markup_source(source, HighlightOptions { coalescing })
            .into_iter()
            .map(|s| (source[s.begin..s.end()].to_owned(), s.kind))
            .collect()
    }

    #[test]
    fn test_directive_with_arguments() {
        use HighlightKind::*;
        assert_eq!(
            spans("\\x[a=1,2]{t\\}}", false),
            vec![
                ("\\x".to_owned(), Tag),
                ("[".to_owned(), SymbolImportant),
                ("a".to_owned(), Attribute),
                ("=".to_owned(), SymbolNormal),
                (",".to_owned(), SymbolNormal),
                ("]".to_owned(), SymbolImportant),
                ("{".to_owned(), SymbolImportant),
                ("\\}".to_owned(), StringEscape),
                ("}".to_owned(), SymbolImportant),
            ]
        );
    }

    #[test]
    fn test_coalescing_merges_adjacent() {
        use HighlightKind::*;
        assert_eq!(
            spans("\\{\\}", true),
            vec![("\\{\\}".to_owned(), StringEscape)]
        );
        assert_eq!(spans("\\{\\}", false).len(), 2);
    }

    #[test]
    fn test_comment() {
        use HighlightKind::*;
        assert_eq!(
            spans("a\\comment[x]{hi \\b{y}}b", false),
            vec![
                ("\\comment[x]{".to_owned(), CommentDelimiter),
                ("hi \\b{y}".to_owned(), Comment),
                ("}".to_owned(), CommentDelimiter),
            ]
        );
    }

    #[test]
    fn test_comment_without_block() {
        use HighlightKind::*;
        assert_eq!(
            spans("\\-comment \\b{x}", false),
            vec![
                ("\\-comment".to_owned(), CommentDelimiter),
                ("\\b".to_owned(), Tag),
                ("{".to_owned(), SymbolImportant),
                ("}".to_owned(), SymbolImportant),
            ]
        );
    }

    #[test]
    fn test_empty_comment_block() {
        use HighlightKind::*;
        assert_eq!(
            spans("\\comment{}", false),
            vec![
                ("\\comment{".to_owned(), CommentDelimiter),
                ("}".to_owned(), CommentDelimiter),
            ]
        );
    }

    #[test]
    fn test_short_ids_are_unique() {
        use std::collections::HashSet;
        use HighlightKind::*;
        let all = [
            Attribute, Comment, CommentDelimiter, Deletion, Identifier, Insertion, Keyword,
            KeywordControl, KeywordType, KeywordBoolean, KeywordConstant, Meta, Number,
            SymbolOther, SymbolNormal, SymbolImportant, String, StringEscape, Tag,
        ];
        let ids: HashSet<_> = all.iter().map(|k| k.short_id()).collect();
        assert_eq!(ids.len(), all.len());
    }
}
