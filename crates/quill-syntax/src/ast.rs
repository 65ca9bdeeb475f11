//! Document tree.
//!
//! Nodes store spans into the source rather than text, so the source must be
//! passed back in to read names and text. The one exception is
//! [`Generated`], which carries its own data and has no position.

use crate::span::SourceSpan;

/// How content participates in paragraph splitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Display {
    /// Does not affect paragraphs.
    #[default]
    None,
    /// Closes any open paragraph.
    Block,
    /// Opens a paragraph if none is open.
    Inline,
}

/// What the data of a [`Generated`] node is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeneratedKind {
    Plaintext,
    Html,
}

/// A piece of document content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Text(Text),
    Escaped(Escaped),
    Directive(Directive),
    Generated(Generated),
}

impl Content {
    /// Returns `true` for content that appears in the source (everything but [`Generated`]).
    #[must_use]
    pub fn is_user_written(&self) -> bool {
        !matches!(self, Self::Generated(_))
    }

    /// Source span of user-written content.
    #[must_use]
    pub fn span(&self) -> Option<SourceSpan> {
        match self {
            Self::Text(t) => Some(t.span),
            Self::Escaped(e) => Some(e.span),
            Self::Directive(d) => Some(d.span),
            Self::Generated(_) => None,
        }
    }

    /// The source text of user-written content, or the data of generated content.
    #[must_use]
    pub fn source_text<'a>(&'a self, source: &'a str) -> &'a str {
        match self {
            Self::Generated(g) => &g.data,
            _ => self.span().map_or("", |span| span.slice(source)),
        }
    }
}

impl From<Text> for Content {
    fn from(value: Text) -> Self {
        Self::Text(value)
    }
}

impl From<Escaped> for Content {
    fn from(value: Escaped) -> Self {
        Self::Escaped(value)
    }
}

impl From<Directive> for Content {
    fn from(value: Directive) -> Self {
        Self::Directive(value)
    }
}

impl From<Generated> for Content {
    fn from(value: Generated) -> Self {
        Self::Generated(value)
    }
}

/// Literal source text. Never empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Text {
    pub span: SourceSpan,
}

impl Text {
    #[must_use]
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        self.span.slice(source)
    }
}

/// A backslash followed by one escapable character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Escaped {
    pub span: SourceSpan,
}

impl Escaped {
    /// Index of the escaped character in the source.
    #[must_use]
    pub const fn char_index(&self) -> usize {
        self.span.begin + 1
    }

    /// The escaped character.
    #[must_use]
    pub fn char(&self, source: &str) -> char {
        char::from(source.as_bytes()[self.char_index()])
    }

    /// The escaped character as a one-character string slice of the source.
    #[must_use]
    pub fn char_str<'a>(&self, source: &'a str) -> &'a str {
        &source[self.char_index()..self.span.end()]
    }
}

/// A user-written directive such as `\b[id=x]{text}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    /// Span from the backslash to the end of the block or argument list.
    pub span: SourceSpan,
    /// Length of the name, excluding the backslash.
    pub name_length: usize,
    pub arguments: Vec<Argument>,
    pub content: Vec<Content>,
}

impl Directive {
    /// The directive name without the leading backslash.
    #[must_use]
    pub fn name<'a>(&self, source: &'a str) -> &'a str {
        let begin = self.span.begin + 1;
        &source[begin..begin + self.name_length]
    }

    /// Span of the name, excluding the backslash.
    #[must_use]
    pub const fn name_span(&self) -> SourceSpan {
        SourceSpan::new(self.span.begin + 1, self.name_length)
    }

    /// The full source text of the directive.
    #[must_use]
    pub fn source_text<'a>(&self, source: &'a str) -> &'a str {
        self.span.slice(source)
    }
}

/// One argument of a directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    pub span: SourceSpan,
    /// Span of the name; empty for positional arguments.
    pub name_span: SourceSpan,
    pub content: Vec<Content>,
}

impl Argument {
    #[must_use]
    pub const fn has_name(&self) -> bool {
        !self.name_span.is_empty()
    }

    /// The argument name, if this is a named argument.
    #[must_use]
    pub fn name<'a>(&self, source: &'a str) -> Option<&'a str> {
        self.has_name().then(|| self.name_span.slice(source))
    }
}

/// Content synthesized during rendering or highlighting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated {
    pub data: String,
    pub kind: GeneratedKind,
    pub display: Display,
}

impl Generated {
    #[must_use]
    pub fn new(data: impl Into<String>, kind: GeneratedKind, display: Display) -> Self {
        Self {
            data: data.into(),
            kind,
            display,
        }
    }

    /// Inline HTML.
    #[must_use]
    pub fn html(data: impl Into<String>) -> Self {
        Self::new(data, GeneratedKind::Html, Display::Inline)
    }

    /// Inline plaintext.
    #[must_use]
    pub fn plaintext(data: impl Into<String>) -> Self {
        Self::new(data, GeneratedKind::Plaintext, Display::Inline)
    }
}
