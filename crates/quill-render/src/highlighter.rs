//! Syntax highlighters used for embedded code.

use quill_syntax::highlight::{HighlightOptions, HighlightSpan, highlight_markup_source};

use crate::behavior::{Distant, closest_match};

/// Reason highlighting could not be applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum HighlightError {
    #[error("unsupported language")]
    UnsupportedLanguage,
    #[error("code could not be highlighted")]
    BadCode,
    #[error("highlighting failed")]
    Other,
}

/// Highlights plaintext code.
pub trait SyntaxHighlighter {
    /// Languages accepted by [`highlight`](Self::highlight), in no particular order.
    fn supported_languages(&self) -> &[&'static str];

    /// The supported language closest to `language`, for typo suggestions.
    fn match_supported_language(&self, language: &str) -> Option<Distant<&'static str>> {
        closest_match(language, self.supported_languages().iter().copied())
    }

    /// Returns spans over byte ranges of `code`.
    fn highlight(&self, code: &str, language: &str) -> Result<Vec<HighlightSpan>, HighlightError>;
}

/// Supports no languages.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSupportHighlighter;

impl SyntaxHighlighter for NoSupportHighlighter {
    fn supported_languages(&self) -> &[&'static str] {
        &[]
    }

    fn highlight(&self, _code: &str, _language: &str) -> Result<Vec<HighlightSpan>, HighlightError> {
        Err(HighlightError::UnsupportedLanguage)
    }
}

/// Highlights Quill markup itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkupHighlighter {
    options: HighlightOptions,
}

impl MarkupHighlighter {
    /// Language name accepted by this highlighter.
    pub const LANGUAGE: &'static str = "quill";

    #[must_use]
    pub fn new(options: HighlightOptions) -> Self {
        Self { options }
    }
}

impl SyntaxHighlighter for MarkupHighlighter {
    fn supported_languages(&self) -> &[&'static str] {
        &[Self::LANGUAGE]
    }

    fn highlight(&self, code: &str, language: &str) -> Result<Vec<HighlightSpan>, HighlightError> {
        if language != Self::LANGUAGE {
            return Err(HighlightError::UnsupportedLanguage);
        }
        Ok(highlight_markup_source(code, self.options))
    }
}

#[cfg(test)]
mod tests {
    use quill_syntax::HighlightKind;

    use super::*;

    #[test]
    fn test_no_support() {
        assert_eq!(
            NoSupportHighlighter.highlight("x", "rust"),
            Err(HighlightError::UnsupportedLanguage)
        );
        assert!(NoSupportHighlighter.match_supported_language("rust").is_none());
    }

    #[test]
    fn test_markup_highlighter() {
        let highlighter = MarkupHighlighter::default();
        let spans = highlighter.highlight("\\b", "quill").unwrap();
        assert_eq!(spans, vec![HighlightSpan::new(0, 2, HighlightKind::Tag)]);
        assert_eq!(
            highlighter.highlight("x", "qill"),
            Err(HighlightError::UnsupportedLanguage)
        );
    }

    #[test]
    fn test_match_supported_language() {
        let best = MarkupHighlighter::default()
            .match_supported_language("qill")
            .unwrap();
        assert_eq!(best.value, "quill");
        assert_eq!(best.distance, 1);
    }
}
