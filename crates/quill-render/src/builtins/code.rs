use quill_syntax::{Directive, Display, SourceSpan};

use crate::arguments::ArgumentMatcher;
use crate::behavior::{Category, DirectiveBehavior, preprocess, preprocess_matched_arguments};
use crate::context::{Context, MAX_SUGGESTION_DISTANCE};
use crate::highlighter::HighlightError;
use crate::highlighting::to_html_syntax_highlighted;
use crate::html::{HtmlMode, argument_to_plaintext, to_html};
use crate::html_writer::HtmlWriter;
use crate::plaintext::to_plaintext;

const LANG_PARAMETER: &str = "lang";
const PARAMETERS: &[&str] = &[LANG_PARAMETER];

/// `\code[lang]{...}` and `\codeblock[lang]{...}`.
///
/// The content is syntax highlighted when a language is given. If
/// highlighting fails, a warning is reported and the content is rendered
/// without highlighting.
#[derive(Debug, Clone, Copy)]
pub(super) struct CodeBehavior {
    display: Display,
    /// Wrap in `<pre>` and trim the content.
    block: bool,
}

impl CodeBehavior {
    pub(super) const fn inline() -> Self {
        Self {
            display: Display::Inline,
            block: false,
        }
    }

    pub(super) const fn block() -> Self {
        Self {
            display: Display::Block,
            block: true,
        }
    }

    const fn mode(self) -> HtmlMode {
        if self.block {
            HtmlMode::Trimmed
        } else {
            HtmlMode::Direct
        }
    }

    fn render_code(self, out: &mut HtmlWriter, directive: &Directive, context: &mut Context<'_>) {
        let mut matcher = ArgumentMatcher::new(PARAMETERS, context.transient());
        matcher.match_arguments(&directive.arguments, context.source());
        let mut language = String::new();
        argument_to_plaintext(&mut language, directive, &matcher, LANG_PARAMETER, context);
        let language = language.trim();

        if language.is_empty() {
            to_html(out, &directive.content, context, self.mode());
            return;
        }
        // Projecting runs pure plaintext directives, so an unsupported language
        // is rejected first to keep their diagnostics from being reported twice.
        let supported = context
            .highlighter()
            .supported_languages()
            .iter()
            .any(|&supported| supported == language);
        let result = if supported {
            to_html_syntax_highlighted(out, &directive.content, language, context, self.mode())
        } else {
            Err(HighlightError::UnsupportedLanguage)
        };
        let Err(error) = result else {
            return;
        };

        let span = matcher
            .argument_index(LANG_PARAMETER)
            .map_or(directive.span, |i| directive.arguments[i].span);
        diagnose_highlight_error(error, language, span, context);
        to_html(out, &directive.content, context, self.mode());
    }
}

fn diagnose_highlight_error(error: HighlightError, language: &str, span: SourceSpan, context: &Context<'_>) {
    match error {
        HighlightError::UnsupportedLanguage => {
            let suggestion = context
                .highlighter()
                .match_supported_language(language)
                .filter(|best| best.distance <= MAX_SUGGESTION_DISTANCE);
            let message = match suggestion {
                Some(best) => format!(
                    "Unable to highlight language \"{language}\". Did you mean \"{}\"?",
                    best.value
                ),
                None => format!("Unable to highlight language \"{language}\"."),
            };
            context.try_warning("highlight.language", span, message);
        }
        HighlightError::BadCode => context.try_warning(
            "highlight.malformed",
            span,
            format!("The code could not be highlighted as \"{language}\"."),
        ),
        HighlightError::Other => context.try_warning(
            "highlight.error",
            span,
            "Highlighting failed for an unknown reason.",
        ),
    }
}

impl DirectiveBehavior for CodeBehavior {
    fn category(&self) -> Category {
        Category::Mixed
    }

    fn display(&self) -> Display {
        self.display
    }

    fn preprocess(&self, directive: &Directive, context: &mut Context<'_>) {
        let mut matcher = ArgumentMatcher::new(PARAMETERS, context.transient());
        matcher.match_arguments(&directive.arguments, context.source());
        matcher.diagnose_unmatched(directive, context);
        preprocess_matched_arguments(directive, matcher.statuses(), context);
        preprocess(&directive.content, context);
    }

    fn render_plaintext(&self, out: &mut String, directive: &Directive, context: &mut Context<'_>) {
        to_plaintext(out, &directive.content, context);
    }

    fn render_html(&self, out: &mut HtmlWriter, directive: &Directive, context: &mut Context<'_>) {
        if self.block {
            out.open_tag("pre");
        }
        out.open_tag("code");
        self.render_code(out, directive, context);
        out.close_tag("code");
        if self.block {
            out.close_tag("pre");
        }
    }
}

#[cfg(test)]
mod tests {
    use bumpalo::Bump;
    use pretty_assertions::assert_eq;
    use quill_syntax::parse_and_build;

    use super::super::BuiltinDirectiveSet;
    use super::super::tests::{render_html, render_plaintext};
    use crate::context::{Context, Variables};
    use crate::diagnostic::{CollectingLogger, Severity};
    use crate::highlighter::MarkupHighlighter;
    use crate::html::{HtmlMode, to_html};
    use crate::html_writer::HtmlWriter;

    fn render_with_highlighter(source: &str, logger: &CollectingLogger) -> String {
        let content = parse_and_build(source);
        let builtins = BuiltinDirectiveSet::new();
        let highlighter = MarkupHighlighter::default();
        let mut variables = Variables::new();
        let arena = Bump::new();
        let mut context = Context::new(source, &mut variables, &arena)
            .with_resolver(&builtins)
            .with_highlighter(&highlighter)
            .with_logger(logger);
        let mut out = HtmlWriter::new();
        to_html(&mut out, &content, &mut context, HtmlMode::Direct);
        out.into_string()
    }

    #[test]
    fn test_code_without_language() {
        assert_eq!(render_html("\\code{a < b}"), "<code>a &lt; b</code>");
        assert_eq!(render_plaintext("\\code{x}"), "x");
    }

    #[test]
    fn test_codeblock_is_trimmed() {
        assert_eq!(
            render_html("\\codeblock{\n  x\n}"),
            "<pre><code>x</code></pre>"
        );
    }

    #[test]
    fn test_code_highlighted() {
        let logger = CollectingLogger::new(Severity::Debug);
        assert_eq!(
            render_with_highlighter("\\code[quill]{\\\\b}", &logger),
            "<code><h- data-h=tag>\\</h-><h- data-h=tag>b</h-></code>"
        );
        assert!(logger.is_empty());
    }

    #[test]
    fn test_unsupported_language_falls_back() {
        let logger = CollectingLogger::new(Severity::Debug);
        assert_eq!(
            render_with_highlighter("\\code[qill]{x}", &logger),
            "<code>x</code>"
        );
        let diagnostics = logger.take();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].id, "highlight.language");
        assert!(diagnostics[0].message.contains("Did you mean \"quill\"?"));
    }

    #[test]
    fn test_unsupported_language_runs_content_once() {
        let logger = CollectingLogger::new(Severity::Debug);
        assert_eq!(
            render_with_highlighter("\\code[qill]{a\\get[missing]}", &logger),
            "<code>a</code>"
        );
        assert_eq!(logger.ids(), vec!["highlight.language", "variable.undefined"]);
    }
}
