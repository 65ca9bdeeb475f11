//! Conversion of content to plaintext.

use quill_syntax::{Content, Directive, GeneratedKind};

use crate::behavior::Category;
use crate::context::Context;

/// How complete a plaintext conversion was.
///
/// Ordered so that the status of a sequence is the maximum of its parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum PlaintextStatus {
    #[default]
    Ok,
    /// Some content had no plaintext form and was left out.
    SomeIgnored,
    /// A directive could not be resolved.
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaintextMode {
    #[default]
    Normal,
    /// Only run directives that cannot have side effects.
    ///
    /// Formatting directives contribute their content; other directives
    /// except pure plaintext ones are skipped.
    NoSideEffects,
}

/// Appends the plaintext of `content` to `out`.
pub fn to_plaintext(out: &mut String, content: &[Content], context: &mut Context<'_>) -> PlaintextStatus {
    to_plaintext_with_mode(out, content, context, PlaintextMode::Normal)
}

pub fn to_plaintext_with_mode(
    out: &mut String,
    content: &[Content],
    context: &mut Context<'_>,
    mode: PlaintextMode,
) -> PlaintextStatus {
    content
        .iter()
        .map(|piece| piece_to_plaintext(out, piece, context, mode))
        .fold(PlaintextStatus::Ok, Ord::max)
}

fn piece_to_plaintext(
    out: &mut String,
    piece: &Content,
    context: &mut Context<'_>,
    mode: PlaintextMode,
) -> PlaintextStatus {
    match piece {
        Content::Text(text) => {
            out.push_str(text.text(context.source()));
            PlaintextStatus::Ok
        }
        Content::Escaped(escaped) => {
            out.push_str(escaped.char_str(context.source()));
            PlaintextStatus::Ok
        }
        Content::Generated(generated) => match generated.kind {
            GeneratedKind::Plaintext => {
                out.push_str(&generated.data);
                PlaintextStatus::Ok
            }
            GeneratedKind::Html => PlaintextStatus::SomeIgnored,
        },
        Content::Directive(directive) => directive_to_plaintext(out, directive, context, mode),
    }
}

/// Appends the plaintext of a single directive to `out`.
pub fn directive_to_plaintext(
    out: &mut String,
    directive: &Directive,
    context: &mut Context<'_>,
    mode: PlaintextMode,
) -> PlaintextStatus {
    let Some(behavior) = context.find_directive(directive) else {
        context.try_lookup_error(directive);
        try_render_error_plaintext(out, directive, context);
        return PlaintextStatus::Error;
    };

    match (behavior.category(), mode) {
        (Category::PurePlaintext, _) | (_, PlaintextMode::Normal) => {
            behavior.render_plaintext(out, directive, context);
            PlaintextStatus::Ok
        }
        (Category::Formatting, PlaintextMode::NoSideEffects) => {
            to_plaintext_with_mode(out, &directive.content, context, PlaintextMode::NoSideEffects)
        }
        (_, PlaintextMode::NoSideEffects) => PlaintextStatus::SomeIgnored,
    }
}

/// Renders `directive` with the error behavior, if the context has one.
pub fn try_render_error_plaintext(out: &mut String, directive: &Directive, context: &mut Context<'_>) {
    if let Some(behavior) = context.error_behavior() {
        behavior.render_plaintext(out, directive, context);
    }
}

#[cfg(test)]
mod tests {
    use bumpalo::Bump;
    use pretty_assertions::assert_eq;
    use quill_syntax::{Generated, parse_and_build};

    use super::*;
    use crate::builtins::BuiltinDirectiveSet;
    use crate::context::Variables;
    use crate::diagnostic::{CollectingLogger, Severity};

    fn plaintext(source: &str, mode: PlaintextMode) -> (String, PlaintextStatus) {
        let content = parse_and_build(source);
        let builtins = BuiltinDirectiveSet::new();
        let mut variables = Variables::new();
        let arena = Bump::new();
        let mut context = Context::new(source, &mut variables, &arena).with_resolver(&builtins);
        let mut out = String::new();
        let status = to_plaintext_with_mode(&mut out, &content, &mut context, mode);
        (out, status)
    }

    #[test]
    fn test_text_round_trips() {
        let source = "plain text, with [brackets] and {braces}\n";
        assert_eq!(
            plaintext(source, PlaintextMode::Normal),
            (source.to_owned(), PlaintextStatus::Ok)
        );
    }

    #[test]
    fn test_escapes() {
        assert_eq!(
            plaintext("\\{\\}", PlaintextMode::Normal),
            ("{}".to_owned(), PlaintextStatus::Ok)
        );
    }

    #[test]
    fn test_formatting_passes_content_through() {
        assert_eq!(
            plaintext("a \\b{bold \\i{and italic}} z", PlaintextMode::NoSideEffects),
            ("a bold and italic z".to_owned(), PlaintextStatus::Ok)
        );
    }

    #[test]
    fn test_no_side_effects_skips_meta() {
        let (out, status) = plaintext("a\\set[x]{1}b", PlaintextMode::NoSideEffects);
        assert_eq!(out, "ab");
        assert_eq!(status, PlaintextStatus::SomeIgnored);
    }

    #[test]
    fn test_modes_differ_for_html_mixed_and_meta() {
        let source = "<\\html-div{x}|\\code{y}|\\set[v]{z}>";
        let content = parse_and_build(source);
        let builtins = BuiltinDirectiveSet::new();

        let mut variables = Variables::new();
        let arena = Bump::new();
        let mut context = Context::new(source, &mut variables, &arena).with_resolver(&builtins);
        let mut out = String::new();
        let status = to_plaintext_with_mode(&mut out, &content, &mut context, PlaintextMode::Normal);
        assert_eq!(out, "<|y|>");
        assert_eq!(status, PlaintextStatus::Ok);
        assert_eq!(variables.get("v"), Some("z"));

        let mut variables = Variables::new();
        let mut context = Context::new(source, &mut variables, &arena).with_resolver(&builtins);
        let mut out = String::new();
        let status =
            to_plaintext_with_mode(&mut out, &content, &mut context, PlaintextMode::NoSideEffects);
        assert_eq!(out, "<||>");
        assert_eq!(status, PlaintextStatus::SomeIgnored);
        assert_eq!(variables.get("v"), None);
    }

    #[test]
    fn test_generated_html_is_ignored() {
        let content = vec![
            Content::Generated(Generated::plaintext("x")),
            Content::Generated(Generated::html("<br>")),
        ];
        let mut variables = Variables::new();
        let arena = Bump::new();
        let mut context = Context::new("", &mut variables, &arena);
        let mut out = String::new();
        let status = to_plaintext(&mut out, &content, &mut context);
        assert_eq!(out, "x");
        assert_eq!(status, PlaintextStatus::SomeIgnored);
    }

    #[test]
    fn test_unresolved_directive() {
        let source = "a\\nope{b}";
        let content = parse_and_build(source);
        let builtins = BuiltinDirectiveSet::new();
        let logger = CollectingLogger::new(Severity::Debug);
        let mut variables = Variables::new();
        let arena = Bump::new();
        let mut context = Context::new(source, &mut variables, &arena)
            .with_resolver(&builtins)
            .with_logger(&logger);
        let mut out = String::new();
        let status = to_plaintext(&mut out, &content, &mut context);
        assert_eq!(out, "a");
        assert_eq!(status, PlaintextStatus::Error);
        assert_eq!(logger.ids(), vec!["directive_lookup.unresolved"]);
    }

    #[test]
    fn test_status_order() {
        assert!(PlaintextStatus::Ok < PlaintextStatus::SomeIgnored);
        assert!(PlaintextStatus::SomeIgnored < PlaintextStatus::Error);
    }
}
