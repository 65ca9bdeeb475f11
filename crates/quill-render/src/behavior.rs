//! Directive behaviors and name resolution.

use quill_syntax::{Content, Directive, Display};

use crate::arguments::ArgumentStatus;

use crate::context::Context;
use crate::html_writer::HtmlWriter;

/// Classification of what a directive produces.
///
/// The category decides how a directive is treated when it appears inside an
/// HTML attribute value or inside syntax-highlighted content. It is a
/// contract of the behavior and not checked at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Produces neither plaintext nor HTML, such as `\comment`.
    Meta,
    /// Produces only plaintext, regardless of content and arguments.
    ///
    /// Highlighting replaces such directives with their output.
    PurePlaintext,
    /// Produces only HTML, such as `\html{...}`.
    PureHtml,
    /// Wraps its content in formatting, such as `\b{...}`.
    ///
    /// Highlighting recurses into the content.
    Formatting,
    /// Produces both; treated like [`Category::PureHtml`] by highlighting.
    Mixed,
}

/// Implementation of one or more directives.
///
/// Behaviors are shared and immutable; everything that changes during
/// processing lives in the [`Context`].
pub trait DirectiveBehavior {
    fn category(&self) -> Category;

    fn display(&self) -> Display;

    /// Runs before any output is generated.
    ///
    /// Behaviors that evaluate their arguments should preprocess the matched
    /// argument content here. The default does nothing.
    fn preprocess(&self, directive: &Directive, context: &mut Context<'_>) {
        let _ = (directive, context);
    }

    fn render_plaintext(&self, out: &mut String, directive: &Directive, context: &mut Context<'_>);

    fn render_html(&self, out: &mut HtmlWriter, directive: &Directive, context: &mut Context<'_>);
}

/// Runs the preprocessing pass over `content`.
///
/// Unresolved directives are skipped here; they are reported during generation.
pub fn preprocess(content: &[Content], context: &mut Context<'_>) {
    for piece in content {
        if let Content::Directive(directive) = piece
            && let Some(behavior) = context.find_directive(directive)
        {
            behavior.preprocess(directive, context);
        }
    }
}

/// Preprocesses the content of every argument of `directive`.
pub fn preprocess_arguments(directive: &Directive, context: &mut Context<'_>) {
    for argument in &directive.arguments {
        preprocess(&argument.content, context);
    }
}

/// Preprocesses the content of the arguments that matched a parameter.
pub fn preprocess_matched_arguments(
    directive: &Directive,
    statuses: &[ArgumentStatus],
    context: &mut Context<'_>,
) {
    for (argument, status) in directive.arguments.iter().zip(statuses) {
        if *status == ArgumentStatus::Ok {
            preprocess(&argument.content, context);
        }
    }
}

/// A value together with its edit distance from what was asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Distant<T> {
    pub value: T,
    pub distance: usize,
}

/// Maps directive names to behaviors.
pub trait NameResolver {
    fn resolve(&self, name: &str) -> Option<&dyn DirectiveBehavior>;

    /// The known name closest to `name`, used for "did you mean" suggestions.
    fn fuzzy_resolve(&self, name: &str) -> Option<Distant<String>> {
        let _ = name;
        None
    }
}

/// Finds the candidate closest to `name` by Levenshtein distance.
pub fn closest_match<'c>(
    name: &str,
    candidates: impl IntoIterator<Item = &'c str>,
) -> Option<Distant<&'c str>> {
    candidates
        .into_iter()
        .map(|candidate| Distant {
            value: candidate,
            distance: strsim::levenshtein(name, candidate),
        })
        .min_by_key(|d| d.distance)
}
