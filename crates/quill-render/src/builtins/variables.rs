use quill_syntax::{Directive, Display};

use crate::arguments::ArgumentMatcher;
use crate::behavior::{Category, DirectiveBehavior, preprocess, preprocess_matched_arguments};
use crate::context::Context;
use crate::html::argument_to_plaintext;
use crate::html_writer::HtmlWriter;
use crate::plaintext::to_plaintext;

const VAR_PARAMETER: &str = "var";
const PARAMETERS: &[&str] = &[VAR_PARAMETER];

/// Matches the arguments of a variable directive and evaluates the variable name.
///
/// Returns `None` and reports a warning if no name was given.
fn variable_name(directive: &Directive, context: &mut Context<'_>) -> Option<String> {
    let mut matcher = ArgumentMatcher::new(PARAMETERS, context.transient());
    matcher.match_arguments(&directive.arguments, context.source());

    let mut name = String::new();
    if !argument_to_plaintext(&mut name, directive, &matcher, VAR_PARAMETER, context) {
        context.try_warning(
            "variable.no_name",
            directive.span,
            "A variable name must be given, such as \\get[var=name].",
        );
        return None;
    }
    Some(name)
}

fn preprocess_variable_directive(directive: &Directive, context: &mut Context<'_>) {
    let mut matcher = ArgumentMatcher::new(PARAMETERS, context.transient());
    matcher.match_arguments(&directive.arguments, context.source());
    matcher.diagnose_unmatched(directive, context);
    preprocess_matched_arguments(directive, matcher.statuses(), context);
}

/// `\get[var]`: the value of a variable.
#[derive(Debug, Clone, Copy)]
pub(super) struct GetVariableBehavior;

impl GetVariableBehavior {
    fn value(directive: &Directive, context: &mut Context<'_>) -> Option<String> {
        let name = variable_name(directive, context)?;
        let value = context.variables().get(&name).map(str::to_owned);
        if value.is_none() {
            context.try_soft_warning(
                "variable.undefined",
                directive.span,
                format!("The variable \"{name}\" is not defined."),
            );
        }
        value
    }
}

impl DirectiveBehavior for GetVariableBehavior {
    fn category(&self) -> Category {
        Category::PurePlaintext
    }

    fn display(&self) -> Display {
        Display::Inline
    }

    fn preprocess(&self, directive: &Directive, context: &mut Context<'_>) {
        preprocess_variable_directive(directive, context);
    }

    fn render_plaintext(&self, out: &mut String, directive: &Directive, context: &mut Context<'_>) {
        if let Some(value) = Self::value(directive, context) {
            out.push_str(&value);
        }
    }

    fn render_html(&self, out: &mut HtmlWriter, directive: &Directive, context: &mut Context<'_>) {
        if let Some(value) = Self::value(directive, context) {
            out.write_inner_text(&value);
        }
    }
}

/// `\set[var]{value}`: assigns the plaintext of the content to a variable.
///
/// Assignments run while preprocessing, so a variable can be read before the
/// directive that sets it, and again during generation, so reads after a
/// directive see its value.
#[derive(Debug, Clone, Copy)]
pub(super) struct SetVariableBehavior;

impl SetVariableBehavior {
    fn assign(directive: &Directive, context: &mut Context<'_>) {
        let Some(name) = variable_name(directive, context) else {
            return;
        };
        let mut value = String::new();
        to_plaintext(&mut value, &directive.content, context);
        tracing::debug!(name = %name, "set variable");
        context.variables_mut().set(&name, value);
    }
}

impl DirectiveBehavior for SetVariableBehavior {
    fn category(&self) -> Category {
        Category::Meta
    }

    fn display(&self) -> Display {
        Display::None
    }

    fn preprocess(&self, directive: &Directive, context: &mut Context<'_>) {
        preprocess_variable_directive(directive, context);
        preprocess(&directive.content, context);
        Self::assign(directive, context);
    }

    fn render_plaintext(&self, _out: &mut String, directive: &Directive, context: &mut Context<'_>) {
        Self::assign(directive, context);
    }

    fn render_html(&self, _out: &mut HtmlWriter, directive: &Directive, context: &mut Context<'_>) {
        Self::assign(directive, context);
    }
}
