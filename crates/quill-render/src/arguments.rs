//! Matching directive arguments against declared parameters.

use bumpalo::Bump;
use bumpalo::collections::Vec as BumpVec;
use quill_syntax::{Argument, Directive};

use crate::context::Context;

/// Outcome of matching one argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentStatus {
    /// Bound to a parameter.
    Ok,
    /// No parameter was left for it, or its name is not a parameter.
    Unmatched,
    /// Named after a parameter that an earlier argument already bound.
    DuplicateNamed,
}

/// Binds the arguments of a directive to a fixed list of parameters.
///
/// Named arguments bind to the parameter of the same name. Positional
/// arguments then fill the remaining parameters in declaration order.
///
/// ```
/// use bumpalo::Bump;
/// use quill_render::{ArgumentMatcher, ArgumentStatus};
/// use quill_syntax::{Content, parse_and_build};
///
/// let source = "\\x[second=2, 1, 3]";
/// let content = parse_and_build(source);
/// let Content::Directive(directive) = &content[0] else { unreachable!() };
///
/// let arena = Bump::new();
/// let mut matcher = ArgumentMatcher::new(&["first", "second"], &arena);
/// matcher.match_arguments(&directive.arguments, source);
/// assert_eq!(matcher.argument_index("first"), Some(1));
/// assert_eq!(matcher.argument_index("second"), Some(0));
/// assert_eq!(matcher.statuses()[2], ArgumentStatus::Unmatched);
/// ```
#[derive(Debug)]
pub struct ArgumentMatcher<'p, 'b> {
    parameters: &'p [&'p str],
    /// For each parameter, the index of the argument bound to it.
    bound: BumpVec<'b, Option<usize>>,
    /// For each argument, whether and how it was matched.
    statuses: BumpVec<'b, ArgumentStatus>,
}

impl<'p, 'b> ArgumentMatcher<'p, 'b> {
    #[must_use]
    pub fn new(parameters: &'p [&'p str], arena: &'b Bump) -> Self {
        Self {
            parameters,
            bound: BumpVec::new_in(arena),
            statuses: BumpVec::new_in(arena),
        }
    }

    /// Matches `arguments`, replacing the result of any earlier call.
    pub fn match_arguments(&mut self, arguments: &[Argument], source: &str) {
        self.bound.clear();
        self.bound.resize(self.parameters.len(), None);
        self.statuses.clear();
        self.statuses.resize(arguments.len(), ArgumentStatus::Unmatched);

        for (i, argument) in arguments.iter().enumerate() {
            let Some(name) = argument.name(source) else {
                continue;
            };
            let Some(parameter) = self.parameters.iter().position(|p| *p == name) else {
                continue;
            };
            if self.bound[parameter].is_some() {
                self.statuses[i] = ArgumentStatus::DuplicateNamed;
            } else {
                self.bound[parameter] = Some(i);
                self.statuses[i] = ArgumentStatus::Ok;
            }
        }

        let mut next_parameter = 0;
        for (i, argument) in arguments.iter().enumerate() {
            if argument.has_name() {
                continue;
            }
            while next_parameter < self.bound.len() && self.bound[next_parameter].is_some() {
                next_parameter += 1;
            }
            if next_parameter == self.bound.len() {
                break;
            }
            self.bound[next_parameter] = Some(i);
            self.statuses[i] = ArgumentStatus::Ok;
        }
    }

    /// Index of the argument bound to `parameter`.
    #[must_use]
    pub fn argument_index(&self, parameter: &str) -> Option<usize> {
        let index = self.parameters.iter().position(|p| *p == parameter)?;
        self.bound.get(index).copied().flatten()
    }

    /// Status of each argument, in argument order.
    #[must_use]
    pub fn statuses(&self) -> &[ArgumentStatus] {
        &self.statuses
    }

    #[must_use]
    pub fn parameters(&self) -> &'p [&'p str] {
        self.parameters
    }

    /// Reports every argument that was not bound.
    pub fn diagnose_unmatched(&self, directive: &Directive, context: &Context<'_>) {
        for (argument, status) in directive.arguments.iter().zip(self.statuses.iter()) {
            match status {
                ArgumentStatus::Ok => {}
                ArgumentStatus::Unmatched => context.try_warning(
                    "arguments.unmatched",
                    argument.span,
                    "This argument does not match any parameter and was ignored.",
                ),
                ArgumentStatus::DuplicateNamed => context.try_warning(
                    "arguments.duplicate",
                    argument.span,
                    "This argument names a parameter that was already given and was ignored.",
                ),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use quill_syntax::{Content, parse_and_build};

    use super::*;

    fn match_source<'b>(
        source: &str,
        parameters: &'static [&'static str],
        arena: &'b Bump,
    ) -> ArgumentMatcher<'static, 'b> {
        let content = parse_and_build(source);
        let Content::Directive(directive) = &content[0] else {
            panic!("expected directive");
        };
        let mut matcher = ArgumentMatcher::new(parameters, arena);
        matcher.match_arguments(&directive.arguments, source);
        matcher
    }

    #[test]
    fn test_positional_in_order() {
        let arena = Bump::new();
        let matcher = match_source("\\x[a, b]", &["first", "second"], &arena);
        assert_eq!(matcher.argument_index("first"), Some(0));
        assert_eq!(matcher.argument_index("second"), Some(1));
        assert_eq!(matcher.statuses(), &[ArgumentStatus::Ok, ArgumentStatus::Ok]);
    }

    #[test]
    fn test_named_takes_precedence() {
        let arena = Bump::new();
        let matcher = match_source("\\x[a, first=b]", &["first", "second"], &arena);
        assert_eq!(matcher.argument_index("first"), Some(1));
        assert_eq!(matcher.argument_index("second"), Some(0));
    }

    #[test]
    fn test_duplicate_named() {
        let arena = Bump::new();
        let matcher = match_source("\\x[var=a, var=b]", &["var"], &arena);
        assert_eq!(
            matcher.statuses(),
            &[ArgumentStatus::Ok, ArgumentStatus::DuplicateNamed]
        );
    }

    #[test]
    fn test_unknown_name_and_surplus() {
        let arena = Bump::new();
        let matcher = match_source("\\x[other=a, b, c]", &["var"], &arena);
        assert_eq!(
            matcher.statuses(),
            &[
                ArgumentStatus::Unmatched,
                ArgumentStatus::Ok,
                ArgumentStatus::Unmatched
            ]
        );
        assert_eq!(matcher.argument_index("var"), Some(1));
        assert_eq!(matcher.argument_index("missing"), None);
    }

    #[test]
    fn test_missing_argument() {
        let arena = Bump::new();
        let matcher = match_source("\\x", &["var"], &arena);
        assert_eq!(matcher.argument_index("var"), None);
        assert!(matcher.statuses().is_empty());
    }
}
