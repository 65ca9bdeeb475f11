//! Human-readable dump of a document tree, used by `quill ast`.

use std::fmt::Write;

use crate::ast::{Content, Display, GeneratedKind};

/// Formats `content` as an indented tree, one node per line.
///
/// ```
/// use quill_syntax::{parse_and_build, print_ast};
///
/// let source = "\\b[x]{hi}";
/// let dump = print_ast(source, &parse_and_build(source));
/// assert_eq!(
///     dump,
///     "Directive \\b\n  Argument\n    Text \"x\"\n  Block\n    Text \"hi\"\n"
/// );
/// ```
#[must_use]
pub fn print_ast(source: &str, content: &[Content]) -> String {
    let mut out = String::new();
    print_content(&mut out, source, content, 0);
    out
}

fn print_content(out: &mut String, source: &str, content: &[Content], depth: usize) {
    for piece in content {
        indent(out, depth);
        match piece {
            Content::Text(text) => {
                let _ = writeln!(out, "Text {:?}", text.text(source));
            }
            Content::Escaped(escaped) => {
                let _ = writeln!(out, "Escaped {:?}", escaped.char(source));
            }
            Content::Generated(generated) => {
                let kind = match generated.kind {
                    GeneratedKind::Plaintext => "plaintext",
                    GeneratedKind::Html => "html",
                };
                let display = match generated.display {
                    Display::None => "none",
                    Display::Block => "block",
                    Display::Inline => "inline",
                };
                let _ = writeln!(out, "Generated {kind} {display} {:?}", generated.data);
            }
            Content::Directive(directive) => {
                let _ = writeln!(out, "Directive \\{}", directive.name(source));
                for argument in &directive.arguments {
                    indent(out, depth + 1);
                    match argument.name(source) {
                        Some(name) => {
                            let _ = writeln!(out, "Argument {name}");
                        }
                        None => out.push_str("Argument\n"),
                    }
                    print_content(out, source, &argument.content, depth + 2);
                }
                if !directive.content.is_empty() {
                    indent(out, depth + 1);
                    out.push_str("Block\n");
                    print_content(out, source, &directive.content, depth + 2);
                }
            }
        }
    }
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::ast::Generated;
    use crate::builder::parse_and_build;

    #[test]
    fn test_print_named_argument_and_escape() {
        let source = "a\\{\\x[k=v]";
        let dump = print_ast(source, &parse_and_build(source));
        assert_eq!(
            dump,
            "Text \"a\"\nEscaped '{'\nDirective \\x\n  Argument k\n    Text \"v\"\n"
        );
    }

    #[test]
    fn test_print_generated() {
        let content = vec![Content::Generated(Generated::html("<br>"))];
        assert_eq!(print_ast("", &content), "Generated html inline \"<br>\"\n");
    }
}
