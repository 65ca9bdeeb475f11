//! Character classes and small string helpers shared by the parser and renderer.

/// Characters that form an escape sequence when preceded by `\`.
pub const ESCAPABLE: &[u8] = b"\\[]{},";

/// Returns `true` if `\` followed by `c` is an escape sequence.
#[must_use]
pub fn is_escapable(c: u8) -> bool {
    ESCAPABLE.contains(&c)
}

/// ASCII blank characters: tab, line feed, vertical tab, form feed, carriage return, space.
#[must_use]
pub const fn is_ascii_blank_byte(c: u8) -> bool {
    matches!(c, b'\t' | b'\n' | 0x0b | 0x0c | b'\r' | b' ')
}

fn is_ascii_blank_char(c: char) -> bool {
    u8::try_from(c).is_ok_and(is_ascii_blank_byte)
}

/// Returns `true` if `text` consists only of ASCII blanks (including the empty string).
#[must_use]
pub fn is_ascii_blank(text: &str) -> bool {
    text.bytes().all(is_ascii_blank_byte)
}

#[must_use]
pub fn trim_ascii_blank_left(text: &str) -> &str {
    text.trim_start_matches(is_ascii_blank_char)
}

#[must_use]
pub fn trim_ascii_blank_right(text: &str) -> &str {
    text.trim_end_matches(is_ascii_blank_char)
}

#[must_use]
pub fn trim_ascii_blank(text: &str) -> &str {
    trim_ascii_blank_right(trim_ascii_blank_left(text))
}

/// Returns `true` if `c` may appear in a directive or argument name.
///
/// Names additionally may not start with an ASCII digit; see [`is_name_start`].
#[must_use]
pub fn is_name_char(c: char) -> bool {
    if c.is_ascii() {
        c.is_ascii_alphanumeric() || c == '-' || c == '_'
    } else {
        c.is_alphanumeric()
    }
}

/// Returns `true` if `c` may begin a directive or argument name.
#[must_use]
pub fn is_name_start(c: char) -> bool {
    !c.is_ascii_digit() && is_name_char(c)
}

/// A run of blank lines found by [`find_blank_line_sequence`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlankLine {
    /// Offset of the first byte of the first blank line.
    pub begin: usize,
    /// Length of the run, including the final `\n`.
    pub length: usize,
}

impl BlankLine {
    #[must_use]
    pub const fn end(self) -> usize {
        self.begin + self.length
    }
}

/// Finds the first sequence of blank lines in `text`.
///
/// A blank line consists of ASCII blanks only and is terminated by `\n`,
/// which is part of the line. The start of `text` counts as the start of a line,
/// so a leading `\n` is a blank line of length 1. Consecutive blank lines are merged.
///
/// # Example
///
/// ```
/// use quill_syntax::chars::{find_blank_line_sequence, BlankLine};
///
/// assert_eq!(find_blank_line_sequence("awoo"), None);
/// assert_eq!(
///     find_blank_line_sequence("awoo\n  \n"),
///     Some(BlankLine { begin: 5, length: 3 })
/// );
/// ```
#[must_use]
pub fn find_blank_line_sequence(text: &str) -> Option<BlankLine> {
    let bytes = text.as_bytes();
    let mut found: Option<BlankLine> = None;
    let mut line_start = 0;

    while let Some(offset) = bytes[line_start..].iter().position(|&b| b == b'\n') {
        let newline = line_start + offset;
        let line = &bytes[line_start..newline];
        if line.iter().copied().all(is_ascii_blank_byte) {
            let begin = found.map_or(line_start, |b| b.begin);
            found = Some(BlankLine {
                begin,
                length: newline + 1 - begin,
            });
        } else if found.is_some() {
            break;
        }
        line_start = newline + 1;
    }

    found
}

/// Returns `true` if `name` is usable as an HTML tag name.
#[must_use]
pub fn is_html_tag_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// Returns `true` if `name` is usable as an HTML attribute name.
#[must_use]
pub fn is_html_attribute_name(name: &str) -> bool {
    !name.is_empty()
        && name.chars().all(|c| {
            !c.is_whitespace() && !c.is_control() && !matches!(c, '"' | '\'' | '>' | '/' | '=')
        })
}

/// Returns `true` if `value` can be written as an attribute value without quotes.
#[must_use]
pub fn is_html_unquoted_attribute_value(value: &str) -> bool {
    value.chars().all(|c| {
        !c.is_ascii_whitespace() && !matches!(c, '"' | '\'' | '=' | '<' | '>' | '`')
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escapable() {
        for c in b"\\[]{}," {
            assert!(is_escapable(*c));
        }
        assert!(!is_escapable(b'a'));
        assert!(!is_escapable(b'='));
    }

    #[test]
    fn test_name_chars() {
        assert!(is_name_char('a'));
        assert!(is_name_char('Z'));
        assert!(is_name_char('7'));
        assert!(is_name_char('-'));
        assert!(is_name_char('ä'));
        for c in ['\\', '[', ']', '{', '}', ',', '=', ' '] {
            assert!(!is_name_char(c), "{c:?} must not be a name character");
        }
        assert!(!is_name_start('1'));
        assert!(is_name_start('b'));
    }

    #[test]
    fn test_trim_ascii_blank() {
        assert_eq!(trim_ascii_blank_left("\n\t\x0b\x0c\r awoo"), "awoo");
        assert_eq!(trim_ascii_blank_right("awoo\n\t\x0b\x0c\r "), "awoo");
        assert_eq!(trim_ascii_blank(" \n awoo\t"), "awoo");
        assert_eq!(trim_ascii_blank_left("awoo "), "awoo ");
    }

    #[test]
    fn test_is_ascii_blank() {
        assert!(is_ascii_blank(""));
        assert!(is_ascii_blank(" \n\t"));
        assert!(!is_ascii_blank(" a "));
    }

    #[test]
    fn test_find_blank_line_sequence() {
        assert_eq!(find_blank_line_sequence(""), None);
        assert_eq!(find_blank_line_sequence("awoo"), None);
        assert_eq!(find_blank_line_sequence("a\nw\no\no"), None);
        assert_eq!(
            find_blank_line_sequence("\nawoo"),
            Some(BlankLine {
                begin: 0,
                length: 1
            })
        );
        assert_eq!(
            find_blank_line_sequence("awoo\n  \n"),
            Some(BlankLine {
                begin: 5,
                length: 3
            })
        );
        assert_eq!(
            find_blank_line_sequence("aw\n\noo"),
            Some(BlankLine {
                begin: 3,
                length: 1
            })
        );
    }

    #[test]
    fn test_find_blank_line_sequence_merges_runs() {
        assert_eq!(
            find_blank_line_sequence("a\n\n \n\nb\n\nc"),
            Some(BlankLine {
                begin: 2,
                length: 4
            })
        );
    }

    #[test]
    fn test_is_html_tag_name() {
        assert!(is_html_tag_name("tag"));
        assert!(is_html_tag_name("tag-"));
        assert!(is_html_tag_name("tag-tag"));
        assert!(!is_html_tag_name(""));
        assert!(!is_html_tag_name("-"));
        assert!(!is_html_tag_name("-tag"));
    }

    #[test]
    fn test_is_html_attribute_name() {
        assert!(is_html_attribute_name("attr"));
        assert!(is_html_attribute_name("data-attr"));
        assert!(is_html_attribute_name("att<(){}[]&ss"));
        assert!(!is_html_attribute_name(""));
        assert!(!is_html_attribute_name("attr="));
        assert!(!is_html_attribute_name("at>tr"));
    }

    #[test]
    fn test_is_html_unquoted_attribute_value() {
        assert!(is_html_unquoted_attribute_value(""));
        assert!(is_html_unquoted_attribute_value("hyphen-value"));
        assert!(!is_html_unquoted_attribute_value("a b"));
        assert!(!is_html_unquoted_attribute_value("attr="));
        assert!(!is_html_unquoted_attribute_value("'val'"));
        assert!(!is_html_unquoted_attribute_value("\"val\""));
    }
}
