//! HTML output buffer.

use quill_syntax::chars::is_html_unquoted_attribute_value;

/// Escape HTML special characters for use in attribute values.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

/// Escapes `text` into `out` for use between tags.
fn push_escaped_text(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

/// How attribute values are quoted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AttributeStyle {
    /// Omit quotes when the value allows it.
    #[default]
    DoubleIfNeeded,
    AlwaysDouble,
}

/// Append-only HTML buffer.
///
/// ```
/// use quill_render::HtmlWriter;
///
/// let mut out = HtmlWriter::new();
/// out.open_tag_with_attributes("a")
///     .write_attribute("href", "x y")
///     .write_empty_attribute("download");
/// out.write_inner_text("1 < 2");
/// out.close_tag("a");
/// assert_eq!(out.as_str(), r#"<a href="x y" download>1 &lt; 2</a>"#);
/// ```
#[derive(Debug, Default, Clone)]
pub struct HtmlWriter {
    out: String,
}

impl HtmlWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.out
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.out
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.out.is_empty()
    }

    /// Writes text, escaping characters with special meaning in HTML.
    pub fn write_inner_text(&mut self, text: &str) {
        push_escaped_text(&mut self.out, text);
    }

    pub fn write_inner_char(&mut self, c: char) {
        let mut buffer = [0; 4];
        self.write_inner_text(c.encode_utf8(&mut buffer));
    }

    /// Writes HTML as is.
    pub fn write_inner_html(&mut self, html: &str) {
        self.out.push_str(html);
    }

    pub fn open_tag(&mut self, name: &str) {
        self.out.push('<');
        self.out.push_str(name);
        self.out.push('>');
    }

    /// Opens a tag whose attributes are written through the returned writer.
    ///
    /// The opening tag is completed with `>` when the writer is dropped.
    pub fn open_tag_with_attributes(&mut self, name: &str) -> AttributeWriter<'_> {
        self.out.push('<');
        self.out.push_str(name);
        AttributeWriter {
            out: &mut self.out,
            style: AttributeStyle::default(),
        }
    }

    pub fn close_tag(&mut self, name: &str) {
        self.out.push_str("</");
        self.out.push_str(name);
        self.out.push('>');
    }
}

/// Writes attributes of a tag opened by [`HtmlWriter::open_tag_with_attributes`].
#[derive(Debug)]
pub struct AttributeWriter<'w> {
    out: &'w mut String,
    style: AttributeStyle,
}

impl AttributeWriter<'_> {
    /// Sets the quoting style of subsequent attributes.
    #[must_use]
    pub fn with_style(mut self, style: AttributeStyle) -> Self {
        self.style = style;
        self
    }

    /// Writes `name=value`, escaping and quoting the value as needed.
    pub fn write_attribute(&mut self, name: &str, value: &str) -> &mut Self {
        self.out.push(' ');
        self.out.push_str(name);
        self.out.push('=');
        let unquoted = self.style == AttributeStyle::DoubleIfNeeded
            && !value.is_empty()
            && is_html_unquoted_attribute_value(value)
            && !value.contains('&');
        if unquoted {
            self.out.push_str(value);
        } else {
            self.out.push('"');
            self.out.push_str(&escape_html(value));
            self.out.push('"');
        }
        self
    }

    /// Writes an attribute without a value, such as `hidden`.
    pub fn write_empty_attribute(&mut self, name: &str) -> &mut Self {
        self.out.push(' ');
        self.out.push_str(name);
        self
    }
}

impl Drop for AttributeWriter<'_> {
    fn drop(&mut self) {
        self.out.push('>');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<a href=\"x\">'&'</a>"),
            "&lt;a href=&quot;x&quot;&gt;&#x27;&amp;&#x27;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_inner_text_keeps_quotes() {
        let mut out = HtmlWriter::new();
        out.write_inner_text("it's \"fine\" & <ok>");
        assert_eq!(out.as_str(), "it's \"fine\" &amp; &lt;ok&gt;");
    }

    #[test]
    fn test_unquoted_attribute() {
        let mut out = HtmlWriter::new();
        out.open_tag_with_attributes("b").write_attribute("id", "foo");
        assert_eq!(out.as_str(), "<b id=foo>");
    }

    #[test]
    fn test_always_double_attribute() {
        let mut out = HtmlWriter::new();
        out.open_tag_with_attributes("b")
            .with_style(AttributeStyle::AlwaysDouble)
            .write_attribute("id", "foo");
        assert_eq!(out.as_str(), r#"<b id="foo">"#);
    }

    #[test]
    fn test_empty_value_is_quoted() {
        let mut out = HtmlWriter::new();
        out.open_tag_with_attributes("b").write_attribute("title", "");
        assert_eq!(out.as_str(), r#"<b title="">"#);
    }

    #[test]
    fn test_write_inner_char() {
        let mut out = HtmlWriter::new();
        out.write_inner_char('<');
        out.write_inner_char('é');
        assert_eq!(out.into_string(), "&lt;é");
    }
}
