//! HTML output buffer used by controls to render themselves.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

/// Escape text for use in HTML content or attribute values.
pub fn escape_html(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(text);
    }

    let mut escaped = String::with_capacity(text.len() + 16);
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

/// String buffer with helpers for writing elements and attributes.
///
/// Attribute values are always escaped; raw text appended with
/// [`append`](Self::append) is not.
///
/// ```rust,ignore
/// let mut buffer = HtmlStringBuffer::new();
/// buffer.element_start("input");
/// buffer.append_attribute("type", "text");
/// buffer.append_attribute("value", "a < b");
/// buffer.element_end();
/// assert_eq!(buffer.as_str(), r#"<input type="text" value="a &lt; b"/>"#);
/// ```
#[derive(Debug, Clone, Default)]
pub struct HtmlStringBuffer {
    buf: String,
}

impl HtmlStringBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty buffer with capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: String::with_capacity(capacity),
        }
    }

    /// Append raw text.
    pub fn append(&mut self, text: impl AsRef<str>) -> &mut Self {
        self.buf.push_str(text.as_ref());
        self
    }

    /// Append text with HTML escaping.
    pub fn append_escaped(&mut self, text: impl AsRef<str>) -> &mut Self {
        self.buf.push_str(&escape_html(text.as_ref()));
        self
    }

    /// Write `<tag`.
    pub fn element_start(&mut self, tag: &str) -> &mut Self {
        self.buf.push('<');
        self.buf.push_str(tag);
        self
    }

    /// Write `>` closing an opened start tag.
    pub fn close_tag(&mut self) -> &mut Self {
        self.buf.push('>');
        self
    }

    /// Write `/>` closing a self-closing element.
    pub fn element_end(&mut self) -> &mut Self {
        self.buf.push_str("/>");
        self
    }

    /// Write `</tag>`.
    pub fn element_end_tag(&mut self, tag: &str) -> &mut Self {
        self.buf.push_str("</");
        self.buf.push_str(tag);
        self.buf.push('>');
        self
    }

    /// Write ` name="value"` with the value escaped.
    pub fn append_attribute(&mut self, name: &str, value: impl fmt::Display) -> &mut Self {
        let value = value.to_string();
        self.buf.push(' ');
        self.buf.push_str(name);
        self.buf.push_str("=\"");
        self.buf.push_str(&escape_html(&value));
        self.buf.push('"');
        self
    }

    /// Write the attribute only when a value is present.
    pub fn append_attribute_opt(&mut self, name: &str, value: Option<&str>) -> &mut Self {
        if let Some(value) = value {
            self.append_attribute(name, value);
        }
        self
    }

    /// Write ` disabled="disabled"`.
    pub fn append_attribute_disabled(&mut self) -> &mut Self {
        self.buf.push_str(" disabled=\"disabled\"");
        self
    }

    /// Write ` readonly="readonly"`.
    pub fn append_attribute_readonly(&mut self) -> &mut Self {
        self.buf.push_str(" readonly=\"readonly\"");
        self
    }

    /// Write every attribute in the map, in key order.
    pub fn append_attributes(&mut self, attributes: &BTreeMap<String, String>) -> &mut Self {
        for (name, value) in attributes {
            self.append_attribute(name, value);
        }
        self
    }

    /// Buffer contents.
    pub fn as_str(&self) -> &str {
        &self.buf
    }

    /// Consume the buffer.
    pub fn into_string(self) -> String {
        self.buf
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Check if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

impl fmt::Display for HtmlStringBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.buf)
    }
}
