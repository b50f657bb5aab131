//! Persisted document format.
//!
//! The format is HTML-shaped markup produced by [`writer`] and read back by
//! [`reader`]. The reader is deliberately strict: it accepts exactly the
//! markup this writer emits rather than arbitrary HTML. Embeddable and
//! custom nodes serialize to one container element carrying the reserved
//! `data-node-type` attribute; everything else uses conventional tags.

mod reader;
mod writer;

pub use reader::parse_html;
pub use writer::serialize_html;

use smol_str::SmolStr;

/// Reserved attribute naming the node kind of non-standard elements.
pub const DATA_NODE_TYPE: &str = "data-node-type";

/// An element emitted by a node or mark spec: name plus attribute list in
/// emission order.
#[derive(Clone, Debug, PartialEq)]
pub struct HtmlTag {
    pub name: SmolStr,
    pub attrs: Vec<(SmolStr, String)>,
}

impl HtmlTag {
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
        }
    }

    pub fn attr(mut self, name: impl Into<SmolStr>, value: impl Into<String>) -> Self {
        self.attrs.push((name.into(), value.into()));
        self
    }

    /// Tag the element with the reserved node-type attribute.
    pub fn node_type(self, kind: &str) -> Self {
        self.attr(DATA_NODE_TYPE, kind)
    }
}

/// A parsed opening tag, handed to spec `parse_attrs` hooks.
#[derive(Clone, Debug)]
pub struct TagToken {
    pub name: SmolStr,
    pub attrs: Vec<(SmolStr, String)>,
    pub self_closing: bool,
}

impl TagToken {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn node_type(&self) -> Option<&str> {
        self.attr(DATA_NODE_TYPE)
    }

    /// Attributes with the given prefix, prefix stripped.
    pub fn attrs_with_prefix<'a>(
        &'a self,
        prefix: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a str)> {
        self.attrs
            .iter()
            .filter_map(move |(k, v)| Some((k.strip_prefix(prefix)?, v.as_str())))
    }
}

/// Escape text content. Quotes are left alone; they only matter in
/// attribute position.
pub(crate) fn escape_text(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
}

/// Escape attribute values (double-quoted in the output).
pub(crate) fn escape_attr(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}

/// Inverse of the escapes above.
pub(crate) fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(ix) = rest.find('&') {
        out.push_str(&rest[..ix]);
        rest = &rest[ix..];
        let (entity, len) = if rest.starts_with("&amp;") {
            ('&', 5)
        } else if rest.starts_with("&lt;") {
            ('<', 4)
        } else if rest.starts_with("&gt;") {
            ('>', 4)
        } else if rest.starts_with("&quot;") {
            ('"', 6)
        } else {
            out.push('&');
            rest = &rest[1..];
            continue;
        };
        out.push(entity);
        rest = &rest[len..];
    }
    out.push_str(rest);
    out
}
