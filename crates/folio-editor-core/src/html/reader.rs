//! Persisted-format reader.
//!
//! Strict recursive-descent parser for the markup [`super::writer`] emits.
//! Kind resolution goes through the schema: a `data-node-type` attribute
//! wins, otherwise the element name is matched against the tags each
//! registered kind claims. Unknown elements are errors, never silently
//! dropped.

use crate::attrs::Attrs;
use crate::error::ParseError;
use crate::node::{DOC, Mark, Node};
use crate::schema::{ContentKind, MarkSpec, NodeSpec, Schema};

use super::{TagToken, unescape};

/// Parse a persisted document back into a tree.
///
/// The result is validated against the schema before being returned, and
/// is normalized (adjacent same-marked runs merged), so round-tripping a
/// normalized document is structural identity.
pub fn parse_html(input: &str, schema: &Schema) -> Result<Node, ParseError> {
    let mut parser = Parser { input, pos: 0 };
    let content = parser.parse_blocks(schema, None)?;
    let doc = Node::new(DOC).with_children(content);
    schema
        .validate(&doc)
        .map_err(|e| ParseError::Invalid(e.to_string()))?;
    Ok(doc)
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn skip_block_whitespace(&mut self) {
        while self
            .rest()
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_whitespace())
        {
            self.pos += 1;
        }
    }

    /// Parse block-level children until EOF (stop = None) or the matching
    /// closing tag (consumed).
    fn parse_blocks(
        &mut self,
        schema: &Schema,
        stop: Option<&str>,
    ) -> Result<Vec<Node>, ParseError> {
        let mut nodes = Vec::new();
        loop {
            self.skip_block_whitespace();
            if self.eof() {
                return match stop {
                    None => Ok(nodes),
                    Some(_) => Err(ParseError::UnexpectedEof(self.pos)),
                };
            }
            if self.rest().starts_with("</") {
                let name = self.parse_close_tag()?;
                return match stop {
                    Some(s) if s == name => Ok(nodes),
                    _ => Err(ParseError::MismatchedClose(name)),
                };
            }
            if !self.rest().starts_with('<') {
                return Err(ParseError::MalformedTag(self.pos));
            }
            let token = self.parse_open_tag()?;
            let spec = resolve_node(schema, &token)?;
            if spec.inline {
                return Err(ParseError::UnknownElement(token.name.to_string()));
            }
            nodes.push(self.parse_node_body(schema, spec, &token)?);
        }
    }

    fn parse_node_body(
        &mut self,
        schema: &Schema,
        spec: &NodeSpec,
        token: &TagToken,
    ) -> Result<Node, ParseError> {
        let attrs = (spec.parse_attrs)(token)?;
        let kind = spec.kind.clone();
        let closed = token.self_closing || spec.void;

        let content = if closed {
            Vec::new()
        } else {
            match spec.content {
                ContentKind::Blocks => self.parse_blocks(schema, Some(&token.name))?,
                ContentKind::Inline => self.parse_inline(schema, &token.name)?,
                ContentKind::None => {
                    self.expect_close(&token.name)?;
                    Vec::new()
                }
            }
        };

        Ok(Node::new(kind).with_attrs(attrs).with_children(content))
    }

    /// Parse inline content until the closing tag of `stop` (consumed).
    fn parse_inline(&mut self, schema: &Schema, stop: &str) -> Result<Vec<Node>, ParseError> {
        let mut nodes = Vec::new();
        self.parse_inline_into(schema, stop, &[], &mut nodes)?;
        Ok(nodes)
    }

    fn parse_inline_into(
        &mut self,
        schema: &Schema,
        stop: &str,
        marks: &[Mark],
        out: &mut Vec<Node>,
    ) -> Result<(), ParseError> {
        loop {
            if self.eof() {
                return Err(ParseError::UnexpectedEof(self.pos));
            }
            if self.rest().starts_with("</") {
                let name = self.parse_close_tag()?;
                if name == stop {
                    return Ok(());
                }
                return Err(ParseError::MismatchedClose(name));
            }
            if self.rest().starts_with('<') {
                let token = self.parse_open_tag()?;
                if let Some(mspec) = resolve_mark(schema, &token) {
                    let mark = Mark::with_attrs(mspec.kind.clone(), (mspec.parse_attrs)(&token)?);
                    let mut nested = marks.to_vec();
                    nested.push(mark);
                    self.parse_inline_into(schema, &token.name, &nested, out)?;
                    continue;
                }
                let spec = resolve_node(schema, &token)?;
                if !spec.inline {
                    return Err(ParseError::UnknownElement(token.name.to_string()));
                }
                out.push(self.parse_node_body(schema, spec, &token)?);
                continue;
            }

            let end = self.rest().find('<').unwrap_or(self.rest().len());
            let text = unescape(&self.rest()[..end]);
            self.pos += end;
            push_text(out, text, marks);
        }
    }

    fn expect_close(&mut self, name: &str) -> Result<(), ParseError> {
        let found = self.parse_close_tag()?;
        if found == name {
            Ok(())
        } else {
            Err(ParseError::MismatchedClose(found))
        }
    }

    fn parse_close_tag(&mut self) -> Result<String, ParseError> {
        let start = self.pos;
        if !self.rest().starts_with("</") {
            return Err(ParseError::MalformedTag(start));
        }
        self.pos += 2;
        let name = self.take_name();
        if name.is_empty() {
            return Err(ParseError::MalformedTag(start));
        }
        if !self.rest().starts_with('>') {
            return Err(ParseError::MalformedTag(self.pos));
        }
        self.pos += 1;
        Ok(name)
    }

    fn parse_open_tag(&mut self) -> Result<TagToken, ParseError> {
        let start = self.pos;
        debug_assert!(self.rest().starts_with('<'));
        self.pos += 1;
        let name = self.take_name();
        if name.is_empty() {
            return Err(ParseError::MalformedTag(start));
        }

        let mut attrs = Vec::new();
        loop {
            while self.rest().starts_with(' ') {
                self.pos += 1;
            }
            if self.rest().starts_with("/>") {
                self.pos += 2;
                return Ok(TagToken {
                    name: name.into(),
                    attrs,
                    self_closing: true,
                });
            }
            if self.rest().starts_with('>') {
                self.pos += 1;
                return Ok(TagToken {
                    name: name.into(),
                    attrs,
                    self_closing: false,
                });
            }
            if self.eof() {
                return Err(ParseError::UnexpectedEof(self.pos));
            }

            let attr_name = self.take_attr_name();
            if attr_name.is_empty() || !self.rest().starts_with("=\"") {
                return Err(ParseError::MalformedTag(self.pos));
            }
            self.pos += 2;
            let Some(end) = self.rest().find('"') else {
                return Err(ParseError::UnexpectedEof(self.pos));
            };
            let value = unescape(&self.rest()[..end]);
            self.pos += end + 1;
            attrs.push((attr_name.into(), value));
        }
    }

    fn take_name(&mut self) -> String {
        let rest = self.rest();
        let len = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(rest.len());
        let name = rest[..len].to_string();
        self.pos += len;
        name
    }

    fn take_attr_name(&mut self) -> String {
        let rest = self.rest();
        let len = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '-'))
            .unwrap_or(rest.len());
        let name = rest[..len].to_string();
        self.pos += len;
        name
    }
}

fn resolve_node<'s>(schema: &'s Schema, token: &TagToken) -> Result<&'s NodeSpec, ParseError> {
    if let Some(kind) = token.node_type() {
        return schema
            .node(kind)
            .ok_or_else(|| ParseError::UnknownNodeType(kind.to_string()));
    }
    schema
        .nodes()
        .find(|spec| spec.claim_tags.contains(&token.name.as_str()))
        .ok_or_else(|| ParseError::UnknownElement(token.name.to_string()))
}

fn resolve_mark<'s>(schema: &'s Schema, token: &TagToken) -> Option<&'s MarkSpec> {
    // data-node-type always denotes a node, never a mark.
    if token.node_type().is_some() {
        return None;
    }
    schema
        .marks()
        .find(|spec| spec.claim_tags.contains(&token.name.as_str()))
}

fn push_text(out: &mut Vec<Node>, text: String, marks: &[Mark]) {
    if text.is_empty() {
        return;
    }
    if let Some(last) = out.last_mut() {
        if last.is_text() && last.marks == marks {
            let merged = format!("{}{}", last.text.as_deref().unwrap_or(""), text);
            last.text = Some(merged.into());
            return;
        }
    }
    out.push(Node::marked_text(text, marks.to_vec()));
}
