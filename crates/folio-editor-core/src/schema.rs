//! Closed schema registry.
//!
//! A [`Schema`] is the fixed set of node and mark kinds one editor instance
//! understands, built once by the composition kit. Behavior that used to be
//! type-name switches lives here as per-kind capability records: structural
//! flags, attribute schemas, and the HTML codec hooks the persisted-format
//! writer and reader dispatch through.

use std::collections::BTreeMap;

use serde_json::Value;
use smol_str::SmolStr;

use crate::attrs::Attrs;
use crate::error::ParseError;
use crate::html::{HtmlTag, TagToken};
use crate::node::{Node, TEXT};

/// What a node kind may contain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContentKind {
    /// Block children (doc, blockquote, list item...).
    Blocks,
    /// Inline children: text runs and inline leaves.
    Inline,
    /// Nothing. All atoms are leaves.
    None,
}

/// Declared attribute of a node or mark kind.
#[derive(Clone, Debug)]
pub struct AttrSpec {
    pub name: &'static str,
    pub required: bool,
    pub default: Option<Value>,
}

impl AttrSpec {
    pub fn required(name: &'static str) -> Self {
        Self {
            name,
            required: true,
            default: None,
        }
    }

    pub fn optional(name: &'static str) -> Self {
        Self {
            name,
            required: false,
            default: None,
        }
    }

    pub fn with_default(name: &'static str, default: Value) -> Self {
        Self {
            name,
            required: false,
            default: Some(default),
        }
    }
}

/// Capability record for one node kind.
#[derive(Clone)]
pub struct NodeSpec {
    pub kind: SmolStr,
    pub content: ContentKind,
    /// Opaque to selection traversal; edited only through its own UI.
    pub atom: bool,
    /// Boundary blocks cross-boundary selection and backspace-merge.
    pub isolating: bool,
    /// Participates in inline content rather than block content.
    pub inline: bool,
    pub draggable: bool,
    /// Raw text content: marks are rejected inside.
    pub code: bool,
    /// Paragraph-shaped textblock, eligible as a slash-trigger site.
    pub paragraph_like: bool,
    /// Recognized container for trigger sites (doc root, layout column).
    pub layout_container: bool,
    pub attrs: Vec<AttrSpec>,
    /// Emit the opening tag (name + attribute list) for this node.
    pub to_tag: fn(&Node) -> HtmlTag,
    /// Rebuild this kind's attrs from a parsed tag.
    pub parse_attrs: fn(&TagToken) -> Result<Attrs, ParseError>,
    /// Serialize as a void element (`<img .../>`).
    pub void: bool,
    /// Reserved `data-node-type` value, for kinds without a dedicated tag.
    pub data_type: Option<&'static str>,
    /// Element names this kind claims when no `data-node-type` is present.
    pub claim_tags: &'static [&'static str],
}

/// Attr parser for kinds that carry no attributes.
pub fn parse_no_attrs(_t: &TagToken) -> Result<Attrs, ParseError> {
    Ok(Attrs::new())
}

impl NodeSpec {
    /// A plain structural spec with defaulted flags; `to_tag` emits the
    /// opening element and no attributes are parsed back.
    pub fn block(kind: &'static str, content: ContentKind, to_tag: fn(&Node) -> HtmlTag) -> Self {
        Self {
            kind: kind.into(),
            content,
            atom: false,
            isolating: false,
            inline: false,
            draggable: false,
            code: false,
            paragraph_like: false,
            layout_container: false,
            attrs: Vec::new(),
            to_tag,
            parse_attrs: parse_no_attrs,
            void: false,
            data_type: None,
            claim_tags: &[],
        }
    }

    pub fn is_textblock(&self) -> bool {
        self.content == ContentKind::Inline && !self.atom
    }
}

/// Capability record for one mark kind.
#[derive(Clone)]
pub struct MarkSpec {
    pub kind: SmolStr,
    pub attrs: Vec<AttrSpec>,
    pub to_tag: fn(&crate::node::Mark) -> HtmlTag,
    pub parse_attrs: fn(&TagToken) -> Result<Attrs, ParseError>,
    /// Element names this mark claims in inline content.
    pub claim_tags: &'static [&'static str],
}

/// Schema validation failures. These indicate programmer error (a command
/// or parser produced an illegal tree) and are treated as defects.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SchemaError {
    #[error("unknown node kind `{0}`")]
    UnknownKind(SmolStr),
    #[error("unknown mark kind `{0}`")]
    UnknownMark(SmolStr),
    #[error("atom node `{0}` has content")]
    AtomWithContent(SmolStr),
    #[error("node `{parent}` may not contain `{child}`")]
    BadChild { parent: SmolStr, child: SmolStr },
    #[error("node `{kind}` is missing required attr `{attr}`")]
    MissingAttr { kind: SmolStr, attr: &'static str },
    #[error("node `{kind}` carries undeclared attr `{attr}`")]
    UnknownAttr { kind: SmolStr, attr: String },
    #[error("marks are not allowed inside `{0}`")]
    MarksNotAllowed(SmolStr),
    #[error("text payload on non-text node `{0}`")]
    TextOutsideRun(SmolStr),
}

/// The closed registry of node and mark kinds for one editor instance.
#[derive(Clone, Default)]
pub struct Schema {
    nodes: BTreeMap<SmolStr, NodeSpec>,
    /// Declared order doubles as mark wrapper emission order.
    marks: Vec<MarkSpec>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_node(&mut self, spec: NodeSpec) {
        debug_assert!(
            !self.nodes.contains_key(&spec.kind),
            "duplicate node kind {}",
            spec.kind
        );
        self.nodes.insert(spec.kind.clone(), spec);
    }

    pub fn register_mark(&mut self, spec: MarkSpec) {
        debug_assert!(
            self.mark(&spec.kind).is_none(),
            "duplicate mark kind {}",
            spec.kind
        );
        self.marks.push(spec);
    }

    pub fn node(&self, kind: &str) -> Option<&NodeSpec> {
        self.nodes.get(kind)
    }

    pub fn mark(&self, kind: &str) -> Option<&MarkSpec> {
        self.marks.iter().find(|m| m.kind == kind)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &NodeSpec> {
        self.nodes.values()
    }

    pub fn marks(&self) -> impl Iterator<Item = &MarkSpec> {
        self.marks.iter()
    }

    pub fn is_atom(&self, kind: &str) -> bool {
        self.node(kind).is_some_and(|s| s.atom)
    }

    pub fn is_isolating(&self, kind: &str) -> bool {
        self.node(kind).is_some_and(|s| s.isolating)
    }

    pub fn is_textblock(&self, kind: &str) -> bool {
        self.node(kind).is_some_and(NodeSpec::is_textblock)
    }

    /// Validate a whole tree against the registry.
    pub fn validate(&self, root: &Node) -> Result<(), SchemaError> {
        self.validate_node(root, None)
    }

    fn validate_node(&self, node: &Node, parent: Option<&NodeSpec>) -> Result<(), SchemaError> {
        let spec = self
            .node(&node.kind)
            .ok_or_else(|| SchemaError::UnknownKind(node.kind.clone()))?;

        if node.text.is_some() && node.kind != TEXT {
            return Err(SchemaError::TextOutsideRun(node.kind.clone()));
        }

        if spec.atom && !node.content.is_empty() {
            return Err(SchemaError::AtomWithContent(node.kind.clone()));
        }

        if !node.marks.is_empty() {
            if !spec.inline {
                return Err(SchemaError::MarksNotAllowed(node.kind.clone()));
            }
            if parent.is_some_and(|p| p.code) {
                return Err(SchemaError::MarksNotAllowed(
                    parent.map(|p| p.kind.clone()).unwrap_or_default(),
                ));
            }
            for mark in &node.marks {
                let mspec = self
                    .mark(&mark.kind)
                    .ok_or_else(|| SchemaError::UnknownMark(mark.kind.clone()))?;
                check_attrs(&node.kind, &mark.attrs, &mspec.attrs)?;
            }
        }

        check_attrs(&spec.kind, &node.attrs, &spec.attrs)?;

        for child in &node.content {
            let cspec = self
                .node(&child.kind)
                .ok_or_else(|| SchemaError::UnknownKind(child.kind.clone()))?;
            let fits = match spec.content {
                ContentKind::Blocks => !cspec.inline,
                ContentKind::Inline => cspec.inline,
                ContentKind::None => false,
            };
            if !fits {
                return Err(SchemaError::BadChild {
                    parent: node.kind.clone(),
                    child: child.kind.clone(),
                });
            }
            self.validate_node(child, Some(spec))?;
        }

        Ok(())
    }
}

fn check_attrs(kind: &SmolStr, attrs: &Attrs, specs: &[AttrSpec]) -> Result<(), SchemaError> {
    for spec in specs {
        if spec.required && !attrs.contains(spec.name) {
            return Err(SchemaError::MissingAttr {
                kind: kind.clone(),
                attr: spec.name,
            });
        }
    }
    for (name, _) in attrs.iter() {
        if !specs.iter().any(|s| s.name == name) {
            return Err(SchemaError::UnknownAttr {
                kind: kind.clone(),
                attr: name.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic;

    #[test]
    fn validates_well_formed_doc() {
        let schema = basic::basic_schema();
        let doc = Node::new("doc").with_children(vec![
            Node::new("paragraph").with_children(vec![Node::text("hi")]),
            Node::new("divider"),
        ]);
        assert_eq!(schema.validate(&doc), Ok(()));
    }

    #[test]
    fn rejects_atom_with_content() {
        let schema = basic::basic_schema();
        let doc = Node::new("doc").with_children(vec![
            Node::new("divider").with_children(vec![Node::new("paragraph")]),
        ]);
        assert_eq!(
            schema.validate(&doc),
            Err(SchemaError::AtomWithContent("divider".into()))
        );
    }

    #[test]
    fn rejects_unknown_kind() {
        let schema = basic::basic_schema();
        let doc = Node::new("doc").with_children(vec![Node::new("widget")]);
        assert_eq!(
            schema.validate(&doc),
            Err(SchemaError::UnknownKind("widget".into()))
        );
    }

    #[test]
    fn rejects_inline_in_block_position() {
        let schema = basic::basic_schema();
        let doc = Node::new("doc").with_children(vec![Node::text("loose")]);
        assert!(matches!(
            schema.validate(&doc),
            Err(SchemaError::BadChild { .. })
        ));
    }

    #[test]
    fn rejects_marks_in_code_block() {
        let schema = basic::basic_schema();
        let doc = Node::new("doc").with_children(vec![
            Node::new("code_block").with_children(vec![Node::marked_text(
                "let x = 1;",
                vec![crate::node::Mark::new("bold")],
            )]),
        ]);
        assert!(matches!(
            schema.validate(&doc),
            Err(SchemaError::MarksNotAllowed(_))
        ));
    }

    #[test]
    fn rejects_missing_required_attr() {
        let schema = basic::basic_schema();
        let doc = Node::new("doc").with_children(vec![
            // heading requires `level`
            Node::new("heading").with_children(vec![Node::text("t")]),
        ]);
        assert!(matches!(
            schema.validate(&doc),
            Err(SchemaError::MissingAttr { .. })
        ));
    }
}
