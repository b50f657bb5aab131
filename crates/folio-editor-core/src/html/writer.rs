//! Persisted-format writer.

use crate::node::{Node, TEXT};
use crate::schema::{ContentKind, Schema};

use super::{HtmlTag, escape_attr, escape_text};

/// Serialize a document to the persisted format.
///
/// `doc` must be a validated tree rooted at a `doc` node; its children are
/// emitted without a wrapper element. Inline mark wrappers are emitted in
/// schema registration order, so serialized output is stable regardless of
/// the order marks were toggled in.
pub fn serialize_html(doc: &Node, schema: &Schema) -> String {
    let mut out = String::new();
    for child in &doc.content {
        write_node(child, schema, &mut out);
    }
    out
}

fn write_node(node: &Node, schema: &Schema, out: &mut String) {
    let Some(spec) = schema.node(&node.kind) else {
        debug_assert!(false, "serializing unregistered kind {}", node.kind);
        return;
    };

    let tag = (spec.to_tag)(node);
    open_tag(&tag, spec.void, out);
    if spec.void {
        return;
    }

    match spec.content {
        ContentKind::Blocks => {
            for child in &node.content {
                write_node(child, schema, out);
            }
        }
        ContentKind::Inline => write_inline(&node.content, schema, out),
        ContentKind::None => {}
    }

    out.push_str("</");
    out.push_str(&tag.name);
    out.push('>');
}

fn write_inline(content: &[Node], schema: &Schema, out: &mut String) {
    for run in content {
        if run.kind == TEXT {
            write_run(run, schema, out);
        } else {
            // Inline leaf (hard break etc.).
            write_node(run, schema, out);
        }
    }
}

fn write_run(run: &Node, schema: &Schema, out: &mut String) {
    // Wrappers in schema order, outermost first.
    let mut wrappers = Vec::new();
    for mspec in schema.marks() {
        if let Some(mark) = run.marks.iter().find(|m| m.kind == mspec.kind) {
            wrappers.push((mspec.to_tag)(mark));
        }
    }

    for tag in &wrappers {
        open_tag(tag, false, out);
    }
    if let Some(text) = &run.text {
        escape_text(text, out);
    }
    for tag in wrappers.iter().rev() {
        out.push_str("</");
        out.push_str(&tag.name);
        out.push('>');
    }
}

fn open_tag(tag: &HtmlTag, void: bool, out: &mut String) {
    out.push('<');
    out.push_str(&tag.name);
    for (name, value) in &tag.attrs {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        escape_attr(value, out);
        out.push('"');
    }
    if void {
        out.push_str("/>");
    } else {
        out.push('>');
    }
}
