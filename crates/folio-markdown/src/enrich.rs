//! Post-parse enrichment.
//!
//! Markdown only knows bare images; the engine's native captioned kind is
//! the figure. This pass retargets parsed `image` blocks into `figure`
//! nodes, promoting the alt text to the caption.

use folio_editor_core::{Attrs, Node};

/// Rewrite bare images into captioned figures, recursively.
pub fn enrich(nodes: &mut Vec<Node>) {
    for node in nodes.iter_mut() {
        if node.kind == "image" {
            let src = node.attrs.str_attr("src").unwrap_or_default().to_owned();
            let caption = node.attrs.str_attr("alt").unwrap_or_default().to_owned();
            let mut figure = Node::new("figure").with_attrs(Attrs::new().with("src", src));
            if !caption.is_empty() {
                figure.content.push(Node::text(caption));
            }
            *node = figure;
        } else {
            enrich(&mut node.content);
        }
    }
}
