//! Slash trigger grammar.
//!
//! The trigger is live only while the caret sits in a paragraph-shaped
//! block whose text starts with `/`, the block sits at document root
//! depth or directly inside a recognized layout container, and the query
//! typed so far contains no two consecutive spaces. Tables never host
//! triggers.

use folio_editor_core::{Caret, EditorState, NodeId, Schema, Selection};

/// The `/query` span inside one block, in inline offsets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TriggerRange {
    pub block: NodeId,
    /// Offset of the `/` itself.
    pub from: usize,
    /// End of the query, i.e. the caret.
    pub to: usize,
}

impl TriggerRange {
    pub fn start(&self) -> Caret {
        Caret::new(self.block, self.from)
    }

    pub fn end(&self) -> Caret {
        Caret::new(self.block, self.to)
    }
}

/// Whether the snapshot is a live trigger site.
pub fn can_trigger(state: &EditorState, schema: &Schema) -> bool {
    trigger_query(state, schema).is_some()
}

/// The current trigger span and query text, if the trigger is live.
pub fn trigger_query(state: &EditorState, schema: &Schema) -> Option<(TriggerRange, String)> {
    let Selection::Text { anchor, head } = state.selection else {
        return None;
    };
    if anchor != head {
        return None;
    }

    let block = state.doc.find(head.block)?;
    let spec = schema.node(&block.kind)?;
    if !spec.paragraph_like {
        return None;
    }

    // Root depth or directly inside a layout container; never in a table.
    let parent = state.doc.parent_of(head.block)?;
    let parent_spec = schema.node(&parent.kind)?;
    if !parent_spec.layout_container {
        return None;
    }
    if state.doc.is_inside(head.block, "table") {
        return None;
    }

    let text = block.inline_text();
    if !text.starts_with('/') || head.offset == 0 {
        return None;
    }
    // Inline leaves between the trigger and the caret break the grammar.
    if block.inline_len() != text.chars().count() {
        return None;
    }

    let query: String = text.chars().skip(1).take(head.offset - 1).collect();
    if query.contains("  ") {
        return None;
    }

    Some((
        TriggerRange {
            block: head.block,
            from: 0,
            to: head.offset,
        },
        query,
    ))
}
