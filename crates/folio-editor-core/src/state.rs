//! Editor state snapshots and selection-scoped queries.
//!
//! An [`EditorState`] is an immutable snapshot of document plus selection.
//! Commands take a snapshot and produce a new one; nothing mutates a
//! snapshot in place. Toolbar-style `is_active` queries always run against
//! the snapshot they are handed, so they can never read stale state.

use crate::attrs::Attrs;
use crate::id::NodeId;
use crate::node::{MarkSet, Node};
use crate::schema::Schema;

/// Caret position: a textblock plus a char offset into its inline content.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Caret {
    pub block: NodeId,
    pub offset: usize,
}

impl Caret {
    pub fn new(block: NodeId, offset: usize) -> Self {
        Self { block, offset }
    }
}

/// Current selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Selection {
    /// Text selection between two carets (anchor = where it started,
    /// head = where the cursor is now).
    Text { anchor: Caret, head: Caret },
    /// A whole node selected as a unit (atoms are only selectable this way).
    Node(NodeId),
}

impl Selection {
    pub fn caret(block: NodeId, offset: usize) -> Self {
        let caret = Caret::new(block, offset);
        Selection::Text {
            anchor: caret,
            head: caret,
        }
    }

    pub fn is_caret(&self) -> bool {
        matches!(self, Selection::Text { anchor, head } if anchor == head)
    }

    /// The caret the cursor currently sits at, if this is a text selection.
    pub fn head(&self) -> Option<Caret> {
        match self {
            Selection::Text { head, .. } => Some(*head),
            Selection::Node(_) => None,
        }
    }
}

/// One selected textblock with the selected inline portion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockPortion {
    pub block: NodeId,
    pub from: usize,
    pub to: usize,
}

/// Immutable document + selection snapshot.
#[derive(Clone, Debug)]
pub struct EditorState {
    pub doc: Node,
    pub selection: Selection,
}

impl EditorState {
    pub fn new(doc: Node, selection: Selection) -> Self {
        Self { doc, selection }
    }

    /// Snapshot with the caret at the start of the first textblock.
    pub fn at_start(doc: Node, schema: &Schema) -> Self {
        let selection = first_textblock(&doc, schema)
            .map(|id| Selection::caret(id, 0))
            .unwrap_or(Selection::Node(doc.id));
        Self { doc, selection }
    }

    /// Textblocks covered by the selection, in document order, with the
    /// selected portion of each. Empty for node selections.
    pub fn selected_blocks(&self, schema: &Schema) -> Vec<BlockPortion> {
        let Selection::Text { anchor, head } = self.selection else {
            return Vec::new();
        };

        let order = textblock_ids(&self.doc, schema);
        let Some(a_ix) = order.iter().position(|id| *id == anchor.block) else {
            return Vec::new();
        };
        let Some(h_ix) = order.iter().position(|id| *id == head.block) else {
            return Vec::new();
        };

        let (first, last, from, to) = if a_ix < h_ix || (a_ix == h_ix && anchor.offset <= head.offset)
        {
            (a_ix, h_ix, anchor.offset, head.offset)
        } else {
            (h_ix, a_ix, head.offset, anchor.offset)
        };

        order[first..=last]
            .iter()
            .enumerate()
            .map(|(i, id)| {
                let block = self.doc.find(*id).expect("block listed but not found");
                let len = block.inline_len();
                let ix = first + i;
                let (p_from, p_to) = if first == last {
                    (from, to)
                } else if ix == first {
                    (from, len)
                } else if ix == last {
                    (0, to)
                } else {
                    (0, len)
                };
                BlockPortion {
                    block: *id,
                    from: p_from,
                    to: p_to,
                }
            })
            .collect()
    }

    /// Whether the selection is entirely "inside" the given kind: for mark
    /// kinds, every selected character carries the mark; for textblock
    /// kinds, every selected block matches; for container kinds, the caret
    /// block sits inside such a node. `attrs`, when given, must be a subset
    /// of the matched node's or mark's attrs.
    pub fn is_active(&self, kind: &str, attrs: Option<&Attrs>, schema: &Schema) -> bool {
        if schema.mark(kind).is_some() {
            return self.mark_active(kind, attrs, schema);
        }
        match self.selection {
            Selection::Node(id) => self
                .doc
                .find(id)
                .is_some_and(|n| n.kind == kind && attrs_match(&n.attrs, attrs)),
            Selection::Text { head, .. } => {
                if schema.is_textblock(kind) {
                    let portions = self.selected_blocks(schema);
                    !portions.is_empty()
                        && portions.iter().all(|p| {
                            self.doc
                                .find(p.block)
                                .is_some_and(|n| n.kind == kind && attrs_match(&n.attrs, attrs))
                        })
                } else {
                    self.doc.is_inside(head.block, kind)
                }
            }
        }
    }

    fn mark_active(&self, kind: &str, attrs: Option<&Attrs>, schema: &Schema) -> bool {
        let Selection::Text { .. } = self.selection else {
            return false;
        };
        if self.selection.is_caret() {
            let Some(caret) = self.selection.head() else {
                return false;
            };
            let Some(block) = self.doc.find(caret.block) else {
                return false;
            };
            return run_at(block, caret.offset)
                .and_then(|run| run.marks.mark(kind))
                .is_some_and(|m| attrs_match(&m.attrs, attrs));
        }

        let portions = self.selected_blocks(schema);
        if portions.is_empty() {
            return false;
        }
        let mut saw_text = false;
        for portion in &portions {
            let Some(block) = self.doc.find(portion.block) else {
                return false;
            };
            for (run, start, end) in runs_with_spans(block) {
                let overlap = start.max(portion.from) < end.min(portion.to);
                if !overlap {
                    continue;
                }
                saw_text = true;
                if !run
                    .marks
                    .mark(kind)
                    .is_some_and(|m| attrs_match(&m.attrs, attrs))
                {
                    return false;
                }
            }
        }
        saw_text
    }

    /// Total text characters in the document.
    pub fn char_count(&self) -> usize {
        self.doc.text_len()
    }
}

fn attrs_match(have: &Attrs, want: Option<&Attrs>) -> bool {
    want.is_none_or(|w| have.contains_all(w))
}

/// Ids of every textblock in the document, depth-first.
pub fn textblock_ids(doc: &Node, schema: &Schema) -> Vec<NodeId> {
    let mut ids = Vec::new();
    doc.walk(&mut |n| {
        if schema.is_textblock(&n.kind) {
            ids.push(n.id);
        }
    });
    ids
}

/// First textblock in document order.
pub fn first_textblock(doc: &Node, schema: &Schema) -> Option<NodeId> {
    textblock_ids(doc, schema).into_iter().next()
}

/// Text runs of a block with their inline spans.
fn runs_with_spans(block: &Node) -> impl Iterator<Item = (&Node, usize, usize)> {
    let mut pos = 0;
    block.content.iter().filter_map(move |child| {
        let start = pos;
        pos += child.inline_weight();
        child.is_text().then_some((child, start, pos))
    })
}

/// The text run a caret at `offset` reads its marks from: the run ending at
/// or spanning the offset, matching how typing continues formatting.
fn run_at(block: &Node, offset: usize) -> Option<&Node> {
    if offset == 0 {
        return block.content.first().filter(|c| c.is_text());
    }
    let mut pos = 0;
    for child in &block.content {
        let end = pos + child.inline_weight();
        if offset > pos && offset <= end {
            return child.is_text().then_some(child);
        }
        pos = end;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic::basic_schema;
    use crate::node::Mark;

    fn doc_with_marked_para() -> Node {
        Node::new("doc").with_children(vec![
            Node::new("paragraph").with_children(vec![
                Node::text("plain "),
                Node::marked_text("bold", vec![Mark::new("bold")]),
            ]),
            Node::new("heading")
                .with_attrs(Attrs::new().with("level", 2))
                .with_children(vec![Node::text("title")]),
        ])
    }

    #[test]
    fn caret_mark_query_reads_run_at_offset() {
        let schema = basic_schema();
        let doc = doc_with_marked_para();
        let para = doc.content[0].id;

        // Caret at end of "plain " run: not bold.
        let state = EditorState::new(doc.clone(), Selection::caret(para, 6));
        assert!(!state.is_active("bold", None, &schema));

        // Caret inside the bold run.
        let state = EditorState::new(doc, Selection::caret(para, 8));
        assert!(state.is_active("bold", None, &schema));
    }

    #[test]
    fn range_mark_query_requires_full_coverage() {
        let schema = basic_schema();
        let doc = doc_with_marked_para();
        let para = doc.content[0].id;

        // "plain bold" fully selected: mixed, not active.
        let state = EditorState::new(
            doc.clone(),
            Selection::Text {
                anchor: Caret::new(para, 0),
                head: Caret::new(para, 10),
            },
        );
        assert!(!state.is_active("bold", None, &schema));

        // Only the bold run selected.
        let state = EditorState::new(
            doc,
            Selection::Text {
                anchor: Caret::new(para, 6),
                head: Caret::new(para, 10),
            },
        );
        assert!(state.is_active("bold", None, &schema));
    }

    #[test]
    fn block_kind_query_with_attr_subset() {
        let schema = basic_schema();
        let doc = doc_with_marked_para();
        let heading = doc.content[1].id;

        let state = EditorState::new(doc, Selection::caret(heading, 0));
        assert!(state.is_active("heading", None, &schema));
        assert!(state.is_active("heading", Some(&Attrs::new().with("level", 2)), &schema));
        assert!(!state.is_active("heading", Some(&Attrs::new().with("level", 3)), &schema));
        assert!(!state.is_active("paragraph", None, &schema));
    }

    #[test]
    fn selected_blocks_spans_and_orders() {
        let schema = basic_schema();
        let doc = doc_with_marked_para();
        let para = doc.content[0].id;
        let heading = doc.content[1].id;

        // Backwards selection from heading into paragraph.
        let state = EditorState::new(
            doc,
            Selection::Text {
                anchor: Caret::new(heading, 3),
                head: Caret::new(para, 2),
            },
        );
        let blocks = state.selected_blocks(&schema);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].block, para);
        assert_eq!((blocks[0].from, blocks[0].to), (2, 10));
        assert_eq!(blocks[1].block, heading);
        assert_eq!((blocks[1].from, blocks[1].to), (0, 3));
    }

    #[test]
    fn container_query_uses_ancestry() {
        let schema = basic_schema();
        let doc = Node::new("doc").with_children(vec![Node::new("blockquote").with_children(
            vec![Node::new("paragraph").with_children(vec![Node::text("quoted")])],
        )]);
        let para = doc.content[0].content[0].id;
        let state = EditorState::new(doc, Selection::caret(para, 0));
        assert!(state.is_active("blockquote", None, &schema));
        assert!(!state.is_active("table", None, &schema));
    }
}
