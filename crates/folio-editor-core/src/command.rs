//! Document commands and all-or-nothing chains.
//!
//! A command is a pure function from a state snapshot to a new snapshot, or
//! a refusal when its preconditions fail. [`chain`] is the only sanctioned
//! way to apply commands: every step must succeed against the intermediate
//! result of the previous one, otherwise the whole chain is discarded and
//! the caller keeps its old snapshot. The chained result is schema-validated
//! before it is handed back, so an illegal tree can never escape.

use std::fmt;

use smol_str::SmolStr;
use tracing::debug;

use crate::attrs::Attrs;
use crate::error::CommandError;
use crate::id::NodeId;
use crate::node::{MarkSet, Mark, Node};
use crate::schema::{ContentKind, Schema};
use crate::state::{Caret, EditorState, Selection, first_textblock, textblock_ids};

/// A document-mutating operation.
pub trait Command: fmt::Debug {
    fn apply(&self, state: &EditorState, schema: &Schema) -> Result<EditorState, CommandError>;
}

/// Apply a sequence of commands atomically.
///
/// Either every command applies (against the intermediate state produced by
/// its predecessor) and the final tree validates, or the chain is refused
/// and the input state stands.
pub fn chain(
    commands: &[Box<dyn Command>],
    state: &EditorState,
    schema: &Schema,
) -> Result<EditorState, CommandError> {
    let mut current = state.clone();
    for command in commands {
        current = command.apply(&current, schema).inspect_err(|err| {
            if err.is_refusal() {
                debug!(?command, "command refused, chain discarded");
            }
        })?;
    }
    schema.validate(&current.doc)?;
    Ok(current)
}

// === Inline splicing helpers ===

/// Split inline content at `from` and `to`, preserving inline leaves.
fn split_inline(content: &[Node], from: usize, to: usize) -> (Vec<Node>, Vec<Node>, Vec<Node>) {
    let mut before = Vec::new();
    let mut middle = Vec::new();
    let mut after = Vec::new();
    let mut pos = 0;

    for child in content {
        let weight = child.inline_weight();
        let (start, end) = (pos, pos + weight);
        pos = end;

        if end <= from {
            before.push(child.clone());
        } else if start >= to {
            after.push(child.clone());
        } else if child.is_text() {
            let cut_a = from.saturating_sub(start).min(weight);
            let cut_b = to.saturating_sub(start).min(weight);
            if let Some(run) = slice_run(child, 0, cut_a) {
                before.push(run);
            }
            if let Some(run) = slice_run(child, cut_a, cut_b) {
                middle.push(run);
            }
            if let Some(run) = slice_run(child, cut_b, weight) {
                after.push(run);
            }
        } else {
            // Inline leaf overlapping the range sits wholly inside it.
            middle.push(child.clone());
        }
    }

    (before, middle, after)
}

fn slice_run(run: &Node, start: usize, end: usize) -> Option<Node> {
    if start >= end {
        return None;
    }
    let text: String = run
        .text
        .as_deref()
        .unwrap_or("")
        .chars()
        .skip(start)
        .take(end - start)
        .collect();
    if text.is_empty() {
        return None;
    }
    let mut slice = run.clone();
    slice.id = NodeId::next();
    slice.text = Some(text.into());
    Some(slice)
}

/// The marks a fresh insertion at `offset` inherits.
fn marks_at(content: &[Node], offset: usize) -> Vec<Mark> {
    let (before, _, after) = split_inline(content, offset, offset);
    if let Some(run) = before.iter().rev().find(|n| n.is_text()) {
        return run.marks.clone();
    }
    if let Some(run) = after.iter().find(|n| n.is_text()) {
        return run.marks.clone();
    }
    Vec::new()
}

fn textblock_index(order: &[NodeId], id: NodeId) -> Option<usize> {
    order.iter().position(|x| *x == id)
}

/// Isolating ancestors of a node, outermost first. Two blocks may only be
/// merged or jointly marked when these chains are equal.
fn isolating_chain(doc: &Node, schema: &Schema, id: NodeId) -> Vec<NodeId> {
    let Some(path) = doc.path_to(id) else {
        return Vec::new();
    };
    let mut chain = Vec::new();
    let mut node = doc;
    for &ix in &path {
        if schema.is_isolating(&node.kind) {
            chain.push(node.id);
        }
        node = &node.content[ix];
    }
    chain
}

fn ordered_carets(
    doc: &Node,
    schema: &Schema,
    a: Caret,
    b: Caret,
) -> Result<(Caret, Caret), CommandError> {
    if a.block == b.block {
        return Ok(if a.offset <= b.offset { (a, b) } else { (b, a) });
    }
    let order = textblock_ids(doc, schema);
    let a_ix = textblock_index(&order, a.block).ok_or(CommandError::NotApplicable)?;
    let b_ix = textblock_index(&order, b.block).ok_or(CommandError::NotApplicable)?;
    Ok(if a_ix <= b_ix { (a, b) } else { (b, a) })
}

// === Commands ===

/// Insert text at the caret, replacing the selection if one is open.
#[derive(Debug)]
pub struct InsertText {
    pub text: String,
}

impl Command for InsertText {
    fn apply(&self, state: &EditorState, schema: &Schema) -> Result<EditorState, CommandError> {
        if self.text.is_empty() {
            return Err(CommandError::NotApplicable);
        }
        let Selection::Text { anchor, head } = state.selection else {
            return Err(CommandError::NotApplicable);
        };

        let state = if anchor == head {
            state.clone()
        } else {
            DeleteRange {
                from: anchor,
                to: head,
            }
            .apply(state, schema)?
        };
        let caret = state.selection.head().ok_or(CommandError::NotApplicable)?;

        let mut doc = state.doc.clone();
        let block = doc.find_mut(caret.block).ok_or(CommandError::NotApplicable)?;
        let spec = schema
            .node(&block.kind)
            .ok_or(CommandError::NotApplicable)?;
        if spec.content != ContentKind::Inline {
            return Err(CommandError::NotApplicable);
        }
        if caret.offset > block.inline_len() {
            return Err(CommandError::NotApplicable);
        }

        let marks = if spec.code {
            Vec::new()
        } else {
            marks_at(&block.content, caret.offset)
        };
        let (before, _, after) = split_inline(&block.content, caret.offset, caret.offset);
        let mut content = before;
        content.push(Node::marked_text(self.text.clone(), marks));
        content.extend(after);
        block.content = content;
        block.normalize_inline(schema);

        let offset = caret.offset + self.text.chars().count();
        Ok(EditorState::new(doc, Selection::caret(caret.block, offset)))
    }
}

/// Delete the inline range between two carets, merging blocks when the
/// range spans more than one.
#[derive(Debug)]
pub struct DeleteRange {
    pub from: Caret,
    pub to: Caret,
}

impl Command for DeleteRange {
    fn apply(&self, state: &EditorState, schema: &Schema) -> Result<EditorState, CommandError> {
        let (from, to) = ordered_carets(&state.doc, schema, self.from, self.to)?;
        let mut doc = state.doc.clone();

        if from.block == to.block {
            let block = doc.find_mut(from.block).ok_or(CommandError::NotApplicable)?;
            if to.offset > block.inline_len() || from.offset == to.offset {
                return Err(CommandError::NotApplicable);
            }
            let (before, _, after) = split_inline(&block.content, from.offset, to.offset);
            block.content = before;
            block.content.extend(after);
            block.normalize_inline(schema);
            return Ok(EditorState::new(
                doc,
                Selection::caret(from.block, from.offset),
            ));
        }

        // Cross-block: both blocks must share a parent and sit in the same
        // isolating context; the merge may not swallow an isolating sibling.
        let parent_a = doc.parent_of(from.block).map(|p| p.id);
        let parent_b = doc.parent_of(to.block).map(|p| p.id);
        let parent_id = match (parent_a, parent_b) {
            (Some(a), Some(b)) if a == b => a,
            _ => return Err(CommandError::NotApplicable),
        };
        if isolating_chain(&doc, schema, from.block) != isolating_chain(&doc, schema, to.block) {
            return Err(CommandError::NotApplicable);
        }

        let tail = {
            let to_block = doc.find(to.block).ok_or(CommandError::NotApplicable)?;
            if to.offset > to_block.inline_len() {
                return Err(CommandError::NotApplicable);
            }
            let (_, _, after) = split_inline(&to_block.content, 0, to.offset);
            after
        };

        {
            let parent = doc.find(parent_id).ok_or(CommandError::NotApplicable)?;
            let a_ix = parent
                .content
                .iter()
                .position(|c| c.id == from.block)
                .ok_or(CommandError::NotApplicable)?;
            let b_ix = parent
                .content
                .iter()
                .position(|c| c.id == to.block)
                .ok_or(CommandError::NotApplicable)?;
            for between in &parent.content[a_ix + 1..b_ix] {
                if schema.is_isolating(&between.kind) {
                    return Err(CommandError::NotApplicable);
                }
            }
        }

        // Remove every sibling from after `from.block` through `to.block`.
        let parent = doc.find_mut(parent_id).ok_or(CommandError::NotApplicable)?;
        let a_ix = parent
            .content
            .iter()
            .position(|c| c.id == from.block)
            .ok_or(CommandError::NotApplicable)?;
        let b_ix = parent
            .content
            .iter()
            .position(|c| c.id == to.block)
            .ok_or(CommandError::NotApplicable)?;
        parent.content.drain(a_ix + 1..=b_ix);

        let first = doc.find_mut(from.block).ok_or(CommandError::NotApplicable)?;
        if from.offset > first.inline_len() {
            return Err(CommandError::NotApplicable);
        }
        let (before, _, _) = split_inline(&first.content, from.offset, first.inline_len());
        first.content = before;
        first.content.extend(tail);
        first.normalize_inline(schema);

        Ok(EditorState::new(
            doc,
            Selection::caret(from.block, from.offset),
        ))
    }
}

/// Toggle an inline mark over the selection, block by block.
#[derive(Debug)]
pub struct ToggleMark {
    pub kind: SmolStr,
    pub attrs: Attrs,
}

impl ToggleMark {
    pub fn new(kind: impl Into<SmolStr>) -> Self {
        Self {
            kind: kind.into(),
            attrs: Attrs::new(),
        }
    }

    pub fn with_attrs(kind: impl Into<SmolStr>, attrs: Attrs) -> Self {
        Self {
            kind: kind.into(),
            attrs,
        }
    }
}

impl Command for ToggleMark {
    fn apply(&self, state: &EditorState, schema: &Schema) -> Result<EditorState, CommandError> {
        if schema.mark(&self.kind).is_none() {
            return Err(CommandError::NotApplicable);
        }
        if state.selection.is_caret() {
            return Err(CommandError::NotApplicable);
        }
        let portions = state.selected_blocks(schema);
        if portions.is_empty() {
            return Err(CommandError::NotApplicable);
        }

        // Structural rules: no marks in code blocks, and the span may not
        // cross an isolating boundary.
        let first_chain = isolating_chain(&state.doc, schema, portions[0].block);
        for portion in &portions {
            let block = state
                .doc
                .find(portion.block)
                .ok_or(CommandError::NotApplicable)?;
            let spec = schema
                .node(&block.kind)
                .ok_or(CommandError::NotApplicable)?;
            if spec.code {
                return Err(CommandError::NotApplicable);
            }
            if isolating_chain(&state.doc, schema, portion.block) != first_chain {
                return Err(CommandError::NotApplicable);
            }
        }

        let attrs_filter = (!self.attrs.is_empty()).then_some(&self.attrs);
        let add = !state.is_active(&self.kind, attrs_filter, schema);

        let mut doc = state.doc.clone();
        for portion in &portions {
            let block = doc
                .find_mut(portion.block)
                .ok_or(CommandError::NotApplicable)?;
            let (before, mut middle, after) =
                split_inline(&block.content, portion.from, portion.to);
            for run in &mut middle {
                if !run.is_text() {
                    continue;
                }
                if add {
                    run.marks
                        .add_mark(Mark::with_attrs(self.kind.clone(), self.attrs.clone()));
                } else {
                    run.marks.remove_mark(&self.kind);
                }
            }
            let mut content = before;
            content.extend(middle);
            content.extend(after);
            block.content = content;
            block.normalize_inline(schema);
        }

        Ok(EditorState::new(doc, state.selection))
    }
}

/// Change the kind (and attrs) of every selected textblock.
#[derive(Debug)]
pub struct SetBlockKind {
    pub kind: SmolStr,
    pub attrs: Attrs,
}

impl SetBlockKind {
    pub fn new(kind: impl Into<SmolStr>) -> Self {
        Self {
            kind: kind.into(),
            attrs: Attrs::new(),
        }
    }

    pub fn with_attrs(kind: impl Into<SmolStr>, attrs: Attrs) -> Self {
        Self {
            kind: kind.into(),
            attrs,
        }
    }
}

impl Command for SetBlockKind {
    fn apply(&self, state: &EditorState, schema: &Schema) -> Result<EditorState, CommandError> {
        let target = schema.node(&self.kind).ok_or(CommandError::NotApplicable)?;
        if !target.is_textblock() {
            return Err(CommandError::NotApplicable);
        }
        let portions = state.selected_blocks(schema);
        if portions.is_empty() {
            return Err(CommandError::NotApplicable);
        }
        // Structural rule: block conversions never reach into tables.
        for portion in &portions {
            if state.doc.is_inside(portion.block, "table") {
                return Err(CommandError::NotApplicable);
            }
        }

        let strip_marks = target.code;
        let mut doc = state.doc.clone();
        for portion in &portions {
            let block = doc
                .find_mut(portion.block)
                .ok_or(CommandError::NotApplicable)?;
            block.kind = self.kind.clone();
            block.attrs = self.attrs.clone();
            if strip_marks {
                for run in &mut block.content {
                    run.marks.clear();
                }
            }
            block.normalize_inline(schema);
        }

        Ok(EditorState::new(doc, state.selection))
    }
}

/// Insert a block node after the block the cursor sits in (or after the
/// selected node).
#[derive(Debug)]
pub struct InsertNode {
    pub node: Node,
}

impl Command for InsertNode {
    fn apply(&self, state: &EditorState, schema: &Schema) -> Result<EditorState, CommandError> {
        let anchor = match state.selection {
            Selection::Text { head, .. } => head.block,
            Selection::Node(id) => id,
        };
        let mut doc = state.doc.clone();
        if !doc.insert_after(anchor, self.node.clone()) {
            return Err(CommandError::NotApplicable);
        }
        // Selecting the insertion keeps follow-up inserts anchored after it.
        let selection = if schema.is_textblock(&self.node.kind) {
            Selection::caret(self.node.id, 0)
        } else {
            Selection::Node(self.node.id)
        };
        Ok(EditorState::new(doc, selection))
    }
}

/// Replace the node with the given id.
#[derive(Debug)]
pub struct ReplaceNode {
    pub id: NodeId,
    pub with: Node,
}

impl Command for ReplaceNode {
    fn apply(&self, state: &EditorState, schema: &Schema) -> Result<EditorState, CommandError> {
        let mut doc = state.doc.clone();
        if !doc.replace_node(self.id, self.with.clone()) {
            return Err(CommandError::NotApplicable);
        }
        let selection = repair_selection(&doc, state.selection, schema, Some(self.with.id));
        Ok(EditorState::new(doc, selection))
    }
}

/// Delete the node with the given id.
#[derive(Debug)]
pub struct DeleteNode {
    pub id: NodeId,
}

impl Command for DeleteNode {
    fn apply(&self, state: &EditorState, schema: &Schema) -> Result<EditorState, CommandError> {
        let mut doc = state.doc.clone();
        if doc.remove_node(self.id).is_none() {
            return Err(CommandError::NotApplicable);
        }
        let selection = repair_selection(&doc, state.selection, schema, None);
        Ok(EditorState::new(doc, selection))
    }
}

/// Replace the attribute bag of the node with the given id.
#[derive(Debug)]
pub struct SetNodeAttrs {
    pub id: NodeId,
    pub attrs: Attrs,
}

impl Command for SetNodeAttrs {
    fn apply(&self, state: &EditorState, _schema: &Schema) -> Result<EditorState, CommandError> {
        let mut doc = state.doc.clone();
        let node = doc.find_mut(self.id).ok_or(CommandError::NotApplicable)?;
        node.attrs = self.attrs.clone();
        Ok(EditorState::new(doc, state.selection))
    }
}

/// Re-point a selection whose target vanished from the tree.
fn repair_selection(
    doc: &Node,
    selection: Selection,
    schema: &Schema,
    replacement: Option<NodeId>,
) -> Selection {
    let still_valid = match selection {
        Selection::Text { anchor, head } => doc.contains(anchor.block) && doc.contains(head.block),
        Selection::Node(id) => doc.contains(id),
    };
    if still_valid {
        return selection;
    }
    if let Some(id) = replacement {
        if doc.contains(id) {
            return if schema.is_textblock(
                &doc.find(id).map(|n| n.kind.clone()).unwrap_or_default(),
            ) {
                Selection::caret(id, 0)
            } else {
                Selection::Node(id)
            };
        }
    }
    first_textblock(doc, schema)
        .map(|id| Selection::caret(id, 0))
        .unwrap_or(Selection::Node(doc.id))
}
