//! Document tree: nodes, marks, and structural queries.
//!
//! A document is a single root node of kind `doc` whose descendants form an
//! ordered tree. Inline text lives in `text` nodes; everything else is
//! structure. All structural lookups used by async lifecycle code are keyed
//! by [`NodeId`], so they stay correct across intervening edits.

use smol_str::SmolStr;

use crate::attrs::Attrs;
use crate::id::NodeId;

/// Kind tag of text nodes.
pub const TEXT: &str = "text";
/// Kind tag of the document root.
pub const DOC: &str = "doc";

/// An inline formatting mark attached to a text run.
#[derive(Clone, Debug, PartialEq)]
pub struct Mark {
    pub kind: SmolStr,
    pub attrs: Attrs,
}

impl Mark {
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

/// Set-semantics helpers for mark lists.
pub trait MarkSet {
    fn has_mark(&self, kind: &str) -> bool;
    fn mark(&self, kind: &str) -> Option<&Mark>;
    fn add_mark(&mut self, mark: Mark);
    fn remove_mark(&mut self, kind: &str);
}

impl MarkSet for Vec<Mark> {
    fn has_mark(&self, kind: &str) -> bool {
        self.iter().any(|m| m.kind == kind)
    }

    fn mark(&self, kind: &str) -> Option<&Mark> {
        self.iter().find(|m| m.kind == kind)
    }

    fn add_mark(&mut self, mark: Mark) {
        if let Some(existing) = self.iter_mut().find(|m| m.kind == mark.kind) {
            *existing = mark;
        } else {
            self.push(mark);
        }
    }

    fn remove_mark(&mut self, kind: &str) {
        self.retain(|m| m.kind != kind);
    }
}

/// One node of the document tree.
#[derive(Clone, Debug)]
pub struct Node {
    pub id: NodeId,
    pub kind: SmolStr,
    pub attrs: Attrs,
    /// Inline-only; populated on text runs.
    pub marks: Vec<Mark>,
    /// Populated only when `kind == "text"`.
    pub text: Option<SmolStr>,
    pub content: Vec<Node>,
}

impl Node {
    pub fn new(kind: impl Into<SmolStr>) -> Self {
        Self {
            id: NodeId::next(),
            kind: kind.into(),
            attrs: Attrs::new(),
            marks: Vec::new(),
            text: None,
            content: Vec::new(),
        }
    }

    pub fn with_attrs(mut self, attrs: Attrs) -> Self {
        self.attrs = attrs;
        self
    }

    pub fn with_children(mut self, content: Vec<Node>) -> Self {
        self.content = content;
        self
    }

    /// A plain text run.
    pub fn text(text: impl Into<SmolStr>) -> Self {
        let mut node = Node::new(TEXT);
        node.text = Some(text.into());
        node
    }

    /// A text run carrying marks.
    pub fn marked_text(text: impl Into<SmolStr>, marks: Vec<Mark>) -> Self {
        let mut node = Node::text(text);
        node.marks = marks;
        node
    }

    pub fn is_text(&self) -> bool {
        self.kind == TEXT
    }

    /// Length of this node as seen by inline offsets: text runs count their
    /// chars, any other inline node (hard break, inline atom) counts as 1.
    pub fn inline_weight(&self) -> usize {
        match &self.text {
            Some(t) => t.chars().count(),
            None => 1,
        }
    }

    /// Total inline length of this node's content.
    pub fn inline_len(&self) -> usize {
        self.content.iter().map(Node::inline_weight).sum()
    }

    /// Concatenated text of this node's inline content.
    pub fn inline_text(&self) -> String {
        let mut out = String::new();
        for child in &self.content {
            if let Some(t) = &child.text {
                out.push_str(t);
            }
        }
        out
    }

    // === Id-keyed structural queries ===

    pub fn find(&self, id: NodeId) -> Option<&Node> {
        if self.id == id {
            return Some(self);
        }
        self.content.iter().find_map(|c| c.find(id))
    }

    pub fn find_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        if self.id == id {
            return Some(self);
        }
        self.content.iter_mut().find_map(|c| c.find_mut(id))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.find(id).is_some()
    }

    /// Child-index path from this node down to `id`. Empty path means
    /// `self` is the target.
    pub fn path_to(&self, id: NodeId) -> Option<Vec<usize>> {
        if self.id == id {
            return Some(Vec::new());
        }
        for (ix, child) in self.content.iter().enumerate() {
            if let Some(mut rest) = child.path_to(id) {
                rest.insert(0, ix);
                return Some(rest);
            }
        }
        None
    }

    pub fn node_at_path(&self, path: &[usize]) -> Option<&Node> {
        let mut node = self;
        for &ix in path {
            node = node.content.get(ix)?;
        }
        Some(node)
    }

    /// Direct parent of `id`, if `id` is a proper descendant.
    pub fn parent_of(&self, id: NodeId) -> Option<&Node> {
        if self.content.iter().any(|c| c.id == id) {
            return Some(self);
        }
        self.content.iter().find_map(|c| c.parent_of(id))
    }

    /// Ancestor kinds of `id`, nearest first, excluding the target itself.
    pub fn ancestor_kinds(&self, id: NodeId) -> Vec<SmolStr> {
        let Some(path) = self.path_to(id) else {
            return Vec::new();
        };
        let mut kinds = Vec::new();
        let mut node = self;
        for &ix in &path {
            kinds.push(node.kind.clone());
            node = &node.content[ix];
        }
        kinds.reverse();
        kinds
    }

    /// Whether `id` sits inside a node of the given kind (strict ancestor).
    pub fn is_inside(&self, id: NodeId, kind: &str) -> bool {
        self.ancestor_kinds(id).iter().any(|k| k == kind)
    }

    /// Replace the node with `id` by `replacement`. The root cannot be
    /// replaced. Returns false if `id` was not found.
    pub fn replace_node(&mut self, id: NodeId, replacement: Node) -> bool {
        for child in &mut self.content {
            if child.id == id {
                *child = replacement;
                return true;
            }
            if child.replace_node(id, replacement.clone()) {
                return true;
            }
        }
        false
    }

    /// Detach and return the node with `id`. The root cannot be removed.
    pub fn remove_node(&mut self, id: NodeId) -> Option<Node> {
        if let Some(ix) = self.content.iter().position(|c| c.id == id) {
            return Some(self.content.remove(ix));
        }
        self.content.iter_mut().find_map(|c| c.remove_node(id))
    }

    /// Insert `node` as the next sibling of `anchor`. Returns false if
    /// `anchor` was not found.
    pub fn insert_after(&mut self, anchor: NodeId, node: Node) -> bool {
        if let Some(ix) = self.content.iter().position(|c| c.id == anchor) {
            self.content.insert(ix + 1, node);
            return true;
        }
        for child in &mut self.content {
            if child.insert_after(anchor, node.clone()) {
                return true;
            }
        }
        false
    }

    /// Depth-first walk over this node and all descendants.
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a Node)) {
        f(self);
        for child in &self.content {
            child.walk(f);
        }
    }

    /// Ids of every node in the subtree.
    pub fn all_ids(&self) -> Vec<NodeId> {
        let mut ids = Vec::new();
        self.walk(&mut |n| ids.push(n.id));
        ids
    }

    /// Structural equality: kind, attrs, marks, text and children, ignoring
    /// ids. This is the equality the persisted-format round-trip guarantees.
    pub fn structural_eq(&self, other: &Node) -> bool {
        self.kind == other.kind
            && self.attrs == other.attrs
            && self.marks == other.marks
            && self.text == other.text
            && self.content.len() == other.content.len()
            && self
                .content
                .iter()
                .zip(&other.content)
                .all(|(a, b)| a.structural_eq(b))
    }

    /// Total characters of text in the subtree. Inline leaves do not count.
    pub fn text_len(&self) -> usize {
        let mut total = 0;
        self.walk(&mut |n| {
            if let Some(t) = &n.text {
                total += t.chars().count();
            }
        });
        total
    }

    /// Normalize inline content throughout the subtree: sort each run's
    /// marks into schema registration order, merge adjacent runs with equal
    /// marks, and drop empty runs. Round-trip through the persisted format
    /// is structural identity for normalized trees.
    pub fn normalize_inline(&mut self, schema: &crate::schema::Schema) {
        let mark_order: Vec<SmolStr> = schema.marks().map(|m| m.kind.clone()).collect();
        self.normalize_with(&mark_order);
    }

    fn normalize_with(&mut self, mark_order: &[SmolStr]) {
        for child in &mut self.content {
            child.normalize_with(mark_order);
        }

        let has_runs = self.content.iter().any(Node::is_text);
        if !has_runs {
            return;
        }

        let mut normalized: Vec<Node> = Vec::with_capacity(self.content.len());
        for mut child in self.content.drain(..) {
            if child.is_text() {
                if child.text.as_deref().is_some_and(str::is_empty) {
                    continue;
                }
                child
                    .marks
                    .sort_by_key(|m| mark_order.iter().position(|k| *k == m.kind));
                if let Some(prev) = normalized.last_mut() {
                    if prev.is_text() && prev.marks == child.marks {
                        let merged = format!(
                            "{}{}",
                            prev.text.as_deref().unwrap_or(""),
                            child.text.as_deref().unwrap_or("")
                        );
                        prev.text = Some(merged.into());
                        continue;
                    }
                }
            }
            normalized.push(child);
        }
        self.content = normalized;
    }

    /// Deep copy with fresh ids throughout, for duplicating content.
    pub fn duplicate(&self) -> Node {
        let mut copy = self.clone();
        copy.refresh_ids();
        copy
    }

    fn refresh_ids(&mut self) {
        self.id = NodeId::next();
        for child in &mut self.content {
            child.refresh_ids();
        }
    }
}
