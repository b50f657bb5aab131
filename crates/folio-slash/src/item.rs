//! The slash menu's item palette.

use folio_editor_core::{
    Attrs, Command, InsertNode, Node, SetBlockKind,
};

use crate::trigger::TriggerRange;

/// One entry in the slash menu. The palette is static; `action` builds the
/// commands that run after the trigger text is deleted.
#[derive(Clone, Copy)]
pub struct SlashItem {
    pub title: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub keywords: &'static [&'static str],
    pub action: fn(TriggerRange) -> Vec<Box<dyn Command>>,
}

impl std::fmt::Debug for SlashItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlashItem").field("title", &self.title).finish()
    }
}

fn to_paragraph(_r: TriggerRange) -> Vec<Box<dyn Command>> {
    vec![Box::new(SetBlockKind::new("paragraph"))]
}

fn to_heading(level: u64) -> Vec<Box<dyn Command>> {
    vec![Box::new(SetBlockKind::with_attrs(
        "heading",
        Attrs::new().with("level", level),
    ))]
}

fn to_heading_1(_r: TriggerRange) -> Vec<Box<dyn Command>> {
    to_heading(1)
}

fn to_heading_2(_r: TriggerRange) -> Vec<Box<dyn Command>> {
    to_heading(2)
}

fn to_heading_3(_r: TriggerRange) -> Vec<Box<dyn Command>> {
    to_heading(3)
}

fn to_code_block(_r: TriggerRange) -> Vec<Box<dyn Command>> {
    vec![Box::new(SetBlockKind::new("code_block"))]
}

fn empty_paragraph() -> Node {
    Node::new("paragraph")
}

fn insert_quote(_r: TriggerRange) -> Vec<Box<dyn Command>> {
    vec![Box::new(InsertNode {
        node: Node::new("blockquote").with_children(vec![empty_paragraph()]),
    })]
}

fn insert_bullet_list(_r: TriggerRange) -> Vec<Box<dyn Command>> {
    vec![Box::new(InsertNode {
        node: Node::new("bullet_list").with_children(vec![
            Node::new("list_item").with_children(vec![empty_paragraph()]),
        ]),
    })]
}

fn insert_ordered_list(_r: TriggerRange) -> Vec<Box<dyn Command>> {
    vec![Box::new(InsertNode {
        node: Node::new("ordered_list").with_children(vec![
            Node::new("list_item").with_children(vec![empty_paragraph()]),
        ]),
    })]
}

fn insert_divider(_r: TriggerRange) -> Vec<Box<dyn Command>> {
    vec![Box::new(InsertNode {
        node: Node::new("divider"),
    })]
}

fn insert_table(_r: TriggerRange) -> Vec<Box<dyn Command>> {
    let row = || {
        Node::new("table_row").with_children(vec![
            Node::new("table_cell").with_children(vec![empty_paragraph()]),
            Node::new("table_cell").with_children(vec![empty_paragraph()]),
        ])
    };
    vec![Box::new(InsertNode {
        node: Node::new("table").with_children(vec![row(), row()]),
    })]
}

fn insert_columns(_r: TriggerRange) -> Vec<Box<dyn Command>> {
    vec![Box::new(InsertNode {
        node: Node::new("column_list").with_children(vec![
            Node::new("column").with_children(vec![empty_paragraph()]),
            Node::new("column").with_children(vec![empty_paragraph()]),
        ]),
    })]
}

/// The built-in palette, in menu order for an empty query.
pub const DEFAULT_ITEMS: &[SlashItem] = &[
    SlashItem {
        title: "Text",
        description: "Plain paragraph",
        icon: "text",
        keywords: &["paragraph", "plain", "body"],
        action: to_paragraph,
    },
    SlashItem {
        title: "Heading 1",
        description: "Large section heading",
        icon: "h1",
        keywords: &["h1", "title"],
        action: to_heading_1,
    },
    SlashItem {
        title: "Heading 2",
        description: "Medium section heading",
        icon: "h2",
        keywords: &["h2", "subtitle"],
        action: to_heading_2,
    },
    SlashItem {
        title: "Heading 3",
        description: "Small section heading",
        icon: "h3",
        keywords: &["h3"],
        action: to_heading_3,
    },
    SlashItem {
        title: "Bullet List",
        description: "Unordered list",
        icon: "list",
        keywords: &["ul", "unordered", "bullets"],
        action: insert_bullet_list,
    },
    SlashItem {
        title: "Numbered List",
        description: "Ordered list",
        icon: "list-ordered",
        keywords: &["ol", "ordered", "numbers"],
        action: insert_ordered_list,
    },
    SlashItem {
        title: "Quote",
        description: "Block quotation",
        icon: "quote",
        keywords: &["blockquote", "citation"],
        action: insert_quote,
    },
    SlashItem {
        title: "Code Block",
        description: "Monospaced code",
        icon: "code",
        keywords: &["pre", "snippet", "monospace"],
        action: to_code_block,
    },
    SlashItem {
        title: "Divider",
        description: "Horizontal rule",
        icon: "minus",
        keywords: &["hr", "rule", "separator"],
        action: insert_divider,
    },
    SlashItem {
        title: "Table",
        description: "2x2 table",
        icon: "table",
        keywords: &["grid", "cells"],
        action: insert_table,
    },
    SlashItem {
        title: "Columns",
        description: "Two-column layout",
        icon: "columns",
        keywords: &["layout", "side by side"],
        action: insert_columns,
    },
];
