//! folio-editor-core: schema-validated document trees and the command engine.
//!
//! This crate provides:
//! - `Node` / `Mark` - the document tree, keyed by stable `NodeId`s
//! - `Schema` - capability registry that validates trees and drives HTML
//! - `EditorState` - immutable document + selection snapshots
//! - `Command` and `chain` - all-or-nothing state transitions
//! - a strict reader/writer pair for the persisted HTML format

pub mod attrs;
pub mod basic;
pub mod command;
pub mod error;
pub mod html;
pub mod id;
pub mod node;
pub mod schema;
pub mod state;

pub use attrs::Attrs;
pub use command::{
    Command, DeleteNode, DeleteRange, InsertNode, InsertText, ReplaceNode, SetBlockKind,
    SetNodeAttrs, ToggleMark, chain,
};
pub use error::{CommandError, ParseError};
pub use html::{DATA_NODE_TYPE, HtmlTag, TagToken, parse_html, serialize_html};
pub use id::NodeId;
pub use node::{DOC, Mark, MarkSet, Node, TEXT};
pub use schema::{AttrSpec, ContentKind, MarkSpec, NodeSpec, Schema, SchemaError};
pub use smol_str::SmolStr;
pub use state::{BlockPortion, Caret, EditorState, Selection, first_textblock, textblock_ids};
