//! The kit's built-in plugins. Each is a small typed struct the editor
//! facade consults at well-defined points; none of them mutate state.

use folio_editor_core::{EditorState, Schema, Selection};
use folio_nodes::UploadKind;

/// Shows a hint in an empty paragraph.
pub struct PlaceholderPlugin {
    text: String,
}

impl PlaceholderPlugin {
    pub fn new(text: String) -> Self {
        Self { text }
    }

    /// The hint to show, if the caret's block wants one. Suppressed inside
    /// table cells, blockquotes, code blocks and list items, where a hint
    /// would be noise.
    pub fn hint(&self, state: &EditorState, _schema: &Schema) -> Option<&str> {
        let Selection::Text { anchor, head } = state.selection else {
            return None;
        };
        if anchor != head {
            return None;
        }
        let block = state.doc.find(head.block)?;
        if block.kind != "paragraph" || block.inline_len() != 0 {
            return None;
        }
        let suppressed = ["table_cell", "blockquote", "code_block", "list_item"];
        let ancestors = state.doc.ancestor_kinds(head.block);
        if ancestors.iter().any(|k| suppressed.contains(&k.as_str())) {
            return None;
        }
        Some(&self.text)
    }
}

/// Enforces the configured character limit.
pub struct CharacterCountPlugin {
    limit: Option<usize>,
}

impl CharacterCountPlugin {
    pub fn new(limit: Option<usize>) -> Self {
        Self { limit }
    }

    pub fn count(&self, state: &EditorState) -> usize {
        state.char_count()
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Whether a transaction taking `before` to `after` must be refused.
    /// Only growth past the limit is refused, so an over-limit document
    /// can still be edited down.
    pub fn refuses(&self, before: &EditorState, after: &EditorState) -> bool {
        let Some(limit) = self.limit else {
            return false;
        };
        let grown = after.char_count() > before.char_count();
        grown && after.char_count() > limit
    }
}

/// Routes dropped files to an upload placeholder kind by MIME type.
pub struct FileDropPlugin;

impl FileDropPlugin {
    /// `None` leaves the file for other drop handlers.
    pub fn route(&self, mime: &str) -> Option<UploadKind> {
        let mime = mime.to_ascii_lowercase();
        match mime.as_str() {
            "image/png" | "image/jpeg" | "image/gif" | "image/webp" | "image/avif"
            | "image/svg+xml" => Some(UploadKind::Image),
            "video/mp4" | "video/webm" | "video/quicktime" | "video/ogg" => {
                Some(UploadKind::Video)
            }
            _ => None,
        }
    }
}
