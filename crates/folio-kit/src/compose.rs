//! Schema and plugin composition.

use folio_editor_core::{Schema, basic};
use folio_nodes::specs;
use folio_slash::SlashMenu;
use folio_slash::item::DEFAULT_ITEMS;

use crate::options::KitOptions;
use crate::plugins::{CharacterCountPlugin, FileDropPlugin, PlaceholderPlugin};

/// The composed pieces of one editor instance. Plugin order is declared
/// here and the facade consults them in this order.
pub struct EditorKit {
    pub schema: Schema,
    pub placeholder: Option<PlaceholderPlugin>,
    pub counter: CharacterCountPlugin,
    pub file_drop: FileDropPlugin,
    pub slash: SlashMenu,
}

impl EditorKit {
    /// Register the full node and mark set and build the plugin list.
    pub fn compose(options: &KitOptions) -> Self {
        let mut schema = basic::basic_schema();
        for spec in specs::embeddable_specs() {
            schema.register_node(spec);
        }

        Self {
            schema,
            placeholder: options
                .placeholder
                .clone()
                .map(PlaceholderPlugin::new),
            counter: CharacterCountPlugin::new(options.character_limit),
            file_drop: FileDropPlugin,
            slash: SlashMenu::new(DEFAULT_ITEMS.to_vec(), options.slash_threshold),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_schema_covers_every_kind() {
        let kit = EditorKit::compose(&KitOptions::default());
        for kind in [
            "doc",
            "paragraph",
            "heading",
            "blockquote",
            "code_block",
            "bullet_list",
            "ordered_list",
            "list_item",
            "table",
            "table_row",
            "table_cell",
            "column_list",
            "column",
            "divider",
            "text",
            "hard_break",
            "figure",
            "image",
            "video",
            "image_upload",
            "video_upload",
            "embed_placeholder",
            "video_embed",
            "social_embed",
            "custom_component",
        ] {
            assert!(kit.schema.node(kind).is_some(), "missing node kind {kind}");
        }
        for mark in ["bold", "italic", "code", "strike", "link", "color"] {
            assert!(kit.schema.mark(mark).is_some(), "missing mark kind {mark}");
        }
    }
}
