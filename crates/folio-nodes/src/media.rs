//! Picking already-uploaded media instead of uploading again.

use folio_editor_core::{Command, EditorState, InsertNode, Schema, chain};
use futures_util::future::BoxFuture;
use smol_str::SmolStr;

use crate::error::UploadError;
use crate::specs::{image_node, video_node};
use crate::upload::UploadKind;

/// One item in the host's media library.
#[derive(Clone, Debug)]
pub struct MediaItem {
    pub url: String,
    pub name: String,
    pub kind: UploadKind,
}

/// A page of library items plus the cursor for the next one.
#[derive(Clone, Debug, Default)]
pub struct MediaPage {
    pub items: Vec<MediaItem>,
    pub next_cursor: Option<SmolStr>,
}

/// Read access to the host's media library, paged by opaque cursor.
pub trait MediaSource: Send + Sync {
    fn fetch_page(
        &self,
        cursor: Option<SmolStr>,
    ) -> BoxFuture<'static, Result<MediaPage, UploadError>>;
}

impl std::fmt::Debug for dyn MediaSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("MediaSource")
    }
}

/// Insert an already-resolved library item at the selection. No registry
/// entry is involved; the node goes in resolved.
pub fn insert_media_item(
    state: &EditorState,
    schema: &Schema,
    item: &MediaItem,
) -> Result<EditorState, UploadError> {
    let node = match item.kind {
        UploadKind::Image => image_node(&item.url),
        UploadKind::Video => video_node(&item.url),
    };
    let commands: Vec<Box<dyn Command>> = vec![Box::new(InsertNode { node })];
    Ok(chain(&commands, state, schema)?)
}
