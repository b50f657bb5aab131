//! File upload placeholder lifecycle.
//!
//! A dropped file becomes a registry entry plus an atom placeholder node
//! carrying only the file id. The upload itself runs through the
//! [`Uploader`] collaborator; completion events come back keyed by the
//! placeholder's node id, so intervening edits cannot misdirect them.
//! Every event out of order (late resolution after cancel, placeholder
//! deleted mid-flight) degrades to a logged no-op.

use folio_editor_core::{
    Attrs, Command, DeleteNode, EditorState, InsertNode, Node, NodeId, ReplaceNode, Schema, chain,
};
use futures_util::future::BoxFuture;
use tracing::{debug, warn};

use crate::error::UploadError;
use crate::registry::{FileHandle, FileId, PendingUploads};
use crate::specs::{self, image_node, video_node};

/// Which media kind a placeholder resolves into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UploadKind {
    Image,
    Video,
}

impl UploadKind {
    pub fn placeholder_kind(self) -> &'static str {
        match self {
            UploadKind::Image => specs::IMAGE_UPLOAD,
            UploadKind::Video => specs::VIDEO_UPLOAD,
        }
    }

    fn resolved_node(self, url: &str) -> Node {
        match self {
            UploadKind::Image => image_node(url),
            UploadKind::Video => video_node(url),
        }
    }

    fn of_placeholder(kind: &str) -> Option<Self> {
        match kind {
            specs::IMAGE_UPLOAD => Some(UploadKind::Image),
            specs::VIDEO_UPLOAD => Some(UploadKind::Video),
            _ => None,
        }
    }
}

/// Transport collaborator. Implementations must be callable concurrently;
/// each call is independent.
pub trait Uploader: Send + Sync {
    /// Upload a file, yielding the URL it becomes reachable under.
    fn upload(&self, handle: FileHandle) -> BoxFuture<'static, Result<String, UploadError>>;
}

/// Where upload failures are surfaced. The default sink logs a warning.
pub type ErrorSink = Box<dyn Fn(&UploadError) + Send + Sync>;

pub fn default_error_sink() -> ErrorSink {
    Box::new(|err| warn!(%err, "upload failed"))
}

/// Register the file and insert its placeholder node at the selection.
pub fn insert_placeholder(
    state: &EditorState,
    schema: &Schema,
    pending: &mut PendingUploads,
    kind: UploadKind,
    handle: FileHandle,
) -> Result<(EditorState, FileId, NodeId), UploadError> {
    let file_id = pending.register(handle);
    let node = Node::new(kind.placeholder_kind())
        .with_attrs(Attrs::new().with("file_id", file_id.as_str()).with("state", "pending"));
    let node_id = node.id;

    let commands: Vec<Box<dyn Command>> = vec![Box::new(InsertNode { node })];
    match chain(&commands, state, schema) {
        Ok(next) => Ok((next, file_id, node_id)),
        Err(err) => {
            // Keep registry and document in step: no node, no entry.
            pending.release(&file_id);
            Err(err.into())
        }
    }
}

/// Apply the outcome of an upload to the placeholder inserted earlier.
///
/// `Ok(url)` swaps the placeholder for the resolved media node and retires
/// the registry entry. `Err` marks the placeholder failed and surfaces the
/// error through `sink`; the node stays visible but the entry is released
/// too, since the bytes were consumed when the transfer started and a
/// retry means picking the file again. A missing placeholder or registry
/// entry (the node was deleted, or the upload was cancelled while in
/// flight) is a no-op and returns `None`.
pub fn resolve(
    state: &EditorState,
    schema: &Schema,
    pending: &mut PendingUploads,
    file_id: &FileId,
    placeholder: NodeId,
    outcome: Result<String, UploadError>,
    sink: &ErrorSink,
) -> Result<Option<EditorState>, UploadError> {
    let Some(node) = state.doc.find(placeholder) else {
        debug!(%file_id, "upload finished for a placeholder that is gone");
        pending.release(file_id);
        return Ok(None);
    };
    let Some(kind) = UploadKind::of_placeholder(&node.kind) else {
        debug!(%file_id, kind = %node.kind, "resolution target is not an upload placeholder");
        return Ok(None);
    };
    if !pending.contains(file_id) {
        debug!(%file_id, "upload finished after its registry entry was released");
        return Ok(None);
    }

    match outcome {
        Ok(url) => {
            let commands: Vec<Box<dyn Command>> = vec![Box::new(ReplaceNode {
                id: placeholder,
                with: kind.resolved_node(&url),
            })];
            let next = chain(&commands, state, schema)?;
            pending.release(file_id);
            Ok(Some(next))
        }
        Err(err) => {
            sink(&err);
            let attrs = node
                .attrs
                .clone()
                .with("state", "failed");
            let commands: Vec<Box<dyn Command>> =
                vec![Box::new(folio_editor_core::SetNodeAttrs {
                    id: placeholder,
                    attrs,
                })];
            let next = chain(&commands, state, schema)?;
            pending.release(file_id);
            Ok(Some(next))
        }
    }
}

/// Remove the placeholder and its registry entry.
pub fn cancel(
    state: &EditorState,
    schema: &Schema,
    pending: &mut PendingUploads,
    file_id: &FileId,
    placeholder: NodeId,
) -> Result<EditorState, UploadError> {
    let commands: Vec<Box<dyn Command>> = vec![Box::new(DeleteNode { id: placeholder })];
    let next = chain(&commands, state, schema)?;
    pending.release(file_id);
    Ok(next)
}

/// Release registry entries whose placeholder left the document. Run
/// after every applied transaction.
pub fn reconcile(state: &EditorState, pending: &mut PendingUploads) {
    if pending.is_empty() {
        return;
    }
    let mut live = Vec::new();
    state.doc.walk(&mut |node| {
        if UploadKind::of_placeholder(&node.kind).is_some() {
            if let Some(id) = node.attrs.str_attr("file_id") {
                live.push(FileId(id.into()));
            }
        }
    });
    for id in pending.ids() {
        if !live.contains(&id) {
            debug!(file_id = %id, "placeholder vanished, releasing pending upload");
            pending.release(&id);
        }
    }
}
