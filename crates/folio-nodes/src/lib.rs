//! folio-nodes: lifecycle controllers for embeddable node kinds.
//!
//! This crate provides:
//! - `PendingUploads` - the per-editor registry of files awaiting upload
//! - upload placeholder insert/resolve/cancel/reconcile, driven by an
//!   `Uploader` collaborator
//! - embed placeholder validation and commit for video-share and
//!   social-post URLs
//! - custom component nodes, their property form, and instance syncing
//! - the `MediaSource` library picker

pub mod component;
pub mod embed;
pub mod error;
pub mod media;
pub mod registry;
pub mod specs;
pub mod upload;

pub use component::{
    ComponentDef, ComponentForm, ComponentInstanceStore, ComponentSource, PropertyDef,
    PropertyKind, component_node, component_spec, sync_instances,
};
pub use embed::{EmbedPlatform, commit_url, placeholder_node, resolved_embed};
pub use error::{ComponentError, EmbedError, UploadError};
pub use media::{MediaItem, MediaPage, MediaSource, insert_media_item};
pub use registry::{FileHandle, FileId, PendingUploads};
pub use upload::{
    ErrorSink, UploadKind, Uploader, cancel, default_error_sink, insert_placeholder, reconcile,
    resolve,
};
