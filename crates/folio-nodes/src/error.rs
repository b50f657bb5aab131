use folio_editor_core::CommandError;
use thiserror::Error;

/// Failures in the file upload lifecycle.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("no pending file registered under `{0}`")]
    UnknownFile(String),
    #[error("file `{0}` was already consumed")]
    AlreadyConsumed(String),
    #[error("placeholder node is gone")]
    MissingPlaceholder,
    #[error("transport: {0}")]
    Transport(String),
    #[error(transparent)]
    Command(#[from] CommandError),
}

/// Failures validating or committing an external embed URL.
#[derive(Debug, Error)]
pub enum EmbedError {
    #[error("not a recognized video share URL: `{0}`")]
    InvalidVideoUrl(String),
    #[error("not a recognized social post URL: `{0}`")]
    InvalidSocialUrl(String),
    #[error("placeholder node is gone")]
    MissingPlaceholder,
    #[error("node is not an embed placeholder")]
    NotAPlaceholder,
    #[error(transparent)]
    Command(#[from] CommandError),
}

/// Failures editing or syncing custom component nodes.
#[derive(Debug, Error)]
pub enum ComponentError {
    #[error("no component definition named `{0}`")]
    MissingDefinition(String),
    #[error("required field `{0}` is empty")]
    RequiredField(String),
    #[error("field `{field}` is not numeric: `{value}`")]
    NotNumeric { field: String, value: String },
    #[error("instance store: {0}")]
    Store(String),
    #[error(transparent)]
    Command(#[from] CommandError),
}
