use folio_editor_core::{CommandError, ParseError};
use folio_markdown::MarkdownError;
use folio_nodes::{ComponentError, EmbedError, UploadError};
use thiserror::Error;

/// Everything the editor facade can report.
#[derive(Debug, Error)]
pub enum KitError {
    #[error(transparent)]
    Command(#[from] CommandError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error(transparent)]
    Embed(#[from] EmbedError),
    #[error(transparent)]
    Component(#[from] ComponentError),
    #[error(transparent)]
    Markdown(#[from] MarkdownError),
    #[error("no {0} collaborator configured")]
    MissingCollaborator(&'static str),
}

impl KitError {
    /// Refusals leave the document untouched and are safe to swallow.
    pub fn is_refusal(&self) -> bool {
        matches!(self, KitError::Command(err) if err.is_refusal())
    }
}
