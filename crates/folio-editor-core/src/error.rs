//! Error types for the editor core.

use crate::schema::SchemaError;

/// Outcome of a refused or defective command.
///
/// `NotApplicable` is the sanctioned no-op refusal: preconditions did not
/// hold and the document is unchanged. `Invariant` means a command produced
/// a tree the schema rejects, which is a defect in the command, not a user
/// error.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("command not applicable")]
    NotApplicable,
    #[error("schema invariant violated: {0}")]
    Invariant(#[from] SchemaError),
}

impl CommandError {
    pub fn is_refusal(&self) -> bool {
        matches!(self, CommandError::NotApplicable)
    }
}

/// Failure reading the persisted document format.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ParseError {
    #[error("unexpected end of input at byte {0}")]
    UnexpectedEof(usize),
    #[error("malformed tag at byte {0}")]
    MalformedTag(usize),
    #[error("unknown element `{0}`")]
    UnknownElement(String),
    #[error("unknown node type `{0}`")]
    UnknownNodeType(String),
    #[error("mismatched closing tag `{0}`")]
    MismatchedClose(String),
    #[error("bad attribute `{attr}`: {reason}")]
    BadAttribute { attr: String, reason: String },
    #[error("parsed document failed validation: {0}")]
    Invalid(String),
}
