//! folio-kit: the batteries-included editor bundle.
//!
//! Composes the full schema (structural kinds plus media, embed and
//! component nodes), the slash menu, markdown paste, the upload
//! lifecycle and the small always-on plugins behind one [`Editor`]
//! facade. Hosts that want finer control can still assemble the
//! underlying crates by hand.

pub mod compose;
pub mod editor;
pub mod error;
pub mod options;
pub mod plugins;

pub use compose::EditorKit;
pub use editor::{Editor, Observer, UploadTicket};
pub use error::KitError;
pub use options::KitOptions;
pub use plugins::{CharacterCountPlugin, FileDropPlugin, PlaceholderPlugin};

pub use folio_editor_core as core;
pub use folio_markdown as markdown;
pub use folio_nodes as nodes;
pub use folio_slash as slash;
