//! One options struct configures a whole editor composition.

use std::sync::Arc;

use folio_markdown::DEFAULT_DETECT_THRESHOLD;
use folio_nodes::{ComponentSource, MediaSource, Uploader};
use folio_slash::DEFAULT_SCORE_THRESHOLD;

/// Composition options. Collaborators are optional; features whose
/// collaborator is absent refuse politely instead of panicking.
#[derive(Clone)]
pub struct KitOptions {
    /// Hard cap on document characters. `None` means unlimited.
    pub character_limit: Option<usize>,
    /// Hint shown in an empty paragraph.
    pub placeholder: Option<String>,
    pub uploader: Option<Arc<dyn Uploader>>,
    pub components: Option<Arc<dyn ComponentSource>>,
    pub media: Option<Arc<dyn MediaSource>>,
    /// Minimum fuzzy score for slash menu items.
    pub slash_threshold: u32,
    /// Minimum structural score for markdown paste detection.
    pub markdown_threshold: f32,
}

impl Default for KitOptions {
    fn default() -> Self {
        Self {
            character_limit: None,
            placeholder: None,
            uploader: None,
            components: None,
            media: None,
            slash_threshold: DEFAULT_SCORE_THRESHOLD,
            markdown_threshold: DEFAULT_DETECT_THRESHOLD,
        }
    }
}
