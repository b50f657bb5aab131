//! folio-markdown: markdown interchange for the editor.
//!
//! This crate provides:
//! - `looks_like_markdown` / `markdown_score` - structural paste detection
//! - `parse_markdown` - pulldown-cmark events folded into document nodes
//! - `enrich` - retargeting bare images into captioned figures
//! - `paste_payload` - the full detect/parse/enrich/insert pipeline with a
//!   plain-text fallback

pub mod detect;
pub mod enrich;
pub mod parse;
pub mod paste;

pub use detect::{DEFAULT_DETECT_THRESHOLD, looks_like_markdown, markdown_score};
pub use enrich::enrich;
pub use parse::{MarkdownError, parse_markdown};
pub use paste::{PastePayload, paste_payload};
