//! External embed placeholders: video-share and social-post URLs.
//!
//! Validation reduces whatever the user pasted to a canonical identity
//! (video id, status URL) and re-derives the stored URL from that, so two
//! pastes of the same content serialize identically. Invalid input is a
//! typed error and leaves the placeholder untouched.

use std::sync::LazyLock;

use folio_editor_core::{Attrs, Command, EditorState, Node, NodeId, ReplaceNode, Schema, chain};
use regex::Regex;
use smol_str::SmolStr;

use crate::error::EmbedError;
use crate::specs::{EMBED_PLACEHOLDER, SOCIAL_EMBED, VIDEO_EMBED};

/// Platform an embed placeholder is waiting for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EmbedPlatform {
    Video,
    Social,
}

impl EmbedPlatform {
    pub fn attr_value(self) -> &'static str {
        match self {
            EmbedPlatform::Video => "video",
            EmbedPlatform::Social => "social",
        }
    }

    fn from_attr(value: &str) -> Option<Self> {
        match value {
            "video" => Some(EmbedPlatform::Video),
            "social" => Some(EmbedPlatform::Social),
            _ => None,
        }
    }
}

/// An empty placeholder node for the given platform.
pub fn placeholder_node(platform: EmbedPlatform) -> Node {
    Node::new(EMBED_PLACEHOLDER).with_attrs(Attrs::new().with("platform", platform.attr_value()))
}

// Accepted watch, short and embed forms. The id is always 11 characters.
static VIDEO_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:https?://)?(?:www\.|m\.)?(?:youtube\.com/(?:watch\?(?:[^#]*&)?v=|embed/|shorts/|live/)|youtu\.be/)(?P<id>[A-Za-z0-9_-]{11})(?:[?&#/].*)?$",
    )
    .unwrap()
});

// Status links on either domain, with or without query noise.
static SOCIAL_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:https?://)?(?:www\.|mobile\.)?(?:twitter\.com|x\.com)/(?P<user>[A-Za-z0-9_]{1,15})/status(?:es)?/(?P<id>\d+)(?:[?#/].*)?$",
    )
    .unwrap()
});

/// Extract the canonical 11-character video id from a share URL.
pub fn video_id(input: &str) -> Result<SmolStr, EmbedError> {
    VIDEO_URL_RE
        .captures(input.trim())
        .and_then(|c| c.name("id"))
        .map(|m| SmolStr::from(m.as_str()))
        .ok_or_else(|| EmbedError::InvalidVideoUrl(input.into()))
}

/// Canonical watch URL for a video id.
pub fn canonical_video_url(id: &str) -> String {
    format!("https://www.youtube.com/watch?v={id}")
}

/// Reduce a social post URL to its canonical status form.
pub fn canonical_social_url(input: &str) -> Result<String, EmbedError> {
    let caps = SOCIAL_URL_RE
        .captures(input.trim())
        .ok_or_else(|| EmbedError::InvalidSocialUrl(input.into()))?;
    let user = caps.name("user").map(|m| m.as_str()).unwrap_or_default();
    let id = caps.name("id").map(|m| m.as_str()).unwrap_or_default();
    Ok(format!("https://twitter.com/{user}/status/{id}"))
}

/// The resolved node a placeholder becomes for a validated input.
pub fn resolved_embed(platform: EmbedPlatform, input: &str) -> Result<Node, EmbedError> {
    match platform {
        EmbedPlatform::Video => {
            let id = video_id(input)?;
            Ok(Node::new(VIDEO_EMBED).with_attrs(
                Attrs::new()
                    .with("video_id", id.as_str())
                    .with("src", canonical_video_url(&id)),
            ))
        }
        EmbedPlatform::Social => {
            let url = canonical_social_url(input)?;
            Ok(Node::new(SOCIAL_EMBED).with_attrs(Attrs::new().with("url", url)))
        }
    }
}

/// Validate `input` and swap the placeholder for the resolved embed node,
/// located by id at its current position.
pub fn commit_url(
    state: &EditorState,
    schema: &Schema,
    node_id: NodeId,
    input: &str,
) -> Result<EditorState, EmbedError> {
    let node = state.doc.find(node_id).ok_or(EmbedError::MissingPlaceholder)?;
    if node.kind != EMBED_PLACEHOLDER {
        return Err(EmbedError::NotAPlaceholder);
    }
    let platform = node
        .attrs
        .str_attr("platform")
        .and_then(EmbedPlatform::from_attr)
        .ok_or(EmbedError::NotAPlaceholder)?;

    let with = resolved_embed(platform, input)?;
    let commands: Vec<Box<dyn Command>> = vec![Box::new(ReplaceNode { id: node_id, with })];
    Ok(chain(&commands, state, schema)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::specs;
    use folio_editor_core::{InsertNode, Selection};

    #[test]
    fn video_urls_normalize_to_one_form() {
        for input in [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ?t=42",
            "https://m.youtube.com/watch?list=PL123&v=dQw4w9WgXcQ",
            "www.youtube.com/embed/dQw4w9WgXcQ",
            "https://www.youtube.com/shorts/dQw4w9WgXcQ",
        ] {
            assert_eq!(video_id(input).unwrap(), "dQw4w9WgXcQ", "input: {input}");
        }
        assert_eq!(
            canonical_video_url("dQw4w9WgXcQ"),
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
        );
    }

    #[test]
    fn bad_video_url_is_typed_error() {
        for input in ["https://vimeo.com/12345", "youtube.com/watch?v=short", "not a url"] {
            assert!(matches!(video_id(input), Err(EmbedError::InvalidVideoUrl(_))));
        }
    }

    #[test]
    fn social_urls_normalize_to_canonical_status() {
        for input in [
            "https://twitter.com/rustlang/status/1234567890",
            "https://x.com/rustlang/status/1234567890?s=20",
            "mobile.twitter.com/rustlang/statuses/1234567890",
        ] {
            assert_eq!(
                canonical_social_url(input).unwrap(),
                "https://twitter.com/rustlang/status/1234567890",
                "input: {input}"
            );
        }
    }

    #[test]
    fn commit_url_replaces_placeholder_in_place() {
        let mut schema = folio_editor_core::basic::basic_schema();
        for spec in specs::embeddable_specs() {
            schema.register_node(spec);
        }
        let doc = folio_editor_core::Node::new("doc").with_children(vec![
            folio_editor_core::Node::new("paragraph")
                .with_children(vec![folio_editor_core::Node::text("intro")]),
        ]);
        let state = EditorState::at_start(doc, &schema);

        let placeholder = placeholder_node(EmbedPlatform::Video);
        let placeholder_id = placeholder.id;
        let commands: Vec<Box<dyn Command>> =
            vec![Box::new(InsertNode { node: placeholder })];
        let state = chain(&commands, &state, &schema).unwrap();
        assert_eq!(state.selection, Selection::Node(placeholder_id));

        let next = commit_url(
            &state,
            &schema,
            placeholder_id,
            "https://youtu.be/dQw4w9WgXcQ",
        )
        .unwrap();
        assert!(next.doc.find(placeholder_id).is_none());
        let embed = next
            .doc
            .content
            .iter()
            .find(|n| n.kind == VIDEO_EMBED)
            .unwrap();
        assert_eq!(embed.attrs.str_attr("video_id"), Some("dQw4w9WgXcQ"));
        assert_eq!(
            embed.attrs.str_attr("src"),
            Some("https://www.youtube.com/watch?v=dQw4w9WgXcQ")
        );
    }

    #[test]
    fn invalid_input_leaves_placeholder() {
        let mut schema = folio_editor_core::basic::basic_schema();
        for spec in specs::embeddable_specs() {
            schema.register_node(spec);
        }
        let doc = folio_editor_core::Node::new("doc").with_children(vec![
            folio_editor_core::Node::new("paragraph"),
            placeholder_node(EmbedPlatform::Social),
        ]);
        let placeholder_id = doc.content[1].id;
        let state = EditorState::at_start(doc, &schema);

        let result = commit_url(&state, &schema, placeholder_id, "https://example.com/post");
        assert!(matches!(result, Err(EmbedError::InvalidSocialUrl(_))));
        assert!(state.doc.find(placeholder_id).is_some());
    }
}
