//! Specs for the embeddable node kinds managed by the lifecycle
//! controllers. The composition kit registers these on top of the
//! structural backbone.

use folio_editor_core::{
    Attrs, AttrSpec, ContentKind, HtmlTag, Node, NodeSpec, ParseError, TagToken,
};
use serde_json::Value;

// Node kinds.
pub const IMAGE: &str = "image";
pub const VIDEO: &str = "video";
pub const FIGURE: &str = "figure";
pub const IMAGE_UPLOAD: &str = "image_upload";
pub const VIDEO_UPLOAD: &str = "video_upload";
pub const EMBED_PLACEHOLDER: &str = "embed_placeholder";
pub const VIDEO_EMBED: &str = "video_embed";
pub const SOCIAL_EMBED: &str = "social_embed";

// === Tag emitters ===

fn image_tag(node: &Node) -> HtmlTag {
    let tag = HtmlTag::new("img").attr("src", node.attrs.str_attr("src").unwrap_or_default());
    match node.attrs.str_attr("alt") {
        Some(alt) if !alt.is_empty() => tag.attr("alt", alt),
        _ => tag,
    }
}

fn video_tag(node: &Node) -> HtmlTag {
    HtmlTag::new("video").attr("src", node.attrs.str_attr("src").unwrap_or_default())
}

fn figure_tag(node: &Node) -> HtmlTag {
    HtmlTag::new("figure").attr("data-src", node.attrs.str_attr("src").unwrap_or_default())
}

fn upload_tag(node: &Node) -> HtmlTag {
    let tag = HtmlTag::new("div")
        .node_type(&node.kind)
        .attr("data-file-id", node.attrs.str_attr("file_id").unwrap_or_default());
    match node.attrs.str_attr("state") {
        Some(state) => tag.attr("data-state", state),
        None => tag,
    }
}

fn embed_placeholder_tag(node: &Node) -> HtmlTag {
    HtmlTag::new("div")
        .node_type(EMBED_PLACEHOLDER)
        .attr("data-platform", node.attrs.str_attr("platform").unwrap_or_default())
}

fn video_embed_tag(node: &Node) -> HtmlTag {
    HtmlTag::new("div")
        .node_type(VIDEO_EMBED)
        .attr("data-video-id", node.attrs.str_attr("video_id").unwrap_or_default())
        .attr("data-src", node.attrs.str_attr("src").unwrap_or_default())
}

fn social_embed_tag(node: &Node) -> HtmlTag {
    HtmlTag::new("div")
        .node_type(SOCIAL_EMBED)
        .attr("data-url", node.attrs.str_attr("url").unwrap_or_default())
}

// === Attr parsers ===

fn required_attr(token: &TagToken, html_name: &'static str) -> Result<String, ParseError> {
    token
        .attr(html_name)
        .map(str::to_owned)
        .ok_or_else(|| ParseError::BadAttribute {
            attr: html_name.into(),
            reason: "missing".into(),
        })
}

fn image_attrs(token: &TagToken) -> Result<Attrs, ParseError> {
    let attrs = Attrs::new().with("src", required_attr(token, "src")?);
    Ok(match token.attr("alt") {
        Some(alt) => attrs.with("alt", alt),
        None => attrs,
    })
}

fn video_attrs(token: &TagToken) -> Result<Attrs, ParseError> {
    Ok(Attrs::new().with("src", required_attr(token, "src")?))
}

fn figure_attrs(token: &TagToken) -> Result<Attrs, ParseError> {
    Ok(Attrs::new().with("src", required_attr(token, "data-src")?))
}

fn upload_attrs(token: &TagToken) -> Result<Attrs, ParseError> {
    let attrs = Attrs::new().with("file_id", required_attr(token, "data-file-id")?);
    Ok(match token.attr("data-state") {
        Some(state) => attrs.with("state", state),
        None => attrs,
    })
}

fn embed_placeholder_attrs(token: &TagToken) -> Result<Attrs, ParseError> {
    Ok(Attrs::new().with("platform", required_attr(token, "data-platform")?))
}

fn video_embed_attrs(token: &TagToken) -> Result<Attrs, ParseError> {
    Ok(Attrs::new()
        .with("video_id", required_attr(token, "data-video-id")?)
        .with("src", required_attr(token, "data-src")?))
}

fn social_embed_attrs(token: &TagToken) -> Result<Attrs, ParseError> {
    Ok(Attrs::new().with("url", required_attr(token, "data-url")?))
}

// === Specs ===

pub fn image_spec() -> NodeSpec {
    let mut spec = NodeSpec::block(IMAGE, ContentKind::None, image_tag);
    spec.atom = true;
    spec.draggable = true;
    spec.void = true;
    spec.attrs = vec![AttrSpec::required("src"), AttrSpec::optional("alt")];
    spec.parse_attrs = image_attrs;
    spec.claim_tags = &["img"];
    spec
}

pub fn video_spec() -> NodeSpec {
    let mut spec = NodeSpec::block(VIDEO, ContentKind::None, video_tag);
    spec.atom = true;
    spec.draggable = true;
    spec.attrs = vec![AttrSpec::required("src")];
    spec.parse_attrs = video_attrs;
    spec.claim_tags = &["video"];
    spec
}

/// Captioned image; the caption is the node's inline content.
pub fn figure_spec() -> NodeSpec {
    let mut spec = NodeSpec::block(FIGURE, ContentKind::Inline, figure_tag);
    spec.draggable = true;
    spec.attrs = vec![AttrSpec::required("src")];
    spec.parse_attrs = figure_attrs;
    spec.claim_tags = &["figure"];
    spec
}

fn upload_spec(kind: &'static str, data_type: &'static str) -> NodeSpec {
    let mut spec = NodeSpec::block(kind, ContentKind::None, upload_tag);
    spec.atom = true;
    spec.draggable = true;
    spec.attrs = vec![AttrSpec::required("file_id"), AttrSpec::optional("state")];
    spec.parse_attrs = upload_attrs;
    spec.data_type = Some(data_type);
    spec
}

pub fn image_upload_spec() -> NodeSpec {
    upload_spec(IMAGE_UPLOAD, "image_upload")
}

pub fn video_upload_spec() -> NodeSpec {
    upload_spec(VIDEO_UPLOAD, "video_upload")
}

pub fn embed_placeholder_spec() -> NodeSpec {
    let mut spec = NodeSpec::block(EMBED_PLACEHOLDER, ContentKind::None, embed_placeholder_tag);
    spec.atom = true;
    spec.attrs = vec![AttrSpec::required("platform")];
    spec.parse_attrs = embed_placeholder_attrs;
    spec.data_type = Some("embed_placeholder");
    spec
}

pub fn video_embed_spec() -> NodeSpec {
    let mut spec = NodeSpec::block(VIDEO_EMBED, ContentKind::None, video_embed_tag);
    spec.atom = true;
    spec.draggable = true;
    spec.attrs = vec![AttrSpec::required("video_id"), AttrSpec::required("src")];
    spec.parse_attrs = video_embed_attrs;
    spec.data_type = Some("video_embed");
    spec
}

pub fn social_embed_spec() -> NodeSpec {
    let mut spec = NodeSpec::block(SOCIAL_EMBED, ContentKind::None, social_embed_tag);
    spec.atom = true;
    spec.draggable = true;
    spec.attrs = vec![AttrSpec::required("url")];
    spec.parse_attrs = social_embed_attrs;
    spec.data_type = Some("social_embed");
    spec
}

/// Everything this crate registers, in registration order.
pub fn embeddable_specs() -> Vec<NodeSpec> {
    vec![
        image_spec(),
        video_spec(),
        figure_spec(),
        image_upload_spec(),
        video_upload_spec(),
        embed_placeholder_spec(),
        video_embed_spec(),
        social_embed_spec(),
        crate::component::component_spec(),
    ]
}

/// A resolved figure node with its caption text.
pub fn figure_node(src: &str, caption: &str) -> Node {
    let node = Node::new(FIGURE).with_attrs(Attrs::new().with("src", src));
    if caption.is_empty() {
        node
    } else {
        node.with_children(vec![Node::text(caption)])
    }
}

pub fn image_node(src: &str) -> Node {
    Node::new(IMAGE).with_attrs(Attrs::new().with("src", src))
}

pub fn video_node(src: &str) -> Node {
    Node::new(VIDEO).with_attrs(Attrs::new().with("src", src))
}

pub(crate) fn value_is_empty(value: &Value) -> bool {
    matches!(value, Value::Null) || value.as_str().is_some_and(str::is_empty)
}
