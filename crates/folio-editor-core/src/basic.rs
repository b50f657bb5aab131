//! Built-in structural node and mark specs.
//!
//! These cover the text backbone every kit composition includes: document
//! root, paragraphs, headings, quotes, code blocks, lists, tables, layout
//! columns, text runs, hard breaks, and the divider. Richer embeddable
//! kinds live with their lifecycle controllers and are registered on top
//! of these by the composition kit.

use serde_json::Value;

use crate::attrs::Attrs;
use crate::error::ParseError;
use crate::html::{HtmlTag, TagToken};
use crate::node::{Mark, Node};
use crate::schema::{AttrSpec, ContentKind, MarkSpec, NodeSpec, Schema, parse_no_attrs};

// === Tag emitters ===

fn doc_tag(_: &Node) -> HtmlTag {
    // The root is never wrapped; this hook exists only to satisfy the spec.
    HtmlTag::new("div")
}

fn p_tag(_: &Node) -> HtmlTag {
    HtmlTag::new("p")
}

fn heading_tag(node: &Node) -> HtmlTag {
    let level = node.attrs.u64_attr("level").unwrap_or(1).clamp(1, 6);
    HtmlTag::new(format!("h{level}"))
}

fn blockquote_tag(_: &Node) -> HtmlTag {
    HtmlTag::new("blockquote")
}

fn code_block_tag(node: &Node) -> HtmlTag {
    let tag = HtmlTag::new("pre");
    match node.attrs.str_attr("language") {
        Some(lang) if !lang.is_empty() => tag.attr("data-lang", lang),
        _ => tag,
    }
}

fn bullet_list_tag(_: &Node) -> HtmlTag {
    HtmlTag::new("ul")
}

fn ordered_list_tag(node: &Node) -> HtmlTag {
    let tag = HtmlTag::new("ol");
    match node.attrs.u64_attr("start") {
        Some(start) if start != 1 => tag.attr("start", start.to_string()),
        _ => tag,
    }
}

fn list_item_tag(_: &Node) -> HtmlTag {
    HtmlTag::new("li")
}

fn table_tag(_: &Node) -> HtmlTag {
    HtmlTag::new("table")
}

fn table_row_tag(_: &Node) -> HtmlTag {
    HtmlTag::new("tr")
}

fn table_cell_tag(_: &Node) -> HtmlTag {
    HtmlTag::new("td")
}

fn column_list_tag(_: &Node) -> HtmlTag {
    HtmlTag::new("div").node_type("column_list")
}

fn column_tag(_: &Node) -> HtmlTag {
    HtmlTag::new("div").node_type("column")
}

fn divider_tag(_: &Node) -> HtmlTag {
    HtmlTag::new("hr")
}

fn hard_break_tag(_: &Node) -> HtmlTag {
    HtmlTag::new("br")
}

fn text_tag(_: &Node) -> HtmlTag {
    // Text runs are written directly; never dispatched through the spec.
    HtmlTag::new("span")
}

// === Attr parsers ===

fn heading_attrs(token: &TagToken) -> Result<Attrs, ParseError> {
    let level = token
        .name
        .strip_prefix('h')
        .and_then(|s| s.parse::<u64>().ok())
        .filter(|l| (1..=6).contains(l))
        .ok_or_else(|| ParseError::BadAttribute {
            attr: "level".into(),
            reason: format!("cannot derive heading level from `{}`", token.name),
        })?;
    Ok(Attrs::new().with("level", level))
}

fn code_block_attrs(token: &TagToken) -> Result<Attrs, ParseError> {
    Ok(match token.attr("data-lang") {
        Some(lang) => Attrs::new().with("language", lang),
        None => Attrs::new(),
    })
}

fn ordered_list_attrs(token: &TagToken) -> Result<Attrs, ParseError> {
    match token.attr("start") {
        Some(raw) => {
            let start: u64 = raw.parse().map_err(|_| ParseError::BadAttribute {
                attr: "start".into(),
                reason: format!("not a number: `{raw}`"),
            })?;
            Ok(Attrs::new().with("start", start))
        }
        None => Ok(Attrs::new()),
    }
}

// === Node specs ===

pub fn doc_spec() -> NodeSpec {
    let mut spec = NodeSpec::block("doc", ContentKind::Blocks, doc_tag);
    spec.layout_container = true;
    spec
}

pub fn paragraph_spec() -> NodeSpec {
    let mut spec = NodeSpec::block("paragraph", ContentKind::Inline, p_tag);
    spec.paragraph_like = true;
    spec.claim_tags = &["p"];
    spec
}

pub fn heading_spec() -> NodeSpec {
    let mut spec = NodeSpec::block("heading", ContentKind::Inline, heading_tag);
    spec.paragraph_like = true;
    spec.attrs = vec![AttrSpec::required("level")];
    spec.parse_attrs = heading_attrs;
    spec.claim_tags = &["h1", "h2", "h3", "h4", "h5", "h6"];
    spec
}

pub fn blockquote_spec() -> NodeSpec {
    let mut spec = NodeSpec::block("blockquote", ContentKind::Blocks, blockquote_tag);
    spec.claim_tags = &["blockquote"];
    spec
}

pub fn code_block_spec() -> NodeSpec {
    let mut spec = NodeSpec::block("code_block", ContentKind::Inline, code_block_tag);
    spec.code = true;
    spec.attrs = vec![AttrSpec::optional("language")];
    spec.parse_attrs = code_block_attrs;
    spec.claim_tags = &["pre"];
    spec
}

pub fn bullet_list_spec() -> NodeSpec {
    let mut spec = NodeSpec::block("bullet_list", ContentKind::Blocks, bullet_list_tag);
    spec.claim_tags = &["ul"];
    spec
}

pub fn ordered_list_spec() -> NodeSpec {
    let mut spec = NodeSpec::block("ordered_list", ContentKind::Blocks, ordered_list_tag);
    spec.attrs = vec![AttrSpec::with_default("start", Value::from(1u64))];
    spec.parse_attrs = ordered_list_attrs;
    spec.claim_tags = &["ol"];
    spec
}

pub fn list_item_spec() -> NodeSpec {
    let mut spec = NodeSpec::block("list_item", ContentKind::Blocks, list_item_tag);
    spec.claim_tags = &["li"];
    spec
}

pub fn table_spec() -> NodeSpec {
    let mut spec = NodeSpec::block("table", ContentKind::Blocks, table_tag);
    spec.isolating = true;
    spec.claim_tags = &["table"];
    spec
}

pub fn table_row_spec() -> NodeSpec {
    let mut spec = NodeSpec::block("table_row", ContentKind::Blocks, table_row_tag);
    spec.claim_tags = &["tr"];
    spec
}

pub fn table_cell_spec() -> NodeSpec {
    let mut spec = NodeSpec::block("table_cell", ContentKind::Blocks, table_cell_tag);
    spec.isolating = true;
    spec.claim_tags = &["td"];
    spec
}

pub fn column_list_spec() -> NodeSpec {
    let mut spec = NodeSpec::block("column_list", ContentKind::Blocks, column_list_tag);
    spec.data_type = Some("column_list");
    spec
}

pub fn column_spec() -> NodeSpec {
    let mut spec = NodeSpec::block("column", ContentKind::Blocks, column_tag);
    spec.data_type = Some("column");
    spec.layout_container = true;
    spec
}

pub fn divider_spec() -> NodeSpec {
    let mut spec = NodeSpec::block("divider", ContentKind::None, divider_tag);
    spec.atom = true;
    spec.void = true;
    spec.claim_tags = &["hr"];
    spec
}

pub fn text_spec() -> NodeSpec {
    let mut spec = NodeSpec::block("text", ContentKind::None, text_tag);
    spec.inline = true;
    spec
}

pub fn hard_break_spec() -> NodeSpec {
    let mut spec = NodeSpec::block("hard_break", ContentKind::None, hard_break_tag);
    spec.atom = true;
    spec.inline = true;
    spec.void = true;
    spec.claim_tags = &["br"];
    spec
}

// === Mark specs ===

fn bold_tag(_: &Mark) -> HtmlTag {
    HtmlTag::new("strong")
}

fn italic_tag(_: &Mark) -> HtmlTag {
    HtmlTag::new("em")
}

fn code_mark_tag(_: &Mark) -> HtmlTag {
    HtmlTag::new("code")
}

fn strike_tag(_: &Mark) -> HtmlTag {
    HtmlTag::new("s")
}

fn link_tag(mark: &Mark) -> HtmlTag {
    HtmlTag::new("a").attr("href", mark.attrs.str_attr("href").unwrap_or_default())
}

fn color_tag(mark: &Mark) -> HtmlTag {
    HtmlTag::new("span").attr("data-color", mark.attrs.str_attr("color").unwrap_or_default())
}

fn link_attrs(token: &TagToken) -> Result<Attrs, ParseError> {
    let href = token.attr("href").ok_or_else(|| ParseError::BadAttribute {
        attr: "href".into(),
        reason: "missing on link".into(),
    })?;
    Ok(Attrs::new().with("href", href))
}

fn color_attrs(token: &TagToken) -> Result<Attrs, ParseError> {
    let color = token
        .attr("data-color")
        .ok_or_else(|| ParseError::BadAttribute {
            attr: "data-color".into(),
            reason: "missing on color span".into(),
        })?;
    Ok(Attrs::new().with("color", color))
}

fn simple_mark(
    kind: &'static str,
    to_tag: fn(&Mark) -> HtmlTag,
    claim_tags: &'static [&'static str],
) -> MarkSpec {
    MarkSpec {
        kind: kind.into(),
        attrs: Vec::new(),
        to_tag,
        parse_attrs: parse_no_attrs,
        claim_tags,
    }
}

pub fn bold_mark() -> MarkSpec {
    simple_mark("bold", bold_tag, &["strong"])
}

pub fn italic_mark() -> MarkSpec {
    simple_mark("italic", italic_tag, &["em"])
}

pub fn code_mark() -> MarkSpec {
    simple_mark("code", code_mark_tag, &["code"])
}

pub fn strike_mark() -> MarkSpec {
    simple_mark("strike", strike_tag, &["s"])
}

pub fn link_mark() -> MarkSpec {
    MarkSpec {
        kind: "link".into(),
        attrs: vec![AttrSpec::required("href")],
        to_tag: link_tag,
        parse_attrs: link_attrs,
        claim_tags: &["a"],
    }
}

pub fn color_mark() -> MarkSpec {
    MarkSpec {
        kind: "color".into(),
        attrs: vec![AttrSpec::required("color")],
        to_tag: color_tag,
        parse_attrs: color_attrs,
        claim_tags: &["span"],
    }
}

/// The structural backbone with no embeddable kinds; enough for core tests.
pub fn basic_schema() -> Schema {
    let mut schema = Schema::new();
    for spec in [
        doc_spec(),
        paragraph_spec(),
        heading_spec(),
        blockquote_spec(),
        code_block_spec(),
        bullet_list_spec(),
        ordered_list_spec(),
        list_item_spec(),
        table_spec(),
        table_row_spec(),
        table_cell_spec(),
        column_list_spec(),
        column_spec(),
        divider_spec(),
        text_spec(),
        hard_break_spec(),
    ] {
        schema.register_node(spec);
    }
    for mark in [
        bold_mark(),
        italic_mark(),
        code_mark(),
        strike_mark(),
        link_mark(),
        color_mark(),
    ] {
        schema.register_mark(mark);
    }
    schema
}
