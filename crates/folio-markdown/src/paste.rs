//! Paste intake: detect, parse, enrich, insert.

use folio_editor_core::{
    Command, DeleteRange, EditorState, InsertNode, InsertText, Schema, Selection, chain,
};
use tracing::debug;

use crate::detect::markdown_score;
use crate::enrich::enrich;
use crate::parse::{MarkdownError, parse_markdown};

/// What arrived on the clipboard or via file drop.
#[derive(Clone, Copy, Debug)]
pub struct PastePayload<'a> {
    pub text: &'a str,
    pub file_name: Option<&'a str>,
    pub mime: Option<&'a str>,
}

impl PastePayload<'_> {
    /// Declared markdown bypasses detection entirely.
    fn declared_markdown(&self) -> bool {
        if self.mime.is_some_and(|m| m.eq_ignore_ascii_case("text/markdown")) {
            return true;
        }
        self.file_name.is_some_and(|name| {
            let lower = name.to_ascii_lowercase();
            lower.ends_with(".md") || lower.ends_with(".markdown")
        })
    }
}

/// Insert a paste at the selection. Markdown is parsed and enriched into
/// native blocks; anything that fails along the way degrades to a plain
/// text insert so the content is never lost.
pub fn paste_payload(
    state: &EditorState,
    schema: &Schema,
    payload: &PastePayload<'_>,
    threshold: f32,
) -> Result<EditorState, MarkdownError> {
    let as_markdown = payload.declared_markdown() || markdown_score(payload.text) >= threshold;
    if as_markdown {
        match insert_markdown(state, schema, payload.text) {
            Ok(next) => return Ok(next),
            Err(err) => {
                debug!(%err, "markdown paste failed, falling back to plain text");
            }
        }
    }
    insert_plain(state, schema, payload.text)
}

fn insert_markdown(
    state: &EditorState,
    schema: &Schema,
    text: &str,
) -> Result<EditorState, MarkdownError> {
    let mut blocks = parse_markdown(text, schema)?;
    enrich(&mut blocks);
    if blocks.is_empty() {
        return Err(MarkdownError::Unbalanced);
    }

    let mut commands: Vec<Box<dyn Command>> = Vec::new();
    if let Selection::Text { anchor, head } = state.selection {
        if anchor != head {
            commands.push(Box::new(DeleteRange {
                from: anchor,
                to: head,
            }));
        }
    }
    // Each insert selects its node, so the next block lands after it.
    for block in blocks {
        commands.push(Box::new(InsertNode { node: block }));
    }
    Ok(chain(&commands, state, schema)?)
}

fn insert_plain(
    state: &EditorState,
    schema: &Schema,
    text: &str,
) -> Result<EditorState, MarkdownError> {
    let commands: Vec<Box<dyn Command>> = vec![Box::new(InsertText {
        text: text.to_owned(),
    })];
    Ok(chain(&commands, state, schema)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::DEFAULT_DETECT_THRESHOLD;
    use folio_editor_core::basic::basic_schema;
    use folio_editor_core::Node;

    fn start(schema: &Schema) -> EditorState {
        let doc = Node::new("doc").with_children(vec![
            Node::new("paragraph").with_children(vec![Node::text("intro")]),
        ]);
        EditorState::at_start(doc, schema)
    }

    fn payload(text: &str) -> PastePayload<'_> {
        PastePayload {
            text,
            file_name: None,
            mime: None,
        }
    }

    #[test]
    fn markdown_paste_becomes_blocks() {
        let schema = basic_schema();
        let state = start(&schema);
        let next = paste_payload(
            &state,
            &schema,
            &payload("# Title\n\nSome *text*"),
            DEFAULT_DETECT_THRESHOLD,
        )
        .unwrap();

        let kinds: Vec<&str> = next.doc.content.iter().map(|n| n.kind.as_str()).collect();
        assert_eq!(kinds, vec!["paragraph", "heading", "paragraph"]);
        assert_eq!(next.doc.content[1].inline_text(), "Title");
        assert_eq!(next.doc.content[2].inline_text(), "Some text");
    }

    #[test]
    fn prose_paste_stays_inline() {
        let schema = basic_schema();
        let state = start(&schema);
        let next = paste_payload(
            &state,
            &schema,
            &payload("just prose"),
            DEFAULT_DETECT_THRESHOLD,
        )
        .unwrap();
        assert_eq!(next.doc.content.len(), 1);
        assert_eq!(next.doc.content[0].inline_text(), "just proseintro");
    }

    #[test]
    fn md_file_bypasses_detection() {
        let schema = basic_schema();
        let state = start(&schema);
        let next = paste_payload(
            &state,
            &schema,
            &PastePayload {
                text: "plain line",
                file_name: Some("NOTES.md"),
                mime: None,
            },
            DEFAULT_DETECT_THRESHOLD,
        )
        .unwrap();
        // Parsed as markdown: one paragraph block inserted after the intro.
        assert_eq!(next.doc.content.len(), 2);
        assert_eq!(next.doc.content[1].inline_text(), "plain line");
    }

    #[test]
    fn unknown_kind_falls_back_to_plain_text() {
        // A schema without the figure kind cannot hold enriched output;
        // the paste degrades to text instead of erroring.
        let schema = basic_schema();
        let state = start(&schema);
        let md = "![cap](https://x/p.png)";
        let next = paste_payload(&state, &schema, &payload(md), 0.0).unwrap();
        assert_eq!(next.doc.content.len(), 1);
        assert!(next.doc.content[0].inline_text().contains("![cap]"));
    }
}
