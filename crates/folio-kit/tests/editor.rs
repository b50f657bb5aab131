//! End-to-end coverage of the composed editor: uploads, embeds,
//! components, slash menu, markdown paste and the always-on plugins.

use std::cell::Cell;
use std::rc::Rc;
use std::sync::Mutex;

use bytes::Bytes;
use folio_editor_core::{InsertNode, InsertText, Node, NodeId, Selection, SmolStr};
use folio_kit::{Editor, KitError, KitOptions};
use folio_markdown::PastePayload;
use folio_nodes::component::{
    ComponentDef, ComponentInstanceStore, PropertyDef,
};
use folio_nodes::specs::{figure_node, image_node, video_node};
use folio_nodes::{ComponentError, EmbedPlatform, FileHandle, UploadError, UploadKind};
use futures_util::future::BoxFuture;
use serde_json::Value;

fn editor() -> Editor {
    Editor::new(KitOptions::default())
}

fn type_text(editor: &mut Editor, text: &str) {
    editor
        .dispatch(vec![Box::new(InsertText { text: text.into() })])
        .unwrap();
}

fn find_kind(editor: &Editor, kind: &str) -> Option<NodeId> {
    let mut found = None;
    editor.state().doc.walk(&mut |node| {
        if node.kind == kind && found.is_none() {
            found = Some(node.id);
        }
    });
    found
}

fn png_handle() -> FileHandle {
    FileHandle {
        name: "photo.png".into(),
        mime: "image/png".into(),
        bytes: Bytes::from_static(b"\x89PNG"),
    }
}

// === Uploads ===

#[test]
fn upload_lifecycle_resolves_placeholder() {
    let mut editor = editor();
    let ticket = editor.drop_file(png_handle()).unwrap().unwrap();
    assert!(ticket.transfer.is_none(), "no uploader configured");

    let placeholder = editor.state().doc.find(ticket.node).unwrap();
    assert_eq!(placeholder.kind, "image_upload");
    assert_eq!(placeholder.attrs.str_attr("state"), Some("pending"));
    assert_eq!(editor.pending_uploads().len(), 1);

    editor
        .finish_upload(&ticket.file_id, ticket.node, Ok("https://cdn.example/photo.png".into()))
        .unwrap();

    assert!(editor.state().doc.find(ticket.node).is_none());
    let image = find_kind(&editor, "image").unwrap();
    let image = editor.state().doc.find(image).unwrap();
    assert_eq!(image.attrs.str_attr("src"), Some("https://cdn.example/photo.png"));
    assert!(editor.pending_uploads().is_empty(), "registry entry released");
}

#[test]
fn failed_upload_marks_placeholder_and_releases_entry() {
    let mut editor = editor();
    let ticket = editor.begin_upload(UploadKind::Image, png_handle()).unwrap();

    editor
        .finish_upload(
            &ticket.file_id,
            ticket.node,
            Err(UploadError::Transport("503".into())),
        )
        .unwrap();

    let placeholder = editor.state().doc.find(ticket.node).unwrap();
    assert_eq!(placeholder.attrs.str_attr("state"), Some("failed"));
    assert!(editor.pending_uploads().is_empty(), "no entry left to leak");
}

#[test]
fn late_resolution_after_cancel_is_a_no_op() {
    let mut editor = editor();
    let ticket = editor.begin_upload(UploadKind::Image, png_handle()).unwrap();
    editor.cancel_upload(&ticket.file_id, ticket.node).unwrap();
    assert!(editor.pending_uploads().is_empty());

    // The transfer finishes anyway; nothing changes.
    let before = editor.state().doc.clone();
    editor
        .finish_upload(&ticket.file_id, ticket.node, Ok("https://cdn.example/late.png".into()))
        .unwrap();
    assert!(editor.state().doc.structural_eq(&before));
    assert!(find_kind(&editor, "image").is_none());
}

#[test]
fn unroutable_mime_is_left_alone() {
    let mut editor = editor();
    let handle = FileHandle {
        name: "notes.pdf".into(),
        mime: "application/pdf".into(),
        bytes: Bytes::new(),
    };
    assert!(editor.drop_file(handle).unwrap().is_none());
    assert!(editor.pending_uploads().is_empty());
}

// === Embeds ===

#[test]
fn embed_url_commits_to_canonical_form() {
    let mut editor = editor();
    let node = editor.insert_embed(EmbedPlatform::Video).unwrap();
    editor
        .commit_embed_url(node, "https://youtu.be/dQw4w9WgXcQ?t=42")
        .unwrap();

    let embed = find_kind(&editor, "video_embed").unwrap();
    let embed = editor.state().doc.find(embed).unwrap();
    assert_eq!(embed.attrs.str_attr("video_id"), Some("dQw4w9WgXcQ"));
    assert_eq!(
        embed.attrs.str_attr("src"),
        Some("https://www.youtube.com/watch?v=dQw4w9WgXcQ")
    );
}

#[test]
fn invalid_embed_url_keeps_the_placeholder() {
    let mut editor = editor();
    let node = editor.insert_embed(EmbedPlatform::Video).unwrap();
    let err = editor.commit_embed_url(node, "https://example.com/watch").unwrap_err();
    assert!(matches!(err, KitError::Embed(_)));
    assert!(editor.state().doc.find(node).is_some());
}

// === Slash menu ===

#[test]
fn head_query_commits_heading_one() {
    let mut editor = editor();
    type_text(&mut editor, "/head");
    assert!(editor.open_slash());
    assert_eq!(editor.slash().visible()[0].title, "Heading 1");

    assert!(editor.commit_slash().unwrap());
    let block = &editor.state().doc.content[0];
    assert_eq!(block.kind, "heading");
    assert_eq!(block.attrs.u64_attr("level"), Some(1));
    assert_eq!(block.text_len(), 0, "trigger text removed");
    assert!(!editor.slash().is_open());
}

#[test]
fn no_trigger_inside_table_cells() {
    let mut editor = editor();
    let table = Node::new("table").with_children(vec![Node::new("table_row").with_children(
        vec![Node::new("table_cell").with_children(vec![Node::new("paragraph")])],
    )]);
    let cell_paragraph = table.content[0].content[0].content[0].id;
    editor.dispatch(vec![Box::new(InsertNode { node: table })]).unwrap();

    editor.set_selection(Selection::caret(cell_paragraph, 0));
    type_text(&mut editor, "/");
    assert!(!editor.open_slash());
}

#[test]
fn menu_follows_the_document() {
    let mut editor = editor();
    type_text(&mut editor, "/he");
    assert!(editor.open_slash());

    // Typing refines the query through the post-dispatch sync.
    type_text(&mut editor, "ad");
    assert!(editor.slash().is_open());
    assert_eq!(editor.slash().visible()[0].title, "Heading 1");

    // A second space after the trigger closes it.
    type_text(&mut editor, "  ");
    assert!(!editor.slash().is_open());
}

// === Paste ===

#[test]
fn markdown_paste_builds_rich_blocks() {
    let mut editor = editor();
    editor
        .paste(&PastePayload {
            text: "# Title\n\nSome *text*",
            file_name: None,
            mime: None,
        })
        .unwrap();

    insta::assert_snapshot!(
        editor.to_html(),
        @"<p></p><h1>Title</h1><p>Some <em>text</em></p>"
    );
}

#[test]
fn plain_prose_pastes_as_text() {
    let mut editor = editor();
    editor
        .paste(&PastePayload {
            text: "just a sentence with an * in it",
            file_name: None,
            mime: None,
        })
        .unwrap();
    assert_eq!(editor.state().doc.content.len(), 1);
    assert_eq!(editor.to_html(), "<p>just a sentence with an * in it</p>");
}

// === Persistence ===

#[test]
fn html_round_trip_is_structural_identity() {
    let mut editor = editor();
    editor
        .paste(&PastePayload {
            text: "# Notes\n\n- one\n- two\n\n> quoted\n\n```rust\nfn main() {}\n```",
            file_name: Some("notes.md"),
            mime: None,
        })
        .unwrap();
    let node = editor.insert_embed(EmbedPlatform::Social).unwrap();
    editor
        .commit_embed_url(node, "https://x.com/rustlang/status/1234567890")
        .unwrap();

    let html = editor.to_html();
    let reloaded = Editor::from_html(KitOptions::default(), &html).unwrap();
    assert!(reloaded.state().doc.structural_eq(&editor.state().doc));
    assert_eq!(reloaded.to_html(), html);
}

#[test]
fn ordered_list_paste_round_trips() {
    let mut editor = editor();
    editor
        .paste(&PastePayload {
            text: "1. one\n2. two",
            file_name: Some("list.md"),
            mime: None,
        })
        .unwrap();

    let html = editor.to_html();
    let reloaded = Editor::from_html(KitOptions::default(), &html).unwrap();
    assert!(reloaded.state().doc.structural_eq(&editor.state().doc));
}

#[test]
fn embeddable_kinds_round_trip() {
    let mut editor = editor();

    // In-flight placeholders persist as-is.
    editor.begin_upload(UploadKind::Image, png_handle()).unwrap();
    editor
        .begin_upload(
            UploadKind::Video,
            FileHandle {
                name: "clip.mp4".into(),
                mime: "video/mp4".into(),
                bytes: Bytes::from_static(b"mp4"),
            },
        )
        .unwrap();
    editor.insert_embed(EmbedPlatform::Social).unwrap();

    editor
        .dispatch(vec![Box::new(InsertNode {
            node: figure_node("https://cdn.example/fig.png", "a caption"),
        })])
        .unwrap();
    editor
        .dispatch(vec![Box::new(InsertNode {
            node: image_node("https://cdn.example/plain.png"),
        })])
        .unwrap();
    editor
        .dispatch(vec![Box::new(InsertNode {
            node: video_node("https://cdn.example/clip.mp4"),
        })])
        .unwrap();

    let embed = editor.insert_embed(EmbedPlatform::Video).unwrap();
    editor
        .commit_embed_url(embed, "https://www.youtube.com/watch?v=dQw4w9WgXcQ")
        .unwrap();

    let def = ComponentDef {
        name: "chart".into(),
        properties: vec![
            PropertyDef::text("title").required(),
            PropertyDef::number("height").with_default(Value::from(240)),
            PropertyDef::boolean("legend"),
        ],
    };
    let id = editor.insert_component(&def).unwrap();
    let mut form = editor.component_form(id, std::slice::from_ref(&def)).unwrap();
    form.set_field("title", r#"He said "a < b" & left"#).unwrap();
    form.set_field("height", "360").unwrap();
    form.set_field("legend", "true").unwrap();
    assert!(editor.apply_form(&form).unwrap());

    let html = editor.to_html();
    let reloaded = Editor::from_html(KitOptions::default(), &html).unwrap();
    assert!(reloaded.state().doc.structural_eq(&editor.state().doc));
    assert_eq!(reloaded.to_html(), html);
}

// === Plugins ===

#[test]
fn character_limit_refuses_growth_past_the_cap() {
    let mut editor = Editor::new(KitOptions {
        character_limit: Some(5),
        ..KitOptions::default()
    });
    type_text(&mut editor, "hello");
    assert_eq!(editor.char_count(), 5);

    let err = editor
        .dispatch(vec![Box::new(InsertText { text: "!".into() })])
        .unwrap_err();
    assert!(err.is_refusal());
    assert_eq!(editor.char_count(), 5, "snapshot untouched");
}

#[test]
fn placeholder_hint_shows_only_when_empty() {
    let mut editor = Editor::new(KitOptions {
        placeholder: Some("Start writing".into()),
        ..KitOptions::default()
    });
    assert_eq!(editor.hint(), Some("Start writing"));
    type_text(&mut editor, "x");
    assert_eq!(editor.hint(), None);
}

#[test]
fn observer_sees_every_commit() {
    let mut editor = editor();
    let seen = Rc::new(Cell::new(0));
    let counter = Rc::clone(&seen);
    editor.set_observer(Box::new(move |_| counter.set(counter.get() + 1)));

    type_text(&mut editor, "a");
    type_text(&mut editor, "b");
    assert_eq!(seen.get(), 2);

    // Refusals never notify.
    let _ = editor.dispatch(vec![Box::new(InsertText { text: String::new() })]);
    assert_eq!(seen.get(), 2);
}

// === Components ===

fn callout_def() -> ComponentDef {
    ComponentDef {
        name: "callout".into(),
        properties: vec![
            PropertyDef::text("title").required(),
            PropertyDef::boolean("dismissible").with_default(Value::Bool(false)),
        ],
    }
}

#[test]
fn component_commit_is_idempotent() {
    let mut editor = editor();
    let def = callout_def();
    let id = editor.insert_component(&def).unwrap();

    // Required field still empty: blocked.
    let form = editor.component_form(id, std::slice::from_ref(&def)).unwrap();
    let err = editor.apply_form(&form).unwrap_err();
    assert!(matches!(
        err,
        KitError::Component(ComponentError::RequiredField(_))
    ));

    let mut form = editor.component_form(id, std::slice::from_ref(&def)).unwrap();
    form.set_field("title", "Heads up").unwrap();
    assert!(editor.apply_form(&form).unwrap());

    // Reopening and committing untouched values produces no transaction.
    let form = editor.component_form(id, std::slice::from_ref(&def)).unwrap();
    assert!(!editor.apply_form(&form).unwrap());

    let node = editor.state().doc.find(id).unwrap();
    let props = node.attrs.get("properties").unwrap();
    assert_eq!(props["title"], Value::String("Heads up".into()));
    assert_eq!(props["dismissible"], Value::Bool(false));
}

struct SeqStore {
    created: Mutex<u32>,
}

impl ComponentInstanceStore for SeqStore {
    fn create(
        &self,
        _name: &str,
        _properties: &Value,
    ) -> BoxFuture<'static, Result<SmolStr, ComponentError>> {
        let mut n = self.created.lock().unwrap();
        *n += 1;
        let id = SmolStr::new(format!("inst-{n}"));
        Box::pin(async move { Ok(id) })
    }

    fn update(
        &self,
        _id: &str,
        _name: &str,
        _properties: &Value,
    ) -> BoxFuture<'static, Result<(), ComponentError>> {
        Box::pin(async { Ok(()) })
    }
}

#[tokio::test]
async fn save_time_sync_binds_instances() {
    let mut editor = editor();
    let def = callout_def();
    let first = editor.insert_component(&def).unwrap();
    let second = editor.insert_component(&def).unwrap();

    let store = SeqStore {
        created: Mutex::new(0),
    };
    editor.sync_components(&store).await.unwrap();

    let doc = &editor.state().doc;
    assert!(doc.find(first).unwrap().attrs.str_attr("instance_id").is_some());
    assert!(doc.find(second).unwrap().attrs.str_attr("instance_id").is_some());
    assert_eq!(*store.created.lock().unwrap(), 2);

    // A second sync updates in place and creates nothing new.
    editor.sync_components(&store).await.unwrap();
    assert_eq!(*store.created.lock().unwrap(), 2);
}

#[test]
fn missing_collaborators_refuse_politely() {
    let editor = editor();
    assert!(matches!(
        editor.media_source().unwrap_err(),
        KitError::MissingCollaborator("media")
    ));
}
