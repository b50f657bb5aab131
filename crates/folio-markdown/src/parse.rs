//! Markdown to document nodes.
//!
//! Drives `pulldown-cmark` and folds its event stream into block nodes.
//! Closing events are paired against our own scope stack, so the builder
//! never depends on the payload of an `End` event. Anything the schema
//! cannot express (inline HTML, footnotes) degrades to plain text rather
//! than being dropped.

use folio_editor_core::{Attrs, Mark, MarkSet, Node, Schema};
use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum MarkdownError {
    #[error("unbalanced markdown structure")]
    Unbalanced,
    #[error("parsed markdown failed validation: {0}")]
    Invalid(#[from] folio_editor_core::SchemaError),
    #[error(transparent)]
    Command(#[from] folio_editor_core::CommandError),
}

/// What an open `Start` tag committed us to closing.
enum Scope {
    Textblock,
    Container,
    Mark,
    Image { src: String, alt: String },
    /// Open tag we ignore wholesale (metadata containers).
    Skip,
}

struct Builder {
    done: Vec<Node>,
    containers: Vec<Node>,
    textblock: Option<Node>,
    marks: Vec<Mark>,
    scopes: Vec<Scope>,
}

impl Builder {
    fn new() -> Self {
        Self {
            done: Vec::new(),
            containers: Vec::new(),
            textblock: None,
            marks: Vec::new(),
            scopes: Vec::new(),
        }
    }

    fn push_block(&mut self, node: Node) {
        match self.containers.last_mut() {
            Some(parent) => parent.content.push(node),
            None => self.done.push(node),
        }
    }

    fn open_textblock(&mut self, node: Node) {
        // Loose list items hand us text without a paragraph; an implicit
        // one is already open in that case.
        if let Some(open) = self.textblock.take() {
            self.push_block(open);
        }
        self.textblock = Some(node);
        self.scopes.push(Scope::Textblock);
    }

    fn open_container(&mut self, node: Node) {
        if let Some(open) = self.textblock.take() {
            self.push_block(open);
        }
        self.containers.push(node);
        self.scopes.push(Scope::Container);
    }

    fn open_mark(&mut self, mark: Mark) {
        self.marks.push(mark);
        self.scopes.push(Scope::Mark);
    }

    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        // Text inside an open image is its alt text, marks and all.
        if let Some(Scope::Image { alt, .. }) = self
            .scopes
            .iter_mut()
            .rev()
            .find(|s| matches!(s, Scope::Image { .. }))
        {
            alt.push_str(text);
            return;
        }
        let block = self
            .textblock
            .get_or_insert_with(|| Node::new("paragraph"));
        block
            .content
            .push(Node::marked_text(text, self.marks.clone()));
    }

    fn push_inline(&mut self, node: Node) {
        if self.scopes.iter().any(|s| matches!(s, Scope::Image { .. })) {
            return;
        }
        let block = self
            .textblock
            .get_or_insert_with(|| Node::new("paragraph"));
        block.content.push(node);
    }

    fn close(&mut self) -> Result<(), MarkdownError> {
        match self.scopes.pop().ok_or(MarkdownError::Unbalanced)? {
            Scope::Textblock => {
                if let Some(block) = self.textblock.take() {
                    self.push_block(block);
                }
            }
            Scope::Container => {
                if let Some(open) = self.textblock.take() {
                    self.push_block(open);
                }
                let container = self.containers.pop().ok_or(MarkdownError::Unbalanced)?;
                self.push_block(container);
            }
            Scope::Mark => {
                self.marks.pop();
            }
            Scope::Image { src, alt } => {
                let attrs = if alt.is_empty() {
                    Attrs::new().with("src", src)
                } else {
                    Attrs::new().with("src", src).with("alt", alt)
                };
                if let Some(open) = self.textblock.take() {
                    self.push_block(open);
                }
                self.push_block(Node::new("image").with_attrs(attrs));
            }
            Scope::Skip => {}
        }
        Ok(())
    }

    fn finish(mut self) -> Result<Vec<Node>, MarkdownError> {
        if let Some(block) = self.textblock.take() {
            self.push_block(block);
        }
        if !self.scopes.is_empty() || !self.containers.is_empty() {
            return Err(MarkdownError::Unbalanced);
        }
        Ok(self.done)
    }
}

fn heading_level(level: HeadingLevel) -> u64 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Parse markdown into block nodes, normalized against the schema.
pub fn parse_markdown(text: &str, schema: &Schema) -> Result<Vec<Node>, MarkdownError> {
    let parser = Parser::new_ext(text, Options::ENABLE_STRIKETHROUGH);
    let mut b = Builder::new();

    for event in parser {
        match event {
            Event::Start(tag) => match tag {
                Tag::Paragraph => b.open_textblock(Node::new("paragraph")),
                Tag::Heading { level, .. } => b.open_textblock(
                    Node::new("heading")
                        .with_attrs(Attrs::new().with("level", heading_level(level))),
                ),
                Tag::CodeBlock(kind) => {
                    let attrs = match kind {
                        CodeBlockKind::Fenced(lang) if !lang.is_empty() => {
                            Attrs::new().with("language", lang.as_ref())
                        }
                        _ => Attrs::new(),
                    };
                    b.open_textblock(Node::new("code_block").with_attrs(attrs));
                }
                Tag::BlockQuote(_) => b.open_container(Node::new("blockquote")),
                Tag::List(start) => match start {
                    // A start of 1 stays implicit, like the persisted
                    // format leaves it.
                    Some(n) if n != 1 => b.open_container(
                        Node::new("ordered_list").with_attrs(Attrs::new().with("start", n)),
                    ),
                    Some(_) => b.open_container(Node::new("ordered_list")),
                    None => b.open_container(Node::new("bullet_list")),
                },
                Tag::Item => b.open_container(Node::new("list_item")),
                Tag::Emphasis => b.open_mark(Mark::new("italic")),
                Tag::Strong => b.open_mark(Mark::new("bold")),
                Tag::Strikethrough => b.open_mark(Mark::new("strike")),
                Tag::Link { dest_url, .. } => b.open_mark(Mark::with_attrs(
                    "link",
                    Attrs::new().with("href", dest_url.as_ref()),
                )),
                Tag::Image { dest_url, .. } => b.scopes.push(Scope::Image {
                    src: dest_url.to_string(),
                    alt: String::new(),
                }),
                other => {
                    debug!(?other, "ignoring unsupported markdown container");
                    b.scopes.push(Scope::Skip);
                }
            },
            Event::End(_) => b.close()?,
            Event::Text(t) => b.push_text(&t),
            Event::Code(t) => {
                let mut marks = b.marks.clone();
                marks.add_mark(Mark::new("code"));
                b.push_inline(Node::marked_text(t.as_ref(), marks));
            }
            Event::SoftBreak => b.push_text(" "),
            Event::HardBreak => b.push_inline(Node::new("hard_break")),
            Event::Rule => b.push_block(Node::new("divider")),
            Event::Html(t) | Event::InlineHtml(t) => b.push_text(&t),
            // Extensions that produce these are not enabled.
            _ => {}
        }
    }

    let mut blocks = b.finish()?;
    for block in &mut blocks {
        block.normalize_inline(schema);
    }
    Ok(blocks)
}
