//! The editor facade: one struct owning state, schema, registry, plugins
//! and the slash menu, with the lifecycle entry points the host calls.
//!
//! Every mutation funnels through [`Editor::dispatch`] or one of the
//! lifecycle methods, all of which end in the same commit path: swap the
//! snapshot, run the upload reconcile sweep, re-sync the slash menu, and
//! notify the observer.

use std::sync::Arc;

use folio_editor_core::{
    Command, CommandError, EditorState, InsertNode, Node, NodeId, Schema, chain, parse_html,
    serialize_html,
};
use folio_markdown::{PastePayload, paste_payload};
use folio_nodes::component::{ComponentDef, ComponentForm, ComponentInstanceStore, component_node};
use folio_nodes::embed::{EmbedPlatform, placeholder_node};
use folio_nodes::{
    ErrorSink, FileHandle, FileId, MediaItem, PendingUploads, UploadError, UploadKind, Uploader,
    default_error_sink,
};
use futures_util::future::BoxFuture;
use tracing::debug;

use crate::compose::EditorKit;
use crate::error::KitError;
use crate::options::KitOptions;
use crate::plugins::{CharacterCountPlugin, FileDropPlugin, PlaceholderPlugin};

pub type Observer = Box<dyn Fn(&EditorState)>;

/// Everything the host needs to drive one upload to completion.
pub struct UploadTicket {
    pub file_id: FileId,
    pub node: NodeId,
    /// The transfer future, when an uploader is configured. The host
    /// awaits it and feeds the outcome to [`Editor::finish_upload`].
    pub transfer: Option<BoxFuture<'static, Result<String, UploadError>>>,
}

pub struct Editor {
    schema: Schema,
    state: EditorState,
    pending: PendingUploads,
    placeholder: Option<PlaceholderPlugin>,
    counter: CharacterCountPlugin,
    file_drop: FileDropPlugin,
    slash: folio_slash::SlashMenu,
    uploader: Option<Arc<dyn Uploader>>,
    components: Option<Arc<dyn folio_nodes::ComponentSource>>,
    media: Option<Arc<dyn folio_nodes::MediaSource>>,
    error_sink: ErrorSink,
    observer: Option<Observer>,
    markdown_threshold: f32,
}

impl Editor {
    /// An editor over a fresh single-paragraph document.
    pub fn new(options: KitOptions) -> Self {
        let kit = EditorKit::compose(&options);
        let doc = Node::new("doc").with_children(vec![Node::new("paragraph")]);
        let state = EditorState::at_start(doc, &kit.schema);
        Self::assemble(options, kit, state)
    }

    /// An editor over a persisted document.
    pub fn from_html(options: KitOptions, html: &str) -> Result<Self, KitError> {
        let kit = EditorKit::compose(&options);
        let doc = parse_html(html, &kit.schema)?;
        let state = EditorState::at_start(doc, &kit.schema);
        Ok(Self::assemble(options, kit, state))
    }

    fn assemble(options: KitOptions, kit: EditorKit, state: EditorState) -> Self {
        Self {
            schema: kit.schema,
            state,
            pending: PendingUploads::new(),
            placeholder: kit.placeholder,
            counter: kit.counter,
            file_drop: kit.file_drop,
            slash: kit.slash,
            uploader: options.uploader,
            components: options.components,
            media: options.media,
            error_sink: default_error_sink(),
            observer: None,
            markdown_threshold: options.markdown_threshold,
        }
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn pending_uploads(&self) -> &PendingUploads {
        &self.pending
    }

    /// The view reports selection changes here; the slash menu follows.
    pub fn set_selection(&mut self, selection: folio_editor_core::Selection) {
        self.state.selection = selection;
        self.sync_slash();
    }

    pub fn set_observer(&mut self, observer: Observer) {
        self.observer = Some(observer);
    }

    pub fn set_error_sink(&mut self, sink: ErrorSink) {
        self.error_sink = sink;
    }

    pub fn to_html(&self) -> String {
        serialize_html(&self.state.doc, &self.schema)
    }

    pub fn char_count(&self) -> usize {
        self.counter.count(&self.state)
    }

    pub fn hint(&self) -> Option<&str> {
        self.placeholder
            .as_ref()
            .and_then(|p| p.hint(&self.state, &self.schema))
    }

    // === Transactions ===

    /// Apply a command chain atomically, then run the post-apply sweep.
    pub fn dispatch(&mut self, commands: Vec<Box<dyn Command>>) -> Result<(), KitError> {
        let next = chain(&commands, &self.state, &self.schema)?;
        if self.counter.refuses(&self.state, &next) {
            debug!("transaction refused by character limit");
            return Err(CommandError::NotApplicable.into());
        }
        self.commit_state(next);
        Ok(())
    }

    fn commit_state(&mut self, next: EditorState) {
        self.state = next;
        folio_nodes::reconcile(&self.state, &mut self.pending);
        self.sync_slash();
        if let Some(observer) = &self.observer {
            observer(&self.state);
        }
    }

    // === Slash menu ===

    fn sync_slash(&mut self) {
        if !self.slash.is_open() {
            return;
        }
        match folio_slash::trigger_query(&self.state, &self.schema) {
            Some((range, query)) => self.slash.update_query(range, &query),
            None => self.slash.dismiss(),
        }
    }

    /// Open the menu if the snapshot is a live trigger site.
    pub fn open_slash(&mut self) -> bool {
        match folio_slash::trigger_query(&self.state, &self.schema) {
            Some((range, query)) => {
                self.slash.open(range, &query);
                true
            }
            None => false,
        }
    }

    pub fn slash(&self) -> &folio_slash::SlashMenu {
        &self.slash
    }

    pub fn slash_move_up(&mut self) {
        self.slash.move_up();
    }

    pub fn slash_move_down(&mut self) {
        self.slash.move_down();
    }

    /// Run the highlighted item. `false` when the menu had nothing to do.
    pub fn commit_slash(&mut self) -> Result<bool, KitError> {
        let Some(commands) = self.slash.commit() else {
            return Ok(false);
        };
        self.dispatch(commands)?;
        Ok(true)
    }

    /// Backspace over the trigger char: close the menu and, by default,
    /// delete the trigger text too.
    pub fn slash_backspace(&mut self) -> Result<(), KitError> {
        if let Some(commands) = self.slash.backspace_trigger() {
            self.dispatch(commands)?;
        }
        Ok(())
    }

    // === Uploads ===

    /// Route a dropped file by MIME type. `Ok(None)` means the file is
    /// not media and is left for other consumers.
    pub fn drop_file(&mut self, handle: FileHandle) -> Result<Option<UploadTicket>, KitError> {
        let Some(kind) = self.file_drop.route(&handle.mime) else {
            return Ok(None);
        };
        self.begin_upload(kind, handle).map(Some)
    }

    /// Insert a placeholder and start the transfer if an uploader is
    /// configured.
    pub fn begin_upload(
        &mut self,
        kind: UploadKind,
        handle: FileHandle,
    ) -> Result<UploadTicket, KitError> {
        let (next, file_id, node) =
            folio_nodes::insert_placeholder(&self.state, &self.schema, &mut self.pending, kind, handle)?;
        self.commit_state(next);

        let transfer = match &self.uploader {
            Some(uploader) => self
                .pending
                .consume(&file_id)
                .map(|handle| uploader.upload(handle)),
            None => None,
        };
        Ok(UploadTicket {
            file_id,
            node,
            transfer,
        })
    }

    /// Feed a finished transfer back into the document.
    pub fn finish_upload(
        &mut self,
        file_id: &FileId,
        node: NodeId,
        outcome: Result<String, UploadError>,
    ) -> Result<(), KitError> {
        let resolved = folio_nodes::resolve(
            &self.state,
            &self.schema,
            &mut self.pending,
            file_id,
            node,
            outcome,
            &self.error_sink,
        )?;
        if let Some(next) = resolved {
            self.commit_state(next);
        }
        Ok(())
    }

    pub fn cancel_upload(&mut self, file_id: &FileId, node: NodeId) -> Result<(), KitError> {
        let next = folio_nodes::cancel(&self.state, &self.schema, &mut self.pending, file_id, node)?;
        self.commit_state(next);
        Ok(())
    }

    /// Insert an already-hosted media library item.
    pub fn pick_media(&mut self, item: &MediaItem) -> Result<(), KitError> {
        let next = folio_nodes::insert_media_item(&self.state, &self.schema, item)?;
        self.commit_state(next);
        Ok(())
    }

    pub fn media_source(&self) -> Result<&Arc<dyn folio_nodes::MediaSource>, KitError> {
        self.media
            .as_ref()
            .ok_or(KitError::MissingCollaborator("media"))
    }

    // === Embeds ===

    /// Insert an empty embed placeholder for the platform.
    pub fn insert_embed(&mut self, platform: EmbedPlatform) -> Result<NodeId, KitError> {
        let node = placeholder_node(platform);
        let id = node.id;
        self.dispatch(vec![Box::new(InsertNode { node })])?;
        Ok(id)
    }

    /// Validate the typed URL and resolve the placeholder.
    pub fn commit_embed_url(&mut self, node: NodeId, input: &str) -> Result<(), KitError> {
        let next = folio_nodes::commit_url(&self.state, &self.schema, node, input)?;
        self.commit_state(next);
        Ok(())
    }

    // === Paste ===

    pub fn paste(&mut self, payload: &PastePayload<'_>) -> Result<(), KitError> {
        let next = paste_payload(&self.state, &self.schema, payload, self.markdown_threshold)?;
        if self.counter.refuses(&self.state, &next) {
            debug!("paste refused by character limit");
            return Err(CommandError::NotApplicable.into());
        }
        self.commit_state(next);
        Ok(())
    }

    // === Components ===

    pub async fn component_definitions(&self) -> Result<Vec<ComponentDef>, KitError> {
        let source = self
            .components
            .as_ref()
            .ok_or(KitError::MissingCollaborator("components"))?;
        Ok(source.list_definitions().await?)
    }

    pub fn insert_component(&mut self, def: &ComponentDef) -> Result<NodeId, KitError> {
        let node = component_node(def);
        let id = node.id;
        self.dispatch(vec![Box::new(InsertNode { node })])?;
        Ok(id)
    }

    /// A property form over an existing component node.
    pub fn component_form(
        &self,
        node: NodeId,
        defs: &[ComponentDef],
    ) -> Result<ComponentForm, KitError> {
        let node = self
            .state
            .doc
            .find(node)
            .ok_or(KitError::Command(CommandError::NotApplicable))?;
        Ok(ComponentForm::for_node(node, defs))
    }

    /// Commit a form; `Ok(false)` when the values were unchanged.
    pub fn apply_form(&mut self, form: &ComponentForm) -> Result<bool, KitError> {
        match form.commit(&self.state, &self.schema)? {
            Some(next) => {
                self.commit_state(next);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Bind every component node to a stored instance (save-time sync).
    pub async fn sync_components(
        &mut self,
        store: &dyn ComponentInstanceStore,
    ) -> Result<(), KitError> {
        let next = folio_nodes::sync_instances(&self.state, &self.schema, store).await?;
        self.commit_state(next);
        Ok(())
    }
}
