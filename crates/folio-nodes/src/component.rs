//! Custom component nodes and their property editing form.
//!
//! A component node stores `{ component_name, properties }` and renders
//! through a definition supplied at runtime by the [`ComponentSource`]
//! collaborator. The form tracks edits against the definition's property
//! kinds; commit produces a single attrs replacement, and committing
//! unchanged values produces no document diff at all.

use folio_editor_core::{
    Attrs, AttrSpec, Command, ContentKind, EditorState, HtmlTag, Node, NodeId, NodeSpec,
    ParseError, Schema, SetNodeAttrs, SmolStr, TagToken, chain,
};
use futures_util::future::BoxFuture;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::ComponentError;
use crate::specs::value_is_empty;

pub const CUSTOM_COMPONENT: &str = "custom_component";

/// Value type of one component property.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PropertyKind {
    Text,
    Number,
    Boolean,
}

#[derive(Clone, Debug)]
pub struct PropertyDef {
    pub name: SmolStr,
    pub kind: PropertyKind,
    pub required: bool,
    pub default: Option<Value>,
}

impl PropertyDef {
    pub fn text(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            kind: PropertyKind::Text,
            required: false,
            default: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn number(name: impl Into<SmolStr>) -> Self {
        Self {
            kind: PropertyKind::Number,
            ..Self::text(name)
        }
    }

    pub fn boolean(name: impl Into<SmolStr>) -> Self {
        Self {
            kind: PropertyKind::Boolean,
            ..Self::text(name)
        }
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }
}

/// A component definition as declared by the host application.
#[derive(Clone, Debug)]
pub struct ComponentDef {
    pub name: SmolStr,
    pub properties: Vec<PropertyDef>,
}

/// Runtime supplier of component definitions.
pub trait ComponentSource: Send + Sync {
    fn list_definitions(&self) -> BoxFuture<'static, Result<Vec<ComponentDef>, ComponentError>>;
}

/// Persistence collaborator for component instances.
pub trait ComponentInstanceStore: Send + Sync {
    /// Create an instance, returning its id.
    fn create(
        &self,
        name: &str,
        properties: &Value,
    ) -> BoxFuture<'static, Result<SmolStr, ComponentError>>;

    /// Update an existing instance in place.
    fn update(
        &self,
        id: &str,
        name: &str,
        properties: &Value,
    ) -> BoxFuture<'static, Result<(), ComponentError>>;
}

// === Node spec ===

fn component_tag(node: &Node) -> HtmlTag {
    let mut tag = HtmlTag::new("div")
        .node_type(CUSTOM_COMPONENT)
        .attr(
            "data-component-name",
            node.attrs.str_attr("component_name").unwrap_or_default(),
        );
    if let Some(id) = node.attrs.str_attr("instance_id") {
        tag = tag.attr("data-instance-id", id);
    }
    if let Some(Value::Object(props)) = node.attrs.get("properties") {
        for (name, value) in props {
            tag = tag.attr(format!("data-prop-{name}"), value.to_string());
        }
    }
    tag
}

fn component_attrs(token: &TagToken) -> Result<Attrs, ParseError> {
    let name = token
        .attr("data-component-name")
        .ok_or_else(|| ParseError::BadAttribute {
            attr: "data-component-name".into(),
            reason: "missing".into(),
        })?;
    let mut props = Map::new();
    for (prop, raw) in token.attrs_with_prefix("data-prop-") {
        let value: Value = serde_json::from_str(raw).map_err(|e| ParseError::BadAttribute {
            attr: format!("data-prop-{prop}").into(),
            reason: e.to_string(),
        })?;
        props.insert(prop.to_owned(), value);
    }
    let mut attrs = Attrs::new()
        .with("component_name", name)
        .with("properties", Value::Object(props));
    if let Some(id) = token.attr("data-instance-id") {
        attrs = attrs.with("instance_id", id);
    }
    Ok(attrs)
}

pub fn component_spec() -> NodeSpec {
    let mut spec = NodeSpec::block(CUSTOM_COMPONENT, ContentKind::None, component_tag);
    spec.atom = true;
    spec.isolating = true;
    spec.draggable = true;
    spec.attrs = vec![
        AttrSpec::required("component_name"),
        AttrSpec::with_default("properties", Value::Object(Map::new())),
        AttrSpec::optional("instance_id"),
    ];
    spec.parse_attrs = component_attrs;
    spec.data_type = Some("custom_component");
    spec
}

/// A fresh component node for a definition, defaults applied.
pub fn component_node(def: &ComponentDef) -> Node {
    Node::new(CUSTOM_COMPONENT).with_attrs(
        Attrs::new()
            .with("component_name", def.name.as_str())
            .with("properties", Value::Object(default_properties(def))),
    )
}

fn default_properties(def: &ComponentDef) -> Map<String, Value> {
    let mut props = Map::new();
    for prop in &def.properties {
        if let Some(default) = &prop.default {
            props.insert(prop.name.to_string(), default.clone());
        }
    }
    props
}

fn node_properties(node: &Node) -> Map<String, Value> {
    match node.attrs.get("properties") {
        Some(Value::Object(props)) => props.clone(),
        _ => Map::new(),
    }
}

// === Property form ===

/// Editing state of a component's property form.
pub enum ComponentForm {
    Ready {
        target: NodeId,
        def: ComponentDef,
        values: Map<String, Value>,
        original: Map<String, Value>,
    },
    /// The node references a definition the source no longer lists.
    /// Editing is blocked but the node itself stays intact.
    MissingDefinition { target: NodeId, name: SmolStr },
}

impl ComponentForm {
    /// Build a form for an existing node, looking its definition up in the
    /// supplied list.
    pub fn for_node(node: &Node, defs: &[ComponentDef]) -> Self {
        let name: SmolStr = node.attrs.str_attr("component_name").unwrap_or_default().into();
        let Some(def) = defs.iter().find(|d| d.name == name) else {
            debug!(component = %name, "component definition not found, form blocked");
            return ComponentForm::MissingDefinition {
                target: node.id,
                name,
            };
        };
        let mut values = default_properties(def);
        for (k, v) in node_properties(node) {
            values.insert(k, v);
        }
        ComponentForm::Ready {
            target: node.id,
            def: def.clone(),
            original: values.clone(),
            values,
        }
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, ComponentForm::MissingDefinition { .. })
    }

    pub fn value(&self, field: &str) -> Option<&Value> {
        match self {
            ComponentForm::Ready { values, .. } => values.get(field),
            ComponentForm::MissingDefinition { .. } => None,
        }
    }

    /// Set a field from raw user input, coercing by the declared kind.
    /// Numeric fields accept an empty string as "still empty".
    pub fn set_field(&mut self, field: &str, input: &str) -> Result<(), ComponentError> {
        let (def, values) = match self {
            ComponentForm::Ready { def, values, .. } => (&*def, values),
            ComponentForm::MissingDefinition { name, .. } => {
                return Err(ComponentError::MissingDefinition(name.to_string()));
            }
        };
        let prop = def
            .properties
            .iter()
            .find(|p| p.name == field)
            .ok_or_else(|| ComponentError::Store(format!("unknown field `{field}`")))?;

        let value = match prop.kind {
            PropertyKind::Text => Value::String(input.to_owned()),
            PropertyKind::Number => {
                let trimmed = input.trim();
                if trimmed.is_empty() {
                    Value::String(String::new())
                } else if let Ok(n) = trimmed.parse::<i64>() {
                    Value::from(n)
                } else if let Ok(f) = trimmed.parse::<f64>() {
                    Value::from(f)
                } else {
                    return Err(ComponentError::NotNumeric {
                        field: field.to_owned(),
                        value: input.to_owned(),
                    });
                }
            }
            PropertyKind::Boolean => {
                Value::Bool(matches!(input.trim(), "true" | "1" | "on" | "yes"))
            }
        };
        values.insert(field.to_owned(), value);
        Ok(())
    }

    /// Commit the edited values back to the document. Unchanged values are
    /// a no-op returning `None`; a second identical commit therefore never
    /// produces a second transaction.
    pub fn commit(
        &self,
        state: &EditorState,
        schema: &Schema,
    ) -> Result<Option<EditorState>, ComponentError> {
        let (target, def, values, original) = match self {
            ComponentForm::Ready {
                target,
                def,
                values,
                original,
            } => (target, def, values, original),
            ComponentForm::MissingDefinition { name, .. } => {
                return Err(ComponentError::MissingDefinition(name.to_string()));
            }
        };

        for prop in &def.properties {
            if prop.required && values.get(prop.name.as_str()).is_none_or(value_is_empty) {
                return Err(ComponentError::RequiredField(prop.name.to_string()));
            }
        }
        if values == original {
            return Ok(None);
        }

        let node = state
            .doc
            .find(*target)
            .ok_or_else(|| ComponentError::Store("component node is gone".into()))?;
        let attrs = node
            .attrs
            .clone()
            .with("properties", Value::Object(values.clone()));
        let commands: Vec<Box<dyn Command>> = vec![Box::new(SetNodeAttrs { id: *target, attrs })];
        Ok(Some(chain(&commands, state, schema)?))
    }
}

/// Bind every component node in the document to a stored instance.
///
/// Unbound nodes are created through the store and receive an
/// `instance_id` attr; bound nodes are updated in place. Nothing else in
/// the document changes.
pub async fn sync_instances(
    state: &EditorState,
    schema: &Schema,
    store: &dyn ComponentInstanceStore,
) -> Result<EditorState, ComponentError> {
    struct Target {
        node_id: NodeId,
        name: String,
        instance_id: Option<String>,
        properties: Value,
    }

    let mut targets = Vec::new();
    state.doc.walk(&mut |node| {
        if node.kind == CUSTOM_COMPONENT {
            targets.push(Target {
                node_id: node.id,
                name: node.attrs.str_attr("component_name").unwrap_or_default().to_owned(),
                instance_id: node.attrs.str_attr("instance_id").map(str::to_owned),
                properties: Value::Object(node_properties(node)),
            });
        }
    });

    let mut current = state.clone();
    for target in targets {
        match &target.instance_id {
            Some(id) => {
                store.update(id, &target.name, &target.properties).await?;
            }
            None => {
                let id = store.create(&target.name, &target.properties).await?;
                debug!(component = %target.name, instance = %id, "bound component instance");
                let node = current
                    .doc
                    .find(target.node_id)
                    .ok_or_else(|| ComponentError::Store("component node is gone".into()))?;
                let attrs = node.attrs.clone().with("instance_id", id.as_str());
                let commands: Vec<Box<dyn Command>> = vec![Box::new(SetNodeAttrs {
                    id: target.node_id,
                    attrs,
                })];
                current = chain(&commands, &current, schema)?;
            }
        }
    }
    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn callout_def() -> ComponentDef {
        ComponentDef {
            name: "callout".into(),
            properties: vec![
                PropertyDef::text("title").required(),
                PropertyDef::number("width"),
                PropertyDef::boolean("dismissible").with_default(Value::Bool(false)),
            ],
        }
    }

    fn schema() -> Schema {
        let mut schema = folio_editor_core::basic::basic_schema();
        for spec in crate::specs::embeddable_specs() {
            schema.register_node(spec);
        }
        schema
    }

    fn state_with_component(def: &ComponentDef) -> (EditorState, NodeId) {
        let node = component_node(def);
        let id = node.id;
        let doc = Node::new("doc")
            .with_children(vec![Node::new("paragraph"), node]);
        (EditorState::at_start(doc, &schema()), id)
    }

    #[test]
    fn form_requires_required_fields() {
        let schema = schema();
        let def = callout_def();
        let (state, id) = state_with_component(&def);
        let node = state.doc.find(id).unwrap();

        let form = ComponentForm::for_node(node, &[def]);
        let result = form.commit(&state, &schema);
        assert!(matches!(result, Err(ComponentError::RequiredField(f)) if f == "title"));
    }

    #[test]
    fn commit_is_idempotent() {
        let schema = schema();
        let def = callout_def();
        let (state, id) = state_with_component(&def);
        let node = state.doc.find(id).unwrap();

        let mut form = ComponentForm::for_node(node, &[def.clone()]);
        form.set_field("title", "Note").unwrap();
        form.set_field("width", "480").unwrap();
        let next = form.commit(&state, &schema).unwrap().unwrap();

        let props = next.doc.find(id).unwrap().attrs.get("properties").unwrap();
        assert_eq!(props["title"], Value::from("Note"));
        assert_eq!(props["width"], Value::from(480));

        // A fresh form over the committed node has nothing to change.
        let form = ComponentForm::for_node(next.doc.find(id).unwrap(), &[def]);
        assert!(form.commit(&next, &schema).unwrap().is_none());
    }

    #[test]
    fn numeric_coercion_keeps_empty_empty() {
        let def = callout_def();
        let (state, id) = state_with_component(&def);
        let node = state.doc.find(id).unwrap();

        let mut form = ComponentForm::for_node(node, &[def]);
        form.set_field("width", "  ").unwrap();
        assert_eq!(form.value("width"), Some(&Value::String(String::new())));
        form.set_field("width", "12.5").unwrap();
        assert_eq!(form.value("width"), Some(&Value::from(12.5)));
        assert!(matches!(
            form.set_field("width", "wide"),
            Err(ComponentError::NotNumeric { .. })
        ));
    }

    #[test]
    fn missing_definition_blocks_editing() {
        let def = callout_def();
        let (state, id) = state_with_component(&def);
        let node = state.doc.find(id).unwrap();

        let mut form = ComponentForm::for_node(node, &[]);
        assert!(form.is_blocked());
        assert!(matches!(
            form.set_field("title", "x"),
            Err(ComponentError::MissingDefinition(_))
        ));
        assert!(matches!(
            form.commit(&state, &schema()),
            Err(ComponentError::MissingDefinition(_))
        ));
    }

    struct RecordingStore {
        created: Mutex<Vec<String>>,
        updated: Mutex<Vec<String>>,
    }

    impl RecordingStore {
        fn new() -> Self {
            Self {
                created: Mutex::new(Vec::new()),
                updated: Mutex::new(Vec::new()),
            }
        }
    }

    impl ComponentInstanceStore for RecordingStore {
        fn create(
            &self,
            name: &str,
            _properties: &Value,
        ) -> BoxFuture<'static, Result<SmolStr, ComponentError>> {
            let mut created = self.created.lock().unwrap();
            created.push(name.to_owned());
            let id = SmolStr::from(format!("inst-{}", created.len()));
            Box::pin(async move { Ok(id) })
        }

        fn update(
            &self,
            id: &str,
            _name: &str,
            _properties: &Value,
        ) -> BoxFuture<'static, Result<(), ComponentError>> {
            self.updated.lock().unwrap().push(id.to_owned());
            Box::pin(async { Ok(()) })
        }
    }

    #[tokio::test]
    async fn sync_binds_new_and_updates_bound() {
        let schema = schema();
        let def = callout_def();

        let unbound = component_node(&def);
        let unbound_id = unbound.id;
        let bound = component_node(&def)
            .with_attrs(
                Attrs::new()
                    .with("component_name", "callout")
                    .with("properties", Value::Object(Map::new()))
                    .with("instance_id", "inst-existing"),
            );
        let doc = Node::new("doc").with_children(vec![Node::new("paragraph"), unbound, bound]);
        let state = EditorState::at_start(doc, &schema);

        let store = RecordingStore::new();
        let next = sync_instances(&state, &schema, &store).await.unwrap();

        assert_eq!(*store.created.lock().unwrap(), vec!["callout".to_owned()]);
        assert_eq!(*store.updated.lock().unwrap(), vec!["inst-existing".to_owned()]);
        assert_eq!(
            next.doc.find(unbound_id).unwrap().attrs.str_attr("instance_id"),
            Some("inst-1")
        );
    }
}
