//! Typed attribute bags.
//!
//! Node and mark attributes are ordered JSON maps. Order is preserved so
//! that serializing a parsed document emits attributes in the same order
//! they were declared, which keeps the persisted format diff-stable.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An ordered `name -> value` attribute record.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attrs(Map<String, Value>);

impl Attrs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insertion.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.0.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// String attribute, if present and a string.
    pub fn str_attr(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    /// Unsigned integer attribute, if present and numeric.
    pub fn u64_attr(&self, name: &str) -> Option<u64> {
        self.get(name).and_then(Value::as_u64)
    }

    /// Boolean attribute, if present and boolean.
    pub fn bool_attr(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }

    /// Whether every entry of `other` appears in `self` with an equal value.
    ///
    /// Used by selection-scoped `is_active` queries, where the caller may
    /// constrain only a subset of attributes (e.g. `{"level": 2}`).
    pub fn contains_all(&self, other: &Attrs) -> bool {
        other.iter().all(|(k, v)| self.get(k) == Some(v))
    }
}

impl FromIterator<(String, Value)> for Attrs {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Attrs(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn subset_matching() {
        let attrs = Attrs::new().with("level", 2).with("align", "left");
        let subset = Attrs::new().with("level", 2);
        let mismatch = Attrs::new().with("level", 3);

        assert!(attrs.contains_all(&subset));
        assert!(attrs.contains_all(&Attrs::new()));
        assert!(!attrs.contains_all(&mismatch));
    }

    #[test]
    fn typed_accessors() {
        let attrs = Attrs::new()
            .with("src", "https://example.com/a.png")
            .with("level", 3)
            .with("draggable", true);

        assert_eq!(attrs.str_attr("src"), Some("https://example.com/a.png"));
        assert_eq!(attrs.u64_attr("level"), Some(3));
        assert_eq!(attrs.bool_attr("draggable"), Some(true));
        assert_eq!(attrs.str_attr("level"), None);
    }

    #[test]
    fn preserves_insertion_order() {
        let attrs = Attrs::new().with("b", 1).with("a", 2).with("c", json!(null));
        let keys: Vec<&str> = attrs.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["b", "a", "c"]);
    }
}
