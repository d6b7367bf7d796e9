//! Signals: accumulating contextual facts about a folio.
//!
//! Keys are unique and append-only. A stage that wants to extend the
//! signals clones the current set and inserts new keys; inserting a key that
//! already exists is refused.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::folio::Folio;

pub const MISSING_DOCS: &str = "missing_docs";
pub const RAMO: &str = "ramo";
pub const REQUIERE_REASEGURO: &str = "requiere_reaseguro";
pub const CATALOG_LINE: &str = "catalog_line";
pub const ESTATUS: &str = "estatus";

/// Mapping from signal name to an arbitrary JSON value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Signals(BTreeMap<String, Value>);

impl Signals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Initial signals derived from a freshly fetched folio.
    pub fn from_folio(folio: &Folio) -> Self {
        let missing: Vec<Value> = folio
            .missing_documents()
            .map(|d| Value::String(d.name.clone()))
            .collect();

        let mut signals = Self::new();
        signals.insert(MISSING_DOCS, Value::Array(missing));
        signals.insert(RAMO, Value::String(folio.ramo().to_string()));
        signals.insert(REQUIERE_REASEGURO, Value::Bool(folio.requiere_reaseguro()));
        signals
    }

    /// Insert a new key. Returns `false` and leaves the existing value
    /// untouched when the key is already present.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> bool {
        let key = key.into();
        if self.0.contains_key(&key) {
            tracing::warn!(key = %key, "signal already set, keeping existing value");
            return false;
        }
        self.0.insert(key, value);
        true
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Names listed under `missing_docs`, in order. Non-string entries are
    /// ignored.
    pub fn missing_docs(&self) -> Vec<&str> {
        self.get(MISSING_DOCS)
            .and_then(Value::as_array)
            .map(|docs| docs.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::folio::Document;
    use serde_json::json;

    #[test]
    fn test_from_folio() {
        let folio = Folio::builder("F-1", "Vida", "Emisión", 10.0)
            .requiere_reaseguro(true)
            .document(Document::new("Contrato", true, false))
            .document(Document::new("INE", false, false))
            .build()
            .unwrap();

        let signals = Signals::from_folio(&folio);

        assert_eq!(signals.len(), 3);
        assert_eq!(signals.missing_docs(), vec!["Contrato"]);
        assert_eq!(signals.get(RAMO), Some(&json!("Vida")));
        assert_eq!(signals.get(REQUIERE_REASEGURO), Some(&json!(true)));
    }

    #[test]
    fn test_insert_is_append_only() {
        let mut signals = Signals::new();
        assert!(signals.insert("estatus", json!("Abierto")));
        assert!(!signals.insert("estatus", json!("Cerrado")));
        assert_eq!(signals.get("estatus"), Some(&json!("Abierto")));
    }

    #[test]
    fn test_serializes_as_plain_mapping() {
        let mut signals = Signals::new();
        signals.insert("ramo", json!("Vida"));
        assert_eq!(serde_json::to_value(&signals).unwrap(), json!({"ramo": "Vida"}));
    }
}
