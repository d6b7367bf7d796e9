//! Immutable folio and document values.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::FolioError;

/// A document attached to a folio.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Document {
    /// Display name (e.g., "Contrato")
    pub name: String,

    /// Whether the workflow requires this document
    pub required: bool,

    /// Whether the document has been uploaded
    pub uploaded: bool,
}

impl Document {
    pub fn new(name: impl Into<String>, required: bool, uploaded: bool) -> Self {
        Self {
            name: name.into(),
            required,
            uploaded,
        }
    }

    /// Required but not yet uploaded.
    pub fn is_missing(&self) -> bool {
        self.required && !self.uploaded
    }
}

/// One insurance workflow record under risk review.
///
/// Fields are private: a `Folio` can only be obtained through
/// [`FolioBuilder::build`] or [`Folio::from_raw`](super::normalize), both of
/// which enforce `monto_prima >= 0`. A changed view is a new instance.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Folio {
    id: String,
    ramo: String,
    tipo_tramite: String,
    monto_prima: f64,
    requiere_reaseguro: bool,
    es_urgente: Option<bool>,
    catalog_line: Option<String>,
    estatus: Option<String>,
    updated_at: Option<DateTime<Utc>>,
    documents: Vec<Document>,
}

impl Folio {
    /// Start building a folio from its mandatory fields.
    pub fn builder(
        id: impl Into<String>,
        ramo: impl Into<String>,
        tipo_tramite: impl Into<String>,
        monto_prima: f64,
    ) -> FolioBuilder {
        FolioBuilder::new(id, ramo, tipo_tramite, monto_prima)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn ramo(&self) -> &str {
        &self.ramo
    }

    pub fn tipo_tramite(&self) -> &str {
        &self.tipo_tramite
    }

    pub fn monto_prima(&self) -> f64 {
        self.monto_prima
    }

    pub fn requiere_reaseguro(&self) -> bool {
        self.requiere_reaseguro
    }

    pub fn es_urgente(&self) -> Option<bool> {
        self.es_urgente
    }

    pub fn catalog_line(&self) -> Option<&str> {
        self.catalog_line.as_deref()
    }

    pub fn estatus(&self) -> Option<&str> {
        self.estatus.as_deref()
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Documents that are required but not uploaded, in folio order.
    pub fn missing_documents(&self) -> impl Iterator<Item = &Document> {
        self.documents.iter().filter(|d| d.is_missing())
    }

    pub fn missing_document_count(&self) -> usize {
        self.missing_documents().count()
    }
}

/// Builder for [`Folio`].
#[derive(Debug, Clone)]
pub struct FolioBuilder {
    id: String,
    ramo: String,
    tipo_tramite: String,
    monto_prima: f64,
    requiere_reaseguro: bool,
    es_urgente: Option<bool>,
    catalog_line: Option<String>,
    estatus: Option<String>,
    updated_at: Option<DateTime<Utc>>,
    documents: Vec<Document>,
}

impl FolioBuilder {
    pub fn new(
        id: impl Into<String>,
        ramo: impl Into<String>,
        tipo_tramite: impl Into<String>,
        monto_prima: f64,
    ) -> Self {
        Self {
            id: id.into(),
            ramo: ramo.into(),
            tipo_tramite: tipo_tramite.into(),
            monto_prima,
            requiere_reaseguro: false,
            es_urgente: None,
            catalog_line: None,
            estatus: None,
            updated_at: None,
            documents: Vec::new(),
        }
    }

    pub fn requiere_reaseguro(mut self, value: bool) -> Self {
        self.requiere_reaseguro = value;
        self
    }

    pub fn es_urgente(mut self, value: Option<bool>) -> Self {
        self.es_urgente = value;
        self
    }

    /// Empty strings are treated as absent.
    pub fn catalog_line(mut self, value: Option<String>) -> Self {
        self.catalog_line = value.filter(|s| !s.is_empty());
        self
    }

    /// Empty strings are treated as absent.
    pub fn estatus(mut self, value: Option<String>) -> Self {
        self.estatus = value.filter(|s| !s.is_empty());
        self
    }

    pub fn updated_at(mut self, value: Option<DateTime<Utc>>) -> Self {
        self.updated_at = value;
        self
    }

    pub fn document(mut self, document: Document) -> Self {
        self.documents.push(document);
        self
    }

    pub fn documents(mut self, documents: Vec<Document>) -> Self {
        self.documents = documents;
        self
    }

    /// Validate and build the folio.
    pub fn build(self) -> Result<Folio, FolioError> {
        if self.id.is_empty() {
            return Err(FolioError::MissingField("folio".to_string()));
        }
        if !self.monto_prima.is_finite() {
            return Err(FolioError::InvalidField {
                field: "monto_prima".to_string(),
                message: format!("{} is not a finite amount", self.monto_prima),
            });
        }
        if self.monto_prima < 0.0 {
            return Err(FolioError::NegativePremium(self.monto_prima));
        }

        Ok(Folio {
            id: self.id,
            ramo: self.ramo,
            tipo_tramite: self.tipo_tramite,
            monto_prima: self.monto_prima,
            requiere_reaseguro: self.requiere_reaseguro,
            es_urgente: self.es_urgente,
            catalog_line: self.catalog_line,
            estatus: self.estatus,
            updated_at: self.updated_at,
            documents: self.documents,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let folio = Folio::builder("WFE-1", "Vida", "Emisión", 10.0)
            .build()
            .unwrap();

        assert_eq!(folio.id(), "WFE-1");
        assert!(!folio.requiere_reaseguro());
        assert_eq!(folio.es_urgente(), None);
        assert!(folio.documents().is_empty());
    }

    #[test]
    fn test_negative_premium_rejected() {
        let result = Folio::builder("WFE-1", "Vida", "Emisión", -1.0).build();
        assert!(matches!(result, Err(FolioError::NegativePremium(_))));
    }

    #[test]
    fn test_nan_premium_rejected() {
        let result = Folio::builder("WFE-1", "Vida", "Emisión", f64::NAN).build();
        assert!(matches!(result, Err(FolioError::InvalidField { .. })));
    }

    #[test]
    fn test_empty_optional_strings_are_absent() {
        let folio = Folio::builder("WFE-1", "Vida", "Emisión", 0.0)
            .catalog_line(Some(String::new()))
            .estatus(Some("Abierto".to_string()))
            .build()
            .unwrap();

        assert_eq!(folio.catalog_line(), None);
        assert_eq!(folio.estatus(), Some("Abierto"));
    }

    #[test]
    fn test_absent_optionals_serialize_as_null() {
        let folio = Folio::builder("WFE-1", "Vida", "Emisión", 0.0)
            .build()
            .unwrap();

        let value = serde_json::to_value(&folio).unwrap();
        for key in ["es_urgente", "catalog_line", "estatus", "updated_at"] {
            assert_eq!(value.get(key), Some(&serde_json::Value::Null), "{}", key);
        }
    }

    #[test]
    fn test_missing_documents_preserve_order() {
        let folio = Folio::builder("WFE-1", "Vida", "Emisión", 0.0)
            .document(Document::new("Contrato", true, false))
            .document(Document::new("INE", false, false))
            .document(Document::new("Carátula", true, false))
            .document(Document::new("Póliza", true, true))
            .build()
            .unwrap();

        let names: Vec<&str> = folio.missing_documents().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Contrato", "Carátula"]);
        assert_eq!(folio.missing_document_count(), 2);
    }
}
