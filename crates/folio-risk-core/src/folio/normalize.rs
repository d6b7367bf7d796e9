//! Normalization of raw form-service records into [`Folio`] values.
//!
//! The form service is lax about types: checkboxes arrive as `"on"`/`""`,
//! numbers as strings, the document grid as a JSON-encoded string, and text
//! with HTML entities. Everything is coerced here so the scorer only ever
//! sees a well-typed folio.

use std::borrow::Cow;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::{Map, Value};

use super::{Document, Folio, FolioError};

/// Canonical folio identifier field.
pub const ID_FIELD: &str = "folio";

/// Generic identifier used when the canonical field is absent.
pub const FALLBACK_ID_FIELD: &str = "id";

const TRUTHY: [&str; 4] = ["on", "true", "1", "yes"];

const ENTITIES: [(&str, &str); 13] = [
    ("&ntilde;", "ñ"),
    ("&Ntilde;", "Ñ"),
    ("&aacute;", "á"),
    ("&eacute;", "é"),
    ("&iacute;", "í"),
    ("&oacute;", "ó"),
    ("&uacute;", "ú"),
    ("&Aacute;", "Á"),
    ("&Eacute;", "É"),
    ("&Iacute;", "Í"),
    ("&Oacute;", "Ó"),
    ("&Uacute;", "Ú"),
    ("&amp;", "&"),
];

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

impl Folio {
    /// Build a folio from a raw form-service record.
    ///
    /// Fails when the record is not an object, lacks an identifier, `ramo`,
    /// `tipo_tramite` or `monto_prima`, or carries an invalid premium.
    /// Optional fields that cannot be interpreted are dropped instead.
    pub fn from_raw(raw: &Value) -> Result<Folio, FolioError> {
        let record = raw.as_object().ok_or(FolioError::NotAnObject)?;

        let id = text_field(record, ID_FIELD)
            .or_else(|| text_field(record, FALLBACK_ID_FIELD))
            .ok_or_else(|| FolioError::MissingField(ID_FIELD.to_string()))?;
        let ramo = required_text(record, "ramo")?;
        let tipo_tramite = required_text(record, "tipo_tramite")?;
        let monto_prima = premium(record.get("monto_prima"))?;

        Folio::builder(id, ramo, tipo_tramite, monto_prima)
            .requiere_reaseguro(checkbox(record.get("requiere_reaseguro")))
            .es_urgente(record.get("es_urgente").map(|v| checkbox(Some(v))))
            .catalog_line(text_field(record, "catalog_line"))
            .estatus(text_field(record, "estatus"))
            .updated_at(record.get("updated_at").and_then(timestamp))
            .documents(decode_documents(record.get("documents")))
            .build()
    }
}

/// Normalize a checkbox-style value.
///
/// Booleans pass through; strings matching `on`, `true`, `1` or `yes`
/// (case-insensitive) are true; anything else, including absence, is false.
pub fn checkbox(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => {
            let s = s.trim();
            TRUTHY.iter().any(|t| s.eq_ignore_ascii_case(t))
        }
        _ => false,
    }
}

/// Decode the document grid.
///
/// Accepts an array or a JSON-encoded string holding an array. A string that
/// fails to decode yields an empty list. Non-object entries are skipped.
pub fn decode_documents(value: Option<&Value>) -> Vec<Document> {
    let decoded;
    let items = match value {
        Some(Value::Array(items)) => items,
        Some(Value::String(encoded)) => {
            if encoded.trim().is_empty() {
                return Vec::new();
            }
            decoded = match serde_json::from_str::<Value>(encoded) {
                Ok(Value::Array(items)) => items,
                Ok(_) | Err(_) => {
                    tracing::debug!("documents field did not decode to an array, ignoring");
                    return Vec::new();
                }
            };
            &decoded
        }
        _ => return Vec::new(),
    };

    items
        .iter()
        .filter_map(Value::as_object)
        .map(|doc| {
            Document::new(
                text_field(doc, "name").unwrap_or_else(|| "unknown".to_string()),
                checkbox(doc.get("required")),
                checkbox(doc.get("uploaded")),
            )
        })
        .collect()
}

fn required_text(record: &Map<String, Value>, field: &str) -> Result<String, FolioError> {
    text_field(record, field).ok_or_else(|| FolioError::MissingField(field.to_string()))
}

/// Non-empty text value of a field, with HTML entities decoded.
fn text_field(record: &Map<String, Value>, field: &str) -> Option<String> {
    let text = match record.get(field)? {
        Value::String(s) => decode_entities(s.trim()).into_owned(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn premium(value: Option<&Value>) -> Result<f64, FolioError> {
    let invalid = |message: String| FolioError::InvalidField {
        field: "monto_prima".to_string(),
        message,
    };

    match value {
        None | Some(Value::Null) => Err(FolioError::MissingField("monto_prima".to_string())),
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| invalid(format!("{} is not representable", n))),
        Some(Value::String(s)) => {
            let cleaned: String = s.trim().chars().filter(|c| *c != ',').collect();
            cleaned
                .parse::<f64>()
                .map_err(|_| invalid(format!("'{}' is not a number", s)))
        }
        Some(other) => Err(invalid(format!("unexpected value {}", other))),
    }
}

fn timestamp(value: &Value) -> Option<DateTime<Utc>> {
    let s = value.as_str()?.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    let parsed = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc());
    if parsed.is_none() {
        tracing::debug!(value = s, "unparseable updated_at, treating as absent");
    }
    parsed
}

fn decode_entities(s: &str) -> Cow<'_, str> {
    if !s.contains('&') {
        return Cow::Borrowed(s);
    }
    let mut out = s.to_string();
    for (entity, replacement) in ENTITIES {
        if out.contains(entity) {
            out = out.replace(entity, replacement);
        }
    }
    Cow::Owned(out)
}
