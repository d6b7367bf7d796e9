//! Folio model and raw record normalization.
//!
//! A folio arrives from the form service as a loosely-typed JSON mapping.
//! This module turns that mapping into an immutable [`Folio`] value.

mod model;
mod normalize;

pub use model::{Document, Folio, FolioBuilder};
pub use normalize::{checkbox, decode_documents, FALLBACK_ID_FIELD, ID_FIELD};

use thiserror::Error;

/// Errors that can occur when constructing a folio.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FolioError {
    #[error("Record is not a JSON object")]
    NotAnObject,

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidField { field: String, message: String },

    #[error("Premium must be non-negative, got {0}")]
    NegativePremium(f64),
}
