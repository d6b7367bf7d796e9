//! Data sources that turn a folio identifier into a [`Folio`].

use async_trait::async_trait;
use folio_risk_core::{Folio, FolioError};
use thiserror::Error;

mod joget;

pub use joget::{JogetClient, JOGET_API_KEY_ENV};

/// Errors from fetching a folio. Every variant names the URL or record
/// involved so callers can surface it verbatim.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Folio '{id}' not found at {url}")]
    NotFound { id: String, url: String },

    #[error("Form service returned {status} for {url}: {body}")]
    Status { status: u16, url: String, body: String },

    #[error("Could not connect to {url}: {message}")]
    Connect { url: String, message: String },

    #[error("Request to {url} timed out")]
    Timeout { url: String },

    #[error("HTTP request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("Malformed JSON from {url}: {message}")]
    MalformedJson { url: String, message: String },

    #[error("Invalid record for folio '{id}': {source}")]
    InvalidRecord {
        id: String,
        #[source]
        source: FolioError,
    },
}

impl FetchError {
    /// True for a missing record, as opposed to a transport or payload problem.
    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchError::NotFound { .. })
    }
}

/// Anything that can fetch folios by identifier.
///
/// Implementations are long-lived and shared across concurrent analyses.
#[async_trait]
pub trait FolioSource: Send + Sync {
    async fn fetch_folio(&self, id: &str) -> Result<Folio, FetchError>;

    /// Source name for logs.
    fn name(&self) -> &str;
}
