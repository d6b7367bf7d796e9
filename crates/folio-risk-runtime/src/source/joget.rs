//! Joget form-service client.
//!
//! Records are read through the JSON form API:
//! `GET {base_url}/api/json/form/{form_id}?appId={app_id}&primaryKeyValue={id}`
//! with an optional bearer token.

use async_trait::async_trait;
use folio_risk_core::Folio;
use serde_json::Value as JsonValue;
use tracing::{debug, info};

use super::{FetchError, FolioSource};
use crate::config::JogetConfig;
use crate::secrets::ApiCredential;

/// Environment variable consulted when the config carries no API key.
pub const JOGET_API_KEY_ENV: &str = "JOGET_API_KEY";

/// HTTP client for one Joget application form.
///
/// Cheap to share: the inner `reqwest::Client` pools connections and the
/// struct holds no per-request state.
#[derive(Debug)]
pub struct JogetClient {
    client: reqwest::Client,
    base_url: String,
    app_id: String,
    form_id: String,
    credential: Option<ApiCredential>,
}

impl JogetClient {
    /// Build a client from explicit configuration.
    pub fn new(config: &JogetConfig) -> Result<Self, FetchError> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| FetchError::Transport {
                url: base_url.clone(),
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            base_url,
            app_id: config.app_id.clone(),
            form_id: config.form_id.clone(),
            credential: ApiCredential::resolve(
                config.api_key.as_deref(),
                JOGET_API_KEY_ENV,
                "Joget API key",
            ),
        })
    }

    /// Fetch the raw record `record_id` from a form.
    ///
    /// A 404, or a successful response whose body is an empty object, means
    /// the record does not exist.
    pub async fn get_form_data(
        &self,
        app_id: &str,
        form_id: &str,
        record_id: &str,
    ) -> Result<JsonValue, FetchError> {
        let endpoint = format!("{}/api/json/form/{}", self.base_url, form_id);
        let mut builder = self
            .client
            .get(&endpoint)
            .query(&[("appId", app_id), ("primaryKeyValue", record_id)]);
        if let Some(credential) = &self.credential {
            builder = builder.bearer_auth(credential.expose());
        }
        let request = builder.build().map_err(|e| FetchError::Transport {
            url: endpoint.clone(),
            message: e.to_string(),
        })?;
        let url = request.url().to_string();

        info!(url = %url, record = %record_id, "fetching form record");
        let resp = self
            .client
            .execute(request)
            .await
            .map_err(|e| transport_error(&url, e))?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound {
                id: record_id.to_string(),
                url,
            });
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                url,
                body,
            });
        }

        let text = resp.text().await.map_err(|e| transport_error(&url, e))?;
        let value: JsonValue =
            serde_json::from_str(&text).map_err(|e| FetchError::MalformedJson {
                url: url.clone(),
                message: e.to_string(),
            })?;

        if value.as_object().is_some_and(|o| o.is_empty()) {
            return Err(FetchError::NotFound {
                id: record_id.to_string(),
                url,
            });
        }

        debug!(url = %url, "form record received");
        Ok(value)
    }
}

fn transport_error(url: &str, e: reqwest::Error) -> FetchError {
    let url = url.to_string();
    if e.is_timeout() {
        FetchError::Timeout { url }
    } else if e.is_connect() {
        FetchError::Connect {
            url,
            message: e.to_string(),
        }
    } else {
        FetchError::Transport {
            url,
            message: e.to_string(),
        }
    }
}

#[async_trait]
impl FolioSource for JogetClient {
    async fn fetch_folio(&self, id: &str) -> Result<Folio, FetchError> {
        let raw = self.get_form_data(&self.app_id, &self.form_id, id).await?;
        Folio::from_raw(&raw).map_err(|source| FetchError::InvalidRecord {
            id: id.to_string(),
            source,
        })
    }

    fn name(&self) -> &str {
        "joget"
    }
}
