//! Microsoft Graph HTTP client: authenticated reads and OData envelopes.
//!
//! Deliberately thin. Pagination is driven by the caller following
//! `@odata.nextLink`; there is no retry, backoff, or rate-limit handling
//! at this layer, and a failed request surfaces immediately.

pub mod models;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::auth::TokenCache;
use crate::error::{GraphError, GraphResult};

/// Fields requested from the application listing. Only these are consumed,
/// so only these are fetched.
pub const APPLICATION_SELECT_FIELDS: &str =
    "displayName,id,appId,keyCredentials,passwordCredentials";

/// OData error envelope returned by Graph on failure.
#[derive(Debug, Deserialize)]
struct ODataError {
    error: ODataErrorBody,
}

#[derive(Debug, Deserialize)]
struct ODataErrorBody {
    code: String,
    message: String,
}

/// One page of a paginated Graph response.
#[derive(Debug, Deserialize)]
pub struct ODataPage<T> {
    pub value: Vec<T>,
    #[serde(rename = "@odata.nextLink")]
    pub next_link: Option<String>,
}

/// Authenticated Graph API client.
pub struct GraphClient {
    http_client: reqwest::Client,
    token_cache: Arc<TokenCache>,
    base_url: String,
}

impl GraphClient {
    pub fn new(token_cache: Arc<TokenCache>, base_url: impl Into<String>) -> GraphResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| GraphError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            token_cache,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// First-page URL for the application listing, with the field projection
    /// and page-size hint applied.
    pub fn applications_url(&self, page_size: u32) -> String {
        format!(
            "{}/applications?$select={}&$top={}",
            self.base_url, APPLICATION_SELECT_FIELDS, page_size
        )
    }

    /// Minimal read issued at startup so auth and authorization failures
    /// surface before the scan begins.
    pub async fn verify_access(&self) -> GraphResult<()> {
        let url = format!("{}/applications?$select=id&$top=1", self.base_url);
        self.get::<ODataPage<serde_json::Value>>(&url).await?;
        Ok(())
    }

    /// Authenticated GET returning the deserialized body.
    pub async fn get<T: DeserializeOwned>(&self, url: &str) -> GraphResult<T> {
        let token = self.token_cache.get_token().await?;

        debug!(url, "Graph GET");
        let response = self.http_client.get(url).bearer_auth(&token).send().await?;
        let status = response.status();

        if status.is_success() {
            return response.json().await.map_err(GraphError::from);
        }

        let body = response.text().await.unwrap_or_default();
        if let Ok(odata) = serde_json::from_str::<ODataError>(&body) {
            return Err(GraphError::Api {
                code: odata.error.code,
                message: odata.error.message,
            });
        }

        Err(GraphError::Api {
            code: status.to_string(),
            message: body,
        })
    }
}
