//! Managed identity tokens from the Azure instance metadata service.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde::Deserialize;

use super::{AccessToken, TokenProvider};
use crate::error::{GraphError, GraphResult};

const IMDS_API_VERSION: &str = "2018-02-01";

/// IMDS token grant. Numeric fields arrive as strings on this API version.
#[derive(Debug, Deserialize)]
struct ImdsTokenResponse {
    access_token: String,
    expires_in: String,
}

/// Acquires tokens from the instance metadata endpoint available to any
/// Azure-hosted workload with a managed identity assigned.
pub struct ManagedIdentityCredential {
    http_client: reqwest::Client,
    token_url: String,
    resource: String,
}

impl ManagedIdentityCredential {
    pub fn new(imds_endpoint: &str, resource: &str) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            token_url: format!("{imds_endpoint}/metadata/identity/oauth2/token"),
            resource: resource.to_string(),
        }
    }
}

#[async_trait]
impl TokenProvider for ManagedIdentityCredential {
    fn name(&self) -> &str {
        "managed identity"
    }

    async fn fetch_token(&self) -> GraphResult<AccessToken> {
        let response = self
            .http_client
            .get(&self.token_url)
            .query(&[
                ("api-version", IMDS_API_VERSION),
                ("resource", self.resource.as_str()),
            ])
            .header("Metadata", "true")
            .send()
            .await
            .map_err(|e| GraphError::Auth(format!("IMDS request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GraphError::Auth(format!(
                "IMDS returned {status}: {body}"
            )));
        }

        let grant: ImdsTokenResponse = response
            .json()
            .await
            .map_err(|e| GraphError::Auth(format!("failed to parse IMDS response: {e}")))?;

        let expires_in: i64 = grant.expires_in.parse().map_err(|_| {
            GraphError::Auth(format!("IMDS expires_in is not numeric: {}", grant.expires_in))
        })?;

        Ok(AccessToken::new(
            grant.access_token,
            Utc::now() + Duration::seconds(expires_in),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_fetch_token_parses_imds_grant() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/metadata/identity/oauth2/token"))
            .and(header("Metadata", "true"))
            .and(query_param("resource", "https://graph.microsoft.com"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "imds-token",
                "expires_in": "3599",
                "token_type": "Bearer"
            })))
            .mount(&server)
            .await;

        let credential =
            ManagedIdentityCredential::new(&server.uri(), "https://graph.microsoft.com");
        let token = credential.fetch_token().await.unwrap();

        assert_eq!(token.secret(), "imds-token");
        assert!(!token.is_expired(chrono::Duration::minutes(5)));
    }

    #[tokio::test]
    async fn test_fetch_token_surfaces_imds_error_status() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/metadata/identity/oauth2/token"))
            .respond_with(ResponseTemplate::new(400).set_body_string("no identity assigned"))
            .mount(&server)
            .await;

        let credential =
            ManagedIdentityCredential::new(&server.uri(), "https://graph.microsoft.com");
        let err = credential.fetch_token().await.unwrap_err();

        assert!(matches!(err, GraphError::Auth(_)));
        assert!(err.to_string().contains("no identity assigned"));
    }
}
