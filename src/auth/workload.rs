//! Workload identity tokens via federated credential exchange.
//!
//! Kubernetes-style workload identity mounts a short-lived federated token
//! file into the pod; exchanging it at the tenant token endpoint yields a
//! Graph access token. The mounted file and the id variables are identity
//! wiring written by the platform, not secrets.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use zeroize::Zeroize;

use super::{AccessToken, TokenProvider};
use crate::error::{GraphError, GraphResult};

const CLIENT_ASSERTION_TYPE: &str = "urn:ietf:params:oauth:client-assertion-type:jwt-bearer";

/// OAuth2 token grant from the authority.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

/// Exchanges a platform-mounted federated token for a Graph access token
/// using the client credentials flow with a client assertion.
pub struct WorkloadIdentityCredential {
    http_client: reqwest::Client,
    token_url: String,
    client_id: String,
    token_file: PathBuf,
    scope: String,
}

impl WorkloadIdentityCredential {
    /// Present only when the platform has mounted a federated token and
    /// published the identity ids. No client secret is ever read here.
    pub fn from_env(login_endpoint: &str, scope: &str) -> Option<Self> {
        let token_file = env::var("AZURE_FEDERATED_TOKEN_FILE").ok()?;
        let client_id = env::var("AZURE_CLIENT_ID").ok()?;
        let tenant_id = env::var("AZURE_TENANT_ID").ok()?;
        Some(Self::new(
            login_endpoint,
            &tenant_id,
            &client_id,
            PathBuf::from(token_file),
            scope,
        ))
    }

    pub fn new(
        login_endpoint: &str,
        tenant_id: &str,
        client_id: &str,
        token_file: PathBuf,
        scope: &str,
    ) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            token_url: format!("{login_endpoint}/{tenant_id}/oauth2/v2.0/token"),
            client_id: client_id.to_string(),
            token_file,
            scope: scope.to_string(),
        }
    }
}

#[async_trait]
impl TokenProvider for WorkloadIdentityCredential {
    fn name(&self) -> &str {
        "workload identity"
    }

    async fn fetch_token(&self) -> GraphResult<AccessToken> {
        let mut assertion = tokio::fs::read_to_string(&self.token_file)
            .await
            .map_err(|e| {
                GraphError::Auth(format!(
                    "cannot read federated token file {}: {e}",
                    self.token_file.display()
                ))
            })?;

        let params = [
            ("client_id", self.client_id.as_str()),
            ("grant_type", "client_credentials"),
            ("scope", self.scope.as_str()),
            ("client_assertion_type", CLIENT_ASSERTION_TYPE),
            ("client_assertion", assertion.trim()),
        ];

        let result = self
            .http_client
            .post(&self.token_url)
            .form(&params)
            .send()
            .await;
        assertion.zeroize();

        let response =
            result.map_err(|e| GraphError::Auth(format!("token request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GraphError::Auth(format!(
                "token request failed with status {status}: {body}"
            )));
        }

        let grant: TokenResponse = response
            .json()
            .await
            .map_err(|e| GraphError::Auth(format!("failed to parse token response: {e}")))?;

        Ok(AccessToken::new(
            grant.access_token,
            Utc::now() + Duration::seconds(grant.expires_in),
        ))
    }
}
