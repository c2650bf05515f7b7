//! Token acquisition for the Graph client.
//!
//! The scanner authenticates with ambient platform identity only: a
//! workload identity federated token when one is mounted, otherwise the
//! instance metadata service. Client secrets in the process environment
//! are never consulted as a token source. This is a privileged read of
//! every credential in the directory, so ambient secrets are not trusted.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use tracing::debug;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::config::Config;
use crate::error::{GraphError, GraphResult};

mod imds;
mod workload;

pub use imds::ManagedIdentityCredential;
pub use workload::WorkloadIdentityCredential;

/// A bearer token with its expiry instant. The secret is wiped when the
/// token is dropped.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct AccessToken {
    secret: String,
    #[zeroize(skip)]
    expires_at: DateTime<Utc>,
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("secret", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl AccessToken {
    pub fn new(secret: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            secret: secret.into(),
            expires_at,
        }
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// True once the token is within `grace` of its expiry.
    fn is_expired(&self, grace: Duration) -> bool {
        Utc::now() + grace >= self.expires_at
    }
}

/// A source of Graph access tokens.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Short name used in log and error messages.
    fn name(&self) -> &str;

    /// Acquire a fresh token from this source.
    async fn fetch_token(&self) -> GraphResult<AccessToken>;
}

/// Tries each source in order until one yields a token.
pub struct CredentialChain {
    sources: Vec<Box<dyn TokenProvider>>,
}

impl CredentialChain {
    pub fn new(sources: Vec<Box<dyn TokenProvider>>) -> Self {
        Self { sources }
    }

    /// The ambient platform sources: workload identity when the platform
    /// has mounted a federated token, then managed identity via IMDS.
    pub fn ambient(config: &Config) -> Self {
        let mut sources: Vec<Box<dyn TokenProvider>> = Vec::new();
        if let Some(workload) =
            WorkloadIdentityCredential::from_env(&config.login_endpoint, &config.graph_scope())
        {
            sources.push(Box::new(workload));
        }
        sources.push(Box::new(ManagedIdentityCredential::new(
            &config.imds_endpoint,
            &config.graph_endpoint,
        )));
        Self { sources }
    }
}

#[async_trait]
impl TokenProvider for CredentialChain {
    fn name(&self) -> &str {
        "credential chain"
    }

    async fn fetch_token(&self) -> GraphResult<AccessToken> {
        let mut attempts = Vec::new();
        for source in &self.sources {
            match source.fetch_token().await {
                Ok(token) => {
                    debug!(source = source.name(), "Acquired Graph access token");
                    return Ok(token);
                }
                Err(e) => attempts.push(format!("{}: {}", source.name(), e)),
            }
        }
        Err(GraphError::Auth(format!(
            "no credential source yielded a token ({})",
            attempts.join("; ")
        )))
    }
}

/// Caches the current token and refreshes it once it comes within a grace
/// period of expiry.
pub struct TokenCache {
    provider: Box<dyn TokenProvider>,
    cached: RwLock<Option<AccessToken>>,
    grace_period: Duration,
}

impl TokenCache {
    pub fn new(provider: Box<dyn TokenProvider>) -> Self {
        Self {
            provider,
            cached: RwLock::new(None),
            grace_period: Duration::minutes(5),
        }
    }

    /// Returns a valid bearer token, refreshing through the provider if the
    /// cached one is missing or near expiry.
    pub async fn get_token(&self) -> GraphResult<String> {
        {
            let cache = self.cached.read().await;
            if let Some(ref token) = *cache {
                if !token.is_expired(self.grace_period) {
                    return Ok(token.secret.clone());
                }
            }
        }

        debug!("Refreshing Graph access token");
        let fresh = self.provider.fetch_token().await?;
        let secret = fresh.secret.clone();

        {
            let mut cache = self.cached.write().await;
            *cache = Some(fresh);
        }

        Ok(secret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    struct StaticProvider {
        token: &'static str,
        calls: Arc<AtomicU32>,
    }

    #[async_trait]
    impl TokenProvider for StaticProvider {
        fn name(&self) -> &str {
            "static"
        }

        async fn fetch_token(&self) -> GraphResult<AccessToken> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(AccessToken::new(self.token, Utc::now() + Duration::hours(1)))
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl TokenProvider for FailingProvider {
        fn name(&self) -> &str {
            "failing"
        }

        async fn fetch_token(&self) -> GraphResult<AccessToken> {
            Err(GraphError::Auth("unavailable".to_string()))
        }
    }

    #[test]
    fn test_token_expiry_with_grace() {
        let token = AccessToken::new("t", Utc::now() + Duration::minutes(10));

        // Not expired with 5 minute grace
        assert!(!token.is_expired(Duration::minutes(5)));

        // Expired with 15 minute grace
        assert!(token.is_expired(Duration::minutes(15)));
    }

    #[test]
    fn test_token_already_expired() {
        let token = AccessToken::new("t", Utc::now() - Duration::minutes(1));
        assert!(token.is_expired(Duration::minutes(0)));
    }

    #[tokio::test]
    async fn test_chain_falls_through_to_next_source() {
        let calls = Arc::new(AtomicU32::new(0));
        let chain = CredentialChain::new(vec![
            Box::new(FailingProvider),
            Box::new(StaticProvider {
                token: "second",
                calls: Arc::clone(&calls),
            }),
        ]);

        let token = chain.fetch_token().await.unwrap();
        assert_eq!(token.secret(), "second");
    }

    #[tokio::test]
    async fn test_chain_reports_every_failed_source() {
        let chain = CredentialChain::new(vec![Box::new(FailingProvider), Box::new(FailingProvider)]);

        let err = chain.fetch_token().await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("no credential source yielded a token"));
        assert!(message.contains("failing"));
    }

    #[tokio::test]
    async fn test_cache_reuses_unexpired_token() {
        let calls = Arc::new(AtomicU32::new(0));
        let cache = TokenCache::new(Box::new(StaticProvider {
            token: "cached",
            calls: Arc::clone(&calls),
        }));

        assert_eq!(cache.get_token().await.unwrap(), "cached");
        assert_eq!(cache.get_token().await.unwrap(), "cached");
        assert_eq!(calls.load(Ordering::SeqCst), 1, "second call should hit the cache");
    }
}
