//! Runtime configuration, resolved from the environment with defaults.
//!
//! The scanner takes no CLI flags. Every knob is a `CREDSCAN_*` variable
//! with a production default; the endpoint overrides exist for tests and
//! sovereign-cloud deployments. None of these carry credentials.

use std::env;

/// Page-size hint sent with the application listing.
pub const DEFAULT_PAGE_SIZE: u32 = 999;

#[derive(Debug, Clone)]
pub struct Config {
    /// Graph host, without the API version segment.
    pub graph_endpoint: String,
    /// Graph API version segment.
    pub api_version: String,
    /// Token authority host for the workload identity exchange.
    pub login_endpoint: String,
    /// Instance metadata service host for managed identity.
    pub imds_endpoint: String,
    /// Page-size hint for the application listing.
    pub page_size: u32,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            graph_endpoint: env_or("CREDSCAN_GRAPH_ENDPOINT", "https://graph.microsoft.com"),
            api_version: env_or("CREDSCAN_GRAPH_API_VERSION", "v1.0"),
            login_endpoint: env_or("CREDSCAN_LOGIN_ENDPOINT", "https://login.microsoftonline.com"),
            imds_endpoint: env_or("CREDSCAN_IMDS_ENDPOINT", "http://169.254.169.254"),
            page_size: env::var("CREDSCAN_PAGE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_PAGE_SIZE),
        }
    }

    /// Versioned base URL for Graph requests.
    pub fn graph_base_url(&self) -> String {
        format!("{}/{}", self.graph_endpoint, self.api_version)
    }

    /// OAuth2 scope covering the Graph resource.
    pub fn graph_scope(&self) -> String {
        format!("{}/.default", self.graph_endpoint)
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graph_base_url_joins_version() {
        let config = Config {
            graph_endpoint: "https://graph.microsoft.com".to_string(),
            api_version: "v1.0".to_string(),
            login_endpoint: "https://login.microsoftonline.com".to_string(),
            imds_endpoint: "http://169.254.169.254".to_string(),
            page_size: DEFAULT_PAGE_SIZE,
        };
        assert_eq!(config.graph_base_url(), "https://graph.microsoft.com/v1.0");
        assert_eq!(config.graph_scope(), "https://graph.microsoft.com/.default");
    }
}
