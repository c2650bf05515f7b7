//! Error types for the credential scan.

use thiserror::Error;

/// Result type alias using `GraphError`.
pub type GraphResult<T> = Result<T, GraphError>;

/// Errors that can occur when talking to Microsoft Graph.
#[derive(Debug, Error)]
pub enum GraphError {
    /// Configuration validation error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Token acquisition failure.
    #[error("authentication error: {0}")]
    Auth(String),

    /// Graph rejected the request with an OData error body.
    #[error("Graph API error: {code} - {message}")]
    Api { code: String, message: String },

    /// Transport-level failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Malformed response body.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that abort a scan. Partial counters are never reported; any of
/// these propagates to the process boundary and terminates the run.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The initial application listing could not be fetched.
    #[error("application listing unavailable: {source}")]
    UpstreamUnavailable {
        #[source]
        source: GraphError,
    },

    /// A continuation page failed mid-scan.
    #[error("fetch of page {page} failed: {source}")]
    UpstreamPage {
        page: u32,
        #[source]
        source: GraphError,
    },
}
