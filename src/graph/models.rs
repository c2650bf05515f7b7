//! Wire models for the Graph application listing.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// A directory application registration, projected to the scanned fields.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: String,
    #[serde(default)]
    pub app_id: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    /// Absent on the wire means no credentials of this kind.
    #[serde(default)]
    pub key_credentials: Vec<Credential>,
    #[serde(default)]
    pub password_credentials: Vec<Credential>,
}

/// Shared shape of key and password credentials. Only the display name and
/// expiry are consumed; a credential without an expiry never expires.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub end_date_time: Option<DateTime<Utc>>,
}
