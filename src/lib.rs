//! Application credential expiry scanner for Microsoft Entra ID.
//!
//! Enumerates every application registration in the directory via the
//! Graph API, classifies each key and password credential against the
//! current time, and logs aggregate totals: applications seen, credentials
//! seen, credentials expired. One sequential pass, read-only against the
//! directory; the log stream is the only artifact.
//!
//! Security:
//! - Authenticates with ambient platform identity only (workload identity
//!   or managed identity)
//! - Client secrets in the process environment are never trusted
//! - No credential material from the directory is ever logged or mutated

use anyhow::{Context, Result};
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

pub mod auth;
pub mod config;
pub mod error;
pub mod graph;
pub mod report;
pub mod scanner;

use auth::{CredentialChain, TokenCache};
use config::Config;
use graph::GraphClient;
use scanner::Scanner;

/// Wires the scanner from ambient configuration and runs one full pass.
/// Any upstream failure propagates; the report is only emitted after a
/// complete scan.
pub async fn run() -> Result<()> {
    let config = Config::from_env();

    let chain = CredentialChain::ambient(&config);
    let token_cache = Arc::new(TokenCache::new(Box::new(chain)));

    let client = GraphClient::new(Arc::clone(&token_cache), config.graph_base_url())
        .context("Failed to create Graph client")?;

    client
        .verify_access()
        .await
        .context("Graph connectivity check failed")?;
    info!("Graph connectivity verified");

    let scanner = Scanner::new(client, config.page_size);
    let counters = scanner
        .scan(Utc::now())
        .await
        .context("Credential scan failed")?;

    report::report(&counters);

    Ok(())
}
