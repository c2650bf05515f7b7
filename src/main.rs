//! credscan binary entry point.

use anyhow::Result;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing (structured logs)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "credscan=info".into()),
        )
        .with_target(false)
        .init();

    info!("credscan v{}", env!("CARGO_PKG_VERSION"));

    credscan::run().await
}
