//! Final scan report, emitted as structured log lines.

use tracing::info;

use crate::scanner::ScanCounters;

/// Emits the three totals and a completion marker. Infallible; the log
/// stream is the program's only output artifact.
pub fn report(counters: &ScanCounters) {
    info!(total = counters.applications, "Total applications");
    info!(total = counters.credentials, "Total credentials");
    info!(total = counters.expired_credentials, "Total expired credentials");
    info!("Credential scan complete");
}
