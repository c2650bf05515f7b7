//! The credential expiry scan: one sequential pass over every application
//! page, classifying each key and password credential against the scan
//! timestamp.

use chrono::{DateTime, Utc};
use tracing::{info, instrument, trace, warn};
use uuid::Uuid;

use crate::error::ScanError;
use crate::graph::models::{Application, Credential};
use crate::graph::{GraphClient, ODataPage};

/// Aggregate totals for one scan. Counters only ever increase, and
/// `expired_credentials` never exceeds `credentials`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanCounters {
    pub applications: u64,
    pub credentials: u64,
    pub expired_credentials: u64,
}

pub struct Scanner {
    client: GraphClient,
    page_size: u32,
}

impl Scanner {
    pub fn new(client: GraphClient, page_size: u32) -> Self {
        Self { client, page_size }
    }

    /// Walks every application page and classifies every credential against
    /// `now`. Zero applications is a success with zero counters; any page
    /// failure aborts the scan and the partial counters are discarded by
    /// the caller.
    #[instrument(skip(self), fields(scan_id = %Uuid::new_v4()))]
    pub async fn scan(&self, now: DateTime<Utc>) -> Result<ScanCounters, ScanError> {
        let mut counters = ScanCounters::default();

        info!("Application credential scan started");

        let first_url = self.client.applications_url(self.page_size);
        let mut page: ODataPage<Application> = self
            .client
            .get(&first_url)
            .await
            .map_err(|source| ScanError::UpstreamUnavailable { source })?;

        if page.value.is_empty() && page.next_link.is_none() {
            warn!("No applications found");
            return Ok(counters);
        }

        let mut page_number = 1u32;
        loop {
            trace!(page = page_number, applications = page.value.len(), "Processing page");

            for app in &page.value {
                tally_application(app, now, &mut counters);
            }

            match page.next_link.take() {
                Some(next) => {
                    page_number += 1;
                    page = self
                        .client
                        .get(&next)
                        .await
                        .map_err(|source| ScanError::UpstreamPage {
                            page: page_number,
                            source,
                        })?;
                }
                None => break,
            }
        }

        Ok(counters)
    }
}

/// Counts one application: key credentials first, then password credentials,
/// both in provider order.
fn tally_application(app: &Application, now: DateTime<Utc>, counters: &mut ScanCounters) {
    counters.applications += 1;

    let name = app.display_name.as_deref();
    tally_credentials(name, "key", &app.key_credentials, now, counters);
    tally_credentials(name, "password", &app.password_credentials, now, counters);
}

/// Counts one credential sequence. The classification is logged for every
/// credential, expired or not.
fn tally_credentials(
    application: Option<&str>,
    kind: &str,
    credentials: &[Credential],
    now: DateTime<Utc>,
    counters: &mut ScanCounters,
) {
    for credential in credentials {
        counters.credentials += 1;

        let expired = has_expired(credential, now);
        if expired {
            counters.expired_credentials += 1;
        }

        trace!(
            application = application.unwrap_or_default(),
            kind,
            credential = credential.display_name.as_deref().unwrap_or_default(),
            expiry = ?credential.end_date_time,
            expired,
            "Classified credential"
        );
    }
}

/// Expired means an expiry exists and lies strictly before `now`. An
/// expiry exactly equal to `now` is still valid.
fn has_expired(credential: &Credential, now: DateTime<Utc>) -> bool {
    credential.end_date_time.map_or(false, |end| end < now)
}
