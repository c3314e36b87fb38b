use std::{sync::Arc, time::Duration};

use domain_radar_core::hostname;
use tracing::{debug, info, warn};

use crate::probe::{DnsProbe, LookupError, RecordQuery};

/// Total time budget for each query.
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(3);

/// Best-effort "is this domain free?" signal.
///
/// A host with A records is reported as taken. NXDOMAIN is reported as free.
/// An empty answer or a timeout triggers one `ANY` query: any record there
/// means taken, any failure means free. Every other outcome is reported as
/// free, so errors always fail open towards `true`.
#[derive(Clone)]
pub struct AvailabilityChecker {
    probe: Arc<dyn DnsProbe>,
    deadline: Duration,
}

impl AvailabilityChecker {
    pub fn new(probe: Arc<dyn DnsProbe>) -> Self {
        Self {
            probe,
            deadline: DEFAULT_DEADLINE,
        }
    }

    /// Overrides the per-query deadline.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Returns `true` when `input` looks unregistered.
    pub async fn check(&self, input: &str) -> bool {
        let host = hostname::normalize(input);

        let available = match self.query(&host, RecordQuery::A).await {
            Ok(()) => false,
            Err(LookupError::NxDomain) => true,
            Err(err @ (LookupError::NoAnswer | LookupError::Timeout)) => {
                debug!(stage = "dns", %host, reason = %err, "primary lookup inconclusive, trying fallback");
                self.fallback(&host).await
            }
            Err(err) => {
                warn!(stage = "dns", %host, error = %err, "lookup failed, reporting domain as available");
                true
            }
        };

        info!(stage = "dns", %host, available, "availability check finished");
        available
    }

    async fn fallback(&self, host: &str) -> bool {
        match self.query(host, RecordQuery::Any).await {
            Ok(()) => false,
            Err(err) => {
                debug!(stage = "dns", %host, reason = %err, "fallback lookup failed");
                true
            }
        }
    }

    async fn query(&self, host: &str, query: RecordQuery) -> Result<(), LookupError> {
        match tokio::time::timeout(self.deadline, self.probe.probe(host, query)).await {
            Ok(result) => result,
            Err(_) => {
                debug!(stage = "dns", %host, query = query.as_str(), "lookup deadline elapsed");
                Err(LookupError::Timeout)
            }
        }
    }
}
