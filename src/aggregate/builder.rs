//! Availability aggregation for one client request.
//!
//! # Algorithm
//! 1. Resolve the CDN domain and this server's port; fail before probing if either is missing
//! 2. Classify every edge cache by declared status
//! 3. Submit a near and a far probe per `REPORTED` cache
//! 4. Collect replies in completion order until the deadline
//! 5. A cache is available only if both its probes succeeded
//! 6. Roll verdicts up to delivery services

use std::collections::BTreeMap;
use std::time::Duration;

use futures_util::stream::{FuturesUnordered, StreamExt};
use thiserror::Error;
use tokio::time::{timeout_at, Instant};

use crate::aggregate::classify::{classify, probe_host, Decision, Scope};
use crate::aggregate::report::{rollup_delivery_services, AvailabilityReport, CacheState};
use crate::observability::metrics;
use crate::probe::{PoolClosed, ProbePool};
use crate::topology::snapshot::Snapshot;

/// Why a report could not be built.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AggregateError {
    #[error("topology config has no domain_name")]
    MissingDomainName,

    #[error("server {0:?} not found in topology")]
    SelfNotFound(String),

    #[error(transparent)]
    PoolClosed(#[from] PoolClosed),
}

impl AggregateError {
    /// Structural problems with the topology, as opposed to runtime failures.
    pub fn is_config_error(&self) -> bool {
        matches!(self, AggregateError::MissingDomainName | AggregateError::SelfNotFound(_))
    }
}

/// Build the availability report for `snapshot`, probing through `pool`.
///
/// Probes not answered within `deadline` count as failed.
pub async fn build_availability(
    snapshot: &Snapshot,
    pool: &ProbePool,
    deadline: Duration,
) -> Result<AvailabilityReport, AggregateError> {
    let domain = snapshot.domain_name().ok_or(AggregateError::MissingDomainName)?;
    let port = snapshot
        .self_server()
        .map(|s| s.port)
        .ok_or_else(|| AggregateError::SelfNotFound(snapshot.self_name().to_string()))?;

    let deadline = Instant::now() + deadline;
    let mut caches = BTreeMap::new();
    let mut to_probe = Vec::new();

    for server in snapshot.servers().filter(|s| s.is_edge()) {
        match classify(&server.status) {
            Decision::Skip => {
                tracing::debug!(cache = %server.name, status = %server.status, "Skipping cache");
            }
            Decision::Fixed(available) => {
                tracing::debug!(cache = %server.name, status = %server.status, available, "Cache availability fixed by status");
                caches.insert(server.name.clone(), available);
            }
            Decision::Unexpected => {
                tracing::warn!(cache = %server.name, status = %server.status, "Unexpected cache status, marking unavailable");
                caches.insert(server.name.clone(), false);
            }
            Decision::Probe => {
                tracing::debug!(cache = %server.name, "Probing cache");
                to_probe.push(server.name.as_str());
            }
        }
    }

    // name -> number of probes that came back available
    let mut passed: BTreeMap<&str, usize> = to_probe.iter().map(|name| (*name, 0)).collect();
    let mut in_flight = FuturesUnordered::new();

    'submit: for name in &to_probe {
        for scope in Scope::BOTH {
            let host = probe_host(scope, name, domain, port);
            match timeout_at(deadline, pool.submit(host)).await {
                Ok(Ok(rx)) => {
                    in_flight.push(async move { (*name, rx.await.unwrap_or(false)) });
                }
                Ok(Err(closed)) => return Err(closed.into()),
                Err(_) => {
                    tracing::warn!(cache = %name, "Deadline reached while queueing probes");
                    break 'submit;
                }
            }
        }
    }

    loop {
        match timeout_at(deadline, in_flight.next()).await {
            Ok(Some((name, available))) => {
                if available {
                    if let Some(count) = passed.get_mut(name) {
                        *count += 1;
                    }
                }
            }
            Ok(None) => break,
            Err(_) => {
                tracing::warn!(outstanding = in_flight.len(), "Deadline reached, unanswered probes count as failed");
                break;
            }
        }
    }

    for (name, count) in passed {
        caches.insert(name.to_string(), count == Scope::BOTH.len());
    }

    let caches: BTreeMap<String, CacheState> = caches
        .into_iter()
        .map(|(name, is_available)| {
            metrics::record_cache_availability(&name, is_available);
            (name, CacheState { is_available })
        })
        .collect();

    let delivery_services = rollup_delivery_services(snapshot, &caches);

    Ok(AvailabilityReport {
        caches,
        delivery_services,
    })
}
