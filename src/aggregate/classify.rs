//! Per-cache classification and probe host construction.

use crate::topology::snapshot::{ServerStatus, DEFAULT_PORT};

/// What to do with a cache, decided from its declared status alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Leave the cache out of the report.
    Skip,
    /// Record a verdict without probing.
    Fixed(bool),
    /// Record unavailable without probing; the status was not recognised.
    Unexpected,
    /// Probe near and far.
    Probe,
}

pub fn classify(status: &ServerStatus) -> Decision {
    match status {
        ServerStatus::Offline => Decision::Skip,
        ServerStatus::AdminDown => Decision::Fixed(false),
        ServerStatus::Online => Decision::Fixed(true),
        ServerStatus::Reported => Decision::Probe,
        ServerStatus::Other(_) => Decision::Unexpected,
    }
}

/// The two vantage points a cache is probed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Near,
    Far,
}

impl Scope {
    pub const BOTH: [Scope; 2] = [Scope::Near, Scope::Far];

    pub fn as_str(self) -> &'static str {
        match self {
            Scope::Near => "near",
            Scope::Far => "far",
        }
    }
}

/// `<scope>.health.<cache>.<domain>`, with `:<port>` unless the port is 80.
pub fn probe_host(scope: Scope, cache: &str, domain: &str, port: u16) -> String {
    if port == DEFAULT_PORT {
        format!("{}.health.{}.{}", scope.as_str(), cache, domain)
    } else {
        format!("{}.health.{}.{}:{}", scope.as_str(), cache, domain, port)
    }
}
