//! Configuration schema definitions.
//!
//! This module defines the complete runtime configuration for the combiner.
//! Every field has a default matching the documented flag default, so tests
//! can start from `CombinerConfig::default()` and override what they need.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the health combiner.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct CombinerConfig {
    /// Listener configuration.
    pub listener: ListenerConfig,

    /// Topology source and refresh settings.
    pub topology: TopologyConfig,

    /// Outbound probe settings.
    pub probe: ProbeConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl CombinerConfig {
    /// Aggregation deadline actually applied to a request.
    ///
    /// Capped at 90% of the server timeout so the report is written before
    /// the server gives up on the request.
    pub fn request_deadline(&self) -> Duration {
        self.probe
            .request_deadline()
            .min(self.listener.server_timeout() * 9 / 10)
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:80").
    pub bind_address: String,

    /// Per-request server timeout in milliseconds.
    pub server_timeout_ms: u64,

    /// Enables debug routes. Never for production.
    pub debug: bool,
}

impl ListenerConfig {
    pub fn server_timeout(&self) -> Duration {
        Duration::from_millis(self.server_timeout_ms)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:80".to_string(),
            server_timeout_ms: 5000,
            debug: false,
        }
    }
}

/// Topology (CRConfig) source configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TopologyConfig {
    /// Path of the CRConfig file.
    pub crconfig_path: PathBuf,

    /// Refresh period in milliseconds.
    pub refresh_interval_ms: u64,

    /// This server's own name, looked up in the topology's server inventory.
    pub self_name: String,
}

impl Default for TopologyConfig {
    fn default() -> Self {
        Self {
            crconfig_path: PathBuf::new(),
            refresh_interval_ms: 30_000,
            self_name: String::new(),
        }
    }
}

/// Probe worker pool and outbound client configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Number of long-lived probe workers.
    pub workers: usize,

    /// Capacity of the shared probe queue (backpressure).
    pub queue_size: usize,

    /// Outbound probe timeout in milliseconds.
    pub client_timeout_ms: u64,

    /// Skip TLS certificate verification on probes.
    pub insecure: bool,

    /// Host part of the probe base URL.
    pub probe_host: String,

    /// End-to-end aggregation deadline in milliseconds.
    /// Zero means twice the client timeout.
    pub request_deadline_ms: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            workers: 100,
            queue_size: 10,
            client_timeout_ms: 5000,
            insecure: false,
            probe_host: "localhost".to_string(),
            request_deadline_ms: 0,
        }
    }
}

impl ProbeConfig {
    /// Outbound probe timeout.
    pub fn client_timeout(&self) -> Duration {
        Duration::from_millis(self.client_timeout_ms)
    }

    /// Configured aggregation deadline, before the server timeout cap.
    pub fn request_deadline(&self) -> Duration {
        if self.request_deadline_ms == 0 {
            self.client_timeout() * 2
        } else {
            Duration::from_millis(self.request_deadline_ms)
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Prometheus exporter bind address. `None` disables the exporter.
    pub metrics_address: Option<String>,
}
