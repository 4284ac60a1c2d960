//! Startup orchestration.
//!
//! # Order
//! 1. Load the initial topology (fatal on failure)
//! 2. Find this server in it and build the probe base URL (fatal on failure)
//! 3. Start the probe pool and, if configured, the metrics exporter
//! 4. Bind the listener last, so traffic only arrives once everything is ready
//!
//! `Combiner::run` then spawns the refresher and serves until shutdown.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::CombinerConfig;
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::probe::{HttpProber, ProbePool, ProberError};
use crate::topology::{
    load_snapshot, SharedTopologyStore, TopologyError, TopologyRefresher, TopologyStore,
};

/// Everything that stops the process before or while serving.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("initial topology load failed: {0}")]
    Topology(#[from] TopologyError),

    #[error("server {0:?} (HOSTNAME) not found in topology")]
    SelfNotFound(String),

    #[error(transparent)]
    Prober(#[from] ProberError),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] io::Error),
}

/// A fully initialised combiner, bound but not yet serving.
pub struct Combiner {
    config: CombinerConfig,
    store: SharedTopologyStore,
    pool: ProbePool,
    listener: TcpListener,
}

impl Combiner {
    pub async fn prepare(config: CombinerConfig) -> Result<Self, StartupError> {
        let snapshot =
            load_snapshot(&config.topology.crconfig_path, &config.topology.self_name).await?;

        let port = snapshot
            .self_server()
            .map(|s| s.port)
            .ok_or_else(|| StartupError::SelfNotFound(config.topology.self_name.clone()))?;

        if snapshot.domain_name().is_none() {
            tracing::warn!("Topology has no domain_name; requests will fail until it is set");
        }

        tracing::info!(
            path = %config.topology.crconfig_path.display(),
            servers = snapshot.server_count(),
            self_name = %config.topology.self_name,
            self_port = port,
            "Initial topology loaded"
        );

        if config.request_deadline() < config.probe.request_deadline() {
            tracing::warn!(
                configured_ms = config.probe.request_deadline().as_millis() as u64,
                effective_ms = config.request_deadline().as_millis() as u64,
                server_timeout_ms = config.listener.server_timeout_ms,
                "Request deadline capped below the server timeout"
            );
        }

        let prober = HttpProber::new(&config.probe, port)?;
        tracing::info!(
            base_url = %prober.base_url(),
            timeout_ms = config.probe.client_timeout_ms,
            insecure = config.probe.insecure,
            "Probe client configured"
        );

        let store = Arc::new(TopologyStore::new(snapshot));
        let pool = ProbePool::spawn(Arc::new(prober), config.probe.workers, config.probe.queue_size);

        if let Some(address) = &config.observability.metrics_address {
            match address.parse::<SocketAddr>() {
                Ok(addr) => {
                    if let Err(e) = metrics::init_metrics(addr) {
                        tracing::error!(error = %e, "Failed to start metrics exporter");
                    }
                }
                Err(e) => {
                    tracing::error!(metrics_address = %address, error = %e, "Failed to parse metrics address");
                }
            }
        }

        let listener = TcpListener::bind(&config.listener.bind_address)
            .await
            .map_err(|source| StartupError::Bind {
                addr: config.listener.bind_address.clone(),
                source,
            })?;

        Ok(Self {
            config,
            store,
            pool,
            listener,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn store(&self) -> SharedTopologyStore {
        self.store.clone()
    }

    /// Spawn the refresher and serve until `shutdown` fires.
    pub async fn run(self, shutdown: &Shutdown) -> Result<(), StartupError> {
        let refresher = TopologyRefresher::new(self.store.clone(), &self.config.topology);
        tokio::spawn(refresher.run(shutdown.subscribe()));

        let server = HttpServer::new(self.config, self.store, self.pool);
        server
            .run(self.listener, shutdown.subscribe())
            .await
            .map_err(StartupError::Serve)
    }
}
