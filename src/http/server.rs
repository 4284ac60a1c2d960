//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the front door and optional debug routes
//! - Wire up middleware (request ID, tracing, server timeout)
//! - Serve until the shutdown broadcast fires

use std::sync::Arc;
use std::time::Duration;

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::CombinerConfig;
use crate::http::crstates::crstates_handler;
use crate::http::debug::{get_topology, DEBUG_TOPOLOGY_PATH};
use crate::http::request::make_span;
use crate::probe::ProbePool;
use crate::topology::SharedTopologyStore;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: SharedTopologyStore,
    pub pool: ProbePool,
    pub request_deadline: Duration,
    pub config: Arc<CombinerConfig>,
}

/// HTTP server for the health combiner.
pub struct HttpServer {
    router: Router,
    config: Arc<CombinerConfig>,
}

impl HttpServer {
    /// Create a new HTTP server over a topology store and a running probe pool.
    pub fn new(config: CombinerConfig, store: SharedTopologyStore, pool: ProbePool) -> Self {
        let config = Arc::new(config);
        let state = AppState {
            store,
            pool,
            request_deadline: config.request_deadline(),
            config: config.clone(),
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &CombinerConfig, state: AppState) -> Router {
        let mut router = Router::new();
        if config.listener.debug {
            router = router.route(DEBUG_TOPOLOGY_PATH, get(get_topology));
        }

        router
            .fallback(crstates_handler)
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http().make_span_with(make_span))
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(TimeoutLayer::new(config.listener.server_timeout())),
            )
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            debug = self.config.listener.debug,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server received shutdown signal");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &CombinerConfig {
        &self.config
    }
}
