//! Debug routes, mounted only with `-debug`.
//!
//! These disclose the cache inventory and runtime configuration. Never
//! enable them on a production listener.

use std::time::UNIX_EPOCH;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::config::CombinerConfig;
use crate::http::server::AppState;

pub const DEBUG_TOPOLOGY_PATH: &str = "/debug/topology";

#[derive(Debug, Serialize)]
pub struct TopologySummary {
    pub self_name: String,
    pub self_found: bool,
    pub domain_name: Option<String>,
    pub servers: usize,
    pub delivery_services: usize,
    pub loaded_at_unix_secs: u64,
    pub config: CombinerConfig,
}

pub async fn get_topology(State(state): State<AppState>) -> Json<TopologySummary> {
    let snapshot = state.store.get();
    Json(TopologySummary {
        self_name: snapshot.self_name().to_string(),
        self_found: snapshot.self_server().is_some(),
        domain_name: snapshot.domain_name().map(str::to_string),
        servers: snapshot.server_count(),
        delivery_services: snapshot.delivery_services().len(),
        loaded_at_unix_secs: snapshot
            .loaded_at()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs(),
        config: state.config.as_ref().clone(),
    })
}
