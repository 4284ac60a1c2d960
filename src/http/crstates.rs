//! The `/crstates` front door.

use std::time::Instant;

use axum::{
    extract::State,
    http::{HeaderMap, Method, Uri},
    response::{IntoResponse, Response},
    Json,
};

use crate::aggregate::build_availability;
use crate::http::request::request_id;
use crate::http::response;
use crate::http::server::AppState;
use crate::observability::metrics;

/// Route prefix, matched case-insensitively.
pub const CRSTATES_PATH: &str = "/crstates";

pub fn matches_crstates(path: &str) -> bool {
    path.get(..CRSTATES_PATH.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(CRSTATES_PATH))
}

/// Serves every request: 404 off the route, 405 for non-GET, otherwise the report.
pub async fn crstates_handler(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    let start = Instant::now();

    if !matches_crstates(uri.path()) {
        metrics::record_request(404, start);
        return response::not_found();
    }
    if method != Method::GET {
        metrics::record_request(405, start);
        return response::method_not_allowed();
    }

    let snapshot = state.store.get();
    match build_availability(&snapshot, &state.pool, state.request_deadline).await {
        Ok(report) => {
            tracing::debug!(
                caches = report.caches.len(),
                delivery_services = report.delivery_services.len(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Availability report built"
            );
            metrics::record_request(200, start);
            Json(report).into_response()
        }
        Err(e) => {
            tracing::error!(
                request_id = %request_id(&headers),
                error = %e,
                config_error = e.is_config_error(),
                "Failed to build availability report"
            );
            metrics::record_request(500, start);
            response::internal_error()
        }
    }
}
