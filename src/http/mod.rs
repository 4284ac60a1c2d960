//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID, tracing span)
//!     → crstates.rs (route & method check, aggregation)
//!     → response.rs (404 / 405 / 500 bodies) or JSON report
//!     → Send to client
//! ```

pub mod crstates;
pub mod debug;
pub mod request;
pub mod response;
pub mod server;

pub use request::{request_id, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
