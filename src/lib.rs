//! Health combiner library.
//!
//! Answers "is this cache healthy?" for every cache in a CDN topology by
//! probing each one from a near and a far vantage point and serving the
//! combined verdicts as a CRStates document.

pub mod aggregate;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod probe;
pub mod topology;

pub use config::schema::CombinerConfig;
pub use http::HttpServer;
pub use lifecycle::{Combiner, Shutdown};
