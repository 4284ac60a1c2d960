//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! argv (Go-style single-dash flags) + HOSTNAME
//!     → loader.rs (normalize & parse with clap)
//!     → validation.rs (semantic checks)
//!     → CombinerConfig (validated, immutable)
//!     → cloned into each subsystem at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; only the topology is reloaded
//! - All fields have defaults matching the documented flag defaults
//! - Validation separates syntactic (clap) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, Cli, ConfigError};
pub use schema::CombinerConfig;
pub use schema::ListenerConfig;
pub use schema::ObservabilityConfig;
pub use schema::ProbeConfig;
pub use schema::TopologyConfig;
