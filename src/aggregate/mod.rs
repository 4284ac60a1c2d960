//! Availability aggregation subsystem.
//!
//! # Data Flow
//! ```text
//! Snapshot (from the topology store)
//!     → classify.rs (status → skip / fixed verdict / probe)
//!     → builder.rs (near + far probe per REPORTED cache via the probe pool)
//!     → conjunctive reduction: available = near && far
//!     → report.rs (per-cache map + delivery-service rollup)
//! ```
//!
//! # Design Decisions
//! - Structural topology problems fail the request before any probe is sent
//! - Replies are collected in completion order under one deadline
//! - Partial reachability reads as down

pub mod builder;
pub mod classify;
pub mod report;

pub use builder::{build_availability, AggregateError};
pub use report::{AvailabilityReport, CacheState, DeliveryServiceState};
