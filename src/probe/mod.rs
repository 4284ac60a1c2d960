//! Probe subsystem.
//!
//! # Data Flow
//! ```text
//! Aggregator
//!     → pool.rs submit(host)            (waits while the queue is full)
//!     → bounded queue (tokio mpsc)
//!     → one of N workers
//!     → prober.rs GET http://localhost:<port>/  Host: <host>
//!     → 2xx ? true : false
//!     → request.rs reply channel (oneshot) → Aggregator
//! ```
//!
//! # Design Decisions
//! - Fixed worker count, fixed queue capacity, no per-probe task spawning
//! - Virtual-host routing: the Host header selects cache and scope, the
//!   connection always goes to the local listener

pub mod pool;
pub mod prober;
pub mod request;

pub use pool::{PoolClosed, ProbePool};
pub use prober::{probe_base_url, HttpProber, Prober, ProberError};
pub use request::ProbeRequest;
