//! Topology subsystem.
//!
//! # Data Flow
//! ```text
//! CRConfig file (JSON, bare or {"response": ...})
//!     → loader.rs (read & parse into schema.rs types)
//!     → snapshot.rs (immutable Snapshot, statuses resolved)
//!     → store.rs (atomic swap of Arc<Snapshot>)
//!     → request handlers read the current snapshot lock-free
//!
//! On every refresh tick:
//!     refresher.rs reloads the file
//!     → success: publish new snapshot
//!     → failure: log, keep serving the previous one
//! ```
//!
//! # Design Decisions
//! - Snapshots are never mutated; reloads replace them whole
//! - Readers never take a lock
//! - Only the startup load is fatal

pub mod loader;
pub mod refresher;
pub mod schema;
pub mod snapshot;
pub mod store;

pub use loader::{load_snapshot, TopologyError};
pub use refresher::{RefreshOutcome, TopologyRefresher};
pub use snapshot::{CacheServer, ServerStatus, Snapshot};
pub use store::{SharedTopologyStore, TopologyStore};
