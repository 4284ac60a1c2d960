//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load topology → Resolve self → Start probe pool → Bind listener
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop refresher → Stop accepting → Drain → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger shutdown
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup error exits with status 1
//! - Listener binds last (traffic only when ready)
//! - No supervised restarts; background tasks live as long as the process

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{Combiner, StartupError};
