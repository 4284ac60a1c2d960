//! Structured logging.
//!
//! `RUST_LOG` takes precedence. Without it, `-debug` selects debug level for
//! this crate and the HTTP trace layer; otherwise both log at info.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn default_directives(debug: bool) -> &'static str {
    if debug {
        "healthcombiner=debug,tower_http=debug"
    } else {
        "healthcombiner=info,tower_http=info"
    }
}

/// Install the global subscriber. Safe to call more than once.
pub fn init_logging(debug: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(debug)));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
