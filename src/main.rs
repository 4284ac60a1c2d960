//! Health combiner
//!
//! Combines near and far health probes for every cache in a CDN topology
//! into a single availability verdict per cache, served as CRStates JSON.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────────────┐
//!                     │                   HEALTH COMBINER                     │
//!                     │                                                       │
//!   GET /crstates     │  ┌─────────┐    ┌────────────┐    ┌──────────────┐   │
//!   ──────────────────┼─▶│  http   │───▶│ aggregate  │───▶│    probe     │───┼──▶ localhost
//!                     │  │front    │    │ near && far│    │ pool + queue │   │    Host: near|far
//!   ◀─────────────────┼──│door     │◀───│            │◀───│  (N workers) │◀──┼──  .health.<cache>
//!   CRStates JSON     │  └─────────┘    └─────┬──────┘    └──────────────┘   │
//!                     │                       │ get()                         │
//!                     │                 ┌─────▼──────┐    ┌──────────────┐   │
//!                     │                 │  topology  │◀───│  refresher   │◀──┼── CRConfig file
//!                     │                 │   store    │    │ (timer loop) │   │
//!                     │                 └────────────┘    └──────────────┘   │
//!                     └──────────────────────────────────────────────────────┘
//! ```
//!
//! # Exit Status
//! - 1: missing `-crconfig-path`, invalid flags, initial topology failure,
//!   this server missing from the topology, bad probe URL, or bind failure
//! - 0: graceful stop after SIGINT/SIGTERM

use std::process::ExitCode;

use healthcombiner::config::{load_config, ConfigError};
use healthcombiner::lifecycle::{signals::shutdown_signal, Combiner, Shutdown};
use healthcombiner::observability::logging;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match load_config(std::env::args_os()) {
        Ok(config) => config,
        Err(ConfigError::Parse(e)) => e.exit(),
        Err(e) => {
            eprintln!("healthcombiner: {}", e);
            return ExitCode::from(1);
        }
    };

    logging::init_logging(config.listener.debug);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "healthcombiner starting");
    if config.listener.debug {
        tracing::warn!("Debug mode enabled: debug routes expose topology and config, never use in production");
    }

    let combiner = match Combiner::prepare(config).await {
        Ok(combiner) => combiner,
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            eprintln!("healthcombiner: {}", e);
            return ExitCode::from(1);
        }
    };

    let shutdown = Shutdown::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        trigger.trigger();
    });

    match combiner.run(&shutdown).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Server failed");
            eprintln!("healthcombiner: {}", e);
            ExitCode::from(1)
        }
    }
}
