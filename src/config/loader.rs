//! Configuration loading from the command line and environment.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{ArgAction, Parser};
use thiserror::Error;

use crate::config::schema::CombinerConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `-crconfig-path` was not given.
    #[error("missing required flag -crconfig-path")]
    MissingCrconfigPath,

    /// Flags could not be parsed (also covers `-help`).
    #[error(transparent)]
    Parse(#[from] clap::Error),

    /// Flags parsed but failed semantic validation.
    #[error("validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Command line flags.
#[derive(Debug, Parser)]
#[command(name = "healthcombiner")]
#[command(about = "Combines near and far cache health probes into a CRStates endpoint", long_about = None)]
pub struct Cli {
    /// Port to listen on.
    #[arg(long, default_value_t = 80)]
    pub port: u16,

    /// Server request timeout in milliseconds.
    #[arg(long = "server-timeout-ms", default_value_t = 5000)]
    pub server_timeout_ms: u64,

    /// Outbound probe timeout in milliseconds.
    #[arg(long = "client-timeout-ms", default_value_t = 5000)]
    pub client_timeout_ms: u64,

    /// Skip TLS certificate verification on outbound probes.
    #[arg(long, action = ArgAction::Set, num_args = 0..=1, require_equals = true,
          default_value_t = false, default_missing_value = "true")]
    pub insecure: bool,

    /// Enable debug routes and logging. Unsafe for production.
    #[arg(long, action = ArgAction::Set, num_args = 0..=1, require_equals = true,
          default_value_t = false, default_missing_value = "true")]
    pub debug: bool,

    /// Path of the CRConfig topology file.
    #[arg(long = "crconfig-path")]
    pub crconfig_path: Option<PathBuf>,

    /// Topology refresh interval in milliseconds.
    #[arg(long = "crconfig-interval-ms", default_value_t = 30_000)]
    pub crconfig_interval_ms: u64,

    /// Host used in the probe base URL.
    #[arg(long = "probe-host", default_value = "localhost")]
    pub probe_host: String,

    /// Number of probe workers.
    #[arg(long, default_value_t = 100)]
    pub workers: usize,

    /// Probe queue capacity.
    #[arg(long = "queue-size", default_value_t = 10)]
    pub queue_size: usize,

    /// End-to-end aggregation deadline in milliseconds (0 = 2x client timeout).
    #[arg(long = "request-deadline-ms", default_value_t = 0)]
    pub request_deadline_ms: u64,

    /// Bind address for the Prometheus exporter.
    #[arg(long = "metrics-address")]
    pub metrics_address: Option<String>,
}

impl Cli {
    /// Parse flags, accepting single-dash long flags such as `-port 8080`.
    pub fn try_parse_normalized<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        Self::try_parse_from(args.into_iter().map(|a| normalize_flag(a.into())))
    }

    /// Turn parsed flags into a runtime configuration.
    pub fn into_config(self, self_name: String) -> Result<CombinerConfig, ConfigError> {
        let crconfig_path = self.crconfig_path.ok_or(ConfigError::MissingCrconfigPath)?;

        let mut config = CombinerConfig::default();
        config.listener.bind_address = format!("0.0.0.0:{}", self.port);
        config.listener.server_timeout_ms = self.server_timeout_ms;
        config.listener.debug = self.debug;
        config.topology.crconfig_path = crconfig_path;
        config.topology.refresh_interval_ms = self.crconfig_interval_ms;
        config.topology.self_name = self_name;
        config.probe.workers = self.workers;
        config.probe.queue_size = self.queue_size;
        config.probe.client_timeout_ms = self.client_timeout_ms;
        config.probe.insecure = self.insecure;
        config.probe.probe_host = self.probe_host;
        config.probe.request_deadline_ms = self.request_deadline_ms;
        config.observability.metrics_address = self.metrics_address;

        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

/// `-flag` becomes `--flag`; `-h`, `--flag` and values are left alone.
fn normalize_flag(arg: OsString) -> OsString {
    match arg.to_str() {
        Some(s) if s.len() > 2 && s.starts_with('-') && !s.starts_with("--") => {
            let mut normalized = OsString::from("-");
            normalized.push(&arg);
            normalized
        }
        _ => arg,
    }
}

/// Load configuration from process arguments and the `HOSTNAME` variable.
pub fn load_config<I, T>(args: I) -> Result<CombinerConfig, ConfigError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let cli = Cli::try_parse_normalized(args)?;
    let self_name = std::env::var("HOSTNAME").unwrap_or_default();
    cli.into_config(self_name)
}
