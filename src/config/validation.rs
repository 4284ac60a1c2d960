//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (clap handles syntactic)
//! - Validate value ranges (timeouts > 0, pool sizes > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: CombinerConfig → Result<(), Vec<ValidationError>>
//! - Runs before any subsystem is started

use std::fmt;

use crate::config::schema::CombinerConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Flag or field the problem refers to.
    pub field: &'static str,
    /// Human readable description.
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &CombinerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.topology.crconfig_path.as_os_str().is_empty() {
        errors.push(ValidationError::new("crconfig-path", "must not be empty"));
    }
    if config.topology.refresh_interval_ms == 0 {
        errors.push(ValidationError::new("crconfig-interval-ms", "must be greater than 0"));
    }
    if config.topology.self_name.is_empty() {
        errors.push(ValidationError::new("HOSTNAME", "must be set to this server's name"));
    }
    if config.probe.workers == 0 {
        errors.push(ValidationError::new("workers", "must be greater than 0"));
    }
    if config.probe.queue_size == 0 {
        errors.push(ValidationError::new("queue-size", "must be greater than 0"));
    }
    if config.probe.client_timeout_ms == 0 {
        errors.push(ValidationError::new("client-timeout-ms", "must be greater than 0"));
    }
    if config.listener.server_timeout_ms == 0 {
        errors.push(ValidationError::new("server-timeout-ms", "must be greater than 0"));
    }
    if config.probe.probe_host.is_empty() {
        errors.push(ValidationError::new("probe-host", "must not be empty"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> CombinerConfig {
        let mut config = CombinerConfig::default();
        config.topology.crconfig_path = "/etc/crconfig.json".into();
        config.topology.self_name = "edge1".into();
        config
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate_config(&valid()).is_ok());
    }

    #[test]
    fn test_all_errors_reported() {
        let mut config = valid();
        config.probe.workers = 0;
        config.probe.queue_size = 0;
        config.topology.refresh_interval_ms = 0;

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["crconfig-interval-ms", "workers", "queue-size"]);
    }

    #[test]
    fn test_missing_self_name() {
        let mut config = valid();
        config.topology.self_name.clear();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].to_string(), "HOSTNAME: must be set to this server's name");
    }
}
