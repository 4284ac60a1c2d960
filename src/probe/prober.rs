//! Outbound health probes.
//!
//! # Responsibilities
//! - Send one GET to the fixed local base URL with the probe's `Host` header
//! - Reduce the outcome to a boolean: 2xx is available, everything else is not
//!
//! # Design Decisions
//! - No retries; the next client request probes again
//! - Transport errors (refused, timeout, TLS) are unavailable, not errors
//! - Proxies are bypassed and redirects are not followed: probes always
//!   target the local listener, and a 3xx is unavailable
//! - The base URL port is fixed at startup from this server's topology
//!   record; a reload that changes that port needs a restart to take effect

use std::future::Future;

use reqwest::header::HOST;
use thiserror::Error;
use url::Url;

use crate::config::ProbeConfig;
use crate::observability::metrics;

/// Something that can answer "is this virtual host healthy?".
pub trait Prober: Send + Sync + 'static {
    fn probe(&self, host: &str) -> impl Future<Output = bool> + Send;
}

/// Error type for building the HTTP prober.
#[derive(Debug, Error)]
pub enum ProberError {
    #[error("invalid probe base URL {url}: {source}")]
    Url {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("failed to build probe client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Build `http://<probe_host>:<port>/`.
pub fn probe_base_url(probe_host: &str, port: u16) -> Result<Url, ProberError> {
    let url = format!("http://{}:{}/", probe_host, port);
    Url::parse(&url).map_err(|source| ProberError::Url { url, source })
}

/// Probes over HTTP against a fixed local base URL.
#[derive(Debug, Clone)]
pub struct HttpProber {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpProber {
    pub fn new(config: &ProbeConfig, port: u16) -> Result<Self, ProberError> {
        let base_url = probe_base_url(&config.probe_host, port)?;
        let client = reqwest::Client::builder()
            .timeout(config.client_timeout())
            .danger_accept_invalid_certs(config.insecure)
            .redirect(reqwest::redirect::Policy::none())
            .no_proxy()
            .build()?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}

impl Prober for HttpProber {
    fn probe(&self, host: &str) -> impl Future<Output = bool> + Send {
        let request = self.client.get(self.base_url.clone()).header(HOST, host);
        let host = host.to_string();

        async move {
            let available = match request.send().await {
                Ok(response) => {
                    let success = response.status().is_success();
                    if !success {
                        tracing::debug!(host = %host, status = %response.status(), "Probe failed: non-success status");
                    }
                    success
                }
                Err(e) if e.is_timeout() => {
                    tracing::debug!(host = %host, "Probe failed: timeout");
                    false
                }
                Err(e) => {
                    tracing::debug!(host = %host, error = %e, "Probe failed: connection error");
                    false
                }
            };

            metrics::record_probe(available);
            available
        }
    }
}
