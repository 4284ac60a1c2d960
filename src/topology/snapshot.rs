//! Immutable topology snapshot.
//!
//! A `Snapshot` is built once from a parsed CRConfig and never mutated.
//! Reloads build a new one and swap it in whole (see `store.rs`).

use std::collections::BTreeMap;
use std::fmt;
use std::time::SystemTime;

use serde::Serialize;

use crate::topology::schema::{ContentServer, CrConfig};

/// Default port for servers that do not declare one.
pub const DEFAULT_PORT: u16 = 80;

/// Declared operational status of a cache server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ServerStatus {
    /// Always available, never probed.
    Online,
    /// Always unavailable, never probed.
    AdminDown,
    /// Left out of the output entirely.
    Offline,
    /// Automatically monitored: probed near and far.
    Reported,
    /// Anything else. Treated as unavailable.
    Other(String),
}

impl ServerStatus {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "ONLINE" => ServerStatus::Online,
            "ADMIN_DOWN" => ServerStatus::AdminDown,
            "OFFLINE" => ServerStatus::Offline,
            "REPORTED" => ServerStatus::Reported,
            other => ServerStatus::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ServerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerStatus::Online => f.write_str("ONLINE"),
            ServerStatus::AdminDown => f.write_str("ADMIN_DOWN"),
            ServerStatus::Offline => f.write_str("OFFLINE"),
            ServerStatus::Reported => f.write_str("REPORTED"),
            ServerStatus::Other(raw) => f.write_str(raw),
        }
    }
}

/// A cache server as seen by the combiner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheServer {
    pub name: String,
    pub status: ServerStatus,
    pub port: u16,
    pub server_type: Option<String>,
    pub cache_group: Option<String>,
    pub fqdn: Option<String>,
    /// Delivery services assigned to this server, sorted.
    pub delivery_services: Vec<String>,
}

impl CacheServer {
    fn from_wire(name: &str, server: &ContentServer) -> Self {
        Self {
            name: name.to_string(),
            status: ServerStatus::parse(server.status.as_deref().unwrap_or_default()),
            port: server.port.unwrap_or(DEFAULT_PORT),
            server_type: server.server_type.clone(),
            cache_group: server.cache_group.clone(),
            fqdn: server.fqdn.clone(),
            delivery_services: server.delivery_services.keys().cloned().collect(),
        }
    }

    /// Mid-tier caches are not probed. A server without a type counts as an edge.
    pub fn is_edge(&self) -> bool {
        match &self.server_type {
            Some(t) => !t.to_ascii_uppercase().starts_with("MID"),
            None => true,
        }
    }
}

/// A frozen view of the CDN topology.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    servers: BTreeMap<String, CacheServer>,
    config: BTreeMap<String, serde_json::Value>,
    delivery_services: Vec<String>,
    self_name: String,
    loaded_at: SystemTime,
}

impl Snapshot {
    /// Build a snapshot from a parsed document and this server's name.
    pub fn from_crconfig(doc: CrConfig, self_name: impl Into<String>) -> Self {
        let servers = doc
            .content_servers
            .iter()
            .map(|(name, server)| (name.clone(), CacheServer::from_wire(name, server)))
            .collect();

        Self {
            servers,
            config: doc.config,
            delivery_services: doc.delivery_services.into_keys().collect(),
            self_name: self_name.into(),
            loaded_at: SystemTime::now(),
        }
    }

    /// All servers, ordered by name.
    pub fn servers(&self) -> impl Iterator<Item = &CacheServer> {
        self.servers.values()
    }

    pub fn server(&self, name: &str) -> Option<&CacheServer> {
        self.servers.get(name)
    }

    pub fn server_count(&self) -> usize {
        self.servers.len()
    }

    /// String-valued CDN parameter.
    pub fn config_str(&self, key: &str) -> Option<&str> {
        self.config.get(key).and_then(|v| v.as_str())
    }

    /// CDN domain used to build probe hostnames. Empty counts as missing.
    pub fn domain_name(&self) -> Option<&str> {
        self.config_str("domain_name").filter(|d| !d.is_empty())
    }

    /// Delivery service names, sorted.
    pub fn delivery_services(&self) -> &[String] {
        &self.delivery_services
    }

    pub fn self_name(&self) -> &str {
        &self.self_name
    }

    /// This server's own inventory record.
    pub fn self_server(&self) -> Option<&CacheServer> {
        self.servers.get(&self.self_name)
    }

    pub fn loaded_at(&self) -> SystemTime {
        self.loaded_at
    }
}
