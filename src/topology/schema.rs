//! CRConfig wire schema.
//!
//! Only the fields the combiner consults are modelled; everything else in
//! the document is ignored by serde.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// The CDN topology document as published by the control plane.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct CrConfig {
    /// CDN-wide parameters (`domain_name` and friends).
    #[serde(default)]
    pub config: BTreeMap<String, serde_json::Value>,

    /// Cache server inventory keyed by server name.
    #[serde(rename = "contentServers")]
    pub content_servers: BTreeMap<String, ContentServer>,

    /// Delivery services keyed by xml id. Values are opaque here.
    #[serde(default, rename = "deliveryServices")]
    pub delivery_services: BTreeMap<String, serde_json::Value>,
}

/// A single entry of `contentServers`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
pub struct ContentServer {
    /// Declared operational status, e.g. `REPORTED`.
    #[serde(default)]
    pub status: Option<String>,

    /// Listening port. Some control planes emit it as a string.
    #[serde(default, deserialize_with = "deserialize_port")]
    pub port: Option<u16>,

    /// Server type, e.g. `EDGE` or `MID`.
    #[serde(default, rename = "type")]
    pub server_type: Option<String>,

    #[serde(default, rename = "cacheGroup")]
    pub cache_group: Option<String>,

    #[serde(default)]
    pub fqdn: Option<String>,

    /// Delivery services assigned to this server, keyed by xml id.
    #[serde(default, rename = "deliveryServices")]
    pub delivery_services: BTreeMap<String, serde_json::Value>,
}

fn deserialize_port<'de, D>(deserializer: D) -> Result<Option<u16>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawPort {
        Number(u16),
        Text(String),
    }

    match Option::<RawPort>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawPort::Number(port)) => Ok(Some(port)),
        Some(RawPort::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(RawPort::Text(text)) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid port {:?}", text))),
    }
}
