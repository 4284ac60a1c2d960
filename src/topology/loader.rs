//! Topology loading from disk.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::topology::schema::CrConfig;
use crate::topology::snapshot::Snapshot;

/// Error type for topology loading.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("failed to read topology from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse topology from {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Parse a CRConfig document, bare or wrapped in a `{"response": ...}` envelope.
pub fn parse_crconfig(content: &str) -> Result<CrConfig, serde_json::Error> {
    let mut value: serde_json::Value = serde_json::from_str(content)?;
    if let Some(inner) = value.get_mut("response") {
        value = inner.take();
    }
    serde_json::from_value(value)
}

/// Read and parse the topology file into a fresh snapshot.
pub async fn load_snapshot(path: &Path, self_name: &str) -> Result<Snapshot, TopologyError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| TopologyError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    let doc = parse_crconfig(&content).map_err(|source| TopologyError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(Snapshot::from_crconfig(doc, self_name))
}
