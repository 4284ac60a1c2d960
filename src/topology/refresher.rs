//! Periodic topology reload.
//!
//! # State Machine
//! ```text
//! Idle → Loading → Published → Idle
//!              └─→ Failed ────┘
//! ```
//!
//! A failed reload keeps the previous snapshot. Only the initial load at
//! startup is fatal, and that happens before the refresher is spawned.

use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::{self, MissedTickBehavior};

use crate::config::TopologyConfig;
use crate::observability::metrics;
use crate::topology::loader::{load_snapshot, TopologyError};
use crate::topology::snapshot::Snapshot;
use crate::topology::store::SharedTopologyStore;

/// Outcome of one reload attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Published,
    Failed,
}

impl RefreshOutcome {
    fn as_str(self) -> &'static str {
        match self {
            RefreshOutcome::Published => "published",
            RefreshOutcome::Failed => "failed",
        }
    }
}

/// Background task re-reading the topology file on a fixed interval.
pub struct TopologyRefresher {
    store: SharedTopologyStore,
    path: PathBuf,
    self_name: String,
    interval: Duration,
}

impl TopologyRefresher {
    pub fn new(store: SharedTopologyStore, config: &TopologyConfig) -> Self {
        Self {
            store,
            path: config.crconfig_path.clone(),
            self_name: config.self_name.clone(),
            interval: Duration::from_millis(config.refresh_interval_ms),
        }
    }

    /// Run until shutdown. The first reload happens one interval after start.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            path = %self.path.display(),
            interval_ms = self.interval.as_millis() as u64,
            "Topology refresher starting"
        );

        let mut ticker = time::interval_at(time::Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.refresh_once().await;
                }
                _ = shutdown.recv() => {
                    tracing::info!("Topology refresher received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// Reload once, publishing on success and keeping the old snapshot on failure.
    pub async fn refresh_once(&self) -> RefreshOutcome {
        let outcome = match self.load().await {
            Ok(()) => RefreshOutcome::Published,
            Err(e) => {
                tracing::error!(error = %e, "Topology reload failed, keeping previous snapshot");
                RefreshOutcome::Failed
            }
        };
        metrics::record_topology_reload(outcome.as_str());
        outcome
    }

    async fn load(&self) -> Result<(), TopologyError> {
        let snapshot = load_snapshot(&self.path, &self.self_name).await?;
        tracing::debug!(
            servers = snapshot.server_count(),
            domain = snapshot.domain_name().unwrap_or("<none>"),
            "Topology reloaded"
        );
        if let Some((old, new)) = self_port_change(&self.store.get(), &snapshot) {
            tracing::warn!(
                self_name = %self.self_name,
                old_port = old,
                new_port = new,
                "This server's port changed; probes keep using the startup port until restart"
            );
        }
        self.store.publish(snapshot);
        Ok(())
    }
}

/// Ports of this server's record before and after a reload, if they differ.
fn self_port_change(current: &Snapshot, next: &Snapshot) -> Option<(u16, u16)> {
    let old = current.self_server()?.port;
    let new = next.self_server()?.port;
    (old != new).then_some((old, new))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use crate::topology::store::TopologyStore;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("healthcombiner-{}-{}.json", name, std::process::id()))
    }

    async fn setup(name: &str, content: &str) -> (TopologyRefresher, SharedTopologyStore, PathBuf) {
        let path = temp_path(name);
        std::fs::write(&path, content).unwrap();
        let initial = load_snapshot(&path, "edge1").await.unwrap();
        let store = Arc::new(TopologyStore::new(initial));

        let config = TopologyConfig {
            crconfig_path: path.clone(),
            refresh_interval_ms: 50,
            self_name: "edge1".into(),
        };
        (TopologyRefresher::new(store.clone(), &config), store, path)
    }

    #[tokio::test]
    async fn test_refresh_publishes_new_snapshot() {
        let (refresher, store, path) = setup(
            "refresh-ok",
            r#"{"config": {"domain_name": "old.test"}, "contentServers": {}}"#,
        )
        .await;

        std::fs::write(&path, r#"{"config": {"domain_name": "new.test"}, "contentServers": {}}"#).unwrap();
        assert_eq!(refresher.refresh_once().await, RefreshOutcome::Published);
        assert_eq!(store.get().domain_name(), Some("new.test"));

        std::fs::remove_file(&path).unwrap_or_default();
    }

    #[tokio::test]
    async fn test_malformed_reload_keeps_last_good_snapshot() {
        let (refresher, store, path) = setup(
            "refresh-bad",
            r#"{"config": {"domain_name": "good.test"}, "contentServers": {}}"#,
        )
        .await;
        let before = store.get();

        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(refresher.refresh_once().await, RefreshOutcome::Failed);

        let after = store.get();
        assert!(Arc::ptr_eq(&before, &after));
        assert_eq!(*before, *after);

        std::fs::remove_file(&path).unwrap();
        assert_eq!(refresher.refresh_once().await, RefreshOutcome::Failed);
        assert_eq!(store.get().domain_name(), Some("good.test"));
    }

    #[tokio::test]
    async fn test_run_reloads_on_interval_and_stops_on_shutdown() {
        let (refresher, store, path) = setup(
            "refresh-loop",
            r#"{"config": {"domain_name": "old.test"}, "contentServers": {}}"#,
        )
        .await;

        let (tx, rx) = broadcast::channel(1);
        let handle = tokio::spawn(refresher.run(rx));

        std::fs::write(&path, r#"{"config": {"domain_name": "new.test"}, "contentServers": {}}"#).unwrap();
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(store.get().domain_name(), Some("new.test"));

        tx.send(()).unwrap();
        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("refresher should stop")
            .unwrap();

        std::fs::remove_file(&path).unwrap_or_default();
    }

    #[test]
    fn test_self_port_change() {
        let snapshot = |port: u16| {
            let json = format!(r#"{{"contentServers": {{"edge1": {{"status": "ONLINE", "port": {}}}}}}}"#, port);
            Snapshot::from_crconfig(crate::topology::loader::parse_crconfig(&json).unwrap(), "edge1")
        };

        assert_eq!(self_port_change(&snapshot(80), &snapshot(80)), None);
        assert_eq!(self_port_change(&snapshot(80), &snapshot(8080)), Some((80, 8080)));

        let gone = Snapshot::from_crconfig(
            crate::topology::loader::parse_crconfig(r#"{"contentServers": {}}"#).unwrap(),
            "edge1",
        );
        assert_eq!(self_port_change(&snapshot(80), &gone), None);
    }
}
