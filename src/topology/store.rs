//! Lock-free holder of the current topology snapshot.

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::topology::snapshot::Snapshot;

/// Single-slot store for the published snapshot.
///
/// Readers never block: `get` is an atomic load of an `Arc`. `publish`
/// swaps the whole snapshot at once, so a reader sees either the old or the
/// new snapshot in full. A snapshot handed out by `get` stays alive for as
/// long as the caller holds it, regardless of later publishes.
#[derive(Debug)]
pub struct TopologyStore {
    current: ArcSwap<Snapshot>,
}

impl TopologyStore {
    pub fn new(initial: Snapshot) -> Self {
        Self {
            current: ArcSwap::from_pointee(initial),
        }
    }

    /// Latest published snapshot.
    pub fn get(&self) -> Arc<Snapshot> {
        self.current.load_full()
    }

    /// Atomically replace the published snapshot.
    pub fn publish(&self, snapshot: Snapshot) {
        self.current.store(Arc::new(snapshot));
    }
}

/// A shared reference to the topology store.
pub type SharedTopologyStore = Arc<TopologyStore>;
