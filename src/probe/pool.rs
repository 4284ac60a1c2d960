//! Fixed-size probe worker pool.
//!
//! # Responsibilities
//! - Run a fixed number of long-lived workers sharing one bounded queue
//! - Answer each request on its own reply channel exactly once
//!
//! # Design Decisions
//! - The bounded queue is the only backpressure: `submit` waits when it is
//!   full, so in-flight probes stay near `workers` however many client
//!   requests arrive
//! - A worker holds at most one probe at a time
//! - Workers never exit on a failed probe; they stop only when every
//!   `ProbePool` handle has been dropped and the queue drains

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{mpsc, oneshot, Mutex};

use crate::probe::prober::Prober;
use crate::probe::request::ProbeRequest;

/// All workers are gone; nothing will answer.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("probe pool is closed")]
pub struct PoolClosed;

/// Submission handle for the probe workers. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ProbePool {
    queue: mpsc::Sender<ProbeRequest>,
    workers: usize,
}

impl ProbePool {
    /// Spawn `workers` tasks consuming a queue of capacity `queue_size`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn<P: Prober>(prober: Arc<P>, workers: usize, queue_size: usize) -> Self {
        let (tx, rx) = mpsc::channel(queue_size.max(1));
        let rx = Arc::new(Mutex::new(rx));

        for id in 0..workers {
            tokio::spawn(run_worker(id, prober.clone(), rx.clone()));
        }

        tracing::info!(workers, queue_size, "Probe pool started");
        Self { queue: tx, workers }
    }

    /// Queue a probe for `host`, waiting while the queue is full.
    pub async fn submit(&self, host: impl Into<String>) -> Result<oneshot::Receiver<bool>, PoolClosed> {
        let (request, rx) = ProbeRequest::new(host);
        self.queue.send(request).await.map_err(|_| PoolClosed)?;
        Ok(rx)
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Free slots in the queue right now.
    pub fn available_capacity(&self) -> usize {
        self.queue.capacity()
    }
}

async fn run_worker<P: Prober>(
    id: usize,
    prober: Arc<P>,
    queue: Arc<Mutex<mpsc::Receiver<ProbeRequest>>>,
) {
    loop {
        let next = {
            let mut rx = queue.lock().await;
            rx.recv().await
        };

        let Some(request) = next else {
            tracing::debug!(worker = id, "Probe queue closed, worker exiting");
            return;
        };

        let available = prober.probe(request.host()).await;
        request.respond(available);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::Future;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::Semaphore;

    /// Succeeds for hosts starting with "ok", blocking until a permit is granted.
    struct GatedProber {
        gate: Semaphore,
        started: AtomicUsize,
    }

    impl Prober for GatedProber {
        fn probe(&self, host: &str) -> impl Future<Output = bool> + Send {
            let ok = host.starts_with("ok");
            async move {
                self.started.fetch_add(1, Ordering::SeqCst);
                if let Ok(permit) = self.gate.acquire().await {
                    permit.forget();
                }
                ok
            }
        }
    }

    fn gated(permits: usize) -> Arc<GatedProber> {
        Arc::new(GatedProber {
            gate: Semaphore::new(permits),
            started: AtomicUsize::new(0),
        })
    }

    #[tokio::test]
    async fn test_replies_reach_their_submitters() {
        let pool = ProbePool::spawn(gated(100), 4, 2);

        let ok = pool.submit("ok.health.edge1.cdn.test").await.unwrap();
        let bad = pool.submit("bad.health.edge1.cdn.test").await.unwrap();

        assert_eq!(ok.await, Ok(true));
        assert_eq!(bad.await, Ok(false));
    }

    #[tokio::test]
    async fn test_full_queue_blocks_submitter() {
        let prober = gated(0);
        let pool = ProbePool::spawn(prober.clone(), 1, 1);

        // Occupies the only worker.
        let first = pool.submit("ok-1").await.unwrap();
        while prober.started.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }

        // Fills the queue.
        let second = pool.submit("ok-2").await.unwrap();
        assert_eq!(pool.available_capacity(), 0);

        // Pool size + queue capacity reached: the next submit waits, it does not fail.
        let blocked = tokio::time::timeout(Duration::from_millis(200), pool.submit("ok-3")).await;
        assert!(blocked.is_err(), "submit should block while the queue is full");

        // Releasing the worker lets everything drain.
        prober.gate.add_permits(3);
        assert_eq!(first.await, Ok(true));
        assert_eq!(second.await, Ok(true));
        let third = pool.submit("ok-3").await.unwrap();
        assert_eq!(third.await, Ok(true));
    }

    #[tokio::test]
    async fn test_worker_survives_failed_probes() {
        let pool = ProbePool::spawn(gated(100), 1, 1);
        for _ in 0..5 {
            let rx = pool.submit("bad").await.unwrap();
            assert_eq!(rx.await, Ok(false));
        }
        let rx = pool.submit("ok").await.unwrap();
        assert_eq!(rx.await, Ok(true));
        assert_eq!(pool.workers(), 1);
    }
}
