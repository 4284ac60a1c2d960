//! Shared utilities for integration tests.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use healthcombiner::{Combiner, CombinerConfig, Shutdown};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Host headers seen by a mock backend, in arrival order.
#[derive(Debug, Default)]
pub struct CallLog {
    hosts: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl CallLog {
    pub fn hosts(&self) -> Vec<String> {
        self.hosts.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.hosts.lock().unwrap().len()
    }

    /// Calls whose Host header mentions `cache` as a label.
    pub fn count_for(&self, cache: &str) -> usize {
        let needle = format!(".{}.", cache);
        self.hosts
            .lock()
            .unwrap()
            .iter()
            .filter(|h| h.contains(&needle))
            .count()
    }
}

fn status_line(status: u16) -> &'static str {
    match status {
        200 => "200 OK",
        204 => "204 No Content",
        404 => "404 Not Found",
        500 => "500 Internal Server Error",
        502 => "502 Bad Gateway",
        503 => "503 Service Unavailable",
        _ => "500 Internal Server Error",
    }
}

fn parse_host(head: &str) -> String {
    head.lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("host"))
        .map(|(_, value)| value.trim().to_string())
        .unwrap_or_default()
}

/// Start a backend that answers each request with the status `f` picks from the Host header.
pub async fn start_host_backend<F>(f: F) -> (SocketAddr, Arc<CallLog>)
where
    F: Fn(&str) -> u16 + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let log = Arc::new(CallLog::default());
    let f = Arc::new(f);

    let calls = log.clone();
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    let calls = calls.clone();
                    tokio::spawn(async move {
                        let mut buf = Vec::new();
                        let mut chunk = [0u8; 1024];
                        while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                            match socket.read(&mut chunk).await {
                                Ok(0) | Err(_) => return,
                                Ok(n) => buf.extend_from_slice(&chunk[..n]),
                            }
                        }

                        let host = parse_host(&String::from_utf8_lossy(&buf));
                        calls.hosts.lock().unwrap().push(host.clone());
                        let status = f(&host);

                        let response = format!(
                            "HTTP/1.1 {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                            status_line(status)
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, log)
}

/// Backend that accepts connections and never answers.
#[allow(dead_code)]
pub async fn start_silent_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    addr
}

/// Backend answering from a host → status table; unknown hosts get 200.
#[allow(dead_code)]
pub async fn start_table_backend(table: &[(&str, u16)]) -> (SocketAddr, Arc<CallLog>) {
    let table: HashMap<String, u16> = table.iter().map(|(h, s)| (h.to_string(), *s)).collect();
    start_host_backend(move |host| table.get(host).copied().unwrap_or(200)).await
}

/// Write a topology file into the temp dir under a name unique to this test.
pub fn write_topology(name: &str, content: &str) -> PathBuf {
    static COUNTER: AtomicUsize = AtomicUsize::new(0);
    let path = std::env::temp_dir().join(format!(
        "healthcombiner-it-{}-{}-{}.json",
        name,
        std::process::id(),
        COUNTER.fetch_add(1, Ordering::SeqCst)
    ));
    std::fs::write(&path, content).unwrap();
    path
}

/// Base config for a combiner on an ephemeral port probing 127.0.0.1.
pub fn test_config(crconfig_path: PathBuf, self_name: &str) -> CombinerConfig {
    let mut config = CombinerConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.topology.crconfig_path = crconfig_path;
    config.topology.self_name = self_name.into();
    config.probe.probe_host = "127.0.0.1".into();
    config.probe.workers = 8;
    config.probe.queue_size = 4;
    config.probe.client_timeout_ms = 2000;
    config
}

/// Start a combiner and return its address plus the shutdown handle.
pub async fn start_combiner(config: CombinerConfig) -> (SocketAddr, Shutdown) {
    let combiner = Combiner::prepare(config).await.expect("combiner should start");
    let addr = combiner.local_addr().unwrap();
    let shutdown = Shutdown::new();

    let run_shutdown = shutdown.clone();
    tokio::spawn(async move {
        let _ = combiner.run(&run_shutdown).await;
    });

    // Wait for the server to subscribe
    while shutdown.receiver_count() < 2 {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    (addr, shutdown)
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
