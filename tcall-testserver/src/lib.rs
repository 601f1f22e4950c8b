//! HTTP peers for exercising the transport in tests.
//!
//! [`TestServer`] is a well-behaved RPC endpoint that records what it receives. [`FaultServer`]
//! misbehaves in the single way chosen when it is started.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Uri};
use axum::routing::post;
use tokio::net::TcpListener;
use tokio::sync::{Mutex, oneshot};

mod fault;
pub use fault::{Fault, FaultServer};

pub const PATH_RPC: &str = "/rpc";
pub const CUSTOM_HEADER: &str = "custom-header";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordedRequest {
    pub path: String,
    /// Lowercased header names.
    pub headers: BTreeMap<String, String>,
    pub body: Bytes,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

pub const DEFAULT_REPLY: &[u8] = b"ok";

#[derive(Debug, Clone, Default)]
pub struct TestServerStats {
    requests_total: Arc<AtomicU64>,
    last_request: Arc<Mutex<Option<RecordedRequest>>>,
}

impl TestServerStats {
    pub fn requests_total(&self) -> u64 {
        self.requests_total.load(Ordering::Relaxed)
    }

    pub async fn last_request(&self) -> Option<RecordedRequest> {
        self.last_request.lock().await.clone()
    }
}

#[derive(Debug, Clone)]
struct RpcState {
    stats: TestServerStats,
    reply: Bytes,
}

async fn handle_rpc(
    State(state): State<RpcState>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> ([(&'static str, &'static str); 1], Bytes) {
    let stats = &state.stats;
    stats.requests_total.fetch_add(1, Ordering::Relaxed);

    let headers = headers
        .iter()
        .map(|(k, v)| {
            (
                k.as_str().to_ascii_lowercase(),
                String::from_utf8_lossy(v.as_bytes()).to_string(),
            )
        })
        .collect();
    *stats.last_request.lock().await = Some(RecordedRequest {
        path: uri.path().to_string(),
        headers,
        body,
    });

    ([(CUSTOM_HEADER, "ok")], state.reply.clone())
}

/// Router answering every request with `reply` and recording it into `stats`.
pub fn router(stats: TestServerStats, reply: Bytes) -> Router {
    Router::new()
        .route(PATH_RPC, post(handle_rpc))
        .fallback(handle_rpc)
        .with_state(RpcState { stats, reply })
}

pub struct TestServer {
    addr: SocketAddr,
    rpc_url: String,
    stats: TestServerStats,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<tokio::task::JoinHandle<()>>,
}

impl TestServer {
    /// Starts a server that answers every request with body `ok`.
    pub async fn start() -> std::io::Result<Self> {
        Self::start_with_reply(Bytes::from_static(DEFAULT_REPLY)).await
    }

    /// Starts a server that answers every request with `reply`.
    pub async fn start_with_reply(reply: Bytes) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let stats = TestServerStats::default();
        let app = router(stats.clone(), reply);

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            let serve = axum::serve(listener, app).with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            });
            let _ = serve.await;
        });

        Ok(Self {
            addr,
            rpc_url: format!("http://{addr}{PATH_RPC}"),
            stats,
            shutdown_tx: Some(shutdown_tx),
            task: Some(task),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    pub fn stats(&self) -> &TestServerStats {
        &self.stats
    }

    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }

        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if self.shutdown_tx.is_some()
            && let Some(task) = self.task.take()
        {
            task.abort();
        }
    }
}
