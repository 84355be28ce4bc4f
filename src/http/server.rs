//! Raw TCP HTCPCP server.
//!
//! # Responsibilities
//! - Accept connections and spawn one task per connection
//! - Per connection: read, parse, dispatch, write, close
//! - Convert every failure into a response value or a silent close
//! - Drain in-flight connections on shutdown
//!
//! # Design Decisions
//! - The accept loop never waits on request processing
//! - Read timeouts, resets and peers that send nothing end the task without a response
//! - Malformed or oversized requests get a bodiless 400
//! - A panicking handler or an unencodable body becomes a bodiless 500; the
//!   socket is dropped (closed) whether or not that write succeeds

use std::net::SocketAddr;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::sync::broadcast;
use tracing::Instrument;

use crate::config::ServerConfig;
use crate::http::reader::{read_request, ReadError, ReadLimits};
use crate::http::request::{parse_request, ParsedRequest, RequestId};
use crate::http::response::{encode_raw, Response};
use crate::net::{ConnectionTracker, Listener, ListenerError};
use crate::observability::metrics;
use crate::pot::PotStore;
use crate::routing::Router;

/// Back-off after a failed accept (e.g. file descriptor exhaustion).
const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Errors that stop the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Listener(#[from] ListenerError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The HTCPCP server over raw TCP.
pub struct HtcpcpServer {
    router: Arc<Router>,
    limits: ReadLimits,
    tracker: ConnectionTracker,
    shutdown_grace: Duration,
}

impl HtcpcpServer {
    /// Create a server dispatching through `router`.
    pub fn new(config: &ServerConfig, router: Arc<Router>) -> Self {
        Self {
            router,
            limits: ReadLimits::from_config(&config.timeouts, &config.limits),
            tracker: ConnectionTracker::new(),
            shutdown_grace: config.timeouts.shutdown_grace(),
        }
    }

    /// Create a server with a fresh pot store seeded from `config`.
    pub fn from_config(config: &ServerConfig) -> Self {
        let store = Arc::new(PotStore::from_config(&config.pots));
        Self::new(config, Arc::new(Router::htcpcp(store)))
    }

    pub fn router(&self) -> &Arc<Router> {
        &self.router
    }

    pub fn tracker(&self) -> &ConnectionTracker {
        &self.tracker
    }

    /// Accept connections until `shutdown` fires, then drain.
    pub async fn run(
        self,
        listener: Listener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTCPCP server starting");

        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    tracing::info!("Shutdown requested, no longer accepting");
                    break;
                }
                accepted = listener.accept() => {
                    let (stream, peer, permit) = match accepted {
                        Ok(accepted) => accepted,
                        Err(ListenerError::Accept(e)) => {
                            tracing::warn!(error = %e, "Accept failed");
                            tokio::time::sleep(ACCEPT_RETRY_DELAY).await;
                            continue;
                        }
                        Err(e) => return Err(e.into()),
                    };

                    let guard = self.tracker.track();
                    let span = tracing::debug_span!("connection", connection_id = %guard.id(), peer = %peer);
                    let router = Arc::clone(&self.router);
                    let limits = self.limits;

                    tokio::spawn(
                        async move {
                            serve_connection(stream, peer, &router, &limits).await;
                            drop(guard);
                            drop(permit);
                        }
                        .instrument(span),
                    );
                }
            }
        }

        if !self.tracker.wait_idle(self.shutdown_grace).await {
            tracing::warn!(
                remaining = self.tracker.active_count(),
                "Shutdown grace period elapsed with connections still open"
            );
        }
        tracing::info!("HTCPCP server stopped");
        Ok(())
    }
}

/// Handle exactly one request on `stream`, then close it.
pub async fn serve_connection<S>(mut stream: S, peer: SocketAddr, router: &Router, limits: &ReadLimits)
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let start = Instant::now();

    let raw = match read_request(&mut stream, limits).await {
        Ok(raw) if raw.is_empty() => {
            tracing::debug!(peer = %peer, "Peer closed without sending a request");
            return;
        }
        Ok(raw) => raw,
        Err(ReadError::Timeout(after)) => {
            tracing::debug!(peer = %peer, timeout = ?after, "Read timed out, dropping connection");
            metrics::record_dropped("timeout");
            return;
        }
        Err(ReadError::Io(e)) => {
            tracing::debug!(peer = %peer, error = %e, "Read failed, dropping connection");
            metrics::record_dropped("io");
            return;
        }
        Err(e) => {
            tracing::warn!(peer = %peer, error = %e, "Rejecting oversized request");
            write_and_close(&mut stream, "-", &Response::bad_request(), start).await;
            return;
        }
    };

    match parse_request(&raw) {
        Ok(request) => {
            let request_id = RequestId::new();
            tracing::debug!(
                request_id = %request_id,
                method = %request.method,
                path = %request.path,
                "Dispatching request"
            );
            tracing::trace!(
                request_id = %request_id,
                headers = ?request.headers.iter().collect::<Vec<_>>(),
                "Request headers"
            );

            let response = dispatch_catching(router, &request, &request_id.to_string());
            write_and_close(&mut stream, &request.method, &response, start).await;
        }
        Err(e) => {
            tracing::debug!(peer = %peer, error = %e, "Malformed request");
            write_and_close(&mut stream, "-", &Response::bad_request(), start).await;
        }
    }
}

/// Dispatch, turning a handler panic into a bodiless 500.
pub(crate) fn dispatch_catching(router: &Router, request: &ParsedRequest, request_id: &str) -> Response {
    std::panic::catch_unwind(AssertUnwindSafe(|| router.dispatch(request))).unwrap_or_else(|_| {
        tracing::error!(request_id, method = %request.method, path = %request.path, "Handler panicked");
        Response::internal_error()
    })
}

async fn write_and_close<S>(stream: &mut S, method: &str, response: &Response, start: Instant)
where
    S: AsyncWrite + Unpin,
{
    let (status, bytes) = match response.encode() {
        Ok(bytes) => (response.status(), bytes),
        Err(e) => {
            tracing::error!(error = %e, "Server error while encoding response");
            (500, encode_raw(500, b""))
        }
    };

    if let Err(e) = stream.write_all(&bytes).await {
        tracing::debug!(error = %e, status, "Failed to write response");
    } else if let Err(e) = stream.shutdown().await {
        tracing::debug!(error = %e, "Failed to shut down connection");
    }
    metrics::record_request(method, status, start);
}
