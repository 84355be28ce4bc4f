//! Startup orchestration.
//!
//! # Responsibilities
//! - Seed the pot store and build the dispatcher
//! - Start the metrics exporter when enabled
//! - Bind the listener and start the configured front end
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently
//! - Listeners start last (traffic only when ready)
//! - Configuration is validated by the caller before `start`

use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::task::JoinHandle;

use crate::config::{Frontend, ServerConfig};
use crate::http::framework;
use crate::http::server::{HtcpcpServer, ServerError};
use crate::lifecycle::Shutdown;
use crate::net::{Listener, ListenerError};
use crate::observability::metrics;
use crate::pot::PotStore;
use crate::routing::Router;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid metrics address '{0}'")]
    MetricsAddress(String),

    #[error("failed to start metrics exporter: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error(transparent)]
    Listener(#[from] ListenerError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A front end accepting traffic in the background.
pub struct Running {
    pub local_addr: SocketAddr,
    pub handle: JoinHandle<Result<(), ServerError>>,
}

/// Bring the server up and return once it is accepting connections.
///
/// The server stops when `shutdown` fires; await `handle` for the drain.
pub async fn start(config: &ServerConfig, shutdown: &Shutdown) -> Result<Running, StartupError> {
    let store = Arc::new(PotStore::from_config(&config.pots));
    tracing::info!(pots = ?store.ids(), "Pot registry seeded");
    let router = Arc::new(Router::htcpcp(store));

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config
            .observability
            .metrics_address
            .parse()
            .map_err(|_| StartupError::MetricsAddress(config.observability.metrics_address.clone()))?;
        metrics::init_metrics(addr)?;
    }

    let listener = Listener::bind(&config.listener).await?;
    let local_addr = listener.local_addr()?;
    let rx = shutdown.subscribe();

    let handle = match config.frontend {
        Frontend::Raw => {
            let server = HtcpcpServer::new(config, router);
            tokio::spawn(server.run(listener, rx))
        }
        Frontend::Framework => {
            let app = framework::build_app(router, config);
            tokio::spawn(framework::serve(app, listener.into_inner(), rx))
        }
    };

    tracing::info!(
        address = %local_addr,
        frontend = ?config.frontend,
        "HTCPCP server ready"
    );
    Ok(Running { local_addr, handle })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ephemeral(frontend: Frontend) -> ServerConfig {
        let mut config = ServerConfig::default();
        config.listener.port = 0;
        config.frontend = frontend;
        config
    }

    #[tokio::test]
    async fn test_start_and_stop_raw() {
        let shutdown = Shutdown::new();
        let running = start(&ephemeral(Frontend::Raw), &shutdown).await.unwrap();
        assert_ne!(running.local_addr.port(), 0);

        shutdown.trigger();
        running.handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_start_and_stop_framework() {
        let shutdown = Shutdown::new();
        let running = start(&ephemeral(Frontend::Framework), &shutdown).await.unwrap();

        shutdown.trigger();
        running.handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_bad_metrics_address_is_fatal() {
        let mut config = ephemeral(Frontend::Raw);
        config.observability.metrics_enabled = true;
        config.observability.metrics_address = "not-an-address".into();

        let err = start(&config, &Shutdown::new()).await.err().unwrap();
        assert!(matches!(err, StartupError::MetricsAddress(_)));
    }
}
