//! Relay server: listener setup and serve loop.

use std::future::Future;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};

use tokio::net::TcpListener;
use tokio::signal::unix::{signal, SignalKind};

use crate::config::RelaySettings;
use crate::error::RelayError;
use crate::store::FrameStore;

use super::handlers;

/// HTTP server holding the latest frame for the viewer page.
///
/// Runs inside the worker process spawned by the client, or in-process
/// on a caller-provided runtime via [`serve_until`](Self::serve_until).
pub struct RelayServer {
    settings: RelaySettings,
    store: FrameStore,
}

impl RelayServer {
    /// Create a server with an empty store.
    pub fn new(settings: RelaySettings) -> Self {
        Self {
            settings,
            store: FrameStore::new(),
        }
    }

    /// Handle to the server's frame store.
    pub fn store(&self) -> FrameStore {
        self.store.clone()
    }

    /// Bind the listener, preferring IPv6 with an IPv4 fallback.
    ///
    /// A port already in use is fatal; only an address family the host
    /// does not support falls through to IPv4.
    pub async fn bind(&self) -> Result<TcpListener, RelayError> {
        let port = self.settings.port;
        let v6 = SocketAddr::from((Ipv6Addr::UNSPECIFIED, port));
        match TcpListener::bind(v6).await {
            Ok(listener) => Ok(listener),
            Err(e) if e.kind() == std::io::ErrorKind::AddrInUse => {
                Err(RelayError::Bind { port, source: e })
            }
            Err(_) => {
                let v4 = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
                TcpListener::bind(v4)
                    .await
                    .map_err(|e| RelayError::Bind { port, source: e })
            }
        }
    }

    /// Bind and serve until a shutdown signal arrives.
    pub async fn run(self) -> Result<(), RelayError> {
        let listener = self.bind().await?;
        self.serve_until(listener, shutdown_signal()).await
    }

    /// Serve on an already-bound listener until `shutdown` resolves.
    pub async fn serve_until<F>(self, listener: TcpListener, shutdown: F) -> Result<(), RelayError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(
            "Serving HTTP on {} port {} (http://{}:{}/) ...",
            addr.ip(),
            addr.port(),
            display_host(&addr),
            addr.port()
        );

        let app = handlers::router(self.store.clone());
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("Relay server stopped");
        Ok(())
    }
}

/// Resolve on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let mut term = match signal(SignalKind::terminate()) {
        Ok(term) => term,
        Err(e) => {
            tracing::warn!("Failed to install SIGTERM handler: {}", e);
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = term.recv() => {}
    }
    tracing::info!("Shutdown signal received, exiting");
}

/// Host part of a displayable URL; IPv6 addresses get bracketed.
fn display_host(addr: &SocketAddr) -> String {
    match addr {
        SocketAddr::V6(v6) => format!("[{}]", v6.ip()),
        SocketAddr::V4(v4) => v4.ip().to_string(),
    }
}
