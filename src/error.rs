//! Error type for relay operations.

use std::process::ExitStatus;
use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by the relay client and server
#[derive(Debug, Error)]
pub enum RelayError {
    /// The listener could not be bound (typically the port is in use)
    #[error("failed to bind port {port}: {source}")]
    Bind {
        port: u16,
        #[source]
        source: std::io::Error,
    },

    /// The server worker process could not be spawned
    #[error("failed to launch relay server: {0}")]
    Spawn(#[source] std::io::Error),

    /// The worker process exited while the client waited for it to come up
    #[error("relay server exited during startup with {status}")]
    ServerExited { status: ExitStatus },

    /// The worker process never started accepting connections
    #[error("relay server not ready on port {port} after {timeout:?}")]
    StartTimeout { port: u16, timeout: Duration },

    /// A frame POST failed (server unreachable, connection reset, non-2xx)
    #[error("frame push failed: {0}")]
    Push(#[from] ureq::Error),

    /// Server-side I/O failure
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The rendering engine failed to apply or render an operation
    #[error("rendering engine error: {0}")]
    Engine(#[from] anyhow::Error),
}
