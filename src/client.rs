//! Blocking client that owns the relay server worker process and pushes
//! frames to it over HTTP.

use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, TcpStream};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;

use crate::config::RelaySettings;
use crate::error::RelayError;

/// How long `ensure_started` waits for a freshly spawned server to accept
/// connections.
const READY_TIMEOUT: Duration = Duration::from_secs(10);
const READY_PROBE_INTERVAL: Duration = Duration::from_millis(50);
const PROBE_CONNECT_TIMEOUT: Duration = Duration::from_millis(200);

/// Grace period between SIGTERM and SIGKILL on stop.
const STOP_GRACE: Duration = Duration::from_secs(3);

/// Name of the worker binary shipped with this crate.
const SERVER_BIN: &str = "plotrelay-server";

/// The relay server this client talks to
enum ServerHandle {
    /// Worker process spawned and owned by this client
    Spawned(Child),
    /// A relay already listening on the port, started elsewhere
    External,
}

/// Client side of the relay.
///
/// Spawns the server worker process on first use and pushes encoded
/// frames to it with blocking HTTP POSTs. Dropping the client stops an
/// owned server, so a host program that exits without calling
/// [`stop`](Self::stop) does not leak the worker process.
pub struct RelayClient {
    settings: RelaySettings,
    server: Option<ServerHandle>,
    server_command: Option<(PathBuf, Vec<String>)>,
}

impl RelayClient {
    /// Client for the default port.
    pub fn new() -> Self {
        Self::with_settings(RelaySettings::default())
    }

    /// Client for the given settings.
    pub fn with_settings(settings: RelaySettings) -> Self {
        Self {
            settings,
            server: None,
            server_command: None,
        }
    }

    /// Replace the command used to launch the worker process.
    ///
    /// The default resolves the `plotrelay-server` binary next to the
    /// current executable, falling back to `$PATH`.
    pub fn with_server_command(mut self, program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        self.server_command = Some((program.into(), args));
        self
    }

    /// Port this client pushes to.
    pub fn port(&self) -> u16 {
        self.settings.port
    }

    fn endpoint(&self) -> String {
        format!("http://localhost:{}/", self.settings.port)
    }

    /// Start the relay server if this client does not already own one.
    ///
    /// Idempotent. A relay already listening on the port (started by
    /// another client instance) is adopted instead of spawning a second
    /// process; an owned process found dead is restarted. A spawned
    /// server that exits before accepting connections (the bind-failure
    /// case) surfaces here as an error.
    pub fn ensure_started(&mut self) -> Result<(), RelayError> {
        match &mut self.server {
            Some(ServerHandle::External) => return Ok(()),
            Some(ServerHandle::Spawned(child)) => match child.try_wait() {
                Ok(None) => return Ok(()),
                _ => {
                    tracing::warn!("relay server process is gone, restarting");
                    self.server = None;
                }
            },
            None => {}
        }

        if port_accepts(self.settings.port) {
            tracing::debug!(
                "adopting relay already listening on port {}",
                self.settings.port
            );
            self.server = Some(ServerHandle::External);
            return Ok(());
        }

        let mut child = self.spawn_server()?;
        wait_until_ready(&mut child, self.settings.port)?;
        self.server = Some(ServerHandle::Spawned(child));
        Ok(())
    }

    /// Push one encoded frame, starting the server first if needed.
    ///
    /// Blocks until the server acknowledges. Failures are not retried;
    /// a refused connection or reset surfaces as [`RelayError::Push`].
    pub fn push_frame(&mut self, frame: &[u8]) -> Result<(), RelayError> {
        self.ensure_started()?;
        ureq::post(&self.endpoint())
            .header("Content-Type", "application/octet-stream")
            .send(frame)?;
        Ok(())
    }

    /// Stop an owned server process; no-op when none is running or the
    /// server belongs to someone else. Safe to call repeatedly.
    pub fn stop(&mut self) {
        let Some(handle) = self.server.take() else {
            return;
        };
        let ServerHandle::Spawned(mut child) = handle else {
            return;
        };

        let pid = Pid::from_raw(child.id() as i32);
        if let Err(e) = signal::kill(pid, Signal::SIGTERM) {
            tracing::debug!("SIGTERM to relay server failed: {}", e);
        }

        let deadline = Instant::now() + STOP_GRACE;
        while Instant::now() < deadline {
            match child.try_wait() {
                Ok(Some(_)) => return,
                Ok(None) => std::thread::sleep(Duration::from_millis(50)),
                Err(e) => {
                    tracing::debug!("waiting for relay server failed: {}", e);
                    break;
                }
            }
        }

        tracing::warn!("relay server did not exit after SIGTERM, killing");
        let _ = child.kill();
        let _ = child.wait();
    }

    fn spawn_server(&self) -> Result<Child, RelayError> {
        let (program, args) = match &self.server_command {
            Some((program, args)) => (program.clone(), args.clone()),
            None => (
                default_server_program(),
                vec![
                    "serve".to_string(),
                    "--port".to_string(),
                    self.settings.port.to_string(),
                ],
            ),
        };
        tracing::debug!("launching {:?} {:?}", program, args);
        Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .spawn()
            .map_err(RelayError::Spawn)
    }
}

impl Default for RelayClient {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for RelayClient {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Locate the worker binary: next to the current executable if present
/// (cargo places both in the same target directory), otherwise `$PATH`.
fn default_server_program() -> PathBuf {
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            let sibling = dir.join(SERVER_BIN);
            if sibling.exists() {
                return sibling;
            }
        }
    }
    PathBuf::from(SERVER_BIN)
}

/// Whether something is accepting connections on the loopback port.
fn port_accepts(port: u16) -> bool {
    let candidates = [
        SocketAddr::from((Ipv6Addr::LOCALHOST, port)),
        SocketAddr::from((Ipv4Addr::LOCALHOST, port)),
    ];
    candidates
        .iter()
        .any(|addr| TcpStream::connect_timeout(addr, PROBE_CONNECT_TIMEOUT).is_ok())
}

/// Wait for the spawned server to accept connections, surfacing an early
/// exit as an error.
fn wait_until_ready(child: &mut Child, port: u16) -> Result<(), RelayError> {
    let deadline = Instant::now() + READY_TIMEOUT;
    loop {
        if port_accepts(port) {
            return Ok(());
        }
        if let Ok(Some(status)) = child.try_wait() {
            return Err(RelayError::ServerExited { status });
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            return Err(RelayError::StartTimeout {
                port,
                timeout: READY_TIMEOUT,
            });
        }
        std::thread::sleep(READY_PROBE_INTERVAL);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_without_start_is_noop() {
        let mut client = RelayClient::new();
        client.stop();
        client.stop();
    }

    /// A port that was free a moment ago.
    fn free_port() -> u16 {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    }

    #[test]
    fn test_spawn_failure_propagates() {
        let mut client = RelayClient::with_settings(RelaySettings::with_port(free_port()))
            .with_server_command("/nonexistent/plotrelay-server", vec![]);
        match client.ensure_started() {
            Err(RelayError::Spawn(_)) => {}
            other => panic!("expected spawn error, got {:?}", other),
        }
    }

    #[test]
    fn test_server_exit_during_startup_propagates() {
        // `false` exits immediately, like a server whose bind failed
        let mut client = RelayClient::with_settings(RelaySettings::with_port(free_port()))
            .with_server_command("false", vec![]);
        match client.ensure_started() {
            Err(RelayError::ServerExited { status }) => assert!(!status.success()),
            other => panic!("expected early exit error, got {:?}", other),
        }
    }

    #[test]
    fn test_adopts_external_server() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let mut client = RelayClient::with_settings(RelaySettings::with_port(port));
        client.ensure_started().unwrap();
        client.ensure_started().unwrap();
        assert!(matches!(client.server, Some(ServerHandle::External)));

        // Stopping never touches a server this client does not own
        client.stop();
        assert!(client.server.is_none());
        drop(listener);
    }

    #[test]
    fn test_push_frame_surfaces_startup_failure() {
        // Nothing listens on the port and the launcher dies at once, so
        // the push fails instead of being retried
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let mut client = RelayClient::with_settings(RelaySettings::with_port(port))
            .with_server_command("false", vec![]);
        assert!(client.push_frame(b"frame").is_err());
    }
}
