//! Unix domain socket server for notification action callbacks

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{info, warn};

use super::protocol;
use crate::registry::Registry;

/// A stalled connection may not hold its slot open forever.
const READ_TIMEOUT: Duration = Duration::from_secs(5);

/// Listener for callback requests on a private per-manager socket.
///
/// Accepts many concurrent short-lived connections; each carries exactly
/// one request line which is routed to the registry. `start` and `stop`
/// are idempotent, and stopping never cancels connections already being
/// handled or handlers already dispatched.
pub struct CallbackServer {
    socket_path: PathBuf,
    registry: Registry,
    accept_task: Mutex<Option<JoinHandle<()>>>,
}

impl CallbackServer {
    pub fn new(socket_path: PathBuf, registry: Registry) -> Self {
        Self {
            socket_path,
            registry,
            accept_task: Mutex::new(None),
        }
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Bind the socket and start accepting callback connections.
    /// No-op when already serving.
    pub async fn start(&self) -> Result<()> {
        let mut slot = self.accept_task.lock().unwrap();
        if slot.is_some() {
            return Ok(());
        }

        // Remove a stale socket left over from a crashed run.
        if self.socket_path.exists() {
            std::fs::remove_file(&self.socket_path).context("Failed to remove existing socket")?;
        }
        if let Some(parent) = self.socket_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create socket directory")?;
        }

        let listener = UnixListener::bind(&self.socket_path)
            .with_context(|| format!("Failed to bind to socket: {}", self.socket_path.display()))?;

        info!("Callback listener started at: {}", self.socket_path.display());

        let registry = self.registry.clone();
        *slot = Some(tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((stream, _addr)) => {
                        let registry = registry.clone();
                        tokio::spawn(async move {
                            if let Err(e) = handle_connection(stream, registry).await {
                                warn!("Error handling callback connection: {}", e);
                            }
                        });
                    }
                    Err(e) => {
                        warn!("Failed to accept callback connection: {}", e);
                    }
                }
            }
        }));

        Ok(())
    }

    /// Stop accepting connections and remove the socket. No-op when not
    /// serving. In-flight connections keep running to completion.
    pub fn stop(&self) {
        let Some(task) = self.accept_task.lock().unwrap().take() else {
            return;
        };
        task.abort();
        if let Err(e) = std::fs::remove_file(&self.socket_path) {
            warn!("Failed to remove callback socket: {}", e);
        }
        info!("Callback listener stopped");
    }

    pub fn is_serving(&self) -> bool {
        self.accept_task.lock().unwrap().is_some()
    }
}

impl Drop for CallbackServer {
    fn drop(&mut self) {
        // The socket file must not outlive the server.
        self.stop();
    }
}

/// Read one request line, route it, acknowledge, close.
///
/// Malformed input drops the connection without a response; the external
/// caller only checks that its command completed, not what came back.
async fn handle_connection(stream: UnixStream, registry: Registry) -> Result<()> {
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);

    let mut line = String::new();
    timeout(READ_TIMEOUT, reader.read_line(&mut line))
        .await
        .context("Timed out reading callback request")?
        .context("Failed to read callback request")?;

    let (id, action) = protocol::parse_request_line(&line)
        .with_context(|| format!("Malformed callback request: {:?}", line.trim_end()))?;

    registry.dispatch(id, action);

    write_half
        .write_all(protocol::OK_RESPONSE)
        .await
        .context("Failed to write callback response")?;
    write_half.shutdown().await.ok();
    Ok(())
}
