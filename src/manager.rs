//! Notification manager: live set, display commands, callback lifecycle

use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result;
use tokio::task::JoinSet;
use tracing::warn;

use crate::callback::{self, CallbackServer};
use crate::notification::Notification;
use crate::registry::Registry;
use crate::termux::Toolkit;

/// Owner of the live notification set and the callback listener.
///
/// Typical flow: construct, [`start_listening`](Self::start_listening),
/// [`send`](Self::send) notifications with handlers bound, and call
/// [`shutdown`](Self::shutdown) on the way out so the listener stops and
/// the displayed notifications are withdrawn. Shutdown is explicit and
/// idempotent; if the process dies ungracefully the notifications persist
/// until Android reclaims them.
pub struct NotificationManager {
    toolkit: Toolkit,
    registry: Registry,
    server: CallbackServer,
    shut_down: AtomicBool,
}

impl NotificationManager {
    /// Discover the Termux binaries and set up a fresh private callback
    /// endpoint. Fails when a required binary is missing from the Termux
    /// search path.
    pub fn new() -> Result<Self> {
        Ok(Self::with_toolkit(Toolkit::discover()?))
    }

    /// Build a manager around an explicit [`Toolkit`], for tests and
    /// hosts where discovery does not apply.
    pub fn with_toolkit(toolkit: Toolkit) -> Self {
        let registry = Registry::new();
        let server = CallbackServer::new(callback::socket_path(), registry.clone());
        Self {
            toolkit,
            registry,
            server,
            shut_down: AtomicBool::new(false),
        }
    }

    pub fn toolkit(&self) -> &Toolkit {
        &self.toolkit
    }

    /// Fresh notification id, unique for the lifetime of this process.
    pub fn allocate_id(&self) -> u64 {
        self.registry.allocate_id()
    }

    /// Register the notification (replacing any previous one with the
    /// same id) and issue the display command.
    ///
    /// Success means the command was invoked and completed, not that the
    /// user saw anything. The caller keeps its copy of the record;
    /// handlers are shared between the two.
    pub async fn send(&self, notification: &Notification) -> Result<()> {
        self.registry.insert(notification.clone());
        self.toolkit
            .show_notification(notification, self.server.socket_path())
            .await
    }

    /// Drop the notification from the live set and issue the removal
    /// command. Idempotent when already absent.
    pub async fn remove(&self, notification: &Notification) -> Result<()> {
        self.registry.remove(notification.id());
        self.toolkit.remove_notification(notification.id()).await
    }

    /// Issue removal commands for every live notification, concurrently.
    /// Individual failures are logged and do not abort the batch.
    pub async fn remove_all(&self) {
        let mut removals = JoinSet::new();
        for id in self.registry.live_ids() {
            let toolkit = self.toolkit.clone();
            removals.spawn(async move {
                if let Err(e) = toolkit.remove_notification(id).await {
                    warn!("Failed to remove notification {}: {}", id, e);
                }
            });
        }
        while removals.join_next().await.is_some() {}
    }

    /// Start accepting action callbacks. Call before the first `send`
    /// that binds a handler. No-op when already serving.
    pub async fn start_listening(&self) -> Result<()> {
        self.server.start().await
    }

    /// Stop accepting action callbacks. No-op when not serving;
    /// handlers already dispatched keep running.
    pub fn stop_listening(&self) {
        self.server.stop();
    }

    pub fn is_serving(&self) -> bool {
        self.server.is_serving()
    }

    /// Best-effort teardown: stop the listener and withdraw every
    /// still-live notification, suppressing all errors. Runs at most
    /// once; later calls return immediately.
    pub async fn shutdown(&self) {
        if self.shut_down.swap(true, Ordering::SeqCst) {
            return;
        }
        self.server.stop();
        self.remove_all().await;
    }
}
