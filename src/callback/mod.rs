//! Local callback path for notification actions
//!
//! `termux-notification` has no way to call back into this process, so the
//! manager binds a private Unix domain socket and embeds, in every action
//! flag of the display command, a small `curl` invocation against that
//! socket. When the user taps an action, Termux runs the command and the
//! server here routes the carried `(id, action)` pair to the registry.

pub mod protocol;
pub mod server;

pub use server::CallbackServer;

use std::path::PathBuf;

/// Fresh, private socket path for one manager instance.
///
/// The random component keeps concurrently running managers on the same
/// host from colliding and makes the endpoint unguessable.
pub fn socket_path() -> PathBuf {
    crate::termux::tmpdir().join(format!(
        "termux-notification-callback-{}.sock",
        uuid::Uuid::new_v4()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_socket_paths_are_unique() {
        assert_ne!(socket_path(), socket_path());
    }
}
