//! Boundary to the Termux:API command line tools
//!
//! Everything here treats the Termux side as a black box: commands are
//! spawned with discrete arguments, awaited, and their exit status is
//! logged but not inspected. "The command was invoked and completed" is
//! the only success this layer reports; whether the user ever saw the
//! notification is unknowable from here.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Output;

use anyhow::{Context, Result};
use tokio::process::Command;
use tracing::{debug, warn};

use crate::action::Action;
use crate::callback::protocol;
use crate::notification::Notification;

const DEFAULT_TMPDIR: &str = "/data/data/com.termux/files/usr/tmp";
const DEFAULT_PATH: &str = "/data/data/com.termux/files/usr/bin";

fn in_termux() -> bool {
    std::env::var("TMPDIR")
        .map(|t| t.starts_with("/data/data/com.termux"))
        .unwrap_or(false)
}

/// Temp directory used for callback sockets. `$TMPDIR` is only trusted
/// when the process actually runs inside Termux; elsewhere the host temp
/// directory is used.
pub fn tmpdir() -> PathBuf {
    if in_termux() {
        std::env::var_os("TMPDIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_TMPDIR))
    } else if Path::new(DEFAULT_TMPDIR).is_dir() {
        PathBuf::from(DEFAULT_TMPDIR)
    } else {
        std::env::temp_dir()
    }
}

fn search_path() -> String {
    if in_termux() {
        std::env::var("PATH").unwrap_or_else(|_| DEFAULT_PATH.to_string())
    } else {
        DEFAULT_PATH.to_string()
    }
}

/// Locate `name` as a regular file in the given PATH-style string.
pub fn find_in_path(name: &str, path: &str) -> Option<PathBuf> {
    std::env::split_paths(path)
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
}

/// Resolved locations of the external binaries this crate invokes.
///
/// [`Toolkit::discover`] is the usual constructor; the fields are public
/// so tests and non-Termux hosts can point them anywhere.
#[derive(Debug, Clone)]
pub struct Toolkit {
    pub notification: PathBuf,
    pub notification_remove: PathBuf,
    pub toast: PathBuf,
    pub clipboard_get: PathBuf,
    pub clipboard_set: PathBuf,
    pub curl: PathBuf,
}

impl Toolkit {
    /// Resolve every binary on the Termux search path. A missing binary
    /// is an environment error and is reported here, at construction,
    /// rather than surfacing as a confusing failure on first use.
    pub fn discover() -> Result<Self> {
        let path = search_path();
        let find = |name: &str| {
            find_in_path(name, &path)
                .with_context(|| format!("'{}' not found in PATH ({})", name, path))
        };
        Ok(Self {
            notification: find("termux-notification")?,
            notification_remove: find("termux-notification-remove")?,
            toast: find("termux-toast")?,
            clipboard_get: find("termux-clipboard-get")?,
            clipboard_set: find("termux-clipboard-set")?,
            curl: find("curl")?,
        })
    }

    /// Show a transient toast popup.
    pub async fn toast(&self, msg: &str, options: &ToastOptions) -> Result<()> {
        let mut args: Vec<&str> = vec![
            "-b",
            &options.background,
            "-c",
            &options.color,
            "-g",
            &options.position,
        ];
        if options.short {
            args.push("-s");
        }
        args.push(msg);
        run(&self.toast, &args).await?;
        Ok(())
    }

    /// Read the system clipboard.
    pub async fn clipboard_get(&self) -> Result<String> {
        let output = run(&self.clipboard_get, &[] as &[&str]).await?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Replace the system clipboard contents.
    pub async fn clipboard_set(&self, text: &str) -> Result<()> {
        run(&self.clipboard_set, &[text]).await?;
        Ok(())
    }

    /// Issue the display command for a notification.
    pub async fn show_notification(&self, notification: &Notification, socket: &Path) -> Result<()> {
        let args = self.display_args(notification, socket);
        run(&self.notification, &args).await?;
        Ok(())
    }

    /// Issue the removal command for a notification id.
    pub async fn remove_notification(&self, id: u64) -> Result<()> {
        run(&self.notification_remove, &[id.to_string()]).await?;
        Ok(())
    }

    fn callback(&self, socket: &Path, id: u64, action: Action) -> String {
        protocol::callback_command(&self.curl, socket, id, action)
    }

    /// Argument list for `termux-notification`: one flag/value pair per
    /// attribute, omitted when unset, plus a callback command for every
    /// action the notification should report back.
    fn display_args(&self, n: &Notification, socket: &Path) -> Vec<String> {
        let id = n.id();
        let mut args: Vec<String> = vec!["--id".into(), id.to_string(), "--content".into(), n.content.clone()];

        fn opt(args: &mut Vec<String>, flag: &str, value: &str) {
            if !value.is_empty() {
                args.push(flag.to_string());
                args.push(value.to_string());
            }
        }
        opt(&mut args, "--title", &n.title);
        opt(&mut args, "--group", &n.group);
        opt(&mut args, "--priority", &n.priority);
        opt(&mut args, "--type", &n.style);
        if n.alert_once {
            args.push("--alert-once".into());
        }
        if n.ongoing {
            args.push("--ongoing".into());
        }
        if n.sound {
            args.push("--sound".into());
        }
        opt(&mut args, "--image-path", &n.image_path);
        opt(&mut args, "--icon", &n.icon);
        opt(&mut args, "--vibrate", &n.vibrate);

        // An ephemeral notification can always be clicked or dismissed,
        // so those callbacks are wired even without a handler. A pinned
        // (ongoing) one only gets them when the caller bound a handler.
        if n.handler_for(Action::Click).is_some() || !n.ongoing {
            args.push("--action".into());
            args.push(self.callback(socket, id, Action::Click));
        }
        if n.handler_for(Action::Delete).is_some() || !n.ongoing {
            args.push("--on-delete".into());
            args.push(self.callback(socket, id, Action::Delete));
        }

        if n.style == "media" {
            let media = [
                ("--media-play", Action::MediaPlay),
                ("--media-pause", Action::MediaPause),
                ("--media-next", Action::MediaNext),
                ("--media-previous", Action::MediaPrevious),
            ];
            for (flag, action) in media {
                if n.handler_for(action).is_some() {
                    args.push(flag.into());
                    args.push(self.callback(socket, id, action));
                }
            }
        }

        let buttons = [
            ("--button1", "--button1-action", 1, Action::Button1),
            ("--button2", "--button2-action", 2, Action::Button2),
            ("--button3", "--button3-action", 3, Action::Button3),
        ];
        for (label_flag, action_flag, slot, action) in buttons {
            let label = n.button_label(slot);
            if !label.is_empty() {
                args.push(label_flag.into());
                args.push(label.to_string());
            }
            if n.handler_for(action).is_some() {
                args.push(action_flag.into());
                args.push(self.callback(socket, id, action));
            }
        }

        args
    }
}

/// Run an external command to completion, capturing its output.
///
/// Spawn failure is the caller's error; a non-zero exit is only logged,
/// since the Termux tools are not consistent about status codes and this
/// boundary only promises "invoked and completed".
pub async fn run<S: AsRef<OsStr>>(program: &Path, args: &[S]) -> Result<Output> {
    debug!("Invoking {}", program.display());
    let output = Command::new(program)
        .args(args)
        .output()
        .await
        .with_context(|| format!("Failed to invoke {}", program.display()))?;
    if !output.status.success() {
        warn!(
            "{} exited with {}: {}",
            program.display(),
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    Ok(output)
}

/// Appearance options for [`Toolkit::toast`].
#[derive(Debug, Clone)]
pub struct ToastOptions {
    /// Background color.
    pub background: String,
    /// Text color.
    pub color: String,
    /// top, middle, or bottom.
    pub position: String,
    /// Only show the toast briefly.
    pub short: bool,
}

impl Default for ToastOptions {
    fn default() -> Self {
        Self {
            background: "gray".to_string(),
            color: "white".to_string(),
            position: "middle".to_string(),
            short: false,
        }
    }
}
