//! Notification action identifiers

use std::fmt;
use std::str::FromStr;

/// User action on a displayed notification.
///
/// The string form of each variant is the token carried in callback
/// request paths (`/{id}:{action}`) and is part of the wire protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Click,
    Delete,
    Button1,
    Button2,
    Button3,
    MediaPlay,
    MediaPause,
    MediaNext,
    MediaPrevious,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Click => "click",
            Action::Delete => "delete",
            Action::Button1 => "button1",
            Action::Button2 => "button2",
            Action::Button3 => "button3",
            Action::MediaPlay => "media_play",
            Action::MediaPause => "media_pause",
            Action::MediaNext => "media_next",
            Action::MediaPrevious => "media_previous",
        }
    }

    /// Click and delete end the notification's liveness: the display
    /// service stops showing it, so the live set drops it at dispatch.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Action::Click | Action::Delete)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "click" => Ok(Action::Click),
            "delete" => Ok(Action::Delete),
            "button1" => Ok(Action::Button1),
            "button2" => Ok(Action::Button2),
            "button3" => Ok(Action::Button3),
            "media_play" => Ok(Action::MediaPlay),
            "media_pause" => Ok(Action::MediaPause),
            "media_next" => Ok(Action::MediaNext),
            "media_previous" => Ok(Action::MediaPrevious),
            _ => anyhow::bail!("Unknown action token: {}", s),
        }
    }
}
