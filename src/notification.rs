//! Notification record and action handler bindings

use std::future::Future;
use std::hash::{Hash, Hasher};
use std::pin::Pin;
use std::sync::Arc;

use crate::action::Action;

/// Boxed future returned by an action handler.
pub type ActionFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// A zero-argument asynchronous callback invoked when the user triggers
/// an action. Handlers are shared so a registered notification and the
/// caller's copy stay in sync.
pub type ActionHandler = Arc<dyn Fn() -> ActionFuture + Send + Sync>;

/// Wrap an async closure into an [`ActionHandler`].
///
/// ```no_run
/// use termux_notify::handler;
/// let h = handler(|| async { println!("clicked"); });
/// ```
pub fn handler<F, Fut>(f: F) -> ActionHandler
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    Arc::new(move || Box::pin(f()))
}

/// One notification to be shown by `termux-notification`.
///
/// Identity is the numeric id alone: two records with the same id are the
/// same notification as far as the display service and the registry are
/// concerned, whatever their other fields say. Obtain ids from
/// [`NotificationManager::allocate_id`](crate::manager::NotificationManager::allocate_id);
/// re-sending an id replaces the previous notification.
///
/// Display attributes are plain value data with empty-string meaning
/// "not set", mirroring the flags of the external command. Some systems
/// ignore `style`, `alert_once`, `sound`, `icon`, and `vibrate`.
#[derive(Clone)]
pub struct Notification {
    id: u64,
    /// Content text shown in the notification body.
    pub content: String,
    /// Title line.
    pub title: String,
    /// Notifications with the same group are shown together.
    pub group: String,
    /// high/low/max/min/default.
    pub priority: String,
    /// Notification style; "media" enables the media-transport callbacks.
    pub style: String,
    /// Do not alert again when the notification is edited.
    pub alert_once: bool,
    /// Pin the notification.
    pub ongoing: bool,
    /// Play a sound when shown.
    pub sound: bool,
    /// Absolute path to an image shown in the notification.
    pub image_path: String,
    /// Status bar icon name (material icon set).
    pub icon: String,
    /// Vibration pattern, comma separated, e.g. "500,1000,200".
    pub vibrate: String,

    button1: String,
    button2: String,
    button3: String,
    on_button1: Option<ActionHandler>,
    on_button2: Option<ActionHandler>,
    on_button3: Option<ActionHandler>,
    on_click: Option<ActionHandler>,
    on_delete: Option<ActionHandler>,
    on_media_play: Option<ActionHandler>,
    on_media_pause: Option<ActionHandler>,
    on_media_next: Option<ActionHandler>,
    on_media_previous: Option<ActionHandler>,
}

impl Notification {
    pub fn new(id: u64, content: impl Into<String>) -> Self {
        Self {
            id,
            content: content.into(),
            title: String::new(),
            group: String::new(),
            priority: String::new(),
            style: String::new(),
            alert_once: false,
            ongoing: false,
            sound: false,
            image_path: String::new(),
            icon: String::new(),
            vibrate: String::new(),
            button1: String::new(),
            button2: String::new(),
            button3: String::new(),
            on_button1: None,
            on_button2: None,
            on_button3: None,
            on_click: None,
            on_delete: None,
            on_media_play: None,
            on_media_pause: None,
            on_media_next: None,
            on_media_previous: None,
        }
    }

    /// Notification id. Fixed at construction.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn set_click_action(&mut self, handler: Option<ActionHandler>) {
        self.on_click = handler;
    }

    pub fn set_delete_action(&mut self, handler: Option<ActionHandler>) {
        self.on_delete = handler;
    }

    pub fn set_media_play_action(&mut self, handler: Option<ActionHandler>) {
        self.on_media_play = handler;
    }

    pub fn set_media_pause_action(&mut self, handler: Option<ActionHandler>) {
        self.on_media_pause = handler;
    }

    pub fn set_media_next_action(&mut self, handler: Option<ActionHandler>) {
        self.on_media_next = handler;
    }

    pub fn set_media_previous_action(&mut self, handler: Option<ActionHandler>) {
        self.on_media_previous = handler;
    }

    /// Set button 1. A label and a handler go together: an empty label or
    /// an absent handler clears both, so a button is never persisted
    /// half-configured.
    pub fn set_button1(&mut self, label: impl Into<String>, handler: Option<ActionHandler>) {
        (self.button1, self.on_button1) = Self::button_slot(label.into(), handler);
    }

    /// Set button 2; same coupling rule as [`set_button1`](Self::set_button1).
    pub fn set_button2(&mut self, label: impl Into<String>, handler: Option<ActionHandler>) {
        (self.button2, self.on_button2) = Self::button_slot(label.into(), handler);
    }

    /// Set button 3; same coupling rule as [`set_button1`](Self::set_button1).
    pub fn set_button3(&mut self, label: impl Into<String>, handler: Option<ActionHandler>) {
        (self.button3, self.on_button3) = Self::button_slot(label.into(), handler);
    }

    fn button_slot(
        label: String,
        handler: Option<ActionHandler>,
    ) -> (String, Option<ActionHandler>) {
        if label.is_empty() || handler.is_none() {
            (String::new(), None)
        } else {
            (label, handler)
        }
    }

    /// Label of button `slot` (1..=3), empty when unset.
    pub fn button_label(&self, slot: u8) -> &str {
        match slot {
            1 => &self.button1,
            2 => &self.button2,
            3 => &self.button3,
            _ => "",
        }
    }

    /// Handler bound to `action`, if any.
    pub fn handler_for(&self, action: Action) -> Option<&ActionHandler> {
        match action {
            Action::Click => self.on_click.as_ref(),
            Action::Delete => self.on_delete.as_ref(),
            Action::Button1 => self.on_button1.as_ref(),
            Action::Button2 => self.on_button2.as_ref(),
            Action::Button3 => self.on_button3.as_ref(),
            Action::MediaPlay => self.on_media_play.as_ref(),
            Action::MediaPause => self.on_media_pause.as_ref(),
            Action::MediaNext => self.on_media_next.as_ref(),
            Action::MediaPrevious => self.on_media_previous.as_ref(),
        }
    }
}

impl PartialEq for Notification {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Notification {}

impl Hash for Notification {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl std::fmt::Debug for Notification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notification")
            .field("id", &self.id)
            .field("content", &self.content)
            .field("title", &self.title)
            .field("ongoing", &self.ongoing)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn noop() -> ActionHandler {
        handler(|| async {})
    }

    fn hash_of(n: &Notification) -> u64 {
        let mut h = DefaultHasher::new();
        n.hash(&mut h);
        h.finish()
    }

    #[test]
    fn test_identity_is_id_only() {
        let a = Notification::new(7, "first");
        let mut b = Notification::new(7, "second");
        b.title = "different".to_string();
        b.set_click_action(Some(noop()));
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
        assert_ne!(a, Notification::new(8, "first"));
    }

    #[test]
    fn test_button_label_and_handler_are_coupled() {
        let mut n = Notification::new(1, "hi");

        n.set_button1("OK", Some(noop()));
        assert_eq!(n.button_label(1), "OK");
        assert!(n.handler_for(Action::Button1).is_some());

        // Empty label clears the handler too.
        n.set_button1("", Some(noop()));
        assert_eq!(n.button_label(1), "");
        assert!(n.handler_for(Action::Button1).is_none());

        // Absent handler clears the label too.
        n.set_button2("Cancel", None);
        assert_eq!(n.button_label(2), "");
        assert!(n.handler_for(Action::Button2).is_none());
    }

    #[test]
    fn test_set_then_clear_matches_never_set() {
        let mut set_then_cleared = Notification::new(1, "hi");
        set_then_cleared.set_button3("Go", Some(noop()));
        set_then_cleared.set_button3("", None);

        let never_set = Notification::new(1, "hi");
        assert_eq!(set_then_cleared.button_label(3), never_set.button_label(3));
        assert_eq!(
            set_then_cleared.handler_for(Action::Button3).is_some(),
            never_set.handler_for(Action::Button3).is_some()
        );
    }

    #[test]
    fn test_fixed_role_setters() {
        let mut n = Notification::new(2, "media");
        n.set_media_play_action(Some(noop()));
        n.set_media_previous_action(Some(noop()));
        assert!(n.handler_for(Action::MediaPlay).is_some());
        assert!(n.handler_for(Action::MediaPrevious).is_some());
        assert!(n.handler_for(Action::MediaPause).is_none());

        n.set_media_play_action(None);
        assert!(n.handler_for(Action::MediaPlay).is_none());
    }
}
