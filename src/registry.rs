//! Live notification set and action dispatch
//!
//! The registry is the single source of truth for which notifications are
//! currently displayed and routable. The callback server reads it at
//! dispatch time, so a handler only ever fires against whichever record is
//! registered under that id at that moment.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::action::Action;
use crate::notification::Notification;

/// Cloneable handle to the live set and the id counter.
///
/// The mutex is only ever held for non-awaiting critical sections:
/// replace-on-insert and resolve-then-remove each happen under a single
/// lock acquisition so no interleaved dispatch can observe a
/// partially-updated set.
#[derive(Clone, Default)]
pub struct Registry {
    live: Arc<Mutex<HashMap<u64, Notification>>>,
    next_id: Arc<AtomicU64>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh notification id: strictly increasing, starting at 1, never
    /// reused within a process run.
    pub fn allocate_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Register a notification, replacing any previous entry with the
    /// same id. Last writer wins.
    pub fn insert(&self, notification: Notification) {
        let mut live = self.live.lock().unwrap();
        live.insert(notification.id(), notification);
    }

    /// Drop an id from the live set. Idempotent.
    pub fn remove(&self, id: u64) -> Option<Notification> {
        self.live.lock().unwrap().remove(&id)
    }

    pub fn contains(&self, id: u64) -> bool {
        self.live.lock().unwrap().contains_key(&id)
    }

    /// Ids of every currently live notification, in no particular order.
    pub fn live_ids(&self) -> Vec<u64> {
        self.live.lock().unwrap().keys().copied().collect()
    }

    /// Route a user action to the handler bound on the live notification
    /// with that id.
    ///
    /// Unknown ids and unbound actions are silently discarded: the user
    /// may have interacted with a notification this process already
    /// forgot. A bound handler is spawned detached, so a slow or failing
    /// handler never stalls the caller; its outcome is unobserved here.
    /// Click and delete are terminal, so the entry is removed whether or
    /// not a handler was bound.
    ///
    /// Returns whether a handler was scheduled.
    pub fn dispatch(&self, id: u64, action: Action) -> bool {
        let handler = {
            let mut live = self.live.lock().unwrap();
            let Some(notification) = live.get(&id) else {
                debug!("Dropping action {} for unknown notification {}", action, id);
                return false;
            };
            let handler = notification.handler_for(action).cloned();
            if action.is_terminal() {
                live.remove(&id);
            }
            handler
        };

        match handler {
            Some(handler) => {
                tokio::spawn(handler());
                true
            }
            None => {
                debug!("No handler bound for action {} on notification {}", action, id);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::handler;
    use std::sync::atomic::AtomicUsize;

    fn counting(counter: &Arc<AtomicUsize>) -> crate::notification::ActionHandler {
        let counter = Arc::clone(counter);
        handler(move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        })
    }

    #[test]
    fn test_allocated_ids_are_unique_and_increasing() {
        let registry = Registry::new();
        let ids: Vec<u64> = (0..100).map(|_| registry.allocate_id()).collect();
        assert_eq!(ids[0], 1);
        for pair in ids.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[tokio::test]
    async fn test_replace_keeps_one_entry_and_routes_to_newest() {
        let registry = Registry::new();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        let mut n = Notification::new(5, "first");
        n.set_button1("OK", Some(counting(&first)));
        registry.insert(n);

        let mut n = Notification::new(5, "second");
        n.set_button1("OK", Some(counting(&second)));
        registry.insert(n);

        assert_eq!(registry.live_ids(), vec![5]);

        assert!(registry.dispatch(5, Action::Button1));
        tokio::task::yield_now().await;
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_terminal_action_removes_even_without_handler() {
        let registry = Registry::new();
        registry.insert(Notification::new(1, "hi"));
        registry.insert(Notification::new(2, "hi"));

        assert!(!registry.dispatch(1, Action::Click));
        assert!(!registry.dispatch(2, Action::Delete));
        assert!(!registry.contains(1));
        assert!(!registry.contains(2));
    }

    #[tokio::test]
    async fn test_terminal_action_removes_with_handler() {
        let registry = Registry::new();
        let clicks = Arc::new(AtomicUsize::new(0));
        let mut n = Notification::new(3, "hi");
        n.set_click_action(Some(counting(&clicks)));
        registry.insert(n);

        assert!(registry.dispatch(3, Action::Click));
        tokio::task::yield_now().await;
        assert_eq!(clicks.load(Ordering::SeqCst), 1);
        assert!(!registry.contains(3));
    }

    #[tokio::test]
    async fn test_unknown_id_and_unbound_action_are_noops() {
        let registry = Registry::new();
        registry.insert(Notification::new(1, "hi"));

        assert!(!registry.dispatch(99, Action::Click));
        assert!(!registry.dispatch(1, Action::Button2));
        // A non-terminal unbound action leaves the entry alone.
        assert!(registry.contains(1));
    }

    #[tokio::test]
    async fn test_non_terminal_actions_are_repeatable() {
        let registry = Registry::new();
        let presses = Arc::new(AtomicUsize::new(0));
        let mut n = Notification::new(4, "hi");
        n.set_button1("OK", Some(counting(&presses)));
        registry.insert(n);

        assert!(registry.dispatch(4, Action::Button1));
        assert!(registry.dispatch(4, Action::Button1));
        tokio::task::yield_now().await;
        assert_eq!(presses.load(Ordering::SeqCst), 2);
        assert!(registry.contains(4));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_dispatch_isolation() {
        let registry = Registry::new();
        let a = Arc::new(AtomicUsize::new(0));
        let b = Arc::new(AtomicUsize::new(0));

        let mut n = Notification::new(1, "a");
        n.set_click_action(Some(counting(&a)));
        registry.insert(n);
        let mut n = Notification::new(2, "b");
        n.set_click_action(Some(counting(&b)));
        registry.insert(n);

        let r1 = registry.clone();
        let r2 = registry.clone();
        let t1 = tokio::spawn(async move { r1.dispatch(1, Action::Click) });
        let t2 = tokio::spawn(async move { r2.dispatch(2, Action::Click) });
        assert!(t1.await.unwrap());
        assert!(t2.await.unwrap());

        // Let the detached handlers run.
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert_eq!(a.load(Ordering::SeqCst), 1);
        assert_eq!(b.load(Ordering::SeqCst), 1);
        assert!(!registry.contains(1));
        assert!(!registry.contains(2));
    }
}
