//! Async Termux notification API with interactive action callbacks.
//!
//! Displaying a notification is a single `termux-notification` invocation;
//! the work in this crate is the feedback path. Termux cannot call back
//! into a running process, so [`NotificationManager`] binds a private Unix
//! socket, embeds `curl` callback commands in every action flag it hands
//! to Termux, and routes the resulting requests to the handlers bound on
//! each [`Notification`].

pub mod action;
pub mod callback;
pub mod manager;
pub mod notification;
pub mod registry;
pub mod termux;

pub use action::Action;
pub use manager::NotificationManager;
pub use notification::{handler, ActionFuture, ActionHandler, Notification};
pub use termux::{ToastOptions, Toolkit};
