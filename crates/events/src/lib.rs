//! Questline editor event bus.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`; the state-change signal the presentation
//!   layer re-renders on.
//! - [`EditorEvent`]: the event envelope.
//! - [`kinds`]: event type names.

pub mod bus;
pub mod kinds;

pub use bus::{EditorEvent, EventBus};
