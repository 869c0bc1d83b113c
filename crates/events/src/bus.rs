//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is shared via `Arc<EventBus>` between the editor
//! controllers and whoever renders their state.

use chrono::{DateTime, Utc};
use questline_core::types::TrainingId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// EditorEvent
// ---------------------------------------------------------------------------

/// Something observable happened to an edit session or wizard.
///
/// Constructed via [`EditorEvent::new`] and enriched with the builder
/// methods [`with_training`](EditorEvent::with_training),
/// [`with_wizard`](EditorEvent::with_wizard) and
/// [`with_payload`](EditorEvent::with_payload).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorEvent {
    /// Dot-separated event name, e.g. `"session.saved"`. See [`crate::kinds`].
    pub event_type: String,

    /// Training whose edit session emitted the event.
    pub training_id: Option<TrainingId>,

    /// Wizard instance that emitted the event.
    pub wizard_id: Option<Uuid>,

    pub payload: serde_json::Value,

    pub timestamp: DateTime<Utc>,
}

impl EditorEvent {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            training_id: None,
            wizard_id: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    pub fn with_training(mut self, training_id: TrainingId) -> Self {
        self.training_id = Some(training_id);
        self
    }

    pub fn with_wizard(mut self, wizard_id: Uuid) -> Self {
        self.wizard_id = Some(wizard_id);
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// # Usage
///
/// ```rust
/// use questline_events::bus::{EditorEvent, EventBus};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(EditorEvent::new("session.loaded"));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<EditorEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// Slow receivers that fall more than `capacity` events behind observe
    /// `RecvError::Lagged` and skip ahead.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish to all current subscribers. Dropped if nobody listens.
    pub fn publish(&self, event: EditorEvent) {
        tracing::trace!(event_type = %event.event_type, "Publishing editor event");
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EditorEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinds;

    #[tokio::test]
    async fn publish_and_receive_single_subscriber() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();
        let training_id = Uuid::new_v4();

        bus.publish(
            EditorEvent::new(kinds::SESSION_SAVED)
                .with_training(training_id)
                .with_payload(serde_json::json!({"upserted": 3})),
        );

        let received = rx.recv().await.expect("should receive the event");
        assert_eq!(received.event_type, "session.saved");
        assert_eq!(received.training_id, Some(training_id));
        assert_eq!(received.wizard_id, None);
        assert_eq!(received.payload["upserted"], 3);
    }

    #[tokio::test]
    async fn multiple_subscribers_receive_same_event() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        bus.publish(EditorEvent::new(kinds::WIZARD_CANCELLED).with_wizard(Uuid::nil()));

        let e1 = rx1.recv().await.expect("subscriber 1 should receive");
        let e2 = rx2.recv().await.expect("subscriber 2 should receive");
        assert_eq!(e1.event_type, kinds::WIZARD_CANCELLED);
        assert_eq!(e2.wizard_id, Some(Uuid::nil()));
    }

    #[test]
    fn publish_with_no_subscribers_does_not_panic() {
        let bus = EventBus::default();
        bus.publish(EditorEvent::new(kinds::SESSION_MUTATED));
    }

    #[tokio::test]
    async fn lagging_subscriber_observes_lag() {
        let bus = EventBus::new(2);
        let mut rx = bus.subscribe();
        for _ in 0..4 {
            bus.publish(EditorEvent::new(kinds::SESSION_MUTATED));
        }
        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Lagged(_))
        ));
    }
}
