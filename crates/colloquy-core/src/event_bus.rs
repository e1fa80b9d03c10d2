//! Broadcasting exchange updates to any number of renderers.
//!
//! The [`EventBus`] is an [`ExchangeObserver`]: hand it to
//! [`submit_message`](crate::session::ConversationSessionManager::submit_message)
//! and every subscriber receives the user turn, text fragments, status changes
//! and the final outcome as JSON payloads.
//!
//! # Example
//!
//! ```rust
//! use colloquy_core::event_bus::EventBus;
//!
//! let bus = EventBus::new();
//! let mut rx = bus.subscribe();
//!
//! bus.emit("exchange:text:abc123", &serde_json::json!({"fragment": "Hello"}));
//!
//! // In async context:
//! // let event = rx.recv().await.unwrap();
//! # let _ = rx.try_recv();
//! ```

use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::broadcast;

use crate::session::{ExchangeObserver, ExchangeOutcome};
use crate::stream::ToolStatus;
use crate::thread::{DisplayTurn, ThreadId};

/// Events beyond this many unread cause slow subscribers to lag.
const DEFAULT_CAPACITY: usize = 1024;

/// A broadcast event: a type string and a JSON payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcastEvent {
    /// e.g. `exchange:text:{thread_id}`.
    pub event_type: String,
    pub payload: serde_json::Value,
}

impl BroadcastEvent {
    pub fn new(event_type: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            event_type: event_type.into(),
            payload,
        }
    }
}

/// Publish-subscribe over a tokio broadcast channel.
pub struct EventBus {
    sender: broadcast::Sender<BroadcastEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Emit an event to all subscribers.
    ///
    /// Returns how many subscribers got it; with none, the event is dropped.
    pub fn emit<T: Serialize>(&self, event_type: &str, payload: &T) -> usize {
        let json_payload = match serde_json::to_value(payload) {
            Ok(v) => v,
            Err(e) => {
                log::warn!("Failed to serialize event payload: {}", e);
                return 0;
            }
        };

        self.sender
            .send(BroadcastEvent::new(event_type, json_payload))
            .unwrap_or(0)
    }

    /// Subscribe to future events. Past events are not replayed.
    pub fn subscribe(&self) -> broadcast::Receiver<BroadcastEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    fn publish_user_turn(&self, thread_id: &ThreadId, turn: &DisplayTurn) {
        self.emit(&format!("exchange:user:{thread_id}"), turn);
    }

    fn publish_text(&self, thread_id: &ThreadId, fragment: &str) {
        self.emit(
            &format!("exchange:text:{thread_id}"),
            &json!({ "fragment": fragment }),
        );
    }

    fn publish_status(&self, thread_id: &ThreadId, status: &ToolStatus) {
        self.emit(
            &format!("exchange:status:{thread_id}"),
            &json!({ "status": status, "label": status.label() }),
        );
    }

    fn publish_finished(&self, outcome: &ExchangeOutcome) {
        self.emit(
            &format!("exchange:finished:{}", outcome.thread_id),
            outcome,
        );
    }
}

impl ExchangeObserver for EventBus {
    fn on_user_turn(&mut self, thread_id: &ThreadId, turn: &DisplayTurn) {
        self.publish_user_turn(thread_id, turn);
    }

    fn on_text(&mut self, thread_id: &ThreadId, fragment: &str) {
        self.publish_text(thread_id, fragment);
    }

    fn on_status(&mut self, thread_id: &ThreadId, status: &ToolStatus) {
        self.publish_status(thread_id, status);
    }

    fn on_finished(&mut self, outcome: &ExchangeOutcome) {
        self.publish_finished(outcome);
    }
}

// A shared bus (e.g. behind an `Arc`) observes through a plain reference.
impl ExchangeObserver for &EventBus {
    fn on_user_turn(&mut self, thread_id: &ThreadId, turn: &DisplayTurn) {
        self.publish_user_turn(thread_id, turn);
    }

    fn on_text(&mut self, thread_id: &ThreadId, fragment: &str) {
        self.publish_text(thread_id, fragment);
    }

    fn on_status(&mut self, thread_id: &ThreadId, status: &ToolStatus) {
        self.publish_status(thread_id, status);
    }

    fn on_finished(&mut self, outcome: &ExchangeOutcome) {
        self.publish_finished(outcome);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod broadcast_event {
        use super::*;

        #[test]
        fn serializes_type_and_payload() {
            let event = BroadcastEvent::new("exchange:text:t1", json!({"fragment": "Hi"}));
            let value = serde_json::to_value(&event).unwrap();

            assert_eq!(value["event_type"], "exchange:text:t1");
            assert_eq!(value["payload"]["fragment"], "Hi");
        }
    }

    mod event_bus {
        use super::*;

        #[test]
        fn subscriber_count_tracks_receivers() {
            let bus = EventBus::new();
            let rx1 = bus.subscribe();
            let _rx2 = bus.subscribe();
            assert_eq!(bus.subscriber_count(), 2);

            drop(rx1);
            assert_eq!(bus.subscriber_count(), 1);
        }

        #[test]
        fn emit_without_subscribers_is_dropped() {
            let bus = EventBus::default();
            assert_eq!(bus.emit("exchange:text:t1", &json!({})), 0);
        }

        #[tokio::test]
        async fn every_subscriber_receives_event() {
            let bus = EventBus::new();
            let mut rx1 = bus.subscribe();
            let mut rx2 = bus.subscribe();

            assert_eq!(bus.emit("exchange:text:t1", &json!({"fragment": "Hi"})), 2);

            let e1 = rx1.recv().await.unwrap();
            let e2 = rx2.recv().await.unwrap();
            assert_eq!(e1.event_type, "exchange:text:t1");
            assert_eq!(e1.payload, e2.payload);
        }

        #[tokio::test]
        async fn late_subscriber_misses_old_events() {
            let bus = EventBus::new();
            let mut early = bus.subscribe();
            bus.emit("first", &json!({}));

            let mut late = bus.subscribe();
            bus.emit("second", &json!({}));

            assert_eq!(early.recv().await.unwrap().event_type, "first");
            assert_eq!(early.recv().await.unwrap().event_type, "second");
            assert_eq!(late.recv().await.unwrap().event_type, "second");
        }
    }

    mod observer {
        use super::*;
        use crate::agents::{Agent, AgentError, AgentEvent, EventStream};
        use crate::session::ConversationSessionManager;
        use crate::store::MemoryThreadStore;

        struct CannedAgent;

        impl Agent for CannedAgent {
            fn run(&self, _: &ThreadId, _: &str) -> Result<EventStream, AgentError> {
                let events = vec![
                    Ok(AgentEvent::tool("search")),
                    Ok(AgentEvent::text("Hello!")),
                ];
                Ok(Box::new(events.into_iter()))
            }
        }

        #[test]
        fn exchange_is_broadcast_in_order() {
            let mut bus = EventBus::new();
            let mut rx = bus.subscribe();
            let mut manager = ConversationSessionManager::new(MemoryThreadStore::new(), CannedAgent);
            let thread = manager.active_thread_id().clone();

            manager.submit_message("hi", &mut bus).unwrap();

            let mut types = Vec::new();
            let mut payloads = Vec::new();
            while let Ok(event) = rx.try_recv() {
                types.push(event.event_type);
                payloads.push(event.payload);
            }

            assert_eq!(
                types,
                vec![
                    format!("exchange:user:{thread}"),
                    format!("exchange:status:{thread}"),
                    format!("exchange:text:{thread}"),
                    format!("exchange:status:{thread}"),
                    format!("exchange:finished:{thread}"),
                ]
            );
            assert_eq!(payloads[0]["content"], "hi");
            assert_eq!(payloads[1]["label"], "Using `search` …");
            assert_eq!(payloads[2]["fragment"], "Hello!");
            assert_eq!(payloads[3]["status"]["state"], "finished");
            assert_eq!(payloads[4]["reply"]["content"], "Hello!");
        }

        #[test]
        fn shared_reference_observes() {
            let bus = EventBus::new();
            let mut rx = bus.subscribe();
            let mut manager = ConversationSessionManager::new(MemoryThreadStore::new(), CannedAgent);

            let mut observer = &bus;
            manager.submit_message("hi", &mut observer).unwrap();

            assert!(rx.try_recv().is_ok());
        }
    }
}
