//! In-process event bus.
//!
//! Listeners are registered per event kind and invoked in registration
//! order. `publish` awaits every listener and only returns once delivery is
//! complete, which doubles as the completion signal for tests. A failing
//! listener is logged and skipped; it never blocks delivery to the
//! listeners after it. There is no queueing and no replay: listeners
//! registered after a publish only see later events.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::processors::DataKind;

/// Severity of a system alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertLevel {
    Info,
    Warning,
    Critical,
}

impl AlertLevel {
    /// Get display label.
    pub fn label(&self) -> &'static str {
        match self {
            AlertLevel::Info => "Info",
            AlertLevel::Warning => "Warning",
            AlertLevel::Critical => "Critical",
        }
    }
}

impl std::fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Tone of a user-facing feedback message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackKind {
    Success,
    Error,
    Info,
}

/// An event on the bus. Fire-and-forget, no persisted identity.
#[derive(Debug, Clone)]
pub enum Event {
    /// An athlete's record changed.
    DataUpdated {
        kind: DataKind,
        athlete_id: Uuid,
        data: Value,
    },
    /// A safety rule fired.
    SystemAlert { level: AlertLevel, message: String },
    /// A user-facing status message.
    UiFeedback { kind: FeedbackKind, message: String },
    /// A scripted demo run finished.
    SimulationComplete { success: bool },
}

impl Event {
    /// The subscription key for this event.
    pub fn kind(&self) -> EventKind {
        match self {
            Event::DataUpdated { .. } => EventKind::DataUpdated,
            Event::SystemAlert { .. } => EventKind::SystemAlert,
            Event::UiFeedback { .. } => EventKind::UiFeedback,
            Event::SimulationComplete { .. } => EventKind::SimulationComplete,
        }
    }
}

/// Subscription key, one per event variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    DataUpdated,
    SystemAlert,
    UiFeedback,
    SimulationComplete,
}

/// Error surfaced by a listener. Logged by the bus, never propagated.
#[derive(Debug, Error)]
#[error("listener failed: {0}")]
pub struct ListenerError(pub String);

/// A bus subscriber.
#[async_trait]
pub trait EventListener: Send + Sync {
    /// Handle one event. Errors are logged by the bus and delivery
    /// continues with the next listener.
    async fn on_event(&self, event: &Event) -> Result<(), ListenerError>;
}

/// Adapter turning a plain closure into a listener.
pub struct FnListener<F>(F);

impl<F> FnListener<F>
where
    F: Fn(&Event) + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

#[async_trait]
impl<F> EventListener for FnListener<F>
where
    F: Fn(&Event) + Send + Sync,
{
    async fn on_event(&self, event: &Event) -> Result<(), ListenerError> {
        (self.0)(event);
        Ok(())
    }
}

/// Handle returned by [`EventBus::subscribe`]; pass back to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

/// The bus. Cheap to share behind an `Arc`.
pub struct EventBus {
    next_id: AtomicU64,
    listeners: RwLock<HashMap<EventKind, Vec<(u64, Arc<dyn EventListener>)>>>,
}

impl EventBus {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            listeners: RwLock::new(HashMap::new()),
        }
    }

    /// Register a listener for one event kind. Listeners fire in
    /// registration order.
    pub fn subscribe(&self, kind: EventKind, listener: Arc<dyn EventListener>) -> SubscriptionId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut listeners = self.listeners.write().expect("listener table poisoned");
        listeners.entry(kind).or_default().push((id, listener));
        SubscriptionId(id)
    }

    /// Remove a subscription. Returns whether it was still registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.write().expect("listener table poisoned");
        for entries in listeners.values_mut() {
            let before = entries.len();
            entries.retain(|(entry_id, _)| *entry_id != id.0);
            if entries.len() < before {
                return true;
            }
        }
        false
    }

    /// Number of listeners currently registered for a kind.
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.listeners
            .read()
            .expect("listener table poisoned")
            .get(&kind)
            .map_or(0, Vec::len)
    }

    /// Deliver an event to the listeners registered at this moment, in
    /// registration order. Returns the number of listeners invoked.
    pub async fn publish(&self, event: Event) -> usize {
        let snapshot: Vec<Arc<dyn EventListener>> = {
            let listeners = self.listeners.read().expect("listener table poisoned");
            listeners
                .get(&event.kind())
                .map(|entries| entries.iter().map(|(_, l)| Arc::clone(l)).collect())
                .unwrap_or_default()
        };

        let mut delivered = 0;
        for listener in snapshot {
            match listener.on_event(&event).await {
                Ok(()) => delivered += 1,
                Err(err) => {
                    delivered += 1;
                    tracing::warn!(event = ?event.kind(), %err, "event listener failed");
                }
            }
        }
        delivered
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn recording_listener(log: Arc<Mutex<Vec<String>>>, tag: &'static str) -> Arc<dyn EventListener> {
        Arc::new(FnListener::new(move |_event: &Event| {
            log.lock().unwrap().push(tag.to_string());
        }))
    }

    fn alert(message: &str) -> Event {
        Event::SystemAlert {
            level: AlertLevel::Warning,
            message: message.to_string(),
        }
    }

    #[tokio::test]
    async fn test_listeners_fire_in_registration_order() {
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        bus.subscribe(EventKind::SystemAlert, recording_listener(log.clone(), "a"));
        bus.subscribe(EventKind::SystemAlert, recording_listener(log.clone(), "b"));
        bus.subscribe(EventKind::SystemAlert, recording_listener(log.clone(), "c"));

        let delivered = bus.publish(alert("check")).await;
        assert_eq!(delivered, 3);
        assert_eq!(*log.lock().unwrap(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_unsubscribe_removes_middle_listener() {
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        bus.subscribe(EventKind::SystemAlert, recording_listener(log.clone(), "a"));
        let b = bus.subscribe(EventKind::SystemAlert, recording_listener(log.clone(), "b"));
        bus.subscribe(EventKind::SystemAlert, recording_listener(log.clone(), "c"));

        bus.publish(alert("first")).await;
        assert!(bus.unsubscribe(b));
        bus.publish(alert("second")).await;

        assert_eq!(*log.lock().unwrap(), vec!["a", "b", "c", "a", "c"]);
        // Double-unsubscribe is a no-op
        assert!(!bus.unsubscribe(b));
    }

    #[tokio::test]
    async fn test_failing_listener_does_not_block_delivery() {
        struct Failing;

        #[async_trait]
        impl EventListener for Failing {
            async fn on_event(&self, _event: &Event) -> Result<(), ListenerError> {
                Err(ListenerError("boom".into()))
            }
        }

        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        bus.subscribe(EventKind::SystemAlert, Arc::new(Failing));
        bus.subscribe(EventKind::SystemAlert, recording_listener(log.clone(), "after"));

        bus.publish(alert("boom")).await;
        assert_eq!(*log.lock().unwrap(), vec!["after"]);
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_ok() {
        let bus = EventBus::new();
        assert_eq!(bus.publish(alert("nobody home")).await, 0);
    }

    #[tokio::test]
    async fn test_kinds_are_isolated() {
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        bus.subscribe(EventKind::UiFeedback, recording_listener(log.clone(), "ui"));
        bus.publish(alert("not for ui")).await;
        assert!(log.lock().unwrap().is_empty());
    }
}
