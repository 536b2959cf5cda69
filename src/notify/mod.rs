//! Outbound notification seam.
//!
//! Notifications are fire-and-forget: failures are logged and never
//! propagated to the caller. The channel-backed implementation hands
//! deliveries to whatever drains the receiver (a push gateway, a demo
//! console, a test).

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use crossbeam::channel::{unbounded, Receiver, Sender};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Kind of outbound notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// A risk alert fired for the athlete
    RiskAlert,
    /// A regenerated weekly plan is ready
    PlanReady,
}

impl NotificationKind {
    /// Get display label.
    pub fn label(&self) -> &'static str {
        match self {
            NotificationKind::RiskAlert => "Risk Alert",
            NotificationKind::PlanReady => "Plan Ready",
        }
    }
}

/// One outbound notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// Target user
    pub user_id: Uuid,
    /// Notification kind
    pub kind: NotificationKind,
    /// Kind-specific payload
    pub payload: Value,
    /// When the notification was raised
    pub sent_at: DateTime<Utc>,
}

/// Fire-and-forget notification sink.
pub trait Notifier: Send + Sync {
    /// Raise a notification. Must not fail the caller.
    fn notify(&self, user_id: Uuid, kind: NotificationKind, payload: Value);
}

/// Notifier that hands deliveries to a channel consumer.
pub struct ChannelNotifier {
    tx: Sender<Notification>,
}

impl ChannelNotifier {
    /// Create a notifier and the receiving end to drain.
    pub fn new() -> (Self, Receiver<Notification>) {
        let (tx, rx) = unbounded();
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, user_id: Uuid, kind: NotificationKind, payload: Value) {
        let notification = Notification {
            user_id,
            kind,
            payload,
            sent_at: Utc::now(),
        };
        if let Err(err) = self.tx.send(notification) {
            tracing::warn!(%user_id, kind = kind.label(), %err, "notification dropped");
        }
    }
}

/// Notifier that only logs. Useful when no delivery channel is wired.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, user_id: Uuid, kind: NotificationKind, payload: Value) {
        tracing::info!(%user_id, kind = kind.label(), %payload, "notification");
    }
}

/// Notifier that records everything it is asked to send. For tests.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything sent so far.
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().expect("notification log poisoned").clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, user_id: Uuid, kind: NotificationKind, payload: Value) {
        self.sent
            .lock()
            .expect("notification log poisoned")
            .push(Notification {
                user_id,
                kind,
                payload,
                sent_at: Utc::now(),
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_channel_notifier_delivers() {
        let (notifier, rx) = ChannelNotifier::new();
        let user = Uuid::new_v4();

        notifier.notify(user, NotificationKind::RiskAlert, json!({"pain": 6}));

        let delivered = rx.try_recv().unwrap();
        assert_eq!(delivered.user_id, user);
        assert_eq!(delivered.kind, NotificationKind::RiskAlert);
        assert_eq!(delivered.payload["pain"], 6);
    }

    #[test]
    fn test_dropped_receiver_does_not_panic() {
        let (notifier, rx) = ChannelNotifier::new();
        drop(rx);
        // Must not panic or propagate
        notifier.notify(Uuid::new_v4(), NotificationKind::PlanReady, json!({}));
    }

    #[test]
    fn test_recording_notifier_accumulates() {
        let notifier = RecordingNotifier::new();
        notifier.notify(Uuid::new_v4(), NotificationKind::RiskAlert, json!({}));
        notifier.notify(Uuid::new_v4(), NotificationKind::PlanReady, json!({}));
        assert_eq!(notifier.sent().len(), 2);
    }
}
