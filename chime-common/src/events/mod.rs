//! Event types for the chimeboard event system
//!
//! Provides the shared event definitions and the EventBus that UI observers
//! subscribe to. Every state transition in the board emits one of these so a
//! shell can re-render from component state.

mod playback_types;

pub use playback_types::{EndReason, PlaybackState, SlotState};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Board event types
///
/// Events are broadcast via EventBus and can be serialized for a UI shell.
/// Slot identities are stable ids; `index` is the display position at the
/// time the event was emitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BoardEvent {
    /// A reminder slot was appended
    ReminderAdded {
        slot_id: Uuid,
        index: usize,
        /// Timer label for the configured duration
        label: String,
        timestamp: DateTime<Utc>,
    },

    /// A reminder slot was removed
    ReminderRemoved {
        slot_id: Uuid,
        /// Index the slot had before removal
        index: usize,
        timestamp: DateTime<Utc>,
    },

    /// Display indices changed after a removal
    ///
    /// `order[i]` is the slot now shown at index `i`.
    SlotsReindexed {
        order: Vec<Uuid>,
        timestamp: DateTime<Utc>,
    },

    /// Slot configuration edited (duration, category or volume)
    ReminderUpdated {
        slot_id: Uuid,
        index: usize,
        label: String,
        category: String,
        /// Active volume bars (0-10)
        volume_bars: u8,
        timestamp: DateTime<Utc>,
    },

    /// Countdown started (or restarted after a notification)
    TimerStarted {
        slot_id: Uuid,
        index: usize,
        total_seconds: u32,
        timestamp: DateTime<Utc>,
    },

    /// One countdown tick elapsed
    TimerTick {
        slot_id: Uuid,
        index: usize,
        remaining_seconds: u32,
        label: String,
        timestamp: DateTime<Utc>,
    },

    /// Countdown reached zero; a notification request follows
    TimerExpired {
        slot_id: Uuid,
        index: usize,
        category: String,
        timestamp: DateTime<Utc>,
    },

    /// Countdown stopped by the user (or by removal)
    TimerStopped {
        slot_id: Uuid,
        index: usize,
        /// Label reset to the configured duration
        label: String,
        timestamp: DateTime<Utc>,
    },

    /// Play request buffered behind the active session
    PlaybackQueued {
        /// Owning slot (None for test sounds)
        owner: Option<Uuid>,
        category: String,
        /// Pending requests after this one was appended
        queue_depth: usize,
        timestamp: DateTime<Utc>,
    },

    /// A clip became the active session
    PlaybackStarted {
        owner: Option<Uuid>,
        category: String,
        /// "<category display name> - <clip title>"
        title: String,
        /// Vinyl artwork for the category
        vinyl: String,
        timestamp: DateTime<Utc>,
    },

    /// Progress tick for the active session
    PlaybackProgress {
        position_ms: u64,
        duration_ms: u64,
        /// Progress bar width (0.0-100.0)
        percent: f64,
        timestamp: DateTime<Utc>,
    },

    /// Player toggled between playing and paused
    PlaybackStateChanged {
        old_state: PlaybackState,
        new_state: PlaybackState,
        timestamp: DateTime<Utc>,
    },

    /// Active session ended
    PlaybackEnded {
        owner: Option<Uuid>,
        category: String,
        reason: EndReason,
        timestamp: DateTime<Utc>,
    },

    /// Player view returned to idle defaults after the grace delay
    PlayerReset { timestamp: DateTime<Utc> },

    /// Operation refused; shown to the user as a blocking warning
    Warning {
        slot_id: Option<Uuid>,
        message: String,
        timestamp: DateTime<Utc>,
    },
}

impl BoardEvent {
    /// High-frequency events that shells usually render without logging
    pub fn is_high_frequency(&self) -> bool {
        matches!(
            self,
            BoardEvent::PlaybackProgress { .. } | BoardEvent::TimerTick { .. }
        )
    }

    /// Event type name as serialized in the `type` tag
    pub fn event_type(&self) -> &'static str {
        match self {
            BoardEvent::ReminderAdded { .. } => "ReminderAdded",
            BoardEvent::ReminderRemoved { .. } => "ReminderRemoved",
            BoardEvent::SlotsReindexed { .. } => "SlotsReindexed",
            BoardEvent::ReminderUpdated { .. } => "ReminderUpdated",
            BoardEvent::TimerStarted { .. } => "TimerStarted",
            BoardEvent::TimerTick { .. } => "TimerTick",
            BoardEvent::TimerExpired { .. } => "TimerExpired",
            BoardEvent::TimerStopped { .. } => "TimerStopped",
            BoardEvent::PlaybackQueued { .. } => "PlaybackQueued",
            BoardEvent::PlaybackStarted { .. } => "PlaybackStarted",
            BoardEvent::PlaybackProgress { .. } => "PlaybackProgress",
            BoardEvent::PlaybackStateChanged { .. } => "PlaybackStateChanged",
            BoardEvent::PlaybackEnded { .. } => "PlaybackEnded",
            BoardEvent::PlayerReset { .. } => "PlayerReset",
            BoardEvent::Warning { .. } => "Warning",
        }
    }

    /// Serialize as a single JSON line
    pub fn to_json_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Central event distribution bus
///
/// Wraps a tokio broadcast channel. Emitting never blocks; slow subscribers
/// lose the oldest events once `capacity` is exceeded.
pub struct EventBus {
    tx: broadcast::Sender<BoardEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// # Examples
    ///
    /// ```
    /// use chime_common::events::EventBus;
    ///
    /// let event_bus = EventBus::new(256);
    /// assert_eq!(event_bus.capacity(), 256);
    /// ```
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<BoardEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists.
    /// Returns `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: BoardEvent,
    ) -> Result<usize, broadcast::error::SendError<BoardEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: BoardEvent) {
        let _ = self.tx.send(event);
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eventbus_subscribe() {
        let bus = EventBus::new(100);
        assert_eq!(bus.subscriber_count(), 0);

        let _rx = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 1);

        let _rx2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);
    }

    #[tokio::test]
    async fn test_eventbus_emit_no_subscribers() {
        let bus = EventBus::new(100);
        let event = BoardEvent::PlayerReset {
            timestamp: Utc::now(),
        };

        // Should return error when no subscribers
        assert!(bus.emit(event.clone()).is_err());

        // Lossy emit must not panic
        bus.emit_lossy(event);
    }

    #[tokio::test]
    async fn test_eventbus_emit_with_subscriber() {
        let bus = EventBus::new(100);
        let mut rx = bus.subscribe();

        let event = BoardEvent::PlaybackStateChanged {
            old_state: PlaybackState::Playing,
            new_state: PlaybackState::Paused,
            timestamp: Utc::now(),
        };
        assert_eq!(bus.emit(event).unwrap(), 1);

        match rx.recv().await.unwrap() {
            BoardEvent::PlaybackStateChanged {
                old_state,
                new_state,
                ..
            } => {
                assert_eq!(old_state, PlaybackState::Playing);
                assert_eq!(new_state, PlaybackState::Paused);
            }
            other => panic!("Wrong event type received: {:?}", other),
        }
    }

    #[test]
    fn test_event_serializes_with_type_tag() {
        let slot_id = Uuid::new_v4();
        let event = BoardEvent::TimerTick {
            slot_id,
            index: 2,
            remaining_seconds: 59,
            label: "00:59".to_string(),
            timestamp: Utc::now(),
        };

        let json: serde_json::Value =
            serde_json::from_str(&event.to_json_line().unwrap()).unwrap();
        assert_eq!(json["type"], "TimerTick");
        assert_eq!(json["label"], "00:59");
        assert_eq!(json["slot_id"], slot_id.to_string());
        assert_eq!(json["type"], event.event_type());
        assert!(event.is_high_frequency());
    }

    #[test]
    fn test_end_reason_serialization() {
        let event = BoardEvent::PlaybackEnded {
            owner: None,
            category: "piam".to_string(),
            reason: EndReason::Cancelled,
            timestamp: Utc::now(),
        };
        let json: serde_json::Value =
            serde_json::from_str(&event.to_json_line().unwrap()).unwrap();
        assert_eq!(json["reason"], "cancelled");
        assert!(json["owner"].is_null());
        assert!(!event.is_high_frequency());
    }

    #[test]
    fn test_state_display() {
        assert_eq!(PlaybackState::default(), PlaybackState::Stopped);
        assert_eq!(SlotState::Running.to_string(), "running");
        assert_eq!(EndReason::Failed.to_string(), "failed");
    }
}
