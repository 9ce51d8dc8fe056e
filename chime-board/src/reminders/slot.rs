//! Reminder slot model

use chime_common::events::SlotState;
use chime_common::human_time::{format_clock, minutes_to_seconds};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Volume bar count shown per reminder
pub const VOLUME_BARS: u8 = 10;

/// Stable reminder identity; never reused after removal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotId(Uuid);

impl SlotId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for SlotId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// User-editable reminder configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotConfig {
    /// Countdown length in decimal minutes
    pub duration_minutes: f64,
    /// Sound library category key
    pub category: String,
    /// Notification volume (0.0-1.0)
    pub volume: f32,
}

impl SlotConfig {
    /// Whole countdown seconds (at least one)
    pub fn total_seconds(&self) -> u32 {
        minutes_to_seconds(self.duration_minutes)
    }

    /// Timer label for the configured duration
    pub fn duration_label(&self) -> String {
        format_clock(self.total_seconds() as u64)
    }

    /// Active volume bars (0-10)
    pub fn volume_bars(&self) -> u8 {
        (self.volume.clamp(0.0, 1.0) * VOLUME_BARS as f32).round() as u8
    }
}

impl Default for SlotConfig {
    fn default() -> Self {
        Self {
            duration_minutes: 20.0,
            category: "piam".to_string(),
            volume: 0.7,
        }
    }
}

/// Volume for a bar level (clamped to 0-10)
pub fn level_to_volume(level: u8) -> f32 {
    level.min(VOLUME_BARS) as f32 / VOLUME_BARS as f32
}

/// Bar level for a slider percentage; partial bars round up
pub fn percent_to_level(percent: u8) -> u8 {
    percent.min(100).div_ceil(10)
}

/// One configured reminder
#[derive(Debug, Clone)]
pub struct ReminderSlot {
    pub id: SlotId,
    pub config: SlotConfig,
    pub state: SlotState,
    /// Timer label (configured duration, remaining time, or 00:00)
    pub label: String,
}

impl ReminderSlot {
    pub fn new(config: SlotConfig) -> Self {
        let label = config.duration_label();
        Self {
            id: SlotId::new(),
            config,
            state: SlotState::Idle,
            label,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state == SlotState::Running
    }

    /// Put the label back to the configured duration
    pub fn reset_label(&mut self) {
        self.label = self.config.duration_label();
    }
}

/// Render-ready snapshot of a slot for a UI shell
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotView {
    pub index: usize,
    pub id: SlotId,
    pub label: String,
    pub category: String,
    pub category_label: String,
    pub volume_bars: u8,
    pub duration_minutes: f64,
    /// Duration editor fields `(minutes, seconds)`
    pub editor: (u32, u32),
    pub state: SlotState,
    pub start_visible: bool,
    pub stop_visible: bool,
}
