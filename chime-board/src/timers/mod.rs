//! Reminder countdowns

mod engine;

pub use engine::{TimerEngine, TimerEvent, TimerHandle, TICK_INTERVAL};
