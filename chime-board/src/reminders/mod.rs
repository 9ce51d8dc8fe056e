//! Reminder slots and their collection

mod collection;
mod slot;

pub use collection::ReminderCollection;
pub use slot::{
    level_to_volume, percent_to_level, ReminderSlot, SlotConfig, SlotId, SlotView, VOLUME_BARS,
};
