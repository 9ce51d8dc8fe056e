//! Reminder collection
//!
//! Arena of slots addressed by stable [`SlotId`]s. The display index is
//! derived from insertion order, so after any removal the indices are
//! again a dense `0..N-1` sequence without touching anything keyed by id.

use super::slot::{ReminderSlot, SlotConfig, SlotId};
use crate::error::{Error, Result};
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct ReminderCollection {
    slots: HashMap<SlotId, ReminderSlot>,
    order: Vec<SlotId>,
}

impl ReminderCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new Idle slot; returns its id and display index
    pub fn add(&mut self, config: SlotConfig) -> (SlotId, usize) {
        let slot = ReminderSlot::new(config);
        let id = slot.id;
        self.slots.insert(id, slot);
        self.order.push(id);
        (id, self.order.len() - 1)
    }

    /// Remove the slot at `index`; later slots shift down by one
    pub fn remove(&mut self, index: usize) -> Result<ReminderSlot> {
        let id = self.id_at(index)?;
        self.order.remove(index);
        self.slots
            .remove(&id)
            .ok_or_else(|| Error::InvalidIndex {
                index,
                len: self.order.len(),
            })
    }

    /// Id of the slot at `index`
    pub fn id_at(&self, index: usize) -> Result<SlotId> {
        self.order.get(index).copied().ok_or(Error::InvalidIndex {
            index,
            len: self.order.len(),
        })
    }

    /// Current display index of a slot
    pub fn index_of(&self, id: SlotId) -> Option<usize> {
        self.order.iter().position(|s| *s == id)
    }

    pub fn get(&self, id: SlotId) -> Option<&ReminderSlot> {
        self.slots.get(&id)
    }

    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut ReminderSlot> {
        self.slots.get_mut(&id)
    }

    /// Slot at a display index
    pub fn at(&self, index: usize) -> Result<&ReminderSlot> {
        let id = self.id_at(index)?;
        self.slots.get(&id).ok_or(Error::InvalidIndex {
            index,
            len: self.order.len(),
        })
    }

    pub fn contains(&self, id: SlotId) -> bool {
        self.slots.contains_key(&id)
    }

    /// Slots in display order with their dense indices
    pub fn iter(&self) -> impl Iterator<Item = (usize, &ReminderSlot)> {
        self.order
            .iter()
            .enumerate()
            .filter_map(|(index, id)| self.slots.get(id).map(|slot| (index, slot)))
    }

    /// Ids in display order
    pub fn ids(&self) -> &[SlotId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
