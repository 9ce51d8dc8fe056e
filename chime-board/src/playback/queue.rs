//! Playback queue
//!
//! Serializes access to the single audio output. At most one request is
//! active (handed to the player); everything else waits in FIFO order.
//! The queue never talks to the device itself: every operation that frees
//! the output hands the next request back to the caller to start.

use super::request::{Completion, PlaybackRequest};
use crate::reminders::SlotId;
use std::collections::VecDeque;
use tracing::debug;

/// Result of a session ending on its own
#[derive(Debug, Default, PartialEq)]
pub struct SessionOutcome {
    /// Completion of the request that just ended
    pub completion: Option<Completion>,

    /// Request promoted to active, to be started now
    pub next: Option<PlaybackRequest>,
}

/// Result of cancelling a slot's requests
#[derive(Debug, Default, PartialEq)]
pub struct CancelOutcome {
    /// Pending requests dropped
    pub purged: usize,

    /// Whether the active request belonged to the slot and was released
    pub stopped_active: bool,
}

/// Active request plus pending FIFO
#[derive(Debug, Default)]
pub struct PlaybackQueue {
    /// Request currently holding the audio output
    active: Option<PlaybackRequest>,

    /// Waiting requests, oldest first
    pending: VecDeque<PlaybackRequest>,
}

impl PlaybackQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a request.
    ///
    /// When nothing is active the request becomes active and is returned
    /// for immediate start. Otherwise it is appended to the pending list
    /// (no coalescing) and `None` is returned.
    pub fn enqueue(&mut self, request: PlaybackRequest) -> Option<PlaybackRequest> {
        if self.active.is_none() {
            debug!("{} goes straight to the player", request.id);
            self.active = Some(request.clone());
            return Some(request);
        }

        debug!(
            "{} queued behind {} pending",
            request.id,
            self.pending.len()
        );
        self.pending.push_back(request);
        None
    }

    /// The active session ended naturally or with an error.
    ///
    /// Releases the active request, returns its completion, and promotes
    /// the next pending request.
    pub fn session_ended(&mut self) -> SessionOutcome {
        let completion = self.active.take().and_then(|r| r.on_completion);
        SessionOutcome {
            completion,
            next: self.advance(),
        }
    }

    /// Drop every request owned by `slot`.
    ///
    /// Pending requests are removed without their completions. If the active
    /// request belongs to the slot it is released (the caller stops the
    /// player and calls [`advance`](Self::advance)). Unowned test-sound
    /// requests are never touched.
    pub fn cancel(&mut self, slot: SlotId) -> CancelOutcome {
        let before = self.pending.len();
        self.pending.retain(|r| !r.is_owned_by(slot));
        let purged = before - self.pending.len();

        let stopped_active = self
            .active
            .as_ref()
            .is_some_and(|r| r.is_owned_by(slot));
        if stopped_active {
            self.active = None;
        }

        if purged > 0 || stopped_active {
            debug!(
                "Cancelled slot {}: {} pending purged, active released: {}",
                slot, purged, stopped_active
            );
        }
        CancelOutcome {
            purged,
            stopped_active,
        }
    }

    /// Promote the oldest pending request when nothing is active
    pub fn advance(&mut self) -> Option<PlaybackRequest> {
        if self.active.is_some() {
            return None;
        }
        let next = self.pending.pop_front()?;
        self.active = Some(next.clone());
        Some(next)
    }

    /// Request currently holding the output
    pub fn active(&self) -> Option<&PlaybackRequest> {
        self.active.as_ref()
    }

    /// Waiting requests, oldest first
    pub fn pending(&self) -> impl Iterator<Item = &PlaybackRequest> {
        self.pending.iter()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Active plus pending
    pub fn len(&self) -> usize {
        self.pending.len() + usize::from(self.active.is_some())
    }

    pub fn is_idle(&self) -> bool {
        self.active.is_none() && self.pending.is_empty()
    }
}
