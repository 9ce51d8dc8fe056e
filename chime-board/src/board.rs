//! Reminder board
//!
//! The explicit context that owns every component: reminder slots, their
//! countdowns, the playback queue and the mini player. Nothing is shared or
//! locked; the owner drives the board from a single thread by advancing its
//! virtual clock and calling command methods.
//!
//! Message flow:
//! - a countdown expiry becomes a [`PlaybackRequest`] carrying
//!   [`Completion::RestartTimer`]
//! - the queue hands requests to the player one at a time
//! - when the player reports the end of a session the completion is routed
//!   back to the timer engine and the next request starts
//!
//! Slots, countdowns and requests are keyed by [`SlotId`], so removing a
//! reminder reindexes the display without touching anyone else's timer or
//! queued notification.

use crate::audio::AudioDevice;
use crate::commands::BoardCommand;
use crate::error::{Error, Result};
use crate::library::SoundLibrary;
use crate::playback::{
    AudioPlayerController, Completion, PlaybackQueue, PlaybackRequest, PlayerSettings,
    PlayerSignal, PlayerView, RequestId, Toggle,
};
use crate::reminders::{
    level_to_volume, percent_to_level, ReminderCollection, SlotConfig, SlotId, SlotView,
    VOLUME_BARS,
};
use crate::timers::{TimerEngine, TimerEvent};
use chime_common::events::{BoardEvent, EndReason, EventBus, PlaybackState, SlotState};
use chime_common::human_time::{editor_minutes, format_clock, split_minutes};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Warning shown when an edit targets a running reminder
const EDIT_WHILE_RUNNING: &str = "Stop the timer before changing this reminder";

/// Board-wide settings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoardSettings {
    /// Configuration given to newly added reminders
    pub defaults: SlotConfig,

    /// Mini player timing and idle artwork
    pub player: PlayerSettings,
}

/// The reminder board
pub struct Board<D: AudioDevice> {
    defaults: SlotConfig,
    library: SoundLibrary,
    reminders: ReminderCollection,
    timers: TimerEngine,
    queue: PlaybackQueue,
    player: AudioPlayerController<D>,
    events: EventBus,
    rng: StdRng,
    now: Duration,
    next_request: u64,
}

impl<D: AudioDevice> Board<D> {
    /// Build a board and preload every clip in the library.
    ///
    /// Clips that fail to preload are logged; their categories will report
    /// `ResourceUnavailable` when played.
    pub fn new(settings: BoardSettings, library: SoundLibrary, mut device: D) -> Self {
        let mut preloaded = 0;
        for clip in library.all_clips() {
            match device.preload(clip) {
                Ok(()) => preloaded += 1,
                Err(e) => warn!("Could not preload {}: {}", clip, e),
            }
        }
        info!(
            "Preloaded {} clips across {} categories",
            preloaded,
            library.len()
        );

        Self {
            defaults: settings.defaults,
            library,
            reminders: ReminderCollection::new(),
            timers: TimerEngine::new(),
            queue: PlaybackQueue::new(),
            player: AudioPlayerController::new(device, settings.player),
            events: EventBus::default(),
            rng: StdRng::from_entropy(),
            now: Duration::ZERO,
            next_request: 1,
        }
    }

    /// Use a fixed seed for clip selection
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    // ========================================
    // Reminder slots
    // ========================================

    /// Append a reminder with the default configuration
    pub fn add_reminder(&mut self) -> (SlotId, usize) {
        self.add_reminder_with(self.defaults.clone())
    }

    /// Append a reminder with `config`
    pub fn add_reminder_with(&mut self, config: SlotConfig) -> (SlotId, usize) {
        let (id, index) = self.reminders.add(config);
        let label = self
            .reminders
            .get(id)
            .map(|s| s.label.clone())
            .unwrap_or_default();
        info!("Added reminder {} at index {}", id, index);
        self.emit(BoardEvent::ReminderAdded {
            slot_id: id.as_uuid(),
            index,
            label,
            timestamp: Utc::now(),
        });
        (id, index)
    }

    /// Stop and remove the reminder at `index`; later reminders shift down
    pub fn remove_reminder(&mut self, index: usize) -> Result<SlotId> {
        let id = self.slot_id(index)?;
        self.stop_slot(id);
        let removed = self.reminders.remove(index)?;
        info!("Removed reminder {} (was index {})", removed.id, index);

        self.emit(BoardEvent::ReminderRemoved {
            slot_id: id.as_uuid(),
            index,
            timestamp: Utc::now(),
        });
        if index < self.reminders.len() {
            self.emit(BoardEvent::SlotsReindexed {
                order: self.reminders.ids().iter().map(|s| s.as_uuid()).collect(),
                timestamp: Utc::now(),
            });
        }
        Ok(id)
    }

    /// Start the countdown at `index`; a running countdown is fully stopped first
    pub fn start(&mut self, index: usize) -> Result<()> {
        let id = self.slot_id(index)?;
        if self.reminders.get(id).is_some_and(|s| s.is_running()) {
            self.stop_slot(id);
        }
        self.begin_countdown(id);
        Ok(())
    }

    /// Stop the countdown at `index` and cancel its notifications
    pub fn stop(&mut self, index: usize) -> Result<()> {
        let id = self.slot_id(index)?;
        self.stop_slot(id);
        Ok(())
    }

    /// Queue a one-off play of the reminder's category at its volume.
    ///
    /// Test plays belong to no reminder: stopping or removing the reminder
    /// does not cancel them, and they restart nothing when they end.
    pub fn test_sound(&mut self, index: usize) -> Result<()> {
        let id = self.slot_id(index)?;
        let (category, volume) = match self.reminders.get(id) {
            Some(slot) => (slot.config.category.clone(), slot.config.volume),
            None => return Err(self.invalid_index(index)),
        };
        let request = PlaybackRequest::test_sound(self.next_request_id(), index, &category, volume);
        self.submit(request)
    }

    // ========================================
    // Configuration edits (Idle only)
    // ========================================

    /// Set the duration from editor fields; each is clamped to 0-59 and
    /// `0:00` becomes `0:01`
    pub fn set_duration(&mut self, index: usize, minutes: u32, seconds: u32) -> Result<()> {
        self.set_duration_minutes(index, editor_minutes(minutes, seconds))
    }

    /// Set the duration in decimal minutes
    pub fn set_duration_minutes(&mut self, index: usize, minutes: f64) -> Result<()> {
        if !minutes.is_finite() || minutes <= 0.0 {
            warn!("Rejected duration {} for reminder {}", minutes, index);
            return Err(Error::InvalidInput(format!(
                "duration must be a positive number of minutes, got {}",
                minutes
            )));
        }
        let id = self.editable(index)?;
        if let Some(slot) = self.reminders.get_mut(id) {
            slot.config.duration_minutes = minutes;
            slot.reset_label();
        }
        debug!("Reminder {} duration set to {} min", index, minutes);
        self.emit_updated(id, index);
        Ok(())
    }

    /// Configured duration in decimal minutes
    pub fn duration_minutes(&self, index: usize) -> Result<f64> {
        Ok(self.slot_at(index)?.config.duration_minutes)
    }

    /// Bind the reminder to another sound category
    pub fn set_category(&mut self, index: usize, key: &str) -> Result<()> {
        let id = self.editable(index)?;
        if !self.library.contains(key) {
            warn!("Unknown category '{}' for reminder {}", key, index);
            return Err(Error::UnknownCategory(key.to_string()));
        }
        if let Some(slot) = self.reminders.get_mut(id) {
            slot.config.category = key.to_string();
        }
        debug!("Reminder {} category set to {}", index, key);
        self.emit_updated(id, index);
        Ok(())
    }

    /// Set the notification volume from a bar level (0-10)
    pub fn set_volume_level(&mut self, index: usize, level: u8) -> Result<()> {
        if level > VOLUME_BARS {
            warn!("Rejected volume level {} for reminder {}", level, index);
            return Err(Error::InvalidInput(format!(
                "volume level must be 0-{}, got {}",
                VOLUME_BARS, level
            )));
        }
        let id = self.editable(index)?;
        if let Some(slot) = self.reminders.get_mut(id) {
            slot.config.volume = level_to_volume(level);
        }
        debug!("Reminder {} volume set to level {}", index, level);
        self.emit_updated(id, index);
        Ok(())
    }

    /// Set the notification volume from a slider percentage
    pub fn set_volume_percent(&mut self, index: usize, percent: u8) -> Result<()> {
        self.set_volume_level(index, percent_to_level(percent))
    }

    // ========================================
    // Mini player
    // ========================================

    /// Pause or resume the active clip; `None` when nothing is loaded.
    ///
    /// A clip the device refuses to resume ends like any failed playback:
    /// its completion fires and the next queued request starts.
    pub fn toggle_play_pause(&mut self) -> Result<Option<PlaybackState>> {
        let old_state = self.player.state();
        match self.player.toggle_play_pause(self.now) {
            None => Ok(None),
            Some(Toggle::Switched(new_state)) => {
                self.emit(BoardEvent::PlaybackStateChanged {
                    old_state,
                    new_state,
                    timestamp: Utc::now(),
                });
                Ok(Some(new_state))
            }
            Some(Toggle::Failed(signal)) => {
                let reason = match &signal {
                    PlayerSignal::Failed { reason, .. } => reason.clone(),
                    PlayerSignal::Ended(_) => "clip already ended".to_string(),
                };
                warn!("Could not resume playback: {}", reason);
                self.end_session(signal);
                Err(Error::PlaybackStart(reason))
            }
        }
    }

    /// Seek the active clip to `fraction` of its length
    pub fn seek(&mut self, fraction: f64) -> bool {
        let moved = self.player.seek(fraction, self.now);
        if moved {
            self.emit_progress();
        }
        moved
    }

    /// Change the active clip's volume from a bar level (0-10); reminder
    /// settings are untouched. Returns whether a clip was playing.
    pub fn set_player_volume(&mut self, level: u8) -> Result<bool> {
        if level > VOLUME_BARS {
            warn!("Rejected player volume level {}", level);
            return Err(Error::InvalidInput(format!(
                "volume level must be 0-{}, got {}",
                VOLUME_BARS, level
            )));
        }
        Ok(self.player.set_volume(level))
    }

    // ========================================
    // Clock
    // ========================================

    /// Current board time
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Move the clock forward by `delta`
    pub fn advance(&mut self, delta: Duration) {
        self.advance_to(self.now + delta);
    }

    /// Move the clock to `now`, processing everything that falls due on the
    /// way in due-time order: progress ticks, countdown ticks, idle resets.
    pub fn advance_to(&mut self, now: Duration) {
        if now < self.now {
            debug!("Ignoring clock moving backwards ({:?} < {:?})", now, self.now);
            return;
        }

        while let Some(at) = self.next_due().filter(|at| *at <= now) {
            self.now = self.now.max(at);
            let at = self.now;

            if self.player.next_progress_due().is_some_and(|d| d <= at) {
                self.poll_player();
            }
            if self.timers.next_due().is_some_and(|d| d <= at) {
                for event in self.timers.fire_due(at) {
                    self.handle_timer_event(event);
                }
            }
            if self.player.reset_due().is_some_and(|d| d <= at) && self.player.reset_if_due(at) {
                self.emit(BoardEvent::PlayerReset {
                    timestamp: Utc::now(),
                });
            }
        }

        self.now = now;
        self.player.device_mut().advance_clock(now);
    }

    /// Earliest pending piece of work
    pub fn next_due(&self) -> Option<Duration> {
        [
            self.timers.next_due(),
            self.player.next_progress_due(),
            self.player.reset_due(),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    // ========================================
    // Commands and views
    // ========================================

    /// Run a parsed command
    pub fn apply(&mut self, command: BoardCommand) -> Result<()> {
        match command {
            BoardCommand::Add => {
                self.add_reminder();
            }
            BoardCommand::Remove(index) => {
                self.remove_reminder(index)?;
            }
            BoardCommand::Start(index) => self.start(index)?,
            BoardCommand::Stop(index) => self.stop(index)?,
            BoardCommand::Test(index) => self.test_sound(index)?,
            BoardCommand::Duration {
                index,
                minutes,
                seconds,
            } => self.set_duration(index, minutes, seconds)?,
            BoardCommand::Minutes { index, minutes } => self.set_duration_minutes(index, minutes)?,
            BoardCommand::Category { index, key } => self.set_category(index, &key)?,
            BoardCommand::Volume { index, level } => self.set_volume_level(index, level)?,
            BoardCommand::TogglePlayPause => {
                self.toggle_play_pause()?;
            }
            BoardCommand::Seek(fraction) => {
                self.seek(fraction);
            }
            BoardCommand::PlayerVolume(level) => {
                self.set_player_volume(level)?;
            }
        }
        Ok(())
    }

    /// Render-ready snapshot of every reminder in display order
    pub fn slots(&self) -> Vec<SlotView> {
        self.reminders
            .iter()
            .map(|(index, slot)| SlotView {
                index,
                id: slot.id,
                label: slot.label.clone(),
                category: slot.config.category.clone(),
                category_label: self.library.display_name(&slot.config.category).to_string(),
                volume_bars: slot.config.volume_bars(),
                duration_minutes: slot.config.duration_minutes,
                editor: split_minutes(slot.config.duration_minutes),
                state: slot.state,
                start_visible: !slot.is_running(),
                stop_visible: slot.is_running(),
            })
            .collect()
    }

    /// Snapshot of one reminder
    pub fn slot(&self, index: usize) -> Result<SlotView> {
        self.slots()
            .into_iter()
            .nth(index)
            .ok_or_else(|| self.invalid_index(index))
    }

    pub fn player_view(&self) -> &PlayerView {
        self.player.view()
    }

    pub fn player(&self) -> &AudioPlayerController<D> {
        &self.player
    }

    pub fn queue(&self) -> &PlaybackQueue {
        &self.queue
    }

    /// Requests waiting behind the active session
    pub fn queue_depth(&self) -> usize {
        self.queue.pending_len()
    }

    pub fn timers(&self) -> &TimerEngine {
        &self.timers
    }

    pub fn library(&self) -> &SoundLibrary {
        &self.library
    }

    pub fn reminder_count(&self) -> usize {
        self.reminders.len()
    }

    /// Display index of a reminder
    pub fn index_of(&self, id: SlotId) -> Option<usize> {
        self.reminders.index_of(id)
    }

    pub fn is_running(&self, index: usize) -> Result<bool> {
        Ok(self.slot_at(index)?.is_running())
    }

    pub fn device(&self) -> &D {
        self.player.device()
    }

    pub fn device_mut(&mut self) -> &mut D {
        self.player.device_mut()
    }

    /// Subscribe to board events
    pub fn subscribe(&self) -> broadcast::Receiver<BoardEvent> {
        self.events.subscribe()
    }

    // ========================================
    // Internals
    // ========================================

    fn emit(&self, event: BoardEvent) {
        self.events.emit_lossy(event);
    }

    fn next_request_id(&mut self) -> RequestId {
        let id = RequestId(self.next_request);
        self.next_request += 1;
        id
    }

    fn invalid_index(&self, index: usize) -> Error {
        Error::InvalidIndex {
            index,
            len: self.reminders.len(),
        }
    }

    fn slot_id(&self, index: usize) -> Result<SlotId> {
        self.reminders.id_at(index).map_err(|e| {
            warn!("{}", e);
            e
        })
    }

    fn slot_at(&self, index: usize) -> Result<&crate::reminders::ReminderSlot> {
        self.reminders.at(index).map_err(|e| {
            warn!("{}", e);
            e
        })
    }

    /// Id of an Idle reminder; a running one yields a warning event
    fn editable(&self, index: usize) -> Result<SlotId> {
        let id = self.slot_id(index)?;
        if self.reminders.get(id).is_some_and(|s| s.is_running()) {
            warn!("Edit refused: reminder {} is running", index);
            self.emit(BoardEvent::Warning {
                slot_id: Some(id.as_uuid()),
                message: EDIT_WHILE_RUNNING.to_string(),
                timestamp: Utc::now(),
            });
            return Err(Error::ConcurrentEdit { index });
        }
        Ok(id)
    }

    fn emit_updated(&self, id: SlotId, index: usize) {
        if let Some(slot) = self.reminders.get(id) {
            self.emit(BoardEvent::ReminderUpdated {
                slot_id: id.as_uuid(),
                index,
                label: slot.label.clone(),
                category: slot.config.category.clone(),
                volume_bars: slot.config.volume_bars(),
                timestamp: Utc::now(),
            });
        }
    }

    fn emit_progress(&self) {
        if let Some(session) = self.player.session() {
            self.emit(BoardEvent::PlaybackProgress {
                position_ms: session.position.as_millis() as u64,
                duration_ms: session.duration.map(|d| d.as_millis() as u64).unwrap_or(0),
                percent: session.progress_percent(),
                timestamp: Utc::now(),
            });
        }
    }

    /// (Re)start the countdown with the slot's current configuration
    fn begin_countdown(&mut self, id: SlotId) {
        let Some(index) = self.reminders.index_of(id) else {
            return;
        };
        let Some(slot) = self.reminders.get_mut(id) else {
            return;
        };
        let total_seconds = slot.config.total_seconds();
        slot.state = SlotState::Running;
        slot.reset_label();
        let handle = self.timers.start(id, total_seconds, self.now);

        info!(
            "Reminder {} started: {} ({})",
            index,
            format_clock(total_seconds as u64),
            handle
        );
        self.emit(BoardEvent::TimerStarted {
            slot_id: id.as_uuid(),
            index,
            total_seconds,
            timestamp: Utc::now(),
        });
    }

    /// Cancel everything the slot has in flight and return it to Idle.
    ///
    /// Atomic from the caller's view: countdown, queued notifications and
    /// the slot's audible clip all go in one step, without completions.
    fn stop_slot(&mut self, id: SlotId) {
        let had_timer = self.timers.stop(id);
        let cancelled = self.queue.cancel(id);

        if cancelled.stopped_active {
            if let Some(session) = self.player.stop() {
                self.emit(BoardEvent::PlaybackEnded {
                    owner: session.owner.map(|s| s.as_uuid()),
                    category: session.category,
                    reason: EndReason::Cancelled,
                    timestamp: Utc::now(),
                });
            }
            let next = self.queue.advance();
            self.dispatch(next);
        }

        let index = self.reminders.index_of(id);
        let Some(slot) = self.reminders.get_mut(id) else {
            return;
        };
        let was_running = slot.is_running();
        slot.state = SlotState::Idle;
        slot.reset_label();
        let label = slot.label.clone();

        if was_running || had_timer || cancelled.purged > 0 || cancelled.stopped_active {
            info!(
                "Reminder {:?} stopped ({} queued notifications dropped)",
                index, cancelled.purged
            );
            if let Some(index) = index {
                self.emit(BoardEvent::TimerStopped {
                    slot_id: id.as_uuid(),
                    index,
                    label,
                    timestamp: Utc::now(),
                });
            }
        }
    }

    fn handle_timer_event(&mut self, event: TimerEvent) {
        let slot_id = event.slot();
        let (Some(index), Some(slot)) = (
            self.reminders.index_of(slot_id),
            self.reminders.get_mut(slot_id),
        ) else {
            debug!("Countdown for removed slot {} cancelled", slot_id);
            self.timers.stop(slot_id);
            return;
        };

        match event {
            TimerEvent::Tick { remaining, .. } => {
                slot.label = format_clock(remaining as u64);
                let label = slot.label.clone();
                self.emit(BoardEvent::TimerTick {
                    slot_id: slot_id.as_uuid(),
                    index,
                    remaining_seconds: remaining,
                    label,
                    timestamp: Utc::now(),
                });
            }
            TimerEvent::Expired { .. } => {
                slot.label = format_clock(0);
                let category = slot.config.category.clone();
                let volume = slot.config.volume;
                info!("Reminder {} expired; requesting '{}'", index, category);

                self.emit(BoardEvent::TimerExpired {
                    slot_id: slot_id.as_uuid(),
                    index,
                    category: category.clone(),
                    timestamp: Utc::now(),
                });
                let request = PlaybackRequest::for_expiry(
                    self.next_request_id(),
                    slot_id,
                    index,
                    &category,
                    volume,
                );
                if let Err(e) = self.submit(request) {
                    debug!("Expiry of reminder {} completed without playback: {}", index, e);
                }
            }
        }
    }

    /// Hand a request to the queue.
    ///
    /// A category with nothing to play never enters the queue: the request
    /// completes on the spot so an expired reminder still restarts.
    fn submit(&mut self, request: PlaybackRequest) -> Result<()> {
        let playable = self
            .library
            .get(&request.category)
            .is_some_and(|c| !c.clips.is_empty());
        if !playable {
            let err = Error::ResourceUnavailable(format!(
                "no clips for category '{}'",
                request.category
            ));
            warn!("{} not played: {}", request.id, err);
            self.emit(BoardEvent::PlaybackEnded {
                owner: request.owner.map(|s| s.as_uuid()),
                category: request.category.clone(),
                reason: EndReason::Failed,
                timestamp: Utc::now(),
            });
            self.complete(request.on_completion);
            return Err(err);
        }

        let owner = request.owner;
        let category = request.category.clone();
        match self.queue.enqueue(request) {
            Some(now_active) => self.dispatch(Some(now_active)),
            None => {
                self.emit(BoardEvent::PlaybackQueued {
                    owner: owner.map(|s| s.as_uuid()),
                    category,
                    queue_depth: self.queue.pending_len(),
                    timestamp: Utc::now(),
                });
            }
        }
        Ok(())
    }

    /// Start the request the queue just made active.
    ///
    /// A request that fails to start counts as ended: its completion fires
    /// and the following request is tried, until one starts or the queue
    /// runs dry.
    fn dispatch(&mut self, mut next: Option<PlaybackRequest>) {
        while let Some(request) = next.take() {
            let started = self
                .player
                .play(&request, &self.library, &mut self.rng, self.now)
                .map(|session| BoardEvent::PlaybackStarted {
                    owner: session.owner.map(|s| s.as_uuid()),
                    category: session.category.clone(),
                    title: session.title.clone(),
                    vinyl: session.vinyl.clone(),
                    timestamp: Utc::now(),
                });
            match started {
                Ok(event) => self.emit(event),
                Err(e) => {
                    warn!("{} could not start: {}", request.id, e);
                    self.emit(BoardEvent::PlaybackEnded {
                        owner: request.owner.map(|s| s.as_uuid()),
                        category: request.category.clone(),
                        reason: EndReason::Failed,
                        timestamp: Utc::now(),
                    });
                    let outcome = self.queue.session_ended();
                    self.complete(outcome.completion);
                    next = outcome.next;
                }
            }
        }
    }

    /// Drain player events on a progress tick
    fn poll_player(&mut self) {
        let Some(signal) = self.player.poll(self.now) else {
            self.emit_progress();
            return;
        };

        self.end_session(signal);
    }

    /// Report a finished session, fire its completion and start the next request
    fn end_session(&mut self, signal: PlayerSignal) {
        let reason = match &signal {
            PlayerSignal::Ended(_) => EndReason::Completed,
            PlayerSignal::Failed { .. } => EndReason::Failed,
        };
        let session = signal.session();
        self.emit(BoardEvent::PlaybackEnded {
            owner: session.owner.map(|s| s.as_uuid()),
            category: session.category.clone(),
            reason,
            timestamp: Utc::now(),
        });

        let outcome = self.queue.session_ended();
        self.complete(outcome.completion);
        self.dispatch(outcome.next);
    }

    /// Route a completion message
    fn complete(&mut self, completion: Option<Completion>) {
        if let Some(Completion::RestartTimer(id)) = completion {
            if self.reminders.get(id).is_some_and(|s| s.is_running()) {
                self.begin_countdown(id);
            } else {
                debug!("Restart skipped: slot {} stopped or removed", id);
            }
        }
    }
}
