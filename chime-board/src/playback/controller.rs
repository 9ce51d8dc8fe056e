//! Mini player
//!
//! Owns the single playback session and the player view. The board decides
//! *what* plays (through the queue); the controller only knows how to start,
//! steer and observe one voice on the audio device at a time.

use super::request::{PlaybackRequest, RequestId};
use crate::audio::{AudioDevice, DeviceEvent, VoiceId};
use crate::error::Result;
use crate::library::{ClipRef, SoundLibrary};
use crate::reminders::{level_to_volume, SlotId};
use chime_common::events::PlaybackState;
use chime_common::human_time::format_clock_secs_f64;
use rand::Rng;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Timing and artwork the player uses
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSettings {
    /// Progress refresh period while playing
    pub progress_interval: Duration,

    /// Delay between a session ending and the view going back to idle
    pub idle_reset_delay: Duration,

    /// Artwork shown when nothing plays
    pub idle_vinyl: String,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            progress_interval: Duration::from_millis(100),
            idle_reset_delay: Duration::from_secs(2),
            idle_vinyl: "disque/p.iam.png".to_string(),
        }
    }
}

/// The one clip currently loaded in the player
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackSession {
    pub request_id: RequestId,
    pub owner: Option<SlotId>,
    pub voice: VoiceId,
    pub category: String,
    pub clip: ClipRef,
    pub title: String,
    pub vinyl: String,
    pub volume: f32,
    pub state: PlaybackState,
    pub position: Duration,
    /// Unknown until the device reports metadata
    pub duration: Option<Duration>,
}

impl PlaybackSession {
    /// Completed share of the clip (0-100)
    pub fn progress_percent(&self) -> f64 {
        match self.duration {
            Some(d) if !d.is_zero() => {
                (self.position.as_secs_f64() / d.as_secs_f64() * 100.0).clamp(0.0, 100.0)
            }
            _ => 0.0,
        }
    }
}

/// Render-ready player state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerView {
    pub title: String,
    pub category_label: String,
    pub vinyl: String,
    pub spinning: bool,
    pub progress_percent: f64,
    pub current_label: String,
    pub total_label: String,
    pub state: PlaybackState,
}

impl PlayerView {
    fn idle(vinyl: &str) -> Self {
        Self {
            title: String::new(),
            category_label: String::new(),
            vinyl: vinyl.to_string(),
            spinning: false,
            progress_percent: 0.0,
            current_label: "00:00".to_string(),
            total_label: "00:00".to_string(),
            state: PlaybackState::Stopped,
        }
    }

    /// Progress and time labels back to zero, idle artwork; title is kept
    fn reset(&mut self, vinyl: &str) {
        self.vinyl = vinyl.to_string();
        self.spinning = false;
        self.progress_percent = 0.0;
        self.current_label = "00:00".to_string();
        self.total_label = "00:00".to_string();
        self.state = PlaybackState::Stopped;
    }
}

/// How a session finished on its own
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerSignal {
    /// Clip played to the end
    Ended(PlaybackSession),

    /// Device reported an error mid-playback
    Failed {
        session: PlaybackSession,
        reason: String,
    },
}

impl PlayerSignal {
    pub fn session(&self) -> &PlaybackSession {
        match self {
            PlayerSignal::Ended(session) | PlayerSignal::Failed { session, .. } => session,
        }
    }
}

/// Outcome of a play/pause toggle
#[derive(Debug, Clone, PartialEq)]
pub enum Toggle {
    /// Session switched to this state
    Switched(PlaybackState),

    /// Device refused to resume; the session is over
    Failed(PlayerSignal),
}

/// Controller for the shared audio output
pub struct AudioPlayerController<D: AudioDevice> {
    device: D,
    settings: PlayerSettings,
    session: Option<PlaybackSession>,
    view: PlayerView,
    next_progress_at: Option<Duration>,
    reset_at: Option<Duration>,
}

impl<D: AudioDevice> AudioPlayerController<D> {
    pub fn new(device: D, settings: PlayerSettings) -> Self {
        let view = PlayerView::idle(&settings.idle_vinyl);
        Self {
            device,
            settings,
            session: None,
            view,
            next_progress_at: None,
            reset_at: None,
        }
    }

    /// Start playback for `request`.
    ///
    /// Picks a random clip from the request's category, stops any previous
    /// session and starts a fresh voice. On error no session exists and the
    /// view is not shown as playing.
    pub fn play<R: Rng + ?Sized>(
        &mut self,
        request: &PlaybackRequest,
        library: &SoundLibrary,
        rng: &mut R,
        now: Duration,
    ) -> Result<&PlaybackSession> {
        let picked = library.pick(&request.category, rng)?;

        self.device.advance_clock(now);
        if let Some(previous) = self.session.take() {
            debug!("Stopping {} before {}", previous.voice, request.id);
            self.device.stop(previous.voice);
            self.next_progress_at = None;
        }

        let voice = match self.device.start(&picked.clip, request.volume) {
            Ok(voice) => voice,
            Err(e) => {
                self.view.spinning = false;
                self.view.state = PlaybackState::Stopped;
                return Err(e.into());
            }
        };
        info!(
            "Playing '{}' for {} (slot index {:?}, volume {:.1})",
            picked.title, request.id, request.origin_index, request.volume
        );

        self.view = PlayerView {
            title: picked.title.clone(),
            category_label: picked.category_label.clone(),
            vinyl: picked.vinyl.clone(),
            spinning: true,
            progress_percent: 0.0,
            current_label: "00:00".to_string(),
            total_label: "00:00".to_string(),
            state: PlaybackState::Playing,
        };
        self.next_progress_at = Some(now + self.settings.progress_interval);
        self.reset_at = None;

        Ok(&*self.session.insert(PlaybackSession {
            request_id: request.id,
            owner: request.owner,
            voice,
            category: picked.category,
            clip: picked.clip,
            title: picked.title,
            vinyl: picked.vinyl,
            volume: request.volume,
            state: PlaybackState::Playing,
            position: Duration::ZERO,
            duration: None,
        }))
    }

    /// Flip between Playing and Paused.
    ///
    /// Returns `None` when no session exists. A voice the device can no
    /// longer resume ends the session with a `Failed` signal, exactly as if
    /// the error had been seen by `poll`.
    pub fn toggle_play_pause(&mut self, now: Duration) -> Option<Toggle> {
        let session = self.session.as_mut()?;
        self.device.advance_clock(now);

        match session.state {
            PlaybackState::Playing => {
                self.device.pause(session.voice);
                session.state = PlaybackState::Paused;
                self.next_progress_at = None;
            }
            _ => {
                if let Err(e) = self.device.resume(session.voice) {
                    return self.finish(now, Some(e.to_string())).map(Toggle::Failed);
                }
                session.state = PlaybackState::Playing;
                self.next_progress_at = Some(now + self.settings.progress_interval);
            }
        }

        self.view.state = session.state;
        self.view.spinning = session.state == PlaybackState::Playing;
        debug!("Player {}", session.state);
        Some(Toggle::Switched(session.state))
    }

    /// Jump to `fraction` (0.0-1.0) of the clip.
    ///
    /// Needs a session with a known duration and a finite fraction; returns
    /// whether it moved.
    pub fn seek(&mut self, fraction: f64, now: Duration) -> bool {
        if !fraction.is_finite() {
            debug!("Seek ignored: fraction {} is not finite", fraction);
            return false;
        }
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        let Some(duration) = session.duration else {
            debug!("Seek ignored: duration of {} not known yet", session.voice);
            return false;
        };

        self.device.advance_clock(now);
        let position = duration.mul_f64(fraction.clamp(0.0, 1.0));
        self.device.seek(session.voice, position);
        session.position = position;
        Self::refresh_progress(&mut self.view, session);
        true
    }

    /// Set the active session's volume from a bar level (0-10)
    pub fn set_volume(&mut self, level: u8) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        session.volume = level_to_volume(level);
        self.device.set_volume(session.voice, session.volume);
        true
    }

    /// Forced stop; no signal is produced and the view returns to idle now
    pub fn stop(&mut self) -> Option<PlaybackSession> {
        let session = self.session.take()?;
        self.device.stop(session.voice);
        self.next_progress_at = None;
        self.reset_at = None;
        self.view.reset(&self.settings.idle_vinyl);
        info!("Stopped '{}' ({})", session.title, session.request_id);
        Some(session)
    }

    /// Drain device events for the active session.
    ///
    /// Called on each progress tick. Returns a signal when the session
    /// ended or failed; the idle reset is then scheduled.
    pub fn poll(&mut self, now: Duration) -> Option<PlayerSignal> {
        let events = self.device.poll_events(now);
        let session = self.session.as_mut()?;

        let mut signal = None;
        for event in events {
            if event.voice() != session.voice {
                continue;
            }
            match event {
                DeviceEvent::MetadataLoaded { duration, .. } => {
                    session.duration = duration;
                    if let Some(d) = duration {
                        self.view.total_label = format_clock_secs_f64(d.as_secs_f64());
                    }
                }
                DeviceEvent::TimeAdvanced { position, .. } => {
                    session.position = position;
                    Self::refresh_progress(&mut self.view, session);
                }
                DeviceEvent::Ended { .. } => {
                    if let Some(d) = session.duration {
                        session.position = d;
                        Self::refresh_progress(&mut self.view, session);
                    }
                    signal = Some(None);
                    break;
                }
                DeviceEvent::Error { reason, .. } => {
                    signal = Some(Some(reason));
                    break;
                }
            }
        }

        match signal {
            None => {
                if session.state == PlaybackState::Playing {
                    self.next_progress_at = Some(now + self.settings.progress_interval);
                }
                None
            }
            Some(failure) => self.finish(now, failure),
        }
    }

    /// End the session on its own (clip over or device failure) and
    /// schedule the idle reset
    fn finish(&mut self, now: Duration, failure: Option<String>) -> Option<PlayerSignal> {
        let mut session = self.session.take()?;
        self.device.stop(session.voice);
        session.state = PlaybackState::Stopped;
        self.next_progress_at = None;
        self.reset_at = Some(now + self.settings.idle_reset_delay);
        self.view.spinning = false;
        self.view.state = PlaybackState::Stopped;

        Some(match failure {
            None => {
                debug!("'{}' finished", session.title);
                PlayerSignal::Ended(session)
            }
            Some(reason) => {
                warn!("'{}' failed during playback: {}", session.title, reason);
                PlayerSignal::Failed { session, reason }
            }
        })
    }

    /// Apply the idle reset once its grace delay has passed.
    ///
    /// Skipped when a new session started in the meantime. Returns whether a
    /// reset was applied.
    pub fn reset_if_due(&mut self, now: Duration) -> bool {
        match self.reset_at {
            Some(at) if at <= now => {
                self.reset_at = None;
                if self.session.is_some() {
                    return false;
                }
                self.view.reset(&self.settings.idle_vinyl);
                debug!("Player view reset to idle");
                true
            }
            _ => false,
        }
    }

    /// Next progress tick (only while playing)
    pub fn next_progress_due(&self) -> Option<Duration> {
        self.next_progress_at
    }

    /// Pending idle reset
    pub fn reset_due(&self) -> Option<Duration> {
        self.reset_at
    }

    pub fn session(&self) -> Option<&PlaybackSession> {
        self.session.as_ref()
    }

    /// Slot owning the active session
    pub fn owner(&self) -> Option<SlotId> {
        self.session.as_ref().and_then(|s| s.owner)
    }

    pub fn state(&self) -> PlaybackState {
        self.session
            .as_ref()
            .map(|s| s.state)
            .unwrap_or(PlaybackState::Stopped)
    }

    pub fn view(&self) -> &PlayerView {
        &self.view
    }

    pub fn settings(&self) -> &PlayerSettings {
        &self.settings
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    fn refresh_progress(view: &mut PlayerView, session: &PlaybackSession) {
        view.progress_percent = session.progress_percent();
        view.current_label = format_clock_secs_f64(session.position.as_secs_f64());
        if let Some(d) = session.duration {
            view.total_label = format_clock_secs_f64(d.as_secs_f64());
        }
    }
}
