//! Audio device capability contract

use crate::error::Error;
use crate::library::ClipRef;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Handle for one playing clip instance on a device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VoiceId(pub u64);

impl fmt::Display for VoiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "voice-{}", self.0)
    }
}

/// Events a device reports for its voices
///
/// Drained by the player on every progress tick.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceEvent {
    /// Clip metadata decoded; duration is unknown for some formats
    MetadataLoaded {
        voice: VoiceId,
        duration: Option<Duration>,
    },

    /// Playback position advanced
    TimeAdvanced { voice: VoiceId, position: Duration },

    /// Clip played to the end
    Ended { voice: VoiceId },

    /// Playback failed after starting
    Error { voice: VoiceId, reason: String },
}

impl DeviceEvent {
    pub fn voice(&self) -> VoiceId {
        match self {
            DeviceEvent::MetadataLoaded { voice, .. }
            | DeviceEvent::TimeAdvanced { voice, .. }
            | DeviceEvent::Ended { voice }
            | DeviceEvent::Error { voice, .. } => *voice,
        }
    }
}

/// Device-level failures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DeviceError {
    /// Clip could not be found or read
    #[error("clip unavailable: {0}")]
    Unavailable(String),

    /// Device refused to play (output busy, permissions, undecodable data)
    #[error("playback rejected: {0}")]
    Rejected(String),
}

impl From<DeviceError> for Error {
    fn from(err: DeviceError) -> Self {
        match err {
            DeviceError::Unavailable(reason) => Error::ResourceUnavailable(reason),
            DeviceError::Rejected(reason) => Error::PlaybackStart(reason),
        }
    }
}

/// The single shared audio output.
///
/// Implementations may hold several voices, but the board never keeps more
/// than one alive: the player stops the previous voice before starting a
/// new one.
pub trait AudioDevice {
    /// Load and cache a clip so later starts reuse the decoded source
    fn preload(&mut self, clip: &ClipRef) -> Result<(), DeviceError>;

    /// Start a new voice for `clip` at `volume` (0.0-1.0)
    fn start(&mut self, clip: &ClipRef, volume: f32) -> Result<VoiceId, DeviceError>;

    fn pause(&mut self, voice: VoiceId);

    fn resume(&mut self, voice: VoiceId) -> Result<(), DeviceError>;

    fn seek(&mut self, voice: VoiceId, position: Duration);

    fn set_volume(&mut self, voice: VoiceId, volume: f32);

    /// Silence and discard a voice; no further events are reported for it
    fn stop(&mut self, voice: VoiceId);

    /// Drain pending events for all voices
    fn poll_events(&mut self, now: Duration) -> Vec<DeviceEvent>;

    /// Bring a simulated device up to the board clock before a control
    /// operation. Real devices follow wall time and ignore this.
    fn advance_clock(&mut self, _now: Duration) {}
}
