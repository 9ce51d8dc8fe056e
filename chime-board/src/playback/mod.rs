//! Playback queue and mini player

mod controller;
mod queue;
mod request;

pub use controller::{
    AudioPlayerController, PlaybackSession, PlayerSettings, PlayerSignal, PlayerView, Toggle,
};
pub use queue::{CancelOutcome, PlaybackQueue, SessionOutcome};
pub use request::{Completion, PlaybackRequest, RequestId};
