//! Simulated audio device
//!
//! Plays clips on the board's virtual clock: every voice advances by the
//! time elapsed between clock updates and ends once its clip length is
//! reached. Used by the test suites and by `--headless` runs, and supports
//! failure injection for exercising recovery paths.

use super::device::{AudioDevice, DeviceError, DeviceEvent, VoiceId};
use crate::library::ClipRef;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::time::Duration;
use tracing::debug;

/// Clip length used when none is configured
const DEFAULT_CLIP_LENGTH: Duration = Duration::from_secs(3);

/// Record of a voice the device was asked to start
#[derive(Debug, Clone, PartialEq)]
pub struct StartedVoice {
    pub voice: VoiceId,
    pub clip: ClipRef,
    pub volume: f32,
}

#[derive(Debug)]
struct VirtualVoice {
    length: Duration,
    position: Duration,
    volume: f32,
    playing: bool,
    metadata_sent: bool,
}

/// Audio device simulated on the board clock
#[derive(Debug)]
pub struct VirtualDevice {
    default_length: Duration,
    clip_lengths: HashMap<ClipRef, Duration>,
    unavailable: HashSet<ClipRef>,
    reject_next: Option<String>,
    cached: HashSet<ClipRef>,
    voices: BTreeMap<VoiceId, VirtualVoice>,
    injected: Vec<DeviceEvent>,
    history: Vec<StartedVoice>,
    next_voice: u64,
    clock: Duration,
}

impl VirtualDevice {
    pub fn new() -> Self {
        Self::with_clip_length(DEFAULT_CLIP_LENGTH)
    }

    /// Device where every clip plays for `length`
    pub fn with_clip_length(length: Duration) -> Self {
        Self {
            default_length: length,
            clip_lengths: HashMap::new(),
            unavailable: HashSet::new(),
            reject_next: None,
            cached: HashSet::new(),
            voices: BTreeMap::new(),
            injected: Vec::new(),
            history: Vec::new(),
            next_voice: 1,
            clock: Duration::ZERO,
        }
    }

    /// Override the length of one clip
    pub fn set_clip_length(&mut self, clip: ClipRef, length: Duration) {
        self.clip_lengths.insert(clip, length);
    }

    /// Make a clip fail to load
    pub fn mark_unavailable(&mut self, clip: ClipRef) {
        self.cached.remove(&clip);
        self.unavailable.insert(clip);
    }

    /// Reject the next `start` call with `reason`
    pub fn reject_next_start(&mut self, reason: impl Into<String>) {
        self.reject_next = Some(reason.into());
    }

    /// Jump a voice to the end of its clip; `Ended` is reported on the next poll
    pub fn finish(&mut self, voice: VoiceId) {
        if let Some(v) = self.voices.get_mut(&voice) {
            v.position = v.length;
        }
    }

    /// Fail a playing voice; `Error` is reported on the next poll
    pub fn fail(&mut self, voice: VoiceId, reason: impl Into<String>) {
        if self.voices.remove(&voice).is_some() {
            self.injected.push(DeviceEvent::Error {
                voice,
                reason: reason.into(),
            });
        }
    }

    /// Voices currently audible (not paused)
    pub fn audible_count(&self) -> usize {
        self.voices.values().filter(|v| v.playing).count()
    }

    /// Voices alive on the device, paused or not
    pub fn voice_count(&self) -> usize {
        self.voices.len()
    }

    /// Most recently started voice still alive
    pub fn current_voice(&self) -> Option<VoiceId> {
        self.voices.keys().next_back().copied()
    }

    pub fn voice_position(&self, voice: VoiceId) -> Option<Duration> {
        self.voices.get(&voice).map(|v| v.position)
    }

    pub fn voice_volume(&self, voice: VoiceId) -> Option<f32> {
        self.voices.get(&voice).map(|v| v.volume)
    }

    pub fn is_paused(&self, voice: VoiceId) -> bool {
        self.voices.get(&voice).is_some_and(|v| !v.playing)
    }

    /// Every successful start, in order
    pub fn started(&self) -> &[StartedVoice] {
        &self.history
    }

    pub fn is_cached(&self, clip: &ClipRef) -> bool {
        self.cached.contains(clip)
    }

    fn length_of(&self, clip: &ClipRef) -> Duration {
        self.clip_lengths
            .get(clip)
            .copied()
            .unwrap_or(self.default_length)
    }
}

impl Default for VirtualDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioDevice for VirtualDevice {
    fn preload(&mut self, clip: &ClipRef) -> Result<(), DeviceError> {
        if self.unavailable.contains(clip) {
            return Err(DeviceError::Unavailable(clip.to_string()));
        }
        self.cached.insert(clip.clone());
        Ok(())
    }

    fn start(&mut self, clip: &ClipRef, volume: f32) -> Result<VoiceId, DeviceError> {
        if let Some(reason) = self.reject_next.take() {
            return Err(DeviceError::Rejected(reason));
        }
        self.preload(clip)?;

        let voice = VoiceId(self.next_voice);
        self.next_voice += 1;
        self.voices.insert(
            voice,
            VirtualVoice {
                length: self.length_of(clip),
                position: Duration::ZERO,
                volume,
                playing: true,
                metadata_sent: false,
            },
        );
        self.history.push(StartedVoice {
            voice,
            clip: clip.clone(),
            volume,
        });
        debug!("Virtual device started {} for {}", voice, clip);
        Ok(voice)
    }

    fn pause(&mut self, voice: VoiceId) {
        if let Some(v) = self.voices.get_mut(&voice) {
            v.playing = false;
        }
    }

    fn resume(&mut self, voice: VoiceId) -> Result<(), DeviceError> {
        match self.voices.get_mut(&voice) {
            Some(v) => {
                v.playing = true;
                Ok(())
            }
            None => Err(DeviceError::Rejected(format!("{} is not loaded", voice))),
        }
    }

    fn seek(&mut self, voice: VoiceId, position: Duration) {
        if let Some(v) = self.voices.get_mut(&voice) {
            v.position = position.min(v.length);
        }
    }

    fn set_volume(&mut self, voice: VoiceId, volume: f32) {
        if let Some(v) = self.voices.get_mut(&voice) {
            v.volume = volume;
        }
    }

    fn stop(&mut self, voice: VoiceId) {
        self.voices.remove(&voice);
        self.injected.retain(|e| e.voice() != voice);
    }

    fn poll_events(&mut self, now: Duration) -> Vec<DeviceEvent> {
        self.advance_clock(now);

        let mut events = std::mem::take(&mut self.injected);
        let mut ended = Vec::new();
        for (id, voice) in self.voices.iter_mut() {
            if !voice.metadata_sent {
                voice.metadata_sent = true;
                events.push(DeviceEvent::MetadataLoaded {
                    voice: *id,
                    duration: Some(voice.length),
                });
            }
            if voice.position >= voice.length {
                ended.push(*id);
                events.push(DeviceEvent::Ended { voice: *id });
            } else if voice.playing {
                events.push(DeviceEvent::TimeAdvanced {
                    voice: *id,
                    position: voice.position,
                });
            }
        }
        for id in ended {
            self.voices.remove(&id);
        }
        events
    }

    fn advance_clock(&mut self, now: Duration) {
        let elapsed = now.saturating_sub(self.clock);
        self.clock = self.clock.max(now);
        if elapsed.is_zero() {
            return;
        }
        for voice in self.voices.values_mut().filter(|v| v.playing) {
            voice.position = (voice.position + elapsed).min(voice.length);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clip() -> ClipRef {
        ClipRef::new("bells/a.ogg")
    }

    #[test]
    fn test_voice_plays_to_end() {
        let mut device = VirtualDevice::with_clip_length(Duration::from_millis(300));
        let voice = device.start(&clip(), 0.7).unwrap();

        let events = device.poll_events(Duration::from_millis(100));
        assert!(events.contains(&DeviceEvent::MetadataLoaded {
            voice,
            duration: Some(Duration::from_millis(300)),
        }));
        assert!(events.contains(&DeviceEvent::TimeAdvanced {
            voice,
            position: Duration::from_millis(100),
        }));

        let events = device.poll_events(Duration::from_millis(300));
        assert_eq!(events, vec![DeviceEvent::Ended { voice }]);
        assert_eq!(device.voice_count(), 0);
    }

    #[test]
    fn test_paused_voice_does_not_advance() {
        let mut device = VirtualDevice::with_clip_length(Duration::from_secs(1));
        let voice = device.start(&clip(), 0.5).unwrap();

        device.advance_clock(Duration::from_millis(200));
        device.pause(voice);
        device.advance_clock(Duration::from_millis(900));
        assert_eq!(device.voice_position(voice), Some(Duration::from_millis(200)));

        device.resume(voice).unwrap();
        device.advance_clock(Duration::from_millis(1000));
        assert_eq!(device.voice_position(voice), Some(Duration::from_millis(300)));
    }

    #[test]
    fn test_failure_injection() {
        let mut device = VirtualDevice::new();
        device.reject_next_start("blocked by autoplay policy");
        assert_eq!(
            device.start(&clip(), 1.0),
            Err(DeviceError::Rejected("blocked by autoplay policy".to_string()))
        );

        device.mark_unavailable(clip());
        assert!(matches!(
            device.start(&clip(), 1.0),
            Err(DeviceError::Unavailable(_))
        ));
        assert!(device.started().is_empty());
    }

    #[test]
    fn test_stop_discards_pending_events() {
        let mut device = VirtualDevice::new();
        let voice = device.start(&clip(), 1.0).unwrap();
        device.finish(voice);
        device.stop(voice);
        assert!(device.poll_events(Duration::from_millis(100)).is_empty());
    }
}
