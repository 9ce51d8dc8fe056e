//! Audio output using rodio
//!
//! Clip files are read once and cached as shared byte buffers; each start
//! decodes a fresh source from the cached bytes instead of going back to
//! disk. One rodio `Sink` per voice.

use super::device::{AudioDevice, DeviceError, DeviceEvent, VoiceId};
use crate::error::Error;
use crate::library::ClipRef;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use std::collections::HashMap;
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

struct RodioVoice {
    sink: Sink,
    duration: Option<Duration>,
    metadata_sent: bool,
}

/// Audio output on the default system device
///
/// Not `Send`: the output stream must stay on the thread that opened it.
pub struct RodioDevice {
    _stream: OutputStream,
    handle: OutputStreamHandle,
    sound_root: PathBuf,
    cache: HashMap<ClipRef, Arc<[u8]>>,
    voices: HashMap<VoiceId, RodioVoice>,
    next_voice: u64,
}

impl RodioDevice {
    /// Open the default output device; clips resolve relative to `sound_root`
    pub fn open(sound_root: PathBuf) -> Result<Self, Error> {
        let (stream, handle) = OutputStream::try_default()
            .map_err(|e| Error::AudioOutput(format!("no audio output device: {}", e)))?;
        info!("Audio output opened (sound root: {})", sound_root.display());

        Ok(Self {
            _stream: stream,
            handle,
            sound_root,
            cache: HashMap::new(),
            voices: HashMap::new(),
            next_voice: 1,
        })
    }

    fn cached_bytes(&mut self, clip: &ClipRef) -> Result<Arc<[u8]>, DeviceError> {
        if let Some(bytes) = self.cache.get(clip) {
            return Ok(Arc::clone(bytes));
        }

        let path = self.sound_root.join(clip.as_str());
        let bytes: Arc<[u8]> = std::fs::read(&path)
            .map_err(|e| DeviceError::Unavailable(format!("{}: {}", path.display(), e)))?
            .into();
        debug!("Cached {} ({} bytes)", clip, bytes.len());
        self.cache.insert(clip.clone(), Arc::clone(&bytes));
        Ok(bytes)
    }
}

impl AudioDevice for RodioDevice {
    fn preload(&mut self, clip: &ClipRef) -> Result<(), DeviceError> {
        self.cached_bytes(clip).map(|_| ())
    }

    fn start(&mut self, clip: &ClipRef, volume: f32) -> Result<VoiceId, DeviceError> {
        let bytes = self.cached_bytes(clip)?;
        let source = Decoder::new(Cursor::new(bytes))
            .map_err(|e| DeviceError::Rejected(format!("cannot decode {}: {}", clip, e)))?;
        let duration = source.total_duration();

        let sink = Sink::try_new(&self.handle)
            .map_err(|e| DeviceError::Rejected(format!("cannot open sink: {}", e)))?;
        sink.set_volume(volume);
        sink.append(source);

        let voice = VoiceId(self.next_voice);
        self.next_voice += 1;
        self.voices.insert(
            voice,
            RodioVoice {
                sink,
                duration,
                metadata_sent: false,
            },
        );
        Ok(voice)
    }

    fn pause(&mut self, voice: VoiceId) {
        if let Some(v) = self.voices.get(&voice) {
            v.sink.pause();
        }
    }

    fn resume(&mut self, voice: VoiceId) -> Result<(), DeviceError> {
        let v = self
            .voices
            .get(&voice)
            .ok_or_else(|| DeviceError::Rejected(format!("{} is not loaded", voice)))?;
        v.sink.play();
        Ok(())
    }

    fn seek(&mut self, voice: VoiceId, position: Duration) {
        if let Some(v) = self.voices.get(&voice) {
            if let Err(e) = v.sink.try_seek(position) {
                warn!("Seek failed for {}: {}", voice, e);
            }
        }
    }

    fn set_volume(&mut self, voice: VoiceId, volume: f32) {
        if let Some(v) = self.voices.get(&voice) {
            v.sink.set_volume(volume);
        }
    }

    fn stop(&mut self, voice: VoiceId) {
        if let Some(v) = self.voices.remove(&voice) {
            v.sink.stop();
        }
    }

    fn poll_events(&mut self, _now: Duration) -> Vec<DeviceEvent> {
        let mut events = Vec::new();
        let mut ended = Vec::new();

        for (id, voice) in self.voices.iter_mut() {
            if !voice.metadata_sent {
                voice.metadata_sent = true;
                events.push(DeviceEvent::MetadataLoaded {
                    voice: *id,
                    duration: voice.duration,
                });
            }
            if voice.sink.empty() {
                ended.push(*id);
                events.push(DeviceEvent::Ended { voice: *id });
            } else if !voice.sink.is_paused() {
                events.push(DeviceEvent::TimeAdvanced {
                    voice: *id,
                    position: voice.sink.get_pos(),
                });
            }
        }

        for id in ended {
            self.voices.remove(&id);
        }
        events
    }
}
