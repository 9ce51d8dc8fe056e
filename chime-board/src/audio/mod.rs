//! Audio output devices
//!
//! The board talks to the single audio output through the [`AudioDevice`]
//! trait. Two implementations exist:
//! - [`RodioDevice`]: real output, clips decoded from cached file bytes
//! - [`VirtualDevice`]: simulated playback on the board clock (tests, headless runs)

mod device;
mod rodio_device;
mod virtual_device;

pub use device::{AudioDevice, DeviceError, DeviceEvent, VoiceId};
pub use rodio_device::RodioDevice;
pub use virtual_device::{StartedVoice, VirtualDevice};
