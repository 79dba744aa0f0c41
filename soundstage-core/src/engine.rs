//! Collaborator interfaces: the rendering engine, the spatial audio engine,
//! media devices and the clock. The core never implements these; hosts and
//! tests supply them.

use std::time::{SystemTime, UNIX_EPOCH};

use soundstage_types::{EntityId, SceneEffect, SoundAsset};

use crate::error::MediaError;

/// Rendering / scene-graph engine.
pub trait SceneEngine {
    /// Stop camera and viewport controls from reacting to pointer motion.
    fn suspend_controls(&mut self);
    fn resume_controls(&mut self);
    /// Apply one transform, geometry or audio-parameter change.
    fn apply_effect(&mut self, effect: &SceneEffect);
    /// Cone aim `(latitude, longitude)` in radians pointing from `entity`
    /// toward the camera.
    fn camera_aim(&self, entity: EntityId) -> Option<(f32, f32)>;
}

/// Decoded sound as reported by the audio engine.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedSound {
    pub duration: f64,
}

/// Spatial audio engine.
pub trait SpatialAudio {
    /// Decode `asset`. Loaded muted when the scene is muted.
    fn load_sound(&mut self, asset: &SoundAsset, muted: bool) -> Result<LoadedSound, MediaError>;
}

/// An input device as listed by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputDevice {
    pub id: String,
    pub label: String,
}

/// Opaque handle to an acquired microphone stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StreamHandle(pub u64);

/// Constraint set for a stream request.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamConstraints {
    pub device_id: String,
    /// Sub-channel of a multi-channel device, 1-based.
    pub channel: Option<u16>,
    /// `None` on Safari-class agents, which reject processing hints.
    pub processing: Option<ProcessingHints>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessingHints {
    pub auto_gain_control: bool,
    pub noise_suppression: bool,
    pub echo_cancellation: bool,
    pub sample_rate: u32,
}

/// Platform media-device API.
pub trait MediaDevices {
    /// List audio input devices. Labels may be empty before permission.
    fn enumerate_inputs(&mut self) -> Result<Vec<InputDevice>, MediaError>;
    /// Ask for microphone permission.
    fn request_permission(&mut self) -> Result<(), MediaError>;
    /// Number of channels a device offers.
    fn probe_channels(&mut self, device_id: &str) -> Result<u16, MediaError>;
    /// Open a stream. Completion is handed back to the negotiator separately.
    fn open_stream(&mut self, constraints: &StreamConstraints) -> Result<StreamHandle, MediaError>;
    /// Stop every track of a stream.
    fn stop_stream(&mut self, stream: StreamHandle);
}

/// Wall-clock source in seconds.
pub trait Clock {
    fn now(&self) -> f64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs_f64()
    }
}
