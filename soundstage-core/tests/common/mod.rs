//! Shared harness: recording collaborators and a hand-driven clock.

#![allow(dead_code)]

use std::cell::Cell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use soundstage_core::config::Config;
use soundstage_core::engine::{
    Clock, InputDevice, LoadedSound, MediaDevices, SceneEngine, SpatialAudio, StreamConstraints,
    StreamHandle,
};
use soundstage_core::panel::ControlHandle;
use soundstage_core::{EditorSession, MediaError};
use soundstage_types::{
    EntityId, FieldTarget, ParamField, SceneEffect, SceneState, SoundAsset, SyncIntent, SyncSink,
};

#[derive(Default)]
pub struct RecordingEngine {
    pub effects: Vec<SceneEffect>,
    pub suspended: bool,
    pub aim: Option<(f32, f32)>,
}

impl SceneEngine for RecordingEngine {
    fn suspend_controls(&mut self) {
        self.suspended = true;
    }

    fn resume_controls(&mut self) {
        self.suspended = false;
    }

    fn apply_effect(&mut self, effect: &SceneEffect) {
        self.effects.push(effect.clone());
    }

    fn camera_aim(&self, _entity: EntityId) -> Option<(f32, f32)> {
        self.aim
    }
}

/// Decodes everything instantly with a fixed duration.
pub struct FixedAudio {
    pub duration: f64,
    pub fail: bool,
}

impl SpatialAudio for FixedAudio {
    fn load_sound(&mut self, asset: &SoundAsset, _muted: bool) -> Result<LoadedSound, MediaError> {
        if self.fail {
            return Err(MediaError::Backend(format!("cannot decode {}", asset.name)));
        }
        Ok(LoadedSound {
            duration: self.duration,
        })
    }
}

/// Media devices driven by a script. Every call is appended to `log`.
#[derive(Default)]
pub struct ScriptedMedia {
    pub devices: Vec<InputDevice>,
    pub channels: HashMap<String, u16>,
    pub deny_permission: bool,
    pub failing: HashSet<String>,
    pub log: Vec<String>,
    pub open: HashSet<StreamHandle>,
    next: u64,
}

impl ScriptedMedia {
    pub fn with_devices(ids: &[&str]) -> Self {
        Self {
            devices: ids
                .iter()
                .map(|id| InputDevice {
                    id: id.to_string(),
                    label: format!("Mic {}", id),
                })
                .collect(),
            ..Self::default()
        }
    }
}

impl MediaDevices for ScriptedMedia {
    fn enumerate_inputs(&mut self) -> Result<Vec<InputDevice>, MediaError> {
        self.log.push("enumerate".into());
        Ok(self.devices.clone())
    }

    fn request_permission(&mut self) -> Result<(), MediaError> {
        self.log.push("permission".into());
        if self.deny_permission {
            Err(MediaError::PermissionDenied("NotAllowedError".into()))
        } else {
            Ok(())
        }
    }

    fn probe_channels(&mut self, device_id: &str) -> Result<u16, MediaError> {
        self.channels
            .get(device_id)
            .copied()
            .ok_or_else(|| MediaError::DeviceUnavailable(device_id.to_string()))
    }

    fn open_stream(&mut self, constraints: &StreamConstraints) -> Result<StreamHandle, MediaError> {
        self.log.push(format!("open:{}", constraints.device_id));
        if self.failing.contains(&constraints.device_id) {
            return Err(MediaError::DeviceUnavailable(constraints.device_id.clone()));
        }
        let handle = StreamHandle(self.next);
        self.next += 1;
        self.open.insert(handle);
        Ok(handle)
    }

    fn stop_stream(&mut self, stream: StreamHandle) {
        self.log.push(format!("stop:{}", stream.0));
        self.open.remove(&stream);
    }
}

#[derive(Default)]
pub struct RecordingSink {
    pub shared: bool,
    pub intents: Vec<SyncIntent>,
}

impl SyncSink for RecordingSink {
    fn is_shared(&self) -> bool {
        self.shared
    }

    fn submit(&mut self, intent: SyncIntent) {
        self.intents.push(intent);
    }
}

/// Clock the test moves by hand.
#[derive(Clone, Default)]
pub struct ManualClock(pub Rc<Cell<f64>>);

impl ManualClock {
    pub fn set(&self, now: f64) {
        self.0.set(now);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.0.get()
    }
}

pub type TestSession = EditorSession<RecordingEngine, FixedAudio, ScriptedMedia, RecordingSink>;

pub fn session_with(shared: bool, media: ScriptedMedia) -> (TestSession, ManualClock) {
    let clock = ManualClock::default();
    let session = EditorSession::new(
        Config::default(),
        "ed1",
        "Mozilla/5.0 (X11; Linux x86_64) Chrome/120.0",
        SceneState::new(),
        RecordingEngine::default(),
        FixedAudio {
            duration: 120.0,
            fail: false,
        },
        media,
        RecordingSink {
            shared,
            intents: Vec::new(),
        },
        Box::new(clock.clone()),
    );
    (session, clock)
}

pub fn session(shared: bool) -> (TestSession, ManualClock) {
    session_with(shared, ScriptedMedia::default())
}

pub fn asset(name: &str) -> SoundAsset {
    SoundAsset::new(name, 4 * 1024, 0.0)
}

pub fn handle(session: &TestSession, entity: EntityId, field: ParamField) -> ControlHandle {
    session
        .panel()
        .find(FieldTarget::new(entity, field))
        .unwrap_or_else(|| panic!("no {:?} control on {}", field, entity))
}

pub fn shown(session: &TestSession, handle: ControlHandle) -> String {
    session
        .panel()
        .descriptor(handle)
        .map(|d| d.display())
        .unwrap_or_default()
}
