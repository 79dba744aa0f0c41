use serde::{Deserialize, Serialize};

use super::playback::{PlaybackState, TransportMode};
use super::trajectory::Trajectory;
use crate::{ConeId, EntityId, Vec3};

/// A stored audio file referenced by a sound slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoundAsset {
    pub name: String,
    pub size_bytes: u64,
    pub duration: f64,
}

impl SoundAsset {
    pub fn new(name: impl Into<String>, size_bytes: u64, duration: f64) -> Self {
        Self {
            name: name.into(),
            size_bytes,
            duration,
        }
    }

    /// Size rounded to whole kilobytes, the unit the upload ceiling is expressed in.
    pub fn size_kb(&self) -> u64 {
        (self.size_bytes as f64 / 1024.0).round() as u64
    }
}

/// A loaded sound and its transport, as attached to an object, cone or zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoundSlot {
    pub asset: SoundAsset,
    pub gain: f32,
    pub ref_distance: f32,
    pub rolloff: f32,
    pub playback: PlaybackState,
    /// Remembered intent to be playing; survives scrubs and asset swaps.
    pub user_wants_playing: bool,
}

impl SoundSlot {
    pub fn new(asset: SoundAsset) -> Self {
        let playback = PlaybackState::new(asset.duration);
        Self {
            asset,
            gain: 1.0,
            ref_distance: 1.0,
            rolloff: 1.0,
            playback,
            user_wants_playing: false,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playback.mode == TransportMode::Playing
    }
}

/// Live microphone routing for an object. The stream itself is owned by the
/// live-input negotiator; this records what the entity asked for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveInputBinding {
    pub enabled: bool,
    /// Composite device id (`deviceId` or `deviceId_channel`), `None` for no device.
    pub device: Option<String>,
    pub muted: bool,
    pub volume: f32,
}

impl Default for LiveInputBinding {
    fn default() -> Self {
        Self {
            enabled: false,
            device: None,
            muted: false,
            volume: 1.0,
        }
    }
}

/// A directional sub-source attached to an object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConeSource {
    pub id: ConeId,
    /// Stable key used for the remote record and blob path.
    pub uuid: String,
    pub sound: SoundSlot,
    pub spread: f32,
    /// Radians in [-π, π].
    pub latitude: f32,
    /// Radians in [-2π, 2π].
    pub longitude: f32,
    /// False while the cone's asset upload is still in flight.
    pub upload_complete: bool,
}

impl ConeSource {
    pub fn new(id: ConeId, uuid: impl Into<String>, sound: SoundSlot) -> Self {
        Self {
            id,
            uuid: uuid.into(),
            sound,
            spread: 0.5,
            latitude: 0.0001,
            longitude: 0.0001,
            upload_complete: false,
        }
    }

    pub fn length(&self) -> f32 {
        self.sound.gain
    }

    pub fn width(&self) -> f32 {
        self.spread
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectSource {
    pub position: Vec3,
    /// Omnidirectional sound.
    pub sound: Option<SoundSlot>,
    pub cones: Vec<ConeSource>,
    pub trajectory: Option<Trajectory>,
    pub live_input: LiveInputBinding,
    /// File sound remembered while live input replaces it.
    pub stashed_sound: Option<SoundSlot>,
    /// The cone whose section is visible in the panel.
    pub interactive_cone: Option<ConeId>,
    /// Visual radius, derived from the omni gain.
    pub radius: f32,
    pub adding_sound: bool,
}

impl ObjectSource {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            sound: None,
            cones: Vec::new(),
            trajectory: None,
            live_input: LiveInputBinding::default(),
            stashed_sound: None,
            interactive_cone: None,
            radius: radius_for_gain(1.0),
            adding_sound: false,
        }
    }

    pub fn cone(&self, id: ConeId) -> Option<&ConeSource> {
        self.cones.iter().find(|c| c.id == id)
    }

    pub fn cone_mut(&mut self, id: ConeId) -> Option<&mut ConeSource> {
        self.cones.iter_mut().find(|c| c.id == id)
    }

    pub fn cone_index(&self, id: ConeId) -> Option<usize> {
        self.cones.iter().position(|c| c.id == id)
    }
}

/// Visual radius of an object for a given omni gain.
pub fn radius_for_gain(gain: f32) -> f32 {
    50.0 + gain * 100.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneSource {
    pub position: Vec3,
    pub rotation: f32,
    pub scale: f32,
    pub sound: Option<SoundSlot>,
    pub opacity: f32,
    /// Scale written before the most recent edit, for reversal.
    pub prev_scale: f32,
    /// Previous scale held locally while the zone is still adding its sound.
    pub cached_prev_scale: Option<f32>,
    pub adding_sound: bool,
}

impl ZoneSource {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            rotation: 0.0,
            scale: 1.0,
            sound: None,
            opacity: crate::bounds::zone_opacity(1.0),
            prev_scale: 1.0,
            cached_prev_scale: None,
            adding_sound: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadListener {
    pub position: Vec3,
    pub rotation: f32,
    pub trajectory: Option<Trajectory>,
}

impl HeadListener {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            rotation: 0.0,
            trajectory: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EntityKind {
    Object(ObjectSource),
    Zone(ZoneSource),
    Head(HeadListener),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKindTag {
    Object,
    Zone,
    Head,
}

/// A placeable scene entity. `name` is the key its remote record lives under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub name: String,
    pub kind: EntityKind,
}

impl Entity {
    pub fn tag(&self) -> EntityKindTag {
        match self.kind {
            EntityKind::Object(_) => EntityKindTag::Object,
            EntityKind::Zone(_) => EntityKindTag::Zone,
            EntityKind::Head(_) => EntityKindTag::Head,
        }
    }

    pub fn position(&self) -> Vec3 {
        match &self.kind {
            EntityKind::Object(o) => o.position,
            EntityKind::Zone(z) => z.position,
            EntityKind::Head(h) => h.position,
        }
    }

    pub fn position_mut(&mut self) -> &mut Vec3 {
        match &mut self.kind {
            EntityKind::Object(o) => &mut o.position,
            EntityKind::Zone(z) => &mut z.position,
            EntityKind::Head(h) => &mut h.position,
        }
    }

    pub fn rotation_mut(&mut self) -> Option<&mut f32> {
        match &mut self.kind {
            EntityKind::Zone(z) => Some(&mut z.rotation),
            EntityKind::Head(h) => Some(&mut h.rotation),
            EntityKind::Object(_) => None,
        }
    }

    pub fn trajectory(&self) -> Option<&Trajectory> {
        match &self.kind {
            EntityKind::Object(o) => o.trajectory.as_ref(),
            EntityKind::Head(h) => h.trajectory.as_ref(),
            EntityKind::Zone(_) => None,
        }
    }

    pub fn trajectory_mut(&mut self) -> Option<&mut Trajectory> {
        match &mut self.kind {
            EntityKind::Object(o) => o.trajectory.as_mut(),
            EntityKind::Head(h) => h.trajectory.as_mut(),
            EntityKind::Zone(_) => None,
        }
    }

    /// Slot holding the trajectory, for attaching or removing one.
    pub fn trajectory_slot(&mut self) -> Option<&mut Option<Trajectory>> {
        match &mut self.kind {
            EntityKind::Object(o) => Some(&mut o.trajectory),
            EntityKind::Head(h) => Some(&mut h.trajectory),
            EntityKind::Zone(_) => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectSource> {
        match &self.kind {
            EntityKind::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut ObjectSource> {
        match &mut self.kind {
            EntityKind::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_zone(&self) -> Option<&ZoneSource> {
        match &self.kind {
            EntityKind::Zone(z) => Some(z),
            _ => None,
        }
    }

    pub fn as_zone_mut(&mut self) -> Option<&mut ZoneSource> {
        match &mut self.kind {
            EntityKind::Zone(z) => Some(z),
            _ => None,
        }
    }

    /// The sound addressed by an optional cone: the cone's own sound, or the
    /// entity's omni / zone sound when `cone` is `None`.
    pub fn sound(&self, cone: Option<ConeId>) -> Option<&SoundSlot> {
        match (&self.kind, cone) {
            (EntityKind::Object(o), Some(id)) => o.cone(id).map(|c| &c.sound),
            (EntityKind::Object(o), None) => o.sound.as_ref(),
            (EntityKind::Zone(z), None) => z.sound.as_ref(),
            _ => None,
        }
    }

    pub fn sound_mut(&mut self, cone: Option<ConeId>) -> Option<&mut SoundSlot> {
        match (&mut self.kind, cone) {
            (EntityKind::Object(o), Some(id)) => o.cone_mut(id).map(|c| &mut c.sound),
            (EntityKind::Object(o), None) => o.sound.as_mut(),
            (EntityKind::Zone(z), None) => z.sound.as_mut(),
            _ => None,
        }
    }

    pub fn is_live_input(&self) -> bool {
        self.as_object().is_some_and(|o| o.live_input.enabled)
    }
}
