//! Scene model: entities, their sounds and trajectories, and the transport
//! state machine each sound carries.

pub mod entity;
pub mod playback;
pub mod scene;
pub mod trajectory;

pub use entity::{
    radius_for_gain, ConeSource, Entity, EntityKind, EntityKindTag, HeadListener,
    LiveInputBinding, ObjectSource, SoundAsset, SoundSlot, ZoneSource,
};
pub use playback::{PlaybackState, TransportMode};
pub use scene::SceneState;
pub use trajectory::{substitute_phase, Trajectory};
