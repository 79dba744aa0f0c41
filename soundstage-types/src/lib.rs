//! # soundstage-types
//!
//! Shared type definitions for the Soundstage scene editor.
//! This crate holds the serializable scene model, parameter descriptors,
//! edit actions and the pure reducers that apply them. It is used by
//! soundstage-core and soundstage-net.

pub mod action;
pub mod bounds;
pub mod descriptor;
pub mod dispatch;
mod geometry;
pub mod reduce;
pub mod state;
pub mod sync;

pub use action::*;
pub use descriptor::{
    format_number, format_time, AdditionalAction, ButtonAction, ChoiceOption, ClampPolicy,
    DescriptorKind, DisplayValue, FieldTarget, ParamField, ParameterDescriptor,
};
pub use dispatch::Dispatcher;
pub use geometry::{wrap_rotation, Axis, Vec3};
pub use sync::{
    into_fields, AssetFolder, AssetPath, EntityPath, FieldUpdates, OfflineSink, SyncIntent, SyncSink,
};

// Re-export all state types at crate root for convenience
pub use state::*;

/// Unique identifier for a placeable scene entity (object, zone or head).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct EntityId(u32);

impl EntityId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }
    pub fn get(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a cone. Cone IDs are allocated scene-wide so a cone
/// keeps its identity when the panel is rebuilt.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct ConeId(u32);

impl ConeId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }
    pub fn get(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for ConeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
