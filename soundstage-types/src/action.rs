//! Edit actions and mutation results.
//!
//! An `EditAction` is the only way scene state changes. Reducers turn one into
//! a `MutationResult` listing the scene-engine effects to apply and the remote
//! writes to issue.

use serde::{Deserialize, Serialize};

use crate::{
    ConeId, ConeSource, EntityId, FieldTarget, SoundAsset, SyncIntent, TransportMode, Vec3,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EditAction {
    /// Apply a gesture delta to one attribute.
    Adjust { target: FieldTarget, delta: f32 },
    EndScrub {
        entity: EntityId,
        cone: Option<ConeId>,
    },
    TogglePlayback {
        entity: EntityId,
        cone: Option<ConeId>,
    },
    /// Give back the movement speed stashed by a manual phase edit.
    RestoreMovementSpeed(EntityId),
    AddTrajectory {
        entity: EntityId,
        points: Vec<Vec3>,
        speed: f32,
    },
    RemoveTrajectory(EntityId),
    AddCone {
        entity: EntityId,
        cone: ConeSource,
    },
    RemoveCone {
        entity: EntityId,
        cone: ConeId,
    },
    /// Mark a cone's asset as stored remotely and publish its full record.
    ConeUploaded {
        entity: EntityId,
        cone: ConeId,
    },
    /// Attach (or swap) the file sound of an object, cone or zone.
    AttachSound {
        entity: EntityId,
        cone: Option<ConeId>,
        asset: SoundAsset,
    },
    DetachSound {
        entity: EntityId,
        cone: Option<ConeId>,
    },
    /// Enter live-input mode, stashing the file sound.
    EnableLiveInput(EntityId),
    /// Record the device now feeding an object's live input.
    SelectInputDevice {
        entity: EntityId,
        device: Option<String>,
    },
    /// Leave live-input mode and restore the stashed file sound.
    DisableLiveInput(EntityId),
    ToggleLiveInputMute(EntityId),
    /// Make one cone of an object the interactive (visible) one.
    SetInteractiveCone {
        entity: EntityId,
        cone: ConeId,
    },
    /// An object or zone starts loading its sound; remote writes of its
    /// volume, rotation and scale are held back until `FinishSoundLoad`.
    BeginSoundLoad(EntityId),
    /// The load finished (or failed); publish the entity's full record.
    FinishSoundLoad(EntityId),
    SetEditingObject(bool),
    /// Phase written by another editor; taken as-is within [0, 1].
    ApplyRemotePhase { entity: EntityId, phase: f32 },
}

impl EditAction {
    pub fn target_entity(&self) -> Option<EntityId> {
        match self {
            EditAction::Adjust { target, .. } => Some(target.entity),
            EditAction::EndScrub { entity, .. }
            | EditAction::TogglePlayback { entity, .. }
            | EditAction::AddTrajectory { entity, .. }
            | EditAction::AddCone { entity, .. }
            | EditAction::RemoveCone { entity, .. }
            | EditAction::ConeUploaded { entity, .. }
            | EditAction::AttachSound { entity, .. }
            | EditAction::DetachSound { entity, .. }
            | EditAction::SelectInputDevice { entity, .. }
            | EditAction::SetInteractiveCone { entity, .. }
            | EditAction::ApplyRemotePhase { entity, .. } => Some(*entity),
            EditAction::RestoreMovementSpeed(entity)
            | EditAction::RemoveTrajectory(entity)
            | EditAction::EnableLiveInput(entity)
            | EditAction::DisableLiveInput(entity)
            | EditAction::ToggleLiveInputMute(entity)
            | EditAction::BeginSoundLoad(entity)
            | EditAction::FinishSoundLoad(entity) => Some(*entity),
            EditAction::SetEditingObject(_) => None,
        }
    }

    /// Actions that push a record onto the undo stack before applying.
    pub fn undo_label(&self) -> Option<&'static str> {
        match self {
            EditAction::AddCone { .. } => Some("AddCone"),
            EditAction::RemoveCone { .. } => Some("RemoveCone"),
            EditAction::RemoveTrajectory(_) => Some("RemoveSoundTrajectory"),
            _ => None,
        }
    }
}

/// Instructions for the rendering/audio engines, produced by reducers and
/// applied by the session after dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SceneEffect {
    MoveEntity {
        entity: EntityId,
        position: Vec3,
    },
    RotateEntity {
        entity: EntityId,
        rotation: f32,
    },
    RecomputeRadius {
        entity: EntityId,
        radius: f32,
    },
    ConeGeometry {
        entity: EntityId,
        cone: ConeId,
        length: f32,
        width: f32,
    },
    PointCone {
        entity: EntityId,
        cone: ConeId,
        latitude: f32,
        longitude: f32,
    },
    ZoneOpacity {
        entity: EntityId,
        opacity: f32,
    },
    ZoneScale {
        entity: EntityId,
        scale: f32,
    },
    TrajectoryChanged(EntityId),
    MovementTiming {
        entity: EntityId,
        speed: f32,
    },
    SetGain {
        entity: EntityId,
        cone: Option<ConeId>,
        gain: f32,
    },
    Transport {
        entity: EntityId,
        cone: Option<ConeId>,
        mode: TransportMode,
        time: f64,
    },
    ConeAdded {
        entity: EntityId,
        cone: ConeId,
    },
    ConeRemoved {
        entity: EntityId,
        cone: ConeId,
    },
    SoundAttached {
        entity: EntityId,
        cone: Option<ConeId>,
    },
    SoundCleared {
        entity: EntityId,
        cone: Option<ConeId>,
    },
}

/// Outcome of applying one `EditAction`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MutationResult {
    /// False when the action had nothing to act on.
    pub changed: bool,
    pub effects: Vec<SceneEffect>,
    pub sync: Vec<SyncIntent>,
    /// The panel structure changed and must be rebuilt rather than refreshed.
    pub rebuild_panel: bool,
}

impl MutationResult {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn changed() -> Self {
        Self {
            changed: true,
            ..Self::default()
        }
    }

    pub fn with_rebuild() -> Self {
        Self {
            changed: true,
            rebuild_panel: true,
            ..Self::default()
        }
    }

    pub fn push_effect(&mut self, effect: SceneEffect) {
        self.effects.push(effect);
    }

    pub fn push_sync(&mut self, intent: SyncIntent) {
        self.sync.push(intent);
    }

    pub fn merge(&mut self, other: MutationResult) {
        self.changed |= other.changed;
        self.effects.extend(other.effects);
        self.sync.extend(other.sync);
        self.rebuild_panel |= other.rebuild_panel;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ParamField;

    #[test]
    fn undo_labels_cover_structural_edits() {
        let e = EntityId::new(0);
        assert_eq!(EditAction::RemoveTrajectory(e).undo_label(), Some("RemoveSoundTrajectory"));
        assert_eq!(
            EditAction::RemoveCone { entity: e, cone: ConeId::new(1) }.undo_label(),
            Some("RemoveCone")
        );
        let adjust = EditAction::Adjust {
            target: FieldTarget::new(e, ParamField::Volume),
            delta: 1.0,
        };
        assert_eq!(adjust.undo_label(), None);
        assert_eq!(adjust.target_entity(), Some(e));
    }

    #[test]
    fn merge_accumulates() {
        let mut a = MutationResult::none();
        let mut b = MutationResult::with_rebuild();
        b.push_effect(SceneEffect::TrajectoryChanged(EntityId::new(3)));
        a.merge(b);
        assert!(a.changed && a.rebuild_panel);
        assert_eq!(a.effects.len(), 1);
    }

    #[test]
    fn actions_serialize_for_the_journal() {
        let action = EditAction::SelectInputDevice {
            entity: EntityId::new(2),
            device: Some("mic_1".into()),
        };
        let json = serde_json::to_string(&action).unwrap();
        let back: EditAction = serde_json::from_str(&json).unwrap();
        assert_eq!(back, action);
    }
}
