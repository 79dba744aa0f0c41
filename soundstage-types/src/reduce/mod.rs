//! Pure scene reducers.
//!
//! Every edit to the scene goes through `reduce_action`. Each attribute has
//! one mutation function that applies the delta, clamps or wraps it, and
//! cascades to dependent state (trajectory points, cone geometry, zone
//! opacity).
//!
//! Reducers mutate `SceneState` only. They do NOT:
//! - Push undo snapshots
//! - Talk to the rendering or audio engines (they emit `SceneEffect`s)
//! - Write to the remote store (they emit `SyncIntent`s; the sink gates them)

mod cone;
mod live_input;
mod position;
mod sound;
mod trajectory;
mod transport;
mod zone;

pub use sound::swap_sound;

use crate::{
    ConeId, EditAction, Entity, EntityKind, EntityPath, FieldUpdates, MutationResult, ParamField,
    SceneState, SyncIntent,
};

/// Apply one edit. `now` is wall-clock seconds, used by transport edits.
pub fn reduce_action(action: &EditAction, scene: &mut SceneState, now: f64) -> MutationResult {
    match action {
        EditAction::Adjust { target, delta } => {
            let delta = *delta;
            if !delta.is_finite() {
                return MutationResult::none();
            }
            let Some(entity) = scene.entity_mut(target.entity) else {
                return MutationResult::none();
            };
            match (target.field, target.cone) {
                (ParamField::PositionX | ParamField::PositionZ | ParamField::Altitude, _) => {
                    position::translate(entity, target.field, delta)
                }
                (ParamField::Rotation, _) => position::rotate(entity, delta),
                (ParamField::Volume, Some(cone)) => cone::volume(entity, cone, delta),
                (ParamField::Volume, None) => match entity.kind {
                    EntityKind::Zone(_) => zone::volume(entity, delta),
                    _ => sound::volume(entity, delta),
                },
                (ParamField::Spread, Some(cone)) => cone::spread(entity, cone, delta),
                (ParamField::Latitude, Some(cone)) => cone::latitude(entity, cone, delta),
                (ParamField::Longitude, Some(cone)) => cone::longitude(entity, cone, delta),
                (ParamField::ZoneScale, None) => zone::scale(entity, delta),
                (ParamField::TrajectoryPhase, None) => trajectory::phase(entity, delta),
                (ParamField::MovementSpeed, None) => trajectory::speed(entity, delta),
                (ParamField::PlaybackTime, cone) => transport::scrub(entity, cone, delta, now),
                _ => MutationResult::none(),
            }
        }
        EditAction::EndScrub { entity, cone } => match scene.entity_mut(*entity) {
            Some(e) => transport::end_scrub(e, *cone, now),
            None => MutationResult::none(),
        },
        EditAction::TogglePlayback { entity, cone } => match scene.entity_mut(*entity) {
            Some(e) => transport::toggle(e, *cone, now),
            None => MutationResult::none(),
        },
        EditAction::RestoreMovementSpeed(entity) => match scene.entity_mut(*entity) {
            Some(e) => trajectory::restore_speed(e),
            None => MutationResult::none(),
        },
        EditAction::AddTrajectory {
            entity,
            points,
            speed,
        } => match scene.entity_mut(*entity) {
            Some(e) => trajectory::add(e, points, *speed),
            None => MutationResult::none(),
        },
        EditAction::RemoveTrajectory(entity) => match scene.entity_mut(*entity) {
            Some(e) => trajectory::remove(e),
            None => MutationResult::none(),
        },
        EditAction::AddCone { entity, cone } => match scene.entity_mut(*entity) {
            Some(e) => cone::add(e, cone.clone()),
            None => MutationResult::none(),
        },
        EditAction::RemoveCone { entity, cone } => match scene.entity_mut(*entity) {
            Some(e) => cone::remove(e, *cone),
            None => MutationResult::none(),
        },
        EditAction::ConeUploaded { entity, cone } => match scene.entity_mut(*entity) {
            Some(e) => cone::uploaded(e, *cone),
            None => MutationResult::none(),
        },
        EditAction::AttachSound {
            entity,
            cone,
            asset,
        } => {
            let muted = scene.muted;
            match scene.entity_mut(*entity) {
                Some(e) => sound::attach(e, *cone, asset.clone(), muted, now),
                None => MutationResult::none(),
            }
        }
        EditAction::DetachSound { entity, cone } => match scene.entity_mut(*entity) {
            Some(e) => sound::detach(e, *cone),
            None => MutationResult::none(),
        },
        EditAction::EnableLiveInput(entity) => match scene.entity_mut(*entity) {
            Some(e) => live_input::enable(e, now),
            None => MutationResult::none(),
        },
        EditAction::SelectInputDevice { entity, device } => {
            let muted = scene.muted;
            match scene.entity_mut(*entity) {
                Some(e) => live_input::select_device(e, device.clone(), muted),
                None => MutationResult::none(),
            }
        }
        EditAction::DisableLiveInput(entity) => match scene.entity_mut(*entity) {
            Some(e) => live_input::disable(e, now),
            None => MutationResult::none(),
        },
        EditAction::ToggleLiveInputMute(entity) => match scene.entity_mut(*entity) {
            Some(e) => live_input::toggle_mute(e),
            None => MutationResult::none(),
        },
        EditAction::SetInteractiveCone { entity, cone } => match scene.entity_mut(*entity) {
            Some(e) => cone::make_interactive(e, *cone),
            None => MutationResult::none(),
        },
        EditAction::BeginSoundLoad(entity) => match scene.entity_mut(*entity) {
            Some(e) => sound::begin_load(e),
            None => MutationResult::none(),
        },
        EditAction::FinishSoundLoad(entity) => match scene.entity_mut(*entity) {
            Some(e) => sound::finish_load(e),
            None => MutationResult::none(),
        },
        EditAction::SetEditingObject(on) => {
            if scene.editing_object == *on {
                return MutationResult::none();
            }
            scene.editing_object = *on;
            MutationResult::with_rebuild()
        }
        EditAction::ApplyRemotePhase { entity, phase } => match scene.entity_mut(*entity) {
            Some(e) => trajectory::apply_remote_phase(e, *phase),
            None => MutationResult::none(),
        },
    }
}

/// Remote record path of an entity, or of one of its cones.
pub fn entity_path(entity: &Entity, cone: Option<ConeId>) -> Option<EntityPath> {
    match (&entity.kind, cone) {
        (EntityKind::Object(o), Some(id)) => o.cone(id).map(|c| EntityPath::Cone {
            object: entity.name.clone(),
            cone: c.uuid.clone(),
        }),
        (EntityKind::Object(_), None) => Some(EntityPath::Object(entity.name.clone())),
        (EntityKind::Zone(_), None) => Some(EntityPath::Zone(entity.name.clone())),
        (EntityKind::Head(_), None) => Some(EntityPath::Listener),
        _ => None,
    }
}

fn push_update(result: &mut MutationResult, entity: &Entity, cone: Option<ConeId>, fields: FieldUpdates) {
    if let Some(path) = entity_path(entity, cone) {
        result.push_sync(SyncIntent::update(path, fields));
    }
}
