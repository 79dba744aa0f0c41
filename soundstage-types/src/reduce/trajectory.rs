use serde_json::json;

use crate::bounds::{PHASE_DRAG_DIVISOR, SPEED_DRAG_DIVISOR, SPEED_MAX, SPEED_MIN};
use crate::{
    into_fields, substitute_phase, Entity, MutationResult, SceneEffect, Trajectory, Vec3,
};

use super::push_update;

fn points_json(points: &[Vec3]) -> serde_json::Value {
    serde_json::Value::Array(points.iter().map(|p| p.to_json()).collect())
}

/// Manual phase edit. A moving trajectory is stopped first; its speed is
/// stashed for `restore_speed`.
pub(super) fn phase(entity: &mut Entity, delta: f32) -> MutationResult {
    let id = entity.id;
    let Some(trajectory) = entity.trajectory_mut() else {
        return MutationResult::none();
    };

    let mut result = MutationResult::changed();
    let mut fields = serde_json::Map::new();
    if trajectory.is_moving() {
        trajectory.saved_speed = Some(trajectory.speed);
        trajectory.speed = 0.0;
        result.push_effect(SceneEffect::MovementTiming {
            entity: id,
            speed: 0.0,
        });
        fields.insert("movementSpeed".into(), json!(0.0));
    }
    trajectory.phase =
        substitute_phase((trajectory.phase + delta / PHASE_DRAG_DIVISOR).clamp(0.0, 1.0));
    fields.insert("trajectoryPosition".into(), json!(trajectory.phase));

    result.push_effect(SceneEffect::TrajectoryChanged(id));
    push_update(&mut result, entity, None, fields);
    result
}

pub(super) fn speed(entity: &mut Entity, delta: f32) -> MutationResult {
    let id = entity.id;
    let Some(trajectory) = entity.trajectory_mut() else {
        return MutationResult::none();
    };
    trajectory.speed = (trajectory.speed + delta / SPEED_DRAG_DIVISOR).clamp(SPEED_MIN, SPEED_MAX);
    trajectory.saved_speed = None;
    let speed = trajectory.speed;

    let mut result = MutationResult::changed();
    result.push_effect(SceneEffect::MovementTiming { entity: id, speed });
    push_update(&mut result, entity, None, into_fields(json!({ "movementSpeed": speed })));
    result
}

pub(super) fn restore_speed(entity: &mut Entity) -> MutationResult {
    let id = entity.id;
    let Some(trajectory) = entity.trajectory_mut() else {
        return MutationResult::none();
    };
    let Some(speed) = trajectory.saved_speed.take() else {
        return MutationResult::none();
    };
    trajectory.speed = speed;

    let mut result = MutationResult::changed();
    result.push_effect(SceneEffect::MovementTiming { entity: id, speed });
    push_update(&mut result, entity, None, into_fields(json!({ "movementSpeed": speed })));
    result
}

pub(super) fn add(entity: &mut Entity, points: &[Vec3], speed: f32) -> MutationResult {
    let id = entity.id;
    let Some(slot) = entity.trajectory_slot() else {
        return MutationResult::none();
    };
    if slot.is_some() || points.is_empty() {
        return MutationResult::none();
    }
    let speed = speed.clamp(SPEED_MIN, SPEED_MAX);
    *slot = Some(Trajectory::new(points.to_vec(), speed));

    let mut result = MutationResult::with_rebuild();
    result.push_effect(SceneEffect::TrajectoryChanged(id));
    result.push_effect(SceneEffect::MovementTiming { entity: id, speed });
    push_update(
        &mut result,
        entity,
        None,
        into_fields(json!({ "trajectory": points_json(points), "movementSpeed": speed })),
    );
    result
}

pub(super) fn remove(entity: &mut Entity) -> MutationResult {
    let id = entity.id;
    let Some(slot) = entity.trajectory_slot() else {
        return MutationResult::none();
    };
    if slot.take().is_none() {
        return MutationResult::none();
    }

    let mut result = MutationResult::with_rebuild();
    result.push_effect(SceneEffect::TrajectoryChanged(id));
    let position = entity.position();
    push_update(
        &mut result,
        entity,
        None,
        into_fields(json!({ "position": position.to_json(), "trajectory": null })),
    );
    result
}

/// Phase written by another editor. Clamped to [0, 1], not substituted.
pub(super) fn apply_remote_phase(entity: &mut Entity, phase: f32) -> MutationResult {
    let id = entity.id;
    let Some(trajectory) = entity.trajectory_mut() else {
        return MutationResult::none();
    };
    if !phase.is_finite() {
        return MutationResult::none();
    }
    trajectory.phase = phase.clamp(0.0, 1.0);

    let mut result = MutationResult::changed();
    result.push_effect(SceneEffect::TrajectoryChanged(id));
    result
}
