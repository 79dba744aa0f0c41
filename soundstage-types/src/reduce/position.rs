use serde_json::json;

use crate::bounds::{ALTITUDE_MAX, ALTITUDE_MIN};
use crate::{
    into_fields, wrap_rotation, Axis, Entity, EntityKind, MutationResult, ParamField, SceneEffect,
};

use super::push_update;

fn points_json(entity: &Entity) -> Option<serde_json::Value> {
    entity
        .trajectory()
        .map(|t| serde_json::Value::Array(t.points.iter().map(|p| p.to_json()).collect()))
}

/// Move an entity along one axis. Trajectory points follow: X/Z shift by the
/// same delta, altitude is clamped per point.
pub(super) fn translate(entity: &mut Entity, field: ParamField, delta: f32) -> MutationResult {
    let axis = match field {
        ParamField::PositionX => Axis::X,
        ParamField::PositionZ => Axis::Z,
        ParamField::Altitude => Axis::Y,
        _ => return MutationResult::none(),
    };
    let before = entity.position();

    {
        let component = entity.position_mut().component_mut(axis);
        *component = match axis {
            Axis::Y => (*component + delta).clamp(ALTITUDE_MIN, ALTITUDE_MAX),
            _ => *component + delta,
        };
    }

    let mut moved_points = false;
    if let Some(trajectory) = entity.trajectory_mut() {
        for point in trajectory.points.iter_mut() {
            let component = point.component_mut(axis);
            let next = match axis {
                Axis::Y => (*component + delta).clamp(ALTITUDE_MIN, ALTITUDE_MAX),
                _ => *component + delta,
            };
            if next != *component {
                *component = next;
                moved_points = true;
            }
        }
    }

    let position = entity.position();
    if position == before && !moved_points {
        return MutationResult::none();
    }

    let mut result = MutationResult::changed();
    result.push_effect(SceneEffect::MoveEntity {
        entity: entity.id,
        position,
    });
    if moved_points {
        result.push_effect(SceneEffect::TrajectoryChanged(entity.id));
    }

    let mut fields = into_fields(json!({ "position": position.to_json() }));
    if let Some(points) = points_json(entity) {
        fields.insert("trajectory".into(), points);
    }
    push_update(&mut result, entity, None, fields);
    result
}

/// Rotate a zone or the head by `delta_deg` degrees, wrapped into (-π, π].
pub(super) fn rotate(entity: &mut Entity, delta_deg: f32) -> MutationResult {
    let adding_sound = matches!(&entity.kind, EntityKind::Zone(z) if z.adding_sound);
    let Some(rotation) = entity.rotation_mut() else {
        return MutationResult::none();
    };
    *rotation = wrap_rotation(*rotation + delta_deg.to_radians());
    let rotation = *rotation;

    let mut result = MutationResult::changed();
    result.push_effect(SceneEffect::RotateEntity {
        entity: entity.id,
        rotation,
    });
    if !adding_sound {
        push_update(&mut result, entity, None, into_fields(json!({ "rotation": rotation })));
    }
    result
}
