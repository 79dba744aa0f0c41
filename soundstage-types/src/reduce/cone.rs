//! Cone edits. A cone only reaches the remote store once its asset upload
//! has completed; edits made before that are applied locally and not queued.

use std::f32::consts::{PI, TAU};

use serde_json::json;

use crate::bounds::{
    ENTITY_GAIN_MAX, ENTITY_GAIN_MIN, GAIN_DRAG_DIVISOR, SPREAD_DRAG_DIVISOR, SPREAD_MAX,
    SPREAD_MIN,
};
use crate::{
    into_fields, ConeId, ConeSource, Entity, EntityPath, FieldUpdates, MutationResult,
    SceneEffect, SoundAsset, SyncIntent,
};

use super::{push_update, swap_sound};

/// A stored angle of exactly zero is read as this before an edit, so the
/// cone direction stays defined and a zero longitude counts as positive.
const ANGLE_EPSILON: f32 = 0.0001;

fn nudge(angle: f32) -> f32 {
    if angle == 0.0 {
        ANGLE_EPSILON
    } else {
        angle
    }
}

/// Bring a latitude back into [-π, π]. Returns the new latitude and whether
/// the longitude must flip sign.
///
/// Crossing a pole reflects: above π → `π − lat`, below −π → `−π − lat`.
/// Two reflections amount to a full turn with no flip, so whole turns are
/// removed first and at most one reflection remains.
pub(crate) fn reflect_latitude(latitude: f32) -> (f32, bool) {
    let latitude = latitude % TAU;
    if latitude > PI {
        (PI - latitude, true)
    } else if latitude < -PI {
        (-PI - latitude, true)
    } else {
        (latitude, false)
    }
}

/// Keep a longitude within [-2π, 2π], dropping whole turns.
pub(crate) fn wrap_longitude(longitude: f32) -> f32 {
    longitude % TAU
}

/// The full remote record of a cone.
pub(crate) fn cone_record(parent: &str, cone: &ConeSource) -> FieldUpdates {
    into_fields(json!({
        "type": "cone",
        "parent": parent,
        "uuid": cone.uuid,
        "sound": cone.sound.asset.name,
        "volume": cone.sound.gain,
        "spread": cone.spread,
        "longitude": cone.longitude,
        "latitude": cone.latitude,
        "isPlaying": cone.sound.is_playing(),
    }))
}

fn geometry_effect(entity: &Entity, cone: &ConeSource) -> SceneEffect {
    SceneEffect::ConeGeometry {
        entity: entity.id,
        cone: cone.id,
        length: cone.length(),
        width: cone.width(),
    }
}

fn pointing_effect(entity: &Entity, cone: &ConeSource) -> SceneEffect {
    SceneEffect::PointCone {
        entity: entity.id,
        cone: cone.id,
        latitude: cone.latitude,
        longitude: cone.longitude,
    }
}

/// Apply `edit` to one cone, then emit `effect` and, once uploaded, a sync of
/// `fields(cone)`.
fn edit_cone(
    entity: &mut Entity,
    cone_id: ConeId,
    edit: impl FnOnce(&mut ConeSource),
    effect: fn(&Entity, &ConeSource) -> SceneEffect,
    fields: impl FnOnce(&ConeSource) -> FieldUpdates,
) -> MutationResult {
    let Some(cone) = entity.as_object_mut().and_then(|o| o.cone_mut(cone_id)) else {
        return MutationResult::none();
    };
    edit(cone);
    let cone = cone.clone();

    let mut result = MutationResult::changed();
    result.push_effect(effect(entity, &cone));
    if cone.upload_complete {
        push_update(&mut result, entity, Some(cone_id), fields(&cone));
    }
    result
}

pub(super) fn volume(entity: &mut Entity, cone_id: ConeId, delta: f32) -> MutationResult {
    let id = entity.id;
    let mut result = edit_cone(
        entity,
        cone_id,
        |c| {
            c.sound.gain =
                (c.sound.gain + delta / GAIN_DRAG_DIVISOR).clamp(ENTITY_GAIN_MIN, ENTITY_GAIN_MAX)
        },
        geometry_effect,
        |c| into_fields(json!({ "volume": c.sound.gain })),
    );
    if let Some(gain) = entity.sound(Some(cone_id)).map(|s| s.gain) {
        result.push_effect(SceneEffect::SetGain {
            entity: id,
            cone: Some(cone_id),
            gain,
        });
    }
    result
}

pub(super) fn spread(entity: &mut Entity, cone_id: ConeId, delta: f32) -> MutationResult {
    edit_cone(
        entity,
        cone_id,
        |c| c.spread = (c.spread + delta / SPREAD_DRAG_DIVISOR).clamp(SPREAD_MIN, SPREAD_MAX),
        geometry_effect,
        |c| into_fields(json!({ "spread": c.spread })),
    )
}

/// Latitude delta in degrees. The drag direction inverts while the longitude
/// is positive so the cone follows the pointer visually.
pub(super) fn latitude(entity: &mut Entity, cone_id: ConeId, delta_deg: f32) -> MutationResult {
    edit_cone(
        entity,
        cone_id,
        |c| {
            let longitude = nudge(c.longitude);
            let mut step = delta_deg.to_radians();
            if longitude > 0.0 {
                step = -step;
            }
            let (lat, flip) = reflect_latitude(nudge(c.latitude) + step);
            c.latitude = lat;
            c.longitude = if flip { -longitude } else { longitude };
        },
        pointing_effect,
        |c| into_fields(json!({ "latitude": c.latitude, "longitude": c.longitude })),
    )
}

pub(super) fn longitude(entity: &mut Entity, cone_id: ConeId, delta_deg: f32) -> MutationResult {
    edit_cone(
        entity,
        cone_id,
        |c| c.longitude = wrap_longitude(nudge(c.longitude) + delta_deg.to_radians()),
        pointing_effect,
        |c| into_fields(json!({ "longitude": c.longitude })),
    )
}

pub(super) fn add(entity: &mut Entity, cone: ConeSource) -> MutationResult {
    let id = entity.id;
    let parent = entity.name.clone();
    let Some(obj) = entity.as_object_mut() else {
        return MutationResult::none();
    };
    if obj.cone(cone.id).is_some() {
        return MutationResult::none();
    }
    obj.interactive_cone = Some(cone.id);
    obj.cones.push(cone.clone());

    let mut result = MutationResult::with_rebuild();
    result.push_effect(SceneEffect::ConeAdded { entity: id, cone: cone.id });
    result.push_effect(geometry_effect(entity, &cone));
    result.push_effect(pointing_effect(entity, &cone));
    if cone.upload_complete {
        result.push_sync(SyncIntent::update(
            EntityPath::Cone {
                object: parent.clone(),
                cone: cone.uuid.clone(),
            },
            cone_record(&parent, &cone),
        ));
    }
    result
}

pub(super) fn make_interactive(entity: &mut Entity, cone_id: ConeId) -> MutationResult {
    let Some(obj) = entity.as_object_mut() else {
        return MutationResult::none();
    };
    if obj.cone(cone_id).is_none() || obj.interactive_cone == Some(cone_id) {
        return MutationResult::none();
    }
    obj.interactive_cone = Some(cone_id);
    MutationResult::with_rebuild()
}

/// Remove a cone. The stored blob is kept so an undo can restore the cone.
pub(super) fn remove(entity: &mut Entity, cone_id: ConeId) -> MutationResult {
    let id = entity.id;
    let parent = entity.name.clone();
    let Some(obj) = entity.as_object_mut() else {
        return MutationResult::none();
    };
    let Some(idx) = obj.cone_index(cone_id) else {
        return MutationResult::none();
    };
    let cone = obj.cones.remove(idx);
    if obj.interactive_cone == Some(cone_id) {
        obj.interactive_cone = obj
            .cones
            .get(idx.saturating_sub(1))
            .or_else(|| obj.cones.first())
            .map(|c| c.id);
    }

    let mut result = MutationResult::with_rebuild();
    result.push_effect(SceneEffect::ConeRemoved { entity: id, cone: cone_id });
    if cone.upload_complete {
        result.push_sync(SyncIntent::update(
            EntityPath::Cone {
                object: parent,
                cone: cone.uuid,
            },
            into_fields(json!({ "sound": null })),
        ));
    }
    result
}

/// The cone's asset is stored; publish its full record.
pub(super) fn uploaded(entity: &mut Entity, cone_id: ConeId) -> MutationResult {
    let parent = entity.name.clone();
    edit_cone(
        entity,
        cone_id,
        |c| c.upload_complete = true,
        geometry_effect,
        |c| cone_record(&parent, c),
    )
}

/// Swap a cone's file. Settings carry over; the new asset must upload again
/// before the cone syncs.
pub(super) fn replace_sound(
    entity: &mut Entity,
    cone_id: ConeId,
    asset: SoundAsset,
    now: f64,
) -> MutationResult {
    let mut result = edit_cone(
        entity,
        cone_id,
        |c| {
            c.sound = swap_sound(Some(&c.sound), asset, now);
            c.upload_complete = false;
        },
        geometry_effect,
        |_| FieldUpdates::new(),
    );
    if result.changed {
        result.rebuild_panel = true;
        result.push_effect(SceneEffect::SoundAttached {
            entity: entity.id,
            cone: Some(cone_id),
        });
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reduce::reduce_action;
    use crate::{
        EditAction, EntityId, FieldTarget, ParamField, SceneState, SoundSlot, Vec3,
    };

    fn setup(uploaded: bool) -> (SceneState, EntityId, ConeId) {
        let mut scene = SceneState::new();
        let obj = scene.add_object("obj1", Vec3::default());
        let cone_id = scene.allocate_cone_id();
        let mut cone = ConeSource::new(
            cone_id,
            "cone-a",
            SoundSlot::new(SoundAsset::new("c.wav", 100, 4.0)),
        );
        cone.upload_complete = uploaded;
        cone.longitude = -0.5;
        reduce_action(&EditAction::AddCone { entity: obj, cone }, &mut scene, 0.0);
        (scene, obj, cone_id)
    }

    fn adjust(
        scene: &mut SceneState,
        obj: EntityId,
        cone: ConeId,
        field: ParamField,
        delta: f32,
    ) -> MutationResult {
        reduce_action(
            &EditAction::Adjust {
                target: FieldTarget::cone(obj, cone, field),
                delta,
            },
            scene,
            0.0,
        )
    }

    fn cone(scene: &SceneState, obj: EntityId, id: ConeId) -> ConeSource {
        scene
            .entity(obj)
            .and_then(|e| e.as_object())
            .and_then(|o| o.cone(id))
            .cloned()
            .unwrap()
    }

    #[test]
    fn latitude_crossing_pi_reflects_and_flips_longitude() {
        let (mut scene, obj, id) = setup(true);
        if let Some(c) = scene.entity_mut(obj).and_then(|e| e.as_object_mut()).and_then(|o| o.cone_mut(id)) {
            c.latitude = 170.0_f32.to_radians();
        }
        adjust(&mut scene, obj, id, ParamField::Latitude, 20.0);
        let c = cone(&scene, obj, id);
        let expected = PI - 190.0_f32.to_radians();
        assert!((c.latitude - expected).abs() < 1e-4, "{}", c.latitude);
        assert!((c.longitude - 0.5).abs() < 1e-6);
        assert!(c.latitude >= -PI && c.latitude <= PI);
    }

    #[test]
    fn latitude_direction_inverts_for_positive_longitude() {
        let (mut scene, obj, id) = setup(true);
        if let Some(c) = scene.entity_mut(obj).and_then(|e| e.as_object_mut()).and_then(|o| o.cone_mut(id)) {
            c.longitude = 1.0;
            c.latitude = 0.5;
        }
        adjust(&mut scene, obj, id, ParamField::Latitude, 10.0);
        let c = cone(&scene, obj, id);
        assert!((c.latitude - (0.5 - 10.0_f32.to_radians())).abs() < 1e-5);
    }

    #[test]
    fn longitude_wraps_at_two_pi() {
        let (mut scene, obj, id) = setup(true);
        adjust(&mut scene, obj, id, ParamField::Longitude, 370.0);
        let c = cone(&scene, obj, id);
        assert!(c.longitude <= TAU && c.longitude >= -TAU);
    }

    #[test]
    fn large_angle_deltas_stay_in_range() {
        let (mut scene, obj, id) = setup(true);
        if let Some(c) = scene.entity_mut(obj).and_then(|e| e.as_object_mut()).and_then(|o| o.cone_mut(id)) {
            c.latitude = -0.3;
            c.longitude = 0.2;
        }
        adjust(&mut scene, obj, id, ParamField::Longitude, 1000.0);
        let c = cone(&scene, obj, id);
        assert!(c.longitude <= TAU && c.longitude >= -TAU, "{}", c.longitude);
        let expected = (0.2 + 1000.0_f32.to_radians()) - 2.0 * TAU;
        assert!((c.longitude - expected).abs() < 1e-4, "{}", c.longitude);

        adjust(&mut scene, obj, id, ParamField::Latitude, -1000.0);
        let c = cone(&scene, obj, id);
        assert!(c.latitude <= PI && c.latitude >= -PI, "{}", c.latitude);
        assert!(c.longitude <= TAU && c.longitude >= -TAU, "{}", c.longitude);

        adjust(&mut scene, obj, id, ParamField::Latitude, 100_000.0);
        let c = cone(&scene, obj, id);
        assert!(c.latitude <= PI && c.latitude >= -PI, "{}", c.latitude);
    }

    #[test]
    fn pole_crossings_fold_whole_turns() {
        // 450° reflects twice: back to 90° with the longitude sign kept.
        let (lat, flip) = reflect_latitude(450.0_f32.to_radians());
        assert!(!flip);
        assert!((lat - 90.0_f32.to_radians()).abs() < 1e-4, "{}", lat);
        // 570° reflects three times and ends at −30°, flipped.
        let (lat, flip) = reflect_latitude(570.0_f32.to_radians());
        assert!(flip);
        assert!((lat + 30.0_f32.to_radians()).abs() < 1e-4, "{}", lat);
    }

    #[test]
    fn zero_longitude_counts_as_positive() {
        let (mut scene, obj, id) = setup(true);
        if let Some(c) = scene.entity_mut(obj).and_then(|e| e.as_object_mut()).and_then(|o| o.cone_mut(id)) {
            c.longitude = 0.0;
            c.latitude = 0.5;
        }
        adjust(&mut scene, obj, id, ParamField::Latitude, 10.0);
        let c = cone(&scene, obj, id);
        assert!((c.latitude - (0.5 - 10.0_f32.to_radians())).abs() < 1e-5);
        assert_eq!(c.longitude, ANGLE_EPSILON);
    }

    #[test]
    fn zero_latitude_starts_from_epsilon() {
        let (mut scene, obj, id) = setup(true);
        if let Some(c) = scene.entity_mut(obj).and_then(|e| e.as_object_mut()).and_then(|o| o.cone_mut(id)) {
            c.latitude = 0.0;
        }
        adjust(&mut scene, obj, id, ParamField::Latitude, 10.0);
        let c = cone(&scene, obj, id);
        assert!((c.latitude - (ANGLE_EPSILON + 10.0_f32.to_radians())).abs() < 1e-6);
    }

    #[test]
    fn spread_clamps() {
        let (mut scene, obj, id) = setup(true);
        adjust(&mut scene, obj, id, ParamField::Spread, -1000.0);
        assert_eq!(cone(&scene, obj, id).spread, SPREAD_MIN);
        adjust(&mut scene, obj, id, ParamField::Spread, 1000.0);
        assert_eq!(cone(&scene, obj, id).spread, SPREAD_MAX);
    }

    #[test]
    fn edits_during_upload_stay_local() {
        let (mut scene, obj, id) = setup(false);
        let result = adjust(&mut scene, obj, id, ParamField::Volume, 10.0);
        assert!(result.changed);
        assert!(result.sync.is_empty());
        assert!((cone(&scene, obj, id).sound.gain - 1.2).abs() < 1e-5);
    }

    #[test]
    fn upload_completion_publishes_full_record() {
        let (mut scene, obj, id) = setup(false);
        let result = reduce_action(&EditAction::ConeUploaded { entity: obj, cone: id }, &mut scene, 0.0);
        match &result.sync[..] {
            [SyncIntent::Update { path, fields }] => {
                assert_eq!(
                    path,
                    &EntityPath::Cone { object: "obj1".into(), cone: "cone-a".into() }
                );
                for key in ["type", "parent", "uuid", "sound", "volume", "spread", "longitude", "latitude", "isPlaying"] {
                    assert!(fields.contains_key(key), "missing {}", key);
                }
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn remove_moves_interactive_cone_back() {
        let (mut scene, obj, first) = setup(true);
        let second = scene.allocate_cone_id();
        let c2 = ConeSource::new(second, "cone-b", SoundSlot::new(SoundAsset::new("d.wav", 1, 1.0)));
        reduce_action(&EditAction::AddCone { entity: obj, cone: c2 }, &mut scene, 0.0);
        let result = reduce_action(&EditAction::RemoveCone { entity: obj, cone: second }, &mut scene, 0.0);
        assert!(result.rebuild_panel);
        let o = scene.entity(obj).unwrap().as_object().unwrap();
        assert_eq!(o.interactive_cone, Some(first));
        assert_eq!(o.cones.len(), 1);
    }

    #[test]
    fn remove_syncs_sound_null_once_uploaded() {
        let (mut scene, obj, id) = setup(true);
        let result = reduce_action(&EditAction::RemoveCone { entity: obj, cone: id }, &mut scene, 0.0);
        match &result.sync[..] {
            [SyncIntent::Update { fields, .. }] => assert!(fields["sound"].is_null()),
            other => panic!("unexpected {:?}", other),
        }
    }
}
