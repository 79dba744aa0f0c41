use serde_json::json;

use crate::bounds::{
    zone_opacity, GAIN_DRAG_DIVISOR, SCALE_DRAG_DIVISOR, ZONE_GAIN_MAX, ZONE_GAIN_MIN,
    ZONE_SCALE_MAX, ZONE_SCALE_MIN,
};
use crate::{into_fields, Entity, MutationResult, SceneEffect};

use super::push_update;

pub(super) fn volume(entity: &mut Entity, delta: f32) -> MutationResult {
    let id = entity.id;
    let Some(zone) = entity.as_zone_mut() else {
        return MutationResult::none();
    };
    let Some(sound) = zone.sound.as_mut() else {
        return MutationResult::none();
    };
    sound.gain = (sound.gain + delta / GAIN_DRAG_DIVISOR).clamp(ZONE_GAIN_MIN, ZONE_GAIN_MAX);
    let gain = sound.gain;
    zone.opacity = zone_opacity(gain);

    let mut result = MutationResult::changed();
    result.push_effect(SceneEffect::SetGain {
        entity: id,
        cone: None,
        gain,
    });
    result.push_effect(SceneEffect::ZoneOpacity {
        entity: id,
        opacity: zone.opacity,
    });
    if !zone.adding_sound {
        push_update(&mut result, entity, None, into_fields(json!({ "volume": gain })));
    }
    result
}

fn round2(v: f32) -> f32 {
    (v * 100.0).round() / 100.0
}

/// Scale the zone. The previous scale travels with the update so other
/// editors can reverse the change; while the zone is still adding its sound
/// it is cached locally instead.
pub(super) fn scale(entity: &mut Entity, delta: f32) -> MutationResult {
    let id = entity.id;
    let Some(zone) = entity.as_zone_mut() else {
        return MutationResult::none();
    };
    let prev = zone.scale;
    let next = round2((prev + delta / SCALE_DRAG_DIVISOR).clamp(ZONE_SCALE_MIN, ZONE_SCALE_MAX));
    if next == prev {
        return MutationResult::none();
    }
    zone.scale = next;
    zone.prev_scale = prev;

    let mut result = MutationResult::changed();
    result.push_effect(SceneEffect::ZoneScale {
        entity: id,
        scale: next,
    });
    if zone.adding_sound {
        zone.cached_prev_scale = Some(prev);
    } else {
        push_update(
            &mut result,
            entity,
            None,
            into_fields(json!({ "scale": next, "prev": prev })),
        );
    }
    result
}

#[cfg(test)]
mod tests {
    use crate::reduce::reduce_action;
    use crate::{
        EditAction, EntityId, FieldTarget, MutationResult, ParamField, SceneState, SoundAsset,
        SyncIntent, Vec3,
    };

    fn setup() -> (SceneState, EntityId) {
        let mut scene = SceneState::new();
        scene.muted = true;
        let z = scene.add_zone("zone1", Vec3::default());
        reduce_action(
            &EditAction::AttachSound {
                entity: z,
                cone: None,
                asset: SoundAsset::new("amb.wav", 1, 10.0),
            },
            &mut scene,
            0.0,
        );
        (scene, z)
    }

    fn adjust(scene: &mut SceneState, z: EntityId, field: ParamField, delta: f32) -> MutationResult {
        reduce_action(
            &EditAction::Adjust {
                target: FieldTarget::new(z, field),
                delta,
            },
            scene,
            0.0,
        )
    }

    #[test]
    fn zone_volume_reaches_zero_and_maps_opacity() {
        let (mut scene, z) = setup();
        adjust(&mut scene, z, ParamField::Volume, -1000.0);
        let zone = scene.entity(z).unwrap().as_zone().unwrap();
        assert_eq!(zone.sound.as_ref().unwrap().gain, 0.0);
        assert!((zone.opacity - 0.05).abs() < 1e-6);

        adjust(&mut scene, z, ParamField::Volume, 1000.0);
        let zone = scene.entity(z).unwrap().as_zone().unwrap();
        assert_eq!(zone.sound.as_ref().unwrap().gain, 2.0);
        assert!((zone.opacity - 0.35).abs() < 1e-6);
    }

    #[test]
    fn scale_syncs_previous_value() {
        let (mut scene, z) = setup();
        let result = adjust(&mut scene, z, ParamField::ZoneScale, 10.0);
        let zone = scene.entity(z).unwrap().as_zone().unwrap();
        assert!((zone.scale - 1.2).abs() < 1e-6);
        match &result.sync[..] {
            [SyncIntent::Update { fields, .. }] => {
                assert_eq!(fields["prev"], serde_json::json!(1.0));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn scale_is_cached_while_adding_sound() {
        let (mut scene, z) = setup();
        scene.entity_mut(z).unwrap().as_zone_mut().unwrap().adding_sound = true;
        let result = adjust(&mut scene, z, ParamField::ZoneScale, -10.0);
        assert!(result.sync.is_empty());
        let zone = scene.entity(z).unwrap().as_zone().unwrap();
        assert_eq!(zone.cached_prev_scale, Some(1.0));
        assert!((zone.scale - 0.8).abs() < 1e-6);
    }

    #[test]
    fn scale_clamps() {
        let (mut scene, z) = setup();
        adjust(&mut scene, z, ParamField::ZoneScale, 10_000.0);
        assert_eq!(scene.entity(z).unwrap().as_zone().unwrap().scale, 2.0);
        adjust(&mut scene, z, ParamField::ZoneScale, -10_000.0);
        assert_eq!(scene.entity(z).unwrap().as_zone().unwrap().scale, 0.5);
    }
}
