use serde_json::json;

use crate::bounds::{zone_opacity, ENTITY_GAIN_MAX, ENTITY_GAIN_MIN, GAIN_DRAG_DIVISOR};
use crate::{
    into_fields, radius_for_gain, AssetPath, ConeId, Entity, EntityKind, MutationResult,
    SceneEffect, SoundAsset, SoundSlot, SyncIntent,
};

use super::{cone, push_update};

/// Build the slot for a newly attached asset. Gain and distance settings carry
/// over from `previous`; playback restarts only if `previous` was playing.
pub fn swap_sound(previous: Option<&SoundSlot>, asset: SoundAsset, now: f64) -> SoundSlot {
    let mut slot = SoundSlot::new(asset);
    if let Some(prev) = previous {
        slot.gain = prev.gain;
        slot.ref_distance = prev.ref_distance;
        slot.rolloff = prev.rolloff;
        if prev.is_playing() {
            slot.user_wants_playing = true;
            slot.playback.play(now);
        }
    }
    slot
}

/// Object omni volume, or the live-input volume while live input is on.
pub(super) fn volume(entity: &mut Entity, delta: f32) -> MutationResult {
    let id = entity.id;
    let Some(obj) = entity.as_object_mut() else {
        return MutationResult::none();
    };
    let step = delta / GAIN_DRAG_DIVISOR;

    let mut result = MutationResult::changed();
    let gain = if obj.live_input.enabled {
        let gain = (obj.live_input.volume + step).clamp(ENTITY_GAIN_MIN, ENTITY_GAIN_MAX);
        obj.live_input.volume = gain;
        let audible = if obj.live_input.muted { 0.0 } else { gain };
        result.push_effect(SceneEffect::SetGain {
            entity: id,
            cone: None,
            gain: audible,
        });
        gain
    } else {
        let Some(sound) = obj.sound.as_mut() else {
            return MutationResult::none();
        };
        sound.gain = (sound.gain + step).clamp(ENTITY_GAIN_MIN, ENTITY_GAIN_MAX);
        result.push_effect(SceneEffect::SetGain {
            entity: id,
            cone: None,
            gain: sound.gain,
        });
        sound.gain
    };
    obj.radius = radius_for_gain(gain);
    result.push_effect(SceneEffect::RecomputeRadius {
        entity: id,
        radius: obj.radius,
    });

    if !obj.adding_sound {
        push_update(&mut result, entity, None, into_fields(json!({ "volume": gain })));
    }
    result
}

pub(super) fn attach(
    entity: &mut Entity,
    cone: Option<ConeId>,
    asset: SoundAsset,
    muted: bool,
    now: f64,
) -> MutationResult {
    if let Some(cone_id) = cone {
        return cone::replace_sound(entity, cone_id, asset, now);
    }
    let id = entity.id;
    let mut result = MutationResult::with_rebuild();
    let record = json!({ "sound": asset.name.clone() });

    let (gain, playing, adding_sound) = match &mut entity.kind {
        EntityKind::Object(obj) => {
            // While live input owns the object, the file waits in the stash.
            if obj.live_input.enabled {
                let slot = swap_sound(obj.stashed_sound.as_ref(), asset, now);
                obj.stashed_sound = Some(slot);
                return result;
            }
            let slot = swap_sound(obj.sound.as_ref(), asset, now);
            obj.radius = radius_for_gain(slot.gain);
            result.push_effect(SceneEffect::RecomputeRadius {
                entity: id,
                radius: obj.radius,
            });
            let out = (slot.gain, slot.is_playing(), obj.adding_sound);
            obj.sound = Some(slot);
            out
        }
        EntityKind::Zone(zone) => {
            let was_paused = zone.sound.as_ref().map(|s| !s.is_playing());
            let mut slot = swap_sound(zone.sound.as_ref(), asset, now);
            // A fresh zone plays unless the scene is muted; a swapped one
            // keeps the previous sound's paused state.
            if was_paused.is_none() && !muted {
                slot.user_wants_playing = true;
                slot.playback.play(now);
            }
            zone.opacity = zone_opacity(slot.gain);
            result.push_effect(SceneEffect::ZoneOpacity {
                entity: id,
                opacity: zone.opacity,
            });
            let out = (slot.gain, slot.is_playing(), zone.adding_sound);
            zone.sound = Some(slot);
            out
        }
        EntityKind::Head(_) => return MutationResult::none(),
    };

    result.push_effect(SceneEffect::SoundAttached { entity: id, cone: None });
    if playing {
        result.push_effect(SceneEffect::Transport {
            entity: id,
            cone: None,
            mode: crate::TransportMode::Playing,
            time: 0.0,
        });
    }
    if !adding_sound {
        let mut fields = into_fields(record);
        fields.insert("volume".into(), json!(gain));
        fields.insert("isPlaying".into(), json!(playing));
        push_update(&mut result, entity, None, fields);
    }
    result
}

/// Clear an attached sound and delete its stored blob. A cone is removed
/// outright.
pub(super) fn detach(entity: &mut Entity, cone: Option<ConeId>) -> MutationResult {
    if let Some(cone_id) = cone {
        return cone::remove(entity, cone_id);
    }
    let id = entity.id;
    let name = entity.name.clone();
    let asset_path = match &mut entity.kind {
        EntityKind::Object(obj) => match obj.sound.take() {
            Some(slot) => AssetPath::object(name, slot.asset.name),
            None => return MutationResult::none(),
        },
        EntityKind::Zone(zone) => match zone.sound.take() {
            Some(slot) => AssetPath::zone(name, slot.asset.name),
            None => return MutationResult::none(),
        },
        EntityKind::Head(_) => return MutationResult::none(),
    };

    let mut result = MutationResult::with_rebuild();
    result.push_effect(SceneEffect::SoundCleared { entity: id, cone: None });
    push_update(
        &mut result,
        entity,
        None,
        into_fields(json!({ "sound": null, "isPlaying": null })),
    );
    result.push_sync(SyncIntent::DeleteAsset(asset_path));
    result
}

pub(super) fn begin_load(entity: &mut Entity) -> MutationResult {
    let flag = match &mut entity.kind {
        EntityKind::Object(obj) => &mut obj.adding_sound,
        EntityKind::Zone(zone) => &mut zone.adding_sound,
        EntityKind::Head(_) => return MutationResult::none(),
    };
    if *flag {
        return MutationResult::none();
    }
    *flag = true;
    MutationResult::changed()
}

/// End of a sound load: lift the hold on remote writes and publish the
/// record edits made meanwhile were kept out of. A zone's cached previous
/// scale goes out with it.
pub(super) fn finish_load(entity: &mut Entity) -> MutationResult {
    let position = entity.position().to_json();
    let fields = match &mut entity.kind {
        EntityKind::Object(obj) => {
            if !obj.adding_sound {
                return MutationResult::none();
            }
            obj.adding_sound = false;
            let mut record = json!({ "position": position });
            if let Some(slot) = &obj.sound {
                record["sound"] = json!(slot.asset.name);
                record["volume"] = json!(slot.gain);
                record["isPlaying"] = json!(slot.is_playing());
            }
            record
        }
        EntityKind::Zone(zone) => {
            if !zone.adding_sound {
                return MutationResult::none();
            }
            zone.adding_sound = false;
            let prev = zone.cached_prev_scale.take().unwrap_or(zone.prev_scale);
            let mut record = json!({
                "position": position,
                "rotation": zone.rotation,
                "scale": zone.scale,
                "prev": prev,
            });
            if let Some(slot) = &zone.sound {
                record["sound"] = json!(slot.asset.name);
                record["volume"] = json!(slot.gain);
                record["isPlaying"] = json!(slot.is_playing());
            }
            record
        }
        EntityKind::Head(_) => return MutationResult::none(),
    };

    let mut result = MutationResult::changed();
    push_update(&mut result, entity, None, into_fields(fields));
    result
}
