use serde_json::json;

use crate::{into_fields, ConeId, Entity, EntityKind, MutationResult, SceneEffect, TransportMode};

use super::push_update;

fn transport_effect(entity: &Entity, cone: Option<ConeId>, now: f64) -> Option<SceneEffect> {
    let slot = entity.sound(cone)?;
    Some(SceneEffect::Transport {
        entity: entity.id,
        cone,
        mode: slot.playback.mode,
        time: slot.playback.time_at(now),
    })
}

/// Whether play-state changes on this sound may be written remotely now.
fn syncable(entity: &Entity, cone: Option<ConeId>) -> bool {
    match (&entity.kind, cone) {
        (EntityKind::Object(o), Some(id)) => o.cone(id).is_some_and(|c| c.upload_complete),
        (EntityKind::Object(o), None) => !o.adding_sound,
        (EntityKind::Zone(z), None) => !z.adding_sound,
        _ => false,
    }
}

/// Move the playhead by `delta` seconds, pausing a playing sound first.
pub(super) fn scrub(entity: &mut Entity, cone: Option<ConeId>, delta: f32, now: f64) -> MutationResult {
    let Some(slot) = entity.sound_mut(cone) else {
        return MutationResult::none();
    };
    slot.playback.begin_scrub(now);
    slot.playback.scrub_by(delta as f64);

    let mut result = MutationResult::changed();
    if let Some(effect) = transport_effect(entity, cone, now) {
        result.push_effect(effect);
    }
    result
}

/// Leave scrubbing; playback resumes only if the user wanted it playing.
pub(super) fn end_scrub(entity: &mut Entity, cone: Option<ConeId>, now: f64) -> MutationResult {
    let Some(slot) = entity.sound_mut(cone) else {
        return MutationResult::none();
    };
    let wants = slot.user_wants_playing;
    if !slot.playback.end_scrub(now, wants) {
        return MutationResult::none();
    }

    let mut result = MutationResult::changed();
    if let Some(effect) = transport_effect(entity, cone, now) {
        result.push_effect(effect);
    }
    result
}

/// Play/pause button. Records the user's intent for later scrubs.
pub(super) fn toggle(entity: &mut Entity, cone: Option<ConeId>, now: f64) -> MutationResult {
    let Some(slot) = entity.sound_mut(cone) else {
        return MutationResult::none();
    };
    let playing = match slot.playback.mode {
        TransportMode::Playing => {
            slot.playback.pause(now);
            false
        }
        TransportMode::Paused => {
            slot.playback.play(now);
            true
        }
        TransportMode::Scrubbing => return MutationResult::none(),
    };
    slot.user_wants_playing = playing;

    let mut result = MutationResult::changed();
    if let Some(effect) = transport_effect(entity, cone, now) {
        result.push_effect(effect);
    }
    if syncable(entity, cone) {
        push_update(&mut result, entity, cone, into_fields(json!({ "isPlaying": playing })));
    }
    result
}
