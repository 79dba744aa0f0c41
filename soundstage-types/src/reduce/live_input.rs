//! Entity side of live input: which mode an object is in and what it
//! remembers about the other one. Streams are owned by the negotiator.

use crate::{radius_for_gain, Entity, MutationResult, SceneEffect, TransportMode};

/// Switch an object to live input. The file sound is paused and stashed with
/// its play status so `disable` can bring it back.
pub(super) fn enable(entity: &mut Entity, now: f64) -> MutationResult {
    let id = entity.id;
    let Some(obj) = entity.as_object_mut() else {
        return MutationResult::none();
    };
    if obj.live_input.enabled {
        return MutationResult::none();
    }
    obj.live_input.enabled = true;

    let mut result = MutationResult::with_rebuild();
    if let Some(mut slot) = obj.sound.take() {
        slot.user_wants_playing = slot.is_playing();
        slot.playback.pause(now);
        result.push_effect(SceneEffect::Transport {
            entity: id,
            cone: None,
            mode: TransportMode::Paused,
            time: slot.playback.current_time,
        });
        result.push_effect(SceneEffect::SoundCleared { entity: id, cone: None });
        obj.stashed_sound = Some(slot);
    }
    result
}

pub(super) fn select_device(entity: &mut Entity, device: Option<String>, muted: bool) -> MutationResult {
    let id = entity.id;
    let Some(obj) = entity.as_object_mut() else {
        return MutationResult::none();
    };
    if !obj.live_input.enabled {
        return MutationResult::none();
    }
    let has_device = device.is_some();
    obj.live_input.device = device;

    let mut result = MutationResult::with_rebuild();
    if has_device {
        // Selecting a device brings back the remembered live volume.
        let volume = obj.live_input.volume;
        let audible = if obj.live_input.muted || muted { 0.0 } else { volume };
        obj.radius = radius_for_gain(volume);
        result.push_effect(SceneEffect::SetGain {
            entity: id,
            cone: None,
            gain: audible,
        });
        result.push_effect(SceneEffect::RecomputeRadius {
            entity: id,
            radius: obj.radius,
        });
    }
    result
}

/// Back to file mode: restore the stashed file, its volume and play status.
pub(super) fn disable(entity: &mut Entity, now: f64) -> MutationResult {
    let id = entity.id;
    let Some(obj) = entity.as_object_mut() else {
        return MutationResult::none();
    };
    if !obj.live_input.enabled {
        return MutationResult::none();
    }
    obj.live_input.enabled = false;
    obj.live_input.device = None;

    let mut result = MutationResult::with_rebuild();
    if let Some(mut slot) = obj.stashed_sound.take() {
        if slot.user_wants_playing {
            slot.playback.play(now);
        }
        obj.radius = radius_for_gain(slot.gain);
        result.push_effect(SceneEffect::SoundAttached { entity: id, cone: None });
        result.push_effect(SceneEffect::SetGain {
            entity: id,
            cone: None,
            gain: slot.gain,
        });
        result.push_effect(SceneEffect::RecomputeRadius {
            entity: id,
            radius: obj.radius,
        });
        result.push_effect(SceneEffect::Transport {
            entity: id,
            cone: None,
            mode: slot.playback.mode,
            time: slot.playback.time_at(now),
        });
        obj.sound = Some(slot);
    }
    result
}

pub(super) fn toggle_mute(entity: &mut Entity) -> MutationResult {
    let id = entity.id;
    let Some(obj) = entity.as_object_mut() else {
        return MutationResult::none();
    };
    if !obj.live_input.enabled {
        return MutationResult::none();
    }
    obj.live_input.muted = !obj.live_input.muted;
    let gain = if obj.live_input.muted { 0.0 } else { 1.0 };

    let mut result = MutationResult::changed();
    result.push_effect(SceneEffect::SetGain {
        entity: id,
        cone: None,
        gain,
    });
    result
}
