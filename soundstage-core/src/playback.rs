//! Playback controller helpers.
//!
//! Playing time is never pushed by a timer. Each refresh tick derives it from
//! the wall clock and updates the time controls on the panel.

use soundstage_types::{ConeId, DisplayValue, EntityId, ParamField, SceneState};

use crate::panel::Panel;

/// Current playback time of a sound, if one is attached.
pub fn current_time(scene: &SceneState, entity: EntityId, cone: Option<ConeId>, now: f64) -> Option<f64> {
    scene
        .entity(entity)?
        .sound(cone)
        .map(|slot| slot.playback.time_at(now))
}

/// Refresh every time control on the panel. Returns how many were updated.
pub fn refresh_time_controls(panel: &mut Panel, scene: &SceneState, now: f64) -> usize {
    let targets: Vec<_> = panel
        .controls()
        .filter_map(|(handle, d)| d.target.map(|t| (handle, t)))
        .filter(|(_, t)| t.field == ParamField::PlaybackTime)
        .collect();

    let mut refreshed = 0;
    for (handle, target) in targets {
        let time = current_time(scene, target.entity, target.cone, now);
        if panel.refresh_parameter(handle, DisplayValue::Time(time)) {
            refreshed += 1;
        }
    }
    refreshed
}
