//! Cyclic selection across sibling entities or sibling cones.

use soundstage_types::{ConeId, EntityId, SceneState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

/// Step `current` one place in `direction`, wrapping at both ends.
pub fn cycle_index(current: usize, len: usize, direction: Direction) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let current = current.min(len - 1);
    Some(match direction {
        Direction::Left => (current + len - 1) % len,
        Direction::Right => (current + 1) % len,
    })
}

/// Next entity among objects, zones and the head. The head is left out
/// while an object is being edited. With nothing selected the walk starts
/// at the first entry.
pub fn next_entity(scene: &SceneState, current: Option<EntityId>, direction: Direction) -> Option<EntityId> {
    let order = scene.navigation_order(!scene.editing_object);
    let Some(pos) = current.and_then(|id| order.iter().position(|e| *e == id)) else {
        return order.first().copied();
    };
    cycle_index(pos, order.len(), direction).map(|i| order[i])
}

/// Next cone of `entity` relative to its interactive cone.
pub fn next_cone(scene: &SceneState, entity: EntityId, direction: Direction) -> Option<ConeId> {
    let obj = scene.entity(entity)?.as_object()?;
    if obj.cones.is_empty() {
        return None;
    }
    let pos = obj
        .interactive_cone
        .and_then(|id| obj.cone_index(id))
        .unwrap_or(0);
    cycle_index(pos, obj.cones.len(), direction).map(|i| obj.cones[i].id)
}
