use serde::{Deserialize, Serialize};

use super::entity::{Entity, EntityKind, EntityKindTag, HeadListener, ObjectSource, ZoneSource};
use crate::{ConeId, EntityId, Vec3};

/// All placeable entities of one scene plus the scene-wide flags edits consult.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneState {
    pub entities: Vec<Entity>,
    next_entity_id: u32,
    next_cone_id: u32,
    /// Global mute; new sounds are loaded muted and zone swaps do not autoplay.
    pub muted: bool,
    /// Object edit mode hides altitude, the trajectory button and the head.
    pub editing_object: bool,
}

impl SceneState {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_entity_id(&mut self) -> EntityId {
        let id = EntityId::new(self.next_entity_id);
        self.next_entity_id += 1;
        id
    }

    pub fn allocate_cone_id(&mut self) -> ConeId {
        let id = ConeId::new(self.next_cone_id);
        self.next_cone_id += 1;
        id
    }

    fn push(&mut self, name: impl Into<String>, kind: EntityKind) -> EntityId {
        let id = self.allocate_entity_id();
        self.entities.push(Entity {
            id,
            name: name.into(),
            kind,
        });
        id
    }

    pub fn add_object(&mut self, name: impl Into<String>, position: Vec3) -> EntityId {
        self.push(name, EntityKind::Object(ObjectSource::new(position)))
    }

    pub fn add_zone(&mut self, name: impl Into<String>, position: Vec3) -> EntityId {
        self.push(name, EntityKind::Zone(ZoneSource::new(position)))
    }

    /// Install the listener head, replacing any existing one.
    pub fn set_head(&mut self, name: impl Into<String>, position: Vec3) -> EntityId {
        self.entities
            .retain(|e| !matches!(e.kind, EntityKind::Head(_)));
        self.push(name, EntityKind::Head(HeadListener::new(position)))
    }

    pub fn head(&self) -> Option<&Entity> {
        self.entities
            .iter()
            .find(|e| matches!(e.kind, EntityKind::Head(_)))
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id == id)
    }

    pub fn entity_by_name(&self, name: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.name == name)
    }

    /// Remove an entity along with everything it owns (cones, trajectory).
    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        let idx = self.entities.iter().position(|e| e.id == id)?;
        Some(self.entities.remove(idx))
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.iter().any(|e| e.id == id)
    }

    /// Objects, then zones, then the head unless `include_head` is false.
    pub fn navigation_order(&self, include_head: bool) -> Vec<EntityId> {
        let mut tags = vec![EntityKindTag::Object, EntityKindTag::Zone];
        if include_head {
            tags.push(EntityKindTag::Head);
        }
        tags.into_iter()
            .flat_map(|tag| {
                self.entities
                    .iter()
                    .filter(move |e| e.tag() == tag)
                    .map(|e| e.id)
            })
            .collect()
    }

    /// Next entity id that would be allocated; exposed for snapshot restore.
    pub fn peek_next_entity_id(&self) -> EntityId {
        EntityId::new(self.next_entity_id)
    }
}
