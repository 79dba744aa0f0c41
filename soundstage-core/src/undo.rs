//! Undoable action stack.
//!
//! Only structural edits are undoable: adding and removing cones, and
//! removing a trajectory. An entry stores the edit and its inverse, captured
//! from the scene before the edit is applied. Undo hands back the inverse for
//! dispatch so the usual effects and remote writes follow.

use std::collections::VecDeque;

use soundstage_types::{EditAction, SceneState};

#[derive(Debug, Clone, PartialEq)]
struct UndoEntry {
    label: &'static str,
    forward: EditAction,
    inverse: EditAction,
}

pub struct UndoHistory {
    undo_stack: VecDeque<UndoEntry>,
    redo_stack: VecDeque<UndoEntry>,
    max_depth: usize,
}

impl UndoHistory {
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            max_depth: max_depth.max(1),
        }
    }

    /// Record `action` before it mutates `scene`. Returns false when the
    /// action is not undoable or has nothing to invert.
    pub fn push(&mut self, action: &EditAction, scene: &SceneState) -> bool {
        let Some(label) = action.undo_label() else {
            return false;
        };
        let Some(inverse) = inverse_of(action, scene) else {
            return false;
        };

        if self.undo_stack.len() >= self.max_depth {
            self.undo_stack.pop_front();
        }
        self.undo_stack.push_back(UndoEntry {
            label,
            forward: action.clone(),
            inverse,
        });
        self.redo_stack.clear();
        true
    }

    /// Drop the latest entry without applying it, for an edit that turned
    /// out to change nothing.
    pub fn discard_last(&mut self) {
        self.undo_stack.pop_back();
    }

    /// Pop the latest entry; the returned action reverts it.
    pub fn undo(&mut self) -> Option<EditAction> {
        let entry = self.undo_stack.pop_back()?;
        let action = entry.inverse.clone();
        self.redo_stack.push_back(entry);
        Some(action)
    }

    /// Re-apply the latest undone entry.
    pub fn redo(&mut self) -> Option<EditAction> {
        let entry = self.redo_stack.pop_back()?;
        let action = entry.forward.clone();
        self.undo_stack.push_back(entry);
        Some(action)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Label of the entry `undo` would revert.
    pub fn peek_label(&self) -> Option<&'static str> {
        self.undo_stack.back().map(|e| e.label)
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

fn inverse_of(action: &EditAction, scene: &SceneState) -> Option<EditAction> {
    match action {
        EditAction::AddCone { entity, cone } => Some(EditAction::RemoveCone {
            entity: *entity,
            cone: cone.id,
        }),
        EditAction::RemoveCone { entity, cone } => {
            let existing = scene.entity(*entity)?.as_object()?.cone(*cone)?;
            Some(EditAction::AddCone {
                entity: *entity,
                cone: existing.clone(),
            })
        }
        EditAction::RemoveTrajectory(entity) => {
            let trajectory = scene.entity(*entity)?.trajectory()?;
            Some(EditAction::AddTrajectory {
                entity: *entity,
                points: trajectory.points.clone(),
                speed: trajectory.speed,
            })
        }
        _ => None,
    }
}
