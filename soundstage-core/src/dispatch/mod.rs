//! Domain mutation dispatch.
//!
//! Every edit runs the same sequence: undo record (for structural edits),
//! pure reducer, engine effects, then remote writes. Remote writes are only
//! handed to the sink when it reports a shared room.

mod local;

pub use local::LocalDispatcher;

use soundstage_types::reduce::reduce_action;
use soundstage_types::{EditAction, MutationResult, SceneState, SyncSink};

use crate::engine::SceneEngine;
use crate::undo::UndoHistory;

/// Dispatch one action. `undo` is `None` when replaying an undo or redo,
/// which must not record itself.
pub fn dispatch_action(
    action: &EditAction,
    scene: &mut SceneState,
    mut undo: Option<&mut UndoHistory>,
    engine: &mut dyn SceneEngine,
    sink: &mut dyn SyncSink,
    now: f64,
) -> MutationResult {
    let recorded = match undo.as_deref_mut() {
        Some(history) => history.push(action, scene),
        None => false,
    };
    let result = reduce_action(action, scene, now);
    if !result.changed {
        if recorded {
            if let Some(history) = undo {
                history.discard_last();
            }
        }
        log::debug!("{:?} changed nothing", action);
        return result;
    }
    apply_result(&result, engine, sink);
    result
}

/// Hand effects to the engine and, in a shared room, intents to the sink.
pub fn apply_result(result: &MutationResult, engine: &mut dyn SceneEngine, sink: &mut dyn SyncSink) {
    for effect in &result.effects {
        engine.apply_effect(effect);
    }
    if result.sync.is_empty() {
        return;
    }
    if sink.is_shared() {
        for intent in &result.sync {
            sink.submit(intent.clone());
        }
    } else {
        log::debug!(target: "sync", "solo session, {} remote writes skipped", result.sync.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use soundstage_types::{
        EntityId, FieldTarget, ParamField, SceneEffect, SoundAsset, SyncIntent, Vec3,
    };

    #[derive(Default)]
    struct Effects(Vec<SceneEffect>);

    impl SceneEngine for Effects {
        fn suspend_controls(&mut self) {}
        fn resume_controls(&mut self) {}
        fn apply_effect(&mut self, effect: &SceneEffect) {
            self.0.push(effect.clone());
        }
        fn camera_aim(&self, _entity: EntityId) -> Option<(f32, f32)> {
            None
        }
    }

    struct Sink {
        shared: bool,
        intents: Vec<SyncIntent>,
    }

    impl SyncSink for Sink {
        fn is_shared(&self) -> bool {
            self.shared
        }
        fn submit(&mut self, intent: SyncIntent) {
            self.intents.push(intent);
        }
    }

    fn scene_with_sound() -> (SceneState, EntityId) {
        let mut scene = SceneState::new();
        let obj = scene.add_object("obj1", Vec3::default());
        reduce_action(
            &EditAction::AttachSound {
                entity: obj,
                cone: None,
                asset: SoundAsset::new("a.wav", 1024, 10.0),
            },
            &mut scene,
            0.0,
        );
        (scene, obj)
    }

    fn volume(obj: EntityId) -> EditAction {
        EditAction::Adjust {
            target: FieldTarget::new(obj, ParamField::Volume),
            delta: 5.0,
        }
    }

    #[test]
    fn solo_session_writes_nothing() {
        let (mut scene, obj) = scene_with_sound();
        let mut engine = Effects::default();
        let mut sink = Sink { shared: false, intents: Vec::new() };
        let result = dispatch_action(&volume(obj), &mut scene, None, &mut engine, &mut sink, 0.0);
        assert!(!result.sync.is_empty());
        assert!(sink.intents.is_empty());
        assert!(!engine.0.is_empty());
    }

    #[test]
    fn shared_session_forwards_intents() {
        let (mut scene, obj) = scene_with_sound();
        let mut engine = Effects::default();
        let mut sink = Sink { shared: true, intents: Vec::new() };
        dispatch_action(&volume(obj), &mut scene, None, &mut engine, &mut sink, 0.0);
        assert_eq!(sink.intents.len(), 1);
    }

    #[test]
    fn structural_edits_are_recorded() {
        let (mut scene, obj) = scene_with_sound();
        reduce_action(
            &EditAction::AddTrajectory { entity: obj, points: vec![Vec3::default()], speed: 0.5 },
            &mut scene,
            0.0,
        );
        let mut undo = UndoHistory::new(4);
        let mut engine = Effects::default();
        let mut sink = Sink { shared: false, intents: Vec::new() };
        dispatch_action(
            &EditAction::RemoveTrajectory(obj),
            &mut scene,
            Some(&mut undo),
            &mut engine,
            &mut sink,
            0.0,
        );
        assert!(undo.can_undo());
        assert!(scene.entity(obj).unwrap().trajectory().is_none());
    }
}
