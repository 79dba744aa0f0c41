//! LocalDispatcher: Dispatcher implementation over in-process state.

use soundstage_types::{Dispatcher, EditAction, MutationResult, SceneState, SyncSink};

use crate::engine::{Clock, SceneEngine};
use crate::undo::UndoHistory;

use super::dispatch_action;

/// Dispatcher borrowing the pieces of an editor session for the length of
/// one or more dispatches.
pub struct LocalDispatcher<'a> {
    pub scene: &'a mut SceneState,
    pub undo: Option<&'a mut UndoHistory>,
    pub engine: &'a mut dyn SceneEngine,
    pub sink: &'a mut dyn SyncSink,
    pub clock: &'a dyn Clock,
}

impl<'a> LocalDispatcher<'a> {
    pub fn new(
        scene: &'a mut SceneState,
        undo: Option<&'a mut UndoHistory>,
        engine: &'a mut dyn SceneEngine,
        sink: &'a mut dyn SyncSink,
        clock: &'a dyn Clock,
    ) -> Self {
        Self {
            scene,
            undo,
            engine,
            sink,
            clock,
        }
    }
}

impl<'a> Dispatcher for LocalDispatcher<'a> {
    fn dispatch(&mut self, action: &EditAction) -> MutationResult {
        let now = self.clock.now();
        dispatch_action(
            action,
            self.scene,
            self.undo.as_deref_mut(),
            self.engine,
            self.sink,
            now,
        )
    }
}
