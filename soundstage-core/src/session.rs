//! Editor session: the single owned context for one editor.
//!
//! Holds the scene, the parameter panel and every controller, plus the
//! collaborators the host supplies. UI events come in as method calls; each
//! edit runs through `dispatch`, which updates the panel afterwards.

use soundstage_types::{
    AdditionalAction, ButtonAction, ConeId, Dispatcher, EditAction, EntityId, MutationResult,
    ParamField, ParameterDescriptor, SceneState, SoundAsset, SyncSink, Vec3,
};

use crate::assets::{AssetPipeline, AttachTarget, LoadRequest, LoadStage, LoadTicket, UploadRequest, UploadTicket};
use crate::config::Config;
use crate::descriptors::{describe, DescribeContext, FILE_MODE, INPUT_MODE};
use crate::dispatch::LocalDispatcher;
use crate::engine::{Clock, LoadedSound, MediaDevices, SceneEngine, SpatialAudio, StreamHandle};
use crate::error::{EditError, EditResult, MediaError};
use crate::gesture::GestureTranslator;
use crate::journal::Journal;
use crate::live_input::{AcquisitionRequest, AcquisitionTicket, LiveInputNegotiator};
use crate::navigation::{next_cone, next_entity, Direction};
use crate::panel::{ControlHandle, Panel, Selection, ShowOutcome};
use crate::playback::refresh_time_controls;
use crate::undo::UndoHistory;

/// What pressing a button asks of the host.
#[derive(Debug, Clone, PartialEq)]
pub enum ButtonOutcome {
    /// The edit ran.
    Applied(MutationResult),
    /// Open a file picker; hand the chosen file to `begin_attach`.
    PickFile(AttachTarget),
    /// Let the user draw a path; hand the points to `add_trajectory`.
    DrawTrajectory(EntityId),
}

/// Result of choosing a live-input channel.
#[derive(Debug, Clone, PartialEq)]
pub enum InputSelection {
    /// `None` was chosen; the old stream is gone.
    Cleared(MutationResult),
    /// Open this stream and report back via `complete_input_selection`.
    Pending(AcquisitionRequest),
}

pub struct EditorSession<E, A, M, S> {
    config: Config,
    editor_id: String,
    scene: SceneState,
    panel: Panel,
    gestures: GestureTranslator,
    undo: UndoHistory,
    negotiator: LiveInputNegotiator,
    assets: AssetPipeline,
    journal: Option<Journal>,
    engine: E,
    audio: A,
    media: M,
    sink: S,
    clock: Box<dyn Clock>,
}

impl<E, A, M, S> EditorSession<E, A, M, S>
where
    E: SceneEngine,
    A: SpatialAudio,
    M: MediaDevices,
    S: SyncSink,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: Config,
        editor_id: impl Into<String>,
        user_agent: &str,
        scene: SceneState,
        engine: E,
        audio: A,
        media: M,
        sink: S,
        clock: Box<dyn Clock>,
    ) -> Self {
        let editor_id = editor_id.into();
        Self {
            panel: Panel::new(),
            gestures: GestureTranslator::new(config.drag_pixels_per_unit()),
            undo: UndoHistory::new(config.undo_depth()),
            negotiator: LiveInputNegotiator::new(user_agent, &config),
            assets: AssetPipeline::new(config.max_asset_kb(), editor_id.clone()),
            journal: None,
            config,
            editor_id,
            scene,
            engine,
            audio,
            media,
            sink,
            clock,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn editor_id(&self) -> &str {
        &self.editor_id
    }

    pub fn scene(&self) -> &SceneState {
        &self.scene
    }

    /// Direct scene access for seeding; edits made here bypass dispatch.
    pub fn scene_mut(&mut self) -> &mut SceneState {
        &mut self.scene
    }

    pub fn panel(&self) -> &Panel {
        &self.panel
    }

    pub fn gestures(&self) -> &GestureTranslator {
        &self.gestures
    }

    pub fn undo_history(&self) -> &UndoHistory {
        &self.undo
    }

    pub fn negotiator(&self) -> &LiveInputNegotiator {
        &self.negotiator
    }

    pub fn assets(&self) -> &AssetPipeline {
        &self.assets
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn media(&self) -> &M {
        &self.media
    }

    pub fn media_mut(&mut self) -> &mut M {
        &mut self.media
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn is_shared(&self) -> bool {
        self.sink.is_shared()
    }

    /// Record every dispatched edit to `journal` from now on.
    pub fn attach_journal(&mut self, journal: Journal) {
        self.journal = Some(journal);
    }

    // -- dispatch --

    /// Run one edit: undo record, reducer, engine effects, remote writes,
    /// journal, then the panel.
    pub fn dispatch(&mut self, action: &EditAction) -> MutationResult {
        self.run(action, true)
    }

    fn run(&mut self, action: &EditAction, record_undo: bool) -> MutationResult {
        let now = self.clock.now();
        let undo = if record_undo { Some(&mut self.undo) } else { None };
        let result = LocalDispatcher::new(
            &mut self.scene,
            undo,
            &mut self.engine,
            &mut self.sink,
            self.clock.as_ref(),
        )
        .dispatch(action);

        if let Some(journal) = self.journal.as_mut() {
            if let Err(e) = journal.record(action, now, &result) {
                log::warn!("journal write failed: {}", e);
            }
        }
        if result.changed {
            self.update_panel(result.rebuild_panel);
        }
        result
    }

    fn run_all(&mut self, actions: Vec<EditAction>) -> MutationResult {
        let mut merged = MutationResult::none();
        for action in &actions {
            merged.merge(self.dispatch(action));
        }
        merged
    }

    fn update_panel(&mut self, rebuild: bool) {
        let Some(displayed) = self.panel.displayed() else {
            return;
        };
        if !self.scene.contains(displayed) {
            self.panel.clear();
            return;
        }
        let descriptors = self.describe(displayed);
        if rebuild {
            self.panel.rebuild(displayed, descriptors);
        } else {
            self.panel.show(Selection::Entity(displayed), descriptors);
        }
    }

    fn describe(&self, id: EntityId) -> Vec<ParameterDescriptor> {
        let Some(entity) = self.scene.entity(id) else {
            return Vec::new();
        };
        let choices = self.negotiator.device_choices();
        let ctx = DescribeContext {
            now: self.clock.now(),
            input_choices: &choices,
        };
        describe(&self.scene, entity, &ctx)
    }

    fn descriptor(&self, handle: ControlHandle) -> EditResult<ParameterDescriptor> {
        self.panel
            .descriptor(handle)
            .cloned()
            .ok_or_else(|| EditError::ValidationRejection(format!("no control {}", handle.get())))
    }

    // -- selection and navigation --

    /// Show an entity (or the owner of a selected trajectory). Reselecting
    /// the displayed entity refreshes in place.
    pub fn select(&mut self, selection: Selection) -> EditResult<ShowOutcome> {
        let id = selection.entity();
        if !self.scene.contains(id) {
            return Err(EditError::UnknownEntity(id));
        }
        if self.panel.displayed() != Some(id) {
            self.gestures.cancel(&mut self.engine);
        }
        let descriptors = self.describe(id);
        Ok(self.panel.show(selection, descriptors))
    }

    /// Step to the previous or next entity and rebuild the panel for it.
    pub fn navigate(&mut self, direction: Direction) -> Option<EntityId> {
        let next = next_entity(&self.scene, self.panel.displayed(), direction)?;
        self.gestures.cancel(&mut self.engine);
        let descriptors = self.describe(next);
        self.panel.rebuild(next, descriptors);
        Some(next)
    }

    /// Make the previous or next cone of the displayed object interactive.
    pub fn navigate_cones(&mut self, direction: Direction) -> Option<ConeId> {
        let entity = self.panel.displayed()?;
        let cone = next_cone(&self.scene, entity, direction)?;
        self.dispatch(&EditAction::SetInteractiveCone { entity, cone });
        Some(cone)
    }

    /// Enter or leave object-editing mode.
    pub fn set_editing_object(&mut self, editing: bool) -> MutationResult {
        self.dispatch(&EditAction::SetEditingObject(editing))
    }

    // -- gestures --

    pub fn begin_drag(&mut self, handle: ControlHandle, x: f32) -> EditResult {
        let descriptor = self.descriptor(handle)?;
        self.gestures.begin_drag(handle, &descriptor, x, &mut self.engine)
    }

    pub fn drag_to(&mut self, x: f32) -> MutationResult {
        match self.gestures.drag_to(x) {
            Some(action) => self.dispatch(&action),
            None => MutationResult::none(),
        }
    }

    pub fn end_drag(&mut self) -> MutationResult {
        match self.gestures.end_drag(&mut self.engine) {
            Some(action) => self.dispatch(&action),
            None => MutationResult::none(),
        }
    }

    /// Check one typed character before it reaches the field.
    pub fn type_keystroke(&self, ch: char) -> EditResult {
        self.gestures.validate_keystroke(ch, self.sink.is_shared())
    }

    /// Commit typed text on a numeric control.
    pub fn commit_typed(&mut self, handle: ControlHandle, text: &str) -> EditResult<MutationResult> {
        let descriptor = self.descriptor(handle)?;
        let actions = self
            .gestures
            .commit_typed(&descriptor, text, self.sink.is_shared())?;
        Ok(self.run_all(actions))
    }

    // -- buttons and choices --

    pub fn press_button(&mut self, handle: ControlHandle) -> EditResult<ButtonOutcome> {
        let descriptor = self.descriptor(handle)?;
        let Some(button) = descriptor.button else {
            return Err(EditError::ValidationRejection(descriptor.label));
        };
        let action = match button {
            ButtonAction::AddCone(entity) => return Ok(ButtonOutcome::PickFile(AttachTarget::NewCone(entity))),
            ButtonAction::AddTrajectory(entity) => return Ok(ButtonOutcome::DrawTrajectory(entity)),
            ButtonAction::DeleteCone(entity, cone) => EditAction::RemoveCone { entity, cone },
            ButtonAction::DeleteTrajectory(entity) => EditAction::RemoveTrajectory(entity),
            ButtonAction::DetachSound(entity, cone) => EditAction::DetachSound { entity, cone },
            ButtonAction::ToggleLiveInputMute(entity) => EditAction::ToggleLiveInputMute(entity),
        };
        Ok(ButtonOutcome::Applied(self.dispatch(&action)))
    }

    /// Press the play/pause toggle next to a time control.
    pub fn toggle_playback(&mut self, handle: ControlHandle) -> EditResult<MutationResult> {
        let descriptor = self.descriptor(handle)?;
        match descriptor.additional {
            Some(AdditionalAction::TogglePlayback { entity, cone, .. }) => {
                Ok(self.dispatch(&EditAction::TogglePlayback { entity, cone }))
            }
            None => Err(EditError::ValidationRejection(descriptor.label)),
        }
    }

    /// Give `entity` the drawn path, moving at the configured default speed.
    pub fn add_trajectory(&mut self, entity: EntityId, points: Vec<Vec3>) -> MutationResult {
        let speed = self.config.default_movement_speed();
        self.dispatch(&EditAction::AddTrajectory { entity, points, speed })
    }

    /// Pick an option on a choice control: the File / Input switch or the
    /// live-input channel.
    pub fn choose(&mut self, handle: ControlHandle, value: &str) -> EditResult<Option<InputSelection>> {
        let descriptor = self.descriptor(handle)?;
        let Some(target) = descriptor.target else {
            return Err(EditError::ValidationRejection(descriptor.label));
        };
        match (target.field, value) {
            (ParamField::InputSource, INPUT_MODE) => {
                self.switch_to_live(target.entity)?;
                Ok(None)
            }
            (ParamField::InputSource, FILE_MODE) => {
                self.switch_to_file(target.entity);
                Ok(None)
            }
            (ParamField::MicrophoneChannel, choice) => {
                self.begin_input_selection(target.entity, choice).map(Some)
            }
            _ => Err(EditError::ValidationRejection(value.to_string())),
        }
    }

    // -- live input --

    /// List the available inputs, then put the object in live-input mode.
    /// A refused permission leaves the object untouched.
    pub fn switch_to_live(&mut self, entity: EntityId) -> EditResult<MutationResult> {
        if !self.scene.contains(entity) {
            return Err(EditError::UnknownEntity(entity));
        }
        let listed = self.negotiator.refresh_devices(entity, &mut self.media)?;
        let result = self.dispatch(&EditAction::EnableLiveInput(entity));
        if listed && !result.rebuild_panel {
            self.update_panel(true);
        }
        Ok(result)
    }

    /// Leave live-input mode, stopping any stream the object owned.
    pub fn switch_to_file(&mut self, entity: EntityId) -> MutationResult {
        self.negotiator.teardown(entity, &mut self.media);
        self.dispatch(&EditAction::DisableLiveInput(entity))
    }

    pub fn begin_input_selection(&mut self, entity: EntityId, choice: &str) -> EditResult<InputSelection> {
        let live = self
            .scene
            .entity(entity)
            .ok_or(EditError::UnknownEntity(entity))?
            .is_live_input();
        if !live {
            return Err(EditError::ValidationRejection(choice.to_string()));
        }
        let request = self.negotiator.begin_select(entity, choice, &mut self.media);
        // The old stream is gone either way.
        let cleared = self.dispatch(&EditAction::SelectInputDevice { entity, device: None });
        match request {
            Some(request) => Ok(InputSelection::Pending(request)),
            None => Ok(InputSelection::Cleared(cleared)),
        }
    }

    pub fn complete_input_selection(
        &mut self,
        ticket: AcquisitionTicket,
        outcome: Result<StreamHandle, MediaError>,
    ) -> EditResult<MutationResult> {
        let (entity, composite) =
            self.negotiator
                .complete_select(ticket, outcome, &self.scene, &mut self.media)?;
        Ok(self.dispatch(&EditAction::SelectInputDevice {
            entity,
            device: Some(composite),
        }))
    }

    /// Select a channel and open its stream right away.
    pub fn select_input_device(&mut self, entity: EntityId, choice: &str) -> EditResult<MutationResult> {
        match self.begin_input_selection(entity, choice)? {
            InputSelection::Cleared(result) => Ok(result),
            InputSelection::Pending(request) => {
                let outcome = self.media.open_stream(&request.constraints);
                self.complete_input_selection(request.ticket, outcome)
            }
        }
    }

    // -- assets --

    /// Accept a file for `target`. The host decodes it and reports back via
    /// `complete_attach`.
    pub fn begin_attach(&mut self, target: AttachTarget, asset: SoundAsset) -> EditResult<LoadRequest> {
        let request = self.assets.begin(&self.scene, target, asset)?;
        if let Some(prelude) = request.prelude() {
            self.dispatch(&prelude);
        }
        Ok(request)
    }

    /// Apply a finished decode. Returns the blob to upload in a shared room.
    pub fn complete_attach(
        &mut self,
        ticket: LoadTicket,
        outcome: Result<LoadedSound, MediaError>,
    ) -> EditResult<Option<UploadRequest>> {
        let aim = match self.assets.target_of(ticket) {
            Some(AttachTarget::NewCone(entity)) => self.engine.camera_aim(entity),
            _ => None,
        };
        let shared = self.sink.is_shared();
        let now = self.clock.now();
        match self
            .assets
            .complete(ticket, outcome, &mut self.scene, aim, shared, now)?
        {
            LoadStage::Loaded { actions, upload } => {
                self.run_all(actions);
                Ok(upload)
            }
            LoadStage::Failed { cleanup, error } => {
                if let Some(action) = cleanup {
                    self.dispatch(&action);
                }
                Err(EditError::LoadFailed(error.to_string()))
            }
        }
    }

    /// Load a file through the spatial audio engine in one step.
    pub fn attach_file(&mut self, target: AttachTarget, asset: SoundAsset) -> EditResult<Option<UploadRequest>> {
        let request = self.begin_attach(target, asset)?;
        let outcome = self.audio.load_sound(&request.asset, self.scene.muted);
        self.complete_attach(request.ticket, outcome)
    }

    /// The bulk store finished (or failed) an upload.
    pub fn upload_finished(&mut self, ticket: UploadTicket, outcome: Result<(), String>) -> EditResult<MutationResult> {
        match self.assets.complete_upload(ticket, outcome, &self.scene)? {
            Some(action) => Ok(self.dispatch(&action)),
            None => Ok(MutationResult::none()),
        }
    }

    // -- undo --

    pub fn undo(&mut self) -> Option<MutationResult> {
        let action = self.undo.undo()?;
        log::debug!("undo {:?}", action);
        Some(self.run(&action, false))
    }

    pub fn redo(&mut self) -> Option<MutationResult> {
        let action = self.undo.redo()?;
        log::debug!("redo {:?}", action);
        Some(self.run(&action, false))
    }

    // -- remote --

    /// Apply a trajectory phase written by another editor.
    pub fn apply_remote_phase(&mut self, entity: EntityId, phase: f32) -> MutationResult {
        self.run(&EditAction::ApplyRemotePhase { entity, phase }, false)
    }

    /// Refresh tick: recompute the time shown on every time control.
    pub fn tick(&mut self) -> usize {
        refresh_time_controls(&mut self.panel, &self.scene, self.clock.now())
    }
}
