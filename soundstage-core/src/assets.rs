//! Asset attach pipeline.
//!
//! Attaching a file runs as explicit stages instead of nested callbacks:
//!
//! 1. `begin`: size check and target check, returns a `LoadRequest`.
//! 2. The host decodes the asset with the audio engine.
//! 3. `complete`: one stale-result guard, then the edit actions to dispatch
//!    and, in a shared room, an `UploadRequest` for the blob.
//! 4. `complete_upload`: once a cone's blob is stored, the cone may sync.

use std::collections::HashMap;

use soundstage_types::{
    AssetPath, ConeId, ConeSource, EditAction, EntityId, EntityKind, SceneState, SoundAsset,
    SoundSlot,
};

use crate::engine::LoadedSound;
use crate::error::{EditError, EditResult, MediaError};

/// Where a loaded file goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttachTarget {
    /// The omni sound of an object, or a zone's sound.
    Sound(EntityId),
    /// A new cone on an object, aimed at the camera.
    NewCone(EntityId),
    ReplaceCone { entity: EntityId, cone: ConeId },
}

impl AttachTarget {
    pub fn entity(&self) -> EntityId {
        match *self {
            AttachTarget::Sound(e) | AttachTarget::NewCone(e) => e,
            AttachTarget::ReplaceCone { entity, .. } => entity,
        }
    }

    fn is_valid(&self, scene: &SceneState) -> bool {
        let Some(entity) = scene.entity(self.entity()) else {
            return false;
        };
        match (self, &entity.kind) {
            (AttachTarget::Sound(_), EntityKind::Object(_) | EntityKind::Zone(_)) => true,
            (AttachTarget::NewCone(_), EntityKind::Object(_)) => true,
            (AttachTarget::ReplaceCone { cone, .. }, EntityKind::Object(obj)) => obj.cone(*cone).is_some(),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadTicket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UploadTicket(u64);

/// An accepted asset waiting to be decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadRequest {
    pub ticket: LoadTicket,
    pub target: AttachTarget,
    pub asset: SoundAsset,
}

impl LoadRequest {
    /// Edit to dispatch before decoding starts.
    pub fn prelude(&self) -> Option<EditAction> {
        match self.target {
            AttachTarget::Sound(entity) => Some(EditAction::BeginSoundLoad(entity)),
            _ => None,
        }
    }
}

/// A blob the bulk asset store must receive.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadRequest {
    pub ticket: UploadTicket,
    pub path: AssetPath,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadStage {
    Loaded {
        actions: Vec<EditAction>,
        upload: Option<UploadRequest>,
    },
    /// Decoding failed. `cleanup` undoes the prelude.
    Failed {
        cleanup: Option<EditAction>,
        error: MediaError,
    },
}

#[derive(Debug, Clone)]
struct PendingUpload {
    entity: EntityId,
    /// Cone id and uuid for cone blobs.
    cone: Option<(ConeId, String)>,
}

pub struct AssetPipeline {
    max_kb: u64,
    editor_id: String,
    next_ticket: u64,
    loads: HashMap<LoadTicket, LoadRequest>,
    latest: HashMap<AttachTarget, LoadTicket>,
    uploads: HashMap<UploadTicket, PendingUpload>,
}

/// Remote identity of a cone created by `editor_id`.
pub fn cone_uuid(editor_id: &str, cone: ConeId) -> String {
    format!("{}-{}", editor_id, cone)
}

impl AssetPipeline {
    pub fn new(max_kb: u64, editor_id: impl Into<String>) -> Self {
        Self {
            max_kb,
            editor_id: editor_id.into(),
            next_ticket: 0,
            loads: HashMap::new(),
            latest: HashMap::new(),
            uploads: HashMap::new(),
        }
    }

    pub fn pending_loads(&self) -> usize {
        self.loads.len()
    }

    pub fn pending_uploads(&self) -> usize {
        self.uploads.len()
    }

    /// Target of a load still in flight.
    pub fn target_of(&self, ticket: LoadTicket) -> Option<AttachTarget> {
        self.loads.get(&ticket).map(|r| r.target)
    }

    fn ticket(&mut self) -> u64 {
        let t = self.next_ticket;
        self.next_ticket += 1;
        t
    }

    /// Accept an asset for loading. Oversized assets are rejected before any
    /// state changes. A newer request for the same target supersedes older
    /// ones.
    pub fn begin(&mut self, scene: &SceneState, target: AttachTarget, asset: SoundAsset) -> EditResult<LoadRequest> {
        let size_kb = asset.size_kb();
        if size_kb > self.max_kb {
            log::warn!("{} is {} KB, over the {} KB limit", asset.name, size_kb, self.max_kb);
            return Err(EditError::AssetTooLarge {
                size_kb,
                limit_kb: self.max_kb,
            });
        }
        if !target.is_valid(scene) {
            return Err(EditError::UnknownEntity(target.entity()));
        }

        let ticket = LoadTicket(self.ticket());
        let request = LoadRequest {
            ticket,
            target,
            asset,
        };
        self.loads.insert(ticket, request.clone());
        self.latest.insert(target, ticket);
        Ok(request)
    }

    /// Finish a load. The stale guard runs once, here: the request must be
    /// the latest for its target and the target must still exist.
    pub fn complete(
        &mut self,
        ticket: LoadTicket,
        outcome: Result<LoadedSound, MediaError>,
        scene: &mut SceneState,
        aim: Option<(f32, f32)>,
        shared: bool,
        now: f64,
    ) -> EditResult<LoadStage> {
        let Some(request) = self.loads.remove(&ticket) else {
            return Err(EditError::StaleAsyncResult);
        };
        if self.latest.get(&request.target) != Some(&ticket) {
            log::debug!("load of {} superseded", request.asset.name);
            return Err(EditError::StaleAsyncResult);
        }
        self.latest.remove(&request.target);
        if !request.target.is_valid(scene) {
            log::debug!("target of {} is gone", request.asset.name);
            return Err(EditError::StaleAsyncResult);
        }

        let loaded = match outcome {
            Ok(loaded) => loaded,
            Err(error) => {
                log::warn!("could not load {}: {}", request.asset.name, error);
                return Ok(LoadStage::Failed {
                    cleanup: request.prelude().map(|_| EditAction::FinishSoundLoad(request.target.entity())),
                    error,
                });
            }
        };

        let mut asset = request.asset;
        asset.duration = loaded.duration;
        let entity = request.target.entity();
        let entity_name = scene
            .entity(entity)
            .map(|e| e.name.clone())
            .unwrap_or_default();

        let (actions, upload) = match request.target {
            AttachTarget::Sound(_) => {
                let is_zone = scene.entity(entity).and_then(|e| e.as_zone()).is_some();
                let path = if is_zone {
                    AssetPath::zone(entity_name, asset.name.clone())
                } else {
                    AssetPath::object(entity_name, asset.name.clone())
                };
                let actions = vec![
                    EditAction::AttachSound {
                        entity,
                        cone: None,
                        asset,
                    },
                    EditAction::FinishSoundLoad(entity),
                ];
                (actions, shared.then(|| (path, PendingUpload { entity, cone: None })))
            }
            AttachTarget::NewCone(_) => {
                let id = scene.allocate_cone_id();
                let uuid = cone_uuid(&self.editor_id, id);
                let path = AssetPath::cone(entity_name, uuid.clone(), asset.name.clone());
                let mut slot = SoundSlot::new(asset);
                if !scene.muted {
                    slot.user_wants_playing = true;
                    slot.playback.play(now);
                }
                let mut cone = ConeSource::new(id, uuid.clone(), slot);
                if let Some((latitude, longitude)) = aim {
                    cone.latitude = latitude;
                    cone.longitude = longitude;
                }
                let actions = vec![EditAction::AddCone { entity, cone }];
                let pending = PendingUpload {
                    entity,
                    cone: Some((id, uuid)),
                };
                (actions, shared.then(|| (path, pending)))
            }
            AttachTarget::ReplaceCone { cone, .. } => {
                let uuid = scene
                    .entity(entity)
                    .and_then(|e| e.as_object())
                    .and_then(|o| o.cone(cone))
                    .map(|c| c.uuid.clone())
                    .unwrap_or_default();
                let path = AssetPath::cone(entity_name, uuid.clone(), asset.name.clone());
                let actions = vec![EditAction::AttachSound {
                    entity,
                    cone: Some(cone),
                    asset,
                }];
                let pending = PendingUpload {
                    entity,
                    cone: Some((cone, uuid)),
                };
                (actions, shared.then(|| (path, pending)))
            }
        };

        let upload = upload.map(|(path, pending)| {
            let ticket = UploadTicket(self.ticket());
            self.uploads.insert(ticket, pending);
            UploadRequest { ticket, path }
        });
        log::info!("sound loaded for entity {}", entity);
        Ok(LoadStage::Loaded { actions, upload })
    }

    /// The bulk store finished an upload. A stored cone blob lets the cone
    /// sync; a failed upload leaves it local.
    pub fn complete_upload(
        &mut self,
        ticket: UploadTicket,
        outcome: Result<(), String>,
        scene: &SceneState,
    ) -> EditResult<Option<EditAction>> {
        let Some(pending) = self.uploads.remove(&ticket) else {
            return Err(EditError::StaleAsyncResult);
        };
        if let Err(e) = outcome {
            log::warn!(target: "sync", "asset upload for entity {} failed: {}", pending.entity, e);
            return Ok(None);
        }
        let Some((cone, uuid)) = pending.cone else {
            return Ok(None);
        };
        let still_there = scene
            .entity(pending.entity)
            .and_then(|e| e.as_object())
            .and_then(|o| o.cone(cone))
            .is_some_and(|c| c.uuid == uuid);
        if !still_there {
            log::debug!("uploaded cone {} no longer exists", uuid);
            return Err(EditError::StaleAsyncResult);
        }
        Ok(Some(EditAction::ConeUploaded {
            entity: pending.entity,
            cone,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use soundstage_types::reduce::reduce_action;
    use soundstage_types::Vec3;

    fn loaded(duration: f64) -> Result<LoadedSound, MediaError> {
        Ok(LoadedSound { duration })
    }

    #[test]
    fn oversized_assets_are_rejected_up_front() {
        let mut scene = SceneState::new();
        let obj = scene.add_object("o", Vec3::default());
        let mut pipeline = AssetPipeline::new(100, "ed");
        let err = pipeline
            .begin(&scene, AttachTarget::Sound(obj), SoundAsset::new("big.wav", 101 * 1024, 0.0))
            .unwrap_err();
        assert_eq!(err, EditError::AssetTooLarge { size_kb: 101, limit_kb: 100 });
        assert_eq!(pipeline.pending_loads(), 0);
        // Exactly at the ceiling after rounding is fine.
        assert!(pipeline
            .begin(&scene, AttachTarget::Sound(obj), SoundAsset::new("ok.wav", 100 * 1024 + 400, 0.0))
            .is_ok());
    }

    #[test]
    fn superseded_load_is_stale() {
        let mut scene = SceneState::new();
        let obj = scene.add_object("o", Vec3::default());
        let mut pipeline = AssetPipeline::new(1000, "ed");
        let first = pipeline.begin(&scene, AttachTarget::Sound(obj), SoundAsset::new("a.wav", 1, 0.0)).unwrap();
        let second = pipeline.begin(&scene, AttachTarget::Sound(obj), SoundAsset::new("b.wav", 1, 0.0)).unwrap();
        assert_eq!(
            pipeline.complete(first.ticket, loaded(1.0), &mut scene, None, false, 0.0),
            Err(EditError::StaleAsyncResult)
        );
        assert!(matches!(
            pipeline.complete(second.ticket, loaded(1.0), &mut scene, None, false, 0.0),
            Ok(LoadStage::Loaded { .. })
        ));
    }

    #[test]
    fn deleted_entity_is_stale() {
        let mut scene = SceneState::new();
        let obj = scene.add_object("o", Vec3::default());
        let mut pipeline = AssetPipeline::new(1000, "ed");
        let req = pipeline.begin(&scene, AttachTarget::NewCone(obj), SoundAsset::new("a.wav", 1, 0.0)).unwrap();
        scene.remove(obj);
        assert_eq!(
            pipeline.complete(req.ticket, loaded(1.0), &mut scene, None, true, 0.0),
            Err(EditError::StaleAsyncResult)
        );
    }

    #[test]
    fn new_cone_is_aimed_and_uploaded_in_a_room() {
        let mut scene = SceneState::new();
        let obj = scene.add_object("o", Vec3::default());
        let mut pipeline = AssetPipeline::new(1000, "ed");
        let req = pipeline.begin(&scene, AttachTarget::NewCone(obj), SoundAsset::new("c.wav", 1, 0.0)).unwrap();
        assert_eq!(req.prelude(), None);

        let stage = pipeline
            .complete(req.ticket, loaded(4.0), &mut scene, Some((0.3, -1.2)), true, 0.0)
            .unwrap();
        let LoadStage::Loaded { actions, upload } = stage else {
            panic!("load failed");
        };
        let EditAction::AddCone { cone, .. } = &actions[0] else {
            panic!("unexpected {:?}", actions);
        };
        assert_eq!((cone.latitude, cone.longitude), (0.3, -1.2));
        assert_eq!(cone.sound.asset.duration, 4.0);
        assert!(!cone.upload_complete);
        let upload = upload.unwrap();
        assert_eq!(upload.path.relative(), format!("soundObjects/o/{}/c.wav", cone.uuid));

        reduce_action(&actions[0], &mut scene, 0.0);
        let done = pipeline.complete_upload(upload.ticket, Ok(()), &scene).unwrap();
        assert_eq!(done, Some(EditAction::ConeUploaded { entity: obj, cone: cone.id }));
    }

    #[test]
    fn solo_sessions_do_not_upload() {
        let mut scene = SceneState::new();
        let zone = scene.add_zone("z", Vec3::default());
        let mut pipeline = AssetPipeline::new(1000, "ed");
        let req = pipeline.begin(&scene, AttachTarget::Sound(zone), SoundAsset::new("amb.wav", 1, 0.0)).unwrap();
        assert_eq!(req.prelude(), Some(EditAction::BeginSoundLoad(zone)));
        match pipeline.complete(req.ticket, loaded(2.0), &mut scene, None, false, 0.0) {
            Ok(LoadStage::Loaded { actions, upload }) => {
                assert_eq!(upload, None);
                assert_eq!(actions.last(), Some(&EditAction::FinishSoundLoad(zone)));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn failed_decode_releases_the_hold() {
        let mut scene = SceneState::new();
        let zone = scene.add_zone("z", Vec3::default());
        let mut pipeline = AssetPipeline::new(1000, "ed");
        let req = pipeline.begin(&scene, AttachTarget::Sound(zone), SoundAsset::new("bad.wav", 1, 0.0)).unwrap();
        let outcome = Err(MediaError::Backend("decode".into()));
        match pipeline.complete(req.ticket, outcome, &mut scene, None, false, 0.0) {
            Ok(LoadStage::Failed { cleanup, .. }) => {
                assert_eq!(cleanup, Some(EditAction::FinishSoundLoad(zone)))
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn upload_for_removed_cone_is_stale() {
        let mut scene = SceneState::new();
        let obj = scene.add_object("o", Vec3::default());
        let mut pipeline = AssetPipeline::new(1000, "ed");
        let req = pipeline.begin(&scene, AttachTarget::NewCone(obj), SoundAsset::new("c.wav", 1, 0.0)).unwrap();
        let Ok(LoadStage::Loaded { actions, upload }) =
            pipeline.complete(req.ticket, loaded(1.0), &mut scene, None, true, 0.0)
        else {
            panic!("load failed");
        };
        reduce_action(&actions[0], &mut scene, 0.0);
        if let EditAction::AddCone { cone, .. } = &actions[0] {
            reduce_action(&EditAction::RemoveCone { entity: obj, cone: cone.id }, &mut scene, 0.0);
        }
        assert_eq!(
            pipeline.complete_upload(upload.unwrap().ticket, Ok(()), &scene),
            Err(EditError::StaleAsyncResult)
        );
    }
}
