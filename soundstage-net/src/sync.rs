//! Remote sync adapter.
//!
//! Turns sync intents from dispatch into store operations for the current
//! room. Outside a room every call is a no-op. Writes go through the
//! background writer and are never awaited; last writer wins.

use soundstage_types::{AssetPath, EntityPath, FieldUpdates, SyncIntent, SyncSink};

use crate::paths::{blob_path, record_path};
use crate::protocol::{EditorId, RemoteEditRecord, RoomCode, StoreOp};
use crate::writer::{StoreWriter, WriterReport};

pub struct SyncAdapter {
    editor: EditorId,
    room: Option<RoomCode>,
    writer: StoreWriter,
}

impl SyncAdapter {
    pub fn new(editor: EditorId, writer: StoreWriter) -> Self {
        Self {
            editor,
            room: None,
            writer,
        }
    }

    pub fn editor(&self) -> &EditorId {
        &self.editor
    }

    pub fn room(&self) -> Option<&RoomCode> {
        self.room.as_ref()
    }

    pub fn join_room(&mut self, room: RoomCode) {
        log::info!(target: "sync", "{} joined room {}", self.editor.as_str(), room);
        self.room = Some(room);
    }

    pub fn leave_room(&mut self) -> Option<RoomCode> {
        let left = self.room.take();
        if let Some(room) = &left {
            log::info!(target: "sync", "{} left room {}", self.editor.as_str(), room);
        }
        left
    }

    /// Write `fields` merged with `{lastEdit: editor}` at the entity's path.
    /// Returns whether a write was queued.
    pub fn sync_field(&mut self, path: &EntityPath, fields: FieldUpdates) -> bool {
        let Some(room) = &self.room else {
            return false;
        };
        let record = RemoteEditRecord::new(
            room.clone(),
            record_path(path, &self.editor),
            fields,
            self.editor.clone(),
        );
        self.writer.submit(StoreOp::Update(record))
    }

    /// Delete the stored blob of a detached asset.
    pub fn delete_asset(&mut self, asset: &AssetPath) -> bool {
        let Some(room) = &self.room else {
            return false;
        };
        let path = blob_path(room, asset);
        log::debug!(target: "sync", "deleting blob {}", path);
        self.writer.submit(StoreOp::DeleteBlob { path })
    }

    pub fn writer(&self) -> &StoreWriter {
        &self.writer
    }

    /// Drain outstanding writes and stop the writer thread.
    pub fn close(self) -> WriterReport {
        self.writer.shutdown()
    }
}

impl SyncSink for SyncAdapter {
    fn is_shared(&self) -> bool {
        self.room.is_some()
    }

    fn submit(&mut self, intent: SyncIntent) {
        match intent {
            SyncIntent::Update { path, fields } => {
                self.sync_field(&path, fields);
            }
            SyncIntent::DeleteAsset(asset) => {
                self.delete_asset(&asset);
            }
        }
    }
}
