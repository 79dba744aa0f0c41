//! Wire types written to the shared store.
//!
//! A completed mutation becomes one `RemoteEditRecord`: a room-scoped,
//! entity-keyed field update tagged with the editor that made it. Records are
//! fire-and-forget; this crate never reads them back.

use serde::{Deserialize, Serialize};

use soundstage_types::FieldUpdates;

/// Field stamped on every record with the id of the writing editor.
pub const LAST_EDIT_FIELD: &str = "lastEdit";

/// Code of a shared editing room.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoomCode(pub String);

impl RoomCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RoomCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity of an editing client.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EditorId(pub String);

impl EditorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteEditRecord {
    pub room_id: RoomCode,
    /// Store path of the entity inside the room, see [`crate::paths`].
    pub entity_path: String,
    /// Fields to merge. Already carries `lastEdit`.
    pub field_updates: FieldUpdates,
    pub editor_id: EditorId,
}

impl RemoteEditRecord {
    /// Build a record, merging `{lastEdit: editor}` into `fields`.
    pub fn new(
        room: RoomCode,
        entity_path: impl Into<String>,
        mut fields: FieldUpdates,
        editor: EditorId,
    ) -> Self {
        fields.insert(
            LAST_EDIT_FIELD.to_string(),
            serde_json::Value::String(editor.0.clone()),
        );
        Self {
            room_id: room,
            entity_path: entity_path.into(),
            field_updates: fields,
            editor_id: editor,
        }
    }
}

/// One operation against the remote store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StoreOp {
    Update(RemoteEditRecord),
    /// Delete a stored asset blob at `room/folder/entity[/cone]/filename`.
    DeleteBlob { path: String },
}

impl StoreOp {
    /// Where the operation lands, for logging.
    pub fn target(&self) -> String {
        match self {
            StoreOp::Update(record) => format!("{}/{}", record.room_id, record.entity_path),
            StoreOp::DeleteBlob { path } => path.clone(),
        }
    }
}
