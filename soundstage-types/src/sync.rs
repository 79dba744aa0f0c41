//! Remote sync intents.
//!
//! Reducers describe *what* must be told to the shared store as `SyncIntent`s.
//! A `SyncSink` decides whether and how they are written.

use serde::{Deserialize, Serialize};

/// Field updates written at one entity path. Values are plain JSON so `null`
/// can express removal of a remote field.
pub type FieldUpdates = serde_json::Map<String, serde_json::Value>;

/// Addressable remote record of an entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityPath {
    Object(String),
    Cone { object: String, cone: String },
    Zone(String),
    /// The local listener head; the store keys it by editor identity.
    Listener,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetFolder {
    SoundObjects,
    Zones,
}

impl AssetFolder {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetFolder::SoundObjects => "soundObjects",
            AssetFolder::Zones => "zones",
        }
    }
}

/// Location of a stored asset blob, relative to the room.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetPath {
    pub folder: AssetFolder,
    pub entity: String,
    pub cone: Option<String>,
    pub filename: String,
}

impl AssetPath {
    pub fn object(entity: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            folder: AssetFolder::SoundObjects,
            entity: entity.into(),
            cone: None,
            filename: filename.into(),
        }
    }

    pub fn cone(
        entity: impl Into<String>,
        cone: impl Into<String>,
        filename: impl Into<String>,
    ) -> Self {
        Self {
            folder: AssetFolder::SoundObjects,
            entity: entity.into(),
            cone: Some(cone.into()),
            filename: filename.into(),
        }
    }

    pub fn zone(entity: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            folder: AssetFolder::Zones,
            entity: entity.into(),
            cone: None,
            filename: filename.into(),
        }
    }

    /// `folder/entity[/cone]/filename`
    pub fn relative(&self) -> String {
        match &self.cone {
            Some(cone) => format!(
                "{}/{}/{}/{}",
                self.folder.as_str(),
                self.entity,
                cone,
                self.filename
            ),
            None => format!("{}/{}/{}", self.folder.as_str(), self.entity, self.filename),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SyncIntent {
    Update { path: EntityPath, fields: FieldUpdates },
    DeleteAsset(AssetPath),
}

impl SyncIntent {
    pub fn update(path: EntityPath, fields: FieldUpdates) -> Self {
        SyncIntent::Update { path, fields }
    }
}

/// Receiver of sync intents. Implementations must not block the caller.
pub trait SyncSink {
    /// True when the session is part of a shared room.
    fn is_shared(&self) -> bool;
    fn submit(&mut self, intent: SyncIntent);
}

/// Sink for solo sessions: never shared, drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineSink;

impl SyncSink for OfflineSink {
    fn is_shared(&self) -> bool {
        false
    }

    fn submit(&mut self, _intent: SyncIntent) {}
}

/// Unwrap a `json!({..})` object literal into `FieldUpdates`. Non-object
/// values yield an empty map.
pub fn into_fields(value: serde_json::Value) -> FieldUpdates {
    match value {
        serde_json::Value::Object(map) => map,
        _ => FieldUpdates::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_paths() {
        assert_eq!(AssetPath::cone("obj1", "c1", "a.wav").relative(), "soundObjects/obj1/c1/a.wav");
        assert_eq!(AssetPath::object("obj1", "a.wav").relative(), "soundObjects/obj1/a.wav");
        assert_eq!(AssetPath::zone("z", "b.mp3").relative(), "zones/z/b.mp3");
    }

    #[test]
    fn fields_allow_null() {
        let f = into_fields(serde_json::json!({ "sound": null, "volume": 1.5 }));
        assert!(f["sound"].is_null());
        assert_eq!(f["volume"], serde_json::json!(1.5));
    }
}
