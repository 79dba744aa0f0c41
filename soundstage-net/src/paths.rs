//! Deterministic store paths.

use soundstage_types::{AssetPath, EntityPath};

use crate::protocol::{EditorId, RoomCode};

/// Record path of an entity inside a room.
///
/// The listener head is per editor, so it is keyed by the editor identity.
pub fn record_path(path: &EntityPath, editor: &EditorId) -> String {
    match path {
        EntityPath::Object(name) => format!("objects/{}", name),
        EntityPath::Cone { object, cone } => format!("objects/{}/cones/{}", object, cone),
        EntityPath::Zone(name) => format!("zones/{}", name),
        EntityPath::Listener => format!("users/{}", editor.as_str()),
    }
}

/// Blob path of a stored asset: `room/folder/entity[/cone]/filename`.
pub fn blob_path(room: &RoomCode, asset: &AssetPath) -> String {
    format!("{}/{}", room.as_str(), asset.relative())
}

/// Room segment of a blob path.
pub fn room_of(blob: &str) -> &str {
    blob.split('/').next().unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_paths() {
        let ed = EditorId::new("ed1");
        assert_eq!(record_path(&EntityPath::Object("o".into()), &ed), "objects/o");
        assert_eq!(
            record_path(
                &EntityPath::Cone {
                    object: "o".into(),
                    cone: "ed1-c".into()
                },
                &ed
            ),
            "objects/o/cones/ed1-c"
        );
        assert_eq!(record_path(&EntityPath::Zone("z".into()), &ed), "zones/z");
        assert_eq!(record_path(&EntityPath::Listener, &ed), "users/ed1");
    }

    #[test]
    fn blob_paths_are_room_prefixed() {
        let room = RoomCode::new("ROOM");
        assert_eq!(
            blob_path(&room, &AssetPath::object("o", "a.wav")),
            "ROOM/soundObjects/o/a.wav"
        );
        assert_eq!(
            blob_path(&room, &AssetPath::zone("z", "amb.mp3")),
            "ROOM/zones/z/amb.mp3"
        );
        assert_eq!(room_of("ROOM/zones/z/amb.mp3"), "ROOM");
    }
}
