use std::fs::File;
use std::io::BufReader;

use serde_json::json;
use soundstage_net::framing::read_frame;
use soundstage_net::{EditorId, RoomCode, StoreOp, StoreWriter, StreamStore, SyncAdapter};
use soundstage_types::{into_fields, AssetPath, EntityPath};

#[test]
fn stream_store_captures_ops_in_submission_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ops.bin");

    let writer = StoreWriter::spawn(StreamStore::new(File::create(&path).unwrap())).unwrap();
    let mut adapter = SyncAdapter::new(EditorId::new("ed2"), writer);
    adapter.join_room(RoomCode::new("R9"));
    adapter.sync_field(&EntityPath::Object("o".into()), into_fields(json!({"volume": 0.5})));
    adapter.delete_asset(&AssetPath::cone("o", "ed2-c", "a.wav"));
    let report = adapter.close();
    assert_eq!(report.written, 2);

    let mut reader = BufReader::new(File::open(&path).unwrap());
    match read_frame::<_, StoreOp>(&mut reader).unwrap() {
        StoreOp::Update(record) => {
            assert_eq!(record.room_id, RoomCode::new("R9"));
            assert_eq!(record.entity_path, "objects/o");
            assert_eq!(record.field_updates["lastEdit"], json!("ed2"));
        }
        other => panic!("expected update, got {:?}", other),
    }
    assert_eq!(
        read_frame::<_, StoreOp>(&mut reader).unwrap(),
        StoreOp::DeleteBlob {
            path: "R9/soundObjects/o/ed2-c/a.wav".into()
        }
    );
}
