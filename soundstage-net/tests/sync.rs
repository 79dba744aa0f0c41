mod common;

use common::*;
use serde_json::json;
use soundstage_net::{usage_summary, PurgeRequest, RoomCode};
use soundstage_types::reduce::reduce_action;
use soundstage_types::{
    into_fields, AssetPath, EditAction, EntityPath, FieldTarget, ParamField, SceneState,
    SyncIntent, SyncSink, Vec3,
};

#[test]
fn outside_a_room_nothing_is_written() {
    let (mut adapter, store) = adapter();
    assert!(!adapter.is_shared());

    adapter.submit(SyncIntent::update(
        EntityPath::Object("obj1".into()),
        into_fields(json!({"volume": 1.0})),
    ));
    adapter.submit(SyncIntent::DeleteAsset(AssetPath::object("obj1", "a.wav")));

    let report = adapter.close();
    assert_eq!(report.written, 0);
    assert_eq!(report.dropped, 0);
    assert_eq!(store.record_count(), 0);
}

#[test]
fn reducer_output_lands_at_the_entity_path_with_last_edit() {
    let mut scene = SceneState::new();
    let obj = scene.add_object("obj1", Vec3::default());
    let result = reduce_action(
        &EditAction::Adjust {
            target: FieldTarget::new(obj, ParamField::PositionX),
            delta: 3.0,
        },
        &mut scene,
        0.0,
    );
    assert!(!result.sync.is_empty());

    let (mut adapter, store) = joined_adapter();
    for intent in result.sync {
        adapter.submit(intent);
    }
    adapter.close();

    let record = store.record(ROOM, "objects/obj1").expect("object record");
    assert!(record.contains_key("position"));
    assert_eq!(record["lastEdit"], json!("ed1"));
}

#[test]
fn listener_is_keyed_by_editor() {
    let (mut adapter, store) = joined_adapter();
    adapter.sync_field(&EntityPath::Listener, into_fields(json!({"rotation": 0.5})));
    adapter.close();

    assert_eq!(
        store.record(ROOM, "users/ed1").unwrap()["rotation"],
        json!(0.5)
    );
}

#[test]
fn detach_clears_fields_and_deletes_the_blob() {
    let (mut adapter, store) = joined_adapter();
    store.put_blob("ROOM1/zones/z/amb.wav", 2048);
    adapter.sync_field(
        &EntityPath::Zone("z".into()),
        into_fields(json!({"sound": "amb.wav", "isPlaying": true})),
    );
    adapter.sync_field(
        &EntityPath::Zone("z".into()),
        into_fields(json!({"sound": null, "isPlaying": null})),
    );
    adapter.submit(SyncIntent::DeleteAsset(AssetPath::zone("z", "amb.wav")));
    adapter.close();

    let record = store.record(ROOM, "zones/z").unwrap();
    assert!(record.get("sound").is_none());
    assert!(record.get("isPlaying").is_none());
    assert!(!store.has_blob("ROOM1/zones/z/amb.wav"));
}

#[test]
fn cone_record_is_nested_under_its_object() {
    let (mut adapter, store) = joined_adapter();
    adapter.sync_field(
        &EntityPath::Cone {
            object: "obj1".into(),
            cone: "ed1-abc".into(),
        },
        into_fields(json!({"spread": 0.5})),
    );
    adapter.close();

    assert!(store.record(ROOM, "objects/obj1/cones/ed1-abc").is_some());
}

#[test]
fn failed_writes_are_dropped_and_later_writes_still_land() {
    let (mut adapter, store) = joined_adapter();
    store.reject_prefix("ROOM1/zones");

    adapter.sync_field(&EntityPath::Zone("z".into()), into_fields(json!({"scale": 2.0})));
    adapter.sync_field(&EntityPath::Object("o".into()), into_fields(json!({"volume": 1.0})));
    let report = adapter.close();

    assert_eq!(report.failed, 1);
    assert_eq!(report.written, 1);
    assert!(store.record(ROOM, "zones/z").is_none());
    assert!(store.record(ROOM, "objects/o").is_some());
}

#[test]
fn leaving_the_room_stops_writes() {
    let (mut adapter, store) = joined_adapter();
    adapter.sync_field(&EntityPath::Object("o".into()), into_fields(json!({"volume": 1.0})));
    assert_eq!(adapter.leave_room(), Some(RoomCode::new(ROOM)));
    assert!(!adapter.sync_field(&EntityPath::Object("p".into()), into_fields(json!({"volume": 1.0}))));
    adapter.close();

    assert!(store.record(ROOM, "objects/o").is_some());
    assert!(store.record(ROOM, "objects/p").is_none());
}

#[test]
fn room_close_purges_sound_objects_only() {
    let (adapter, store) = joined_adapter();
    store.put_blob("ROOM1/soundObjects/o/a.wav", 1024 * 1024);
    store.put_blob("ROOM1/soundObjects/o/ed1-c/b.wav", 1024 * 1024);
    store.put_blob("ROOM1/zones/z/amb.wav", 1024 * 1024);
    store.put_blob("OTHER/soundObjects/o/a.wav", 1024 * 1024);

    let before = usage_summary(&store.blobs());
    assert_eq!(before.sizes["ROOM1"], "3.00");
    assert_eq!(before.total_size, "4.00");

    let removed = store.purge(&PurgeRequest::new(RoomCode::new(ROOM)));
    assert_eq!(removed, 2);

    let after = usage_summary(&store.blobs());
    assert_eq!(after.sizes["ROOM1"], "1.00");
    assert_eq!(after.sizes["OTHER"], "1.00");
    assert_eq!(store.rooms(), vec!["OTHER".to_string(), "ROOM1".to_string()]);
    adapter.close();
}
