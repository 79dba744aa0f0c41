#![allow(dead_code)]

use soundstage_net::{EditorId, MemoryStore, RoomCode, StoreWriter, SyncAdapter};

pub const ROOM: &str = "ROOM1";

/// Adapter for `ed1` writing into a fresh memory store. The returned store
/// shares data with the one owned by the writer thread.
pub fn adapter() -> (SyncAdapter, MemoryStore) {
    let store = MemoryStore::new();
    let writer = StoreWriter::spawn(store.clone()).expect("spawn writer");
    (SyncAdapter::new(EditorId::new("ed1"), writer), store)
}

pub fn joined_adapter() -> (SyncAdapter, MemoryStore) {
    let (mut adapter, store) = adapter();
    adapter.join_room(RoomCode::new(ROOM));
    (adapter, store)
}
