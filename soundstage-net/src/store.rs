//! The shared store seen from this crate: path-addressed updates and blob
//! deletes keyed by room.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard};

use soundstage_types::FieldUpdates;

use crate::framing::write_frame;
use crate::paths::room_of;
use crate::protocol::{RemoteEditRecord, StoreOp};
use crate::purge::{BlobEntry, PurgeRequest};

/// A failed remote write.
#[derive(Debug)]
pub enum StoreError {
    /// The store refused the write.
    Rejected(String),
    /// The store went away.
    Disconnected,
    Io(io::Error),
    Json(serde_json::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Rejected(why) => write!(f, "write rejected: {}", why),
            StoreError::Disconnected => write!(f, "store disconnected"),
            StoreError::Io(e) => write!(f, "io error: {}", e),
            StoreError::Json(e) => write!(f, "encoding error: {}", e),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io(e) => Some(e),
            StoreError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for StoreError {
    fn from(e: io::Error) -> Self {
        if matches!(
            e.kind(),
            io::ErrorKind::BrokenPipe | io::ErrorKind::ConnectionReset | io::ErrorKind::NotConnected
        ) {
            StoreError::Disconnected
        } else {
            StoreError::Io(e)
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Json(e)
    }
}

pub trait RemoteStore: Send {
    /// Merge `record.field_updates` into the record at its path. `null`
    /// values remove the field.
    fn update(&mut self, record: &RemoteEditRecord) -> Result<(), StoreError>;

    fn delete_blob(&mut self, path: &str) -> Result<(), StoreError>;

    fn apply(&mut self, op: &StoreOp) -> Result<(), StoreError> {
        match op {
            StoreOp::Update(record) => self.update(record),
            StoreOp::DeleteBlob { path } => self.delete_blob(path),
        }
    }
}

#[derive(Debug, Default)]
struct MemoryData {
    records: HashMap<(String, String), FieldUpdates>,
    blobs: BTreeMap<String, u64>,
    rejected: HashSet<String>,
    connected: bool,
}

/// In-process store. Clones share the same data so a handle kept by the
/// caller observes writes made from the writer thread.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryData>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MemoryData {
                connected: true,
                ..MemoryData::default()
            })),
        }
    }

    fn data(&self) -> MutexGuard<'_, MemoryData> {
        // A panicked writer leaves consistent data behind; keep going.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn record(&self, room: &str, path: &str) -> Option<FieldUpdates> {
        self.data()
            .records
            .get(&(room.to_string(), path.to_string()))
            .cloned()
    }

    pub fn record_count(&self) -> usize {
        self.data().records.len()
    }

    pub fn put_blob(&self, path: impl Into<String>, size_bytes: u64) {
        self.data().blobs.insert(path.into(), size_bytes);
    }

    pub fn has_blob(&self, path: &str) -> bool {
        self.data().blobs.contains_key(path)
    }

    pub fn blobs(&self) -> Vec<BlobEntry> {
        self.data()
            .blobs
            .iter()
            .map(|(path, size)| BlobEntry::new(path.clone(), *size))
            .collect()
    }

    /// Make every write whose path (record or blob) starts with `prefix` fail.
    pub fn reject_prefix(&self, prefix: impl Into<String>) {
        self.data().rejected.insert(prefix.into());
    }

    pub fn set_connected(&self, connected: bool) {
        self.data().connected = connected;
    }

    /// Delete every blob the request covers. Returns how many went.
    pub fn purge(&self, request: &PurgeRequest) -> usize {
        let mut data = self.data();
        let before = data.blobs.len();
        data.blobs.retain(|path, _| !request.covers(path));
        before - data.blobs.len()
    }

    /// Rooms that still hold blobs.
    pub fn rooms(&self) -> Vec<String> {
        let data = self.data();
        let mut rooms: Vec<String> = data.blobs.keys().map(|p| room_of(p).to_string()).collect();
        rooms.dedup();
        rooms
    }
}

impl MemoryData {
    fn check(&self, target: &str) -> Result<(), StoreError> {
        if !self.connected {
            return Err(StoreError::Disconnected);
        }
        if let Some(prefix) = self.rejected.iter().find(|p| target.starts_with(p.as_str())) {
            return Err(StoreError::Rejected(format!("permission denied under {}", prefix)));
        }
        Ok(())
    }
}

impl RemoteStore for MemoryStore {
    fn update(&mut self, record: &RemoteEditRecord) -> Result<(), StoreError> {
        let mut data = self.data();
        data.check(&format!("{}/{}", record.room_id, record.entity_path))?;
        let key = (record.room_id.0.clone(), record.entity_path.clone());
        let stored = data.records.entry(key).or_default();
        for (field, value) in &record.field_updates {
            if value.is_null() {
                stored.remove(field);
            } else {
                stored.insert(field.clone(), value.clone());
            }
        }
        Ok(())
    }

    fn delete_blob(&mut self, path: &str) -> Result<(), StoreError> {
        let mut data = self.data();
        data.check(path)?;
        // Deleting a missing blob is not an error for the caller.
        data.blobs.remove(path);
        Ok(())
    }
}

/// Store that forwards every operation as a length-prefixed JSON frame,
/// e.g. to a relay over a socket or to a capture file.
pub struct StreamStore<W: Write + Send> {
    writer: W,
}

impl<W: Write + Send> StreamStore<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> RemoteStore for StreamStore<W> {
    fn update(&mut self, record: &RemoteEditRecord) -> Result<(), StoreError> {
        write_frame(&mut self.writer, &StoreOp::Update(record.clone()))
    }

    fn delete_blob(&mut self, path: &str) -> Result<(), StoreError> {
        write_frame(
            &mut self.writer,
            &StoreOp::DeleteBlob {
                path: path.to_string(),
            },
        )
    }

    fn apply(&mut self, op: &StoreOp) -> Result<(), StoreError> {
        write_frame(&mut self.writer, op)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{EditorId, RoomCode};
    use serde_json::{json, Value};
    use soundstage_types::into_fields;

    fn record(path: &str, fields: Value) -> RemoteEditRecord {
        RemoteEditRecord::new(
            RoomCode::new("R"),
            path,
            into_fields(fields),
            EditorId::new("ed1"),
        )
    }

    #[test]
    fn updates_merge_and_null_removes() {
        let mut store = MemoryStore::new();
        store
            .update(&record("objects/o", json!({"sound": "a.wav", "volume": 1.0})))
            .unwrap();
        store
            .update(&record("objects/o", json!({"sound": null, "isPlaying": true})))
            .unwrap();

        let stored = store.record("R", "objects/o").unwrap();
        assert!(stored.get("sound").is_none());
        assert_eq!(stored["volume"], json!(1.0));
        assert_eq!(stored["isPlaying"], json!(true));
        assert_eq!(stored["lastEdit"], json!("ed1"));
    }

    #[test]
    fn rejected_prefix_fails_the_write() {
        let mut store = MemoryStore::new();
        store.reject_prefix("R/zones");
        let err = store.update(&record("zones/z", json!({"scale": 2.0}))).unwrap_err();
        assert!(matches!(err, StoreError::Rejected(_)));
        assert!(store.record("R", "zones/z").is_none());
    }

    #[test]
    fn disconnected_store_refuses_everything() {
        let mut store = MemoryStore::new();
        store.put_blob("R/soundObjects/o/a.wav", 10);
        store.set_connected(false);
        assert!(matches!(
            store.delete_blob("R/soundObjects/o/a.wav"),
            Err(StoreError::Disconnected)
        ));
        assert!(store.has_blob("R/soundObjects/o/a.wav"));
    }

    #[test]
    fn broken_pipe_maps_to_disconnected() {
        let err: StoreError = io::Error::new(io::ErrorKind::BrokenPipe, "gone").into();
        assert!(matches!(err, StoreError::Disconnected));
        let err: StoreError = io::Error::new(io::ErrorKind::Other, "disk").into();
        assert!(matches!(err, StoreError::Io(_)));
    }

    #[test]
    fn stream_store_writes_frames() {
        let mut store = StreamStore::new(Vec::new());
        store.delete_blob("R/zones/z/a.wav").unwrap();
        let bytes = store.into_inner();
        let mut cursor = io::Cursor::new(bytes);
        let op: StoreOp = crate::framing::read_frame(&mut cursor).unwrap();
        assert_eq!(
            op,
            StoreOp::DeleteBlob {
                path: "R/zones/z/a.wav".into()
            }
        );
    }
}
