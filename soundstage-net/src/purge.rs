//! Room close purge and storage usage.
//!
//! When the last editor leaves a room its uploaded sound object blobs are
//! deleted by prefix. The storage service runs elsewhere; these are the
//! request and report shapes plus the aggregation it performs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::paths::room_of;
use crate::protocol::RoomCode;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurgeRequest {
    pub room_code: RoomCode,
}

impl PurgeRequest {
    pub fn new(room: RoomCode) -> Self {
        Self { room_code: room }
    }

    /// `room/soundObjects/`
    pub fn prefix(&self) -> String {
        format!("{}/soundObjects/", self.room_code)
    }

    pub fn covers(&self, blob_path: &str) -> bool {
        blob_path.starts_with(&self.prefix())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobEntry {
    pub path: String,
    pub size_bytes: u64,
}

impl BlobEntry {
    pub fn new(path: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            path: path.into(),
            size_bytes,
        }
    }
}

/// Per-room usage in megabytes, formatted with two decimals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageSummary {
    pub num_subdirectories: usize,
    pub sizes: BTreeMap<String, String>,
    pub total_size: String,
}

pub fn format_mb(bytes: u64) -> String {
    format!("{:.2}", bytes as f64 / BYTES_PER_MB)
}

/// Aggregate blob sizes by their top-level room segment.
pub fn usage_summary(blobs: &[BlobEntry]) -> UsageSummary {
    let mut per_room: BTreeMap<String, u64> = BTreeMap::new();
    let mut total = 0u64;
    for blob in blobs {
        total += blob.size_bytes;
        *per_room.entry(room_of(&blob.path).to_string()).or_default() += blob.size_bytes;
    }
    UsageSummary {
        num_subdirectories: per_room.len(),
        sizes: per_room
            .into_iter()
            .map(|(room, bytes)| (room, format_mb(bytes)))
            .collect(),
        total_size: format_mb(total),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn purge_covers_only_sound_objects_of_the_room() {
        let request = PurgeRequest::new(RoomCode::new("AB12"));
        assert_eq!(request.prefix(), "AB12/soundObjects/");
        assert!(request.covers("AB12/soundObjects/o/ed1-c/a.wav"));
        assert!(!request.covers("AB12/zones/z/a.wav"));
        assert!(!request.covers("AB123/soundObjects/o/a.wav"));
    }

    #[test]
    fn request_body_uses_room_code_key() {
        let json = serde_json::to_value(PurgeRequest::new(RoomCode::new("X"))).unwrap();
        assert_eq!(json, serde_json::json!({"roomCode": "X"}));
    }

    #[test]
    fn usage_is_grouped_per_room_in_megabytes() {
        let blobs = vec![
            BlobEntry::new("A/soundObjects/o/a.wav", 1024 * 1024),
            BlobEntry::new("A/zones/z/b.wav", 512 * 1024),
            BlobEntry::new("B/soundObjects/o/c.wav", 10_000),
        ];
        let summary = usage_summary(&blobs);
        assert_eq!(summary.num_subdirectories, 2);
        assert_eq!(summary.sizes["A"], "1.50");
        assert_eq!(summary.sizes["B"], "0.01");
        assert_eq!(summary.total_size, "1.51");
    }

    #[test]
    fn empty_store_reports_zero() {
        let summary = usage_summary(&[]);
        assert_eq!(summary.num_subdirectories, 0);
        assert_eq!(summary.total_size, "0.00");
    }
}
