//! Remote sync for soundstage editing sessions.
//!
//! Completed mutations reach this crate as [`SyncIntent`]s. The
//! [`SyncAdapter`] stamps them with the editor identity, addresses them inside
//! the current room and hands them to a background [`StoreWriter`]. Outside a
//! room nothing is written.
//!
//! [`SyncIntent`]: soundstage_types::SyncIntent

pub mod framing;
pub mod paths;
pub mod protocol;
pub mod purge;
pub mod store;
pub mod sync;
pub mod writer;

pub use protocol::{EditorId, RemoteEditRecord, RoomCode, StoreOp, LAST_EDIT_FIELD};
pub use purge::{usage_summary, BlobEntry, PurgeRequest, UsageSummary};
pub use store::{MemoryStore, RemoteStore, StoreError, StreamStore};
pub use sync::SyncAdapter;
pub use writer::{StoreWriter, WriterReport};
