//! Background writer for remote store operations.
//!
//! Operations are pushed to a bounded channel and written by a dedicated
//! thread, so dispatch never waits on the store. Failed writes are logged and
//! dropped; there is no retry.

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender, TrySendError};

use crate::protocol::StoreOp;
use crate::store::RemoteStore;

/// Capacity of the pending write queue.
pub const WRITE_QUEUE_CAPACITY: usize = 1024;

#[derive(Debug, Default)]
struct WriterStats {
    written: AtomicUsize,
    failed: AtomicUsize,
    dropped: AtomicUsize,
}

/// Counters at shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WriterReport {
    pub written: usize,
    pub failed: usize,
    pub dropped: usize,
}

pub struct StoreWriter {
    tx: Option<Sender<StoreOp>>,
    handle: Option<JoinHandle<()>>,
    stats: Arc<WriterStats>,
}

impl StoreWriter {
    /// Spawn the writer thread owning `store`.
    pub fn spawn<S: RemoteStore + 'static>(store: S) -> io::Result<Self> {
        Self::with_capacity(store, WRITE_QUEUE_CAPACITY)
    }

    pub fn with_capacity<S: RemoteStore + 'static>(store: S, capacity: usize) -> io::Result<Self> {
        let (tx, rx) = crossbeam_channel::bounded::<StoreOp>(capacity);
        let stats = Arc::new(WriterStats::default());
        let thread_stats = stats.clone();

        let handle = thread::Builder::new()
            .name("store-writer".into())
            .spawn(move || writer_loop(store, rx, thread_stats))?;

        Ok(Self {
            tx: Some(tx),
            handle: Some(handle),
            stats,
        })
    }

    /// Queue an operation. Returns `false` when it was dropped.
    pub fn submit(&self, op: StoreOp) -> bool {
        let Some(tx) = &self.tx else {
            return false;
        };
        match tx.try_send(op) {
            Ok(()) => true,
            Err(TrySendError::Full(op)) => {
                self.stats.dropped.fetch_add(1, Ordering::Relaxed);
                log::warn!(target: "sync", "write queue full, dropping write to {}", op.target());
                false
            }
            Err(TrySendError::Disconnected(op)) => {
                self.stats.dropped.fetch_add(1, Ordering::Relaxed);
                log::warn!(target: "sync", "writer gone, dropping write to {}", op.target());
                false
            }
        }
    }

    pub fn written(&self) -> usize {
        self.stats.written.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> usize {
        self.stats.failed.load(Ordering::Relaxed)
    }

    pub fn dropped(&self) -> usize {
        self.stats.dropped.load(Ordering::Relaxed)
    }

    /// Close the queue, let the thread drain it and join it.
    pub fn shutdown(mut self) -> WriterReport {
        self.stop();
        WriterReport {
            written: self.written(),
            failed: self.failed(),
            dropped: self.dropped(),
        }
    }

    fn stop(&mut self) {
        self.tx.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!(target: "sync", "store writer thread panicked");
            }
        }
    }
}

impl Drop for StoreWriter {
    fn drop(&mut self) {
        self.stop();
    }
}

fn writer_loop<S: RemoteStore>(mut store: S, rx: Receiver<StoreOp>, stats: Arc<WriterStats>) {
    while let Ok(op) = rx.recv() {
        match store.apply(&op) {
            Ok(()) => {
                stats.written.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                stats.failed.fetch_add(1, Ordering::Relaxed);
                log::warn!(target: "sync", "remote write to {} failed: {}", op.target(), e);
            }
        }
    }
    log::debug!(target: "sync", "store writer drained");
}
