//! Inventory of running transcoder subprocesses.
//!
//! The registry exists for shutdown accounting, not lookup: every session
//! registers its subprocess at spawn and removes it when the session ends,
//! on the normal and the cancelled path alike. Holders must not perform I/O
//! while the lock is held.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;

/// What the server knows about one running subprocess.
#[derive(Debug, Clone)]
pub struct ProcessRecord {
    pub remote: String,
    pub pid: Option<u32>,
    /// The (rewritten) argument vector the subprocess was started with, so a
    /// leaked entry can be traced back to the command it was running.
    pub args: Vec<String>,
}

/// Map of process id to record, guarded by a single mutex.
#[derive(Default)]
pub struct ProcessRegistry {
    inner: Mutex<HashMap<String, ProcessRecord>>,
}

impl ProcessRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subprocess, returning its unique id: the remote address
    /// plus a nanosecond timestamp.
    pub fn register(&self, remote: &str, pid: Option<u32>, args: &[String]) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        let id = format!("{remote}-{nanos}");
        self.inner.lock().insert(
            id.clone(),
            ProcessRecord {
                remote: remote.to_string(),
                pid,
                args: args.to_vec(),
            },
        );
        id
    }

    pub fn remove(&self, id: &str) {
        self.inner.lock().remove(id);
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the registered processes, for shutdown reporting.
    pub fn snapshot(&self) -> Vec<(String, ProcessRecord)> {
        self.inner
            .lock()
            .iter()
            .map(|(id, record)| (id.clone(), record.clone()))
            .collect()
    }
}
