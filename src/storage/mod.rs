//! Snapshot persistence: a key-value blob store holding queue, courts and locks.
//!
//! Each component lives under its own versioned key as JSON. Loading never
//! fails: a missing or malformed key falls back to that component's default.
//! Courts that are partly filled or share a player with another place count
//! as malformed too.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::models::{Snapshot, PLAYERS_PER_COURT};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashSet;

pub const QUEUE_KEY: &str = "pickleballQueue_v3";
pub const COURTS_KEY: &str = "pickleballCourts_v3";
pub const LOCKS_KEY: &str = "pickleballCourtLocks_v1";
pub const FILLED_AT_KEY: &str = "pickleballCourtFilledAt_v1";

const ALL_KEYS: [&str; 4] = [QUEUE_KEY, COURTS_KEY, LOCKS_KEY, FILLED_AT_KEY];

/// Errors raised by store implementations.
#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Json(serde_json::Error),
    /// An in-memory store's lock was poisoned.
    LockPoisoned,
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "I/O error: {}", e),
            StoreError::Json(e) => write!(f, "JSON error: {}", e),
            StoreError::LockPoisoned => write!(f, "store lock was poisoned"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io(e) => Some(e),
            StoreError::Json(e) => Some(e),
            StoreError::LockPoisoned => None,
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Json(e)
    }
}

/// String blobs by key.
pub trait SnapshotStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

impl<S: SnapshotStore + ?Sized> SnapshotStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

/// Write every component of `snapshot` under its key.
pub fn save_snapshot<S: SnapshotStore + ?Sized>(
    store: &S,
    snapshot: &Snapshot,
) -> Result<(), StoreError> {
    write_key(store, QUEUE_KEY, &snapshot.queue)?;
    write_key(store, COURTS_KEY, &snapshot.courts)?;
    write_key(store, LOCKS_KEY, &snapshot.locks)?;
    write_key(store, FILLED_AT_KEY, &snapshot.court_filled_at)?;
    Ok(())
}

/// Read a snapshot, substituting defaults for anything missing or unreadable.
pub fn load_snapshot<S: SnapshotStore + ?Sized>(store: &S) -> Snapshot {
    let defaults = Snapshot::default();
    let mut snapshot = Snapshot {
        queue: read_key(store, QUEUE_KEY).unwrap_or(defaults.queue),
        courts: read_key(store, COURTS_KEY).unwrap_or_else(|| defaults.courts.clone()),
        locks: read_key(store, LOCKS_KEY).unwrap_or(defaults.locks),
        court_filled_at: read_key(store, FILLED_AT_KEY).unwrap_or(defaults.court_filled_at),
    };
    if !courts_well_formed(&snapshot) {
        log::warn!("ignoring malformed {}: court sizes or player ids are inconsistent", COURTS_KEY);
        snapshot.courts = defaults.courts;
        snapshot.court_filled_at = defaults.court_filled_at;
    }
    snapshot
}

/// Every court is empty or full, and no player id appears twice across queue and courts.
fn courts_well_formed(snapshot: &Snapshot) -> bool {
    if snapshot
        .courts
        .iter()
        .any(|court| !court.is_empty() && court.len() != PLAYERS_PER_COURT)
    {
        return false;
    }
    let mut seen = HashSet::new();
    snapshot
        .queue
        .iter()
        .chain(snapshot.courts.iter().flatten())
        .all(|p| seen.insert(p.id))
}

/// Delete every snapshot key.
pub fn clear_snapshot<S: SnapshotStore + ?Sized>(store: &S) -> Result<(), StoreError> {
    for key in ALL_KEYS {
        store.remove(key)?;
    }
    Ok(())
}

fn write_key<S: SnapshotStore + ?Sized, T: Serialize>(
    store: &S,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let json = serde_json::to_string(value)?;
    store.set(key, &json)
}

fn read_key<S: SnapshotStore + ?Sized, T: DeserializeOwned>(store: &S, key: &str) -> Option<T> {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            log::warn!("could not read {}: {}", key, e);
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("ignoring malformed {}: {}", key, e);
            None
        }
    }
}
