//! Court rotation web app: library with models, rotation logic and persistence.

pub mod logic;
pub mod models;
pub mod service;
pub mod storage;

pub use logic::{deal, export_csv, finish_game, import_csv, swap_player, DealMode};
pub use models::{
    Player, PlayerId, Rank, RosterCounts, RotationError, Session, SessionId, Snapshot,
    UnknownRank, COURT_COUNT, PLAYERS_PER_COURT,
};
pub use service::RotationService;
pub use storage::{FileStore, MemoryStore, SnapshotStore, StoreError};
