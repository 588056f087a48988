//! Data structures for court rotation: players, courts and session state.

mod player;
mod session;

pub use player::{Player, PlayerId, Rank, UnknownRank};
pub use session::{
    RosterCounts, RotationError, Session, SessionId, Snapshot, COURT_COUNT, PLAYERS_PER_COURT,
};
