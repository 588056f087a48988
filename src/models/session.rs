//! Session: the queue, the courts and their lock flags.

use crate::models::player::{Player, PlayerId, Rank};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Number of courts in a session.
pub const COURT_COUNT: usize = 4;

/// Players dealt onto a court at once (doubles).
pub const PLAYERS_PER_COURT: usize = 4;

/// Unique identifier for a session.
pub type SessionId = Uuid;

/// Errors that can occur during rotation operations. All are recoverable.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RotationError {
    /// Every court is full or locked.
    NoCourtsAvailable,
    /// Fewer than `required` eligible players for the requested mode/tier.
    InsufficientPlayers { required: usize, tier: Option<Rank> },
    /// Courts and players were available but no court ended up filled.
    CouldNotAssign,
    /// No waiting player can replace the outgoing one.
    NoStandbyPlayers,
    /// A player with this name is already queued or playing (case-insensitive).
    DuplicatePlayer(String),
    /// Add-player submitted without a name or rank.
    MissingInput,
    /// Court index out of range.
    InvalidCourt(usize),
    /// Player not found in the queue.
    PlayerNotFound(PlayerId),
}

impl RotationError {
    /// Stable name of the outcome, for the presentation layer.
    pub fn code(&self) -> &'static str {
        match self {
            RotationError::NoCourtsAvailable => "no_courts_available",
            RotationError::InsufficientPlayers { .. } => "insufficient_players",
            RotationError::CouldNotAssign => "could_not_assign",
            RotationError::NoStandbyPlayers => "no_standby_players",
            RotationError::DuplicatePlayer(_) => "duplicate_player",
            RotationError::MissingInput => "missing_input",
            RotationError::InvalidCourt(_) => "invalid_court",
            RotationError::PlayerNotFound(_) => "player_not_found",
        }
    }
}

impl std::fmt::Display for RotationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RotationError::NoCourtsAvailable => write!(
                f,
                "All courts are currently full. Wait for a court to finish or unlock one."
            ),
            RotationError::InsufficientPlayers { required, tier: None } => write!(
                f,
                "At least {} available players are required to start matches",
                required
            ),
            RotationError::InsufficientPlayers {
                required,
                tier: Some(tier),
            } => write!(
                f,
                "At least {} {} players are required to start a match for this mode",
                required, tier
            ),
            RotationError::CouldNotAssign => {
                write!(f, "Not enough players or no available courts")
            }
            RotationError::NoStandbyPlayers => write!(
                f,
                "There is no one in the queue to replace this player yet"
            ),
            RotationError::DuplicatePlayer(name) => {
                write!(f, "\"{}\" is already in the queue or currently playing", name)
            }
            RotationError::MissingInput => {
                write!(f, "Please enter a player name and select a rank")
            }
            RotationError::InvalidCourt(index) => write!(f, "Court #{} does not exist", index + 1),
            RotationError::PlayerNotFound(_) => write!(f, "Player not found in the queue"),
        }
    }
}

impl std::error::Error for RotationError {}

/// Player totals across queue and courts (for the header pills).
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct RosterCounts {
    pub total: usize,
    pub beginners: usize,
    pub intermediates: usize,
}

/// Persisted portion of a session. Also the unit of last-writer-wins sync.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub queue: Vec<Player>,
    pub courts: [Vec<Player>; COURT_COUNT],
    pub locks: [bool; COURT_COUNT],
    pub court_filled_at: [Option<DateTime<Utc>>; COURT_COUNT],
}

/// One rotation session: waiting queue, courts and per-court lock flags.
///
/// Every court is either empty or holds exactly `PLAYERS_PER_COURT` players,
/// and each player is in exactly one place (queue or one court).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    /// Waiting players in arrival order.
    pub queue: Vec<Player>,
    pub courts: [Vec<Player>; COURT_COUNT],
    /// Locked courts are skipped when dealing.
    pub locks: [bool; COURT_COUNT],
    /// When each court was last filled by a deal; None while empty.
    pub court_filled_at: [Option<DateTime<Utc>>; COURT_COUNT],
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Create an empty session: no players, all courts empty and unlocked.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            queue: Vec::new(),
            courts: Default::default(),
            locks: [false; COURT_COUNT],
            court_filled_at: [None; COURT_COUNT],
        }
    }

    /// Create a session whose queue holds `players` in the given order.
    pub fn with_players(players: Vec<Player>) -> Self {
        Self {
            queue: players,
            ..Self::new()
        }
    }

    /// Build a session from a stored snapshot.
    pub fn from_snapshot(id: SessionId, snapshot: Snapshot) -> Self {
        let mut session = Self { id, ..Self::new() };
        session.replace_state(snapshot);
        session
    }

    /// Copy of the persisted state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            queue: self.queue.clone(),
            courts: self.courts.clone(),
            locks: self.locks,
            court_filled_at: self.court_filled_at,
        }
    }

    /// Replace all in-memory state with `snapshot` (last writer wins, no merge).
    pub fn replace_state(&mut self, snapshot: Snapshot) {
        self.queue = snapshot.queue;
        self.courts = snapshot.courts;
        self.locks = snapshot.locks;
        self.court_filled_at = snapshot.court_filled_at;
    }

    pub(crate) fn check_court(&self, court: usize) -> Result<(), RotationError> {
        if court < COURT_COUNT {
            Ok(())
        } else {
            Err(RotationError::InvalidCourt(court))
        }
    }

    /// True if a player with this name (case-insensitive) is queued or on a court.
    pub fn name_taken(&self, name: &str) -> bool {
        self.all_players().any(|p| p.has_name(name))
    }

    /// Every player: queue first, then courts in index and slot order.
    pub fn all_players(&self) -> impl Iterator<Item = &Player> {
        self.queue.iter().chain(self.courts.iter().flatten())
    }

    /// Add a new player to the back of the queue. Names are unique (case-insensitive).
    pub fn add_player(&mut self, name: &str, rank: Option<Rank>) -> Result<PlayerId, RotationError> {
        let name = name.trim();
        let rank = match rank {
            Some(rank) if !name.is_empty() => rank,
            _ => return Err(RotationError::MissingInput),
        };
        if self.name_taken(name) {
            return Err(RotationError::DuplicatePlayer(name.to_string()));
        }
        let player = Player::new(name, rank);
        let id = player.id;
        self.queue.push(player);
        Ok(id)
    }

    /// Remove a waiting player from the queue.
    pub fn remove_player(&mut self, player_id: PlayerId) -> Result<Player, RotationError> {
        let idx = self
            .queue
            .iter()
            .position(|p| p.id == player_id)
            .ok_or(RotationError::PlayerNotFound(player_id))?;
        Ok(self.queue.remove(idx))
    }

    /// Flip a court's lock flag and return the new value. Players on the court are untouched.
    pub fn toggle_lock(&mut self, court: usize) -> Result<bool, RotationError> {
        self.check_court(court)?;
        self.locks[court] = !self.locks[court];
        Ok(self.locks[court])
    }

    /// Drop every player and clear all locks. The session id is kept.
    pub fn reset(&mut self) {
        self.replace_state(Snapshot::default());
    }

    /// Totals by rank over queue and courts.
    pub fn roster_counts(&self) -> RosterCounts {
        self.all_players()
            .fold(RosterCounts::default(), |mut counts, p| {
                counts.total += 1;
                match p.rank {
                    Rank::Beginner => counts.beginners += 1,
                    Rank::Intermediate => counts.intermediates += 1,
                }
                counts
            })
    }

    /// Queue players whose name contains `query` (case-insensitive), in queue order.
    pub fn search_queue(&self, query: &str) -> Vec<&Player> {
        let query = query.trim().to_lowercase();
        self.queue
            .iter()
            .filter(|p| p.name.to_lowercase().contains(&query))
            .collect()
    }

    /// Courts that are empty and unlocked, ascending.
    pub fn open_courts(&self) -> Vec<usize> {
        (0..COURT_COUNT)
            .filter(|&i| self.courts[i].is_empty() && !self.locks[i])
            .collect()
    }
}
