//! Player, PlayerId and Rank.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for a player (stable across queue and courts).
pub type PlayerId = Uuid;

/// Skill tier used to filter the candidate pool when dealing.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum Rank {
    #[default]
    Beginner,
    Intermediate,
}

impl Rank {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rank::Beginner => "Beginner",
            Rank::Intermediate => "Intermediate",
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a rank string is neither "Beginner" nor "Intermediate".
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UnknownRank(pub String);

impl fmt::Display for UnknownRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown rank '{}'", self.0)
    }
}

impl std::error::Error for UnknownRank {}

impl FromStr for Rank {
    type Err = UnknownRank;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("beginner") {
            Ok(Rank::Beginner)
        } else if s.eq_ignore_ascii_case("intermediate") {
            Ok(Rank::Intermediate)
        } else {
            Err(UnknownRank(s.to_string()))
        }
    }
}

/// A player waiting in the queue or occupying a court slot.
///
/// Serialized with camelCase keys; every rotation field has a default so
/// snapshots written before a field existed still load.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub rank: Rank,
    #[serde(default)]
    pub in_game: bool,
    /// True once the player has finished at least one game.
    #[serde(default)]
    pub played: bool,
    #[serde(default)]
    pub play_count: u32,
    #[serde(default)]
    pub last_court: Option<usize>,
    /// Partners from the most recently finished game only.
    #[serde(default)]
    pub last_partners: BTreeSet<PlayerId>,
}

impl Player {
    /// Create a fresh player: not in a game, zero games played.
    pub fn new(name: impl Into<String>, rank: Rank) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            rank,
            in_game: false,
            played: false,
            play_count: 0,
            last_court: None,
            last_partners: BTreeSet::new(),
        }
    }

    /// Create a player carrying a play count from an earlier session (CSV import).
    pub fn with_play_count(name: impl Into<String>, rank: Rank, play_count: u32) -> Self {
        Self {
            played: play_count > 0,
            play_count,
            ..Self::new(name, rank)
        }
    }

    /// Case-insensitive name comparison used for duplicate detection.
    pub fn has_name(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.trim().to_lowercase()
    }

    /// Put the player on a court.
    pub fn enter_court(&mut self, court: usize) {
        self.in_game = true;
        self.last_court = Some(court);
    }

    /// Record a completed game on `court` alongside `partners`.
    pub fn record_finished_game(&mut self, court: usize, partners: BTreeSet<PlayerId>) {
        self.in_game = false;
        self.played = true;
        self.play_count += 1;
        self.last_court = Some(court);
        self.last_partners = partners;
    }

    /// Take the player off a court without crediting a game.
    pub fn leave_court_early(&mut self) {
        self.in_game = false;
        self.last_court = None;
    }
}
