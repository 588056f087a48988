//! Dealing: move waiting players onto empty, unlocked courts in groups of four.

use crate::models::{Player, PlayerId, Rank, RotationError, Session, PLAYERS_PER_COURT};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Which waiting players may be dealt.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DealMode {
    /// Everyone waiting.
    #[default]
    All,
    /// Only players of this rank.
    Tier(Rank),
}

impl DealMode {
    fn admits(&self, player: &Player) -> bool {
        match self {
            DealMode::All => true,
            DealMode::Tier(rank) => player.rank == *rank,
        }
    }

    fn tier(&self) -> Option<Rank> {
        match self {
            DealMode::All => None,
            DealMode::Tier(rank) => Some(*rank),
        }
    }
}

/// Fill empty, unlocked courts from the queue. Returns the number of courts filled.
///
/// 1. Open courts = empty and not locked, ascending index.
/// 2. Candidates = queued players not in a game that match `mode`.
/// 3. Stable sort by `play_count`: fewest games first, ties keep arrival order.
/// 4. Each open court takes the next four candidates while four remain.
pub fn deal(session: &mut Session, mode: DealMode) -> Result<usize, RotationError> {
    let open_courts = session.open_courts();
    if open_courts.is_empty() {
        return Err(RotationError::NoCourtsAvailable);
    }

    let mut candidates: Vec<PlayerId> = {
        let mut pool: Vec<&Player> = session
            .queue
            .iter()
            .filter(|p| !p.in_game && mode.admits(p))
            .collect();
        if pool.len() < PLAYERS_PER_COURT {
            return Err(RotationError::InsufficientPlayers {
                required: PLAYERS_PER_COURT,
                tier: mode.tier(),
            });
        }
        pool.sort_by_key(|p| p.play_count);
        pool.into_iter().map(|p| p.id).collect()
    };

    let mut filled = 0;
    for court in open_courts {
        if candidates.len() < PLAYERS_PER_COURT {
            break;
        }
        let group: Vec<PlayerId> = candidates.drain(..PLAYERS_PER_COURT).collect();
        let players = take_from_queue(session, &group);
        for (slot, mut player) in players.into_iter().enumerate() {
            player.enter_court(court);
            log::debug!("Court #{} slot {}: {}", court + 1, slot + 1, player.name);
            session.courts[court].push(player);
        }
        session.court_filled_at[court] = Some(Utc::now());
        filled += 1;
    }

    if filled == 0 {
        return Err(RotationError::CouldNotAssign);
    }
    log::debug!("Dealt {} court(s) ({:?})", filled, mode);
    Ok(filled)
}

/// Remove the given players from the queue, returned in the order of `ids`.
fn take_from_queue(session: &mut Session, ids: &[PlayerId]) -> Vec<Player> {
    let wanted: HashSet<PlayerId> = ids.iter().copied().collect();
    let (mut taken, kept): (Vec<Player>, Vec<Player>) = std::mem::take(&mut session.queue)
        .into_iter()
        .partition(|p| wanted.contains(&p.id));
    session.queue = kept;
    taken.sort_by_key(|p| ids.iter().position(|id| *id == p.id));
    taken
}
