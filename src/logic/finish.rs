//! Finishing a game: return a court's players to the back of the queue.

use crate::models::{PlayerId, RotationError, Session};
use std::collections::BTreeSet;

/// Finish the game on `court`. No-op when the court is already empty.
///
/// Each player gets one more game on their count and remembers the other three
/// as their last partners. Players rejoin the queue tail in slot order.
pub fn finish_game(session: &mut Session, court: usize) -> Result<(), RotationError> {
    session.check_court(court)?;
    if session.courts[court].is_empty() {
        return Ok(());
    }

    let players = std::mem::take(&mut session.courts[court]);
    let ids: Vec<PlayerId> = players.iter().map(|p| p.id).collect();
    for mut player in players {
        let partners: BTreeSet<PlayerId> =
            ids.iter().copied().filter(|id| *id != player.id).collect();
        player.record_finished_game(court, partners);
        session.queue.push(player);
    }
    session.court_filled_at[court] = None;

    log::debug!("Court #{} finished, {} players requeued", court + 1, ids.len());
    Ok(())
}
