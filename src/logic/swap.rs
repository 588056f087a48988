//! Swapping: replace one court occupant with the most deserving standby player.

use crate::models::{PlayerId, RotationError, Session};

/// Replace `outgoing` on `court` with the waiting player who has played least.
///
/// Returns the incoming player's id, or `None` if `outgoing` is not on that court.
/// The outgoing player goes to the front of the queue without a game credited;
/// the incoming player takes the same slot. Lock flags are not consulted.
pub fn swap_player(
    session: &mut Session,
    court: usize,
    outgoing: PlayerId,
) -> Result<Option<PlayerId>, RotationError> {
    session.check_court(court)?;
    let slot = match session.courts[court].iter().position(|p| p.id == outgoing) {
        Some(slot) => slot,
        None => return Ok(None),
    };

    // Lowest play count, earliest in queue on ties.
    let incoming_idx = session
        .queue
        .iter()
        .enumerate()
        .filter(|(_, p)| !p.in_game && p.id != outgoing)
        .min_by_key(|(i, p)| (p.play_count, *i))
        .map(|(i, _)| i)
        .ok_or(RotationError::NoStandbyPlayers)?;

    let mut incoming = session.queue.remove(incoming_idx);
    incoming.enter_court(court);
    let incoming_id = incoming.id;

    let mut leaving = std::mem::replace(&mut session.courts[court][slot], incoming);
    leaving.leave_court_early();
    log::debug!(
        "Court #{} slot {}: {} out, {} in",
        court + 1,
        slot + 1,
        leaving.name,
        session.courts[court][slot].name
    );
    session.queue.insert(0, leaving);

    Ok(Some(incoming_id))
}
