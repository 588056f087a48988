//! RotationService: one session plus its store, saved after every mutation.

use crate::logic::{self, DealMode};
use crate::models::{Player, PlayerId, Rank, RotationError, Session, SessionId};
use crate::storage::{self, SnapshotStore};

/// Owns a session and persists it after each successful mutating operation.
///
/// Saves are fire-and-forget: a failed write is logged and the in-memory
/// state stays authoritative.
pub struct RotationService<S: SnapshotStore> {
    session: Session,
    store: S,
}

impl<S: SnapshotStore> RotationService<S> {
    /// Start a fresh session backed by `store`. Nothing is read from the store.
    pub fn new(store: S) -> Self {
        Self {
            session: Session::new(),
            store,
        }
    }

    /// Restore session `id` from `store`, falling back to an empty session.
    pub fn load(id: SessionId, store: S) -> Self {
        let snapshot = storage::load_snapshot(&store);
        Self {
            session: Session::from_snapshot(id, snapshot),
            store,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Replace in-memory state with whatever the store holds now.
    pub fn reload(&mut self) {
        let snapshot = storage::load_snapshot(&self.store);
        self.session.replace_state(snapshot);
    }

    pub fn add_player(&mut self, name: &str, rank: Option<Rank>) -> Result<PlayerId, RotationError> {
        let id = self.session.add_player(name, rank)?;
        self.persist();
        Ok(id)
    }

    pub fn remove_player(&mut self, player_id: PlayerId) -> Result<Player, RotationError> {
        let player = self.session.remove_player(player_id)?;
        self.persist();
        Ok(player)
    }

    pub fn deal(&mut self, mode: DealMode) -> Result<usize, RotationError> {
        let filled = logic::deal(&mut self.session, mode)?;
        self.persist();
        Ok(filled)
    }

    pub fn finish_game(&mut self, court: usize) -> Result<(), RotationError> {
        logic::finish_game(&mut self.session, court)?;
        self.persist();
        Ok(())
    }

    pub fn swap_player(
        &mut self,
        court: usize,
        outgoing: PlayerId,
    ) -> Result<Option<PlayerId>, RotationError> {
        let incoming = logic::swap_player(&mut self.session, court, outgoing)?;
        if incoming.is_some() {
            self.persist();
        }
        Ok(incoming)
    }

    pub fn toggle_lock(&mut self, court: usize) -> Result<bool, RotationError> {
        let locked = self.session.toggle_lock(court)?;
        self.persist();
        Ok(locked)
    }

    pub fn import_csv(&mut self, text: &str) -> usize {
        let imported = logic::import_csv(&mut self.session, text);
        if imported > 0 {
            self.persist();
        }
        imported
    }

    pub fn export_csv(&self) -> Result<String, csv::Error> {
        logic::export_csv(&self.session)
    }

    /// Drop all players and locks, and delete the stored snapshot.
    pub fn reset(&mut self) {
        self.session.reset();
        if let Err(e) = storage::clear_snapshot(&self.store) {
            log::warn!("could not clear stored session {}: {}", self.session.id, e);
        }
        log::info!("Session {} reset", self.session.id);
    }

    fn persist(&self) {
        if let Err(e) = storage::save_snapshot(&self.store, &self.session.snapshot()) {
            log::warn!("could not save session {}: {}", self.session.id, e);
        }
    }
}
