//! Session list shown by the grid: the last fetched rows plus local changes
//! the backend hasn't confirmed yet.

use crate::schedule::Session;

/// Local edit applied before the backend confirms it
#[derive(Debug, Clone)]
pub enum LocalChange {
    Insert(Session),
    Replace { old: Session, new: Session },
    Remove(Session),
}

/// Apply a change to a copy of the list. Entries are matched by `Session::key`.
pub fn patch_sessions(sessions: &[Session], change: &LocalChange) -> Vec<Session> {
    let mut next = sessions.to_vec();
    match change {
        LocalChange::Insert(session) => next.push(session.clone()),
        LocalChange::Replace { old, new } => {
            if let Some(slot) = next.iter_mut().find(|s| s.key() == old.key()) {
                *slot = new.clone();
            } else {
                next.push(new.clone());
            }
        }
        LocalChange::Remove(session) => next.retain(|s| s.key() != session.key()),
    }
    next
}

/// Tracks fetch generations and pending changes.
///
/// Each fetch gets a generation number and only the newest one is applied.
/// A reload asked for while a fetch runs is remembered and started once that
/// fetch reports back. Pending changes stay layered over whatever list
/// arrives until their own request succeeds or fails.
#[derive(Debug, Default)]
pub struct SessionStore {
    confirmed: Vec<Session>,
    pending: Vec<(u64, LocalChange)>,
    next_op: u64,
    generation: u64,
    fetch_in_flight: Option<u64>,
    reload_pending: bool,
}

impl SessionStore {
    /// Rows to lay out: confirmed rows with every pending change applied
    pub fn current(&self) -> Vec<Session> {
        self.pending
            .iter()
            .fold(self.confirmed.clone(), |rows, (_, change)| patch_sessions(&rows, change))
    }

    pub fn is_busy(&self) -> bool {
        self.fetch_in_flight.is_some() || !self.pending.is_empty()
    }

    /// Generation for a new fetch, or `None` if one is running. In that case
    /// the request is queued and `take_reload` hands it back later.
    pub fn begin_fetch(&mut self) -> Option<u64> {
        if self.fetch_in_flight.is_some() {
            self.reload_pending = true;
            return None;
        }
        self.generation += 1;
        self.fetch_in_flight = Some(self.generation);
        self.reload_pending = false;
        Some(self.generation)
    }

    /// Drop the current rows and orphan any running fetch, e.g. after the
    /// view or its filters changed.
    pub fn invalidate(&mut self) {
        self.confirmed.clear();
        self.generation += 1;
        self.fetch_in_flight = None;
        self.reload_pending = false;
    }

    /// Record a finished fetch. Returns false for a stale generation, whose
    /// result must be ignored.
    pub fn finish_fetch(&mut self, generation: u64, rows: Option<Vec<Session>>) -> bool {
        if self.fetch_in_flight != Some(generation) {
            tracing::debug!(generation, current = self.generation, "ignoring stale fetch");
            return false;
        }
        self.fetch_in_flight = None;
        if let Some(rows) = rows {
            self.confirmed = rows;
        }
        true
    }

    /// True once if a reload was queued and nothing is fetching now
    pub fn take_reload(&mut self) -> bool {
        if self.reload_pending && self.fetch_in_flight.is_none() {
            self.reload_pending = false;
            true
        } else {
            false
        }
    }

    /// Layer `change` over the list; returns its operation id
    pub fn submit(&mut self, change: LocalChange) -> u64 {
        self.next_op += 1;
        self.pending.push((self.next_op, change));
        self.next_op
    }

    /// The backend accepted operation `op`
    pub fn confirm(&mut self, op: u64) {
        if let Some(change) = self.take_pending(op) {
            self.confirmed = patch_sessions(&self.confirmed, &change);
            // A fetch started before the save may come back without it
            if self.fetch_in_flight.is_some() {
                self.reload_pending = true;
            }
        }
    }

    /// The backend refused operation `op`; only its own change is undone
    pub fn reject(&mut self, op: u64) {
        self.take_pending(op);
    }

    fn take_pending(&mut self, op: u64) -> Option<LocalChange> {
        let index = self.pending.iter().position(|(id, _)| *id == op)?;
        Some(self.pending.remove(index).1)
    }
}
