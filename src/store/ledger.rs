//! Mutation ledger
//!
//! Tracks every optimistic update/remove from the moment the local change is
//! applied until the backend answers. A failed mutation keeps its undo so the
//! caller can roll the local state back explicitly, as long as no later
//! mutation has touched the same record.
//!
//! Only live entries (pending, or failed and still undoable) hold an undo.
//! Settled outcomes are remembered for the last `SETTLED_HISTORY` mutations.

use std::collections::{HashMap, VecDeque};

use super::AppStore;
use crate::domain::{DomainError, DomainResult, EntityId};

pub type MutationId = u64;

/// Settled outcomes kept for `status` lookups
pub(crate) const SETTLED_HISTORY: usize = 64;

/// Restores the local state captured before an optimistic change
pub(crate) type Undo = Box<dyn FnOnce(&AppStore) + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationStatus {
    /// Applied locally, request in flight
    Pending,
    /// Backend accepted the change
    Confirmed,
    /// Backend rejected the change; the optimistic state is still in place
    Failed(String),
    /// Local state was restored after a failure
    RolledBack,
}

/// Returned by `update`/`remove` once the backend has answered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationReceipt {
    pub id: MutationId,
    pub status: MutationStatus,
}

impl MutationReceipt {
    pub fn is_confirmed(&self) -> bool {
        self.status == MutationStatus::Confirmed
    }
}

struct Entry {
    table: &'static str,
    entity_id: EntityId,
    status: MutationStatus,
    /// `None` once a later mutation on the same record has started
    undo: Option<Undo>,
}

impl Entry {
    fn targets(&self, table: &str, entity_id: &str) -> bool {
        self.table == table && self.entity_id == entity_id
    }
}

#[derive(Default)]
pub(crate) struct Ledger {
    next_id: MutationId,
    live: HashMap<MutationId, Entry>,
    settled: VecDeque<(MutationId, MutationStatus)>,
}

impl Ledger {
    /// Start tracking a mutation. Earlier mutations on the same record lose
    /// their undo: restoring their snapshot would overwrite this change.
    pub fn begin(&mut self, table: &'static str, entity_id: &str, undo: Undo) -> MutationId {
        let superseded: Vec<MutationId> = self
            .live
            .iter()
            .filter(|(_, entry)| entry.targets(table, entity_id))
            .map(|(id, _)| *id)
            .collect();
        for id in superseded {
            let pending = self.live.get(&id).is_some_and(|entry| entry.status == MutationStatus::Pending);
            if pending {
                if let Some(entry) = self.live.get_mut(&id) {
                    entry.undo = None;
                }
            } else if let Some(entry) = self.live.remove(&id) {
                log::debug!("[STORE] Mutation {} on {} {} superseded", id, table, entity_id);
                self.remember(id, entry.status);
            }
        }

        self.next_id += 1;
        let id = self.next_id;
        self.live.insert(
            id,
            Entry {
                table,
                entity_id: entity_id.to_string(),
                status: MutationStatus::Pending,
                undo: Some(undo),
            },
        );
        id
    }

    /// Confirmed mutations can't be undone; the entry is settled
    pub fn confirm(&mut self, id: MutationId) -> MutationReceipt {
        self.live.remove(&id);
        self.remember(id, MutationStatus::Confirmed);
        MutationReceipt { id, status: MutationStatus::Confirmed }
    }

    /// A failure stays live only while its undo is still usable
    pub fn fail(&mut self, id: MutationId, message: String) -> MutationReceipt {
        let status = MutationStatus::Failed(message);
        let undoable = self.live.get(&id).is_some_and(|entry| entry.undo.is_some());
        if undoable {
            if let Some(entry) = self.live.get_mut(&id) {
                entry.status = status.clone();
            }
        } else {
            self.live.remove(&id);
            self.remember(id, status.clone());
        }
        MutationReceipt { id, status }
    }

    fn remember(&mut self, id: MutationId, status: MutationStatus) {
        self.settled.push_back((id, status));
        while self.settled.len() > SETTLED_HISTORY {
            self.settled.pop_front();
        }
    }

    /// Outcome of a live or recently settled mutation
    pub fn status(&self, id: MutationId) -> Option<MutationStatus> {
        if let Some(entry) = self.live.get(&id) {
            return Some(entry.status.clone());
        }
        self.settled
            .iter()
            .rev()
            .find(|(settled, _)| *settled == id)
            .map(|(_, status)| status.clone())
    }

    /// Hand out the undo of a failed mutation and mark it rolled back
    pub fn take_undo(&mut self, id: MutationId) -> DomainResult<Undo> {
        let Some(entry) = self.live.get(&id) else {
            if id == 0 || id > self.next_id {
                return Err(DomainError::NotFound(format!("mutation {}", id)));
            }
            return Err(DomainError::Conflict(format!(
                "mutation {} is settled or was overtaken by a later change, only failed mutations roll back",
                id
            )));
        };
        if entry.status == MutationStatus::Pending {
            return Err(DomainError::Conflict(format!(
                "mutation {} on {} {} is still pending",
                id, entry.table, entry.entity_id
            )));
        }

        let mut entry = self
            .live
            .remove(&id)
            .ok_or_else(|| DomainError::Internal(format!("mutation {} vanished", id)))?;
        let undo = entry
            .undo
            .take()
            .ok_or_else(|| DomainError::Internal(format!("mutation {} has no snapshot", id)))?;
        log::info!("[STORE] Rolled back mutation {} on {} {}", id, entry.table, entry.entity_id);
        self.remember(id, MutationStatus::RolledBack);
        Ok(undo)
    }

    /// Forget everything, e.g. on sign-out
    pub fn clear(&mut self) {
        self.live.clear();
        self.settled.clear();
    }

    #[cfg(test)]
    fn live_len(&self) -> usize {
        self.live.len()
    }
}
