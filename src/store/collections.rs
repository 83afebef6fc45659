//! Binds each entity type to its field in `AppState`

use leptos::prelude::*;

use super::ledger::Undo;
use super::{AppStateStoreFields, AppStore};
use crate::domain::{
    Asset, AutomationRule, CodeSnippet, Note, Project, Resource, Stakeholder, Task, Transaction, Whiteboard,
};
use crate::gateway::SelectQuery;
use crate::mapper::Mapped;

/// Where a newly created record lands in its collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Most recently created first
    Front,
    /// Insertion order
    Back,
}

/// An entity collection held by the store
pub trait Collection: Mapped + std::fmt::Debug {
    const PLACEMENT: Placement;

    /// Changes to this collection invalidate project progress
    const AFFECTS_PROGRESS: bool = false;

    fn read<R>(state: &AppStore, f: impl FnOnce(&Vec<Self>) -> R) -> R;

    fn write<R>(state: &AppStore, f: impl FnOnce(&mut Vec<Self>) -> R) -> R;

    /// Initial load query, matching the placement order
    fn load_query() -> SelectQuery {
        let newest_first = Self::PLACEMENT == Placement::Front;
        SelectQuery::new().order_by("created_at", !newest_first)
    }

    /// Local side effects of a hard delete on other collections; returns
    /// their undo
    fn detach_dependents(_state: &AppStore, _id: &str) -> Option<Undo> {
        None
    }

    fn find(state: &AppStore, id: &str) -> Option<Self> {
        Self::read(state, |items| items.iter().find(|item| item.id() == id).cloned())
    }

    /// Place a record per `PLACEMENT`, replacing any copy with the same id
    fn place(state: &AppStore, entity: Self) {
        Self::write(state, |items| {
            items.retain(|item| item.id() != entity.id());
            match Self::PLACEMENT {
                Placement::Front => items.insert(0, entity),
                Placement::Back => items.push(entity),
            }
        });
    }

    /// Replace the local copy if it still exists; returns whether it did
    fn replace(state: &AppStore, entity: Self) -> bool {
        Self::write(state, |items| match items.iter_mut().find(|item| item.id() == entity.id()) {
            Some(slot) => {
                *slot = entity;
                true
            }
            None => false,
        })
    }
}

macro_rules! bind_collection {
    ($entity:ty => $field:ident, $placement:expr) => {
        bind_collection!($entity => $field, $placement, false);
    };
    ($entity:ty => $field:ident, $placement:expr, $progress:expr) => {
        impl Collection for $entity {
            const PLACEMENT: Placement = $placement;
            const AFFECTS_PROGRESS: bool = $progress;

            fn read<R>(state: &AppStore, f: impl FnOnce(&Vec<Self>) -> R) -> R {
                f(&*state.$field().read_untracked())
            }

            fn write<R>(state: &AppStore, f: impl FnOnce(&mut Vec<Self>) -> R) -> R {
                f(&mut *state.$field().write())
            }
        }
    };
}

bind_collection!(Task => tasks, Placement::Back, true);
bind_collection!(Note => notes, Placement::Front);
bind_collection!(Asset => assets, Placement::Front);
bind_collection!(Stakeholder => stakeholders, Placement::Back);
bind_collection!(Resource => resources, Placement::Back);
bind_collection!(AutomationRule => automations, Placement::Back);
bind_collection!(Transaction => transactions, Placement::Front);
bind_collection!(Whiteboard => whiteboards, Placement::Front);
bind_collection!(CodeSnippet => snippets, Placement::Front);

impl Collection for Project {
    const PLACEMENT: Placement = Placement::Front;
    // Progress is stored on projects, so a fresh project needs it filled in
    const AFFECTS_PROGRESS: bool = true;

    fn read<R>(state: &AppStore, f: impl FnOnce(&Vec<Self>) -> R) -> R {
        f(&*state.projects().read_untracked())
    }

    fn write<R>(state: &AppStore, f: impl FnOnce(&mut Vec<Self>) -> R) -> R {
        f(&mut *state.projects().write())
    }

    /// Hard delete takes the project's tasks with it; notes and assets stay
    fn detach_dependents(state: &AppStore, id: &str) -> Option<Undo> {
        let removed: Vec<Task> = Task::write(state, |tasks| {
            let (removed, kept) = std::mem::take(tasks).into_iter().partition(|t| t.project_id == id);
            *tasks = kept;
            removed
        });
        if removed.is_empty() {
            return None;
        }

        log::debug!("[STORE] Dropping {} local tasks of project {}", removed.len(), id);
        Some(Box::new(move |state: &AppStore| {
            Task::write(state, |tasks| {
                for task in removed {
                    if !tasks.iter().any(|t| t.id == task.id) {
                        tasks.push(task);
                    }
                }
            });
        }))
    }
}
