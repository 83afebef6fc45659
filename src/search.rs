//! Spotlight search
//!
//! Case-insensitive substring match over the in-memory collections.
//! Results come grouped by category (projects, assets, tasks, notes), in
//! collection order within a category, capped at `MAX_RESULTS`.
//! Soft-deleted projects are not listed; hits inside one lead to the
//! project list instead of its detail view.

use crate::domain::{Asset, EntityId, Note, Project, Task};
use crate::router::View;

pub const MAX_RESULTS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchKind {
    Project,
    Asset,
    Task,
    Note,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub kind: SearchKind,
    pub id: EntityId,
    pub title: String,
    /// Where selecting the hit navigates to
    pub target: View,
}

/// Borrowed view of the collections being searched
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchCorpus<'a> {
    pub projects: &'a [Project],
    pub assets: &'a [Asset],
    pub tasks: &'a [Task],
    pub notes: &'a [Note],
}

fn contains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

impl SearchCorpus<'_> {
    fn project_target(&self, project_id: &str) -> View {
        let deleted = self.projects.iter().any(|p| p.id == project_id && p.is_deleted());
        if deleted {
            View::ProjectList
        } else {
            View::project(project_id)
        }
    }
}

/// Ranked matches for `query`; blank queries match nothing
pub fn search(query: &str, corpus: &SearchCorpus<'_>) -> Vec<SearchHit> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    let projects = corpus
        .projects
        .iter()
        .filter(|p| !p.is_deleted())
        .filter(|p| contains(&p.title, &needle) || contains(&p.description, &needle))
        .map(|p| SearchHit {
            kind: SearchKind::Project,
            id: p.id.clone(),
            title: p.title.clone(),
            target: View::project(p.id.clone()),
        });

    let assets = corpus
        .assets
        .iter()
        .filter(|a| contains(&a.name, &needle) || contains(&a.url, &needle))
        .map(|a| SearchHit {
            kind: SearchKind::Asset,
            id: a.id.clone(),
            title: a.name.clone(),
            target: corpus.project_target(&a.project_id),
        });

    let tasks = corpus.tasks.iter().filter(|t| contains(&t.title, &needle)).map(|t| SearchHit {
        kind: SearchKind::Task,
        id: t.id.clone(),
        title: t.title.clone(),
        target: corpus.project_target(&t.project_id),
    });

    let notes = corpus
        .notes
        .iter()
        .filter(|n| contains(&n.title, &needle) || contains(&n.content, &needle))
        .map(|n| SearchHit {
            kind: SearchKind::Note,
            id: n.id.clone(),
            title: n.title.clone(),
            target: match &n.project_id {
                Some(project_id) => corpus.project_target(project_id),
                None => View::Ideas,
            },
        });

    projects.chain(assets).chain(tasks).chain(notes).take(MAX_RESULTS).collect()
}

/// Spotlight panel: query, results and the highlighted row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpotlightState {
    pub open: bool,
    pub query: String,
    pub results: Vec<SearchHit>,
    cursor: usize,
}

impl SpotlightState {
    pub fn open(&mut self) {
        self.open = true;
        self.cursor = 0;
    }

    pub fn close(&mut self) {
        self.open = false;
        self.query.clear();
        self.results.clear();
        self.cursor = 0;
    }

    /// Runs on every keystroke
    pub fn set_query(&mut self, query: &str, corpus: &SearchCorpus<'_>) {
        self.query = query.to_string();
        self.results = search(query, corpus);
        self.cursor = 0;
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn move_down(&mut self) {
        self.cursor = (self.cursor + 1).min(self.results.len().saturating_sub(1));
    }

    pub fn move_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn selected(&self) -> Option<&SearchHit> {
        self.results.get(self.cursor)
    }
}
