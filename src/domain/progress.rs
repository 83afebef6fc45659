//! Project progress derivation
//!
//! progress = round(100 * done / total) over a project's tasks, 0 for a
//! project without tasks. Pure function of the task collection.

use std::collections::HashMap;

use super::task::Task;

/// Done/total counters for one project
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub done: usize,
    pub total: usize,
}

impl Tally {
    /// Integer percentage, rounded half up
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        let pct = (200 * self.done + self.total) / (2 * self.total);
        pct.min(100) as u8
    }
}

/// Count done/total tasks per project id
pub fn tally(tasks: &[Task]) -> HashMap<String, Tally> {
    let mut counts: HashMap<String, Tally> = HashMap::new();
    for task in tasks {
        let entry = counts.entry(task.project_id.clone()).or_default();
        entry.total += 1;
        if task.status.is_done() {
            entry.done += 1;
        }
    }
    counts
}

/// Progress of a single project
pub fn project_progress(project_id: &str, tasks: &[Task]) -> u8 {
    let mut counts = Tally::default();
    for task in tasks.iter().filter(|t| t.project_id == project_id) {
        counts.total += 1;
        if task.status.is_done() {
            counts.done += 1;
        }
    }
    counts.percent()
}
