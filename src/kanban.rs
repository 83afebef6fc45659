//! Kanban board
//!
//! Tasks grouped into status columns. Moving a card is a status update
//! (`ClientStore::set_task_status`).

use crate::domain::{Task, TaskStatus};

#[derive(Debug, Clone, PartialEq)]
pub struct KanbanColumn {
    pub status: TaskStatus,
    pub tasks: Vec<Task>,
}

impl KanbanColumn {
    pub fn title(&self) -> &str {
        self.status.label()
    }
}

/// The standard columns in board order, then one column per unrecognized
/// status so no task goes missing. Tasks keep collection order.
pub fn columns(tasks: &[Task], project_id: Option<&str>) -> Vec<KanbanColumn> {
    let mut board: Vec<KanbanColumn> = TaskStatus::COLUMNS
        .iter()
        .map(|status| KanbanColumn { status: status.clone(), tasks: Vec::new() })
        .collect();

    let visible = tasks.iter().filter(|t| project_id.map_or(true, |id| t.project_id == id));
    for task in visible {
        match board.iter_mut().find(|column| column.status == task.status) {
            Some(column) => column.tasks.push(task.clone()),
            None => board.push(KanbanColumn { status: task.status.clone(), tasks: vec![task.clone()] }),
        }
    }
    board
}
