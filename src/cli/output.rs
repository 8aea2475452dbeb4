use serde::Serialize;

use crate::model::Filter;
use crate::model::task::{Task, TaskId};
use crate::ops::list_ops::ListController;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TaskJson {
    /// None when the store could not save the task
    pub id: Option<TaskId>,
    pub name: String,
    pub completed: bool,
}

#[derive(Serialize)]
pub struct TaskListJson {
    pub filter: Filter,
    pub active: usize,
    pub tasks: Vec<TaskJson>,
}

#[derive(Serialize)]
pub struct ClearJson {
    pub cleared: usize,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn task_to_json(task: &Task) -> TaskJson {
    TaskJson {
        id: task.id,
        name: task.name.clone(),
        completed: task.completed,
    }
}

/// Visible tasks of the list under its current filter
pub fn list_to_json(list: &ListController) -> TaskListJson {
    TaskListJson {
        filter: list.filter(),
        active: list.active_count(),
        tasks: list
            .visible_indices()
            .into_iter()
            .map(|i| task_to_json(&list.items()[i].task))
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

/// Format a single task as a one-line summary
pub fn format_task_line(task: &Task) -> String {
    let check = if task.completed { 'x' } else { ' ' };
    let id_str = task.id.map(|id| format!("{} ", id)).unwrap_or_default();
    format!("[{}] {}{}", check, id_str, task.name)
}

/// Visible tasks, one per line, then the active count
pub fn format_listing(list: &ListController) -> Vec<String> {
    let mut lines: Vec<String> = list
        .visible_indices()
        .into_iter()
        .map(|i| format_task_line(&list.items()[i].task))
        .collect();
    if lines.is_empty() {
        let message = match list.filter() {
            Filter::All => "(no tasks)",
            Filter::Active => "(no active tasks)",
            Filter::Completed => "(no completed tasks)",
        };
        lines.push(message.to_string());
    }
    lines.push(String::new());
    lines.push(list.active_count_label());
    lines
}
