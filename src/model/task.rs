use serde::{Deserialize, Serialize};

/// Row identifier assigned by the store
pub type TaskId = i64;

/// A to-do item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Store row id. `None` until the task has been inserted.
    pub id: Option<TaskId>,
    /// Task label (never persisted empty)
    pub name: String,
    /// Completion flag
    pub completed: bool,
}

impl Task {
    /// Create an unsaved task with no id
    pub fn new(name: impl Into<String>) -> Self {
        Task {
            id: None,
            name: name.into(),
            completed: false,
        }
    }

    /// Whether this task has a store row
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }
}

/// Visibility mode applied to the task list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    All,
    /// Not yet completed. The list opens on this tab.
    #[default]
    Active,
    Completed,
}

impl Filter {
    pub const ALL: [Filter; 3] = [Filter::All, Filter::Active, Filter::Completed];

    /// Tab label
    pub fn label(self) -> &'static str {
        match self {
            Filter::All => "All",
            Filter::Active => "Active",
            Filter::Completed => "Completed",
        }
    }

    /// Parse a lowercase filter name (as used in config and on the command line)
    pub fn parse_filter(s: &str) -> Option<Filter> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Some(Filter::All),
            "active" => Some(Filter::Active),
            "completed" | "done" => Some(Filter::Completed),
            _ => None,
        }
    }

    /// Whether a task with the given completion flag is shown under this filter
    pub fn matches(self, completed: bool) -> bool {
        match self {
            Filter::All => true,
            Filter::Active => !completed,
            Filter::Completed => completed,
        }
    }

    /// Position in the tab bar
    pub fn index(self) -> usize {
        match self {
            Filter::All => 0,
            Filter::Active => 1,
            Filter::Completed => 2,
        }
    }

    /// Next tab, wrapping
    pub fn next(self) -> Filter {
        Filter::ALL[(self.index() + 1) % Filter::ALL.len()]
    }

    /// Previous tab, wrapping
    pub fn prev(self) -> Filter {
        Filter::ALL[(self.index() + Filter::ALL.len() - 1) % Filter::ALL.len()]
    }
}
