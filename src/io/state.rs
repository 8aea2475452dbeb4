use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::model::task::Filter;

const STATE_FILE: &str = ".todo-state.json";

/// Persisted TUI state (written to .todo-state.json)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UiState {
    /// Selected filter tab
    pub filter: Filter,
    /// Cursor position in the visible list
    #[serde(default)]
    pub cursor: usize,
}

/// Read .todo-state.json from the data directory
pub fn read_ui_state(data_dir: &Path) -> Option<UiState> {
    let path = data_dir.join(STATE_FILE);
    let content = fs::read_to_string(&path).ok()?;
    serde_json::from_str(&content).ok()
}

/// Write .todo-state.json to the data directory
pub fn write_ui_state(data_dir: &Path, state: &UiState) -> Result<(), std::io::Error> {
    let path = data_dir.join(STATE_FILE);
    let content = serde_json::to_string_pretty(state)?;
    fs::write(&path, content)
}
