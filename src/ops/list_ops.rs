//! List controller: the in-memory task list, reconciled with the store.
//!
//! Every mutation runs to completion (memory first, then a synchronous store
//! call) and then recomputes visibility and the active count. Store failures
//! never roll back the in-memory list; they are logged and queued as
//! `PersistenceFailure`s for the presentation layer to surface.

use std::fmt;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::io::recovery::{RecoveryCategory, RecoveryEntry, log_recovery};
use crate::io::store::{PersistenceError, SqliteStore, TaskStore};
use crate::model::task::{Filter, Task, TaskId};

const STORE_NOT_OPEN: &str = "task store is not open";
const TASK_NOT_SAVED: &str = "task was never saved";

/// Per-task view state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskView {
    #[default]
    Display,
    Edit,
}

/// A task plus its presentation state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskItem {
    pub task: Task,
    /// Shown under the current filter
    pub visible: bool,
    pub view: TaskView,
}

impl TaskItem {
    fn new(task: Task) -> Self {
        TaskItem {
            task,
            visible: true,
            view: TaskView::Display,
        }
    }
}

/// One variant per user action. Indices refer to the full list, not the
/// visible subset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListCommand {
    Add(String),
    Toggle { index: usize, completed: bool },
    BeginEdit(usize),
    SaveEdit { index: usize, name: String },
    CancelEdit(usize),
    Delete(usize),
    ClearCompleted,
    SetFilter(Filter),
}

/// Result of applying a command. `Applied` means the list changed and the
/// presentation should redraw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    Rejected,
}

/// Store operation that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    Open,
    Load,
    Insert,
    Update,
    Delete,
}

impl fmt::Display for StoreOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreOp::Open => write!(f, "open"),
            StoreOp::Load => write!(f, "load"),
            StoreOp::Insert => write!(f, "insert"),
            StoreOp::Update => write!(f, "update"),
            StoreOp::Delete => write!(f, "delete"),
        }
    }
}

/// A swallowed store error, kept for the diagnostic channel
#[derive(Debug, Clone)]
pub struct PersistenceFailure {
    pub op: StoreOp,
    /// Task whose change was not saved (None for open/load)
    pub task: Option<Task>,
    pub message: String,
}

impl fmt::Display for PersistenceFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.task {
            Some(task) => write!(f, "{} of \"{}\" failed: {}", self.op, task.name, self.message),
            None => write!(f, "{} failed: {}", self.op, self.message),
        }
    }
}

impl PersistenceFailure {
    /// Recovery log entry preserving whatever the store did not save
    pub fn recovery_entry(&self) -> RecoveryEntry {
        let category = match self.op {
            StoreOp::Open | StoreOp::Load => RecoveryCategory::Load,
            StoreOp::Insert | StoreOp::Update | StoreOp::Delete => RecoveryCategory::Write,
        };
        match &self.task {
            Some(task) => RecoveryEntry::for_task(category, self.to_string(), task),
            None => RecoveryEntry {
                timestamp: chrono::Utc::now(),
                category,
                description: self.to_string(),
                fields: Vec::new(),
                body: String::new(),
            },
        }
    }
}

pub struct ListController {
    /// None when the store could not be opened; the list then runs unsynced
    store: Option<Box<dyn TaskStore>>,
    items: Vec<TaskItem>,
    filter: Filter,
    active_count: usize,
    failures: Vec<PersistenceFailure>,
    removed: Vec<Task>,
}

impl ListController {
    /// Controller over an already-initialized store. The list starts empty;
    /// call `load` to pull existing rows.
    pub fn new(store: Box<dyn TaskStore>, filter: Filter) -> Self {
        ListController {
            store: Some(store),
            items: Vec::new(),
            filter,
            active_count: 0,
            failures: Vec::new(),
            removed: Vec::new(),
        }
    }

    /// Controller with no backing store. Changes live only in memory.
    pub fn unsynced(filter: Filter) -> Self {
        ListController {
            store: None,
            items: Vec::new(),
            filter,
            active_count: 0,
            failures: Vec::new(),
            removed: Vec::new(),
        }
    }

    /// Open the SQLite store at `path` and load its rows. An open failure is
    /// reported and leaves an empty, unsynced list.
    pub fn open(path: &Path, filter: Filter) -> Self {
        let mut controller = match SqliteStore::open(path) {
            Ok(store) => ListController::new(Box::new(store), filter),
            Err(e) => {
                let mut controller = ListController::unsynced(filter);
                controller.report(StoreOp::Open, None, e.to_string());
                controller
            }
        };
        controller.load();
        controller
    }

    /// Release the store handle
    pub fn close(mut self) -> Result<(), PersistenceError> {
        match self.store.take() {
            Some(store) => {
                debug!("closing task store");
                store.close()
            }
            None => Ok(()),
        }
    }

    pub fn is_synced(&self) -> bool {
        self.store.is_some()
    }

    pub fn store(&self) -> Option<&dyn TaskStore> {
        self.store.as_deref()
    }

    pub fn items(&self) -> &[TaskItem] {
        &self.items
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    /// Tasks not yet completed, over the whole list
    pub fn active_count(&self) -> usize {
        self.active_count
    }

    /// Status text for the active count
    pub fn active_count_label(&self) -> String {
        match self.active_count {
            1 => "1 active item left".to_string(),
            n => format!("{} active items left", n),
        }
    }

    /// Full-list indices of the visible items, in order
    pub fn visible_indices(&self) -> Vec<usize> {
        self.items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.visible)
            .map(|(i, _)| i)
            .collect()
    }

    /// Full-list index of the task with the given store id
    pub fn position_of(&self, id: TaskId) -> Option<usize> {
        self.items.iter().position(|item| item.task.id == Some(id))
    }

    /// Drain queued persistence failures
    pub fn take_failures(&mut self) -> Vec<PersistenceFailure> {
        std::mem::take(&mut self.failures)
    }

    /// Drain tasks removed since the last call (delete and clear completed)
    pub fn take_removed(&mut self) -> Vec<Task> {
        std::mem::take(&mut self.removed)
    }

    /// Drain failures and removed tasks into the recovery log under
    /// `data_dir`. Returns the failures, oldest first, for display.
    pub fn record_diagnostics(&mut self, data_dir: &Path) -> Vec<PersistenceFailure> {
        let failures = self.take_failures();
        for failure in &failures {
            log_recovery(data_dir, failure.recovery_entry());
        }
        for task in self.take_removed() {
            let description = match task.id {
                Some(id) => format!("task {} deleted", id),
                None => "unsaved task deleted".to_string(),
            };
            log_recovery(
                data_dir,
                RecoveryEntry::for_task(RecoveryCategory::Delete, description, &task),
            );
        }
        failures
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    pub fn apply(&mut self, command: ListCommand) -> Outcome {
        debug!(?command, "apply");
        match command {
            ListCommand::Add(name) => self.add(&name),
            ListCommand::Toggle { index, completed } => self.toggle_completion(index, completed),
            ListCommand::BeginEdit(index) => self.begin_edit(index),
            ListCommand::SaveEdit { index, name } => self.save_edit(index, &name),
            ListCommand::CancelEdit(index) => self.cancel_edit(index),
            ListCommand::Delete(index) => self.delete(index),
            ListCommand::ClearCompleted => {
                if self.clear_completed() > 0 {
                    Outcome::Applied
                } else {
                    Outcome::Rejected
                }
            }
            ListCommand::SetFilter(filter) => {
                self.set_filter(filter);
                Outcome::Applied
            }
        }
    }

    /// Replace the in-memory list with the store's rows. A read failure
    /// leaves the current list untouched.
    pub fn load(&mut self) {
        let Some(store) = &self.store else {
            self.recompute();
            return;
        };
        match store.list_all() {
            Ok(tasks) => {
                info!(count = tasks.len(), "tasks loaded");
                self.items = tasks.into_iter().map(TaskItem::new).collect();
            }
            Err(e) => self.report(StoreOp::Load, None, e.to_string()),
        }
        self.recompute();
    }

    /// Append a task named `name` (trimmed) and insert it. Blank names are
    /// rejected.
    pub fn add(&mut self, name: &str) -> Outcome {
        let name = name.trim();
        if name.is_empty() {
            return Outcome::Rejected;
        }

        self.items.push(TaskItem::new(Task::new(name)));
        let index = self.items.len() - 1;

        let result = match &mut self.store {
            Some(store) => store.insert(name, false).map_err(|e| e.to_string()),
            None => Err(STORE_NOT_OPEN.to_string()),
        };
        match result {
            Ok(id) => self.items[index].task.id = Some(id),
            Err(message) => {
                let task = self.items[index].task.clone();
                self.report(StoreOp::Insert, Some(task), message);
            }
        }

        self.recompute();
        Outcome::Applied
    }

    pub fn toggle_completion(&mut self, index: usize, completed: bool) -> Outcome {
        let Some(item) = self.items.get_mut(index) else {
            return Outcome::Rejected;
        };
        item.task.completed = completed;
        self.persist_update(index);
        self.recompute();
        Outcome::Applied
    }

    /// Relabel a task. Blank names are rejected.
    pub fn rename(&mut self, index: usize, new_name: &str) -> Outcome {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Outcome::Rejected;
        }
        let Some(item) = self.items.get_mut(index) else {
            return Outcome::Rejected;
        };
        item.task.name = new_name.to_string();
        self.persist_update(index);
        self.recompute();
        Outcome::Applied
    }

    pub fn delete(&mut self, index: usize) -> Outcome {
        if index >= self.items.len() {
            return Outcome::Rejected;
        }
        let item = self.items.remove(index);
        self.persist_delete(&item.task);
        self.removed.push(item.task);
        self.recompute();
        Outcome::Applied
    }

    /// Delete every completed task, one store call each. Returns how many
    /// were removed from memory; store failures are reported per task.
    pub fn clear_completed(&mut self) -> usize {
        let (done, keep): (Vec<TaskItem>, Vec<TaskItem>) = std::mem::take(&mut self.items)
            .into_iter()
            .partition(|item| item.task.completed);
        self.items = keep;

        for item in &done {
            self.persist_delete(&item.task);
        }
        let count = done.len();
        self.removed.extend(done.into_iter().map(|item| item.task));
        if count > 0 {
            info!(count, "cleared completed tasks");
        }
        self.recompute();
        count
    }

    pub fn set_filter(&mut self, filter: Filter) {
        self.filter = filter;
        self.recompute();
    }

    // -----------------------------------------------------------------------
    // Edit state
    // -----------------------------------------------------------------------

    pub fn begin_edit(&mut self, index: usize) -> Outcome {
        match self.items.get_mut(index) {
            Some(item) if item.view == TaskView::Display => {
                item.view = TaskView::Edit;
                Outcome::Applied
            }
            _ => Outcome::Rejected,
        }
    }

    /// Rename and return to Display. A blank name keeps the task in Edit.
    pub fn save_edit(&mut self, index: usize, name: &str) -> Outcome {
        if self.items.get(index).map(|item| item.view) != Some(TaskView::Edit) {
            return Outcome::Rejected;
        }
        let outcome = self.rename(index, name);
        if outcome == Outcome::Applied {
            self.items[index].view = TaskView::Display;
        }
        outcome
    }

    pub fn cancel_edit(&mut self, index: usize) -> Outcome {
        match self.items.get_mut(index) {
            Some(item) if item.view == TaskView::Edit => {
                item.view = TaskView::Display;
                Outcome::Applied
            }
            _ => Outcome::Rejected,
        }
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn recompute(&mut self) {
        let filter = self.filter;
        let mut active = 0;
        for item in &mut self.items {
            item.visible = filter.matches(item.task.completed);
            if !item.task.completed {
                active += 1;
            }
        }
        self.active_count = active;
    }

    /// Save the task at `index`. A task the store cannot take (no store, or
    /// never inserted) is reported so its data reaches the recovery log.
    fn persist_update(&mut self, index: usize) {
        let task = &self.items[index].task;
        let result = match (&mut self.store, task.id) {
            (Some(store), Some(id)) => store
                .update(id, &task.name, task.completed)
                .map_err(|e| e.to_string()),
            (None, _) => Err(STORE_NOT_OPEN.to_string()),
            (Some(_), None) => Err(TASK_NOT_SAVED.to_string()),
        };
        if let Err(message) = result {
            let task = self.items[index].task.clone();
            self.report(StoreOp::Update, Some(task), message);
        }
    }

    fn persist_delete(&mut self, task: &Task) {
        let (Some(store), Some(id)) = (&mut self.store, task.id) else {
            debug!(name = %task.name, "task not persisted, skipping delete");
            return;
        };
        if let Err(e) = store.delete(id) {
            self.report(StoreOp::Delete, Some(task.clone()), e.to_string());
        }
    }

    fn report(&mut self, op: StoreOp, task: Option<Task>, message: String) {
        warn!(%op, task = task.as_ref().map(|t| t.name.as_str()), error = %message, "store operation failed");
        self.failures.push(PersistenceFailure { op, task, message });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn controller() -> ListController {
        let store = SqliteStore::in_memory().unwrap();
        ListController::new(Box::new(store), Filter::All)
    }

    fn store_rows(c: &ListController) -> Vec<Task> {
        c.store().unwrap().list_all().unwrap()
    }

    fn visible_names(c: &ListController) -> Vec<String> {
        c.visible_indices()
            .into_iter()
            .map(|i| c.items()[i].task.name.clone())
            .collect()
    }

    /// Store that fails every write
    struct BrokenStore;

    impl TaskStore for BrokenStore {
        fn initialize(&mut self) -> Result<(), PersistenceError> {
            Ok(())
        }
        fn insert(&mut self, _: &str, _: bool) -> Result<TaskId, PersistenceError> {
            Err(PersistenceError::Write(rusqlite::Error::InvalidQuery))
        }
        fn update(&mut self, id: TaskId, _: &str, _: bool) -> Result<(), PersistenceError> {
            Err(PersistenceError::NotFound(id))
        }
        fn delete(&mut self, _: TaskId) -> Result<(), PersistenceError> {
            Err(PersistenceError::Write(rusqlite::Error::InvalidQuery))
        }
        fn list_all(&self) -> Result<Vec<Task>, PersistenceError> {
            Err(PersistenceError::Read(rusqlite::Error::InvalidQuery))
        }
        fn close(self: Box<Self>) -> Result<(), PersistenceError> {
            Ok(())
        }
    }

    // --- add ---

    #[test]
    fn add_appends_and_assigns_unique_ids() {
        let mut c = controller();
        for (n, name) in ["Buy milk", "  Pay rent  ", "Walk dog"].iter().enumerate() {
            assert_eq!(c.add(name), Outcome::Applied);
            assert_eq!(c.visible_indices().len(), n + 1);
        }
        let ids: Vec<_> = c.items().iter().map(|i| i.task.id.unwrap()).collect();
        assert_eq!(ids.len(), 3);
        assert!(ids[0] != ids[1] && ids[1] != ids[2] && ids[0] != ids[2]);
        assert_eq!(c.items()[1].task.name, "Pay rent");
        assert_eq!(store_rows(&c)[1].name, "Pay rent");
    }

    #[test]
    fn add_blank_is_noop() {
        let mut c = controller();
        c.add("Buy milk");
        assert_eq!(c.add(""), Outcome::Rejected);
        assert_eq!(c.add("   "), Outcome::Rejected);
        assert_eq!(c.items().len(), 1);
        assert_eq!(store_rows(&c).len(), 1);
    }

    // --- toggle / rename / delete ---

    #[test]
    fn toggle_persists_and_updates_count() {
        let mut c = controller();
        c.add("Buy milk");
        c.add("Pay rent");
        assert_eq!(c.active_count(), 2);

        c.toggle_completion(1, true);
        assert_eq!(c.active_count(), 1);
        assert!(store_rows(&c)[1].completed);

        c.toggle_completion(1, false);
        assert_eq!(c.active_count(), 2);
        assert!(!store_rows(&c)[1].completed);
    }

    #[test]
    fn toggle_out_of_range_rejected() {
        let mut c = controller();
        assert_eq!(c.toggle_completion(3, true), Outcome::Rejected);
    }

    #[test]
    fn rename_trims_and_persists() {
        let mut c = controller();
        c.add("Buy milk");
        assert_eq!(c.rename(0, "  Buy oat milk "), Outcome::Applied);
        assert_eq!(c.items()[0].task.name, "Buy oat milk");
        assert_eq!(store_rows(&c)[0].name, "Buy oat milk");
    }

    #[test]
    fn rename_blank_rejected() {
        let mut c = controller();
        c.add("Buy milk");
        assert_eq!(c.rename(0, "  "), Outcome::Rejected);
        assert_eq!(c.items()[0].task.name, "Buy milk");
    }

    #[test]
    fn delete_removes_from_memory_and_store() {
        let mut c = controller();
        c.add("Buy milk");
        c.add("Pay rent");
        assert_eq!(c.delete(0), Outcome::Applied);
        assert_eq!(visible_names(&c), vec!["Pay rent"]);
        assert_eq!(store_rows(&c).len(), 1);
        let removed = c.take_removed();
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].name, "Buy milk");
        assert!(c.take_removed().is_empty());
    }

    // --- filter ---

    #[test]
    fn set_filter_all_is_idempotent() {
        let mut c = controller();
        c.add("a");
        c.add("b");
        c.toggle_completion(0, true);
        c.set_filter(Filter::All);
        let first: Vec<bool> = c.items().iter().map(|i| i.visible).collect();
        c.set_filter(Filter::All);
        let second: Vec<bool> = c.items().iter().map(|i| i.visible).collect();
        assert_eq!(first, second);
        assert_eq!(first, vec![true, true]);
    }

    #[test]
    fn active_count_ignores_filter() {
        let mut c = controller();
        c.add("a");
        c.add("b");
        c.add("c");
        c.toggle_completion(2, true);
        for filter in Filter::ALL {
            c.set_filter(filter);
            assert_eq!(c.active_count(), 2);
        }
        assert_eq!(c.active_count_label(), "2 active items left");
        c.toggle_completion(0, true);
        assert_eq!(c.active_count_label(), "1 active item left");
    }

    #[test]
    fn new_task_hidden_under_completed_filter() {
        let mut c = controller();
        c.set_filter(Filter::Completed);
        c.add("Buy milk");
        assert!(!c.items()[0].visible);
        assert!(c.visible_indices().is_empty());
    }

    // --- clear completed ---

    #[test]
    fn clear_completed_removes_exactly_completed() {
        let mut c = controller();
        c.add("a");
        c.add("b");
        c.add("c");
        c.toggle_completion(0, true);
        c.toggle_completion(2, true);

        assert_eq!(c.clear_completed(), 2);
        assert_eq!(visible_names(&c), vec!["b"]);
        let rows = store_rows(&c);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "b");
        assert_eq!(c.take_removed().len(), 2);
    }

    #[test]
    fn clear_completed_with_none_completed_is_rejected_command() {
        let mut c = controller();
        c.add("a");
        assert_eq!(c.apply(ListCommand::ClearCompleted), Outcome::Rejected);
        assert_eq!(c.items().len(), 1);
    }

    #[test]
    fn milk_and_rent_scenario() {
        let mut store = SqliteStore::in_memory().unwrap();
        store.insert("Buy milk", false).unwrap();
        store.insert("Pay rent", true).unwrap();
        let mut c = ListController::new(Box::new(store), Filter::All);
        c.load();

        c.apply(ListCommand::SetFilter(Filter::Active));
        assert_eq!(visible_names(&c), vec!["Buy milk"]);
        assert_eq!(c.active_count(), 1);

        c.apply(ListCommand::SetFilter(Filter::Completed));
        assert_eq!(visible_names(&c), vec!["Pay rent"]);

        c.apply(ListCommand::ClearCompleted);
        assert_eq!(c.items().len(), 1);
        assert_eq!(c.items()[0].task.name, "Buy milk");
        let rows = store_rows(&c);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Buy milk");
    }

    // --- load ---

    #[test]
    fn load_replaces_list() {
        let mut store = SqliteStore::in_memory().unwrap();
        store.insert("from store", false).unwrap();
        let mut c = ListController::new(Box::new(store), Filter::All);
        assert!(c.items().is_empty());
        c.load();
        assert_eq!(visible_names(&c), vec!["from store"]);
        assert!(c.items()[0].task.is_persisted());
    }

    // --- edit state ---

    #[test]
    fn edit_state_machine() {
        let mut c = controller();
        c.add("Buy milk");
        assert_eq!(c.items()[0].view, TaskView::Display);

        // Saving outside Edit is rejected
        assert_eq!(c.save_edit(0, "x"), Outcome::Rejected);

        assert_eq!(c.apply(ListCommand::BeginEdit(0)), Outcome::Applied);
        assert_eq!(c.items()[0].view, TaskView::Edit);
        assert_eq!(c.begin_edit(0), Outcome::Rejected);

        // Blank save keeps Edit
        assert_eq!(
            c.apply(ListCommand::SaveEdit {
                index: 0,
                name: "  ".into()
            }),
            Outcome::Rejected
        );
        assert_eq!(c.items()[0].view, TaskView::Edit);

        assert_eq!(
            c.apply(ListCommand::SaveEdit {
                index: 0,
                name: "Buy bread".into()
            }),
            Outcome::Applied
        );
        assert_eq!(c.items()[0].view, TaskView::Display);
        assert_eq!(store_rows(&c)[0].name, "Buy bread");
    }

    #[test]
    fn cancel_edit_keeps_name() {
        let mut c = controller();
        c.add("Buy milk");
        c.begin_edit(0);
        assert_eq!(c.apply(ListCommand::CancelEdit(0)), Outcome::Applied);
        assert_eq!(c.items()[0].view, TaskView::Display);
        assert_eq!(c.items()[0].task.name, "Buy milk");
        assert_eq!(c.cancel_edit(0), Outcome::Rejected);
    }

    // --- failure policy ---

    #[test]
    fn failed_insert_keeps_unsaved_task() {
        let mut c = ListController::new(Box::new(BrokenStore), Filter::All);
        assert_eq!(c.add("Buy milk"), Outcome::Applied);
        assert_eq!(c.items().len(), 1);
        assert_eq!(c.items()[0].task.id, None);

        let failures = c.take_failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].op, StoreOp::Insert);
        assert_eq!(failures[0].task.as_ref().unwrap().name, "Buy milk");
        assert!(c.take_failures().is_empty());

        // Without an id the change cannot be saved; it is reported with the task
        c.toggle_completion(0, true);
        let failures = c.take_failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].op, StoreOp::Update);
        assert_eq!(failures[0].message, TASK_NOT_SAVED);
        assert!(failures[0].task.as_ref().unwrap().completed);
        assert_eq!(c.active_count(), 0);
    }

    #[test]
    fn failed_update_and_delete_do_not_roll_back() {
        let mut c = ListController::new(Box::new(BrokenStore), Filter::All);
        c.items.push(TaskItem::new(Task {
            id: Some(1),
            name: "a".into(),
            completed: false,
        }));
        c.items.push(TaskItem::new(Task {
            id: Some(2),
            name: "b".into(),
            completed: true,
        }));

        c.toggle_completion(0, true);
        assert!(c.items()[0].task.completed);
        assert_eq!(c.clear_completed(), 2);
        assert!(c.items().is_empty());

        let ops: Vec<StoreOp> = c.take_failures().iter().map(|f| f.op).collect();
        assert_eq!(ops, vec![StoreOp::Update, StoreOp::Delete, StoreOp::Delete]);
    }

    #[test]
    fn failed_load_reported() {
        let mut c = ListController::new(Box::new(BrokenStore), Filter::All);
        c.load();
        assert!(c.items().is_empty());
        let failures = c.take_failures();
        assert_eq!(failures[0].op, StoreOp::Load);
        assert_eq!(failures[0].to_string(), format!("load failed: {}", failures[0].message));
    }

    #[test]
    fn unsynced_controller_works_in_memory() {
        let mut c = ListController::unsynced(Filter::Active);
        assert!(!c.is_synced());
        c.add("Buy milk");
        c.toggle_completion(0, true);
        assert!(c.visible_indices().is_empty());
        assert_eq!(c.delete(0), Outcome::Applied);
        c.close().unwrap();
    }

    #[test]
    fn unsynced_changes_are_reported_with_task_data() {
        let mut c = ListController::unsynced(Filter::All);
        c.add("Buy milk");
        c.rename(0, "Buy oat milk");
        c.toggle_completion(0, true);
        // Deleting an unsaved task needs no store call
        c.delete(0);

        let failures = c.take_failures();
        let ops: Vec<StoreOp> = failures.iter().map(|f| f.op).collect();
        assert_eq!(ops, vec![StoreOp::Insert, StoreOp::Update, StoreOp::Update]);
        assert!(failures.iter().all(|f| f.message == STORE_NOT_OPEN));
        assert_eq!(failures[0].task.as_ref().unwrap().name, "Buy milk");
        assert_eq!(failures[2].task.as_ref().unwrap().name, "Buy oat milk");
        assert!(failures[2].task.as_ref().unwrap().completed);
    }

    #[test]
    fn unsynced_add_reaches_recovery_log() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut c = ListController::unsynced(Filter::All);
        c.add("Renew passport");
        let failures = c.record_diagnostics(tmp.path());
        assert_eq!(failures.len(), 1);

        let entries = crate::io::recovery::read_recovery_entries(tmp.path(), None);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].category, RecoveryCategory::Write);
        assert_eq!(entries[0].body, "Renew passport");
        assert_eq!(
            entries[0].description,
            "insert of \"Renew passport\" failed: task store is not open"
        );
    }

    #[test]
    fn open_failure_falls_back_to_unsynced() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut c = ListController::open(&tmp.path().join("missing/dir/todo.db"), Filter::All);
        assert!(!c.is_synced());
        let failures = c.take_failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].op, StoreOp::Open);
    }

    #[test]
    fn open_reload_round_trip() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("todo.db");

        let mut c = ListController::open(&path, Filter::All);
        c.add("Buy milk");
        c.add("Pay rent");
        c.toggle_completion(1, true);
        c.close().unwrap();

        let c = ListController::open(&path, Filter::Completed);
        assert_eq!(visible_names(&c), vec!["Pay rent"]);
        assert_eq!(c.active_count(), 1);
        assert_eq!(c.position_of(c.items()[1].task.id.unwrap()), Some(1));
    }

    #[test]
    fn diagnostics_land_in_recovery_log() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut c = ListController::new(Box::new(BrokenStore), Filter::All);
        c.add("Buy milk");
        c.delete(0);

        let failures = c.record_diagnostics(tmp.path());
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].op, StoreOp::Insert);
        assert!(c.take_removed().is_empty());

        let entries = crate::io::recovery::read_recovery_entries(tmp.path(), None);
        assert_eq!(entries.len(), 2);
        // Most recent first
        assert_eq!(entries[0].category, RecoveryCategory::Delete);
        assert_eq!(entries[0].description, "unsaved task deleted");
        assert_eq!(entries[1].category, RecoveryCategory::Write);
        assert_eq!(entries[1].body, "Buy milk");
    }
}
