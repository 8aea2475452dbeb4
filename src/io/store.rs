//! Durable task table.
//!
//! `TaskStore` is the seam between the list controller and persistence;
//! `SqliteStore` is the production implementation over a single local file.

use std::path::{Path, PathBuf};

use rusqlite::{Connection, params};
use tracing::debug;

use crate::model::task::{Task, TaskId};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS tasks (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    name      TEXT NOT NULL,
    completed BOOLEAN NOT NULL
);
";

/// Error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("could not open task store {path}: {source}")]
    Open {
        path: PathBuf,
        source: rusqlite::Error,
    },
    #[error("could not read tasks: {0}")]
    Read(rusqlite::Error),
    #[error("could not write tasks: {0}")]
    Write(rusqlite::Error),
    #[error("task {0} not found in store")]
    NotFound(TaskId),
}

/// Create/update/delete/list over the task table
pub trait TaskStore {
    /// Create the backing table if it does not exist yet
    fn initialize(&mut self) -> Result<(), PersistenceError>;

    /// Insert a new row, returning the id the store assigned
    fn insert(&mut self, name: &str, completed: bool) -> Result<TaskId, PersistenceError>;

    /// Overwrite the row with `id`. Unknown ids are an error.
    fn update(&mut self, id: TaskId, name: &str, completed: bool) -> Result<(), PersistenceError>;

    /// Delete the row with `id`. Deleting an absent row is not an error.
    fn delete(&mut self, id: TaskId) -> Result<(), PersistenceError>;

    /// Every row, in creation order
    fn list_all(&self) -> Result<Vec<Task>, PersistenceError>;

    /// Release the underlying handle
    fn close(self: Box<Self>) -> Result<(), PersistenceError>;
}

/// SQLite-backed task store
pub struct SqliteStore {
    conn: Connection,
    path: Option<PathBuf>,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and make sure the table exists
    pub fn open(path: &Path) -> Result<Self, PersistenceError> {
        let conn = Connection::open(path).map_err(|e| PersistenceError::Open {
            path: path.to_path_buf(),
            source: e,
        })?;
        let mut store = SqliteStore {
            conn,
            path: Some(path.to_path_buf()),
        };
        store.initialize()?;
        debug!(path = %path.display(), "task store opened");
        Ok(store)
    }

    /// In-memory database, for tests
    pub fn in_memory() -> Result<Self, PersistenceError> {
        let conn = Connection::open_in_memory().map_err(|e| PersistenceError::Open {
            path: PathBuf::from(":memory:"),
            source: e,
        })?;
        let mut store = SqliteStore { conn, path: None };
        store.initialize()?;
        Ok(store)
    }

    /// Backing file, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl TaskStore for SqliteStore {
    fn initialize(&mut self) -> Result<(), PersistenceError> {
        self.conn.execute_batch(SCHEMA).map_err(|e| match &self.path {
            Some(path) => PersistenceError::Open {
                path: path.clone(),
                source: e,
            },
            None => PersistenceError::Write(e),
        })
    }

    fn insert(&mut self, name: &str, completed: bool) -> Result<TaskId, PersistenceError> {
        self.conn
            .execute(
                "INSERT INTO tasks (name, completed) VALUES (?1, ?2)",
                params![name, completed],
            )
            .map_err(PersistenceError::Write)?;
        let id = self.conn.last_insert_rowid();
        debug!(id, name, completed, "task inserted");
        Ok(id)
    }

    fn update(&mut self, id: TaskId, name: &str, completed: bool) -> Result<(), PersistenceError> {
        let changed = self
            .conn
            .execute(
                "UPDATE tasks SET name = ?1, completed = ?2 WHERE id = ?3",
                params![name, completed, id],
            )
            .map_err(PersistenceError::Write)?;
        if changed == 0 {
            return Err(PersistenceError::NotFound(id));
        }
        debug!(id, name, completed, "task updated");
        Ok(())
    }

    fn delete(&mut self, id: TaskId) -> Result<(), PersistenceError> {
        let changed = self
            .conn
            .execute("DELETE FROM tasks WHERE id = ?1", params![id])
            .map_err(PersistenceError::Write)?;
        debug!(id, changed, "task deleted");
        Ok(())
    }

    fn list_all(&self) -> Result<Vec<Task>, PersistenceError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, completed FROM tasks ORDER BY id")
            .map_err(PersistenceError::Read)?;
        let tasks = stmt
            .query_map([], |row| {
                Ok(Task {
                    id: Some(row.get(0)?),
                    name: row.get(1)?,
                    completed: row.get(2)?,
                })
            })
            .map_err(PersistenceError::Read)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(PersistenceError::Read)?;
        Ok(tasks)
    }

    fn close(self: Box<Self>) -> Result<(), PersistenceError> {
        self.conn
            .close()
            .map_err(|(_, e)| PersistenceError::Write(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn list_all_on_empty_table() {
        let store = SqliteStore::in_memory().unwrap();
        assert!(store.list_all().unwrap().is_empty());
    }

    #[test]
    fn insert_then_list_round_trips_fields() {
        let mut store = SqliteStore::in_memory().unwrap();
        let id = store.insert("Buy milk", false).unwrap();
        let id2 = store.insert("Pay rent", true).unwrap();
        assert_ne!(id, id2);

        let tasks = store.list_all().unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].id, Some(id));
        assert_eq!(tasks[0].name, "Buy milk");
        assert!(!tasks[0].completed);
        assert_eq!(tasks[1].id, Some(id2));
        assert_eq!(tasks[1].name, "Pay rent");
        assert!(tasks[1].completed);
    }

    #[test]
    fn update_overwrites_row() {
        let mut store = SqliteStore::in_memory().unwrap();
        let id = store.insert("Buy milk", false).unwrap();
        store.update(id, "Buy oat milk", true).unwrap();

        let tasks = store.list_all().unwrap();
        assert_eq!(tasks[0].name, "Buy oat milk");
        assert!(tasks[0].completed);
    }

    #[test]
    fn update_unknown_id_is_not_found() {
        let mut store = SqliteStore::in_memory().unwrap();
        let err = store.update(42, "nope", false).unwrap_err();
        assert!(matches!(err, PersistenceError::NotFound(42)));
    }

    #[test]
    fn delete_removes_row_and_tolerates_absent_id() {
        let mut store = SqliteStore::in_memory().unwrap();
        let id = store.insert("Buy milk", false).unwrap();
        store.delete(id).unwrap();
        assert!(store.list_all().unwrap().is_empty());
        // Second delete is a no-op
        store.delete(id).unwrap();
    }

    #[test]
    fn ids_are_not_reused_after_delete() {
        let mut store = SqliteStore::in_memory().unwrap();
        let first = store.insert("a", false).unwrap();
        store.delete(first).unwrap();
        let second = store.insert("b", false).unwrap();
        assert!(second > first);
    }

    #[test]
    fn file_store_persists_across_reopen() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("todo.db");

        let mut store = SqliteStore::open(&path).unwrap();
        store.insert("Water plants", true).unwrap();
        Box::new(store).close().unwrap();

        let reopened = SqliteStore::open(&path).unwrap();
        assert_eq!(reopened.path(), Some(path.as_path()));
        let tasks = reopened.list_all().unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].name, "Water plants");
        assert!(tasks[0].completed);
    }

    #[test]
    fn open_in_missing_directory_fails() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("no/such/dir/todo.db");
        let err = SqliteStore::open(&path).err().unwrap();
        assert!(matches!(err, PersistenceError::Open { .. }));
    }

    #[test]
    fn write_failure_surfaces_as_write_error() {
        let mut store = SqliteStore::in_memory().unwrap();
        store.conn.execute_batch("DROP TABLE tasks").unwrap();
        let err = store.insert("orphan", false).unwrap_err();
        assert!(matches!(err, PersistenceError::Write(_)));
    }
}
