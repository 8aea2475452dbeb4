use std::ops::{Deref, DerefMut};

use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::layout::Rect;
use tempfile::TempDir;

use crate::io::store::{SqliteStore, TaskStore};
use crate::model::{AppConfig, Filter};
use crate::ops::list_ops::ListController;
use crate::tui::app::App;

pub const TERM_W: u16 = 80;
pub const TERM_H: u16 = 24;

/// Render into an in-memory buffer and return plain text (no styles).
pub fn render_to_string<F>(w: u16, h: u16, f: F) -> String
where
    F: FnOnce(&mut ratatui::Frame, Rect),
{
    let backend = TestBackend::new(w, h);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal
        .draw(|frame| {
            let area = frame.area();
            f(frame, area);
        })
        .unwrap();

    let buf = terminal.backend().buffer().clone();
    let w = buf.area.width as usize;
    let lines: Vec<String> = buf
        .content
        .chunks(w)
        .map(|row| {
            let s: String = row.iter().map(|cell| cell.symbol()).collect();
            s.trim_end().to_string()
        })
        .collect();

    // Trim trailing blank lines
    let end = lines
        .iter()
        .rposition(|l| !l.is_empty())
        .map_or(0, |i| i + 1);
    lines[..end].join("\n")
}

/// An App whose data directory is a private temp dir, removed on drop.
pub struct TestApp {
    app: App,
    _data_dir: TempDir,
}

impl Deref for TestApp {
    type Target = App;

    fn deref(&self) -> &App {
        &self.app
    }
}

impl DerefMut for TestApp {
    fn deref_mut(&mut self) -> &mut App {
        &mut self.app
    }
}

/// Build an App over an in-memory store seeded with `(name, completed)` rows.
pub fn app_with_tasks(tasks: &[(&str, bool)], filter: Filter) -> TestApp {
    let mut store = SqliteStore::in_memory().unwrap();
    for (name, completed) in tasks {
        store.insert(name, *completed).unwrap();
    }
    let mut list = ListController::new(Box::new(store), filter);
    list.load();
    let data_dir = TempDir::new().unwrap();
    let app = App::new(list, data_dir.path().to_path_buf(), &AppConfig::default());
    TestApp {
        app,
        _data_dir: data_dir,
    }
}
