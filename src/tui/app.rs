use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::{info, warn};

use crate::io::config_io::{read_config, resolve_data_dir, store_path};
use crate::io::logging::init_file_logging;
use crate::io::state::{UiState, read_ui_state, write_ui_state};
use crate::model::{AppConfig, Filter};
use crate::ops::list_ops::{ListCommand, ListController, Outcome, TaskView};
use crate::util::unicode;

use super::input;
use super::render;
use super::theme::Theme;

/// Current interaction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Navigate,
    /// Typing a new task
    Input,
    /// Renaming the task at `App::edit_index`
    Edit,
}

/// Single-line text buffer with a grapheme-aware cursor (byte offset)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditLine {
    pub text: String,
    pub cursor: usize,
}

impl EditLine {
    pub fn with_text(text: &str) -> Self {
        EditLine {
            text: text.to_string(),
            cursor: text.len(),
        }
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    pub fn insert(&mut self, c: char) {
        self.text.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    pub fn insert_str(&mut self, s: &str) {
        let clean = s.replace(['\n', '\r'], " ");
        self.text.insert_str(self.cursor, &clean);
        self.cursor += clean.len();
    }

    pub fn backspace(&mut self) {
        if let Some(prev) = unicode::prev_grapheme_boundary(&self.text, self.cursor) {
            self.text.replace_range(prev..self.cursor, "");
            self.cursor = prev;
        }
    }

    pub fn delete(&mut self) {
        if let Some(next) = unicode::next_grapheme_boundary(&self.text, self.cursor) {
            self.text.replace_range(self.cursor..next, "");
        }
    }

    pub fn delete_word_back(&mut self) {
        let start = unicode::word_boundary_left(&self.text, self.cursor);
        self.text.replace_range(start..self.cursor, "");
        self.cursor = start;
    }

    pub fn delete_to_start(&mut self) {
        self.text.replace_range(..self.cursor, "");
        self.cursor = 0;
    }

    pub fn left(&mut self) {
        if let Some(prev) = unicode::prev_grapheme_boundary(&self.text, self.cursor) {
            self.cursor = prev;
        }
    }

    pub fn right(&mut self) {
        if let Some(next) = unicode::next_grapheme_boundary(&self.text, self.cursor) {
            self.cursor = next;
        }
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.text.len();
    }

    /// Text before and after the cursor
    pub fn split(&self) -> (&str, &str) {
        self.text.split_at(self.cursor)
    }
}

/// Main application state
pub struct App {
    pub list: ListController,
    pub data_dir: PathBuf,
    pub mode: Mode,
    pub should_quit: bool,
    pub theme: Theme,
    pub show_key_hints: bool,
    pub show_help: bool,
    /// Cursor index into the visible items
    pub cursor: usize,
    /// First visible row of the task list
    pub scroll_offset: usize,
    /// New-task input line
    pub input: EditLine,
    /// Rename buffer while in Edit mode
    pub edit: EditLine,
    /// Full-list index of the task being renamed
    pub edit_index: Option<usize>,
    /// Last persistence failure, shown in the status row
    pub status_message: Option<String>,
}

impl App {
    pub fn new(list: ListController, data_dir: PathBuf, config: &AppConfig) -> Self {
        let mut app = App {
            list,
            data_dir,
            mode: Mode::Navigate,
            should_quit: false,
            theme: Theme::from_config(&config.ui),
            show_key_hints: config.ui.show_key_hints,
            show_help: false,
            cursor: 0,
            scroll_offset: 0,
            input: EditLine::default(),
            edit: EditLine::default(),
            edit_index: None,
            status_message: None,
        };
        // Surface open/load failures from startup
        app.absorb_diagnostics();
        app
    }

    /// Full-list index of the task under the cursor
    pub fn cursor_index(&self) -> Option<usize> {
        self.list.visible_indices().get(self.cursor).copied()
    }

    /// Hand a command to the controller, then pick up anything it reported
    pub fn dispatch(&mut self, command: ListCommand) -> Outcome {
        let outcome = self.list.apply(command);
        self.absorb_diagnostics();
        self.clamp_cursor();
        outcome
    }

    pub fn set_filter(&mut self, filter: Filter) {
        if filter != self.list.filter() {
            self.dispatch(ListCommand::SetFilter(filter));
            self.cursor = 0;
            self.scroll_offset = 0;
        }
    }

    /// Submit the input line as a new task. Input is cleared only when the
    /// task was accepted.
    pub fn submit_input(&mut self) {
        let name = self.input.text.clone();
        if self.dispatch(ListCommand::Add(name)) == Outcome::Applied {
            self.input.clear();
            // Move to the new task if it is visible under the current filter
            let last = self.list.items().len() - 1;
            if let Some(pos) = self.list.visible_indices().iter().position(|&i| i == last) {
                self.cursor = pos;
            }
        }
    }

    /// Flip completion of the task under the cursor
    pub fn toggle_cursor_task(&mut self) {
        if let Some(index) = self.cursor_index() {
            let completed = !self.list.items()[index].task.completed;
            self.dispatch(ListCommand::Toggle { index, completed });
        }
    }

    pub fn delete_cursor_task(&mut self) {
        if let Some(index) = self.cursor_index() {
            self.dispatch(ListCommand::Delete(index));
        }
    }

    pub fn clear_completed(&mut self) {
        self.dispatch(ListCommand::ClearCompleted);
    }

    /// Enter Edit mode on the task under the cursor
    pub fn begin_edit(&mut self) {
        let Some(index) = self.cursor_index() else {
            return;
        };
        if self.dispatch(ListCommand::BeginEdit(index)) == Outcome::Applied {
            self.edit = EditLine::with_text(&self.list.items()[index].task.name);
            self.edit_index = Some(index);
            self.mode = Mode::Edit;
        }
    }

    /// Save the rename. A blank name keeps Edit mode open.
    pub fn save_edit(&mut self) {
        let Some(index) = self.edit_index else {
            self.mode = Mode::Navigate;
            return;
        };
        let name = self.edit.text.clone();
        if self.dispatch(ListCommand::SaveEdit { index, name }) == Outcome::Applied {
            self.finish_edit();
        }
    }

    pub fn cancel_edit(&mut self) {
        if let Some(index) = self.edit_index {
            self.dispatch(ListCommand::CancelEdit(index));
        }
        self.finish_edit();
    }

    fn finish_edit(&mut self) {
        self.edit.clear();
        self.edit_index = None;
        self.mode = Mode::Navigate;
    }

    /// Whether the item at full-list index `index` is being renamed
    pub fn is_editing(&self, index: usize) -> bool {
        self.edit_index == Some(index) && self.list.items()[index].view == TaskView::Edit
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let len = self.list.visible_indices().len();
        if len == 0 {
            self.cursor = 0;
            return;
        }
        self.cursor = self.cursor.saturating_add_signed(delta).min(len - 1);
    }

    pub fn clamp_cursor(&mut self) {
        let len = self.list.visible_indices().len();
        self.cursor = self.cursor.min(len.saturating_sub(1));
    }

    /// Drain controller diagnostics into the status row and the recovery log
    fn absorb_diagnostics(&mut self) {
        if let Some(failure) = self.list.record_diagnostics(&self.data_dir).pop() {
            self.status_message = Some(failure.to_string());
        }
    }

    /// Close the store. Failures are logged, not returned.
    pub fn close(self) {
        if let Err(e) = self.list.close() {
            warn!(error = %e, "could not close task store");
        }
    }
}

/// Restore filter and cursor from .todo-state.json
pub fn restore_ui_state(app: &mut App) {
    if let Some(state) = read_ui_state(&app.data_dir) {
        app.cursor = state.cursor;
        app.clamp_cursor();
    }
}

/// Save filter and cursor to .todo-state.json
pub fn save_ui_state(app: &App) {
    let state = UiState {
        filter: app.list.filter(),
        cursor: app.cursor,
    };
    if let Err(e) = write_ui_state(&app.data_dir, &state) {
        warn!(error = %e, "could not save UI state");
    }
}

/// Filter to open with: the saved tab, else the configured default
fn initial_filter(data_dir: &Path, config: &AppConfig) -> Filter {
    read_ui_state(data_dir)
        .map(|s| s.filter)
        .unwrap_or(config.ui.default_filter)
}

/// Run the TUI application
pub fn run(data_dir: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let data_dir = resolve_data_dir(data_dir)?;
    let config = read_config(&data_dir)?;
    init_file_logging(&data_dir, &config.log)?;
    info!(data_dir = %data_dir.display(), "starting TUI");

    let filter = initial_filter(&data_dir, &config);
    let list = ListController::open(&store_path(&data_dir, &config), filter);
    let mut app = App::new(list, data_dir, &config);
    restore_ui_state(&mut app);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Install panic hook to restore terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let result = run_event_loop(&mut terminal, &mut app);

    save_ui_state(&app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    app.close();
    info!("TUI exited");
    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|frame| render::render(frame, app))?;

        if event::poll(Duration::from_millis(250))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    input::handle_key(app, key);
                }
                Event::Paste(text) => input::handle_paste(app, &text),
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}
