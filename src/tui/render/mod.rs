pub mod help_overlay;
pub mod status_row;
pub mod tab_bar;
pub mod task_list;

#[cfg(test)]
pub mod test_helpers;

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};

use super::app::{App, EditLine, Mode};

const INPUT_PLACEHOLDER: &str = "What needs to be done?";

/// Main render function: dispatches to sub-renderers
pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    // Background fill
    let bg_style = Style::default().bg(app.theme.background);
    frame.render_widget(Block::default().style(bg_style), area);

    // Layout: title | input | tab bar (2 rows) | task list | status row
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // title
            Constraint::Length(2), // input + gap
            Constraint::Length(2), // tab bar + separator
            Constraint::Min(1),    // task list
            Constraint::Length(1), // status row
        ])
        .split(area);

    render_title(frame, app, chunks[0]);
    render_input(frame, app, chunks[1]);
    tab_bar::render_tab_bar(frame, app, chunks[2]);
    task_list::render_task_list(frame, app, chunks[3]);
    status_row::render_status_row(frame, app, chunks[4]);

    // Help overlay (rendered on top of everything)
    if app.show_help {
        help_overlay::render_help_overlay(frame, app, area);
    }
}

fn render_title(frame: &mut Frame, app: &App, area: Rect) {
    let title = Paragraph::new(Span::styled(
        "To-Do List",
        Style::default()
            .fg(app.theme.text_bright)
            .add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center)
    .style(Style::default().bg(app.theme.background));
    frame.render_widget(title, area);
}

fn render_input(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let focused = app.mode == Mode::Input;
    let mut spans = vec![Span::styled(
        " + ",
        Style::default().fg(app.theme.purple).bg(bg),
    )];

    if focused {
        push_edit_spans(
            &mut spans,
            &app.input,
            Style::default().fg(app.theme.text_bright).bg(bg),
            Style::default().fg(app.theme.highlight).bg(bg),
        );
    } else if app.input.text.is_empty() {
        spans.push(Span::styled(
            INPUT_PLACEHOLDER,
            Style::default().fg(app.theme.dim).bg(bg),
        ));
    } else {
        spans.push(Span::styled(
            app.input.text.clone(),
            Style::default().fg(app.theme.text).bg(bg),
        ));
    }

    let input_area = Rect { height: 1, ..area };
    frame.render_widget(
        Paragraph::new(Line::from(spans)).style(Style::default().bg(bg)),
        input_area,
    );
}

/// Push the text of an edit line with a block cursor at its cursor position
pub(super) fn push_edit_spans(
    spans: &mut Vec<Span<'static>>,
    line: &EditLine,
    text_style: Style,
    cursor_style: Style,
) {
    let (before, after) = line.split();
    spans.push(Span::styled(before.to_string(), text_style));
    spans.push(Span::styled("\u{258C}", cursor_style)); // ▌ cursor
    spans.push(Span::styled(after.to_string(), text_style));
}
