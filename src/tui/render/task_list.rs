use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::model::Filter;
use crate::tui::app::App;
use crate::util::unicode;

/// Checkbox for a task
fn checkbox(completed: bool) -> &'static str {
    if completed { "[x]" } else { "[ ]" }
}

/// Message shown when no task passes the filter
fn empty_message(filter: Filter) -> &'static str {
    match filter {
        Filter::All => "No tasks yet. Press a to add one.",
        Filter::Active => "Nothing left to do.",
        Filter::Completed => "No completed tasks.",
    }
}

/// Keep the cursor row inside the viewport
fn adjust_scroll(app: &mut App, height: usize) {
    if height == 0 {
        return;
    }
    if app.cursor < app.scroll_offset {
        app.scroll_offset = app.cursor;
    } else if app.cursor >= app.scroll_offset + height {
        app.scroll_offset = app.cursor + 1 - height;
    }
}

/// Render the visible tasks, one per row
pub fn render_task_list(frame: &mut Frame, app: &mut App, area: Rect) {
    let bg = app.theme.background;
    let visible = app.list.visible_indices();

    if visible.is_empty() {
        let msg = Paragraph::new(Span::styled(
            format!("  {}", empty_message(app.list.filter())),
            Style::default().fg(app.theme.dim).bg(bg),
        ))
        .style(Style::default().bg(bg));
        frame.render_widget(msg, area);
        return;
    }

    let height = area.height as usize;
    adjust_scroll(app, height);

    let width = area.width as usize;
    let mut lines: Vec<Line> = Vec::with_capacity(height);
    for (row, &index) in visible
        .iter()
        .enumerate()
        .skip(app.scroll_offset)
        .take(height)
    {
        let item = &app.list.items()[index];
        let selected = row == app.cursor;
        let row_bg = if selected { app.theme.selection_bg } else { bg };

        let mut spans: Vec<Span> = Vec::new();
        spans.push(Span::styled(
            if selected { "\u{258E}" } else { " " },
            Style::default().fg(app.theme.highlight).bg(row_bg),
        ));
        spans.push(Span::styled(
            format!("{} ", checkbox(item.task.completed)),
            Style::default()
                .fg(app.theme.checkbox_color(item.task.completed))
                .bg(row_bg),
        ));

        if app.is_editing(index) {
            super::push_edit_spans(
                &mut spans,
                &app.edit,
                Style::default().fg(app.theme.text_bright).bg(row_bg),
                Style::default().fg(app.theme.highlight).bg(row_bg),
            );
        } else {
            let mut name_style = if item.task.completed {
                Style::default()
                    .fg(app.theme.dim)
                    .add_modifier(Modifier::CROSSED_OUT)
            } else if selected {
                Style::default().fg(app.theme.text_bright)
            } else {
                Style::default().fg(app.theme.text)
            };
            name_style = name_style.bg(row_bg);
            // 1 marker + 4 checkbox
            let budget = width.saturating_sub(5);
            spans.push(Span::styled(
                unicode::truncate_to_width(&item.task.name, budget),
                name_style,
            ));
        }

        // Fill the rest of a selected row so the highlight spans the width
        if selected {
            let used: usize = spans.iter().map(|s| unicode::display_width(&s.content)).sum();
            if used < width {
                spans.push(Span::styled(
                    " ".repeat(width - used),
                    Style::default().bg(row_bg),
                ));
            }
        }

        lines.push(Line::from(spans));
    }

    let paragraph = Paragraph::new(lines).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::app::{EditLine, Mode};
    use crate::tui::render::test_helpers::*;
    use pretty_assertions::assert_eq;

    fn render_list(app: &mut App, w: u16, h: u16) -> String {
        render_to_string(w, h, |frame, area| render_task_list(frame, app, area))
    }

    #[test]
    fn renders_checkboxes_and_cursor() {
        let mut app = app_with_tasks(
            &[("Buy milk", false), ("Pay rent", true), ("Walk dog", false)],
            Filter::All,
        );
        app.cursor = 1;
        assert_eq!(
            render_list(&mut app, 30, 5),
            " [ ] Buy milk\n▎[x] Pay rent\n [ ] Walk dog"
        );
    }

    #[test]
    fn active_filter_hides_completed() {
        let mut app = app_with_tasks(&[("Buy milk", false), ("Pay rent", true)], Filter::Active);
        let output = render_list(&mut app, 30, 5);
        assert!(output.contains("Buy milk"));
        assert!(!output.contains("Pay rent"));
    }

    #[test]
    fn empty_message_per_filter() {
        let mut app = app_with_tasks(&[("Pay rent", true)], Filter::Active);
        assert_eq!(render_list(&mut app, 40, 3), "  Nothing left to do.");
        let mut app = app_with_tasks(&[], Filter::All);
        assert_eq!(
            render_list(&mut app, 40, 3),
            "  No tasks yet. Press a to add one."
        );
    }

    #[test]
    fn long_names_truncate() {
        let mut app = app_with_tasks(&[("Renew passport before summer", false)], Filter::All);
        let output = render_list(&mut app, 16, 2);
        assert_eq!(output, "\u{258E}[ ] Renew pass\u{2026}");
    }

    #[test]
    fn editing_row_shows_buffer() {
        let mut app = app_with_tasks(&[("Buy milk", false)], Filter::All);
        app.begin_edit();
        assert_eq!(app.mode, Mode::Edit);
        app.edit = EditLine::with_text("Buy bread");
        let output = render_list(&mut app, 30, 2);
        assert_eq!(output, "\u{258E}[ ] Buy bread\u{258C}");
    }

    #[test]
    fn scrolls_to_keep_cursor_visible() {
        let tasks: Vec<(String, bool)> = (1..=6).map(|n| (format!("Task {}", n), false)).collect();
        let refs: Vec<(&str, bool)> = tasks.iter().map(|(n, c)| (n.as_str(), *c)).collect();
        let mut app = app_with_tasks(&refs, Filter::All);
        app.cursor = 5;
        let output = render_list(&mut app, 20, 3);
        assert_eq!(app.scroll_offset, 3);
        assert!(output.starts_with(" [ ] Task 4"));
        assert!(output.contains("Task 6"));
    }
}
