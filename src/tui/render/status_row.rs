use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::app::{App, Mode};
use crate::util::unicode;

/// Render the status row (bottom of screen): active count on the left, key
/// hints on the right. A persistence failure replaces the count until the
/// next key press.
pub fn render_status_row(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;

    let mut spans = match &app.status_message {
        Some(msg) => vec![Span::styled(
            format!(" {}", msg),
            Style::default().fg(app.theme.red).bg(bg),
        )],
        None => {
            let mut spans = vec![Span::styled(
                format!(" {}", app.list.active_count_label()),
                Style::default().fg(app.theme.text).bg(bg),
            )];
            if !app.list.is_synced() {
                spans.push(Span::styled(
                    "  (not saved)",
                    Style::default().fg(app.theme.red).bg(bg),
                ));
            }
            spans
        }
    };

    if app.show_key_hints {
        let hint = match app.mode {
            Mode::Navigate => "C clear completed  ? help ",
            Mode::Input => "Enter add  Esc done ",
            Mode::Edit => "Enter save  Esc cancel ",
        };
        let content_width: usize = spans.iter().map(|s| unicode::display_width(&s.content)).sum();
        let hint_width = unicode::display_width(hint);
        if content_width + hint_width < width {
            let padding = width - content_width - hint_width;
            spans.push(Span::styled(" ".repeat(padding), Style::default().bg(bg)));
            spans.push(Span::styled(hint, Style::default().fg(app.theme.dim).bg(bg)));
        }
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}
