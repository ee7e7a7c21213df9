use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::app::App;
use crate::util::unicode::{display_width, truncate_to_width};

const HINTS: &str = "\u{2190}/\u{2192} choose  u undo  ? help  q quit";
const LOGO_MARK: &str = " \u{2A52} ";
const LOGO_NAME: &str = " sift";

/// Render the status row (bottom of screen): the last message or key hints
/// on the left, the logo on the right
pub fn render_status_row(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;

    let (text, style) = match &app.status {
        Some(status) if status.is_error => (
            status.text.as_str(),
            Style::default().fg(app.theme.red).bg(bg),
        ),
        Some(status) => (
            status.text.as_str(),
            Style::default().fg(app.theme.text).bg(bg),
        ),
        None => (HINTS, Style::default().fg(app.theme.dim).bg(bg)),
    };

    let logo_width = display_width(LOGO_MARK) + display_width(LOGO_NAME);
    let mut spans = Vec::new();
    if width > logo_width + 1 {
        let room = width - logo_width - 1;
        let text = truncate_to_width(text, room);
        let padding = width - display_width(&text) - logo_width;
        spans.push(Span::styled(text, style));
        spans.push(Span::styled(" ".repeat(padding), Style::default().bg(bg)));
        spans.push(Span::styled(
            LOGO_MARK,
            Style::default()
                .fg(app.theme.accent)
                .bg(app.theme.highlight)
                .add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::styled(
            LOGO_NAME,
            Style::default()
                .fg(app.theme.text)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        ));
    } else {
        spans.push(Span::styled(truncate_to_width(text, width), style));
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}
