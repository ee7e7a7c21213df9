use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::model::{Task, TaskStatus};
use crate::ops::compare::Pair;
use crate::ops::levels::assign_levels;
use crate::tui::app::App;
use crate::util::unicode::{display_width, fit_to_width};

const OPEN_MARK: &str = "\u{25CB}"; // ○
const COMPLETED_MARK: &str = "\u{2714}"; // ✔
const CANCELED_MARK: &str = "\u{2715}"; // ✕
const LEFT_KEYS: [&str; 3] = ["\u{2190}", "1", "h"];
const RIGHT_KEYS: [&str; 3] = ["\u{2192}", "2", "l"];

/// Render the main view: done tasks, the prioritized chain, then the
/// comparison and everything still unranked. Clamps `app.scroll` to the
/// content height.
pub fn render_prioritize_view(frame: &mut Frame, app: &mut App, area: Rect) {
    let lines = content_lines(app, area.width as usize);

    let max_scroll = lines.len().saturating_sub(area.height as usize);
    app.scroll = app.scroll.min(max_scroll);

    let visible: Vec<Line> = lines
        .into_iter()
        .skip(app.scroll)
        .take(area.height as usize)
        .collect();
    let paragraph = Paragraph::new(visible).style(Style::default().bg(app.theme.background));
    frame.render_widget(paragraph, area);
}

/// Every line of the view, before scrolling
pub fn content_lines(app: &App, width: usize) -> Vec<Line<'static>> {
    let bg = app.theme.background;
    let mut lines: Vec<Line<'static>> = Vec::new();

    if !app.is_loaded() {
        lines.push(Line::from(Span::styled(
            "Loading tasks\u{2026}",
            Style::default().fg(app.theme.dim).bg(bg),
        )));
        return lines;
    }
    if app.tasks.is_empty() {
        lines.push(Line::from(Span::styled(
            "No tasks",
            Style::default().fg(app.theme.dim).bg(bg),
        )));
        return lines;
    }

    let levels = assign_levels(&app.tasks);
    let ambiguous = levels.highest_ambiguous();
    // Depths that hold exactly one task, counting down from the roots
    let resolved_depth = levels.iter().take_while(|b| b.len() == 1).count();

    let done: Vec<&Task> = app
        .tasks
        .iter()
        .filter(|t| t.status.is_terminal())
        .collect();
    if !done.is_empty() {
        push_section_header(&mut lines, app, "Done", width);
        let style = Style::default()
            .fg(app.theme.dim)
            .bg(bg)
            .add_modifier(Modifier::CROSSED_OUT);
        // Reversed so the most recently finished sit at the bottom
        for task in done.iter().rev() {
            let mark = match task.status {
                TaskStatus::Canceled => CANCELED_MARK,
                _ => COMPLETED_MARK,
            };
            lines.push(Line::from(Span::styled(
                format!("{} {}", mark, task.name),
                style,
            )));
        }
        lines.push(Line::from(""));
    }

    if resolved_depth > 0 {
        push_section_header(&mut lines, app, "Prioritized", width);
        let badge_style = Style::default().fg(app.theme.accent).bg(app.theme.highlight);
        let name_style = Style::default().fg(app.theme.highlight).bg(bg);
        let rank_width = resolved_depth.to_string().len();
        for depth in 0..resolved_depth {
            for id in levels.bucket(depth) {
                let Some(task) = app.tasks.get(id) else {
                    continue;
                };
                lines.push(Line::from(vec![
                    Span::styled(
                        format!(" {:>w$} ", depth + 1, w = rank_width),
                        badge_style,
                    ),
                    Span::styled(format!(" {} {}", OPEN_MARK, task.name), name_style),
                ]));
            }
        }
    }

    if resolved_depth == levels.len() {
        if resolved_depth > 0 {
            lines.push(Line::from(""));
        }
        lines.push(Line::from(Span::styled(
            "All tasks prioritized",
            Style::default().fg(app.theme.dim).bg(bg),
        )));
        return lines;
    }

    if resolved_depth > 0 {
        lines.push(Line::from(""));
    }
    push_section_header(&mut lines, app, "Not prioritized", width);
    if let Some(pair) = &app.pair {
        push_choice_boxes(&mut lines, app, pair, width);
        lines.push(Line::from(""));
    }

    let lower_style = Style::default().fg(app.theme.dim).bg(bg);
    let current_style = Style::default().fg(app.theme.text).bg(bg);
    for (depth, bucket) in levels.iter().enumerate().skip(resolved_depth) {
        let style = if Some(depth) == ambiguous {
            current_style
        } else {
            lower_style
        };
        for id in bucket {
            let Some(task) = app.tasks.get(id) else {
                continue;
            };
            lines.push(Line::from(Span::styled(
                format!("{}? {} {}", depth + 1, OPEN_MARK, task.name),
                style,
            )));
        }
    }

    lines
}

/// " Title " on the accent color followed by a hatched rule to the edge
fn push_section_header(lines: &mut Vec<Line<'static>>, app: &App, title: &str, width: usize) {
    let label = format!(" {} ", title);
    let mut spans = vec![Span::styled(
        label.clone(),
        Style::default()
            .fg(app.theme.text_bright)
            .bg(app.theme.accent),
    )];
    let remaining = width.saturating_sub(display_width(&label) + 1);
    if remaining > 0 {
        spans.push(Span::styled(
            format!(" {}", "\u{2571}".repeat(remaining)),
            Style::default().fg(app.theme.accent).bg(app.theme.background),
        ));
    }
    lines.push(Line::from(spans));
    lines.push(Line::from(""));
}

/// The two candidates side by side in rounded boxes, each labelled with the
/// keys that pick it
fn push_choice_boxes(lines: &mut Vec<Line<'static>>, app: &App, pair: &Pair, width: usize) {
    let bg = app.theme.background;
    let key_style = Style::default().fg(app.theme.text_bright).bg(bg);
    let border_style = Style::default().fg(app.theme.accent).bg(bg);
    let name_style = Style::default().fg(app.theme.text).bg(bg);

    let names = [
        current_name(app, &pair.a.id, &pair.a.name),
        current_name(app, &pair.b.id, &pair.b.name),
    ];

    let half = width / 2;
    // Border, padding and at least one cell of text
    if half < 5 {
        for (keys, name) in [LEFT_KEYS, RIGHT_KEYS].iter().zip(&names) {
            lines.push(Line::from(vec![
                Span::styled(keys[0].to_string(), key_style),
                Span::styled(format!(" {}", name), name_style),
            ]));
        }
        return;
    }
    let inner = half - 2;

    let mut label_spans = Vec::new();
    for keys in [LEFT_KEYS, RIGHT_KEYS] {
        let mut used = 2;
        label_spans.push(Span::styled("  ", key_style));
        for (i, key) in keys.iter().enumerate() {
            if i > 0 {
                label_spans.push(Span::styled(" / ", border_style));
                used += 3;
            }
            label_spans.push(Span::styled(key.to_string(), key_style));
            used += display_width(key);
        }
        label_spans.push(Span::styled(
            " ".repeat(half.saturating_sub(used)),
            key_style,
        ));
    }
    lines.push(Line::from(label_spans));

    let horizontal = "\u{2500}".repeat(inner);
    let top = format!("\u{256D}{}\u{256E}", horizontal);
    let bottom = format!("\u{2570}{}\u{256F}", horizontal);

    lines.push(Line::from(vec![
        Span::styled(top.clone(), border_style),
        Span::styled(top, border_style),
    ]));

    let mut middle = Vec::new();
    for name in &names {
        middle.push(Span::styled("\u{2502} ", border_style));
        middle.push(Span::styled(
            fit_to_width(name, inner.saturating_sub(2)),
            name_style,
        ));
        middle.push(Span::styled(" \u{2502}", border_style));
    }
    lines.push(Line::from(middle));

    lines.push(Line::from(vec![
        Span::styled(bottom.clone(), border_style),
        Span::styled(bottom, border_style),
    ]));
}

/// The store's name wins over the one captured with the pair, so a rename
/// shows up even before the pair is reselected
fn current_name(app: &App, id: &str, fallback: &str) -> String {
    app.tasks
        .get(id)
        .map_or_else(|| fallback.to_string(), |t| t.name.clone())
}
