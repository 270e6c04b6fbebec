// List rendering helpers.
// Placeholder states and the Home tab lists.

use chrono::{DateTime, Utc};
use ratatui::{prelude::*, widgets::*};

use crate::app::HistoryEntry;
use crate::state::{ConsoleLevel, ConsoleState, SelectableList};

/// Format a timestamp as relative time (e.g., "2h ago").
pub fn format_relative_time(dt: &DateTime<Utc>) -> String {
    let now = Utc::now();
    let duration = now.signed_duration_since(*dt);

    if duration.num_days() > 0 {
        format!("{}d ago", duration.num_days())
    } else if duration.num_hours() > 0 {
        format!("{}h ago", duration.num_hours())
    } else if duration.num_minutes() > 0 {
        format!("{}m ago", duration.num_minutes())
    } else {
        "just now".to_string()
    }
}

pub fn render_loading(frame: &mut Frame, area: Rect, message: &str) {
    let text = Paragraph::new(message)
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Yellow));
    frame.render_widget(text, area);
}

pub fn render_error(frame: &mut Frame, area: Rect, error: &str) {
    let text = Paragraph::new(error)
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Red))
        .wrap(Wrap { trim: true });
    frame.render_widget(text, area);
}

pub fn render_empty(frame: &mut Frame, area: Rect, message: &str) {
    let text = Paragraph::new(message)
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(text, area);
}

pub fn render_entities_list(frame: &mut Frame, list: &mut SelectableList<String>, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Entities ");

    if list.is_empty() {
        let inner = block.inner(area);
        frame.render_widget(block, area);
        render_empty(frame, inner, "No entities yet. Press e to create one.");
        return;
    }

    let items: Vec<ListItem> = list
        .items
        .iter()
        .map(|name| ListItem::new(Line::from(Span::raw(name.clone()))))
        .collect();

    let widget = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(widget, area, &mut list.list_state);
}

pub fn render_history_list(frame: &mut Frame, list: &SelectableList<HistoryEntry>, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Activity ");

    if list.is_empty() {
        let inner = block.inner(area);
        frame.render_widget(block, area);
        render_empty(frame, inner, "Nothing loaded or created yet");
        return;
    }

    // Newest first
    let items: Vec<ListItem> = list
        .items
        .iter()
        .rev()
        .map(|entry| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:>9} ", format_relative_time(&entry.timestamp)),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::raw(entry.label.clone()),
            ]))
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}

fn level_tag(level: ConsoleLevel) -> (&'static str, Color) {
    match level {
        ConsoleLevel::Error => ("ERROR", Color::Red),
        ConsoleLevel::Warn => ("WARN ", Color::Yellow),
        ConsoleLevel::Info => ("INFO ", Color::Cyan),
    }
}

/// Console tab: newest message on top.
pub fn render_console(frame: &mut Frame, console: &mut ConsoleState, area: Rect) {
    let problems = console
        .messages
        .iter()
        .filter(|m| m.level != ConsoleLevel::Info)
        .count();
    let title = match problems {
        0 => " Console ".to_string(),
        n => format!(" Console ({} problems) ", n),
    };
    let block = Block::default().borders(Borders::ALL).title(title);

    if console.messages.is_empty() {
        let inner = block.inner(area);
        frame.render_widget(block, area);
        render_empty(frame, inner, "No messages");
        return;
    }

    let items: Vec<ListItem> = console
        .messages
        .iter()
        .rev()
        .map(|msg| {
            let (tag, color) = level_tag(msg.level);
            ListItem::new(Line::from(vec![
                Span::styled(
                    msg.timestamp.format("%H:%M:%S ").to_string(),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(format!("{} ", tag), Style::default().fg(color)),
                Span::raw(msg.message.clone()),
            ]))
        })
        .collect();

    let widget = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");

    frame.render_stateful_widget(widget, area, &mut console.list_state);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_relative_time() {
        let now = Utc::now();
        assert_eq!(format_relative_time(&now), "just now");
        assert_eq!(
            format_relative_time(&(now - chrono::Duration::minutes(5))),
            "5m ago"
        );
        assert_eq!(
            format_relative_time(&(now - chrono::Duration::hours(3))),
            "3h ago"
        );
        assert_eq!(
            format_relative_time(&(now - chrono::Duration::days(2))),
            "2d ago"
        );
    }
}
