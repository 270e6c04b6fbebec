// Modal UI components.
// Load-data and form dialogs drawn over the current view, plus the blocking alert.

use ratatui::{prelude::*, widgets::*};

use crate::app::OpenDialog;
use crate::state::dialog::DialogSize;
use crate::state::{ActiveDialog, FieldKind, FormController, LoadDataController, LoadDataFocus};

use super::tree;

/// Centered rectangle for a dialog of the given size, clamped to `area`.
pub fn dialog_area(area: Rect, size: DialogSize) -> Rect {
    let (width, height) = size.dimensions();
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

/// Draw one dialog from the stack.
pub fn draw_dialog(frame: &mut Frame, open: &OpenDialog) {
    let modal_area = dialog_area(frame.area(), open.config.size);

    // Clear the area behind the modal
    frame.render_widget(Clear, modal_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(open.config.title)
        .title_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );
    let inner = block.inner(modal_area);
    frame.render_widget(block, modal_area);

    match &open.dialog {
        ActiveDialog::LoadData(ctl) => draw_load_data(frame, ctl, inner),
        ActiveDialog::Form(ctl) => draw_form(frame, ctl, inner),
    }
}

fn draw_load_data(frame: &mut Frame, ctl: &LoadDataController, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Tree
            Constraint::Length(1), // Selected path
            Constraint::Length(1), // Data format
            Constraint::Length(1), // Collection
            Constraint::Length(1), // Instructions
        ])
        .split(area);

    tree::draw_tree(frame, ctl.tree(), chunks[0], ctl.focus == LoadDataFocus::Tree);

    let path_line = Line::from(vec![
        Span::styled(" Path:        ", Style::default().fg(Color::DarkGray)),
        Span::raw(ctl.input_path()),
    ]);
    frame.render_widget(Paragraph::new(path_line), chunks[1]);

    let format_focused = ctl.focus == LoadDataFocus::DataFormat;
    let format_line = Line::from(vec![
        Span::styled(" Data format: ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            format!("‹ {} ›", ctl.data_format()),
            focus_style(format_focused),
        ),
    ]);
    frame.render_widget(Paragraph::new(format_line), chunks[2]);

    let collection_focused = ctl.focus == LoadDataFocus::Collection;
    let mut collection_spans = vec![
        Span::styled(" Collection:  ", Style::default().fg(Color::DarkGray)),
        Span::styled(ctl.collection().unwrap_or(""), focus_style(collection_focused)),
    ];
    if collection_focused {
        collection_spans.push(Span::styled("█", Style::default().fg(Color::Yellow)));
    }
    frame.render_widget(Paragraph::new(Line::from(collection_spans)), chunks[3]);

    let instructions = Line::from(vec![
        Span::styled("→←", Style::default().fg(Color::Yellow)),
        Span::styled(" Open/close  ", Style::default().fg(Color::DarkGray)),
        Span::styled("Space", Style::default().fg(Color::Yellow)),
        Span::styled(" Pick  ", Style::default().fg(Color::DarkGray)),
        Span::styled("Tab", Style::default().fg(Color::Yellow)),
        Span::styled(" Field  ", Style::default().fg(Color::DarkGray)),
        Span::styled("Enter", Style::default().fg(Color::Yellow)),
        Span::styled(" Load  ", Style::default().fg(Color::DarkGray)),
        Span::styled("Esc", Style::default().fg(Color::Yellow)),
        Span::styled(" Cancel", Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(
        Paragraph::new(instructions).alignment(Alignment::Center),
        chunks[4],
    );
}

fn draw_form(frame: &mut Frame, ctl: &FormController, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),    // Fields
            Constraint::Length(2), // Status
            Constraint::Length(1), // Instructions
        ])
        .split(area);

    let lines: Vec<Line> = ctl
        .fields()
        .iter()
        .enumerate()
        .map(|(i, spec)| {
            let focused = i == ctl.focus();
            let value = ctl.draft().get(spec.name).unwrap_or("");
            let mut spans = vec![
                Span::styled(
                    format!(" {:<14}", spec.label),
                    Style::default().fg(Color::DarkGray),
                ),
            ];
            match spec.kind {
                FieldKind::Fixed => {
                    spans.push(Span::styled(
                        value.to_string(),
                        Style::default().fg(Color::Gray),
                    ));
                }
                FieldKind::Choice(_) => {
                    spans.push(Span::styled(format!("‹ {} ›", value), focus_style(focused)));
                }
                FieldKind::Text => {
                    spans.push(Span::styled(value.to_string(), focus_style(focused)));
                    if focused {
                        spans.push(Span::styled("█", Style::default().fg(Color::Yellow)));
                    }
                }
            }
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), chunks[0]);

    let status = ctl.status();
    let status_line = if status.loading {
        Line::from(Span::styled(
            format!(" ⏳ Saving {}...", ctl.target().noun()),
            Style::default().fg(Color::Yellow),
        ))
    } else if status.has_error {
        Line::from(Span::styled(
            format!(" ❌ {}", status.error_message.as_deref().unwrap_or("Save failed")),
            Style::default().fg(Color::Red),
        ))
    } else {
        Line::from("")
    };
    frame.render_widget(
        Paragraph::new(status_line).wrap(Wrap { trim: true }),
        chunks[1],
    );

    let instructions = Line::from(vec![
        Span::styled("Tab", Style::default().fg(Color::Yellow)),
        Span::styled(" Field  ", Style::default().fg(Color::DarkGray)),
        Span::styled("←→", Style::default().fg(Color::Yellow)),
        Span::styled(" Choose  ", Style::default().fg(Color::DarkGray)),
        Span::styled("Enter", Style::default().fg(Color::Yellow)),
        Span::styled(" Save  ", Style::default().fg(Color::DarkGray)),
        Span::styled("Esc", Style::default().fg(Color::Yellow)),
        Span::styled(" Cancel", Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(
        Paragraph::new(instructions).alignment(Alignment::Center),
        chunks[2],
    );
}

/// Draw a blocking alert box in the middle of the screen.
pub fn draw_alert(frame: &mut Frame, message: &str) {
    let area = dialog_area(frame.area(), DialogSize::Small);
    let alert_area = Rect::new(area.x, area.y + area.height / 3, area.width, 7)
        .intersection(frame.area());
    if alert_area.is_empty() {
        return;
    }

    frame.render_widget(Clear, alert_area);

    let text = vec![
        Line::from(Span::styled(message, Style::default().fg(Color::Red))),
        Line::from(""),
        Line::from(vec![
            Span::styled("Press ", Style::default().fg(Color::DarkGray)),
            Span::styled("Enter", Style::default().fg(Color::Yellow)),
            Span::styled(" to dismiss", Style::default().fg(Color::DarkGray)),
        ]),
    ];

    let widget = Paragraph::new(text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red))
                .title(" Alert "),
        )
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    frame.render_widget(widget, alert_area);
}

fn focus_style(focused: bool) -> Style {
    if focused {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    }
}
