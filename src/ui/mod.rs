// UI module for rendering the TUI.
// Contains widgets for tabs, lists, the path tree, and dialogs.

mod list;
mod modal;
mod tabs;
mod tree;

use ratatui::{prelude::*, widgets::*};

use crate::app::{App, Tab};
use crate::state::LoadingState;

pub use modal::dialog_area;

/// Main draw function that renders the entire UI.
pub fn draw(frame: &mut Frame, app: &mut App) {
    app.last_area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tab bar
            Constraint::Min(1),    // Main content
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    tabs::draw_tabs(frame, app, chunks[0]);
    draw_content(frame, app, chunks[1]);
    draw_status_bar(frame, app, chunks[2]);

    // Dialogs stack bottom to top
    for open in app.dialogs.iter() {
        modal::draw_dialog(frame, open);
    }

    if app.show_help {
        draw_help_overlay(frame);
    }

    if let Some(alert) = &app.api_docs.alert {
        modal::draw_alert(frame, alert);
    }
}

/// Draw the main content area based on active tab.
fn draw_content(frame: &mut Frame, app: &mut App, area: Rect) {
    match app.active_tab {
        Tab::Home => draw_home_tab(frame, app, area),
        Tab::ApiDocs => draw_api_docs_tab(frame, app, area),
        Tab::Console => list::render_console(frame, &mut app.console, area),
    }
}

fn draw_home_tab(frame: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    list::render_entities_list(frame, &mut app.entities, chunks[0]);
    list::render_history_list(frame, &app.history, chunks[1]);
}

fn draw_api_docs_tab(frame: &mut Frame, app: &App, area: Rect) {
    let view = &app.api_docs;
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", view.url));

    let docs = match &view.docs {
        LoadingState::Idle => {
            let inner = block.inner(area);
            frame.render_widget(block, area);
            list::render_empty(frame, inner, "Press r to load the API documentation");
            return;
        }
        LoadingState::Loading => {
            let inner = block.inner(area);
            frame.render_widget(block, area);
            list::render_loading(frame, inner, "⏳ Loading API docs...");
            return;
        }
        LoadingState::Error(e) => {
            let inner = block.inner(area);
            frame.render_widget(block, area);
            list::render_error(frame, inner, &format!("❌ {}", e));
            return;
        }
        LoadingState::Loaded(docs) => docs,
    };

    let mut lines = vec![Line::from(vec![
        Span::styled(
            docs.info.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  {}", docs.info.version),
            Style::default().fg(Color::DarkGray),
        ),
    ])];

    if view.infos {
        if let Some(description) = &docs.info.description {
            lines.push(Line::from(Span::styled(
                description.clone(),
                Style::default().fg(Color::Gray),
            )));
        }
        if let Some(base_path) = &docs.base_path {
            lines.push(Line::from(vec![
                Span::styled("Base path: ", Style::default().fg(Color::DarkGray)),
                Span::raw(base_path.clone()),
            ]));
        }
    }
    lines.push(Line::from(""));

    for op in &view.operations {
        let color = match op.method.as_str() {
            "GET" => Color::Green,
            "POST" => Color::Yellow,
            "PUT" => Color::Blue,
            "DELETE" => Color::Red,
            _ => Color::White,
        };
        let mut spans = vec![
            Span::styled(format!("{:<7}", op.method), Style::default().fg(color)),
            Span::raw(op.path.clone()),
        ];
        if let Some(summary) = &op.summary {
            spans.push(Span::styled(
                format!("  {}", summary),
                Style::default().fg(Color::DarkGray),
            ));
        }
        lines.push(Line::from(spans));
    }

    let text = Paragraph::new(lines)
        .block(block)
        .scroll((view.scroll, 0));
    frame.render_widget(text, area);
}

/// Draw the status bar with keybinding hints and the service URL.
fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let hint = |key: &'static str, label: &'static str| {
        [
            Span::raw(key),
            Span::styled(label, Style::default().fg(Color::DarkGray)),
        ]
    };

    let mut hints: Vec<Span> = if !app.dialogs.is_empty() {
        [hint(" Enter ", "Confirm"), hint("  Esc ", "Cancel")]
            .into_iter()
            .flatten()
            .collect()
    } else {
        match app.active_tab {
            Tab::Home => [
                hint(" l ", "Load data"),
                hint("  e ", "New entity"),
                hint("  i/h ", "New flow"),
                hint("  Tab ", "Switch"),
                hint("  ? ", "Help"),
                hint("  q ", "Quit"),
            ]
            .into_iter()
            .flatten()
            .collect(),
            Tab::ApiDocs => [
                hint(" ↑↓ ", "Scroll"),
                hint("  i ", "Info"),
                hint("  r ", "Reload"),
                hint("  Tab ", "Switch"),
                hint("  q ", "Quit"),
            ]
            .into_iter()
            .flatten()
            .collect(),
            Tab::Console => [
                hint(" ↑↓ ", "Navigate"),
                hint("  Tab ", "Switch"),
                hint("  q ", "Quit"),
            ]
            .into_iter()
            .flatten()
            .collect(),
        }
    };

    hints.push(Span::styled(
        format!("  {}", app.base_url),
        Style::default().fg(Color::DarkGray),
    ));

    let status = Paragraph::new(Line::from(hints));
    frame.render_widget(status, area);
}

/// Draw the help overlay.
fn draw_help_overlay(frame: &mut Frame) {
    let area = frame.area();

    // Create a centered popup
    let popup_width = 55.min(area.width);
    let popup_height = 21.min(area.height);
    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;

    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let key_line = |key: &'static str, action: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {:<14}", key), Style::default().fg(Color::Cyan)),
            Span::raw(action),
        ])
    };

    let help_text = vec![
        Line::from(vec![Span::styled(
            "Keyboard Shortcuts",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        key_line("l", "Load data"),
        key_line("e", "New entity"),
        key_line("i / h", "New input / harmonize flow"),
        key_line("↑/↓ or j/k", "Navigate list / tree"),
        key_line("→ / ←", "Expand / collapse folder"),
        key_line("Space", "Pick folder"),
        key_line("Tab", "Next field / switch tabs"),
        key_line("Enter", "Confirm dialog"),
        key_line("Esc", "Cancel dialog / close help"),
        key_line("r", "Reload API docs"),
        key_line("?", "Show/hide this help"),
        key_line("q", "Quit"),
        Line::from(""),
        Line::from(vec![
            Span::styled("Press ", Style::default().fg(Color::DarkGray)),
            Span::styled("Esc", Style::default().fg(Color::Yellow)),
            Span::styled(" or ", Style::default().fg(Color::DarkGray)),
            Span::styled("?", Style::default().fg(Color::Yellow)),
            Span::styled(" to close", Style::default().fg(Color::DarkGray)),
        ]),
    ];

    let help_paragraph = Paragraph::new(help_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Help ")
                .title_style(
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ),
        )
        .alignment(Alignment::Left);

    frame.render_widget(help_paragraph, popup_area);
}
