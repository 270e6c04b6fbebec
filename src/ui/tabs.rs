// Tab bar.
// Console carries an unread badge; API Docs shows a marker while its fetch runs.

use ratatui::{prelude::*, widgets::*};

use crate::app::{App, Tab};

const TABS: [Tab; 3] = [Tab::Home, Tab::ApiDocs, Tab::Console];

fn tab_label(app: &App, tab: Tab) -> Line<'static> {
    let unread = app.console.unread;
    let (text, style) = match tab {
        Tab::Console if unread > 0 => (
            format!("{} ({})", tab.title(), unread),
            Style::default().fg(Color::Red),
        ),
        Tab::ApiDocs if app.api_docs.loading => (
            format!("{} ⏳", tab.title()),
            Style::default().fg(Color::White),
        ),
        _ => (tab.title().to_string(), Style::default().fg(Color::White)),
    };

    let style = if tab == app.active_tab {
        style.fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        style
    };
    Line::from(Span::styled(text, style))
}

/// Draw the tab bar at the top of the screen.
pub fn draw_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = TABS.iter().map(|tab| tab_label(app, *tab)).collect();
    let selected = TABS.iter().position(|t| *t == app.active_tab).unwrap_or(0);

    let mut block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" quickstart ")
        .title_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );
    if !app.dialogs.is_empty() {
        block = block.title(
            Line::from(Span::styled(
                format!(" {} open ", app.dialogs.len()),
                Style::default().fg(Color::Yellow),
            ))
            .right_aligned(),
        );
    }

    let widget = Tabs::new(titles)
        .block(block)
        .select(selected)
        .highlight_style(Style::default().fg(Color::Yellow))
        .divider(Span::raw(" │ "));

    frame.render_widget(widget, area);
}
