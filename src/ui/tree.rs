// Lazy path tree rendering.

use ratatui::{prelude::*, widgets::*};

use crate::state::{LoadingState, NodeState, SelectableLazyTree};

use super::list;

/// Draw the tree into `area`, highlighting the cursor row when `focused`.
pub fn draw_tree(frame: &mut Frame, tree: &SelectableLazyTree, area: Rect, focused: bool) {
    let border = if focused { Color::Cyan } else { Color::DarkGray };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(" Input path ");

    match tree.roots_state() {
        LoadingState::Idle | LoadingState::Loading => {
            let inner = block.inner(area);
            frame.render_widget(block, area);
            list::render_loading(frame, inner, "⏳ Loading folders...");
            return;
        }
        LoadingState::Error(e) => {
            let inner = block.inner(area);
            frame.render_widget(block, area);
            list::render_error(frame, inner, &format!("❌ {}", e));
            return;
        }
        LoadingState::Loaded(roots) if roots.is_empty() => {
            let inner = block.inner(area);
            frame.render_widget(block, area);
            list::render_empty(frame, inner, "No folders");
            return;
        }
        LoadingState::Loaded(_) => {}
    }

    let selected = tree.selected();
    let items: Vec<ListItem> = tree
        .visible_rows()
        .into_iter()
        .filter_map(|row| tree.node(row.id).map(|node| (row, node)))
        .map(|(row, node)| {
            let marker = match (tree.is_leaf(node.id), node.expanded) {
                (true, _) => " ",
                (false, true) => "▾",
                (false, false) => "▸",
            };
            let mut spans = vec![
                Span::raw("  ".repeat(row.depth)),
                Span::styled(format!("{} ", marker), Style::default().fg(Color::DarkGray)),
            ];

            let label_style = if selected == Some(node.id) {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            spans.push(Span::styled(node.label().to_string(), label_style));

            match &node.state {
                NodeState::Loading => {
                    spans.push(Span::styled(" ⏳", Style::default().fg(Color::Yellow)));
                }
                NodeState::Failed(e) => {
                    spans.push(Span::styled(
                        format!(" ❌ {}", e),
                        Style::default().fg(Color::Red),
                    ));
                }
                NodeState::Loaded(children) if children.is_empty() && node.expanded => {
                    spans.push(Span::styled(" (empty)", Style::default().fg(Color::DarkGray)));
                }
                _ => {}
            }

            ListItem::new(Line::from(spans))
        })
        .collect();

    let mut state = ListState::default();
    if focused {
        state.select(Some(tree.cursor()));
    }

    let widget = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol("> ");

    frame.render_stateful_widget(widget, area, &mut state);
}
