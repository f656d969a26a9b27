//! Output pane rendering

use crate::session::Display;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    widgets::{Block, Borders, List, ListItem, Padding, Paragraph},
    Frame,
};

/// Render what the last run produced
pub fn render_output_pane(
    frame: &mut Frame,
    area: Rect,
    display: &Display,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let border_style = if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    };

    let title = if display.is_error() { " Error " } else { " Output " };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style);

    let text_style = match display {
        Display::Error(_) => Style::default()
            .fg(DEFAULT_THEME.error)
            .add_modifier(Modifier::BOLD),
        Display::NoOutput => Style::default()
            .fg(DEFAULT_THEME.comment)
            .add_modifier(Modifier::ITALIC),
        Display::Result(_) => Style::default().fg(DEFAULT_THEME.secondary),
        Display::Empty | Display::Output(_) => Style::default().fg(DEFAULT_THEME.fg),
    };

    if *display == Display::Empty {
        let paragraph = Paragraph::new("(press Ctrl-R to run)")
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.comment));
        frame.render_widget(paragraph, area);
        return;
    }

    let block = block.padding(Padding::new(1, 0, 0, 0));
    let lines: Vec<&str> = display.text().split('\n').collect();

    let total_items = lines.len();
    let visible_height = area.height.saturating_sub(2).max(1) as usize;

    if total_items > visible_height {
        let max_scroll = total_items - visible_height;
        *scroll_offset = (*scroll_offset).min(max_scroll);
    } else {
        *scroll_offset = 0;
    }

    let visible_items: Vec<ListItem> = lines
        .into_iter()
        .skip(*scroll_offset)
        .take(visible_height)
        .map(|line| ListItem::new(line).style(text_style))
        .collect();

    frame.render_widget(List::new(visible_items).block(block), area);
}
