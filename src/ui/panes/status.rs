//! Status bar rendering with keybindings and run state

use std::time::Duration;

use crate::session::RunStatus;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Everything the status bar shows
pub struct StatusRenderData<'a> {
    pub title: &'a str,
    pub message: &'a str,
    pub status: RunStatus,
    pub run_count: u64,
    pub last_duration: Option<Duration>,
    pub is_modified: bool,
}

/// Human form of a run duration
pub fn format_duration(duration: Duration) -> String {
    let micros = duration.as_micros();
    if micros < 1_000 {
        format!("{}µs", micros)
    } else if micros < 1_000_000 {
        format!("{:.1}ms", micros as f64 / 1_000.0)
    } else {
        format!("{:.2}s", duration.as_secs_f64())
    }
}

/// Render the status bar at the bottom.
pub fn render_status_bar(frame: &mut Frame, area: Rect, data: &StatusRenderData) {
    let layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let badge_bg = match data.status {
        RunStatus::Idle => DEFAULT_THEME.primary,
        RunStatus::Succeeded => DEFAULT_THEME.success,
        RunStatus::Failed => DEFAULT_THEME.error,
    };

    let mut run_info = format!("run #{}", data.run_count);
    if let Some(duration) = data.last_duration {
        run_info.push_str(&format!(" in {}", format_duration(duration)));
    }
    let modified = if data.is_modified { " [+]" } else { "" };

    let bar_style = Style::default().bg(DEFAULT_THEME.current_line_bg);
    let left_spans = vec![
        Span::styled(
            format!(" {} ", data.status.label().to_uppercase()),
            Style::default()
                .bg(badge_bg)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" {}{} ", data.title, modified),
            bar_style.fg(DEFAULT_THEME.fg).add_modifier(Modifier::BOLD),
        ),
        Span::styled("|", bar_style.fg(DEFAULT_THEME.comment)),
        Span::styled(format!(" {} ", run_info), bar_style.fg(DEFAULT_THEME.comment)),
        Span::styled("|", bar_style.fg(DEFAULT_THEME.comment)),
        Span::styled(format!(" {} ", data.message), bar_style.fg(DEFAULT_THEME.fg)),
    ];

    let left_paragraph = Paragraph::new(Line::from(left_spans))
        .style(bar_style)
        .alignment(Alignment::Left);
    frame.render_widget(left_paragraph, layout[0]);

    // Keybinds with visual grouping
    let key_style = Style::default().bg(DEFAULT_THEME.comment).fg(Color::Black);
    let desc_style = bar_style.fg(DEFAULT_THEME.fg);
    let sep_style = bar_style.fg(DEFAULT_THEME.comment);

    let right_spans = vec![
        Span::styled(" ^R/F5 ", key_style),
        Span::styled(" run ", desc_style),
        Span::styled("│", sep_style),
        Span::styled(" ", desc_style),
        Span::styled(" ^E ", key_style),
        Span::styled(" reset ", desc_style),
        Span::styled("│", sep_style),
        Span::styled(" ", desc_style),
        Span::styled(" ⇥ ", key_style),
        Span::styled(" focus ", desc_style),
        Span::styled("│", sep_style),
        Span::styled(" ", desc_style),
        Span::styled(" ^Q ", key_style),
        Span::styled(" quit ", desc_style),
    ];

    let right_paragraph = Paragraph::new(Line::from(right_spans))
        .style(bar_style)
        .alignment(Alignment::Right);
    frame.render_widget(right_paragraph, layout[1]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration_units() {
        assert_eq!(format_duration(Duration::from_micros(250)), "250µs");
        assert_eq!(format_duration(Duration::from_micros(1_500)), "1.5ms");
        assert_eq!(format_duration(Duration::from_millis(2_500)), "2.50s");
    }
}
