//! Editor pane rendering with syntax highlighting
//!
//! Shows the snippet being edited with line numbers, the cursor line
//! highlighted, and a terminal cursor placed when the pane has focus.
//!
//! Highlighting uses a character-by-character tokenizer rather than the
//! real lexer, so half-typed code still renders.

use crate::ui::editor::TextBuffer;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

const GUTTER_WIDTH: u16 = 5;

/// Highlight one line of script source
fn highlight_line(line: &str) -> Line<'static> {
    let mut spans = Vec::new();
    let mut current_word = String::new();
    let chars: Vec<char> = line.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        // Line comment runs to the end
        if c == '/' && chars.get(i + 1) == Some(&'/') {
            flush_word(&mut spans, &mut current_word, false);
            let rest: String = chars[i..].iter().collect();
            spans.push(Span::styled(rest, Style::default().fg(DEFAULT_THEME.comment)));
            break;
        }

        if matches!(c, '"' | '\'' | '`') {
            flush_word(&mut spans, &mut current_word, false);
            let mut end = i + 1;
            while end < chars.len() && chars[end] != c {
                end += if chars[end] == '\\' { 2 } else { 1 };
            }
            let end = (end + 1).min(chars.len());
            let literal: String = chars[i..end].iter().collect();
            spans.push(Span::styled(literal, Style::default().fg(DEFAULT_THEME.string)));
            i = end;
            continue;
        }

        if !c.is_alphanumeric() && c != '_' && c != '$' {
            flush_word(&mut spans, &mut current_word, c == '(');
            let style = match c {
                '{' | '}' | '(' | ')' | '[' | ']' => Style::default().fg(DEFAULT_THEME.primary),
                _ => Style::default().fg(DEFAULT_THEME.fg),
            };
            spans.push(Span::styled(c.to_string(), style));
            i += 1;
            continue;
        }

        current_word.push(c);
        i += 1;
    }

    flush_word(&mut spans, &mut current_word, false);
    Line::from(spans)
}

fn flush_word(spans: &mut Vec<Span<'static>>, word: &mut String, is_call: bool) {
    if word.is_empty() {
        return;
    }
    let style = word_style(word, is_call);
    spans.push(Span::styled(std::mem::take(word), style));
}

fn word_style(word: &str, is_call: bool) -> Style {
    match word {
        "let" | "const" | "var" | "function" | "return" | "if" | "else" | "while" | "for"
        | "do" | "of" | "in" | "break" | "continue" | "switch" | "case" | "default" | "throw"
        | "try" | "catch" | "finally" | "new" | "typeof" | "instanceof" | "this" => Style::default()
            .fg(DEFAULT_THEME.keyword)
            .add_modifier(Modifier::BOLD),
        "true" | "false" | "null" | "undefined" | "NaN" | "Infinity" => {
            Style::default().fg(DEFAULT_THEME.number)
        }
        _ if word.starts_with(|c: char| c.is_ascii_digit()) => {
            Style::default().fg(DEFAULT_THEME.number)
        }
        _ if is_call => Style::default().fg(DEFAULT_THEME.function),
        _ => Style::default().fg(DEFAULT_THEME.fg),
    }
}

/// Render the editor pane
pub fn render_editor_pane(
    frame: &mut Frame,
    area: Rect,
    buffer: &TextBuffer,
    title: &str,
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

    let block = Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(border_style);

    let cursor = buffer.cursor();
    let visible_height = area.height.saturating_sub(2).max(1) as usize;

    // Keep the cursor row on screen
    if cursor.row < *scroll_offset {
        *scroll_offset = cursor.row;
    } else if cursor.row >= *scroll_offset + visible_height {
        *scroll_offset = cursor.row + 1 - visible_height;
    }

    let visible_lines: Vec<Line> = (0..buffer.line_count())
        .skip(*scroll_offset)
        .take(visible_height)
        .map(|row| {
            let text = buffer.line(row).unwrap_or_default();
            let is_current = row == cursor.row;
            let num_style = if is_current {
                Style::default()
                    .fg(DEFAULT_THEME.secondary)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(DEFAULT_THEME.comment)
            };

            let mut content = highlight_line(&text);
            if is_current {
                for span in &mut content.spans {
                    span.style = span.style.bg(DEFAULT_THEME.current_line_bg);
                }
            }

            let mut spans = vec![Span::styled(format!("{:4} ", row + 1), num_style)];
            spans.extend(content.spans);
            Line::from(spans)
        })
        .collect();

    let paragraph = Paragraph::new(visible_lines).block(block);
    frame.render_widget(paragraph, area);

    if is_focused {
        let x = area.x + 1 + GUTTER_WIDTH + cursor.col as u16;
        let y = area.y + 1 + (cursor.row - *scroll_offset) as u16;
        if x < area.right().saturating_sub(1) && y < area.bottom().saturating_sub(1) {
            frame.set_cursor_position((x, y));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contents(line: &Line) -> Vec<String> {
        line.spans.iter().map(|s| s.content.to_string()).collect()
    }

    #[test]
    fn test_highlight_splits_tokens() {
        let line = highlight_line("let s = 'a b'; // note");
        assert_eq!(
            contents(&line),
            vec!["let", " ", "s", " ", "=", " ", "'a b'", ";", " ", "// note"]
        );
        assert_eq!(line.spans[0].style.fg, Some(DEFAULT_THEME.keyword));
        assert_eq!(line.spans[6].style.fg, Some(DEFAULT_THEME.string));
    }

    #[test]
    fn test_highlight_call_and_number() {
        let line = highlight_line("f(42)");
        assert_eq!(line.spans[0].style.fg, Some(DEFAULT_THEME.function));
        assert_eq!(line.spans[2].style.fg, Some(DEFAULT_THEME.number));
    }

    #[test]
    fn test_unterminated_string_runs_to_end() {
        let line = highlight_line("'abc");
        assert_eq!(contents(&line), vec!["'abc"]);
    }
}
