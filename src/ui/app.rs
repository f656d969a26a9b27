//! Main TUI application state and logic

use crate::session::{Display, SnippetSession};
use crate::ui::editor::TextBuffer;
use crate::ui::panes::{self, StatusRenderData};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use std::io;
use std::time::Duration;

/// Which pane is currently focused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusedPane {
    Editor,
    Output,
}

impl FocusedPane {
    pub fn next(self) -> Self {
        match self {
            FocusedPane::Editor => FocusedPane::Output,
            FocusedPane::Output => FocusedPane::Editor,
        }
    }
}

/// The main application state
pub struct App {
    pub session: SnippetSession,

    /// Editable copy of the session source
    pub buffer: TextBuffer,

    pub focused_pane: FocusedPane,

    /// Per-pane scroll offsets
    pub editor_scroll: usize,
    pub output_scroll: usize,

    /// What the output pane shows
    pub display: Display,

    pub should_quit: bool,

    /// Status message to display
    pub status_message: String,
}

impl App {
    pub fn new(session: SnippetSession) -> Self {
        let buffer = TextBuffer::new(session.source());
        App {
            session,
            buffer,
            focused_pane: FocusedPane::Editor,
            editor_scroll: 0,
            output_scroll: 0,
            display: Display::Empty,
            should_quit: false,
            status_message: String::from("Ready!"),
        }
    }

    /// Run the TUI application
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            if event::poll(Duration::from_millis(100))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key);
                    }
                }
            }
        }

        Ok(())
    }

    /// Render the UI
    fn render(&mut self, frame: &mut Frame) {
        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(frame.area());

        // Editor (top) | Output (bottom)
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
            .split(main_chunks[0]);

        let title = self.session.title().unwrap_or("snippet").to_string();

        panes::render_editor_pane(
            frame,
            rows[0],
            &self.buffer,
            &title,
            self.focused_pane == FocusedPane::Editor,
            &mut self.editor_scroll,
        );

        panes::render_output_pane(
            frame,
            rows[1],
            &self.display,
            self.focused_pane == FocusedPane::Output,
            &mut self.output_scroll,
        );

        let status = StatusRenderData {
            title: &title,
            message: &self.status_message,
            status: self.session.last_status(),
            run_count: self.session.run_count(),
            last_duration: self.session.last_duration(),
            is_modified: self.session.source() != self.session.initial_source(),
        };
        panes::render_status_bar(frame, main_chunks[1], &status);
    }

    /// Handle keyboard events
    pub fn handle_key_event(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('q') if ctrl => self.should_quit = true,
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('r') if ctrl => self.run_snippet(),
            KeyCode::F(5) => self.run_snippet(),
            KeyCode::Char('e') if ctrl => self.reset(),
            KeyCode::Tab => {
                self.focused_pane = self.focused_pane.next();
            }
            _ => match self.focused_pane {
                FocusedPane::Editor => self.handle_editor_key(key),
                FocusedPane::Output => self.handle_output_key(key),
            },
        }
    }

    fn handle_editor_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let edited = match key.code {
            KeyCode::Char(c) if !ctrl => {
                self.buffer.insert_char(c);
                true
            }
            KeyCode::Enter => {
                self.buffer.insert_newline();
                true
            }
            KeyCode::Backspace => {
                self.buffer.backspace();
                true
            }
            KeyCode::Delete => {
                self.buffer.delete();
                true
            }
            KeyCode::Left => {
                self.buffer.move_left();
                false
            }
            KeyCode::Right => {
                self.buffer.move_right();
                false
            }
            KeyCode::Up => {
                self.buffer.move_up();
                false
            }
            KeyCode::Down => {
                self.buffer.move_down();
                false
            }
            KeyCode::Home => {
                self.buffer.move_home();
                false
            }
            KeyCode::End => {
                self.buffer.move_end();
                false
            }
            _ => false,
        };

        if edited {
            self.session.set_source(self.buffer.text());
        }
    }

    fn handle_output_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up => self.output_scroll = self.output_scroll.saturating_sub(1),
            KeyCode::Down => self.output_scroll = self.output_scroll.saturating_add(1),
            KeyCode::Home => self.output_scroll = 0,
            KeyCode::End => self.output_scroll = usize::MAX,
            _ => {}
        }
    }

    fn run_snippet(&mut self) {
        match self.session.run() {
            Ok(display) => {
                self.status_message = "Run complete".to_string();
                self.display = display;
            }
            Err(failure) => {
                self.status_message = "Run failed".to_string();
                self.display = Display::Error(failure.message);
            }
        }
        self.output_scroll = 0;
    }

    fn reset(&mut self) {
        self.session.reset();
        self.buffer.set_text(self.session.source());
        self.display = self.session.display();
        self.editor_scroll = 0;
        self.output_scroll = 0;
        self.status_message = "Reset to initial snippet".to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::{CaptureBuffer, Console};

    fn app(source: &str) -> App {
        App::new(SnippetSession::new(source, Console::new(CaptureBuffer::new())))
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key_event(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn ctrl(app: &mut App, c: char) {
        app.handle_key_event(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL));
    }

    #[test]
    fn test_typing_updates_source_without_running() {
        let mut app = app("");
        for c in "1+2".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        assert_eq!(app.session.source(), "1+2");
        assert_eq!(app.session.run_count(), 0);
        assert_eq!(app.display, Display::Empty);
    }

    #[test]
    fn test_run_and_reset_keys() {
        let mut app = app("console.log('hi')");
        ctrl(&mut app, 'r');
        assert_eq!(app.display, Display::Output("hi".to_string()));

        press(&mut app, KeyCode::End);
        press(&mut app, KeyCode::Char(';'));
        press(&mut app, KeyCode::F(5));
        assert_eq!(app.session.run_count(), 2);

        ctrl(&mut app, 'e');
        assert_eq!(app.buffer.text(), "console.log('hi')");
        assert_eq!(app.display, Display::Empty);
    }

    #[test]
    fn test_failed_run_shows_error() {
        let mut app = app("throw new Error('boom')");
        press(&mut app, KeyCode::F(5));
        assert_eq!(app.display, Display::Error("boom".to_string()));
        assert_eq!(app.status_message, "Run failed");
    }

    #[test]
    fn test_focus_and_quit() {
        let mut app = app("");
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.focused_pane, FocusedPane::Output);

        // Typing in the output pane does not edit
        press(&mut app, KeyCode::Char('x'));
        assert_eq!(app.session.source(), "");

        ctrl(&mut app, 'q');
        assert!(app.should_quit);
    }
}
