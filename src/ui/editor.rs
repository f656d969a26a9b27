//! Multi-line text buffer behind the editor pane
//!
//! Lines are stored as `Vec<char>` so the cursor column is a character index
//! and never lands inside a multi-byte sequence.

/// Cursor position, both 0-based
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pub row: usize,
    pub col: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBuffer {
    lines: Vec<Vec<char>>,
    cursor: Cursor,
}

impl Default for TextBuffer {
    fn default() -> Self {
        TextBuffer::new("")
    }
}

impl TextBuffer {
    /// Buffer holding `text` with the cursor at the start
    pub fn new(text: &str) -> Self {
        let mut lines: Vec<Vec<char>> = text.split('\n').map(|l| l.chars().collect()).collect();
        if lines.is_empty() {
            lines.push(Vec::new());
        }
        TextBuffer {
            lines,
            cursor: Cursor::default(),
        }
    }

    /// Full contents, lines joined with `\n`
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(|line| line.iter().collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Replace everything and move the cursor to the start
    pub fn set_text(&mut self, text: &str) {
        *self = TextBuffer::new(text);
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn line(&self, row: usize) -> Option<String> {
        self.lines.get(row).map(|line| line.iter().collect())
    }

    fn current_line(&self) -> &Vec<char> {
        &self.lines[self.cursor.row]
    }

    pub fn insert_char(&mut self, c: char) {
        if c == '\n' {
            self.insert_newline();
            return;
        }
        let Cursor { row, col } = self.cursor;
        self.lines[row].insert(col, c);
        self.cursor.col += 1;
    }

    pub fn insert_str(&mut self, text: &str) {
        for c in text.chars() {
            match c {
                '\r' => {}
                '\n' => self.split_line(),
                c => self.insert_char(c),
            }
        }
    }

    /// Split the line at the cursor, carrying the current indentation over
    pub fn insert_newline(&mut self) {
        let indent: Vec<char> = self
            .current_line()
            .iter()
            .take_while(|c| **c == ' ' || **c == '\t')
            .copied()
            .collect();
        self.split_line();

        let row = self.cursor.row;
        let width = indent.len();
        self.lines[row].splice(0..0, indent);
        self.cursor.col = width;
    }

    fn split_line(&mut self) {
        let Cursor { row, col } = self.cursor;
        let rest = self.lines[row].split_off(col);
        self.lines.insert(row + 1, rest);
        self.cursor = Cursor { row: row + 1, col: 0 };
    }

    /// Delete the character before the cursor, joining lines at column 0
    pub fn backspace(&mut self) {
        let Cursor { row, col } = self.cursor;
        if col > 0 {
            self.lines[row].remove(col - 1);
            self.cursor.col -= 1;
        } else if row > 0 {
            let line = self.lines.remove(row);
            let prev = &mut self.lines[row - 1];
            let join_at = prev.len();
            prev.extend(line);
            self.cursor = Cursor { row: row - 1, col: join_at };
        }
    }

    /// Delete the character under the cursor, joining lines at the end
    pub fn delete(&mut self) {
        let Cursor { row, col } = self.cursor;
        if col < self.lines[row].len() {
            self.lines[row].remove(col);
        } else if row + 1 < self.lines.len() {
            let next = self.lines.remove(row + 1);
            self.lines[row].extend(next);
        }
    }

    pub fn move_left(&mut self) {
        if self.cursor.col > 0 {
            self.cursor.col -= 1;
        } else if self.cursor.row > 0 {
            self.cursor.row -= 1;
            self.cursor.col = self.current_line().len();
        }
    }

    pub fn move_right(&mut self) {
        if self.cursor.col < self.current_line().len() {
            self.cursor.col += 1;
        } else if self.cursor.row + 1 < self.lines.len() {
            self.cursor.row += 1;
            self.cursor.col = 0;
        }
    }

    pub fn move_up(&mut self) {
        if self.cursor.row > 0 {
            self.cursor.row -= 1;
            self.clamp_col();
        }
    }

    pub fn move_down(&mut self) {
        if self.cursor.row + 1 < self.lines.len() {
            self.cursor.row += 1;
            self.clamp_col();
        }
    }

    pub fn move_home(&mut self) {
        self.cursor.col = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor.col = self.current_line().len();
    }

    fn clamp_col(&mut self) {
        self.cursor.col = self.cursor.col.min(self.current_line().len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(row: usize, col: usize) -> Cursor {
        Cursor { row, col }
    }

    #[test]
    fn test_insert_and_text() {
        let mut buf = TextBuffer::new("");
        for c in "let a".chars() {
            buf.insert_char(c);
        }
        assert_eq!(buf.text(), "let a");
        assert_eq!(buf.cursor(), at(0, 5));
    }

    #[test]
    fn test_newline_carries_indentation() {
        let mut buf = TextBuffer::new("if (x) {\n    a();");
        buf.move_down();
        buf.move_end();
        buf.insert_newline();
        buf.insert_str("b();");

        assert_eq!(buf.text(), "if (x) {\n    a();\n    b();");
        assert_eq!(buf.cursor(), at(2, 8));
    }

    #[test]
    fn test_newline_splits_line() {
        let mut buf = TextBuffer::new("ab");
        buf.move_right();
        buf.insert_newline();
        assert_eq!(buf.text(), "a\nb");
        assert_eq!(buf.cursor(), at(1, 0));
    }

    #[test]
    fn test_backspace_joins_lines() {
        let mut buf = TextBuffer::new("ab\ncd");
        buf.move_down();
        buf.backspace();
        assert_eq!(buf.text(), "abcd");
        assert_eq!(buf.cursor(), at(0, 2));

        buf.backspace();
        assert_eq!(buf.text(), "acd");
    }

    #[test]
    fn test_backspace_at_start_is_noop() {
        let mut buf = TextBuffer::new("x");
        buf.backspace();
        assert_eq!(buf.text(), "x");
    }

    #[test]
    fn test_delete_joins_next_line() {
        let mut buf = TextBuffer::new("ab\ncd");
        buf.move_end();
        buf.delete();
        assert_eq!(buf.text(), "abcd");

        buf.move_home();
        buf.delete();
        assert_eq!(buf.text(), "bcd");
    }

    #[test]
    fn test_arrows_wrap_and_clamp() {
        let mut buf = TextBuffer::new("long line\nab");
        buf.move_end();
        buf.move_down();
        assert_eq!(buf.cursor(), at(1, 2));

        buf.move_right();
        assert_eq!(buf.cursor(), at(1, 2));

        buf.move_home();
        buf.move_left();
        assert_eq!(buf.cursor(), at(0, 9));

        buf.move_right();
        assert_eq!(buf.cursor(), at(1, 0));
    }

    #[test]
    fn test_multibyte_chars() {
        let mut buf = TextBuffer::new("'é'");
        buf.move_end();
        buf.move_left();
        buf.backspace();
        assert_eq!(buf.text(), "''");
    }
}
