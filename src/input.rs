//! Chat draft editing and submission

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputAction {
    None,
    Edited,
    Submit(String),
}

/// Multi-line draft with a cursor measured in characters
#[derive(Debug, Default)]
pub struct InputSurface {
    draft: String,
    cursor: usize,
}

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

impl InputSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Whether a submit would go through right now
    pub fn can_submit(&self, disabled: bool) -> bool {
        !disabled && !self.draft.trim().is_empty()
    }

    /// Take the trimmed draft, leaving the input empty. Returns `None` and
    /// keeps the draft when it is blank or input is disabled.
    pub fn submit(&mut self, disabled: bool) -> Option<String> {
        if !self.can_submit(disabled) {
            return None;
        }
        let message = self.draft.trim().to_string();
        self.clear();
        Some(message)
    }

    pub fn clear(&mut self) {
        self.draft.clear();
        self.cursor = 0;
    }

    pub fn insert_char(&mut self, c: char) {
        let byte_pos = char_to_byte_index(&self.draft, self.cursor);
        self.draft.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn insert_newline(&mut self) {
        self.insert_char('\n');
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_pos = char_to_byte_index(&self.draft, self.cursor);
            self.draft.remove(byte_pos);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.draft.chars().count() {
            let byte_pos = char_to_byte_index(&self.draft, self.cursor);
            self.draft.remove(byte_pos);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        let char_count = self.draft.chars().count();
        self.cursor = (self.cursor + 1).min(char_count);
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.draft.chars().count();
    }

    /// Cursor position as (line, column), both in characters
    pub fn cursor_line_col(&self) -> (usize, usize) {
        let mut line = 0;
        let mut col = 0;
        for c in self.draft.chars().take(self.cursor) {
            if c == '\n' {
                line += 1;
                col = 0;
            } else {
                col += 1;
            }
        }
        (line, col)
    }

    pub fn line_count(&self) -> usize {
        self.draft.split('\n').count()
    }

    /// Apply a key press. Enter submits, Shift+Enter or Alt+Enter adds a line
    /// break. Everything is ignored while disabled.
    pub fn handle_key(&mut self, key: KeyEvent, disabled: bool) -> InputAction {
        if disabled {
            return InputAction::None;
        }

        match key.code {
            KeyCode::Enter
                if key.modifiers.intersects(KeyModifiers::SHIFT | KeyModifiers::ALT) =>
            {
                self.insert_newline();
                InputAction::Edited
            }
            KeyCode::Enter => match self.submit(disabled) {
                Some(message) => InputAction::Submit(message),
                None => InputAction::None,
            },
            KeyCode::Backspace => {
                self.backspace();
                InputAction::Edited
            }
            KeyCode::Delete => {
                self.delete();
                InputAction::Edited
            }
            KeyCode::Left => {
                self.move_left();
                InputAction::Edited
            }
            KeyCode::Right => {
                self.move_right();
                InputAction::Edited
            }
            KeyCode::Home => {
                self.move_home();
                InputAction::Edited
            }
            KeyCode::End => {
                self.move_end();
                InputAction::Edited
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.insert_char(c);
                InputAction::Edited
            }
            _ => InputAction::None,
        }
    }
}
