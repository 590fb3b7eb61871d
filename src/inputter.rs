use ratatui::crossterm::event::{self, KeyCode, KeyModifiers};
use tracing::trace;

/// Single line text editor backing the search field.
#[derive(Default)]
pub struct Inputter {
    current_input: String,
    curser_pos: usize, // In chars, not bytes
}

#[derive(Default, Clone, Debug, PartialEq)]
pub struct InputResult {
    pub input: String,
    pub curser_pos: usize,
    pub changed: bool,
}

impl Inputter {
    pub fn read(&mut self, key: event::KeyEvent) -> InputResult {
        let before = self.current_input.clone();
        match (key.code, key.modifiers) {
            (KeyCode::Backspace, _) => self.backspace(),
            (KeyCode::Delete, _) => self.delete(),
            (KeyCode::Left, _) => self.left(),
            (KeyCode::Right, _) => self.right(),
            (KeyCode::Home, _) => self.curser_pos = 0,
            (KeyCode::End, _) => self.curser_pos = self.char_count(),
            (kc, km) => self.key(kc, km),
        }
        let changed = before != self.current_input;
        if changed {
            trace!("Search input is now {:?}", self.current_input);
        }
        InputResult {
            changed,
            ..self.get()
        }
    }

    pub fn get(&self) -> InputResult {
        InputResult {
            input: self.current_input.clone(),
            curser_pos: self.curser_pos,
            changed: false,
        }
    }

    pub fn value(&self) -> &str {
        &self.current_input
    }

    pub fn set(&mut self, s: &str) {
        self.current_input = s.to_string();
        self.curser_pos = self.char_count();
    }

    pub fn clear(&mut self) {
        self.current_input.clear();
        self.curser_pos = 0;
    }

    fn backspace(&mut self) {
        if self.curser_pos > 0 {
            self.curser_pos -= 1;
            let idx = self.getbytepos();
            self.current_input.remove(idx);
        }
    }

    fn delete(&mut self) {
        if self.curser_pos < self.char_count() {
            let idx = self.getbytepos();
            self.current_input.remove(idx);
        }
    }

    fn left(&mut self) {
        self.curser_pos = self.curser_pos.saturating_sub(1);
    }

    fn right(&mut self) {
        if self.curser_pos < self.char_count() {
            self.curser_pos += 1;
        }
    }

    fn key(&mut self, code: KeyCode, modifier: KeyModifiers) {
        if modifier.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
            return;
        }
        if let Some(chr) = code.as_char() {
            let idx = self.getbytepos();
            self.current_input.insert(idx, chr);
            self.curser_pos += 1;
        }
    }

    fn char_count(&self) -> usize {
        self.current_input.chars().count()
    }

    fn getbytepos(&self) -> usize {
        self.current_input
            .char_indices()
            .nth(self.curser_pos)
            .map(|(byte_idx, _)| byte_idx)
            .unwrap_or(self.current_input.len())
    }
}
