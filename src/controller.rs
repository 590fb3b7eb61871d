use std::time::Duration;
use tracing::trace;

use crate::domain::{Message, TableConfig, TableError};
use crate::model::Model;
use ratatui::crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};

pub struct Controller {
    event_poll_time: u64,
}

impl Controller {
    pub fn new(cfg: &TableConfig) -> Self {
        Self {
            event_poll_time: cfg.event_poll_time,
        }
    }

    pub fn handle_event(&self, model: &Model) -> Result<Option<Message>, TableError> {
        if event::poll(Duration::from_millis(self.event_poll_time))? {
            return Ok(match event::read()? {
                // crossterm also emits key release and repeat events on Windows.
                Event::Key(key) if key.kind == event::KeyEventKind::Press => {
                    Controller::map_key(key, model.raw_keyevents())
                }
                Event::Resize(width, height) => {
                    Some(Message::Resize(width as usize, height as usize))
                }
                _ => None,
            });
        }
        Ok(None)
    }

    /// Map a key press to a message. With `raw` set the search field has
    /// focus and plain characters are text, not commands.
    pub fn map_key(key: KeyEvent, raw: bool) -> Option<Message> {
        let message = match (key.code, key.modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => Some(Message::Quit),
            (KeyCode::Char('r'), KeyModifiers::CONTROL) => Some(Message::Reset),
            (KeyCode::Char('y'), KeyModifiers::CONTROL) => Some(Message::CopyRow),
            (KeyCode::Char('e'), KeyModifiers::CONTROL) => Some(Message::ExportHtml),
            (KeyCode::F(1), _) => Some(Message::Help),
            (KeyCode::Esc, _) => Some(Message::Exit),
            (KeyCode::Tab, _) => Some(Message::FocusNext),
            (KeyCode::BackTab, _) => Some(Message::FocusPrevious),
            (KeyCode::Up, _) => Some(Message::MoveUp),
            (KeyCode::Down, _) => Some(Message::MoveDown),
            (KeyCode::PageUp, _) => Some(Message::MovePageUp),
            (KeyCode::PageDown, _) => Some(Message::MovePageDown),
            _ if raw => Some(Message::RawKey(key)),
            (KeyCode::Char('q'), _) => Some(Message::Quit),
            (KeyCode::Left, _) => Some(Message::PreviousOption),
            (KeyCode::Right, _) => Some(Message::NextOption),
            (KeyCode::Enter, _) | (KeyCode::Char(' '), _) => Some(Message::Activate),
            _ => None,
        };
        trace!("Mapped: {key:?} => {message:?}");
        message
    }
}
