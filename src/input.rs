//! Input handling module for keyboard and mouse events

use crate::interaction::NudgeKey;
use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
        MouseEventKind,
    },
    terminal,
};
use std::io::{self, stdout};
use std::time::Duration;

/// Input events in terminal cell coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Press { col: u16, row: u16 },
    Move { col: u16, row: u16 },
    Release,
    /// Signed wheel detents, positive away from the user
    Wheel { col: u16, row: u16, ticks: i32 },
    Key(NudgeKey),
    Char(char),
    Resize { cols: u16, rows: u16 },
    FocusLost,
    Quit,
}

/// Map a raw terminal event to the preview's vocabulary.
pub fn translate(event: Event) -> Option<InputEvent> {
    match event {
        Event::Key(key) => translate_key(key),
        Event::Mouse(mouse) => translate_mouse(mouse),
        Event::Resize(cols, rows) => Some(InputEvent::Resize { cols, rows }),
        Event::FocusLost => Some(InputEvent::FocusLost),
        _ => None,
    }
}

fn translate_key(KeyEvent { code, modifiers, kind, .. }: KeyEvent) -> Option<InputEvent> {
    if kind == KeyEventKind::Release {
        return None;
    }
    // Ctrl+C e Ctrl+D escono sempre
    if modifiers.contains(KeyModifiers::CONTROL) && matches!(code, KeyCode::Char('c' | 'd')) {
        return Some(InputEvent::Quit);
    }
    match code {
        KeyCode::Char('q') | KeyCode::Esc => Some(InputEvent::Quit),
        KeyCode::Left => Some(InputEvent::Key(NudgeKey::Left)),
        KeyCode::Right => Some(InputEvent::Key(NudgeKey::Right)),
        KeyCode::Up => Some(InputEvent::Key(NudgeKey::Up)),
        KeyCode::Down => Some(InputEvent::Key(NudgeKey::Down)),
        KeyCode::Char(c) => Some(InputEvent::Char(c)),
        _ => None,
    }
}

fn translate_mouse(MouseEvent { kind, column: col, row, .. }: MouseEvent) -> Option<InputEvent> {
    match kind {
        MouseEventKind::Down(MouseButton::Left) => Some(InputEvent::Press { col, row }),
        MouseEventKind::Drag(MouseButton::Left) | MouseEventKind::Moved => {
            Some(InputEvent::Move { col, row })
        }
        MouseEventKind::Up(MouseButton::Left) => Some(InputEvent::Release),
        MouseEventKind::ScrollUp => Some(InputEvent::Wheel { col, row, ticks: 1 }),
        MouseEventKind::ScrollDown => Some(InputEvent::Wheel { col, row, ticks: -1 }),
        _ => None,
    }
}

/// Owns the terminal modes the preview needs; restores them on drop
pub struct InputManager {
    last_terminal_size: (u16, u16),
}

impl InputManager {
    pub fn new() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        crossterm::execute!(
            stdout(),
            terminal::EnterAlternateScreen,
            cursor::Hide,
            event::EnableMouseCapture,
            event::EnableFocusChange
        )?;

        let last_terminal_size = terminal::size().unwrap_or((80, 24));
        Ok(Self { last_terminal_size })
    }

    pub fn terminal_size(&self) -> (u16, u16) {
        self.last_terminal_size
    }

    /// Wait up to `timeout` for one event.
    pub fn poll_event(&mut self, timeout: Duration) -> io::Result<Option<InputEvent>> {
        if !event::poll(timeout)? {
            return Ok(None);
        }
        let translated = translate(event::read()?);
        if let Some(InputEvent::Resize { cols, rows }) = translated {
            self.last_terminal_size = (cols, rows);
        }
        Ok(translated)
    }
}

impl Drop for InputManager {
    fn drop(&mut self) {
        let _ = crossterm::execute!(
            stdout(),
            cursor::Show,
            event::DisableFocusChange,
            event::DisableMouseCapture,
            terminal::LeaveAlternateScreen
        );
        let _ = terminal::disable_raw_mode();
    }
}
