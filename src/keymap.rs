use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::controller::Input;
use crate::session::Phase;

/// Translate a terminal key event into controller input.
/// Chords, bare modifiers and non-character keys yield `None`.
pub fn interpret(key: &KeyEvent, phase: Phase) -> Option<Input> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    let chord = KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SUPER | KeyModifiers::META;
    if key.modifiers.intersects(chord) {
        return None;
    }

    match key.code {
        KeyCode::Tab => Some(Input::Restart),
        KeyCode::Enter if phase == Phase::Finished => Some(Input::Restart),
        KeyCode::Backspace => Some(Input::Backspace),
        KeyCode::Char(' ') => Some(Input::Space),
        KeyCode::Char(c) if !c.is_control() => Some(Input::KeyPress(c)),
        _ => None,
    }
}
