//! Key bindings: arrows and vim-style.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use mergefall::Move;

/// Action from a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Move(Move),
    Restart,
    Summary,
    CycleDifficulty,
    Quit,
    None,
}

/// Map key event to an action. Supports both arrows and vim (h/l/j).
pub fn key_to_action(key: KeyEvent) -> Action {
    let KeyEvent { code, modifiers, .. } = key;
    if modifiers == KeyModifiers::CONTROL && code == KeyCode::Char('c') {
        return Action::Quit;
    }
    if !(modifiers.is_empty() || modifiers == KeyModifiers::SHIFT) {
        return Action::None;
    }
    match code {
        KeyCode::Char('q' | 'Q') | KeyCode::Esc => Action::Quit,
        KeyCode::Left | KeyCode::Char('h') => Action::Move(Move::Left),
        KeyCode::Right | KeyCode::Char('l') => Action::Move(Move::Right),
        KeyCode::Down | KeyCode::Char('j') => Action::Move(Move::Down),
        KeyCode::Char('r' | 'R') => Action::Restart,
        KeyCode::Char('s' | 'S') => Action::Summary,
        KeyCode::Char('d' | 'D') => Action::CycleDifficulty,
        _ => Action::None,
    }
}
