//! Maps terminal key events onto chat loop actions.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Lines moved per arrow key or mouse wheel notch.
pub const SCROLL_STEP: u16 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Quit,
    Send,
    InsertNewline,
    ClearHistory,
    CopyCodeBlock,
    ScrollUp(u16),
    ScrollDown(u16),
    PageUp,
    PageDown,
    /// Anything else goes to the input editor.
    Edit,
    Ignore,
}

pub fn classify_key(key: &KeyEvent) -> KeyAction {
    if key.kind == KeyEventKind::Release {
        return KeyAction::Ignore;
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);

    match key.code {
        KeyCode::Char('c') if ctrl => KeyAction::Quit,
        KeyCode::Esc => KeyAction::Quit,
        KeyCode::Char('l') if ctrl => KeyAction::ClearHistory,
        KeyCode::Char('y') if ctrl => KeyAction::CopyCodeBlock,
        KeyCode::Char('j') if ctrl => KeyAction::InsertNewline,
        KeyCode::Enter if alt || key.modifiers.contains(KeyModifiers::SHIFT) => {
            KeyAction::InsertNewline
        }
        KeyCode::Enter => KeyAction::Send,
        KeyCode::Up => KeyAction::ScrollUp(SCROLL_STEP),
        KeyCode::Down => KeyAction::ScrollDown(SCROLL_STEP),
        KeyCode::PageUp => KeyAction::PageUp,
        KeyCode::PageDown => KeyAction::PageDown,
        _ => KeyAction::Edit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn enter_sends_and_alt_enter_inserts_newline() {
        assert_eq!(
            classify_key(&key(KeyCode::Enter, KeyModifiers::NONE)),
            KeyAction::Send
        );
        assert_eq!(
            classify_key(&key(KeyCode::Enter, KeyModifiers::ALT)),
            KeyAction::InsertNewline
        );
        assert_eq!(
            classify_key(&key(KeyCode::Char('j'), KeyModifiers::CONTROL)),
            KeyAction::InsertNewline
        );
    }

    #[test]
    fn control_shortcuts() {
        assert_eq!(
            classify_key(&key(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            KeyAction::Quit
        );
        assert_eq!(
            classify_key(&key(KeyCode::Char('l'), KeyModifiers::CONTROL)),
            KeyAction::ClearHistory
        );
        assert_eq!(
            classify_key(&key(KeyCode::Char('y'), KeyModifiers::CONTROL)),
            KeyAction::CopyCodeBlock
        );
        assert_eq!(
            classify_key(&key(KeyCode::Esc, KeyModifiers::NONE)),
            KeyAction::Quit
        );
    }

    #[test]
    fn plain_characters_go_to_the_editor() {
        assert_eq!(
            classify_key(&key(KeyCode::Char('l'), KeyModifiers::NONE)),
            KeyAction::Edit
        );
        assert_eq!(
            classify_key(&key(KeyCode::Backspace, KeyModifiers::NONE)),
            KeyAction::Edit
        );
    }

    #[test]
    fn navigation_keys_scroll() {
        assert_eq!(
            classify_key(&key(KeyCode::Up, KeyModifiers::NONE)),
            KeyAction::ScrollUp(SCROLL_STEP)
        );
        assert_eq!(
            classify_key(&key(KeyCode::PageDown, KeyModifiers::NONE)),
            KeyAction::PageDown
        );
    }

    #[test]
    fn key_releases_are_ignored() {
        let mut release = key(KeyCode::Enter, KeyModifiers::NONE);
        release.kind = KeyEventKind::Release;
        assert_eq!(classify_key(&release), KeyAction::Ignore);
    }
}
