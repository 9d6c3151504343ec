// SPDX-License-Identifier: MIT
//
// Key bindings.
//
// Keys resolve to `KeyAction`s depending on which pane has focus. A few keys
// work everywhere (quit, submit, escape, paging); the rest either edit the
// compose area or move around the transcript.

use quill_editor::InputEvent;
use quill_term::input::{KeyCode, KeyEvent, Modifiers};

/// Where typing goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Compose,
    Transcript,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    Edit(InputEvent),
    Submit,
    /// Cancel a running generation, otherwise toggle focus.
    Escape,
    Quit,
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    FocusCompose,
}

/// The action bound to `key`, if any.
#[must_use]
pub fn resolve(key: KeyEvent, focus: Focus) -> Option<KeyAction> {
    let ctrl = key.has(Modifiers::CTRL);
    let alt = key.has(Modifiers::ALT);

    let global = match key.code {
        KeyCode::Char('c') if ctrl => Some(KeyAction::Quit),
        KeyCode::Char('s') if ctrl => Some(KeyAction::Submit),
        KeyCode::Enter if alt => Some(KeyAction::Submit),
        KeyCode::Escape => Some(KeyAction::Escape),
        KeyCode::PageUp => Some(KeyAction::PageUp),
        KeyCode::PageDown => Some(KeyAction::PageDown),
        _ => None,
    };
    if global.is_some() {
        return global;
    }

    match focus {
        Focus::Compose => compose_key(key, ctrl || alt),
        Focus::Transcript => transcript_key(key, ctrl || alt),
    }
}

fn compose_key(key: KeyEvent, chorded: bool) -> Option<KeyAction> {
    let event = match key.code {
        KeyCode::Char(ch) if !chorded => InputEvent::InsertText(ch.to_string()),
        KeyCode::Tab if !chorded => InputEvent::InsertText("    ".into()),
        KeyCode::Enter => InputEvent::Enter,
        KeyCode::Backspace => InputEvent::Backspace,
        KeyCode::Left => InputEvent::ArrowLeft,
        KeyCode::Right => InputEvent::ArrowRight,
        KeyCode::Up => InputEvent::ArrowUp,
        KeyCode::Down => InputEvent::ArrowDown,
        KeyCode::Home => InputEvent::Home,
        KeyCode::End => InputEvent::End,
        _ => return None,
    };
    Some(KeyAction::Edit(event))
}

fn transcript_key(key: KeyEvent, chorded: bool) -> Option<KeyAction> {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') if !chorded => Some(KeyAction::ScrollUp),
        KeyCode::Down | KeyCode::Char('j') if !chorded => Some(KeyAction::ScrollDown),
        KeyCode::Enter | KeyCode::Char('i') if !chorded => Some(KeyAction::FocusCompose),
        _ => None,
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(code: KeyCode) -> KeyEvent {
        KeyEvent::plain(code)
    }

    fn ctrl(ch: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(ch), Modifiers::CTRL)
    }

    #[test]
    fn typing_inserts_text() {
        assert_eq!(
            resolve(plain(KeyCode::Char('a')), Focus::Compose),
            Some(KeyAction::Edit(InputEvent::InsertText("a".into())))
        );
        let shifted = KeyEvent::new(KeyCode::Char('A'), Modifiers::SHIFT);
        assert_eq!(
            resolve(shifted, Focus::Compose),
            Some(KeyAction::Edit(InputEvent::InsertText("A".into())))
        );
    }

    #[test]
    fn chorded_letters_do_not_insert() {
        assert_eq!(resolve(ctrl('x'), Focus::Compose), None);
        let alt = KeyEvent::new(KeyCode::Char('x'), Modifiers::ALT);
        assert_eq!(resolve(alt, Focus::Compose), None);
    }

    #[test]
    fn enter_splits_and_alt_enter_submits() {
        assert_eq!(
            resolve(plain(KeyCode::Enter), Focus::Compose),
            Some(KeyAction::Edit(InputEvent::Enter))
        );
        let alt_enter = KeyEvent::new(KeyCode::Enter, Modifiers::ALT);
        assert_eq!(resolve(alt_enter, Focus::Compose), Some(KeyAction::Submit));
        assert_eq!(resolve(ctrl('s'), Focus::Compose), Some(KeyAction::Submit));
    }

    #[test]
    fn global_keys_work_in_both_panes() {
        for focus in [Focus::Compose, Focus::Transcript] {
            assert_eq!(resolve(ctrl('c'), focus), Some(KeyAction::Quit));
            assert_eq!(resolve(plain(KeyCode::Escape), focus), Some(KeyAction::Escape));
            assert_eq!(resolve(plain(KeyCode::PageUp), focus), Some(KeyAction::PageUp));
            assert_eq!(
                resolve(plain(KeyCode::PageDown), focus),
                Some(KeyAction::PageDown)
            );
        }
    }

    #[test]
    fn editing_keys_map_to_input_events() {
        let cases = [
            (KeyCode::Backspace, InputEvent::Backspace),
            (KeyCode::Left, InputEvent::ArrowLeft),
            (KeyCode::Right, InputEvent::ArrowRight),
            (KeyCode::Up, InputEvent::ArrowUp),
            (KeyCode::Down, InputEvent::ArrowDown),
            (KeyCode::Home, InputEvent::Home),
            (KeyCode::End, InputEvent::End),
            (KeyCode::Tab, InputEvent::InsertText("    ".into())),
        ];
        for (code, event) in cases {
            assert_eq!(
                resolve(plain(code), Focus::Compose),
                Some(KeyAction::Edit(event))
            );
        }
    }

    #[test]
    fn transcript_focus_scrolls_and_refocuses() {
        assert_eq!(
            resolve(plain(KeyCode::Up), Focus::Transcript),
            Some(KeyAction::ScrollUp)
        );
        assert_eq!(
            resolve(plain(KeyCode::Char('j')), Focus::Transcript),
            Some(KeyAction::ScrollDown)
        );
        assert_eq!(
            resolve(plain(KeyCode::Char('i')), Focus::Transcript),
            Some(KeyAction::FocusCompose)
        );
        assert_eq!(
            resolve(plain(KeyCode::Enter), Focus::Transcript),
            Some(KeyAction::FocusCompose)
        );
        assert_eq!(resolve(plain(KeyCode::Char('x')), Focus::Transcript), None);
    }
}
