use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::hardware::{ButtonId, KeyStroke};

/// What the keyboard currently stands in for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Keys drive the four panel buttons.
    Buttons,
    /// Text entry is active: printable keys are typed, arrows still step.
    Text,
    /// The card prompt owns the keyboard.
    Card,
}

/// A key event translated to a device action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleInput {
    Press(ButtonId),
    Release(ButtonId),
    Stroke(KeyStroke),
    CardChar(char),
    CardDelete,
    CardClear,
    CardSubmit,
    Interrupt,
}

pub fn map_key(mode: InputMode, key: KeyEvent) -> Option<ConsoleInput> {
    if is_ctrl_char(key, 'c') {
        return (key.kind != KeyEventKind::Release).then_some(ConsoleInput::Interrupt);
    }

    if key.kind == KeyEventKind::Release {
        if mode == InputMode::Card {
            return None;
        }
        return button_for(mode, key.code).map(ConsoleInput::Release);
    }

    match mode {
        InputMode::Card => match key.code {
            KeyCode::Enter => Some(ConsoleInput::CardSubmit),
            KeyCode::Backspace => Some(ConsoleInput::CardDelete),
            KeyCode::Esc => Some(ConsoleInput::CardClear),
            KeyCode::Char(c) if c.is_ascii_hexdigit() => Some(ConsoleInput::CardChar(c)),
            _ => None,
        },
        InputMode::Buttons | InputMode::Text => {
            if let Some(button) = button_for(mode, key.code) {
                return Some(ConsoleInput::Press(button));
            }
            if mode != InputMode::Text {
                return None;
            }
            match key.code {
                KeyCode::Char(c) => Some(ConsoleInput::Stroke(KeyStroke::Char(c))),
                KeyCode::Backspace => Some(ConsoleInput::Stroke(KeyStroke::Delete)),
                _ => None,
            }
        }
    }
}

/// `+` and `-` double as step keys only while they cannot be typed.
fn button_for(mode: InputMode, code: KeyCode) -> Option<ButtonId> {
    match code {
        KeyCode::Esc => Some(ButtonId::Cancel),
        KeyCode::Enter => Some(ButtonId::Confirm),
        KeyCode::Up => Some(ButtonId::Increment),
        KeyCode::Down => Some(ButtonId::Decrement),
        KeyCode::Char('+') if mode == InputMode::Buttons => Some(ButtonId::Increment),
        KeyCode::Char('-') if mode == InputMode::Buttons => Some(ButtonId::Decrement),
        _ => None,
    }
}

fn is_ctrl_char(key: KeyEvent, needle: char) -> bool {
    matches!(key.code, KeyCode::Char(ch) if ch.eq_ignore_ascii_case(&needle))
        && key.modifiers.contains(KeyModifiers::CONTROL)
}
