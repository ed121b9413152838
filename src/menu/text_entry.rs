//! Free-text entry with two buttons, or with a keyboard when one is attached.
//!
//! With buttons only, the operator composes one character at a time:
//! increment and decrement cycle the trailing slot through
//! `blank, a, b, ..., z` (27 symbols, wrapping both ways), CONFIRM on a
//! letter commits it and opens a new blank slot, and CONFIRM on the blank
//! slot finishes.
//!
//! With a keyboard, typed characters are appended on idle polls and CONFIRM
//! finishes at once.

use crate::hardware::{CharSource, HardwareError, KeyStroke, RenderFrame};
use crate::menu::error::MenuError;
use crate::menu::variant::{Confirm, Variant};

/// How the blank slot is drawn.
pub const BLANK_GLYPH: char = '_';

const SYMBOLS: u8 = 27;

/// Text composed so far plus the slot being edited.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Composition {
    committed: String,
    /// `None` is the blank placeholder.
    slot: Option<char>,
}

impl Composition {
    /// The composed text with a blank slot left out.
    pub fn text(&self) -> String {
        let mut text = self.committed.clone();
        text.extend(self.slot);
        text
    }

    pub fn slot(&self) -> Option<char> {
        self.slot
    }

    fn symbol_index(&self) -> u8 {
        match self.slot {
            Some(c) => c as u8 - b'a' + 1,
            None => 0,
        }
    }

    fn with_symbol(&self, index: u8) -> Self {
        let slot = match index % SYMBOLS {
            0 => None,
            n => Some((b'a' + n - 1) as char),
        };
        Self {
            committed: self.committed.clone(),
            slot,
        }
    }

    fn display(&self) -> String {
        let mut line = self.committed.clone();
        line.push(self.slot.unwrap_or(BLANK_GLYPH));
        line
    }
}

/// Characters a keyboard may contribute.
fn accepts(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_')
}

pub struct TextEntryMenu<'a> {
    prompt: String,
    keyboard: Option<&'a mut dyn CharSource>,
}

impl<'a> TextEntryMenu<'a> {
    /// Button-composition mode.
    pub fn new(prompt: impl Into<String>) -> Result<Self, MenuError> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(MenuError::EmptyPrompt);
        }
        Ok(Self {
            prompt,
            keyboard: None,
        })
    }

    /// Keyboard mode: characters come from `keyboard`.
    pub fn with_keyboard(
        prompt: impl Into<String>,
        keyboard: &'a mut dyn CharSource,
    ) -> Result<Self, MenuError> {
        let mut menu = Self::new(prompt)?;
        menu.keyboard = Some(keyboard);
        Ok(menu)
    }

    pub fn has_keyboard(&self) -> bool {
        self.keyboard.is_some()
    }
}

impl Variant for TextEntryMenu<'_> {
    type State = Composition;
    type Output = String;

    fn initial(&self) -> Composition {
        Composition::default()
    }

    fn render(&self, state: &Composition) -> RenderFrame {
        RenderFrame::new([self.prompt.clone(), state.display()])
    }

    fn on_increment(&self, state: &Composition) -> Composition {
        if self.has_keyboard() {
            return state.clone();
        }
        state.with_symbol(state.symbol_index() + 1)
    }

    fn on_decrement(&self, state: &Composition) -> Composition {
        if self.has_keyboard() {
            return state.clone();
        }
        state.with_symbol(state.symbol_index() + SYMBOLS - 1)
    }

    fn on_alternate(&mut self, state: &Composition) -> Result<Composition, HardwareError> {
        let Some(keyboard) = self.keyboard.as_mut() else {
            return Ok(state.clone());
        };
        let mut next = state.clone();
        match keyboard.poll_char()? {
            Some(KeyStroke::Char(c)) if accepts(c) => {
                next.committed.extend(next.slot.take());
                next.committed.push(c.to_ascii_lowercase());
            }
            Some(KeyStroke::Delete) => {
                if next.slot.take().is_none() {
                    next.committed.pop();
                }
            }
            _ => {}
        }
        Ok(next)
    }

    fn on_confirm(&self, state: &Composition) -> Confirm<Composition> {
        if self.has_keyboard() {
            return Confirm::Submit;
        }
        match state.slot {
            None => Confirm::Submit,
            Some(c) => {
                let mut committed = state.committed.clone();
                committed.push(c);
                Confirm::Continue(Composition {
                    committed,
                    slot: None,
                })
            }
        }
    }

    fn finalize(&self, state: Composition) -> String {
        state.text()
    }

    fn uses_attention_cursor(&self) -> bool {
        true
    }
}
