use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use crate::console::input::{ConsoleInput, InputMode};
use crate::console::panel::Panel;
use crate::config::HardwareConfig;
use crate::hardware::{ButtonId, KeyStroke};

/// Which simulated display a handle draws on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelId {
    Bar,
    Customer,
}

/// Everything the simulator shows and every key it has not consumed yet.
#[derive(Debug)]
pub struct ConsoleState {
    pub bar: Panel,
    pub customer: Panel,
    mode: InputMode,
    /// Buttons count as asserted until their deadline.
    held: HashMap<ButtonId, Instant>,
    hold: Duration,
    strokes: VecDeque<KeyStroke>,
    card_entry: String,
    interrupted: bool,
}

impl ConsoleState {
    pub fn new(hardware: &HardwareConfig) -> Self {
        Self {
            bar: Panel::new("Bar", hardware.bar.cols, hardware.bar.rows),
            customer: Panel::new("Customer", hardware.customer.cols, hardware.customer.rows),
            mode: InputMode::Buttons,
            held: HashMap::new(),
            hold: Duration::from_millis(hardware.hold_ms),
            strokes: VecDeque::new(),
            card_entry: String::new(),
            interrupted: false,
        }
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    pub fn card_entry(&self) -> &str {
        &self.card_entry
    }

    pub fn is_interrupted(&self) -> bool {
        self.interrupted
    }

    pub fn panel_mut(&mut self, id: PanelId) -> &mut Panel {
        match id {
            PanelId::Bar => &mut self.bar,
            PanelId::Customer => &mut self.customer,
        }
    }

    /// Applies one key. Returns the card UID when the prompt is submitted.
    pub fn apply(&mut self, input: ConsoleInput, now: Instant) -> Option<String> {
        match input {
            ConsoleInput::Press(button) => {
                self.held.insert(button, now + self.hold);
            }
            ConsoleInput::Release(button) => {
                self.held.remove(&button);
            }
            ConsoleInput::Stroke(stroke) => {
                if self.mode == InputMode::Text {
                    self.strokes.push_back(stroke);
                }
            }
            ConsoleInput::CardChar(c) => self.card_entry.push(c),
            ConsoleInput::CardDelete => {
                self.card_entry.pop();
            }
            ConsoleInput::CardClear => self.card_entry.clear(),
            ConsoleInput::CardSubmit => {
                if !self.card_entry.is_empty() {
                    self.mode = InputMode::Buttons;
                    return Some(std::mem::take(&mut self.card_entry).to_ascii_lowercase());
                }
            }
            ConsoleInput::Interrupt => self.interrupted = true,
        }
        None
    }

    pub fn is_held(&self, button: ButtonId, now: Instant) -> bool {
        self.held.get(&button).is_some_and(|until| now < *until)
    }

    pub fn next_stroke(&mut self) -> Option<KeyStroke> {
        self.strokes.pop_front()
    }

    /// The attention cursor marks text entry; typing is only captured
    /// while it is on.
    pub fn set_attention(&mut self, id: PanelId, on: bool) {
        self.panel_mut(id).set_attention(on);
        if self.mode == InputMode::Card {
            return;
        }
        let typing = self.bar.attention() || self.customer.attention();
        if typing && self.mode != InputMode::Text {
            self.strokes.clear();
        }
        self.mode = if typing {
            InputMode::Text
        } else {
            InputMode::Buttons
        };
    }

    pub fn begin_card_entry(&mut self) {
        self.mode = InputMode::Card;
        self.card_entry.clear();
        self.held.clear();
    }
}
