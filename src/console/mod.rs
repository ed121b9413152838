//! Terminal stand-in for the kiosk hardware.
//!
//! Both displays are drawn as bordered panels of their configured size.
//! Esc, Enter, Up and Down (or `+`/`-`) act as CANCEL, CONFIRM, INCREMENT
//! and DECREMENT. Terminals report presses rather than levels, so a key
//! keeps its button asserted for the configured hold window; auto-repeat
//! extends it and release events, where reported, end it. While text entry
//! is active printable keys are typed, and the card reader is a prompt on
//! the bottom line. Ctrl+C ends the program through a transport fault.

mod input;
mod panel;
mod state;
mod terminal_guard;

use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event};
use parking_lot::Mutex;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::widgets::Paragraph;
use ratatui::{Frame, Terminal};

use crate::config::HardwareConfig;
use crate::hardware::{
    ButtonId, ButtonSource, CharSource, HardwareError, KeyStroke, RenderFrame, RenderSink,
    TokenReader,
};

use input::{map_key, InputMode};
use panel::HINT_TEXT;

pub use state::PanelId;
pub use terminal_guard::TerminalGuard;

const DEVICE: &str = "console";

/// How long the card prompt waits for a key before checking again.
const CARD_POLL: Duration = Duration::from_millis(50);

const HINTS: &str = "Esc cancel | Enter confirm | Up/+ more | Down/- less | Ctrl+C quit";

struct Inner {
    state: state::ConsoleState,
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl Inner {
    fn draw(&mut self) -> Result<(), HardwareError> {
        let Inner { state, terminal } = self;
        terminal
            .draw(|frame| render(frame, state))
            .map(|_| ())
            .map_err(|e| HardwareError::io(DEVICE, e))
    }
}

fn render(frame: &mut Frame<'_>, state: &state::ConsoleState) {
    let (bar_width, bar_height) = state.bar.size();
    let (customer_width, customer_height) = state.customer.size();
    let [bar_area, customer_area, prompt_area] = Layout::vertical([
        Constraint::Length(bar_height),
        Constraint::Length(customer_height),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    frame.render_widget(state.bar.widget(), narrow(bar_area, bar_width));
    frame.render_widget(state.customer.widget(), narrow(customer_area, customer_width));

    let prompt = match state.mode() {
        InputMode::Card => format!("Card UID: {}_", state.card_entry()),
        InputMode::Buttons | InputMode::Text => HINTS.to_string(),
    };
    frame.render_widget(
        Paragraph::new(Line::raw(prompt)).style(Style::default().fg(HINT_TEXT)),
        prompt_area,
    );
}

fn narrow(area: Rect, width: u16) -> Rect {
    Rect {
        width: width.min(area.width),
        ..area
    }
}

/// Shared handle to the simulated devices.
#[derive(Clone)]
pub struct Console {
    inner: Arc<Mutex<Inner>>,
}

impl Console {
    /// Takes over the terminal. Keep the guard alive for as long as the
    /// console is in use.
    pub fn open(hardware: &HardwareConfig) -> io::Result<(Self, TerminalGuard)> {
        let (terminal, guard) = terminal_guard::setup_terminal()?;
        let console = Self {
            inner: Arc::new(Mutex::new(Inner {
                state: state::ConsoleState::new(hardware),
                terminal,
            })),
        };
        console
            .inner
            .lock()
            .draw()
            .map_err(|e| io::Error::other(e.to_string()))?;
        Ok((console, guard))
    }

    pub fn buttons(&self) -> ConsoleButtons {
        ConsoleButtons {
            console: self.clone(),
        }
    }

    pub fn display(&self, panel: PanelId) -> ConsoleDisplay {
        ConsoleDisplay {
            console: self.clone(),
            panel,
        }
    }

    pub fn keyboard(&self) -> ConsoleKeyboard {
        ConsoleKeyboard {
            console: self.clone(),
        }
    }

    pub fn card_reader(&self) -> ConsoleCardReader {
        ConsoleCardReader {
            console: self.clone(),
        }
    }

    /// Handles pending key events, waiting up to `wait` for the first one.
    /// Returns a submitted card UID.
    fn pump(&self, wait: Duration) -> Result<Option<String>, HardwareError> {
        let mut inner = self.inner.lock();
        let mut submitted = None;
        let mut changed = false;
        let mut timeout = wait;
        while event::poll(timeout).map_err(|e| HardwareError::io(DEVICE, e))? {
            timeout = Duration::ZERO;
            match event::read().map_err(|e| HardwareError::io(DEVICE, e))? {
                Event::Key(key) => {
                    let Some(input) = map_key(inner.state.mode(), key) else {
                        continue;
                    };
                    if let Some(card) = inner.state.apply(input, Instant::now()) {
                        submitted = Some(card);
                    }
                    changed = true;
                }
                Event::Resize(..) => changed = true,
                _ => {}
            }
        }

        if inner.state.is_interrupted() {
            return Err(HardwareError::Interrupted);
        }
        if changed {
            inner.draw()?;
        }
        Ok(submitted)
    }

    fn update<F>(&self, change: F) -> Result<(), HardwareError>
    where
        F: FnOnce(&mut state::ConsoleState),
    {
        let mut inner = self.inner.lock();
        change(&mut inner.state);
        inner.draw()
    }
}

pub struct ConsoleButtons {
    console: Console,
}

impl ButtonSource for ConsoleButtons {
    fn refresh(&mut self) -> Result<(), HardwareError> {
        self.console.pump(Duration::ZERO).map(|_| ())
    }

    fn is_asserted(&mut self, button: ButtonId) -> Result<bool, HardwareError> {
        Ok(self
            .console
            .inner
            .lock()
            .state
            .is_held(button, Instant::now()))
    }
}

pub struct ConsoleDisplay {
    console: Console,
    panel: PanelId,
}

impl RenderSink for ConsoleDisplay {
    fn write_frame(&mut self, frame: &RenderFrame) -> Result<(), HardwareError> {
        let panel = self.panel;
        self.console
            .update(|state| state.panel_mut(panel).write(frame))
    }

    fn clear(&mut self) -> Result<(), HardwareError> {
        let panel = self.panel;
        self.console.update(|state| state.panel_mut(panel).clear())
    }

    fn set_attention_cursor(&mut self, on: bool) -> Result<(), HardwareError> {
        let panel = self.panel;
        self.console.update(|state| state.set_attention(panel, on))
    }
}

pub struct ConsoleKeyboard {
    console: Console,
}

impl CharSource for ConsoleKeyboard {
    fn poll_char(&mut self) -> Result<Option<KeyStroke>, HardwareError> {
        self.console.pump(Duration::ZERO)?;
        Ok(self.console.inner.lock().state.next_stroke())
    }
}

pub struct ConsoleCardReader {
    console: Console,
}

impl TokenReader for ConsoleCardReader {
    fn read_token(&mut self) -> Result<String, HardwareError> {
        self.console.update(|state| state.begin_card_entry())?;
        loop {
            if let Some(card) = self.console.pump(CARD_POLL)? {
                tracing::debug!(card = %card, "Card entered at the console");
                return Ok(card);
            }
        }
    }
}
