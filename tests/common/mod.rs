//! Shared test utilities and mock devices.

#![allow(dead_code, unused_imports)]

pub mod ledger_server;
pub mod mock_ledger;

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

use voucher_kiosk::config::Config;
use voucher_kiosk::hardware::{
    ButtonId, ButtonSource, CharSource, HardwareError, KeyStroke, RenderFrame, RenderSink,
    TokenReader,
};

pub use ledger_server::{LedgerServer, Reply};
pub use mock_ledger::MockLedger;

/// Idle polls allowed after the script runs out, before the source
/// reports a disconnect.
const IDLE_AFTER_SCRIPT: usize = 10;

/// Builds button scripts, one entry per poll.
#[derive(Debug, Clone, Default)]
pub struct Script {
    frames: Vec<Vec<ButtonId>>,
}

impl Script {
    pub fn new() -> Self {
        Self::default()
    }

    /// Press for one poll, then release for one poll.
    pub fn tap(mut self, button: ButtonId) -> Self {
        self.frames.push(vec![button]);
        self.frames.push(Vec::new());
        self
    }

    pub fn taps(mut self, button: ButtonId, count: usize) -> Self {
        for _ in 0..count {
            self = self.tap(button);
        }
        self
    }

    /// Keep `button` asserted for `polls` polls, then release.
    pub fn hold(mut self, button: ButtonId, polls: usize) -> Self {
        for _ in 0..polls {
            self.frames.push(vec![button]);
        }
        self.frames.push(Vec::new());
        self
    }

    /// Several buttons asserted in the same poll, then released.
    pub fn chord(mut self, buttons: &[ButtonId]) -> Self {
        self.frames.push(buttons.to_vec());
        self.frames.push(Vec::new());
        self
    }

    /// Exactly `buttons` asserted for one poll, with no release after.
    pub fn poll(mut self, buttons: &[ButtonId]) -> Self {
        self.frames.push(buttons.to_vec());
        self
    }

    pub fn idle(mut self, polls: usize) -> Self {
        for _ in 0..polls {
            self.frames.push(Vec::new());
        }
        self
    }

    pub fn buttons(self) -> ScriptedButtons {
        ScriptedButtons {
            frames: self.frames.into(),
            current: Vec::new(),
            idle_left: IDLE_AFTER_SCRIPT,
            refreshes: Arc::new(Mutex::new(0)),
        }
    }
}

/// Replays a [`Script`]: every `refresh` advances one poll.
pub struct ScriptedButtons {
    frames: VecDeque<Vec<ButtonId>>,
    current: Vec<ButtonId>,
    idle_left: usize,
    refreshes: Arc<Mutex<usize>>,
}

impl ScriptedButtons {
    /// Counter of polls taken, readable after the source is moved away.
    pub fn refresh_counter(&self) -> Arc<Mutex<usize>> {
        Arc::clone(&self.refreshes)
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl ButtonSource for ScriptedButtons {
    fn refresh(&mut self) -> Result<(), HardwareError> {
        *self.refreshes.lock() += 1;
        match self.frames.pop_front() {
            Some(frame) => self.current = frame,
            None if self.idle_left > 0 => {
                self.idle_left -= 1;
                self.current.clear();
            }
            None => return Err(HardwareError::disconnected("script")),
        }
        Ok(())
    }

    fn is_asserted(&mut self, button: ButtonId) -> Result<bool, HardwareError> {
        Ok(self.current.contains(&button))
    }
}

#[derive(Debug, Default)]
pub struct SinkLog {
    pub frames: Vec<RenderFrame>,
    pub clears: usize,
    pub attention: Vec<bool>,
}

/// Records everything written to it. Clones share the log.
#[derive(Clone, Default)]
pub struct RecordingSink {
    log: Arc<Mutex<SinkLog>>,
    fail_writes: bool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose frame writes fail, as if the display fell off the bus.
    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    pub fn writes(&self) -> usize {
        self.log.lock().frames.len()
    }

    pub fn clears(&self) -> usize {
        self.log.lock().clears
    }

    pub fn frames(&self) -> Vec<RenderFrame> {
        self.log.lock().frames.clone()
    }

    pub fn last_frame(&self) -> Option<RenderFrame> {
        self.log.lock().frames.last().cloned()
    }

    pub fn attention(&self) -> Vec<bool> {
        self.log.lock().attention.clone()
    }

    /// Whether any written line contains `text`.
    pub fn showed(&self, text: &str) -> bool {
        self.log
            .lock()
            .frames
            .iter()
            .any(|frame| frame.lines.iter().any(|line| line.contains(text)))
    }
}

impl RenderSink for RecordingSink {
    fn write_frame(&mut self, frame: &RenderFrame) -> Result<(), HardwareError> {
        if self.fail_writes {
            return Err(HardwareError::disconnected("recording sink"));
        }
        self.log.lock().frames.push(frame.clone());
        Ok(())
    }

    fn clear(&mut self) -> Result<(), HardwareError> {
        self.log.lock().clears += 1;
        Ok(())
    }

    fn set_attention_cursor(&mut self, on: bool) -> Result<(), HardwareError> {
        self.log.lock().attention.push(on);
        Ok(())
    }
}

/// Hands out queued keystrokes, one per poll. `None` entries are polls
/// where nothing was typed.
#[derive(Debug, Default)]
pub struct QueueKeyboard {
    strokes: VecDeque<Option<KeyStroke>>,
}

impl QueueKeyboard {
    pub fn typing(text: &str) -> Self {
        Self {
            strokes: text.chars().map(|c| Some(KeyStroke::Char(c))).collect(),
        }
    }

    pub fn then(mut self, stroke: Option<KeyStroke>) -> Self {
        self.strokes.push_back(stroke);
        self
    }

    pub fn then_typing(mut self, text: &str) -> Self {
        self.strokes
            .extend(text.chars().map(|c| Some(KeyStroke::Char(c))));
        self
    }
}

impl CharSource for QueueKeyboard {
    fn poll_char(&mut self) -> Result<Option<KeyStroke>, HardwareError> {
        Ok(self.strokes.pop_front().flatten())
    }
}

/// Presents queued card UIDs, then reports the reader as gone.
#[derive(Debug, Default)]
pub struct QueueReader {
    cards: VecDeque<String>,
}

impl QueueReader {
    pub fn new(cards: &[&str]) -> Self {
        Self {
            cards: cards.iter().map(|card| card.to_string()).collect(),
        }
    }
}

impl TokenReader for QueueReader {
    fn read_token(&mut self) -> Result<String, HardwareError> {
        self.cards
            .pop_front()
            .ok_or_else(|| HardwareError::disconnected("queue reader"))
    }
}

/// Config with every pause set to zero.
pub fn fast_config() -> Config {
    let mut config = Config::default();
    config.menu.poll_interval_ms = 0;
    config.session.result_seconds = 0;
    config.session.notice_seconds = 0;
    config
}
