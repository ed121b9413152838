//! The polling loop that drives any [`Variant`] from raw button levels.

use std::thread;
use std::time::Duration;

use crate::hardware::{ButtonId, ButtonSource, HardwareError, RenderFrame, RenderSink};
use crate::menu::variant::{Confirm, Variant};

/// Pause between polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Per-session state, owned by one [`MenuEngine::run`] call.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineState<S> {
    pub active_choice: S,
    /// Button whose edge was already handled and that may still be held.
    pub last_pressed: Option<ButtonId>,
    pub running: bool,
    pub cancelled: bool,
    pub last_rendered_output: Option<RenderFrame>,
}

impl<S: Clone + PartialEq> EngineState<S> {
    pub fn new(initial: S) -> Self {
        Self {
            active_choice: initial,
            last_pressed: None,
            running: true,
            cancelled: false,
            last_rendered_output: None,
        }
    }

    /// Applies one poll's sample to the state.
    ///
    /// `pressed` is the highest-priority asserted button. Increment,
    /// decrement and confirm are edge-triggered: a button that stays held
    /// fires once, and fires again only after a poll where nothing was
    /// asserted. Cancel ends the session whenever it is seen.
    pub fn advance<V>(&mut self, variant: &mut V, pressed: Option<ButtonId>) -> Result<(), HardwareError>
    where
        V: Variant<State = S>,
    {
        let fresh = pressed.is_some() && pressed != self.last_pressed;
        match pressed {
            Some(ButtonId::Cancel) => {
                self.running = false;
                self.cancelled = true;
            }
            Some(button @ ButtonId::Confirm) if fresh => {
                self.last_pressed = Some(button);
                match variant.on_confirm(&self.active_choice) {
                    Confirm::Submit => self.running = false,
                    Confirm::Continue(next) => self.active_choice = next,
                }
            }
            Some(button @ ButtonId::Increment) if fresh => {
                self.last_pressed = Some(button);
                self.active_choice = variant.on_increment(&self.active_choice);
            }
            Some(button @ ButtonId::Decrement) if fresh => {
                self.last_pressed = Some(button);
                self.active_choice = variant.on_decrement(&self.active_choice);
            }
            held => {
                if held.is_none() {
                    self.last_pressed = None;
                }
                self.active_choice = variant.on_alternate(&self.active_choice)?;
            }
        }
        Ok(())
    }

    /// Returns the frame to write, or `None` if it matches the last one.
    pub fn frame_to_write<V>(&mut self, variant: &V) -> Option<RenderFrame>
    where
        V: Variant<State = S>,
    {
        let frame = variant.render(&self.active_choice);
        if self.last_rendered_output.as_ref() == Some(&frame) {
            return None;
        }
        self.last_rendered_output = Some(frame.clone());
        Some(frame)
    }
}

/// Runs menus against a button panel and a display.
///
/// Both collaborators are borrowed for the engine's lifetime; nothing else
/// may write to the display while a menu is running, which is what keeps
/// the frame cache accurate.
pub struct MenuEngine<B, S> {
    buttons: B,
    sink: S,
    poll_interval: Duration,
}

impl<B: ButtonSource, S: RenderSink> MenuEngine<B, S> {
    pub fn new(buttons: B, sink: S) -> Self {
        Self {
            buttons,
            sink,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn into_parts(self) -> (B, S) {
        (self.buttons, self.sink)
    }

    /// Runs `variant` until CONFIRM submits or CANCEL aborts.
    ///
    /// Returns `Ok(None)` on cancellation. Blocks for as long as the
    /// operator takes; there is no timeout.
    pub fn run<V: Variant>(&mut self, variant: &mut V) -> Result<Option<V::Output>, HardwareError> {
        let attention = variant.uses_attention_cursor();
        if variant.clears_display() {
            self.sink.clear()?;
        }
        if attention {
            self.sink.set_attention_cursor(true)?;
        }

        let mut sink = scopeguard::guard(&mut self.sink, move |sink| {
            if attention {
                if let Err(err) = sink.set_attention_cursor(false) {
                    tracing::warn!("Failed to hide attention cursor: {}", err);
                }
            }
        });

        let mut state = EngineState::new(variant.initial());
        while state.running {
            self.buttons.refresh()?;
            let pressed = self.buttons.sample()?;
            state.advance(variant, pressed)?;

            if state.running {
                if let Some(frame) = state.frame_to_write(variant) {
                    tracing::trace!(lines = ?frame.lines, "Frame changed");
                    sink.write_frame(&frame)?;
                }
                pause(self.poll_interval);
            }
        }

        drain(&mut self.buttons, self.poll_interval)?;

        if state.cancelled {
            tracing::debug!("Menu cancelled");
            return Ok(None);
        }
        tracing::debug!(choice = ?state.active_choice, "Menu confirmed");
        Ok(Some(variant.finalize(state.active_choice)))
    }
}

/// Waits until the buttons that ended the session are physically released,
/// so the next menu does not see the same press.
fn drain<B: ButtonSource>(buttons: &mut B, poll_interval: Duration) -> Result<(), HardwareError> {
    loop {
        buttons.refresh()?;
        let mut held = false;
        for button in ButtonId::PRIORITY.into_iter().filter(|b| b.is_terminal()) {
            held |= buttons.is_asserted(button)?;
        }
        if !held {
            return Ok(());
        }
        pause(poll_interval);
    }
}

fn pause(interval: Duration) {
    if !interval.is_zero() {
        thread::sleep(interval);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::CounterMenu;

    fn counter() -> CounterMenu {
        CounterMenu::new("Qty").unwrap()
    }

    #[test]
    fn held_increment_fires_once() {
        let mut menu = counter();
        let mut state = EngineState::new(menu.initial());
        for _ in 0..50 {
            state.advance(&mut menu, Some(ButtonId::Increment)).unwrap();
        }
        assert_eq!(state.active_choice, 1);

        state.advance(&mut menu, None).unwrap();
        state.advance(&mut menu, Some(ButtonId::Increment)).unwrap();
        assert_eq!(state.active_choice, 2);
    }

    #[test]
    fn switching_buttons_fires_the_new_one() {
        let mut menu = counter();
        let mut state = EngineState::new(menu.initial());
        state.advance(&mut menu, Some(ButtonId::Increment)).unwrap();
        state.advance(&mut menu, Some(ButtonId::Increment)).unwrap();
        state.advance(&mut menu, Some(ButtonId::Decrement)).unwrap();
        assert_eq!(state.active_choice, 0);
        assert_eq!(state.last_pressed, Some(ButtonId::Decrement));
    }

    #[test]
    fn cancel_wins_and_marks_cancelled() {
        let mut menu = counter();
        let mut state = EngineState::new(3);
        state.advance(&mut menu, Some(ButtonId::Cancel)).unwrap();
        assert!(!state.running);
        assert!(state.cancelled);
    }

    #[test]
    fn identical_frames_are_not_rewritten() {
        let menu = counter();
        let mut state = EngineState::new(0);
        assert!(state.frame_to_write(&menu).is_some());
        assert!(state.frame_to_write(&menu).is_none());
        state.active_choice = 1;
        assert!(state.frame_to_write(&menu).is_some());
    }
}
