//! The contract every menu variant fulfils.

use std::fmt::Debug;

use crate::hardware::{HardwareError, RenderFrame};

/// What a CONFIRM press does to a running session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirm<S> {
    /// End the session and finalize the current state.
    Submit,
    /// Keep running with a new state.
    Continue(S),
}

/// A menu variant: pure state transitions plus a view.
///
/// The engine owns the state and calls these operations once per poll.
/// Variants never touch buttons or displays themselves; the only exception
/// is [`on_alternate`](Self::on_alternate), which may read an external
/// character source.
pub trait Variant {
    /// The value carried between polls (index, quantity, composition).
    type State: Clone + PartialEq + Debug;

    /// What a confirmed session hands back to the caller.
    type Output;

    fn initial(&self) -> Self::State;

    fn render(&self, state: &Self::State) -> RenderFrame;

    fn on_increment(&self, state: &Self::State) -> Self::State;

    fn on_decrement(&self, state: &Self::State) -> Self::State;

    /// Runs on polls where no new button edge fired.
    fn on_alternate(&mut self, state: &Self::State) -> Result<Self::State, HardwareError> {
        Ok(state.clone())
    }

    fn on_confirm(&self, _state: &Self::State) -> Confirm<Self::State> {
        Confirm::Submit
    }

    fn finalize(&self, state: Self::State) -> Self::Output;

    /// Whether the display is cleared when the menu starts.
    fn clears_display(&self) -> bool {
        true
    }

    /// Whether the blinking cursor is shown while the menu runs.
    fn uses_attention_cursor(&self) -> bool {
        false
    }
}
