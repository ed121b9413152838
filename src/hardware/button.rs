use crate::hardware::HardwareError;

/// The four momentary buttons on the operator panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonId {
    Cancel,
    Confirm,
    Increment,
    Decrement,
}

impl ButtonId {
    /// Sampling order. Only one action fires per poll, so simultaneous
    /// presses resolve to the first asserted button in this list.
    pub const PRIORITY: [ButtonId; 4] = [
        ButtonId::Cancel,
        ButtonId::Confirm,
        ButtonId::Increment,
        ButtonId::Decrement,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ButtonId::Cancel => "cancel",
            ButtonId::Confirm => "confirm",
            ButtonId::Increment => "increment",
            ButtonId::Decrement => "decrement",
        }
    }

    /// Buttons that end a session and must be released before the next one.
    pub fn is_terminal(self) -> bool {
        matches!(self, ButtonId::Cancel | ButtonId::Confirm)
    }
}

/// Raw level sampling of the panel buttons.
///
/// Implementations do no debouncing of their own; edge detection belongs to
/// the menu engine.
pub trait ButtonSource {
    /// Called once at the start of every poll cycle, before any
    /// [`is_asserted`](Self::is_asserted) query of that cycle.
    fn refresh(&mut self) -> Result<(), HardwareError> {
        Ok(())
    }

    fn is_asserted(&mut self, button: ButtonId) -> Result<bool, HardwareError>;

    /// Highest-priority asserted button, if any.
    fn sample(&mut self) -> Result<Option<ButtonId>, HardwareError> {
        for button in ButtonId::PRIORITY {
            if self.is_asserted(button)? {
                return Ok(Some(button));
            }
        }
        Ok(None)
    }
}

impl<B: ButtonSource + ?Sized> ButtonSource for &mut B {
    fn refresh(&mut self) -> Result<(), HardwareError> {
        (**self).refresh()
    }

    fn is_asserted(&mut self, button: ButtonId) -> Result<bool, HardwareError> {
        (**self).is_asserted(button)
    }
}

impl<B: ButtonSource + ?Sized> ButtonSource for Box<B> {
    fn refresh(&mut self) -> Result<(), HardwareError> {
        (**self).refresh()
    }

    fn is_asserted(&mut self, button: ButtonId) -> Result<bool, HardwareError> {
        (**self).is_asserted(button)
    }
}
