use crate::hardware::HardwareError;

/// A key event from a keyboard-like character source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyStroke {
    Char(char),
    Delete,
}

/// Non-blocking source of typed characters, used by text entry.
pub trait CharSource {
    /// Returns `None` when no key event happened since the last call.
    fn poll_char(&mut self) -> Result<Option<KeyStroke>, HardwareError>;
}

impl<C: CharSource + ?Sized> CharSource for &mut C {
    fn poll_char(&mut self) -> Result<Option<KeyStroke>, HardwareError> {
        (**self).poll_char()
    }
}

impl<C: CharSource + ?Sized> CharSource for Box<C> {
    fn poll_char(&mut self) -> Result<Option<KeyStroke>, HardwareError> {
        (**self).poll_char()
    }
}
