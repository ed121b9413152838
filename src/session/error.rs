use thiserror::Error;

use crate::hardware::HardwareError;
use crate::ledger::LedgerError;
use crate::menu::MenuError;

/// Errors that end a customer session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Hardware(#[from] HardwareError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("Invalid menu: {0}")]
    Menu(#[from] MenuError),
}

impl SessionError {
    /// Ledger failures end the current session only; anything else stops
    /// the kiosk.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, SessionError::Ledger(_))
    }
}
