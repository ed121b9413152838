//! Panel buttons read through the Linux sysfs GPIO interface.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::ButtonPins;
use crate::hardware::{ButtonId, ButtonSource, HardwareError};

const SYSFS_GPIO: &str = "/sys/class/gpio";

/// Reads `gpio<N>/value` for each button; `1` means pressed.
pub struct GpioButtons {
    cancel: PathBuf,
    confirm: PathBuf,
    increment: PathBuf,
    decrement: PathBuf,
}

impl GpioButtons {
    pub fn new(pins: &ButtonPins) -> Self {
        Self::with_root(Path::new(SYSFS_GPIO), pins)
    }

    /// Uses another directory in place of `/sys/class/gpio`.
    pub fn with_root(root: &Path, pins: &ButtonPins) -> Self {
        let value = |line: u32| root.join(format!("gpio{}", line)).join("value");
        Self {
            cancel: value(pins.cancel),
            confirm: value(pins.confirm),
            increment: value(pins.increment),
            decrement: value(pins.decrement),
        }
    }

    fn path(&self, button: ButtonId) -> &Path {
        match button {
            ButtonId::Cancel => &self.cancel,
            ButtonId::Confirm => &self.confirm,
            ButtonId::Increment => &self.increment,
            ButtonId::Decrement => &self.decrement,
        }
    }
}

impl ButtonSource for GpioButtons {
    fn is_asserted(&mut self, button: ButtonId) -> Result<bool, HardwareError> {
        let path = self.path(button);
        let raw = fs::read_to_string(path).map_err(|e| {
            HardwareError::io(format!("{} button ({})", button.name(), path.display()), e)
        })?;
        Ok(raw.trim() == "1")
    }
}
