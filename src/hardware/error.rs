use thiserror::Error;

/// Transport faults raised by buttons, displays and readers.
///
/// These are fatal to the running menu session: the engine never retries,
/// it hands the fault to whoever started the session.
#[derive(Debug, Error)]
pub enum HardwareError {
    #[error("I/O error on {device}: {source}")]
    Io {
        device: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Device {device} disconnected")]
    Disconnected { device: String },

    #[error("Interrupted by operator")]
    Interrupted,
}

impl HardwareError {
    pub fn io(device: impl Into<String>, source: std::io::Error) -> Self {
        HardwareError::Io {
            device: device.into(),
            source,
        }
    }

    pub fn disconnected(device: impl Into<String>) -> Self {
        HardwareError::Disconnected {
            device: device.into(),
        }
    }
}
