mod loader;
mod types;

pub use loader::ConfigError;
pub use types::{
    ApiConfig, ButtonPins, Config, DisplayConfig, HardwareConfig, HardwareMode, LoggingConfig,
    MenuConfig, Messages, ReaderConfig, SessionConfig,
};
