//! Device-facing capabilities: panel buttons, character displays, typed
//! characters and the card reader.
//!
//! The menu engine only sees the traits defined here. Concrete devices
//! (`gpio`, `lcd`, `reader`) and the terminal simulator in
//! [`crate::console`] implement them.

mod button;
mod display;
mod error;
pub mod gpio;
mod keyboard;
pub mod lcd;
mod reader;

pub use button::{ButtonId, ButtonSource};
pub use display::{Fanout, RenderFrame, RenderSink};
pub use error::HardwareError;
pub use keyboard::{CharSource, KeyStroke};
pub use reader::{LineReader, TokenReader};
