//! Button-driven menus for character displays.
//!
//! # Architecture
//!
//! ```text
//! ButtonSource ──→ MenuEngine ──→ Variant ──→ RenderSink
//!   (levels)      (edges, once     (state      (write only
//!                  per poll)        change)     on change)
//! ```
//!
//! - **Variant**: the state transitions and view of one kind of menu
//! - **MenuEngine**: polls buttons, applies edges, diffs frames, drains
//!   terminal buttons on exit
//!
//! Variants are plain data dispatched statically through [`Variant`]; the
//! engine is generic over them, so no trait objects are involved.

mod choice;
mod counter;
mod engine;
mod error;
mod text_entry;
mod variant;

pub use choice::ChoiceMenu;
pub use counter::CounterMenu;
pub use engine::{EngineState, MenuEngine, DEFAULT_POLL_INTERVAL};
pub use error::MenuError;
pub use text_entry::{Composition, TextEntryMenu, BLANK_GLYPH};
pub use variant::{Confirm, Variant};
