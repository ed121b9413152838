//! Customer workflows built from menus and ledger calls.
//!
//! The main menu offers withdrawing vouchers and buying a coffee card.
//! Both start by reading a card; unknown cards can be registered on the
//! spot, tied to an intern's account or left anonymous.

mod controller;
mod customer;
mod error;

pub use controller::{Action, Controller, Devices};
pub use customer::Customer;
pub use error::SessionError;
