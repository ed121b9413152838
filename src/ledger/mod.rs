//! Remote account and voucher ledger.
//!
//! [`Ledger`] is the request/response contract the session controller
//! depends on. [`HttpLedger`] talks to the REST service.

mod client;
mod error;
mod types;

pub use client::{HttpLedger, LedgerClient};
pub use error::LedgerError;
pub use types::{CardInfo, Spend, User};

/// Account operations used by the kiosk workflows.
pub trait Ledger {
    /// `None` when the card is not registered.
    fn card_info(&self, card_uid: &str) -> Result<Option<CardInfo>, LedgerError>;

    fn find_user(&self, username: &str) -> Result<Option<User>, LedgerError>;

    /// Ties a card to a user (or to no one, for anonymous coffee cards).
    /// Returns whether the service accepted the registration.
    fn register_card(
        &self,
        card_uid: &str,
        user_id: Option<u64>,
        intern: bool,
    ) -> Result<bool, LedgerError>;

    /// Intern vouchers left, summed over valid wallets.
    fn voucher_balance(&self, username: &str) -> Result<f64, LedgerError>;

    fn coffee_balance(&self, card_uid: &str) -> Result<f64, LedgerError>;

    fn use_vouchers(&self, username: &str, amount: u32) -> Result<Spend, LedgerError>;

    fn use_coffee_vouchers(&self, card_uid: &str, amount: u32) -> Result<Spend, LedgerError>;

    fn add_coffee_vouchers(&self, card_uid: &str, amount: u32) -> Result<bool, LedgerError>;
}

impl<L: Ledger + ?Sized> Ledger for Box<L> {
    fn card_info(&self, card_uid: &str) -> Result<Option<CardInfo>, LedgerError> {
        (**self).card_info(card_uid)
    }

    fn find_user(&self, username: &str) -> Result<Option<User>, LedgerError> {
        (**self).find_user(username)
    }

    fn register_card(
        &self,
        card_uid: &str,
        user_id: Option<u64>,
        intern: bool,
    ) -> Result<bool, LedgerError> {
        (**self).register_card(card_uid, user_id, intern)
    }

    fn voucher_balance(&self, username: &str) -> Result<f64, LedgerError> {
        (**self).voucher_balance(username)
    }

    fn coffee_balance(&self, card_uid: &str) -> Result<f64, LedgerError> {
        (**self).coffee_balance(card_uid)
    }

    fn use_vouchers(&self, username: &str, amount: u32) -> Result<Spend, LedgerError> {
        (**self).use_vouchers(username, amount)
    }

    fn use_coffee_vouchers(&self, card_uid: &str, amount: u32) -> Result<Spend, LedgerError> {
        (**self).use_coffee_vouchers(card_uid, amount)
    }

    fn add_coffee_vouchers(&self, card_uid: &str, amount: u32) -> Result<bool, LedgerError> {
        (**self).add_coffee_vouchers(card_uid, amount)
    }
}
