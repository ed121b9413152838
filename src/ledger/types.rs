use serde::{Deserialize, Serialize};

/// What the ledger knows about a card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardInfo {
    /// Owner, if the card is tied to a user account. Anonymous coffee
    /// cards have none.
    pub username: Option<String>,
    pub intern: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: u64,
    pub username: String,
}

/// Outcome of spending vouchers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Spend {
    Accepted,
    /// The wallet balance does not cover the amount.
    Insufficient,
}

// Wire formats.

#[derive(Debug, Deserialize)]
pub(crate) struct NfcRecord {
    #[serde(default)]
    pub user: Option<NfcUser>,
    #[serde(default)]
    pub intern: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NfcUser {
    pub username: String,
}

impl From<NfcRecord> for CardInfo {
    fn from(record: NfcRecord) -> Self {
        CardInfo {
            username: record.user.map(|user| user.username),
            intern: record.intern,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserRecord {
    pub id: u64,
    pub username: String,
}

/// Balances arrive as decimal strings, older deployments send numbers.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum Amount {
    Text(String),
    Number(f64),
}

impl Amount {
    pub fn value(&self) -> Option<f64> {
        match self {
            Amount::Text(text) => text.trim().parse().ok(),
            Amount::Number(n) => Some(*n),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct Wallet {
    #[serde(default)]
    pub is_valid: bool,
    pub cached_balance: Amount,
}

/// Sum over valid wallets; a user has one wallet per semester.
pub(crate) fn valid_balance(wallets: &[Wallet]) -> f64 {
    wallets
        .iter()
        .filter(|wallet| wallet.is_valid)
        .filter_map(|wallet| wallet.cached_balance.value())
        .sum()
}

#[derive(Debug, Serialize)]
pub(crate) struct CardRegistration<'a> {
    pub card_uid: &'a str,
    pub user: Option<u64>,
    pub intern: bool,
    pub comment: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct VoucherUse {
    pub vouchers: u32,
}

#[derive(Debug, Serialize)]
pub(crate) struct VoucherPurchase<'a> {
    pub card: &'a str,
    pub vouchers: u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
}
