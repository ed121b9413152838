//! In-memory ledger for workflow tests.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

use voucher_kiosk::ledger::{CardInfo, Ledger, LedgerError, Spend, User};

#[derive(Debug)]
struct State {
    cards: HashMap<String, CardInfo>,
    users: HashMap<String, u64>,
    vouchers: HashMap<String, f64>,
    coffee: HashMap<String, f64>,
    spend: Spend,
    register_ok: bool,
    add_ok: bool,
    offline: bool,
    calls: Vec<String>,
}

/// Clones share state, so a test can keep one while the controller owns
/// another.
#[derive(Debug, Clone)]
pub struct MockLedger {
    state: Arc<Mutex<State>>,
}

impl Default for MockLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl MockLedger {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                cards: HashMap::new(),
                users: HashMap::new(),
                vouchers: HashMap::new(),
                coffee: HashMap::new(),
                spend: Spend::Accepted,
                register_ok: true,
                add_ok: true,
                offline: false,
                calls: Vec::new(),
            })),
        }
    }

    pub fn with_card(self, card_uid: &str, username: Option<&str>, intern: bool) -> Self {
        self.state.lock().cards.insert(
            card_uid.to_string(),
            CardInfo {
                username: username.map(str::to_string),
                intern,
            },
        );
        self
    }

    pub fn with_user(self, username: &str, id: u64) -> Self {
        self.state.lock().users.insert(username.to_string(), id);
        self
    }

    pub fn with_vouchers(self, username: &str, balance: f64) -> Self {
        self.state
            .lock()
            .vouchers
            .insert(username.to_string(), balance);
        self
    }

    pub fn with_coffee(self, card_uid: &str, balance: f64) -> Self {
        self.state.lock().coffee.insert(card_uid.to_string(), balance);
        self
    }

    pub fn spending(self, spend: Spend) -> Self {
        self.state.lock().spend = spend;
        self
    }

    pub fn refusing_registration(self) -> Self {
        self.state.lock().register_ok = false;
        self
    }

    pub fn refusing_purchases(self) -> Self {
        self.state.lock().add_ok = false;
        self
    }

    /// Every call fails as if the service were unreachable.
    pub fn offline(self) -> Self {
        self.state.lock().offline = true;
        self
    }

    /// Calls made so far, e.g. `"use_coffee_vouchers c0ffee 2"`.
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().calls.clone()
    }

    pub fn card(&self, card_uid: &str) -> Option<CardInfo> {
        self.state.lock().cards.get(card_uid).cloned()
    }

    fn record(&self, call: String) -> Result<(), LedgerError> {
        let mut state = self.state.lock();
        state.calls.push(call);
        if state.offline {
            return Err(LedgerError::Auth("ledger offline".to_string()));
        }
        Ok(())
    }
}

impl Ledger for MockLedger {
    fn card_info(&self, card_uid: &str) -> Result<Option<CardInfo>, LedgerError> {
        self.record(format!("card_info {}", card_uid))?;
        Ok(self.state.lock().cards.get(card_uid).cloned())
    }

    fn find_user(&self, username: &str) -> Result<Option<User>, LedgerError> {
        self.record(format!("find_user {}", username))?;
        Ok(self.state.lock().users.get(username).map(|id| User {
            id: *id,
            username: username.to_string(),
        }))
    }

    fn register_card(
        &self,
        card_uid: &str,
        user_id: Option<u64>,
        intern: bool,
    ) -> Result<bool, LedgerError> {
        self.record(format!("register_card {} {:?} {}", card_uid, user_id, intern))?;
        let mut state = self.state.lock();
        if !state.register_ok {
            return Ok(false);
        }
        let username = user_id.and_then(|id| {
            state
                .users
                .iter()
                .find(|(_, user)| **user == id)
                .map(|(name, _)| name.clone())
        });
        state
            .cards
            .insert(card_uid.to_string(), CardInfo { username, intern });
        Ok(true)
    }

    fn voucher_balance(&self, username: &str) -> Result<f64, LedgerError> {
        self.record(format!("voucher_balance {}", username))?;
        Ok(self
            .state
            .lock()
            .vouchers
            .get(username)
            .copied()
            .unwrap_or(0.0))
    }

    fn coffee_balance(&self, card_uid: &str) -> Result<f64, LedgerError> {
        self.record(format!("coffee_balance {}", card_uid))?;
        Ok(self.state.lock().coffee.get(card_uid).copied().unwrap_or(0.0))
    }

    fn use_vouchers(&self, username: &str, amount: u32) -> Result<Spend, LedgerError> {
        self.record(format!("use_vouchers {} {}", username, amount))?;
        Ok(self.state.lock().spend)
    }

    fn use_coffee_vouchers(&self, card_uid: &str, amount: u32) -> Result<Spend, LedgerError> {
        self.record(format!("use_coffee_vouchers {} {}", card_uid, amount))?;
        Ok(self.state.lock().spend)
    }

    fn add_coffee_vouchers(&self, card_uid: &str, amount: u32) -> Result<bool, LedgerError> {
        self.record(format!("add_coffee_vouchers {} {}", card_uid, amount))?;
        Ok(self.state.lock().add_ok)
    }
}
