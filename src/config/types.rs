use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration container.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub menu: MenuConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub hardware: HardwareConfig,
    #[serde(default)]
    pub messages: Messages,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Ledger service connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Service root, e.g. "https://ledger.example.org:8000/".
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    /// Accept self-signed certificates (default: false).
    #[serde(default)]
    pub accept_invalid_certs: bool,
    /// Request timeout in seconds (default: 10).
    #[serde(default = "default_api_timeout")]
    pub timeout_seconds: u32,
}

/// Menu engine tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuConfig {
    /// Pause between button polls in milliseconds (default: 5).
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
    /// Highest amount the withdraw counter offers. Unbounded when absent.
    #[serde(default)]
    pub max_amount: Option<u32>,
}

/// Customer workflow settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Vouchers added when a coffee card is bought (default: 10).
    #[serde(default = "default_coffee_card_vouchers")]
    pub coffee_card_vouchers: u32,
    /// Countdown after a transaction, in seconds (default: 5).
    #[serde(default = "default_result_seconds")]
    pub result_seconds: u32,
    /// How long short notices stay up, in seconds (default: 2).
    #[serde(default = "default_notice_seconds")]
    pub notice_seconds: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HardwareMode {
    /// Terminal simulator.
    #[default]
    Console,
    /// GPIO buttons, I2C displays and a line-based card reader.
    Device,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HardwareConfig {
    #[serde(default)]
    pub mode: HardwareMode,
    #[serde(default)]
    pub buttons: ButtonPins,
    /// Operator display.
    #[serde(default = "default_bar_display")]
    pub bar: DisplayConfig,
    /// Customer-facing display.
    #[serde(default = "default_customer_display")]
    pub customer: DisplayConfig,
    #[serde(default)]
    pub reader: ReaderConfig,
    /// How long a console key press holds its button down, in ms (default: 150).
    #[serde(default = "default_hold_ms")]
    pub hold_ms: u64,
}

/// Sysfs GPIO line numbers of the panel buttons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonPins {
    pub cancel: u32,
    pub confirm: u32,
    pub increment: u32,
    pub decrement: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// I2C bus number (`/dev/i2c-<bus>`).
    pub bus: u8,
    /// Slave address of the LCD controller.
    pub address: u16,
    pub cols: u8,
    pub rows: u8,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReaderConfig {
    /// Device or pipe emitting one card UID per line. Stdin when absent.
    #[serde(default)]
    pub device: Option<PathBuf>,
}

/// Where diagnostics go.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log file base name. `VOUCHER_KIOSK_LOG` overrides it.
    #[serde(default)]
    pub file: Option<PathBuf>,
    /// `EnvFilter` directives used when `RUST_LOG` is unset (default: "info").
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

/// Every string shown on the displays.
///
/// `{name}`, `{amount}`, `{vouchers}` and `{coffee}` are substituted where
/// noted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Messages {
    pub loading: String,
    pub main_menu: String,
    pub withdraw: String,
    pub buy_coffee: String,
    pub waiting_for_card: String,
    pub not_accepted: String,
    pub unknown_card: String,
    pub register: String,
    pub cancel: String,
    pub intern_question: String,
    pub yes: String,
    pub no: String,
    pub username: String,
    pub user_not_found: String,
    pub registering_card: String,
    pub card_registered: String,
    pub registration_failed: String,
    /// `{name}`
    pub name_line: String,
    /// `{vouchers}`
    pub vouchers_line: String,
    /// `{coffee}`
    pub coffee_line: String,
    pub amount_prompt: String,
    pub voucher_type: String,
    pub intern_voucher: String,
    pub coffee_voucher: String,
    /// `{amount}`
    pub withdrawing: String,
    /// `{amount}`
    pub withdrawn: String,
    pub insufficient: String,
    /// `{amount}`
    pub adding: String,
    /// `{amount}`
    pub added: String,
    pub add_failed: String,
    /// Shown when the ledger cannot be reached.
    pub service_error: String,
}

impl Messages {
    /// Substitutes `{key}` placeholders in `template`.
    pub fn fill(template: &str, values: &[(&str, &str)]) -> String {
        values.iter().fold(template.to_string(), |text, (key, value)| {
            text.replace(&format!("{{{}}}", key), value)
        })
    }
}

fn default_base_url() -> String {
    "https://localhost:8000/".to_string()
}

fn default_api_timeout() -> u32 {
    10
}

fn default_poll_interval() -> u64 {
    5
}

fn default_coffee_card_vouchers() -> u32 {
    10
}

fn default_result_seconds() -> u32 {
    5
}

fn default_notice_seconds() -> u32 {
    2
}

fn default_hold_ms() -> u64 {
    150
}

fn default_log_filter() -> String {
    "info".to_string()
}

fn default_bar_display() -> DisplayConfig {
    DisplayConfig {
        bus: 1,
        address: 0x28,
        cols: 20,
        rows: 4,
    }
}

fn default_customer_display() -> DisplayConfig {
    DisplayConfig {
        bus: 1,
        address: 0x27,
        cols: 16,
        rows: 2,
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            username: String::new(),
            password: String::new(),
            client_id: String::new(),
            client_secret: String::new(),
            accept_invalid_certs: false,
            timeout_seconds: default_api_timeout(),
        }
    }
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval(),
            max_amount: None,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            coffee_card_vouchers: default_coffee_card_vouchers(),
            result_seconds: default_result_seconds(),
            notice_seconds: default_notice_seconds(),
        }
    }
}

impl Default for HardwareConfig {
    fn default() -> Self {
        Self {
            mode: HardwareMode::default(),
            buttons: ButtonPins::default(),
            bar: default_bar_display(),
            customer: default_customer_display(),
            reader: ReaderConfig::default(),
            hold_ms: default_hold_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: None,
            filter: default_log_filter(),
        }
    }
}

/// Physical pins 37, 35, 33 and 31 of the Raspberry Pi header.
impl Default for ButtonPins {
    fn default() -> Self {
        Self {
            cancel: 26,
            confirm: 19,
            increment: 13,
            decrement: 6,
        }
    }
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            loading: "Loading system!".to_string(),
            main_menu: "What do you want to do?".to_string(),
            withdraw: "Withdraw".to_string(),
            buy_coffee: "Buy coffee vouchers".to_string(),
            waiting_for_card: "Waiting for card".to_string(),
            not_accepted: "Not accepted".to_string(),
            unknown_card: "Unknown card".to_string(),
            register: "Register".to_string(),
            cancel: "Cancel".to_string(),
            intern_question: "Is the person an intern?".to_string(),
            yes: "Yes".to_string(),
            no: "No".to_string(),
            username: "Username".to_string(),
            user_not_found: "User not found".to_string(),
            registering_card: "Registering card".to_string(),
            card_registered: "Card registered!".to_string(),
            registration_failed: "Registration failed".to_string(),
            name_line: "Name: {name}".to_string(),
            vouchers_line: "Vouchers: {vouchers}".to_string(),
            coffee_line: "Coffee: {coffee}".to_string(),
            amount_prompt: "Withdraw amount".to_string(),
            voucher_type: "What type?".to_string(),
            intern_voucher: "Intern voucher".to_string(),
            coffee_voucher: "Coffee voucher".to_string(),
            withdrawing: "Withdrawing {amount}".to_string(),
            withdrawn: "{amount} withdrawn".to_string(),
            insufficient: "Not enough vouchers".to_string(),
            adding: "Adding {amount}".to_string(),
            added: "{amount} added".to_string(),
            add_failed: "Could not add".to_string(),
            service_error: "Service unavailable".to_string(),
        }
    }
}
