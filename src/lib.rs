pub mod config;
pub mod console;
pub mod hardware;
pub mod ledger;
pub mod logging;
pub mod menu;
pub mod session;
