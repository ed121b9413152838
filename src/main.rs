use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use voucher_kiosk::config::{Config, DisplayConfig, HardwareConfig, HardwareMode};
use voucher_kiosk::console::{Console, PanelId};
use voucher_kiosk::hardware::gpio::GpioButtons;
use voucher_kiosk::hardware::lcd::{I2cBus, LcdDisplay};
use voucher_kiosk::hardware::{HardwareError, LineReader, TokenReader};
use voucher_kiosk::ledger::HttpLedger;
use voucher_kiosk::logging::init_tracing;
use voucher_kiosk::session::{Controller, Devices, SessionError};

#[derive(Debug, Parser)]
#[command(name = "voucher-kiosk", version, about = "Voucher and coffee card kiosk")]
struct Cli {
    /// Config file (default: ~/.config/voucher-kiosk/config.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Simulate buttons, displays and card reader in this terminal
    #[arg(long)]
    console: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let path = cli.config.unwrap_or_else(Config::config_path);
    let mut config = Config::load_from(&path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;
    if cli.console {
        config.hardware.mode = HardwareMode::Console;
    }
    let sink = init_tracing(&config.logging, config.hardware.mode)?;
    tracing::info!(
        config = %path.display(),
        mode = ?config.hardware.mode,
        ledger = %config.api.base_url,
        log = ?sink,
        "Starting kiosk"
    );

    let ledger = HttpLedger::new(&config.api).context("Failed to create ledger client")?;

    match config.hardware.mode {
        HardwareMode::Console => {
            let (console, _guard) =
                Console::open(&config.hardware).context("Failed to set up terminal")?;
            let devices = Devices {
                buttons: Box::new(console.buttons()),
                bar: Box::new(console.display(PanelId::Bar)),
                customer: Box::new(console.display(PanelId::Customer)),
                keyboard: Some(Box::new(console.keyboard())),
                reader: Box::new(console.card_reader()),
            };
            serve(devices, ledger, config)
        }
        HardwareMode::Device => {
            let devices = open_devices(&config.hardware)?;
            serve(devices, ledger, config)
        }
    }
}

fn serve(devices: Devices, ledger: HttpLedger, config: Config) -> Result<()> {
    let mut controller = Controller::new(devices, ledger, config);
    match controller.run() {
        Ok(()) => Ok(()),
        Err(SessionError::Hardware(HardwareError::Interrupted)) => {
            tracing::info!("Interrupted, shutting down");
            Ok(())
        }
        Err(err) => Err(err).context("Kiosk stopped"),
    }
}

fn open_devices(hardware: &HardwareConfig) -> Result<Devices> {
    let bar = open_lcd("bar display", &hardware.bar)?;
    let customer = open_lcd("customer display", &hardware.customer)?;

    let reader: Box<dyn TokenReader> = match &hardware.reader.device {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open card reader {}", path.display()))?;
            Box::new(LineReader::new(
                path.display().to_string(),
                BufReader::new(file),
            ))
        }
        None => Box::new(LineReader::new("stdin", io::stdin().lock())),
    };

    Ok(Devices {
        buttons: Box::new(GpioButtons::new(&hardware.buttons)),
        bar: Box::new(bar),
        customer: Box::new(customer),
        keyboard: None,
        reader,
    })
}

fn open_lcd(name: &str, display: &DisplayConfig) -> Result<LcdDisplay<I2cBus>> {
    let bus = I2cBus::open(display.bus, display.address)
        .with_context(|| format!("Failed to open {}", name))?;
    let mut lcd = LcdDisplay::new(name, bus, display.cols, display.rows);
    lcd.init()
        .with_context(|| format!("Failed to initialise {}", name))?;
    Ok(lcd)
}
