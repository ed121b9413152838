use std::thread;
use std::time::Duration;

use uuid::Uuid;

use crate::config::{Config, Messages};
use crate::hardware::{
    ButtonSource, CharSource, Fanout, HardwareError, RenderFrame, RenderSink, TokenReader,
};
use crate::ledger::{CardInfo, Ledger, Spend, User};
use crate::menu::{ChoiceMenu, CounterMenu, MenuEngine, TextEntryMenu, Variant};
use crate::session::customer::Customer;
use crate::session::error::SessionError;

/// The kiosk's physical devices.
pub struct Devices {
    pub buttons: Box<dyn ButtonSource>,
    /// Operator display.
    pub bar: Box<dyn RenderSink>,
    /// Customer-facing display.
    pub customer: Box<dyn RenderSink>,
    /// Attached keyboard, if any. Text entry falls back to the buttons.
    pub keyboard: Option<Box<dyn CharSource>>,
    pub reader: Box<dyn TokenReader>,
}

/// What the operator picked in the main menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Withdraw,
    BuyCoffee,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VoucherKind {
    Intern,
    Coffee,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UnknownCard {
    Register,
    Cancel,
}

/// Sequences menus into the withdraw and top-up workflows.
pub struct Controller<L> {
    devices: Devices,
    ledger: L,
    config: Config,
    poll_interval: Duration,
}

impl<L: Ledger> Controller<L> {
    pub fn new(devices: Devices, ledger: L, config: Config) -> Self {
        let poll_interval = Duration::from_millis(config.menu.poll_interval_ms);
        Self {
            devices,
            ledger,
            config,
            poll_interval,
        }
    }

    pub fn into_devices(self) -> Devices {
        self.devices
    }

    fn messages(&self) -> &Messages {
        &self.config.messages
    }

    /// Serves customers until a hardware fault.
    ///
    /// Ledger failures are shown on both displays and the kiosk returns to
    /// the main menu.
    pub fn run(&mut self) -> Result<(), SessionError> {
        let loading = RenderFrame::text(&self.messages().loading);
        self.show_both(&loading)?;
        loop {
            if let Err(err) = self.serve_once() {
                if !err.is_recoverable() {
                    return Err(err);
                }
                tracing::error!("Session aborted: {}", err);
                let notice = RenderFrame::text(&self.messages().service_error);
                self.show_both(&notice)?;
                self.pause(self.config.session.notice_seconds);
            }
        }
    }

    /// Runs the main menu and the workflow picked there. Returns the
    /// action, or `None` if the main menu was cancelled.
    pub fn serve_once(&mut self) -> Result<Option<Action>, SessionError> {
        let messages = self.messages();
        let menu = ChoiceMenu::with_values(
            messages.main_menu.clone(),
            [
                (messages.withdraw.clone(), Action::Withdraw),
                (messages.buy_coffee.clone(), Action::BuyCoffee),
            ],
        )?;
        let Some(action) = self.run_on_bar(menu)? else {
            return Ok(None);
        };

        let session_id = Uuid::new_v4();
        let span = tracing::info_span!("session", id = %session_id, action = ?action);
        let _enter = span.enter();
        tracing::info!("Session started");

        match action {
            Action::Withdraw => self.withdraw()?,
            Action::BuyCoffee => self.buy_coffee()?,
        }
        tracing::info!("Session finished");
        Ok(Some(action))
    }

    fn withdraw(&mut self) -> Result<(), SessionError> {
        let card_uid = self.read_card()?;
        let Some(customer) = self.resolve_customer(&card_uid)? else {
            return Ok(());
        };
        self.show_customer(&customer)?;

        let Some(amount) = self.ask_amount()? else {
            tracing::info!("Withdrawal cancelled");
            return Ok(());
        };

        let kind = if customer.intern {
            let messages = self.messages();
            let menu = ChoiceMenu::with_values(
                messages.voucher_type.clone(),
                [
                    (messages.intern_voucher.clone(), VoucherKind::Intern),
                    (messages.coffee_voucher.clone(), VoucherKind::Coffee),
                ],
            )?;
            match self.run_on_bar(menu)? {
                Some(kind) => kind,
                None => return Ok(()),
            }
        } else {
            VoucherKind::Coffee
        };

        let amount_text = amount.to_string();
        let withdrawing = Messages::fill(
            &self.messages().withdrawing,
            &[("amount", amount_text.as_str())],
        );
        self.show_both(&RenderFrame::text(&withdrawing))?;

        let spend = match (kind, customer.username.as_deref()) {
            (VoucherKind::Intern, Some(username)) => self.ledger.use_vouchers(username, amount)?,
            _ => self.ledger.use_coffee_vouchers(&card_uid, amount)?,
        };
        tracing::info!(amount, ?kind, ?spend, "Withdrawal");

        let outcome = match spend {
            Spend::Accepted => {
                Messages::fill(&self.messages().withdrawn, &[("amount", amount_text.as_str())])
            }
            Spend::Insufficient => {
                tracing::warn!(amount, "Not enough vouchers");
                self.messages().insufficient.clone()
            }
        };
        self.finish(&outcome)
    }

    fn buy_coffee(&mut self) -> Result<(), SessionError> {
        let card_uid = self.read_card()?;
        if self.resolve_customer(&card_uid)?.is_none() {
            return Ok(());
        }

        let amount = self.config.session.coffee_card_vouchers;
        let amount_text = amount.to_string();
        let adding =
            Messages::fill(&self.messages().adding, &[("amount", amount_text.as_str())]);
        self.show_both(&RenderFrame::text(&adding))?;

        let added = self.ledger.add_coffee_vouchers(&card_uid, amount)?;
        tracing::info!(amount, added, "Coffee vouchers bought");
        let outcome = if added {
            Messages::fill(&self.messages().added, &[("amount", amount_text.as_str())])
        } else {
            tracing::warn!(amount, "Ledger refused coffee vouchers");
            self.messages().add_failed.clone()
        };
        self.finish(&outcome)
    }

    fn read_card(&mut self) -> Result<String, SessionError> {
        let waiting = RenderFrame::text(&self.messages().waiting_for_card);
        self.show_both(&waiting)?;
        let card_uid = self.devices.reader.read_token()?;
        tracing::info!(card = %card_uid, "Card presented");
        Ok(card_uid)
    }

    /// Looks up the card, offering registration when it is unknown, and
    /// fetches balances. `None` when the operator gives up.
    fn resolve_customer(&mut self, card_uid: &str) -> Result<Option<Customer>, SessionError> {
        let info = match self.ledger.card_info(card_uid)? {
            Some(info) => info,
            None => {
                tracing::info!(card = %card_uid, "Unknown card");
                let rejected = RenderFrame::text(&self.messages().not_accepted);
                self.devices.customer.clear()?;
                self.devices.customer.write_frame(&rejected)?;

                let messages = self.messages();
                let menu = ChoiceMenu::with_values(
                    messages.unknown_card.clone(),
                    [
                        (messages.register.clone(), UnknownCard::Register),
                        (messages.cancel.clone(), UnknownCard::Cancel),
                    ],
                )?;
                if self.run_on_bar(menu)? != Some(UnknownCard::Register) {
                    return Ok(None);
                }
                match self.register(card_uid)? {
                    Some(info) => info,
                    None => return Ok(None),
                }
            }
        };

        let vouchers = match (info.intern, info.username.as_deref()) {
            (true, Some(username)) => self.ledger.voucher_balance(username)?,
            _ => 0.0,
        };
        let coffee = self.ledger.coffee_balance(card_uid)?;
        Ok(Some(Customer {
            card_uid: card_uid.to_string(),
            username: info.username,
            intern: info.intern,
            vouchers,
            coffee,
        }))
    }

    /// Registers an unknown card, tied to an intern's account or anonymous.
    fn register(&mut self, card_uid: &str) -> Result<Option<CardInfo>, SessionError> {
        let messages = self.messages();
        let menu = ChoiceMenu::with_values(
            messages.intern_question.clone(),
            [(messages.yes.clone(), true), (messages.no.clone(), false)],
        )?;
        let Some(intern) = self.run_on_bar(menu)? else {
            return Ok(None);
        };

        let user = if intern {
            match self.ask_user()? {
                Some(user) => Some(user),
                None => return Ok(None),
            }
        } else {
            None
        };

        let registering = RenderFrame::text(&self.messages().registering_card);
        self.show_both(&registering)?;
        let user_id = user.as_ref().map(|user| user.id);
        if !self.ledger.register_card(card_uid, user_id, intern)? {
            tracing::warn!(card = %card_uid, "Card registration refused");
            let failed = RenderFrame::text(&self.messages().registration_failed);
            self.show_both(&failed)?;
            self.pause(self.config.session.notice_seconds);
            return Ok(None);
        }

        tracing::info!(card = %card_uid, intern, "Card registered");
        let registered = RenderFrame::text(&self.messages().card_registered);
        self.show_both(&registered)?;
        self.pause(self.config.session.notice_seconds);
        Ok(Some(CardInfo {
            username: user.map(|user| user.username),
            intern,
        }))
    }

    /// Asks for a username on both displays until the ledger knows it.
    /// An empty or cancelled entry gives up.
    fn ask_user(&mut self) -> Result<Option<User>, SessionError> {
        loop {
            let prompt = self.messages().username.clone();
            let poll_interval = self.poll_interval;
            let entered = {
                let devices = &mut self.devices;
                let mut menu = match devices.keyboard.as_deref_mut() {
                    Some(keyboard) => TextEntryMenu::with_keyboard(prompt, keyboard)?,
                    None => TextEntryMenu::new(prompt)?,
                };
                let both = Fanout::new(vec![
                    &mut *devices.bar as &mut dyn RenderSink,
                    &mut *devices.customer as &mut dyn RenderSink,
                ]);
                MenuEngine::new(&mut *devices.buttons, both)
                    .with_poll_interval(poll_interval)
                    .run(&mut menu)?
            };
            let username = entered.unwrap_or_default();
            if username.is_empty() {
                return Ok(None);
            }

            match self.ledger.find_user(&username)? {
                Some(user) => return Ok(Some(user)),
                None => {
                    tracing::info!(username = %username, "User not found");
                    let not_found = RenderFrame::text(&self.messages().user_not_found);
                    self.show_both(&not_found)?;
                    self.pause(self.config.session.notice_seconds);
                }
            }
        }
    }

    /// Amount counter on the bottom row of the bar, under the customer info.
    fn ask_amount(&mut self) -> Result<Option<u32>, SessionError> {
        let row = self.config.hardware.bar.rows.saturating_sub(1);
        let mut menu = CounterMenu::new(self.messages().amount_prompt.clone())?.below(row);
        if let Some(ceiling) = self.config.menu.max_amount {
            menu = menu.with_ceiling(ceiling);
        }
        let amount = self.run_menu_on_bar(&mut menu)?;
        Ok(amount.filter(|amount| *amount > 0))
    }

    fn show_customer(&mut self, customer: &Customer) -> Result<(), HardwareError> {
        let messages = &self.config.messages;
        let bar = customer.bar_frame(messages);
        let shown = customer.customer_frame(messages);
        self.devices.bar.clear()?;
        self.devices.bar.write_frame(&bar)?;
        self.devices.customer.clear()?;
        self.devices.customer.write_frame(&shown)
    }

    /// Shows the outcome and counts down before returning to the menu.
    fn finish(&mut self, outcome: &str) -> Result<(), SessionError> {
        self.show_both(&RenderFrame::text(outcome))?;
        for remaining in (1..=self.config.session.result_seconds).rev() {
            let tick = RenderFrame::new([remaining.to_string()]).starting_at(1);
            self.devices.bar.write_frame(&tick)?;
            self.devices.customer.write_frame(&tick)?;
            thread::sleep(Duration::from_secs(1));
        }
        Ok(())
    }

    /// Choice menus are sized to the bar, leaving the top row for the
    /// description.
    fn run_on_bar<T: Clone>(&mut self, menu: ChoiceMenu<T>) -> Result<Option<T>, SessionError> {
        let rows = usize::from(self.config.hardware.bar.rows.saturating_sub(1));
        let mut menu = menu.with_visible_rows(rows);
        self.run_menu_on_bar(&mut menu)
    }

    fn run_menu_on_bar<V: Variant>(
        &mut self,
        menu: &mut V,
    ) -> Result<Option<V::Output>, SessionError> {
        let mut engine = MenuEngine::new(&mut *self.devices.buttons, &mut *self.devices.bar)
            .with_poll_interval(self.poll_interval);
        Ok(engine.run(menu)?)
    }

    fn show_both(&mut self, frame: &RenderFrame) -> Result<(), HardwareError> {
        for sink in [&mut self.devices.bar, &mut self.devices.customer] {
            sink.clear()?;
            sink.write_frame(frame)?;
        }
        Ok(())
    }

    fn pause(&self, seconds: u32) {
        if seconds > 0 {
            thread::sleep(Duration::from_secs(u64::from(seconds)));
        }
    }
}
