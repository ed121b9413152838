use crate::config::Messages;
use crate::hardware::RenderFrame;

/// A resolved card holder with current balances.
#[derive(Debug, Clone, PartialEq)]
pub struct Customer {
    pub card_uid: String,
    /// Anonymous coffee cards have no account.
    pub username: Option<String>,
    pub intern: bool,
    pub vouchers: f64,
    pub coffee: f64,
}

impl Customer {
    /// Operator view: name and intern vouchers for interns, then coffee.
    pub fn bar_frame(&self, messages: &Messages) -> RenderFrame {
        let mut lines = Vec::with_capacity(3);
        if self.intern {
            let name = self.username.as_deref().unwrap_or_default();
            lines.push(Messages::fill(&messages.name_line, &[("name", name)]));
        }
        lines.extend(self.balance_lines(messages));
        RenderFrame::new(lines)
    }

    /// Customer view. Never shows the name.
    pub fn customer_frame(&self, messages: &Messages) -> RenderFrame {
        RenderFrame::new(self.balance_lines(messages))
    }

    fn balance_lines(&self, messages: &Messages) -> Vec<String> {
        let mut lines = Vec::with_capacity(2);
        if self.intern {
            lines.push(Messages::fill(
                &messages.vouchers_line,
                &[("vouchers", whole(self.vouchers).as_str())],
            ));
        }
        lines.push(Messages::fill(
            &messages.coffee_line,
            &[("coffee", whole(self.coffee).as_str())],
        ));
        lines
    }
}

/// Balances are shown as whole vouchers, right-aligned to two digits.
fn whole(balance: f64) -> String {
    format!("{:2}", balance.trunc() as i64)
}
