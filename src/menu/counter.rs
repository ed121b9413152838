use crate::hardware::RenderFrame;
use crate::menu::error::MenuError;
use crate::menu::variant::Variant;

/// Step a non-negative quantity up and down.
///
/// Confirming returns the quantity, including 0; only CANCEL yields no
/// result. There is no upper bound unless [`with_ceiling`](Self::with_ceiling)
/// sets one.
#[derive(Debug, Clone)]
pub struct CounterMenu {
    prompt: String,
    ceiling: Option<u32>,
    start_line: Option<u8>,
    keep_screen: bool,
}

impl CounterMenu {
    pub fn new(prompt: impl Into<String>) -> Result<Self, MenuError> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(MenuError::EmptyPrompt);
        }
        Ok(Self {
            prompt,
            ceiling: None,
            start_line: None,
            keep_screen: false,
        })
    }

    pub fn with_ceiling(mut self, ceiling: u32) -> Self {
        self.ceiling = Some(ceiling);
        self
    }

    /// Draws on `line` and leaves the rest of the display as it was, so
    /// information shown before the menu stays visible.
    pub fn below(mut self, line: u8) -> Self {
        self.start_line = Some(line);
        self.keep_screen = true;
        self
    }
}

impl Variant for CounterMenu {
    type State = u32;
    type Output = u32;

    fn initial(&self) -> u32 {
        0
    }

    fn render(&self, value: &u32) -> RenderFrame {
        let frame = RenderFrame::new([format!("{}: {:2}", self.prompt, value)]);
        match self.start_line {
            Some(line) => frame.starting_at(line),
            None => frame,
        }
    }

    fn on_increment(&self, value: &u32) -> u32 {
        let next = value.saturating_add(1);
        match self.ceiling {
            Some(ceiling) => next.min(ceiling),
            None => next,
        }
    }

    fn on_decrement(&self, value: &u32) -> u32 {
        value.saturating_sub(1)
    }

    fn finalize(&self, value: u32) -> u32 {
        value
    }

    fn clears_display(&self) -> bool {
        !self.keep_screen
    }
}
