use crate::hardware::RenderFrame;
use crate::menu::error::MenuError;
use crate::menu::variant::Variant;

const MARKER: &str = "> ";
const NO_MARKER: &str = "  ";

/// Pick one entry from a fixed list.
///
/// Each entry pairs a label with the value returned when it is confirmed,
/// so callers dispatch on values rather than comparing label text.
#[derive(Debug, Clone)]
pub struct ChoiceMenu<T = String> {
    description: String,
    choices: Vec<(String, T)>,
    visible_rows: Option<usize>,
}

impl ChoiceMenu<String> {
    /// A menu whose result is the confirmed label itself.
    pub fn new<I, L>(description: impl Into<String>, labels: I) -> Result<Self, MenuError>
    where
        I: IntoIterator<Item = L>,
        L: Into<String>,
    {
        Self::with_values(
            description,
            labels.into_iter().map(|label| {
                let label = label.into();
                (label.clone(), label)
            }),
        )
    }
}

impl<T: Clone> ChoiceMenu<T> {
    pub fn with_values<I, L>(description: impl Into<String>, choices: I) -> Result<Self, MenuError>
    where
        I: IntoIterator<Item = (L, T)>,
        L: Into<String>,
    {
        let choices: Vec<(String, T)> = choices
            .into_iter()
            .map(|(label, value)| (label.into(), value))
            .collect();
        if choices.is_empty() {
            return Err(MenuError::EmptyChoices);
        }
        Ok(Self {
            description: description.into(),
            choices,
            visible_rows: None,
        })
    }

    /// Limits how many choices are shown below the description; the list
    /// scrolls to keep the active one visible.
    pub fn with_visible_rows(mut self, rows: usize) -> Self {
        self.visible_rows = Some(rows.max(1));
        self
    }

    pub fn len(&self) -> usize {
        self.choices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }

    pub fn label(&self, index: usize) -> Option<&str> {
        self.choices.get(index).map(|(label, _)| label.as_str())
    }

    fn last(&self) -> usize {
        self.choices.len() - 1
    }

    fn window(&self, active: usize) -> std::ops::Range<usize> {
        let rows = self.visible_rows.unwrap_or(self.choices.len());
        if self.choices.len() <= rows {
            return 0..self.choices.len();
        }
        let start = (active + 1).saturating_sub(rows);
        start..start + rows
    }
}

impl<T: Clone> Variant for ChoiceMenu<T> {
    type State = usize;
    type Output = T;

    fn initial(&self) -> usize {
        0
    }

    fn render(&self, active: &usize) -> RenderFrame {
        let mut lines = Vec::with_capacity(self.choices.len() + 1);
        lines.push(self.description.clone());
        for index in self.window(*active) {
            let marker = if index == *active { MARKER } else { NO_MARKER };
            lines.push(format!("{}{}", marker, self.choices[index].0));
        }
        RenderFrame::new(lines)
    }

    fn on_increment(&self, active: &usize) -> usize {
        if *active >= self.last() {
            0
        } else {
            active + 1
        }
    }

    fn on_decrement(&self, active: &usize) -> usize {
        if *active == 0 {
            self.last()
        } else {
            active - 1
        }
    }

    fn finalize(&self, active: usize) -> T {
        self.choices[active.min(self.last())].1.clone()
    }
}
