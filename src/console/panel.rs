use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::hardware::RenderFrame;

pub const PANEL_BORDER: Color = Color::Rgb(0x40, 0x40, 0x40);
pub const ATTENTION_BORDER: Color = Color::Rgb(0xda, 0x77, 0x56);
pub const PANEL_TEXT: Color = Color::Rgb(0x9a, 0xe6, 0x5c);
pub const HINT_TEXT: Color = Color::Rgb(0x6b, 0x72, 0x80);

/// Character buffer of one simulated display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Panel {
    title: String,
    cols: usize,
    rows: Vec<String>,
    attention: bool,
}

impl Panel {
    pub fn new(title: impl Into<String>, cols: u8, rows: u8) -> Self {
        let cols = usize::from(cols);
        Self {
            title: title.into(),
            cols,
            rows: vec![" ".repeat(cols); usize::from(rows)],
            attention: false,
        }
    }

    /// Same placement rules as the LCD: lines start at column 0 of their
    /// row and anything below the last row is dropped.
    pub fn write(&mut self, frame: &RenderFrame) {
        let first = frame.first_row();
        for (offset, line) in frame.lines.iter().enumerate() {
            let Some(row) = self.rows.get_mut(first + offset) else {
                break;
            };
            *row = fit(line, self.cols);
        }
    }

    pub fn clear(&mut self) {
        for row in &mut self.rows {
            *row = " ".repeat(self.cols);
        }
    }

    pub fn set_attention(&mut self, on: bool) {
        self.attention = on;
    }

    pub fn attention(&self) -> bool {
        self.attention
    }

    /// Outer size including the border.
    pub fn size(&self) -> (u16, u16) {
        let width = u16::try_from(self.cols).unwrap_or(u16::MAX).saturating_add(2);
        let height = u16::try_from(self.rows.len()).unwrap_or(u16::MAX).saturating_add(2);
        (width, height)
    }

    pub fn widget(&self) -> Paragraph<'_> {
        let border = if self.attention {
            ATTENTION_BORDER
        } else {
            PANEL_BORDER
        };
        let lines: Vec<Line<'_>> = self.rows.iter().map(|row| Line::raw(row.as_str())).collect();
        Paragraph::new(lines)
            .style(Style::default().fg(PANEL_TEXT))
            .block(
                Block::default()
                    .title(self.title.as_str())
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(border)),
            )
    }
}

fn fit(line: &str, cols: usize) -> String {
    let mut fitted: String = line
        .chars()
        .take(cols)
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    let width = fitted.chars().count();
    fitted.extend(std::iter::repeat(' ').take(cols - width));
    fitted
}
