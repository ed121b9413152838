use crate::hardware::HardwareError;

/// One screenful of text produced by a menu.
///
/// Frames compare by content, so the engine can skip writes when nothing
/// visible changed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RenderFrame {
    pub lines: Vec<String>,
    /// First display row to write to. `None` means the top row.
    pub start_line: Option<u8>,
}

impl RenderFrame {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            start_line: None,
        }
    }

    /// Splits on newlines, so messages from config can span rows.
    pub fn text(text: &str) -> Self {
        Self::new(text.split('\n'))
    }

    pub fn starting_at(mut self, line: u8) -> Self {
        self.start_line = Some(line);
        self
    }

    pub fn first_row(&self) -> usize {
        self.start_line.map(usize::from).unwrap_or(0)
    }
}

/// A cursor-addressed character display.
///
/// A frame's lines are written top to bottom within one call.
pub trait RenderSink {
    fn write_frame(&mut self, frame: &RenderFrame) -> Result<(), HardwareError>;

    fn clear(&mut self) -> Result<(), HardwareError>;

    /// Blinking cursor used as a cue while text entry is active.
    fn set_attention_cursor(&mut self, on: bool) -> Result<(), HardwareError>;
}

impl<S: RenderSink + ?Sized> RenderSink for &mut S {
    fn write_frame(&mut self, frame: &RenderFrame) -> Result<(), HardwareError> {
        (**self).write_frame(frame)
    }

    fn clear(&mut self) -> Result<(), HardwareError> {
        (**self).clear()
    }

    fn set_attention_cursor(&mut self, on: bool) -> Result<(), HardwareError> {
        (**self).set_attention_cursor(on)
    }
}

impl<S: RenderSink + ?Sized> RenderSink for Box<S> {
    fn write_frame(&mut self, frame: &RenderFrame) -> Result<(), HardwareError> {
        (**self).write_frame(frame)
    }

    fn clear(&mut self) -> Result<(), HardwareError> {
        (**self).clear()
    }

    fn set_attention_cursor(&mut self, on: bool) -> Result<(), HardwareError> {
        (**self).set_attention_cursor(on)
    }
}

/// Mirrors every call onto several displays, in order.
pub struct Fanout<'a> {
    sinks: Vec<&'a mut dyn RenderSink>,
}

impl<'a> Fanout<'a> {
    pub fn new(sinks: Vec<&'a mut dyn RenderSink>) -> Self {
        Self { sinks }
    }
}

impl RenderSink for Fanout<'_> {
    fn write_frame(&mut self, frame: &RenderFrame) -> Result<(), HardwareError> {
        for sink in self.sinks.iter_mut() {
            sink.write_frame(frame)?;
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<(), HardwareError> {
        for sink in self.sinks.iter_mut() {
            sink.clear()?;
        }
        Ok(())
    }

    fn set_attention_cursor(&mut self, on: bool) -> Result<(), HardwareError> {
        for sink in self.sinks.iter_mut() {
            sink.set_attention_cursor(on)?;
        }
        Ok(())
    }
}
