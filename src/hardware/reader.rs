use std::io::BufRead;

use crate::hardware::HardwareError;

/// Source of customer identifier tokens (card UIDs).
pub trait TokenReader {
    /// Blocks until a token is presented.
    fn read_token(&mut self) -> Result<String, HardwareError>;
}

impl<T: TokenReader + ?Sized> TokenReader for Box<T> {
    fn read_token(&mut self) -> Result<String, HardwareError> {
        (**self).read_token()
    }
}

/// Reads one token per line, as emitted by keyboard-emulating card readers
/// or a reader daemon writing to a pipe.
pub struct LineReader<R> {
    device: String,
    input: R,
}

impl<R: BufRead> LineReader<R> {
    pub fn new(device: impl Into<String>, input: R) -> Self {
        Self {
            device: device.into(),
            input,
        }
    }
}

impl<R: BufRead> TokenReader for LineReader<R> {
    fn read_token(&mut self) -> Result<String, HardwareError> {
        let mut line = String::new();
        loop {
            line.clear();
            let read = self
                .input
                .read_line(&mut line)
                .map_err(|e| HardwareError::io(self.device.clone(), e))?;
            if read == 0 {
                return Err(HardwareError::disconnected(self.device.clone()));
            }
            let token = line.trim();
            if token.is_empty() {
                continue;
            }
            if !is_card_uid(token) {
                tracing::warn!(device = %self.device, len = token.len(), "Ignoring non-hex token");
                continue;
            }
            tracing::debug!(device = %self.device, "Token presented");
            return Ok(token.to_ascii_lowercase());
        }
    }
}

/// Card UIDs are hex strings; anything else is reader noise.
fn is_card_uid(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn skips_blank_lines_and_lowercases() {
        let mut reader = LineReader::new("test", Cursor::new("\n  \nFE633B01\r\n04a1\n"));
        assert_eq!(reader.read_token().unwrap(), "fe633b01");
        assert_eq!(reader.read_token().unwrap(), "04a1");
    }

    #[test]
    fn non_hex_lines_are_skipped() {
        let mut reader = LineReader::new("test", Cursor::new("../../core/NFC?x=\nFE63\n"));
        assert_eq!(reader.read_token().unwrap(), "fe63");
    }

    #[test]
    fn end_of_input_is_a_disconnect() {
        let mut reader = LineReader::new("test", Cursor::new(""));
        assert!(matches!(
            reader.read_token(),
            Err(HardwareError::Disconnected { .. })
        ));
    }
}
