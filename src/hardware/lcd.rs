//! Serial character-LCD controller protocol.
//!
//! The controller takes short ASCII commands followed by binary arguments:
//!
//! | command | bytes                                  |
//! |---------|----------------------------------------|
//! | clear   | `CL`                                   |
//! | text    | `TT` text `0x00`                       |
//! | cursor  | `TP` col row                           |
//! | blink   | `CS` 0/1                               |
//! | size    | `STCR` cols rows `0x80 0xC0 0x94 0xD4` |

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::os::unix::io::AsRawFd;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use crate::hardware::{HardwareError, RenderFrame, RenderSink};

/// Time the controller needs to digest a text command.
pub const DEFAULT_SETTLE: Duration = Duration::from_millis(50);

/// DDRAM start address of each row on a four-row controller.
const ROW_OFFSETS: [u8; 4] = [0x80, 0xC0, 0x94, 0xD4];

pub struct LcdDisplay<W> {
    name: String,
    port: W,
    cols: u8,
    rows: u8,
    settle: Duration,
}

impl<W: Write> LcdDisplay<W> {
    pub fn new(name: impl Into<String>, port: W, cols: u8, rows: u8) -> Self {
        Self {
            name: name.into(),
            port,
            cols,
            rows,
            settle: DEFAULT_SETTLE,
        }
    }

    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    /// Sends geometry, hides the cursor and clears the screen.
    pub fn init(&mut self) -> Result<(), HardwareError> {
        let mut command = vec![b'S', b'T', b'C', b'R', self.cols, self.rows];
        command.extend_from_slice(&ROW_OFFSETS);
        self.raw(&command)?;
        self.set_blink(false)?;
        self.clean()
    }

    pub fn into_inner(self) -> W {
        self.port
    }

    fn raw(&mut self, bytes: &[u8]) -> Result<(), HardwareError> {
        self.port
            .write_all(bytes)
            .and_then(|_| self.port.flush())
            .map_err(|e| HardwareError::io(self.name.clone(), e))
    }

    fn clean(&mut self) -> Result<(), HardwareError> {
        self.raw(b"CL")
    }

    fn set_pointer(&mut self, col: u8, row: u8) -> Result<(), HardwareError> {
        self.raw(&[b'T', b'P', col, row])
    }

    fn set_blink(&mut self, on: bool) -> Result<(), HardwareError> {
        self.raw(&[b'C', b'S', u8::from(on)])
    }

    fn write_text(&mut self, text: &[u8]) -> Result<(), HardwareError> {
        let mut command = Vec::with_capacity(text.len() + 3);
        command.extend_from_slice(b"TT");
        command.extend_from_slice(text);
        command.push(0);
        self.raw(&command)?;
        if !self.settle.is_zero() {
            thread::sleep(self.settle);
        }
        Ok(())
    }
}

/// Maps a line onto exactly `cols` controller bytes.
///
/// NUL terminates a text command and anything outside printable ASCII is
/// not in the controller's font, so both are replaced.
fn encode_line(line: &str, cols: u8) -> Vec<u8> {
    let mut bytes: Vec<u8> = line
        .chars()
        .take(cols as usize)
        .map(|c| match c {
            ' '..='~' => c as u8,
            c if c.is_control() => b' ',
            _ => b'?',
        })
        .collect();
    bytes.resize(cols as usize, b' ');
    bytes
}

impl<W: Write> RenderSink for LcdDisplay<W> {
    fn write_frame(&mut self, frame: &RenderFrame) -> Result<(), HardwareError> {
        let first = frame.first_row();
        for (offset, line) in frame.lines.iter().enumerate() {
            let row = first + offset;
            if row >= self.rows as usize {
                break;
            }
            self.set_pointer(0, row as u8)?;
            let text = encode_line(line, self.cols);
            self.write_text(&text)?;
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<(), HardwareError> {
        self.clean()
    }

    fn set_attention_cursor(&mut self, on: bool) -> Result<(), HardwareError> {
        self.set_blink(on)
    }
}

/// Linux `i2c-dev` handle bound to one slave address.
pub struct I2cBus {
    file: File,
}

/// `I2C_SLAVE` from `linux/i2c-dev.h`.
const I2C_SLAVE: libc::c_ulong = 0x0703;

impl I2cBus {
    pub fn open(bus: u8, address: u16) -> Result<Self, HardwareError> {
        let path = PathBuf::from(format!("/dev/i2c-{}", bus));
        let device = format!("{}@{:#04x}", path.display(), address);
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|e| HardwareError::io(device.clone(), e))?;

        // SAFETY: the descriptor is owned by `file` and stays open for the call.
        let rc = unsafe { libc::ioctl(file.as_raw_fd(), I2C_SLAVE as _, address as libc::c_ulong) };
        if rc < 0 {
            return Err(HardwareError::io(device, io::Error::last_os_error()));
        }
        Ok(Self { file })
    }
}

impl Write for I2cBus {
    /// The controller expects one byte per bus transaction.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for byte in buf {
            self.file.write_all(std::slice::from_ref(byte))?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}
