//! CR-framed ASCII line transport.

use std::io::{Read, Write};
use std::time::Duration;

use crate::config::SerialSettings;
use crate::error::ProtocolError;

/// The line protocol spoken by the reference source.
///
/// A command is a text token with a single trailing carriage return and no
/// other framing; a reply is read byte-by-byte until a carriage return,
/// terminator excluded. Implementations block, subject only to their
/// byte-level timeout.
pub trait LineTransport {
    /// Transmit `text` followed by the CR terminator.
    fn write_line(&mut self, text: &str) -> Result<(), ProtocolError>;

    /// Read one reply, stopping at (and discarding) the CR terminator.
    fn read_line(&mut self) -> Result<String, ProtocolError>;
}

/// [`LineTransport`] over a serial port.
pub struct SerialTransport {
    port: Box<dyn serialport::SerialPort>,
}

impl SerialTransport {
    /// Open the port described by `settings`.
    pub fn open(settings: &SerialSettings) -> Result<Self, ProtocolError> {
        let port = serialport::new(&settings.port, settings.baud_rate)
            .timeout(Duration::from_millis(settings.byte_timeout_ms))
            .stop_bits(serialport::StopBits::One)
            .open()?;
        tracing::debug!(port = %settings.port, baud = settings.baud_rate, "serial port open");
        Ok(Self { port })
    }
}

impl LineTransport for SerialTransport {
    fn write_line(&mut self, text: &str) -> Result<(), ProtocolError> {
        let mut framed = String::with_capacity(text.len() + 1);
        framed.push_str(text);
        framed.push('\r');
        self.port.write_all(framed.as_bytes())?;
        Ok(())
    }

    fn read_line(&mut self) -> Result<String, ProtocolError> {
        let mut text = String::new();
        let mut byte = [0u8; 1];
        loop {
            self.port.read_exact(&mut byte)?;
            if byte[0] == b'\r' {
                return Ok(text);
            }
            text.push(char::from(byte[0]));
        }
    }
}
