//! Typed driver for the reference temperature source.

use crate::error::ProtocolError;
use crate::instrument::command::{SourceCommand, SourceQuery, SourceReading};
use crate::instrument::transport::LineTransport;

/// Decoded readings accumulated over one polling tick.
///
/// Each reply updates the field its query owns, so a tick that issues the
/// full [`SourceQuery::POLL_ORDER`] sequence fills every field.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SourceStatus {
    /// Source's own temperature reading.
    pub temperature: f64,

    /// Device-reported stability flag.
    pub stable: bool,

    /// Echoed setpoint.
    pub setpoint: f64,
}

impl SourceStatus {
    /// Fold one decoded reading into the status.
    pub fn apply(&mut self, reading: SourceReading) {
        match reading {
            SourceReading::Temperature(value) => self.temperature = value,
            SourceReading::Stable(value) => self.stable = value,
            SourceReading::Setpoint(value) => self.setpoint = value,
        }
    }
}

/// The reference calibrator, driven over a [`LineTransport`].
///
/// Owns the transport exclusively for the session's lifetime; dropping the
/// source closes the transport.
pub struct ReferenceSource<T: LineTransport> {
    transport: T,
}

impl<T: LineTransport> ReferenceSource<T> {
    /// Wrap a transport.
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Issue one query and decode its reply.
    pub fn query(&mut self, query: SourceQuery) -> Result<SourceReading, ProtocolError> {
        self.transport.write_line(query.token())?;
        let raw = self.transport.read_line()?;
        query.decode(&raw)
    }

    /// Issue one write-only command. The device does not reply.
    pub fn command(&mut self, command: SourceCommand) -> Result<(), ProtocolError> {
        self.transport.write_line(&command.encode())
    }

    /// Run the full fixed-order query sequence of one polling tick.
    ///
    /// Commands are issued and replies consumed strictly in
    /// [`SourceQuery::POLL_ORDER`]; the protocol does not support
    /// reordering or interleaving.
    pub fn poll_status(&mut self) -> Result<SourceStatus, ProtocolError> {
        let mut status = SourceStatus::default();
        for query in SourceQuery::POLL_ORDER {
            status.apply(self.query(query)?);
        }
        Ok(status)
    }

    /// Read back the currently accepted setpoint.
    pub fn read_setpoint(&mut self) -> Result<f64, ProtocolError> {
        let mut status = SourceStatus::default();
        status.apply(self.query(SourceQuery::Setpoint)?);
        Ok(status.setpoint)
    }

    /// Command a new setpoint. Acceptance is confirmed separately by
    /// reading the echoed setpoint back.
    pub fn write_setpoint(&mut self, target: f64) -> Result<(), ProtocolError> {
        self.command(SourceCommand::SetSetpoint(target))
    }

    /// Enable or disable the heater output.
    pub fn set_output(&mut self, enabled: bool) -> Result<(), ProtocolError> {
        tracing::debug!(enabled, "source output");
        self.command(SourceCommand::OutputEnabled(enabled))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Transport that records writes and plays back queued replies.
    struct ScriptedTransport {
        writes: Vec<String>,
        replies: VecDeque<String>,
    }

    impl ScriptedTransport {
        fn new(replies: &[&str]) -> Self {
            Self {
                writes: Vec::new(),
                replies: replies.iter().map(|r| r.to_string()).collect(),
            }
        }
    }

    impl LineTransport for ScriptedTransport {
        fn write_line(&mut self, text: &str) -> Result<(), ProtocolError> {
            self.writes.push(text.to_string());
            Ok(())
        }

        fn read_line(&mut self) -> Result<String, ProtocolError> {
            self.replies.pop_front().ok_or_else(|| {
                ProtocolError::Io(std::io::Error::new(
                    std::io::ErrorKind::TimedOut,
                    "no scripted reply",
                ))
            })
        }
    }

    #[test]
    fn poll_status_issues_queries_in_fixed_order() {
        let transport = ScriptedTransport::new(&["49.9", "1", "50.0"]);
        let mut source = ReferenceSource::new(transport);

        let status = source.poll_status().unwrap();
        assert_eq!(status.temperature, 49.9);
        assert!(status.stable);
        assert_eq!(status.setpoint, 50.0);

        assert_eq!(
            source.transport.writes,
            vec!["SOUR:SENS:DATA?", "SOUR:STAB:TEST?", "SOUR:SPO?"]
        );
    }

    #[test]
    fn malformed_reply_is_a_protocol_error() {
        let transport = ScriptedTransport::new(&["not-a-number"]);
        let mut source = ReferenceSource::new(transport);
        assert!(matches!(
            source.query(SourceQuery::Temperature),
            Err(ProtocolError::MalformedReply { .. })
        ));
    }

    #[test]
    fn commands_do_not_consume_replies() {
        let transport = ScriptedTransport::new(&[]);
        let mut source = ReferenceSource::new(transport);
        source.write_setpoint(75.0).unwrap();
        source.set_output(false).unwrap();
        assert_eq!(source.transport.writes, vec!["SOUR:SPO 75", "OUTP:STAT 0"]);
    }
}
