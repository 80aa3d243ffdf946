//! The reference source's command set.
//!
//! Queries and commands are closed unions rather than free-form strings:
//! each query kind knows its wire token and how to decode its reply, so a
//! reply can never be applied to the wrong field.

use crate::error::ProtocolError;

/// A query the reference source answers with one CR-terminated reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceQuery {
    /// The source's own temperature reading.
    Temperature,

    /// The source's self-reported stability flag (`"0"`/`"1"`).
    StabilityCheck,

    /// The currently accepted setpoint.
    Setpoint,
}

impl SourceQuery {
    /// The fixed query order of one polling tick.
    pub const POLL_ORDER: [SourceQuery; 3] = [
        SourceQuery::Temperature,
        SourceQuery::StabilityCheck,
        SourceQuery::Setpoint,
    ];

    /// Wire token for this query, without the terminator.
    pub const fn token(self) -> &'static str {
        match self {
            SourceQuery::Temperature => "SOUR:SENS:DATA?",
            SourceQuery::StabilityCheck => "SOUR:STAB:TEST?",
            SourceQuery::Setpoint => "SOUR:SPO?",
        }
    }

    /// Decode this query's reply text into a typed reading.
    pub fn decode(self, raw: &str) -> Result<SourceReading, ProtocolError> {
        let text = raw.trim();
        match self {
            SourceQuery::Temperature => {
                parse_finite(self, text).map(SourceReading::Temperature)
            }
            SourceQuery::Setpoint => parse_finite(self, text).map(SourceReading::Setpoint),
            SourceQuery::StabilityCheck => match text {
                "0" => Ok(SourceReading::Stable(false)),
                "1" => Ok(SourceReading::Stable(true)),
                _ => Err(malformed(self, raw)),
            },
        }
    }
}

/// A command the reference source accepts without replying.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SourceCommand {
    /// Command a new setpoint temperature.
    SetSetpoint(f64),

    /// Enable or disable the heater output.
    OutputEnabled(bool),
}

impl SourceCommand {
    /// Encode the command as wire text, without the terminator.
    pub fn encode(self) -> String {
        match self {
            SourceCommand::SetSetpoint(value) => format!("SOUR:SPO {}", value),
            SourceCommand::OutputEnabled(true) => "OUTP:STAT 1".to_string(),
            SourceCommand::OutputEnabled(false) => "OUTP:STAT 0".to_string(),
        }
    }
}

/// A decoded reply from the reference source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SourceReading {
    /// Reply to [`SourceQuery::Temperature`].
    Temperature(f64),

    /// Reply to [`SourceQuery::StabilityCheck`].
    Stable(bool),

    /// Reply to [`SourceQuery::Setpoint`].
    Setpoint(f64),
}

fn parse_finite(query: SourceQuery, text: &str) -> Result<f64, ProtocolError> {
    match text.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(malformed(query, text)),
    }
}

fn malformed(query: SourceQuery, raw: &str) -> ProtocolError {
    ProtocolError::MalformedReply {
        query: query.token(),
        raw: raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_match_the_device_dialect() {
        assert_eq!(SourceQuery::Temperature.token(), "SOUR:SENS:DATA?");
        assert_eq!(SourceQuery::StabilityCheck.token(), "SOUR:STAB:TEST?");
        assert_eq!(SourceQuery::Setpoint.token(), "SOUR:SPO?");
    }

    #[test]
    fn decodes_numeric_replies() {
        assert_eq!(
            SourceQuery::Temperature.decode("49.987").unwrap(),
            SourceReading::Temperature(49.987)
        );
        assert_eq!(
            SourceQuery::Setpoint.decode(" 50.0 ").unwrap(),
            SourceReading::Setpoint(50.0)
        );
    }

    #[test]
    fn decodes_stability_flag() {
        assert_eq!(
            SourceQuery::StabilityCheck.decode("1").unwrap(),
            SourceReading::Stable(true)
        );
        assert_eq!(
            SourceQuery::StabilityCheck.decode("0").unwrap(),
            SourceReading::Stable(false)
        );
        assert!(SourceQuery::StabilityCheck.decode("2").is_err());
    }

    #[test]
    fn rejects_malformed_and_non_finite_numerics() {
        assert!(SourceQuery::Temperature.decode("").is_err());
        assert!(SourceQuery::Temperature.decode("abc").is_err());
        assert!(SourceQuery::Temperature.decode("NaN").is_err());
        assert!(SourceQuery::Setpoint.decode("inf").is_err());
    }

    #[test]
    fn encodes_commands() {
        assert_eq!(SourceCommand::SetSetpoint(50.0).encode(), "SOUR:SPO 50");
        assert_eq!(SourceCommand::SetSetpoint(37.5).encode(), "SOUR:SPO 37.5");
        assert_eq!(SourceCommand::OutputEnabled(true).encode(), "OUTP:STAT 1");
        assert_eq!(SourceCommand::OutputEnabled(false).encode(), "OUTP:STAT 0");
    }
}
