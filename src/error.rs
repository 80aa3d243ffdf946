//! Error types for the calibration session and its collaborators.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Error talking the ASCII line protocol to the reference source.
///
/// Covers transport failures (the port itself) and malformed replies. A
/// byte-level read timeout surfaces here as `Io`: the protocol has no
/// application-level timeout, so a silent device fails the first byte read.
#[derive(Debug)]
pub enum ProtocolError {
    /// The underlying port failed to open or configure.
    Port(serialport::Error),

    /// Byte-level I/O failure, including per-byte read timeouts.
    Io(io::Error),

    /// The device replied, but the text did not decode for this query.
    MalformedReply {
        /// Wire token of the query that produced the reply.
        query: &'static str,
        /// The raw reply text, terminator excluded.
        raw: String,
    },
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::Port(e) => write!(f, "serial port error: {}", e),
            ProtocolError::Io(e) => write!(f, "transport I/O error: {}", e),
            ProtocolError::MalformedReply { query, raw } => {
                write!(f, "malformed reply to {}: {:?}", query, raw)
            }
        }
    }
}

impl std::error::Error for ProtocolError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProtocolError::Port(e) => Some(e),
            ProtocolError::Io(e) => Some(e),
            ProtocolError::MalformedReply { .. } => None,
        }
    }
}

impl From<io::Error> for ProtocolError {
    fn from(e: io::Error) -> Self {
        ProtocolError::Io(e)
    }
}

impl From<serialport::Error> for ProtocolError {
    fn from(e: serialport::Error) -> Self {
        ProtocolError::Port(e)
    }
}

/// Error reading the multi-channel acquisition hardware.
#[derive(Debug)]
pub enum AcquisitionError {
    /// The collaborator's read failed.
    Read {
        /// Backend-specific description of the failure.
        message: String,
    },

    /// The read returned the wrong number of channels.
    ///
    /// The channel set is fixed for the lifetime of a session; a mismatch
    /// means a miswired task and is not recoverable.
    ChannelArity {
        /// Channels the session was configured for (RTD included).
        expected: usize,
        /// Channels the read actually returned.
        got: usize,
    },
}

impl fmt::Display for AcquisitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AcquisitionError::Read { message } => {
                write!(f, "acquisition read failed: {}", message)
            }
            AcquisitionError::ChannelArity { expected, got } => {
                write!(
                    f,
                    "acquisition returned {} channels, expected {}",
                    got, expected
                )
            }
        }
    }
}

impl std::error::Error for AcquisitionError {}

/// Error driving the reference source to a commanded setpoint.
#[derive(Debug)]
pub enum ConvergenceError {
    /// Protocol failure while commanding or reading back the setpoint.
    Protocol(ProtocolError),

    /// The echoed setpoint never matched the target within tolerance.
    AttemptsExhausted {
        /// The commanded setpoint.
        target: f64,
        /// The last setpoint the device echoed back.
        last_readback: f64,
        /// Number of readback attempts made.
        attempts: u32,
    },
}

impl fmt::Display for ConvergenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConvergenceError::Protocol(e) => write!(f, "setpoint convergence: {}", e),
            ConvergenceError::AttemptsExhausted {
                target,
                last_readback,
                attempts,
            } => write!(
                f,
                "setpoint {:.3} not accepted after {} attempts (last readback {:.3})",
                target, attempts, last_readback
            ),
        }
    }
}

impl std::error::Error for ConvergenceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConvergenceError::Protocol(e) => Some(e),
            ConvergenceError::AttemptsExhausted { .. } => None,
        }
    }
}

impl From<ProtocolError> for ConvergenceError {
    fn from(e: ProtocolError) -> Self {
        ConvergenceError::Protocol(e)
    }
}

/// Error writing the calibration table to its destination.
///
/// Always retryable: the table is built in memory and nothing is consumed
/// by a failed write, so the caller may re-invoke the write after the
/// operator frees the destination.
#[derive(Debug)]
pub enum ExportError {
    /// The destination could not be created or written.
    Io {
        /// Destination path.
        path: PathBuf,
        /// Underlying I/O failure.
        source: io::Error,
    },
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::Io { path, source } => {
                write!(f, "cannot write {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExportError::Io { source, .. } => Some(source),
        }
    }
}

/// Umbrella error for a running calibration session.
///
/// None of these are recovered locally: they terminate the session, though
/// teardown (stop acquisition, disable output, close transport) still runs.
#[derive(Debug)]
pub enum SessionError {
    /// Line-protocol failure against the reference source.
    Protocol(ProtocolError),

    /// Acquisition hardware failure.
    Acquisition(AcquisitionError),

    /// Setpoint convergence failure.
    Convergence(ConvergenceError),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Protocol(e) => write!(f, "{}", e),
            SessionError::Acquisition(e) => write!(f, "{}", e),
            SessionError::Convergence(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::Protocol(e) => Some(e),
            SessionError::Acquisition(e) => Some(e),
            SessionError::Convergence(e) => Some(e),
        }
    }
}

impl From<ProtocolError> for SessionError {
    fn from(e: ProtocolError) -> Self {
        SessionError::Protocol(e)
    }
}

impl From<AcquisitionError> for SessionError {
    fn from(e: AcquisitionError) -> Self {
        SessionError::Acquisition(e)
    }
}

impl From<ConvergenceError> for SessionError {
    fn from(e: ConvergenceError) -> Self {
        SessionError::Convergence(e)
    }
}
