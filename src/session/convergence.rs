//! Setpoint convergence against the reference source.

use std::thread;
use std::time::Duration;

use crate::config::ConvergenceSettings;
use crate::error::ConvergenceError;
use crate::instrument::{LineTransport, ReferenceSource};

/// Commands a setpoint and confirms the device accepted it.
///
/// Protocol: write the setpoint command, then poll the echoed setpoint
/// until it matches within `tolerance`. Every mismatch re-issues the
/// command and backs off briefly before the next readback. The loop is
/// bounded by `max_attempts` so a non-settling device fails instead of
/// blocking the session forever.
#[derive(Debug, Clone, Copy)]
pub struct ConvergencePolicy {
    /// Maximum accepted |readback − target|.
    pub tolerance: f64,

    /// Pause before each re-query after a mismatch.
    pub backoff: Duration,

    /// Readback attempts before giving up.
    pub max_attempts: u32,
}

impl From<ConvergenceSettings> for ConvergencePolicy {
    fn from(settings: ConvergenceSettings) -> Self {
        Self {
            tolerance: settings.tolerance,
            backoff: Duration::from_millis(settings.backoff_ms),
            max_attempts: settings.max_attempts.max(1),
        }
    }
}

impl ConvergencePolicy {
    /// Drive `source` to `target`, blocking until the echoed setpoint
    /// matches. Returns the accepted readback.
    pub fn converge<T: LineTransport>(
        &self,
        source: &mut ReferenceSource<T>,
        target: f64,
    ) -> Result<f64, ConvergenceError> {
        source.write_setpoint(target)?;
        let mut readback = source.read_setpoint()?;
        let mut attempts = 1u32;

        while (readback - target).abs() > self.tolerance {
            if attempts >= self.max_attempts {
                return Err(ConvergenceError::AttemptsExhausted {
                    target,
                    last_readback: readback,
                    attempts,
                });
            }
            source.write_setpoint(target)?;
            thread::sleep(self.backoff);
            readback = source.read_setpoint()?;
            attempts += 1;
        }

        tracing::debug!(setpoint = target, readback, attempts, "setpoint accepted");
        Ok(readback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProtocolError;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    /// Plays back queued replies and logs writes to a shared handle.
    struct ScriptedTransport {
        writes: Rc<RefCell<Vec<String>>>,
        replies: VecDeque<String>,
    }

    impl ScriptedTransport {
        fn new(replies: &[&str]) -> (Self, Rc<RefCell<Vec<String>>>) {
            let writes = Rc::new(RefCell::new(Vec::new()));
            let transport = Self {
                writes: writes.clone(),
                replies: replies.iter().map(|r| r.to_string()).collect(),
            };
            (transport, writes)
        }
    }

    impl LineTransport for ScriptedTransport {
        fn write_line(&mut self, text: &str) -> Result<(), ProtocolError> {
            self.writes.borrow_mut().push(text.to_string());
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

    fn policy() -> ConvergencePolicy {
        ConvergencePolicy {
            tolerance: 0.005,
            backoff: Duration::from_millis(0),
            max_attempts: 3,
        }
    }

    #[test]
    fn accepts_first_matching_readback() {
        let (transport, writes) = ScriptedTransport::new(&["50.0"]);
        let mut source = ReferenceSource::new(transport);
        let readback = policy().converge(&mut source, 50.0).unwrap();
        assert_eq!(readback, 50.0);
        assert_eq!(*writes.borrow(), vec!["SOUR:SPO 50", "SOUR:SPO?"]);
    }

    #[test]
    fn within_tolerance_counts_as_accepted() {
        let (transport, _) = ScriptedTransport::new(&["50.004"]);
        let mut source = ReferenceSource::new(transport);
        assert!(policy().converge(&mut source, 50.0).is_ok());
    }

    #[test]
    fn reissues_command_until_the_echo_matches() {
        let (transport, writes) = ScriptedTransport::new(&["25.0", "25.0", "75.0"]);
        let mut source = ReferenceSource::new(transport);
        let readback = policy().converge(&mut source, 75.0).unwrap();
        assert_eq!(readback, 75.0);
        assert_eq!(
            *writes.borrow(),
            vec![
                "SOUR:SPO 75",
                "SOUR:SPO?",
                "SOUR:SPO 75",
                "SOUR:SPO?",
                "SOUR:SPO 75",
                "SOUR:SPO?",
            ]
        );
    }

    #[test]
    fn exhausts_attempts_on_a_non_settling_device() {
        let (transport, _) = ScriptedTransport::new(&["25.0", "25.0", "25.0", "25.0"]);
        let mut source = ReferenceSource::new(transport);
        let err = policy().converge(&mut source, 75.0).unwrap_err();
        assert!(matches!(
            err,
            ConvergenceError::AttemptsExhausted { attempts: 3, .. }
        ));
    }
}
