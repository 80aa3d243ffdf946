//! The calibration session state machine.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use crate::analysis::StabilityEvaluator;
use crate::config::Config;
use crate::error::SessionError;
use crate::instrument::{AnalogInput, LineTransport, ReferenceSource};
use crate::measurement::{SampleAcquirer, SlidingWindow};
use crate::types::{CalibrationPoint, SessionOutcome};

/// Where the per-setpoint machine currently is.
///
/// `Converge` commands the setpoint; `PollWait` sleeps one polling
/// interval, collects a sample, and pushes it to the window; `Evaluate`
/// runs the stability gate; `Record` promotes the freshest sample to a
/// calibration point. Once a point is recorded the machine never revisits
/// that setpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Converge,
    PollWait,
    Evaluate,
    Record,
}

/// What one target's machine produced.
enum TargetOutcome {
    Recorded,
    Interrupted,
}

/// One calibration run: owns both device handles, the sliding window, and
/// the growing calibration data set.
///
/// The session is single-threaded and fully synchronous; the only
/// cooperation point is the sleep between polls, where an external
/// interrupt (the shared flag from [`interrupt_flag`]) is honored. On any
/// exit — completion, error, or interrupt — call [`finish`] to tear the
/// rig down in order: stop acquisition, disable the source output, close
/// the transport.
///
/// [`interrupt_flag`]: CalibrationSession::interrupt_flag
/// [`finish`]: CalibrationSession::finish
pub struct CalibrationSession<T: LineTransport, A: AnalogInput> {
    acquirer: SampleAcquirer<T, A>,
    evaluator: StabilityEvaluator,
    window: SlidingWindow,
    points: Vec<CalibrationPoint>,
    config: Config,
    interrupt: Arc<AtomicBool>,
    last_bits: String,
}

impl<T: LineTransport, A: AnalogInput> CalibrationSession<T, A> {
    /// Build a session over an open transport and acquisition handle.
    pub fn new(transport: T, acquisition: A, config: Config) -> Self {
        let source = ReferenceSource::new(transport);
        let acquirer = SampleAcquirer::new(
            source,
            acquisition,
            config.rtd_calibration,
            config.channels.len(),
        );
        Self {
            acquirer,
            evaluator: StabilityEvaluator::from_config(&config),
            window: SlidingWindow::new(),
            points: Vec::new(),
            config,
            interrupt: Arc::new(AtomicBool::new(false)),
            last_bits: String::new(),
        }
    }

    /// Shared flag that aborts the session between polling iterations.
    ///
    /// Setting it never cancels an in-flight device exchange; the current
    /// poll completes (or errors) first.
    pub fn interrupt_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.interrupt)
    }

    /// Points recorded so far.
    pub fn points(&self) -> &[CalibrationPoint] {
        &self.points
    }

    /// Visit every target setpoint, recording one calibration point each.
    ///
    /// Errors terminate the run but leave already-recorded points in
    /// place; [`finish`](CalibrationSession::finish) must still be called.
    pub fn run(&mut self) -> Result<SessionOutcome, SessionError> {
        let targets = self.config.targets.resolve();
        tracing::info!(count = targets.len(), ?targets, "starting calibration");

        self.acquirer.source_mut().set_output(true)?;

        for (index, &target) in targets.iter().enumerate() {
            tracing::info!(
                setpoint = target,
                point = index + 1,
                of = targets.len(),
                "next setpoint"
            );
            match self.run_target(target)? {
                TargetOutcome::Recorded => {}
                TargetOutcome::Interrupted => {
                    tracing::warn!(recorded = self.points.len(), "session interrupted");
                    return Ok(SessionOutcome::Interrupted {
                        recorded: self.points.len(),
                        planned: targets.len(),
                    });
                }
            }
        }

        tracing::info!(recorded = self.points.len(), "calibration complete");
        Ok(SessionOutcome::Completed {
            recorded: self.points.len(),
        })
    }

    /// Drive the per-setpoint machine until a point is recorded.
    fn run_target(&mut self, target: f64) -> Result<TargetOutcome, SessionError> {
        let policy = crate::session::ConvergencePolicy::from(self.config.convergence);
        let mut step = Step::Converge;

        loop {
            step = match step {
                Step::Converge => {
                    policy.converge(self.acquirer.source_mut(), target)?;
                    // The window deliberately carries samples from the
                    // previous setpoint's settling tail; FIFO eviction
                    // flushes them as fresh samples arrive.
                    Step::PollWait
                }
                Step::PollWait => {
                    if self.interrupt.load(Ordering::SeqCst) {
                        return Ok(TargetOutcome::Interrupted);
                    }
                    // Sleeping before the poll keeps one tick from being
                    // evaluated twice.
                    thread::sleep(self.config.polling_interval());
                    let sample = self.acquirer.poll()?;
                    self.window.push(sample, self.config.window_capacity());
                    self.status_line();
                    Step::Evaluate
                }
                Step::Evaluate => {
                    let result = self.evaluator.evaluate(&self.window);
                    self.last_bits = result.bit_string();
                    if result.overall_stable {
                        Step::Record
                    } else {
                        Step::PollWait
                    }
                }
                Step::Record => {
                    if let Some(sample) = self.window.latest() {
                        let point = CalibrationPoint::from(sample);
                        tracing::info!(
                            rtd = point.rtd_temp,
                            probes = ?point.probe_temps,
                            "recording calibration point"
                        );
                        self.points.push(point);
                    }
                    return Ok(TargetOutcome::Recorded);
                }
            };
        }
    }

    /// Status line for the freshest sample.
    ///
    /// The bit pattern is from the previous evaluation; the fresh sample
    /// has not been evaluated yet when the line is emitted.
    fn status_line(&self) {
        if let Some(sample) = self.window.latest() {
            tracing::info!(
                "setpoint {:.3}  source {:.3}  rtd {:.3}  probe {:.3}  stability [{}]",
                sample.reference_setpoint,
                sample.reference_temp,
                sample.rtd_temp,
                sample.probe_temps.first().copied().unwrap_or(f64::NAN),
                self.last_bits,
            );
        }
    }

    /// Tear the rig down and return the recorded points.
    ///
    /// Order: stop acquisition, disable the source output, close the
    /// transport (by drop). Teardown failures are logged, not propagated —
    /// they must not mask the error that ended the session.
    pub fn finish(self) -> Vec<CalibrationPoint> {
        let Self {
            acquirer, points, ..
        } = self;
        let (mut source, mut acquisition) = acquirer.into_parts();

        if let Err(e) = acquisition.stop() {
            tracing::warn!(error = %e, "failed to stop acquisition");
        }
        if let Err(e) = source.set_output(false) {
            tracing::warn!(error = %e, "failed to disable source output");
        }
        drop(source);

        points
    }
}
