//! Core data types shared across the calibration pipeline.

use serde::{Deserialize, Serialize};

/// One polling observation of the whole rig.
///
/// Immutable once created; ordering is arrival order. `rtd_temp` is already
/// converted from raw resistance, so every field is in degrees Celsius.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Reference source's own temperature reading.
    pub reference_temp: f64,

    /// Setpoint the source echoed back during this tick.
    pub reference_setpoint: f64,

    /// Device-reported stability flag.
    pub reference_stable: bool,

    /// Reference RTD temperature, converted from resistance.
    pub rtd_temp: f64,

    /// Thermocouple readings, one per configured channel, fixed arity.
    pub probe_temps: Vec<f64>,
}

impl Sample {
    /// Number of regression channels in this sample (RTD plus probes).
    pub fn channel_count(&self) -> usize {
        1 + self.probe_temps.len()
    }

    /// Value of a regression channel: index 0 is the RTD, 1..=N the probes.
    pub fn channel(&self, index: usize) -> Option<f64> {
        if index == 0 {
            Some(self.rtd_temp)
        } else {
            self.probe_temps.get(index - 1).copied()
        }
    }
}

/// A sample accepted as stable for one target setpoint.
///
/// Reference-channel-first: the RTD temperature, then each probe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationPoint {
    /// Reference RTD temperature at the moment of acceptance.
    pub rtd_temp: f64,

    /// Probe temperatures, same order as the configured channels.
    pub probe_temps: Vec<f64>,
}

impl From<&Sample> for CalibrationPoint {
    fn from(sample: &Sample) -> Self {
        Self {
            rtd_temp: sample.rtd_temp,
            probe_temps: sample.probe_temps.clone(),
        }
    }
}

/// Outcome of one stability evaluation over the sliding window.
///
/// Channel order is RTD first, then each thermocouple. A slope of `None`
/// means the regression was undefined (fewer than two samples, or the
/// device-flag veto skipped regression entirely) and always reads unstable.
#[derive(Debug, Clone, PartialEq)]
pub struct StabilityResult {
    /// True iff every channel passed and the device reported stable.
    pub overall_stable: bool,

    /// Fitted slope per channel, `None` where undefined.
    pub channel_slopes: Vec<Option<f64>>,

    /// Per-channel pass bit, same order as `channel_slopes`.
    pub channel_bits: Vec<bool>,
}

impl StabilityResult {
    /// All-channels-unstable result for an empty window.
    pub fn empty() -> Self {
        Self {
            overall_stable: false,
            channel_slopes: Vec::new(),
            channel_bits: Vec::new(),
        }
    }

    /// Result for a tick the device itself reported unstable.
    ///
    /// Regression is skipped and every slope is undefined: the device flag
    /// is a hard veto, and the regression only ever refines a device-stable
    /// reading. See `StabilityEvaluator` for the precedence note.
    pub fn vetoed(channel_count: usize) -> Self {
        Self {
            overall_stable: false,
            channel_slopes: vec![None; channel_count],
            channel_bits: vec![false; channel_count],
        }
    }

    /// Render the per-channel bits as a compact `10…`-style pattern.
    pub fn bit_string(&self) -> String {
        self.channel_bits
            .iter()
            .map(|&b| if b { '1' } else { '0' })
            .collect()
    }
}

/// How a finished session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Every target setpoint was visited and recorded.
    Completed {
        /// Calibration points recorded, one per target.
        recorded: usize,
    },

    /// An external interrupt stopped the session between polls.
    ///
    /// Points recorded before the interrupt are preserved.
    Interrupted {
        /// Calibration points recorded before the interrupt.
        recorded: usize,
        /// Targets the session was asked to visit.
        planned: usize,
    },
}

impl SessionOutcome {
    /// Points recorded by the session, however it ended.
    pub fn recorded(&self) -> usize {
        match *self {
            SessionOutcome::Completed { recorded } => recorded,
            SessionOutcome::Interrupted { recorded, .. } => recorded,
        }
    }
}
