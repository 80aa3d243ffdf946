//! Software rig for bring-up and testing.
//!
//! [`SimulatedRig`] stands in for both hardware handles: a
//! [`SimulatedSource`] that speaks the calibrator's line protocol against
//! a first-order thermal model, and [`SimulatedProbes`] that read the same
//! model through the acquisition seam. Both halves share one state, so a
//! session driven against them exercises the full protocol and pipeline
//! deterministically — no randomness, no hardware.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::error::{AcquisitionError, ProtocolError};
use crate::instrument::{AnalogInput, LineTransport};

/// Thermal model and probe parameters for the rig.
#[derive(Debug, Clone)]
pub struct SimSettings {
    /// Temperature the rig starts at, and decays toward with output off.
    pub ambient: f64,

    /// Fraction of the remaining error closed per polling tick.
    pub approach: f64,

    /// Band around the setpoint where the device reports itself stable.
    pub stable_band: f64,

    /// RTD model: `ohms = rtd_r0 + rtd_ohms_per_c · temperature`.
    ///
    /// The defaults invert [`RtdCalibration::default`], so the converted
    /// RTD temperature tracks the model temperature exactly.
    ///
    /// [`RtdCalibration::default`]: crate::config::RtdCalibration
    pub rtd_r0: f64,

    /// See [`SimSettings::rtd_r0`].
    pub rtd_ohms_per_c: f64,

    /// Per-probe linear response: `probe_i = gain_i · temperature + offset_i`.
    pub probe_gains: Vec<f64>,

    /// See [`SimSettings::probe_gains`].
    pub probe_offsets: Vec<f64>,
}

impl Default for SimSettings {
    fn default() -> Self {
        Self {
            ambient: 20.0,
            approach: 0.5,
            stable_band: 0.05,
            rtd_r0: 100.0,
            rtd_ohms_per_c: 0.385,
            probe_gains: vec![1.0],
            probe_offsets: vec![0.4],
        }
    }
}

#[derive(Debug)]
struct ThermalState {
    settings: SimSettings,
    temperature: f64,
    setpoint: f64,
    output_on: bool,
}

impl ThermalState {
    fn step(&mut self) {
        let target = if self.output_on {
            self.setpoint
        } else {
            self.settings.ambient
        };
        self.temperature += (target - self.temperature) * self.settings.approach;
    }

    fn device_stable(&self) -> bool {
        (self.temperature - self.setpoint).abs() < self.settings.stable_band
    }
}

/// Both halves of the software rig, sharing one thermal state.
pub struct SimulatedRig {
    state: Rc<RefCell<ThermalState>>,
}

impl SimulatedRig {
    /// Build a rig at ambient with the output off.
    pub fn new(settings: SimSettings) -> Self {
        let ambient = settings.ambient;
        Self {
            state: Rc::new(RefCell::new(ThermalState {
                settings,
                temperature: ambient,
                setpoint: ambient,
                output_on: false,
            })),
        }
    }

    /// The transport half, for [`ReferenceSource`].
    ///
    /// [`ReferenceSource`]: crate::instrument::ReferenceSource
    pub fn source(&self) -> SimulatedSource {
        SimulatedSource {
            state: Rc::clone(&self.state),
            replies: VecDeque::new(),
        }
    }

    /// The acquisition half.
    pub fn probes(&self) -> SimulatedProbes {
        SimulatedProbes {
            state: Rc::clone(&self.state),
            stopped: false,
        }
    }
}

/// Line-protocol half of the rig.
///
/// Understands the same dialect as the real device. The model advances one
/// tick per temperature query, which the acquirer issues exactly once per
/// poll.
pub struct SimulatedSource {
    state: Rc<RefCell<ThermalState>>,
    replies: VecDeque<String>,
}

impl LineTransport for SimulatedSource {
    fn write_line(&mut self, text: &str) -> Result<(), ProtocolError> {
        let mut state = self.state.borrow_mut();
        match text {
            "SOUR:SENS:DATA?" => {
                state.step();
                let reply = format!("{:.4}", state.temperature);
                self.replies.push_back(reply);
            }
            "SOUR:STAB:TEST?" => {
                let reply = if state.device_stable() { "1" } else { "0" };
                self.replies.push_back(reply.to_string());
            }
            "SOUR:SPO?" => {
                let reply = format!("{}", state.setpoint);
                self.replies.push_back(reply);
            }
            _ => {
                if let Some(rest) = text.strip_prefix("SOUR:SPO ") {
                    if let Ok(value) = rest.trim().parse::<f64>() {
                        state.setpoint = value;
                    }
                } else if let Some(rest) = text.strip_prefix("OUTP:STAT ") {
                    state.output_on = rest.trim() == "1";
                }
                // Unknown commands are swallowed, like the real device.
            }
        }
        Ok(())
    }

    fn read_line(&mut self) -> Result<String, ProtocolError> {
        self.replies.pop_front().ok_or_else(|| {
            ProtocolError::Io(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                "no reply pending",
            ))
        })
    }
}

/// Acquisition half of the rig.
pub struct SimulatedProbes {
    state: Rc<RefCell<ThermalState>>,
    stopped: bool,
}

impl SimulatedProbes {
    /// True once [`AnalogInput::stop`] has run.
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }
}

impl AnalogInput for SimulatedProbes {
    fn channel_count(&self) -> usize {
        1 + self.state.borrow().settings.probe_gains.len()
    }

    fn read_all(&mut self) -> Result<Vec<f64>, AcquisitionError> {
        if self.stopped {
            return Err(AcquisitionError::Read {
                message: "acquisition task stopped".to_string(),
            });
        }
        let state = self.state.borrow();
        let t = state.temperature;
        let mut channels =
            Vec::with_capacity(1 + state.settings.probe_gains.len());
        channels.push(state.settings.rtd_r0 + state.settings.rtd_ohms_per_c * t);
        for (gain, offset) in state
            .settings
            .probe_gains
            .iter()
            .zip(&state.settings.probe_offsets)
        {
            channels.push(gain * t + offset);
        }
        Ok(channels)
    }

    fn stop(&mut self) -> Result<(), AcquisitionError> {
        self.stopped = true;
        Ok(())
    }
}
