//! # thermocal
//!
//! Drive an automated thermocouple-calibration run against a reference
//! temperature source.
//!
//! The library commands a calibrator to a sequence of setpoints, polls a
//! reference RTD probe and one or more thermocouple channels, decides when
//! the assembly has reached thermal equilibrium via sliding-window
//! regression, and records matched (reference, probe) readings. A final
//! per-channel regression across the recorded points yields the slope and
//! intercept that map each probe onto the reference.
//!
//! ## Hardware seams
//!
//! Two traits isolate the hardware:
//!
//! - [`LineTransport`](instrument::LineTransport) — the CR-framed ASCII
//!   line protocol spoken by the reference source. [`SerialTransport`]
//!   implements it over a serial port; the [`sim`] module implements it
//!   against a software thermal model.
//! - [`AnalogInput`](instrument::AnalogInput) — "read all configured
//!   channels" on the acquisition hardware: index 0 is the raw RTD
//!   resistance in ohms, the rest are thermocouple temperatures in °C.
//!   Implement this for your DAQ binding to run against real probes.
//!
//! ## Quick start
//!
//! ```ignore
//! use thermocal::{CalibrationSession, CalibrationTable, Config, SerialTransport};
//!
//! let config = Config::from_path("thermocal.json".as_ref())?;
//! let transport = SerialTransport::open(&config.serial)?;
//! let mut session = CalibrationSession::new(transport, my_daq, config.clone());
//!
//! let outcome = session.run()?;
//! let points = session.finish();
//! let table = CalibrationTable::from_points(&points, &config.channels);
//! thermocal::output::write_csv(&table, "calibration.csv".as_ref())?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analysis;
pub mod config;
pub mod error;
pub mod instrument;
pub mod measurement;
pub mod output;
pub mod session;
pub mod sim;
pub mod statistics;
pub mod types;

pub use config::{Config, ConvergenceSettings, RtdCalibration, SerialSettings, TargetPlan};
pub use error::{
    AcquisitionError, ConvergenceError, ExportError, ProtocolError, SessionError,
};
pub use instrument::{AnalogInput, LineTransport, ReferenceSource, SerialTransport};
pub use measurement::{SampleAcquirer, SlidingWindow};
pub use analysis::{StabilityEvaluator, StabilityThresholds};
pub use output::{write_csv, CalibrationTable};
pub use session::{CalibrationSession, ConvergencePolicy, SessionOutcome};
pub use types::{CalibrationPoint, Sample, StabilityResult};
