//! Configuration for a calibration session.
//!
//! A [`Config`] can be built in code with the builder-style setters or
//! loaded from a JSON file with [`Config::from_path`]. `validate()` should
//! be called before handing the configuration to a session.

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::session::points::generate_points;

/// Serial-port parameters for the reference source transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialSettings {
    /// Port name, e.g. `/dev/ttyUSB0` or `COM3`.
    pub port: String,

    /// Line rate. The reference source speaks 9600 baud.
    pub baud_rate: u32,

    /// Per-byte read timeout in milliseconds.
    ///
    /// This is the only timeout in the protocol; there is no bound on a
    /// full query/response cycle beyond it.
    pub byte_timeout_ms: u64,
}

impl Default for SerialSettings {
    fn default() -> Self {
        Self {
            port: "/dev/ttyUSB0".to_string(),
            baud_rate: 9600,
            byte_timeout_ms: 100,
        }
    }
}

/// Quadratic RTD resistance-to-temperature calibration.
///
/// `temperature = quadratic·r² + linear·r + constant` with `r` in ohms.
/// The conversion is pure, deterministic, and continuous.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct RtdCalibration {
    /// Second-order coefficient.
    pub quadratic: f64,

    /// First-order coefficient.
    pub linear: f64,

    /// Constant term.
    pub constant: f64,
}

impl Default for RtdCalibration {
    fn default() -> Self {
        // Linearized PT100: r = 100 Ω + 0.385 Ω/°C inverted.
        Self {
            quadratic: 0.0,
            linear: 1.0 / 0.385,
            constant: -100.0 / 0.385,
        }
    }
}

impl RtdCalibration {
    /// Convert a raw resistance reading in ohms to degrees Celsius.
    pub fn convert(&self, resistance: f64) -> f64 {
        self.quadratic * resistance * resistance + self.linear * resistance + self.constant
    }
}

/// Setpoint-convergence knobs.
///
/// The readback loop is bounded: an unresponsive device fails with
/// `ConvergenceError::AttemptsExhausted` instead of blocking forever.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvergenceSettings {
    /// Maximum |readback − target| accepted as converged, in °C.
    pub tolerance: f64,

    /// Delay between a re-issued setpoint command and the next readback.
    pub backoff_ms: u64,

    /// Readback attempts before giving up.
    pub max_attempts: u32,
}

impl Default for ConvergenceSettings {
    fn default() -> Self {
        Self {
            tolerance: 0.005,
            backoff_ms: 5,
            max_attempts: 2000,
        }
    }
}

/// Where the target setpoints come from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum TargetPlan {
    /// An explicit list, visited in the given order.
    Points {
        /// Setpoint temperatures in °C.
        points: Vec<f64>,
    },

    /// Evenly spaced points reordered excursion-first.
    Generate {
        /// Lowest setpoint, inclusive.
        min_temp: f64,
        /// Highest setpoint, inclusive.
        max_temp: f64,
        /// Number of points across the span.
        count: usize,
    },
}

impl Default for TargetPlan {
    fn default() -> Self {
        TargetPlan::Generate {
            min_temp: 30.0,
            max_temp: 120.0,
            count: 7,
        }
    }
}

impl TargetPlan {
    /// Resolve the plan into the concrete visiting order.
    ///
    /// Deterministic; the result is read-only for the rest of the session.
    pub fn resolve(&self) -> Vec<f64> {
        match self {
            TargetPlan::Points { points } => points.clone(),
            TargetPlan::Generate {
                min_temp,
                max_temp,
                count,
            } => generate_points(*min_temp, *max_temp, *count),
        }
    }
}

/// Full session configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Serial transport to the reference source.
    pub serial: SerialSettings,

    /// Seconds between polling ticks.
    pub polling_interval_secs: f64,

    /// Span of the stability window in seconds.
    ///
    /// Window capacity is `floor(stability_time / polling_interval)`,
    /// minimum 1, recomputed from these fields on every push.
    pub stability_time_secs: f64,

    /// Maximum |slope| per tick for the RTD channel to count as stable.
    pub rtd_slope_threshold: f64,

    /// Maximum |slope| per tick for each thermocouple channel.
    pub thermocouple_slope_threshold: f64,

    /// RTD resistance-to-temperature conversion.
    pub rtd_calibration: RtdCalibration,

    /// Thermocouple channel names, in acquisition order.
    ///
    /// These become the export column headers after the `RTD` column.
    pub channels: Vec<String>,

    /// Target setpoints to visit.
    pub targets: TargetPlan,

    /// Setpoint convergence behavior.
    pub convergence: ConvergenceSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            serial: SerialSettings::default(),
            polling_interval_secs: 1.0,
            stability_time_secs: 60.0,
            rtd_slope_threshold: 0.005,
            thermocouple_slope_threshold: 0.01,
            rtd_calibration: RtdCalibration::default(),
            channels: vec!["TC0".to_string()],
            targets: TargetPlan::default(),
            convergence: ConvergenceSettings::default(),
        }
    }
}

impl Config {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration from a JSON file.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&text)?;
        Ok(config)
    }

    /// Set the polling interval in seconds.
    pub fn polling_interval_secs(mut self, secs: f64) -> Self {
        self.polling_interval_secs = secs;
        self
    }

    /// Set the stability window span in seconds.
    pub fn stability_time_secs(mut self, secs: f64) -> Self {
        self.stability_time_secs = secs;
        self
    }

    /// Set the RTD slope threshold.
    pub fn rtd_slope_threshold(mut self, threshold: f64) -> Self {
        self.rtd_slope_threshold = threshold;
        self
    }

    /// Set the thermocouple slope threshold.
    pub fn thermocouple_slope_threshold(mut self, threshold: f64) -> Self {
        self.thermocouple_slope_threshold = threshold;
        self
    }

    /// Set the thermocouple channel names.
    pub fn channels(mut self, names: Vec<String>) -> Self {
        self.channels = names;
        self
    }

    /// Set the target plan.
    pub fn targets(mut self, targets: TargetPlan) -> Self {
        self.targets = targets;
        self
    }

    /// Polling interval as a [`Duration`].
    pub fn polling_interval(&self) -> Duration {
        Duration::from_secs_f64(self.polling_interval_secs)
    }

    /// Sliding-window capacity derived from the current settings.
    ///
    /// `floor(stability_time / polling_interval)`, never less than 1.
    pub fn window_capacity(&self) -> usize {
        let capacity = (self.stability_time_secs / self.polling_interval_secs).floor();
        if capacity.is_finite() && capacity >= 1.0 {
            capacity as usize
        } else {
            1
        }
    }

    /// Check the configuration for values a session cannot run with.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.polling_interval_secs > 0.0) {
            return Err("polling_interval_secs must be positive".to_string());
        }
        if self.stability_time_secs < self.polling_interval_secs {
            return Err(
                "stability_time_secs must be at least one polling interval".to_string(),
            );
        }
        if !(self.rtd_slope_threshold > 0.0) {
            return Err("rtd_slope_threshold must be positive".to_string());
        }
        if !(self.thermocouple_slope_threshold > 0.0) {
            return Err("thermocouple_slope_threshold must be positive".to_string());
        }
        if self.channels.is_empty() {
            return Err("at least one thermocouple channel is required".to_string());
        }
        if !(self.convergence.tolerance > 0.0) {
            return Err("convergence.tolerance must be positive".to_string());
        }
        if self.convergence.max_attempts == 0 {
            return Err("convergence.max_attempts must be positive".to_string());
        }
        match &self.targets {
            TargetPlan::Points { points } => {
                if points.is_empty() {
                    return Err("targets.points must not be empty".to_string());
                }
            }
            TargetPlan::Generate {
                min_temp,
                max_temp,
                count,
            } => {
                if *count < 2 {
                    return Err("targets.count must be at least 2".to_string());
                }
                if !(max_temp > min_temp) {
                    return Err("targets.max_temp must exceed targets.min_temp".to_string());
                }
            }
        }
        Ok(())
    }
}

/// Error loading a configuration file.
#[derive(Debug)]
pub enum ConfigError {
    /// The file could not be read.
    Io(io::Error),

    /// The file was not valid JSON for a [`Config`].
    Parse(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "cannot read config: {}", e),
            ConfigError::Parse(e) => write!(f, "cannot parse config: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
        }
    }
}

impl From<io::Error> for ConfigError {
    fn from(e: io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn window_capacity_floors_and_clamps() {
        let config = Config::new()
            .polling_interval_secs(1.0)
            .stability_time_secs(60.0);
        assert_eq!(config.window_capacity(), 60);

        let config = Config::new()
            .polling_interval_secs(7.0)
            .stability_time_secs(60.0);
        assert_eq!(config.window_capacity(), 8);

        // Shorter than one interval would floor to zero; clamp to one.
        let mut config = Config::default();
        config.stability_time_secs = 0.5;
        config.polling_interval_secs = 1.0;
        assert_eq!(config.window_capacity(), 1);
    }

    #[test]
    fn validation_rejects_bad_values() {
        let mut config = Config::default();
        config.polling_interval_secs = 0.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.stability_time_secs = 0.1;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.channels.clear();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.targets = TargetPlan::Points { points: Vec::new() };
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.targets = TargetPlan::Generate {
            min_temp: 0.0,
            max_temp: 100.0,
            count: 1,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rtd_conversion_is_quadratic() {
        let cal = RtdCalibration {
            quadratic: 2.0,
            linear: 3.0,
            constant: 4.0,
        };
        assert_eq!(cal.convert(0.0), 4.0);
        assert_eq!(cal.convert(1.0), 9.0);
        assert_eq!(cal.convert(2.0), 18.0);
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(back.channels, config.channels);
        assert_eq!(back.polling_interval_secs, config.polling_interval_secs);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"polling_interval_secs": 2.0}"#).unwrap();
        assert_eq!(config.polling_interval_secs, 2.0);
        assert_eq!(config.stability_time_secs, 60.0);
        assert!(!config.channels.is_empty());
    }
}
