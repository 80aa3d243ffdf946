//! The exported calibration table.

use crate::statistics::{fit_line, LineFit};
use crate::types::CalibrationPoint;

/// Regression result for one probe channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelFit {
    /// Probe change per degree of reference change.
    pub slope: Option<f64>,

    /// Probe reading at a reference of zero.
    pub intercept: Option<f64>,
}

impl ChannelFit {
    fn undefined() -> Self {
        Self {
            slope: None,
            intercept: None,
        }
    }

    fn from_fit(fit: LineFit) -> Self {
        Self {
            slope: Some(fit.slope),
            intercept: Some(fit.intercept),
        }
    }
}

/// The full export: header, one row per calibration point, and the
/// per-channel regression appended as `Slope` and `Intercept` rows.
///
/// Column order is reference first, then each probe channel. Each probe
/// channel's recorded values are regressed against the reference values
/// across the whole data set; a channel with fewer than two recorded
/// points gets an undefined fit rather than failing the export.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationTable {
    /// Column names: `RTD`, then the configured channel names.
    pub header: Vec<String>,

    /// One row per calibration point, reference first.
    pub rows: Vec<Vec<f64>>,

    /// Regression per probe channel, header order.
    pub fits: Vec<ChannelFit>,
}

impl CalibrationTable {
    /// Build the table from the recorded points.
    pub fn from_points(points: &[CalibrationPoint], channel_names: &[String]) -> Self {
        let mut header = Vec::with_capacity(1 + channel_names.len());
        header.push("RTD".to_string());
        header.extend(channel_names.iter().cloned());

        let rows = points
            .iter()
            .map(|p| {
                let mut row = Vec::with_capacity(1 + p.probe_temps.len());
                row.push(p.rtd_temp);
                row.extend(p.probe_temps.iter().copied());
                row
            })
            .collect();

        let fits = (0..channel_names.len())
            .map(|channel| {
                let mut reference = Vec::with_capacity(points.len());
                let mut probe = Vec::with_capacity(points.len());
                for point in points {
                    if let Some(value) = point.probe_temps.get(channel) {
                        reference.push(point.rtd_temp);
                        probe.push(*value);
                    }
                }
                match fit_line(&reference, &probe) {
                    Some(fit) => ChannelFit::from_fit(fit),
                    None => ChannelFit::undefined(),
                }
            })
            .collect();

        Self { header, rows, fits }
    }
}
