//! CSV rendering for the calibration table.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::ExportError;
use crate::output::table::CalibrationTable;

/// Render the table as CSV text: header, data rows, then the `Slope` and
/// `Intercept` rows. Undefined regression entries render as `NaN`.
pub fn render_csv(table: &CalibrationTable) -> String {
    let mut out = String::new();

    out.push_str(&table.header.join(","));
    out.push('\n');

    for row in &table.rows {
        let cells: Vec<String> = row.iter().map(|v| format_value(*v)).collect();
        out.push_str(&cells.join(","));
        out.push('\n');
    }

    out.push_str(&coefficient_row(
        "Slope",
        table.fits.iter().map(|f| f.slope),
    ));
    out.push_str(&coefficient_row(
        "Intercept",
        table.fits.iter().map(|f| f.intercept),
    ));

    out
}

/// Write the table to `path`.
///
/// A failure (destination locked, directory missing, permissions) is
/// returned rather than handled: the table stays intact in memory and the
/// caller decides when to retry.
pub fn write_csv(table: &CalibrationTable, path: &Path) -> Result<(), ExportError> {
    let io_err = |source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(io_err)?;
    let mut out = BufWriter::new(file);
    out.write_all(render_csv(table).as_bytes()).map_err(io_err)?;
    out.flush().map_err(io_err)?;
    Ok(())
}

fn coefficient_row(label: &str, values: impl Iterator<Item = Option<f64>>) -> String {
    let mut cells = vec![label.to_string()];
    cells.extend(values.map(|v| match v {
        Some(value) => format_value(value),
        None => "NaN".to_string(),
    }));
    let mut row = cells.join(",");
    row.push('\n');
    row
}

fn format_value(value: f64) -> String {
    if value.is_finite() {
        format!("{:.6}", value)
    } else {
        "NaN".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CalibrationPoint;

    fn table() -> CalibrationTable {
        let points = vec![
            CalibrationPoint {
                rtd_temp: 0.0,
                probe_temps: vec![1.0],
            },
            CalibrationPoint {
                rtd_temp: 50.0,
                probe_temps: vec![101.0],
            },
            CalibrationPoint {
                rtd_temp: 100.0,
                probe_temps: vec![201.0],
            },
        ];
        CalibrationTable::from_points(&points, &["TC0".to_string()])
    }

    #[test]
    fn renders_header_rows_and_coefficients() {
        let csv = render_csv(&table());
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "RTD,TC0");
        assert_eq!(lines[1], "0.000000,1.000000");
        assert_eq!(lines[2], "50.000000,101.000000");
        assert_eq!(lines[3], "100.000000,201.000000");
        assert_eq!(lines[4], "Slope,2.000000");
        assert_eq!(lines[5], "Intercept,1.000000");
        assert_eq!(lines.len(), 6);
    }

    #[test]
    fn undefined_fit_renders_nan() {
        let points = vec![CalibrationPoint {
            rtd_temp: 50.0,
            probe_temps: vec![50.5],
        }];
        let table = CalibrationTable::from_points(&points, &["TC0".to_string()]);
        let csv = render_csv(&table);
        assert!(csv.contains("Slope,NaN"));
        assert!(csv.contains("Intercept,NaN"));
    }

    #[test]
    fn writes_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("calibration.csv");

        write_csv(&table(), &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("RTD,TC0\n"));
        assert!(text.trim_end().ends_with("Intercept,1.000000"));
    }

    #[test]
    fn unwritable_destination_is_a_retryable_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("calibration.csv");

        let t = table();
        assert!(write_csv(&t, &path).is_err());
        // The table is untouched and a later write succeeds.
        let good = dir.path().join("calibration.csv");
        write_csv(&t, &good).unwrap();
    }
}
