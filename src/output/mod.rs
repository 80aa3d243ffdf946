//! Calibration results: regression table, CSV artifact, terminal summary.

mod csv;
mod table;
mod terminal;

pub use csv::{render_csv, write_csv};
pub use table::{CalibrationTable, ChannelFit};
pub use terminal::format_summary;
