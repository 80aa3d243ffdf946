//! Numeric kernels used by stability evaluation and export.

mod regression;

pub use regression::{fit_line, slope_over_index, LineFit};
