//! Stability analysis over the sliding window.

mod stability;

pub use stability::{StabilityEvaluator, StabilityThresholds};
