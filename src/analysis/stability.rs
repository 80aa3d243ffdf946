//! Decides when the thermal assembly has settled.

use crate::config::Config;
use crate::measurement::SlidingWindow;
use crate::statistics::slope_over_index;
use crate::types::StabilityResult;

/// Per-channel slope limits, RTD and thermocouples configured
/// independently.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StabilityThresholds {
    /// Limit for the RTD channel.
    pub rtd_slope: f64,

    /// Limit for every thermocouple channel.
    pub thermocouple_slope: f64,
}

impl StabilityThresholds {
    /// Threshold for a regression channel (0 = RTD, 1..=N = probes).
    fn for_channel(&self, channel: usize) -> f64 {
        if channel == 0 {
            self.rtd_slope
        } else {
            self.thermocouple_slope
        }
    }
}

/// Sliding-window regression gate over every channel.
///
/// Each channel's values are regressed against their position index in the
/// window; the channel passes when `|slope|` is strictly below its
/// threshold (a slope exactly at the threshold is unstable). The overall
/// verdict additionally requires the device's own last-reported stability
/// flag: that flag is a hard veto, and the regression refines it rather
/// than overriding it — when the device says unstable, regression is
/// skipped and every slope is reported undefined. Note this trusts the
/// device's self-assessment even where regression would disagree.
#[derive(Debug, Clone, Copy)]
pub struct StabilityEvaluator {
    thresholds: StabilityThresholds,
}

impl StabilityEvaluator {
    /// Build an evaluator with explicit thresholds.
    pub fn new(thresholds: StabilityThresholds) -> Self {
        Self { thresholds }
    }

    /// Build an evaluator from the session configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(StabilityThresholds {
            rtd_slope: config.rtd_slope_threshold,
            thermocouple_slope: config.thermocouple_slope_threshold,
        })
    }

    /// Evaluate the current window.
    ///
    /// An empty window, or any channel with fewer than two samples, is
    /// unstable.
    pub fn evaluate(&self, window: &SlidingWindow) -> StabilityResult {
        let Some(latest) = window.latest() else {
            return StabilityResult::empty();
        };

        let channel_count = latest.channel_count();
        if !latest.reference_stable {
            return StabilityResult::vetoed(channel_count);
        }

        let mut channel_slopes = Vec::with_capacity(channel_count);
        let mut channel_bits = Vec::with_capacity(channel_count);
        for channel in 0..channel_count {
            let series = window.channel_series(channel);
            let slope = slope_over_index(&series);
            let stable = matches!(slope, Some(s) if s.abs() < self.thresholds.for_channel(channel));
            channel_slopes.push(slope);
            channel_bits.push(stable);
        }

        StabilityResult {
            overall_stable: channel_bits.iter().all(|&b| b),
            channel_slopes,
            channel_bits,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Sample;

    const CAPACITY: usize = 16;

    // Exact binary fractions so boundary comparisons are not at the mercy
    // of decimal rounding.
    fn thresholds() -> StabilityThresholds {
        StabilityThresholds {
            rtd_slope: 0.0625,
            thermocouple_slope: 0.125,
        }
    }

    fn push(window: &mut SlidingWindow, rtd: f64, probe: f64, stable: bool) {
        window.push(
            Sample {
                reference_temp: rtd,
                reference_setpoint: rtd,
                reference_stable: stable,
                rtd_temp: rtd,
                probe_temps: vec![probe],
            },
            CAPACITY,
        );
    }

    #[test]
    fn flat_channels_are_stable_for_any_positive_threshold() {
        let evaluator = StabilityEvaluator::new(StabilityThresholds {
            rtd_slope: 1e-9,
            thermocouple_slope: 1e-9,
        });
        let mut window = SlidingWindow::new();
        for _ in 0..5 {
            push(&mut window, 50.0, 50.5, true);
        }

        let result = evaluator.evaluate(&window);
        assert!(result.overall_stable);
        assert_eq!(result.bit_string(), "11");
    }

    #[test]
    fn trending_channel_is_unstable_at_or_above_threshold() {
        let evaluator = StabilityEvaluator::new(thresholds());

        // Probe ramps at exactly the threshold: strict inequality fails it.
        let mut window = SlidingWindow::new();
        for i in 0..6 {
            push(&mut window, 50.0, 50.0 + 0.125 * i as f64, true);
        }
        let result = evaluator.evaluate(&window);
        assert!(!result.overall_stable);
        assert_eq!(result.channel_bits, vec![true, false]);

        // Just below the threshold passes.
        let mut window = SlidingWindow::new();
        for i in 0..6 {
            push(&mut window, 50.0, 50.0 + 0.0625 * i as f64, true);
        }
        assert!(evaluator.evaluate(&window).overall_stable);
    }

    #[test]
    fn negative_trend_uses_magnitude() {
        let evaluator = StabilityEvaluator::new(thresholds());
        let mut window = SlidingWindow::new();
        for i in 0..6 {
            push(&mut window, 50.0, 50.0 - 0.2 * i as f64, true);
        }
        let result = evaluator.evaluate(&window);
        assert!(!result.overall_stable);
        assert!(result.channel_slopes[1].unwrap() < 0.0);
    }

    #[test]
    fn single_sample_window_is_unstable() {
        let evaluator = StabilityEvaluator::new(thresholds());
        let mut window = SlidingWindow::new();
        push(&mut window, 50.0, 50.0, true);

        let result = evaluator.evaluate(&window);
        assert!(!result.overall_stable);
        assert_eq!(result.channel_slopes, vec![None, None]);
        assert_eq!(result.bit_string(), "00");
    }

    #[test]
    fn empty_window_is_unstable() {
        let evaluator = StabilityEvaluator::new(thresholds());
        let result = evaluator.evaluate(&SlidingWindow::new());
        assert!(!result.overall_stable);
        assert!(result.channel_bits.is_empty());
    }

    #[test]
    fn device_flag_vetoes_regression() {
        let evaluator = StabilityEvaluator::new(thresholds());
        let mut window = SlidingWindow::new();
        // Perfectly flat, but the device's last word is "unstable".
        for _ in 0..5 {
            push(&mut window, 50.0, 50.5, true);
        }
        push(&mut window, 50.0, 50.5, false);

        let result = evaluator.evaluate(&window);
        assert!(!result.overall_stable);
        // Veto discards the slopes entirely.
        assert_eq!(result.channel_slopes, vec![None, None]);
    }
}
