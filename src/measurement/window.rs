//! Bounded, time-ordered buffer of recent samples.

use std::collections::VecDeque;

use crate::types::Sample;

/// The most recent samples, oldest first, used only for stability
/// evaluation.
///
/// Capacity is passed on every push rather than fixed at construction:
/// it derives from configuration (`floor(stability_time / polling_interval)`,
/// minimum 1), which may differ between channel sets. When a push would
/// exceed capacity the oldest sample is evicted, preserving the relative
/// order of the rest.
#[derive(Debug, Clone, Default)]
pub struct SlidingWindow {
    samples: VecDeque<Sample>,
}

impl SlidingWindow {
    /// Create an empty window.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sample, evicting from the front down to `capacity`.
    pub fn push(&mut self, sample: Sample, capacity: usize) {
        let capacity = capacity.max(1);
        self.samples.push_back(sample);
        while self.samples.len() > capacity {
            self.samples.pop_front();
        }
    }

    /// Number of samples currently held.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True when no samples are held.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Drop all samples.
    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// The most recently pushed sample.
    pub fn latest(&self) -> Option<&Sample> {
        self.samples.back()
    }

    /// Iterate the held samples, oldest first.
    pub fn samples(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }

    /// Collect one channel's values in window order.
    ///
    /// Samples missing the channel are skipped; the acquirer's arity check
    /// makes that impossible within a single session.
    pub fn channel_series(&self, channel: usize) -> Vec<f64> {
        self.samples
            .iter()
            .filter_map(|s| s.channel(channel))
            .collect()
    }
}
