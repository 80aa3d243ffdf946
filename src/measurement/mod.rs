//! Sample collection: one polling tick and the sliding window it feeds.

mod acquirer;
mod window;

pub use acquirer::SampleAcquirer;
pub use window::SlidingWindow;
