//! The reference-source and acquisition hardware seams.
//!
//! The reference calibrator speaks a CR-framed ASCII line protocol,
//! abstracted by [`LineTransport`] and driven through the closed
//! [`SourceQuery`]/[`SourceCommand`] unions. The multi-channel probe
//! hardware sits behind [`AnalogInput`].

mod acquisition;
mod command;
mod source;
mod transport;

pub use acquisition::AnalogInput;
pub use command::{SourceCommand, SourceQuery, SourceReading};
pub use source::{ReferenceSource, SourceStatus};
pub use transport::{LineTransport, SerialTransport};
