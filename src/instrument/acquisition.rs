//! The multi-channel analog-input seam.

use crate::error::AcquisitionError;

/// "Read all configured channels" on the acquisition hardware.
///
/// The returned vector has fixed arity for the lifetime of a session:
/// index 0 is the raw RTD resistance in ohms, indices 1..N the
/// thermocouple temperatures in degrees Celsius, in channel order.
pub trait AnalogInput {
    /// Number of channels a read returns, RTD included.
    fn channel_count(&self) -> usize;

    /// Read one value from every configured channel.
    fn read_all(&mut self) -> Result<Vec<f64>, AcquisitionError>;

    /// Stop the acquisition task. First step of session teardown.
    fn stop(&mut self) -> Result<(), AcquisitionError>;
}

impl<A: AnalogInput + ?Sized> AnalogInput for Box<A> {
    fn channel_count(&self) -> usize {
        (**self).channel_count()
    }

    fn read_all(&mut self) -> Result<Vec<f64>, AcquisitionError> {
        (**self).read_all()
    }

    fn stop(&mut self) -> Result<(), AcquisitionError> {
        (**self).stop()
    }
}
