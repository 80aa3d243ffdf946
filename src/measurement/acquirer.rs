//! One polling tick against the full rig.

use crate::config::RtdCalibration;
use crate::error::{AcquisitionError, SessionError};
use crate::instrument::{AnalogInput, LineTransport, ReferenceSource};
use crate::types::Sample;

/// Collects one [`Sample`] per call, owning both device handles.
///
/// A tick issues the source's three queries in their fixed order, then one
/// acquisition read, and converts the RTD resistance before assembling the
/// sample. There are no retries: a malformed reply or a failed read kills
/// the tick.
pub struct SampleAcquirer<T: LineTransport, A: AnalogInput> {
    source: ReferenceSource<T>,
    acquisition: A,
    rtd: RtdCalibration,
    expected_channels: usize,
}

impl<T: LineTransport, A: AnalogInput> SampleAcquirer<T, A> {
    /// Build an acquirer expecting `probe_channels` thermocouples plus the
    /// RTD on channel 0.
    pub fn new(
        source: ReferenceSource<T>,
        acquisition: A,
        rtd: RtdCalibration,
        probe_channels: usize,
    ) -> Self {
        Self {
            source,
            acquisition,
            rtd,
            expected_channels: 1 + probe_channels,
        }
    }

    /// Access the reference source, e.g. for setpoint convergence.
    pub fn source_mut(&mut self) -> &mut ReferenceSource<T> {
        &mut self.source
    }

    /// Collect one sample.
    pub fn poll(&mut self) -> Result<Sample, SessionError> {
        let status = self.source.poll_status()?;

        let mut channels = self.acquisition.read_all()?;
        if channels.len() != self.expected_channels {
            return Err(AcquisitionError::ChannelArity {
                expected: self.expected_channels,
                got: channels.len(),
            }
            .into());
        }

        let rtd_temp = self.rtd.convert(channels[0]);
        let probe_temps = channels.split_off(1);

        Ok(Sample {
            reference_temp: status.temperature,
            reference_setpoint: status.setpoint,
            reference_stable: status.stable,
            rtd_temp,
            probe_temps,
        })
    }

    /// Tear apart the acquirer for ordered session cleanup.
    pub fn into_parts(self) -> (ReferenceSource<T>, A) {
        (self.source, self.acquisition)
    }
}
