//! Duty-cycle output: a window of channels mapped onto PWM outputs

use artnode_core::{DutyConfig, SharedChannelBuffer};
use tracing::trace;

use super::DutySink;
use crate::error::Result;

/// Writes a channel window to a [`DutySink`] whenever the window changed
pub struct DutyOutput<S: DutySink> {
    sink: S,
    start: usize,
    channels: usize,
    /// Last window the sink accepted
    committed: Option<Vec<u8>>,
}

impl<S: DutySink> DutyOutput<S> {
    /// `start` is the zero-based first buffer slot, `channels` the output count
    pub fn new(sink: S, start: usize, channels: usize) -> Self {
        Self {
            sink,
            start,
            channels,
            committed: None,
        }
    }

    pub fn from_config(sink: S, config: &DutyConfig, start: usize) -> Self {
        Self::new(sink, start, config.channels)
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Push the current window if the buffer is dirty and the window differs
    /// from the last committed one
    ///
    /// Returns `Ok(true)` when a commit happened. A failed commit leaves the
    /// buffer dirty so the next refresh retries.
    pub fn refresh(&mut self, buffer: &SharedChannelBuffer) -> Result<bool> {
        let Some(snapshot) = buffer.lock().take_if_dirty() else {
            return Ok(false);
        };

        let mut duties = vec![0u8; self.channels];
        for (duty, value) in duties.iter_mut().zip(snapshot.iter().skip(self.start)) {
            *duty = *value;
        }

        if self.committed.as_deref() == Some(duties.as_slice()) {
            return Ok(false);
        }

        if let Err(e) = self.sink.commit(&duties) {
            buffer.lock().mark_dirty();
            return Err(e);
        }

        trace!("Duty outputs updated: {:?}", duties);
        self.committed = Some(duties);
        Ok(true)
    }
}
