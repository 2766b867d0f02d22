//! DMX channel buffer with change tracking
//!
//! The buffer is the single piece of state shared between the network side
//! (which ingests accepted frames) and the output side (which drives the
//! hardware). It is wrapped in a [`parking_lot::Mutex`] so that an ingest is
//! never observed half-applied by a reader.

use parking_lot::Mutex;
use std::sync::Arc;

/// Number of slots in one DMX512 universe
pub const DMX_CHANNELS: usize = 512;

/// Buffer shared between the protocol engine and the output driver
pub type SharedChannelBuffer = Arc<Mutex<ChannelBuffer>>;

/// Result of copying frame data into the buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestOutcome {
    /// Number of slots written
    pub copied: usize,
    /// Whether any written slot differs from its previous value
    pub changed: bool,
}

/// Fixed-size buffer of 512 channel values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelBuffer {
    values: [u8; DMX_CHANNELS],
    dirty: bool,
}

impl Default for ChannelBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelBuffer {
    /// Create an all-zero, clean buffer
    pub fn new() -> Self {
        Self {
            values: [0u8; DMX_CHANNELS],
            dirty: false,
        }
    }

    /// Create a buffer ready to be shared across threads
    pub fn shared() -> SharedChannelBuffer {
        Arc::new(Mutex::new(Self::new()))
    }

    /// Copy `data` into the buffer starting at slot 0
    ///
    /// At most [`DMX_CHANNELS`] bytes are copied; slots past the end of `data`
    /// keep their value. The dirty flag is raised only when a byte actually
    /// changes.
    pub fn ingest(&mut self, data: &[u8]) -> IngestOutcome {
        let count = data.len().min(DMX_CHANNELS);
        let changed = self.values[..count] != data[..count];
        if changed {
            self.values[..count].copy_from_slice(&data[..count]);
            self.dirty = true;
        }
        IngestOutcome {
            copied: count,
            changed,
        }
    }

    /// Whether the contents changed since the last flush
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Force the next duty refresh to write
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Clear the dirty flag without reading
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// Copy out the contents and clear the dirty flag, if dirty
    pub fn take_if_dirty(&mut self) -> Option<[u8; DMX_CHANNELS]> {
        if !self.dirty {
            return None;
        }
        self.dirty = false;
        Some(self.values)
    }

    /// Copy out the full contents
    pub fn snapshot(&self) -> [u8; DMX_CHANNELS] {
        self.values
    }

    /// Value of a zero-based slot
    pub fn get(&self, index: usize) -> Option<u8> {
        self.values.get(index).copied()
    }

    /// Borrow all 512 slots
    pub fn as_slice(&self) -> &[u8] {
        &self.values
    }

    /// Borrow up to `len` slots starting at `start`, clipped to the buffer end
    pub fn window(&self, start: usize, len: usize) -> &[u8] {
        let start = start.min(DMX_CHANNELS);
        let end = start.saturating_add(len).min(DMX_CHANNELS);
        &self.values[start..end]
    }
}
