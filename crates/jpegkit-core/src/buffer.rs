//! Session-owned destination buffers.

use log::debug;

use crate::error::AllocationError;

/// A reusable output buffer with a fixed committed capacity.
///
/// Capacity only ever grows. The valid length marks how much of the buffer
/// holds the result of the last successful operation. It is reset whenever a
/// new source is bound or the buffer is handed out for writing, and only
/// advanced by [`commit`](Self::commit).
#[derive(Debug, Default)]
pub struct DestinationBuffer {
    bytes: Vec<u8>,
    valid_len: usize,
}

impl DestinationBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes available to an engine call.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    /// Length of the last committed result.
    #[inline]
    pub fn valid_len(&self) -> usize {
        self.valid_len
    }

    /// Grow to at least `required` bytes. Returns true if the buffer grew.
    pub fn ensure_capacity(&mut self, required: usize) -> Result<bool, AllocationError> {
        let current = self.bytes.len();
        if current >= required {
            return Ok(false);
        }

        self.bytes
            .try_reserve_exact(required - current)
            .map_err(|_| AllocationError { requested: required })?;
        self.bytes.resize(required, 0);
        debug!("Destination buffer grown from {} to {} bytes", current, required);
        Ok(true)
    }

    /// Forget the current result without releasing capacity.
    #[inline]
    pub fn reset(&mut self) {
        self.valid_len = 0;
    }

    /// Record `len` bytes as the valid result. `len` must not exceed capacity.
    pub(crate) fn commit(&mut self, len: usize) {
        debug_assert!(len <= self.bytes.len());
        self.valid_len = len.min(self.bytes.len());
    }

    /// Full committed capacity, for an engine to write into.
    ///
    /// The current result is invalidated first, so a write that is never
    /// committed leaves nothing valid.
    #[inline]
    pub(crate) fn as_mut_slice(&mut self) -> &mut [u8] {
        self.valid_len = 0;
        &mut self.bytes
    }

    /// The valid portion of the buffer.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes[..self.valid_len]
    }
}
