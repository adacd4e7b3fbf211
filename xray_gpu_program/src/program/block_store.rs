/// BlockDataStore - CPU mirror of every uniform block of a program
///
/// One zero-initialised byte arena. Blocks own disjoint regions addressed by
/// their store offset; all access is bounds-checked.

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockDataStore {
    bytes: Vec<u8>,
}

impl BlockDataStore {
    pub fn new(size: usize) -> Self {
        Self { bytes: vec![0u8; size] }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Bytes in `[offset, offset + len)`, `None` when out of range
    pub fn region(&self, offset: usize, len: usize) -> Option<&[u8]> {
        let end = offset.checked_add(len)?;
        self.bytes.get(offset..end)
    }

    /// Copy `data` to `offset`
    ///
    /// An out-of-range write fails with `Error::OutOfBounds` and leaves the
    /// store untouched.
    pub fn write(&mut self, offset: usize, data: &[u8]) -> Result<()> {
        let capacity = self.bytes.len();
        let out_of_bounds = Error::OutOfBounds { offset, len: data.len(), capacity };

        let end = offset.checked_add(data.len()).ok_or_else(|| out_of_bounds.clone())?;
        match self.bytes.get_mut(offset..end) {
            Some(dst) => {
                dst.copy_from_slice(data);
                Ok(())
            }
            None => Err(out_of_bounds),
        }
    }

    /// Whole store
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

#[cfg(test)]
#[path = "block_store_tests.rs"]
mod tests;
