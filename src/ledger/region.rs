//! Owned memory regions
//!
//! A region either holds a committed block of bytes or is a tombstone
//! (no block, size zero). The two states are the only ones representable.

use std::fmt;

use thiserror::Error;

/// Byte written across every new block so its pages become resident.
const COMMIT_BYTE: u8 = 0xA5;

/// The allocator could not provide a block of the requested size.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("failed to commit {requested} bytes")]
pub struct AllocationError {
    /// Size of the block that could not be obtained.
    pub requested: usize,
}

/// One owned, committed memory allocation.
#[derive(Default)]
pub struct Region {
    block: Option<Vec<u8>>,
}

impl Region {
    /// Empty placeholder region (no handle, size zero).
    pub fn tombstone() -> Self {
        Self { block: None }
    }

    /// Allocate and commit `size` bytes.
    ///
    /// A zero size yields a tombstone so that "no handle" and "size zero"
    /// always coincide.
    pub fn allocate(size: usize) -> Result<Self, AllocationError> {
        if size == 0 {
            return Ok(Self::tombstone());
        }
        Ok(Self {
            block: Some(commit(size)?),
        })
    }

    /// Size in bytes (zero for a tombstone).
    pub fn size(&self) -> usize {
        self.block.as_ref().map_or(0, Vec::len)
    }

    /// Whether the region currently owns a block.
    pub fn is_live(&self) -> bool {
        self.block.is_some()
    }

    /// Drop the block, leaving a tombstone. Returns the bytes released.
    pub(super) fn release(&mut self) -> usize {
        self.block.take().map_or(0, |block| block.len())
    }

    /// Replace the block with a freshly committed one of `size` bytes.
    ///
    /// The old block is released before the new one is requested so the
    /// footprint never transiently holds both.
    pub(super) fn reallocate(&mut self, size: usize) -> Result<(), AllocationError> {
        self.release();
        if size > 0 {
            self.block = Some(commit(size)?);
        }
        Ok(())
    }
}

impl fmt::Debug for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Region")
            .field("size", &self.size())
            .field("live", &self.is_live())
            .finish()
    }
}

fn commit(size: usize) -> Result<Vec<u8>, AllocationError> {
    let mut block = Vec::new();
    block
        .try_reserve_exact(size)
        .map_err(|_| AllocationError { requested: size })?;
    // Writing every byte forces the OS to back the pages.
    block.resize(size, COMMIT_BYTE);
    Ok(block)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_size_is_tombstone() {
        let region = Region::allocate(0).unwrap();
        assert!(!region.is_live());
        assert_eq!(region.size(), 0);
    }

    #[test]
    fn test_reallocate_keeps_requested_size() {
        let mut region = Region::allocate(4096).unwrap();
        region.reallocate(1000).unwrap();
        assert_eq!(region.size(), 1000);
        assert!(region.is_live());

        assert_eq!(region.release(), 1000);
        assert!(!region.is_live());
        assert_eq!(region.release(), 0);
    }

    #[test]
    fn test_impossible_allocation_reports_failure() {
        let err = Region::allocate(usize::MAX).unwrap_err();
        assert_eq!(err.requested, usize::MAX);
    }
}
