//! System memory queries

use sysinfo::System;
use thiserror::Error;

/// Failure to read system memory figures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    /// The platform reported no physical memory.
    #[error("system memory information unavailable")]
    Unavailable,
}

/// Physical memory and how much of it is in use.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemorySnapshot {
    /// Installed physical memory in bytes
    pub total_bytes: u64,
    /// Fraction of physical memory in use, in `[0, 1]`
    pub load: f64,
}

impl MemorySnapshot {
    /// Bytes not in use: `total * (1 - load)`.
    pub fn available_bytes(&self) -> u64 {
        (self.total_bytes as f64 * (1.0 - self.load)) as u64
    }
}

/// Source of memory snapshots.
pub trait MemoryProbe {
    /// Read current figures.
    fn snapshot(&mut self) -> Result<MemorySnapshot, ProbeError>;
}

impl<T: MemoryProbe + ?Sized> MemoryProbe for &mut T {
    fn snapshot(&mut self) -> Result<MemorySnapshot, ProbeError> {
        (**self).snapshot()
    }
}

/// Reads the host's memory through `sysinfo`.
#[derive(Debug)]
pub struct SystemMemory {
    system: System,
}

impl SystemMemory {
    /// Probe with no data loaded yet; figures are refreshed on each snapshot.
    pub fn new() -> Self {
        Self {
            system: System::new(),
        }
    }
}

impl Default for SystemMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryProbe for SystemMemory {
    fn snapshot(&mut self) -> Result<MemorySnapshot, ProbeError> {
        self.system.refresh_memory();
        let total_bytes = self.system.total_memory();
        if total_bytes == 0 {
            return Err(ProbeError::Unavailable);
        }
        let available = self.system.available_memory().min(total_bytes);
        let load = 1.0 - available as f64 / total_bytes as f64;
        Ok(MemorySnapshot { total_bytes, load })
    }
}

/// Constant figures, for tests and dry runs.
#[derive(Debug, Clone, Copy)]
pub struct FixedMemory(pub MemorySnapshot);

impl FixedMemory {
    /// `total_bytes` installed with `load` in use.
    pub fn new(total_bytes: u64, load: f64) -> Self {
        Self(MemorySnapshot {
            total_bytes,
            load: load.clamp(0.0, 1.0),
        })
    }
}

impl MemoryProbe for FixedMemory {
    fn snapshot(&mut self) -> Result<MemorySnapshot, ProbeError> {
        Ok(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_available_bytes_from_load() {
        let snapshot = FixedMemory::new(8_000, 0.25).snapshot().unwrap();
        assert_eq!(snapshot.available_bytes(), 6_000);
    }

    #[test]
    fn test_load_is_clamped() {
        let snapshot = FixedMemory::new(1_000, 1.5).snapshot().unwrap();
        assert_eq!(snapshot.available_bytes(), 0);
    }
}
