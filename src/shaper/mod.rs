//! Memory shaper
//!
//! Reconciles a [`RegionLedger`] against a requested byte total.
//!
//! - Growth commits new regions right behind the head, at most one chunk
//!   ceiling per allocation. A larger growth is split by [`ChunkPlan`].
//! - Shrink walks from the head, releasing whole regions while they fit in
//!   the remaining delta, then trims the first region that does not fit
//!   down to size and stops.
//!
//! The head is emptied into a tombstone rather than unlinked, so it
//! survives every sequence of calls.

mod chunks;

pub use chunks::ChunkPlan;

use crate::ledger::{AllocationError, Region, RegionLedger};
use thiserror::Error;
use tracing::{debug, warn};

/// Largest single allocation made during growth (1 MiB).
pub const DEFAULT_CHUNK_CEILING: usize = 1024 * 1024;

/// Errors raised while shaping memory.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShapeError {
    /// Growth or an in-place shrink could not obtain memory.
    #[error("allocation failure: {0}")]
    AllocationFailure(#[from] AllocationError),

    /// Chunk ceiling must be at least one byte.
    #[error("invalid chunk ceiling {0}")]
    InvalidChunkCeiling(usize),
}

/// Which way a reconcile moved the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Target equalled current total.
    Unchanged,
    /// Memory was committed.
    Grow,
    /// Memory was released.
    Shrink,
}

/// What a single reconcile did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reconciliation {
    /// Direction of the change
    pub direction: Direction,
    /// Total the caller reported before the call
    pub from: usize,
    /// Requested total
    pub to: usize,
    /// Growth sub-steps performed
    pub chunks: usize,
    /// Regions released entirely during shrink
    pub released: usize,
    /// Whether a region was trimmed in place
    pub trimmed: bool,
}

impl Reconciliation {
    fn unchanged(total: usize) -> Self {
        Self {
            direction: Direction::Unchanged,
            from: total,
            to: total,
            chunks: 0,
            released: 0,
            trimmed: false,
        }
    }
}

/// Grows or shrinks a ledger to a target total.
#[derive(Debug, Clone)]
pub struct MemoryShaper {
    chunk_ceiling: usize,
}

impl MemoryShaper {
    /// Shaper with the default 1 MiB chunk ceiling.
    pub fn new() -> Self {
        Self {
            chunk_ceiling: DEFAULT_CHUNK_CEILING,
        }
    }

    /// Shaper with an explicit chunk ceiling.
    pub fn with_chunk_ceiling(chunk_ceiling: usize) -> Result<Self, ShapeError> {
        if chunk_ceiling == 0 {
            return Err(ShapeError::InvalidChunkCeiling(chunk_ceiling));
        }
        Ok(Self { chunk_ceiling })
    }

    /// Largest single growth allocation.
    pub fn chunk_ceiling(&self) -> usize {
        self.chunk_ceiling
    }

    /// Chunk sizes used for a growth of `delta` bytes.
    pub fn chunk_plan(&self, delta: usize) -> ChunkPlan {
        ChunkPlan::new(delta, self.chunk_ceiling)
    }

    /// Bring the ledger from `current` bytes to `target` bytes.
    ///
    /// `current` is trusted as given. Allocation failure aborts the call
    /// with the ledger holding whatever was committed up to that point.
    pub fn reconcile(
        &self,
        ledger: &mut RegionLedger,
        current: usize,
        target: usize,
    ) -> Result<Reconciliation, ShapeError> {
        if current != ledger.total() {
            warn!(
                current,
                tracked = ledger.total(),
                "reported total disagrees with ledger"
            );
        }

        let outcome = if target > current {
            self.grow(ledger, current, target)?
        } else if target < current {
            self.shrink(ledger, current, target)?
        } else {
            Reconciliation::unchanged(current)
        };

        debug!(
            from = current,
            to = target,
            direction = ?outcome.direction,
            chunks = outcome.chunks,
            released = outcome.released,
            trimmed = outcome.trimmed,
            "reconciled"
        );
        Ok(outcome)
    }

    fn grow(
        &self,
        ledger: &mut RegionLedger,
        current: usize,
        target: usize,
    ) -> Result<Reconciliation, ShapeError> {
        let plan = self.chunk_plan(target - current);
        let chunks = plan.spans();
        for chunk in plan {
            grow_once(ledger, chunk)?;
        }
        Ok(Reconciliation {
            direction: Direction::Grow,
            from: current,
            to: target,
            chunks,
            released: 0,
            trimmed: false,
        })
    }

    fn shrink(
        &self,
        ledger: &mut RegionLedger,
        current: usize,
        target: usize,
    ) -> Result<Reconciliation, ShapeError> {
        let mut remaining = current - target;
        let mut released = 0;
        let mut trimmed = false;
        let mut prev = None;
        let mut cursor = Some(ledger.head());

        while let Some(id) = cursor {
            if remaining == 0 {
                break;
            }
            let size = match ledger.get(id) {
                Some(region) if region.is_live() => region.size(),
                _ => {
                    prev = Some(id);
                    cursor = ledger.next(id);
                    continue;
                }
            };

            if size > remaining {
                ledger.resize(id, size - remaining)?;
                remaining = 0;
                trimmed = true;
                break;
            }

            remaining -= size;
            released += 1;
            match prev {
                Some(p) if !ledger.is_head(id) => {
                    cursor = ledger.next(id);
                    ledger.remove_after(p);
                }
                _ => {
                    ledger.release(id);
                    prev = Some(id);
                    cursor = ledger.next(id);
                }
            }
        }

        if remaining > 0 {
            warn!(remaining, "ledger exhausted before shrink completed");
        }

        Ok(Reconciliation {
            direction: Direction::Shrink,
            from: current,
            to: target,
            chunks: 0,
            released,
            trimmed,
        })
    }
}

impl Default for MemoryShaper {
    fn default() -> Self {
        Self::new()
    }
}

fn grow_once(ledger: &mut RegionLedger, size: usize) -> Result<(), ShapeError> {
    let region = Region::allocate(size)?;
    let head_live = ledger
        .get(ledger.head())
        .is_some_and(Region::is_live);
    if head_live {
        ledger.push_front(region);
    } else {
        ledger.fill_head(region);
    }
    Ok(())
}
