//! Region ledger
//!
//! Ordered collection of owned memory regions with a running byte total.
//!
//! Regions live in an arena of indexed slots linked front to back. Slot 0 is
//! the head: it is never unlinked, only emptied into a tombstone. Vacated
//! slots go on a free-list and are reused by later insertions, so slot
//! indices say nothing about order; only the links do.

mod region;

pub use region::{AllocationError, Region};

use tracing::trace;

const HEAD: usize = 0;

/// Stable handle to a region slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegionId(usize);

impl RegionId {
    /// Arena slot index.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Allocator traffic observed by a ledger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub struct LedgerStats {
    /// Blocks committed for new or refilled regions
    pub allocations: usize,
    /// Blocks released entirely
    pub releases: usize,
    /// In-place resizes
    pub resizes: usize,
    /// Largest total seen
    pub peak_bytes: usize,
}

#[derive(Debug)]
struct Node {
    region: Region,
    next: Option<usize>,
}

/// Arena-backed singly linked list of regions.
#[derive(Debug)]
pub struct RegionLedger {
    slots: Vec<Option<Node>>,
    vacant: Vec<usize>,
    total: usize,
    stats: LedgerStats,
}

impl RegionLedger {
    /// Create a ledger holding only an empty head.
    pub fn new() -> Self {
        Self {
            slots: vec![Some(Node {
                region: Region::tombstone(),
                next: None,
            })],
            vacant: Vec::new(),
            total: 0,
            stats: LedgerStats::default(),
        }
    }

    /// The head region. Always present.
    pub fn head(&self) -> RegionId {
        RegionId(HEAD)
    }

    /// Whether `id` is the head.
    pub fn is_head(&self, id: RegionId) -> bool {
        id.0 == HEAD
    }

    /// Region following `id` in ledger order.
    pub fn next(&self, id: RegionId) -> Option<RegionId> {
        self.node(id)?.next.map(RegionId)
    }

    /// Region stored at `id`, if the slot is occupied.
    pub fn get(&self, id: RegionId) -> Option<&Region> {
        self.node(id).map(|node| &node.region)
    }

    /// Sum of all region sizes.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Number of nodes, head and tombstones included.
    pub fn region_count(&self) -> usize {
        self.slots.len() - self.vacant.len()
    }

    /// Number of regions that currently own memory.
    pub fn live_region_count(&self) -> usize {
        self.iter().filter(|(_, region)| region.is_live()).count()
    }

    /// Allocator traffic so far.
    pub fn stats(&self) -> LedgerStats {
        self.stats
    }

    /// Iterate regions in ledger order, starting at the head.
    pub fn iter(&self) -> Regions<'_> {
        Regions {
            ledger: self,
            cursor: Some(HEAD),
        }
    }

    /// Link `region` directly after `after`.
    ///
    /// Returns `None` when `after` does not name an occupied slot.
    pub fn insert_after(&mut self, after: RegionId, region: Region) -> Option<RegionId> {
        self.node(after)?;
        Some(RegionId(self.link_after(after.0, region)))
    }

    /// Link `region` directly behind the head, ahead of older regions.
    pub fn push_front(&mut self, region: Region) -> RegionId {
        RegionId(self.link_after(HEAD, region))
    }

    /// Store `region` in the head, releasing whatever the head held.
    pub fn fill_head(&mut self, region: Region) {
        let freed = self.release(self.head());
        if freed > 0 {
            trace!(freed, "head refilled while live");
        }
        let size = region.size();
        if region.is_live() {
            self.stats.allocations += 1;
        }
        if let Some(head) = self.node_mut(RegionId(HEAD)) {
            head.region = region;
        }
        self.add(size);
    }

    /// Release the block at `id` but keep its node in place.
    ///
    /// Returns the bytes released (zero if already a tombstone or vacant).
    pub fn release(&mut self, id: RegionId) -> usize {
        let freed = match self.node_mut(id) {
            Some(node) => node.region.release(),
            None => return 0,
        };
        if freed > 0 {
            self.stats.releases += 1;
            self.total -= freed;
        }
        freed
    }

    /// Unlink and destroy the region after `prev`.
    ///
    /// Returns the bytes released, or `None` when there is no successor.
    /// The head is never a successor, so it can never be removed this way.
    pub fn remove_after(&mut self, prev: RegionId) -> Option<usize> {
        let target = self.node(prev)?.next?;
        let mut node = self.slots[target].take()?;
        if let Some(prev_node) = self.node_mut(prev) {
            prev_node.next = node.next;
        }
        self.vacant.push(target);

        let freed = node.region.release();
        if freed > 0 {
            self.stats.releases += 1;
            self.total -= freed;
        }
        Some(freed)
    }

    /// Reallocate the region at `id` to exactly `size` bytes, keeping its
    /// position in the ledger.
    pub fn resize(&mut self, id: RegionId, size: usize) -> Result<(), AllocationError> {
        let Some(node) = self.slots.get_mut(id.0).and_then(Option::as_mut) else {
            return Ok(());
        };
        let before = node.region.size();
        // The old block is gone even if the new request fails.
        let outcome = node.region.reallocate(size);
        let after = node.region.size();

        self.total = self.total - before + after;
        match outcome {
            Ok(()) => self.stats.resizes += 1,
            Err(_) if before > 0 => self.stats.releases += 1,
            Err(_) => {}
        }
        self.stats.peak_bytes = self.stats.peak_bytes.max(self.total);
        outcome
    }

    /// Release every region: successors of the head in order, then the head.
    ///
    /// Leaves the ledger holding only an empty head. Returns the bytes
    /// released.
    pub fn release_all(&mut self) -> usize {
        let head = self.head();
        let mut released = 0;
        while let Some(freed) = self.remove_after(head) {
            released += freed;
        }
        released += self.release(head);
        self.vacant.clear();
        self.slots.truncate(1);
        trace!(released, "ledger released");
        released
    }

    /// Check that the tracked total matches the regions actually held and
    /// that every occupied slot is reachable from the head.
    pub fn is_consistent(&self) -> bool {
        let mut sum = 0;
        let mut reachable = 0;
        for (_, region) in self.iter() {
            sum += region.size();
            reachable += 1;
        }
        sum == self.total && reachable == self.region_count()
    }

    fn link_after(&mut self, after: usize, region: Region) -> usize {
        let successor = self.slots[after].as_ref().and_then(|node| node.next);
        let size = region.size();
        if region.is_live() {
            self.stats.allocations += 1;
        }
        let node = Node {
            region,
            next: successor,
        };
        let index = match self.vacant.pop() {
            Some(index) => {
                self.slots[index] = Some(node);
                index
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        };
        if let Some(prev) = self.slots[after].as_mut() {
            prev.next = Some(index);
        }
        self.add(size);
        index
    }

    fn add(&mut self, size: usize) {
        self.total += size;
        self.stats.peak_bytes = self.stats.peak_bytes.max(self.total);
    }

    fn node(&self, id: RegionId) -> Option<&Node> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, id: RegionId) -> Option<&mut Node> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }
}

impl Default for RegionLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for RegionLedger {
    fn drop(&mut self) {
        self.release_all();
    }
}

/// Iterator over regions in ledger order.
#[derive(Debug)]
pub struct Regions<'a> {
    ledger: &'a RegionLedger,
    cursor: Option<usize>,
}

impl<'a> Iterator for Regions<'a> {
    type Item = (RegionId, &'a Region);

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.cursor?;
        let node = self.ledger.slots.get(index)?.as_ref()?;
        self.cursor = node.next;
        Some((RegionId(index), &node.region))
    }
}
