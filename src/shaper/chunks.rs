//! Splitting one growth request into allocator-sized chunks

/// Sizes of the sub-steps a growth of `delta` bytes is split into.
///
/// `spans = ⌈delta / ceiling⌉`. Every chunk is `⌊delta / spans⌋` bytes and
/// the first `delta mod spans` chunks carry one extra byte, so the sizes
/// differ by at most one, none exceeds the ceiling, and they sum to `delta`.
#[derive(Debug, Clone)]
pub struct ChunkPlan {
    spans: usize,
    emitted: usize,
    base: usize,
    remainder: usize,
}

impl ChunkPlan {
    pub(super) fn new(delta: usize, ceiling: usize) -> Self {
        if delta == 0 {
            return Self {
                spans: 0,
                emitted: 0,
                base: 0,
                remainder: 0,
            };
        }
        let spans = delta.div_ceil(ceiling);
        Self {
            spans,
            emitted: 0,
            base: delta / spans,
            remainder: delta % spans,
        }
    }

    /// Total number of chunks in the plan.
    pub fn spans(&self) -> usize {
        self.spans
    }
}

impl Iterator for ChunkPlan {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.emitted == self.spans {
            return None;
        }
        let extra = usize::from(self.emitted < self.remainder);
        self.emitted += 1;
        Some(self.base + extra)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.spans - self.emitted;
        (left, Some(left))
    }
}

impl ExactSizeIterator for ChunkPlan {}
