#![allow(dead_code)]

use taskplot::host::ProgressSink;
use taskplot::{RegionLedger, StepSample};

pub const MIB: usize = 1024 * 1024;

/// Region sizes in ledger order, head first.
pub fn sizes(ledger: &RegionLedger) -> Vec<usize> {
    ledger.iter().map(|(_, region)| region.size()).collect()
}

/// Sum of the sizes of regions that still own memory.
pub fn live_bytes(ledger: &RegionLedger) -> usize {
    ledger
        .iter()
        .filter(|(_, region)| region.is_live())
        .map(|(_, region)| region.size())
        .sum()
}

/// Records each step together with the ledger total after reconcile.
#[derive(Debug, Default)]
pub struct Recorder {
    pub observed: Vec<StepSample>,
    pub committed: Vec<usize>,
}

impl ProgressSink for Recorder {
    fn observe(&mut self, step: &StepSample) {
        self.observed.push(*step);
    }

    fn settled(&mut self, _step: &StepSample, committed: usize) {
        self.committed.push(committed);
    }
}
