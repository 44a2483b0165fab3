//! Per-step progress reporting

use crate::driver::StepSample;

/// Receives one observation per waveform step.
pub trait ProgressSink {
    /// Called with the step's target before the ledger is reconciled.
    fn observe(&mut self, step: &StepSample);

    /// Called after the ledger has been reconciled to `committed` bytes.
    fn settled(&mut self, _step: &StepSample, _committed: usize) {}
}

impl<T: ProgressSink + ?Sized> ProgressSink for &mut T {
    fn observe(&mut self, step: &StepSample) {
        (**self).observe(step);
    }

    fn settled(&mut self, step: &StepSample, committed: usize) {
        (**self).settled(step, committed);
    }
}

impl<T: ProgressSink + ?Sized> ProgressSink for Box<T> {
    fn observe(&mut self, step: &StepSample) {
        (**self).observe(step);
    }

    fn settled(&mut self, step: &StepSample, committed: usize) {
        (**self).settled(step, committed);
    }
}

/// Collects every observed step.
impl ProgressSink for Vec<StepSample> {
    fn observe(&mut self, step: &StepSample) {
        self.push(*step);
    }
}

/// Prints one line per step to stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleProgress;

impl ProgressSink for ConsoleProgress {
    fn observe(&mut self, step: &StepSample) {
        println!("{step}");
    }
}

/// Discards all progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn observe(&mut self, _step: &StepSample) {}
}
