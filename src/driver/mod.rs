//! Waveform driver
//!
//! Steps through a domain, turns each sample into a byte target and asks
//! the shaper to hold exactly that much memory before pausing for the next
//! step. The pauses give an external monitor time to draw each point.

mod target;

pub use target::Normalization;

use std::fmt;
use std::time::Duration;

use tracing::info;

use crate::host::{Pacer, ProgressSink};
use crate::ledger::{LedgerStats, RegionLedger};
use crate::shaper::{MemoryShaper, ShapeError};

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Parameters of one waveform run.
///
/// Not validated here. A zero or negative step never terminates and a zero
/// `sample_max` divides by zero; callers are expected to pass sane values
/// (see `PlotConfig::validate`).
#[derive(Debug, Clone)]
pub struct WaveformConfig {
    /// Bytes corresponding to a normalized sample of 1.0
    pub budget_bytes: usize,
    /// Lower bound of the sample range
    pub sample_min: f64,
    /// Upper bound of the sample range
    pub sample_max: f64,
    /// First x value
    pub domain_min: f64,
    /// Last x value (inclusive)
    pub domain_max: f64,
    /// Increment between x values
    pub step: f64,
    /// Pause after each step
    pub pacing: Duration,
    /// Sample scaling policy
    pub normalization: Normalization,
}

impl WaveformConfig {
    /// Shape target for sample `y`.
    pub fn target_for(&self, y: f64) -> usize {
        self.normalization
            .target(y, self.sample_min, self.sample_max, self.budget_bytes)
    }
}

/// One evaluated point of the waveform.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub struct StepSample {
    /// Zero-based step number
    pub index: usize,
    /// Domain value
    pub x: f64,
    /// Sample value `f(x)`
    pub y: f64,
    /// Bytes the ledger is reconciled to
    pub target_bytes: usize,
}

impl fmt::Display for StepSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Plotting f({:.2}) = {:.2}\tMemory usage: {:.2}GB...",
            self.x,
            self.y,
            self.target_bytes as f64 / GIB
        )
    }
}

/// Totals for a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub struct RunSummary {
    /// Steps evaluated
    pub steps: usize,
    /// Largest target requested
    pub peak_target: usize,
    /// Target of the last step
    pub final_target: usize,
    /// Bytes released at teardown
    pub released_bytes: usize,
    /// Allocator traffic over the run
    pub ledger_stats: LedgerStats,
}

/// Runs a sample function through the shaper, one paced step at a time.
#[derive(Debug)]
pub struct WaveformDriver<P, S> {
    shaper: MemoryShaper,
    pacer: P,
    sink: S,
}

impl<P: Pacer, S: ProgressSink> WaveformDriver<P, S> {
    /// Create a driver from its collaborators.
    pub fn new(shaper: MemoryShaper, pacer: P, sink: S) -> Self {
        Self {
            shaper,
            pacer,
            sink,
        }
    }

    /// Pacing collaborator.
    pub fn pacer(&self) -> &P {
        &self.pacer
    }

    /// Progress collaborator.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Give back the collaborators.
    pub fn into_parts(self) -> (MemoryShaper, P, S) {
        (self.shaper, self.pacer, self.sink)
    }

    /// Plot `sample` over the configured domain.
    ///
    /// Memory starts at zero and is fully released when the domain is
    /// exhausted. An allocation failure ends the run immediately; whatever
    /// was committed is released as the ledger drops.
    pub fn run<F>(
        &mut self,
        config: &WaveformConfig,
        mut sample: F,
    ) -> Result<RunSummary, ShapeError>
    where
        F: FnMut(f64) -> f64,
    {
        info!(
            budget_bytes = config.budget_bytes,
            domain_min = config.domain_min,
            domain_max = config.domain_max,
            step = config.step,
            "waveform run starting"
        );

        let mut ledger = RegionLedger::new();
        let mut current = 0;
        let mut peak_target = 0;
        let mut index = 0;
        let mut x = config.domain_min;

        while x <= config.domain_max {
            let y = sample(x);
            let step = StepSample {
                index,
                x,
                y,
                target_bytes: config.target_for(y),
            };
            self.sink.observe(&step);

            self.shaper.reconcile(&mut ledger, current, step.target_bytes)?;
            self.sink.settled(&step, ledger.total());
            self.pacer.pause(config.pacing);

            current = step.target_bytes;
            peak_target = peak_target.max(current);
            index += 1;
            x += config.step;
        }

        let ledger_stats = ledger.stats();
        let released_bytes = ledger.release_all();
        info!(steps = index, peak_target, released_bytes, "waveform run finished");

        Ok(RunSummary {
            steps: index,
            peak_target,
            final_target: current,
            released_bytes,
            ledger_stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{NullProgress, VirtualClock};

    fn config(budget_bytes: usize) -> WaveformConfig {
        WaveformConfig {
            budget_bytes,
            sample_min: 0.0,
            sample_max: 1.0,
            domain_min: 0.0,
            domain_max: 1.0,
            step: 0.25,
            pacing: Duration::from_millis(3),
            normalization: Normalization::Offset,
        }
    }

    #[test]
    fn test_run_paces_every_step() {
        let mut driver =
            WaveformDriver::new(MemoryShaper::new(), VirtualClock::new(), NullProgress);
        let summary = driver.run(&config(4096), |x| x).unwrap();

        assert_eq!(summary.steps, 5);
        assert_eq!(summary.final_target, 4096);
        assert_eq!(summary.released_bytes, 4096);
        assert_eq!(driver.pacer().pauses(), 5);
        assert_eq!(driver.pacer().elapsed(), Duration::from_millis(15));
    }

    #[test]
    fn test_empty_domain_runs_no_steps() {
        let mut cfg = config(4096);
        cfg.domain_min = 2.0;
        let mut driver =
            WaveformDriver::new(MemoryShaper::new(), VirtualClock::new(), NullProgress);
        let summary = driver.run(&cfg, |x| x).unwrap();

        assert_eq!(summary.steps, 0);
        assert_eq!(summary.released_bytes, 0);
        assert_eq!(driver.pacer().pauses(), 0);
    }

    #[test]
    fn test_step_sample_display() {
        let step = StepSample {
            index: 0,
            x: -3.0,
            y: 0.1411,
            target_bytes: 1024 * 1024 * 1024,
        };
        assert_eq!(
            step.to_string(),
            "Plotting f(-3.00) = 0.14\tMemory usage: 1.00GB..."
        );
    }
}
