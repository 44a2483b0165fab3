//! # Memory-footprint function plotter
//!
//! Draws a function in a system memory monitor (Task Manager, `htop`, ...)
//! by growing and shrinking this process's resident memory so that the
//! monitor's usage graph traces the function's shape.
//!
//! ## Pipeline
//!
//! 1. **Probe**: read available physical memory and take a fraction of it
//!    as the plotting budget
//! 2. **Drive**: step `x` across the domain, map `f(x)` onto a byte target
//! 3. **Shape**: grow or shrink an owned ledger of regions to exactly that
//!    target, in chunks of at most 1 MiB
//! 4. **Pace**: sleep a few milliseconds so the monitor samples each point
//!
//! ## Usage Example
//!
//! ```no_run
//! use taskplot::host::{ConsoleProgress, SystemMemory, ThreadSleeper};
//! use taskplot::{PlotConfig, Plotter, Waveform};
//!
//! let plotter = Plotter::new(PlotConfig::for_waveform(Waveform::Parabola));
//! let outcome = plotter.run(SystemMemory::new(), ThreadSleeper, ConsoleProgress)?;
//! println!("peak {} bytes", outcome.summary.peak_target);
//! # Ok::<(), taskplot::PlotError>(())
//! ```

#![warn(missing_docs, missing_debug_implementations)]

pub mod driver;   // Domain stepping and target computation
pub mod host;     // Memory probe, pacing and progress interfaces
pub mod ledger;   // Region arena with running total
pub mod shaper;   // Grow/shrink reconciliation
pub mod waveform; // Reference sample functions

pub use driver::{Normalization, RunSummary, StepSample, WaveformConfig, WaveformDriver};
pub use ledger::{LedgerStats, Region, RegionId, RegionLedger};
pub use shaper::{MemoryShaper, Reconciliation, ShapeError};
pub use waveform::Waveform;

use std::time::Duration;

use host::{MemoryProbe, MemorySnapshot, Pacer, ProbeError, ProgressSink};
use thiserror::Error;
use tracing::info;

/// Configuration for a plotting run
#[derive(Debug, Clone)]
pub struct PlotConfig {
    /// Share of available memory used as the budget, in `(0, 1]`
    pub budget_fraction: f64,

    /// Function to plot
    pub waveform: Waveform,

    /// Sample value drawn at zero memory
    pub sample_min: f64,

    /// Sample value scaling the budget
    pub sample_max: f64,

    /// Left edge of the domain
    pub domain_min: f64,

    /// Right edge of the domain (inclusive)
    pub domain_max: f64,

    /// Distance between samples
    pub step: f64,

    /// Pause after each sample
    pub pacing: Duration,

    /// Sample-to-budget scaling
    pub normalization: Normalization,
}

impl PlotConfig {
    /// Default run for `waveform`, using its natural sample range.
    pub fn for_waveform(waveform: Waveform) -> Self {
        let (sample_min, sample_max) = waveform.sample_range();
        Self {
            budget_fraction: 0.9,
            waveform,
            sample_min,
            sample_max,
            domain_min: -3.0,
            domain_max: 3.0,
            step: 0.001,
            pacing: Duration::from_millis(3),
            normalization: Normalization::Offset,
        }
    }

    /// Override the sample range.
    pub fn with_sample_range(mut self, min: f64, max: f64) -> Self {
        self.sample_min = min;
        self.sample_max = max;
        self
    }

    /// Override the domain.
    pub fn with_domain(mut self, min: f64, max: f64, step: f64) -> Self {
        self.domain_min = min;
        self.domain_max = max;
        self.step = step;
        self
    }

    /// Override the budget fraction.
    pub fn with_budget_fraction(mut self, fraction: f64) -> Self {
        self.budget_fraction = fraction;
        self
    }

    /// Override the pause between samples.
    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    /// Override the scaling policy.
    pub fn with_normalization(mut self, normalization: Normalization) -> Self {
        self.normalization = normalization;
        self
    }

    /// Reject configurations that would never terminate or divide by zero.
    pub fn validate(&self) -> Result<(), PlotError> {
        let invalid = |msg: String| Err(PlotError::InvalidConfiguration(msg));

        if !(self.step.is_finite() && self.step > 0.0) {
            return invalid(format!("step must be positive, got {}", self.step));
        }
        if !(self.domain_min.is_finite() && self.domain_max.is_finite()) {
            return invalid("domain bounds must be finite".to_string());
        }
        if self.domain_min > self.domain_max {
            return invalid(format!(
                "domain [{}, {}] is inverted",
                self.domain_min, self.domain_max
            ));
        }
        if self.sample_max == 0.0 || !self.sample_max.is_finite() {
            return invalid(format!("sample max must be non-zero, got {}", self.sample_max));
        }
        if self.normalization == Normalization::Span && self.sample_max == self.sample_min {
            return invalid("sample range must be non-empty for span scaling".to_string());
        }
        if !(self.budget_fraction > 0.0 && self.budget_fraction <= 1.0) {
            return invalid(format!(
                "budget fraction must be in (0, 1], got {}",
                self.budget_fraction
            ));
        }
        Ok(())
    }

    /// Bytes to plot with, given `available` free bytes.
    pub fn budget_bytes(&self, available: u64) -> usize {
        let budget = (available as f64 * self.budget_fraction) as u64;
        usize::try_from(budget).unwrap_or(usize::MAX)
    }

    /// Driver parameters for a run with `budget_bytes`.
    pub fn waveform_config(&self, budget_bytes: usize) -> WaveformConfig {
        WaveformConfig {
            budget_bytes,
            sample_min: self.sample_min,
            sample_max: self.sample_max,
            domain_min: self.domain_min,
            domain_max: self.domain_max,
            step: self.step,
            pacing: self.pacing,
            normalization: self.normalization,
        }
    }
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self::for_waveform(Waveform::Pulse)
    }
}

/// Errors that can occur while plotting
#[derive(Error, Debug)]
pub enum PlotError {
    /// Configuration rejected by [`PlotConfig::validate`]
    #[error("invalid plot configuration: {0}")]
    InvalidConfiguration(String),

    /// System memory could not be queried
    #[error(transparent)]
    Probe(#[from] ProbeError),

    /// Memory shaping failed
    #[error(transparent)]
    Shape(#[from] ShapeError),
}

/// Memory figures and the budget derived from them
#[derive(Debug, Clone, Copy)]
pub struct Measurement {
    /// Figures reported by the memory query
    pub snapshot: MemorySnapshot,

    /// Configured fraction of the available bytes
    pub budget_bytes: usize,
}

/// Result of a complete plotting run
#[derive(Debug, Clone, Copy)]
pub struct PlotOutcome {
    /// Memory figures the budget was derived from
    pub snapshot: MemorySnapshot,

    /// Budget used for the run
    pub budget_bytes: usize,

    /// Driver totals
    pub summary: RunSummary,
}

/// Plotting orchestrator
///
/// Ties a [`PlotConfig`] to the shaper and driver.
#[derive(Debug, Clone)]
pub struct Plotter {
    config: PlotConfig,
    shaper: MemoryShaper,
}

impl Plotter {
    /// Plotter with the default 1 MiB chunk ceiling.
    pub fn new(config: PlotConfig) -> Self {
        Self {
            config,
            shaper: MemoryShaper::new(),
        }
    }

    /// Replace the shaper (e.g. to change the chunk ceiling).
    pub fn with_shaper(mut self, shaper: MemoryShaper) -> Self {
        self.shaper = shaper;
        self
    }

    /// Active configuration.
    pub fn config(&self) -> &PlotConfig {
        &self.config
    }

    /// Read memory figures from `probe` and size the budget from them.
    pub fn measure<M: MemoryProbe>(&self, mut probe: M) -> Result<Measurement, PlotError> {
        let snapshot = probe.snapshot()?;
        Ok(Measurement {
            snapshot,
            budget_bytes: self.config.budget_bytes(snapshot.available_bytes()),
        })
    }

    /// Plot with an explicit budget.
    pub fn plot<P: Pacer, S: ProgressSink>(
        &self,
        budget_bytes: usize,
        pacer: P,
        sink: S,
    ) -> Result<RunSummary, PlotError> {
        let waveform = self.config.waveform;
        let mut driver = WaveformDriver::new(self.shaper.clone(), pacer, sink);
        let summary = driver.run(&self.config.waveform_config(budget_bytes), |x| {
            waveform.sample(x)
        })?;
        Ok(summary)
    }

    /// Measure, derive the budget, and plot.
    pub fn run<M, P, S>(&self, probe: M, pacer: P, sink: S) -> Result<PlotOutcome, PlotError>
    where
        M: MemoryProbe,
        P: Pacer,
        S: ProgressSink,
    {
        let Measurement {
            snapshot,
            budget_bytes,
        } = self.measure(probe)?;
        info!(
            total_bytes = snapshot.total_bytes,
            available_bytes = snapshot.available_bytes(),
            budget_bytes,
            waveform = %self.config.waveform,
            "plotting"
        );
        let summary = self.plot(budget_bytes, pacer, sink)?;
        Ok(PlotOutcome {
            snapshot,
            budget_bytes,
            summary,
        })
    }
}
