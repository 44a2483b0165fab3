use std::io::BufRead;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use taskplot::host::{ConsoleProgress, NullProgress, ProgressSink, SystemMemory, ThreadSleeper};
use taskplot::{Normalization, PlotConfig, Plotter, Waveform};
use tracing_subscriber::EnvFilter;

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

#[derive(Parser, Debug)]
#[command(
    name = "taskplot",
    about = "Plot a function in your system monitor's memory graph"
)]
struct Cli {
    /// Function to plot (parabola or pulse).
    #[arg(long, default_value = "pulse")]
    waveform: Waveform,
    /// Share of available memory to use at the top of the plot.
    #[arg(long, default_value_t = 0.9)]
    budget_fraction: f64,
    /// Sample value drawn at zero memory (defaults to the waveform's range).
    #[arg(long, allow_hyphen_values = true)]
    sample_min: Option<f64>,
    /// Sample value that scales the budget (defaults to the waveform's range).
    #[arg(long, allow_hyphen_values = true)]
    sample_max: Option<f64>,
    /// Left edge of the domain.
    #[arg(long, default_value_t = -3.0, allow_hyphen_values = true)]
    domain_min: f64,
    /// Right edge of the domain.
    #[arg(long, default_value_t = 3.0, allow_hyphen_values = true)]
    domain_max: f64,
    /// Distance between samples.
    #[arg(long, default_value_t = 0.001)]
    step: f64,
    /// Milliseconds to wait after each sample.
    #[arg(long, default_value_t = 3)]
    pace_ms: u64,
    /// Sample scaling: offset ((y - min) / max) or span ((y - min) / (max - min)).
    #[arg(long, default_value = "offset")]
    normalization: Normalization,
    /// Do not print per-step progress.
    #[arg(long)]
    quiet: bool,
    /// Wait for Enter before exiting.
    #[arg(long)]
    wait: bool,
}

impl Cli {
    fn plot_config(&self) -> PlotConfig {
        let (default_min, default_max) = self.waveform.sample_range();
        PlotConfig::for_waveform(self.waveform)
            .with_budget_fraction(self.budget_fraction)
            .with_sample_range(
                self.sample_min.unwrap_or(default_min),
                self.sample_max.unwrap_or(default_max),
            )
            .with_domain(self.domain_min, self.domain_max, self.step)
            .with_pacing(Duration::from_millis(self.pace_ms))
            .with_normalization(self.normalization)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.plot_config();
    config.validate()?;

    let plotter = Plotter::new(config);
    let measurement = plotter
        .measure(SystemMemory::new())
        .context("failed to query system memory")?;
    let available = measurement.snapshot.available_bytes();
    println!("Available memory: {:.2}GB", available as f64 / GIB);
    println!("Starting plotting...");

    let sink: Box<dyn ProgressSink> = if cli.quiet {
        Box::new(NullProgress)
    } else {
        Box::new(ConsoleProgress)
    };
    let summary = plotter
        .plot(measurement.budget_bytes, ThreadSleeper, sink)
        .with_context(|| format!("plotting {} failed", cli.waveform))?;

    tracing::info!(
        steps = summary.steps,
        peak_target = summary.peak_target,
        allocations = summary.ledger_stats.allocations,
        "done"
    );
    println!("Done.");

    if cli.wait {
        let mut line = String::new();
        std::io::stdin()
            .lock()
            .read_line(&mut line)
            .context("failed to read from stdin")?;
    }

    Ok(())
}
