//! Waveform driver and plotter integration tests

mod common;

use std::time::Duration;

use common::Recorder;
use taskplot::host::{FixedMemory, NullProgress, VirtualClock};
use taskplot::{
    MemoryShaper, Normalization, PlotConfig, PlotError, Plotter, ShapeError, StepSample,
    Waveform, WaveformConfig, WaveformDriver,
};
use test_case::test_case;

fn unit_config(normalization: Normalization) -> WaveformConfig {
    WaveformConfig {
        budget_bytes: 1_000_000,
        sample_min: 0.0,
        sample_max: 1.0,
        domain_min: 0.0,
        domain_max: 1.0,
        step: 0.5,
        pacing: Duration::from_millis(3),
        normalization,
    }
}

#[test]
fn test_identity_scenario() {
    let mut recorder = Recorder::default();
    let mut clock = VirtualClock::new();
    let mut driver = WaveformDriver::new(MemoryShaper::new(), &mut clock, &mut recorder);

    let summary = driver
        .run(&unit_config(Normalization::Offset), |x| x)
        .expect("run succeeds");
    drop(driver);

    let xs: Vec<f64> = recorder.observed.iter().map(|s| s.x).collect();
    let targets: Vec<usize> = recorder.observed.iter().map(|s| s.target_bytes).collect();
    assert_eq!(xs, vec![0.0, 0.5, 1.0]);
    assert_eq!(targets, vec![0, 500_000, 1_000_000]);
    assert_eq!(recorder.committed, targets);

    assert_eq!(summary.steps, 3);
    assert_eq!(summary.peak_target, 1_000_000);
    assert_eq!(summary.released_bytes, 1_000_000);
    assert_eq!(clock.elapsed(), Duration::from_millis(9));
}

// Both scalings agree when the sample range starts at zero and diverge otherwise.
#[test_case(Normalization::Offset, 0.0, 1.0, vec![0, 500_000, 1_000_000] ; "offset from zero")]
#[test_case(Normalization::Span, 0.0, 1.0, vec![0, 500_000, 1_000_000] ; "span from zero")]
#[test_case(Normalization::Offset, 0.5, 2.0, vec![0, 0, 250_000] ; "offset shifted")]
#[test_case(Normalization::Span, 0.5, 2.0, vec![0, 0, 333_333] ; "span shifted")]
fn test_normalization_policies(
    normalization: Normalization,
    sample_min: f64,
    sample_max: f64,
    expected: Vec<usize>,
) {
    let config = WaveformConfig {
        sample_min,
        sample_max,
        ..unit_config(normalization)
    };
    let mut steps: Vec<StepSample> = Vec::new();
    let mut driver = WaveformDriver::new(MemoryShaper::new(), VirtualClock::new(), &mut steps);
    driver.run(&config, |x| x).expect("run succeeds");
    drop(driver);

    let targets: Vec<usize> = steps.iter().map(|s| s.target_bytes).collect();
    assert_eq!(targets, expected);
}

#[test]
fn test_ledger_follows_falling_waveform() {
    let config = WaveformConfig {
        budget_bytes: 3 * common::MIB,
        domain_min: -1.0,
        domain_max: 1.0,
        step: 0.25,
        ..unit_config(Normalization::Offset)
    };
    let mut recorder = Recorder::default();
    let mut driver = WaveformDriver::new(MemoryShaper::new(), VirtualClock::new(), &mut recorder);
    let summary = driver.run(&config, |x| x * x).expect("run succeeds");
    drop(driver);

    let targets: Vec<usize> = recorder.observed.iter().map(|s| s.target_bytes).collect();
    assert_eq!(recorder.committed, targets);
    assert_eq!(summary.final_target, 3 * common::MIB);
    assert_eq!(summary.released_bytes, 3 * common::MIB);
    assert!(summary.ledger_stats.releases > 0);
}

#[test]
fn test_plotter_budget_from_probe() {
    let config = PlotConfig::for_waveform(Waveform::Parabola)
        .with_domain(-3.0, 3.0, 1.0)
        .with_pacing(Duration::ZERO);
    let plotter = Plotter::new(config);

    let outcome = plotter
        .run(FixedMemory::new(4_000_000, 0.5), VirtualClock::new(), NullProgress)
        .expect("plot succeeds");

    assert_eq!(outcome.snapshot.available_bytes(), 2_000_000);
    assert_eq!(outcome.budget_bytes, 1_800_000);
    assert_eq!(outcome.summary.steps, 7);
    // x = ±3 gives 9 / 9 of the budget
    assert_eq!(outcome.summary.peak_target, 1_800_000);
    assert_eq!(outcome.summary.released_bytes, 1_800_000);
}

#[test]
fn test_invalid_config_is_reported() {
    let config = PlotConfig::default().with_domain(0.0, 1.0, 0.0);
    match config.validate() {
        Err(PlotError::InvalidConfiguration(msg)) => assert!(msg.contains("step")),
        other => panic!("expected configuration error, got {other:?}"),
    }
}

#[test]
fn test_run_stops_on_allocation_failure() {
    let config = WaveformConfig {
        budget_bytes: usize::MAX,
        domain_min: 1.0,
        domain_max: 2.0,
        step: 1.0,
        ..unit_config(Normalization::Offset)
    };
    let shaper = MemoryShaper::with_chunk_ceiling(usize::MAX).expect("ceiling is positive");
    let mut recorder = Recorder::default();
    let mut clock = VirtualClock::new();
    let mut driver = WaveformDriver::new(shaper, &mut clock, &mut recorder);

    let err = driver.run(&config, |x| x).unwrap_err();
    drop(driver);

    assert!(matches!(err, ShapeError::AllocationFailure(_)), "got {err:?}");
    // The failing step was announced but never settled or paced.
    assert_eq!(recorder.observed.len(), 1);
    assert!(recorder.committed.is_empty());
    assert_eq!(clock.pauses(), 0);
}
