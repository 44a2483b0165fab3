//! Reference sample functions

use std::fmt;
use std::str::FromStr;

/// `x²`. Ranges over `[0, 9]` on `[-3, 3]`.
pub fn parabola(x: f64) -> f64 {
    x * x
}

/// `|sin x| + 5·e^(-x¹⁰⁰)·cos x`.
///
/// A rectified sine with a tall narrow spike on `(-1, 1)`; the `x¹⁰⁰` term
/// makes the spike's sides nearly vertical. Equals 5 at `x = 0` and tops
/// out at √26 near `x ≈ 0.2`, slightly above its nominal `[0, 5]` range.
pub fn pulse(x: f64) -> f64 {
    x.sin().abs() + 5.0 * (-x.powi(100)).exp() * x.cos()
}

/// Built-in shapes selectable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    /// See [`parabola`].
    Parabola,
    /// See [`pulse`].
    Pulse,
}

impl Waveform {
    /// Every built-in shape.
    pub const ALL: [Waveform; 2] = [Waveform::Parabola, Waveform::Pulse];

    /// Evaluate the shape at `x`.
    pub fn sample(self, x: f64) -> f64 {
        match self {
            Waveform::Parabola => parabola(x),
            Waveform::Pulse => pulse(x),
        }
    }

    /// `(min, max)` sample values to use when plotting over `[-3, 3]`.
    pub fn sample_range(self) -> (f64, f64) {
        match self {
            Waveform::Parabola => (0.0, 9.0),
            Waveform::Pulse => (0.0, 5.0),
        }
    }

    /// Lower-case name used on the command line.
    pub fn name(self) -> &'static str {
        match self {
            Waveform::Parabola => "parabola",
            Waveform::Pulse => "pulse",
        }
    }
}

impl fmt::Display for Waveform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Waveform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.to_ascii_lowercase();
        Waveform::ALL
            .into_iter()
            .find(|w| w.name() == wanted)
            .ok_or_else(|| format!("unknown waveform '{s}' (expected parabola or pulse)"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pulse_peaks_at_origin() {
        assert!((pulse(0.0) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_pulse_spike_is_gone_outside_unit_interval() {
        let x: f64 = 1.5;
        assert!((pulse(x) - x.sin().abs()).abs() < 1e-9);
        assert!((pulse(-x) - x.sin().abs()).abs() < 1e-9);
    }

    #[test]
    fn test_samples_stay_near_range() {
        for waveform in Waveform::ALL {
            let (min, max) = waveform.sample_range();
            for i in 0..=600 {
                let x = -3.0 + i as f64 * 0.01;
                let y = waveform.sample(x);
                assert!(y >= min - 1e-9, "{waveform}({x}) = {y}");
                assert!(y <= max * 1.02 + 1e-9, "{waveform}({x}) = {y}");
            }
        }
    }

    #[test]
    fn test_pulse_overshoot_is_sqrt_26() {
        let peak = (0..=1000)
            .map(|i| pulse(i as f64 * 0.001))
            .fold(f64::MIN, f64::max);
        assert!((peak - 26f64.sqrt()).abs() < 1e-3);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("Pulse".parse::<Waveform>().unwrap(), Waveform::Pulse);
        assert_eq!("parabola".parse::<Waveform>().unwrap(), Waveform::Parabola);
        assert!("sine".parse::<Waveform>().is_err());
    }
}
