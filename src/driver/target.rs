//! Mapping a sample value onto a byte target

use std::fmt;
use std::str::FromStr;

/// How a sample is scaled into the memory budget.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Normalization {
    /// `(y - min) / max`. Only the lower bound is subtracted; this is the
    /// scaling the plotter has always used and is the default.
    #[default]
    Offset,
    /// `(y - min) / (max - min)`, mapping the full sample range onto the
    /// budget.
    Span,
}

impl Normalization {
    /// Fraction of the budget that sample `y` asks for.
    pub fn fraction(self, y: f64, sample_min: f64, sample_max: f64) -> f64 {
        match self {
            Normalization::Offset => (y - sample_min) / sample_max,
            Normalization::Span => (y - sample_min) / (sample_max - sample_min),
        }
    }

    /// Byte target for sample `y`, rounded down.
    ///
    /// Negative and NaN results collapse to zero.
    pub fn target(self, y: f64, sample_min: f64, sample_max: f64, budget_bytes: usize) -> usize {
        let bytes = self.fraction(y, sample_min, sample_max) * budget_bytes as f64;
        // float-to-int `as` saturates and maps NaN to 0
        bytes.floor() as usize
    }
}

impl fmt::Display for Normalization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Normalization::Offset => "offset",
            Normalization::Span => "span",
        })
    }
}

impl FromStr for Normalization {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "offset" => Ok(Normalization::Offset),
            "span" => Ok(Normalization::Span),
            other => Err(format!("unknown normalization '{other}' (expected offset or span)")),
        }
    }
}
