use common::{OutputBounds, Result};

use crate::parameters::ScalingParameters;
use crate::token::Token;

/// Which statistics a column accumulates while fitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatisticsMode {
    /// Running minimum and maximum.
    #[default]
    Range,
    /// Running mean and standard deviation (Welford).
    Distribution,
}

/// Online statistics for one column, updated one raw token at a time.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnAccumulator {
    /// `None` until the first numeric value arrives.
    Range { extremes: Option<(f64, f64)> },
    /// Welford state: `count`, running `mean`, and `sum_sq`, the sum of
    /// squared deviations from the mean. `sum_sq >= 0` always holds.
    Distribution { count: u64, mean: f64, sum_sq: f64 },
}

/// Spread of a column and the value that must land on the upper bound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub width: f64,
    pub top: f64,
}

impl ColumnAccumulator {
    pub fn new(mode: StatisticsMode) -> Self {
        match mode {
            StatisticsMode::Range => ColumnAccumulator::Range { extremes: None },
            StatisticsMode::Distribution => ColumnAccumulator::Distribution {
                count: 0,
                mean: 0.0,
                sum_sq: 0.0,
            },
        }
    }

    pub fn mode(&self) -> StatisticsMode {
        match self {
            ColumnAccumulator::Range { .. } => StatisticsMode::Range,
            ColumnAccumulator::Distribution { .. } => StatisticsMode::Distribution,
        }
    }

    /// Consume one raw token. Missing values and signed probabilities are
    /// recognised but do not contribute to the statistics.
    pub fn add(&mut self, raw: &str) -> Result<()> {
        if let Token::Number(x) = Token::parse(raw)? {
            self.add_value(x);
        }
        Ok(())
    }

    pub fn add_value(&mut self, x: f64) {
        if x.is_nan() {
            return;
        }
        match self {
            ColumnAccumulator::Range { extremes } => {
                *extremes = Some(match *extremes {
                    Some((lo, hi)) => (lo.min(x), hi.max(x)),
                    None => (x, x),
                });
            }
            ColumnAccumulator::Distribution {
                count,
                mean,
                sum_sq,
            } => {
                *count += 1;
                let d = x - *mean;
                *mean += d / *count as f64;
                *sum_sq += d * (x - *mean);
            }
        }
    }

    /// True until a numeric value has contributed to the statistics.
    pub fn is_empty(&self) -> bool {
        match self {
            ColumnAccumulator::Range { extremes } => extremes.is_none(),
            ColumnAccumulator::Distribution { count, .. } => *count == 0,
        }
    }

    /// `sqrt(sum_sq / count)`; `None` in range mode or before any value.
    pub fn std_dev(&self) -> Option<f64> {
        match self {
            ColumnAccumulator::Distribution { count, sum_sq, .. } if *count > 0 => {
                Some((sum_sq / *count as f64).sqrt())
            }
            _ => None,
        }
    }

    /// The spread to map onto the output width, or `None` when no value
    /// has been observed.
    pub fn extent(&self) -> Option<Extent> {
        match self {
            ColumnAccumulator::Range { extremes } => extremes.map(|(lo, hi)| Extent {
                width: hi - lo,
                top: hi,
            }),
            ColumnAccumulator::Distribution { mean, .. } => self.std_dev().map(|sd| Extent {
                width: sd,
                top: mean + sd,
            }),
        }
    }

    /// Derive the column's linear map into `bounds`.
    ///
    /// A zero, NaN, infinite or missing extent yields the degenerate map
    /// onto the midpoint.
    pub fn finalize(&self, bounds: OutputBounds) -> ScalingParameters {
        match self.extent() {
            Some(Extent { width, top }) if width > 0.0 && width.is_finite() => {
                let m = bounds.width() / width;
                ScalingParameters::new(m, bounds.upper - m * top, bounds)
            }
            _ => ScalingParameters::degenerate(bounds),
        }
    }
}
