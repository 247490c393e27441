//! Percentile-based discretization of continuous features.
//!
//! Every non-outcome column is cut into three ordinal bins using the 10th and
//! 90th percentiles of the *full* population:
//!
//! ```text
//! value <= p10        -> bin 0  (low)
//! p10 < value <= p90  -> bin 1  (typical)
//! value > p90         -> bin 2  (high)
//! ```
//!
//! Thresholds are fit once and reused for the train, held-out and full
//! matrices, so a bin means the same value range in every partition.
//! The outcome column (last) is copied through unchanged.

use errscope_data::FeatureMatrix;
use errscope_stats::percentiles::Percentiles;
use serde::{Deserialize, Serialize};

/// Number of bins each discretized feature has.
pub const NUM_FEATURE_BINS: u32 = 3;

const LOWER_PERCENTILE: f64 = 10.0;
const UPPER_PERCENTILE: f64 = 90.0;

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("matrix has {actual} columns but thresholds were fit on {expected}")]
pub struct WidthMismatchError {
    pub expected: usize,
    pub actual: usize,
}

/// The `(p10, p90)` pair of a single feature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureThreshold {
    pub p10: f64,
    pub p90: f64,
}

impl FeatureThreshold {
    /// Bin index of `value`.
    #[must_use]
    pub fn bin(&self, value: f64) -> u32 {
        if value <= self.p10 {
            0
        } else if value <= self.p90 {
            1
        } else {
            2
        }
    }
}

/// Per-feature thresholds learned from a reference population.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinThresholds {
    /// One entry per non-outcome column.
    pub features: Vec<FeatureThreshold>,
}

impl BinThresholds {
    /// Computes `(p10, p90)` for every column except the last.
    #[must_use]
    pub fn fit(population: &FeatureMatrix) -> Self {
        let features = (0..population.label_col())
            .map(|col| {
                let values = population.column(col).collect::<Vec<_>>();
                let percentiles =
                    Percentiles::new(&values, &[LOWER_PERCENTILE, UPPER_PERCENTILE]);
                FeatureThreshold {
                    p10: percentiles.get(LOWER_PERCENTILE).unwrap_or(f64::NAN),
                    p90: percentiles.get(UPPER_PERCENTILE).unwrap_or(f64::NAN),
                }
            })
            .collect();
        Self { features }
    }

    /// Maps every non-outcome value to its bin index, keeping the row count
    /// and the outcome column.
    pub fn transform(&self, matrix: &FeatureMatrix) -> Result<FeatureMatrix, WidthMismatchError> {
        if matrix.num_cols() != self.features.len() + 1 {
            return Err(WidthMismatchError {
                expected: self.features.len() + 1,
                actual: matrix.num_cols(),
            });
        }
        Ok(matrix.map_values(|col, value| match self.features.get(col) {
            Some(threshold) => f64::from(threshold.bin(value)),
            None => value,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(rows: Vec<Vec<f64>>) -> FeatureMatrix {
        FeatureMatrix::from_rows(rows).unwrap()
    }

    /// Column 0 is 0..=100, column 1 is constant, outcome alternates.
    fn ramp() -> FeatureMatrix {
        matrix(
            (0..=100)
                .map(|i| vec![f64::from(i), 5.0, f64::from(i % 2)])
                .collect(),
        )
    }

    #[test]
    fn test_fit_uses_percentiles_of_each_column() {
        let thresholds = BinThresholds::fit(&ramp());
        assert_eq!(thresholds.features.len(), 2);
        assert_eq!(thresholds.features[0], FeatureThreshold { p10: 10.0, p90: 90.0 });
        assert_eq!(thresholds.features[1], FeatureThreshold { p10: 5.0, p90: 5.0 });
    }

    #[test]
    fn test_bin_boundaries() {
        let threshold = FeatureThreshold { p10: 10.0, p90: 90.0 };
        assert_eq!(threshold.bin(-3.0), 0);
        assert_eq!(threshold.bin(10.0), 0);
        assert_eq!(threshold.bin(10.5), 1);
        assert_eq!(threshold.bin(90.0), 1);
        assert_eq!(threshold.bin(90.1), 2);
    }

    #[test]
    fn test_transform_keeps_outcome_column() {
        let population = ramp();
        let thresholds = BinThresholds::fit(&population);
        let binned = thresholds.transform(&population).unwrap();

        assert_eq!(binned.num_rows(), population.num_rows());
        assert_eq!(
            binned.column(2).collect::<Vec<_>>(),
            population.column(2).collect::<Vec<_>>()
        );
        // constant column sits on both thresholds, so every value is bin 0
        assert!(binned.column(1).all(|v| v == 0.0));

        let counts = (0..3)
            .map(|bin| binned.column(0).filter(|&v| v == f64::from(bin)).count())
            .collect::<Vec<_>>();
        assert_eq!(counts, vec![11, 80, 10]);
    }

    #[test]
    fn test_transform_is_deterministic_for_fixed_thresholds() {
        let population = ramp();
        let thresholds = BinThresholds::fit(&population);
        let subset = matrix(vec![vec![3.0, 5.0, 1.0], vec![95.0, 7.0, 0.0]]);
        let first = thresholds.transform(&subset).unwrap();
        let second = thresholds.transform(&subset).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.row(0), &[0.0, 0.0, 1.0]);
        assert_eq!(first.row(1), &[2.0, 2.0, 0.0]);
    }

    #[test]
    fn test_transform_rejects_other_widths() {
        let thresholds = BinThresholds::fit(&ramp());
        let narrow = matrix(vec![vec![1.0, 0.0]]);
        assert_eq!(
            thresholds.transform(&narrow).unwrap_err(),
            WidthMismatchError {
                expected: 3,
                actual: 2
            }
        );
    }
}
