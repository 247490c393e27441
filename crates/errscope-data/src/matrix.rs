use serde::{Deserialize, Serialize};

use crate::DatasetError;

/// A fixed-width, row-major matrix of feature values.
///
/// The last column is always the outcome column (a class label or a
/// prediction). Discretization leaves it untouched and the subgroup search
/// treats it as one more categorical feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<f64>>", into = "Vec<Vec<f64>>")]
pub struct FeatureMatrix {
    width: usize,
    values: Vec<f64>,
}

impl FeatureMatrix {
    /// Builds a matrix from rows, checking every row has the same width.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, DatasetError> {
        let width = rows.first().ok_or(DatasetError::Empty)?.len();
        let mut values = Vec::with_capacity(rows.len() * width);
        for (row, cells) in rows.into_iter().enumerate() {
            if cells.len() != width {
                return Err(DatasetError::RaggedRow {
                    row,
                    expected: width,
                    actual: cells.len(),
                });
            }
            values.extend(cells);
        }
        Ok(Self { width, values })
    }

    #[must_use]
    pub fn num_rows(&self) -> usize {
        if self.width == 0 {
            0
        } else {
            self.values.len() / self.width
        }
    }

    #[must_use]
    pub fn num_cols(&self) -> usize {
        self.width
    }

    /// Index of the outcome column.
    #[must_use]
    pub fn label_col(&self) -> usize {
        self.width.saturating_sub(1)
    }

    #[must_use]
    pub fn row(&self, row: usize) -> &[f64] {
        &self.values[row * self.width..(row + 1) * self.width]
    }

    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.width + col]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> + '_ {
        self.values.chunks_exact(self.width.max(1))
    }

    /// Iterates the values of one column, top to bottom.
    pub fn column(&self, col: usize) -> impl Iterator<Item = f64> + '_ {
        self.rows().map(move |row| row[col])
    }

    /// Returns a new matrix with every value replaced by `f(col, value)`.
    #[must_use]
    pub fn map_values<F>(&self, mut f: F) -> Self
    where
        F: FnMut(usize, f64) -> f64,
    {
        let values = self
            .values
            .iter()
            .enumerate()
            .map(|(i, &v)| f(i % self.width, v))
            .collect();
        Self {
            width: self.width,
            values,
        }
    }
}

impl TryFrom<Vec<Vec<f64>>> for FeatureMatrix {
    type Error = DatasetError;

    fn try_from(rows: Vec<Vec<f64>>) -> Result<Self, Self::Error> {
        Self::from_rows(rows)
    }
}

impl From<FeatureMatrix> for Vec<Vec<f64>> {
    fn from(matrix: FeatureMatrix) -> Self {
        matrix.rows().map(<[f64]>::to_vec).collect()
    }
}

/// A feature matrix paired with per-row error labels.
///
/// `is_error[i]` is `1` when the model's prediction for row `i` differs from
/// the ground truth, `0` otherwise. It is derived outside this crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DatasetRepr")]
pub struct Dataset {
    matrix: FeatureMatrix,
    is_error: Vec<u8>,
}

#[derive(Deserialize)]
struct DatasetRepr {
    matrix: FeatureMatrix,
    is_error: Vec<u8>,
}

impl TryFrom<DatasetRepr> for Dataset {
    type Error = DatasetError;

    fn try_from(repr: DatasetRepr) -> Result<Self, Self::Error> {
        Self::new(repr.matrix, repr.is_error)
    }
}

/// Checks that every error label is `0` or `1`.
pub fn check_binary_labels(is_error: &[u8]) -> Result<(), DatasetError> {
    match is_error.iter().position(|&e| e > 1) {
        Some(row) => Err(DatasetError::NonBinaryLabel {
            row,
            value: is_error[row],
        }),
        None => Ok(()),
    }
}

impl Dataset {
    pub fn new(matrix: FeatureMatrix, is_error: Vec<u8>) -> Result<Self, DatasetError> {
        if matrix.num_rows() != is_error.len() {
            return Err(DatasetError::LengthMismatch {
                kind: "error label vector",
                expected: matrix.num_rows(),
                actual: is_error.len(),
            });
        }
        check_binary_labels(&is_error)?;
        Ok(Self { matrix, is_error })
    }

    #[must_use]
    pub fn matrix(&self) -> &FeatureMatrix {
        &self.matrix
    }

    #[must_use]
    pub fn is_error(&self) -> &[u8] {
        &self.is_error
    }

    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.is_error.len()
    }

    /// Replaces the matrix, keeping the labels. Used after discretization.
    pub fn with_matrix(&self, matrix: FeatureMatrix) -> Result<Self, DatasetError> {
        Self::new(matrix, self.is_error.clone())
    }

    /// Error labels of the given rows, as `f64` samples.
    #[must_use]
    pub fn outcomes(&self, rows: &[usize]) -> Vec<f64> {
        rows.iter().map(|&r| f64::from(self.is_error[r])).collect()
    }

    /// Fraction of the given rows that are errors; `0.0` when `rows` is empty.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn error_rate(&self, rows: &[usize]) -> f64 {
        if rows.is_empty() {
            return 0.0;
        }
        let errors = rows.iter().filter(|&&r| self.is_error[r] != 0).count();
        errors as f64 / rows.len() as f64
    }
}
