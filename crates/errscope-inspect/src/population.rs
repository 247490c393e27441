use std::sync::Arc;

/// An immutable set of matched row ids, ascending.
///
/// Narrowing never mutates a population; it returns a new handle, so one
/// evaluation can keep every intermediate step around and independent
/// evaluations share nothing mutable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Population {
    rows: Arc<[usize]>,
}

impl Population {
    /// Every row of a table with `num_rows` rows.
    #[must_use]
    pub fn full(num_rows: usize) -> Self {
        Self {
            rows: (0..num_rows).collect(),
        }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self {
            rows: Arc::from(Vec::new()),
        }
    }

    #[must_use]
    pub fn rows(&self) -> &[usize] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The rows of `self` that satisfy `keep`.
    #[must_use]
    pub fn narrow<F>(&self, mut keep: F) -> Self
    where
        F: FnMut(usize) -> bool,
    {
        Self {
            rows: self.rows.iter().copied().filter(|&row| keep(row)).collect(),
        }
    }

    #[must_use]
    pub fn error_count(&self, is_error: &[u8]) -> usize {
        self.rows.iter().filter(|&&row| is_error[row] != 0).count()
    }

    /// Fraction of rows that are errors; `0.0` for an empty population.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn error_rate(&self, is_error: &[u8]) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        self.error_count(is_error) as f64 / self.len() as f64
    }

    /// Error indicators of the rows (`1.0` for any non-zero label), as `f64`
    /// samples.
    #[must_use]
    pub fn outcomes(&self, is_error: &[u8]) -> Vec<f64> {
        self.rows
            .iter()
            .map(|&row| f64::from(u8::from(is_error[row] != 0)))
            .collect()
    }
}
