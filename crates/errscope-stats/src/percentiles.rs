/// Percentile values of one column, computed once and looked up by point.
///
/// The discretizer asks for the 10th and 90th percentile of every feature
/// column; keeping the requested points alongside their values lets it read
/// both back by name.
///
/// # Examples
///
/// ```
/// use errscope_stats::percentiles::Percentiles;
///
/// let column = [5.0, 1.0, 4.0, 2.0, 3.0];
/// let cuts = Percentiles::new(&column, &[10.0, 50.0, 90.0]);
///
/// assert_eq!(cuts.get(50.0), Some(3.0));
/// assert!((cuts.get(10.0).unwrap() - 1.4).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct Percentiles {
    /// `(point, value)` in request order; points are on the 0-100 scale.
    values: Vec<(f64, f64)>,
}

impl Percentiles {
    /// Evaluates `points` on a column that is already in ascending order.
    ///
    /// # Panics
    ///
    /// If `sorted_values` is out of order.
    #[must_use]
    pub fn from_sorted(sorted_values: &[f64], points: &[f64]) -> Self {
        assert!(
            sorted_values.is_sorted_by(|a, b| a.total_cmp(b).is_le()),
            "column must be in ascending order"
        );

        let values = points
            .iter()
            .map(|&p| (p, compute_percentile(sorted_values, p)))
            .collect();
        Self { values }
    }

    /// Sorts a copy of `values` (NaN last) and evaluates `points` on it.
    #[must_use]
    pub fn new(values: &[f64], points: &[f64]) -> Self {
        let mut column = values.to_vec();
        column.sort_by(f64::total_cmp);
        Self::from_sorted(&column, points)
    }

    /// Value at `point`, or `None` when that point was not requested.
    #[must_use]
    pub fn get(&self, point: f64) -> Option<f64> {
        self.values
            .iter()
            .find(|(p, _)| (p - point).abs() < f64::EPSILON)
            .map(|&(_, value)| value)
    }

    /// `(point, value)` pairs in request order.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.values.iter().copied()
    }
}

/// The `percentile`-th percentile of an ascending column.
///
/// Interpolates linearly between the two nearest order
/// statistics, the same definition `numpy.percentile` uses by default:
/// the k-th percentile of n values sits at fractional position
/// `(n - 1) * k / 100`.
///
/// An empty column has no percentiles: the result is NaN.
///
/// ```
/// use errscope_stats::percentiles::compute_percentile;
///
/// let column = [1.0, 2.0, 3.0, 4.0, 5.0];
/// assert_eq!(compute_percentile(&column, 25.0), 2.0);
/// assert!((compute_percentile(&column, 90.0) - 4.6).abs() < 1e-12);
/// assert!(compute_percentile(&[], 50.0).is_nan());
/// ```
#[expect(
    clippy::cast_sign_loss,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss
)]
#[must_use]
pub fn compute_percentile(sorted_values: &[f64], percentile: f64) -> f64 {
    if sorted_values.is_empty() {
        return f64::NAN;
    }
    let last = sorted_values.len() - 1;
    let position = (last as f64 * percentile.clamp(0.0, 100.0)) / 100.0;
    let lower = (position.floor() as usize).min(last);
    let upper = (position.ceil() as usize).min(last);
    let fraction = position - lower as f64;
    let (lo, hi) = (sorted_values[lower], sorted_values[upper]);
    lo + (hi - lo) * fraction
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_nan() {
        assert!(compute_percentile(&[], 10.0).is_nan());
    }

    #[test]
    fn test_single_value() {
        assert_eq!(compute_percentile(&[4.0], 10.0), 4.0);
        assert_eq!(compute_percentile(&[4.0], 90.0), 4.0);
    }

    #[test]
    fn test_matches_numpy_on_binary_column() {
        // numpy.percentile([0]*80 + [1]*20, [10, 90]) == [0.0, 1.0]
        let mut values = vec![0.0; 80];
        values.extend(vec![1.0; 20]);
        let percentiles = Percentiles::from_sorted(&values, &[10.0, 90.0]);
        assert_eq!(percentiles.get(10.0), Some(0.0));
        assert_eq!(percentiles.get(90.0), Some(1.0));
    }

    #[test]
    fn test_unsorted_input_is_sorted() {
        let percentiles = Percentiles::new(&[9.0, 1.0, 5.0], &[0.0, 50.0, 100.0]);
        let collected = percentiles.iter().collect::<Vec<_>>();
        assert_eq!(collected, vec![(0.0, 1.0), (50.0, 5.0), (100.0, 9.0)]);
    }

    #[test]
    fn test_interpolates_between_ranks() {
        let values = (0..=10).map(f64::from).collect::<Vec<_>>();
        assert!((compute_percentile(&values, 15.0) - 1.5).abs() < 1e-12);
    }
}
