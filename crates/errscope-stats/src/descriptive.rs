/// Size, range, mean and unbiased spread of a sample.
#[derive(Debug, Clone, PartialEq)]
pub struct DescriptiveStats {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// The sample variance (`n - 1` denominator). Zero for a single value.
    pub sample_variance: f64,
    /// The sample standard deviation.
    pub sample_std_dev: f64,
}

impl DescriptiveStats {
    /// Summarizes `values`; `None` when there are none.
    ///
    /// ```
    /// # use errscope_stats::descriptive::DescriptiveStats;
    /// let sample = DescriptiveStats::new([0.0, 1.0, 1.0, 0.0, 1.0]).unwrap();
    /// assert_eq!((sample.min, sample.max), (0.0, 1.0));
    /// assert!((sample.mean - 0.6).abs() < 1e-12);
    /// assert!((sample.sample_variance - 0.3).abs() < 1e-12);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn new<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let values = values.into_iter().collect::<Vec<_>>();
        let count = values.len();
        if count == 0 {
            return None;
        }

        let n = count as f64;
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = values.iter().sum::<f64>() / n;
        let sample_variance = if count > 1 {
            values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)
        } else {
            0.0
        };

        Some(Self {
            count,
            min,
            max,
            mean,
            sample_variance,
            sample_std_dev: sample_variance.sqrt(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_none() {
        assert!(DescriptiveStats::new(Vec::<f64>::new()).is_none());
    }

    #[test]
    fn test_single_value_has_zero_variance() {
        let stats = DescriptiveStats::new([0.7]).unwrap();
        assert_eq!(stats.count, 1);
        assert_eq!(stats.mean, 0.7);
        assert_eq!(stats.sample_variance, 0.0);
    }

    #[test]
    fn test_binary_outcomes() {
        let stats = DescriptiveStats::new([1.0, 0.0, 1.0, 0.0]).unwrap();
        assert!((stats.mean - 0.5).abs() < 1e-12);
        // sum of squared deviations = 4 * 0.25 = 1.0, over n - 1 = 3
        assert!((stats.sample_variance - 1.0 / 3.0).abs() < 1e-12);
    }
}
