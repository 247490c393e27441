//! Non-parametric bootstrap confidence intervals.
//!
//! A subgroup's error rate is the mean of its binary outcomes. The bootstrap
//! estimates how much that mean would move under resampling: draw `n`
//! outcomes with replacement, take the mean, repeat many times, and read the
//! interval off the percentiles of the resampled means (the percentile
//! method).
//!
//! Resampling is far more expensive than the t-test, so the discovery engine
//! only runs it for rules an analyst asks to inspect.
//!
//! # Randomness
//!
//! Every call owns its generator. With `seed: None` the generator is seeded
//! from the operating system, so repeated calls are independent; with
//! `seed: Some(_)` the interval is reproducible.

use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};

use crate::percentiles;

/// Parameters of a bootstrap run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    /// Number of resamples drawn.
    pub resamples: usize,
    /// Two-sided confidence level in `(0, 1)`.
    pub confidence_level: f64,
    /// Generator seed; `None` draws a fresh seed from the OS for every call.
    pub seed: Option<u64>,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            resamples: 9999,
            confidence_level: 0.95,
            seed: None,
        }
    }
}

/// A closed interval `[lower, upper]`.
///
/// Serialized as a two-element array.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
}

impl ConfidenceInterval {
    #[must_use]
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        self.lower <= value && value <= self.upper
    }
}

impl From<[f64; 2]> for ConfidenceInterval {
    fn from([lower, upper]: [f64; 2]) -> Self {
        Self { lower, upper }
    }
}

impl From<ConfidenceInterval> for [f64; 2] {
    fn from(ci: ConfidenceInterval) -> Self {
        [ci.lower, ci.upper]
    }
}

/// Computes a percentile-bootstrap confidence interval for the mean of `sample`.
///
/// Returns `None` for an empty sample or a configuration with zero resamples;
/// there is nothing to resample.
///
/// # Examples
///
/// ```
/// use errscope_stats::bootstrap::{BootstrapConfig, mean_confidence_interval};
///
/// let config = BootstrapConfig { resamples: 200, seed: Some(1), ..Default::default() };
/// assert!(mean_confidence_interval(&[], &config).is_none());
///
/// let ci = mean_confidence_interval(&[1.0; 10], &config).unwrap();
/// assert_eq!((ci.lower, ci.upper), (1.0, 1.0));
/// ```
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn mean_confidence_interval(
    sample: &[f64],
    config: &BootstrapConfig,
) -> Option<ConfidenceInterval> {
    if sample.is_empty() || config.resamples == 0 {
        return None;
    }

    let mut rng = match config.seed {
        Some(seed) => Pcg64::seed_from_u64(seed),
        None => Pcg64::from_os_rng(),
    };

    let n = sample.len();
    let mut means = (0..config.resamples)
        .map(|_| {
            let sum = (0..n).map(|_| sample[rng.random_range(0..n)]).sum::<f64>();
            sum / n as f64
        })
        .collect::<Vec<_>>();
    means.sort_by(f64::total_cmp);

    let alpha = (1.0 - config.confidence_level.clamp(0.0, 1.0)) / 2.0;
    Some(ConfidenceInterval {
        lower: percentiles::compute_percentile(&means, alpha * 100.0),
        upper: percentiles::compute_percentile(&means, (1.0 - alpha) * 100.0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcomes(len: usize, error_rate: f64) -> Vec<f64> {
        #[expect(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            clippy::cast_precision_loss
        )]
        let errors = (len as f64 * error_rate).round() as usize;
        (0..len)
            .map(|i| if i < errors { 1.0 } else { 0.0 })
            .collect()
    }

    fn config(seed: u64) -> BootstrapConfig {
        BootstrapConfig {
            resamples: 1000,
            confidence_level: 0.95,
            seed: Some(seed),
        }
    }

    #[test]
    fn test_empty_sample_has_no_interval() {
        assert!(mean_confidence_interval(&[], &config(0)).is_none());
    }

    #[test]
    fn test_zero_resamples_has_no_interval() {
        let config = BootstrapConfig {
            resamples: 0,
            ..config(0)
        };
        assert!(mean_confidence_interval(&[1.0, 0.0], &config).is_none());
    }

    #[test]
    fn test_same_seed_is_reproducible() {
        let sample = outcomes(50, 0.3);
        let a = mean_confidence_interval(&sample, &config(11)).unwrap();
        let b = mean_confidence_interval(&sample, &config(11)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_covers_true_rate_across_seeds() {
        let sample = outcomes(1000, 0.4);
        let covered = (0..20)
            .filter(|&seed| {
                mean_confidence_interval(&sample, &config(seed))
                    .unwrap()
                    .contains(0.4)
            })
            .count();
        assert!(covered >= 18, "covered only {covered}/20");
    }

    #[test]
    fn test_width_shrinks_with_sample_size() {
        let small = mean_confidence_interval(&outcomes(20, 0.4), &config(3)).unwrap();
        let medium = mean_confidence_interval(&outcomes(200, 0.4), &config(3)).unwrap();
        let large = mean_confidence_interval(&outcomes(2000, 0.4), &config(3)).unwrap();
        assert!(small.width() > medium.width());
        assert!(medium.width() > large.width());
    }

    #[test]
    fn test_serializes_as_pair() {
        let ci = ConfidenceInterval {
            lower: 0.25,
            upper: 0.5,
        };
        let json = serde_json::to_string(&ci).unwrap();
        assert_eq!(json, "[0.25,0.5]");
        let back: ConfidenceInterval = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ci);
    }
}
