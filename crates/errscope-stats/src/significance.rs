//! One-sample significance testing against a fixed baseline.
//!
//! The subgroup validator asks a single question of every candidate rule:
//! is the error rate among the rows it matches higher than the model's
//! overall error rate? The matched rows' binary outcomes are treated as a
//! sample, and a one-sample Student's t-test compares their mean to the
//! baseline.
//!
//! The two-sided p-value is halved to obtain the one-sided p-value. This is
//! only meaningful because the direction of the alternative (higher error)
//! is fixed before looking at the data; callers should read
//! [`OneSampleTTest::statistic`] together with the p-value.
//!
//! # Degenerate samples
//!
//! The t statistic is undefined for fewer than two observations or for a
//! sample with zero variance. Instead of propagating `NaN`:
//!
//! - fewer than two observations: `statistic = 0`, `p_two_sided = 1`
//! - zero variance, mean equal to the baseline: `statistic = 0`, `p_two_sided = 1`
//! - zero variance, mean different from the baseline: `statistic = ±inf`,
//!   `p_two_sided = 0`

use serde::{Deserialize, Serialize};

use crate::descriptive::DescriptiveStats;

/// Result of a one-sample t-test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OneSampleTTest {
    /// The t statistic `(mean - baseline) / (s / sqrt(n))`.
    pub statistic: f64,
    /// Degrees of freedom (`n - 1`).
    pub degrees_of_freedom: f64,
    /// Two-sided p-value.
    pub p_two_sided: f64,
    /// Half of the two-sided p-value.
    pub p_one_sided: f64,
}

impl OneSampleTTest {
    /// Runs the test for `sample` against `baseline`.
    ///
    /// # Examples
    ///
    /// ```
    /// use errscope_stats::significance::OneSampleTTest;
    ///
    /// let test = OneSampleTTest::run(&[0.0, 1.0, 0.0, 1.0], 0.5);
    /// assert_eq!(test.statistic, 0.0);
    /// assert!((test.p_two_sided - 1.0).abs() < 1e-12);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn run(sample: &[f64], baseline: f64) -> Self {
        let Some(stats) = DescriptiveStats::new(sample.iter().copied()) else {
            return Self::undetermined(0.0);
        };
        if stats.count < 2 {
            return Self::undetermined(0.0);
        }

        let df = (stats.count - 1) as f64;
        let diff = stats.mean - baseline;
        let std_err = stats.sample_std_dev / (stats.count as f64).sqrt();

        if std_err == 0.0 {
            if diff == 0.0 {
                return Self::undetermined(df);
            }
            return Self {
                statistic: diff.signum() * f64::INFINITY,
                degrees_of_freedom: df,
                p_two_sided: 0.0,
                p_one_sided: 0.0,
            };
        }

        let statistic = diff / std_err;
        let p_two_sided = student_t_two_sided_p(statistic, df);
        Self {
            statistic,
            degrees_of_freedom: df,
            p_two_sided,
            p_one_sided: p_two_sided / 2.0,
        }
    }

    fn undetermined(degrees_of_freedom: f64) -> Self {
        Self {
            statistic: 0.0,
            degrees_of_freedom,
            p_two_sided: 1.0,
            p_one_sided: 0.5,
        }
    }
}

/// Two-sided tail probability `P(|T| >= |t|)` of Student's t distribution.
///
/// Uses the identity `P(|T| >= t) = I_x(df / 2, 1 / 2)` with
/// `x = df / (df + t^2)`, where `I_x` is the regularized incomplete beta
/// function.
///
/// # Examples
///
/// ```
/// use errscope_stats::significance::student_t_two_sided_p;
///
/// // With one degree of freedom, t is Cauchy distributed: P(|T| >= 1) = 0.5
/// assert!((student_t_two_sided_p(1.0, 1.0) - 0.5).abs() < 1e-9);
/// ```
#[must_use]
pub fn student_t_two_sided_p(t: f64, df: f64) -> f64 {
    if t.is_infinite() {
        return 0.0;
    }
    let x = df / (df + t * t);
    regularized_incomplete_beta(df / 2.0, 0.5, x).clamp(0.0, 1.0)
}

/// Regularized incomplete beta function `I_x(a, b)`.
///
/// Evaluated with the continued fraction expansion (modified Lentz), using
/// the symmetry `I_x(a, b) = 1 - I_{1-x}(b, a)` where the fraction converges
/// faster.
#[must_use]
pub fn regularized_incomplete_beta(a: f64, b: f64, x: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }
    let ln_front = ln_gamma(a + b) - ln_gamma(a) - ln_gamma(b) + a * x.ln() + b * (1.0 - x).ln();
    let front = ln_front.exp();
    if x < (a + 1.0) / (a + b + 2.0) {
        front * beta_continued_fraction(a, b, x) / a
    } else {
        1.0 - front * beta_continued_fraction(b, a, 1.0 - x) / b
    }
}

#[expect(clippy::cast_precision_loss)]
fn beta_continued_fraction(a: f64, b: f64, x: f64) -> f64 {
    const MAX_ITERATIONS: usize = 300;
    const EPS: f64 = 3.0e-16;
    const FP_MIN: f64 = 1.0e-300;

    let non_zero = |v: f64| if v.abs() < FP_MIN { FP_MIN } else { v };

    let qab = a + b;
    let qap = a + 1.0;
    let qam = a - 1.0;
    let mut c = 1.0;
    let mut d = 1.0 / non_zero(1.0 - qab * x / qap);
    let mut h = d;

    for m in 1..=MAX_ITERATIONS {
        let m = m as f64;
        let m2 = 2.0 * m;

        let aa = m * (b - m) * x / ((qam + m2) * (a + m2));
        d = 1.0 / non_zero(1.0 + aa * d);
        c = non_zero(1.0 + aa / c);
        h *= d * c;

        let aa = -(a + m) * (qab + m) * x / ((a + m2) * (qap + m2));
        d = 1.0 / non_zero(1.0 + aa * d);
        c = non_zero(1.0 + aa / c);
        let delta = d * c;
        h *= delta;

        if (delta - 1.0).abs() < EPS {
            break;
        }
    }
    h
}

/// Natural logarithm of the gamma function (Lanczos approximation, g = 7).
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn ln_gamma(x: f64) -> f64 {
    const G: f64 = 7.0;
    const COEFFICIENTS: [f64; 9] = [
        0.999_999_999_999_809_9,
        676.520_368_121_885_1,
        -1_259.139_216_722_402_8,
        771.323_428_777_653_1,
        -176.615_029_162_140_6,
        12.507_343_278_686_905,
        -0.138_571_095_265_720_12,
        9.984_369_578_019_572e-6,
        1.505_632_735_149_311_6e-7,
    ];

    if x < 0.5 {
        // reflection formula
        let pi = std::f64::consts::PI;
        return (pi / (pi * x).sin()).ln() - ln_gamma(1.0 - x);
    }

    let x = x - 1.0;
    let t = x + G + 0.5;
    let series = COEFFICIENTS
        .iter()
        .enumerate()
        .skip(1)
        .fold(COEFFICIENTS[0], |acc, (i, &c)| acc + c / (x + i as f64));
    0.5 * (2.0 * std::f64::consts::PI).ln() + (x + 0.5) * t.ln() - t + series.ln()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn test_ln_gamma_factorials() {
        assert!(approx(ln_gamma(1.0), 0.0, 1e-12));
        assert!(approx(ln_gamma(2.0), 0.0, 1e-12));
        assert!(approx(ln_gamma(5.0), 24.0_f64.ln(), 1e-10));
        assert!(approx(ln_gamma(0.5), std::f64::consts::PI.sqrt().ln(), 1e-10));
    }

    #[test]
    fn test_incomplete_beta_edges_and_symmetry() {
        assert_eq!(regularized_incomplete_beta(2.0, 3.0, 0.0), 0.0);
        assert_eq!(regularized_incomplete_beta(2.0, 3.0, 1.0), 1.0);
        // I_x(1, 1) is the uniform CDF
        assert!(approx(regularized_incomplete_beta(1.0, 1.0, 0.3), 0.3, 1e-12));
        let lhs = regularized_incomplete_beta(2.5, 4.0, 0.35);
        let rhs = 1.0 - regularized_incomplete_beta(4.0, 2.5, 0.65);
        assert!(approx(lhs, rhs, 1e-12));
    }

    #[test]
    fn test_student_t_critical_values() {
        // two-sided 5% critical values from standard t tables
        assert!(approx(student_t_two_sided_p(2.228, 10.0), 0.05, 5e-4));
        assert!(approx(student_t_two_sided_p(1.972, 200.0), 0.05, 5e-4));
        assert!(approx(student_t_two_sided_p(0.0, 7.0), 1.0, 1e-12));
    }

    #[test]
    fn test_higher_error_subgroup_is_significant() {
        let mut sample = vec![1.0; 30];
        sample.extend(vec![0.0; 10]);
        let test = OneSampleTTest::run(&sample, 0.3);
        assert!(test.statistic > 5.0);
        assert!(test.p_one_sided < 1e-6);
        assert!(approx(test.p_one_sided * 2.0, test.p_two_sided, 1e-15));
        assert_eq!(test.degrees_of_freedom, 39.0);
    }

    #[test]
    fn test_lower_error_subgroup_has_negative_statistic() {
        let mut sample = vec![1.0; 2];
        sample.extend(vec![0.0; 38]);
        let test = OneSampleTTest::run(&sample, 0.3);
        assert!(test.statistic < 0.0);
    }

    #[test]
    fn test_degenerate_samples() {
        let empty = OneSampleTTest::run(&[], 0.3);
        assert_eq!(empty.statistic, 0.0);
        assert_eq!(empty.p_two_sided, 1.0);

        let single = OneSampleTTest::run(&[1.0], 0.3);
        assert_eq!(single.p_one_sided, 0.5);

        let all_errors = OneSampleTTest::run(&[1.0; 12], 0.3);
        assert_eq!(all_errors.statistic, f64::INFINITY);
        assert_eq!(all_errors.p_one_sided, 0.0);
    }
}
