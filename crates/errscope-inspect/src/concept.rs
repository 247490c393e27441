//! Statistics of a user-defined concept: a set of tokens joined by OR.
//!
//! A concept is always evaluated against the full token population, never
//! against a previously narrowed one. Member tokens that are not loaded are
//! ignored; a concept with no known member, or one that matches no row,
//! reports support `0`, error rate `0` and the interval `[0, 0]` without
//! resampling.

use errscope_stats::bootstrap::{BootstrapConfig, ConfidenceInterval, mean_confidence_interval};
use serde::{Deserialize, Serialize};

use crate::{
    data::InspectionData,
    path::{any_member_set, known_columns},
    population::Population,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConceptStat {
    pub err_rate: f64,
    pub ci: ConfidenceInterval,
    pub support: usize,
}

impl ConceptStat {
    const EMPTY: Self = Self {
        err_rate: 0.0,
        ci: ConfidenceInterval {
            lower: 0.0,
            upper: 0.0,
        },
        support: 0,
    };
}

/// Produces a confidence interval for the mean of a sample.
pub trait IntervalEstimator {
    fn interval(&self, sample: &[f64]) -> Option<ConfidenceInterval>;
}

impl IntervalEstimator for BootstrapConfig {
    fn interval(&self, sample: &[f64]) -> Option<ConfidenceInterval> {
        mean_confidence_interval(sample, self)
    }
}

/// Evaluates concepts against one [`InspectionData`].
#[derive(Debug, Clone)]
pub struct ConceptEvaluator<'a, E = BootstrapConfig> {
    data: &'a InspectionData,
    estimator: E,
}

impl<'a, E> ConceptEvaluator<'a, E>
where
    E: IntervalEstimator,
{
    pub fn new(data: &'a InspectionData, estimator: E) -> Self {
        Self { data, estimator }
    }

    #[must_use]
    pub fn evaluate(&self, tokens: &[String]) -> ConceptStat {
        let Some(table) = self.data.tokens() else {
            return ConceptStat::EMPTY;
        };
        let members = known_columns(table, tokens);
        if members.is_empty() {
            tracing::debug!(tokens = tokens.len(), "concept has no known token");
            return ConceptStat::EMPTY;
        }

        let matched =
            Population::full(self.data.num_rows()).narrow(|row| any_member_set(&members, row));
        if matched.is_empty() {
            return ConceptStat::EMPTY;
        }

        let is_error = self.data.is_error();
        let ci = self
            .estimator
            .interval(&matched.outcomes(is_error))
            .unwrap_or_default();
        ConceptStat {
            err_rate: matched.error_rate(is_error),
            ci,
            support: matched.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::data::tests::sample;

    #[derive(Default)]
    struct CountingEstimator {
        calls: Cell<usize>,
    }

    impl IntervalEstimator for CountingEstimator {
        #[expect(clippy::cast_precision_loss)]
        fn interval(&self, sample: &[f64]) -> Option<ConfidenceInterval> {
            self.calls.set(self.calls.get() + 1);
            Some(ConfidenceInterval {
                lower: 0.0,
                upper: sample.len() as f64,
            })
        }
    }

    fn names(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|&t| t.to_owned()).collect()
    }

    #[test]
    fn test_unknown_tokens_skip_resampling() {
        let data = sample();
        let evaluator = ConceptEvaluator::new(&data, CountingEstimator::default());
        let stat = evaluator.evaluate(&names(&["nope", "nada"]));
        assert_eq!(stat, ConceptStat::EMPTY);
        assert_eq!(evaluator.estimator.calls.get(), 0);

        let stat = evaluator.evaluate(&[]);
        assert_eq!(stat.support, 0);
        assert_eq!(evaluator.estimator.calls.get(), 0);
    }

    #[test]
    fn test_or_over_members() {
        let data = sample();
        let evaluator = ConceptEvaluator::new(&data, CountingEstimator::default());
        let stat = evaluator.evaluate(&names(&["late", "nope"]));
        assert_eq!(stat.support, 3);
        assert!((stat.err_rate - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(evaluator.estimator.calls.get(), 1);
        assert_eq!(stat.ci.upper, 3.0);
    }

    #[test]
    fn test_bootstrap_interval() {
        let data = sample();
        let config = BootstrapConfig {
            resamples: 500,
            seed: Some(5),
            ..BootstrapConfig::default()
        };
        let stat = ConceptEvaluator::new(&data, config).evaluate(&names(&["refund", "late"]));
        assert_eq!(stat.support, 5);
        assert!(stat.ci.lower <= stat.err_rate && stat.err_rate <= stat.ci.upper);
    }

    #[test]
    fn test_without_token_table() {
        let data = InspectionData::new(vec![1, 0]);
        let stat = ConceptEvaluator::new(&data, BootstrapConfig::default())
            .evaluate(&names(&["late"]));
        assert_eq!(stat, ConceptStat::EMPTY);
    }

    #[test]
    fn test_wire_format() {
        let json = serde_json::to_value(ConceptStat::EMPTY).unwrap();
        assert_eq!(json, serde_json::json!({"err_rate": 0.0, "ci": [0.0, 0.0], "support": 0}));
    }
}
