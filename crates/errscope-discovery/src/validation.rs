//! Statistical checks attached to retained rules.
//!
//! Both checks look at the error labels of the rule's *train* rows:
//!
//! - [`attach_significance`]: one-sample t-test of those labels against the
//!   model's overall error rate. The reported p-value is the two-sided one
//!   halved, i.e. the one-sided p-value when the rule's error rate is above
//!   the model's.
//! - [`attach_confidence_intervals`]: bootstrap confidence interval of the
//!   rule's error rate.
//!
//! A rule whose matched rows are all errors (or all correct) has zero
//! variance and an infinite t statistic. JSON has no infinity, so such a
//! `t_val` is written as the string `"inf"` or `"-inf"`.

use errscope_data::Dataset;
use errscope_stats::{
    bootstrap::{BootstrapConfig, mean_confidence_interval},
    significance::OneSampleTTest,
};
use serde::{Deserialize, Serialize};

use crate::subgroup::RuleRecord;

/// t statistic and one-sided p-value of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Significance {
    #[serde(with = "statistic_repr")]
    pub t_val: f64,
    pub p_one: f64,
}

impl From<OneSampleTTest> for Significance {
    fn from(test: OneSampleTTest) -> Self {
        Self {
            t_val: test.statistic,
            p_one: test.p_one_sided,
        }
    }
}

/// Finite values as JSON numbers, the rest as `"inf"`, `"-inf"` or `"nan"`.
mod statistic_repr {
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    #[expect(clippy::trivially_copy_pass_by_ref, reason = "signature required by serde")]
    pub(super) fn serialize<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if value.is_finite() {
            serializer.serialize_f64(*value)
        } else if value.is_nan() {
            serializer.serialize_str("nan")
        } else if value.is_sign_positive() {
            serializer.serialize_str("inf")
        } else {
            serializer.serialize_str("-inf")
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(f64),
        Text(String),
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Repr::deserialize(deserializer)? {
            Repr::Number(value) => Ok(value),
            Repr::Text(text) => match text.as_str() {
                "inf" => Ok(f64::INFINITY),
                "-inf" => Ok(f64::NEG_INFINITY),
                "nan" => Ok(f64::NAN),
                _ => Err(D::Error::custom(format!("invalid t statistic '{text}'"))),
            },
        }
    }
}

/// Fills [`RuleRecord::significance`] for every rule.
pub fn attach_significance(rules: &mut [RuleRecord], dataset: &Dataset, model_err_rate: f64) {
    for rule in rules {
        let outcomes = dataset.outcomes(&rule.train_rows);
        rule.significance = Some(OneSampleTTest::run(&outcomes, model_err_rate).into());
    }
}

/// Fills [`RuleRecord::ci`] for every rule with a non-empty train match.
///
/// This is the expensive part of a session (one bootstrap per rule), so it is
/// run on demand rather than as part of the search.
pub fn attach_confidence_intervals(
    rules: &mut [RuleRecord],
    dataset: &Dataset,
    config: &BootstrapConfig,
) {
    for rule in rules.iter_mut() {
        let outcomes = dataset.outcomes(&rule.train_rows);
        rule.ci = mean_confidence_interval(&outcomes, config);
    }
    tracing::debug!(
        rules = rules.len(),
        resamples = config.resamples,
        "attached confidence intervals"
    );
}

#[cfg(test)]
mod tests {
    use errscope_data::FeatureMatrix;

    use super::*;

    fn dataset(errors: &[u8]) -> Dataset {
        let rows = errors.iter().map(|&e| vec![f64::from(e)]).collect();
        Dataset::new(FeatureMatrix::from_rows(rows).unwrap(), errors.to_vec()).unwrap()
    }

    fn rule(train_rows: Vec<usize>) -> RuleRecord {
        RuleRecord {
            conditions: vec![],
            support: train_rows.len(),
            train_rows,
            test_rows: vec![],
            err_rate: 0.0,
            err_rate_test: 0.0,
            significance: None,
            ci: None,
        }
    }

    #[test]
    fn test_error_heavy_rule_is_significant() {
        // 20 rows at error rate 0.5 against a model error rate of 0.3
        let errors = (0..20).map(|i| u8::from(i % 2 == 0)).collect::<Vec<_>>();
        let dataset = dataset(&errors);
        let mut rules = vec![rule((0..20).collect())];
        attach_significance(&mut rules, &dataset, 0.3);

        let significance = rules[0].significance.unwrap();
        // mean 0.5, s = sqrt(20/76), t = 0.2 / (s / sqrt(20))
        let expected_t = 0.2 / ((20.0_f64 / 76.0).sqrt() / 20.0_f64.sqrt());
        assert!((significance.t_val - expected_t).abs() < 1e-9);
        assert!(significance.t_val > 0.0);
        assert!(significance.p_one > 0.0 && significance.p_one < 0.05);
    }

    #[test]
    fn test_p_value_is_half_of_two_sided() {
        let errors = [1, 0, 1, 1, 0, 1, 1, 1, 0, 1];
        let dataset = dataset(&errors);
        let mut rules = vec![rule((0..10).collect())];
        attach_significance(&mut rules, &dataset, 0.3);

        let outcomes = dataset.outcomes(&(0..10).collect::<Vec<_>>());
        let test = OneSampleTTest::run(&outcomes, 0.3);
        let significance = rules[0].significance.unwrap();
        assert_eq!(significance.p_one, test.p_two_sided / 2.0);
    }

    #[test]
    fn test_all_error_rule_keeps_infinite_statistic_in_json() {
        let dataset = dataset(&[1; 30]);
        let mut rules = vec![rule((0..30).collect())];
        attach_significance(&mut rules, &dataset, 0.3);

        let significance = rules[0].significance.unwrap();
        assert_eq!(significance.t_val, f64::INFINITY);
        let json = serde_json::to_value(significance).unwrap();
        assert_eq!(json["t_val"], "inf");
        assert_eq!(json["p_one"], 0.0);
        let parsed: Significance = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, significance);

        let finite = Significance {
            t_val: -1.5,
            p_one: 0.9,
        };
        let json = serde_json::to_value(finite).unwrap();
        assert_eq!(json["t_val"], -1.5);
        let negative = Significance {
            t_val: f64::NEG_INFINITY,
            p_one: 1.0,
        };
        assert_eq!(serde_json::to_value(negative).unwrap()["t_val"], "-inf");
    }

    #[test]
    fn test_confidence_interval_brackets_rate() {
        let errors = (0..200).map(|i| u8::from(i % 4 == 0)).collect::<Vec<_>>();
        let dataset = dataset(&errors);
        let mut rules = vec![rule((0..200).collect()), rule(vec![])];
        let config = BootstrapConfig {
            resamples: 999,
            seed: Some(7),
            ..Default::default()
        };
        attach_confidence_intervals(&mut rules, &dataset, &config);

        let ci = rules[0].ci.unwrap();
        assert!(ci.contains(0.25));
        assert!(ci.width() < 0.2);
        assert!(rules[1].ci.is_none());
    }
}
