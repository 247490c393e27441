//! Per-label token counts from the classifier's training set.
//!
//! Shown next to an inspected rule so the analyst can see how a token the
//! rule relies on was distributed over the labels the model learned from.

use std::collections::BTreeMap;

use errscope_data::{ConditionSpec, SIGN_TOKEN_PRESENT};
use serde::{Deserialize, Serialize};

/// Precomputed training-set token table: `token_labels[i]` holds, for
/// `token_list[i]`, one count per class label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainTokenStats {
    pub token_list: Vec<String>,
    pub token_labels: Vec<Vec<u64>>,
}

impl TrainTokenStats {
    /// Number of class labels each count vector covers.
    #[must_use]
    pub fn num_labels(&self) -> usize {
        self.token_labels.first().map_or(0, Vec::len)
    }

    #[must_use]
    pub fn counts(&self, token: &str) -> Option<&[u64]> {
        let position = self.token_list.iter().position(|t| t == token)?;
        self.token_labels.get(position).map(Vec::as_slice)
    }
}

/// Label counts for every token-present condition of `rule`.
///
/// Returns an empty map when the rule has no token-present condition. A token
/// missing from the training table maps to all-zero counts.
#[must_use]
pub fn token_stats_in_train(
    stats: &TrainTokenStats,
    rule: &[ConditionSpec],
) -> BTreeMap<String, Vec<u64>> {
    rule.iter()
        .filter(|spec| spec.sign == SIGN_TOKEN_PRESENT)
        .map(|spec| {
            let counts = stats
                .counts(&spec.feature)
                .map_or_else(|| vec![0; stats.num_labels()], <[u64]>::to_vec);
            (spec.feature.clone(), counts)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(feature: &str, sign: &str) -> ConditionSpec {
        ConditionSpec {
            feature: feature.to_owned(),
            sign: sign.to_owned(),
            val: None,
        }
    }

    fn stats() -> TrainTokenStats {
        TrainTokenStats {
            token_list: vec!["refund".into(), "late".into()],
            token_labels: vec![vec![3, 40], vec![12, 1]],
        }
    }

    #[test]
    fn test_token_conditions_are_looked_up() {
        let rule = [spec("late", ">"), spec("length", "="), spec("unseen", ">")];
        let result = token_stats_in_train(&stats(), &rule);
        assert_eq!(result.len(), 2);
        assert_eq!(result["late"], vec![12, 1]);
        assert_eq!(result["unseen"], vec![0, 0]);
    }

    #[test]
    fn test_rule_without_tokens_is_empty() {
        let rule = [spec("length", "=")];
        assert!(token_stats_in_train(&stats(), &rule).is_empty());
    }
}
