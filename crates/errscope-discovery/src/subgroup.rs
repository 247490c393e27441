//! Subgroup search: rules whose matched rows err more often than the model.
//!
//! # Algorithm
//!
//! Both search modes share one shape and differ only in their condition
//! space (see [`ConditionSpace`]):
//!
//! - **Token mode** ([`TokenSpace`]): one condition per selected feature,
//!   "token present" (value > 0.5).
//! - **High-level mode** ([`CategoricalSpace`]): one condition per
//!   (feature, bin) pair on a discretized matrix.
//!
//! 1. **Single pass**: every condition is evaluated on the train and the
//!    held-out partition. It becomes a rule when its train error rate and
//!    support pass the [`FilterThreshold`]. Per feature, the best error rate
//!    over its conditions is kept as that feature's *baseline*.
//! 2. **Ranking**: features are ranked by baseline; the top K form the
//!    [`TopFeature`] summary, regardless of the threshold.
//! 3. **Pairwise pass**: for every unordered feature pair and every pair of
//!    their conditions, the conjunction is evaluated. It becomes a rule only
//!    if its error rate is strictly above *both* baselines and it passes the
//!    same threshold. A pair therefore always says more than its parts.
//!
//! The pairwise pass is quadratic in the number of features (and in the bin
//! count); no pruning is done beyond the importance filter.
//!
//! # Error rates
//!
//! A condition that matches no row has error rate `0`, never `NaN`.

use std::cmp::Ordering;

use errscope_data::{Dataset, FeatureMatrix, Partition, is_token_present};
use errscope_stats::bootstrap::ConfidenceInterval;
use serde::{Deserialize, Serialize};

use crate::validation::Significance;

/// Minimum error rate and support a rule must exceed (strictly).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterThreshold {
    pub err_rate: f64,
    pub support: usize,
}

impl FilterThreshold {
    #[must_use]
    pub fn passes(&self, err_rate: f64, support: usize) -> bool {
        err_rate > self.err_rate && support > self.support
    }
}

/// A condition on a feature addressed by column index.
///
/// Serialized in the same `{"feature", "sign", "val"}` shape as
/// [`errscope_data::ConditionSpec`], with the column index as feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "sign")]
pub enum RuleCondition {
    #[serde(rename = ">")]
    TokenPresent { feature: usize },
    #[serde(rename = "=")]
    CategoricalEquals { feature: usize, val: u32 },
}

impl RuleCondition {
    #[must_use]
    pub fn feature(&self) -> usize {
        match self {
            RuleCondition::TokenPresent { feature }
            | RuleCondition::CategoricalEquals { feature, .. } => *feature,
        }
    }

    #[must_use]
    pub fn bin(&self) -> Option<u32> {
        match self {
            RuleCondition::TokenPresent { .. } => None,
            RuleCondition::CategoricalEquals { val, .. } => Some(*val),
        }
    }

    #[expect(clippy::float_cmp)]
    #[must_use]
    pub fn matches(&self, matrix: &FeatureMatrix, row: usize) -> bool {
        match *self {
            RuleCondition::TokenPresent { feature } => is_token_present(matrix.get(row, feature)),
            RuleCondition::CategoricalEquals { feature, val } => {
                matrix.get(row, feature) == f64::from(val)
            }
        }
    }
}

/// A rule retained by the search, with its train and held-out statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleRecord {
    /// One or two conditions, joined by AND.
    #[serde(rename = "rules")]
    pub conditions: Vec<RuleCondition>,
    /// Matched row ids in the train partition.
    #[serde(rename = "doc_idx")]
    pub train_rows: Vec<usize>,
    /// Matched row ids in the held-out partition.
    #[serde(rename = "doc_idx_test")]
    pub test_rows: Vec<usize>,
    pub support: usize,
    pub err_rate: f64,
    pub err_rate_test: f64,
    #[serde(flatten)]
    pub significance: Option<Significance>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ci: Option<ConfidenceInterval>,
}

/// Entry of the ranked single-condition summary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TopFeature {
    pub feature: usize,
    /// Best bin (high-level mode only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub val: Option<u32>,
    pub err_rate: f64,
}

/// Everything one search produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchOutcome {
    pub rules: Vec<RuleRecord>,
    pub top_features: Vec<TopFeature>,
}

/// The set of single conditions a search mode enumerates.
pub trait ConditionSpace {
    /// Feature column indices taking part in the search, ascending.
    fn features(&self) -> &[usize];

    /// The candidate conditions on one feature.
    fn conditions(&self, feature: usize) -> Vec<RuleCondition>;
}

/// Token mode: one "present" condition per selected feature.
#[derive(Debug, Clone)]
pub struct TokenSpace {
    features: Vec<usize>,
}

impl TokenSpace {
    #[must_use]
    pub fn new(features: Vec<usize>) -> Self {
        Self { features }
    }
}

impl ConditionSpace for TokenSpace {
    fn features(&self) -> &[usize] {
        &self.features
    }

    fn conditions(&self, feature: usize) -> Vec<RuleCondition> {
        vec![RuleCondition::TokenPresent { feature }]
    }
}

/// High-level mode: one "equals bin" condition per feature and bin value.
#[derive(Debug, Clone)]
pub struct CategoricalSpace {
    features: Vec<usize>,
    num_bins: Vec<u32>,
}

impl CategoricalSpace {
    /// Every column takes part; `num_bins[i]` is the number of bins of column `i`.
    #[must_use]
    pub fn new(num_bins: Vec<u32>) -> Self {
        Self {
            features: (0..num_bins.len()).collect(),
            num_bins,
        }
    }
}

impl ConditionSpace for CategoricalSpace {
    fn features(&self) -> &[usize] {
        &self.features
    }

    fn conditions(&self, feature: usize) -> Vec<RuleCondition> {
        (0..self.num_bins[feature])
            .map(|val| RuleCondition::CategoricalEquals { feature, val })
            .collect()
    }
}

/// Rows matched by one candidate rule in both partitions.
#[derive(Debug, Clone)]
struct Matched {
    train: Vec<usize>,
    test: Vec<usize>,
    err_rate: f64,
    err_rate_test: f64,
}

impl Matched {
    fn from_rows(dataset: &Dataset, train: Vec<usize>, test: Vec<usize>) -> Self {
        let err_rate = dataset.error_rate(&train);
        let err_rate_test = dataset.error_rate(&test);
        Self {
            train,
            test,
            err_rate,
            err_rate_test,
        }
    }

    fn single(dataset: &Dataset, partition: &Partition, condition: RuleCondition) -> Self {
        let matrix = dataset.matrix();
        let select = |rows: &[usize]| {
            rows.iter()
                .copied()
                .filter(|&row| condition.matches(matrix, row))
                .collect::<Vec<_>>()
        };
        Self::from_rows(dataset, select(&partition.train), select(&partition.test))
    }

    fn and(&self, other: &Self, dataset: &Dataset) -> Self {
        Self::from_rows(
            dataset,
            intersect_sorted(&self.train, &other.train),
            intersect_sorted(&self.test, &other.test),
        )
    }

    fn into_record(self, conditions: Vec<RuleCondition>) -> RuleRecord {
        RuleRecord {
            conditions,
            support: self.train.len(),
            train_rows: self.train,
            test_rows: self.test,
            err_rate: self.err_rate,
            err_rate_test: self.err_rate_test,
            significance: None,
            ci: None,
        }
    }
}

/// Single-condition results of one feature.
#[derive(Debug)]
struct FeatureCandidates {
    feature: usize,
    singles: Vec<(RuleCondition, Matched)>,
    best: TopFeature,
}

/// Runs the subgroup search over one dataset and partition.
#[derive(Debug, Clone, Copy)]
pub struct SubgroupSearch<'a> {
    dataset: &'a Dataset,
    partition: &'a Partition,
    threshold: FilterThreshold,
    top_k: usize,
}

impl<'a> SubgroupSearch<'a> {
    #[must_use]
    pub fn new(
        dataset: &'a Dataset,
        partition: &'a Partition,
        threshold: FilterThreshold,
        top_k: usize,
    ) -> Self {
        Self {
            dataset,
            partition,
            threshold,
            top_k,
        }
    }

    /// Runs the single, ranking and pairwise passes over `space`.
    pub fn run<S>(&self, space: &S) -> SearchOutcome
    where
        S: ConditionSpace + ?Sized,
    {
        let mut rules = Vec::new();
        let candidates = space
            .features()
            .iter()
            .map(|&feature| self.single_pass(space, feature, &mut rules))
            .collect::<Vec<_>>();
        let num_single = rules.len();

        let top_features = self.rank(&candidates);

        for (i, first) in candidates.iter().enumerate() {
            for second in &candidates[i + 1..] {
                self.pair_pass(first, second, &mut rules);
            }
        }

        tracing::info!(
            features = candidates.len(),
            single = num_single,
            pairwise = rules.len() - num_single,
            "subgroup search finished"
        );
        SearchOutcome {
            rules,
            top_features,
        }
    }

    fn single_pass<S>(
        &self,
        space: &S,
        feature: usize,
        rules: &mut Vec<RuleRecord>,
    ) -> FeatureCandidates
    where
        S: ConditionSpace + ?Sized,
    {
        let conditions = space.conditions(feature);
        // ties keep the earliest condition
        let mut best = TopFeature {
            feature,
            val: conditions.first().and_then(RuleCondition::bin),
            err_rate: 0.0,
        };

        let singles = conditions
            .into_iter()
            .map(|condition| {
                let matched = Matched::single(self.dataset, self.partition, condition);
                if self.threshold.passes(matched.err_rate, matched.train.len()) {
                    rules.push(matched.clone().into_record(vec![condition]));
                }
                if matched.err_rate > best.err_rate {
                    best.err_rate = matched.err_rate;
                    best.val = condition.bin();
                }
                (condition, matched)
            })
            .collect();

        FeatureCandidates {
            feature,
            singles,
            best,
        }
    }

    fn rank(&self, candidates: &[FeatureCandidates]) -> Vec<TopFeature> {
        let mut ranked = candidates.iter().map(|c| c.best).collect::<Vec<_>>();
        ranked.sort_by(|a, b| {
            b.err_rate
                .partial_cmp(&a.err_rate)
                .unwrap_or(Ordering::Equal)
                .then(a.feature.cmp(&b.feature))
        });
        ranked.truncate(self.top_k);
        ranked
    }

    fn pair_pass(
        &self,
        first: &FeatureCandidates,
        second: &FeatureCandidates,
        rules: &mut Vec<RuleRecord>,
    ) {
        debug_assert!(first.feature < second.feature);
        for (first_condition, first_matched) in &first.singles {
            for (second_condition, second_matched) in &second.singles {
                let joint = first_matched.and(second_matched, self.dataset);
                if joint.err_rate > first.best.err_rate
                    && joint.err_rate > second.best.err_rate
                    && self.threshold.passes(joint.err_rate, joint.train.len())
                {
                    rules.push(joint.into_record(vec![*first_condition, *second_condition]));
                }
            }
        }
    }
}

/// Intersection of two ascending id lists.
fn intersect_sorted(a: &[usize], b: &[usize]) -> Vec<usize> {
    let mut out = Vec::with_capacity(a.len().min(b.len()));
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                out.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }
    out
}
