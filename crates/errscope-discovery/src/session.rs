//! One analysis session: partition, prepare features, search, validate.

use errscope_data::{Dataset, DatasetError, Partition, SplitConfig};
use errscope_stats::bootstrap::BootstrapConfig;
use serde::{Deserialize, Serialize};

use crate::{
    discretizer::{BinThresholds, NUM_FEATURE_BINS, WidthMismatchError},
    feature_selection::{ImportanceLengthError, select_features},
    subgroup::{
        CategoricalSpace, ConditionSpace as _, FilterThreshold, RuleRecord, SearchOutcome,
        SubgroupSearch, TokenSpace,
    },
    validation,
};

/// Which condition space the search enumerates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SearchMode {
    /// Binary token columns, restricted to features with positive importance.
    Token,
    /// Discretized continuous columns, every feature and bin.
    HighLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub mode: SearchMode,
    pub threshold: FilterThreshold,
    /// Baseline the significance test compares each rule against.
    pub model_err_rate: f64,
    pub split: SplitConfig,
    pub bootstrap: BootstrapConfig,
    pub top_k_token: usize,
    pub top_k_high_level: usize,
}

impl SessionConfig {
    #[must_use]
    pub fn new(mode: SearchMode, threshold: FilterThreshold) -> Self {
        Self {
            mode,
            threshold,
            model_err_rate: 0.3,
            split: SplitConfig::default(),
            bootstrap: BootstrapConfig::default(),
            top_k_token: 10,
            top_k_high_level: 5,
        }
    }

    #[must_use]
    pub fn top_k(&self) -> usize {
        match self.mode {
            SearchMode::Token => self.top_k_token,
            SearchMode::HighLevel => self.top_k_high_level,
        }
    }
}

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum SearchError {
    #[display("invalid dataset: {_0}")]
    Dataset(DatasetError),
    #[display("invalid importance scores: {_0}")]
    Importance(ImportanceLengthError),
    #[display("cannot discretize: {_0}")]
    Discretize(WidthMismatchError),
}

#[derive(Debug, Clone)]
enum Space {
    Token(TokenSpace),
    Categorical(CategoricalSpace),
}

/// A prepared search over one dataset.
///
/// Construction does all the per-dataset work (split, feature selection or
/// discretization); [`DebugSession::search`] then only enumerates rules.
#[derive(Debug, Clone)]
pub struct DebugSession {
    config: SessionConfig,
    /// The dataset the search runs on (discretized in high-level mode).
    dataset: Dataset,
    partition: Partition,
    space: Space,
}

impl DebugSession {
    /// Prepares a session.
    ///
    /// `importances` holds one score per column of the dataset's matrix; it is
    /// only consulted in token mode.
    pub fn new(
        dataset: Dataset,
        importances: &[f64],
        config: SessionConfig,
    ) -> Result<Self, SearchError> {
        if dataset.num_rows() == 0 {
            return Err(DatasetError::Empty.into());
        }
        let partition = Partition::split(dataset.num_rows(), &config.split);

        let (dataset, space) = match config.mode {
            SearchMode::Token => {
                let features = select_features(importances, dataset.matrix().num_cols())?;
                (dataset, Space::Token(TokenSpace::new(features)))
            }
            SearchMode::HighLevel => {
                let thresholds = BinThresholds::fit(dataset.matrix());
                let binned = thresholds.transform(dataset.matrix())?;
                let mut num_bins = vec![NUM_FEATURE_BINS; binned.label_col()];
                num_bins.push(distinct_count(binned.column(binned.label_col())));
                tracing::info!(
                    features = num_bins.len(),
                    label_bins = num_bins.last().copied().unwrap_or_default(),
                    "discretized features"
                );
                let dataset = dataset.with_matrix(binned)?;
                (dataset, Space::Categorical(CategoricalSpace::new(num_bins)))
            }
        };

        Ok(Self {
            config,
            dataset,
            partition,
            space,
        })
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    #[must_use]
    pub fn partition(&self) -> &Partition {
        &self.partition
    }

    /// Number of features taking part in the search.
    #[must_use]
    pub fn num_features(&self) -> usize {
        match &self.space {
            Space::Token(space) => space.features().len(),
            Space::Categorical(space) => space.features().len(),
        }
    }

    /// Enumerates single and pairwise rules and attaches their significance.
    #[must_use]
    pub fn search(&self) -> SearchOutcome {
        let search = SubgroupSearch::new(
            &self.dataset,
            &self.partition,
            self.config.threshold,
            self.config.top_k(),
        );
        let mut outcome = match &self.space {
            Space::Token(space) => search.run(space),
            Space::Categorical(space) => search.run(space),
        };
        validation::attach_significance(
            &mut outcome.rules,
            &self.dataset,
            self.config.model_err_rate,
        );
        outcome
    }

    /// Attaches bootstrap confidence intervals to rules produced by this session.
    pub fn attach_confidence_intervals(&self, rules: &mut [RuleRecord]) {
        validation::attach_confidence_intervals(rules, &self.dataset, &self.config.bootstrap);
    }
}

#[expect(clippy::cast_possible_truncation)]
fn distinct_count(values: impl Iterator<Item = f64>) -> u32 {
    let mut values = values.collect::<Vec<_>>();
    values.sort_by(f64::total_cmp);
    values.dedup_by(|a, b| a.total_cmp(b).is_eq());
    values.len() as u32
}
