use chrono::{DateTime, Utc};
use errscope_discovery::{
    session::SearchMode,
    subgroup::{FilterThreshold, RuleRecord, TopFeature},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchReport {
    pub generated_at: DateTime<Utc>,
    pub mode: SearchMode,
    pub threshold: FilterThreshold,
    pub model_err_rate: f64,
    /// Features that took part in the search.
    pub num_features: usize,
    pub rules: Vec<RuleRecord>,
    /// Best single conditions by error rate, regardless of the threshold.
    pub top_features: Vec<TopFeature>,
}
