use std::collections::BTreeMap;

use errscope_inspect::{group_stats::GroupStats, path::InspectionResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InspectionReport {
    #[serde(flatten)]
    pub result: InspectionResult,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub group_stats: GroupStats,
    /// Training-set label counts of the rule's tokens.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub train_stats: BTreeMap<String, Vec<u64>>,
}
