//! One-step refinement suggestions for an inspected rule.
//!
//! Every importance-filtered token is tried as an extra "token present"
//! condition on the rule's *final* population. A token qualifies when it
//! matches more than `min_support` rows there and its error rate beats the
//! rule's final error rate. The best few, by error rate, are returned.

use std::cmp::Ordering;

use errscope_data::{ColumnTable, SIGN_TOKEN_PRESENT, TOKEN_PRESENCE_THRESHOLD, is_token_present};
use serde::{Deserialize, Serialize};

use crate::population::Population;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HintConfig {
    pub min_support: usize,
    pub max_hints: usize,
}

/// A suggested extra condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hint {
    pub feature: String,
    pub sign: String,
    pub threshold: f64,
    pub err_rate: f64,
    pub support: usize,
}

/// Ranks candidate tokens (positions in `tokens`) as refinements of
/// `population`.
#[must_use]
pub fn generate_hints(
    tokens: &ColumnTable,
    candidates: &[usize],
    is_error: &[u8],
    population: &Population,
    current_error_rate: f64,
    config: &HintConfig,
) -> Vec<Hint> {
    let mut hints = candidates
        .iter()
        .filter_map(|&position| {
            let feature = tokens.name(position)?;
            let column = tokens.column_at(position);
            let matched = population.narrow(|row| is_token_present(column[row]));
            if matched.len() <= config.min_support {
                return None;
            }
            let err_rate = matched.error_rate(is_error);
            (err_rate > current_error_rate).then(|| Hint {
                feature: feature.to_owned(),
                sign: SIGN_TOKEN_PRESENT.to_owned(),
                threshold: TOKEN_PRESENCE_THRESHOLD,
                err_rate,
                support: matched.len(),
            })
        })
        .collect::<Vec<_>>();

    hints.sort_by(|a, b| b.err_rate.partial_cmp(&a.err_rate).unwrap_or(Ordering::Equal));
    hints.truncate(config.max_hints);
    hints
}
