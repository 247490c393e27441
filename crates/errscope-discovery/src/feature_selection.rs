//! Importance-based feature filtering.
//!
//! The importance scores come from an ensemble classifier trained outside
//! this crate to separate errors from non-errors. Only features the oracle
//! found useful (score > 0) take part in the token search; this is what
//! keeps the quadratic pairwise pass tractable.

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("importance vector has {actual} scores, expected one per feature ({expected})")]
pub struct ImportanceLengthError {
    pub expected: usize,
    pub actual: usize,
}

/// Returns the indices of features with positive importance, ascending.
///
/// If no feature has positive importance the oracle carries no information,
/// and every feature is kept.
pub fn select_features(
    importances: &[f64],
    num_features: usize,
) -> Result<Vec<usize>, ImportanceLengthError> {
    if importances.len() != num_features {
        return Err(ImportanceLengthError {
            expected: num_features,
            actual: importances.len(),
        });
    }

    let selected = importances
        .iter()
        .enumerate()
        .filter(|(_, score)| **score > 0.0)
        .map(|(i, _)| i)
        .collect::<Vec<_>>();

    if selected.is_empty() {
        tracing::info!(num_features, "no feature has positive importance, keeping all");
        return Ok((0..num_features).collect());
    }
    tracing::info!(
        selected = selected.len(),
        num_features,
        "features with importance > 0"
    );
    Ok(selected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_positive_scores() {
        let selected = select_features(&[0.0, 0.3, 0.0, 0.01], 4).unwrap();
        assert_eq!(selected, vec![1, 3]);
    }

    #[test]
    fn test_all_zero_keeps_everything() {
        let selected = select_features(&[0.0; 3], 3).unwrap();
        assert_eq!(selected, vec![0, 1, 2]);
    }

    #[test]
    fn test_length_mismatch() {
        assert_eq!(
            select_features(&[0.5], 2).unwrap_err(),
            ImportanceLengthError {
                expected: 2,
                actual: 1
            }
        );
    }
}
