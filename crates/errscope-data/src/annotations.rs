use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Externally precomputed per-document annotations, keyed by row id.
///
/// The inspection engine only passes these through (for example the tokens
/// that contributed most to each prediction); it never computes them.
/// Lookups are keyed so that filtered or reordered populations never index
/// out of range: a row without an annotation simply has none.
///
/// Accepts either a dense JSON array (position = row id) or an object keyed
/// by row id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "AnnotationsRepr",
    into = "BTreeMap<usize, serde_json::Value>"
)]
pub struct DocumentAnnotations {
    by_row: BTreeMap<usize, serde_json::Value>,
}

// Keys stay strings here: untagged enums cannot parse integer map keys.
#[derive(Deserialize)]
#[serde(untagged)]
enum AnnotationsRepr {
    Dense(Vec<serde_json::Value>),
    Keyed(BTreeMap<String, serde_json::Value>),
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("annotation key '{key}' is not a row id")]
pub struct InvalidRowIdError {
    key: String,
}

impl TryFrom<AnnotationsRepr> for DocumentAnnotations {
    type Error = InvalidRowIdError;

    fn try_from(repr: AnnotationsRepr) -> Result<Self, Self::Error> {
        match repr {
            AnnotationsRepr::Dense(values) => Ok(values.into_iter().enumerate().collect()),
            AnnotationsRepr::Keyed(by_key) => by_key
                .into_iter()
                .map(|(key, value)| match key.parse::<usize>() {
                    Ok(row) => Ok((row, value)),
                    Err(_) => Err(InvalidRowIdError { key }),
                })
                .collect(),
        }
    }
}

impl From<DocumentAnnotations> for BTreeMap<usize, serde_json::Value> {
    fn from(annotations: DocumentAnnotations) -> Self {
        annotations.by_row
    }
}

impl FromIterator<(usize, serde_json::Value)> for DocumentAnnotations {
    fn from_iter<T: IntoIterator<Item = (usize, serde_json::Value)>>(iter: T) -> Self {
        Self {
            by_row: iter.into_iter().collect(),
        }
    }
}

impl DocumentAnnotations {
    #[must_use]
    pub fn get(&self, row: usize) -> Option<&serde_json::Value> {
        self.by_row.get(&row)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_row.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_row.is_empty()
    }
}
