use errscope_data::{ColumnTable, DatasetError, DocumentAnnotations, check_binary_labels};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::train_stats::TrainTokenStats;

/// Everything the inspection engines read, loaded once and never mutated.
///
/// Token columns and high-level (discretized) feature columns are looked up
/// by name through one combined table, tokens first. Only the token table
/// takes part in hints and concepts.
///
/// # Wire form
///
/// ```json
/// {
///   "is_error": [0, 1, 1],
///   "tokens": {"columns": ["refund", "late"], "rows": [[1, 0], [0, 1], [1, 1]]},
///   "good_idx": [0, 1],
///   "hfeat": {"columns": ["length"], "rows": [[0], [2], [1]]},
///   "top_tokens": [["refund"], ["late"], ["refund", "late"]],
///   "documents": [{"source": "web"}, {"source": "app"}, {"source": "web"}],
///   "train_token_stats": {"token_list": ["refund"], "token_labels": [[3, 9]]}
/// }
/// ```
///
/// Everything but `is_error` is optional.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "InspectionDataRepr")]
pub struct InspectionData {
    is_error: Vec<u8>,
    tokens: Option<ColumnTable>,
    good_idx: Vec<usize>,
    hfeat: Option<ColumnTable>,
    columns: ColumnTable,
    top_tokens: DocumentAnnotations,
    documents: Vec<Map<String, Value>>,
    train_token_stats: TrainTokenStats,
}

#[derive(Debug, Clone, Deserialize)]
struct InspectionDataRepr {
    is_error: Vec<u8>,
    #[serde(default)]
    tokens: Option<ColumnTable>,
    #[serde(default)]
    good_idx: Vec<usize>,
    #[serde(default)]
    hfeat: Option<ColumnTable>,
    #[serde(default)]
    top_tokens: DocumentAnnotations,
    #[serde(default)]
    documents: Vec<Map<String, Value>>,
    #[serde(default)]
    train_token_stats: TrainTokenStats,
}

impl TryFrom<InspectionDataRepr> for InspectionData {
    type Error = DatasetError;

    fn try_from(repr: InspectionDataRepr) -> Result<Self, Self::Error> {
        check_binary_labels(&repr.is_error)?;
        let mut data = Self::new(repr.is_error)
            .with_top_tokens(repr.top_tokens)
            .with_train_token_stats(repr.train_token_stats)
            .with_documents(repr.documents)?;
        if let Some(tokens) = repr.tokens {
            data = data.with_tokens(tokens, repr.good_idx)?;
        }
        if let Some(hfeat) = repr.hfeat {
            data = data.with_hfeat(hfeat)?;
        }
        Ok(data)
    }
}

impl InspectionData {
    /// Data with error labels only; add tables with the `with_*` methods.
    #[must_use]
    pub fn new(is_error: Vec<u8>) -> Self {
        let num_rows = is_error.len();
        Self {
            is_error,
            tokens: None,
            good_idx: vec![],
            hfeat: None,
            columns: ColumnTable::empty(num_rows),
            top_tokens: DocumentAnnotations::default(),
            documents: vec![],
            train_token_stats: TrainTokenStats::default(),
        }
    }

    /// Sets the token table and the positions of its importance-filtered
    /// columns (hint candidates).
    pub fn with_tokens(
        mut self,
        tokens: ColumnTable,
        good_idx: Vec<usize>,
    ) -> Result<Self, DatasetError> {
        self.check_rows("token table", tokens.num_rows())?;
        self.tokens = Some(tokens);
        self.good_idx = good_idx;
        self.rebuild_columns()?;
        Ok(self)
    }

    pub fn with_hfeat(mut self, hfeat: ColumnTable) -> Result<Self, DatasetError> {
        self.check_rows("high-level feature table", hfeat.num_rows())?;
        self.hfeat = Some(hfeat);
        self.rebuild_columns()?;
        Ok(self)
    }

    #[must_use]
    pub fn with_top_tokens(mut self, top_tokens: DocumentAnnotations) -> Self {
        self.top_tokens = top_tokens;
        self
    }

    /// Sets per-document attributes used for grouped statistics.
    pub fn with_documents(
        mut self,
        documents: Vec<Map<String, Value>>,
    ) -> Result<Self, DatasetError> {
        if !documents.is_empty() {
            self.check_rows("document list", documents.len())?;
        }
        self.documents = documents;
        Ok(self)
    }

    #[must_use]
    pub fn with_train_token_stats(mut self, stats: TrainTokenStats) -> Self {
        self.train_token_stats = stats;
        self
    }

    fn check_rows(&self, kind: &'static str, actual: usize) -> Result<(), DatasetError> {
        if actual != self.num_rows() {
            return Err(DatasetError::LengthMismatch {
                kind,
                expected: self.num_rows(),
                actual,
            });
        }
        Ok(())
    }

    fn rebuild_columns(&mut self) -> Result<(), DatasetError> {
        let empty = ColumnTable::empty(self.num_rows());
        let tokens = self.tokens.as_ref().unwrap_or(&empty);
        let hfeat = self.hfeat.as_ref().unwrap_or(&empty);
        self.columns = tokens.join(hfeat)?;
        Ok(())
    }

    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.is_error.len()
    }

    #[must_use]
    pub fn is_error(&self) -> &[u8] {
        &self.is_error
    }

    #[must_use]
    pub fn tokens(&self) -> Option<&ColumnTable> {
        self.tokens.as_ref()
    }

    #[must_use]
    pub fn good_idx(&self) -> &[usize] {
        &self.good_idx
    }

    #[must_use]
    pub fn hfeat(&self) -> Option<&ColumnTable> {
        self.hfeat.as_ref()
    }

    /// Token and high-level columns combined, tokens first.
    #[must_use]
    pub fn columns(&self) -> &ColumnTable {
        &self.columns
    }

    #[must_use]
    pub fn top_tokens(&self) -> &DocumentAnnotations {
        &self.top_tokens
    }

    #[must_use]
    pub fn documents(&self) -> &[Map<String, Value>] {
        &self.documents
    }

    #[must_use]
    pub fn train_token_stats(&self) -> &TrainTokenStats {
        &self.train_token_stats
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use serde_json::json;

    use super::*;

    /// Six documents, tokens `refund`/`late`, high-level feature `length`.
    pub(crate) fn sample() -> InspectionData {
        serde_json::from_value(json!({
            "is_error": [1, 1, 0, 1, 0, 0],
            "tokens": {
                "columns": ["refund", "late"],
                "rows": [[1, 1], [1, 0], [1, 0], [0, 1], [0, 1], [0, 0]]
            },
            "good_idx": [0, 1],
            "hfeat": {
                "columns": ["length"],
                "rows": [[2], [2], [1], [0], [2], [1]]
            },
            "top_tokens": {"0": ["refund"], "3": ["late"]},
            "documents": [
                {"source": "web"}, {"source": "app"}, {"source": "web"},
                {"source": "web"}, {"source": "app"}, {}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_columns_are_combined() {
        let data = sample();
        assert_eq!(data.num_rows(), 6);
        assert_eq!(data.columns().names(), &["refund", "late", "length"]);
        assert_eq!(data.columns().column("length").unwrap()[4], 2.0);
        assert_eq!(data.tokens().unwrap().num_cols(), 2);
    }

    #[test]
    fn test_only_labels_required() {
        let data: InspectionData = serde_json::from_value(json!({"is_error": [0, 1]})).unwrap();
        assert!(data.tokens().is_none());
        assert_eq!(data.columns().num_cols(), 0);
        assert!(data.documents().is_empty());
    }

    #[test]
    fn test_row_count_mismatch_is_rejected() {
        let result = serde_json::from_value::<InspectionData>(json!({
            "is_error": [0, 1, 0],
            "tokens": {"columns": ["a"], "rows": [[1], [0]]}
        }));
        assert!(result.is_err());

        let result = serde_json::from_value::<InspectionData>(json!({"is_error": [0, 2]}));
        assert!(result.is_err());

        let err = InspectionData::new(vec![0, 1])
            .with_documents(vec![Map::new()])
            .unwrap_err();
        assert_eq!(
            err,
            DatasetError::LengthMismatch {
                kind: "document list",
                expected: 2,
                actual: 1
            }
        );
    }
}
