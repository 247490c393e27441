use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::DatasetError;

/// A numeric table whose columns are addressed by name.
///
/// Rule definitions written by analysts name their features ("token
/// `refund`", "feature `length` in bin 2") rather than column positions, so
/// the rule evaluator works against this table. Storage is column-major
/// because every condition scans a single column.
///
/// When two tables are joined with [`ColumnTable::join`], a name that appears
/// twice resolves to its first occurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ColumnTableRepr", into = "ColumnTableRepr")]
pub struct ColumnTable {
    names: Vec<String>,
    positions: HashMap<String, usize>,
    columns: Vec<Vec<f64>>,
    num_rows: usize,
}

/// Wire form: column names plus row-major values.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ColumnTableRepr {
    columns: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl ColumnTable {
    /// Builds a table from column names and row-major values.
    pub fn from_rows(names: Vec<String>, rows: &[Vec<f64>]) -> Result<Self, DatasetError> {
        let mut columns = vec![Vec::with_capacity(rows.len()); names.len()];
        for (row, cells) in rows.iter().enumerate() {
            if cells.len() != names.len() {
                return Err(DatasetError::RaggedRow {
                    row,
                    expected: names.len(),
                    actual: cells.len(),
                });
            }
            for (column, &value) in columns.iter_mut().zip(cells) {
                column.push(value);
            }
        }
        Ok(Self::from_columns(names, columns, rows.len()))
    }

    fn from_columns(names: Vec<String>, columns: Vec<Vec<f64>>, num_rows: usize) -> Self {
        let mut positions = HashMap::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            positions.entry(name.clone()).or_insert(i);
        }
        Self {
            names,
            positions,
            columns,
            num_rows,
        }
    }

    /// An empty table with `num_rows` rows and no columns.
    #[must_use]
    pub fn empty(num_rows: usize) -> Self {
        Self::from_columns(vec![], vec![], num_rows)
    }

    /// Appends the columns of `other` after the columns of `self`.
    pub fn join(&self, other: &Self) -> Result<Self, DatasetError> {
        if self.columns.is_empty() {
            return Ok(other.clone());
        }
        if other.columns.is_empty() {
            return Ok(self.clone());
        }
        if self.num_rows != other.num_rows {
            return Err(DatasetError::LengthMismatch {
                kind: "joined column table",
                expected: self.num_rows,
                actual: other.num_rows,
            });
        }
        let names = self.names.iter().chain(&other.names).cloned().collect();
        let columns = self.columns.iter().chain(&other.columns).cloned().collect();
        Ok(Self::from_columns(names, columns, self.num_rows))
    }

    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    #[must_use]
    pub fn num_cols(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    #[must_use]
    pub fn name(&self, position: usize) -> Option<&str> {
        self.names.get(position).map(String::as_str)
    }

    /// Position of the first column called `name`.
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    #[must_use]
    pub fn column_at(&self, position: usize) -> &[f64] {
        &self.columns[position]
    }

    /// Values of the column called `name`, or `None` if there is no such column.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.position(name).map(|p| self.column_at(p))
    }
}

impl TryFrom<ColumnTableRepr> for ColumnTable {
    type Error = DatasetError;

    fn try_from(repr: ColumnTableRepr) -> Result<Self, Self::Error> {
        Self::from_rows(repr.columns, &repr.rows)
    }
}

impl From<ColumnTable> for ColumnTableRepr {
    fn from(table: ColumnTable) -> Self {
        let rows = (0..table.num_rows)
            .map(|r| table.columns.iter().map(|c| c[r]).collect())
            .collect();
        Self {
            columns: table.names,
            rows,
        }
    }
}
