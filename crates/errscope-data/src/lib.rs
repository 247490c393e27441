//! In-memory data model shared by the discovery and inspection engines.
//!
//! - [`matrix`]: row-major feature matrix with the outcome column last, and
//!   the [`Dataset`](matrix::Dataset) pairing it with per-row error labels
//! - [`split`]: deterministic train / held-out partition by row id
//! - [`columns`]: name-addressed column tables used when evaluating rules
//!   written against feature names
//! - [`condition`]: rule conditions, both the wire form and the typed kinds
//! - [`annotations`]: externally computed per-document annotations keyed by
//!   row id
//!
//! All of these are immutable once loaded; the engines never mutate them.

pub use self::{annotations::*, columns::*, condition::*, matrix::*, split::*};

pub mod annotations;
pub mod columns;
pub mod condition;
pub mod matrix;
pub mod split;

/// Schema errors raised while assembling in-memory data.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum DatasetError {
    #[display("matrix has no rows")]
    Empty,
    #[display("row {row} has {actual} columns, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[display("{kind} has {actual} entries, expected one per row ({expected})")]
    LengthMismatch {
        kind: &'static str,
        expected: usize,
        actual: usize,
    },
    #[display("error label of row {row} is {value}, expected 0 or 1")]
    NonBinaryLabel { row: usize, value: u8 },
}
