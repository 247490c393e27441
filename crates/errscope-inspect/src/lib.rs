//! Inspection of individual rules and concepts.
//!
//! Where `errscope-discovery` searches for
//! rules, this crate answers questions about one rule an analyst picked:
//!
//! - [`path`]: evaluate an ordered rule step by step, with per-step statistics
//! - [`hints`]: suggest the next token condition that raises the error rate
//! - [`concept`]: support, error rate and confidence interval of a token set
//! - [`group_stats`]: error counts of the matched documents, grouped by value
//! - [`train_stats`]: training-set label counts of the rule's tokens
//!
//! All engines read one immutable [`InspectionData`] and keep no state
//! between calls.

pub use self::{data::InspectionData, population::Population};

pub mod concept;
pub mod data;
pub mod group_stats;
pub mod hints;
pub mod path;
pub mod population;
pub mod train_stats;
