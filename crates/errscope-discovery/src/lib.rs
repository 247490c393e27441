//! Subgroup discovery: find feature conditions under which a classifier errs
//! more often than it does overall.
//!
//! The pipeline, leaves first:
//!
//! 1. [`discretizer`]: percentile bins for continuous features (high-level mode)
//! 2. [`feature_selection`]: keep features an external oracle found useful
//!    (token mode)
//! 3. [`subgroup`]: single and pairwise condition search with threshold
//!    filtering and a top-K summary
//! 4. [`validation`]: t-test and bootstrap confidence interval per rule
//!
//! [`session::DebugSession`] strings these together for one dataset.
//!
//! # Example
//!
//! ```
//! use errscope_data::{Dataset, FeatureMatrix, SplitConfig};
//! use errscope_discovery::{
//!     session::{DebugSession, SearchMode, SessionConfig},
//!     subgroup::FilterThreshold,
//! };
//!
//! // one token column and the label column; the token marks 40 rows, half errors
//! let rows = (0..100)
//!     .map(|i| vec![f64::from(u8::from(i < 40)), f64::from(u8::from(i % 2 == 0))])
//!     .collect();
//! let errors = (0..100).map(|i| u8::from(i % 2 == 0 && i < 40)).collect();
//! let dataset = Dataset::new(FeatureMatrix::from_rows(rows).unwrap(), errors).unwrap();
//!
//! let threshold = FilterThreshold { err_rate: 0.3, support: 10 };
//! let config = SessionConfig {
//!     split: SplitConfig { test_fraction: 0.0, ..SplitConfig::default() },
//!     ..SessionConfig::new(SearchMode::Token, threshold)
//! };
//! let session = DebugSession::new(dataset, &[0.7, 0.0], config).unwrap();
//! let outcome = session.search();
//! assert_eq!(outcome.rules.len(), 1);
//! assert_eq!(outcome.rules[0].support, 40);
//! ```

pub mod discretizer;
pub mod feature_selection;
pub mod session;
pub mod subgroup;
pub mod validation;
