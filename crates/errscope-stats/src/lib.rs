//! Statistical primitives for the errscope project.
//!
//! This crate provides the small set of statistical tools the subgroup
//! discovery and rule inspection engines rely on:
//!
//! - **Descriptive statistics**: mean, sample variance and standard deviation
//! - **Percentiles**: numpy-compatible percentile values (linear interpolation)
//! - **Significance**: one-sample Student's t-test with one-sided p-values
//! - **Bootstrap**: percentile bootstrap confidence intervals for the mean
//!
//! # Modules
//!
//! - [`descriptive`]: Descriptive statistics for summarizing datasets
//! - [`percentiles`]: Percentile computation and storage
//! - [`significance`]: One-sample t-test against a fixed baseline
//! - [`bootstrap`]: Non-parametric resampling confidence intervals
//!
//! # Examples
//!
//! ## Computing descriptive statistics
//!
//! ```
//! use errscope_stats::descriptive::DescriptiveStats;
//!
//! let values = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let stats = DescriptiveStats::new(values).unwrap();
//! assert_eq!(stats.mean, 3.0);
//! ```
//!
//! ## Computing percentiles
//!
//! ```
//! use errscope_stats::percentiles::Percentiles;
//!
//! let values = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let percentiles = Percentiles::new(&values, &[10.0, 50.0, 90.0]);
//! assert_eq!(percentiles.get(50.0), Some(3.0));
//! ```
//!
//! ## Testing a subgroup error rate against a baseline
//!
//! ```
//! use errscope_stats::significance::OneSampleTTest;
//!
//! let outcomes = [1.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0, 1.0];
//! let test = OneSampleTTest::run(&outcomes, 0.3);
//! assert!(test.statistic > 0.0);
//! assert!(test.p_one_sided < 0.05);
//! ```
//!
//! ## Bootstrapping a confidence interval
//!
//! ```
//! use errscope_stats::bootstrap::{BootstrapConfig, mean_confidence_interval};
//!
//! let outcomes = [1.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0];
//! let config = BootstrapConfig {
//!     resamples: 500,
//!     seed: Some(7),
//!     ..BootstrapConfig::default()
//! };
//! let ci = mean_confidence_interval(&outcomes, &config).unwrap();
//! assert!(ci.lower <= 0.4 && 0.4 <= ci.upper);
//! ```

pub mod bootstrap;
pub mod descriptive;
pub mod percentiles;
pub mod significance;
