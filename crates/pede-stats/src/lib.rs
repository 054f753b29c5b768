//! Statistical primitives for the PEDE indicator reports.
//!
//! This crate provides the numeric building blocks used by the indicator
//! profiler. It has no dependencies and works on plain `f64` slices; missing
//! values are filtered out by the caller before anything reaches this crate.
//!
//! - **Descriptive statistics**: count, mean, median, sample standard deviation, min/max
//! - **Percentiles**: linear interpolation between order statistics
//! - **Histogram generation**: equal-width bins for distribution charts
//! - **Quantile banding**: interval bands whose edges are quantiles of the data
//! - **Value counts**: frequency of each distinct value
//! - **Correlation**: Pearson and Spearman (average ranks) coefficients
//! - **Comprehensive statistics**: descriptive statistics, percentiles and histogram in one pass
//!
//! # Modules
//!
//! - [`descriptive`]: Descriptive statistics for summarizing datasets
//! - [`percentiles`]: Percentile computation and storage
//! - [`histogram`]: Histogram construction for visualizing data distributions
//! - [`binning`]: Quantile-edge bands with right-closed intervals
//! - [`frequency`]: Distinct value counting
//! - [`correlation`]: Linear and rank-based correlation
//! - [`comprehensive`]: Comprehensive statistical analysis combining multiple measures
//!
//! # Examples
//!
//! ## Computing descriptive statistics
//!
//! ```
//! use pede_stats::descriptive::DescriptiveStats;
//!
//! let values = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let stats = DescriptiveStats::new(values).unwrap();
//! assert_eq!(stats.mean, 3.0);
//! assert_eq!(stats.median, 3.0);
//! ```
//!
//! ## Computing percentiles
//!
//! ```
//! use pede_stats::percentiles::Percentiles;
//!
//! let values = [1.0, 2.0, 3.0, 4.0];
//! let percentiles = Percentiles::new(&values, &[25.0, 50.0, 75.0]);
//! assert_eq!(percentiles.get(50.0), Some(2.5));
//! assert_eq!(percentiles.get(25.0), Some(1.75));
//! ```
//!
//! ## Correlating two indicators
//!
//! ```
//! use pede_stats::correlation::{pearson, spearman};
//!
//! let x = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let y = [2.0, 4.0, 6.0, 8.0, 10.0];
//! assert!((pearson(&x, &y) - 1.0).abs() < 1e-12);
//! assert!((spearman(&x, &y) - 1.0).abs() < 1e-12);
//! ```

pub mod binning;
pub mod comprehensive;
pub mod correlation;
pub mod descriptive;
pub mod frequency;
pub mod histogram;
pub mod percentiles;
