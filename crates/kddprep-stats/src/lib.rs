//! Numeric building blocks for the kddprep pipeline.
//!
//! This crate knows nothing about network records. It provides:
//!
//! - **Descriptive statistics**: population mean, variance and standard deviation
//! - **Standard scores**: z-scores against a reference mean and deviation
//! - **Count histograms**: fixed-size frequency tables over ordinal bins
//!
//! # Modules
//!
//! - [`descriptive`]: Population statistics for summarizing a dataset
//! - [`zscore`]: Standard score computation with a zero-deviation guard
//! - [`histogram`]: Fixed-size count histograms for ordinal labels
//!
//! # Examples
//!
//! ## Computing population statistics
//!
//! ```
//! use kddprep_stats::descriptive::PopulationStats;
//!
//! let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
//! let stats = PopulationStats::new(values).unwrap();
//! assert_eq!(stats.mean, 5.0);
//! assert_eq!(stats.std_dev, 2.0);
//! ```
//!
//! ## Scoring a value
//!
//! ```
//! use kddprep_stats::zscore::z_score;
//!
//! assert_eq!(z_score(7.0, 5.0, 2.0), Some(1.0));
//! assert_eq!(z_score(7.0, 5.0, 0.0), None);
//! ```
//!
//! ## Counting ordinal labels
//!
//! ```
//! use kddprep_stats::histogram::CountHistogram;
//!
//! let mut histogram = CountHistogram::<4>::new();
//! histogram.record(1).unwrap();
//! histogram.record(4).unwrap();
//! assert_eq!(histogram.counts(), &[1, 0, 0, 1]);
//! ```

pub mod descriptive;
pub mod histogram;
pub mod zscore;
