//! Statistical preprocessing of KDD-style network intrusion datasets
//!
//! This crate turns a labeled connection dataset into the artifacts an
//! anomaly-based detector is built from: class counts, per-feature statistics
//! split by class, a discretized dataset scored against normal traffic, and
//! histograms of the discrete labels.
//!
//! # Overview
//!
//! 1. **Read Records** ([`record::Record`]): Split each line into its 41
//!    features and class label, following the layout in [`schema::Schema`]
//! 2. **Partition** ([`partition::partition`]): Count labels and split records
//!    into normal and attack classes
//! 3. **Compute Statistics** ([`statistics::ClassFeatureStatistics`]): Mean and
//!    standard deviation per numeric feature and class, plus non-zero-only
//!    variants
//! 4. **Discretize** ([`transform::transform`]): Replace every numeric value by
//!    its z-score bucket ([`discretize::DiscreteLabel`]) against the normal-class
//!    reference ([`statistics::StatsTable`])
//! 5. **Analyze Buckets** ([`bucket_histogram::BucketHistogramTable`]): Count
//!    how often each bucket occurs per feature and class
//! 6. **Render Artifacts** ([`artifact::render_all`]): Produce the text reports
//!    and CSV datasets
//!
//! [`pipeline::run`] chains steps 2 through 5.
//!
//! # Examples
//!
//! ```
//! use kddprep_analysis::{pipeline, record::Record, schema::Schema};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//!
//! let schema = Schema::kdd();
//! let line = |src_bytes: u32, label: &str| {
//!     let mut fields = vec!["0".to_owned(); 41];
//!     fields[4] = src_bytes.to_string();
//!     fields.push(label.to_owned());
//!     fields.join(",")
//! };
//! let text = [line(100, "normal"), line(300, "normal"), line(9000, "neptune")].join("\n");
//!
//! let records = Record::parse_lines(&schema, text.lines())?;
//! let output = pipeline::run(&schema, &records, None)?;
//!
//! assert_eq!(output.labels.get("neptune"), Some(1));
//! assert_eq!(output.transformed.discretized.records[2].features()[4], "8");
//! # Ok(())
//! # }
//! ```

pub mod artifact;
pub mod bucket_histogram;
pub mod discretize;
pub mod partition;
pub mod pipeline;
pub mod record;
pub mod schema;
pub mod statistics;
pub mod transform;

use crate::{
    bucket_histogram::BucketError,
    record::{ParseFieldError, RecordFormatError},
};

/// Fatal condition of a pipeline run.
///
/// Every variant aborts the run before any artifact is written.
#[derive(
    Debug,
    derive_more::Display,
    derive_more::Error,
    derive_more::From,
    derive_more::IsVariant,
)]
pub enum AnalysisError {
    #[display("malformed record: {_0}")]
    Format(#[error(source)] RecordFormatError),
    #[display("invalid numeric value: {_0}")]
    Parse(#[error(source)] ParseFieldError),
    #[display("inconsistent discretized dataset: {_0}")]
    Consistency(#[error(source)] BucketError),
    #[display("no normal records to compute reference statistics from")]
    #[from(ignore)]
    NoReferenceRecords,
    #[display("reference statistics lack feature {index} ({name})")]
    #[from(ignore)]
    MissingReference { index: usize, name: &'static str },
}
