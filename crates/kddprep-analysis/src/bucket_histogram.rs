//! Bucket histograms over discretized datasets
//!
//! The final pass re-reads the discretized records and tallies, for each
//! numeric feature and class, how many records fall into each of the eight
//! buckets. Any value that is not a bucket label is a consistency fault; the
//! one exception is a feature whose reference standard deviation is zero,
//! where the degenerate label is the only value the transformer can emit.

use kddprep_stats::histogram::CountHistogram;

use crate::{
    AnalysisError,
    discretize::{Bucket, DiscreteLabel},
    partition::RecordClass,
    schema::{NumericFeature, Schema},
    statistics::{FeatureStats, StatsTable},
    transform::{DiscretizedDataset, DiscretizedRecord},
};

/// A discretized field that contradicts what the transformer produces.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum BucketError {
    #[display("line {line}: field {field} ({name}) holds the degenerate label")]
    Degenerate {
        line: usize,
        field: usize,
        name: &'static str,
    },
    #[display("line {line}: field {field} ({name}) is degenerate but holds bucket {bucket}")]
    UnexpectedBucket {
        line: usize,
        field: usize,
        name: &'static str,
        bucket: u8,
    },
    #[display("line {line}: field {field} ({name}) is not a discrete label: {value:?}")]
    OutOfRange {
        line: usize,
        field: usize,
        name: &'static str,
        value: String,
    },
}

fn read_label(
    record: &DiscretizedRecord,
    feature: NumericFeature,
) -> Result<DiscreteLabel, BucketError> {
    record
        .discrete_label(feature)
        .map_err(|err| BucketError::OutOfRange {
            line: record.line(),
            field: feature.index(),
            name: feature.name(),
            value: err.text,
        })
}

/// Counts of buckets 1..=8 for one feature within one class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BucketHistogram {
    counts: CountHistogram<{ Bucket::COUNT }>,
}

impl BucketHistogram {
    /// Tallies the bucket of `feature` in every record.
    ///
    /// The degenerate label and anything outside `1..=8` are rejected.
    pub fn from_records<'a, I>(records: I, feature: NumericFeature) -> Result<Self, BucketError>
    where
        I: IntoIterator<Item = &'a DiscretizedRecord>,
    {
        let mut counts = CountHistogram::new();
        for record in records {
            let bucket = match read_label(record, feature)? {
                DiscreteLabel::Bucket(bucket) => bucket,
                DiscreteLabel::Degenerate => {
                    return Err(BucketError::Degenerate {
                        line: record.line(),
                        field: feature.index(),
                        name: feature.name(),
                    });
                }
            };
            counts
                .record(usize::from(bucket.get()))
                .map_err(|_| BucketError::OutOfRange {
                    line: record.line(),
                    field: feature.index(),
                    name: feature.name(),
                    value: bucket.to_string(),
                })?;
        }
        Ok(Self { counts })
    }

    #[must_use]
    pub fn count(&self, bucket: Bucket) -> u64 {
        self.counts.count(usize::from(bucket.get())).unwrap_or(0)
    }

    /// Counts indexed from bucket 1 at position 0.
    #[must_use]
    pub fn counts(&self) -> &[u64; Bucket::COUNT] {
        self.counts.counts()
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.counts.total()
    }
}

/// Histogram of one feature within one class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum FeatureHistogram {
    Buckets(BucketHistogram),
    /// The reference had no variation; every record holds the degenerate label.
    Degenerate { records: usize },
}

impl FeatureHistogram {
    fn tally<'a, I>(
        records: I,
        feature: NumericFeature,
        reference: &FeatureStats,
    ) -> Result<Self, BucketError>
    where
        I: IntoIterator<Item = &'a DiscretizedRecord>,
    {
        if !reference.is_degenerate() {
            let histogram = BucketHistogram::from_records(records, feature)?;
            return Ok(Self::Buckets(histogram));
        }
        let mut count = 0;
        for record in records {
            if let DiscreteLabel::Bucket(bucket) = read_label(record, feature)? {
                return Err(BucketError::UnexpectedBucket {
                    line: record.line(),
                    field: feature.index(),
                    name: feature.name(),
                    bucket: bucket.get(),
                });
            }
            count += 1;
        }
        Ok(Self::Degenerate { records: count })
    }

    /// Number of records the histogram covers.
    #[must_use]
    pub fn records(&self) -> u64 {
        match self {
            Self::Buckets(histogram) => histogram.total(),
            Self::Degenerate { records } => *records as u64,
        }
    }
}

/// Histograms of one feature for both classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketHistogramRow {
    pub feature: NumericFeature,
    pub normal: FeatureHistogram,
    pub attack: FeatureHistogram,
}

impl BucketHistogramRow {
    #[must_use]
    pub fn get(&self, class: RecordClass) -> &FeatureHistogram {
        match class {
            RecordClass::Normal => &self.normal,
            RecordClass::Attack => &self.attack,
        }
    }
}

/// Bucket histograms for every numeric feature, split by class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketHistogramTable {
    /// One row per numeric feature, in schema order.
    pub rows: Vec<BucketHistogramRow>,
}

impl BucketHistogramTable {
    /// Partitions `dataset` by class and tallies every numeric feature.
    ///
    /// `reference` must be the table the dataset was discretized with; it
    /// tells which features legitimately hold the degenerate label.
    pub fn from_dataset(
        schema: &Schema,
        dataset: &DiscretizedDataset,
        reference: &StatsTable,
    ) -> Result<Self, AnalysisError> {
        let (_, classes) = dataset.partition();
        let rows = schema
            .numeric_features()
            .map(|feature| {
                let missing = AnalysisError::MissingReference {
                    index: feature.index(),
                    name: feature.name(),
                };
                let stats = reference.get(feature.index()).ok_or(missing)?;
                let normal = classes.normal.iter().copied();
                let attack = classes.attack.iter().copied();
                Ok(BucketHistogramRow {
                    feature,
                    normal: FeatureHistogram::tally(normal, feature, stats)?,
                    attack: FeatureHistogram::tally(attack, feature, stats)?,
                })
            })
            .collect::<Result<Vec<_>, AnalysisError>>()?;
        Ok(Self { rows })
    }
}
