//! Dataset transformation
//!
//! [`Discretizer`] replaces every numeric feature of a record with its
//! [`DiscreteLabel`] against the reference (normal-class) statistics. Attack
//! records and holdout records are scored against that same reference: the
//! output measures how far each record deviates from normal traffic.

use tracing::info;

use crate::{
    AnalysisError,
    discretize::{DiscreteLabel, ParseDiscreteLabelError, discretize},
    partition::{self, ClassPartition, LabelHistogram, Labeled, RecordClass},
    record::{self, ParseFieldError, Record, RecordFormatError},
    schema::{NumericFeature, Schema},
    statistics::{FeatureStats, StatsTable},
};

/// A record whose numeric features hold discrete labels.
///
/// Same field layout as [`Record`]; categorical fields and the label are
/// copied unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscretizedRecord {
    line: usize,
    features: Vec<String>,
    label: String,
}

impl DiscretizedRecord {
    /// Rebuilds a discretized record from already split fields, e.g. when
    /// reading a discretized dataset back from disk.
    pub fn from_fields<I, S>(
        schema: &Schema,
        line: usize,
        fields: I,
    ) -> Result<Self, RecordFormatError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let (features, label) = record::split_fields(schema, line, fields)?;
        Ok(Self {
            line,
            features,
            label,
        })
    }

    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn features(&self) -> &[String] {
        &self.features
    }

    /// All fields in file order, label last.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.features
            .iter()
            .map(String::as_str)
            .chain([self.label.as_str()])
    }

    /// Parses the discrete label stored for a numeric feature.
    pub fn discrete_label(
        &self,
        feature: NumericFeature,
    ) -> Result<DiscreteLabel, ParseDiscreteLabelError> {
        self.features[feature.index()].parse()
    }
}

impl Labeled for DiscretizedRecord {
    fn label(&self) -> &str {
        &self.label
    }
}

/// Scores records against a fixed reference table.
#[derive(Debug, Clone)]
pub struct Discretizer {
    features: Vec<(NumericFeature, FeatureStats)>,
}

impl Discretizer {
    /// Pairs every numeric feature of `schema` with its reference statistics.
    ///
    /// Fails if the table lacks any numeric feature, so discretization itself
    /// never meets a missing reference.
    pub fn new(schema: &Schema, reference: &StatsTable) -> Result<Self, AnalysisError> {
        reference.check_covers(schema)?;
        let features = schema
            .numeric_features()
            .filter_map(|feature| reference.get(feature.index()).map(|stats| (feature, *stats)))
            .collect();
        Ok(Self { features })
    }

    pub fn discretize_record(&self, record: &Record) -> Result<DiscretizedRecord, ParseFieldError> {
        let mut features = record.features().to_vec();
        for (feature, stats) in &self.features {
            let value = record.numeric_value(*feature)?;
            let label = discretize(value, stats.mean, stats.std_dev);
            features[feature.index()] = label.to_string();
        }
        Ok(DiscretizedRecord {
            line: record.line(),
            features,
            label: record.label().to_owned(),
        })
    }

    pub fn discretize_all(
        &self,
        records: &[Record],
    ) -> Result<DiscretizedDataset, ParseFieldError> {
        let records = records
            .iter()
            .map(|record| self.discretize_record(record))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(DiscretizedDataset { records })
    }
}

/// A fully materialized discretized dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscretizedDataset {
    pub records: Vec<DiscretizedRecord>,
}

impl DiscretizedDataset {
    /// Re-partitions the discretized records by class, exactly as the raw
    /// records were partitioned.
    #[must_use]
    pub fn partition(&self) -> (LabelHistogram, ClassPartition<'_, DiscretizedRecord>) {
        partition::partition(&self.records)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// All datasets derived by the transformer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformOutput {
    /// The primary dataset, discretized.
    pub discretized: DiscretizedDataset,
    /// The holdout dataset, discretized with the primary dataset's reference.
    pub holdout: Option<DiscretizedDataset>,
}

impl TransformOutput {
    /// Normal-only and attack-only views of the discretized primary dataset.
    #[must_use]
    pub fn classes(&self) -> ClassPartition<'_, DiscretizedRecord> {
        self.discretized.partition().1
    }
}

/// Discretizes the primary dataset and, if given, a holdout dataset.
///
/// Both are scored against `reference`; the holdout never contributes to
/// any statistics.
pub fn transform(
    schema: &Schema,
    reference: &StatsTable,
    records: &[Record],
    holdout: Option<&[Record]>,
) -> Result<TransformOutput, AnalysisError> {
    let discretizer = Discretizer::new(schema, reference)?;

    let primary = discretizer.discretize_all(records)?;
    info!(records = primary.len(), "discretized primary dataset");

    let holdout = holdout
        .map(|holdout| {
            let (labels, classes) = partition::partition(holdout);
            info!(
                records = holdout.len(),
                labels = labels.len(),
                normal = classes.normal.len(),
                attack = classes.attack.len(),
                "discretizing holdout dataset"
            );
            discretizer.discretize_all(holdout)
        })
        .transpose()?;

    Ok(TransformOutput {
        discretized: primary,
        holdout,
    })
}

/// One row of the plotting dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlotRow<'a> {
    pub feature_name: &'static str,
    /// The original, unparsed field text.
    pub value: &'a str,
    pub class: RecordClass,
}

/// Flattens records into `(feature, value, class)` rows: one per record per
/// numeric feature, record-major.
pub fn plotting_rows<'a>(
    schema: &'a Schema,
    records: &'a [Record],
) -> impl Iterator<Item = PlotRow<'a>> + 'a {
    records.iter().flat_map(move |record| {
        schema.numeric_features().map(move |feature| PlotRow {
            feature_name: feature.name(),
            value: &record.features()[feature.index()],
            class: record.class(),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{discretize::Bucket, test_util::kdd_record};

    fn reference_records() -> Vec<Record> {
        vec![
            kdd_record(1, &[(4, "100"), (5, "200"), (22, "1")], "normal"),
            kdd_record(2, &[(4, "300"), (5, "200"), (22, "1")], "normal"),
            kdd_record(3, &[(4, "5000"), (5, "200"), (22, "1")], "neptune"),
        ]
    }

    #[test]
    fn test_attack_scored_against_normal_reference() {
        let schema = Schema::kdd();
        let records = reference_records();
        let (_, classes) = partition::partition(&records);
        let normal = classes.normal.iter().copied();
        let reference = StatsTable::from_reference(&schema, normal).unwrap();

        let output = transform(&schema, &reference, &records, None).unwrap();
        let discretized = &output.discretized.records;
        let src_bytes = schema.numeric_feature(4).unwrap();
        let label = |i: usize| discretized[i].discrete_label(src_bytes).unwrap();
        assert_eq!(label(0), DiscreteLabel::Bucket(Bucket::new(2).unwrap()));
        assert_eq!(label(1), DiscreteLabel::Bucket(Bucket::MAX));
        // the attack record is far above the normal mean
        assert_eq!(label(2), DiscreteLabel::Bucket(Bucket::MAX));
    }

    #[test]
    fn test_constant_reference_feature_is_degenerate() {
        let schema = Schema::kdd();
        let records = reference_records();
        let reference = StatsTable::from_reference(&schema, &records[..2]).unwrap();
        let output = transform(&schema, &reference, &records, None).unwrap();
        let count = schema.numeric_feature(22).unwrap();
        for record in &output.discretized.records {
            let label = record.discrete_label(count).unwrap();
            assert_eq!(label, DiscreteLabel::Degenerate);
            assert_eq!(record.features()[22], "0");
        }
    }

    #[test]
    fn test_non_numeric_fields_and_label_pass_through() {
        let schema = Schema::kdd();
        let records = reference_records();
        let reference = StatsTable::from_reference(&schema, &records[..2]).unwrap();
        let output = transform(&schema, &reference, &records, None).unwrap();
        for (raw, discretized) in records.iter().zip(&output.discretized.records) {
            assert_eq!(raw.label(), discretized.label());
            assert_eq!(raw.line(), discretized.line());
            for index in (0..schema.feature_count()).filter(|&i| !schema.is_numeric(i)) {
                assert_eq!(raw.features()[index], discretized.features()[index]);
            }
            for feature in schema.numeric_features() {
                assert!(discretized.discrete_label(feature).is_ok());
            }
        }
    }

    #[test]
    fn test_class_views_are_disjoint() {
        let schema = Schema::kdd();
        let records = reference_records();
        let reference = StatsTable::from_reference(&schema, &records[..2]).unwrap();
        let output = transform(&schema, &reference, &records, None).unwrap();
        let classes = output.classes();
        assert_eq!(classes.normal.len(), 2);
        assert_eq!(classes.attack.len(), 1);
        assert_eq!(classes.attack[0].label(), "neptune");
    }

    #[test]
    fn test_holdout_uses_primary_reference() {
        let schema = Schema::kdd();
        let records = reference_records();
        let reference = StatsTable::from_reference(&schema, &records[..2]).unwrap();
        let holdout = vec![
            kdd_record(1, &[(4, "200")], "normal"),
            kdd_record(2, &[(4, "0")], "smurf"),
        ];
        let output = transform(&schema, &reference, &records, Some(&holdout)).unwrap();
        let holdout = output.holdout.unwrap();
        let src_bytes = schema.numeric_feature(4).unwrap();
        // mean 200, stdev 100 from the primary normal records
        assert_eq!(
            holdout.records[0].discrete_label(src_bytes).unwrap(),
            DiscreteLabel::Bucket(Bucket::new(5).unwrap())
        );
        assert_eq!(
            holdout.records[1].discrete_label(src_bytes).unwrap(),
            DiscreteLabel::Bucket(Bucket::MIN)
        );
    }

    #[test]
    fn test_parse_failure_aborts_transform() {
        let schema = Schema::kdd();
        let mut records = reference_records();
        let reference = StatsTable::from_reference(&schema, &records[..2]).unwrap();
        records.push(kdd_record(4, &[(9, "?")], "normal"));
        let err = transform(&schema, &reference, &records, None).unwrap_err();
        let AnalysisError::Parse(parse) = &err else {
            panic!("unexpected error: {err:?}");
        };
        assert_eq!((parse.line, parse.name), (4, "hot"));
    }

    #[test]
    fn test_incomplete_reference_is_rejected() {
        let schema = Schema::kdd();
        let json = r#"{"features":{}}"#;
        let reference: StatsTable = serde_json::from_str(json).unwrap();
        assert!(matches!(
            Discretizer::new(&schema, &reference),
            Err(AnalysisError::MissingReference { index: 0, .. })
        ));
    }

    #[test]
    fn test_plotting_rows() {
        let schema = Schema::kdd();
        let records = reference_records();
        let rows = plotting_rows(&schema, &records).collect::<Vec<_>>();
        assert_eq!(rows.len(), records.len() * schema.numeric_features().len());
        assert_eq!(
            rows[1],
            PlotRow {
                feature_name: "src_bytes",
                value: "100",
                class: RecordClass::Normal
            }
        );
        let per_record = schema.numeric_features().len();
        let attacks = &rows[2 * per_record..];
        assert!(attacks.iter().all(|row| row.class == RecordClass::Attack));
        assert_eq!(rows[2 * per_record + 1].value, "5000");
    }

    #[test]
    fn test_reread_discretized_record() {
        let schema = Schema::kdd();
        let records = reference_records();
        let reference = StatsTable::from_reference(&schema, &records[..2]).unwrap();
        let output = transform(&schema, &reference, &records, None).unwrap();
        let original = &output.discretized.records[2];
        let line = original.fields().collect::<Vec<_>>().join(",");
        let reread = DiscretizedRecord::from_fields(&schema, 3, line.split(',')).unwrap();
        assert_eq!(&reread, original);
    }
}
