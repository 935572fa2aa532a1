//! End-to-end analysis run
//!
//! Chains partitioning, statistics, discretization and the bucket analysis in
//! the order each phase depends on the previous one. Every phase completes
//! over the whole dataset before the next starts, and any error aborts the
//! run.

use tracing::info;

use crate::{
    AnalysisError,
    bucket_histogram::BucketHistogramTable,
    partition::{self, LabelHistogram},
    record::Record,
    schema::Schema,
    statistics::{ClassFeatureStatistics, StatsTable},
    transform::{self, TransformOutput},
};

/// Everything a run derives from its input.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub labels: LabelHistogram,
    pub statistics: ClassFeatureStatistics,
    /// The normal-class statistics every record was scored against.
    pub reference: StatsTable,
    pub transformed: TransformOutput,
    pub histograms: BucketHistogramTable,
}

/// Runs all analysis phases over `records`, discretizing `holdout` with the
/// same reference.
pub fn run(
    schema: &Schema,
    records: &[Record],
    holdout: Option<&[Record]>,
) -> Result<PipelineOutput, AnalysisError> {
    let (labels, classes) = partition::partition(records);
    info!(
        records = records.len(),
        labels = labels.len(),
        normal = classes.normal.len(),
        attack = classes.attack.len(),
        "partitioned dataset"
    );

    let statistics = ClassFeatureStatistics::from_partition(schema, &classes)?;
    let reference = statistics.reference_table()?;
    info!(features = reference.len(), "computed feature statistics");

    let transformed = transform::transform(schema, &reference, records, holdout)?;

    let histograms =
        BucketHistogramTable::from_dataset(schema, &transformed.discretized, &reference)?;
    info!(
        features = histograms.rows.len(),
        "analyzed discretized features"
    );

    Ok(PipelineOutput {
        labels,
        statistics,
        reference,
        transformed,
        histograms,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        bucket_histogram::FeatureHistogram,
        discretize::{Bucket, DiscreteLabel},
        partition::RecordClass,
        test_util::kdd_record,
    };

    #[test]
    fn test_normal_and_attack_counts() {
        let schema = Schema::kdd();
        let records = vec![
            kdd_record(1, &[(4, "100")], "normal"),
            kdd_record(2, &[(4, "300")], "normal"),
            kdd_record(3, &[(4, "9000")], "neptune"),
            kdd_record(4, &[(4, "8000")], "neptune"),
        ];
        let output = run(&schema, &records, None).unwrap();
        assert_eq!(
            output.labels.iter().collect::<Vec<_>>(),
            vec![("normal", 2), ("neptune", 2)]
        );
        let numeric = schema.numeric_features().len();
        assert_eq!(output.statistics.rows.len(), numeric);
        assert_eq!(output.reference.len(), numeric);
        assert_eq!(output.transformed.discretized.len(), records.len());
        assert!(output.transformed.holdout.is_none());
    }

    #[test]
    fn test_constant_feature_gets_sentinel() {
        let schema = Schema::kdd();
        let records = (1..=4)
            .map(|line| kdd_record(line, &[(22, "1"), (4, &(line * 10).to_string())], "normal"))
            .collect::<Vec<_>>();
        let output = run(&schema, &records, None).unwrap();
        let count = schema.numeric_feature(22).unwrap();
        assert_eq!(output.reference.get(22).unwrap().std_dev, 0.0);
        for record in &output.transformed.discretized.records {
            let label = record.discrete_label(count).unwrap();
            assert_eq!(label, DiscreteLabel::Degenerate);
        }
        let rows = &output.histograms.rows;
        let row = rows.iter().find(|row| row.feature == count).unwrap();
        assert_eq!(row.normal, FeatureHistogram::Degenerate { records: 4 });
    }

    #[test]
    fn test_too_few_fields_is_a_format_error() {
        let schema = Schema::kdd();
        let err = Record::parse_lines(&schema, ["0,tcp,http,SF,normal"]).unwrap_err();
        assert_eq!(err.line, 1);
        assert_eq!(err.found, 5);
        assert!(AnalysisError::from(err).is_format());
    }

    #[test]
    fn test_no_normal_records() {
        let schema = Schema::kdd();
        let records = vec![kdd_record(1, &[], "smurf")];
        let err = run(&schema, &records, None).unwrap_err();
        assert!(err.is_no_reference_records());
    }

    #[test]
    fn test_histogram_counts_match_class_sizes() {
        let schema = Schema::kdd();
        let records = (1..=20)
            .map(|line| {
                let label = if line % 3 == 0 { "smurf" } else { "normal" };
                let src_bytes = (line * line).to_string();
                let dst_bytes = line.to_string();
                kdd_record(line, &[(4, &src_bytes), (5, &dst_bytes)], label)
            })
            .collect::<Vec<_>>();
        let output = run(&schema, &records, None).unwrap();
        let classes = output.transformed.classes();
        for row in &output.histograms.rows {
            for class in RecordClass::ALL {
                let size = classes.get(class).len() as u64;
                assert_eq!(row.get(class).records(), size);
            }
        }

        let rows = &output.histograms.rows;
        let src_bytes = rows.iter().find(|row| row.feature.index() == 4).unwrap();
        let FeatureHistogram::Buckets(normal) = src_bytes.normal else {
            panic!("src_bytes varies among normal records");
        };
        let expected = classes
            .normal
            .iter()
            .filter(|record| record.features()[4] == "8")
            .count();
        assert_eq!(normal.count(Bucket::MAX), expected as u64);
    }

    #[test]
    fn test_non_finite_value_aborts_run() {
        let schema = Schema::kdd();
        for bad in ["1e400", "inf", "NaN"] {
            let records = vec![
                kdd_record(1, &[(4, "7")], "normal"),
                kdd_record(2, &[(4, bad)], "normal"),
            ];
            let err = run(&schema, &records, None).unwrap_err();
            let AnalysisError::Parse(parse) = &err else {
                panic!("{bad:?} gave {err:?}");
            };
            assert_eq!((parse.line, parse.field), (2, 4));
            assert!(parse.source.is_non_finite(), "{bad:?}");
        }
    }
}
