//! Per-feature, per-class statistics
//!
//! For every numeric feature and both record classes the engine computes the
//! population mean and standard deviation, plus the same two measures over the
//! strictly positive values only. KDD features are dominated by zeros, so the
//! non-zero variants describe the part of the distribution that actually
//! varies.
//!
//! The normal half of these statistics becomes the [`StatsTable`]: the
//! reference distribution every record is scored against during
//! discretization.

use std::collections::BTreeMap;

use kddprep_stats::descriptive::PopulationStats;
use tracing::{debug, warn};

use crate::{
    AnalysisError,
    partition::{ClassPartition, RecordClass},
    record::{ParseFieldError, Record},
    schema::{NumericFeature, Schema},
};

/// Summary of one numeric feature within one class.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FeatureStats {
    pub mean: f64,
    /// Population standard deviation (denominator `n`).
    pub std_dev: f64,
    /// Mean of the strictly positive values, `0` if there are none.
    pub nonzero_mean: f64,
    /// Population standard deviation of the strictly positive values, `0` if there are none.
    pub nonzero_std_dev: f64,
}

impl FeatureStats {
    /// Computes statistics of `feature` over `records`.
    ///
    /// Returns `Ok(None)` for an empty collection. Any value that fails to
    /// parse aborts the computation; skipping it would bias the result.
    ///
    /// # Examples
    ///
    /// ```
    /// use kddprep_analysis::{record::Record, schema::Schema, statistics::FeatureStats};
    ///
    /// let schema = Schema::kdd();
    /// let records = ["0", "0", "4", "8"]
    ///     .iter()
    ///     .enumerate()
    ///     .map(|(i, duration)| {
    ///         let mut fields = vec!["0"; 41];
    ///         fields[0] = duration;
    ///         Record::parse_line(&schema, i + 1, &format!("{},normal", fields.join(",")))
    ///     })
    ///     .collect::<Result<Vec<_>, _>>()
    ///     .unwrap();
    ///
    /// let duration = schema.numeric_feature(0).unwrap();
    /// let stats = FeatureStats::compute(&records, duration).unwrap().unwrap();
    /// assert_eq!(stats.mean, 3.0);
    /// assert_eq!(stats.nonzero_mean, 6.0);
    /// assert_eq!(stats.nonzero_std_dev, 2.0);
    /// ```
    pub fn compute<'a, I>(
        records: I,
        feature: NumericFeature,
    ) -> Result<Option<Self>, ParseFieldError>
    where
        I: IntoIterator<Item = &'a Record>,
    {
        let values = records
            .into_iter()
            .map(|record| record.numeric_value(feature))
            .collect::<Result<Vec<_>, _>>()?;
        let Some(all) = PopulationStats::from_slice(&values) else {
            return Ok(None);
        };

        let nonzero = values
            .iter()
            .copied()
            .filter(|&v| v > 0.0)
            .collect::<Vec<_>>();
        let (nonzero_mean, nonzero_std_dev) = match PopulationStats::from_slice(&nonzero) {
            Some(s) => (s.mean, s.std_dev),
            None => (0.0, 0.0),
        };

        Ok(Some(Self {
            mean: all.mean,
            std_dev: all.std_dev,
            nonzero_mean,
            nonzero_std_dev,
        }))
    }

    /// True when the feature showed no variation, so z-scores are undefined.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.std_dev == 0.0
    }
}

/// Statistics of one numeric feature for both classes.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureStatisticsRow {
    pub feature: NumericFeature,
    /// `None` when the class has no records.
    pub normal: Option<FeatureStats>,
    /// `None` when the class has no records.
    pub attack: Option<FeatureStats>,
}

impl FeatureStatisticsRow {
    #[must_use]
    pub fn get(&self, class: RecordClass) -> Option<&FeatureStats> {
        match class {
            RecordClass::Normal => self.normal.as_ref(),
            RecordClass::Attack => self.attack.as_ref(),
        }
    }
}

/// Statistics for every numeric feature of a schema, split by class.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassFeatureStatistics {
    /// One row per numeric feature, in schema order.
    pub rows: Vec<FeatureStatisticsRow>,
}

impl ClassFeatureStatistics {
    /// Runs the statistics engine once per numeric feature per class.
    pub fn from_partition(
        schema: &Schema,
        classes: &ClassPartition<'_, Record>,
    ) -> Result<Self, ParseFieldError> {
        let rows = schema
            .numeric_features()
            .map(|feature| {
                let normal = classes.normal.iter().copied();
                let attack = classes.attack.iter().copied();
                let normal = FeatureStats::compute(normal, feature)?;
                let attack = FeatureStats::compute(attack, feature)?;
                debug!(feature = feature.name(), ?normal, ?attack, "feature statistics");
                Ok(FeatureStatisticsRow {
                    feature,
                    normal,
                    attack,
                })
            })
            .collect::<Result<Vec<_>, ParseFieldError>>()?;
        Ok(Self { rows })
    }

    /// Extracts the normal-class statistics as the reference table.
    ///
    /// Fails when there are no normal records, since nothing can be scored
    /// without a reference distribution.
    pub fn reference_table(&self) -> Result<StatsTable, AnalysisError> {
        let features = self
            .rows
            .iter()
            .map(|row| {
                row.normal
                    .map(|stats| (row.feature.index(), stats))
                    .ok_or(AnalysisError::NoReferenceRecords)
            })
            .collect::<Result<BTreeMap<_, _>, _>>()?;
        let table = StatsTable { features };
        for row in &self.rows {
            if row.normal.is_some_and(|stats| stats.is_degenerate()) {
                warn!(
                    feature = row.feature.name(),
                    "normal class shows no variation; values map to the degenerate label"
                );
            }
        }
        Ok(table)
    }
}

/// Reference statistics keyed by numeric feature index.
///
/// Built once from the normal class and read-only afterwards. It is
/// serializable so a later run can score new data against the same
/// reference.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StatsTable {
    features: BTreeMap<usize, FeatureStats>,
}

impl StatsTable {
    /// Computes the reference table directly from normal records.
    pub fn from_reference<'a, I>(schema: &Schema, normal: I) -> Result<Self, AnalysisError>
    where
        I: IntoIterator<Item = &'a Record>,
        I::IntoIter: Clone,
    {
        let normal = normal.into_iter();
        let features = schema
            .numeric_features()
            .map(|feature| {
                FeatureStats::compute(normal.clone(), feature)?
                    .map(|stats| (feature.index(), stats))
                    .ok_or(AnalysisError::NoReferenceRecords)
            })
            .collect::<Result<BTreeMap<_, _>, AnalysisError>>()?;
        Ok(Self { features })
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&FeatureStats> {
        self.features.get(&index)
    }

    /// `(feature index, stats)` pairs in index order.
    #[must_use]
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (usize, &FeatureStats)> {
        self.features.iter().map(|(&index, stats)| (index, stats))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Checks that every numeric feature of `schema` has reference statistics.
    pub fn check_covers(&self, schema: &Schema) -> Result<(), AnalysisError> {
        let missing = schema
            .numeric_features()
            .find(|feature| !self.features.contains_key(&feature.index()));
        match missing {
            Some(feature) => Err(AnalysisError::MissingReference {
                index: feature.index(),
                name: feature.name(),
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{partition, test_util::kdd_record};

    #[test]
    fn test_population_stdev() {
        let schema = Schema::kdd();
        let records = [2, 4, 4, 4, 5, 5, 7, 9]
            .iter()
            .enumerate()
            .map(|(i, v)| kdd_record(i + 1, &[(0, &v.to_string())], "normal"))
            .collect::<Vec<_>>();
        let duration = schema.numeric_feature(0).unwrap();
        let stats = FeatureStats::compute(&records, duration).unwrap().unwrap();
        assert!((stats.mean - 5.0).abs() < 1e-12);
        assert!((stats.std_dev - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_nonzero_fallback_is_zero() {
        let schema = Schema::kdd();
        let records = (1..=5)
            .map(|line| kdd_record(line, &[], "normal"))
            .collect::<Vec<_>>();
        let urgent = schema.numeric_feature(8).unwrap();
        let stats = FeatureStats::compute(&records, urgent).unwrap().unwrap();
        assert_eq!(stats.mean, 0.0);
        assert_eq!(stats.std_dev, 0.0);
        assert_eq!(stats.nonzero_mean, 0.0);
        assert_eq!(stats.nonzero_std_dev, 0.0);
        assert!(stats.is_degenerate());
    }

    #[test]
    fn test_negative_values_are_not_nonzero() {
        let schema = Schema::kdd();
        let records = ["-3", "0", "2", "4"]
            .iter()
            .enumerate()
            .map(|(i, v)| kdd_record(i + 1, &[(0, v)], "normal"))
            .collect::<Vec<_>>();
        let duration = schema.numeric_feature(0).unwrap();
        let stats = FeatureStats::compute(&records, duration).unwrap().unwrap();
        assert!((stats.mean - 0.75).abs() < 1e-12);
        assert!((stats.nonzero_mean - 3.0).abs() < 1e-12);
        assert!((stats.nonzero_std_dev - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_identical_values_have_zero_stdev() {
        let schema = Schema::kdd();
        let records = (1..=4)
            .map(|line| kdd_record(line, &[(24, "0.07")], "normal"))
            .collect::<Vec<_>>();
        let serror = schema.numeric_feature(24).unwrap();
        let stats = FeatureStats::compute(&records, serror).unwrap().unwrap();
        assert_eq!(stats.std_dev, 0.0);
        assert_eq!(stats.nonzero_std_dev, 0.0);
        assert_eq!(stats.mean, 0.07);
    }

    #[test]
    fn test_empty_collection() {
        let schema = Schema::kdd();
        let duration = schema.numeric_feature(0).unwrap();
        assert_eq!(FeatureStats::compute([], duration).unwrap(), None);
    }

    #[test]
    fn test_parse_failure_propagates() {
        let schema = Schema::kdd();
        let records = vec![
            kdd_record(1, &[(5, "10")], "normal"),
            kdd_record(2, &[(5, "n/a")], "normal"),
        ];
        let dst_bytes = schema.numeric_feature(5).unwrap();
        let err = FeatureStats::compute(&records, dst_bytes).unwrap_err();
        assert_eq!(err.line, 2);
        assert_eq!(err.name, "dst_bytes");
    }

    #[test]
    fn test_deterministic() {
        let schema = Schema::kdd();
        let records = ["0.13", "7", "1e3", "0.0001", "42.42", "0"]
            .iter()
            .enumerate()
            .map(|(i, v)| kdd_record(i + 1, &[(4, v)], "normal"))
            .collect::<Vec<_>>();
        let bytes = schema.numeric_feature(4).unwrap();
        let first = FeatureStats::compute(&records, bytes).unwrap().unwrap();
        let again = FeatureStats::compute(&records, bytes).unwrap().unwrap();
        for (x, y) in [
            (first.mean, again.mean),
            (first.std_dev, again.std_dev),
            (first.nonzero_mean, again.nonzero_mean),
            (first.nonzero_std_dev, again.nonzero_std_dev),
        ] {
            assert_eq!(x.to_bits(), y.to_bits());
        }
    }

    #[test]
    fn test_reference_table_uses_normal_class_only() {
        let schema = Schema::kdd();
        let records = vec![
            kdd_record(1, &[(4, "100")], "normal"),
            kdd_record(2, &[(4, "300")], "normal"),
            kdd_record(3, &[(4, "99999")], "smurf"),
        ];
        let (_, classes) = partition::partition(&records);
        let statistics = ClassFeatureStatistics::from_partition(&schema, &classes).unwrap();
        assert_eq!(statistics.rows.len(), schema.numeric_features().len());

        let table = statistics.reference_table().unwrap();
        table.check_covers(&schema).unwrap();
        let src_bytes = table.get(4).unwrap();
        assert_eq!(src_bytes.mean, 200.0);
        assert_eq!(src_bytes.std_dev, 100.0);

        let normal = classes.normal.iter().copied();
        let direct = StatsTable::from_reference(&schema, normal).unwrap();
        assert_eq!(direct, table);

        let row = &statistics.rows[1];
        assert_eq!(row.feature.name(), "src_bytes");
        assert_eq!(row.get(RecordClass::Attack).unwrap().mean, 99999.0);
    }

    #[test]
    fn test_reference_table_without_normal_records() {
        let schema = Schema::kdd();
        let records = vec![kdd_record(1, &[], "neptune")];
        let (_, classes) = partition::partition(&records);
        let statistics = ClassFeatureStatistics::from_partition(&schema, &classes).unwrap();
        assert!(statistics.rows.iter().all(|row| row.normal.is_none()));
        assert!(matches!(
            statistics.reference_table(),
            Err(AnalysisError::NoReferenceRecords)
        ));
    }

    #[test]
    fn test_missing_reference_feature() {
        let schema = Schema::kdd();
        let stats = r#"{"mean":1.0,"std_dev":0.5,"nonzero_mean":1.0,"nonzero_std_dev":0.5}"#;
        let json = format!(r#"{{"features":{{"0":{stats}}}}}"#);
        let table: StatsTable = serde_json::from_str(&json).unwrap();
        assert_eq!(table.len(), 1);
        let err = table.check_covers(&schema).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::MissingReference {
                index: 4,
                name: "src_bytes"
            }
        ));
    }

    #[test]
    fn test_json_round_trip() {
        let schema = Schema::kdd();
        let records = vec![
            kdd_record(1, &[(0, "1.5"), (22, "3")], "normal"),
            kdd_record(2, &[(0, "2.5"), (22, "9")], "normal"),
        ];
        let table = StatsTable::from_reference(&schema, &records).unwrap();
        let json = serde_json::to_string(&table).unwrap();
        let restored: StatsTable = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, table);
    }
}
