//! Fixed field layout of KDD-style connection records
//!
//! A record has 42 comma-separated fields: 41 features followed by the label.
//! Of the features, a fixed subset holds decimal numbers and takes part in
//! statistics and discretization; the rest are categorical or binary flags
//! that pass through every transformation unchanged.

/// Feature names, index-aligned with record fields `0..41`.
const KDD_FEATURE_NAMES: [&str; 41] = [
    "duration",
    "protocol_type",
    "service",
    "flag",
    "src_bytes",
    "dst_bytes",
    "land",
    "wrong_fragments",
    "urgent",
    "hot",
    "num_failed_logins",
    "logged_in",
    "num_compromised",
    "root_shell",
    "su_attempted",
    "num_root",
    "num_file_creations",
    "num_shells",
    "num_access_files",
    "num_outbound_cmds",
    "is_host_login",
    "is_guest_login",
    "count",
    "srv_count",
    "serror_rate",
    "srv_serror_rate",
    "rerror_rate",
    "srv_rerror_rate",
    "same_srv_rate",
    "diff_srv_rate",
    "srv_diff_host_rate",
    "dst_host_count",
    "dst_host_srv_count",
    "dst_host_same_srv_rate",
    "dst_host_diff_srv_rate",
    "dst_host_same_src_port_rate",
    "dst_host_srv_diff_host_rate",
    "dst_host_serror_rate",
    "dst_host_srv_serror_rate",
    "dst_host_rerror_rate",
    "dst_host_srv_rerror_rate",
];

/// Indices of the numeric features, in schema order.
const KDD_NUMERIC_INDICES: [usize; 34] = [
    0, 4, 5, 7, 8, 9, 10, //
    12, 13, 14, 15, 16, 17, 18, 19, //
    22, 23, 24, 25, 26, 27, 28, 29, 30, 31, 32, 33, 34, 35, 36, 37, 38, 39, 40,
];

/// Dataset layouts understood by the pipeline.
///
/// `KDDCup99` and `NSL-KDD` share one layout; `NSL-KDD`'s trailing difficulty
/// column is dropped when records are read.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    derive_more::Display,
    derive_more::FromStr,
)]
pub enum DatasetKind {
    #[default]
    #[display("kdd")]
    Kdd,
}

impl DatasetKind {
    #[must_use]
    pub fn schema(self) -> Schema {
        match self {
            DatasetKind::Kdd => Schema::kdd(),
        }
    }
}

/// A numeric feature: its field index and name.
///
/// Only a [`Schema`] hands these out, so the index is always a valid feature
/// position for records of that schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumericFeature {
    index: usize,
    name: &'static str,
}

impl NumericFeature {
    #[must_use]
    pub fn index(self) -> usize {
        self.index
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        self.name
    }
}

/// Immutable description of the record layout.
///
/// Passed by value to every component; there is no global schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schema {
    feature_names: &'static [&'static str],
    numeric_indices: &'static [usize],
}

impl Schema {
    /// The 42-field `KDDCup99` / `NSL-KDD` layout.
    #[must_use]
    pub const fn kdd() -> Self {
        Self {
            feature_names: &KDD_FEATURE_NAMES,
            numeric_indices: &KDD_NUMERIC_INDICES,
        }
    }

    /// Number of fields in a record, label included.
    #[must_use]
    pub const fn field_count(&self) -> usize {
        self.feature_names.len() + 1
    }

    /// Position of the label field; it always follows the last feature.
    #[must_use]
    pub const fn label_index(&self) -> usize {
        self.feature_names.len()
    }

    /// Number of feature fields (everything except the label).
    #[must_use]
    pub const fn feature_count(&self) -> usize {
        self.feature_names.len()
    }

    #[must_use]
    pub fn feature_name(&self, index: usize) -> Option<&'static str> {
        self.feature_names.get(index).copied()
    }

    #[must_use]
    pub fn is_numeric(&self, index: usize) -> bool {
        self.numeric_indices.contains(&index)
    }

    /// Numeric features in schema order.
    #[must_use]
    pub fn numeric_features(&self) -> impl ExactSizeIterator<Item = NumericFeature> + '_ {
        self.numeric_indices.iter().map(|&index| NumericFeature {
            index,
            name: self.feature_names[index],
        })
    }

    /// Looks up a numeric feature by field index.
    #[must_use]
    pub fn numeric_feature(&self, index: usize) -> Option<NumericFeature> {
        self.is_numeric(index).then(|| NumericFeature {
            index,
            name: self.feature_names[index],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kdd_layout() {
        let schema = Schema::kdd();
        assert_eq!(schema.field_count(), 42);
        assert_eq!(schema.label_index(), 41);
        assert_eq!(schema.feature_name(0), Some("duration"));
        assert_eq!(schema.feature_name(40), Some("dst_host_srv_rerror_rate"));
        assert_eq!(schema.feature_name(41), None);
    }

    #[test]
    fn test_numeric_features_are_sorted_and_unique() {
        let schema = Schema::kdd();
        let indices = schema
            .numeric_features()
            .map(NumericFeature::index)
            .collect::<Vec<_>>();
        assert!(indices.is_sorted_by(|a, b| a < b));
        assert!(indices.iter().all(|&i| i < schema.feature_count()));
    }

    #[test]
    fn test_categorical_features_are_not_numeric() {
        let schema = Schema::kdd();
        for name in [
            "protocol_type",
            "service",
            "flag",
            "land",
            "logged_in",
            "is_host_login",
            "is_guest_login",
        ] {
            let index = (0..schema.feature_count())
                .find(|&i| schema.feature_name(i) == Some(name))
                .unwrap();
            assert!(!schema.is_numeric(index), "{name} should be categorical");
            assert!(schema.numeric_feature(index).is_none());
        }
        let numeric = schema.numeric_features().len();
        assert_eq!(numeric + 7, schema.feature_count());
    }

    #[test]
    fn test_dataset_kind_schema() {
        assert_eq!(DatasetKind::default().schema(), Schema::kdd());
        assert_eq!(DatasetKind::Kdd.to_string(), "kdd");
        assert_eq!("kdd".parse::<DatasetKind>().unwrap(), DatasetKind::Kdd);
    }
}
