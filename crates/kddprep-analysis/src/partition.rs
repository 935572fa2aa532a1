//! Splitting records by label
//!
//! The pipeline only distinguishes two classes: records labelled exactly
//! `normal`, and everything else. The per-label counts are kept separately
//! for the class-count report.

use std::collections::HashMap;

/// The label that marks benign traffic. Comparison is exact and case-sensitive.
pub const NORMAL_LABEL: &str = "normal";

/// Binary class of a record.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    derive_more::Display,
    derive_more::IsVariant,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum RecordClass {
    #[display("normal")]
    Normal,
    #[display("attack")]
    Attack,
}

impl RecordClass {
    /// Both classes, in report order.
    pub const ALL: [Self; 2] = [Self::Normal, Self::Attack];

    #[must_use]
    pub fn of_label(label: &str) -> Self {
        if label == NORMAL_LABEL {
            Self::Normal
        } else {
            Self::Attack
        }
    }
}

/// Anything that carries a ground-truth label.
pub trait Labeled {
    fn label(&self) -> &str;

    fn class(&self) -> RecordClass {
        RecordClass::of_label(self.label())
    }
}

/// Occurrence count per distinct label, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelHistogram {
    counts: Vec<(String, usize)>,
    positions: HashMap<String, usize>,
}

impl LabelHistogram {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, label: &str) {
        if let Some(&pos) = self.positions.get(label) {
            self.counts[pos].1 += 1;
        } else {
            self.positions.insert(label.to_owned(), self.counts.len());
            self.counts.push((label.to_owned(), 1));
        }
    }

    #[must_use]
    pub fn get(&self, label: &str) -> Option<usize> {
        self.positions.get(label).map(|&pos| self.counts[pos].1)
    }

    /// `(label, count)` pairs in first-seen order.
    #[must_use]
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&str, usize)> {
        self.counts
            .iter()
            .map(|(label, count)| (label.as_str(), *count))
    }

    /// Number of distinct labels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts, equal to the number of records seen.
    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.iter().map(|(_, count)| count).sum()
    }
}

/// Disjoint normal / attack views over a record collection.
#[derive(Debug)]
pub struct ClassPartition<'a, R> {
    pub normal: Vec<&'a R>,
    pub attack: Vec<&'a R>,
}

impl<R> Clone for ClassPartition<'_, R> {
    fn clone(&self) -> Self {
        Self {
            normal: self.normal.clone(),
            attack: self.attack.clone(),
        }
    }
}

impl<'a, R> ClassPartition<'a, R> {
    #[must_use]
    pub fn get(&self, class: RecordClass) -> &[&'a R] {
        match class {
            RecordClass::Normal => &self.normal,
            RecordClass::Attack => &self.attack,
        }
    }

    /// Total number of records across both classes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.normal.len() + self.attack.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Counts labels and splits records into the normal and attack classes.
///
/// Every record lands in exactly one class, so
/// `partition.len() == records.len() == histogram.total()`.
///
/// # Examples
///
/// ```
/// use kddprep_analysis::{partition, record::Record, schema::Schema};
///
/// let schema = Schema::kdd();
/// let line = |bytes: &str, label: &str| {
///     let mut fields = vec!["0"; 41];
///     fields[4] = bytes;
///     format!("{},{label}\n", fields.join(","))
/// };
/// let records = vec![
///     Record::parse_line(&schema, 1, &line("100", "normal")).unwrap(),
///     Record::parse_line(&schema, 2, &line("5000", "neptune")).unwrap(),
/// ];
///
/// let (labels, classes) = partition::partition(&records);
/// assert_eq!(labels.get("normal"), Some(1));
/// assert_eq!(labels.get("neptune"), Some(1));
/// assert_eq!(classes.normal[0].line(), 1);
/// assert_eq!(classes.attack[0].line(), 2);
/// ```
pub fn partition<R>(records: &[R]) -> (LabelHistogram, ClassPartition<'_, R>)
where
    R: Labeled,
{
    let mut labels = LabelHistogram::new();
    let mut classes = ClassPartition {
        normal: vec![],
        attack: vec![],
    };
    for record in records {
        labels.add(record.label());
        match record.class() {
            RecordClass::Normal => classes.normal.push(record),
            RecordClass::Attack => classes.attack.push(record),
        }
    }
    (labels, classes)
}
