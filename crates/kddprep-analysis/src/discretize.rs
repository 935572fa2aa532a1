//! Z-score discretization
//!
//! A numeric value is scored against a reference mean and standard deviation
//! and mapped to one of eight ordinal buckets:
//!
//! | z-score          | bucket |
//! |------------------|--------|
//! | `z < -1`         | 1      |
//! | `-1 <= z < -0.5` | 2      |
//! | `-0.5 <= z < -0.25` | 3   |
//! | `-0.25 <= z < 0` | 4      |
//! | `0 <= z < 0.25`  | 5      |
//! | `0.25 <= z < 0.5`| 6      |
//! | `0.5 <= z < 1`   | 7      |
//! | `z >= 1`         | 8      |
//!
//! When the reference standard deviation is zero no z-score exists and the
//! value gets [`DiscreteLabel::Degenerate`], written as `0` in text output.

use std::{fmt, str::FromStr};

use kddprep_stats::zscore::z_score;

/// Lower bounds of buckets 2..=8, in z-score units.
const BUCKET_LOWER_BOUNDS: [f64; 7] = [-1.0, -0.5, -0.25, 0.0, 0.25, 0.5, 1.0];

/// An ordinal bucket label in `1..=8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Bucket(u8);

impl Bucket {
    pub const COUNT: usize = 8;
    pub const MIN: Self = Self(1);
    pub const MAX: Self = Self(8);

    /// Returns the bucket with the given label, if it is in `1..=8`.
    #[must_use]
    pub fn new(label: u8) -> Option<Self> {
        (1..=8).contains(&label).then_some(Self(label))
    }

    /// Maps a z-score to its bucket. Total over all `f64`, NaN included.
    #[expect(clippy::cast_possible_truncation)]
    #[must_use]
    pub fn from_z_score(z: f64) -> Self {
        // NaN compares false everywhere; it goes to the upper tail
        if z.is_nan() {
            return Self::MAX;
        }
        let passed = BUCKET_LOWER_BOUNDS
            .iter()
            .take_while(|&&bound| z >= bound)
            .count();
        Self(passed as u8 + 1)
    }

    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }

    /// All buckets in ascending order.
    pub fn all() -> impl DoubleEndedIterator<Item = Self> {
        (1..=8).map(Self)
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The discretized form of one numeric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::IsVariant)]
pub enum DiscreteLabel {
    /// The reference distribution has no spread; the bucket is undefined.
    Degenerate,
    Bucket(Bucket),
}

impl DiscreteLabel {
    /// Text form of [`DiscreteLabel::Degenerate`].
    pub const DEGENERATE_TEXT: &'static str = "0";
}

impl fmt::Display for DiscreteLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscreteLabel::Degenerate => f.write_str(Self::DEGENERATE_TEXT),
            DiscreteLabel::Bucket(bucket) => bucket.fmt(f),
        }
    }
}

/// Text that is neither `0` nor a bucket label.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid discrete label {text:?}")]
pub struct ParseDiscreteLabelError {
    pub text: String,
}

impl FromStr for DiscreteLabel {
    type Err = ParseDiscreteLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == Self::DEGENERATE_TEXT {
            return Ok(Self::Degenerate);
        }
        s.parse::<u8>()
            .ok()
            .and_then(Bucket::new)
            .map(Self::Bucket)
            .ok_or_else(|| ParseDiscreteLabelError { text: s.into() })
    }
}

/// Discretizes `value` against a reference `mean` and `std_dev`.
///
/// # Examples
///
/// ```
/// use kddprep_analysis::discretize::{Bucket, DiscreteLabel, discretize};
///
/// assert_eq!(discretize(10.0, 10.0, 2.0), DiscreteLabel::Bucket(Bucket::new(5).unwrap()));
/// assert_eq!(discretize(13.0, 10.0, 2.0), DiscreteLabel::Bucket(Bucket::MAX));
/// assert_eq!(discretize(13.0, 10.0, 0.0), DiscreteLabel::Degenerate);
/// assert_eq!(discretize(13.0, 10.0, 0.0).to_string(), "0");
/// ```
#[must_use]
pub fn discretize(value: f64, mean: f64, std_dev: f64) -> DiscreteLabel {
    match z_score(value, mean, std_dev) {
        Some(z) => DiscreteLabel::Bucket(Bucket::from_z_score(z)),
        None => DiscreteLabel::Degenerate,
    }
}
