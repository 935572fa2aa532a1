/// A frequency table over `N` ordinal bins labelled `1..=N`.
///
/// Unlike a value-range histogram, the bins are fixed labels chosen by the
/// caller, so the table only counts; it never decides where a value falls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountHistogram<const N: usize> {
    counts: [u64; N],
}

/// Error returned when a label lies outside `1..=N`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("label {label} outside of 1..={max}")]
pub struct LabelOutOfRange {
    /// The rejected label.
    pub label: usize,
    /// The largest valid label.
    pub max: usize,
}

impl<const N: usize> Default for CountHistogram<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> CountHistogram<N> {
    /// Creates an empty histogram.
    #[must_use]
    pub const fn new() -> Self {
        Self { counts: [0; N] }
    }

    /// Adds one observation of `label`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use kddprep_stats::histogram::CountHistogram;
    /// let mut histogram = CountHistogram::<8>::new();
    /// histogram.record(8).unwrap();
    /// assert!(histogram.record(0).is_err());
    /// assert!(histogram.record(9).is_err());
    /// assert_eq!(histogram.count(8), Some(1));
    /// ```
    pub fn record(&mut self, label: usize) -> Result<(), LabelOutOfRange> {
        let slot = label
            .checked_sub(1)
            .and_then(|idx| self.counts.get_mut(idx))
            .ok_or(LabelOutOfRange { label, max: N })?;
        *slot += 1;
        Ok(())
    }

    /// Returns the count for `label`, or `None` when the label is out of range.
    #[must_use]
    pub fn count(&self, label: usize) -> Option<u64> {
        label
            .checked_sub(1)
            .and_then(|idx| self.counts.get(idx))
            .copied()
    }

    /// Counts indexed from label 1 at position 0.
    #[must_use]
    pub fn counts(&self) -> &[u64; N] {
        &self.counts
    }

    /// Total number of recorded observations.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }
}
