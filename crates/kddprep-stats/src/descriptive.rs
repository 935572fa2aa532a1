/// Population statistics summarizing a dataset.
///
/// The dataset is treated as the whole population of interest, so the
/// variance divides by the number of values rather than by `n - 1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopulationStats {
    /// The number of values in the dataset.
    pub count: usize,
    /// The arithmetic mean (average) of the dataset.
    pub mean: f64,
    /// The population variance of the dataset.
    pub variance: f64,
    /// The population standard deviation of the dataset.
    pub std_dev: f64,
}

impl PopulationStats {
    /// Computes population statistics from values in any order.
    ///
    /// Values are summed in iteration order, so two calls over the same
    /// sequence produce bit-identical results.
    ///
    /// # Returns
    ///
    /// * `Some(PopulationStats)` - if the dataset contains at least one value
    /// * `None` - if the dataset is empty
    ///
    /// # Examples
    ///
    /// ```
    /// # use kddprep_stats::descriptive::PopulationStats;
    /// let stats = PopulationStats::new([1.0, 2.0, 3.0, 4.0]).unwrap();
    /// assert_eq!(stats.count, 4);
    /// assert_eq!(stats.mean, 2.5);
    /// assert_eq!(stats.variance, 1.25);
    ///
    /// assert!(PopulationStats::new(std::iter::empty()).is_none());
    /// ```
    #[must_use]
    pub fn new<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let values = values.into_iter().collect::<Vec<_>>();
        Self::from_slice(&values)
    }

    /// Computes population statistics from a slice of values.
    ///
    /// Uses two passes: one for the mean and one for the squared deviations.
    /// A constant dataset yields its value as the mean and exactly zero
    /// dispersion, independent of rounding in the summation.
    ///
    /// # Examples
    ///
    /// ```
    /// # use kddprep_stats::descriptive::PopulationStats;
    /// let stats = PopulationStats::from_slice(&[0.1, 0.1, 0.1]).unwrap();
    /// assert_eq!(stats.mean, 0.1);
    /// assert_eq!(stats.std_dev, 0.0);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn from_slice(values: &[f64]) -> Option<Self> {
        let first = *values.first()?;
        let count = values.len();

        if values.iter().all(|v| v.to_bits() == first.to_bits()) {
            return Some(Self {
                count,
                mean: first,
                variance: 0.0,
                std_dev: 0.0,
            });
        }

        let n = count as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

        Some(Self {
            count,
            mean,
            variance,
            std_dev: variance.sqrt(),
        })
    }
}
