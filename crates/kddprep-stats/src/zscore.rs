/// Computes the standard score of `value` against a reference distribution.
///
/// Returns `None` when `std_dev` is zero, since no deviation can be measured
/// against a distribution without spread.
///
/// # Examples
///
/// ```
/// # use kddprep_stats::zscore::z_score;
/// assert_eq!(z_score(3.0, 1.0, 4.0), Some(0.5));
/// assert_eq!(z_score(-1.0, 1.0, 4.0), Some(-0.5));
/// assert_eq!(z_score(3.0, 1.0, 0.0), None);
/// ```
#[must_use]
pub fn z_score(value: f64, mean: f64, std_dev: f64) -> Option<f64> {
    if std_dev == 0.0 {
        return None;
    }
    Some((value - mean) / std_dev)
}
