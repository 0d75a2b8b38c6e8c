//! Summary statistics and duration formatting.

/// Errors computing statistics.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StatsError {
    /// No values to summarise
    #[error("cannot compute statistics over an empty roster")]
    Empty,
}

/// Arithmetic mean, rounded half to even.
pub fn mean(values: &[f64]) -> Result<i64, StatsError> {
    if values.is_empty() {
        return Err(StatsError::Empty);
    }
    let sum: f64 = values.iter().sum();
    Ok((sum / values.len() as f64).round_ties_even() as i64)
}

/// Population standard deviation, rounded half to even.
///
/// Computed as `sqrt(E[v^2] - mean^2)` with the already-rounded mean. That
/// rounding can push the variance below zero; it is clamped to zero.
pub fn std_dev(values: &[f64]) -> Result<i64, StatsError> {
    let m = mean(values)? as f64;
    let squares: f64 = values.iter().map(|v| v * v).sum();
    let variance = (squares / values.len() as f64 - m * m).max(0.0);
    Ok(variance.sqrt().round_ties_even() as i64)
}

/// Format seconds as `"{H}h {M}m"`, each field two columns wide.
///
/// Seconds are truncated to whole seconds, then floored to minutes and
/// hours, so negative values keep a positive minute remainder.
pub fn format_seconds(seconds: f64) -> String {
    let minutes = (seconds.trunc() as i64).div_euclid(60);
    let hours = minutes.div_euclid(60);
    format!("{:2}h {:2}m", hours, minutes.rem_euclid(60))
}
