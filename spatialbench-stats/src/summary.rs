//! Summary Statistics
//!
//! Mean, median, standard deviation (n-1), min, max, and sample count for a
//! set of timing samples in milliseconds.

/// Descriptive statistics for one backend's successful timings.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryStatistics {
    /// Arithmetic mean
    pub mean: f64,
    /// Median (midpoint average for even sample counts)
    pub median: f64,
    /// Sample standard deviation (n-1); 0.0 for fewer than two samples
    pub std_dev: f64,
    /// Smallest sample
    pub min: f64,
    /// Largest sample
    pub max: f64,
    /// Number of samples
    pub count: usize,
}

/// Compute summary statistics, or `None` for an empty sample set.
///
/// Returning `None` instead of NaN-filled statistics lets report generation
/// degrade a fully-failed backend to a null section rather than aborting.
pub fn compute_summary(samples: &[f64]) -> Option<SummaryStatistics> {
    if samples.is_empty() {
        return None;
    }

    let count = samples.len();
    let mean = samples.iter().sum::<f64>() / count as f64;

    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let median = if count % 2 == 0 {
        (sorted[count / 2 - 1] + sorted[count / 2]) / 2.0
    } else {
        sorted[count / 2]
    };

    let std_dev = if count < 2 {
        0.0
    } else {
        let variance =
            samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
        variance.sqrt()
    };

    Some(SummaryStatistics {
        mean,
        median,
        std_dev,
        min: sorted[0],
        max: sorted[count - 1],
        count,
    })
}
