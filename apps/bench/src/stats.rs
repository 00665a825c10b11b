//! Latency summary statistics.

use serde::Serialize;

/// min / mean / median / p95 / max / sample standard deviation, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatencyStats {
    pub min: f64,
    pub mean: f64,
    pub median: f64,
    pub p95: f64,
    pub max: f64,
    pub std_dev: f64,
}

impl LatencyStats {
    /// `None` for an empty sample set.
    ///
    /// p95 is the order statistic at index `floor(n * 0.95)` once n ≥ 5;
    /// below that there are too few samples and the max is reported instead.
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }

        let mut sorted = samples.to_vec();
        sorted.sort_by(f64::total_cmp);
        let n = sorted.len();

        let min = sorted[0];
        let max = sorted[n - 1];
        let mean = mean(&sorted)?;
        let median = if n % 2 == 1 {
            sorted[n / 2]
        } else {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        };
        let p95 = if n >= 5 {
            sorted[((n as f64 * 0.95) as usize).min(n - 1)]
        } else {
            max
        };
        let std_dev = if n > 1 {
            let var = sorted.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
            var.sqrt()
        } else {
            0.0
        };

        Some(Self {
            min,
            mean,
            median,
            p95,
            max,
            std_dev,
        })
    }
}

pub fn mean(samples: &[f64]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    Some(samples.iter().sum::<f64>() / samples.len() as f64)
}

/// Mean of integer counts (token usage).
pub fn mean_count(counts: &[u64]) -> Option<f64> {
    if counts.is_empty() {
        return None;
    }
    Some(counts.iter().sum::<u64>() as f64 / counts.len() as f64)
}
