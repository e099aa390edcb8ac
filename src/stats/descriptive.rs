//! Descriptive statistics: moments and quartile summaries.

use serde::Serialize;

use super::mean;

/// Biased Fisher-Pearson skewness, `m3 / m2^(3/2)`.
///
/// Returns NaN for an empty bucket or zero variance.
pub fn skewness(samples: &[f64]) -> f64 {
    let Some((m2, m3, _)) = central_moments(samples) else {
        return f64::NAN;
    };
    if m2 == 0.0 {
        return f64::NAN;
    }
    m3 / m2.powf(1.5)
}

/// Biased excess kurtosis, `m4 / m2^2 - 3`.
pub fn kurtosis(samples: &[f64]) -> f64 {
    let Some((m2, _, m4)) = central_moments(samples) else {
        return f64::NAN;
    };
    if m2 == 0.0 {
        return f64::NAN;
    }
    m4 / (m2 * m2) - 3.0
}

/// Second, third and fourth central moments with the biased 1/n denominator.
fn central_moments(samples: &[f64]) -> Option<(f64, f64, f64)> {
    if samples.is_empty() {
        return None;
    }
    let n = samples.len() as f64;
    let m = mean(samples);
    let (mut m2, mut m3, mut m4) = (0.0, 0.0, 0.0);
    for &x in samples {
        let d = x - m;
        let d2 = d * d;
        m2 += d2;
        m3 += d2 * d;
        m4 += d2 * d2;
    }
    Some((m2 / n, m3 / n, m4 / n))
}

/// Linear-interpolation quantile of a sorted slice, `p` in [0, 1].
pub fn quantile(sorted: &[f64], p: f64) -> f64 {
    debug_assert!(!sorted.is_empty());
    debug_assert!((0.0..=1.0).contains(&p));
    let pos = p * (sorted.len() as f64 - 1.0);
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    if lower == upper {
        sorted[lower]
    } else {
        let frac = pos - lower as f64;
        sorted[lower] * (1.0 - frac) + sorted[upper] * frac
    }
}

/// Five-number style summary of one error bucket, the data a box plot shows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub n: usize,
    pub mean: f64,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

impl Summary {
    /// Summarize a bucket; `None` when it is empty.
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        let mut sorted = samples.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));
        Some(Self {
            n: sorted.len(),
            mean: mean(&sorted),
            min: sorted[0],
            q1: quantile(&sorted, 0.25),
            median: quantile(&sorted, 0.5),
            q3: quantile(&sorted, 0.75),
            max: sorted[sorted.len() - 1],
        })
    }

    /// Interquartile range.
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symmetric_data_has_zero_skew() {
        let samples = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert!(skewness(&samples).abs() < 1e-12);
    }

    #[test]
    fn right_tail_skews_positive() {
        let samples = [1.0, 1.0, 1.0, 1.0, 10.0];
        assert!(skewness(&samples) > 1.0);
    }

    #[test]
    fn uniform_like_kurtosis_is_negative() {
        // Flat data is platykurtic: excess kurtosis below zero.
        let samples: Vec<f64> = (0..100).map(f64::from).collect();
        let k = kurtosis(&samples);
        assert!(k < -1.0 && k > -1.3, "got {k}");
    }

    #[test]
    fn constant_input_moments_are_nan() {
        let samples = [2.0, 2.0, 2.0];
        assert!(skewness(&samples).is_nan());
        assert!(kurtosis(&samples).is_nan());
        assert!(skewness(&[]).is_nan());
    }

    #[test]
    fn quantiles_interpolate_linearly() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert!((quantile(&sorted, 0.5) - 2.5).abs() < 1e-12);
        assert!((quantile(&sorted, 0.25) - 1.75).abs() < 1e-12);
        assert!((quantile(&sorted, 0.0) - 1.0).abs() < 1e-12);
        assert!((quantile(&sorted, 1.0) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn summary_of_bucket() {
        let summary = Summary::from_samples(&[5.0, 1.0, 3.0, 2.0, 4.0]).unwrap();
        assert_eq!(summary.n, 5);
        assert!((summary.mean - 3.0).abs() < 1e-12);
        assert!((summary.median - 3.0).abs() < 1e-12);
        assert!((summary.q1 - 2.0).abs() < 1e-12);
        assert!((summary.q3 - 4.0).abs() < 1e-12);
        assert!((summary.iqr() - 2.0).abs() < 1e-12);
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.max, 5.0);
        assert!(Summary::from_samples(&[]).is_none());
    }
}
