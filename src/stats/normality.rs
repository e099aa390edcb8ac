//! Shapiro-Wilk normality test.
//!
//! Implements Royston's AS R94 approximation (Applied Statistics 44, 1995):
//! normal-quantile weights with polynomial corrections for the two outermost
//! order statistics, then a log-normalizing transform of W to obtain the
//! p-value. Valid for 3 <= n <= 5000.

use log::warn;
use statrs::distribution::{ContinuousCDF, Normal};

use super::TestResult;
use crate::error::{Error, Result};

/// Above this the Royston approximation is outside its validated range.
const MAX_SAMPLES: usize = 5000;

// Polynomial coefficients from AS R94, lowest order first.
const C1: [f64; 6] = [0.0, 0.221_157, -0.147_981, -2.071_190, 4.434_685, -2.706_056];
const C2: [f64; 6] = [0.0, 0.042_981, -0.293_762, -1.752_461, 5.682_633, -3.582_633];
const C3: [f64; 4] = [0.544, -0.399_78, 0.025_054, -6.714e-4];
const C4: [f64; 4] = [1.3822, -0.778_57, 0.062_767, -0.002_032_2];
const C5: [f64; 4] = [-1.5861, -0.310_82, -0.083_751, 0.003_891_5];
const C6: [f64; 3] = [-0.4803, -0.082_676, 0.003_030_2];
const G: [f64; 2] = [-2.273, 0.459];

/// asin(sqrt(3/4)), the n = 3 threshold angle.
const STQR: f64 = 1.047_197_551_196_597_7;
/// 6 / pi, the n = 3 scale.
const PI6: f64 = 1.909_859_317_102_744;

fn poly(coefficients: &[f64], x: f64) -> f64 {
    coefficients
        .iter()
        .rev()
        .fold(0.0, |acc, &c| acc * x + c)
}

/// Shapiro-Wilk test for departure from normality.
///
/// Returns the W statistic and its p-value; small p-values indicate the
/// samples are unlikely to come from a normal distribution.
pub fn shapiro_wilk(samples: &[f64]) -> Result<TestResult> {
    let n = samples.len();
    if n < 3 {
        return Err(Error::NotEnoughSamples { needed: 3, got: n });
    }
    if n > MAX_SAMPLES {
        warn!("Shapiro-Wilk p-value may be inaccurate for n = {n} > {MAX_SAMPLES}");
    }

    let mut x = samples.to_vec();
    x.sort_by(|a, b| a.total_cmp(b));
    let range = x[n - 1] - x[0];
    if range <= 0.0 {
        return Err(Error::ConstantInput);
    }

    let weights = half_weights(n);

    // W = (sum of weighted symmetric differences)^2 / total sum of squares.
    let mean = x.iter().sum::<f64>() / n as f64;
    let ssq: f64 = x.iter().map(|v| (v - mean) * (v - mean)).sum();
    let numerator: f64 = weights
        .iter()
        .enumerate()
        .map(|(i, w)| w * (x[n - 1 - i] - x[i]))
        .sum();
    let w = (numerator * numerator / ssq).min(1.0);

    Ok(TestResult {
        statistic: w,
        p_value: p_value(w, n),
    })
}

/// Weights for the upper half of the order statistics; the lower half mirrors
/// them with opposite sign.
fn half_weights(n: usize) -> Vec<f64> {
    let n2 = n / 2;
    if n == 3 {
        return vec![std::f64::consts::FRAC_1_SQRT_2];
    }

    let normal = Normal::standard();
    let an25 = n as f64 + 0.25;
    // Blom-style normal scores for the lower half, all negative.
    let m: Vec<f64> = (1..=n2)
        .map(|i| normal.inverse_cdf((i as f64 - 0.375) / an25))
        .collect();
    let summ2 = 2.0 * m.iter().map(|v| v * v).sum::<f64>();
    let ssumm2 = summ2.sqrt();
    let rsn = 1.0 / (n as f64).sqrt();

    let a1 = poly(&C1, rsn) - m[0] / ssumm2;
    let mut weights = vec![0.0; n2];
    weights[0] = a1;

    if n > 5 {
        let a2 = -m[1] / ssumm2 + poly(&C2, rsn);
        weights[1] = a2;
        let fac = ((summ2 - 2.0 * m[0] * m[0] - 2.0 * m[1] * m[1])
            / (1.0 - 2.0 * a1 * a1 - 2.0 * a2 * a2))
            .sqrt();
        for i in 2..n2 {
            weights[i] = -m[i] / fac;
        }
    } else {
        let fac = ((summ2 - 2.0 * m[0] * m[0]) / (1.0 - 2.0 * a1 * a1)).sqrt();
        for i in 1..n2 {
            weights[i] = -m[i] / fac;
        }
    }
    weights
}

fn p_value(w: f64, n: usize) -> f64 {
    if n == 3 {
        return (PI6 * (w.sqrt().asin() - STQR)).clamp(0.0, 1.0);
    }
    if w >= 1.0 {
        return 1.0;
    }

    let an = n as f64;
    let y = (1.0 - w).ln();
    let (z_mean, z_sd, y) = if n <= 11 {
        let gamma = poly(&G, an);
        if gamma <= y {
            // W too small for the transform to be defined; decisively non-normal.
            return 0.0;
        }
        (poly(&C3, an), poly(&C4, an).exp(), -(gamma - y).ln())
    } else {
        let log_n = an.ln();
        (poly(&C5, log_n), poly(&C6, log_n).exp(), y)
    };

    let normal = Normal::standard();
    1.0 - normal.cdf((y - z_mean) / z_sd)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Synthetic perfectly-normal sample: the Blom normal scores themselves.
    fn normal_scores(n: usize) -> Vec<f64> {
        let normal = Normal::standard();
        (1..=n)
            .map(|i| normal.inverse_cdf((i as f64 - 0.375) / (n as f64 + 0.25)))
            .collect()
    }

    #[test]
    fn normal_scores_pass() {
        for n in [10, 20, 50, 200] {
            let result = shapiro_wilk(&normal_scores(n)).unwrap();
            assert!(result.statistic > 0.98, "n={n} W={}", result.statistic);
            assert!(result.p_value > 0.5, "n={n} p={}", result.p_value);
        }
    }

    #[test]
    fn geometric_growth_fails() {
        let samples: Vec<f64> = (0..20).map(|i| 2f64.powi(i)).collect();
        let result = shapiro_wilk(&samples).unwrap();
        assert!(result.statistic < 0.6, "W={}", result.statistic);
        assert!(result.p_value < 1e-4, "p={}", result.p_value);
    }

    #[test]
    fn three_equispaced_points() {
        // For n = 3 and equispaced data, W = 1 and the arcsine formula gives 1.
        let result = shapiro_wilk(&[1.0, 2.0, 3.0]).unwrap();
        assert!((result.statistic - 1.0).abs() < 1e-9);
        assert!((result.p_value - 1.0).abs() < 1e-9);
    }

    #[test]
    fn rejects_degenerate_input() {
        assert!(matches!(
            shapiro_wilk(&[1.0, 2.0]),
            Err(Error::NotEnoughSamples { .. })
        ));
        assert!(matches!(
            shapiro_wilk(&[5.0; 10]),
            Err(Error::ConstantInput)
        ));
    }

    #[test]
    fn p_value_is_a_probability() {
        let samples: Vec<f64> = (0..40).map(|i| ((i * 37) % 17) as f64).collect();
        let result = shapiro_wilk(&samples).unwrap();
        assert!((0.0..=1.0).contains(&result.p_value));
        assert!((0.0..=1.0).contains(&result.statistic));
    }
}
