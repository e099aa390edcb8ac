//! Welch's unequal-variance t-test for two groups.

use statrs::distribution::{ContinuousCDF, StudentsT};

use super::{mean, sample_variance};
use crate::error::{Error, Result};

/// Result of a Welch t-test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TTestResult {
    pub t_statistic: f64,
    /// Welch-Satterthwaite degrees of freedom.
    pub df: f64,
    /// Two-sided p-value.
    pub p_value: f64,
}

/// Two-sided Welch t-test; does not assume equal variances.
pub fn welch_t_test(a: &[f64], b: &[f64]) -> Result<TTestResult> {
    let smaller = a.len().min(b.len());
    if smaller < 2 {
        return Err(Error::NotEnoughSamples {
            needed: 2,
            got: smaller,
        });
    }

    let (na, nb) = (a.len() as f64, b.len() as f64);
    let (va, vb) = (sample_variance(a) / na, sample_variance(b) / nb);
    let se = (va + vb).sqrt();
    if se == 0.0 {
        return Err(Error::ConstantInput);
    }

    let t_statistic = (mean(a) - mean(b)) / se;
    let df = (va + vb).powi(2) / (va * va / (na - 1.0) + vb * vb / (nb - 1.0));

    let dist = StudentsT::new(0.0, 1.0, df).map_err(|e| Error::Distribution(e.to_string()))?;
    let p_value = 2.0 * (1.0 - dist.cdf(t_statistic.abs()));

    Ok(TTestResult {
        t_statistic,
        df,
        p_value,
    })
}
