//! Group-comparison statistics over normalized error samples.
//!
//! This module provides the statistical toolkit the analysis layer runs per
//! keypoint: descriptive moments and quartile summaries, Shapiro-Wilk
//! normality, Levene variance homogeneity, one-way ANOVA with Tukey HSD
//! post-hoc pairs, and Welch two-group t-tests.
//!
//! All p-values are two-sided where that applies, and every test follows the
//! conventional textbook definitions so results line up with the common
//! statistics packages.

mod anova;
mod descriptive;
mod normality;
mod ttest;
mod tukey;

pub use anova::{levene_test, one_way_anova, AnovaResult};
pub use descriptive::{kurtosis, quantile, skewness, Summary};
pub use normality::shapiro_wilk;
pub use ttest::{welch_t_test, TTestResult};
pub use tukey::{studentized_range_cdf, tukey_hsd, TukeyPair};

/// A test statistic together with its p-value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TestResult {
    pub statistic: f64,
    pub p_value: f64,
}

pub(crate) fn mean(samples: &[f64]) -> f64 {
    samples.iter().sum::<f64>() / samples.len() as f64
}

/// Unbiased sample variance (n - 1 denominator).
pub(crate) fn sample_variance(samples: &[f64]) -> f64 {
    let m = mean(samples);
    samples.iter().map(|x| (x - m) * (x - m)).sum::<f64>() / (samples.len() as f64 - 1.0)
}
