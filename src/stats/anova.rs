//! One-way ANOVA and Levene's variance-homogeneity test.

use statrs::distribution::{ContinuousCDF, FisherSnedecor};

use super::{mean, TestResult};
use crate::error::{Error, Result};

/// Result of a one-way ANOVA.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnovaResult {
    pub f_statistic: f64,
    pub p_value: f64,
    pub df_between: f64,
    pub df_within: f64,
    /// Mean square within groups, the pooled error variance used by the
    /// Tukey HSD post-hoc test.
    pub ms_within: f64,
}

/// One-way analysis of variance across two or more groups.
///
/// Empty groups are ignored; at least two non-empty groups and one residual
/// degree of freedom are required.
pub fn one_way_anova(groups: &[&[f64]]) -> Result<AnovaResult> {
    let groups: Vec<&[f64]> = groups.iter().copied().filter(|g| !g.is_empty()).collect();
    let k = groups.len();
    if k < 2 {
        return Err(Error::NotEnoughSamples { needed: 2, got: k });
    }
    let n_total: usize = groups.iter().map(|g| g.len()).sum();
    if n_total <= k {
        return Err(Error::NotEnoughSamples {
            needed: k + 1,
            got: n_total,
        });
    }

    let grand_mean = groups.iter().flat_map(|g| g.iter()).sum::<f64>() / n_total as f64;
    let mut ss_between = 0.0;
    let mut ss_within = 0.0;
    for group in &groups {
        let group_mean = mean(group);
        ss_between += group.len() as f64 * (group_mean - grand_mean).powi(2);
        ss_within += group.iter().map(|x| (x - group_mean).powi(2)).sum::<f64>();
    }

    let df_between = (k - 1) as f64;
    let df_within = (n_total - k) as f64;
    let ms_between = ss_between / df_between;
    let ms_within = ss_within / df_within;

    let (f_statistic, p_value) = if ms_within == 0.0 {
        if ms_between == 0.0 {
            (f64::NAN, f64::NAN)
        } else {
            (f64::INFINITY, 0.0)
        }
    } else {
        let f = ms_between / ms_within;
        (f, f_survival(f, df_between, df_within)?)
    };

    Ok(AnovaResult {
        f_statistic,
        p_value,
        df_between,
        df_within,
        ms_within,
    })
}

/// Levene's test for homogeneity of variances, median-centered
/// (the Brown-Forsythe variant).
///
/// The statistic is the one-way ANOVA F over the absolute deviations from
/// each group's median.
pub fn levene_test(groups: &[&[f64]]) -> Result<TestResult> {
    let groups: Vec<&[f64]> = groups.iter().copied().filter(|g| !g.is_empty()).collect();
    if groups.len() < 2 {
        return Err(Error::NotEnoughSamples {
            needed: 2,
            got: groups.len(),
        });
    }

    let deviations: Vec<Vec<f64>> = groups
        .iter()
        .map(|group| {
            let med = median(group);
            group.iter().map(|x| (x - med).abs()).collect()
        })
        .collect();
    let deviation_slices: Vec<&[f64]> = deviations.iter().map(Vec::as_slice).collect();

    let anova = one_way_anova(&deviation_slices)?;
    Ok(TestResult {
        statistic: anova.f_statistic,
        p_value: anova.p_value,
    })
}

fn median(samples: &[f64]) -> f64 {
    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

/// Upper-tail probability of the F distribution.
pub(crate) fn f_survival(f: f64, df1: f64, df2: f64) -> Result<f64> {
    let dist = FisherSnedecor::new(df1, df2)
        .map_err(|e| Error::Distribution(e.to_string()))?;
    Ok(1.0 - dist.cdf(f))
}
