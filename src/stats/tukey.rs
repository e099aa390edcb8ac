//! Tukey HSD post-hoc pairwise comparison.
//!
//! P-values come from the studentized range distribution, evaluated by
//! numerical quadrature: the range-of-normals integral for the infinite
//! degrees-of-freedom case, with an outer integral over the scaled chi
//! density for finite degrees of freedom. Unequal group sizes use the
//! Tukey-Kramer standard error.

use statrs::distribution::{Continuous, ContinuousCDF, Normal};
use statrs::function::gamma::ln_gamma;

use super::anova::one_way_anova;
use super::mean;
use crate::error::Result;

/// One pairwise comparison from a Tukey HSD run.
///
/// `a` and `b` index into the group slice passed to [`tukey_hsd`];
/// `mean_diff` is mean(b) - mean(a).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TukeyPair {
    pub a: usize,
    pub b: usize,
    pub mean_diff: f64,
    pub p_value: f64,
    pub reject: bool,
}

/// Tukey's honestly-significant-difference test over every pair of groups.
///
/// Empty groups are skipped; the remaining groups keep their original
/// indices in the returned pairs.
pub fn tukey_hsd(groups: &[&[f64]], alpha: f64) -> Result<Vec<TukeyPair>> {
    let occupied: Vec<(usize, &[f64])> = groups
        .iter()
        .enumerate()
        .filter(|(_, g)| !g.is_empty())
        .map(|(i, g)| (i, *g))
        .collect();

    let slices: Vec<&[f64]> = occupied.iter().map(|(_, g)| *g).collect();
    let anova = one_way_anova(&slices)?;
    let k = occupied.len();

    let mut pairs = Vec::with_capacity(k * (k - 1) / 2);
    for i in 0..k {
        for j in (i + 1)..k {
            let (idx_a, group_a) = occupied[i];
            let (idx_b, group_b) = occupied[j];
            let mean_diff = mean(group_b) - mean(group_a);
            let se = (anova.ms_within / 2.0
                * (1.0 / group_a.len() as f64 + 1.0 / group_b.len() as f64))
                .sqrt();
            let q = if se > 0.0 {
                mean_diff.abs() / se
            } else if mean_diff == 0.0 {
                0.0
            } else {
                f64::INFINITY
            };
            let p_value = 1.0 - studentized_range_cdf(q, k, anova.df_within);
            pairs.push(TukeyPair {
                a: idx_a,
                b: idx_b,
                mean_diff,
                p_value,
                reject: p_value < alpha,
            });
        }
    }
    Ok(pairs)
}

/// CDF of the studentized range distribution with `groups` samples and `df`
/// error degrees of freedom.
pub fn studentized_range_cdf(q: f64, groups: usize, df: f64) -> f64 {
    if q <= 0.0 {
        return 0.0;
    }
    if !q.is_finite() {
        return 1.0;
    }
    // Above a few thousand degrees of freedom the scaled chi density is a
    // spike at 1 and the plain range-of-normals integral is exact to well
    // below quadrature precision.
    if df > 5000.0 {
        return normal_range_cdf(q, groups);
    }

    // Integrate P(range <= q * u) against the density of u = chi_df / sqrt(df).
    let sd = (1.0 / (2.0 * df)).sqrt();
    let lo = (1.0 - 10.0 * sd).max(0.0);
    let hi = 1.0 + 10.0 * sd;
    let ln_norm = std::f64::consts::LN_2 + 0.5 * df * (df.ln() - std::f64::consts::LN_2)
        - ln_gamma(df / 2.0);
    let integrand = |u: f64| {
        if u <= 0.0 {
            return 0.0;
        }
        let ln_pdf = ln_norm + (df - 1.0) * u.ln() - df * u * u / 2.0;
        ln_pdf.exp() * normal_range_cdf(q * u, groups)
    };
    simpson(integrand, lo, hi, 400).clamp(0.0, 1.0)
}

/// CDF of the range of `k` independent standard normals.
fn normal_range_cdf(q: f64, k: usize) -> f64 {
    if q <= 0.0 {
        return 0.0;
    }
    let normal = Normal::standard();
    let integrand = |z: f64| {
        // z is the maximum; the other k - 1 values lie within [z - q, z].
        normal.pdf(z) * (normal.cdf(z) - normal.cdf(z - q)).powi(k as i32 - 1)
    };
    (k as f64 * simpson(integrand, -8.0, 8.0, 512)).clamp(0.0, 1.0)
}

/// Composite Simpson's rule with `n` intervals (rounded up to even).
fn simpson<F: Fn(f64) -> f64>(f: F, a: f64, b: f64, n: usize) -> f64 {
    let n = if n % 2 == 0 { n } else { n + 1 };
    let h = (b - a) / n as f64;
    let mut sum = f(a) + f(b);
    for i in 1..n {
        let weight = if i % 2 == 1 { 4.0 } else { 2.0 };
        sum += weight * f(a + i as f64 * h);
    }
    sum * h / 3.0
}
