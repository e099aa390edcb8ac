//! Terminal rendering of analysis results.
//!
//! Significant keypoints print in red with their Tukey pairs in yellow;
//! non-significant keypoints print in green when requested. Pure consumer of
//! the analysis layer.

use std::fmt::Write as _;

use colored::Colorize;

use crate::analysis::FactorAnalysis;
use crate::error::Result;
use crate::loader::{ErrorIndex, KeypointId};
use crate::locations::keypoint_name;

/// What the significance report includes.
#[derive(Debug, Clone, Copy)]
pub struct ReportOptions {
    /// Also list keypoints whose ANOVA is not significant.
    pub show_all: bool,
    /// Print test prerequisites (normality, moments, variance, counts).
    pub prerequisites: bool,
    /// Significance threshold for ANOVA and post-hoc pairs.
    pub alpha: f64,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            show_all: true,
            prerequisites: false,
            alpha: 0.05,
        }
    }
}

/// Per-keypoint significance summary for one factor.
pub fn significance_report(
    index: &ErrorIndex,
    analysis: &FactorAnalysis,
    options: &ReportOptions,
) -> Result<String> {
    let mut out = String::new();
    for kp_id in index.keypoint_ids() {
        let anova = match analysis.one_way_anova(Some(kp_id)) {
            Ok(anova) => anova,
            // Fewer than two occupied groups at this keypoint.
            Err(_) => continue,
        };
        let significant = anova.p_value <= options.alpha;
        if !significant && !options.show_all {
            continue;
        }

        if options.prerequisites {
            write_prerequisites(&mut out, analysis, kp_id);
        }

        let line = format!(
            "ANOVA for keypoint {} ({})| F: {:.4} p: {:.6}",
            kp_id,
            keypoint_name(kp_id).unwrap_or("?"),
            anova.f_statistic,
            anova.p_value
        );
        if significant {
            let _ = writeln!(out, "\n{}", line.red());
            let mut tukey = String::from("Tukey:\n");
            for pair in analysis.tukey_post_hoc(Some(kp_id), options.alpha)? {
                if pair.p_value <= options.alpha {
                    let _ = writeln!(
                        tukey,
                        "{}->{} diff: {:.4} p: {:.4} reject: {}",
                        pair.group_a, pair.group_b, pair.mean_diff, pair.p_value, pair.reject
                    );
                }
            }
            let _ = writeln!(out, "{}", tukey.yellow());
        } else {
            let _ = writeln!(out, "{}", line.green());
        }
    }

    if analysis.factor().is_binary() {
        if let Ok(t) = analysis.welch_t_test(None) {
            let line = format!(
                "Welch t-test over all keypoints| t: {:.4} df: {:.1} p: {:.6}",
                t.t_statistic, t.df, t.p_value
            );
            let colored_line = if t.p_value <= options.alpha {
                line.red()
            } else {
                line.green()
            };
            let _ = writeln!(out, "\n{colored_line}");
        }
    }
    Ok(out)
}

fn write_prerequisites(out: &mut String, analysis: &FactorAnalysis, kp_id: KeypointId) {
    let _ = writeln!(out, "Prerequisites for keypoint {kp_id}:");

    let counts = analysis.n_samples(Some(kp_id));
    let _ = write!(out, "  n:");
    for (group, n) in &counts {
        let _ = write!(out, " {group}: {n}");
    }
    let _ = writeln!(out);

    for (group, result) in analysis.shapiro_wilk(Some(kp_id)) {
        match result {
            Ok(test) => {
                let _ = writeln!(
                    out,
                    "  Shapiro-Wilk {group}: W: {:.4} p: {:.6}",
                    test.statistic, test.p_value
                );
            }
            Err(e) => {
                let _ = writeln!(out, "  Shapiro-Wilk {group}: {e}");
            }
        }
    }

    for (group, moments) in analysis.moments(Some(kp_id)) {
        let _ = writeln!(
            out,
            "  {group}: skew: {:.4} kurtosis: {:.4}",
            moments.skew, moments.kurtosis
        );
    }

    match analysis.levene(Some(kp_id)) {
        Ok(test) => {
            let _ = writeln!(
                out,
                "  Levene: W: {:.4} p: {:.6}",
                test.statistic, test.p_value
            );
        }
        Err(e) => {
            let _ = writeln!(out, "  Levene: {e}");
        }
    }
}

/// Descriptive per-group table over the aggregate of all keypoints, the
/// textual counterpart of the box plot.
pub fn descriptive_table(analysis: &FactorAnalysis) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} distributions (normalized error)",
        analysis.factor()
    );
    let _ = writeln!(
        out,
        "{:<14} {:>8} {:>9} {:>9} {:>9} {:>9} {:>9} {:>9} {:>9}",
        "group", "n", "mean", "min", "q1", "median", "q3", "max", "iqr"
    );
    for (group, s) in analysis.summaries(None) {
        let _ = writeln!(
            out,
            "{:<14} {:>8} {:>9.4} {:>9.4} {:>9.4} {:>9.4} {:>9.4} {:>9.4} {:>9.4}",
            group.label(),
            s.n,
            s.mean,
            s.min,
            s.q1,
            s.median,
            s.q3,
            s.max,
            s.iqr()
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FilterConfig;
    use crate::factors::{Age, Factor, Sex, Skintone};
    use crate::locations::{LEFT_EYE_OUTER, RIGHT_EYE_OUTER};
    use crate::types::{Estimation, Image, Keypoint, Person};

    fn build_index() -> ErrorIndex {
        let mut annotations = Vec::new();
        let mut estimations = Vec::new();
        for i in 0..10u32 {
            let name = format!("img{i}.png");
            let age = if i % 2 == 0 { Age::Child } else { Age::Senior };
            let offset = if i % 2 == 0 { 5.0 } else { 40.0 } + (i % 3) as f64;
            let keypoints = |probe_x: f64| {
                vec![
                    Keypoint::new(0.0, 0.0, LEFT_EYE_OUTER),
                    Keypoint::new(100.0, 0.0, RIGHT_EYE_OUTER),
                    Keypoint::new(probe_x, 50.0, 18),
                ]
            };
            annotations.push(Image {
                name: name.clone(),
                width: 640,
                height: 480,
                persons: vec![Person {
                    id: 0,
                    keypoints: keypoints(50.0),
                    skintone: Skintone::NotAvailable,
                    age,
                    sex: Sex::NotAvailable,
                    occlusion: Some(i % 2 == 0),
                    lighting: None,
                    expression: None,
                }],
            });
            estimations.push(Estimation {
                image_name: name,
                person_id: 0,
                keypoints: keypoints(50.0 + offset),
            });
        }
        let filters = FilterConfig {
            min_iod: None,
            max_nme: None,
            remove_bias: false,
        };
        ErrorIndex::build(&annotations, &estimations, &filters)
    }

    #[test]
    fn report_names_significant_keypoints() {
        colored::control::set_override(false);
        let index = build_index();
        let analysis = FactorAnalysis::new(&index, Factor::Age);
        let options = ReportOptions {
            show_all: false,
            prerequisites: false,
            alpha: 0.05,
        };
        let report = significance_report(&index, &analysis, &options).unwrap();
        assert!(report.contains("keypoint 18 (chin)"), "{report}");
        assert!(report.contains("Tukey:"));
        assert!(report.contains("Seniors->Children"));
    }

    #[test]
    fn report_includes_prerequisites_when_asked() {
        colored::control::set_override(false);
        let index = build_index();
        let analysis = FactorAnalysis::new(&index, Factor::Age);
        let options = ReportOptions {
            show_all: true,
            prerequisites: true,
            alpha: 0.05,
        };
        let report = significance_report(&index, &analysis, &options).unwrap();
        assert!(report.contains("Prerequisites for keypoint"));
        assert!(report.contains("Levene:"));
        assert!(report.contains("skew:"));
    }

    #[test]
    fn binary_factor_gets_a_t_test_line() {
        colored::control::set_override(false);
        let index = build_index();
        let analysis = FactorAnalysis::new(&index, Factor::Occlusion);
        let report =
            significance_report(&index, &analysis, &ReportOptions::default()).unwrap();
        assert!(report.contains("Welch t-test"), "{report}");
    }

    #[test]
    fn descriptive_table_lists_groups() {
        let index = build_index();
        let analysis = FactorAnalysis::new(&index, Factor::Age);
        let table = descriptive_table(&analysis);
        assert!(table.contains("Children"));
        assert!(table.contains("Seniors"));
        assert!(table.contains("median"));
        assert!(table.contains("iqr"));
    }
}
