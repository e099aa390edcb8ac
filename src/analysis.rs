//! Per-factor statistical analysis over an error index.
//!
//! `FactorAnalysis` binds one demographic factor to the bucketed errors and
//! exposes the test battery the comparison scripts run per keypoint:
//! prerequisites (sample counts, moments, Shapiro-Wilk, Levene), one-way
//! ANOVA with Tukey HSD post-hoc pairs, and Welch t-tests for binary
//! factors.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::factors::{Factor, GroupKey};
use crate::loader::{ErrorIndex, KeypointId};
use crate::stats::{
    self, AnovaResult, Summary, TTestResult, TestResult, TukeyPair,
};

/// Skew and excess kurtosis of one group's error distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GroupMoments {
    pub skew: f64,
    pub kurtosis: f64,
}

/// One Tukey HSD pair, labeled with the groups it compares.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairwiseComparison {
    pub group_a: GroupKey,
    pub group_b: GroupKey,
    /// mean(group_b) - mean(group_a)
    pub mean_diff: f64,
    pub p_value: f64,
    pub reject: bool,
}

/// Statistical comparison of error distributions across the groups of one
/// demographic factor.
///
/// Every method takes `kp_id: Option<KeypointId>`: `Some` restricts the
/// comparison to one keypoint, `None` uses the aggregate over all keypoints.
pub struct FactorAnalysis<'a> {
    index: &'a ErrorIndex,
    factor: Factor,
}

impl<'a> FactorAnalysis<'a> {
    pub fn new(index: &'a ErrorIndex, factor: Factor) -> Self {
        Self { index, factor }
    }

    pub fn factor(&self) -> Factor {
        self.factor
    }

    /// Sample count per group, including empty groups.
    pub fn n_samples(&self, kp_id: Option<KeypointId>) -> BTreeMap<GroupKey, usize> {
        self.factor
            .groups()
            .into_iter()
            .map(|group| {
                (
                    group,
                    self.index.group_errors(self.factor, group, kp_id).len(),
                )
            })
            .collect()
    }

    /// Skew and kurtosis per non-empty group.
    pub fn moments(&self, kp_id: Option<KeypointId>) -> BTreeMap<GroupKey, GroupMoments> {
        self.occupied_groups(kp_id)
            .into_iter()
            .map(|(group, errors)| {
                (
                    group,
                    GroupMoments {
                        skew: stats::skewness(errors),
                        kurtosis: stats::kurtosis(errors),
                    },
                )
            })
            .collect()
    }

    /// Shapiro-Wilk normality test per non-empty group.
    pub fn shapiro_wilk(&self, kp_id: Option<KeypointId>) -> BTreeMap<GroupKey, Result<TestResult>> {
        self.occupied_groups(kp_id)
            .into_iter()
            .map(|(group, errors)| (group, stats::shapiro_wilk(errors)))
            .collect()
    }

    /// Levene (Brown-Forsythe) variance homogeneity across the groups.
    pub fn levene(&self, kp_id: Option<KeypointId>) -> Result<TestResult> {
        let groups = self.group_slices(kp_id);
        stats::levene_test(&groups)
    }

    /// One-way ANOVA across the groups.
    pub fn one_way_anova(&self, kp_id: Option<KeypointId>) -> Result<AnovaResult> {
        let groups = self.group_slices(kp_id);
        stats::one_way_anova(&groups)
    }

    /// Tukey HSD post-hoc comparison of every group pair.
    pub fn tukey_post_hoc(
        &self,
        kp_id: Option<KeypointId>,
        alpha: f64,
    ) -> Result<Vec<PairwiseComparison>> {
        let keys = self.factor.groups();
        let groups = self.group_slices(kp_id);
        let pairs = stats::tukey_hsd(&groups, alpha)?;
        Ok(pairs
            .into_iter()
            .map(|TukeyPair { a, b, mean_diff, p_value, reject }| PairwiseComparison {
                group_a: keys[a],
                group_b: keys[b],
                mean_diff,
                p_value,
                reject,
            })
            .collect())
    }

    /// Welch t-test between the two groups of a binary factor.
    pub fn welch_t_test(&self, kp_id: Option<KeypointId>) -> Result<TTestResult> {
        if !self.factor.is_binary() {
            return Err(Error::NotBinary(self.factor.to_string()));
        }
        let keys = self.factor.groups();
        let a = self.index.group_errors(self.factor, keys[0], kp_id);
        let b = self.index.group_errors(self.factor, keys[1], kp_id);
        stats::welch_t_test(a, b)
    }

    /// Box-plot style summary per non-empty group.
    pub fn summaries(&self, kp_id: Option<KeypointId>) -> BTreeMap<GroupKey, Summary> {
        self.occupied_groups(kp_id)
            .into_iter()
            .filter_map(|(group, errors)| Summary::from_samples(errors).map(|s| (group, s)))
            .collect()
    }

    /// Group slices in factor order, empty groups included so indices stay
    /// aligned with `Factor::groups()`.
    fn group_slices(&self, kp_id: Option<KeypointId>) -> Vec<&'a [f64]> {
        self.factor
            .groups()
            .into_iter()
            .map(|group| self.index.group_errors(self.factor, group, kp_id))
            .collect()
    }

    fn occupied_groups(&self, kp_id: Option<KeypointId>) -> Vec<(GroupKey, &'a [f64])> {
        self.factor
            .groups()
            .into_iter()
            .map(|group| (group, self.index.group_errors(self.factor, group, kp_id)))
            .filter(|(_, errors)| !errors.is_empty())
            .collect()
    }
}
