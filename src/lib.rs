//! # landmark-bias
//!
//! Statistical analysis of facial landmark estimation errors across
//! demographic groups.
//!
//! This crate provides:
//! - **Error Indexing**: Normalized per-keypoint errors (NME) from paired
//!   annotation/estimation files, with systematic bias removal
//! - **Demographic Bucketing**: Errors split by age, sex, skin tone,
//!   occlusion, lighting and expression
//! - **Test Battery**: Shapiro-Wilk, Levene, one-way ANOVA with Tukey HSD
//!   post-hoc pairs, and Welch t-tests for binary factors
//! - **Reporting**: Colored terminal summaries of significant keypoints
//!
//! Errors are displacements between an annotated keypoint and its estimate,
//! normalized by the person's inter-ocular distance so faces of different
//! scales compare fairly. The population-wide median displacement per
//! keypoint is treated as systematic estimator bias and subtracted before
//! the scalar error is taken.
//!
//! ## Pipeline Overview
//!
//! 1. Load annotations, estimations and the optional exclusion list
//! 2. First pass: per-keypoint displacements over IOD, median bias per
//!    keypoint
//! 3. Second pass: bias-corrected scalar errors, filtered by minimum IOD
//!    and maximum NME, bucketed by keypoint and demographic group
//! 4. Per factor and keypoint: ANOVA across groups, Tukey HSD on the
//!    significant ones, Welch t-test for binary factors
//!
//! ## Quick Start
//!
//! ```rust
//! use landmark_bias::{
//!     Age, Estimation, ErrorIndex, Factor, FactorAnalysis, FilterConfig,
//!     Image, Keypoint, Person, Sex, Skintone, LEFT_EYE_OUTER, RIGHT_EYE_OUTER,
//! };
//!
//! // One annotated person with eye corners 100px apart and one probe point.
//! let annotation = Image {
//!     name: "a.png".into(),
//!     width: 640,
//!     height: 480,
//!     persons: vec![Person {
//!         id: 0,
//!         keypoints: vec![
//!             Keypoint::new(0.0, 0.0, LEFT_EYE_OUTER),
//!             Keypoint::new(100.0, 0.0, RIGHT_EYE_OUTER),
//!             Keypoint::new(50.0, 50.0, 20),
//!         ],
//!         skintone: Skintone::Type3,
//!         age: Age::Adult,
//!         sex: Sex::Female,
//!         occlusion: None,
//!         lighting: None,
//!         expression: None,
//!     }],
//! };
//! let estimation = Estimation {
//!     image_name: "a.png".into(),
//!     person_id: 0,
//!     keypoints: vec![
//!         Keypoint::new(0.0, 0.0, LEFT_EYE_OUTER),
//!         Keypoint::new(100.0, 0.0, RIGHT_EYE_OUTER),
//!         Keypoint::new(53.0, 54.0, 20),
//!     ],
//! };
//!
//! let filters = FilterConfig {
//!     min_iod: Some(50.0),
//!     max_nme: Some(1.0),
//!     remove_bias: false,
//! };
//! let index = ErrorIndex::build(&[annotation], &[estimation], &filters);
//! // displacement (3, 4) over IOD 100 -> NME 0.05
//! assert!((index.location_errors(20)[0] - 0.05).abs() < 1e-9);
//!
//! let analysis = FactorAnalysis::new(&index, Factor::Age);
//! let counts = analysis.n_samples(Some(20));
//! println!("samples per age group: {counts:?}");
//! ```
//!
//! On real datasets, [`ErrorIndex::load`] reads everything named by a JSON
//! [`Config`] file instead.

mod analysis;
mod config;
mod error;
mod factors;
mod loader;
pub mod locations;
mod report;
pub mod stats;
mod types;

pub use analysis::{FactorAnalysis, GroupMoments, PairwiseComparison};
pub use config::{Config, DataConfig, FilterConfig};
pub use error::{Error, Result};
pub use factors::{Age, Factor, GroupKey, Sex, Skintone};
pub use loader::{
    load_exclusions, parse_annotations, parse_estimations, ErrorIndex, KeypointId,
};
pub use locations::{keypoint_name, KEYPOINT_COUNT, LEFT_EYE_OUTER, RIGHT_EYE_OUTER};
pub use report::{descriptive_table, significance_report, ReportOptions};
pub use stats::{AnovaResult, Summary, TTestResult, TestResult};
pub use types::{Estimation, Image, Keypoint, Person};
