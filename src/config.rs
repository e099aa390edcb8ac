use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Analysis configuration, read from a JSON file.
///
/// ```json
/// {
///   "data": {
///     "annotations_file": "annotations.json",
///     "estimations_file": "estimations.json",
///     "exclude_images_file": "missing_images.txt"
///   },
///   "filters": { "min_iod": 50.0, "max_nme": 1.0, "remove_bias": true }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub data: DataConfig,
    #[serde(default)]
    pub filters: FilterConfig,
}

/// Input file locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Ground-truth annotations (JSON, keyed by image name).
    pub annotations_file: PathBuf,
    /// Detector estimations (JSON, keyed by image name and person id).
    pub estimations_file: PathBuf,
    /// Optional plain-text list of image names to drop, one per line.
    #[serde(default)]
    pub exclude_images_file: Option<PathBuf>,
}

/// Sample filters applied while indexing errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Persons with an inter-ocular distance at or below this are dropped.
    /// `None` disables the filter.
    #[serde(default = "default_min_iod")]
    pub min_iod: Option<f64>,

    /// Samples with a normalized error at or above this are dropped.
    /// `None` disables the filter.
    #[serde(default = "default_max_nme")]
    pub max_nme: Option<f64>,

    /// Subtract the per-keypoint median displacement before computing the
    /// scalar error.
    #[serde(default = "default_true")]
    pub remove_bias: bool,
}

fn default_min_iod() -> Option<f64> {
    Some(50.0)
}

fn default_max_nme() -> Option<f64> {
    Some(1.0)
}

fn default_true() -> bool {
    true
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            min_iod: default_min_iod(),
            max_nme: default_max_nme(),
            remove_bias: default_true(),
        }
    }
}

impl Config {
    /// Read and parse a configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        let contents = fs::read_to_string(path)?;
        let config = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Configuration for the given input files with default filters.
    pub fn new<P: Into<PathBuf>>(annotations_file: P, estimations_file: P) -> Self {
        Self {
            data: DataConfig {
                annotations_file: annotations_file.into(),
                estimations_file: estimations_file.into(),
                exclude_images_file: None,
            },
            filters: FilterConfig::default(),
        }
    }
}
