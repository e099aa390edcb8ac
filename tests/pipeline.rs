//! End-to-end pipeline test: JSON files on disk through config loading,
//! error indexing and the statistical comparison.

use std::fs;
use std::path::PathBuf;

use landmark_bias::{
    Age, Config, ErrorIndex, Factor, FactorAnalysis, GroupKey, LEFT_EYE_OUTER, RIGHT_EYE_OUTER,
};
use serde_json::{json, Value};

struct TempDataset {
    dir: PathBuf,
}

impl TempDataset {
    /// Writes annotation, estimation, exclusion and config files under a
    /// fresh temp directory.
    fn create(name: &str) -> Self {
        let dir = std::env::temp_dir().join(format!("landmark-bias-{name}-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();

        let mut annotations = serde_json::Map::new();
        let mut estimations = serde_json::Map::new();

        // Eight children with small errors, eight seniors with large ones,
        // probe keypoint 20, eye corners 100px apart and estimated exactly.
        for i in 0..16u32 {
            let image = format!("img{i}.png");
            let (age, occluded, offset) = if i % 2 == 0 {
                ("Child", false, 5.0 + (i % 8) as f64 / 2.0)
            } else {
                ("Senior", true, 40.0 + (i % 8) as f64 / 2.0)
            };
            annotations.insert(
                image.clone(),
                json!({
                    "width": 640,
                    "height": 480,
                    "persons": {
                        "0": {
                            "keypoints": {
                                "7": {"x": 0.0, "y": 0.0},
                                "11": {"x": 100.0, "y": 0.0},
                                "20": {"x": 50.0, "y": 50.0}
                            },
                            "age": age,
                            "sex": "female",
                            "skintone": "3",
                            "occlusion": occluded
                        }
                    }
                }),
            );
            estimations.insert(
                image,
                json!({
                    "0": {
                        "7": {"x": 0.0, "y": 0.0},
                        "11": {"x": 100.0, "y": 0.0},
                        "20": {"x": 50.0 + offset, "y": 50.0}
                    }
                }),
            );
        }

        // An excluded image with a wild error that must never be indexed.
        annotations.insert(
            "skip.png".into(),
            json!({
                "width": 640,
                "height": 480,
                "persons": {
                    "0": {
                        "keypoints": {
                            "7": {"x": 0.0, "y": 0.0},
                            "11": {"x": 100.0, "y": 0.0},
                            "20": {"x": 50.0, "y": 50.0}
                        },
                        "age": "Child"
                    }
                }
            }),
        );
        estimations.insert(
            "skip.png".into(),
            json!({
                "0": {"20": {"x": 5000.0, "y": 5000.0}}
            }),
        );

        let write_json = |file: &str, value: &Value| {
            fs::write(dir.join(file), serde_json::to_string_pretty(value).unwrap()).unwrap();
        };
        write_json("annotations.json", &Value::Object(annotations));
        write_json("estimations.json", &Value::Object(estimations));
        fs::write(dir.join("excluded.txt"), "skip.png\n").unwrap();

        let config = json!({
            "data": {
                "annotations_file": dir.join("annotations.json"),
                "estimations_file": dir.join("estimations.json"),
                "exclude_images_file": dir.join("excluded.txt")
            },
            "filters": {
                "min_iod": 50.0,
                "max_nme": 1.0,
                "remove_bias": false
            }
        });
        write_json("analysis.json", &config);

        Self { dir }
    }

    fn config(&self) -> Config {
        Config::from_file(self.dir.join("analysis.json")).unwrap()
    }
}

impl Drop for TempDataset {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.dir);
    }
}

#[test]
fn files_to_significant_age_difference() {
    let dataset = TempDataset::create("age");
    let index = ErrorIndex::load(&dataset.config()).unwrap();

    // The excluded image contributes nothing; 16 persons remain.
    assert_eq!(index.location_errors(20).len(), 16);
    assert_eq!(index.keypoint_ids(), vec![LEFT_EYE_OUTER, RIGHT_EYE_OUTER, 20]);

    let analysis = FactorAnalysis::new(&index, Factor::Age);
    let counts = analysis.n_samples(Some(20));
    assert_eq!(counts[&GroupKey::Age(Age::Child)], 8);
    assert_eq!(counts[&GroupKey::Age(Age::Senior)], 8);
    assert_eq!(counts[&GroupKey::Age(Age::Adult)], 0);

    let anova = analysis.one_way_anova(Some(20)).unwrap();
    assert!(anova.p_value < 1e-8, "p={}", anova.p_value);

    let pairs = analysis.tukey_post_hoc(Some(20), 0.05).unwrap();
    assert_eq!(pairs.len(), 1);
    assert!(pairs[0].reject);
    assert_eq!(pairs[0].group_a, GroupKey::Age(Age::Senior));
    assert_eq!(pairs[0].group_b, GroupKey::Age(Age::Child));
}

#[test]
fn binary_factor_t_test_over_aggregate() {
    let dataset = TempDataset::create("occlusion");
    let index = ErrorIndex::load(&dataset.config()).unwrap();

    let analysis = FactorAnalysis::new(&index, Factor::Occlusion);
    let result = analysis.welch_t_test(Some(20)).unwrap();
    // Occluded persons are the seniors with the large errors.
    assert!(result.p_value < 1e-8, "p={}", result.p_value);
    assert!(result.t_statistic > 0.0);

    // Aggregate pools the exact eye-corner matches too.
    let aggregate = analysis.n_samples(None);
    assert_eq!(aggregate[&GroupKey::Flag(true)], 24);
    assert_eq!(aggregate[&GroupKey::Flag(false)], 24);
}

#[test]
fn median_bias_is_reported() {
    let dataset = TempDataset::create("bias");
    let index = ErrorIndex::load(&dataset.config()).unwrap();

    // Offsets are 5.0..8.0 (children) and 40.5..43.5 (seniors) over IOD 100;
    // the population median dx falls between the two clusters.
    let (bias_x, bias_y) = index.bias(20).unwrap();
    assert!(bias_x > 0.08 && bias_x < 0.40, "bias_x={bias_x}");
    assert!(bias_y.abs() < 1e-9);
    assert_eq!(index.bias(LEFT_EYE_OUTER), Some((0.0, 0.0)));
}
