//! Dataset loading and error indexing.
//!
//! This module turns paired annotation/estimation files into normalized error
//! buckets:
//!
//! 1. Load annotations and estimations, dropping excluded images.
//! 2. For every person with a usable inter-ocular distance, compute the
//!    per-keypoint displacement (dx, dy) scaled by that distance.
//! 3. Take the per-keypoint median displacement across the whole population
//!    as systematic bias and subtract it (unless disabled) before computing
//!    the scalar normalized error.
//! 4. Bucket errors by keypoint id and by demographic factor group, keeping
//!    an aggregate over all keypoints per group.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::Path;

use log::warn;
use serde::Deserialize;

use crate::config::{Config, FilterConfig};
use crate::error::{Error, Result};
use crate::factors::{Age, Factor, GroupKey, Sex, Skintone};
use crate::types::{Estimation, Image, Keypoint, Person};

pub type KeypointId = u32;

const EMPTY: &[f64] = &[];

#[derive(Debug, Deserialize)]
struct RawPoint {
    x: f64,
    y: f64,
}

#[derive(Debug, Deserialize)]
struct RawPerson {
    keypoints: BTreeMap<String, RawPoint>,
    #[serde(default)]
    skintone: Option<String>,
    #[serde(default)]
    age: Option<String>,
    #[serde(default)]
    sex: Option<String>,
    #[serde(default)]
    occlusion: Option<bool>,
    #[serde(default)]
    lighting: Option<bool>,
    #[serde(default)]
    expression: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct RawImage {
    width: u32,
    height: u32,
    persons: BTreeMap<String, RawPerson>,
}

fn read_input(path: &Path) -> Result<String> {
    if !path.is_file() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }
    Ok(fs::read_to_string(path)?)
}

/// Read the excluded-image list: one image name per line, blanks ignored.
pub fn load_exclusions<P: AsRef<Path>>(path: P) -> Result<HashSet<String>> {
    let contents = read_input(path.as_ref())?;
    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Parse the annotations JSON, skipping excluded images.
pub fn parse_annotations(contents: &str, excluded: &HashSet<String>) -> Result<Vec<Image>> {
    let raw: BTreeMap<String, RawImage> = serde_json::from_str(contents)?;
    let mut images = Vec::with_capacity(raw.len());
    for (name, raw_image) in raw {
        if excluded.contains(&name) {
            continue;
        }
        let mut persons = Vec::with_capacity(raw_image.persons.len());
        for (person_id, raw_person) in &raw_image.persons {
            let Ok(person_id) = person_id.parse::<u32>() else {
                warn!("Skipping person with non-numeric id {person_id:?} in image {name}");
                continue;
            };
            persons.push(Person {
                id: person_id,
                keypoints: parse_keypoints(&raw_person.keypoints, &name),
                skintone: raw_person
                    .skintone
                    .as_deref()
                    .map_or(Skintone::NotAvailable, Skintone::from_label),
                age: raw_person
                    .age
                    .as_deref()
                    .map_or(Age::NotAvailable, Age::from_label),
                sex: raw_person
                    .sex
                    .as_deref()
                    .map_or(Sex::NotAvailable, Sex::from_label),
                occlusion: raw_person.occlusion,
                lighting: raw_person.lighting,
                expression: raw_person.expression,
            });
        }
        images.push(Image {
            name,
            width: raw_image.width,
            height: raw_image.height,
            persons,
        });
    }
    Ok(images)
}

/// Parse the estimations JSON, skipping excluded images.
pub fn parse_estimations(contents: &str, excluded: &HashSet<String>) -> Result<Vec<Estimation>> {
    let raw: BTreeMap<String, BTreeMap<String, BTreeMap<String, RawPoint>>> =
        serde_json::from_str(contents)?;
    let mut estimations = Vec::new();
    for (image_name, persons) in raw {
        if excluded.contains(&image_name) {
            continue;
        }
        for (person_id, keypoints) in &persons {
            let Ok(person_id) = person_id.parse::<u32>() else {
                warn!("Skipping estimation with non-numeric id {person_id:?} in image {image_name}");
                continue;
            };
            estimations.push(Estimation {
                image_name: image_name.clone(),
                person_id,
                keypoints: parse_keypoints(keypoints, &image_name),
            });
        }
    }
    Ok(estimations)
}

fn parse_keypoints(raw: &BTreeMap<String, RawPoint>, image_name: &str) -> Vec<Keypoint> {
    let mut keypoints = Vec::with_capacity(raw.len());
    for (kp_id, point) in raw {
        match kp_id.parse::<u32>() {
            Ok(id) => keypoints.push(Keypoint::new(point.x, point.y, id)),
            Err(_) => warn!("Skipping keypoint with non-numeric id {kp_id:?} in image {image_name}"),
        }
    }
    keypoints
}

/// Error buckets for one demographic factor.
#[derive(Debug, Default)]
struct FactorBuckets {
    /// keypoint id -> group -> normalized errors
    per_keypoint: BTreeMap<KeypointId, BTreeMap<GroupKey, Vec<f64>>>,
    /// group -> normalized errors over every keypoint
    all: BTreeMap<GroupKey, Vec<f64>>,
}

impl FactorBuckets {
    fn push(&mut self, kp_id: KeypointId, group: GroupKey, nme: f64) {
        self.per_keypoint
            .entry(kp_id)
            .or_default()
            .entry(group)
            .or_default()
            .push(nme);
        self.all.entry(group).or_default().push(nme);
    }
}

/// Normalized errors indexed by keypoint and by demographic factor group.
#[derive(Debug)]
pub struct ErrorIndex {
    /// keypoint id -> normalized errors, no demographic split
    location: BTreeMap<KeypointId, Vec<f64>>,
    /// keypoint id -> median (dx, dy) across the whole population
    biases: BTreeMap<KeypointId, (f64, f64)>,
    factors: BTreeMap<Factor, FactorBuckets>,
}

impl ErrorIndex {
    /// Load everything named by the configuration and build the index.
    pub fn load(config: &Config) -> Result<Self> {
        let excluded = match &config.data.exclude_images_file {
            Some(path) => load_exclusions(path)?,
            None => HashSet::new(),
        };
        let annotations =
            parse_annotations(&read_input(&config.data.annotations_file)?, &excluded)?;
        let estimations =
            parse_estimations(&read_input(&config.data.estimations_file)?, &excluded)?;
        Ok(Self::build(&annotations, &estimations, &config.filters))
    }

    /// Build the index from already-loaded data.
    pub fn build(
        annotations: &[Image],
        estimations: &[Estimation],
        filters: &FilterConfig,
    ) -> Self {
        let estimated: HashMap<(&str, u32), &Estimation> = estimations
            .iter()
            .map(|est| ((est.image_name.as_str(), est.person_id), est))
            .collect();

        let displacements = collect_displacements(annotations, &estimated, filters);
        let biases: BTreeMap<KeypointId, (f64, f64)> = displacements
            .iter()
            .filter(|(_, d)| !d.is_empty())
            .map(|(&kp_id, d)| {
                let dx = median(d.iter().map(|(dx, _)| *dx));
                let dy = median(d.iter().map(|(_, dy)| *dy));
                (kp_id, (dx, dy))
            })
            .collect();

        let mut index = Self {
            location: BTreeMap::new(),
            biases,
            factors: Factor::all()
                .iter()
                .map(|&factor| (factor, FactorBuckets::default()))
                .collect(),
        };
        index.bucket_errors(annotations, &estimated, filters);
        index
    }

    fn bucket_errors(
        &mut self,
        annotations: &[Image],
        estimated: &HashMap<(&str, u32), &Estimation>,
        filters: &FilterConfig,
    ) {
        for image in annotations {
            for person in &image.persons {
                let Some(estimation) = estimated.get(&(image.name.as_str(), person.id)) else {
                    continue;
                };
                let Some(iod) = usable_iod(person, image, filters) else {
                    continue;
                };
                for keypoint in &person.keypoints {
                    let Some(estimate) = estimation.keypoint(keypoint.id) else {
                        continue;
                    };
                    let nme = if filters.remove_bias {
                        let (bias_x, bias_y) = self
                            .biases
                            .get(&keypoint.id)
                            .copied()
                            .unwrap_or((0.0, 0.0));
                        let dx = (estimate.x - keypoint.x) / iod - bias_x;
                        let dy = (estimate.y - keypoint.y) / iod - bias_y;
                        (dx * dx + dy * dy).sqrt()
                    } else {
                        keypoint.distance(estimate) / iod
                    };
                    if let Some(max_nme) = filters.max_nme {
                        if nme >= max_nme {
                            continue;
                        }
                    }
                    self.record(keypoint.id, person, nme);
                }
            }
        }
    }

    fn record(&mut self, kp_id: KeypointId, person: &Person, nme: f64) {
        self.location.entry(kp_id).or_default().push(nme);

        let mut push = |factor: Factor, group: GroupKey| {
            if let Some(buckets) = self.factors.get_mut(&factor) {
                buckets.push(kp_id, group, nme);
            }
        };
        if person.age != Age::NotAvailable {
            push(Factor::Age, GroupKey::Age(person.age));
        }
        if person.sex != Sex::NotAvailable {
            push(Factor::Sex, GroupKey::Sex(person.sex));
        }
        if person.skintone != Skintone::NotAvailable {
            push(Factor::Skintone, GroupKey::Skintone(person.skintone));
        }
        if let Some(occlusion) = person.occlusion {
            push(Factor::Occlusion, GroupKey::Flag(occlusion));
        }
        if let Some(lighting) = person.lighting {
            push(Factor::Lighting, GroupKey::Flag(lighting));
        }
        if let Some(expression) = person.expression {
            push(Factor::Expression, GroupKey::Flag(expression));
        }
    }

    /// Keypoint ids that collected at least one error sample, ascending.
    pub fn keypoint_ids(&self) -> Vec<KeypointId> {
        self.location
            .iter()
            .filter(|(_, errors)| !errors.is_empty())
            .map(|(&kp_id, _)| kp_id)
            .collect()
    }

    /// Normalized errors for one keypoint across the whole population.
    pub fn location_errors(&self, kp_id: KeypointId) -> &[f64] {
        self.location.get(&kp_id).map_or(EMPTY, Vec::as_slice)
    }

    /// Every normalized error in the index, flattened.
    pub fn all_errors(&self) -> Vec<f64> {
        self.location.values().flatten().copied().collect()
    }

    /// Errors for one group at one keypoint, or the aggregate over every
    /// keypoint when `kp_id` is `None`.
    pub fn group_errors(
        &self,
        factor: Factor,
        group: GroupKey,
        kp_id: Option<KeypointId>,
    ) -> &[f64] {
        let Some(buckets) = self.factors.get(&factor) else {
            return EMPTY;
        };
        let bucket = match kp_id {
            Some(kp_id) => buckets
                .per_keypoint
                .get(&kp_id)
                .and_then(|groups| groups.get(&group)),
            None => buckets.all.get(&group),
        };
        bucket.map_or(EMPTY, Vec::as_slice)
    }

    /// Aggregate errors for every group of a factor.
    pub fn all_group_errors(&self, factor: Factor) -> BTreeMap<GroupKey, &[f64]> {
        factor
            .groups()
            .into_iter()
            .map(|group| (group, self.group_errors(factor, group, None)))
            .collect()
    }

    /// Errors for one group, split by keypoint id.
    pub fn group_errors_by_keypoint(
        &self,
        factor: Factor,
        group: GroupKey,
    ) -> BTreeMap<KeypointId, &[f64]> {
        self.keypoint_ids()
            .into_iter()
            .map(|kp_id| (kp_id, self.group_errors(factor, group, Some(kp_id))))
            .collect()
    }

    /// Median (dx, dy) displacement for a keypoint, the systematic bias.
    pub fn bias(&self, kp_id: KeypointId) -> Option<(f64, f64)> {
        self.biases.get(&kp_id).copied()
    }
}

/// IOD of a person if it passes the filter, with a warning trail for every
/// person removed from the analysis.
fn usable_iod(person: &Person, image: &Image, filters: &FilterConfig) -> Option<f64> {
    let Some(iod) = person.iod() else {
        warn!(
            "Person {} removed from the analysis: missing eye corners in image {}",
            person.id, image.name
        );
        return None;
    };
    if let Some(min_iod) = filters.min_iod {
        if iod <= min_iod {
            warn!(
                "Person {} removed from the analysis: inter-ocular distance {:.1} below minimum in image {}",
                person.id, iod, image.name
            );
            return None;
        }
    }
    Some(iod)
}

fn collect_displacements(
    annotations: &[Image],
    estimated: &HashMap<(&str, u32), &Estimation>,
    filters: &FilterConfig,
) -> BTreeMap<KeypointId, Vec<(f64, f64)>> {
    let mut displacements: BTreeMap<KeypointId, Vec<(f64, f64)>> = BTreeMap::new();
    for image in annotations {
        for person in &image.persons {
            let Some(estimation) = estimated.get(&(image.name.as_str(), person.id)) else {
                warn!(
                    "Person {} not found in estimations for image {}",
                    person.id, image.name
                );
                continue;
            };
            let Some(iod) = usable_iod(person, image, filters) else {
                continue;
            };
            for keypoint in &person.keypoints {
                if let Some(estimate) = estimation.keypoint(keypoint.id) {
                    let dx = (estimate.x - keypoint.x) / iod;
                    let dy = (estimate.y - keypoint.y) / iod;
                    displacements.entry(keypoint.id).or_default().push((dx, dy));
                }
            }
        }
    }
    displacements
}

/// Median with the usual even-count midpoint average.
fn median(values: impl Iterator<Item = f64>) -> f64 {
    let mut sorted: Vec<f64> = values.collect();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let n = sorted.len();
    debug_assert!(n > 0);
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}
