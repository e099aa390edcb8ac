use serde::{Deserialize, Serialize};

use crate::factors::{Age, Sex, Skintone};
use crate::locations::{LEFT_EYE_OUTER, RIGHT_EYE_OUTER};

/// A single annotated facial landmark.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    pub x: f64,
    pub y: f64,
    pub id: u32,
}

impl Keypoint {
    pub const fn new(x: f64, y: f64, id: u32) -> Self {
        Self { x, y, id }
    }

    /// Euclidean distance to another keypoint.
    pub fn distance(&self, other: &Keypoint) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// One annotated person within an image: keypoints plus demographic labels.
///
/// The occlusion/lighting/expression flags are optional because not every
/// source dataset in the composite set provides them.
#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    pub id: u32,
    pub keypoints: Vec<Keypoint>,
    pub skintone: Skintone,
    pub age: Age,
    pub sex: Sex,
    pub occlusion: Option<bool>,
    pub lighting: Option<bool>,
    pub expression: Option<bool>,
}

impl Person {
    /// Inter-ocular distance: the distance between the outer eye corners.
    ///
    /// Returns `None` when either eye corner is missing from the annotation.
    pub fn iod(&self) -> Option<f64> {
        let left = self.keypoint(LEFT_EYE_OUTER)?;
        let right = self.keypoint(RIGHT_EYE_OUTER)?;
        Some(left.distance(right))
    }

    pub fn keypoint(&self, kp_id: u32) -> Option<&Keypoint> {
        self.keypoints.iter().find(|kp| kp.id == kp_id)
    }
}

/// An annotated image with its dimensions and the persons it contains.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub persons: Vec<Person>,
}

impl Image {
    pub fn person(&self, person_id: u32) -> Option<&Person> {
        self.persons.iter().find(|p| p.id == person_id)
    }
}

/// Keypoints produced by an automated landmark detector for one person,
/// keyed by (image name, person id) in the estimation file.
#[derive(Debug, Clone, PartialEq)]
pub struct Estimation {
    pub image_name: String,
    pub person_id: u32,
    pub keypoints: Vec<Keypoint>,
}

impl Estimation {
    pub fn keypoint(&self, kp_id: u32) -> Option<&Keypoint> {
        self.keypoints.iter().find(|kp| kp.id == kp_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person_with_eyes(left: (f64, f64), right: (f64, f64)) -> Person {
        Person {
            id: 0,
            keypoints: vec![
                Keypoint::new(left.0, left.1, LEFT_EYE_OUTER),
                Keypoint::new(right.0, right.1, RIGHT_EYE_OUTER),
            ],
            skintone: Skintone::NotAvailable,
            age: Age::NotAvailable,
            sex: Sex::NotAvailable,
            occlusion: None,
            lighting: None,
            expression: None,
        }
    }

    #[test]
    fn keypoint_distance() {
        let a = Keypoint::new(0.0, 0.0, 0);
        let b = Keypoint::new(3.0, 4.0, 1);
        assert!((a.distance(&b) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn iod_from_eye_corners() {
        let person = person_with_eyes((100.0, 50.0), (160.0, 50.0));
        assert!((person.iod().unwrap() - 60.0).abs() < 1e-9);
    }

    #[test]
    fn iod_missing_eye_corner() {
        let mut person = person_with_eyes((100.0, 50.0), (160.0, 50.0));
        person.keypoints.retain(|kp| kp.id != RIGHT_EYE_OUTER);
        assert!(person.iod().is_none());
    }

    #[test]
    fn keypoint_lookup() {
        let person = person_with_eyes((1.0, 2.0), (3.0, 4.0));
        assert_eq!(person.keypoint(LEFT_EYE_OUTER).unwrap().x, 1.0);
        assert!(person.keypoint(99).is_none());
    }
}
