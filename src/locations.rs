//! The 34-point annotation scheme used by the composite face dataset.
//!
//! Keypoint ids are stable across annotations and estimations; the two outer
//! eye corners anchor the inter-ocular distance used for error normalization.

/// Outer corner of the left eye (subject's left).
pub const LEFT_EYE_OUTER: u32 = 7;

/// Outer corner of the right eye (subject's right).
pub const RIGHT_EYE_OUTER: u32 = 11;

/// Number of keypoints in the annotation scheme.
pub const KEYPOINT_COUNT: u32 = 34;

/// Human-readable names for each keypoint id, indexed by id.
const KEYPOINT_NAMES: [&str; KEYPOINT_COUNT as usize] = [
    "left eyebrow inner",
    "left eyebrow middle",
    "left eyebrow outer",
    "right eyebrow inner",
    "right eyebrow middle",
    "right eyebrow outer",
    "left eye inner corner",
    "left eye outer corner",
    "left eye upper lid",
    "left eye lower lid",
    "right eye inner corner",
    "right eye outer corner",
    "right eye upper lid",
    "right eye lower lid",
    "left temple",
    "left jaw",
    "right temple",
    "right jaw",
    "chin",
    "nose bridge",
    "nose tip",
    "left mouth corner",
    "left upper lip",
    "left lower lip",
    "upper lip center",
    "upper lip inner",
    "lower lip inner",
    "lower lip center",
    "right mouth corner",
    "right upper lip",
    "right lower lip",
    "left ear",
    "right ear",
    "forehead",
];

/// Name of a keypoint id, or `None` for ids outside the scheme.
pub fn keypoint_name(kp_id: u32) -> Option<&'static str> {
    KEYPOINT_NAMES.get(kp_id as usize).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eye_corners_are_named() {
        assert_eq!(keypoint_name(LEFT_EYE_OUTER), Some("left eye outer corner"));
        assert_eq!(
            keypoint_name(RIGHT_EYE_OUTER),
            Some("right eye outer corner")
        );
    }

    #[test]
    fn out_of_scheme_id() {
        assert_eq!(keypoint_name(KEYPOINT_COUNT), None);
    }
}
