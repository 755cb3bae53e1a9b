//! Named landmarks on each bone.

use glam::Vec3;

use crate::scene::Bone;

/// Offset of a named landmark from its bone's anchor.
fn landmark_offset(bone: Bone, landmark: &str) -> Option<Vec3> {
    let offset = match (bone, landmark) {
        (Bone::Skull, "forehead") => Vec3::new(0.0, 0.05, 0.082),
        (Bone::Skull, "crown") => Vec3::new(0.0, 0.11, 0.0),
        (Bone::Skull, "left_temple") => Vec3::new(-0.075, 0.03, 0.03),
        (Bone::Skull, "right_temple") => Vec3::new(0.075, 0.03, 0.03),
        (Bone::Skull, "occiput") => Vec3::new(0.0, 0.02, -0.092),
        (Bone::Skull, "nasal") => Vec3::new(0.0, -0.025, 0.088),
        (Bone::Skull, "left_orbit") => Vec3::new(-0.03, 0.005, 0.085),
        (Bone::Skull, "right_orbit") => Vec3::new(0.03, 0.005, 0.085),

        (Bone::Mandible, "chin") => Vec3::new(0.0, -0.012, 0.05),
        (Bone::Mandible, "left_angle") => Vec3::new(-0.052, 0.0, -0.01),
        (Bone::Mandible, "right_angle") => Vec3::new(0.052, 0.0, -0.01),
        (Bone::Mandible, "left_molar") => Vec3::new(-0.035, 0.012, 0.03),
        (Bone::Mandible, "right_molar") => Vec3::new(0.035, 0.012, 0.03),

        (Bone::CervicalSpine, "c2") => Vec3::new(0.0, 0.04, 0.02),
        (Bone::CervicalSpine, "c7") => Vec3::new(0.0, -0.05, 0.02),

        (Bone::Clavicle, "midshaft") => Vec3::new(0.0, 0.0, 0.012),
        (Bone::Clavicle, "sternal_end") => Vec3::new(0.06, 0.0, 0.012),
        (Bone::Clavicle, "acromial_end") => Vec3::new(-0.07, 0.0, 0.012),

        (Bone::Sternum, "manubrium") => Vec3::new(0.0, 0.07, 0.012),
        (Bone::Sternum, "body") => Vec3::new(0.0, 0.0, 0.014),
        (Bone::Sternum, "xiphoid") => Vec3::new(0.0, -0.08, 0.01),

        (Bone::Ribs, "left_fourth") => Vec3::new(-0.12, 0.03, 0.05),
        (Bone::Ribs, "right_fourth") => Vec3::new(0.12, 0.03, 0.05),
        (Bone::Ribs, "left_seventh") => Vec3::new(-0.11, -0.07, 0.05),
        (Bone::Ribs, "right_seventh") => Vec3::new(0.11, -0.07, 0.05),

        (Bone::ThoracicSpine, "t4") => Vec3::new(0.0, 0.06, -0.02),
        (Bone::ThoracicSpine, "t8") => Vec3::new(0.0, -0.03, -0.02),

        (Bone::LumbarSpine, "l3") => Vec3::new(0.0, 0.0, -0.03),
        (Bone::LumbarSpine, "l5") => Vec3::new(0.0, -0.06, -0.03),

        (Bone::Pelvis, "left_iliac_crest") => Vec3::new(-0.11, 0.04, 0.02),
        (Bone::Pelvis, "right_iliac_crest") => Vec3::new(0.11, 0.04, 0.02),
        (Bone::Pelvis, "sacrum") => Vec3::new(0.0, 0.0, -0.1),
        (Bone::Pelvis, "pubis") => Vec3::new(0.0, -0.04, 0.09),

        (Bone::Femur, "neck") => Vec3::new(0.01, 0.2, 0.03),
        (Bone::Femur, "midshaft") => Vec3::new(0.0, 0.0, 0.022),
        (Bone::Femur, "distal") => Vec3::new(0.0, -0.19, 0.022),
        _ => return None,
    };
    Some(offset)
}

/// World position of `landmark` on `bone`. Unknown landmarks resolve to
/// the bone's anchor; lookup never fails.
#[must_use]
pub fn landmark_position(bone: Bone, landmark: &str) -> Vec3 {
    let offset = landmark_offset(bone, landmark).unwrap_or_else(|| {
        if !landmark.is_empty() {
            log::debug!("unknown landmark {landmark:?} on {bone:?}, using anchor");
        }
        Vec3::ZERO
    });
    bone.anchor() + offset
}

/// Whether the landmark is in the table.
#[must_use]
pub fn is_known_landmark(bone: Bone, landmark: &str) -> bool {
    landmark_offset(bone, landmark).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_landmark_offsets_from_anchor() {
        let p = landmark_position(Bone::Skull, "crown");
        assert!((p - (Bone::Skull.anchor() + Vec3::Y * 0.11)).length() < 1e-6);
        assert!(is_known_landmark(Bone::Femur, "neck"));
    }

    #[test]
    fn landmark_names_are_per_bone() {
        assert!(!is_known_landmark(Bone::Skull, "midshaft"));
        assert_eq!(
            landmark_position(Bone::Skull, "midshaft"),
            Bone::Skull.anchor()
        );
    }
}
