//! Shared anatomical frame: bone anchors and body-region contexts.
//!
//! The procedural models and the landmark table both place geometry
//! relative to these anchors, so markers always sit on the bone they name.
//! Units are meters, +Y up, the figure faces +Z.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Bones a condition can attach to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Bone {
    /// Cranium.
    Skull,
    /// Lower jaw.
    Mandible,
    /// Neck vertebrae.
    CervicalSpine,
    /// Collar bones (left one is the anchor).
    Clavicle,
    /// Breastbone.
    Sternum,
    /// Rib cage.
    Ribs,
    /// Upper back vertebrae.
    ThoracicSpine,
    /// Lower back vertebrae.
    LumbarSpine,
    /// Hip girdle.
    Pelvis,
    /// Thigh bone (left one is the anchor).
    Femur,
}

impl Bone {
    /// Every bone, in head-to-toe order.
    pub const ALL: [Self; 10] = [
        Self::Skull,
        Self::Mandible,
        Self::CervicalSpine,
        Self::Clavicle,
        Self::Sternum,
        Self::Ribs,
        Self::ThoracicSpine,
        Self::LumbarSpine,
        Self::Pelvis,
        Self::Femur,
    ];

    /// World-space anchor (geometric center) of the bone.
    #[must_use]
    pub fn anchor(self) -> Vec3 {
        match self {
            Self::Skull => Vec3::new(0.0, 1.66, 0.0),
            Self::Mandible => Vec3::new(0.0, 1.55, 0.045),
            Self::CervicalSpine => Vec3::new(0.0, 1.48, -0.02),
            Self::Clavicle => Vec3::new(-0.09, 1.40, 0.05),
            Self::Sternum => Vec3::new(0.0, 1.28, 0.09),
            Self::Ribs => Vec3::new(0.0, 1.26, 0.0),
            Self::ThoracicSpine => Vec3::new(0.0, 1.26, -0.09),
            Self::LumbarSpine => Vec3::new(0.0, 1.05, -0.06),
            Self::Pelvis => Vec3::new(0.0, 0.93, 0.0),
            Self::Femur => Vec3::new(-0.1, 0.68, 0.0),
        }
    }

    /// Body region tag the bone belongs to.
    #[must_use]
    pub fn region(self) -> &'static str {
        match self {
            Self::Skull => "skull",
            Self::Mandible => "jaw",
            Self::CervicalSpine => "neck",
            Self::Clavicle => "shoulder",
            Self::Sternum | Self::Ribs => "chest",
            Self::ThoracicSpine | Self::LumbarSpine => "spine",
            Self::Pelvis => "pelvis",
            Self::Femur => "leg",
        }
    }
}

/// The active anatomical-model context: which body region is on display.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    schemars::JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum AnatomyContext {
    /// Head and neck.
    #[default]
    Head,
    /// Chest, shoulders and spine.
    Torso,
    /// The whole figure.
    #[serde(rename = "fullbody")]
    FullBody,
}

impl AnatomyContext {
    /// Every context, in switch order.
    pub const ALL: [Self; 3] = [Self::Head, Self::Torso, Self::FullBody];

    /// Region tags visible in this context.
    #[must_use]
    pub fn regions(self) -> &'static [&'static str] {
        match self {
            Self::Head => &["head", "skull", "jaw", "face", "neck"],
            Self::Torso => &["chest", "shoulder", "spine", "neck", "torso"],
            Self::FullBody => &[
                "head", "skull", "jaw", "face", "neck", "chest", "shoulder",
                "spine", "torso", "pelvis", "leg", "fullbody",
            ],
        }
    }

    /// Whether `tag` is one of this context's regions.
    #[must_use]
    pub fn shows_region(self, tag: &str) -> bool {
        self.regions().contains(&tag)
    }

    /// Orbit focus point and distance that frame this context.
    #[must_use]
    pub fn framing(self) -> (Vec3, f32) {
        match self {
            Self::Head => (Vec3::new(0.0, 1.62, 0.0), 0.85),
            Self::Torso => (Vec3::new(0.0, 1.3, 0.0), 1.3),
            Self::FullBody => (Vec3::new(0.0, 1.12, 0.0), 2.6),
        }
    }

    /// The context after this one, wrapping around.
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Self::Head => Self::Torso,
            Self::Torso => Self::FullBody,
            Self::FullBody => Self::Head,
        }
    }

    /// Lowercase name, as used in condition tables.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Head => "head",
            Self::Torso => "torso",
            Self::FullBody => "fullbody",
        }
    }
}

impl std::fmt::Display for AnatomyContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_cycles_through_all() {
        let mut context = AnatomyContext::Head;
        for expected in [AnatomyContext::Torso, AnatomyContext::FullBody, AnatomyContext::Head] {
            context = context.next();
            assert_eq!(context, expected);
        }
    }

    #[test]
    fn fullbody_shows_every_bone_region() {
        for bone in Bone::ALL {
            assert!(
                AnatomyContext::FullBody.shows_region(bone.region()),
                "{bone:?}"
            );
        }
    }

    #[test]
    fn head_does_not_show_legs() {
        assert!(AnatomyContext::Head.shows_region("jaw"));
        assert!(!AnatomyContext::Head.shows_region("leg"));
        assert!(!AnatomyContext::Torso.shows_region("skull"));
    }

    #[test]
    fn context_names_round_trip_through_serde() {
        for ctx in AnatomyContext::ALL {
            let json = serde_json::to_string(&ctx).unwrap();
            assert_eq!(json, format!("\"{}\"", ctx.name()));
            let back: AnatomyContext = serde_json::from_str(&json).unwrap();
            assert_eq!(back, ctx);
        }
    }
}
