//! Condition records and their marker appearance.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::landmarks::landmark_position;
use crate::scene::{AnatomyContext, Bone};

/// How serious a condition is. Drives scoring and the discovery sound.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Minor finding.
    Low,
    /// Noteworthy finding.
    Medium,
    /// Serious finding.
    High,
}

impl Severity {
    /// Lowercase label.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// Closed set of condition kinds. Each kind maps to one marker look.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Broken or cracked bone.
    Fracture,
    /// Localized tissue damage (cysts, tumors).
    Lesion,
    /// Wear and structural change over time.
    Degeneration,
    /// Swelling or irritation.
    Inflammation,
    /// Developmental or positional irregularity.
    Anomaly,
}

/// Marker geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerShape {
    /// Diamond.
    Octahedron,
    /// Ball.
    Sphere,
    /// Halo.
    Ring,
}

/// Marker appearance, resolved once when the marker is spawned.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerVisual {
    /// Geometry.
    pub shape: MarkerShape,
    /// Base color while undiscovered.
    pub color: [f32; 3],
    /// Full-size world radius.
    pub size: f32,
    /// Pulses per second while the mask is over the marker.
    pub pulse_rate: f32,
}

impl Category {
    /// Marker appearance for this category at a severity.
    #[must_use]
    pub fn marker_visual(self, severity: Severity) -> MarkerVisual {
        let (shape, color, pulse_rate) = match self {
            Self::Fracture => (MarkerShape::Octahedron, [1.0, 0.3, 0.25], 3.0),
            Self::Lesion => (MarkerShape::Sphere, [0.85, 0.35, 0.9], 2.0),
            Self::Degeneration => (MarkerShape::Ring, [0.95, 0.8, 0.3], 1.5),
            Self::Inflammation => (MarkerShape::Sphere, [1.0, 0.55, 0.2], 2.5),
            Self::Anomaly => (MarkerShape::Octahedron, [0.35, 0.75, 1.0], 2.0),
        };
        let size = match severity {
            Severity::Low => 0.012,
            Severity::Medium => 0.015,
            Severity::High => 0.018,
        };
        MarkerVisual {
            shape,
            color,
            size,
            pulse_rate,
        }
    }
}

/// One hinted condition. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// Unique key.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Severity.
    pub severity: Severity,
    /// Kind; picks the marker look.
    pub category: Category,
    /// Bone the marker sits on.
    pub bone: Bone,
    /// Named landmark on the bone.
    pub landmark: String,
    /// Extra offset from the landmark.
    #[serde(default)]
    pub offset: [f32; 3],
    /// Seconds of cumulative proximity needed to discover it.
    pub scan_time: f32,
    /// Context the condition belongs to.
    pub context: AnatomyContext,
    /// Region tags that also make it visible in other contexts.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Short description used by the built-in explainer.
    #[serde(default)]
    pub summary: String,
}

impl Condition {
    /// World-space marker position.
    #[must_use]
    pub fn position(&self) -> Vec3 {
        landmark_position(self.bone, &self.landmark) + Vec3::from(self.offset)
    }

    /// Whether the condition is shown in `context`.
    #[must_use]
    pub fn is_relevant(&self, context: AnatomyContext) -> bool {
        self.context == context
            || self.tags.iter().any(|tag| context.shows_region(tag))
    }

    /// Marker appearance.
    #[must_use]
    pub fn marker_visual(&self) -> MarkerVisual {
        self.category.marker_visual(self.severity)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// A minimal condition for tests.
    pub(crate) fn condition(
        id: &str,
        bone: Bone,
        context: AnatomyContext,
        scan_time: f32,
    ) -> Condition {
        Condition {
            id: id.to_owned(),
            name: id.to_owned(),
            severity: Severity::Medium,
            category: Category::Fracture,
            bone,
            landmark: String::new(),
            offset: [0.0; 3],
            scan_time,
            context,
            tags: Vec::new(),
            summary: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::condition;
    use super::*;

    #[test]
    fn relevance_by_context_or_tag() {
        let mut c = condition("a", Bone::Mandible, AnatomyContext::Head, 1.0);
        assert!(c.is_relevant(AnatomyContext::Head));
        assert!(!c.is_relevant(AnatomyContext::Torso));
        c.tags.push("jaw".to_owned());
        assert!(c.is_relevant(AnatomyContext::FullBody));
        assert!(!c.is_relevant(AnatomyContext::Torso));
    }

    #[test]
    fn unknown_landmark_falls_back_to_bone_anchor() {
        let mut c = condition("a", Bone::Pelvis, AnatomyContext::FullBody, 1.0);
        c.landmark = "nowhere".to_owned();
        c.offset = [0.0, 0.1, 0.0];
        assert!((c.position() - (Bone::Pelvis.anchor() + Vec3::Y * 0.1)).length() < 1e-6);
    }

    #[test]
    fn severity_scales_marker() {
        let low = Category::Lesion.marker_visual(Severity::Low);
        let high = Category::Lesion.marker_visual(Severity::High);
        assert_eq!(low.shape, high.shape);
        assert!(high.size > low.size);
    }
}
