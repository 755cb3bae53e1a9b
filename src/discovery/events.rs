use glam::Vec3;

use super::condition::{MarkerVisual, Severity};
use crate::scene::AnatomyContext;

/// How a condition reached `Discovered`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryMethod {
    /// Enough cumulative scan time under the mask.
    Scan,
    /// A direct click hit on the marker.
    Click,
}

/// Output of the discovery state machine, consumed by the marker layer and
/// external collaborators. Nothing here feeds back into the render math.
#[derive(Debug, Clone, PartialEq)]
pub enum DiscoveryEvent {
    /// The active context changed; all earlier progress is gone.
    ContextChanged {
        /// New context.
        context: AnatomyContext,
    },
    /// A condition entered `Scanning` and needs a marker.
    MarkerSpawned {
        /// Condition id.
        id: String,
        /// World-space marker position.
        position: Vec3,
        /// Resolved marker appearance.
        visual: MarkerVisual,
    },
    /// A condition's marker must be removed.
    MarkerRemoved {
        /// Condition id.
        id: String,
    },
    /// Per-frame scan progress of a `Scanning` condition.
    Progress {
        /// Condition id.
        id: String,
        /// accumulated / required, in [0, 1].
        ratio: f32,
        /// Whether the mask was over the marker this frame.
        in_range: bool,
    },
    /// A condition reached `Discovered`. Fires once per condition per
    /// context activation.
    Discovered {
        /// Condition id.
        id: String,
        /// Display name.
        name: String,
        /// Severity.
        severity: Severity,
        /// World-space marker position.
        position: Vec3,
        /// Time since the condition started scanning.
        elapsed_ms: u64,
        /// Scan completion or click.
        method: DiscoveryMethod,
    },
}

impl DiscoveryEvent {
    /// Condition id, for events about one condition.
    #[must_use]
    pub fn condition_id(&self) -> Option<&str> {
        match self {
            Self::ContextChanged { .. } => None,
            Self::MarkerSpawned { id, .. }
            | Self::MarkerRemoved { id }
            | Self::Progress { id, .. }
            | Self::Discovered { id, .. } => Some(id),
        }
    }
}
