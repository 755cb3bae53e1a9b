//! Discovery game layer: the condition table, landmark lookup, the
//! per-condition state machine, and the markers that visualize it.

/// Condition records, severity, categories, marker looks.
pub mod condition;
/// Events emitted by the state machine.
pub mod events;
/// Bone landmark table.
pub mod landmarks;
/// Marker scene nodes.
pub mod markers;
/// Id-indexed condition table.
pub mod registry;
/// Hidden → Scanning → Discovered state machine.
pub mod state;

pub use condition::{Category, Condition, MarkerShape, MarkerVisual, Severity};
pub use events::{DiscoveryEvent, DiscoveryMethod};
pub use markers::{MarkerLayer, MarkerPalette};
pub use registry::ConditionRegistry;
pub use state::{ConditionState, DiscoveryMachine, ProgressEntry};
