use serde::{Deserialize, Serialize};

use crate::engine::command::EngineCommand;
use crate::scene::AnatomyContext;

/// Discrete actions that can be bound to keys.
///
/// Serde serializes as `snake_case` strings so TOML presets stay readable:
/// ```toml
/// [keybindings.bindings]
/// toggle_expand = "Space"
/// torso_context = "Digit2"
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyAction {
    /// Expand or collapse the reveal mask.
    ToggleExpand,
    /// Grow the expand scale by one step.
    IncreaseScale,
    /// Shrink the expand scale by one step.
    DecreaseScale,
    /// Switch to the head context.
    HeadContext,
    /// Switch to the torso context.
    TorsoContext,
    /// Switch to the full-body context.
    FullBodyContext,
    /// Advance to the next context.
    CycleContext,
    /// Return the camera to its framing pose.
    ResetCamera,
}

/// Expand-scale change per key press.
const SCALE_STEP: f32 = 0.1;

impl KeyAction {
    /// The command this action issues.
    #[must_use]
    pub fn to_command(self) -> EngineCommand {
        match self {
            Self::ToggleExpand => EngineCommand::ToggleExpand,
            Self::IncreaseScale => {
                EngineCommand::AdjustExpandScale { delta: SCALE_STEP }
            }
            Self::DecreaseScale => {
                EngineCommand::AdjustExpandScale { delta: -SCALE_STEP }
            }
            Self::HeadContext => EngineCommand::SwitchContext {
                context: AnatomyContext::Head,
            },
            Self::TorsoContext => EngineCommand::SwitchContext {
                context: AnatomyContext::Torso,
            },
            Self::FullBodyContext => EngineCommand::SwitchContext {
                context: AnatomyContext::FullBody,
            },
            Self::CycleContext => EngineCommand::CycleContext,
            Self::ResetCamera => EngineCommand::ResetCamera,
        }
    }
}
