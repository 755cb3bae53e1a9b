//! Crate-level error types.

use std::fmt;

use crate::gpu::render_context::RenderContextError;
use crate::gpu::shader_composer::ShaderError;

/// Errors produced by the skinbone crate.
///
/// Only construction-time failures live here. Per-frame conditions (models
/// still loading, a lost surface, a failed explanation request) are handled
/// where they occur and never surface as a `SkinboneError`.
#[derive(Debug)]
pub enum SkinboneError {
    /// GPU context initialization failure.
    Gpu(RenderContextError),
    /// A WGSL program failed to compose. Rendering cannot start without it.
    Shader(ShaderError),
    /// Generic I/O failure.
    Io(std::io::Error),
    /// Failed to spawn a background thread.
    ThreadSpawn(std::io::Error),
    /// TOML options parsing/serialization failure.
    OptionsParse(String),
    /// Condition table could not be parsed.
    RegistryParse(String),
    /// Condition table parsed but violates an invariant (duplicate id, ...).
    InvalidRegistry(String),
    /// The scene graph refused a structural change during setup.
    Scene(String),
    /// Viewer event-loop failure.
    Viewer(String),
}

impl fmt::Display for SkinboneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gpu(e) => write!(f, "GPU error: {e}"),
            Self::Shader(e) => write!(f, "shader error: {e}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::ThreadSpawn(e) => {
                write!(f, "failed to spawn thread: {e}")
            }
            Self::OptionsParse(msg) => {
                write!(f, "options parse error: {msg}")
            }
            Self::RegistryParse(msg) => {
                write!(f, "condition table parse error: {msg}")
            }
            Self::InvalidRegistry(msg) => {
                write!(f, "invalid condition table: {msg}")
            }
            Self::Scene(msg) => write!(f, "scene error: {msg}"),
            Self::Viewer(msg) => write!(f, "viewer error: {msg}"),
        }
    }
}

impl std::error::Error for SkinboneError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Gpu(e) => Some(e),
            Self::Shader(e) => Some(e),
            Self::Io(e) | Self::ThreadSpawn(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RenderContextError> for SkinboneError {
    fn from(e: RenderContextError) -> Self {
        Self::Gpu(e)
    }
}

impl From<ShaderError> for SkinboneError {
    fn from(e: ShaderError) -> Self {
        Self::Shader(e)
    }
}

impl From<std::io::Error> for SkinboneError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
