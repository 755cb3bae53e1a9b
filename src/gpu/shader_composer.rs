use std::borrow::Cow;
use std::fmt;

use naga_oil::compose::{
    ComposableModuleDescriptor, Composer, NagaModuleDescriptor,
    ShaderLanguage, ShaderType,
};

/// Errors raised while turning WGSL into a shader module.
#[derive(Debug)]
pub enum ShaderError {
    /// A shared `#import` module failed to register.
    Module {
        /// Path of the module that failed.
        path: &'static str,
        /// Composer diagnostic.
        message: String,
    },
    /// No embedded shader exists at the requested path.
    Unknown(String),
    /// A program failed to compose or validate.
    Compose {
        /// Path of the program that failed.
        path: String,
        /// Composer diagnostic.
        message: String,
    },
}

impl fmt::Display for ShaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Module { path, message } => {
                write!(f, "shared module '{path}' failed to register: {message}")
            }
            Self::Unknown(path) => write!(f, "no embedded shader at '{path}'"),
            Self::Compose { path, message } => {
                write!(f, "shader '{path}' failed to compose: {message}")
            }
        }
    }
}

impl std::error::Error for ShaderError {}

/// Shared modules, registered in dependency order.
const MODULES: &[(&str, &str)] = &[
    (
        "modules/fullscreen.wgsl",
        include_str!("../../assets/shaders/modules/fullscreen.wgsl"),
    ),
    (
        "modules/camera.wgsl",
        include_str!("../../assets/shaders/modules/camera.wgsl"),
    ),
];

/// Every program the renderer builds, keyed by its path under
/// `assets/shaders/`.
const PROGRAMS: &[(&str, &str)] = &[
    (
        "raster/mesh.wgsl",
        include_str!("../../assets/shaders/raster/mesh.wgsl"),
    ),
    (
        "screen/bloom.wgsl",
        include_str!("../../assets/shaders/screen/bloom.wgsl"),
    ),
    (
        "screen/xray_composite.wgsl",
        include_str!("../../assets/shaders/screen/xray_composite.wgsl"),
    ),
];

/// Look up the embedded source of a program.
fn program_source(path: &str) -> Option<&'static str> {
    PROGRAMS
        .iter()
        .find(|(p, _)| *p == path)
        .map(|(_, source)| *source)
}

/// Wraps `naga_oil::compose::Composer` to provide shader composition with
/// `#import` support.
///
/// Shared WGSL modules are registered at construction time. Programs pull
/// them in with `#import skinbone::<module>`. The composer produces
/// `naga::Module` IR directly, skipping WGSL re-parse at runtime.
pub struct ShaderComposer {
    composer: Composer,
}

impl ShaderComposer {
    /// Build a composer with every shared module registered.
    ///
    /// # Errors
    ///
    /// Returns [`ShaderError::Module`] if a shared module does not parse.
    pub fn new() -> Result<Self, ShaderError> {
        let mut composer = Composer::default();

        for &(path, source) in MODULES {
            let _ = composer
                .add_composable_module(ComposableModuleDescriptor {
                    source,
                    file_path: path,
                    language: ShaderLanguage::Wgsl,
                    ..Default::default()
                })
                .map_err(|e| ShaderError::Module {
                    path,
                    message: e.to_string(),
                })?;
        }

        Ok(Self { composer })
    }

    /// Compose the embedded program at `path` into a `wgpu::ShaderModule`.
    ///
    /// # Errors
    ///
    /// Returns [`ShaderError`] if the path is unknown or the program fails
    /// to compose.
    pub fn compose(
        &mut self,
        device: &wgpu::Device,
        label: &str,
        path: &str,
    ) -> Result<wgpu::ShaderModule, ShaderError> {
        let naga_module = self.compose_naga(path)?;
        Ok(device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Naga(Cow::Owned(naga_module)),
        }))
    }

    /// Compose a program into a `naga::Module` without a GPU device.
    ///
    /// # Errors
    ///
    /// Returns [`ShaderError`] if the path is unknown or the program fails
    /// to compose.
    pub fn compose_naga(
        &mut self,
        path: &str,
    ) -> Result<naga::Module, ShaderError> {
        let source = program_source(path)
            .ok_or_else(|| ShaderError::Unknown(path.to_owned()))?;
        self.composer
            .make_naga_module(NagaModuleDescriptor {
                source,
                file_path: path,
                shader_type: ShaderType::Wgsl,
                ..Default::default()
            })
            .map_err(|e| ShaderError::Compose {
                path: path.to_owned(),
                message: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_shaders_compose() {
        let mut composer = ShaderComposer::new().unwrap();
        for (path, _) in PROGRAMS {
            let _ = composer.compose_naga(path).unwrap_or_else(|e| {
                panic!("Shader '{path}' failed to compose: {e}")
            });
        }
    }

    #[test]
    fn test_unknown_path_is_an_error() {
        let mut composer = ShaderComposer::new().unwrap();
        assert!(matches!(
            composer.compose_naga("screen/missing.wgsl"),
            Err(ShaderError::Unknown(_))
        ));
    }
}
