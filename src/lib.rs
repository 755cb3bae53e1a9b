// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Complexity limits (thresholds in clippy.toml)
#![deny(clippy::cognitive_complexity)]
#![deny(clippy::too_many_lines)]
#![deny(clippy::excessive_nesting)]
// Function signature hygiene
#![deny(clippy::too_many_arguments)]
#![deny(clippy::fn_params_excessive_bools)]
// Clone / pass-by-value hygiene
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::implicit_clone)]
// String hygiene
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::redundant_closure_for_method_calls)]
#![deny(clippy::manual_string_new)]
#![deny(clippy::str_to_string)]
// Cargo lints (warn, not deny since cargo lints can be noisy)
#![warn(clippy::cargo)]
// Unused / redundant code
#![deny(unused_results)]
#![deny(unused_qualifications)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]

//! Dual-pass x-ray reveal renderer built on wgpu.
//!
//! Two models share one anatomical frame: an outer skin figure and an inner
//! skeleton. Every frame the skin is rendered offscreen, the skeleton is
//! rendered live, and a composite shader cuts a soft circular window through
//! the skin around the pointer so the skeleton shows through. A discovery
//! game sits on top: conditions anchored to bone landmarks are found by
//! holding the reveal window over them or by clicking their markers.
//!
//! # Key entry points
//!
//! - [`XrayEngine`] - GPU orchestration: resize, render, dispose
//! - [`engine::RevealSession`] - the GPU-free per-frame core (pointer
//!   smoothing, discovery, markers, collaborators)
//! - [`options::Options`] - runtime configuration, loadable from TOML
//! - [`collab`] - explainer, audio and scoring collaborators
//!
//! # Frame order
//!
//! Each frame applies any pending resize, installs freshly loaded models,
//! advances the reveal controller and the discovery machine, then renders:
//! skin capture → skeleton pass → bloom → x-ray composite.

pub mod camera;
pub mod collab;
pub mod discovery;
pub mod engine;
pub mod error;
pub mod gpu;
pub mod input;
pub mod options;
pub mod renderer;
pub mod reveal;
pub mod scene;
pub mod util;

#[cfg(feature = "viewer")]
mod viewer;
#[cfg(all(feature = "web", target_arch = "wasm32"))]
pub mod web;

pub use engine::{EngineCommand, FrameOutcome, RevealSession, XrayEngine};
pub use error::SkinboneError;
pub use input::{InputEvent, MouseButton};
pub use options::Options;
#[cfg(feature = "viewer")]
pub use viewer::{Viewer, ViewerBuilder};
