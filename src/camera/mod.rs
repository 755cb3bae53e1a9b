//! Camera system for the 3D scene.
//!
//! Provides a perspective camera with a fixed field of view, an orbit
//! controller that rotates and zooms around a fixed target, and the GPU
//! uniform binding the mesh passes read from.

/// GPU uniform buffer and bind group for the camera.
pub mod binding;
/// Orbit controller: rotation, zoom, resize.
pub mod controller;
/// Core camera struct, GPU uniform type, rays and projections.
pub mod core;
