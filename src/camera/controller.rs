use glam::{Quat, Vec2, Vec3};

use crate::camera::core::{Camera, Ray};
use crate::options::CameraOptions;

/// Smallest and largest orbit distance relative to the configured default.
const MIN_DISTANCE_FACTOR: f32 = 0.35;
const MAX_DISTANCE_FACTOR: f32 = 3.0;

/// Orbit controller around a fixed focus point.
///
/// Pure math; the GPU side lives in
/// [`CameraBinding`](crate::camera::binding::CameraBinding).
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    orientation: Quat,
    distance: f32,
    default_distance: f32,
    focus_point: Vec3,
    rotate_speed: f32,
    zoom_speed: f32,
    /// Current camera state.
    pub camera: Camera,
}

impl OrbitCamera {
    /// Build a controller from options and the initial drawable aspect.
    #[must_use]
    pub fn new(options: &CameraOptions, aspect: f32) -> Self {
        let focus_point = Vec3::from(options.target);
        let distance = options.distance.max(f32::EPSILON);

        let camera = Camera {
            eye: focus_point + Vec3::Z * distance,
            target: focus_point,
            up: Vec3::Y,
            aspect: sanitize_aspect(aspect),
            fovy: options.fovy,
            znear: options.znear,
            zfar: options.zfar,
        };

        let mut controller = Self {
            orientation: Quat::IDENTITY,
            distance,
            default_distance: distance,
            focus_point,
            rotate_speed: options.rotate_speed * 0.01,
            zoom_speed: options.zoom_speed,
            camera,
        };
        controller.update_camera_pos();
        controller
    }

    fn update_camera_pos(&mut self) {
        let dir = self.orientation * Vec3::Z;

        self.camera.eye = self.focus_point + (dir * self.distance);
        self.camera.target = self.focus_point;
        self.camera.up = self.orientation * Vec3::Y;
    }

    /// Update the projection aspect ratio. Zero-area sizes are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.camera.aspect = width as f32 / height as f32;
    }

    /// Rotate around the focus point by a pixel delta.
    pub fn rotate(&mut self, delta: Vec2) {
        let up = self.orientation * Vec3::Y;
        let horizontal = Quat::from_axis_angle(up, -delta.x * self.rotate_speed);
        self.orientation = horizontal * self.orientation;

        let right = self.orientation * Vec3::X;
        let vertical = Quat::from_axis_angle(right, -delta.y * self.rotate_speed);
        self.orientation = (vertical * self.orientation).normalize();

        self.update_camera_pos();
    }

    /// Zoom in (positive) or out (negative).
    pub fn zoom(&mut self, delta: f32) {
        self.distance *= 1.0 - delta * self.zoom_speed;
        self.distance = self.distance.clamp(
            self.default_distance * MIN_DISTANCE_FACTOR,
            self.default_distance * MAX_DISTANCE_FACTOR,
        );
        self.update_camera_pos();
    }

    /// Return to the initial orientation and distance.
    pub fn reset(&mut self) {
        self.orientation = Quat::IDENTITY;
        self.distance = self.default_distance;
        self.update_camera_pos();
    }

    /// Move the orbit focus and make `distance` the new default distance.
    /// Orientation is reset so the new subject is seen from the front.
    pub fn set_focus(&mut self, focus: Vec3, distance: f32) {
        self.focus_point = focus;
        self.default_distance = distance.max(f32::EPSILON);
        self.reset();
    }

    /// Current orbit distance.
    #[must_use]
    pub fn distance(&self) -> f32 {
        self.distance
    }

    /// Ray through a pointer position given in NDC.
    #[must_use]
    pub fn screen_ray(&self, ndc: Vec2) -> Ray {
        self.camera.ray_from_ndc(ndc)
    }

    /// Project a world point into reveal-mask space.
    #[must_use]
    pub fn project_to_mask(&self, world: Vec3) -> Option<Vec2> {
        self.camera.project_to_mask(world)
    }
}

fn sanitize_aspect(aspect: f32) -> f32 {
    if aspect.is_finite() && aspect > 0.0 {
        aspect
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_looking_at_target() {
        let orbit = OrbitCamera::new(&CameraOptions::default(), 1.5);
        let forward = (orbit.camera.target - orbit.camera.eye).normalize();
        assert!((forward - Vec3::NEG_Z).length() < 1e-5);
        assert_eq!(orbit.camera.aspect, 1.5);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut orbit = OrbitCamera::new(&CameraOptions::default(), 1.0);
        for _ in 0..200 {
            orbit.zoom(1.0);
        }
        let min = CameraOptions::default().distance * MIN_DISTANCE_FACTOR;
        assert!((orbit.distance() - min).abs() < 1e-4);
    }

    #[test]
    fn reset_restores_pose() {
        let mut orbit = OrbitCamera::new(&CameraOptions::default(), 1.0);
        let eye = orbit.camera.eye;
        orbit.rotate(Vec2::new(40.0, -25.0));
        orbit.zoom(0.5);
        assert!((orbit.camera.eye - eye).length() > 1e-3);
        orbit.reset();
        assert!((orbit.camera.eye - eye).length() < 1e-4);
    }

    #[test]
    fn set_focus_moves_target() {
        let mut orbit = OrbitCamera::new(&CameraOptions::default(), 1.0);
        orbit.set_focus(Vec3::new(0.0, 1.0, 0.0), 2.0);
        assert_eq!(orbit.camera.target, Vec3::new(0.0, 1.0, 0.0));
        assert!((orbit.distance() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn resize_ignores_zero_area() {
        let mut orbit = OrbitCamera::new(&CameraOptions::default(), 2.0);
        orbit.resize(0, 300);
        assert_eq!(orbit.camera.aspect, 2.0);
        orbit.resize(300, 300);
        assert_eq!(orbit.camera.aspect, 1.0);
    }

    #[test]
    fn invalid_aspect_falls_back() {
        let orbit = OrbitCamera::new(&CameraOptions::default(), f32::NAN);
        assert_eq!(orbit.camera.aspect, 1.0);
    }
}
