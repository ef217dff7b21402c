//! Camera matrices.

use glam::{Mat4, Vec3};

/// View and projection of the active camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// World-to-view matrix.
    pub view: Mat4,
    /// View-to-clip matrix.
    pub projection: Mat4,
    /// Eye position in world space.
    pub position: Vec3,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY, Mat4::IDENTITY)
    }
}

impl Camera {
    /// Create a camera from view and projection matrices. The eye position
    /// is recovered from the inverse view.
    pub fn new(view: Mat4, projection: Mat4) -> Self {
        Self {
            view,
            projection,
            position: view.inverse().w_axis.truncate(),
        }
    }

    /// Right-handed look-at camera.
    pub fn look_at(eye: Vec3, target: Vec3, up: Vec3, projection: Mat4) -> Self {
        Self {
            view: Mat4::look_at_rh(eye, target, up),
            projection,
            position: eye,
        }
    }

    /// Projection * view.
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }
}
