//! Renderer configuration.

use std::time::Duration;

use crate::error::GraphicsError;

/// Fixed capacities and timing of a [`Renderer`](super::Renderer).
///
/// Every buffer is allocated at full size in [`Renderer::new`](super::Renderer::new)
/// and never grows; submissions past a capacity fail with
/// [`GraphicsError::CapacityExceeded`].
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use lumen_graphics::RendererConfig;
///
/// let config = RendererConfig::default()
///     .with_max_objects(4096)
///     .with_max_characters(2048)
///     .with_fence_timeout(Duration::from_millis(500));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RendererConfig {
    /// Capacity of the shared static vertex buffer, in vertices.
    pub max_static_vertices: u32,
    /// Capacity of the shared static index buffer, in indices.
    pub max_static_indices: u32,
    /// Capacity of the shared skinned vertex buffer, in vertices.
    pub max_skinned_vertices: u32,
    /// Capacity of the shared skinned index buffer, in indices.
    pub max_skinned_indices: u32,
    /// Objects (sub-meshes and sprites) per frame.
    pub max_objects: u32,
    /// Glyph quads per frame, shadows included.
    pub max_characters: u32,
    /// Bone matrices per frame across all skinned batches.
    pub max_bones: u32,
    /// Timeout of each blocking fence wait in `begin`.
    pub fence_timeout: Duration,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            max_static_vertices: 1_000_000,
            max_static_indices: 3_000_000,
            max_skinned_vertices: 250_000,
            max_skinned_indices: 750_000,
            max_objects: 10_000,
            max_characters: 10_000,
            max_bones: 8_192,
            fence_timeout: Duration::from_secs(1),
        }
    }
}

impl RendererConfig {
    /// Set static geometry capacities.
    #[must_use]
    pub fn with_static_capacity(mut self, vertices: u32, indices: u32) -> Self {
        self.max_static_vertices = vertices;
        self.max_static_indices = indices;
        self
    }

    /// Set skinned geometry capacities.
    #[must_use]
    pub fn with_skinned_capacity(mut self, vertices: u32, indices: u32) -> Self {
        self.max_skinned_vertices = vertices;
        self.max_skinned_indices = indices;
        self
    }

    /// Set the per-frame object capacity.
    #[must_use]
    pub fn with_max_objects(mut self, max_objects: u32) -> Self {
        self.max_objects = max_objects;
        self
    }

    /// Set the per-frame glyph quad capacity.
    #[must_use]
    pub fn with_max_characters(mut self, max_characters: u32) -> Self {
        self.max_characters = max_characters;
        self
    }

    /// Set the per-frame bone capacity.
    #[must_use]
    pub fn with_max_bones(mut self, max_bones: u32) -> Self {
        self.max_bones = max_bones;
        self
    }

    /// Set the blocking fence wait timeout.
    #[must_use]
    pub fn with_fence_timeout(mut self, timeout: Duration) -> Self {
        self.fence_timeout = timeout;
        self
    }

    /// Reject zero capacities and a zero timeout.
    pub fn validate(&self) -> Result<(), GraphicsError> {
        let capacities = [
            ("max_static_vertices", self.max_static_vertices),
            ("max_static_indices", self.max_static_indices),
            ("max_skinned_vertices", self.max_skinned_vertices),
            ("max_skinned_indices", self.max_skinned_indices),
            ("max_objects", self.max_objects),
            ("max_characters", self.max_characters),
            ("max_bones", self.max_bones),
        ];
        for (name, value) in capacities {
            if value == 0 {
                return Err(GraphicsError::InvalidParameter(format!(
                    "{name} must be greater than zero"
                )));
            }
        }
        if self.fence_timeout.is_zero() {
            return Err(GraphicsError::InvalidParameter(
                "fence_timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
