//! Lights, shadow maps and image-based lighting.

use glam::{Mat4, Vec3};
use lumen_core::texture::HdrCubemap;

/// Maximum number of shadow cascades a program reads.
pub const MAX_SHADOW_CASCADES: usize = 4;

/// A directional (sun) light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    /// Direction the light travels, normalised.
    pub direction: Vec3,
    /// Linear RGB colour.
    pub color: Vec3,
    /// Intensity multiplier.
    pub intensity: f32,
}

impl DirectionalLight {
    /// Create a light. The direction is normalised.
    pub fn new(direction: Vec3, color: Vec3, intensity: f32) -> Self {
        Self {
            direction: direction.normalize_or_zero(),
            color,
            intensity,
        }
    }
}

/// One cascade of a cascaded shadow map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowCascade {
    /// World-to-light-clip matrix.
    pub light_space: Mat4,
    /// View-space far depth covered by this cascade.
    pub split_depth: f32,
}

impl ShadowCascade {
    /// Create a cascade.
    pub fn new(light_space: Mat4, split_depth: f32) -> Self {
        Self {
            light_space,
            split_depth,
        }
    }
}

/// Shadow maps rendered for the current frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ShadowMaps {
    /// Bindless handle of the depth array texture.
    pub depth_texture: u64,
    cascades: Vec<ShadowCascade>,
}

impl ShadowMaps {
    /// Create shadow maps with no cascades.
    pub fn new(depth_texture: u64) -> Self {
        Self {
            depth_texture,
            cascades: Vec::new(),
        }
    }

    /// Add a cascade. Cascades beyond [`MAX_SHADOW_CASCADES`] are dropped
    /// with a warning.
    #[must_use]
    pub fn with_cascade(mut self, cascade: ShadowCascade) -> Self {
        if self.cascades.len() < MAX_SHADOW_CASCADES {
            self.cascades.push(cascade);
        } else {
            log::warn!("Dropping shadow cascade beyond {MAX_SHADOW_CASCADES}");
        }
        self
    }

    /// Cascades, nearest first.
    pub fn cascades(&self) -> &[ShadowCascade] {
        &self.cascades
    }
}

/// Image-based lighting textures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IblMaps {
    /// Diffuse irradiance cubemap handle.
    pub irradiance: u64,
    /// Specular prefiltered cubemap handle.
    pub prefiltered: u64,
    /// BRDF lookup texture handle.
    pub brdf_lut: u64,
    /// Mip count of the prefiltered cubemap.
    pub prefiltered_mip_levels: u32,
}

impl From<&HdrCubemap> for IblMaps {
    fn from(cubemap: &HdrCubemap) -> Self {
        Self {
            irradiance: cubemap.irradiance,
            prefiltered: cubemap.prefiltered,
            brdf_lut: cubemap.brdf_lut,
            prefiltered_mip_levels: cubemap.prefiltered_mip_levels,
        }
    }
}
