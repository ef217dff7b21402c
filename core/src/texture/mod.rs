//! Texture resources as seen by the renderer.
//!
//! Pixel data lives with the importer; the renderer only needs the bindless
//! handle the GPU uses to reference a texture from shader code.

/// A 2D texture with a bindless GPU handle.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Texture {
    /// Debug label.
    pub label: Option<String>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// 64-bit bindless handle. Must be made resident before a draw reads it.
    pub bindless_handle: u64,
}

impl Texture {
    /// Create a texture description.
    pub fn new(width: u32, height: u32, bindless_handle: u64) -> Self {
        Self {
            label: None,
            width,
            height,
            bindless_handle,
        }
    }

    /// Set the debug label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// Image-based lighting maps generated from an HDR environment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HdrCubemap {
    /// Debug label.
    pub label: Option<String>,
    /// Handle of the environment cubemap (skybox).
    pub environment: u64,
    /// Handle of the diffuse irradiance cubemap.
    pub irradiance: u64,
    /// Handle of the specular prefiltered cubemap.
    pub prefiltered: u64,
    /// Handle of the split-sum BRDF lookup texture.
    pub brdf_lut: u64,
    /// Number of mip levels in the prefiltered cubemap.
    pub prefiltered_mip_levels: u32,
}

impl HdrCubemap {
    /// All bindless handles this cubemap exposes.
    pub fn handles(&self) -> [u64; 4] {
        [
            self.environment,
            self.irradiance,
            self.prefiltered,
            self.brdf_lut,
        ]
    }
}
