//! Per-frame scene state shared by every batch.
//!
//! The renderer binds a program per batch and re-applies the same frame
//! uniforms to each one:
//!
//! - [`Camera`] - View/projection matrices and eye position
//! - [`DirectionalLight`] - Sun-style light
//! - [`ShadowMaps`] - Cascaded shadow map matrices and depth texture
//! - [`IblMaps`] - Image-based lighting textures from an HDR cubemap
//! - [`FrameUniforms`] - All of the above plus the frame time

mod camera;
mod lighting;

pub use camera::Camera;
pub use lighting::{DirectionalLight, IblMaps, ShadowCascade, ShadowMaps, MAX_SHADOW_CASCADES};

use crate::backend::{GpuBackend, UniformValue};

/// Uniform names set on every bound program.
pub mod uniforms {
    /// View matrix.
    pub const VIEW: &str = "u_view";
    /// Projection matrix.
    pub const PROJECTION: &str = "u_projection";
    /// Projection * view.
    pub const VIEW_PROJECTION: &str = "u_view_projection";
    /// Eye position in world space.
    pub const CAMERA_POSITION: &str = "u_camera_position";
    /// Seconds since the application started.
    pub const TIME: &str = "u_time";
    /// Direction the light travels, normalised.
    pub const LIGHT_DIRECTION: &str = "u_light_direction";
    /// Light colour.
    pub const LIGHT_COLOR: &str = "u_light_color";
    /// Light intensity.
    pub const LIGHT_INTENSITY: &str = "u_light_intensity";
    /// Cascaded shadow depth texture.
    pub const SHADOW_MAP: &str = "u_shadow_map";
    /// Number of shadow cascades in use.
    pub const CASCADE_COUNT: &str = "u_cascade_count";
    /// Prefix of per-cascade light-space matrices (`u_light_space[i]`).
    pub const LIGHT_SPACE: &str = "u_light_space";
    /// Prefix of per-cascade far split depths (`u_cascade_split[i]`).
    pub const CASCADE_SPLIT: &str = "u_cascade_split";
    /// 1 when IBL textures are bound, 0 otherwise.
    pub const IBL_ENABLED: &str = "u_ibl_enabled";
    /// Diffuse irradiance cubemap.
    pub const IRRADIANCE_MAP: &str = "u_irradiance_map";
    /// Specular prefiltered cubemap.
    pub const PREFILTERED_MAP: &str = "u_prefiltered_map";
    /// Mip count of the prefiltered cubemap.
    pub const PREFILTERED_MIP_LEVELS: &str = "u_prefiltered_mip_levels";
    /// Split-sum BRDF lookup texture.
    pub const BRDF_LUT: &str = "u_brdf_lut";
}

/// Scene state applied to each batch's program.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FrameUniforms {
    /// Active camera.
    pub camera: Camera,
    /// Directional light, if any.
    pub light: Option<DirectionalLight>,
    /// Shadow maps, if any.
    pub shadows: Option<ShadowMaps>,
    /// IBL maps, if any.
    pub ibl: Option<IblMaps>,
    /// Frame time in seconds.
    pub time: f32,
}

impl FrameUniforms {
    /// Set every frame uniform on the currently bound program.
    pub fn apply<B: GpuBackend + ?Sized>(&self, backend: &mut B) {
        let camera = &self.camera;
        backend.set_uniform(uniforms::VIEW, UniformValue::Mat4(camera.view));
        backend.set_uniform(uniforms::PROJECTION, UniformValue::Mat4(camera.projection));
        backend.set_uniform(
            uniforms::VIEW_PROJECTION,
            UniformValue::Mat4(camera.view_projection()),
        );
        backend.set_uniform(uniforms::CAMERA_POSITION, UniformValue::Vec3(camera.position));
        backend.set_uniform(uniforms::TIME, UniformValue::Float(self.time));

        if let Some(light) = &self.light {
            backend.set_uniform(uniforms::LIGHT_DIRECTION, UniformValue::Vec3(light.direction));
            backend.set_uniform(uniforms::LIGHT_COLOR, UniformValue::Vec3(light.color));
            backend.set_uniform(uniforms::LIGHT_INTENSITY, UniformValue::Float(light.intensity));
        }

        match &self.shadows {
            Some(shadows) => {
                backend.make_texture_resident(shadows.depth_texture);
                backend.set_uniform(uniforms::SHADOW_MAP, UniformValue::Handle(shadows.depth_texture));
                backend.set_uniform(
                    uniforms::CASCADE_COUNT,
                    UniformValue::Int(shadows.cascades().len() as i32),
                );
                for (i, cascade) in shadows.cascades().iter().enumerate() {
                    backend.set_uniform(
                        &format!("{}[{i}]", uniforms::LIGHT_SPACE),
                        UniformValue::Mat4(cascade.light_space),
                    );
                    backend.set_uniform(
                        &format!("{}[{i}]", uniforms::CASCADE_SPLIT),
                        UniformValue::Float(cascade.split_depth),
                    );
                }
            }
            None => backend.set_uniform(uniforms::CASCADE_COUNT, UniformValue::Int(0)),
        }

        match &self.ibl {
            Some(ibl) => {
                for handle in [ibl.irradiance, ibl.prefiltered, ibl.brdf_lut] {
                    backend.make_texture_resident(handle);
                }
                backend.set_uniform(uniforms::IBL_ENABLED, UniformValue::Int(1));
                backend.set_uniform(uniforms::IRRADIANCE_MAP, UniformValue::Handle(ibl.irradiance));
                backend.set_uniform(uniforms::PREFILTERED_MAP, UniformValue::Handle(ibl.prefiltered));
                backend.set_uniform(uniforms::BRDF_LUT, UniformValue::Handle(ibl.brdf_lut));
                backend.set_uniform(
                    uniforms::PREFILTERED_MIP_LEVELS,
                    UniformValue::Float(ibl.prefiltered_mip_levels as f32),
                );
            }
            None => backend.set_uniform(uniforms::IBL_ENABLED, UniformValue::Int(0)),
        }
    }
}
