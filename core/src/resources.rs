//! Explicit resource registry.
//!
//! [`ResourceManager`] owns every shader, material, texture, font and cubemap
//! the renderer may reference, and hands out typed handles. It is passed by
//! reference into the renderer instead of living in process-wide statics, so
//! several renderers (or tests) can run side by side with their own sets.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::ResourceError;
use crate::font::Font;
use crate::handle::{CubemapId, FontId, MaterialId, ShaderId, TextureId};
use crate::material::Material;
use crate::mesh::{Mesh, MeshId, SkinnedMesh};
use crate::shader::Shader;
use crate::texture::{HdrCubemap, Texture};

/// Registry of renderer-facing resources.
///
/// # Example
///
/// ```
/// use lumen_core::material::{Material, MaterialValue};
/// use lumen_core::resources::ResourceManager;
/// use lumen_core::shader::{Shader, ShaderLayout, ShaderMemberKind};
///
/// let mut resources = ResourceManager::new();
/// let shader = Shader::new("unlit", ShaderLayout::new().with_member("tint", ShaderMemberKind::Color4));
/// let shader_id = resources.add_shader(shader).unwrap();
///
/// let material = Material::new(shader_id, resources.shader(shader_id).unwrap())
///     .with_value(resources.shader(shader_id).unwrap(), "tint", MaterialValue::Vec4([1.0; 4]))
///     .unwrap();
/// let material_id = resources.add_material(material).unwrap();
/// assert!(resources.material(material_id).is_some());
/// ```
#[derive(Debug, Default)]
pub struct ResourceManager {
    shaders: Vec<Arc<Shader>>,
    materials: Vec<Arc<Material>>,
    textures: Vec<Arc<Texture>>,
    fonts: Vec<Arc<Font>>,
    cubemaps: Vec<Arc<HdrCubemap>>,
    meshes: HashMap<MeshId, Arc<Mesh>>,
    skinned_meshes: HashMap<MeshId, Arc<SkinnedMesh>>,
}

impl ResourceManager {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a shader after checking its layout.
    pub fn add_shader(&mut self, shader: Shader) -> Result<ShaderId, ResourceError> {
        shader.validate()?;
        let id = ShaderId(self.shaders.len() as u32);
        log::debug!("ResourceManager: registered shader '{}' as {}", shader.name, id);
        self.shaders.push(Arc::new(shader));
        Ok(id)
    }

    /// Register a material.
    ///
    /// The material is checked against its shader's layout and every texture
    /// member must reference a registered texture. Problems are reported here
    /// rather than when the material is drawn.
    pub fn add_material(&mut self, material: Material) -> Result<MaterialId, ResourceError> {
        let shader = self
            .shader(material.shader())
            .ok_or(ResourceError::UnknownShader(material.shader().raw()))?;

        material.validate_against(shader)?;
        for (member, texture) in material.textures(shader) {
            if self.texture(texture).is_none() {
                return Err(ResourceError::UnknownTexture {
                    member: member.to_string(),
                    texture: u64::from(texture.raw()),
                });
            }
        }

        let id = MaterialId(self.materials.len() as u32);
        self.materials.push(Arc::new(material));
        Ok(id)
    }

    /// Register a texture.
    pub fn add_texture(&mut self, texture: Texture) -> TextureId {
        let id = TextureId(self.textures.len() as u32);
        self.textures.push(Arc::new(texture));
        id
    }

    /// Register a font. Its atlas texture must already be registered.
    pub fn add_font(&mut self, font: Font) -> Result<FontId, ResourceError> {
        if self.texture(font.atlas).is_none() {
            return Err(ResourceError::UnknownTexture {
                member: format!("{}.atlas", font.name),
                texture: u64::from(font.atlas.raw()),
            });
        }
        let id = FontId(self.fonts.len() as u32);
        self.fonts.push(Arc::new(font));
        Ok(id)
    }

    /// Register an IBL cubemap set.
    pub fn add_cubemap(&mut self, cubemap: HdrCubemap) -> CubemapId {
        let id = CubemapId(self.cubemaps.len() as u32);
        self.cubemaps.push(Arc::new(cubemap));
        id
    }

    /// Register a static mesh under its own identity.
    pub fn add_mesh(&mut self, mesh: Mesh) -> MeshId {
        let id = mesh.id();
        self.meshes.insert(id, Arc::new(mesh));
        id
    }

    /// Register a skinned mesh under its own identity.
    pub fn add_skinned_mesh(&mut self, mesh: SkinnedMesh) -> MeshId {
        let id = mesh.id();
        self.skinned_meshes.insert(id, Arc::new(mesh));
        id
    }

    /// Look up a shader.
    pub fn shader(&self, id: ShaderId) -> Option<&Shader> {
        self.shaders.get(id.0 as usize).map(Arc::as_ref)
    }

    /// Look up a material.
    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id.0 as usize).map(Arc::as_ref)
    }

    /// Look up a texture.
    pub fn texture(&self, id: TextureId) -> Option<&Texture> {
        self.textures.get(id.0 as usize).map(Arc::as_ref)
    }

    /// Look up a font.
    pub fn font(&self, id: FontId) -> Option<&Font> {
        self.fonts.get(id.0 as usize).map(Arc::as_ref)
    }

    /// Look up a cubemap set.
    pub fn cubemap(&self, id: CubemapId) -> Option<&HdrCubemap> {
        self.cubemaps.get(id.0 as usize).map(Arc::as_ref)
    }

    /// Look up a static mesh.
    pub fn mesh(&self, id: MeshId) -> Option<&Arc<Mesh>> {
        self.meshes.get(&id)
    }

    /// Look up a skinned mesh.
    pub fn skinned_mesh(&self, id: MeshId) -> Option<&Arc<SkinnedMesh>> {
        self.skinned_meshes.get(&id)
    }

    /// Number of registered materials.
    pub fn material_count(&self) -> usize {
        self.materials.len()
    }
}
