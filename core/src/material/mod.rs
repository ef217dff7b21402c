//! CPU-side materials.
//!
//! A [`Material`] is a reference to a shader plus a raw data blob. Values are
//! written into the blob at the offsets recorded by the shader's
//! [`ShaderLayout`](crate::shader::ShaderLayout); texture members store a
//! [`TextureId`] as a little-endian `u64`.
//!
//! # Example
//!
//! ```
//! use lumen_core::handle::{ShaderId, TextureId};
//! use lumen_core::material::{Material, MaterialValue};
//! use lumen_core::shader::{Shader, ShaderLayout, ShaderMemberKind};
//!
//! let shader = Shader::new(
//!     "lit",
//!     ShaderLayout::new()
//!         .with_member("roughness", ShaderMemberKind::Float)
//!         .with_member("albedo", ShaderMemberKind::Color3),
//! );
//!
//! let mut material = Material::new(ShaderId::from_raw(0), &shader);
//! material.set(&shader, "roughness", MaterialValue::Float(0.5)).unwrap();
//! material.set(&shader, "albedo", MaterialValue::Vec3([1.0, 0.0, 0.0])).unwrap();
//! assert_eq!(material.get(&shader, "roughness"), Some(MaterialValue::Float(0.5)));
//! ```

use crate::error::ResourceError;
use crate::handle::{ShaderId, TextureId};
use crate::shader::{Shader, ShaderMember, ShaderMemberKind};

/// A typed material value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MaterialValue {
    /// Single float.
    Float(f32),
    /// Single signed integer.
    Int(i32),
    /// 2-component vector.
    Vec2([f32; 2]),
    /// 3-component vector (plain, colour or angles).
    Vec3([f32; 3]),
    /// 4-component vector (plain or colour).
    Vec4([f32; 4]),
    /// Texture reference.
    Texture(TextureId),
}

impl MaterialValue {
    /// The canonical member kind for this value.
    pub fn kind(&self) -> ShaderMemberKind {
        match self {
            Self::Float(_) => ShaderMemberKind::Float,
            Self::Int(_) => ShaderMemberKind::Int,
            Self::Vec2(_) => ShaderMemberKind::Vec2,
            Self::Vec3(_) => ShaderMemberKind::Vec3,
            Self::Vec4(_) => ShaderMemberKind::Vec4,
            Self::Texture(_) => ShaderMemberKind::Texture,
        }
    }

    /// Whether this value can be stored in a member of the given kind.
    pub fn fits(&self, kind: ShaderMemberKind) -> bool {
        match self {
            Self::Vec3(_) => kind.is_vec3(),
            Self::Vec4(_) => kind.is_vec4(),
            _ => self.kind() == kind,
        }
    }

    fn write(&self, out: &mut [u8]) {
        match self {
            Self::Float(v) => out.copy_from_slice(&v.to_le_bytes()),
            Self::Int(v) => out.copy_from_slice(&v.to_le_bytes()),
            Self::Vec2(v) => out.copy_from_slice(bytemuck::cast_slice(v)),
            Self::Vec3(v) => out.copy_from_slice(bytemuck::cast_slice(v)),
            Self::Vec4(v) => out.copy_from_slice(bytemuck::cast_slice(v)),
            Self::Texture(id) => out.copy_from_slice(&u64::from(id.raw()).to_le_bytes()),
        }
    }

    fn read(kind: ShaderMemberKind, bytes: &[u8]) -> Self {
        let f = |i: usize| f32::from_le_bytes([bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]]);
        match kind {
            ShaderMemberKind::Float => Self::Float(f(0)),
            ShaderMemberKind::Int => {
                Self::Int(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
            }
            ShaderMemberKind::Vec2 => Self::Vec2([f(0), f(4)]),
            ShaderMemberKind::Vec3 | ShaderMemberKind::Color3 | ShaderMemberKind::Angles3 => {
                Self::Vec3([f(0), f(4), f(8)])
            }
            ShaderMemberKind::Vec4 | ShaderMemberKind::Color4 => {
                Self::Vec4([f(0), f(4), f(8), f(12)])
            }
            ShaderMemberKind::Texture => {
                let mut raw = [0u8; 8];
                raw.copy_from_slice(&bytes[..8]);
                Self::Texture(TextureId::from_raw(u64::from_le_bytes(raw) as u32))
            }
        }
    }
}

/// CPU-side material: shader reference plus raw member data.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    name: Option<String>,
    shader: ShaderId,
    data: Vec<u8>,
}

impl Material {
    /// Create a material with zeroed data sized for the shader's layout.
    pub fn new(shader_id: ShaderId, shader: &Shader) -> Self {
        Self {
            name: None,
            shader: shader_id,
            data: vec![0; shader.layout.raw_size()],
        }
    }

    /// Create a material from an existing raw data blob.
    pub fn from_raw(shader: ShaderId, data: Vec<u8>) -> Self {
        Self {
            name: None,
            shader,
            data,
        }
    }

    /// Set the material name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Material name, if set.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The shader this material feeds.
    pub fn shader(&self) -> ShaderId {
        self.shader
    }

    /// Raw member data.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Raw bytes of one member, or `None` if they lie outside the data blob.
    pub fn member_bytes(&self, member: &ShaderMember) -> Option<&[u8]> {
        self.data.get(member.offset..member.end())
    }

    /// Write a value to a named member.
    pub fn set(
        &mut self,
        shader: &Shader,
        name: &str,
        value: MaterialValue,
    ) -> Result<(), ResourceError> {
        let member = shader
            .layout
            .member(name)
            .ok_or_else(|| ResourceError::UnknownMember {
                shader: shader.name.clone(),
                member: name.to_string(),
            })?;

        if !value.fits(member.kind) {
            return Err(ResourceError::TypeMismatch {
                member: name.to_string(),
                expected: member.kind,
                actual: value.kind(),
            });
        }

        if self.data.len() < member.end() {
            self.data.resize(member.end(), 0);
        }
        value.write(&mut self.data[member.offset..member.end()]);
        Ok(())
    }

    /// Builder form of [`set`](Self::set).
    pub fn with_value(
        mut self,
        shader: &Shader,
        name: &str,
        value: MaterialValue,
    ) -> Result<Self, ResourceError> {
        self.set(shader, name, value)?;
        Ok(self)
    }

    /// Read a named member.
    pub fn get(&self, shader: &Shader, name: &str) -> Option<MaterialValue> {
        let member = shader.layout.member(name)?;
        let bytes = self.member_bytes(member)?;
        Some(MaterialValue::read(member.kind, bytes))
    }

    /// Texture ids referenced by this material, paired with their member names.
    pub fn textures<'a>(
        &'a self,
        shader: &'a Shader,
    ) -> impl Iterator<Item = (&'a str, TextureId)> + 'a {
        shader
            .layout
            .members()
            .iter()
            .filter(|m| m.kind == ShaderMemberKind::Texture)
            .filter_map(move |m| match self.member_bytes(m) {
                Some(bytes) => match MaterialValue::read(m.kind, bytes) {
                    MaterialValue::Texture(id) => Some((m.name.as_str(), id)),
                    _ => None,
                },
                None => None,
            })
    }

    /// Check that every member of the shader layout fits inside the data blob.
    pub fn validate_against(&self, shader: &Shader) -> Result<(), ResourceError> {
        for member in shader.layout.members() {
            if member.end() > self.data.len() {
                return Err(ResourceError::MemberOutOfRange {
                    member: member.name.clone(),
                    offset: member.offset,
                    end: member.end(),
                    len: self.data.len(),
                });
            }
        }
        Ok(())
    }
}
