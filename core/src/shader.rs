//! Reflected shader member layouts.
//!
//! A [`ShaderLayout`] is the ordered list of typed fields a shader reads from
//! its per-object material block. Materials store their values in a raw,
//! tightly packed blob; each [`ShaderMember`] records where its value lives in
//! that blob. The renderer repacks the blob into GPU layout every submission.

use std::collections::HashSet;

use crate::error::ResourceError;

/// Kind of a shader member.
///
/// The colour and angle variants have the same storage as [`Vec3`](Self::Vec3)
/// and only differ in how editors present them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderMemberKind {
    /// `f32`.
    Float,
    /// `i32`.
    Int,
    /// `[f32; 2]`.
    Vec2,
    /// `[f32; 3]`.
    Vec3,
    /// `[f32; 3]` edited as an RGB colour.
    Color3,
    /// `[f32; 3]` edited as euler angles.
    Angles3,
    /// `[f32; 4]`.
    Vec4,
    /// `[f32; 4]` edited as an RGBA colour.
    Color4,
    /// Texture reference, stored in the material as a `u64` texture id.
    Texture,
}

impl ShaderMemberKind {
    /// Size in bytes of this member inside a material's raw data blob.
    pub fn raw_size(&self) -> usize {
        match self {
            Self::Float | Self::Int => 4,
            Self::Vec2 | Self::Texture => 8,
            Self::Vec3 | Self::Color3 | Self::Angles3 => 12,
            Self::Vec4 | Self::Color4 => 16,
        }
    }

    /// Whether this is one of the three-component kinds.
    pub fn is_vec3(&self) -> bool {
        matches!(self, Self::Vec3 | Self::Color3 | Self::Angles3)
    }

    /// Whether this is one of the four-component kinds.
    pub fn is_vec4(&self) -> bool {
        matches!(self, Self::Vec4 | Self::Color4)
    }
}

/// One member of a shader's material block.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShaderMember {
    /// Member name as declared in the shader.
    pub name: String,
    /// Member kind.
    pub kind: ShaderMemberKind,
    /// Byte offset of this member's value inside the material data blob.
    pub offset: usize,
}

impl ShaderMember {
    /// End offset of this member's value inside the material data blob.
    pub fn end(&self) -> usize {
        self.offset + self.kind.raw_size()
    }
}

/// Ordered member layout of a shader's material block.
///
/// # Example
///
/// ```
/// use lumen_core::shader::{ShaderLayout, ShaderMemberKind};
///
/// let layout = ShaderLayout::new()
///     .with_member("roughness", ShaderMemberKind::Float)
///     .with_member("albedo", ShaderMemberKind::Color3)
///     .with_member("albedo_map", ShaderMemberKind::Texture);
///
/// assert_eq!(layout.members().len(), 3);
/// assert_eq!(layout.raw_size(), 4 + 12 + 8);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ShaderLayout {
    members: Vec<ShaderMember>,
    raw_size: usize,
}

impl ShaderLayout {
    /// Create an empty layout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a member. Its raw offset is placed right after the previous one.
    #[must_use]
    pub fn with_member(mut self, name: impl Into<String>, kind: ShaderMemberKind) -> Self {
        let offset = self.raw_size;
        self.push(ShaderMember {
            name: name.into(),
            kind,
            offset,
        });
        self
    }

    /// Append a member with an explicit raw offset (as reported by reflection).
    #[must_use]
    pub fn with_member_at(
        mut self,
        name: impl Into<String>,
        kind: ShaderMemberKind,
        offset: usize,
    ) -> Self {
        self.push(ShaderMember {
            name: name.into(),
            kind,
            offset,
        });
        self
    }

    fn push(&mut self, member: ShaderMember) {
        self.raw_size = self.raw_size.max(member.end());
        self.members.push(member);
    }

    /// Members in declaration order.
    pub fn members(&self) -> &[ShaderMember] {
        &self.members
    }

    /// Find a member by name.
    pub fn member(&self, name: &str) -> Option<&ShaderMember> {
        self.members.iter().find(|m| m.name == name)
    }

    /// Minimum size of a material data blob for this layout.
    pub fn raw_size(&self) -> usize {
        self.raw_size
    }

    /// Whether the layout declares no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// A shader as seen by the renderer: a name and its reflected member layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shader {
    /// Shader name, used for diagnostics.
    pub name: String,
    /// Material block layout.
    pub layout: ShaderLayout,
}

impl Shader {
    /// Create a shader.
    pub fn new(name: impl Into<String>, layout: ShaderLayout) -> Self {
        Self {
            name: name.into(),
            layout,
        }
    }

    /// Check the layout for duplicate member names.
    pub fn validate(&self) -> Result<(), ResourceError> {
        let mut seen = HashSet::new();
        for member in self.layout.members() {
            if !seen.insert(member.name.as_str()) {
                return Err(ResourceError::DuplicateMember {
                    shader: self.name.clone(),
                    member: member.name.clone(),
                });
            }
        }
        Ok(())
    }
}
