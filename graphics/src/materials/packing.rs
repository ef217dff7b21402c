//! Raw-to-GPU material packing.
//!
//! | Kind | GPU size | GPU alignment |
//! |------|----------|---------------|
//! | float, int | 4 | 4 |
//! | vec2 | 8 | 8 |
//! | vec3, color3, angles3 | 16 | 16 |
//! | vec4, color4 | 16 | 16 |
//! | texture | 8 | 8 |
//!
//! Three-component members are padded to 16 bytes. Textures are replaced by
//! their 64-bit bindless handle. The packed size is rounded up to the
//! largest member alignment so consecutive blobs form a valid array.

use lumen_core::handle::TextureId;
use lumen_core::material::Material;
use lumen_core::shader::{ShaderLayout, ShaderMemberKind};

use crate::error::PackError;

/// Maximum packed size of a single material.
pub const MATERIAL_BLOB_CAPACITY: usize = 500;

/// A material packed into GPU layout.
#[derive(Clone, PartialEq, Eq)]
pub struct MaterialBlob {
    bytes: [u8; MATERIAL_BLOB_CAPACITY],
    len: usize,
}

impl MaterialBlob {
    fn new() -> Self {
        Self {
            bytes: [0; MATERIAL_BLOB_CAPACITY],
            len: 0,
        }
    }

    /// Packed bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    /// Packed size in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the material packed to nothing (shader without members).
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl std::fmt::Debug for MaterialBlob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MaterialBlob")
            .field("len", &self.len)
            .field("bytes", &self.as_bytes())
            .finish()
    }
}

/// Packed layout of a shader's material block.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GpuLayout {
    /// GPU offset of each member, in layout order.
    pub offsets: Vec<usize>,
    /// Packed size, rounded to `alignment`.
    pub size: usize,
    /// Largest member alignment (1 for an empty layout).
    pub alignment: usize,
}

/// GPU size and alignment of a member kind.
pub fn member_gpu_layout(kind: ShaderMemberKind) -> (usize, usize) {
    match kind {
        ShaderMemberKind::Float | ShaderMemberKind::Int => (4, 4),
        ShaderMemberKind::Vec2 | ShaderMemberKind::Texture => (8, 8),
        ShaderMemberKind::Vec3
        | ShaderMemberKind::Color3
        | ShaderMemberKind::Angles3
        | ShaderMemberKind::Vec4
        | ShaderMemberKind::Color4 => (16, 16),
    }
}

/// Compute packed offsets for a layout.
pub fn gpu_layout(layout: &ShaderLayout) -> GpuLayout {
    let mut offsets = Vec::with_capacity(layout.members().len());
    let mut offset = 0;
    let mut alignment = 1;
    for member in layout.members() {
        let (size, align) = member_gpu_layout(member.kind);
        offset = align_to(offset, align);
        alignment = alignment.max(align);
        offsets.push(offset);
        offset += size;
    }
    GpuLayout {
        offsets,
        size: align_to(offset, alignment),
        alignment,
    }
}

/// Pack `material` into GPU layout.
///
/// `resolve_texture` maps a texture id to its bindless handle; it is the
/// place to make the texture resident. Returning `None` fails the pack.
///
/// # Example
///
/// ```ignore
/// let blob = pack_material(&material, &shader.layout, |id| {
///     let handle = resources.texture(id)?.bindless_handle;
///     backend.make_texture_resident(handle);
///     Some(handle)
/// })?;
/// ```
pub fn pack_material<F>(
    material: &Material,
    layout: &ShaderLayout,
    mut resolve_texture: F,
) -> Result<MaterialBlob, PackError>
where
    F: FnMut(TextureId) -> Option<u64>,
{
    let packed = gpu_layout(layout);
    if packed.size > MATERIAL_BLOB_CAPACITY {
        return Err(PackError::BlobOverflow {
            required: packed.size,
            capacity: MATERIAL_BLOB_CAPACITY,
        });
    }

    let mut blob = MaterialBlob::new();
    for (member, &offset) in layout.members().iter().zip(&packed.offsets) {
        let raw = material
            .member_bytes(member)
            .ok_or_else(|| PackError::MemberOutOfRange {
                member: member.name.clone(),
            })?;

        if member.kind == ShaderMemberKind::Texture {
            let mut id = [0u8; 8];
            id.copy_from_slice(raw);
            let texture = TextureId::from_raw(u64::from_le_bytes(id) as u32);
            let handle = resolve_texture(texture).ok_or_else(|| PackError::UnresolvedTexture {
                member: member.name.clone(),
                texture: texture.raw(),
            })?;
            blob.bytes[offset..offset + 8].copy_from_slice(&handle.to_le_bytes());
        } else {
            // vec3 kinds copy 12 bytes and leave the pad zeroed
            blob.bytes[offset..offset + raw.len()].copy_from_slice(raw);
        }
    }
    blob.len = packed.size;

    Ok(blob)
}

fn align_to(value: usize, alignment: usize) -> usize {
    value.div_ceil(alignment) * alignment
}
