//! Batch kinds and the per-frame accumulator.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec4};
use lumen_core::handle::ShaderId;

use crate::mesh::CacheEntry;
use crate::types::DrawIndexedIndirectArgs;

use super::BatchMap;

/// Caller-chosen identity of a bone palette.
///
/// Skinned submissions that share a skeleton share one uploaded palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SkeletonId(pub u64);

/// Key of a skinned batch: one palette drawn with one shader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SkinnedKey {
    /// Bone palette identity.
    pub skeleton: SkeletonId,
    /// Shader of the submitted materials.
    pub shader: ShaderId,
}

/// Draw commands plus parallel per-object data.
///
/// Object `i` of the batch owns `transforms[i]`, `entity_ids[i]` and
/// `materials[i * stride..(i + 1) * stride]`; its command carries `i` as
/// `base_instance`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch {
    commands: Vec<DrawIndexedIndirectArgs>,
    transforms: Vec<Mat4>,
    materials: Vec<u8>,
    material_stride: usize,
    entity_ids: Vec<u32>,
}

impl Batch {
    /// Create an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one object drawing `entry`.
    pub fn push(&mut self, entry: &CacheEntry, transform: Mat4, material: &[u8], entity_id: u32) {
        if self.transforms.is_empty() {
            self.material_stride = material.len();
        }
        debug_assert_eq!(
            material.len(),
            self.material_stride,
            "materials of one batch must pack to the same size"
        );

        let object = self.transforms.len() as u32;
        self.commands.push(entry.draw_command(1, object));
        self.transforms.push(transform);
        self.materials.extend_from_slice(material);
        self.entity_ids.push(entity_id);
    }

    /// Indirect commands, one per object.
    pub fn commands(&self) -> &[DrawIndexedIndirectArgs] {
        &self.commands
    }

    /// Per-object model matrices.
    pub fn transforms(&self) -> &[Mat4] {
        &self.transforms
    }

    /// Concatenated packed materials.
    pub fn materials(&self) -> &[u8] {
        &self.materials
    }

    /// Packed size of each object's material.
    pub fn material_stride(&self) -> usize {
        self.material_stride
    }

    /// Per-object entity ids.
    pub fn entity_ids(&self) -> &[u32] {
        &self.entity_ids
    }

    /// Number of objects.
    pub fn object_count(&self) -> usize {
        self.transforms.len()
    }

    /// Whether the batch has no objects.
    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    /// Remove every object, keeping allocations.
    pub fn clear(&mut self) {
        self.commands.clear();
        self.transforms.clear();
        self.materials.clear();
        self.material_stride = 0;
        self.entity_ids.clear();
    }
}

/// A skinned batch and its bone palette.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkinnedBatch {
    /// Objects of the batch.
    pub batch: Batch,
    /// Bone matrices, uploaded once per batch.
    pub bones: Vec<Mat4>,
}

/// Per-instance sprite data, read by the sprite program as its material.
///
/// # Memory Layout
///
/// - Total size: 32 bytes
/// - Alignment: 4 bytes
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct SpriteInstance {
    /// RGBA tint.
    pub tint: [f32; 4],
    /// Bindless texture handle split into low and high words.
    pub texture: [u32; 2],
    /// Pads the struct to its 16-byte GPU alignment.
    pub _padding: [u32; 2],
}

static_assertions::const_assert_eq!(std::mem::size_of::<SpriteInstance>(), 32);

impl SpriteInstance {
    /// Create an instance.
    pub fn new(tint: Vec4, texture: u64) -> Self {
        Self {
            tint: tint.to_array(),
            texture: [texture as u32, (texture >> 32) as u32],
            _padding: [0; 2],
        }
    }
}

/// Sprites drawn as instances of the shared unit quad.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpriteBatch {
    transforms: Vec<Mat4>,
    instances: Vec<SpriteInstance>,
    entity_ids: Vec<u32>,
}

impl SpriteBatch {
    /// Append one sprite.
    pub fn push(&mut self, transform: Mat4, instance: SpriteInstance, entity_id: u32) {
        self.transforms.push(transform);
        self.instances.push(instance);
        self.entity_ids.push(entity_id);
    }

    /// The single instanced command drawing every sprite with `quad`.
    pub fn command(&self, quad: &CacheEntry) -> DrawIndexedIndirectArgs {
        quad.draw_command(self.len() as u32, 0)
    }

    /// Per-sprite model matrices.
    pub fn transforms(&self) -> &[Mat4] {
        &self.transforms
    }

    /// Per-sprite tint and texture.
    pub fn instances(&self) -> &[SpriteInstance] {
        &self.instances
    }

    /// Per-sprite entity ids.
    pub fn entity_ids(&self) -> &[u32] {
        &self.entity_ids
    }

    /// Number of sprites.
    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    /// Whether there are no sprites.
    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    /// Remove every sprite, keeping allocations.
    pub fn clear(&mut self) {
        self.transforms.clear();
        self.instances.clear();
        self.entity_ids.clear();
    }
}

/// Every batch of the frame being accumulated.
#[derive(Debug, Default)]
pub struct BatchAccumulator {
    meshes: BatchMap<ShaderId, Batch>,
    skinned: BatchMap<SkinnedKey, SkinnedBatch>,
    wireframe: Batch,
    sprites: SpriteBatch,
    object_count: usize,
    bone_count: usize,
}

impl BatchAccumulator {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one static sub-mesh to the batch of `shader`.
    pub fn push_mesh(
        &mut self,
        shader: ShaderId,
        entry: &CacheEntry,
        transform: Mat4,
        material: &[u8],
        entity_id: u32,
    ) {
        self.meshes
            .get_or_insert_with(shader, Batch::new)
            .push(entry, transform, material, entity_id);
        self.object_count += 1;
    }

    /// Append one skinned sub-mesh. The palette is recorded on the batch's
    /// first submission; later submissions with the same key reuse it.
    pub fn push_skinned(
        &mut self,
        key: SkinnedKey,
        bones: &[Mat4],
        entry: &CacheEntry,
        transform: Mat4,
        material: &[u8],
        entity_id: u32,
    ) {
        let bone_count = &mut self.bone_count;
        let skinned = self.skinned.get_or_insert_with(key, || {
            *bone_count += bones.len();
            SkinnedBatch {
                batch: Batch::new(),
                bones: bones.to_vec(),
            }
        });
        skinned.batch.push(entry, transform, material, entity_id);
        self.object_count += 1;
    }

    /// Append one wireframe sub-mesh drawn in `color`.
    pub fn push_wireframe(&mut self, entry: &CacheEntry, transform: Mat4, color: Vec4, entity_id: u32) {
        let color = color.to_array();
        self.wireframe
            .push(entry, transform, bytemuck::cast_slice(&color), entity_id);
        self.object_count += 1;
    }

    /// Append one sprite.
    pub fn push_sprite(&mut self, transform: Mat4, instance: SpriteInstance, entity_id: u32) {
        self.sprites.push(transform, instance, entity_id);
        self.object_count += 1;
    }

    /// Static batches in first-submission order.
    pub fn meshes(&self) -> &BatchMap<ShaderId, Batch> {
        &self.meshes
    }

    /// Skinned batches in first-submission order.
    pub fn skinned(&self) -> &BatchMap<SkinnedKey, SkinnedBatch> {
        &self.skinned
    }

    /// The wireframe batch.
    pub fn wireframe(&self) -> &Batch {
        &self.wireframe
    }

    /// The sprite batch.
    pub fn sprites(&self) -> &SpriteBatch {
        &self.sprites
    }

    /// Whether a skinned batch would be created by `key`.
    pub fn has_skinned(&self, key: &SkinnedKey) -> bool {
        self.skinned.contains_key(key)
    }

    /// Objects accumulated this frame (sub-meshes plus sprites).
    pub fn object_count(&self) -> usize {
        self.object_count
    }

    /// Bones recorded across all skinned batches.
    pub fn bone_count(&self) -> usize {
        self.bone_count
    }

    /// Number of non-empty batches (one multi-draw each).
    pub fn batch_count(&self) -> usize {
        self.meshes.len()
            + self.skinned.len()
            + usize::from(!self.wireframe.is_empty())
            + usize::from(!self.sprites.is_empty())
    }

    /// Drop every batch.
    pub fn clear(&mut self) {
        self.meshes.clear();
        self.skinned.clear();
        self.wireframe.clear();
        self.sprites.clear();
        self.object_count = 0;
        self.bone_count = 0;
    }
}
