//! The frame-level renderer.
//!
//! [`Renderer`] owns the GPU backend, the mesh caches, the triple-buffered
//! streams and the per-frame batches. Callers drive it once per frame:
//!
//! ```text
//! new ──► begin ──► submit_* ... ──► render ──► end ──► begin ──► ...
//!                                                  └──► destroy
//! ```
//!
//! - `begin` waits for the current slot's fence and resets the stream heads
//! - `submit_*` appends to batches (text goes straight into the mapped buffer)
//! - `render` streams every batch and issues one multi-draw per batch
//! - `end` fences the slot and advances to the next one
//!
//! # Example
//!
//! ```ignore
//! let mut renderer = Renderer::new(DummyBackend::new(), RendererConfig::default())?;
//!
//! loop {
//!     renderer.begin()?;
//!     renderer.set_camera(camera);
//!     renderer.submit_mesh(&resources, &mesh, &[material], transform, entity)?;
//!     renderer.submit_text(&resources, "score: 10", font, TextStyle::default(), hud, entity)?;
//!     renderer.render()?;
//!     renderer.end()?;
//! }
//!
//! renderer.destroy()?;
//! ```

mod config;
mod stats;

pub use config::RendererConfig;
pub use stats::RenderStats;

use std::collections::HashSet;

use glam::{Mat4, Vec4};
use lumen_core::handle::{FontId, MaterialId, ShaderId, TextureId};
use lumen_core::mesh::generators::unit_quad;
use lumen_core::mesh::{Mesh, MeshId, SkinnedMesh, SkinnedVertex, Vertex};
use lumen_core::profiling::{frame_mark, profile_function, profile_plot, profile_scope};
use lumen_core::texture::HdrCubemap;
use lumen_core::ResourceManager;

use crate::backend::{
    bindings, BufferHandle, BuiltinProgram, FenceHandle, GeometryBinding, GpuBackend, Program,
    VertexInput,
};
use crate::batch::{Batch, BatchAccumulator, SkeletonId, SkinnedKey, SpriteBatch, SpriteInstance};
use crate::error::GraphicsError;
use crate::materials::{pack_material, MaterialBlob, MATERIAL_BLOB_CAPACITY};
use crate::mesh::{CacheEntry, MeshCache};
use crate::pipeline::{
    FramePipeline, SlotAcquire, StreamCapacities, StreamKind, StreamingStore, FRAMES_IN_FLIGHT,
};
use crate::resources::align_up;
use crate::scene::{Camera, DirectionalLight, FrameUniforms, IblMaps, ShadowMaps};
use crate::text::{quad_indices, TextLayout, TextStyle, TextVertex, QUAD_INDICES, QUAD_VERTICES};
use crate::types::{BufferDescriptor, BufferUsage, DrawIndexedIndirectArgs};

/// Where the renderer is in its frame lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameState {
    /// Initialized, or between `end` and the next `begin`.
    Idle,
    /// Between `begin` and `render`; submissions are accepted.
    Accumulating,
    /// Between `render` and `end`.
    Rendered,
    /// `destroy` has released every GPU object.
    Destroyed,
}

impl FrameState {
    /// Lower-case state name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Accumulating => "accumulating",
            Self::Rendered => "rendered",
            Self::Destroyed => "destroyed",
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct TextFrame {
    quads: u32,
    submissions: u32,
}

/// Batched indirect renderer over triple-buffered persistent memory.
///
/// # Thread Safety
///
/// All calls must come from the thread that owns the graphics context.
pub struct Renderer<B: GpuBackend> {
    backend: B,
    config: RendererConfig,
    state: FrameState,
    pipeline: FramePipeline,
    store: StreamingStore,
    static_meshes: MeshCache<Vertex>,
    skinned_meshes: MeshCache<SkinnedVertex>,
    instance_ids: BufferHandle,
    text_indices: BufferHandle,
    sprite_quad: CacheEntry,
    batches: BatchAccumulator,
    text: TextFrame,
    frame: FrameUniforms,
    storage_alignment: u64,
    stats: RenderStats,
}

impl<B: GpuBackend> Renderer<B> {
    /// Allocate every buffer, create the slot fences, load the built-in
    /// programs and register the sprite quad.
    pub fn new(mut backend: B, config: RendererConfig) -> Result<Self, GraphicsError> {
        profile_function!();
        config.validate()?;

        let storage_alignment = backend.min_storage_buffer_offset_alignment().max(1);

        let mut static_meshes = MeshCache::new(
            &mut backend,
            "static geometry",
            config.max_static_vertices,
            config.max_static_indices,
        )?;
        let skinned_meshes = MeshCache::new(
            &mut backend,
            "skinned geometry",
            config.max_skinned_vertices,
            config.max_skinned_indices,
        )?;

        let object_ids: Vec<u32> = (0..config.max_objects).collect();
        let instance_ids = create_static_buffer(
            &mut backend,
            "instance ids",
            BufferUsage::VERTEX,
            bytemuck::cast_slice(&object_ids),
        )?;
        let text_indices = create_static_buffer(
            &mut backend,
            "text indices",
            BufferUsage::INDEX,
            bytemuck::cast_slice(&quad_indices(config.max_characters)),
        )?;

        let store = StreamingStore::new(
            &mut backend,
            &stream_capacities(&config, storage_alignment),
            FRAMES_IN_FLIGHT,
        )?;
        let pipeline = FramePipeline::new(&mut backend, FRAMES_IN_FLIGHT, config.fence_timeout)?;

        for program in BuiltinProgram::ALL {
            backend.load_builtin_program(program)?;
        }

        let sprite_quad = static_meshes
            .ensure_uploaded(&mut backend, &unit_quad(MeshId::new()))?
            .first()
            .copied()
            .ok_or_else(|| GraphicsError::InvalidParameter("unit quad has no geometry".into()))?;

        log::debug!(
            "Renderer initialized on {} ({} objects, {} characters, storage alignment {})",
            backend.name(),
            config.max_objects,
            config.max_characters,
            storage_alignment
        );

        let stats = RenderStats {
            static_vertex_capacity: config.max_static_vertices,
            static_index_capacity: config.max_static_indices,
            skinned_vertex_capacity: config.max_skinned_vertices,
            skinned_index_capacity: config.max_skinned_indices,
            ..Default::default()
        };

        Ok(Self {
            backend,
            config,
            state: FrameState::Idle,
            pipeline,
            store,
            static_meshes,
            skinned_meshes,
            instance_ids,
            text_indices,
            sprite_quad,
            batches: BatchAccumulator::new(),
            text: TextFrame::default(),
            frame: FrameUniforms::default(),
            storage_alignment,
            stats,
        })
    }

    // ------------------------------------------------------------------------
    // Frame lifecycle
    // ------------------------------------------------------------------------

    /// Start a frame.
    ///
    /// Blocks until the GPU is done with the current slot, then resets every
    /// stream head to the slot's base and clears the per-frame counters. A
    /// failed fence wait is logged and the frame proceeds.
    pub fn begin(&mut self) -> Result<SlotAcquire, GraphicsError> {
        profile_function!();
        self.expect_state("begin", FrameState::Idle)?;

        let acquire = self.pipeline.begin_frame(&mut self.backend);
        if acquire == SlotAcquire::Failed {
            log::error!(
                "Proceeding with frame {} without a slot guarantee",
                self.pipeline.frame_count()
            );
        }

        self.store.begin_slot(self.pipeline.current_slot());
        self.batches.clear();
        self.text = TextFrame::default();
        self.stats.reset_frame();
        self.stats.frame_index = self.pipeline.frame_count();
        self.state = FrameState::Accumulating;

        Ok(acquire)
    }

    /// Stream every batch into the current slot and draw it.
    ///
    /// Batches are drawn in fixed order: static meshes by shader, skinned
    /// meshes by skeleton, wireframes, sprites, text. Each batch is one
    /// multi-draw call. Batches are cleared afterwards even on error.
    pub fn render(&mut self) -> Result<(), GraphicsError> {
        profile_scope!("render");
        self.expect_state("render", FrameState::Accumulating)?;

        let mut batches = std::mem::take(&mut self.batches);
        let result = self.draw_all(&batches);

        self.stats.object_count = (batches.object_count() as u32) + self.text.submissions;
        self.stats.character_count = self.text.quads;
        batches.clear();
        self.batches = batches;
        self.text = TextFrame::default();
        self.state = FrameState::Rendered;

        profile_plot!("renderer.objects", self.stats.object_count);
        profile_plot!("renderer.batches", self.stats.batch_count);

        result
    }

    /// Fence the current slot and advance to the next one.
    pub fn end(&mut self) -> Result<(), GraphicsError> {
        self.expect_state("end", FrameState::Rendered)?;

        self.pipeline.end_frame(&mut self.backend)?;
        self.state = FrameState::Idle;

        frame_mark!();
        Ok(())
    }

    /// Block until the GPU has finished every in-flight frame.
    ///
    /// Returns `false` if a fence wait failed.
    pub fn wait_idle(&mut self) -> bool {
        self.pipeline.wait_idle(&mut self.backend)
    }

    /// Wait for the GPU and release every buffer and fence.
    pub fn destroy(&mut self) -> Result<(), GraphicsError> {
        if self.state == FrameState::Destroyed {
            return Err(self.state_error("destroy", "not destroyed"));
        }

        if !self.wait_idle() {
            log::error!("Destroying renderer after a failed fence wait");
        }

        self.store.destroy(&mut self.backend);
        self.static_meshes.destroy(&mut self.backend);
        self.skinned_meshes.destroy(&mut self.backend);
        self.backend.destroy_buffer(self.instance_ids);
        self.backend.destroy_buffer(self.text_indices);
        self.pipeline.destroy(&mut self.backend);
        self.batches.clear();
        self.state = FrameState::Destroyed;

        log::debug!("Renderer destroyed");
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Scene state
    // ------------------------------------------------------------------------

    /// Set the camera used by every batch.
    pub fn set_camera(&mut self, camera: Camera) {
        self.frame.camera = camera;
    }

    /// Set (or clear) the shadow maps.
    pub fn set_shadow_maps(&mut self, shadows: Option<ShadowMaps>) {
        self.frame.shadows = shadows;
    }

    /// Set (or clear) the directional light.
    pub fn set_directional_light(&mut self, light: Option<DirectionalLight>) {
        self.frame.light = light;
    }

    /// Set (or clear) image-based lighting. `None` skips IBL texture binding.
    pub fn set_ibl(&mut self, cubemap: Option<&HdrCubemap>) {
        self.frame.ibl = cubemap.map(IblMaps::from);
    }

    /// Set the frame time in seconds.
    pub fn set_time(&mut self, time: f32) {
        self.frame.time = time;
    }

    // ------------------------------------------------------------------------
    // Submission
    // ------------------------------------------------------------------------

    /// Submit a static mesh. Sub-mesh `i` is drawn with `materials[i]` and
    /// joins the batch of that material's shader.
    ///
    /// Uploads the mesh on its first submission.
    pub fn submit_mesh(
        &mut self,
        resources: &ResourceManager,
        mesh: &Mesh,
        materials: &[MaterialId],
        transform: Mat4,
        entity_id: u32,
    ) -> Result<(), GraphicsError> {
        self.expect_state("submit_mesh", FrameState::Accumulating)?;
        let sub_meshes = mesh.sub_meshes().len();
        check_materials(sub_meshes, materials)?;
        self.reserve_objects(sub_meshes)?;

        let packed = materials[..sub_meshes]
            .iter()
            .map(|&id| pack_for(&mut self.backend, resources, id))
            .collect::<Result<Vec<_>, _>>()?;

        let entries = self.static_meshes.ensure_uploaded(&mut self.backend, mesh)?;
        for (entry, (shader, blob)) in entries.iter().zip(&packed) {
            self.batches
                .push_mesh(*shader, entry, transform, blob.as_bytes(), entity_id);
        }
        Ok(())
    }

    /// Submit a skinned mesh posed by `bones`.
    ///
    /// Sub-meshes sharing `skeleton` and a shader share one batch and one
    /// uploaded palette; the palette of the first such submission in the
    /// frame is used.
    #[allow(clippy::too_many_arguments)]
    pub fn submit_skinned_mesh(
        &mut self,
        resources: &ResourceManager,
        mesh: &SkinnedMesh,
        skeleton: SkeletonId,
        bones: &[Mat4],
        materials: &[MaterialId],
        transform: Mat4,
        entity_id: u32,
    ) -> Result<(), GraphicsError> {
        self.expect_state("submit_skinned_mesh", FrameState::Accumulating)?;
        let sub_meshes = mesh.sub_meshes().len();
        check_materials(sub_meshes, materials)?;
        self.reserve_objects(sub_meshes)?;

        let packed = materials[..sub_meshes]
            .iter()
            .map(|&id| pack_for(&mut self.backend, resources, id))
            .collect::<Result<Vec<_>, _>>()?;

        let new_keys: HashSet<SkinnedKey> = packed
            .iter()
            .map(|(shader, _)| SkinnedKey {
                skeleton,
                shader: *shader,
            })
            .filter(|key| !self.batches.has_skinned(key))
            .collect();
        let bones_needed = self.batches.bone_count() + new_keys.len() * bones.len();
        if bones_needed > self.config.max_bones as usize {
            return Err(GraphicsError::CapacityExceeded {
                resource: "bones",
                requested: bones_needed as u64,
                capacity: u64::from(self.config.max_bones),
            });
        }

        let entries = self.skinned_meshes.ensure_uploaded(&mut self.backend, mesh)?;
        for (entry, (shader, blob)) in entries.iter().zip(&packed) {
            let key = SkinnedKey {
                skeleton,
                shader: *shader,
            };
            self.batches
                .push_skinned(key, bones, entry, transform, blob.as_bytes(), entity_id);
        }
        Ok(())
    }

    /// Submit a static mesh drawn as a flat-coloured wireframe.
    pub fn submit_mesh_wireframe(
        &mut self,
        mesh: &Mesh,
        color: Vec4,
        transform: Mat4,
        entity_id: u32,
    ) -> Result<(), GraphicsError> {
        self.expect_state("submit_mesh_wireframe", FrameState::Accumulating)?;
        self.reserve_objects(mesh.sub_meshes().len())?;

        let entries = self.static_meshes.ensure_uploaded(&mut self.backend, mesh)?;
        for entry in entries {
            self.batches.push_wireframe(entry, transform, color, entity_id);
        }
        Ok(())
    }

    /// Submit a textured, tinted sprite (an instance of the unit quad).
    pub fn submit_sprite(
        &mut self,
        resources: &ResourceManager,
        texture: TextureId,
        tint: Vec4,
        transform: Mat4,
        entity_id: u32,
    ) -> Result<(), GraphicsError> {
        self.expect_state("submit_sprite", FrameState::Accumulating)?;
        self.reserve_objects(1)?;

        let handle = resources
            .texture(texture)
            .map(|t| t.bindless_handle)
            .ok_or_else(|| GraphicsError::UnknownResource(texture.to_string()))?;
        self.backend.make_texture_resident(handle);

        self.batches
            .push_sprite(transform, SpriteInstance::new(tint, handle), entity_id);
        Ok(())
    }

    /// Lay out `text` and write its glyph quads into the current slot.
    ///
    /// Text does not go through the batches: the vertices are written to
    /// the mapped text stream immediately and drawn by one command in
    /// `render`.
    pub fn submit_text(
        &mut self,
        resources: &ResourceManager,
        text: &str,
        font: FontId,
        style: TextStyle,
        transform: Mat4,
        entity_id: u32,
    ) -> Result<(), GraphicsError> {
        self.expect_state("submit_text", FrameState::Accumulating)?;

        let font_data = resources
            .font(font)
            .ok_or_else(|| GraphicsError::UnknownResource(font.to_string()))?;
        let atlas_handle = resources
            .texture(font_data.atlas)
            .map(|t| t.bindless_handle)
            .ok_or_else(|| GraphicsError::UnknownResource(font_data.atlas.to_string()))?;

        let quads = TextLayout {
            font: font_data,
            atlas_handle,
            style,
            transform,
            entity_id,
        }
        .quads(text);

        let requested = u64::from(self.text.quads) + quads.len() as u64;
        if requested > u64::from(self.config.max_characters) {
            return Err(GraphicsError::CapacityExceeded {
                resource: "text characters",
                requested,
                capacity: u64::from(self.config.max_characters),
            });
        }

        self.backend.make_texture_resident(atlas_handle);
        self.store
            .stream_mut(StreamKind::TextVertices)
            .push(&mut self.backend, &quads, 4)?;
        self.text.quads += quads.len() as u32;
        self.text.submissions += 1;
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    /// Current lifecycle state.
    pub fn state(&self) -> FrameState {
        self.state
    }

    /// Snapshot of usage statistics.
    pub fn stats(&self) -> RenderStats {
        RenderStats {
            static_vertices_used: self.static_meshes.vertices_used(),
            static_indices_used: self.static_meshes.indices_used(),
            skinned_vertices_used: self.skinned_meshes.vertices_used(),
            skinned_indices_used: self.skinned_meshes.indices_used(),
            cached_meshes: self.static_meshes.len() + self.skinned_meshes.len(),
            ..self.stats
        }
    }

    /// Configuration the renderer was created with.
    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// The backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The backend, mutably.
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Slot written by the current frame.
    pub fn current_slot(&self) -> usize {
        self.pipeline.current_slot()
    }

    /// Fence currently guarding `slot`.
    pub fn slot_fence(&self, slot: usize) -> Option<FenceHandle> {
        self.pipeline.slot_fence(slot)
    }

    /// Backing buffer of a stream and the byte offset where `slot` starts.
    pub fn stream_slot(&self, kind: StreamKind, slot: usize) -> (BufferHandle, u64) {
        let stream = self.store.stream(kind);
        (stream.buffer(), stream.slot_base(slot))
    }

    /// Static mesh cache.
    pub fn static_meshes(&self) -> &MeshCache<Vertex> {
        &self.static_meshes
    }

    /// Skinned mesh cache.
    pub fn skinned_meshes(&self) -> &MeshCache<SkinnedVertex> {
        &self.skinned_meshes
    }

    /// Cache entry of the unit quad instanced by sprites.
    pub fn sprite_quad(&self) -> CacheEntry {
        self.sprite_quad
    }

    /// Scene state applied to every batch.
    pub fn frame_uniforms(&self) -> &FrameUniforms {
        &self.frame
    }

    // ------------------------------------------------------------------------
    // Drawing
    // ------------------------------------------------------------------------

    fn draw_all(&mut self, batches: &BatchAccumulator) -> Result<(), GraphicsError> {
        for (shader, batch) in batches.meshes().iter() {
            self.draw_batch(Program::Shader(*shader), VertexInput::Static, batch, None)?;
        }
        for (key, skinned) in batches.skinned().iter() {
            self.draw_batch(
                Program::Shader(key.shader),
                VertexInput::Skinned,
                &skinned.batch,
                Some(&skinned.bones),
            )?;
        }
        if !batches.wireframe().is_empty() {
            self.draw_batch(
                Program::Builtin(BuiltinProgram::Wireframe),
                VertexInput::Static,
                batches.wireframe(),
                None,
            )?;
        }
        if !batches.sprites().is_empty() {
            self.draw_sprites(batches.sprites())?;
        }
        if self.text.quads > 0 {
            self.draw_text()?;
        }
        Ok(())
    }

    fn draw_batch(
        &mut self,
        program: Program,
        input: VertexInput,
        batch: &Batch,
        bones: Option<&[Mat4]>,
    ) -> Result<(), GraphicsError> {
        self.backend.bind_program(program);
        self.frame.apply(&mut self.backend);

        self.bind_stream(StreamKind::Transforms, bindings::TRANSFORMS, batch.transforms())?;
        self.bind_stream(StreamKind::EntityIds, bindings::ENTITY_IDS, batch.entity_ids())?;
        // Empty for member-less layouts; still rebound so no earlier range leaks in.
        self.bind_stream(StreamKind::Materials, bindings::MATERIALS, batch.materials())?;
        if let Some(bones) = bones.filter(|b| !b.is_empty()) {
            self.bind_stream(StreamKind::Bones, bindings::BONES, bones)?;
        }

        let geometry = self.geometry(input);
        self.backend.bind_geometry(&geometry);
        self.multi_draw(batch.commands())
    }

    fn draw_sprites(&mut self, sprites: &SpriteBatch) -> Result<(), GraphicsError> {
        self.backend
            .bind_program(Program::Builtin(BuiltinProgram::Sprite));
        self.frame.apply(&mut self.backend);

        self.bind_stream(StreamKind::Transforms, bindings::TRANSFORMS, sprites.transforms())?;
        self.bind_stream(StreamKind::EntityIds, bindings::ENTITY_IDS, sprites.entity_ids())?;
        self.bind_stream(StreamKind::Materials, bindings::MATERIALS, sprites.instances())?;

        let geometry = self.geometry(VertexInput::Static);
        self.backend.bind_geometry(&geometry);
        let command = sprites.command(&self.sprite_quad);
        self.multi_draw(&[command])
    }

    fn draw_text(&mut self) -> Result<(), GraphicsError> {
        self.backend.bind_program(Program::Builtin(BuiltinProgram::Text));
        self.frame.apply(&mut self.backend);

        let stream = self.store.stream(StreamKind::TextVertices);
        let vertex_size = std::mem::size_of::<TextVertex>() as u64;
        let base_vertex = stream.slot_base(self.pipeline.current_slot()) / vertex_size;
        let geometry = GeometryBinding {
            input: VertexInput::Text,
            vertex_buffer: stream.buffer(),
            index_buffer: self.text_indices,
            instance_buffer: None,
        };
        self.backend.bind_geometry(&geometry);

        let command = DrawIndexedIndirectArgs::new(self.text.quads * QUAD_INDICES.len() as u32, 1)
            .with_base_vertex(base_vertex as i32);
        debug_assert_eq!(base_vertex % u64::from(QUAD_VERTICES), 0);
        self.multi_draw(&[command])
    }

    fn bind_stream<T: bytemuck::Pod>(
        &mut self,
        kind: StreamKind,
        binding: u32,
        values: &[T],
    ) -> Result<(), GraphicsError> {
        let stream = self.store.stream_mut(kind);
        let alloc = stream.push(&mut self.backend, values, self.storage_alignment)?;
        self.backend
            .bind_storage_range(binding, stream.buffer(), alloc.offset, alloc.size);
        Ok(())
    }

    fn multi_draw(&mut self, commands: &[DrawIndexedIndirectArgs]) -> Result<(), GraphicsError> {
        let stream = self.store.stream_mut(StreamKind::Commands);
        let alloc = stream.push(&mut self.backend, commands, 4)?;
        self.backend.multi_draw_indexed_indirect(
            stream.buffer(),
            alloc.offset,
            commands.len() as u32,
            DrawIndexedIndirectArgs::SIZE as u32,
        );

        self.stats.batch_count += 1;
        self.stats.draw_commands += commands.len() as u32;

        log::trace!(
            "Multi-draw of {} commands at offset {}",
            commands.len(),
            alloc.offset
        );
        Ok(())
    }

    fn geometry(&self, input: VertexInput) -> GeometryBinding {
        let (vertex_buffer, index_buffer) = match input {
            VertexInput::Skinned => (
                self.skinned_meshes.vertex_buffer(),
                self.skinned_meshes.index_buffer(),
            ),
            _ => (
                self.static_meshes.vertex_buffer(),
                self.static_meshes.index_buffer(),
            ),
        };
        GeometryBinding {
            input,
            vertex_buffer,
            index_buffer,
            instance_buffer: Some(self.instance_ids),
        }
    }

    // ------------------------------------------------------------------------
    // Checks
    // ------------------------------------------------------------------------

    fn expect_state(
        &self,
        operation: &'static str,
        expected: FrameState,
    ) -> Result<(), GraphicsError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(self.state_error(operation, expected.name()))
        }
    }

    fn state_error(&self, operation: &'static str, expected: &'static str) -> GraphicsError {
        GraphicsError::InvalidState {
            operation,
            expected,
            actual: self.state.name(),
        }
    }

    fn reserve_objects(&self, count: usize) -> Result<(), GraphicsError> {
        let requested = (self.batches.object_count() + count) as u64;
        if requested > u64::from(self.config.max_objects) {
            return Err(GraphicsError::CapacityExceeded {
                resource: "objects",
                requested,
                capacity: u64::from(self.config.max_objects),
            });
        }
        Ok(())
    }
}

impl<B: GpuBackend> std::fmt::Debug for Renderer<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("backend", &self.backend.name())
            .field("state", &self.state)
            .field("slot", &self.pipeline.current_slot())
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

fn check_materials(sub_meshes: usize, materials: &[MaterialId]) -> Result<(), GraphicsError> {
    if materials.len() < sub_meshes {
        return Err(GraphicsError::InvalidParameter(format!(
            "mesh has {sub_meshes} sub-meshes but only {} materials",
            materials.len()
        )));
    }
    Ok(())
}

/// Pack a registered material, making its textures resident.
fn pack_for<B: GpuBackend + ?Sized>(
    backend: &mut B,
    resources: &ResourceManager,
    id: MaterialId,
) -> Result<(ShaderId, MaterialBlob), GraphicsError> {
    let material = resources
        .material(id)
        .ok_or_else(|| GraphicsError::UnknownResource(id.to_string()))?;
    let shader = resources
        .shader(material.shader())
        .ok_or_else(|| GraphicsError::UnknownResource(material.shader().to_string()))?;

    let blob = pack_material(material, &shader.layout, |texture| {
        let handle = resources.texture(texture)?.bindless_handle;
        backend.make_texture_resident(handle);
        Some(handle)
    })?;
    Ok((material.shader(), blob))
}

fn create_static_buffer<B: GpuBackend + ?Sized>(
    backend: &mut B,
    label: &str,
    usage: BufferUsage,
    data: &[u8],
) -> Result<BufferHandle, GraphicsError> {
    let buffer = backend.create_buffer(
        &BufferDescriptor::new(data.len() as u64, usage | BufferUsage::COPY_DST).with_label(label),
    )?;
    backend.upload(buffer, 0, data)?;
    Ok(buffer)
}

/// Per-slot stream sizes. Every storage stream gets one alignment's worth of
/// slack per possible batch boundary, and is rounded so slot bases stay
/// aligned.
fn stream_capacities(config: &RendererConfig, alignment: u64) -> StreamCapacities {
    let objects = u64::from(config.max_objects);
    let slack = (objects + 1) * alignment;
    let storage = |bytes: u64| align_up(bytes + slack, alignment);

    StreamCapacities {
        transforms: storage(objects * std::mem::size_of::<Mat4>() as u64),
        materials: storage(objects * MATERIAL_BLOB_CAPACITY as u64),
        entity_ids: storage(objects * std::mem::size_of::<u32>() as u64),
        commands: (objects + 1) * DrawIndexedIndirectArgs::SIZE,
        bones: storage(u64::from(config.max_bones) * std::mem::size_of::<Mat4>() as u64),
        text_vertices: u64::from(config.max_characters)
            * u64::from(QUAD_VERTICES)
            * std::mem::size_of::<TextVertex>() as u64,
    }
}
