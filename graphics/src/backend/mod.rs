//! GPU backend abstraction layer.
//!
//! The renderer talks to the GPU through the [`GpuBackend`] trait. It covers
//! exactly what batched indirect submission needs:
//! - Buffer creation, persistent mapping and sub-range uploads
//! - Fences with flush-and-timeout client waits
//! - Program binding, uniforms and storage-buffer range bindings
//! - `multi_draw_elements_indirect` style draws
//! - Bindless texture residency
//!
//! # Available Backends
//!
//! - [`DummyBackend`]: CPU-only backend that keeps real buffer memory and
//!   records every command. Used by tests, benchmarks and headless tools.

mod dummy;
mod error;

pub use dummy::{DrawRecord, DummyBackend, FenceMode, UploadRecord};
pub use error::BackendError;

use std::time::Duration;

use lumen_core::ShaderId;

use crate::types::BufferDescriptor;

/// Handle to a GPU buffer owned by a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle(pub(crate) u64);

impl BufferHandle {
    /// Get the raw backend id.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Handle to a GPU fence owned by a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FenceHandle(pub(crate) u64);

impl FenceHandle {
    /// Get the raw backend id.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Outcome of a client-side fence wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FenceWait {
    /// The fence was already signaled or became signaled within the timeout.
    Signaled,
    /// The timeout elapsed first.
    TimedOut,
    /// The wait itself failed.
    Failed,
}

/// Programs the renderer ships with, compiled at initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinProgram {
    /// Flat-colored wireframe over static geometry.
    Wireframe,
    /// Instanced textured quads.
    Sprite,
    /// Pre-transformed glyph quads sampling a font atlas.
    Text,
}

impl BuiltinProgram {
    /// All built-in programs, in load order.
    pub const ALL: [Self; 3] = [Self::Wireframe, Self::Sprite, Self::Text];
}

/// A program to bind for the next draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Program {
    /// A user shader registered with the resource manager.
    Shader(ShaderId),
    /// One of the renderer's own programs.
    Builtin(BuiltinProgram),
}

/// Vertex layout of a geometry binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexInput {
    /// [`lumen_core::mesh::Vertex`] plus a per-instance object index.
    Static,
    /// [`lumen_core::mesh::SkinnedVertex`] plus a per-instance object index.
    Skinned,
    /// [`crate::text::TextVertex`], no instance stream.
    Text,
}

/// Vertex/index buffers bound for the next draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeometryBinding {
    /// Vertex layout.
    pub input: VertexInput,
    /// Vertex buffer.
    pub vertex_buffer: BufferHandle,
    /// Index buffer (`u32` indices).
    pub index_buffer: BufferHandle,
    /// Per-instance `0..N` buffer feeding the object index attribute.
    pub instance_buffer: Option<BufferHandle>,
}

/// A value for a named program uniform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    /// Scalar float.
    Float(f32),
    /// Scalar int.
    Int(i32),
    /// Three-component vector.
    Vec3(glam::Vec3),
    /// Four-component vector.
    Vec4(glam::Vec4),
    /// Column-major 4x4 matrix.
    Mat4(glam::Mat4),
    /// Bindless texture handle.
    Handle(u64),
}

/// Storage-buffer binding points shared by every renderer program.
pub mod bindings {
    /// Per-object model matrices.
    pub const TRANSFORMS: u32 = 0;
    /// Per-object packed material blobs.
    pub const MATERIALS: u32 = 1;
    /// Per-object entity ids.
    pub const ENTITY_IDS: u32 = 2;
    /// Bone palette of the current skinned batch.
    pub const BONES: u32 = 3;
}

/// GPU backend used by the renderer.
///
/// All methods run on the thread that owns the graphics context. Buffer
/// memory returned by [`GpuBackend::mapped_mut`] is the persistent mapping:
/// writes land in GPU-visible memory without further calls.
pub trait GpuBackend {
    /// Get the backend name.
    fn name(&self) -> &str;

    /// Required alignment, in bytes, for storage-buffer range offsets.
    fn min_storage_buffer_offset_alignment(&self) -> u64;

    /// Create a buffer. Buffers with [`crate::types::BufferUsage::PERSISTENT`]
    /// are mapped for their whole lifetime.
    fn create_buffer(&mut self, descriptor: &BufferDescriptor)
        -> Result<BufferHandle, BackendError>;

    /// Destroy a buffer.
    fn destroy_buffer(&mut self, buffer: BufferHandle);

    /// Upload `data` into `buffer` at byte `offset`.
    fn upload(&mut self, buffer: BufferHandle, offset: u64, data: &[u8])
        -> Result<(), BackendError>;

    /// Get the persistent mapping of a buffer.
    fn mapped_mut(&mut self, buffer: BufferHandle) -> Result<&mut [u8], BackendError>;

    /// Insert a fence after all commands issued so far.
    fn create_fence(&mut self) -> Result<FenceHandle, BackendError>;

    /// Create a fence that starts out signaled.
    fn create_signaled_fence(&mut self) -> Result<FenceHandle, BackendError>;

    /// Wait on a fence from the CPU.
    ///
    /// With `flush` set, pending commands are flushed to the GPU before
    /// waiting. A zero `timeout` is a non-blocking poll.
    fn wait_fence(&mut self, fence: FenceHandle, flush: bool, timeout: Duration) -> FenceWait;

    /// Destroy a fence.
    fn destroy_fence(&mut self, fence: FenceHandle);

    /// Compile and link a built-in program.
    fn load_builtin_program(&mut self, program: BuiltinProgram) -> Result<(), BackendError>;

    /// Bind a program for subsequent draws.
    fn bind_program(&mut self, program: Program);

    /// Set a uniform on the bound program. Unknown names are ignored.
    fn set_uniform(&mut self, name: &str, value: UniformValue);

    /// Bind a byte range of a buffer to a storage-buffer binding point.
    ///
    /// `offset` must be a multiple of
    /// [`GpuBackend::min_storage_buffer_offset_alignment`].
    fn bind_storage_range(&mut self, binding: u32, buffer: BufferHandle, offset: u64, size: u64);

    /// Bind vertex and index buffers.
    fn bind_geometry(&mut self, geometry: &GeometryBinding);

    /// Issue `draw_count` indexed draws whose arguments are read from
    /// `indirect` starting at byte `offset`, `stride` bytes apart.
    fn multi_draw_indexed_indirect(
        &mut self,
        indirect: BufferHandle,
        offset: u64,
        draw_count: u32,
        stride: u32,
    );

    /// Make a bindless texture handle resident.
    fn make_texture_resident(&mut self, handle: u64);
}

impl<B: GpuBackend + ?Sized> GpuBackend for Box<B> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn min_storage_buffer_offset_alignment(&self) -> u64 {
        (**self).min_storage_buffer_offset_alignment()
    }

    fn create_buffer(
        &mut self,
        descriptor: &BufferDescriptor,
    ) -> Result<BufferHandle, BackendError> {
        (**self).create_buffer(descriptor)
    }

    fn destroy_buffer(&mut self, buffer: BufferHandle) {
        (**self).destroy_buffer(buffer)
    }

    fn upload(&mut self, buffer: BufferHandle, offset: u64, data: &[u8]) -> Result<(), BackendError> {
        (**self).upload(buffer, offset, data)
    }

    fn mapped_mut(&mut self, buffer: BufferHandle) -> Result<&mut [u8], BackendError> {
        (**self).mapped_mut(buffer)
    }

    fn create_fence(&mut self) -> Result<FenceHandle, BackendError> {
        (**self).create_fence()
    }

    fn create_signaled_fence(&mut self) -> Result<FenceHandle, BackendError> {
        (**self).create_signaled_fence()
    }

    fn wait_fence(&mut self, fence: FenceHandle, flush: bool, timeout: Duration) -> FenceWait {
        (**self).wait_fence(fence, flush, timeout)
    }

    fn destroy_fence(&mut self, fence: FenceHandle) {
        (**self).destroy_fence(fence)
    }

    fn load_builtin_program(&mut self, program: BuiltinProgram) -> Result<(), BackendError> {
        (**self).load_builtin_program(program)
    }

    fn bind_program(&mut self, program: Program) {
        (**self).bind_program(program)
    }

    fn set_uniform(&mut self, name: &str, value: UniformValue) {
        (**self).set_uniform(name, value)
    }

    fn bind_storage_range(&mut self, binding: u32, buffer: BufferHandle, offset: u64, size: u64) {
        (**self).bind_storage_range(binding, buffer, offset, size)
    }

    fn bind_geometry(&mut self, geometry: &GeometryBinding) {
        (**self).bind_geometry(geometry)
    }

    fn multi_draw_indexed_indirect(
        &mut self,
        indirect: BufferHandle,
        offset: u64,
        draw_count: u32,
        stride: u32,
    ) {
        (**self).multi_draw_indexed_indirect(indirect, offset, draw_count, stride)
    }

    fn make_texture_resident(&mut self, handle: u64) {
        (**self).make_texture_resident(handle)
    }
}
