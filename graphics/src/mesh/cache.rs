//! Upload-once mesh cache.
//!
//! All geometry of one vertex layout shares a single vertex buffer and a
//! single index buffer, each allocated at full capacity when the cache is
//! created. The first submission of a mesh appends its sub-meshes to both
//! buffers and records a [`CacheEntry`] per sub-mesh; later submissions of
//! the same [`MeshId`] reuse those entries without touching the GPU.
//!
//! Nothing is ever evicted, so offsets stay valid for the renderer's
//! lifetime.

use std::collections::HashMap;
use std::marker::PhantomData;

use bytemuck::Pod;
use lumen_core::mesh::{GenericMesh, MeshId};

use crate::backend::{BufferHandle, GpuBackend};
use crate::error::GraphicsError;
use crate::types::{BufferDescriptor, BufferUsage, DrawIndexedIndirectArgs};

/// Location of one uploaded sub-mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheEntry {
    /// First vertex of the sub-mesh in the shared vertex buffer.
    pub base_vertex: u32,
    /// Number of vertices.
    pub vertex_count: u32,
    /// First index of the sub-mesh in the shared index buffer.
    pub first_index: u32,
    /// Number of indices.
    pub index_count: u32,
}

impl CacheEntry {
    /// Indirect draw command for `instance_count` instances of this sub-mesh,
    /// starting at per-object index `base_instance`.
    pub fn draw_command(
        &self,
        instance_count: u32,
        base_instance: u32,
    ) -> DrawIndexedIndirectArgs {
        DrawIndexedIndirectArgs::new(self.index_count, instance_count)
            .with_first_index(self.first_index)
            .with_base_vertex(self.base_vertex as i32)
            .with_base_instance(base_instance)
    }
}

/// Geometry cache for one vertex type.
#[derive(Debug)]
pub struct MeshCache<V> {
    label: &'static str,
    vertex_buffer: BufferHandle,
    index_buffer: BufferHandle,
    max_vertices: u32,
    max_indices: u32,
    next_vertex: u32,
    next_index: u32,
    entries: HashMap<MeshId, Vec<CacheEntry>>,
    upload_count: u64,
    _vertex: PhantomData<V>,
}

impl<V: Pod> MeshCache<V> {
    /// Create the shared vertex and index buffers at full capacity.
    pub fn new<B: GpuBackend + ?Sized>(
        backend: &mut B,
        label: &'static str,
        max_vertices: u32,
        max_indices: u32,
    ) -> Result<Self, GraphicsError> {
        let vertex_size = u64::from(max_vertices) * std::mem::size_of::<V>() as u64;
        let index_size = u64::from(max_indices) * std::mem::size_of::<u32>() as u64;

        let vertex_buffer = backend.create_buffer(
            &BufferDescriptor::new(vertex_size, BufferUsage::VERTEX | BufferUsage::COPY_DST)
                .with_label(format!("{label} vertices")),
        )?;
        let index_buffer = backend.create_buffer(
            &BufferDescriptor::new(index_size, BufferUsage::INDEX | BufferUsage::COPY_DST)
                .with_label(format!("{label} indices")),
        )?;

        log::debug!(
            "Created {} mesh cache: {} vertices, {} indices",
            label,
            max_vertices,
            max_indices
        );

        Ok(Self {
            label,
            vertex_buffer,
            index_buffer,
            max_vertices,
            max_indices,
            next_vertex: 0,
            next_index: 0,
            entries: HashMap::new(),
            upload_count: 0,
            _vertex: PhantomData,
        })
    }

    /// Return the entries of `mesh`, uploading it first if this is the
    /// first time its id is seen.
    ///
    /// Capacity is checked for the whole mesh before anything is written, so
    /// an overflowing mesh leaves the cache unchanged.
    pub fn ensure_uploaded<B: GpuBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        mesh: &GenericMesh<V>,
    ) -> Result<&[CacheEntry], GraphicsError> {
        let id = mesh.id();
        if !self.entries.contains_key(&id) {
            let entries = self.upload(backend, mesh)?;
            self.entries.insert(id, entries);
        }
        Ok(self.entries.get(&id).map(Vec::as_slice).unwrap_or_default())
    }

    /// Entries of an already uploaded mesh.
    pub fn get(&self, id: MeshId) -> Option<&[CacheEntry]> {
        self.entries.get(&id).map(Vec::as_slice)
    }

    /// Whether a mesh has been uploaded.
    pub fn contains(&self, id: MeshId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Number of cached meshes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no meshes.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of meshes uploaded so far.
    pub fn upload_count(&self) -> u64 {
        self.upload_count
    }

    /// Vertices used.
    pub fn vertices_used(&self) -> u32 {
        self.next_vertex
    }

    /// Indices used.
    pub fn indices_used(&self) -> u32 {
        self.next_index
    }

    /// Vertex capacity.
    pub fn max_vertices(&self) -> u32 {
        self.max_vertices
    }

    /// Index capacity.
    pub fn max_indices(&self) -> u32 {
        self.max_indices
    }

    /// Shared vertex buffer.
    pub fn vertex_buffer(&self) -> BufferHandle {
        self.vertex_buffer
    }

    /// Shared index buffer.
    pub fn index_buffer(&self) -> BufferHandle {
        self.index_buffer
    }

    /// Destroy both buffers and forget every entry.
    pub fn destroy<B: GpuBackend + ?Sized>(&mut self, backend: &mut B) {
        backend.destroy_buffer(self.vertex_buffer);
        backend.destroy_buffer(self.index_buffer);
        self.entries.clear();
    }

    fn upload<B: GpuBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        mesh: &GenericMesh<V>,
    ) -> Result<Vec<CacheEntry>, GraphicsError> {
        let vertex_end = u64::from(self.next_vertex) + u64::from(mesh.vertex_count());
        if vertex_end > u64::from(self.max_vertices) {
            return Err(GraphicsError::CapacityExceeded {
                resource: self.label,
                requested: vertex_end,
                capacity: u64::from(self.max_vertices),
            });
        }
        let index_end = u64::from(self.next_index) + u64::from(mesh.index_count());
        if index_end > u64::from(self.max_indices) {
            return Err(GraphicsError::CapacityExceeded {
                resource: self.label,
                requested: index_end,
                capacity: u64::from(self.max_indices),
            });
        }

        let mut vertices: Vec<u8> = Vec::new();
        let mut indices: Vec<u8> = Vec::new();
        let mut entries = Vec::with_capacity(mesh.sub_meshes().len());
        let mut base_vertex = self.next_vertex;
        let mut first_index = self.next_index;

        for sub_mesh in mesh.sub_meshes() {
            let entry = CacheEntry {
                base_vertex,
                vertex_count: sub_mesh.vertex_count(),
                first_index,
                index_count: sub_mesh.index_count(),
            };
            vertices.extend_from_slice(bytemuck::cast_slice(&sub_mesh.vertices));
            indices.extend_from_slice(bytemuck::cast_slice(&sub_mesh.indices));
            base_vertex += entry.vertex_count;
            first_index += entry.index_count;
            entries.push(entry);
        }

        let vertex_offset = u64::from(self.next_vertex) * std::mem::size_of::<V>() as u64;
        let index_offset = u64::from(self.next_index) * std::mem::size_of::<u32>() as u64;
        if !vertices.is_empty() {
            backend.upload(self.vertex_buffer, vertex_offset, &vertices)?;
        }
        if !indices.is_empty() {
            backend.upload(self.index_buffer, index_offset, &indices)?;
        }

        self.next_vertex = base_vertex;
        self.next_index = first_index;
        self.upload_count += 1;

        log::trace!(
            "Uploaded mesh {} to {} cache ({} sub-meshes, {} vertices, {} indices)",
            mesh.id(),
            self.label,
            entries.len(),
            mesh.vertex_count(),
            mesh.index_count()
        );

        Ok(entries)
    }
}
