//! Buffer types and descriptors.

use bitflags::bitflags;
use bytemuck::{Pod, Zeroable};

bitflags! {
    /// Usage flags for buffers.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BufferUsage: u32 {
        /// Buffer can be used as a vertex buffer.
        const VERTEX = 1 << 0;
        /// Buffer can be used as an index buffer.
        const INDEX = 1 << 1;
        /// Buffer can be used as a uniform buffer.
        const UNIFORM = 1 << 2;
        /// Buffer can be used as a storage buffer.
        const STORAGE = 1 << 3;
        /// Buffer can be used as an indirect buffer.
        const INDIRECT = 1 << 4;
        /// Buffer can be written with sub-range uploads.
        const COPY_DST = 1 << 5;
        /// Buffer is mappable for CPU write.
        const MAP_WRITE = 1 << 6;
        /// Mapping stays valid for the buffer's whole lifetime.
        const PERSISTENT = 1 << 7;
        /// CPU writes become visible to the GPU without explicit flushes.
        const COHERENT = 1 << 8;
    }
}

impl BufferUsage {
    /// Flags for a persistently mapped, write-combined streaming buffer.
    pub const STREAMING: Self = Self::MAP_WRITE
        .union(Self::PERSISTENT)
        .union(Self::COHERENT);
}

impl Default for BufferUsage {
    fn default() -> Self {
        Self::empty()
    }
}

/// Descriptor for creating a buffer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct BufferDescriptor {
    /// Debug label for the buffer.
    pub label: Option<String>,
    /// Size in bytes.
    pub size: u64,
    /// Usage flags.
    pub usage: BufferUsage,
}

impl BufferDescriptor {
    /// Create a new buffer descriptor.
    pub fn new(size: u64, usage: BufferUsage) -> Self {
        Self {
            label: None,
            size,
            usage,
        }
    }

    /// Set the debug label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Whether the buffer is persistently mapped.
    pub fn is_persistent(&self) -> bool {
        self.usage.contains(BufferUsage::PERSISTENT)
    }
}

// ============================================================================
// Indirect Drawing Arguments
// ============================================================================

/// Arguments for one indexed indirect draw.
///
/// Matches the GPU layout consumed by `glMultiDrawElementsIndirect` /
/// `vkCmdDrawIndexedIndirect`. One multi-draw call reads a tightly packed
/// array of these.
///
/// # Memory Layout
///
/// - Total size: 20 bytes
/// - Alignment: 4 bytes
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Pod, Zeroable)]
pub struct DrawIndexedIndirectArgs {
    /// Number of indices to draw.
    pub index_count: u32,
    /// Number of instances to draw.
    pub instance_count: u32,
    /// Index of the first index to draw.
    pub first_index: u32,
    /// Value added to each index before reading from the vertex buffer.
    pub base_vertex: i32,
    /// Instance ID of the first instance to draw.
    pub base_instance: u32,
}

impl DrawIndexedIndirectArgs {
    /// Size of the struct in bytes.
    pub const SIZE: u64 = std::mem::size_of::<Self>() as u64;

    /// Create new indexed indirect draw arguments.
    pub fn new(index_count: u32, instance_count: u32) -> Self {
        Self {
            index_count,
            instance_count,
            first_index: 0,
            base_vertex: 0,
            base_instance: 0,
        }
    }

    /// Set the first index.
    pub fn with_first_index(mut self, first_index: u32) -> Self {
        self.first_index = first_index;
        self
    }

    /// Set the base vertex offset.
    pub fn with_base_vertex(mut self, base_vertex: i32) -> Self {
        self.base_vertex = base_vertex;
        self
    }

    /// Set the first instance index.
    pub fn with_base_instance(mut self, base_instance: u32) -> Self {
        self.base_instance = base_instance;
        self
    }
}

static_assertions::const_assert_eq!(DrawIndexedIndirectArgs::SIZE, 20);
