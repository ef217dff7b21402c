//! Triple-buffered persistent streams.
//!
//! Each per-frame data kind lives in one persistently mapped buffer sized
//! for every frame slot. Slot `i` owns bytes
//! `[i * slot_capacity, (i + 1) * slot_capacity)`; the CPU only writes the
//! slot whose fence it has acquired.
//!
//! ```text
//! transforms: [ slot 0 | slot 1 | slot 2 ]
//!                  ▲ CPU writes    ▲ GPU may still read
//! ```

use bytemuck::Pod;

use crate::backend::{BufferHandle, GpuBackend};
use crate::error::GraphicsError;
use crate::resources::{ArenaAllocation, StreamArena};
use crate::types::{BufferDescriptor, BufferUsage};

/// Kinds of per-frame data streamed to the GPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    /// Per-object model matrices.
    Transforms,
    /// Per-object packed material blobs.
    Materials,
    /// Per-object entity ids.
    EntityIds,
    /// Indirect draw commands.
    Commands,
    /// Bone palettes of skinned batches.
    Bones,
    /// Pre-transformed text vertices.
    TextVertices,
}

impl StreamKind {
    /// All kinds, in buffer creation order.
    pub const ALL: [Self; 6] = [
        Self::Transforms,
        Self::Materials,
        Self::EntityIds,
        Self::Commands,
        Self::Bones,
        Self::TextVertices,
    ];

    /// Label used for buffers and errors.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Transforms => "transforms",
            Self::Materials => "materials",
            Self::EntityIds => "entity ids",
            Self::Commands => "draw commands",
            Self::Bones => "bones",
            Self::TextVertices => "text vertices",
        }
    }

    fn usage(&self) -> BufferUsage {
        let usage = match self {
            Self::Commands => BufferUsage::INDIRECT,
            Self::TextVertices => BufferUsage::VERTEX,
            _ => BufferUsage::STORAGE,
        };
        usage | BufferUsage::STREAMING
    }
}

/// One persistent buffer split into equal per-slot regions.
#[derive(Debug)]
pub struct StreamBuffer {
    kind: StreamKind,
    buffer: BufferHandle,
    slot_capacity: u64,
    arena: StreamArena,
}

impl StreamBuffer {
    /// Create the backing buffer for `slots` regions of `slot_capacity` bytes.
    pub fn new<B: GpuBackend + ?Sized>(
        backend: &mut B,
        kind: StreamKind,
        slot_capacity: u64,
        slots: usize,
    ) -> Result<Self, GraphicsError> {
        let size = slot_capacity * slots as u64;
        let descriptor = BufferDescriptor::new(size, kind.usage()).with_label(kind.label());
        let buffer = backend.create_buffer(&descriptor)?;

        log::debug!(
            "Created {} stream: {} slots x {} bytes",
            kind.label(),
            slots,
            slot_capacity
        );

        Ok(Self {
            kind,
            buffer,
            slot_capacity,
            arena: StreamArena::new(kind.label(), 0, slot_capacity),
        })
    }

    /// Stream kind.
    pub fn kind(&self) -> StreamKind {
        self.kind
    }

    /// Backing buffer.
    pub fn buffer(&self) -> BufferHandle {
        self.buffer
    }

    /// Bytes per slot.
    pub fn slot_capacity(&self) -> u64 {
        self.slot_capacity
    }

    /// Absolute byte offset where `slot` starts.
    pub fn slot_base(&self, slot: usize) -> u64 {
        self.slot_capacity * slot as u64
    }

    /// Bytes written into the current slot.
    pub fn used(&self) -> u64 {
        self.arena.used()
    }

    /// Point the write cursor at the start of `slot`.
    pub fn begin_slot(&mut self, slot: usize) {
        self.arena.rebase(self.slot_base(slot));
    }

    /// Append values to the current slot through the persistent mapping.
    pub fn push<B: GpuBackend + ?Sized, T: Pod>(
        &mut self,
        backend: &mut B,
        values: &[T],
        alignment: u64,
    ) -> Result<ArenaAllocation, GraphicsError> {
        let memory = backend.mapped_mut(self.buffer)?;
        self.arena.write_slice(memory, values, alignment)
    }
}

/// Per-slot byte capacities of every stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StreamCapacities {
    /// Transforms bytes per slot.
    pub transforms: u64,
    /// Material bytes per slot.
    pub materials: u64,
    /// Entity id bytes per slot.
    pub entity_ids: u64,
    /// Draw command bytes per slot.
    pub commands: u64,
    /// Bone palette bytes per slot.
    pub bones: u64,
    /// Text vertex bytes per slot.
    pub text_vertices: u64,
}

impl StreamCapacities {
    fn get(&self, kind: StreamKind) -> u64 {
        match kind {
            StreamKind::Transforms => self.transforms,
            StreamKind::Materials => self.materials,
            StreamKind::EntityIds => self.entity_ids,
            StreamKind::Commands => self.commands,
            StreamKind::Bones => self.bones,
            StreamKind::TextVertices => self.text_vertices,
        }
    }
}

/// All per-frame streams.
#[derive(Debug)]
pub struct StreamingStore {
    streams: Vec<StreamBuffer>,
}

impl StreamingStore {
    /// Create one stream buffer per [`StreamKind`].
    pub fn new<B: GpuBackend + ?Sized>(
        backend: &mut B,
        capacities: &StreamCapacities,
        slots: usize,
    ) -> Result<Self, GraphicsError> {
        let streams = StreamKind::ALL
            .iter()
            .map(|&kind| StreamBuffer::new(backend, kind, capacities.get(kind), slots))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { streams })
    }

    /// Get a stream.
    pub fn stream(&self, kind: StreamKind) -> &StreamBuffer {
        &self.streams[Self::index(kind)]
    }

    /// Get a stream mutably.
    pub fn stream_mut(&mut self, kind: StreamKind) -> &mut StreamBuffer {
        &mut self.streams[Self::index(kind)]
    }

    /// Point every stream at `slot`.
    pub fn begin_slot(&mut self, slot: usize) {
        for stream in &mut self.streams {
            stream.begin_slot(slot);
        }
    }

    /// Destroy every backing buffer.
    pub fn destroy<B: GpuBackend + ?Sized>(&mut self, backend: &mut B) {
        for stream in self.streams.drain(..) {
            backend.destroy_buffer(stream.buffer);
        }
    }

    fn index(kind: StreamKind) -> usize {
        match kind {
            StreamKind::Transforms => 0,
            StreamKind::Materials => 1,
            StreamKind::EntityIds => 2,
            StreamKind::Commands => 3,
            StreamKind::Bones => 4,
            StreamKind::TextVertices => 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::DummyBackend;

    fn capacities() -> StreamCapacities {
        StreamCapacities {
            transforms: 1024,
            materials: 512,
            entity_ids: 256,
            commands: 200,
            bones: 512,
            text_vertices: 520,
        }
    }

    #[test]
    fn test_store_creates_triple_sized_buffers() {
        let mut backend = DummyBackend::new();
        let store = StreamingStore::new(&mut backend, &capacities(), 3).unwrap();

        assert_eq!(backend.buffer_count(), 6);
        let transforms = store.stream(StreamKind::Transforms);
        let desc = backend.buffer_descriptor(transforms.buffer()).unwrap();
        assert_eq!(desc.size, 3 * 1024);
        assert!(desc.is_persistent());
        assert!(desc.usage.contains(BufferUsage::STORAGE));

        let commands = store.stream(StreamKind::Commands);
        let desc = backend.buffer_descriptor(commands.buffer()).unwrap();
        assert!(desc.usage.contains(BufferUsage::INDIRECT));
    }

    #[test]
    fn test_slots_do_not_overlap() {
        let mut backend = DummyBackend::new();
        let mut store = StreamingStore::new(&mut backend, &capacities(), 3).unwrap();

        let mut ranges = Vec::new();
        for slot in 0..3 {
            store.begin_slot(slot);
            let stream = store.stream_mut(StreamKind::EntityIds);
            let alloc = stream.push(&mut backend, &[slot as u32; 64], 4).unwrap();
            ranges.push(alloc);
        }

        assert_eq!(ranges[0], ArenaAllocation::new(0, 256));
        assert_eq!(ranges[1], ArenaAllocation::new(256, 256));
        assert_eq!(ranges[2], ArenaAllocation::new(512, 256));

        let buffer = store.stream(StreamKind::EntityIds).buffer();
        let data = backend.buffer_data(buffer).unwrap();
        assert_eq!(&data[256..260], &1u32.to_le_bytes());
        assert_eq!(&data[512..516], &2u32.to_le_bytes());
    }

    #[test]
    fn test_slot_overflow() {
        let mut backend = DummyBackend::new();
        let mut store = StreamingStore::new(&mut backend, &capacities(), 3).unwrap();
        store.begin_slot(0);

        let err = store
            .stream_mut(StreamKind::EntityIds)
            .push(&mut backend, &[0u32; 65], 4)
            .unwrap_err();
        assert!(matches!(
            err,
            GraphicsError::CapacityExceeded {
                resource: "entity ids",
                ..
            }
        ));
    }

    #[test]
    fn test_destroy_releases_buffers() {
        let mut backend = DummyBackend::new();
        let mut store = StreamingStore::new(&mut backend, &capacities(), 3).unwrap();
        store.destroy(&mut backend);
        assert_eq!(backend.buffer_count(), 0);
    }
}
