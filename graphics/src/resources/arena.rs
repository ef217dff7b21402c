//! Linear write arena over one slot of a persistently mapped buffer.
//!
//! Every frame the renderer streams transforms, materials, entity ids, draw
//! commands, bone palettes and text vertices into a region of a persistent
//! buffer that the GPU is guaranteed not to be reading. A [`StreamArena`]
//! tracks the write head inside that region: it only ever moves forward, and
//! [`reset`](StreamArena::reset) (or [`rebase`](StreamArena::rebase) for the
//! next slot) reclaims the whole region at once.
//!
//! Offsets handed out are absolute byte offsets into the backing buffer, so
//! they can be passed straight to storage-range bindings and indirect draws.
//!
//! # Example
//!
//! ```ignore
//! let mut arena = StreamArena::new("transforms", 0, 64 * 1024);
//!
//! let memory = backend.mapped_mut(buffer)?;
//! let alloc = arena.write_slice(memory, &transforms, alignment)?;
//! backend.bind_storage_range(bindings::TRANSFORMS, buffer, alloc.offset, alloc.size);
//!
//! // Next frame on this slot
//! arena.reset();
//! ```

use bytemuck::Pod;

use crate::error::GraphicsError;

/// A region written into a [`StreamArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ArenaAllocation {
    /// Absolute byte offset into the backing buffer.
    pub offset: u64,
    /// Size of the region in bytes.
    pub size: u64,
}

impl ArenaAllocation {
    /// Create a new allocation.
    pub fn new(offset: u64, size: u64) -> Self {
        Self { offset, size }
    }

    /// Get the end offset (offset + size).
    pub fn end(&self) -> u64 {
        self.offset + self.size
    }
}

/// Forward-only write cursor over `[base, base + capacity)` of a buffer.
///
/// # Overflow
///
/// A write that does not fit fails with
/// [`GraphicsError::CapacityExceeded`] and leaves both the head and the
/// memory untouched.
#[derive(Debug, Clone)]
pub struct StreamArena {
    label: &'static str,
    base: u64,
    capacity: u64,
    head: u64,
}

impl StreamArena {
    /// Create an arena over `capacity` bytes starting at `base`.
    pub fn new(label: &'static str, base: u64, capacity: u64) -> Self {
        Self {
            label,
            base,
            capacity,
            head: 0,
        }
    }

    /// Debug label, used in overflow errors.
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Absolute start of the arena's region.
    pub fn base(&self) -> u64 {
        self.base
    }

    /// Size of the arena's region in bytes.
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Bytes used since the last reset, including alignment padding.
    pub fn used(&self) -> u64 {
        self.head
    }

    /// Bytes left before the arena overflows.
    pub fn remaining(&self) -> u64 {
        self.capacity - self.head
    }

    /// Absolute offset of the next byte to be written.
    pub fn head(&self) -> u64 {
        self.base + self.head
    }

    /// Whether a region of `size` bytes at `alignment` fits.
    pub fn can_allocate(&self, size: u64, alignment: u64) -> bool {
        self.aligned_head(alignment) + size <= self.capacity
    }

    /// Reserve `size` bytes at an absolute offset that is a multiple of
    /// `alignment`.
    pub fn allocate(&mut self, size: u64, alignment: u64) -> Result<ArenaAllocation, GraphicsError> {
        let start = self.aligned_head(alignment);
        if start + size > self.capacity {
            return Err(GraphicsError::CapacityExceeded {
                resource: self.label,
                requested: start + size,
                capacity: self.capacity,
            });
        }
        self.head = start + size;
        Ok(ArenaAllocation::new(self.base + start, size))
    }

    /// Copy `bytes` into `memory` (the whole mapped buffer) at the next
    /// position aligned to `alignment`.
    pub fn write_bytes(
        &mut self,
        memory: &mut [u8],
        bytes: &[u8],
        alignment: u64,
    ) -> Result<ArenaAllocation, GraphicsError> {
        let start = self.aligned_head(alignment);
        let end = self.base + start + bytes.len() as u64;
        if end > memory.len() as u64 {
            return Err(GraphicsError::CapacityExceeded {
                resource: self.label,
                requested: end,
                capacity: memory.len() as u64,
            });
        }
        let alloc = self.allocate(bytes.len() as u64, alignment)?;
        memory[alloc.offset as usize..alloc.end() as usize].copy_from_slice(bytes);
        Ok(alloc)
    }

    /// Write a slice of plain-old-data values.
    pub fn write_slice<T: Pod>(
        &mut self,
        memory: &mut [u8],
        values: &[T],
        alignment: u64,
    ) -> Result<ArenaAllocation, GraphicsError> {
        self.write_bytes(memory, bytemuck::cast_slice(values), alignment)
    }

    /// Write a single value aligned to its own size class.
    pub fn write<T: Pod>(&mut self, memory: &mut [u8], value: &T) -> Result<u64, GraphicsError> {
        let alignment = std::mem::align_of::<T>() as u64;
        self.write_bytes(memory, bytemuck::bytes_of(value), alignment)
            .map(|alloc| alloc.offset)
    }

    /// Reclaim the whole region.
    ///
    /// The GPU must be done reading this region, which for per-frame slots
    /// means the slot's fence has been waited on.
    pub fn reset(&mut self) {
        self.head = 0;
    }

    /// Move the arena to a new region start and reset it.
    pub fn rebase(&mut self, base: u64) {
        self.base = base;
        self.head = 0;
    }

    fn aligned_head(&self, alignment: u64) -> u64 {
        // Alignment is absolute: pad relative to the buffer start, not the region.
        align_up(self.base + self.head, alignment) - self.base
    }
}

/// Align a value up to the given alignment.
///
/// Unlike a power-of-two mask this accepts any non-zero alignment, since
/// stride-aligned arenas (e.g. 52-byte text vertices) need it.
#[inline]
pub fn align_up(value: u64, alignment: u64) -> u64 {
    if alignment <= 1 {
        return value;
    }
    value.div_ceil(alignment) * alignment
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arena_allocation() {
        let mut arena = StreamArena::new("test", 0, 1024);

        let alloc1 = arena.allocate(128, 64).unwrap();
        assert_eq!(alloc1.offset, 0);
        assert_eq!(alloc1.size, 128);
        assert_eq!(arena.used(), 128);

        let alloc2 = arena.allocate(100, 64).unwrap();
        assert_eq!(alloc2.offset, 128);

        // 228 aligns up to 256
        let alloc3 = arena.allocate(10, 256).unwrap();
        assert_eq!(alloc3.offset, 256);
        assert_eq!(arena.remaining(), 1024 - 266);
    }

    #[test]
    fn test_arena_alignment_is_absolute() {
        let mut arena = StreamArena::new("test", 1000, 1000);
        let alloc = arena.allocate(4, 256).unwrap();
        assert_eq!(alloc.offset, 1024);
        assert_eq!(alloc.offset % 256, 0);
    }

    #[test]
    fn test_arena_overflow_leaves_head() {
        let mut arena = StreamArena::new("transforms", 0, 512);
        arena.allocate(400, 1).unwrap();

        let err = arena.allocate(200, 64).unwrap_err();
        assert_eq!(
            err,
            GraphicsError::CapacityExceeded {
                resource: "transforms",
                requested: 648,
                capacity: 512,
            }
        );
        assert_eq!(arena.used(), 400);

        // 448 + 64 == capacity fits exactly
        assert_eq!(arena.allocate(64, 64).unwrap().offset, 448);
        assert!(!arena.can_allocate(1, 1));
    }

    #[test]
    fn test_arena_write_slice() {
        let mut memory = vec![0u8; 64];
        let mut arena = StreamArena::new("ids", 32, 32);

        let alloc = arena.write_slice(&mut memory, &[7u32, 9u32], 16).unwrap();
        assert_eq!(alloc, ArenaAllocation::new(32, 8));
        assert_eq!(&memory[32..36], &7u32.to_le_bytes());
        assert_eq!(&memory[36..40], &9u32.to_le_bytes());

        let offset = arena.write(&mut memory, &3u32).unwrap();
        assert_eq!(offset, 40);
    }

    #[test]
    fn test_arena_rebase_and_reset() {
        let mut arena = StreamArena::new("test", 0, 256);
        arena.allocate(100, 1).unwrap();

        arena.reset();
        assert_eq!(arena.used(), 0);
        assert_eq!(arena.head(), 0);

        arena.allocate(100, 1).unwrap();
        arena.rebase(512);
        assert_eq!(arena.head(), 512);
        assert_eq!(arena.allocate(8, 8).unwrap().offset, 512);
    }

    #[test]
    fn test_zero_sized_write() {
        let mut memory = vec![0u8; 16];
        let mut arena = StreamArena::new("test", 0, 16);
        let alloc = arena.write_slice::<u32>(&mut memory, &[], 4).unwrap();
        assert_eq!(alloc.size, 0);
        assert_eq!(arena.used(), 0);
    }

    #[test]
    fn test_align_up() {
        assert_eq!(align_up(0, 256), 0);
        assert_eq!(align_up(1, 256), 256);
        assert_eq!(align_up(256, 256), 256);
        assert_eq!(align_up(100, 52), 104);
        assert_eq!(align_up(7, 0), 7);
    }
}
