//! Material data packing.
//!
//! Materials are stored CPU-side as a tightly packed raw blob described by a
//! shader layout. Shaders read them from a storage buffer with std430-style
//! alignment, so every submission repacks the raw blob into GPU layout:
//!
//! - [`pack_material`] - Repack one material, resolving textures to bindless handles
//! - [`MaterialBlob`] - Fixed-capacity packed output
//! - [`gpu_layout`] - Packed offsets and size for a layout, without data

mod packing;

pub use packing::{
    gpu_layout, member_gpu_layout, pack_material, GpuLayout, MaterialBlob,
    MATERIAL_BLOB_CAPACITY,
};
