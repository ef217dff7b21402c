//! Common types and descriptors for GPU buffers and draw commands.

mod buffer;

pub use buffer::{BufferDescriptor, BufferUsage, DrawIndexedIndirectArgs};
