//! Backend error types.

use thiserror::Error;

/// Errors that can occur in backend operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// Failed to initialize the backend.
    #[error("backend initialization failed: {0}")]
    InitializationFailed(String),
    /// Failed to create a resource.
    #[error("resource creation failed: {0}")]
    ResourceCreationFailed(String),
    /// A buffer handle does not name a live buffer.
    #[error("unknown buffer {0:?}")]
    UnknownBuffer(super::BufferHandle),
    /// The buffer has no persistent CPU mapping.
    #[error("buffer {0:?} is not persistently mapped")]
    NotMapped(super::BufferHandle),
    /// A write fell outside the buffer's bounds.
    #[error("write of {size} bytes at offset {offset} exceeds buffer size {buffer_size}")]
    OutOfBounds {
        /// Write offset in bytes.
        offset: u64,
        /// Write size in bytes.
        size: u64,
        /// Size of the target buffer.
        buffer_size: u64,
    },
    /// Out of GPU memory.
    #[error("out of GPU memory")]
    OutOfMemory,
    /// The device was lost.
    #[error("GPU device lost")]
    DeviceLost,
    /// Internal backend error.
    #[error("internal backend error: {0}")]
    Internal(String),
}
