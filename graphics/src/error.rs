//! Graphics error types.

use thiserror::Error;

use crate::backend::BackendError;

/// Errors that can occur in the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphicsError {
    /// A frame lifecycle call arrived in the wrong state.
    #[error("invalid renderer state: {operation} requires {expected}, renderer is {actual}")]
    InvalidState {
        /// The call that was rejected.
        operation: &'static str,
        /// State the call requires.
        expected: &'static str,
        /// State the renderer was in.
        actual: &'static str,
    },
    /// A fixed-capacity buffer would overflow. Nothing was written.
    #[error("{resource} capacity exceeded: {requested} requested, capacity {capacity}")]
    CapacityExceeded {
        /// Which resource overflowed.
        resource: &'static str,
        /// Size the operation needed (in the resource's own units).
        requested: u64,
        /// Fixed capacity of the resource.
        capacity: u64,
    },
    /// An invalid parameter was provided.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    /// A submission referenced a resource the manager does not know.
    #[error("unknown resource: {0}")]
    UnknownResource(String),
    /// A material could not be packed for its shader.
    #[error("material packing failed: {0}")]
    MaterialPacking(#[from] PackError),
    /// The backend reported an error.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Errors raised while packing a material blob.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PackError {
    /// The packed blob would exceed its fixed capacity.
    #[error("packed material needs {required} bytes, capacity is {capacity}")]
    BlobOverflow {
        /// Bytes needed.
        required: usize,
        /// Fixed blob capacity.
        capacity: usize,
    },
    /// A member's raw bytes lie outside the material's data.
    #[error("member `{member}` lies outside the material data")]
    MemberOutOfRange {
        /// Member name.
        member: String,
    },
    /// A texture member could not be resolved to a bindless handle.
    #[error("member `{member}` references unresolved texture {texture}")]
    UnresolvedTexture {
        /// Member name.
        member: String,
        /// Texture id stored in the material.
        texture: u32,
    },
}
