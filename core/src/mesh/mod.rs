//! CPU-side mesh types and generators.
//!
//! - [`Mesh`] / [`SkinnedMesh`] - Identity plus sub-mesh geometry
//! - [`Vertex`] / [`SkinnedVertex`] - Vertex layouts streamed to the GPU
//! - Generators for common shapes (unit quad, cube)

mod data;
pub mod generators;

pub use data::{GenericMesh, Mesh, MeshId, SkinnedMesh, SkinnedVertex, SubMesh, Vertex};
