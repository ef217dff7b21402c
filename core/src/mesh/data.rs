//! CPU-side mesh data structures.
//!
//! This module provides:
//! - [`MeshId`] - Stable identity of a mesh, used as the renderer's cache key
//! - [`Vertex`] / [`SkinnedVertex`] - The two vertex layouts the renderer streams
//! - [`SubMesh`] - One vertex list plus one local index list
//! - [`Mesh`] / [`SkinnedMesh`] - An identity plus an ordered list of sub-meshes

use bytemuck::{Pod, Zeroable};
use uuid::Uuid;

/// Stable identity of a mesh.
///
/// Two meshes with the same id are assumed to hold identical geometry. The
/// renderer uploads geometry once per id and reuses the uploaded region for
/// every later submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(Uuid);

impl MeshId {
    /// Generate a new random mesh id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID (e.g. one read from an asset file).
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the underlying UUID.
    pub fn uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for MeshId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MeshId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Static mesh vertex (position + normal + uv + tangent).
///
/// # Memory Layout
///
/// - Total size: 48 bytes
/// - Alignment: 4 bytes
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct Vertex {
    /// Object-space position.
    pub position: [f32; 3],
    /// Object-space normal.
    pub normal: [f32; 3],
    /// Texture coordinates.
    pub uv: [f32; 2],
    /// Tangent with handedness in `w`.
    pub tangent: [f32; 4],
}

impl Vertex {
    /// Create a vertex with position, normal and uv. The tangent is left zeroed.
    pub fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
            tangent: [0.0; 4],
        }
    }
}

/// Skinned mesh vertex: a [`Vertex`] plus four bone influences.
///
/// Bone indices address the bone palette submitted alongside the mesh.
///
/// # Memory Layout
///
/// - Total size: 80 bytes
/// - Alignment: 4 bytes
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct SkinnedVertex {
    /// Object-space position.
    pub position: [f32; 3],
    /// Object-space normal.
    pub normal: [f32; 3],
    /// Texture coordinates.
    pub uv: [f32; 2],
    /// Tangent with handedness in `w`.
    pub tangent: [f32; 4],
    /// Indices into the bone palette.
    pub bone_ids: [u32; 4],
    /// Weights for each bone influence, expected to sum to one.
    pub bone_weights: [f32; 4],
}

/// One drawable part of a mesh.
///
/// Index values are local to this sub-mesh: index `0` refers to the first
/// vertex of `vertices`, regardless of where the sub-mesh ends up in a
/// shared GPU buffer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SubMesh<V> {
    /// Vertex data.
    pub vertices: Vec<V>,
    /// Triangle-list indices into `vertices`.
    pub indices: Vec<u32>,
}

impl<V> SubMesh<V> {
    /// Create a sub-mesh from vertex and index lists.
    pub fn new(vertices: Vec<V>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> u32 {
        self.vertices.len() as u32
    }

    /// Number of indices.
    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }
}

/// A mesh with a stable identity and an ordered list of sub-meshes.
///
/// The renderer caches geometry per [`MeshId`], so replacing the sub-mesh
/// data of a mesh without giving it a new id has no effect on the GPU copy.
#[derive(Debug, Clone, PartialEq)]
pub struct GenericMesh<V> {
    id: MeshId,
    label: Option<String>,
    sub_meshes: Vec<SubMesh<V>>,
}

/// Static mesh.
pub type Mesh = GenericMesh<Vertex>;

/// Skinned mesh.
pub type SkinnedMesh = GenericMesh<SkinnedVertex>;

impl<V> GenericMesh<V> {
    /// Create a mesh with a fresh identity.
    pub fn new(sub_meshes: Vec<SubMesh<V>>) -> Self {
        Self::with_id(MeshId::new(), sub_meshes)
    }

    /// Create a mesh with an explicit identity.
    pub fn with_id(id: MeshId, sub_meshes: Vec<SubMesh<V>>) -> Self {
        Self {
            id,
            label: None,
            sub_meshes,
        }
    }

    /// Set a debug label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Get the mesh identity.
    pub fn id(&self) -> MeshId {
        self.id
    }

    /// Get the debug label, if set.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Get the sub-meshes in draw order.
    pub fn sub_meshes(&self) -> &[SubMesh<V>] {
        &self.sub_meshes
    }

    /// Total vertex count across all sub-meshes.
    pub fn vertex_count(&self) -> u32 {
        self.sub_meshes.iter().map(SubMesh::vertex_count).sum()
    }

    /// Total index count across all sub-meshes.
    pub fn index_count(&self) -> u32 {
        self.sub_meshes.iter().map(SubMesh::index_count).sum()
    }
}

static_assertions::const_assert_eq!(std::mem::size_of::<Vertex>(), 48);
static_assertions::const_assert_eq!(std::mem::size_of::<SkinnedVertex>(), 80);
