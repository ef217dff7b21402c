//! Mesh generators for common shapes.
//!
//! The renderer registers [`unit_quad`] once at init and instances it for
//! every sprite.

use super::data::{Mesh, MeshId, SubMesh, Vertex};

/// Generate a single-sub-mesh quad of side 1 centred on the origin, facing +Z.
///
/// Vertex order is bottom-left, bottom-right, top-right, top-left, with two
/// counter-clockwise triangles.
pub fn unit_quad_sub_mesh() -> SubMesh<Vertex> {
    let normal = [0.0, 0.0, 1.0];
    SubMesh::new(
        vec![
            Vertex::new([-0.5, -0.5, 0.0], normal, [0.0, 1.0]),
            Vertex::new([0.5, -0.5, 0.0], normal, [1.0, 1.0]),
            Vertex::new([0.5, 0.5, 0.0], normal, [1.0, 0.0]),
            Vertex::new([-0.5, 0.5, 0.0], normal, [0.0, 0.0]),
        ],
        vec![0, 1, 2, 2, 3, 0],
    )
}

/// Generate a unit quad mesh with the given identity.
pub fn unit_quad(id: MeshId) -> Mesh {
    Mesh::with_id(id, vec![unit_quad_sub_mesh()]).with_label("unit_quad")
}

/// Generate an axis-aligned cube with side `size`, one sub-mesh, 24 vertices.
pub fn cube(size: f32) -> Mesh {
    let h = size * 0.5;
    // (normal, u axis, v axis) per face
    let faces: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
        ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
        ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
        ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
        ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
    ];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);

    for (normal, u, v) in faces {
        let base = vertices.len() as u32;
        for (su, sv, uv) in [
            (-1.0, -1.0, [0.0, 1.0]),
            (1.0, -1.0, [1.0, 1.0]),
            (1.0, 1.0, [1.0, 0.0]),
            (-1.0, 1.0, [0.0, 0.0]),
        ] {
            let position = [
                (normal[0] + u[0] * su + v[0] * sv) * h,
                (normal[1] + u[1] * su + v[1] * sv) * h,
                (normal[2] + u[2] * su + v[2] * sv) * h,
            ];
            vertices.push(Vertex::new(position, normal, uv));
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }

    Mesh::new(vec![SubMesh::new(vertices, indices)]).with_label("cube")
}
