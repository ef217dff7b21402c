//! Render statistics.

/// Read-only snapshot of renderer usage.
///
/// Geometry usage is cumulative over the renderer's lifetime. Per-frame
/// counters are reset by `begin` and filled in by `render`, so they describe
/// the most recently rendered frame until the next `begin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RenderStats {
    /// Vertices used in the static vertex buffer.
    pub static_vertices_used: u32,
    /// Capacity of the static vertex buffer.
    pub static_vertex_capacity: u32,
    /// Indices used in the static index buffer.
    pub static_indices_used: u32,
    /// Capacity of the static index buffer.
    pub static_index_capacity: u32,
    /// Vertices used in the skinned vertex buffer.
    pub skinned_vertices_used: u32,
    /// Capacity of the skinned vertex buffer.
    pub skinned_vertex_capacity: u32,
    /// Indices used in the skinned index buffer.
    pub skinned_indices_used: u32,
    /// Capacity of the skinned index buffer.
    pub skinned_index_capacity: u32,
    /// Meshes resident in either cache.
    pub cached_meshes: usize,
    /// Objects drawn in the last frame (sub-meshes, sprites and text submissions).
    pub object_count: u32,
    /// Multi-draw calls issued in the last frame.
    pub batch_count: u32,
    /// Glyph quads drawn in the last frame.
    pub character_count: u32,
    /// Indirect commands executed in the last frame.
    pub draw_commands: u32,
    /// Frames started since creation.
    pub frame_index: u64,
}

impl RenderStats {
    /// Fraction of the static vertex buffer in use.
    pub fn static_vertex_usage(&self) -> f32 {
        ratio(self.static_vertices_used, self.static_vertex_capacity)
    }

    /// Fraction of the skinned vertex buffer in use.
    pub fn skinned_vertex_usage(&self) -> f32 {
        ratio(self.skinned_vertices_used, self.skinned_vertex_capacity)
    }

    pub(crate) fn reset_frame(&mut self) {
        self.object_count = 0;
        self.batch_count = 0;
        self.character_count = 0;
        self.draw_commands = 0;
    }
}

fn ratio(used: u32, capacity: u32) -> f32 {
    if capacity == 0 {
        0.0
    } else {
        used as f32 / capacity as f32
    }
}
