//! Common utilities for renderer integration tests.
//!
//! Builds a small renderer over the [`DummyBackend`] and a resource set with
//! one lit shader, a couple of materials, textures and a tiny font.

#![allow(dead_code)]

use glam::{Mat4, Vec4};
use lumen_core::font::{Font, Glyph, GlyphRect};
use lumen_core::material::{Material, MaterialValue};
use lumen_core::mesh::{Mesh, SkinnedMesh, SkinnedVertex, SubMesh, Vertex};
use lumen_core::shader::{Shader, ShaderLayout, ShaderMemberKind};
use lumen_core::texture::Texture;
use lumen_core::{FontId, MaterialId, ResourceManager, ShaderId, TextureId};
use lumen_graphics::backend::{BufferHandle, DrawRecord};
use lumen_graphics::{DummyBackend, Renderer, RendererConfig};

/// Bindless handle of the albedo texture.
pub const ALBEDO_HANDLE: u64 = 0xABCD;
/// Bindless handle of the font atlas.
pub const ATLAS_HANDLE: u64 = 0x1_0000_0042;
/// Bindless handle of the sprite texture.
pub const SPRITE_HANDLE: u64 = 0x77;

/// Route `log` output through env_logger for the test harness.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Renderer limits small enough to hit in a test.
pub fn small_config() -> RendererConfig {
    RendererConfig::default()
        .with_static_capacity(4096, 16384)
        .with_skinned_capacity(1024, 4096)
        .with_max_objects(64)
        .with_max_characters(64)
        .with_max_bones(32)
}

/// Renderer over a default dummy backend.
pub fn renderer() -> Renderer<DummyBackend> {
    init_logging();
    Renderer::new(DummyBackend::new(), small_config()).expect("renderer init")
}

/// Renderer over a dummy backend with a custom storage alignment.
pub fn renderer_with_alignment(alignment: u64) -> Renderer<DummyBackend> {
    init_logging();
    let backend = DummyBackend::new().with_storage_alignment(alignment);
    Renderer::new(backend, small_config()).expect("renderer init")
}

/// Registered resources and their ids.
pub struct Scene {
    pub resources: ResourceManager,
    pub lit: ShaderId,
    pub unlit: ShaderId,
    pub red: MaterialId,
    pub blue: MaterialId,
    pub flat: MaterialId,
    pub albedo: TextureId,
    pub sprite: TextureId,
    pub font: FontId,
}

/// Register the shared test resources.
pub fn scene() -> Scene {
    let mut resources = ResourceManager::new();

    let albedo = resources.add_texture(Texture::new(64, 64, ALBEDO_HANDLE).with_label("albedo"));
    let sprite = resources.add_texture(Texture::new(32, 32, SPRITE_HANDLE).with_label("sprite"));
    let atlas = resources.add_texture(Texture::new(256, 256, ATLAS_HANDLE).with_label("atlas"));

    let lit = resources
        .add_shader(Shader::new(
            "lit",
            ShaderLayout::new()
                .with_member("roughness", ShaderMemberKind::Float)
                .with_member("albedo", ShaderMemberKind::Color3)
                .with_member("albedo_map", ShaderMemberKind::Texture),
        ))
        .unwrap();
    let unlit = resources
        .add_shader(Shader::new(
            "unlit",
            ShaderLayout::new().with_member("tint", ShaderMemberKind::Color4),
        ))
        .unwrap();

    let red = lit_material(&mut resources, lit, albedo, [1.0, 0.0, 0.0]);
    let blue = lit_material(&mut resources, lit, albedo, [0.0, 0.0, 1.0]);

    let unlit_shader = resources.shader(unlit).unwrap().clone();
    let flat = resources
        .add_material(
            Material::new(unlit, &unlit_shader)
                .with_value(&unlit_shader, "tint", MaterialValue::Vec4([0.5; 4]))
                .unwrap(),
        )
        .unwrap();

    let font = resources.add_font(test_font(atlas)).unwrap();

    Scene {
        resources,
        lit,
        unlit,
        red,
        blue,
        flat,
        albedo,
        sprite,
        font,
    }
}

fn lit_material(
    resources: &mut ResourceManager,
    shader_id: ShaderId,
    albedo: TextureId,
    color: [f32; 3],
) -> MaterialId {
    let shader = resources.shader(shader_id).unwrap().clone();
    let material = Material::new(shader_id, &shader)
        .with_value(&shader, "roughness", MaterialValue::Float(0.5))
        .unwrap()
        .with_value(&shader, "albedo", MaterialValue::Vec3(color))
        .unwrap()
        .with_value(&shader, "albedo_map", MaterialValue::Texture(albedo))
        .unwrap();
    resources.add_material(material).unwrap()
}

/// Font with `A`, `B`, `?` and an empty-plane space.
pub fn test_font(atlas: TextureId) -> Font {
    let glyph = |advance: f32| Glyph {
        advance,
        uv: GlyphRect::new(0.0, 0.0, 0.1, 0.1),
        plane: GlyphRect::new(0.0, 0.0, advance, 1.0),
    };
    Font::new("test", atlas, 16.0)
        .with_glyph('A', glyph(10.0))
        .with_glyph('B', glyph(8.0))
        .with_glyph('?', glyph(6.0))
        .with_glyph(
            ' ',
            Glyph {
                advance: 4.0,
                ..Default::default()
            },
        )
        .with_kerning('A', 'B', -1.0)
}

/// A quad sub-mesh with local indices.
pub fn quad_sub_mesh() -> SubMesh<Vertex> {
    let n = [0.0, 0.0, 1.0];
    SubMesh::new(
        vec![
            Vertex::new([0.0, 0.0, 0.0], n, [0.0, 0.0]),
            Vertex::new([1.0, 0.0, 0.0], n, [1.0, 0.0]),
            Vertex::new([1.0, 1.0, 0.0], n, [1.0, 1.0]),
            Vertex::new([0.0, 1.0, 0.0], n, [0.0, 1.0]),
        ],
        vec![0, 1, 2, 2, 3, 0],
    )
}

/// A static mesh with `sub_meshes` quads.
pub fn quad_mesh(sub_meshes: usize) -> Mesh {
    Mesh::new((0..sub_meshes).map(|_| quad_sub_mesh()).collect())
}

/// A single-triangle skinned mesh bound to bone 0.
pub fn skinned_triangle() -> SkinnedMesh {
    let vertex = |x: f32, y: f32| SkinnedVertex {
        position: [x, y, 0.0],
        normal: [0.0, 0.0, 1.0],
        bone_ids: [0, 0, 0, 0],
        bone_weights: [1.0, 0.0, 0.0, 0.0],
        ..Default::default()
    };
    SkinnedMesh::new(vec![SubMesh::new(
        vec![vertex(0.0, 0.0), vertex(1.0, 0.0), vertex(0.0, 1.0)],
        vec![0, 1, 2],
    )])
}

/// Opaque white.
pub fn white() -> Vec4 {
    Vec4::ONE
}

/// Translation along X.
pub fn at(x: f32) -> Mat4 {
    Mat4::from_translation(glam::Vec3::new(x, 0.0, 0.0))
}

/// Read `count` values of `T` from a buffer at `offset`.
pub fn read_buffer<T: bytemuck::Pod>(
    backend: &DummyBackend,
    buffer: BufferHandle,
    offset: u64,
    count: usize,
) -> Vec<T> {
    let data = backend.buffer_data(buffer).expect("buffer exists");
    let start = offset as usize;
    let size = std::mem::size_of::<T>();
    data[start..start + count * size]
        .chunks_exact(size)
        .map(bytemuck::pod_read_unaligned)
        .collect()
}

/// Byte range `(buffer, offset, size)` a draw had bound at `binding`.
pub fn bound_range(draw: &DrawRecord, binding: u32) -> (BufferHandle, u64, u64) {
    *draw.storage.get(&binding).expect("binding was bound")
}

/// Run one full frame with `submit` between `begin` and `render`.
pub fn frame(
    renderer: &mut Renderer<DummyBackend>,
    submit: impl FnOnce(&mut Renderer<DummyBackend>),
) {
    renderer.begin().expect("begin");
    submit(renderer);
    renderer.render().expect("render");
    renderer.end().expect("end");
}
