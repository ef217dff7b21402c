use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glam::{Mat4, Vec3, Vec4};

use lumen_core::font::{Font, Glyph, GlyphRect};
use lumen_core::material::{Material, MaterialValue};
use lumen_core::mesh::generators::cube;
use lumen_core::shader::{Shader, ShaderLayout, ShaderMemberKind};
use lumen_core::texture::Texture;
use lumen_core::{FontId, MaterialId, ResourceManager};
use lumen_graphics::materials::gpu_layout;
use lumen_graphics::{pack_material, DummyBackend, Renderer, RendererConfig, TextStyle};

struct Resources {
    manager: ResourceManager,
    materials: Vec<MaterialId>,
    font: FontId,
}

fn resources() -> Resources {
    let mut manager = ResourceManager::new();
    let albedo = manager.add_texture(Texture::new(64, 64, 0x1000));
    let atlas = manager.add_texture(Texture::new(512, 512, 0x2000));

    let shader = Shader::new(
        "lit",
        ShaderLayout::new()
            .with_member("roughness", ShaderMemberKind::Float)
            .with_member("albedo", ShaderMemberKind::Color3)
            .with_member("emissive", ShaderMemberKind::Color4)
            .with_member("albedo_map", ShaderMemberKind::Texture),
    );
    let shader_id = manager.add_shader(shader.clone()).unwrap();

    let materials = (0..8)
        .map(|i| {
            let material = Material::new(shader_id, &shader)
                .with_value(&shader, "roughness", MaterialValue::Float(i as f32 / 8.0))
                .unwrap()
                .with_value(&shader, "albedo", MaterialValue::Vec3([1.0, 0.5, 0.25]))
                .unwrap()
                .with_value(&shader, "albedo_map", MaterialValue::Texture(albedo))
                .unwrap();
            manager.add_material(material).unwrap()
        })
        .collect();

    let glyph = Glyph {
        advance: 0.6,
        uv: GlyphRect::new(0.0, 0.0, 0.05, 0.05),
        plane: GlyphRect::new(0.0, -0.2, 0.55, 0.8),
    };
    let font = ('!'..='~').fold(Font::new("mono", atlas, 1.2), |font, c| {
        font.with_glyph(c, glyph)
    });
    let font = manager.add_font(font).unwrap();

    Resources {
        manager,
        materials,
        font,
    }
}

fn renderer() -> Renderer<DummyBackend> {
    Renderer::new(DummyBackend::new(), RendererConfig::default()).unwrap()
}

// ---------------------------------------------------------------------------
// Material packing
// ---------------------------------------------------------------------------

fn bench_pack_material(c: &mut Criterion) {
    let res = resources();
    let material = res.manager.material(res.materials[0]).unwrap();
    let shader = res.manager.shader(material.shader()).unwrap();

    c.bench_function("pack_material_4_members", |b| {
        b.iter(|| {
            let blob = pack_material(material, &shader.layout, |_| Some(0x1000)).unwrap();
            black_box(blob);
        });
    });

    c.bench_function("gpu_layout_4_members", |b| {
        b.iter(|| black_box(gpu_layout(&shader.layout)));
    });
}

// ---------------------------------------------------------------------------
// Full frames
// ---------------------------------------------------------------------------

fn bench_frame_meshes(c: &mut Criterion) {
    let res = resources();
    let mesh = cube(1.0);
    let mut renderer = renderer();
    let transforms: Vec<Mat4> = (0..1000)
        .map(|i| Mat4::from_translation(Vec3::new(i as f32, 0.0, 0.0)))
        .collect();

    c.bench_function("frame_1000_cubes_8_materials", |b| {
        b.iter(|| {
            renderer.begin().unwrap();
            for (i, transform) in transforms.iter().enumerate() {
                let material = res.materials[i % res.materials.len()];
                renderer
                    .submit_mesh(&res.manager, &mesh, &[material], *transform, i as u32)
                    .unwrap();
            }
            renderer.render().unwrap();
            renderer.end().unwrap();
            renderer.backend_mut().clear_records();
        });
    });
}

fn bench_frame_text(c: &mut Criterion) {
    let res = resources();
    let mut renderer = renderer();
    let line = "The quick brown fox jumps over the lazy dog!";
    let style = TextStyle::new(Vec4::ONE).with_shadow(0.05, Vec4::new(0.0, 0.0, 0.0, 1.0));

    c.bench_function("frame_50_text_lines_shadowed", |b| {
        b.iter(|| {
            renderer.begin().unwrap();
            for i in 0..50 {
                let transform = Mat4::from_translation(Vec3::new(0.0, i as f32 * -1.2, 0.0));
                renderer
                    .submit_text(&res.manager, line, res.font, style, transform, i)
                    .unwrap();
            }
            renderer.render().unwrap();
            renderer.end().unwrap();
            renderer.backend_mut().clear_records();
        });
    });
}

fn bench_frame_sprites(c: &mut Criterion) {
    let mut manager = ResourceManager::new();
    let texture = manager.add_texture(Texture::new(16, 16, 0x3000));
    let mut renderer = renderer();

    c.bench_function("frame_2000_sprites", |b| {
        b.iter(|| {
            renderer.begin().unwrap();
            for i in 0..2000u32 {
                let transform = Mat4::from_translation(Vec3::new(i as f32, 0.0, 0.0));
                renderer
                    .submit_sprite(&manager, texture, Vec4::ONE, transform, i)
                    .unwrap();
            }
            renderer.render().unwrap();
            renderer.end().unwrap();
            renderer.backend_mut().clear_records();
        });
    });
}

criterion_group!(
    benches,
    bench_pack_material,
    bench_frame_meshes,
    bench_frame_text,
    bench_frame_sprites,
);
criterion_main!(benches);
