//! Integration tests for the renderer frame lifecycle.
//!
//! Every test drives a [`Renderer`] over the [`DummyBackend`], which keeps
//! real buffer contents and records each multi-draw together with the state
//! it was issued under. Assertions read the streamed data back from the
//! backend's memory.
//!
//! # Test Categories
//!
//! - **Submission**: single mesh end to end, batching by shader, skinning, sprites, text
//! - **Caching**: geometry is uploaded once per mesh identity
//! - **Streaming**: slot rotation, fence waits, storage alignment
//! - **Errors**: lifecycle order, capacity limits, unknown resources

mod common;

use glam::{Mat4, Vec4};
use rstest::rstest;

use common::{
    at, bound_range, frame, quad_mesh, read_buffer, renderer, renderer_with_alignment, scene,
    skinned_triangle, white, ALBEDO_HANDLE, ATLAS_HANDLE, SPRITE_HANDLE,
};
use lumen_core::material::Material;
use lumen_core::mesh::generators::cube;
use lumen_core::mesh::{Mesh, SubMesh, Vertex};
use lumen_core::shader::{Shader, ShaderLayout};
use lumen_core::texture::HdrCubemap;
use lumen_core::MaterialId;
use lumen_graphics::backend::{bindings, BuiltinProgram, FenceWait, Program, UniformValue};
use lumen_graphics::scene::uniforms;
use lumen_graphics::text::TextVertex;
use lumen_graphics::{
    DrawIndexedIndirectArgs, FenceMode, FrameState, GraphicsError, SkeletonId, SlotAcquire,
    StreamKind, TextStyle,
};

// ============================================================================
// Submission
// ============================================================================

/// One mesh with one sub-mesh ends up as one draw with one instance, and its
/// entity id lands at the start of the slot's entity id region.
#[test]
fn test_single_mesh_end_to_end() {
    let scene = scene();
    let mut renderer = renderer();
    let mesh = quad_mesh(1);

    frame(&mut renderer, |r| {
        r.submit_mesh(&scene.resources, &mesh, &[scene.red], Mat4::IDENTITY, 7)
            .unwrap();
    });

    let backend = renderer.backend();
    assert_eq!(backend.draws().len(), 1);
    let draw = &backend.draws()[0];
    assert_eq!(draw.program, Some(Program::Shader(scene.lit)));
    assert_eq!(draw.instance_total(), 1);

    // The unit quad registered at init occupies the first 4 vertices / 6 indices.
    assert_eq!(
        draw.commands,
        vec![DrawIndexedIndirectArgs::new(6, 1)
            .with_first_index(6)
            .with_base_vertex(4)
            .with_base_instance(0)]
    );

    let (ids, offset, size) = bound_range(draw, bindings::ENTITY_IDS);
    assert_eq!(renderer.stream_slot(StreamKind::EntityIds, 0), (ids, offset));
    assert_eq!(size, 4);
    assert_eq!(read_buffer::<u32>(backend, ids, offset, 1), vec![7]);

    let (transforms, offset, _) = bound_range(draw, bindings::TRANSFORMS);
    assert_eq!(
        read_buffer::<Mat4>(backend, transforms, offset, 1),
        vec![Mat4::IDENTITY]
    );

    let stats = renderer.stats();
    assert_eq!(stats.object_count, 1);
    assert_eq!(stats.batch_count, 1);
    assert_eq!(stats.draw_commands, 1);
    assert!(backend.is_resident(ALBEDO_HANDLE));
}

/// Sub-meshes whose materials share a shader share a batch; a second shader
/// gets its own multi-draw.
#[test]
fn test_batches_split_by_shader() {
    let scene = scene();
    let mut renderer = renderer();
    let mesh = quad_mesh(3);

    frame(&mut renderer, |r| {
        r.submit_mesh(
            &scene.resources,
            &mesh,
            &[scene.red, scene.flat, scene.blue],
            at(1.0),
            3,
        )
        .unwrap();
    });

    let draws = renderer.backend().draws();
    assert_eq!(draws.len(), 2);
    assert_eq!(draws[0].program, Some(Program::Shader(scene.lit)));
    assert_eq!(draws[1].program, Some(Program::Shader(scene.unlit)));

    let lit_instances: Vec<u32> = draws[0].commands.iter().map(|c| c.base_instance).collect();
    assert_eq!(lit_instances, vec![0, 1]);
    assert_eq!(draws[1].commands.len(), 1);
    assert_eq!(draws[1].commands[0].base_instance, 0);

    assert_eq!(renderer.stats().batch_count, 2);
    assert_eq!(renderer.stats().object_count, 3);
}

/// Materials are packed per object in GPU layout: 48 bytes for the lit
/// shader with the albedo map handle at offset 32.
#[test]
fn test_material_blobs_are_packed_per_object() {
    let scene = scene();
    let mut renderer = renderer();
    let mesh = quad_mesh(2);

    frame(&mut renderer, |r| {
        r.submit_mesh(
            &scene.resources,
            &mesh,
            &[scene.red, scene.blue],
            Mat4::IDENTITY,
            1,
        )
        .unwrap();
    });

    let backend = renderer.backend();
    let (materials, offset, size) = bound_range(&backend.draws()[0], bindings::MATERIALS);
    assert_eq!(size, 96);

    let words = read_buffer::<f32>(backend, materials, offset, 24);
    assert_eq!(words[0], 0.5);
    assert_eq!(&words[4..7], &[1.0, 0.0, 0.0]);
    assert_eq!(&words[16..19], &[0.0, 0.0, 1.0]);

    for object in 0..2 {
        let handle = read_buffer::<u64>(backend, materials, offset + object * 48 + 32, 1);
        assert_eq!(handle, vec![ALBEDO_HANDLE]);
    }
}

/// A shader without members binds an empty material range instead of
/// inheriting the previous batch's.
#[test]
fn test_memberless_shader_binds_empty_materials() {
    let mut scene = scene();
    let bare = Shader::new("bare", ShaderLayout::new());
    let bare_id = scene.resources.add_shader(bare.clone()).unwrap();
    let plain = scene
        .resources
        .add_material(Material::new(bare_id, &bare))
        .unwrap();

    let mut renderer = renderer();
    let mesh = quad_mesh(2);
    frame(&mut renderer, |r| {
        r.submit_mesh(&scene.resources, &mesh, &[scene.red, plain], at(0.0), 1)
            .unwrap();
    });

    let draws = renderer.backend().draws();
    assert_eq!(draws.len(), 2);
    assert_eq!(draws[1].program, Some(Program::Shader(bare_id)));

    let (_, lit_offset, lit_size) = bound_range(&draws[0], bindings::MATERIALS);
    let (_, bare_offset, bare_size) = bound_range(&draws[1], bindings::MATERIALS);
    assert_eq!(lit_size, 48);
    assert_eq!(bare_size, 0);
    assert!(bare_offset >= lit_offset + lit_size);
}

/// Skinned sub-meshes sharing a skeleton share one palette upload; another
/// skeleton is another batch.
#[test]
fn test_skinned_batches_by_skeleton() {
    let scene = scene();
    let mut renderer = renderer();
    let body = skinned_triangle();
    let hat = skinned_triangle();
    let bones = vec![Mat4::IDENTITY; 4];

    frame(&mut renderer, |r| {
        let res = &scene.resources;
        r.submit_skinned_mesh(res, &body, SkeletonId(1), &bones, &[scene.red], at(0.0), 1)
            .unwrap();
        r.submit_skinned_mesh(res, &hat, SkeletonId(1), &bones, &[scene.blue], at(0.0), 1)
            .unwrap();
        r.submit_skinned_mesh(res, &body, SkeletonId(2), &bones[..2], &[scene.red], at(5.0), 2)
            .unwrap();
    });

    let draws = renderer.backend().draws();
    assert_eq!(draws.len(), 2);
    assert_eq!(draws[0].commands.len(), 2);
    assert_eq!(draws[1].commands.len(), 1);
    assert_eq!(bound_range(&draws[0], bindings::BONES).2, 4 * 64);
    assert_eq!(bound_range(&draws[1], bindings::BONES).2, 2 * 64);

    let geometry = draws[0].geometry.expect("geometry bound");
    assert_eq!(geometry.vertex_buffer, renderer.skinned_meshes().vertex_buffer());
    assert_eq!(renderer.skinned_meshes().len(), 2);
}

#[test]
fn test_sprites_are_one_instanced_command() {
    let scene = scene();
    let mut renderer = renderer();

    frame(&mut renderer, |r| {
        for i in 0..3 {
            r.submit_sprite(&scene.resources, scene.sprite, white(), at(i as f32), 10 + i)
                .unwrap();
        }
    });

    let backend = renderer.backend();
    let draw = &backend.draws()[0];
    assert_eq!(draw.program, Some(Program::Builtin(BuiltinProgram::Sprite)));
    assert_eq!(draw.commands.len(), 1);
    assert_eq!(draw.instance_total(), 3);

    let quad = renderer.sprite_quad();
    assert_eq!(draw.commands[0].index_count, quad.index_count);
    assert_eq!(draw.commands[0].first_index, quad.first_index);

    let (ids, offset, _) = bound_range(draw, bindings::ENTITY_IDS);
    assert_eq!(read_buffer::<u32>(backend, ids, offset, 3), vec![10, 11, 12]);
    assert_eq!(bound_range(draw, bindings::MATERIALS).2, 3 * 32);
    assert!(backend.is_resident(SPRITE_HANDLE));
}

/// Text goes straight into the text stream and is drawn by one command whose
/// base vertex points at the slot.
#[rstest]
#[case::plain(TextStyle::default(), 2)]
#[case::shadowed(TextStyle::default().with_shadow(0.1, Vec4::new(0.0, 0.0, 0.0, 1.0)), 4)]
fn test_text_quads(#[case] style: TextStyle, #[case] quads: u32) {
    let scene = scene();
    let mut renderer = renderer();

    frame(&mut renderer, |r| {
        r.submit_text(&scene.resources, "AB", scene.font, style, Mat4::IDENTITY, 9)
            .unwrap();
    });

    let backend = renderer.backend();
    let draw = &backend.draws()[0];
    assert_eq!(draw.program, Some(Program::Builtin(BuiltinProgram::Text)));
    assert_eq!(draw.commands[0].index_count, quads * 6);
    assert_eq!(draw.commands[0].base_vertex, 0);

    let (buffer, base) = renderer.stream_slot(StreamKind::TextVertices, 0);
    let vertices = read_buffer::<TextVertex>(backend, buffer, base, (quads * 4) as usize);
    assert!(vertices.iter().all(|v| v.entity_id == 9));
    assert_eq!(vertices[0].atlas, [0x42, 0x1]);

    // The last quad is the `B` glyph, kerned one unit left of A's advance.
    let last = &vertices[(quads as usize - 1) * 4];
    assert_eq!(last.position[0], 9.0);

    let stats = renderer.stats();
    assert_eq!(stats.character_count, quads);
    assert_eq!(stats.object_count, 1);
    assert!(backend.is_resident(ATLAS_HANDLE));
}

#[test]
fn test_text_base_vertex_follows_slot() {
    let scene = scene();
    let mut renderer = renderer();
    let max_characters = renderer.config().max_characters as i32;

    for _ in 0..2 {
        frame(&mut renderer, |r| {
            r.submit_text(&scene.resources, "A B", scene.font, TextStyle::default(), Mat4::IDENTITY, 0)
                .unwrap();
        });
    }

    let draws = renderer.backend().draws();
    assert_eq!(draws[0].commands[0].base_vertex, 0);
    assert_eq!(draws[1].commands[0].base_vertex, max_characters * 4);
    // The space has no quad.
    assert_eq!(draws[1].commands[0].index_count, 12);
}

/// Batches are drawn in a fixed order regardless of submission order.
#[test]
fn test_draw_order() {
    let scene = scene();
    let mut renderer = renderer();
    let mesh = quad_mesh(1);
    let skinned = skinned_triangle();
    let wire = cube(1.0);
    let bones = [Mat4::IDENTITY];

    frame(&mut renderer, |r| {
        let res = &scene.resources;
        r.submit_text(res, "A", scene.font, TextStyle::default(), Mat4::IDENTITY, 0)
            .unwrap();
        r.submit_sprite(res, scene.sprite, white(), Mat4::IDENTITY, 0)
            .unwrap();
        r.submit_mesh_wireframe(&wire, Vec4::new(0.0, 1.0, 0.0, 1.0), Mat4::IDENTITY, 0)
            .unwrap();
        r.submit_skinned_mesh(res, &skinned, SkeletonId(0), &bones, &[scene.red], Mat4::IDENTITY, 0)
            .unwrap();
        r.submit_mesh(res, &mesh, &[scene.flat], Mat4::IDENTITY, 0)
            .unwrap();
    });

    let programs: Vec<_> = renderer
        .backend()
        .draws()
        .iter()
        .map(|d| d.program)
        .collect();
    assert_eq!(
        programs,
        vec![
            Some(Program::Shader(scene.unlit)),
            Some(Program::Shader(scene.lit)),
            Some(Program::Builtin(BuiltinProgram::Wireframe)),
            Some(Program::Builtin(BuiltinProgram::Sprite)),
            Some(Program::Builtin(BuiltinProgram::Text)),
        ]
    );
    assert_eq!(renderer.stats().batch_count, 5);
    assert_eq!(renderer.stats().object_count, 5);
}

#[test]
fn test_frame_uniforms_applied() {
    let scene = scene();
    let mut renderer = renderer();
    let mesh = quad_mesh(1);
    let cubemap = HdrCubemap {
        label: None,
        environment: 1,
        irradiance: 2,
        prefiltered: 3,
        brdf_lut: 4,
        prefiltered_mip_levels: 5,
    };

    renderer.set_time(2.5);
    renderer.set_ibl(Some(&cubemap));
    frame(&mut renderer, |r| {
        r.submit_mesh(&scene.resources, &mesh, &[scene.red], Mat4::IDENTITY, 0)
            .unwrap();
    });

    let backend = renderer.backend();
    assert_eq!(backend.uniform(uniforms::TIME), Some(UniformValue::Float(2.5)));
    assert_eq!(backend.uniform(uniforms::IBL_ENABLED), Some(UniformValue::Int(1)));
    assert_eq!(backend.uniform(uniforms::BRDF_LUT), Some(UniformValue::Handle(4)));
    assert!(backend.is_resident(3));

    renderer.set_ibl(None);
    frame(&mut renderer, |r| {
        r.submit_mesh(&scene.resources, &mesh, &[scene.red], Mat4::IDENTITY, 0)
            .unwrap();
    });
    assert_eq!(
        renderer.backend().uniform(uniforms::IBL_ENABLED),
        Some(UniformValue::Int(0))
    );
}

// ============================================================================
// Caching
// ============================================================================

#[test]
fn test_mesh_uploaded_once() {
    let scene = scene();
    let mut renderer = renderer();
    let mesh = quad_mesh(2);

    frame(&mut renderer, |r| {
        r.submit_mesh(&scene.resources, &mesh, &[scene.red, scene.red], at(0.0), 1)
            .unwrap();
        r.submit_mesh(&scene.resources, &mesh, &[scene.red, scene.red], at(1.0), 2)
            .unwrap();
    });
    let uploads = renderer.backend().uploads().len();

    frame(&mut renderer, |r| {
        r.submit_mesh_wireframe(&mesh, white(), at(2.0), 3).unwrap();
    });

    assert_eq!(renderer.backend().uploads().len(), uploads);
    assert_eq!(renderer.static_meshes().len(), 2);
    assert_eq!(renderer.stats().static_vertices_used, 4 + 8);
    assert_eq!(renderer.stats().static_indices_used, 6 + 12);

    // Both submissions of the first frame drew the same cached region.
    let first = &renderer.backend().draws()[0];
    assert_eq!(first.commands[0].base_vertex, first.commands[2].base_vertex);
    assert_eq!(first.commands[1].base_vertex, 8);
}

// ============================================================================
// Streaming
// ============================================================================

/// Each frame writes its own slot; slot 0 is only rewritten after its fence
/// signals, and frame data in other slots survives.
#[test]
fn test_slots_rotate_behind_fences() {
    let scene = scene();
    let mut renderer = renderer();
    renderer.backend_mut().set_fence_mode(FenceMode::AfterWaits(2));
    let mesh = quad_mesh(1);

    let mut acquires = Vec::new();
    for entity in 0..4u32 {
        let acquire = renderer.begin().unwrap();
        acquires.push(acquire);
        renderer
            .submit_mesh(&scene.resources, &mesh, &[scene.red], Mat4::IDENTITY, entity)
            .unwrap();
        renderer.render().unwrap();
        renderer.end().unwrap();
    }

    // Slots start pre-signaled; the fourth frame waits on frame 0's fence.
    assert!(acquires[..3]
        .iter()
        .all(|a| *a == SlotAcquire::Ready { blocking_waits: 0 }));
    assert_eq!(acquires[3], SlotAcquire::Ready { blocking_waits: 2 });

    let backend = renderer.backend();
    let offsets: Vec<u64> = backend
        .draws()
        .iter()
        .map(|d| bound_range(d, bindings::ENTITY_IDS).1)
        .collect();
    let bases: Vec<u64> = (0..3)
        .map(|slot| renderer.stream_slot(StreamKind::EntityIds, slot).1)
        .collect();
    assert_eq!(offsets, vec![bases[0], bases[1], bases[2], bases[0]]);

    let (ids, _) = renderer.stream_slot(StreamKind::EntityIds, 0);
    assert_eq!(read_buffer::<u32>(backend, ids, bases[0], 1), vec![3]);
    assert_eq!(read_buffer::<u32>(backend, ids, bases[1], 1), vec![1]);
    assert_eq!(read_buffer::<u32>(backend, ids, bases[2], 1), vec![2]);
}

#[test]
fn test_failed_fence_wait_proceeds() {
    let mut renderer = renderer();
    renderer
        .backend_mut()
        .script_fence_waits([FenceWait::Failed]);

    assert_eq!(renderer.begin().unwrap(), SlotAcquire::Failed);
    assert_eq!(renderer.state(), FrameState::Accumulating);
    renderer.render().unwrap();
    renderer.end().unwrap();
}

/// Every storage range bound for a draw starts on the device's storage
/// offset alignment, even with several batches per frame.
#[rstest]
#[case::align_16(16)]
#[case::align_64(64)]
#[case::align_256(256)]
fn test_storage_offsets_aligned(#[case] alignment: u64) {
    let scene = scene();
    let mut renderer = renderer_with_alignment(alignment);
    let mesh = quad_mesh(3);

    for _ in 0..2 {
        frame(&mut renderer, |r| {
            r.submit_mesh(
                &scene.resources,
                &mesh,
                &[scene.red, scene.flat, scene.blue],
                Mat4::IDENTITY,
                0,
            )
            .unwrap();
            r.submit_sprite(&scene.resources, scene.sprite, white(), Mat4::IDENTITY, 0)
                .unwrap();
        });
    }

    let draws = renderer.backend().draws();
    assert_eq!(draws.len(), 6);
    for draw in draws {
        for (binding, (_, offset, _)) in &draw.storage {
            assert_eq!(offset % alignment, 0, "binding {binding} at {offset}");
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_submit_outside_frame_rejected() {
    let scene = scene();
    let mut renderer = renderer();
    let mesh = quad_mesh(1);

    let err = renderer
        .submit_mesh(&scene.resources, &mesh, &[scene.red], Mat4::IDENTITY, 0)
        .unwrap_err();
    assert_eq!(
        err,
        GraphicsError::InvalidState {
            operation: "submit_mesh",
            expected: "accumulating",
            actual: "idle",
        }
    );
    assert!(renderer.static_meshes().get(mesh.id()).is_none());
}

#[test]
fn test_object_limit_leaves_frame_untouched() {
    let scene = scene();
    let mut renderer = renderer();
    let max_objects = renderer.config().max_objects as usize;
    let mesh = quad_mesh(max_objects + 1);
    let materials = vec![scene.red; max_objects + 1];

    renderer.begin().unwrap();
    let err = renderer
        .submit_mesh(&scene.resources, &mesh, &materials, Mat4::IDENTITY, 0)
        .unwrap_err();
    assert_eq!(
        err,
        GraphicsError::CapacityExceeded {
            resource: "objects",
            requested: max_objects as u64 + 1,
            capacity: max_objects as u64,
        }
    );
    assert!(!renderer.static_meshes().contains(mesh.id()));

    renderer.render().unwrap();
    renderer.end().unwrap();
    assert!(renderer.backend().draws().is_empty());
}

#[test]
fn test_geometry_overflow() {
    let scene = scene();
    let mut renderer = renderer();
    let capacity = renderer.static_meshes().max_vertices();
    // The unit quad already holds 4 vertices, so a full-capacity mesh cannot fit.
    let mesh = Mesh::new(vec![SubMesh::new(
        vec![Vertex::default(); capacity as usize],
        vec![0, 1, 2],
    )]);

    renderer.begin().unwrap();
    let result = renderer.submit_mesh(&scene.resources, &mesh, &[scene.red], Mat4::IDENTITY, 0);
    assert_eq!(
        result,
        Err(GraphicsError::CapacityExceeded {
            resource: "static geometry",
            requested: u64::from(capacity) + 4,
            capacity: u64::from(capacity),
        })
    );
    assert_eq!(renderer.stats().static_vertices_used, 4);
    assert!(renderer.backend().draws().is_empty());
}

#[test]
fn test_character_limit() {
    let scene = scene();
    let mut renderer = renderer();
    let too_long = "A".repeat(renderer.config().max_characters as usize + 1);

    renderer.begin().unwrap();
    let result = renderer.submit_text(
        &scene.resources,
        &too_long,
        scene.font,
        TextStyle::default(),
        Mat4::IDENTITY,
        0,
    );
    assert!(matches!(
        result,
        Err(GraphicsError::CapacityExceeded {
            resource: "text characters",
            ..
        })
    ));
}

#[test]
fn test_bone_limit() {
    let scene = scene();
    let mut renderer = renderer();
    let bones = vec![Mat4::IDENTITY; renderer.config().max_bones as usize + 1];
    let mesh = skinned_triangle();

    renderer.begin().unwrap();
    let result = renderer.submit_skinned_mesh(
        &scene.resources,
        &mesh,
        SkeletonId(0),
        &bones,
        &[scene.red],
        Mat4::IDENTITY,
        0,
    );
    assert!(matches!(
        result,
        Err(GraphicsError::CapacityExceeded {
            resource: "bones",
            ..
        })
    ));
}

#[test]
fn test_missing_materials_rejected() {
    let scene = scene();
    let mut renderer = renderer();
    let mesh = quad_mesh(2);

    renderer.begin().unwrap();
    assert!(matches!(
        renderer.submit_mesh(&scene.resources, &mesh, &[scene.red], Mat4::IDENTITY, 0),
        Err(GraphicsError::InvalidParameter(_))
    ));
    assert!(matches!(
        renderer.submit_mesh(
            &scene.resources,
            &mesh,
            &[scene.red, MaterialId::from_raw(99)],
            Mat4::IDENTITY,
            0
        ),
        Err(GraphicsError::UnknownResource(_))
    ));
}
