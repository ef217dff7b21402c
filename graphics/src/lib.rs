//! # Lumen Graphics
//!
//! Batched, indirect-draw renderer streaming through triple-buffered
//! persistent memory.
//!
//! ## Overview
//!
//! This crate provides:
//! - [`Renderer`] - Frame lifecycle, submission API and draw issue
//! - [`GpuBackend`] - Trait for the graphics API the renderer drives
//! - [`DummyBackend`] - In-memory backend that records every call (for testing)
//! - [`mesh`] - Shared vertex/index buffers with per-mesh upload caching
//! - [`batch`] - Per-frame grouping of objects into multi-draw batches
//! - [`pipeline`] - Fenced frame slots and the streaming store
//! - [`materials`] - Packing of material data into GPU layout
//! - [`text`] - Glyph layout into vertex quads
//!
//! ## Example
//!
//! ```ignore
//! use lumen_graphics::{DummyBackend, Renderer, RendererConfig};
//!
//! let mut renderer = Renderer::new(DummyBackend::new(), RendererConfig::default())?;
//! renderer.begin()?;
//! renderer.submit_mesh(&resources, &mesh, &[material], Mat4::IDENTITY, 1)?;
//! renderer.render()?;
//! renderer.end()?;
//! ```

pub mod backend;
pub mod batch;
pub mod error;
pub mod materials;
pub mod mesh;
pub mod pipeline;
pub mod renderer;
pub mod resources;
pub mod scene;
pub mod text;
pub mod types;

// Re-export main types for convenience
pub use backend::{BackendError, DummyBackend, FenceMode, GpuBackend};
pub use batch::SkeletonId;
pub use error::{GraphicsError, PackError};
pub use materials::{pack_material, MaterialBlob, MATERIAL_BLOB_CAPACITY};
pub use mesh::{CacheEntry, MeshCache};
pub use pipeline::{FramePipeline, SlotAcquire, StreamKind, FRAMES_IN_FLIGHT};
pub use renderer::{FrameState, RenderStats, Renderer, RendererConfig};
pub use scene::{Camera, DirectionalLight, ShadowCascade, ShadowMaps};
pub use text::TextStyle;
pub use types::{BufferDescriptor, BufferUsage, DrawIndexedIndirectArgs};

/// Graphics library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
