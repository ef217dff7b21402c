//! # Lumen Core
//!
//! Resource types consumed by the Lumen renderer.
//!
//! - [`mesh`] - Meshes with stable identity and sub-mesh geometry
//! - [`shader`] - Reflected shader member layouts
//! - [`material`] - Raw material data keyed to a shader layout
//! - [`texture`] / [`font`] - Bindless textures, IBL maps and font metrics
//! - [`resources`] - The explicit [`ResourceManager`] context
//! - [`profiling`] - Optional Tracy instrumentation

pub mod error;
pub mod font;
pub mod handle;
pub mod material;
pub mod mesh;
pub mod profiling;
pub mod resources;
pub mod shader;
pub mod texture;

pub use error::ResourceError;
pub use handle::{CubemapId, FontId, MaterialId, ShaderId, TextureId};
pub use resources::ResourceManager;

/// Core library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
