//! GPU-side mesh storage.
//!
//! - [`MeshCache`] - Upload-once geometry cache keyed by mesh identity
//! - [`CacheEntry`] - Where one sub-mesh lives inside the shared buffers

mod cache;

pub use cache::{CacheEntry, MeshCache};
