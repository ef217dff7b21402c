//! Per-frame draw batching.
//!
//! Submissions between `begin` and `render` are grouped so that each group
//! becomes a single multi-draw-indirect call:
//!
//! - [`Batch`] - Commands plus parallel per-object transforms, materials and ids
//! - [`BatchMap`] - Keyed batches that iterate in first-submission order
//! - [`SkinnedBatch`] - A batch plus the bone palette it is skinned with
//! - [`SpriteBatch`] - Instances of the shared unit quad
//! - [`BatchAccumulator`] - All batch kinds of one frame

mod accumulator;
mod map;

pub use accumulator::{
    Batch, BatchAccumulator, SkeletonId, SkinnedBatch, SkinnedKey, SpriteBatch, SpriteInstance,
};
pub use map::BatchMap;
