//! GPU memory management for per-frame streaming.
//!
//! - [`StreamArena`] - Forward-only writer over one frame slot of a buffer
//! - [`ArenaAllocation`] - A written region (offset + size)

mod arena;

pub use arena::{align_up, ArenaAllocation, StreamArena};
