//! Frame pipeline for managing multiple frames in flight.
//!
//! This module provides [`FramePipeline`], which gates CPU writes into the
//! triple-buffered [`StreamingStore`] on GPU fences. The CPU fills slot N+1
//! while the GPU still reads slots N and N-1.
//!
//! # Frame Slots
//!
//! ```text
//! frames_in_flight = 3
//!
//! Slot 0: [Frame 0] ──► [Frame 3] ──► [Frame 6] ──►
//! Slot 1: [Frame 1] ──► [Frame 4] ──► [Frame 7] ──►
//! Slot 2: [Frame 2] ──► [Frame 5] ──► [Frame 8] ──►
//! ```
//!
//! Every slot starts with a pre-signaled fence so the first frames never
//! block. [`FramePipeline::end_frame`] replaces the slot's fence with one
//! inserted after the frame's draws and advances to the next slot.
//!
//! # Synchronization
//!
//! | Step | Action |
//! |------|--------|
//! | begin | poll slot fence, then flushing waits until signaled |
//! | end | delete old slot fence, insert new fence, advance slot |
//! | wait_idle | acquire every slot fence |
//!
//! A failed fence wait is logged and the frame proceeds; it never aborts
//! the render loop.
//!
//! # Example
//!
//! ```ignore
//! use lumen_graphics::pipeline::FramePipeline;
//!
//! let mut pipeline = FramePipeline::new(&mut backend, 3, Duration::from_secs(1))?;
//!
//! loop {
//!     pipeline.begin_frame(&mut backend);  // May block if GPU is behind
//!     store.begin_slot(pipeline.current_slot());
//!     // ... stream data, issue draws ...
//!     pipeline.end_frame(&mut backend)?;
//! }
//!
//! pipeline.wait_idle(&mut backend);
//! ```

mod store;
mod sync;

pub use store::{StreamBuffer, StreamCapacities, StreamKind, StreamingStore};
pub use sync::{acquire_slot, SlotAcquire};

use std::time::Duration;

use crate::backend::{FenceHandle, GpuBackend};
use crate::error::GraphicsError;

/// Number of frame slots the renderer cycles through.
pub const FRAMES_IN_FLIGHT: usize = 3;

/// Manages fences for a fixed ring of frame slots.
///
/// # Thread Safety
///
/// `FramePipeline` is **not thread-safe**. It should be owned by the thread
/// that owns the graphics context.
#[derive(Debug)]
pub struct FramePipeline {
    /// Fence guarding each slot. `None` only after destruction.
    frame_fences: Vec<Option<FenceHandle>>,

    /// Current frame slot index (0 to frames_in_flight - 1).
    current_slot: usize,

    /// Total number of frames in flight.
    frames_in_flight: usize,

    /// Total frames started (for debugging/profiling).
    frame_count: u64,

    /// Timeout of each blocking fence wait.
    fence_timeout: Duration,
}

impl FramePipeline {
    /// Create a frame pipeline with one pre-signaled fence per slot.
    pub fn new<B: GpuBackend + ?Sized>(
        backend: &mut B,
        frames_in_flight: usize,
        fence_timeout: Duration,
    ) -> Result<Self, GraphicsError> {
        if frames_in_flight == 0 {
            return Err(GraphicsError::InvalidParameter(
                "frames_in_flight must be at least 1".to_string(),
            ));
        }

        let frame_fences = (0..frames_in_flight)
            .map(|_| backend.create_signaled_fence().map(Some))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            frame_fences,
            current_slot: 0,
            frames_in_flight,
            frame_count: 0,
            fence_timeout,
        })
    }

    /// Begin a new frame.
    ///
    /// Waits until the GPU has finished with the current slot. The returned
    /// [`SlotAcquire`] reports whether the wait succeeded; on failure the
    /// frame still begins.
    pub fn begin_frame<B: GpuBackend + ?Sized>(&mut self, backend: &mut B) -> SlotAcquire {
        let acquire = match self.frame_fences[self.current_slot] {
            Some(fence) => acquire_slot(backend, fence, self.fence_timeout),
            None => SlotAcquire::Ready { blocking_waits: 0 },
        };

        self.frame_count += 1;

        log::trace!(
            "Begin frame {} (slot {}, {:?})",
            self.frame_count,
            self.current_slot,
            acquire
        );

        acquire
    }

    /// End the current frame.
    ///
    /// Deletes the slot's previous fence, inserts a new one after everything
    /// issued so far and advances to the next slot.
    pub fn end_frame<B: GpuBackend + ?Sized>(
        &mut self,
        backend: &mut B,
    ) -> Result<FenceHandle, GraphicsError> {
        log::trace!(
            "End frame {} (slot {})",
            self.frame_count,
            self.current_slot
        );

        if let Some(old) = self.frame_fences[self.current_slot].take() {
            backend.destroy_fence(old);
        }
        let fence = backend.create_fence()?;
        self.frame_fences[self.current_slot] = Some(fence);

        self.current_slot = (self.current_slot + 1) % self.frames_in_flight;

        Ok(fence)
    }

    /// Wait for all in-flight GPU work to complete.
    ///
    /// Returns `false` if any fence wait failed.
    pub fn wait_idle<B: GpuBackend + ?Sized>(&self, backend: &mut B) -> bool {
        log::trace!("Waiting for GPU idle ({} slots)", self.frames_in_flight);

        let mut idle = true;
        for fence in self.frame_fences.iter().flatten() {
            idle &= acquire_slot(backend, *fence, self.fence_timeout).is_ready();
        }

        log::trace!("GPU idle");
        idle
    }

    /// Delete every slot fence.
    pub fn destroy<B: GpuBackend + ?Sized>(&mut self, backend: &mut B) {
        for fence in self.frame_fences.iter_mut().filter_map(Option::take) {
            backend.destroy_fence(fence);
        }
    }

    /// Get the number of frames in flight.
    pub fn frames_in_flight(&self) -> usize {
        self.frames_in_flight
    }

    /// Get the current frame slot index.
    pub fn current_slot(&self) -> usize {
        self.current_slot
    }

    /// Get the total number of frames started.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get the fence guarding a slot.
    pub fn slot_fence(&self, slot: usize) -> Option<FenceHandle> {
        self.frame_fences.get(slot).copied().flatten()
    }

    /// Get the blocking wait timeout.
    pub fn fence_timeout(&self) -> Duration {
        self.fence_timeout
    }
}
