//! Fence acquisition for frame slots.
//!
//! Before the CPU rewrites a slot of the persistent buffers it must know the
//! GPU has finished reading it. [`acquire_slot`] polls the slot's fence once
//! without blocking, then falls back to flushing waits with a timeout,
//! repeating until the fence signals or the wait reports a failure.

use std::time::Duration;

use crate::backend::{FenceHandle, FenceWait, GpuBackend};

/// Outcome of acquiring a frame slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotAcquire {
    /// The slot's fence is signaled. `blocking_waits` counts the flushing
    /// waits needed after the initial poll (zero on the fast path).
    Ready {
        /// Number of blocking waits issued.
        blocking_waits: u32,
    },
    /// The fence wait failed. The slot may still be in use by the GPU.
    Failed,
}

impl SlotAcquire {
    /// Whether the slot is known to be free.
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }
}

/// Wait until `fence` signals.
///
/// Timeouts are logged and retried. A failed wait is logged and returned
/// without retrying; the caller decides whether to proceed.
pub fn acquire_slot<B: GpuBackend + ?Sized>(
    backend: &mut B,
    fence: FenceHandle,
    timeout: Duration,
) -> SlotAcquire {
    match backend.wait_fence(fence, false, Duration::ZERO) {
        FenceWait::Signaled => return SlotAcquire::Ready { blocking_waits: 0 },
        FenceWait::Failed => {
            log::error!("Fence {} wait failed", fence.raw());
            return SlotAcquire::Failed;
        }
        FenceWait::TimedOut => {}
    }

    let mut blocking_waits = 0;
    loop {
        blocking_waits += 1;
        match backend.wait_fence(fence, true, timeout) {
            FenceWait::Signaled => return SlotAcquire::Ready { blocking_waits },
            FenceWait::Failed => {
                log::error!("Fence {} wait failed", fence.raw());
                return SlotAcquire::Failed;
            }
            FenceWait::TimedOut => {
                log::warn!(
                    "Fence {} not signaled after {:?} (attempt {}), GPU is falling behind",
                    fence.raw(),
                    timeout,
                    blocking_waits
                );
            }
        }
    }
}
