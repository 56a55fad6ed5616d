//! The interrupt contract: a nesting counter the allocator and write
//! barrier read to decide whether a concurrent handler might be running.
//!
//! `interrupt_handler_start`/`_end` increment/decrement a counter rather
//! than toggle a flag, since an ISR can itself be preempted by a
//! higher-priority one and the depth matters, not just whether any handler
//! is active. The only place this crate needs a real disable-interrupt
//! primitive is around the write barrier's interrupt-side stack (see
//! `heap::gc::Collector::write_barrier`), so the counter itself is a plain
//! integer guarded by `critical_section`.

use core::sync::atomic::{AtomicI32, Ordering};

/// Tracks how many nested interrupt handlers are currently executing.
#[derive(Default)]
pub struct InterruptNesting {
    depth: AtomicI32,
}

impl InterruptNesting {
    pub const fn new() -> Self {
        InterruptNesting {
            depth: AtomicI32::new(0),
        }
    }

    /// Call at the entry of every interrupt handler, including nested ones.
    pub fn enter(&self) {
        critical_section::with(|_cs| {
            self.depth.fetch_add(1, Ordering::SeqCst);
        });
    }

    /// Call at the exit of every interrupt handler.
    pub fn exit(&self) {
        critical_section::with(|_cs| {
            self.depth.fetch_sub(1, Ordering::SeqCst);
        });
    }

    /// True while at least one handler is executing: allocation is
    /// forbidden and the write barrier must use its interrupt-safe path.
    pub fn is_active(&self) -> bool {
        self.depth.load(Ordering::SeqCst) > 0
    }
}
