//! Observation seam for engine activity.
//!
//! The table and strategy code is pure state transition logic with no I/O;
//! anything that wants to watch the engine (tracing, a TUI, a test capture)
//! implements [`EngineObserver`] and is injected at the boundary. The
//! `logging` feature ships [`TracingObserver`], which forwards events to
//! `tracing`.

use crate::engine::Strategy;

/// A state transition worth observing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// An arena was reserved and the table reset.
    Init {
        /// Rounded arena capacity in bytes.
        capacity: usize,
        /// Active placement strategy.
        strategy: Strategy,
    },

    /// An allocation succeeded.
    Alloc {
        /// Offset of the used block.
        offset: usize,
        /// Rounded size in bytes.
        size: usize,
        /// Whether a free remainder was split off.
        split: bool,
    },

    /// An allocation was rejected with `OutOfMemory`.
    AllocFailed {
        /// Rounded size in bytes.
        requested: usize,
        /// Largest free block at the time.
        largest_free: usize,
    },

    /// A used block was released.
    Free {
        /// Offset of the released block.
        offset: usize,
        /// Size in bytes.
        size: usize,
    },

    /// Two adjacent free blocks were merged.
    Coalesce {
        /// Offset of the surviving block.
        offset: usize,
        /// Size of the merged block.
        merged_size: usize,
    },

    /// The arena was released and all handles invalidated.
    Teardown {
        /// Descriptors live at teardown.
        blocks: usize,
    },
}

/// Callback interface for engine activity.
pub trait EngineObserver {
    /// Called synchronously after each completed state transition.
    fn on_event(&self, event: &EngineEvent);
}

/// Observer that forwards events to `tracing`.
///
/// Routine transitions log at `trace`/`debug`; rejections log at `debug`
/// since they are expected outcomes the caller already sees as errors.
#[cfg(feature = "logging")]
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

#[cfg(feature = "logging")]
impl EngineObserver for TracingObserver {
    fn on_event(&self, event: &EngineEvent) {
        use tracing::{debug, trace};

        match event {
            EngineEvent::Init { capacity, strategy } => {
                debug!(capacity, %strategy, "engine initialized");
            }
            EngineEvent::Alloc { offset, size, split } => {
                trace!(offset, size, split, "allocated");
            }
            EngineEvent::AllocFailed { requested, largest_free } => {
                debug!(requested, largest_free, "allocation failed: out of memory");
            }
            EngineEvent::Free { offset, size } => {
                trace!(offset, size, "freed");
            }
            EngineEvent::Coalesce { offset, merged_size } => {
                trace!(offset, merged_size, "coalesced adjacent free blocks");
            }
            EngineEvent::Teardown { blocks } => {
                debug!(blocks, "engine torn down");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct Capture {
        events: RefCell<Vec<EngineEvent>>,
    }

    impl EngineObserver for Capture {
        fn on_event(&self, event: &EngineEvent) {
            self.events.borrow_mut().push(event.clone());
        }
    }

    #[test]
    fn observers_receive_events() {
        let capture = Capture { events: RefCell::new(Vec::new()) };

        capture.on_event(&EngineEvent::Init {
            capacity: 64,
            strategy: Strategy::FirstFit,
        });
        capture.on_event(&EngineEvent::Teardown { blocks: 1 });

        let events = capture.events.borrow();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], EngineEvent::Init { capacity: 64, .. }));
    }
}
