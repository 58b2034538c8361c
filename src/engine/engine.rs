//! The allocation engine: lifecycle, placement, split and coalesce.

use std::ptr::NonNull;

use crate::engine::arena::Arena;
use crate::engine::block::{Block, BlockKind, Handle};
use crate::engine::config::EngineConfig;
use crate::engine::strategy::Strategy;
use crate::engine::table::BlockTable;
use crate::error::{EngineError, Result};
use crate::observer::{EngineEvent, EngineObserver};
use crate::stats::EngineStats;
use crate::utils::align_up;

/// Fixed rounding grain, in bytes, applied to every request size (and to
/// the arena capacity) before any table operation.
pub const ALLOC_GRAIN: usize = 4;

/// Rounds a request up to the allocation grain, rejecting overflow.
fn round_to_grain(size: usize) -> Result<usize> {
    if size > usize::MAX - (ALLOC_GRAIN - 1) {
        return Err(EngineError::invalid_request(
            "request size overflows the alignment grain",
        ));
    }
    Ok(align_up(size, ALLOC_GRAIN))
}

/// Everything that exists only while an arena is live.
struct EngineState {
    arena: Arena,
    table: BlockTable,
    strategy: Strategy,
    /// Next-fit resume offset: the end of the previous successful
    /// allocation. Offsets stay meaningful across table splices, which is
    /// why this is not a table index.
    cursor: usize,
}

/// A simulated heap: one arena, one block table, one placement strategy.
///
/// The engine is single-threaded by contract: every operation takes
/// `&mut self` and runs to completion. Lifecycle is explicit: [`init`]
/// reserves the arena, [`teardown`] releases it and invalidates every
/// outstanding [`Handle`], and all other operations fail with
/// `NotInitialized` outside that window.
///
/// # Examples
///
/// ```
/// use heapfit::{EngineConfig, HeapEngine, Strategy};
///
/// let mut engine = HeapEngine::new(EngineConfig::default());
/// engine.init(1024, Strategy::BestFit)?;
///
/// let a = engine.alloc(100)?;
/// let b = engine.alloc(200)?;
/// engine.free(a)?;
/// engine.free(b)?;
///
/// assert_eq!(engine.block_count()?, 1);
/// engine.teardown();
/// # Ok::<(), heapfit::EngineError>(())
/// ```
///
/// [`init`]: HeapEngine::init
/// [`teardown`]: HeapEngine::teardown
pub struct HeapEngine {
    config: EngineConfig,
    stats: EngineStats,
    observer: Option<Box<dyn EngineObserver>>,
    state: Option<EngineState>,
}

impl Default for HeapEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl HeapEngine {
    /// Creates an idle engine. No memory is reserved until [`init`].
    ///
    /// [`init`]: HeapEngine::init
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            stats: EngineStats::new(),
            observer: None,
            state: None,
        }
    }

    /// Attaches an observer at construction time.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_observer(mut self, observer: impl EngineObserver + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Replaces the observer on a live engine.
    pub fn set_observer(&mut self, observer: impl EngineObserver + 'static) {
        self.observer = Some(Box::new(observer));
    }

    /// Reserves an arena of `capacity` bytes (rounded up to the grain) and
    /// resets the table to one free block spanning it.
    ///
    /// Fails with `AlreadyInitialized` while a previous arena is active and
    /// with `InvalidRequest` for a zero capacity or an invalid config.
    pub fn init(&mut self, capacity: usize, strategy: Strategy) -> Result<()> {
        if self.state.is_some() {
            return Err(EngineError::AlreadyInitialized);
        }
        self.config.validate()?;
        if capacity == 0 {
            return Err(EngineError::invalid_request("arena capacity must be positive"));
        }

        let rounded = round_to_grain(capacity)?;
        let arena = Arena::reserve(rounded)?;
        let table = BlockTable::new(rounded, self.config.max_blocks);

        self.state = Some(EngineState { arena, table, strategy, cursor: 0 });

        if self.config.track_stats {
            self.stats.record_init();
        }
        self.notify(EngineEvent::Init { capacity: rounded, strategy });
        Ok(())
    }

    /// Releases the arena and discards the table, invalidating every
    /// outstanding handle. A no-op on an idle engine.
    pub fn teardown(&mut self) {
        if let Some(state) = self.state.take() {
            let blocks = state.table.len();
            drop(state);
            self.notify(EngineEvent::Teardown { blocks });
        }
    }

    /// Whether an arena is currently live.
    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    /// Allocates `size` bytes (rounded up to the grain) and returns the
    /// handle of the used block.
    ///
    /// Exhaustion is an ordinary outcome: `OutOfMemory` is returned and the
    /// table is untouched. `TableFull` means the split had no descriptor
    /// slot; it aborts the allocation, also leaving the table untouched.
    pub fn alloc(&mut self, size: usize) -> Result<Handle> {
        if size == 0 {
            return Err(EngineError::invalid_request("allocation size must be positive"));
        }
        let rounded = round_to_grain(size)?;

        let track = self.config.track_stats;
        let stats = &self.stats;
        let observer = self.observer.as_deref();
        let state = self.state.as_mut().ok_or(EngineError::NotInitialized)?;

        let Some(index) = state.strategy.select(&state.table, rounded, state.cursor) else {
            let largest_free = state.table.largest_free();
            if track {
                stats.record_failed_allocation();
            }
            notify_to(observer, EngineEvent::AllocFailed { requested: rounded, largest_free });
            return Err(EngineError::out_of_memory(rounded, largest_free));
        };

        let chosen = state.table.blocks()[index];
        let offset = chosen.offset;
        let split = rounded < chosen.size;

        if split {
            if !state.table.has_room() {
                #[cfg(feature = "logging")]
                tracing::error!(
                    max_blocks = state.table.max_blocks(),
                    requested = rounded,
                    "block table full; split aborted"
                );
                if track {
                    stats.record_failed_allocation();
                }
                return Err(EngineError::table_full(state.table.max_blocks()));
            }
            state.table.resize(offset, rounded)?;
            state.table.set_kind(offset, BlockKind::Used)?;
            state
                .table
                .insert_after(offset, Block::free(offset + rounded, chosen.size - rounded))?;
        } else {
            state.table.set_kind(offset, BlockKind::Used)?;
        }

        state.cursor = offset + rounded;

        debug_assert!(state.table.tiles(state.arena.capacity()));

        if track {
            stats.record_allocation(rounded);
            if split {
                stats.record_split();
            }
        }
        notify_to(observer, EngineEvent::Alloc { offset, size: rounded, split });
        Ok(Handle::new(offset))
    }

    /// Releases the block named by `handle` and merges it with any free
    /// neighbor on either side.
    ///
    /// Fails with `InvalidHandle` unless a currently used block starts at
    /// the handle's offset, which also covers double frees and handles
    /// from before a teardown/init cycle.
    pub fn free(&mut self, handle: Handle) -> Result<()> {
        let track = self.config.track_stats;
        let stats = &self.stats;
        let observer = self.observer.as_deref();
        let state = self.state.as_mut().ok_or(EngineError::NotInitialized)?;

        let offset = handle.offset();
        let index = state
            .table
            .find(|b| b.offset == offset && b.is_used())
            .ok_or(EngineError::invalid_handle(offset))?;

        let size = state.table.blocks()[index].size;
        state.table.set_kind(offset, BlockKind::Free)?;

        notify_to(observer, EngineEvent::Free { offset, size });

        // Merge with the free successor, then the free predecessor.
        if let Some(next) = state.table.blocks().get(index + 1).copied() {
            if next.is_free() {
                let merged = size + next.size;
                state.table.resize(offset, merged)?;
                state.table.remove_at(next.offset)?;
                if track {
                    stats.record_coalesce();
                }
                notify_to(observer, EngineEvent::Coalesce { offset, merged_size: merged });
            }
        }

        if index > 0 {
            let prev = state.table.blocks()[index - 1];
            if prev.is_free() {
                let current = state.table.blocks()[index];
                let merged = prev.size + current.size;
                state.table.resize(prev.offset, merged)?;
                state.table.remove_at(current.offset)?;
                if track {
                    stats.record_coalesce();
                }
                notify_to(
                    observer,
                    EngineEvent::Coalesce { offset: prev.offset, merged_size: merged },
                );
            }
        }

        debug_assert!(state.table.tiles(state.arena.capacity()));
        debug_assert!(state.table.coalesced());

        if track {
            stats.record_free(size);
        }
        Ok(())
    }

    /// Resolves a live handle to the address of its block inside the arena.
    pub fn resolve(&self, handle: Handle) -> Result<NonNull<u8>> {
        let state = self.state.as_ref().ok_or(EngineError::NotInitialized)?;
        let offset = handle.offset();
        state
            .table
            .find(|b| b.offset == offset && b.is_used())
            .ok_or(EngineError::invalid_handle(offset))?;
        state.arena.at(offset)
    }

    /// Number of tracked blocks, free and used.
    pub fn block_count(&self) -> Result<usize> {
        Ok(self.state()?.table.len())
    }

    /// Total bytes currently free.
    pub fn free_bytes(&self) -> Result<usize> {
        Ok(self.state()?.table.free_bytes())
    }

    /// Total bytes currently handed out.
    pub fn used_bytes(&self) -> Result<usize> {
        Ok(self.state()?.table.used_bytes())
    }

    /// Size of the largest free block, 0 when fully allocated.
    pub fn largest_free(&self) -> Result<usize> {
        Ok(self.state()?.table.largest_free())
    }

    /// Rounded capacity of the live arena.
    pub fn capacity(&self) -> Result<usize> {
        Ok(self.state()?.arena.capacity())
    }

    /// Ordered snapshot of the block descriptors.
    pub fn blocks(&self) -> Result<&[Block]> {
        Ok(self.state()?.table.blocks())
    }

    /// The active placement strategy, if initialized.
    pub fn strategy(&self) -> Option<Strategy> {
        self.state.as_ref().map(|s| s.strategy)
    }

    /// Operation counters. Zeroes unless the config enables `track_stats`.
    pub fn stats(&self) -> &EngineStats {
        &self.stats
    }

    /// The engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Forwards an event to the attached observer, if any.
    fn notify(&self, event: EngineEvent) {
        notify_to(self.observer.as_deref(), event);
    }

    fn state(&self) -> Result<&EngineState> {
        self.state.as_ref().ok_or(EngineError::NotInitialized)
    }
}

fn notify_to(observer: Option<&dyn EngineObserver>, event: EngineEvent) {
    if let Some(observer) = observer {
        observer.on_event(&event);
    }
}
