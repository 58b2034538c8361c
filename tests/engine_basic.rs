//! Integration tests for the engine's public operations.
//!
//! Covers the full lifecycle plus the behavioral contracts: partition
//! integrity, exact fits, coalescing in both free orders, exhaustion,
//! double frees and next-fit cursor movement.

use heapfit::{Block, EngineConfig, EngineError, HeapEngine, Strategy};

fn engine() -> HeapEngine {
    HeapEngine::new(EngineConfig::default())
}

/// Blocks must exactly tile [0, capacity): ascending offsets, positive
/// sizes, no gaps, no overlaps.
fn assert_tiles(blocks: &[Block], capacity: usize) {
    let mut expected = 0;
    for b in blocks {
        assert_eq!(b.offset, expected, "gap or overlap at offset {}", b.offset);
        assert!(b.size > 0, "zero-size block at offset {}", b.offset);
        expected = b.end();
    }
    assert_eq!(expected, capacity, "blocks do not cover the arena");
}

#[test]
fn full_lifecycle() {
    let mut e = engine();
    e.init(1024, Strategy::FirstFit).unwrap();

    let a = e.alloc(100).unwrap();
    let b = e.alloc(200).unwrap();
    assert_tiles(e.blocks().unwrap(), 1024);
    assert_eq!(e.block_count().unwrap(), 3); // two used + free tail

    e.free(a).unwrap();
    e.free(b).unwrap();
    assert_eq!(e.block_count().unwrap(), 1);
    assert_eq!(e.free_bytes().unwrap(), 1024);

    e.teardown();
    assert_eq!(e.alloc(8), Err(EngineError::NotInitialized));
}

#[test]
fn exact_fit_leaves_no_remainder() {
    let mut e = engine();
    e.init(64, Strategy::FirstFit).unwrap();

    let h = e.alloc(64).unwrap();
    let blocks = e.blocks().unwrap();
    assert_eq!(blocks.len(), 1);
    assert!(blocks[0].is_used());
    assert_eq!(e.free_bytes().unwrap(), 0);
    assert_eq!(e.largest_free().unwrap(), 0);

    e.free(h).unwrap();
    assert_eq!(e.free_bytes().unwrap(), 64);
}

#[test]
fn coalescing_round_trip_in_either_free_order() {
    for reversed in [false, true] {
        let mut e = engine();
        e.init(96, Strategy::FirstFit).unwrap();

        let a = e.alloc(32).unwrap();
        let b = e.alloc(64).unwrap();
        assert_eq!(e.block_count().unwrap(), 2);

        let (first, second) = if reversed { (b, a) } else { (a, b) };
        e.free(first).unwrap();
        e.free(second).unwrap();

        let blocks = e.blocks().unwrap();
        assert_eq!(blocks.len(), 1, "reversed={reversed}");
        assert_eq!(blocks[0], Block::free(0, 96));
    }
}

#[test]
fn backward_coalescing_closes_free_free_pairs() {
    let mut e = engine();
    e.init(96, Strategy::FirstFit).unwrap();

    let a = e.alloc(32).unwrap();
    let b = e.alloc(32).unwrap();
    let c = e.alloc(32).unwrap();

    // Free front-to-back: each free has a free predecessor, which a
    // forward-only merge would leave unmerged.
    e.free(a).unwrap();
    e.free(b).unwrap();
    assert_eq!(e.block_count().unwrap(), 2);
    e.free(c).unwrap();
    assert_eq!(e.block_count().unwrap(), 1);
}

#[test]
fn double_free_is_rejected() {
    let mut e = engine();
    e.init(128, Strategy::FirstFit).unwrap();

    let a = e.alloc(32).unwrap();
    let _b = e.alloc(32).unwrap();

    e.free(a).unwrap();
    let err = e.free(a).unwrap_err();
    assert!(err.is_invalid_handle());
}

#[test]
fn exhaustion_is_recoverable_and_leaves_the_table_unchanged() {
    let mut e = engine();
    e.init(64, Strategy::BestFit).unwrap();
    let _a = e.alloc(40).unwrap();

    let before = e.blocks().unwrap().to_vec();
    let err = e.alloc(100).unwrap_err();
    assert_eq!(err, EngineError::out_of_memory(100, 24));
    assert_eq!(e.blocks().unwrap(), &before[..]);

    // The engine keeps working after the rejection.
    let b = e.alloc(24).unwrap();
    e.free(b).unwrap();
}

/// Free blocks of sizes [40, 10, 30] at increasing offsets; a request of
/// size 10 exercises every strategy's selection rule.
///
/// Sizes here are multiples of the 4-byte grain on purpose, so the rounded
/// request equals the nominal one.
fn fragmented(strategy: Strategy) -> HeapEngine {
    let mut e = engine();
    e.init(100, strategy).unwrap();

    let a = e.alloc(40).unwrap();
    let _b = e.alloc(8).unwrap();
    let c = e.alloc(12).unwrap();
    let _d = e.alloc(8).unwrap();
    let f = e.alloc(32).unwrap();

    e.free(a).unwrap();
    e.free(c).unwrap();
    e.free(f).unwrap();
    e
}

#[test]
fn first_fit_picks_the_first_big_enough_block() {
    let mut e = fragmented(Strategy::FirstFit);
    assert_eq!(e.alloc(12).unwrap().offset(), 0);
}

#[test]
fn best_fit_picks_the_exact_block() {
    let mut e = fragmented(Strategy::BestFit);
    assert_eq!(e.alloc(12).unwrap().offset(), 48);
}

#[test]
fn worst_fit_picks_the_largest_block() {
    let mut e = fragmented(Strategy::WorstFit);
    assert_eq!(e.alloc(12).unwrap().offset(), 0);
}

#[test]
fn next_fit_cursor_persists_across_calls() {
    let mut e = engine();
    e.init(96, Strategy::NextFit).unwrap();

    let a = e.alloc(8).unwrap();
    let _b = e.alloc(8).unwrap();
    e.free(a).unwrap();

    // First-fit would reuse the hole at 0; next-fit resumes past b.
    let c = e.alloc(8).unwrap();
    assert_eq!(c.offset(), 16);
}

#[test]
fn next_fit_wraps_to_the_start() {
    let mut e = engine();
    e.init(96, Strategy::NextFit).unwrap();

    let a = e.alloc(8).unwrap();
    let _b = e.alloc(8).unwrap();
    let _c = e.alloc(80).unwrap(); // consumes the tail, cursor at capacity
    e.free(a).unwrap();

    let d = e.alloc(8).unwrap();
    assert_eq!(d.offset(), 0);
}

#[test]
fn handles_die_with_the_arena() {
    let mut e = engine();
    e.init(64, Strategy::FirstFit).unwrap();
    let a = e.alloc(16).unwrap();

    e.teardown();
    e.init(64, Strategy::FirstFit).unwrap();

    let err = e.free(a).unwrap_err();
    assert!(err.is_invalid_handle());
}

#[test]
fn block_count_counts_free_and_used() {
    let mut e = engine();
    e.init(100, Strategy::FirstFit).unwrap();
    assert_eq!(e.block_count().unwrap(), 1);

    let a = e.alloc(20).unwrap();
    let _b = e.alloc(20).unwrap();
    assert_eq!(e.block_count().unwrap(), 3);

    e.free(a).unwrap();
    assert_eq!(e.block_count().unwrap(), 3); // hole, used, free tail
}

mod observation {
    use super::*;
    use heapfit::{EngineEvent, EngineObserver};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct Capture {
        events: Rc<RefCell<Vec<EngineEvent>>>,
    }

    impl EngineObserver for Capture {
        fn on_event(&self, event: &EngineEvent) {
            self.events.borrow_mut().push(event.clone());
        }
    }

    #[test]
    fn engine_reports_transitions_to_the_observer() {
        let capture = Capture::default();
        let events = capture.events.clone();

        let mut e = HeapEngine::new(EngineConfig::default()).with_observer(capture);
        e.init(64, Strategy::FirstFit).unwrap();
        let a = e.alloc(16).unwrap();
        assert!(e.alloc(1024).is_err());
        e.free(a).unwrap();
        e.teardown();

        let events = events.borrow();
        assert!(matches!(events[0], EngineEvent::Init { capacity: 64, .. }));
        assert!(matches!(events[1], EngineEvent::Alloc { offset: 0, size: 16, split: true }));
        assert!(matches!(events[2], EngineEvent::AllocFailed { requested: 1024, .. }));
        assert!(matches!(events[3], EngineEvent::Free { offset: 0, size: 16 }));
        assert!(matches!(events[4], EngineEvent::Coalesce { offset: 0, merged_size: 64 }));
        assert!(matches!(events[5], EngineEvent::Teardown { blocks: 1 }));
        assert_eq!(events.len(), 6);
    }
}
