//! Arena-backed heap allocation simulator.
//!
//! This crate models the internals of a heap allocator as a teaching tool:
//! one pre-reserved arena, a block table tracking every used and free span,
//! and the four classic placement strategies (first-fit, next-fit, best-fit,
//! worst-fit) deciding which free block services each request. Splits carve
//! used blocks out of free ones; frees merge adjacent free blocks back
//! together. It is a model, not a production allocator: single-threaded,
//! one arena per engine, a fixed 4-byte rounding grain and nothing else.
//!
//! # Example
//!
//! ```
//! use heapfit::{EngineConfig, HeapEngine, Strategy};
//!
//! let mut engine = HeapEngine::new(EngineConfig::default());
//! engine.init(4096, Strategy::FirstFit)?;
//!
//! let handle = engine.alloc(100)?;
//! assert_eq!(engine.block_count()?, 2); // used block + free remainder
//!
//! engine.free(handle)?;
//! assert_eq!(engine.block_count()?, 1); // merged back to one free block
//!
//! engine.teardown();
//! # Ok::<(), heapfit::EngineError>(())
//! ```
//!
//! # Features
//!
//! - `logging` (default): ships [`TracingObserver`] and logs defect-class
//!   failures (`TableFull`) at the engine boundary via `tracing`. The core
//!   table and strategy code never logs; everything else observable goes
//!   through the [`EngineObserver`] seam.

#![warn(missing_docs)]

pub mod engine;
pub mod error;
pub mod observer;
pub mod stats;
pub mod utils;

pub use engine::{
    ALLOC_GRAIN, Block, BlockKind, BlockTable, EngineConfig, Handle, HeapEngine, Strategy,
};
pub use error::{EngineError, Result};
pub use observer::{EngineEvent, EngineObserver};
#[cfg(feature = "logging")]
pub use observer::TracingObserver;
pub use stats::{EngineStats, EngineStatsSnapshot};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
