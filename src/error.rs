//! Error types for engine operations.
//!
//! Two of the variants are ordinary, expected outcomes a caller must handle:
//! [`EngineError::OutOfMemory`] (exhaustion is recoverable, the table is left
//! untouched) and [`EngineError::InvalidHandle`] (stale or double free).
//! [`EngineError::TableFull`] and [`EngineError::OutOfRange`] indicate
//! resource exhaustion of the descriptor table or an internal defect and are
//! additionally surfaced through logging at the engine boundary.

use thiserror::Error;

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors produced by the allocation engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Operation attempted before `init` or after `teardown`.
    #[error("engine is not initialized")]
    NotInitialized,

    /// `init` called while an arena is still active.
    #[error("engine is already initialized (teardown first)")]
    AlreadyInitialized,

    /// Request rejected before touching the table (zero size, bad config).
    #[error("invalid request: {reason}")]
    InvalidRequest {
        /// Why the request was rejected.
        reason: String,
    },

    /// No free block can satisfy the request. Recoverable; the table is
    /// unchanged.
    #[error("out of memory: requested {requested} bytes, largest free block is {largest_free}")]
    OutOfMemory {
        /// Rounded request size in bytes.
        requested: usize,
        /// Largest currently free block, 0 if none.
        largest_free: usize,
    },

    /// `free` called with a handle that does not name a live used block.
    #[error("invalid handle: no used block at offset {offset}")]
    InvalidHandle {
        /// Offset carried by the rejected handle.
        offset: usize,
    },

    /// The descriptor table has no room for the block a split would create.
    /// The split is aborted and the table left unchanged.
    #[error("block table full ({capacity} descriptors)")]
    TableFull {
        /// Configured descriptor ceiling.
        capacity: usize,
    },

    /// Internal indexing beyond table bounds. Unreachable in a correct
    /// engine; checked defensively at the table boundary.
    #[error("offset {offset} does not reference a tracked block")]
    OutOfRange {
        /// Offending offset.
        offset: usize,
    },
}

impl EngineError {
    /// Creates an invalid-request error.
    pub fn invalid_request(reason: impl Into<String>) -> Self {
        Self::InvalidRequest { reason: reason.into() }
    }

    /// Creates an out-of-memory error.
    pub fn out_of_memory(requested: usize, largest_free: usize) -> Self {
        Self::OutOfMemory { requested, largest_free }
    }

    /// Creates an invalid-handle error.
    pub fn invalid_handle(offset: usize) -> Self {
        Self::InvalidHandle { offset }
    }

    /// Creates a table-full error.
    pub fn table_full(capacity: usize) -> Self {
        Self::TableFull { capacity }
    }

    /// Creates an out-of-range error.
    pub fn out_of_range(offset: usize) -> Self {
        Self::OutOfRange { offset }
    }

    /// Checks whether this is the recoverable exhaustion outcome.
    pub fn is_out_of_memory(&self) -> bool {
        matches!(self, Self::OutOfMemory { .. })
    }

    /// Checks whether this is a stale/duplicate handle rejection.
    pub fn is_invalid_handle(&self) -> bool {
        matches!(self, Self::InvalidHandle { .. })
    }

    /// Checks whether this indicates descriptor-table exhaustion.
    pub fn is_table_full(&self) -> bool {
        matches!(self, Self::TableFull { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_context() {
        let err = EngineError::out_of_memory(128, 64);
        assert_eq!(
            err.to_string(),
            "out of memory: requested 128 bytes, largest free block is 64"
        );

        let err = EngineError::invalid_handle(40);
        assert_eq!(err.to_string(), "invalid handle: no used block at offset 40");
    }

    #[test]
    fn predicates_match_variants() {
        assert!(EngineError::out_of_memory(1, 0).is_out_of_memory());
        assert!(EngineError::invalid_handle(0).is_invalid_handle());
        assert!(EngineError::table_full(16).is_table_full());
        assert!(!EngineError::NotInitialized.is_out_of_memory());
    }
}
