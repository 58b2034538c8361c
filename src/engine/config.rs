//! Engine configuration.

use crate::error::{EngineError, Result};

/// Configuration for [`HeapEngine`](crate::engine::HeapEngine).
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum number of tracked block descriptors. The table never grows
    /// past this ceiling; a split that would need one more descriptor fails
    /// with `TableFull`.
    pub max_blocks: usize,

    /// Enable statistics tracking.
    pub track_stats: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_blocks: 10_000,
            track_stats: cfg!(debug_assertions),
        }
    }
}

impl EngineConfig {
    /// Production configuration - no stats overhead.
    pub fn production() -> Self {
        Self {
            max_blocks: 10_000,
            track_stats: false,
        }
    }

    /// Debug configuration - full statistics and a small descriptor ceiling
    /// so table exhaustion surfaces early.
    pub fn debug() -> Self {
        Self {
            max_blocks: 512,
            track_stats: true,
        }
    }

    /// Sets the descriptor ceiling.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_max_blocks(mut self, max_blocks: usize) -> Self {
        self.max_blocks = max_blocks;
        self
    }

    /// Enables/disables statistics tracking.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_stats(mut self, enabled: bool) -> Self {
        self.track_stats = enabled;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.max_blocks == 0 {
            return Err(EngineError::invalid_request(
                "max_blocks must be at least 1",
            ));
        }
        Ok(())
    }
}
