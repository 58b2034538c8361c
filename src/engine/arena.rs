//! The backing memory region.
//!
//! The arena is reserved from the host allocator exactly once at `init` and
//! released exactly once at teardown (or drop). The engine owns it
//! exclusively; callers only ever see offsets into it, resolved to addresses
//! through the engine.

use std::alloc::{Layout, alloc, dealloc};
use std::ptr::NonNull;

use crate::error::{EngineError, Result};

/// A single contiguous byte region of fixed capacity.
pub struct Arena {
    ptr: NonNull<u8>,
    capacity: usize,
}

impl Arena {
    /// Reserves a region of `capacity` bytes from the host allocator.
    ///
    /// `capacity` must be non-zero and already rounded to the engine's
    /// allocation grain; the engine validates both before calling.
    pub fn reserve(capacity: usize) -> Result<Self> {
        debug_assert!(capacity > 0);

        let layout = Layout::from_size_align(capacity, 1)
            .map_err(|_| EngineError::invalid_request("arena layout overflow"))?;

        // SAFETY: Reserving the backing region via the global allocator.
        // - layout has non-zero size (validated above) and align 1
        // - alloc returns null on failure, handled below
        let ptr = unsafe { alloc(layout) };
        let ptr = NonNull::new(ptr).ok_or_else(|| EngineError::out_of_memory(capacity, 0))?;

        Ok(Self { ptr, capacity })
    }

    /// Total capacity in bytes.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Resolves an offset to an address inside the region.
    ///
    /// Fails with `OutOfRange` for offsets at or past the end; the engine
    /// only resolves offsets of live blocks, so a failure here indicates a
    /// defect rather than caller input.
    pub fn at(&self, offset: usize) -> Result<NonNull<u8>> {
        if offset >= self.capacity {
            return Err(EngineError::out_of_range(offset));
        }

        // SAFETY: Computing an interior pointer.
        // - ptr is valid for capacity bytes (reserved in `reserve`)
        // - offset < capacity (checked above), so the result stays in bounds
        let raw = unsafe { self.ptr.as_ptr().add(offset) };

        // SAFETY: raw is derived from a NonNull base by an in-bounds add.
        Ok(unsafe { NonNull::new_unchecked(raw) })
    }
}

impl Drop for Arena {
    fn drop(&mut self) {
        // SAFETY: Releasing the region.
        // - ptr was obtained from alloc() in `reserve` with this exact layout
        // - Drop runs exactly once
        unsafe {
            dealloc(
                self.ptr.as_ptr(),
                Layout::from_size_align_unchecked(self.capacity, 1),
            );
        }
    }
}
