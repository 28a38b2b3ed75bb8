//! Placeholder guid allocation

use lb_core::Guid;
use std::sync::atomic::{AtomicI64, Ordering};

/// Default first placeholder, matching the catalog client convention
pub const DEFAULT_GUID_START: i64 = -1000;

/// Hands out strictly decreasing negative guids.
///
/// One allocator is shared (behind an `Arc`) by every translation running in
/// the process, so two concurrent runs never see the same value.
#[derive(Debug)]
pub struct GuidAllocator {
    next: AtomicI64,
}

impl GuidAllocator {
    /// Create an allocator whose first guid is `start` (must be negative).
    pub fn new(start: i64) -> Self {
        debug_assert!(start < 0, "guid allocator must start below zero");
        Self {
            next: AtomicI64::new(start),
        }
    }

    /// Allocate the next placeholder guid.
    pub fn next(&self) -> Guid {
        Guid::placeholder(self.next.fetch_sub(1, Ordering::SeqCst))
    }

    /// Value the next call to [`next`](Self::next) will return
    pub fn peek(&self) -> i64 {
        self.next.load(Ordering::SeqCst)
    }
}

impl Default for GuidAllocator {
    fn default() -> Self {
        Self::new(DEFAULT_GUID_START)
    }
}
