//! Allocation tracking for interrupt-path tests.
//!
//! The tick handler runs in interrupt context and must never allocate. A test
//! binary installs [`TrackingAllocator`] as its global allocator and wraps
//! the code under test in an [`AllocationGuard`]:
//!
//! ```rust,ignore
//! #[global_allocator]
//! static ALLOC: TrackingAllocator = TrackingAllocator;
//!
//! let guard = track();
//! scheduler.on_tick();
//! assert_no_alloc!(guard);
//! ```
//!
//! Counts are per thread, so parallel tests do not disturb each other.

use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::Cell;

thread_local! {
    static ALLOCATION_COUNT: Cell<usize> = const { Cell::new(0) };
    static ALLOCATION_BYTES: Cell<usize> = const { Cell::new(0) };
    static TRACKING_ENABLED: Cell<bool> = const { Cell::new(false) };
}

/// System allocator wrapper that counts allocations while tracking is on.
#[derive(Debug)]
pub struct TrackingAllocator;

unsafe impl GlobalAlloc for TrackingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = unsafe { System.alloc(layout) };
        if !ptr.is_null() && TRACKING_ENABLED.with(Cell::get) {
            ALLOCATION_COUNT.with(|count| count.set(count.get().saturating_add(1)));
            ALLOCATION_BYTES.with(|bytes| bytes.set(bytes.get().saturating_add(layout.size())));
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        unsafe { System.dealloc(ptr, layout) };
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        let new_ptr = unsafe { System.realloc(ptr, layout, new_size) };
        if !new_ptr.is_null() && TRACKING_ENABLED.with(Cell::get) && new_size > layout.size() {
            ALLOCATION_COUNT.with(|count| count.set(count.get().saturating_add(1)));
            ALLOCATION_BYTES
                .with(|bytes| bytes.set(bytes.get().saturating_add(new_size - layout.size())));
        }
        new_ptr
    }
}

/// Counts allocations made on this thread while alive.
#[derive(Debug)]
pub struct AllocationGuard {
    start_count: usize,
    start_bytes: usize,
}

impl AllocationGuard {
    /// Start tracking.
    pub fn new() -> Self {
        TRACKING_ENABLED.with(|e| e.set(true));
        Self {
            start_count: ALLOCATION_COUNT.with(Cell::get),
            start_bytes: ALLOCATION_BYTES.with(Cell::get),
        }
    }

    /// Allocations since the guard was created.
    pub fn allocations(&self) -> usize {
        ALLOCATION_COUNT
            .with(Cell::get)
            .saturating_sub(self.start_count)
    }

    /// Bytes allocated since the guard was created.
    pub fn bytes(&self) -> usize {
        ALLOCATION_BYTES
            .with(Cell::get)
            .saturating_sub(self.start_bytes)
    }
}

impl Default for AllocationGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for AllocationGuard {
    fn drop(&mut self) {
        TRACKING_ENABLED.with(|e| e.set(false));
    }
}

/// Start tracking allocations on this thread.
pub fn track() -> AllocationGuard {
    AllocationGuard::new()
}

/// Fail if the guard saw any allocation.
#[macro_export]
macro_rules! assert_no_alloc {
    ($guard:expr) => {
        $crate::assert_no_alloc!($guard, "interrupt path")
    };
    ($guard:expr, $context:expr) => {{
        let guard = &$guard;
        let allocs = guard.allocations();
        if allocs > 0 {
            panic!(
                "allocation in '{}': {} allocations ({} bytes) at {}:{}",
                $context,
                allocs,
                guard.bytes(),
                file!(),
                line!()
            );
        }
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_no_allocations() {
        let guard = track();
        let x = 42;
        let _y = x + 1;
        assert_no_alloc!(guard);
    }

    #[test]
    #[should_panic(expected = "allocation in 'vec'")]
    fn test_guard_with_allocations() {
        let guard = track();
        let v: Vec<i32> = vec![1, 2, 3];
        std::hint::black_box(&v);
        assert_no_alloc!(guard, "vec");
    }

    #[test]
    fn test_guard_counts() {
        let guard = track();
        let v: Vec<i32> = vec![1, 2, 3, 4, 5];
        std::hint::black_box(&v);
        assert!(guard.allocations() > 0);
        assert!(guard.bytes() > 0);
    }
}
