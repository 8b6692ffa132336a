//! The pluggable allocator abstraction used by [`crate::raw_buffer::RawBuffer`].

use std::{
    alloc::Layout,
    ptr::NonNull,
    sync::{
        Arc, OnceLock,
        atomic::{AtomicUsize, Ordering},
    },
};

/// A reallocate/release pair over raw byte regions.
///
/// An allocator is chosen per buffer at construction time and travels with
/// the buffer for its whole lifetime, so a region is always resized and
/// released through the allocator that produced it.
///
/// # Contract
///
/// - `reallocate` with `region == None` performs a fresh allocation of
///   `new_layout`; `old_layout` describes the (empty) prior state.
/// - `reallocate` with `region == Some(ptr)` resizes the region previously
///   obtained from this allocator with `old_layout`. On success the old
///   pointer must not be used again; on failure (`None`) the old region
///   remains valid and untouched.
/// - `new_layout.size()` is never zero; zero-capacity transitions go through
///   `release`.
/// - `release` frees a region previously obtained from this allocator.
pub trait Allocator: Send + Sync {
    /// Allocates or resizes a region, returning the new region pointer,
    /// or `None` if the request cannot be satisfied.
    fn reallocate(
        &self,
        region: Option<NonNull<u8>>,
        old_layout: Layout,
        new_layout: Layout,
    ) -> Option<NonNull<u8>>;

    /// Releases a region previously obtained from this allocator.
    fn release(&self, region: NonNull<u8>, layout: Layout);
}

/// The default allocator: the process heap via `std::alloc`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemAllocator;

impl Allocator for SystemAllocator {
    fn reallocate(
        &self,
        region: Option<NonNull<u8>>,
        old_layout: Layout,
        new_layout: Layout,
    ) -> Option<NonNull<u8>> {
        assert_ne!(new_layout.size(), 0);
        assert_eq!(old_layout.align(), new_layout.align());
        let ptr = match region {
            None => unsafe { std::alloc::alloc(new_layout) },
            Some(region) => unsafe {
                std::alloc::realloc(region.as_ptr(), old_layout, new_layout.size())
            },
        };
        NonNull::new(ptr)
    }

    fn release(&self, region: NonNull<u8>, layout: Layout) {
        unsafe { std::alloc::dealloc(region.as_ptr(), layout) };
    }
}

/// Returns the shared process-wide [`SystemAllocator`] handle.
pub fn system() -> Arc<dyn Allocator> {
    static SYSTEM: OnceLock<Arc<dyn Allocator>> = OnceLock::new();
    SYSTEM.get_or_init(|| Arc::new(SystemAllocator)).clone()
}

/// An allocator wrapper that starts failing after a configured number of
/// successful reallocations.
///
/// `release` always passes through, so buffers created before the budget ran
/// out can still be freed. Useful for exercising the no-mutation-on-failure
/// guarantees of growable containers.
pub struct FailingAllocator {
    inner: Arc<dyn Allocator>,
    budget: AtomicUsize,
}

impl FailingAllocator {
    /// Creates an allocator that lets `budget` reallocations through before
    /// failing every subsequent one.
    pub fn new(budget: usize) -> FailingAllocator {
        FailingAllocator {
            inner: system(),
            budget: AtomicUsize::new(budget),
        }
    }

    /// Creates a failing wrapper around a specific inner allocator.
    pub fn with_inner(inner: Arc<dyn Allocator>, budget: usize) -> FailingAllocator {
        FailingAllocator {
            inner,
            budget: AtomicUsize::new(budget),
        }
    }

    /// Resets the remaining success budget.
    pub fn set_budget(&self, budget: usize) {
        self.budget.store(budget, Ordering::Relaxed);
    }

    fn consume(&self) -> bool {
        self.budget
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |budget| {
                budget.checked_sub(1)
            })
            .is_ok()
    }
}

impl Allocator for FailingAllocator {
    fn reallocate(
        &self,
        region: Option<NonNull<u8>>,
        old_layout: Layout,
        new_layout: Layout,
    ) -> Option<NonNull<u8>> {
        if !self.consume() {
            return None;
        }
        self.inner.reallocate(region, old_layout, new_layout)
    }

    fn release(&self, region: NonNull<u8>, layout: Layout) {
        self.inner.release(region, layout);
    }
}
