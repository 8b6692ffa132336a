//! An owned, reallocatable region of element slots.

use std::{alloc::Layout, mem::size_of, ptr::NonNull, sync::Arc};

use mutseq_common::{Result, error::Error};

use crate::allocator::Allocator;

/// An owned raw region of `capacity` slots of `T`.
///
/// `RawBuffer` manages memory only: it never inspects, initializes, or drops
/// the elements stored in its slots. The owner is responsible for tracking
/// which slots hold live values. When dropped, the buffer releases its region
/// but not the contents.
///
/// The pointer is dangling exactly when the capacity is zero; no allocation
/// is held in that state. Zero-sized element types never allocate at all and
/// report a conceptually infinite capacity.
///
/// All capacity arithmetic is checked against the platform's addressable
/// range before the allocator is invoked; overflow and allocator failure
/// both leave the buffer untouched.
pub struct RawBuffer<T> {
    ptr: NonNull<T>,
    cap: usize,
    alloc: Arc<dyn Allocator>,
}

// The region is exclusively owned and the allocator handle is Send + Sync;
// thread-safety of the slot contents is the owner's concern.
unsafe impl<T: Send> Send for RawBuffer<T> {}
unsafe impl<T: Sync> Sync for RawBuffer<T> {}

impl<T> RawBuffer<T> {
    /// Capacity multiplier for amortized growth. Doubling keeps appends
    /// amortized O(1); the target is never below what is strictly needed.
    const GROWTH_FACTOR: usize = 2;

    /// Creates an empty buffer bound to `alloc`, without allocating.
    pub fn dangling(alloc: Arc<dyn Allocator>) -> RawBuffer<T> {
        RawBuffer {
            ptr: NonNull::dangling(),
            cap: if size_of::<T>() == 0 { usize::MAX } else { 0 },
            alloc,
        }
    }

    /// Creates a buffer with at least `capacity` slots.
    ///
    /// A `capacity` of zero allocates nothing.
    pub fn try_with_capacity(capacity: usize, alloc: Arc<dyn Allocator>) -> Result<RawBuffer<T>> {
        let mut buf = RawBuffer::dangling(alloc);
        buf.try_resize(capacity)?;
        Ok(buf)
    }

    /// Returns the number of slots backed by the current region.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.cap
    }

    /// Returns the base pointer of the region (dangling when unallocated).
    #[inline]
    pub fn as_ptr(&self) -> *mut T {
        self.ptr.as_ptr()
    }

    /// Returns `true` if the buffer currently holds an allocation.
    #[inline]
    pub fn is_allocated(&self) -> bool {
        size_of::<T>() != 0 && self.cap != 0
    }

    /// Returns the allocator this buffer resizes and frees through.
    #[inline]
    pub fn allocator(&self) -> &Arc<dyn Allocator> {
        &self.alloc
    }

    /// Resizes the region to exactly `new_cap` slots.
    ///
    /// A `new_cap` of zero releases the region entirely. On error the buffer
    /// is unchanged.
    pub fn try_resize(&mut self, new_cap: usize) -> Result<()> {
        if size_of::<T>() == 0 || new_cap == self.cap {
            return Ok(());
        }
        if new_cap == 0 {
            self.release();
            return Ok(());
        }
        let new_layout = Layout::array::<T>(new_cap)
            .map_err(|_| Error::capacity_overflow(new_cap, size_of::<T>()))?;
        let region = (self.cap != 0).then(|| self.ptr.cast::<u8>());
        let ptr = self
            .alloc
            .reallocate(region, Self::layout_for(self.cap), new_layout)
            .ok_or_else(|| Error::allocation(new_layout.size()))?;
        self.ptr = ptr.cast();
        self.cap = new_cap;
        Ok(())
    }

    /// Ensures room for `len + extra` slots, growing amortized.
    ///
    /// The target capacity is the larger of `len + extra` and
    /// `capacity * GROWTH_FACTOR`. Does nothing when the current region
    /// already suffices. On error the buffer is unchanged.
    pub fn grow(&mut self, len: usize, extra: usize) -> Result<()> {
        let needed = len
            .checked_add(extra)
            .ok_or_else(|| Error::capacity_overflow(usize::MAX, size_of::<T>()))?;
        if needed <= self.cap {
            return Ok(());
        }
        self.try_resize(needed.max(self.cap.saturating_mul(Self::GROWTH_FACTOR)))
    }

    /// Shrinks the region to exactly `len` slots, releasing it entirely when
    /// `len` is zero. On error the buffer is unchanged.
    pub fn shrink_to_fit(&mut self, len: usize) -> Result<()> {
        if self.cap == len {
            return Ok(());
        }
        self.try_resize(len)
    }

    /// Releases the region and returns the buffer to the unallocated state.
    pub fn release(&mut self) {
        if self.is_allocated() {
            self.alloc
                .release(self.ptr.cast(), Self::layout_for(self.cap));
        }
        self.ptr = NonNull::dangling();
        self.cap = if size_of::<T>() == 0 { usize::MAX } else { 0 };
    }

    /// Takes the buffer out, leaving an empty one bound to the same
    /// allocator in its place.
    pub fn take(&mut self) -> RawBuffer<T> {
        let empty = RawBuffer::dangling(self.alloc.clone());
        std::mem::replace(self, empty)
    }

    /// Layout of a region whose capacity was validated when it was created.
    fn layout_for(cap: usize) -> Layout {
        if size_of::<T>() == 0 || cap == 0 {
            Layout::new::<T>()
        } else {
            Layout::array::<T>(cap).expect("layout")
        }
    }
}

impl<T> Drop for RawBuffer<T> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<T> std::fmt::Debug for RawBuffer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawBuffer")
            .field("capacity", &self.cap)
            .field("allocated", &self.is_allocated())
            .finish_non_exhaustive()
    }
}
