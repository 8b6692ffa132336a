use std::sync::Arc;

use crate::allocator::{Allocator, FailingAllocator, SystemAllocator, system};
use crate::raw_buffer::RawBuffer;

#[test]
fn test_dangling_buffer() {
    let buf = RawBuffer::<u64>::dangling(system());
    assert_eq!(buf.capacity(), 0);
    assert!(!buf.is_allocated());
}

#[test]
fn test_with_capacity() {
    let buf = RawBuffer::<u64>::try_with_capacity(16, system()).expect("allocate");
    assert_eq!(buf.capacity(), 16);
    assert!(buf.is_allocated());

    let buf = RawBuffer::<u64>::try_with_capacity(0, system()).expect("allocate");
    assert_eq!(buf.capacity(), 0);
    assert!(!buf.is_allocated());
}

#[test]
fn test_grow_is_amortized() {
    let mut buf = RawBuffer::<u32>::try_with_capacity(4, system()).expect("allocate");
    buf.grow(4, 1).expect("grow");
    assert_eq!(buf.capacity(), 8, "doubled instead of growing by one");

    buf.grow(8, 100).expect("grow");
    assert_eq!(buf.capacity(), 108, "exact need dominates the double");
}

#[test]
fn test_grow_within_capacity_is_noop() {
    let mut buf = RawBuffer::<u32>::try_with_capacity(8, system()).expect("allocate");
    buf.grow(3, 2).expect("grow");
    assert_eq!(buf.capacity(), 8);
}

#[test]
fn test_shrink_to_fit() {
    let mut buf = RawBuffer::<u32>::try_with_capacity(32, system()).expect("allocate");
    buf.shrink_to_fit(10).expect("shrink");
    assert_eq!(buf.capacity(), 10);

    buf.shrink_to_fit(0).expect("shrink");
    assert_eq!(buf.capacity(), 0);
    assert!(!buf.is_allocated());
}

#[test]
fn test_release() {
    let mut buf = RawBuffer::<u8>::try_with_capacity(64, system()).expect("allocate");
    buf.release();
    assert_eq!(buf.capacity(), 0);
    assert!(!buf.is_allocated());
    // Reusable after release.
    buf.try_resize(8).expect("resize");
    assert_eq!(buf.capacity(), 8);
}

#[test]
fn test_capacity_overflow() {
    let mut buf = RawBuffer::<u64>::dangling(system());
    let err = buf.try_resize(usize::MAX / 2).expect_err("overflow");
    assert!(matches!(
        err.kind(),
        mutseq_common::error::ErrorKind::CapacityOverflow { .. }
    ));
    assert_eq!(buf.capacity(), 0);
}

#[test]
fn test_grow_overflow_leaves_buffer_unchanged() {
    let mut buf = RawBuffer::<u64>::try_with_capacity(4, system()).expect("allocate");
    assert!(buf.grow(usize::MAX, 1).is_err());
    assert_eq!(buf.capacity(), 4);
}

#[test]
fn test_failing_allocator_budget() {
    let alloc: Arc<dyn Allocator> = Arc::new(FailingAllocator::new(1));
    let mut buf = RawBuffer::<u32>::try_with_capacity(4, alloc).expect("first allocation");
    let err = buf.grow(4, 1).expect_err("budget exhausted");
    assert!(matches!(
        err.kind(),
        mutseq_common::error::ErrorKind::Allocation { .. }
    ));
    assert_eq!(buf.capacity(), 4, "failed grow must not change capacity");
}

#[test]
fn test_failing_allocator_reset() {
    let failing = Arc::new(FailingAllocator::new(0));
    let alloc: Arc<dyn Allocator> = failing.clone();
    let mut buf = RawBuffer::<u32>::dangling(alloc);
    assert!(buf.try_resize(4).is_err());

    failing.set_budget(1);
    buf.try_resize(4).expect("budget restored");
    assert_eq!(buf.capacity(), 4);
}

#[test]
fn test_take() {
    let mut buf = RawBuffer::<u16>::try_with_capacity(12, system()).expect("allocate");
    let taken = buf.take();
    assert_eq!(taken.capacity(), 12);
    assert_eq!(buf.capacity(), 0);
    assert!(!buf.is_allocated());
}

#[test]
fn test_zero_sized_elements() {
    let mut buf = RawBuffer::<()>::dangling(system());
    assert_eq!(buf.capacity(), usize::MAX);
    assert!(!buf.is_allocated());
    buf.grow(1000, 1000).expect("grow");
    buf.shrink_to_fit(0).expect("shrink");
    assert!(!buf.is_allocated());
}

#[test]
fn test_system_allocator_roundtrip() {
    let alloc = SystemAllocator;
    let layout = std::alloc::Layout::array::<u64>(8).expect("layout");
    let region = alloc
        .reallocate(None, std::alloc::Layout::new::<u64>(), layout)
        .expect("allocate");
    let bigger = std::alloc::Layout::array::<u64>(16).expect("layout");
    let region = alloc
        .reallocate(Some(region), layout, bigger)
        .expect("reallocate");
    alloc.release(region, bigger);
}
