//! An owned buffer detached from a sequence.

use std::{mem::ManuallyDrop, ptr};

use mutseq_alloc::raw_buffer::RawBuffer;

/// A backing buffer, together with its live elements, after it has been
/// detached from a [`crate::Sequence`].
///
/// Detaching transfers ownership without running the sequence's destructor
/// hook: the elements keep living here and are dropped normally when the
/// `DetachedBuffer` is dropped. Reattach it to a sequence with
/// [`crate::Sequence::attach`]: the buffer (and the allocator embedded in
/// it) moves back in, reproducing the original sequence contents.
pub struct DetachedBuffer<T> {
    buf: RawBuffer<T>,
    len: usize,
}

impl<T> DetachedBuffer<T> {
    pub(crate) fn from_parts(buf: RawBuffer<T>, len: usize) -> DetachedBuffer<T> {
        debug_assert!(len <= buf.capacity());
        DetachedBuffer { buf, len }
    }

    pub(crate) fn into_parts(self) -> (RawBuffer<T>, usize) {
        let mut this = ManuallyDrop::new(self);
        (this.buf.take(), this.len)
    }

    /// Returns the number of live elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the buffer holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of element slots backed by the region.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// Returns the live elements as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        unsafe { std::slice::from_raw_parts(self.buf.as_ptr(), self.len) }
    }

    /// Returns the live elements as a mutable slice.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        unsafe { std::slice::from_raw_parts_mut(self.buf.as_ptr(), self.len) }
    }
}

impl<T> Drop for DetachedBuffer<T> {
    fn drop(&mut self) {
        // Elements first; the region itself is released by RawBuffer.
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.buf.as_ptr(), self.len));
        }
    }
}

impl<T> std::ops::Deref for DetachedBuffer<T> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> std::ops::DerefMut for DetachedBuffer<T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for DetachedBuffer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetachedBuffer")
            .field("values", &self.as_slice())
            .field("len", &self.len)
            .field("cap", &self.capacity())
            .finish_non_exhaustive()
    }
}
