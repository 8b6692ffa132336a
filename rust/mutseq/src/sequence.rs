//! The sequence container and its splice engine.

use std::{
    cmp::Ordering,
    marker::PhantomData,
    mem,
    ops::{Deref, DerefMut, Range},
    ptr,
    sync::Arc,
};

use mutseq_alloc::{allocator, allocator::Allocator, raw_buffer::RawBuffer};
use mutseq_common::{Result, error::Error};

use crate::{
    detached::DetachedBuffer,
    policy::{Clamp, IndexPolicy},
};

/// Embedded three-way comparator, used by the sorted operations and as the
/// default equality for linear search.
pub type CompareFn<T> = Box<dyn Fn(&T, &T) -> Ordering>;

/// Embedded stringifier, used by [`Sequence::join`].
pub type StringifyFn<T> = Box<dyn Fn(&T) -> Result<String>>;

/// Construction hook producing values for newly created slots.
pub type CtorFn<T> = Box<dyn FnMut() -> T>;

/// Side-effect hook invoked on each element right before it is removed and
/// dropped. The value's own `Drop` still runs afterwards.
pub type DtorFn<T> = Box<dyn FnMut(&mut T)>;

/// A contiguous growable sequence of `T` with explicit capacity control,
/// lifecycle hooks, and positional mutation at arbitrary offsets.
///
/// All structural mutation goes through a single splice primitive: remove a
/// run of elements at a position and open a gap for new ones, growing the
/// backing buffer amortized (doubling) when needed. Any mutating operation
/// that cannot get memory reports the error and leaves the sequence
/// unchanged.
///
/// The second type parameter selects the index-resolution policy
/// ([`Clamp`] by default, [`crate::Wrap`] for negative-index support); see
/// [`crate::policy`]. Out-of-range positions are clamped, never an error.
///
/// A sequence dereferences to a slice of its live elements, so the whole
/// read-only slice API (`iter`, `first`, indexing, ...) is available.
///
/// # Examples
///
/// ```
/// use mutseq::Sequence;
///
/// let mut seq: Sequence<i32> = Sequence::new();
/// seq.push(10).unwrap();
/// seq.push(30).unwrap();
/// seq.insert(1, 20).unwrap();
/// assert_eq!(seq.as_slice(), &[10, 20, 30]);
///
/// assert_eq!(seq.pop(), Some(30));
/// assert_eq!(seq.len(), 2);
/// ```
pub struct Sequence<T, P: IndexPolicy = Clamp> {
    pub(crate) buf: RawBuffer<T>,
    pub(crate) len: usize,
    pub(crate) ctor: Option<CtorFn<T>>,
    pub(crate) dtor: Option<DtorFn<T>>,
    pub(crate) default_value: Option<T>,
    pub(crate) cmp: Option<CompareFn<T>>,
    pub(crate) stringify: Option<StringifyFn<T>>,
    _policy: PhantomData<P>,
}

/// An open, uninitialized gap produced by the splice primitive. The caller
/// writes `new_len - len` elements at `ptr`, then commits by storing
/// `new_len` into the sequence length.
pub(crate) struct Gap<T> {
    pub(crate) ptr: *mut T,
    pub(crate) new_len: usize,
}

impl<T, P: IndexPolicy> Sequence<T, P> {
    /// Creates an empty sequence on the shared system allocator, without
    /// allocating.
    pub fn new() -> Sequence<T, P> {
        Sequence::new_in(allocator::system())
    }

    /// Creates an empty sequence on the given allocator, without
    /// allocating.
    pub fn new_in(alloc: Arc<dyn Allocator>) -> Sequence<T, P> {
        Sequence {
            buf: RawBuffer::dangling(alloc),
            len: 0,
            ctor: None,
            dtor: None,
            default_value: None,
            cmp: None,
            stringify: None,
            _policy: PhantomData,
        }
    }

    /// Creates an empty sequence with at least `capacity` slots
    /// preallocated. A capacity of zero allocates nothing.
    pub fn with_capacity(capacity: usize) -> Result<Sequence<T, P>> {
        Sequence::with_capacity_in(capacity, allocator::system())
    }

    /// Creates an empty sequence with at least `capacity` slots
    /// preallocated on the given allocator.
    pub fn with_capacity_in(capacity: usize, alloc: Arc<dyn Allocator>) -> Result<Sequence<T, P>> {
        let mut seq = Sequence::new_in(alloc);
        seq.buf.try_resize(capacity)?;
        Ok(seq)
    }

    /// Returns the number of live elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the sequence holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of elements the sequence can hold without
    /// reallocating.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// Returns the number of elements that can be added without
    /// reallocation.
    #[inline]
    pub fn spare_capacity(&self) -> usize {
        self.buf.capacity() - self.len
    }

    /// Returns the allocator this sequence's buffer grows and frees
    /// through.
    #[inline]
    pub fn allocator(&self) -> &Arc<dyn Allocator> {
        self.buf.allocator()
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

    /// Returns the bytes of the live elements.
    #[inline]
    pub fn as_bytes(&self) -> &[u8]
    where
        T: bytemuck::NoUninit,
    {
        bytemuck::cast_slice(self.as_slice())
    }

    /// Returns a reference to the element at the policy-resolved position,
    /// or `None` if the sequence is empty.
    #[inline]
    pub fn get(&self, index: P::Index) -> Option<&T> {
        let pos = P::element(index, self.len)?;
        Some(unsafe { &*self.buf.as_ptr().add(pos) })
    }

    /// Returns a mutable reference to the element at the policy-resolved
    /// position, or `None` if the sequence is empty.
    #[inline]
    pub fn get_mut(&mut self, index: P::Index) -> Option<&mut T> {
        let pos = P::element(index, self.len)?;
        Some(unsafe { &mut *self.buf.as_ptr().add(pos) })
    }

    /// Sets the construction hook for slots created by [`Sequence::resize`]
    /// and [`Sequence::emplace`].
    pub fn set_ctor(&mut self, ctor: impl FnMut() -> T + 'static) {
        self.ctor = Some(Box::new(ctor));
    }

    /// Sets the destructor hook, invoked on each element right before it is
    /// removed by `remove`, `splice`, `truncate`, `resize`, `release`, or
    /// drop of the sequence. Operations that transfer the element out
    /// (`pop`, `shift`, `extract`, `detach`) bypass it.
    pub fn set_dtor(&mut self, dtor: impl FnMut(&mut T) + 'static) {
        self.dtor = Some(Box::new(dtor));
    }

    /// Clears both lifecycle hooks.
    pub fn clear_hooks(&mut self) {
        self.ctor = None;
        self.dtor = None;
    }

    /// Sets the template value used for new slots when no construction hook
    /// is configured.
    pub fn set_default_value(&mut self, value: T) {
        self.default_value = Some(value);
    }

    /// Sets the embedded comparator used by `sort`, `sorted_search`,
    /// `sorted_insert`, and comparator-driven linear search.
    pub fn set_compare(&mut self, cmp: impl Fn(&T, &T) -> Ordering + 'static) {
        self.cmp = Some(Box::new(cmp));
    }

    /// Sets the embedded stringifier used by [`Sequence::join`].
    pub fn set_stringify(&mut self, stringify: impl Fn(&T) -> Result<String> + 'static) {
        self.stringify = Some(Box::new(stringify));
    }

    /// Ensures room for at least `extra` more elements. On error the
    /// sequence is unchanged.
    pub fn reserve(&mut self, extra: usize) -> Result<()> {
        self.buf.grow(self.len, extra)
    }

    /// Releases unused capacity, freeing the buffer entirely when the
    /// sequence is empty. On error the sequence is unchanged.
    pub fn shrink_to_fit(&mut self) -> Result<()> {
        self.buf.shrink_to_fit(self.len)
    }

    /// Appends an element.
    pub fn push(&mut self, value: T) -> Result<()> {
        if self.len == self.buf.capacity() {
            self.buf.grow(self.len, 1)?;
        }
        unsafe { ptr::write(self.buf.as_ptr().add(self.len), value) };
        self.len += 1;
        Ok(())
    }

    /// Removes and returns the last element. The destructor hook does not
    /// run; ownership transfers to the caller.
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        Some(unsafe { ptr::read(self.buf.as_ptr().add(self.len)) })
    }

    /// Inserts an element at the front.
    pub fn unshift(&mut self, value: T) -> Result<()> {
        let gap = self.open_gap(0, 0, 1)?;
        unsafe { ptr::write(gap.ptr, value) };
        self.len = gap.new_len;
        Ok(())
    }

    /// Removes and returns the first element. The destructor hook does not
    /// run; ownership transfers to the caller.
    pub fn shift(&mut self) -> Option<T> {
        self.extract_at(0)
    }

    /// Inserts an element at the policy-resolved position.
    pub fn insert(&mut self, index: P::Index, value: T) -> Result<()> {
        let pos = P::insertion(index, self.len);
        let gap = self.open_gap(pos, 0, 1)?;
        unsafe { ptr::write(gap.ptr, value) };
        self.len = gap.new_len;
        Ok(())
    }

    /// Removes the element at the policy-resolved position, running the
    /// destructor hook. Returns `false` when the sequence is empty.
    pub fn remove(&mut self, index: P::Index) -> bool {
        let Some(pos) = P::element(index, self.len) else {
            return false;
        };
        let gap = self.open_gap(pos, 1, 0).expect("remove");
        self.len = gap.new_len;
        true
    }

    /// Removes up to `count` elements starting at the policy-resolved
    /// position, running the destructor hook on each. Returns the number of
    /// elements removed.
    pub fn remove_many(&mut self, index: P::Index, count: usize) -> usize {
        let pos = P::insertion(index, self.len);
        let removed = count.min(self.len - pos);
        if removed == 0 {
            return 0;
        }
        let gap = self.open_gap(pos, removed, 0).expect("remove");
        self.len = gap.new_len;
        removed
    }

    /// Removes the element at the policy-resolved position *without*
    /// running the destructor hook, and returns it.
    pub fn extract(&mut self, index: P::Index) -> Option<T> {
        let pos = P::element(index, self.len)?;
        self.extract_at(pos)
    }

    /// Inserts one slot at the policy-resolved position, initialized by the
    /// construction hook or the default value. Fails with no mutation when
    /// neither is configured or growth fails.
    pub fn emplace(&mut self, index: P::Index) -> Result<()>
    where
        T: Clone,
    {
        if self.ctor.is_none() && self.default_value.is_none() {
            return Err(Error::invalid_operation("emplace"));
        }
        let pos = P::insertion(index, self.len);
        let gap = self.open_gap(pos, 0, 1)?;
        let new_len = gap.new_len;
        let value = self.new_element()?;
        unsafe { ptr::write(self.buf.as_ptr().add(pos), value) };
        self.len = new_len;
        Ok(())
    }

    /// Replaces `remove_count` elements at the policy-resolved position
    /// with clones of `replacement`.
    ///
    /// The removal count is clamped to the elements that exist past the
    /// position; the destructor hook runs on each removed element. If the
    /// buffer cannot grow, nothing is mutated. If a clone panics, the
    /// elements past the splice point are leaked, never exposed
    /// uninitialized.
    pub fn splice(&mut self, index: P::Index, remove_count: usize, replacement: &[T]) -> Result<()>
    where
        T: Clone,
    {
        let pos = P::insertion(index, self.len);
        let gap = self.open_gap(pos, remove_count, replacement.len())?;
        for (i, value) in replacement.iter().enumerate() {
            unsafe { ptr::write(gap.ptr.add(i), value.clone()) };
        }
        self.len = gap.new_len;
        Ok(())
    }

    /// Adjusts the length within the existing capacity. This never
    /// reallocates; a target beyond the capacity is truncated to it.
    ///
    /// Growing constructs each new slot with the construction hook, or with
    /// a clone of the default value; fails with no mutation when neither is
    /// configured. Shrinking removes the trailing elements exactly like
    /// [`Sequence::truncate`].
    pub fn resize(&mut self, new_len: usize) -> Result<()>
    where
        T: Clone,
    {
        let new_len = new_len.min(self.buf.capacity());
        if new_len > self.len {
            if self.ctor.is_none() && self.default_value.is_none() {
                return Err(Error::invalid_operation("resize"));
            }
            while self.len < new_len {
                let value = self.new_element()?;
                unsafe { ptr::write(self.buf.as_ptr().add(self.len), value) };
                self.len += 1;
            }
        } else {
            self.truncate(new_len);
        }
        Ok(())
    }

    /// Removes the elements past `new_len`, running the destructor hook on
    /// each in reverse index order. Does nothing when `new_len` is not
    /// below the current length.
    pub fn truncate(&mut self, new_len: usize) {
        if new_len >= self.len {
            return;
        }
        let count = self.len - new_len;
        self.len = new_len;
        unsafe { self.finalize_range(new_len, count) };
    }

    /// Removes all elements, running the destructor hook on each in
    /// reverse index order. Capacity is retained.
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Removes all elements (destructor hook in reverse index order),
    /// frees the buffer, and resets the sequence to its freshly
    /// constructed state: hooks, comparator, stringifier, and default
    /// value are cleared; the allocator is retained.
    pub fn release(&mut self) {
        self.truncate(0);
        self.buf.release();
        self.ctor = None;
        self.dtor = None;
        self.default_value = None;
        self.cmp = None;
        self.stringify = None;
    }

    /// Exchanges the elements at two policy-resolved positions. Returns
    /// `false` when the sequence is empty.
    pub fn swap_elements(&mut self, a: P::Index, b: P::Index) -> bool {
        let (Some(a), Some(b)) = (P::element(a, self.len), P::element(b, self.len)) else {
            return false;
        };
        self.as_mut_slice().swap(a, b);
        true
    }

    /// Reverses the order of the elements in place.
    pub fn reverse(&mut self) {
        self.as_mut_slice().reverse();
    }

    /// Exchanges the two sequences' buffers, lengths, and capacities.
    /// Hooks, comparators, stringifiers, and default values stay put.
    pub fn swap_buffers(&mut self, other: &mut Sequence<T, P>) {
        mem::swap(&mut self.buf, &mut other.buf);
        mem::swap(&mut self.len, &mut other.len);
    }

    /// Exchanges the two sequences entirely: buffers, lengths, hooks,
    /// comparators, stringifiers, and default values.
    pub fn swap_all(&mut self, other: &mut Sequence<T, P>) {
        mem::swap(self, other);
    }

    /// Finalizes the current buffer (destructor hooks, element drops, and
    /// the region itself), then adopts the detached buffer's region,
    /// elements, and embedded allocator.
    pub fn attach(&mut self, buffer: DetachedBuffer<T>) {
        self.truncate(0);
        self.buf.release();
        let (buf, len) = buffer.into_parts();
        self.buf = buf;
        self.len = len;
    }

    /// Hands the buffer and its elements to the caller and resets the
    /// sequence to empty. No destructor hooks run: ownership ends, not
    /// the elements' lifetime.
    ///
    /// The buffer is shrunk to fit first, best effort: if the shrink
    /// cannot allocate, the larger region is handed over as-is.
    pub fn detach(&mut self) -> DetachedBuffer<T> {
        let _ = self.buf.shrink_to_fit(self.len);
        let buf = self.buf.take();
        let len = mem::replace(&mut self.len, 0);
        DetachedBuffer::from_parts(buf, len)
    }

    /// Copies the elements in `range` (bounds clamped to the sequence, an
    /// inverted range yields an empty result) into a new sequence on the
    /// same allocator, carrying the default value along. Hooks and
    /// comparators are not copied.
    pub fn slice(&self, range: Range<usize>) -> Result<Sequence<T, P>>
    where
        T: Clone,
    {
        let start = range.start.min(self.len);
        let end = range.end.min(self.len).max(start);
        let mut out = Sequence::new_in(self.buf.allocator().clone());
        out.default_value = self.default_value.clone();
        let items = &self.as_slice()[start..end];
        let gap = out.open_gap(0, 0, items.len())?;
        for (i, value) in items.iter().enumerate() {
            unsafe { ptr::write(gap.ptr.add(i), value.clone()) };
        }
        out.len = gap.new_len;
        Ok(out)
    }

    /// Copies the whole sequence; same semantics as [`Sequence::slice`]
    /// over the full range.
    pub fn clone_seq(&self) -> Result<Sequence<T, P>>
    where
        T: Clone,
    {
        self.slice(0..self.len)
    }

    /// Verifies the container invariants.
    ///
    /// # Panics
    ///
    /// Panics if the internal state is inconsistent.
    pub fn verify(&self) {
        assert!(self.buf.capacity() >= self.len);
        if mem::size_of::<T>() != 0 {
            assert_eq!(self.buf.is_allocated(), self.buf.capacity() > 0);
        }
    }

    /// The splice primitive: removes `remove` elements at `pos` and opens a
    /// gap of `add` uninitialized slots there, growing and relocating the
    /// tail as needed.
    ///
    /// `pos` and `remove` are clamped to the live range. Growing is the
    /// only failure mode, and it happens before any other effect. On
    /// success the sequence length is parked at `pos` until the caller
    /// fills the gap and commits `new_len`; a panicking destructor hook,
    /// element drop, or fill therefore leaks the tail instead of exposing
    /// uninitialized slots.
    pub(crate) fn open_gap(&mut self, pos: usize, remove: usize, add: usize) -> Result<Gap<T>> {
        let len = self.len;
        let pos = pos.min(len);
        let remove = remove.min(len - pos);
        if add > remove {
            self.buf.grow(len, add - remove)?;
        }
        self.len = pos;
        unsafe {
            self.finalize_range(pos, remove);
            let base = self.buf.as_ptr().add(pos);
            if remove != add && pos + remove < len {
                ptr::copy(base.add(remove), base.add(add), len - pos - remove);
            }
            Ok(Gap {
                ptr: base,
                new_len: len - remove + add,
            })
        }
    }

    /// Runs the destructor hook (reverse index order) on the `count`
    /// elements at `pos`, then drops them in place.
    ///
    /// # Safety
    ///
    /// The slots must hold live elements already excluded from `self.len`.
    unsafe fn finalize_range(&mut self, pos: usize, count: usize) {
        if count == 0 {
            return;
        }
        let base = unsafe { self.buf.as_ptr().add(pos) };
        if let Some(dtor) = self.dtor.as_mut() {
            for i in (0..count).rev() {
                dtor(unsafe { &mut *base.add(i) });
            }
        }
        unsafe { ptr::drop_in_place(ptr::slice_from_raw_parts_mut(base, count)) };
    }

    /// Removes the element at `pos` without hooks and returns it.
    fn extract_at(&mut self, pos: usize) -> Option<T> {
        if pos >= self.len {
            return None;
        }
        unsafe {
            let base = self.buf.as_ptr().add(pos);
            let value = ptr::read(base);
            self.len -= 1;
            if pos < self.len {
                ptr::copy(base.add(1), base, self.len - pos);
            }
            Some(value)
        }
    }

    /// Produces a value for a fresh slot from the construction hook or the
    /// default value.
    fn new_element(&mut self) -> Result<T>
    where
        T: Clone,
    {
        if let Some(ctor) = self.ctor.as_mut() {
            Ok(ctor())
        } else if let Some(value) = self.default_value.as_ref() {
            Ok(value.clone())
        } else {
            Err(Error::invalid_operation("construct"))
        }
    }
}

impl<T, P: IndexPolicy> Drop for Sequence<T, P> {
    fn drop(&mut self) {
        // Elements here; the region itself is released by RawBuffer.
        self.truncate(0);
    }
}

impl<T, P: IndexPolicy> Default for Sequence<T, P> {
    fn default() -> Sequence<T, P> {
        Sequence::new()
    }
}

impl<T, P: IndexPolicy> Deref for Sequence<T, P> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, P: IndexPolicy> DerefMut for Sequence<T, P> {
    #[inline]
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T: std::fmt::Debug, P: IndexPolicy> std::fmt::Debug for Sequence<T, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sequence")
            .field("values", &self.as_slice())
            .field("len", &self.len)
            .field("cap", &self.capacity())
            .finish_non_exhaustive()
    }
}
