//! Linear search, sorted search, sorting, and sorted insertion.

use std::{cmp::Ordering, ptr};

use mutseq_common::{Result, error::Error};

use crate::{policy::IndexPolicy, sequence::Sequence};

impl<T, P: IndexPolicy> Sequence<T, P> {
    /// Returns the position of the first element equal to `value` at or
    /// after the policy-resolved start position.
    ///
    /// Equality is the embedded comparator when one is configured,
    /// `PartialEq` otherwise.
    pub fn index_of(&self, start: P::Index, value: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        let start = P::insertion(start, self.len);
        let found = match self.cmp.as_ref() {
            Some(cmp) => self.as_slice()[start..]
                .iter()
                .position(|elem| cmp(elem, value) == Ordering::Equal),
            None => self.as_slice()[start..].iter().position(|elem| elem == value),
        };
        found.map(|at| start + at)
    }

    /// Returns the position of the last element equal to `value` at or
    /// before the policy-resolved start position, scanning backwards.
    pub fn last_index_of(&self, start: P::Index, value: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        let start = P::element(start, self.len)?;
        let head = &self.as_slice()[..=start];
        match self.cmp.as_ref() {
            Some(cmp) => head
                .iter()
                .rposition(|elem| cmp(elem, value) == Ordering::Equal),
            None => head.iter().rposition(|elem| elem == value),
        }
    }

    /// Like [`Sequence::index_of`], with a call-site comparator instead of
    /// the embedded one.
    pub fn index_of_by(
        &self,
        start: P::Index,
        value: &T,
        cmp: impl Fn(&T, &T) -> Ordering,
    ) -> Option<usize> {
        let start = P::insertion(start, self.len);
        self.as_slice()[start..]
            .iter()
            .position(|elem| cmp(elem, value) == Ordering::Equal)
            .map(|at| start + at)
    }

    /// Like [`Sequence::last_index_of`], with a call-site comparator
    /// instead of the embedded one.
    pub fn last_index_of_by(
        &self,
        start: P::Index,
        value: &T,
        cmp: impl Fn(&T, &T) -> Ordering,
    ) -> Option<usize> {
        let start = P::element(start, self.len)?;
        self.as_slice()[..=start]
            .iter()
            .rposition(|elem| cmp(elem, value) == Ordering::Equal)
    }

    /// Linear search by raw byte equality, for plain-data element types.
    pub fn index_of_bytes(&self, start: P::Index, value: &T) -> Option<usize>
    where
        T: bytemuck::NoUninit,
    {
        let start = P::insertion(start, self.len);
        let needle = bytemuck::bytes_of(value);
        self.as_slice()[start..]
            .iter()
            .position(|elem| bytemuck::bytes_of(elem) == needle)
            .map(|at| start + at)
    }

    /// Binary search for `value` in `[start, len)`, which must already be
    /// ordered by the embedded comparator; the position returned for an
    /// unsorted range is unspecified (but never out of bounds). Returns
    /// `None` when no comparator is configured or the value is absent.
    pub fn sorted_search(&self, start: P::Index, value: &T) -> Option<usize> {
        let cmp = self.cmp.as_ref()?;
        let start = P::insertion(start, self.len);
        let tail = &self.as_slice()[start..];
        let at = tail.partition_point(|elem| cmp(elem, value) == Ordering::Less);
        (at < tail.len() && cmp(&tail[at], value) == Ordering::Equal).then(|| start + at)
    }

    /// Sorts the sequence in place with the embedded comparator (a stable
    /// sort). Fails when no comparator is configured.
    pub fn sort(&mut self) -> Result<()> {
        let cmp = self
            .cmp
            .take()
            .ok_or_else(|| Error::invalid_operation("sort"))?;
        self.as_mut_slice().sort_by(|a, b| cmp(a, b));
        self.cmp = Some(cmp);
        Ok(())
    }

    /// Sorts the sequence in place with a call-site comparator.
    pub fn sort_by(&mut self, cmp: impl Fn(&T, &T) -> Ordering) {
        self.as_mut_slice().sort_by(|a, b| cmp(a, b));
    }

    /// Inserts `value` at the first position whose element is not less
    /// than it, keeping a sequence ordered by the embedded comparator
    /// sorted. Fails with no mutation when no comparator is configured or
    /// growth fails.
    pub fn sorted_insert(&mut self, value: T) -> Result<()> {
        let pos = {
            let cmp = self
                .cmp
                .as_ref()
                .ok_or_else(|| Error::invalid_operation("sorted_insert"))?;
            self.as_slice()
                .partition_point(|elem| cmp(elem, &value) == Ordering::Less)
        };
        let gap = self.open_gap(pos, 0, 1)?;
        unsafe { ptr::write(gap.ptr, value) };
        self.len = gap.new_len;
        Ok(())
    }
}
