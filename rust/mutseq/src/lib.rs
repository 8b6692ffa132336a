//! A splice-based growable-sequence engine.
//!
//! This crate provides [`Sequence`], a contiguous, reallocatable container of
//! fixed-size elements with explicit control over capacity growth, element
//! lifecycle hooks, buffer ownership transfer, and positional mutation at
//! arbitrary offsets.
//!
//! # Core Concepts
//!
//! ## The splice primitive
//!
//! Every structural operation reduces to one primitive: remove a run of `R`
//! elements at position `P` and open a gap of `A` uninitialized slots in
//! their place, growing the backing buffer and relocating the surviving tail
//! as needed. Push and pop are splices at the tail, shift and unshift at the
//! head, insert and remove at arbitrary positions, sorted insert at a
//! binary-searched position. The primitive has exactly one failure mode
//! (the buffer cannot grow), and on failure the sequence is left unchanged.
//!
//! ## Index policies
//!
//! Positional operations resolve their index through a compile-time
//! [`policy::IndexPolicy`]:
//!
//! - [`policy::Clamp`] (the default): `usize` indices; positions past the
//!   end saturate at the last element (or the insertion point `len`).
//! - [`policy::Wrap`]: `isize` indices; negative indices select from the
//!   end (`-1` is the last element), magnitudes past the bounds clamp.
//!
//! ## Element lifecycle
//!
//! Elements are dropped natively when removed. Two optional hooks extend
//! the lifecycle: a *constructor* producing values for slots created by
//! [`Sequence::resize`] and [`Sequence::emplace`] (a configured default
//! value serves when no constructor is set), and a *destructor* invoked on
//! each element right before it is removed, for side effects beyond the
//! value's own `Drop`. Operations that transfer an element out
//! ([`Sequence::pop`], [`Sequence::shift`], [`Sequence::extract`],
//! [`Sequence::detach`]) bypass the destructor hook: ownership ends, not
//! the value's lifetime.
//!
//! ## Ownership transfer
//!
//! [`Sequence::detach`] converts the backing storage into an owned
//! [`DetachedBuffer`]; [`Sequence::attach`] finalizes the current buffer
//! and adopts a detached one. Move semantics make double ownership of a
//! buffer unrepresentable.
//!
//! # Allocation
//!
//! Storage is managed by `mutseq-alloc`: each sequence's buffer carries the
//! allocator chosen at construction and grows amortized (doubling, never
//! less than strictly needed), with all size arithmetic overflow-checked
//! before the allocator is invoked.

pub mod detached;
pub mod policy;
pub mod sequence;

mod join;
mod search;

pub use detached::DetachedBuffer;
pub use policy::{Clamp, IndexPolicy, Wrap};
pub use sequence::Sequence;
