//! Allocation layer for the mutseq sequence engine.
//!
//! This crate provides the two building blocks underneath every growable
//! sequence:
//!
//! - [`allocator::Allocator`]: the pluggable reallocate/release abstraction,
//!   with [`allocator::SystemAllocator`] as the default implementation over
//!   the process heap and [`allocator::FailingAllocator`] for exercising
//!   allocation-failure paths deterministically.
//! - [`raw_buffer::RawBuffer`]: an owned, reallocatable region of
//!   element-sized slots. It tracks capacity only (it never inspects, drops,
//!   or initializes the elements stored in it) and performs all size
//!   arithmetic with explicit overflow checking before any allocator call.
//!
//! Growth is amortized: when more room is needed, the buffer resizes to the
//! larger of the strictly required capacity and twice the current capacity.

pub mod allocator;
pub mod raw_buffer;

#[cfg(test)]
mod tests;
