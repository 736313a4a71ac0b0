//! # radix-argsort
//!
//! radix-argsort is a multi-core, stable sort-with-index (argsort) for fixed-width keys.
//!
//! Rows longer than one tile are sorted by a least-significant-digit radix sort in which every
//! core owns a few tiles of the row, and tiles learn how many equal digits precede them through
//! a lock-free decoupled lookback rather than a global counting pass. Rows that fit one tile are
//! sorted whole on a single core by a bitonic network. Both paths are stable and produce
//! identical output.
//!
//! ## Usage
//!
//! In the simplest case, call `values.argsort()`:
//!
//! ```
//! use radix_argsort::SortWithIndex;
//!
//! let values = [5u32, 3, 3, 1];
//! let sorted = values.argsort().unwrap();
//!
//! assert_eq!(sorted.values, vec![1, 3, 3, 5]);
//! assert_eq!(sorted.indices, vec![3, 1, 2, 0]);
//! ```
//!
//! The builder configures direction, rows, a preset index to carry through (for chained
//! sorts), the index type, the core budget and the spin deadline:
//!
//! ```
//! use radix_argsort::SortWithIndex;
//!
//! let values = [0.5f32, -1.0, 2.0, 7.0, 7.0, -3.0];
//! let sorted = values
//!     .sort_with_index_builder()
//!     .with_row_length(3)
//!     .with_descending()
//!     .with_index_type::<i64>()
//!     .sort()
//!     .unwrap();
//!
//! assert_eq!(sorted.values, vec![2.0, 0.5, -1.0, 7.0, 7.0, -3.0]);
//! assert_eq!(sorted.indices, vec![2, 0, 1, 0, 1, 2]);
//! ```
//!
//! ## Key types
//!
//! `RadixKey` is implemented for:
//!
//!  * `u8`, `u16`, `u32`, `u64`
//!  * `i8`, `i16`, `i32`, `i64`
//!  * `half::f16`, `half::bf16`, `f32`, `f64`, ordered by IEEE-754 `totalOrder`
//!    (`-NaN < -inf < -0 < +0 < +inf < +NaN`)
//!
//! ## Lower level
//!
//! `sort_with_index` takes explicit tiling parameters and a caller-owned `Workspace`, for
//! callers that plan once and sort many times.
//!
//! ## License
//!
//! Licensed under either of Apache License, Version 2.0 or MIT license at your option.


mod device;
mod error;
mod key_view;
mod radix_key;
mod radix_key_impl;
pub mod scan;
mod sort_with_index_builder;
mod sorter;
mod sorts;
mod tiling;
mod tuner;
pub mod tuners;
mod utils;

pub use device::{SpinPolicy, WaitSite, Watchdog, Workspace, WorkspaceLayout};
pub use error::{Result, SortError};
pub use key_view::{KeyView, KeyWidth};
pub use radix_key::{RadixKey, SortIndex, UnsignedKey};
pub use sort_with_index_builder::{SortWithIndexBuilder, SortedWithIndex};
pub use sorter::Sorter;
pub use tiling::{CoreCount, SortPath, SortShape, TilingParams};
pub use tuner::Tuner;

pub trait SortWithIndex<T> {
    /// Sorts ascending as one row and returns the values with their `i32` source positions.
    fn argsort(&self) -> Result<SortedWithIndex<T, i32>>;

    fn sort_with_index_builder(&self) -> SortWithIndexBuilder<'_, T>;
}

impl<T> SortWithIndex<T> for [T]
where
    T: RadixKey,
{
    fn argsort(&self) -> Result<SortedWithIndex<T, i32>> {
        SortWithIndexBuilder::new(self).sort()
    }

    fn sort_with_index_builder(&self) -> SortWithIndexBuilder<'_, T> {
        SortWithIndexBuilder::new(self)
    }
}

/// Sorts `values` row by row as laid out by `tiling`, writing the sorted values and, per
/// output slot, the source position (or the carried `preset` entry).
///
/// `workspace` must be at least `WorkspaceLayout::for_tiling(tiling, width)`.
pub fn sort_with_index<T, I>(
    values: &[T],
    preset: Option<&[i32]>,
    sorted_values: &mut [T],
    sorted_indices: &mut [I],
    workspace: &mut Workspace<I>,
    tiling: &TilingParams,
) -> Result<()>
where
    T: RadixKey,
    I: SortIndex,
{
    Sorter::new(tiling, SpinPolicy::default())?.sort(
        values,
        preset,
        sorted_values,
        sorted_indices,
        workspace,
        tiling,
    )
}
