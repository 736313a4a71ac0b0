//! `bitonic_sort` sorts a row that fits on one core as a single bitonic network with the
//! index carried as payload.
//!
//! The row is padded to a power of two with `U::MAX` keys. Each element is compared by
//! `(key, position)`, so equal keys keep their input order and the result matches the
//! stable radix path exactly. No passes, lookback or barriers are involved. The rows of
//! one sweep are sorted in parallel, each core taking `rows_per_core` adjacent rows in turn.
//!
//! ## Characteristics
//!
//!  * out-of-place
//!  * one core per row
//!  * stable
//!  * O(n log² n) comparisons

use crate::device::Device;
use crate::radix_key::{SortIndex, UnsignedKey};
use crate::sorts::SortBuffers;
use crate::tiling::TilingParams;
use crate::Result;
use log::debug;
use rayon::prelude::*;

#[derive(Clone, Copy)]
struct Element<U, I> {
    key: U,
    pos: usize,
    index: I,
}

impl<U: UnsignedKey, I> Element<U, I> {
    #[inline]
    fn after(&self, other: &Self) -> bool {
        (self.key, self.pos) > (other.key, other.pos)
    }
}

fn bitonic_network<U, I>(data: &mut [Element<U, I>])
where
    U: UnsignedKey,
{
    let n = data.len();
    debug_assert!(n.is_power_of_two());

    let mut k = 2;
    while k <= n {
        let mut j = k / 2;
        while j > 0 {
            for i in 0..n {
                let ixj = i ^ j;

                if ixj > i {
                    let ascending = (i & k) == 0;

                    if data[i].after(&data[ixj]) == ascending {
                        data.swap(i, ixj);
                    }
                }
            }
            j /= 2;
        }
        k *= 2;
    }
}

fn sort_row<U, I>(
    keys: &[U],
    preset: Option<&[i32]>,
    out_keys: &mut [U],
    out_indices: &mut [I],
    scratch: &mut Vec<Element<U, I>>,
) where
    U: UnsignedKey,
    I: SortIndex,
{
    let padded = keys.len().max(1).next_power_of_two();

    scratch.clear();
    scratch.extend(keys.iter().enumerate().map(|(pos, &key)| Element {
        key,
        pos,
        index: match preset {
            Some(p) => I::from_preset(p[pos]),
            None => I::from_position(pos),
        },
    }));
    scratch.resize(
        padded,
        Element {
            key: U::MAX,
            pos: usize::MAX,
            index: I::SENTINEL,
        },
    );

    bitonic_network(scratch);

    for ((k, i), e) in out_keys.iter_mut().zip(out_indices.iter_mut()).zip(scratch.iter()) {
        *k = e.key;
        *i = e.index;
    }
}

pub(crate) fn bitonic_sort<U, I>(
    device: &Device,
    tiling: &TilingParams,
    buffers: SortBuffers<'_, U, I>,
) -> Result<()>
where
    U: UnsignedKey,
    I: SortIndex,
{
    let len = tiling.row_length;
    if len == 0 {
        return Ok(());
    }

    let group = len * tiling.rows_per_outer_iter;
    let per_core = tiling.rows_per_core.max(1);
    let preset = buffers.preset;

    for (outer, ((input, keys), indices)) in buffers
        .input
        .chunks(group)
        .zip(buffers.keys.chunks_mut(group))
        .zip(buffers.indices.chunks_mut(group))
        .enumerate()
    {
        let first_row = outer * tiling.rows_per_outer_iter;
        debug!(
            "bitonic rows {}..{} of {}",
            first_row,
            first_row + input.len() / len,
            tiling.row_count
        );

        let packed = len * per_core;

        device.install(|| {
            input
                .par_chunks(packed)
                .zip(keys.par_chunks_mut(packed))
                .zip(indices.par_chunks_mut(packed))
                .enumerate()
                .for_each_init(Vec::new, |scratch, (c, ((rows, k), i))| {
                    let core_first_row = first_row + c * per_core;

                    for (r, ((row, k), i)) in rows
                        .chunks(len)
                        .zip(k.chunks_mut(len))
                        .zip(i.chunks_mut(len))
                        .enumerate()
                    {
                        let row_preset = preset.map(|p| {
                            let start = (core_first_row + r) * len;
                            &p[start..start + len]
                        });

                        sort_row(row, row_preset, k, i, scratch);
                    }
                });
        });
    }

    Ok(())
}
