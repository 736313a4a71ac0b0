//! `onesweep_sort` is a multi-core, Least-Significant Digit first radix sort in which the
//! cores of a row cooperate through a decoupled lookback instead of a separate counting
//! phase per pass.
//!
//! Every row is cut into tiles. Before the first pass, each core counts the digits of its
//! tiles for all passes at once and adds them into a per-row table of exclusive bins:
//! the digit multiset of a row never changes, only its order. Each pass then, per tile:
//!
//!  1. loads the tile from the current ping-pong half (the input for pass 0)
//!  2. builds its digit histogram and publishes it
//!  3. sorts the tile locally by digit
//!  4. looks back across earlier tiles for the count of equal digits before it
//!  5. scatters every element to its final position in the other half
//!
//! A device barrier closes every pass. The initial half is chosen by the parity of the pass
//! count so the last pass always lands in the output buffers.
//!
//! ## Characteristics
//!
//!  * out-of-place
//!  * multi-core
//!  * stable
//!  * lsd-first
//!
//! ## Deadlock freedom
//!
//! A tile only waits on tiles before it, and every core works through its own tiles in
//! ascending order, so the lowest unfinished tile can always make progress.

use crate::device::{Device, LaunchContext, SharedSlice, SpinPolicy};
use crate::radix_key::{SortIndex, UnsignedKey};
use crate::scan::{DecoupledLookback, ScanDirection};
use crate::sorts::block_histogram::BlockHistogram;
use crate::sorts::local_sort::LocalSort;
use crate::sorts::tile_loader::{IndexSource, KeySource, TileBuffer};
use crate::sorts::SortBuffers;
use crate::tiling::TilingParams;
use crate::utils::{get_all_pass_counts, get_prefix_sums, RADIX};
use crate::{Result, SortError};
use log::{debug, trace};
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
enum Half {
    Primary,
    Secondary,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
enum SweepState {
    ZeroBins,
    ZeroSync,
    CountBins,
    CountSync,
    ClearStatus,
    ClearSync,
    Tiles,
    PassSync,
    Swap,
    Done,
}

/// Where pass `pass` of `passes` writes.
#[inline]
fn destination(passes: usize, pass: usize) -> Half {
    if (passes - 1 - pass) % 2 == 0 {
        Half::Primary
    } else {
        Half::Secondary
    }
}

struct Onesweep<'a, U, I> {
    tiling: &'a TilingParams,
    input: &'a [U],
    preset: Option<&'a [i32]>,
    keys: [SharedSlice<'a, U>; 2],
    indices: [SharedSlice<'a, I>; 2],
    bins: &'a [AtomicU64],
    status: &'a [AtomicU64],
}

/// Per-core scratch, reused across tiles and passes.
struct CoreScratch<U, I> {
    tile: TileBuffer<U, I>,
    hist: BlockHistogram,
    local: LocalSort,
    global: Vec<[usize; 256]>,
}

impl<'a, U, I> Onesweep<'a, U, I>
where
    U: UnsignedKey,
    I: SortIndex,
{
    #[inline]
    fn half(h: Half) -> usize {
        match h {
            Half::Primary => 0,
            Half::Secondary => 1,
        }
    }

    /// Start of `row` within a half. The secondary half only holds the rows in flight.
    #[inline]
    fn row_base(&self, h: Half, row: usize, slot: usize) -> usize {
        match h {
            Half::Primary => row * self.tiling.row_length,
            Half::Secondary => slot * self.tiling.row_length,
        }
    }

    #[inline]
    fn slot_bins(&self, slot: usize) -> &[AtomicU64] {
        let per_row = RADIX * U::WIDTH.passes();
        &self.bins[slot * per_row..(slot + 1) * per_row]
    }

    fn slot_lookback(&self, slot: usize) -> Result<DecoupledLookback<'a, 8>> {
        let per_row = RADIX * self.tiling.tile_count;
        let records = self
            .status
            .get(slot * per_row..(slot + 1) * per_row)
            .ok_or_else(|| SortError::InvalidTiling("tile status region too small".to_string()))?;

        DecoupledLookback::new(records, self.tiling.tile_count, ScanDirection::Forward)
    }

    #[inline]
    fn tile_range(&self, tile: usize) -> (usize, usize) {
        let start = tile * self.tiling.tile_size;
        let len = self.tiling.tile_size.min(self.tiling.row_length - start);

        (start, len)
    }

    fn count_bins(&self, slot: usize, row: usize, tiles: &[usize]) {
        let passes = U::WIDTH.passes();
        let bins = self.slot_bins(slot);
        let row_start = row * self.tiling.row_length;

        for &tile in tiles {
            let (start, len) = self.tile_range(tile);
            let keys = &self.input[row_start + start..row_start + start + len];

            // The per-tile exclusive sums of a digit add up to the row's exclusive sum.
            for (pass, counts) in get_all_pass_counts(keys, passes).iter().enumerate() {
                let exclusive = get_prefix_sums(counts);
                for (b, e) in bins[pass * RADIX..(pass + 1) * RADIX].iter().zip(exclusive) {
                    b.fetch_add(e as u64, Ordering::Relaxed);
                }
            }
        }
    }

    fn read_global(&self, slot: usize, global: &mut Vec<[usize; 256]>) {
        let bins = self.slot_bins(slot);

        global.clear();
        global.extend(bins.chunks_exact(RADIX).map(|pass_bins| {
            let mut g = [0usize; 256];
            for (slot, b) in g.iter_mut().zip(pass_bins) {
                *slot = b.load(Ordering::Relaxed) as usize;
            }
            g
        }));
    }

    #[allow(clippy::too_many_arguments)]
    fn sweep_tile(
        &self,
        ctx: &LaunchContext,
        lookback: &DecoupledLookback<'_, 8>,
        scratch: &mut CoreScratch<U, I>,
        pass: usize,
        slot: usize,
        row: usize,
        tile: usize,
    ) -> Result<()> {
        let passes = U::WIDTH.passes();
        let (start, len) = self.tile_range(tile);

        let (keys, indices, offset) = if pass == 0 {
            let offset = row * self.tiling.row_length + start;
            let indices = match self.preset {
                Some(p) => IndexSource::Preset(p),
                None => IndexSource::Identity,
            };

            (KeySource::Input(self.input), indices, offset)
        } else {
            let src = destination(passes, pass - 1);
            let h = Self::half(src);

            (
                KeySource::Device(&self.keys[h]),
                IndexSource::Device(&self.indices[h]),
                self.row_base(src, row, slot) + start,
            )
        };

        // SAFETY: the source half was last written before the previous pass's barrier and
        // nothing writes it again until after this pass's barrier.
        unsafe { scratch.tile.load(keys, indices, offset, start, len) };

        let CoreScratch {
            tile: buf,
            hist,
            local,
            global,
        } = scratch;

        hist.compute(&buf.keys, buf.len(), pass);
        lookback.publish_aggregate(tile, &hist.counts);
        local.sort(&buf.keys[..buf.len()], pass, hist);
        let earlier = lookback.resolve(tile, &hist.counts, ctx.watchdog())?;

        let dst = destination(passes, pass);
        let h = Self::half(dst);

        // SAFETY: with exact global and lookback counts every position of the row is
        // written by exactly one element of exactly one tile.
        unsafe {
            local.scatter(
                buf,
                hist,
                pass,
                &global[pass],
                &earlier,
                &self.keys[h],
                &self.indices[h],
                self.row_base(dst, row, slot),
            )
        };

        Ok(())
    }

    fn run_core(&self, ctx: &LaunchContext, first_row: usize) -> Result<()> {
        let cores_per_row = self.tiling.cores_per_row();
        let slot = ctx.core() / cores_per_row;
        let lane = ctx.core() % cores_per_row;
        let row = first_row + slot;
        let active = slot < self.tiling.rows_per_outer_iter && row < self.tiling.row_count;
        let passes = U::WIDTH.passes();

        let tiles: Vec<usize> = (lane..self.tiling.tile_count)
            .step_by(cores_per_row)
            .collect();
        let lookback = if active {
            Some(self.slot_lookback(slot)?)
        } else {
            None
        };

        let capacity = self.tiling.sort_buffer_size;
        let mut scratch = CoreScratch {
            tile: TileBuffer::with_capacity(capacity),
            hist: BlockHistogram::with_capacity(capacity),
            local: LocalSort::with_capacity(capacity),
            global: Vec::with_capacity(passes),
        };

        let mut state = SweepState::ZeroBins;
        let mut pass = 0;

        loop {
            trace!(
                "core {} (row {}, active {}) pass {}: {:?}",
                ctx.core(),
                row,
                active,
                pass,
                state
            );

            state = match state {
                SweepState::ZeroBins => {
                    if active && lane == 0 {
                        for b in self.slot_bins(slot) {
                            b.store(0, Ordering::Relaxed);
                        }
                    }

                    SweepState::ZeroSync
                }
                SweepState::ZeroSync => {
                    ctx.sync()?;
                    SweepState::CountBins
                }
                SweepState::CountBins => {
                    if active {
                        self.count_bins(slot, row, &tiles);
                    }

                    SweepState::CountSync
                }
                SweepState::CountSync => {
                    ctx.sync()?;
                    if active {
                        self.read_global(slot, &mut scratch.global);
                    }

                    SweepState::ClearStatus
                }
                SweepState::ClearStatus => {
                    if let Some(lookback) = &lookback {
                        for &tile in &tiles {
                            lookback.clear(tile);
                        }
                    }

                    SweepState::ClearSync
                }
                SweepState::ClearSync => {
                    ctx.sync()?;
                    SweepState::Tiles
                }
                SweepState::Tiles => {
                    if let Some(lookback) = &lookback {
                        for &tile in &tiles {
                            self.sweep_tile(ctx, lookback, &mut scratch, pass, slot, row, tile)?;
                        }
                    }

                    SweepState::PassSync
                }
                SweepState::PassSync => {
                    ctx.sync()?;
                    SweepState::Swap
                }
                SweepState::Swap => {
                    pass += 1;

                    if pass == passes {
                        SweepState::Done
                    } else {
                        SweepState::ClearStatus
                    }
                }
                SweepState::Done => return Ok(()),
            };
        }
    }
}

pub(crate) fn onesweep_sort<U, I>(
    device: &Device,
    policy: SpinPolicy,
    tiling: &TilingParams,
    buffers: SortBuffers<'_, U, I>,
) -> Result<()>
where
    U: UnsignedKey,
    I: SortIndex,
{
    if device.cores() != tiling.launch_cores() {
        return Err(SortError::InvalidTiling(format!(
            "device has {} cores, tiling launches {}",
            device.cores(),
            tiling.launch_cores()
        )));
    }

    let in_flight = tiling.row_length * tiling.rows_per_outer_iter;
    if buffers.key_copy.len() < in_flight || buffers.index_copy.len() < in_flight {
        return Err(SortError::InvalidTiling(format!(
            "workspace copies hold fewer than {} elements",
            in_flight
        )));
    }

    if buffers.bins.len() < RADIX * U::WIDTH.passes() * tiling.rows_per_outer_iter {
        return Err(SortError::InvalidTiling(
            "exclusive bin region too small".to_string(),
        ));
    }

    let sweep = Onesweep {
        tiling,
        input: buffers.input,
        preset: buffers.preset,
        keys: [
            SharedSlice::new(buffers.keys),
            SharedSlice::new(buffers.key_copy),
        ],
        indices: [
            SharedSlice::new(buffers.indices),
            SharedSlice::new(buffers.index_copy),
        ],
        bins: buffers.bins,
        status: buffers.status,
    };

    for outer in 0..tiling.outer_iter_count {
        let first_row = outer * tiling.rows_per_outer_iter;

        debug!(
            "onesweep rows {}..{} of {} on {} cores",
            first_row,
            (first_row + tiling.rows_per_outer_iter).min(tiling.row_count),
            tiling.row_count,
            device.cores()
        );

        device.launch(policy, |ctx| sweep.run_core(ctx, first_row))?;
    }

    Ok(())
}
