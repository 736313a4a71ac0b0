//! Host-side tiling parameters: how rows are cut into tiles, how many cores work on each
//! row, and how many rows are in flight per sweep of the device.

use crate::key_view::KeyWidth;
use crate::utils::{cdiv, padded_len};
use crate::{Result, SortError};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum CoreCount {
    /// Each row fits one core and is sorted by the bitonic fallback.
    SingleCore,
    /// Each row is radix sorted by this many cores.
    PerRow(usize),
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum SortPath {
    SingleCore,
    Onesweep,
}

/// What a tuner plans for.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct SortShape {
    pub row_length: usize,
    pub row_count: usize,
    pub width: KeyWidth,
    pub descending: bool,
    pub available_cores: usize,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct TilingParams {
    pub tile_size: usize,
    pub core_count: CoreCount,
    pub row_length: usize,
    pub row_count: usize,
    pub rows_per_outer_iter: usize,
    /// Rows one core sorts back to back within a sweep. Always 1 on the radix path.
    pub rows_per_core: usize,
    pub outer_iter_count: usize,
    pub tile_count: usize,
    /// Element capacity of one core's padded local buffer.
    pub sort_buffer_size: usize,
    pub descending: bool,
}

impl TilingParams {
    /// Every row is sorted whole on one core; `rows_per_outer_iter` rows run side by side.
    pub fn single_core(
        row_length: usize,
        row_count: usize,
        rows_per_outer_iter: usize,
        descending: bool,
    ) -> Self {
        let rows_per_outer_iter = rows_per_outer_iter.clamp(1, row_count.max(1));

        Self {
            tile_size: row_length,
            core_count: CoreCount::SingleCore,
            row_length,
            row_count,
            rows_per_outer_iter,
            rows_per_core: 1,
            outer_iter_count: cdiv(row_count, rows_per_outer_iter),
            tile_count: 1,
            sort_buffer_size: row_length.max(1).next_power_of_two(),
            descending,
        }
    }

    pub fn multi_core(
        row_length: usize,
        row_count: usize,
        tile_size: usize,
        cores_per_row: usize,
        rows_per_outer_iter: usize,
        descending: bool,
    ) -> Self {
        let tile_size = tile_size.max(1);
        let tile_count = cdiv(row_length, tile_size).max(1);
        let rows_per_outer_iter = rows_per_outer_iter.clamp(1, row_count.max(1));

        Self {
            tile_size,
            core_count: CoreCount::PerRow(cores_per_row.clamp(1, tile_count)),
            row_length,
            row_count,
            rows_per_outer_iter,
            rows_per_core: 1,
            outer_iter_count: cdiv(row_count, rows_per_outer_iter),
            tile_count,
            // Byte keys pad the furthest.
            sort_buffer_size: padded_len::<u8>(tile_size),
            descending,
        }
    }

    /// Packs `rows` rows of a sweep onto each core of the single-core path.
    pub fn with_rows_per_core(mut self, rows: usize) -> Self {
        self.rows_per_core = rows.clamp(1, self.rows_per_outer_iter.max(1));

        self
    }

    #[inline]
    pub fn path(&self) -> SortPath {
        match self.core_count {
            CoreCount::SingleCore => SortPath::SingleCore,
            CoreCount::PerRow(_) => SortPath::Onesweep,
        }
    }

    #[inline]
    pub fn cores_per_row(&self) -> usize {
        match self.core_count {
            CoreCount::SingleCore => 1,
            CoreCount::PerRow(n) => n,
        }
    }

    /// Cores a single launch occupies.
    #[inline]
    pub fn launch_cores(&self) -> usize {
        match self.core_count {
            CoreCount::SingleCore => cdiv(self.rows_per_outer_iter, self.rows_per_core.max(1)),
            CoreCount::PerRow(n) => n * self.rows_per_outer_iter,
        }
    }

    #[inline]
    pub fn total_len(&self) -> usize {
        self.row_length * self.row_count
    }

    pub fn check(&self) -> Result<()> {
        let fail = |msg: String| Err(SortError::InvalidTiling(msg));

        if self.row_count > 0 && self.rows_per_outer_iter == 0 {
            return fail("rows_per_outer_iter must be at least 1".to_string());
        }

        if self.rows_per_core == 0 {
            return fail("rows_per_core must be at least 1".to_string());
        }

        if self.rows_per_outer_iter * self.outer_iter_count < self.row_count {
            return fail(format!(
                "{} sweeps of {} rows cannot cover {} rows",
                self.outer_iter_count, self.rows_per_outer_iter, self.row_count
            ));
        }

        match self.core_count {
            CoreCount::SingleCore => {
                if self.row_length > self.sort_buffer_size {
                    return fail(format!(
                        "row of {} elements does not fit a single core buffer of {}",
                        self.row_length, self.sort_buffer_size
                    ));
                }
            }
            CoreCount::PerRow(cores) => {
                if self.rows_per_core != 1 {
                    return fail("the radix path sorts one row per core group".to_string());
                }

                if self.tile_size == 0 {
                    return fail("tile_size must be non-zero".to_string());
                }

                if self.tile_count != cdiv(self.row_length, self.tile_size).max(1) {
                    return fail(format!(
                        "tile_count {} does not match {} elements in tiles of {}",
                        self.tile_count, self.row_length, self.tile_size
                    ));
                }

                if cores == 0 || cores > self.tile_count {
                    return fail(format!(
                        "{} cores per row with {} tiles",
                        cores, self.tile_count
                    ));
                }

                if self.sort_buffer_size < self.tile_size {
                    return fail(format!(
                        "sort buffer of {} cannot hold a tile of {}",
                        self.sort_buffer_size, self.tile_size
                    ));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    pub fn test_multi_core_derived_fields() {
        let t = TilingParams::multi_core(10_000, 5, 4096, 8, 2, false);

        assert_eq!(t.tile_count, 3);
        assert_eq!(t.core_count, CoreCount::PerRow(3));
        assert_eq!(t.outer_iter_count, 3);
        assert_eq!(t.launch_cores(), 6);
        assert_eq!(t.path(), SortPath::Onesweep);
        assert!(t.check().is_ok());
    }

    #[test]
    pub fn test_single_core_derived_fields() {
        let t = TilingParams::single_core(100, 7, 3, true);

        assert_eq!(t.path(), SortPath::SingleCore);
        assert_eq!(t.outer_iter_count, 3);
        assert_eq!(t.sort_buffer_size, 128);
        assert_eq!(t.launch_cores(), 3);
        assert!(t.check().is_ok());
    }

    #[test]
    pub fn test_rows_packed_per_core() {
        let t = TilingParams::single_core(64, 100, 10, false).with_rows_per_core(4);

        assert_eq!(t.rows_per_core, 4);
        assert_eq!(t.launch_cores(), 3);
        assert!(t.check().is_ok());

        let t = TilingParams::single_core(64, 2, 2, false).with_rows_per_core(8);
        assert_eq!(t.rows_per_core, 2);
        assert_eq!(t.launch_cores(), 1);
    }

    #[test]
    pub fn test_inconsistent_tiling_rejected() {
        let mut t = TilingParams::multi_core(10_000, 1, 4096, 3, 1, false);
        t.tile_count = 2;
        assert!(matches!(t.check(), Err(SortError::InvalidTiling(_))));

        let mut t = TilingParams::multi_core(10_000, 4, 4096, 3, 2, false);
        t.outer_iter_count = 1;
        assert!(t.check().is_err());

        let mut t = TilingParams::single_core(100, 1, 1, false);
        t.sort_buffer_size = 64;
        assert!(t.check().is_err());

        let mut t = TilingParams::multi_core(10_000, 4, 4096, 3, 2, false);
        t.rows_per_core = 2;
        assert!(t.check().is_err());
    }
}
