//! `StandardTuner` is the default tiling plan.
//!
//! StandardTuner picks one of four modes:
//!  * tiny: rows of at most 512 elements are packed several to a core, as many as fill half a tile
//!  * small: a row fits one tile, so it is sorted on a single core and rows are spread over cores
//!  * medium: a row needs at most half the cores, so every tile gets a core and several rows run per sweep
//!  * big: one row at a time, with as many cores as there are tiles (or cores)

use crate::tiling::{SortShape, TilingParams};
use crate::tuner::Tuner;
use crate::utils::{cdiv, round_up};
use log::debug;

const TINY_ROW_MAX: usize = 512;
const TINY_ROW_ALIGN: usize = 32;

pub struct StandardTuner;

impl Tuner for StandardTuner {
    fn plan(&self, shape: &SortShape) -> TilingParams {
        let tile_size = shape.width.default_tile_size();
        let cores = shape.available_cores.max(1);
        let rows = shape.row_count;

        let tiling = if shape.row_length <= TINY_ROW_MAX {
            let aligned = round_up(shape.row_length.max(1), TINY_ROW_ALIGN);
            let per_core = (tile_size / 2 / aligned).max(1);

            TilingParams::single_core(
                shape.row_length,
                rows,
                rows.min(cores * per_core),
                shape.descending,
            )
            .with_rows_per_core(per_core)
        } else if shape.row_length <= tile_size {
            TilingParams::single_core(shape.row_length, rows, rows.min(cores), shape.descending)
        } else if shape.row_length <= tile_size * cores / 2 {
            let tile_count = cdiv(shape.row_length, tile_size);
            let rows_parallel = (cores / tile_count).max(1).min(rows);

            TilingParams::multi_core(
                shape.row_length,
                rows,
                tile_size,
                tile_count,
                rows_parallel,
                shape.descending,
            )
        } else {
            let tile_count = cdiv(shape.row_length, tile_size);

            TilingParams::multi_core(
                shape.row_length,
                rows,
                tile_size,
                cores.min(tile_count),
                1,
                shape.descending,
            )
        };

        debug!(
            "planned {:?} for {} rows of {}: {} tiles, {} rows per sweep, {} per core",
            tiling.core_count,
            rows,
            shape.row_length,
            tiling.tile_count,
            tiling.rows_per_outer_iter,
            tiling.rows_per_core
        );

        tiling
    }
}
