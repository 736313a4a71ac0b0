//! `FixedTileTuner` always takes the multi-core radix path with a caller-chosen tile size.
//! Useful to force many tiles (and real lookback traffic) onto small inputs.

use crate::tiling::{SortShape, TilingParams};
use crate::tuner::Tuner;
use crate::utils::cdiv;

pub struct FixedTileTuner {
    pub tile_size: usize,
    /// Defaults to one core per tile, capped by the available cores.
    pub cores_per_row: Option<usize>,
}

impl FixedTileTuner {
    pub fn new(tile_size: usize) -> Self {
        Self {
            tile_size,
            cores_per_row: None,
        }
    }

    pub fn with_cores_per_row(mut self, cores: usize) -> Self {
        self.cores_per_row = Some(cores);

        self
    }
}

impl Tuner for FixedTileTuner {
    fn plan(&self, shape: &SortShape) -> TilingParams {
        let cores = shape.available_cores.max(1);
        let tile_count = cdiv(shape.row_length, self.tile_size.max(1)).max(1);
        let per_row = self
            .cores_per_row
            .unwrap_or(tile_count)
            .clamp(1, tile_count)
            .min(cores);

        TilingParams::multi_core(
            shape.row_length,
            shape.row_count,
            self.tile_size,
            per_row,
            cores / per_row,
            shape.descending,
        )
    }
}
