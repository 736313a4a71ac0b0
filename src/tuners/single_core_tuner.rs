//! `SingleCoreTuner` sorts every row whole on one core with the bitonic fallback,
//! whatever its length. Rows are still spread over the available cores.

use crate::tiling::{SortShape, TilingParams};
use crate::tuner::Tuner;

pub struct SingleCoreTuner;

impl Tuner for SingleCoreTuner {
    #[inline]
    fn plan(&self, shape: &SortShape) -> TilingParams {
        TilingParams::single_core(
            shape.row_length,
            shape.row_count,
            shape.available_cores.max(1),
            shape.descending,
        )
    }
}
