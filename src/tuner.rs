use crate::tiling::{SortShape, TilingParams};

pub trait Tuner {
    fn plan(&self, shape: &SortShape) -> TilingParams;
}
