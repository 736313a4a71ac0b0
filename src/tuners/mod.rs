mod fixed_tile_tuner;
mod single_core_tuner;
mod standard_tuner;

pub use fixed_tile_tuner::FixedTileTuner;
pub use single_core_tuner::SingleCoreTuner;
pub use standard_tuner::StandardTuner;
