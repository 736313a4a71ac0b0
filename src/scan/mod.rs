mod lookback;
mod status;

pub use lookback::{DecoupledLookback, LookbackWalk, ScanDirection, WalkStep};
pub use status::{StatusWord, TileState, PAYLOAD_MASK};
