use crate::device::WaitSite;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SortError {
    #[error("{site} did not make progress within {elapsed:?}")]
    LivenessTimeout { site: WaitSite, elapsed: Duration },

    #[error("launch aborted by another core")]
    Aborted,

    #[error("corrupt status record for tile {tile}: {raw:#018x}")]
    CorruptStatus { tile: usize, raw: u64 },

    #[error("invalid tiling: {0}")]
    InvalidTiling(String),

    #[error("{what} holds {actual} elements, expected {expected}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("row length {row_length} does not fit the requested index type")]
    IndexOverflow { row_length: usize },

    #[error("key buffers disagree on key width")]
    WidthMismatch,

    #[error("failed to build the launch thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, SortError>;

impl SortError {
    /// `Aborted` only ever echoes a failure raised elsewhere in the same launch.
    pub fn is_root_cause(&self) -> bool {
        !matches!(self, SortError::Aborted)
    }
}
