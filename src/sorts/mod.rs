pub mod bitonic_sort;
pub mod block_histogram;
pub mod local_sort;
pub mod onesweep_sort;
pub mod tile_loader;

use std::sync::atomic::AtomicU64;

/// Everything one width-resolved sort reads and writes. `keys` and `indices` are the
/// primary ping-pong half and receive the result; the copies and control regions come
/// from the workspace.
pub(crate) struct SortBuffers<'a, U, I> {
    pub input: &'a [U],
    pub preset: Option<&'a [i32]>,
    pub keys: &'a mut [U],
    pub indices: &'a mut [I],
    pub key_copy: &'a mut [U],
    pub index_copy: &'a mut [I],
    pub bins: &'a [AtomicU64],
    pub status: &'a [AtomicU64],
}
