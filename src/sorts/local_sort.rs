use crate::device::SharedSlice;
use crate::radix_key::{SortIndex, UnsignedKey};
use crate::sorts::block_histogram::BlockHistogram;
use crate::sorts::tile_loader::TileBuffer;

/// Stable bucket sort of one tile by the current digit, followed by the scatter of every
/// element to its final position for this pass.
pub struct LocalSort {
    order: Vec<usize>,
}

impl LocalSort {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            order: Vec::with_capacity(capacity),
        }
    }

    /// Tile-local positions in sorted order.
    #[inline]
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    pub fn sort<U>(&mut self, keys: &[U], pass: usize, hist: &BlockHistogram)
    where
        U: UnsignedKey,
    {
        self.order.clear();
        self.order.resize(hist.ranks.len(), 0);

        for (i, (k, r)) in keys.iter().zip(&hist.ranks).enumerate() {
            let d = k.digit(pass) as usize;
            self.order[hist.exclusive[d] + r] = i;
        }
    }

    /// Writes the tile into `base..base + row_length` of the destination half.
    ///
    /// `global` holds, per digit, how many elements of the row have a smaller digit this
    /// pass. `earlier` holds how many elements with the same digit sit in earlier tiles.
    ///
    /// # Safety
    ///
    /// The destination positions of this tile must be disjoint from those of every other
    /// tile in the pass, which holds when `global` and `earlier` are exact.
    #[allow(clippy::too_many_arguments)]
    pub unsafe fn scatter<U, I>(
        &self,
        tile: &TileBuffer<U, I>,
        hist: &BlockHistogram,
        pass: usize,
        global: &[usize; 256],
        earlier: &[usize],
        dst_keys: &SharedSlice<'_, U>,
        dst_indices: &SharedSlice<'_, I>,
        base: usize,
    ) where
        U: UnsignedKey,
        I: SortIndex,
    {
        for (sorted, &i) in self.order.iter().enumerate() {
            let key = tile.keys[i];
            let d = key.digit(pass) as usize;
            let pos = base + global[d] + earlier[d] + (sorted - hist.exclusive[d]);

            dst_keys.write(pos, key);
            dst_indices.write(pos, tile.indices[i]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sorts::tile_loader::{IndexSource, KeySource};

    #[test]
    pub fn test_local_order_is_stable() {
        let keys = vec![3u8, 1, 3, 0, 1];
        let mut hist = BlockHistogram::with_capacity(8);
        let mut local = LocalSort::with_capacity(8);

        hist.compute(&keys, keys.len(), 0);
        local.sort(&keys, 0, &hist);

        assert_eq!(local.order(), &[3, 1, 4, 0, 2]);
    }

    #[test]
    pub fn test_scatter_two_tiles() {
        // Row [2, 0, 2 | 1, 0, 2] in two tiles of three.
        let row = vec![2u8, 0, 2, 1, 0, 2];
        let mut out_keys = vec![0u8; 6];
        let mut out_indices = vec![0i32; 6];
        let dst_keys = SharedSlice::new(&mut out_keys);
        let dst_indices = SharedSlice::new(&mut out_indices);

        let mut global = [0usize; 256];
        global[1] = 2;
        global[2] = 3;

        let mut first_tile_counts = vec![0usize; 256];
        first_tile_counts[0] = 1;
        first_tile_counts[2] = 2;

        for (t, earlier) in [(0usize, vec![0usize; 256]), (1, first_tile_counts)] {
            let mut buf: TileBuffer<u8, i32> = TileBuffer::with_capacity(32);
            let mut hist = BlockHistogram::with_capacity(32);
            let mut local = LocalSort::with_capacity(32);

            unsafe { buf.load(KeySource::Input(&row), IndexSource::Identity, t * 3, t * 3, 3) };
            hist.compute(&buf.keys, buf.len(), 0);
            local.sort(&buf.keys[..buf.len()], 0, &hist);
            unsafe { local.scatter(&buf, &hist, 0, &global, &earlier, &dst_keys, &dst_indices, 0) };
        }

        drop(dst_keys);
        drop(dst_indices);

        assert_eq!(out_keys, vec![0, 0, 1, 2, 2, 2]);
        assert_eq!(out_indices, vec![1, 4, 3, 0, 2, 5]);
    }
}
