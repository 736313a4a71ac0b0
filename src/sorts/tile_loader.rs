use crate::device::SharedSlice;
use crate::radix_key::{SortIndex, UnsignedKey};
use crate::utils::padded_len;

pub enum KeySource<'s, 'a, U> {
    Input(&'s [U]),
    Device(&'s SharedSlice<'a, U>),
}

pub enum IndexSource<'s, 'a, I> {
    /// Round 0 without a preset: the index is the element's position in its row.
    Identity,
    Preset(&'s [i32]),
    Device(&'s SharedSlice<'a, I>),
}

/// One core's local copy of a tile, padded to the alignment boundary with `U::MAX` keys
/// and sentinel indices. Only the first `len` entries are real.
pub struct TileBuffer<U, I> {
    pub keys: Vec<U>,
    pub indices: Vec<I>,
    len: usize,
}

impl<U, I> TileBuffer<U, I>
where
    U: UnsignedKey,
    I: SortIndex,
{
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            keys: Vec::with_capacity(capacity),
            indices: Vec::with_capacity(capacity),
            len: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Loads `len` elements starting at `offset` of both sources. `tile_start` is the
    /// tile's position within its row.
    ///
    /// # Safety
    ///
    /// No core may write the loaded range of a `Device` source until the next barrier.
    pub unsafe fn load(
        &mut self,
        keys: KeySource<'_, '_, U>,
        indices: IndexSource<'_, '_, I>,
        offset: usize,
        tile_start: usize,
        len: usize,
    ) {
        let padded = padded_len::<U>(len);
        self.len = len;

        self.keys.clear();
        self.keys.resize(padded, U::MAX);
        match keys {
            KeySource::Input(src) => self.keys[..len].copy_from_slice(&src[offset..offset + len]),
            KeySource::Device(src) => src.read_into(offset, &mut self.keys[..len]),
        }

        self.indices.clear();
        self.indices.resize(padded, I::SENTINEL);
        match indices {
            IndexSource::Identity => {
                for (i, idx) in self.indices[..len].iter_mut().enumerate() {
                    *idx = I::from_position(tile_start + i);
                }
            }
            IndexSource::Preset(src) => {
                for (idx, p) in self.indices[..len].iter_mut().zip(&src[offset..offset + len]) {
                    *idx = I::from_preset(*p);
                }
            }
            IndexSource::Device(src) => src.read_into(offset, &mut self.indices[..len]),
        }
    }
}
