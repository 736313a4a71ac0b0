//! Width-erased key buffers.
//!
//! The sorting core is generic only over the unsigned key it moves around. Every
//! supported key type is twiddled into one of four unsigned widths up front, and the
//! sorter dispatches once on the `KeyView` variant instead of monomorphizing the whole
//! pipeline per user-facing key type.

use crate::radix_key::{RadixKey, UnsignedKey};
use crate::{Result, SortError};
use rayon::prelude::*;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum KeyWidth {
    W8,
    W16,
    W32,
    W64,
}

impl KeyWidth {
    #[inline]
    pub fn bytes(self) -> usize {
        match self {
            KeyWidth::W8 => 1,
            KeyWidth::W16 => 2,
            KeyWidth::W32 => 4,
            KeyWidth::W64 => 8,
        }
    }

    /// One pass per byte.
    #[inline]
    pub fn passes(self) -> usize {
        self.bytes()
    }

    /// Elements per tile used by the standard planner.
    #[inline]
    pub fn default_tile_size(self) -> usize {
        match self {
            KeyWidth::W64 => 2048,
            _ => 4096,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum KeyView {
    B8(Vec<u8>),
    B16(Vec<u16>),
    B32(Vec<u32>),
    B64(Vec<u64>),
}

impl KeyView {
    pub fn zeroed(width: KeyWidth, len: usize) -> Self {
        match width {
            KeyWidth::W8 => KeyView::B8(vec![0; len]),
            KeyWidth::W16 => KeyView::B16(vec![0; len]),
            KeyWidth::W32 => KeyView::B32(vec![0; len]),
            KeyWidth::W64 => KeyView::B64(vec![0; len]),
        }
    }

    pub fn width(&self) -> KeyWidth {
        match self {
            KeyView::B8(_) => KeyWidth::W8,
            KeyView::B16(_) => KeyWidth::W16,
            KeyView::B32(_) => KeyWidth::W32,
            KeyView::B64(_) => KeyWidth::W64,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            KeyView::B8(k) => k.len(),
            KeyView::B16(k) => k.len(),
            KeyView::B32(k) => k.len(),
            KeyView::B64(k) => k.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn twiddle_into_view<T>(values: &[T], descending: bool) -> KeyView
where
    T: RadixKey,
{
    let keys: Vec<T::Unsigned> = values
        .par_iter()
        .map(|v| v.twiddle_in(descending))
        .collect();

    T::Unsigned::into_view(keys)
}

pub fn untwiddle_from_view<T>(view: &KeyView, out: &mut [T], descending: bool) -> Result<()>
where
    T: RadixKey,
{
    let keys = T::Unsigned::view(view).ok_or(SortError::WidthMismatch)?;

    if keys.len() != out.len() {
        return Err(SortError::ShapeMismatch {
            what: "sorted values",
            expected: keys.len(),
            actual: out.len(),
        });
    }

    out.par_iter_mut()
        .zip(keys.par_iter())
        .for_each(|(v, k)| *v = T::twiddle_out(*k, descending));

    Ok(())
}
