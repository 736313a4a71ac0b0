use crate::key_view::{KeyView, KeyWidth};
use std::fmt::Debug;

/// An unsigned key whose natural order is the sort order.
///
/// Every pass of the sort reads one 8-bit digit of this key, least significant first.
pub trait UnsignedKey: Copy + Ord + Default + Debug + Send + Sync + 'static {
    const WIDTH: KeyWidth;

    /// Padding value. Always lands in digit 255 of every pass.
    const MAX: Self;

    fn digit(self, pass: usize) -> u8;

    fn into_view(keys: Vec<Self>) -> KeyView;

    fn view(view: &KeyView) -> Option<&[Self]>;
}

/// A key that can be sorted: any fixed-width integer or float.
///
/// `twiddle_in` maps the key onto an unsigned key with the same order (or the reversed
/// order when `descending` is set). `twiddle_out` is its exact inverse.
pub trait RadixKey: Copy + Debug + Send + Sync + 'static {
    type Unsigned: UnsignedKey;

    fn twiddle_in(self, descending: bool) -> Self::Unsigned;

    fn twiddle_out(bits: Self::Unsigned, descending: bool) -> Self;
}

/// The integer type of the emitted index array.
pub trait SortIndex: Copy + Default + Debug + PartialEq + Send + Sync + 'static {
    /// Marks padding slots of a tile. Never a valid position.
    const SENTINEL: Self;

    /// Longest row whose positions this type can name.
    const MAX_ROW_LENGTH: usize;

    fn from_position(pos: usize) -> Self;

    fn from_preset(preset: i32) -> Self;

    fn to_position(self) -> usize;
}

impl SortIndex for i32 {
    const SENTINEL: Self = -1;
    const MAX_ROW_LENGTH: usize = i32::MAX as usize;

    #[inline]
    fn from_position(pos: usize) -> Self {
        pos as i32
    }

    #[inline]
    fn from_preset(preset: i32) -> Self {
        preset
    }

    #[inline]
    fn to_position(self) -> usize {
        self as usize
    }
}

impl SortIndex for i64 {
    const SENTINEL: Self = -1;
    const MAX_ROW_LENGTH: usize = usize::MAX;

    #[inline]
    fn from_position(pos: usize) -> Self {
        pos as i64
    }

    #[inline]
    fn from_preset(preset: i32) -> Self {
        preset as i64
    }

    #[inline]
    fn to_position(self) -> usize {
        self as usize
    }
}
