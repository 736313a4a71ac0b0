use crate::key_view::{KeyView, KeyWidth};
use crate::radix_key::{RadixKey, UnsignedKey};

macro_rules! impl_unsigned {
    ($t:ty, $width:ident, $variant:ident) => {
        impl UnsignedKey for $t {
            const WIDTH: KeyWidth = KeyWidth::$width;
            const MAX: Self = <$t>::MAX;

            #[inline]
            fn digit(self, pass: usize) -> u8 {
                (self >> (pass * 8)) as u8
            }

            fn into_view(keys: Vec<Self>) -> KeyView {
                KeyView::$variant(keys)
            }

            fn view(view: &KeyView) -> Option<&[Self]> {
                match view {
                    KeyView::$variant(keys) => Some(keys),
                    _ => None,
                }
            }
        }

        impl RadixKey for $t {
            type Unsigned = $t;

            #[inline]
            fn twiddle_in(self, descending: bool) -> $t {
                if descending {
                    !self
                } else {
                    self
                }
            }

            #[inline]
            fn twiddle_out(bits: $t, descending: bool) -> Self {
                if descending {
                    !bits
                } else {
                    bits
                }
            }
        }
    };
}

impl_unsigned!(u8, W8, B8);
impl_unsigned!(u16, W16, B16);
impl_unsigned!(u32, W32, B32);
impl_unsigned!(u64, W64, B64);

macro_rules! impl_signed {
    ($t:ty, $u:ty) => {
        impl RadixKey for $t {
            type Unsigned = $u;

            #[inline]
            fn twiddle_in(self, descending: bool) -> $u {
                let bits = (self as $u) ^ (1 << (<$u>::BITS - 1));

                if descending {
                    !bits
                } else {
                    bits
                }
            }

            #[inline]
            fn twiddle_out(bits: $u, descending: bool) -> Self {
                let bits = if descending { !bits } else { bits };

                (bits ^ (1 << (<$u>::BITS - 1))) as $t
            }
        }
    };
}

impl_signed!(i8, u8);
impl_signed!(i16, u16);
impl_signed!(i32, u32);
impl_signed!(i64, u64);

// Positive floats get the sign bit set, negative floats are fully complemented.
// The resulting order is IEEE-754 totalOrder: -NaN < -inf < ... < -0 < +0 < ... < +inf < +NaN.
macro_rules! impl_float {
    ($t:ty, $u:ty) => {
        impl RadixKey for $t {
            type Unsigned = $u;

            #[inline]
            fn twiddle_in(self, descending: bool) -> $u {
                const SIGN: $u = 1 << (<$u>::BITS - 1);

                let raw = self.to_bits();
                let bits = if raw & SIGN == 0 { raw | SIGN } else { !raw };

                if descending {
                    !bits
                } else {
                    bits
                }
            }

            #[inline]
            fn twiddle_out(bits: $u, descending: bool) -> Self {
                const SIGN: $u = 1 << (<$u>::BITS - 1);

                let bits = if descending { !bits } else { bits };
                let raw = if bits & SIGN != 0 { bits ^ SIGN } else { !bits };

                <$t>::from_bits(raw)
            }
        }
    };
}

impl_float!(half::f16, u16);
impl_float!(half::bf16, u16);
impl_float!(f32, u32);
impl_float!(f64, u64);
