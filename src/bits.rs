//! Fixed-width bit helpers, one impl per unsigned integer type.
//!
//! Bit indices count from the most significant bit, matching the packing
//! order of `BitBuffer`.

pub trait FixedBits: Copy {
    const WIDTH: u32;

    /// Returns the bit at `index`, where 0 is the most significant bit.
    fn msb_bit(self, index: u32) -> bool;

    /// Returns a copy with the bit at `index` (0 = most significant) set to `bit`.
    fn with_msb_bit(self, index: u32, bit: bool) -> Self;
}

macro_rules! impl_fixed_bits {
    ($($ty:ty),*) => {
        $(
            impl FixedBits for $ty {
                const WIDTH: u32 = <$ty>::BITS;

                #[inline]
                fn msb_bit(self, index: u32) -> bool {
                    debug_assert!(index < Self::WIDTH);
                    (self >> (Self::WIDTH - 1 - index)) & 1 == 1
                }

                #[inline]
                fn with_msb_bit(self, index: u32, bit: bool) -> Self {
                    debug_assert!(index < Self::WIDTH);
                    let mask: $ty = 1 << (Self::WIDTH - 1 - index);
                    if bit {
                        self | mask
                    } else {
                        self & !mask
                    }
                }
            }
        )*
    };
}

impl_fixed_bits!(u8, u16, u32, u64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_u8_msb_order() {
        let byte = 0u8.with_msb_bit(0, true).with_msb_bit(7, true);
        assert_eq!(byte, 0b1000_0001);
        assert!(byte.msb_bit(0));
        assert!(!byte.msb_bit(1));
        assert!(byte.msb_bit(7));
    }

    #[test]
    fn test_clear_bit() {
        assert_eq!(0xFFu8.with_msb_bit(3, false), 0b1110_1111);
        assert_eq!(u32::MAX.with_msb_bit(0, false), 0x7FFF_FFFF);
    }

    #[test]
    fn test_wide_types() {
        assert!(0x8000u16.msb_bit(0));
        assert!(1u64.msb_bit(63));
        assert_eq!(0u64.with_msb_bit(63, true), 1);
    }
}
