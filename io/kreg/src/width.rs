//! Register widths.

use core::{
    fmt::Debug,
    ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Not},
};

/// A fixed-width unsigned integer a register can hold.
pub trait RegisterWidth:
    Copy
    + Eq
    + Debug
    + BitAnd<Output = Self>
    + BitAndAssign
    + BitOr<Output = Self>
    + BitOrAssign
    + Not<Output = Self>
{
    /// All bits clear.
    const ZERO: Self;
    /// Only bit 0 set.
    const ONE: Self;
    /// Width in bits.
    const BITS: u32;

    /// Shift left, masking the shift amount to the width instead of
    /// overflowing.
    fn wrapping_shl(self, rhs: u32) -> Self;

    /// Shift right, masking the shift amount to the width.
    fn wrapping_shr(self, rhs: u32) -> Self;
}

macro_rules! impl_register_width {
    ($($ty:ty),* $(,)?) => {
        $(
            impl RegisterWidth for $ty {
                const ZERO: Self = 0;
                const ONE: Self = 1;
                const BITS: u32 = <$ty>::BITS;

                #[inline(always)]
                fn wrapping_shl(self, rhs: u32) -> Self {
                    <$ty>::wrapping_shl(self, rhs)
                }

                #[inline(always)]
                fn wrapping_shr(self, rhs: u32) -> Self {
                    <$ty>::wrapping_shr(self, rhs)
                }
            }
        )*
    };
}

impl_register_width!(u8, u16, u32, u64, usize);
