//! Bit-mask calculation for register fields.
//!
//! Ranges are given `msb` first, matching the `[msb:lsb]` convention of
//! reference manuals. Both ends are inclusive.
//!
//! | Call                               | Equivalent     |
//! |------------------------------------|----------------|
//! | `mask_for_range::<u32>(3, 0)`      | `0x0000_000F`  |
//! | `mask_for_range::<u32>(30, 25)`    | `0x7E00_0000`  |
//! | `mask_for_bit::<u8>(4)`            | `0x10`         |
//!
//! Index bounds are checked only when [`kfault::checks_enabled`] is true. An
//! index must be below [`bit_limit`], which excludes the most significant bit
//! of the type. A failed check raises
//! [`FaultCode::RegisterBitOutOfBounds`](kfault::FaultCode) and yields an
//! empty mask.

use kfault::debug_fault_ensure;

use crate::RegisterWidth;

/// Exclusive upper bound for bit indices into `T`.
#[inline(always)]
pub fn bit_limit<T: RegisterWidth>() -> u32 {
    T::BITS - 1
}

/// Mask with only `bit` set.
#[inline]
#[track_caller]
pub fn mask_for_bit<T: RegisterWidth>(bit: u32) -> T {
    debug_fault_ensure!(bit < bit_limit::<T>(), RegisterBitOutOfBounds, T::ZERO);

    T::ONE.wrapping_shl(bit)
}

/// Mask with bits `lsb..=msb` set.
///
/// `msb < lsb` is a precondition violation. With checks disabled a reversed
/// range yields just bit `msb`.
#[inline]
#[track_caller]
pub fn mask_for_range<T: RegisterWidth>(msb: u32, lsb: u32) -> T {
    debug_fault_ensure!(msb < bit_limit::<T>(), RegisterBitOutOfBounds, T::ZERO);
    debug_fault_ensure!(lsb < bit_limit::<T>(), RegisterBitOutOfBounds, T::ZERO);
    debug_fault_ensure!(msb >= lsb, RegisterBitOutOfBounds, T::ZERO);

    // Unchecked indices wrap like the shifts do, which also bounds the loop.
    let (msb, lsb) = (msb & (T::BITS - 1), lsb & (T::BITS - 1));

    let mut mask = T::ONE.wrapping_shl(msb);
    let mut bit = msb;
    while bit > lsb {
        bit -= 1;
        mask |= T::ONE.wrapping_shl(bit);
    }
    mask
}
