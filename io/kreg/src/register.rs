//! Volatile register handles.

use core::{fmt, ptr::NonNull};

use tock_registers::interfaces::{Readable, Writeable};

use crate::{
    RegisterWidth,
    mask::{mask_for_bit, mask_for_range},
};

/// A memory-mapped register of width `T`.
///
/// The handle does not own the memory behind it and never frees it. Every
/// accessor performs its documented volatile accesses and nothing else:
/// one read for [`read`], [`is_set`], [`is_clear`] and [`read_field`]; one
/// read followed by one write for [`write_field`], [`set_bit`] and
/// [`clear_bit`]. Nothing is cached between calls.
///
/// Field writes are read-modify-write sequences and are not atomic. Wrap
/// them in a critical section, or use [`write_field_guarded`], when the
/// register is also touched from interrupt context.
///
/// # Examples
///
/// ```rust,ignore
/// use kreg::Register;
///
/// // | FIELD | BITS  |
/// // | VAL2  | 30:25 |
/// // | VAL1  | 24:16 |
/// // | VAL0  | 15:0  |
/// let ctrl = unsafe { Register::<u32>::from_addr(0x0900_0030) };
/// ctrl.write_field(15, 0, 1);
/// ctrl.write_field(24, 16, 2);
/// let val2 = ctrl.read_field(30, 25);
/// ```
///
/// [`read`]: Register::read
/// [`is_set`]: Register::is_set
/// [`is_clear`]: Register::is_clear
/// [`read_field`]: Register::read_field
/// [`write_field`]: Register::write_field
/// [`set_bit`]: Register::set_bit
/// [`clear_bit`]: Register::clear_bit
/// [`write_field_guarded`]: Register::write_field_guarded
pub struct Register<T: RegisterWidth> {
    addr: NonNull<T>,
}

// SAFETY: the handle is only an address with no thread-bound state; every
// access goes through volatile operations on memory the caller vouched for.
unsafe impl<T: RegisterWidth> Send for Register<T> {}

impl<T: RegisterWidth> Register<T> {
    /// Create a handle for the register at `addr`.
    ///
    /// # Safety
    ///
    /// `addr` must be valid for volatile reads and writes of `T`, suitably
    /// aligned, and stay mapped for as long as the handle is used.
    #[inline]
    pub const unsafe fn new(addr: NonNull<T>) -> Self {
        Self { addr }
    }

    /// Create a handle from a raw address.
    ///
    /// # Safety
    ///
    /// Same as [`Register::new`]; additionally `addr` must not be zero.
    #[inline]
    pub unsafe fn from_addr(addr: usize) -> Self {
        Self {
            addr: unsafe { NonNull::new_unchecked(addr as *mut T) },
        }
    }

    /// Address of the register.
    #[inline]
    pub fn addr(&self) -> usize {
        self.addr.as_ptr() as usize
    }

    /// Read the whole register.
    #[inline(always)]
    pub fn read(&self) -> T {
        // SAFETY: validity of the address is a construction invariant.
        unsafe { self.addr.as_ptr().read_volatile() }
    }

    /// Write the whole register.
    #[inline(always)]
    pub fn write(&self, value: T) {
        // SAFETY: validity of the address is a construction invariant.
        unsafe { self.addr.as_ptr().write_volatile(value) }
    }

    /// Whether `bit` reads as `1`.
    #[inline]
    #[track_caller]
    pub fn is_set(&self, bit: u32) -> bool {
        self.read() & mask_for_bit::<T>(bit) != T::ZERO
    }

    /// Whether `bit` reads as `0`.
    #[inline]
    #[track_caller]
    pub fn is_clear(&self, bit: u32) -> bool {
        !self.is_set(bit)
    }

    /// Read the field `[msb:lsb]`, shifted down to bit 0.
    #[inline]
    #[track_caller]
    pub fn read_field(&self, msb: u32, lsb: u32) -> T {
        let mask = mask_for_range::<T>(msb, lsb);
        if mask == T::ZERO {
            return T::ZERO;
        }

        let value = (self.read() & mask).wrapping_shr(lsb);

        // Shifting right is not guaranteed to clear the vacated bits on every
        // target, so trim to the field width again.
        value & mask_for_range::<T>(msb.wrapping_sub(lsb), 0)
    }

    /// Write `value` into the field `[msb:lsb]`, leaving other bits intact.
    ///
    /// Bits of `value` that do not fit in the field are discarded.
    #[inline]
    #[track_caller]
    pub fn write_field(&self, msb: u32, lsb: u32, value: T) {
        let mask = mask_for_range::<T>(msb, lsb);
        if mask == T::ZERO {
            return;
        }

        let bits = value.wrapping_shl(lsb) & mask;
        let current = self.read();
        self.write((current & !mask) | bits);
    }

    /// Set `bit` to `1`.
    #[inline]
    #[track_caller]
    pub fn set_bit(&self, bit: u32) {
        self.write_field(bit, bit, T::ONE);
    }

    /// Clear `bit` to `0`.
    #[inline]
    #[track_caller]
    pub fn clear_bit(&self, bit: u32) {
        self.write_field(bit, bit, T::ZERO);
    }

    /// [`write_field`](Register::write_field) inside the kernel critical
    /// section.
    #[track_caller]
    pub fn write_field_guarded(&self, msb: u32, lsb: u32, value: T) {
        kcritical::with(|| self.write_field(msb, lsb, value));
    }
}

impl<T: RegisterWidth> fmt::Debug for Register<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Register")
            .field("addr", &format_args!("{:#x}", self.addr()))
            .finish()
    }
}

macro_rules! impl_register_interfaces {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Readable for Register<$ty> {
                type T = $ty;
                type R = ();

                #[inline(always)]
                fn get(&self) -> $ty {
                    Register::read(self)
                }
            }

            impl Writeable for Register<$ty> {
                type T = $ty;
                type R = ();

                #[inline(always)]
                fn set(&self, value: $ty) {
                    Register::write(self, value)
                }
            }
        )*
    };
}

impl_register_interfaces!(u8, u16, u32, u64, usize);
