// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 KylinSoft Co., Ltd. <https://www.kylinos.cn/>
// See LICENSES for license details.

//! Kernel fault codes and the fault sink.
//!
//! Faults are terminal conditions detected by the primitive layer: a
//! critical-section counter that would overflow or underflow, or a bit index
//! that falls outside the register it addresses. They are not recoverable
//! errors, so they are never returned as a `Result`. Instead they are handed
//! to the fault sink installed with [`set_fault_handler`].
//!
//! Without a sink, [`raise`] panics. A sink that returns (a recorder in a test
//! harness, for example) makes the faulting operation bail out without
//! touching the state it protects.
//!
//! # Checked preconditions
//!
//! - [`check`] / [`fault_ensure!`]: always evaluated.
//! - [`debug_check`] / [`debug_fault_ensure!`]: evaluated only when
//!   [`checks_enabled`] is true, i.e. with `debug_assertions` or the
//!   `always-check` feature.

#![cfg_attr(not(test), no_std)]

use core::{
    fmt,
    sync::atomic::{AtomicUsize, Ordering},
};

use strum::EnumCount;

/// Non-recoverable conditions reported by the primitive layer.
#[repr(u32)]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, EnumCount)]
pub enum FaultCode {
    /// `enter` was called with the nesting counter already at its maximum.
    ///
    /// Incrementing would wrap the counter to zero, so the next `exit` would
    /// re-enable interrupts in the middle of an enclosing critical section.
    CriticalSectionEnterOverflow = 0,
    /// `exit` was called more times than `enter`.
    CriticalSectionExitUnderflow,
    /// A bit, `msb` or `lsb` index is outside the addressable range of the
    /// register type, or a field range is reversed.
    RegisterBitOutOfBounds,
}

impl FaultCode {
    /// Returns the fault description.
    pub fn as_str(&self) -> &'static str {
        use FaultCode::*;
        match *self {
            CriticalSectionEnterOverflow => "Critical section nesting overflow",
            CriticalSectionExitUnderflow => "Unpaired critical section exit",
            RegisterBitOutOfBounds => "Register bit out of bounds",
        }
    }

    /// Returns the fault code value in `u32`.
    pub const fn code(self) -> u32 {
        self as u32
    }
}

impl TryFrom<u32> for FaultCode {
    type Error = u32;

    #[inline]
    fn try_from(value: u32) -> Result<Self, Self::Error> {
        if value < FaultCode::COUNT as u32 {
            Ok(unsafe { core::mem::transmute::<u32, FaultCode>(value) })
        } else {
            Err(value)
        }
    }
}

impl fmt::Display for FaultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

static FAULT_HANDLER: AtomicUsize = AtomicUsize::new(0);

/// Install the fault sink, replacing the previous one.
pub fn set_fault_handler(handler: fn(FaultCode)) {
    FAULT_HANDLER.store(handler as *const () as usize, Ordering::SeqCst);
}

/// Remove the fault sink. Subsequent faults panic.
pub fn clear_fault_handler() {
    FAULT_HANDLER.store(0, Ordering::SeqCst);
}

/// Report a fault to the installed sink.
///
/// # Panics
///
/// Panics if no sink is installed.
#[cold]
#[track_caller]
pub fn raise(code: FaultCode) {
    log::error!("kernel fault #{}: {}", code.code(), code);

    let handler = FAULT_HANDLER.load(Ordering::SeqCst);
    if handler == 0 {
        panic!("unhandled kernel fault: {code}");
    }
    let handler = unsafe { core::mem::transmute::<usize, fn(FaultCode)>(handler) };
    handler(code);
}

/// Raise `code` if `cond` does not hold. Returns `cond`.
#[inline(always)]
#[track_caller]
pub fn check(cond: bool, code: FaultCode) -> bool {
    if !cond {
        raise(code);
    }
    cond
}

/// Whether [`debug_check`] is active in this build.
#[inline(always)]
pub const fn checks_enabled() -> bool {
    cfg!(any(debug_assertions, feature = "always-check"))
}

/// Like [`check`], but a no-op returning `true` when [`checks_enabled`] is
/// false.
#[inline(always)]
#[track_caller]
pub fn debug_check(cond: bool, code: FaultCode) -> bool {
    if checks_enabled() {
        check(cond, code)
    } else {
        true
    }
}

/// Raise a fault with an extra log line describing the context.
///
/// ```rust,ignore
/// kfault::fault!(CriticalSectionExitUnderflow, "exit at depth {}", depth);
/// ```
#[macro_export]
macro_rules! fault {
    ($code:ident) => {
        $crate::raise($crate::FaultCode::$code)
    };
    ($code:ident, $($arg:tt)+) => {{
        $crate::__priv::error!($($arg)+);
        $crate::raise($crate::FaultCode::$code)
    }};
}

/// Ensure a condition holds. If it does not, raise the fault and return from
/// the enclosing function, optionally with a value.
///
/// ```rust,ignore
/// fn exit(depth: u32) {
///     kfault::fault_ensure!(depth > 0, CriticalSectionExitUnderflow);
/// }
/// ```
#[macro_export]
macro_rules! fault_ensure {
    ($predicate:expr, $code:ident $(, $ret:expr)? $(,)?) => {
        if !$crate::check($predicate, $crate::FaultCode::$code) {
            return $($ret)?;
        }
    };
}

/// [`fault_ensure!`] that is only evaluated when [`checks_enabled`] is true.
#[macro_export]
macro_rules! debug_fault_ensure {
    ($predicate:expr, $code:ident $(, $ret:expr)? $(,)?) => {
        if !$crate::debug_check($predicate, $crate::FaultCode::$code) {
            return $($ret)?;
        }
    };
}

#[doc(hidden)]
pub mod __priv {
    pub use log::error;
}
