// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 KylinSoft Co., Ltd. <https://www.kylinos.cn/>
// See LICENSES for license details.

#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]

//! Nesting-safe critical sections.
//!
//! A critical section masks interrupts on the current CPU. Sections nest:
//! interrupts are masked once when the outermost section is entered and
//! unmasked once when it is left, however deep the nesting in between.
//!
//! # Architecture
//!
//! - [`IrqControl`]: the physical masking backend.
//! - [`NestingCounter<I>`]: the nesting state machine over a backend.
//! - [`NestingGuard`]: RAII guard leaving the section on drop.
//! - [`KERNEL_CS`]: the kernel's counter over [`ArchIrq`], with the
//!   [`enter_critical_section`] / [`exit_critical_section`] entry points,
//!   the [`CriticalSection`] guard and [`with`].
//!
//! # Platform Integration
//!
//! On bare-metal targets [`ArchIrq`] dispatches to [`KernelIrqIf`], which the
//! platform implements:
//!
//! ```rust,ignore
//! struct IrqIfImpl;
//!
//! #[crate_interface::impl_interface]
//! impl kcritical::KernelIrqIf for IrqIfImpl {
//!     fn disable_local() {
//!         unsafe { core::arch::asm!("msr daifset, #2") };
//!     }
//!
//!     fn enable_local() {
//!         unsafe { core::arch::asm!("msr daifclr, #2") };
//!     }
//! }
//! ```
//!
//! Hosted builds simulate the interrupt flag, see [`host_irqs_enabled`].
//!
//! # Usage
//!
//! ```rust,ignore
//! fn push_ready(task: TaskRef) {
//!     let _cs = kcritical::CriticalSection::new();
//!     READY_QUEUE.push(task);
//! }
//! ```

mod counter;
mod guard;
mod irq;

pub use counter::NestingCounter;
pub use guard::{CriticalSection, NestingGuard, with};
#[cfg(not(target_os = "none"))]
pub use irq::host_irqs_enabled;
pub use irq::{ArchIrq, IrqControl, KernelIrqIf};

/// The kernel critical section.
///
/// Starts at depth 0 and lives for the whole run of the kernel.
pub static KERNEL_CS: NestingCounter<ArchIrq> = NestingCounter::new();

/// Enter the kernel critical section.
#[inline]
pub fn enter_critical_section() {
    KERNEL_CS.enter();
}

/// Leave the kernel critical section.
#[inline]
pub fn exit_critical_section() {
    KERNEL_CS.exit();
}

/// Nesting depth of the kernel critical section.
#[inline]
pub fn critical_depth() -> u32 {
    KERNEL_CS.depth()
}
