//! Physical interrupt masking backends.

/// Low-level interrupt masking, implemented by the platform layer.
///
/// Only used on bare-metal targets; hosted builds simulate the interrupt
/// flag instead.
#[crate_interface::def_interface]
pub trait KernelIrqIf {
    /// Mask interrupts on the current CPU.
    fn disable_local();

    /// Unmask interrupts on the current CPU.
    fn enable_local();
}

/// A way to physically mask and unmask interrupts.
///
/// [`NestingCounter`](crate::NestingCounter) calls these exactly once per
/// outermost critical section.
pub trait IrqControl {
    /// Mask interrupts.
    fn disable();

    /// Unmask interrupts.
    fn enable();
}

/// Interrupt control of the running kernel.
#[derive(Debug, Clone, Copy)]
pub struct ArchIrq;

cfg_if::cfg_if! {
    if #[cfg(target_os = "none")] {
        impl IrqControl for ArchIrq {
            #[inline]
            fn disable() {
                crate_interface::call_interface!(crate::irq::KernelIrqIf::disable_local);
            }

            #[inline]
            fn enable() {
                crate_interface::call_interface!(crate::irq::KernelIrqIf::enable_local);
            }
        }
    } else {
        use core::sync::atomic::{AtomicBool, Ordering};

        static HOST_IRQS_ENABLED: AtomicBool = AtomicBool::new(true);

        /// Simulated interrupt flag of hosted builds.
        pub fn host_irqs_enabled() -> bool {
            HOST_IRQS_ENABLED.load(Ordering::SeqCst)
        }

        impl IrqControl for ArchIrq {
            #[inline]
            fn disable() {
                HOST_IRQS_ENABLED.store(false, Ordering::SeqCst);
            }

            #[inline]
            fn enable() {
                HOST_IRQS_ENABLED.store(true, Ordering::SeqCst);
            }
        }
    }
}
