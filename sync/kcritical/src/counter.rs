//! Critical-section nesting counter.

use core::{
    fmt,
    marker::PhantomData,
    sync::atomic::{AtomicU32, Ordering, compiler_fence},
};

use kfault::fault_ensure;

use crate::{guard::NestingGuard, irq::IrqControl};

/// Nesting counter for critical sections masked through `I`.
///
/// Interrupts are masked when the depth goes from 0 to 1 and unmasked when it
/// returns to 0; inner `enter`/`exit` pairs only move the counter. The
/// counter saturates: an `enter` at `u32::MAX` or an `exit` at 0 raises a
/// fault and leaves it unchanged.
///
/// The counter belongs to a single execution context (one CPU, plus the
/// interrupt handlers that masking keeps out). It is not a multi-core lock.
pub struct NestingCounter<I: IrqControl> {
    depth: AtomicU32,
    _irq: PhantomData<fn() -> I>,
}

impl<I: IrqControl> NestingCounter<I> {
    /// Create a counter at depth 0.
    #[inline(always)]
    pub const fn new() -> Self {
        Self {
            depth: AtomicU32::new(0),
            _irq: PhantomData,
        }
    }

    /// Enter a critical section.
    ///
    /// Interrupts are masked before the depth is raised, so the counter never
    /// claims protection that is not in place yet.
    #[inline]
    pub fn enter(&self) {
        self.try_enter();
    }

    /// [`enter`](Self::enter), returning whether the section was entered.
    ///
    /// `false` means the overflow fault was raised and the sink returned.
    pub(crate) fn try_enter(&self) -> bool {
        let depth = self.depth.load(Ordering::Relaxed);
        fault_ensure!(depth < u32::MAX, CriticalSectionEnterOverflow, false);

        if depth == 0 {
            I::disable();
            compiler_fence(Ordering::SeqCst);
        }
        self.depth.store(depth + 1, Ordering::Relaxed);
        true
    }

    /// Leave a critical section.
    ///
    /// The depth is lowered before interrupts are unmasked.
    pub fn exit(&self) {
        let depth = self.depth.load(Ordering::Relaxed);
        if depth == 0 {
            kfault::fault!(
                CriticalSectionExitUnderflow,
                "critical section exit without matching enter"
            );
            return;
        }

        self.depth.store(depth - 1, Ordering::Relaxed);
        if depth == 1 {
            compiler_fence(Ordering::SeqCst);
            I::enable();
        }
    }

    /// Current nesting depth.
    #[inline]
    pub fn depth(&self) -> u32 {
        self.depth.load(Ordering::Relaxed)
    }

    /// Whether interrupts are currently masked by this counter.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.depth() != 0
    }

    /// Enter a critical section that is left when the guard is dropped.
    #[inline]
    pub fn guard(&self) -> NestingGuard<'_, I> {
        NestingGuard::enter(self)
    }

    #[cfg(test)]
    pub(crate) fn force_depth(&self, depth: u32) {
        self.depth.store(depth, Ordering::Relaxed);
    }
}

impl<I: IrqControl> Default for NestingCounter<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: IrqControl> fmt::Debug for NestingCounter<I> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("NestingCounter")
            .field("depth", &self.depth())
            .finish()
    }
}
