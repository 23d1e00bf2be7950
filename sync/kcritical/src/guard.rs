//! RAII guards for critical sections.

use core::{fmt, marker::PhantomData};

use crate::{
    counter::NestingCounter,
    irq::{ArchIrq, IrqControl},
};

/// A critical section held on a [`NestingCounter`], left on drop.
///
/// Guards nest freely as long as they are dropped on the context that
/// created them, which is why the guard is neither `Send` nor `Sync`.
#[must_use = "the critical section is left as soon as the guard is dropped"]
pub struct NestingGuard<'a, I: IrqControl> {
    counter: &'a NestingCounter<I>,
    entered: bool,
    _not_send: PhantomData<*mut ()>,
}

impl<'a, I: IrqControl> NestingGuard<'a, I> {
    pub(crate) fn enter(counter: &'a NestingCounter<I>) -> Self {
        let entered = counter.try_enter();
        Self {
            counter,
            entered,
            _not_send: PhantomData,
        }
    }
}

impl<I: IrqControl> Drop for NestingGuard<'_, I> {
    #[inline]
    fn drop(&mut self) {
        // A rejected enter has nothing to pair with.
        if self.entered {
            self.counter.exit();
        }
    }
}

impl<I: IrqControl> fmt::Debug for NestingGuard<'_, I> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("NestingGuard")
            .field("depth", &self.counter.depth())
            .finish()
    }
}

/// Guard over the kernel critical section [`KERNEL_CS`](crate::KERNEL_CS).
pub type CriticalSection = NestingGuard<'static, ArchIrq>;

impl NestingGuard<'static, ArchIrq> {
    /// Enter the kernel critical section.
    #[inline]
    pub fn new() -> Self {
        crate::KERNEL_CS.guard()
    }
}

impl Default for NestingGuard<'static, ArchIrq> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

/// Run `f` inside the kernel critical section.
///
/// If entering raises the overflow fault and the sink returns, `f` still
/// runs inside the enclosing section and the depth is left untouched.
#[inline]
pub fn with<R>(f: impl FnOnce() -> R) -> R {
    let _guard = CriticalSection::new();
    f()
}
