//! Fixed-capacity SPSC ring buffer.

use alloc::{boxed::Box, vec::Vec};
use core::{
    cell::UnsafeCell,
    fmt,
    sync::atomic::{AtomicUsize, Ordering},
};

/// A circular queue of `N` slots moving elements by swap.
///
/// Pushing swaps the caller's value into the head slot and hands back what
/// the slot held before (a `T::default()` on first use). Popping swaps the
/// tail slot out. No element is copied or dropped by the queue on the hot
/// path.
///
/// Methods taking `&mut self` are the single-context interface. For a
/// producer and a consumer running concurrently, [`split`](Self::split) the
/// buffer into a [`Producer`] and a [`Consumer`].
///
/// # Examples
///
/// ```rust,ignore
/// use kqueue::RingBuffer;
///
/// let mut rx_ring = RingBuffer::<Packet, 64>::new();
/// let (mut tx, mut rx) = rx_ring.split();
///
/// // Interrupt handler
/// let mut pkt = nic.take_packet();
/// if !tx.push_swap(&mut pkt) {
///     nic.drop_packet(pkt);
/// }
///
/// // Network task
/// let mut pkt = Packet::default();
/// while rx.pop_swap(&mut pkt) {
///     stack.receive(&mut pkt);
/// }
/// ```
pub struct RingBuffer<T, const N: usize> {
    slots: Box<[UnsafeCell<T>]>,
    count: AtomicUsize,
    head: AtomicUsize,
    tail: AtomicUsize,
}

impl<T: Default, const N: usize> RingBuffer<T, N> {
    /// Allocate an empty buffer with `N` default-initialised slots.
    pub fn new() -> Self {
        const { assert!(N > 0, "ring buffer capacity must be non-zero") };

        let slots: Vec<UnsafeCell<T>> = (0..N).map(|_| UnsafeCell::new(T::default())).collect();
        Self {
            slots: slots.into_boxed_slice(),
            count: AtomicUsize::new(0),
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
        }
    }

    /// Pop the oldest element, leaving `T::default()` in its slot.
    #[inline]
    pub fn pop(&mut self) -> Option<T> {
        let mut elem = T::default();
        self.pop_swap(&mut elem).then_some(elem)
    }
}

impl<T: Default, const N: usize> Default for RingBuffer<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> RingBuffer<T, N> {
    /// Number of slots.
    pub const CAPACITY: usize = N;

    /// Number of slots.
    #[inline(always)]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of queued elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }

    /// Whether no element is queued.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether every slot is occupied.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.len() >= N
    }

    /// Swap `elem` into the head slot.
    ///
    /// On success `elem` holds the previous content of that slot. Returns
    /// `false` and leaves everything untouched when the buffer is full.
    #[inline]
    pub fn push_swap(&mut self, elem: &mut T) -> bool {
        // SAFETY: `&mut self` excludes any other producer.
        unsafe { self.produce(elem) }
    }

    /// Swap the tail slot into `elem`.
    ///
    /// On success `elem` holds the oldest element and the slot keeps what
    /// `elem` held. Returns `false` when the buffer is empty.
    #[inline]
    pub fn pop_swap(&mut self, elem: &mut T) -> bool {
        // SAFETY: `&mut self` excludes any other consumer.
        unsafe { self.consume(elem) }
    }

    /// Move `value` into the buffer.
    ///
    /// Returns the displaced slot content, or gives `value` back when the
    /// buffer is full.
    #[inline]
    pub fn push(&mut self, mut value: T) -> Result<T, T> {
        if self.push_swap(&mut value) {
            Ok(value)
        } else {
            Err(value)
        }
    }

    /// Split into the producer and consumer halves.
    pub fn split(&mut self) -> (Producer<'_, T, N>, Consumer<'_, T, N>) {
        let ring = &*self;
        (Producer { ring }, Consumer { ring })
    }

    #[inline(always)]
    const fn wrap_next(index: usize) -> usize {
        if index + 1 >= N { 0 } else { index + 1 }
    }

    /// # Safety
    ///
    /// At most one context may produce at a time.
    unsafe fn produce(&self, elem: &mut T) -> bool {
        if self.count.load(Ordering::Acquire) >= N {
            return false;
        }

        let head = self.head.load(Ordering::Relaxed);
        // SAFETY: the slot is free (count < N) and only the producer touches
        // the head slot; the consumer's last access to it happened before the
        // release that made room.
        unsafe { core::mem::swap(&mut *self.slots[head].get(), elem) };
        self.head.store(Self::wrap_next(head), Ordering::Relaxed);

        // Publish the slot to the consumer.
        self.count.fetch_add(1, Ordering::Release);
        true
    }

    /// # Safety
    ///
    /// At most one context may consume at a time.
    unsafe fn consume(&self, elem: &mut T) -> bool {
        if self.count.load(Ordering::Acquire) == 0 {
            return false;
        }

        let tail = self.tail.load(Ordering::Relaxed);
        // SAFETY: the slot is occupied (count > 0) and only the consumer
        // touches the tail slot.
        unsafe { core::mem::swap(&mut *self.slots[tail].get(), elem) };
        self.tail.store(Self::wrap_next(tail), Ordering::Relaxed);

        // Hand the slot back to the producer.
        self.count.fetch_sub(1, Ordering::Release);
        true
    }
}

impl<T, const N: usize> fmt::Debug for RingBuffer<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("RingBuffer")
            .field("capacity", &N)
            .field("len", &self.len())
            .field("head", &self.head.load(Ordering::Relaxed))
            .field("tail", &self.tail.load(Ordering::Relaxed))
            .finish()
    }
}

/// The pushing half of a split [`RingBuffer`].
pub struct Producer<'a, T, const N: usize> {
    ring: &'a RingBuffer<T, N>,
}

// SAFETY: the producer only touches the head slot and index, and `T` is
// moved across contexts through it, hence `T: Send`.
unsafe impl<T: Send, const N: usize> Send for Producer<'_, T, N> {}

impl<T, const N: usize> Producer<'_, T, N> {
    /// See [`RingBuffer::push_swap`].
    #[inline]
    pub fn push_swap(&mut self, elem: &mut T) -> bool {
        // SAFETY: there is exactly one producer per split.
        unsafe { self.ring.produce(elem) }
    }

    /// See [`RingBuffer::push`].
    #[inline]
    pub fn push(&mut self, mut value: T) -> Result<T, T> {
        if self.push_swap(&mut value) {
            Ok(value)
        } else {
            Err(value)
        }
    }

    /// Whether the consumer has left no free slot.
    ///
    /// May be stale by the time it returns, but never reports room that
    /// does not exist.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.ring.is_full()
    }

    /// Number of queued elements as seen by the producer.
    #[inline]
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    /// Whether no element is queued.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }
}

/// The popping half of a split [`RingBuffer`].
pub struct Consumer<'a, T, const N: usize> {
    ring: &'a RingBuffer<T, N>,
}

// SAFETY: the consumer only touches the tail slot and index, and `T` is
// moved across contexts through it, hence `T: Send`.
unsafe impl<T: Send, const N: usize> Send for Consumer<'_, T, N> {}

impl<T, const N: usize> Consumer<'_, T, N> {
    /// See [`RingBuffer::pop_swap`].
    #[inline]
    pub fn pop_swap(&mut self, elem: &mut T) -> bool {
        // SAFETY: there is exactly one consumer per split.
        unsafe { self.ring.consume(elem) }
    }

    /// Whether nothing is queued.
    ///
    /// May lag behind the producer, but never reports an element that was
    /// not pushed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Number of queued elements as seen by the consumer.
    #[inline]
    pub fn len(&self) -> usize {
        self.ring.len()
    }
}

impl<T: Default, const N: usize> Consumer<'_, T, N> {
    /// See [`RingBuffer::pop`].
    #[inline]
    pub fn pop(&mut self) -> Option<T> {
        let mut elem = T::default();
        self.pop_swap(&mut elem).then_some(elem)
    }
}
