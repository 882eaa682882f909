//! A bounded FIFO queue with timed blocking operations and drop-on-timeout
//! backpressure.
//!
//! [`HandoffQueue`] is a mutex-and-condvar guarded buffer for threads that
//! must never block indefinitely: a producer facing a full queue waits a
//! bounded time for space and then **silently drops** its item; a consumer
//! facing an empty queue waits a bounded time for data and then returns
//! `T::default()`. Every call returns within a bounded window, trading data
//! loss for liveness.
//!
//! # Behavior Summary
//!
//! | Situation | `push(item)` | `pop()` |
//! |-----------|--------------|---------|
//! | Space/data available | stores the item | returns the oldest item |
//! | Full/empty, freed within the wait | stores the item | returns the oldest item |
//! | Full/empty past the wait | drops the item | returns `T::default()` |
//! | Queue disabled (capacity ≤ 0) | drops the item | returns `T::default()` |
//! | Racing an in-flight full-queue handoff | — | returns `T::default()` |
//!
//! The default wait is 100ms on both sides ([`DEFAULT_WRITE_WAIT`],
//! [`DEFAULT_READ_WAIT`]); [`HandoffQueue::with_wait_times`] tunes both at
//! construction.
//!
//! # The Full-Queue Handoff
//!
//! Popping from a *full* queue is special: it is the only transition that can
//! unblock a waiting producer, and the wakeup should not happen while the
//! consumer still holds the lock. The popped value is parked in a single-slot
//! staging mailbox, the lock is released, one producer is woken, and the
//! consumer re-acquires the lock to reclaim its value:
//!
//! ```text
//! pop() on a full queue:
//! ┌────────────────────────────────────────────────────────┐
//! │ lock                                                   │
//! │   pop front -> staging slot                            │
//! │ unlock                                                 │
//! │ notify one producer          (lock NOT held)           │
//! │ lock                                                   │
//! │   take value from staging slot                         │
//! │ unlock, return value                                   │
//! └────────────────────────────────────────────────────────┘
//! ```
//!
//! The staging slot holds at most one value. A second consumer that pops a
//! full queue while a handoff is in flight is turned away with `T::default()`
//! instead of racing on the slot.
//!
//! # The Default-Value Ambiguity
//!
//! A timed-out pop, a disabled queue, a rejected handoff race, and a
//! legitimately stored `T::default()` all produce the same observable result.
//! Callers that need to tell these apart should use an element type whose
//! default is never a real payload (e.g. `0` as a reserved id, or an empty
//! `String`).
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::thread;
//!
//! use baton_queue::HandoffQueue;
//!
//! let queue = Arc::new(HandoffQueue::new(4));
//!
//! let producer = {
//!     let queue = Arc::clone(&queue);
//!     thread::spawn(move || {
//!         for i in 1..=4u64 {
//!             queue.push(i);
//!         }
//!     })
//! };
//!
//! producer.join().unwrap();
//!
//! assert_eq!(queue.len(), 4);
//! assert_eq!(queue.pop(), 1);
//! assert_eq!(queue.pop(), 2);
//! ```
//!
//! # When to Use This
//!
//! Use `baton_queue` when:
//! - Producers and consumers must make progress even if the other side stalls
//! - Losing items under sustained overload is acceptable (telemetry, samples,
//!   best-effort work items)
//! - Any number of threads share the queue (it is a monitor, not a
//!   single-producer/single-consumer pair)
//!
//! Consider alternatives when:
//! - Every item must be delivered → use `crossbeam-channel` (bounded) and
//!   block for real
//! - You need to distinguish "empty" from "got a default value" → use a
//!   channel with a `Result`-returning API
//! - You need the lowest possible latency and have exactly one producer and
//!   one consumer → use a lock-free SPSC ring buffer

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

use std::collections::VecDeque;
use std::fmt;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex, MutexGuard};

/// Default time a producer waits for free space before dropping its item.
pub const DEFAULT_WRITE_WAIT: Duration = Duration::from_millis(100);

/// Default time a consumer waits for data before returning `T::default()`.
pub const DEFAULT_READ_WAIT: Duration = Duration::from_millis(100);

/// Everything guarded by the queue's mutex.
struct State<T> {
    /// FIFO storage; `buf.len()` is the queue's current count.
    buf: VecDeque<T>,
    /// Staging mailbox for the full-queue handoff. `Some` while a handoff
    /// is in flight.
    staged: Option<T>,
}

/// A fixed-capacity, thread-safe FIFO queue with timed blocking operations.
///
/// Shared across threads behind an [`Arc`](std::sync::Arc); both [`push`] and
/// [`pop`] take `&self`. See the [crate docs](crate) for the behavior table
/// and the full-queue handoff protocol.
///
/// A queue constructed with capacity ≤ 0 is permanently disabled: it never
/// stores anything, `push` discards immediately and `pop` returns
/// `T::default()` immediately.
///
/// [`push`]: HandoffQueue::push
/// [`pop`]: HandoffQueue::pop
///
/// # Example
///
/// ```
/// use baton_queue::HandoffQueue;
///
/// let queue = HandoffQueue::new(2);
///
/// queue.push("a".to_string());
/// queue.push("b".to_string());
///
/// assert_eq!(queue.pop(), "a");
/// assert_eq!(queue.pop(), "b");
/// ```
pub struct HandoffQueue<T> {
    capacity: usize,
    write_wait: Duration,
    read_wait: Duration,
    state: Mutex<State<T>>,
    /// Signaled when a full-queue pop frees a slot.
    space_available: Condvar,
    /// Signaled when a push lands in an empty buffer.
    data_available: Condvar,
}

impl<T> HandoffQueue<T> {
    /// Creates a queue with the given capacity and the default wait times.
    ///
    /// Any capacity ≤ 0 is clamped to 0, which produces a permanently
    /// disabled queue rather than an error.
    ///
    /// # Example
    ///
    /// ```
    /// use baton_queue::HandoffQueue;
    ///
    /// let queue = HandoffQueue::<u64>::new(8);
    /// assert_eq!(queue.capacity(), 8);
    ///
    /// let disabled = HandoffQueue::<u64>::new(-3);
    /// assert_eq!(disabled.capacity(), 0);
    /// ```
    pub fn new(capacity: isize) -> Self {
        Self::with_wait_times(capacity, DEFAULT_WRITE_WAIT, DEFAULT_READ_WAIT)
    }

    /// Creates a queue with custom producer and consumer wait times.
    ///
    /// `write_wait` bounds how long [`push`](Self::push) waits for space on a
    /// full queue before dropping the item; `read_wait` bounds how long
    /// [`pop`](Self::pop) waits for data on an empty queue before returning
    /// `T::default()`. The waits are fixed for the lifetime of the queue.
    ///
    /// # Example
    ///
    /// ```
    /// use std::time::Duration;
    ///
    /// use baton_queue::HandoffQueue;
    ///
    /// // Impatient queue: give up after 5ms on either side.
    /// let queue = HandoffQueue::<u64>::with_wait_times(
    ///     16,
    ///     Duration::from_millis(5),
    ///     Duration::from_millis(5),
    /// );
    /// assert_eq!(queue.pop(), 0); // empty; returns the default after ~5ms
    /// ```
    pub fn with_wait_times(capacity: isize, write_wait: Duration, read_wait: Duration) -> Self {
        let capacity = usize::try_from(capacity).unwrap_or(0);
        Self {
            capacity,
            write_wait,
            read_wait,
            state: Mutex::new(State {
                buf: VecDeque::with_capacity(capacity),
                staged: None,
            }),
            space_available: Condvar::new(),
            data_available: Condvar::new(),
        }
    }

    /// Returns the clamped capacity.
    ///
    /// Reads an immutable field; never locks.
    #[inline]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of elements currently stored.
    ///
    /// A momentary snapshot; under concurrent use it may be stale by the time
    /// the call returns.
    #[inline]
    pub fn len(&self) -> usize {
        self.state.lock().buf.len()
    }

    /// Returns `true` if the queue currently stores no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Attempts to enqueue `item`, waiting a bounded time for space.
    ///
    /// If the queue is full, this waits up to the configured write wait for a
    /// slot to free up. If none does, **the item is silently dropped** — the
    /// backpressure policy is bounded waiting, not bounded blocking, and
    /// overload is absorbed as data loss rather than as an error.
    ///
    /// On a disabled (capacity-0) queue this returns immediately and the item
    /// is discarded.
    ///
    /// # Example
    ///
    /// ```
    /// use std::time::Duration;
    ///
    /// use baton_queue::HandoffQueue;
    ///
    /// let queue = HandoffQueue::with_wait_times(
    ///     2,
    ///     Duration::from_millis(5),
    ///     Duration::from_millis(5),
    /// );
    ///
    /// queue.push(1);
    /// queue.push(2);
    /// queue.push(3); // full: waits ~5ms, then drops
    ///
    /// assert_eq!(queue.len(), 2);
    /// ```
    pub fn push(&self, item: T) {
        if self.capacity == 0 {
            return;
        }

        let mut state = self.state.lock();

        if state.buf.len() == self.capacity && !self.wait_for_space(&mut state) {
            // Timed out with the queue still full; the item is dropped.
            return;
        }

        let was_empty = state.buf.is_empty();
        state.buf.push_back(item);
        drop(state);

        // Only the empty -> non-empty transition can have a consumer waiting.
        if was_empty {
            self.data_available.notify_one();
        }
    }

    /// Attempts to dequeue the oldest element, waiting a bounded time for
    /// data.
    ///
    /// If the queue is empty, this waits up to the configured read wait for
    /// an element to arrive. If none does, it returns `T::default()` — the
    /// caller cannot distinguish this from a legitimately default-valued
    /// element (see the [crate docs](crate) on the ambiguity).
    ///
    /// Popping from a *full* queue routes the value through the staging slot
    /// so that the waiting producer is woken without the lock held. A second
    /// pop that catches the queue full while that handoff is still in flight
    /// returns `T::default()` instead of racing on the slot.
    ///
    /// On a disabled (capacity-0) queue this returns `T::default()`
    /// immediately.
    ///
    /// # Example
    ///
    /// ```
    /// use std::time::Duration;
    ///
    /// use baton_queue::HandoffQueue;
    ///
    /// let queue = HandoffQueue::with_wait_times(
    ///     4,
    ///     Duration::from_millis(5),
    ///     Duration::from_millis(5),
    /// );
    ///
    /// queue.push("first".to_string());
    /// assert_eq!(queue.pop(), "first");
    ///
    /// // Empty: waits ~5ms, then yields the default value.
    /// assert_eq!(queue.pop(), String::new());
    /// ```
    pub fn pop(&self) -> T
    where
        T: Default,
    {
        if self.capacity == 0 {
            return T::default();
        }

        let mut state = self.state.lock();

        if state.buf.is_empty() && !self.wait_for_data(&mut state) {
            // Timed out with the queue still empty.
            return T::default();
        }

        let was_full = state.buf.len() == self.capacity;

        if was_full && state.staged.is_some() {
            // A full-queue handoff is already in flight; refuse to race it.
            return T::default();
        }

        let item = state.buf.pop_front().unwrap_or_default();

        if !was_full {
            return item;
        }

        // Full-queue handoff: park the value, wake one producer with the
        // lock released, then reclaim the value.
        state.staged = Some(item);
        drop(state);

        self.space_available.notify_one();

        let mut state = self.state.lock();
        state.staged.take().unwrap_or_default()
    }

    /// Waits until the buffer has room or the write wait elapses.
    ///
    /// Returns `true` if there is room when it returns; the caller holds the
    /// lock throughout (modulo the condvar wait itself).
    fn wait_for_space(&self, state: &mut MutexGuard<'_, State<T>>) -> bool {
        let deadline = Instant::now() + self.write_wait;
        while state.buf.len() == self.capacity {
            if self
                .space_available
                .wait_until(state, deadline)
                .timed_out()
            {
                return state.buf.len() < self.capacity;
            }
        }
        true
    }

    /// Waits until the buffer has data or the read wait elapses.
    ///
    /// Returns `true` if there is data when it returns.
    fn wait_for_data(&self, state: &mut MutexGuard<'_, State<T>>) -> bool {
        let deadline = Instant::now() + self.read_wait;
        while state.buf.is_empty() {
            if self
                .data_available
                .wait_until(state, deadline)
                .timed_out()
            {
                return !state.buf.is_empty();
            }
        }
        true
    }
}

impl<T> fmt::Debug for HandoffQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandoffQueue")
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}
