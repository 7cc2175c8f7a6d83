//! Bounded mailbox for handing commands to the engine thread.
//!
//! Built on `critical-section` and `heapless::Deque`, so producers may run in
//! interrupts or on another core while the engine drains the queue between
//! ticks.

use core::cell::RefCell;
use core::fmt;

use critical_section::Mutex;
use heapless::Deque;

/// Returned when the mailbox is full; carries the rejected message back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrySendError<T>(pub T);

impl<T> fmt::Display for TrySendError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("mailbox is full")
    }
}

/// Returned when the mailbox is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TryReceiveError;

impl fmt::Display for TryReceiveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("mailbox is empty")
    }
}

/// Fixed-capacity queue guarded by a critical section.
pub struct Mailbox<T, const SIZE: usize> {
    inner: Mutex<RefCell<Deque<T, SIZE>>>,
}

impl<T, const SIZE: usize> Mailbox<T, SIZE> {
    /// Create an empty mailbox.
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Deque::new())),
        }
    }

    /// Get a producer handle; any number may coexist.
    pub const fn sender(&self) -> Sender<'_, T, SIZE> {
        Sender { mailbox: self }
    }

    /// Get the consumer handle; only the engine thread should hold one.
    pub const fn receiver(&self) -> Receiver<'_, T, SIZE> {
        Receiver { mailbox: self }
    }

    /// Queue a message, or hand it back in `TrySendError` when full.
    pub fn try_send(&self, value: T) -> Result<(), TrySendError<T>> {
        critical_section::with(|cs| {
            let mut queue = self.inner.borrow(cs).borrow_mut();
            queue.push_back(value).map_err(TrySendError)
        })
    }

    /// Take the oldest message, or `TryReceiveError` when empty.
    pub fn try_receive(&self) -> Result<T, TryReceiveError> {
        critical_section::with(|cs| {
            let mut queue = self.inner.borrow(cs).borrow_mut();
            queue.pop_front().ok_or(TryReceiveError)
        })
    }

    /// Number of queued messages
    pub fn len(&self) -> usize {
        critical_section::with(|cs| self.inner.borrow(cs).borrow().len())
    }

    /// Whether no message is queued
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every queued message
    pub fn clear(&self) {
        critical_section::with(|cs| self.inner.borrow(cs).borrow_mut().clear());
    }
}

impl<T, const SIZE: usize> Default for Mailbox<T, SIZE> {
    fn default() -> Self {
        Self::new()
    }
}

/// Producer side of a [`Mailbox`].
#[derive(Clone, Copy)]
pub struct Sender<'a, T, const SIZE: usize> {
    mailbox: &'a Mailbox<T, SIZE>,
}

impl<T, const SIZE: usize> Sender<'_, T, SIZE> {
    /// Queue a message; see [`Mailbox::try_send`].
    pub fn try_send(&self, value: T) -> Result<(), TrySendError<T>> {
        self.mailbox.try_send(value)
    }
}

/// Consumer side of a [`Mailbox`].
#[derive(Clone, Copy)]
pub struct Receiver<'a, T, const SIZE: usize> {
    mailbox: &'a Mailbox<T, SIZE>,
}

impl<T, const SIZE: usize> Receiver<'_, T, SIZE> {
    /// Take the oldest message; see [`Mailbox::try_receive`].
    pub fn try_receive(&self) -> Result<T, TryReceiveError> {
        self.mailbox.try_receive()
    }

    /// Whether the mailbox has nothing to drain
    pub fn is_empty(&self) -> bool {
        self.mailbox.is_empty()
    }
}
