//! Bounded queue shared between control surfaces and the scheduler
//!
//! BLE and HTTP handlers may run in another task or interrupt context, so the
//! queue is guarded by `critical-section` and backed by a fixed-size
//! `heapless::Deque`.

use core::cell::RefCell;

use critical_section::Mutex;
use heapless::Deque;

/// Error returned when trying to send to a full channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrySendError<T>(pub T);

/// Error returned when trying to receive from an empty channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TryReceiveError;

/// A bounded, interrupt-safe FIFO.
pub struct Channel<T, const SIZE: usize> {
    inner: Mutex<RefCell<Deque<T, SIZE>>>,
}

impl<T, const SIZE: usize> Channel<T, SIZE> {
    /// Create a new empty channel, usable in a `static`.
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Deque::new())),
        }
    }

    pub const fn sender(&self) -> Sender<'_, T, SIZE> {
        Sender { channel: self }
    }

    pub const fn receiver(&self) -> Receiver<'_, T, SIZE> {
        Receiver { channel: self }
    }

    /// Queue a value, handing it back if the channel is full.
    pub fn try_send(&self, value: T) -> Result<(), TrySendError<T>> {
        critical_section::with(|cs| {
            let mut queue = self.inner.borrow(cs).borrow_mut();
            queue.push_back(value).map_err(TrySendError)
        })
    }

    /// Take the oldest value.
    pub fn try_receive(&self) -> Result<T, TryReceiveError> {
        critical_section::with(|cs| {
            let mut queue = self.inner.borrow(cs).borrow_mut();
            queue.pop_front().ok_or(TryReceiveError)
        })
    }

    /// Number of queued values.
    pub fn len(&self) -> usize {
        critical_section::with(|cs| self.inner.borrow(cs).borrow().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every queued value.
    pub fn clear(&self) {
        critical_section::with(|cs| self.inner.borrow(cs).borrow_mut().clear());
    }
}

impl<T, const SIZE: usize> Default for Channel<T, SIZE> {
    fn default() -> Self {
        Self::new()
    }
}

/// Sending half, handed to control surfaces.
pub struct Sender<'a, T, const SIZE: usize> {
    channel: &'a Channel<T, SIZE>,
}

impl<T, const SIZE: usize> Clone for Sender<'_, T, SIZE> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, const SIZE: usize> Copy for Sender<'_, T, SIZE> {}

impl<T, const SIZE: usize> Sender<'_, T, SIZE> {
    pub fn try_send(&self, value: T) -> Result<(), TrySendError<T>> {
        self.channel.try_send(value)
    }
}

/// Receiving half, owned by the scheduler.
pub struct Receiver<'a, T, const SIZE: usize> {
    channel: &'a Channel<T, SIZE>,
}

impl<'a, T, const SIZE: usize> Receiver<'a, T, SIZE> {
    pub fn try_receive(&self) -> Result<T, TryReceiveError> {
        self.channel.try_receive()
    }

    /// Take the values queued right now, oldest first
    ///
    /// Values sent while draining stay queued for the next drain, so a busy
    /// sender cannot keep the receiver looping.
    pub fn drain(&self) -> Drain<'a, T, SIZE> {
        Drain {
            channel: self.channel,
            remaining: self.channel.len(),
        }
    }
}

/// Iterator returned by [`Receiver::drain`]
pub struct Drain<'a, T, const SIZE: usize> {
    channel: &'a Channel<T, SIZE>,
    remaining: usize,
}

impl<T, const SIZE: usize> Iterator for Drain<'_, T, SIZE> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        self.channel.try_receive().ok()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}
