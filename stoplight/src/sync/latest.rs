//! Single-slot, latest-value-wins channel for inter-thread communication.
//!
//! A [`LatestChannel`] carries "current state", not an event log: it holds at
//! most one pending value, and every [`send`](LatestChannel::send) replaces
//! whatever a consumer has not picked up yet. Receivers block on a condition
//! variable until a value is present, then take it and leave the slot empty.
//!
//! # Overview
//!
//! - Any number of senders and receivers may share one channel through an
//!   [`Arc`](std::sync::Arc).
//! - One `send` wakes at most one blocked receiver; the others keep waiting
//!   for the next value.
//! - [`close`](LatestChannel::close) wakes every receiver. A pending value is
//!   still handed out after closing; only an empty, closed channel reports
//!   [`Closed`].
//!
//! # Example
//!
//! ```
//! use stoplight::sync::latest::LatestChannel;
//!
//! let channel = LatestChannel::new();
//!
//! channel.send(1);
//! channel.send(2);
//!
//! // The first value was never received and is gone.
//! assert_eq!(channel.receive(), Ok(2));
//! assert_eq!(channel.try_receive(), None);
//! ```
//!
//! # Differences from [`std::sync::mpsc`]
//!
//! - Capacity collapses to one: sending never blocks and never fails.
//! - Receivers are not unique: the channel is shared by reference, not split
//!   into endpoint halves.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::trace::trace;

/// Timeout specification for blocking operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeout {
    /// Wait indefinitely.
    Infinite,
    /// Wait for at most the specified duration.
    Duration(Duration),
}

impl From<Duration> for Timeout {
    fn from(d: Duration) -> Self {
        Self::Duration(d)
    }
}

/// Error returned by [`LatestChannel::receive`] once the channel is closed
/// and drained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("channel closed")]
pub struct Closed;

/// Error returned by [`LatestChannel::receive_timeout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RecvTimeoutError {
    /// No value arrived before the deadline.
    #[error("timed out waiting for a value")]
    Timeout,
    /// The channel is closed and holds no pending value.
    #[error("channel closed")]
    Closed,
}

impl From<Closed> for RecvTimeoutError {
    fn from(_: Closed) -> Self {
        Self::Closed
    }
}

/// State guarded by the channel mutex.
struct Slot<T> {
    value: Option<T>,
    closed: bool,
    /// Receivers currently parked on the condvar.
    waiting: usize,
}

impl<T> Slot<T> {
    /// Predicate for parked receivers: keep waiting while there is nothing to
    /// take and nothing to report.
    fn is_idle(&self) -> bool {
        self.value.is_none() && !self.closed
    }
}

/// Thread-safe single-slot channel where a new value overwrites an
/// unconsumed one.
pub struct LatestChannel<T> {
    slot: Mutex<Slot<T>>,
    available: Condvar,
}

impl<T> LatestChannel<T> {
    /// Creates an empty, open channel.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slot: Mutex::new(Slot {
                value: None,
                closed: false,
                waiting: 0,
            }),
            available: Condvar::new(),
        }
    }

    /// No user code ever runs while the slot is locked, so a poisoned lock
    /// still guards a consistent slot.
    fn lock(&self) -> MutexGuard<'_, Slot<T>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Publishes `value`, discarding any value no receiver has taken yet, and
    /// wakes one blocked receiver.
    ///
    /// Never blocks beyond acquiring the slot lock. Sending on a closed
    /// channel drops the value.
    pub fn send(&self, value: T) {
        let mut slot = self.lock();
        if slot.closed {
            trace!("send on closed channel, value dropped");
            return;
        }

        if slot.value.replace(value).is_some() {
            trace!("unconsumed value overwritten");
        }
        trace!(waiting = slot.waiting, "value published");
        self.available.notify_one();
    }

    /// Blocks until a value is available, then takes it.
    ///
    /// # Errors
    ///
    /// Returns [`Closed`] if the channel is closed and empty.
    pub fn receive(&self) -> Result<T, Closed> {
        let mut slot = self.lock();
        slot.waiting += 1;
        let mut slot = self
            .available
            .wait_while(slot, |slot| slot.is_idle())
            .unwrap_or_else(PoisonError::into_inner);
        slot.waiting -= 1;

        slot.value.take().ok_or(Closed)
    }

    /// Like [`receive`](Self::receive), but gives up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`RecvTimeoutError::Timeout`] if no value arrived in time, or
    /// [`RecvTimeoutError::Closed`] if the channel is closed and empty.
    pub fn receive_timeout(&self, timeout: impl Into<Timeout>) -> Result<T, RecvTimeoutError> {
        let limit = match timeout.into() {
            Timeout::Infinite => return self.receive().map_err(Into::into),
            Timeout::Duration(limit) => limit,
        };

        let mut slot = self.lock();
        slot.waiting += 1;
        let (mut slot, _) = self
            .available
            .wait_timeout_while(slot, limit, |slot| slot.is_idle())
            .unwrap_or_else(PoisonError::into_inner);
        slot.waiting -= 1;

        match slot.value.take() {
            Some(value) => Ok(value),
            None if slot.closed => Err(RecvTimeoutError::Closed),
            None => Err(RecvTimeoutError::Timeout),
        }
    }

    /// Takes the pending value, if any, without blocking.
    #[must_use]
    pub fn try_receive(&self) -> Option<T> {
        self.lock().value.take()
    }

    /// Closes the channel and wakes every blocked receiver.
    ///
    /// Idempotent. A value sent before closing can still be received.
    pub fn close(&self) {
        let mut slot = self.lock();
        if !slot.closed {
            slot.closed = true;
            trace!(waiting = slot.waiting, "channel closed");
        }
        self.available.notify_all();
    }

    /// Returns `true` once [`close`](Self::close) has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Returns `true` if a value is waiting to be received.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.lock().value.is_some()
    }

    /// Number of receivers currently blocked in `receive` or
    /// `receive_timeout`.
    #[must_use]
    pub fn waiting_receivers(&self) -> usize {
        self.lock().waiting
    }
}

impl<T> Default for LatestChannel<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for LatestChannel<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let slot = self.lock();
        f.debug_struct("LatestChannel")
            .field("pending", &slot.value.is_some())
            .field("closed", &slot.closed)
            .field("waiting", &slot.waiting)
            .finish()
    }
}
