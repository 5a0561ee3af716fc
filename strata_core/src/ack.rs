// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! One-shot host acknowledgments as futures.
//!
//! Hosts confirm asynchronous work ("presentation is showing", "virtual
//! display removed") through callbacks. An [`Acknowledgement`] is the bridge
//! between such a callback and cooperative suspension:
//!
//! 1. The core creates an `Acknowledgement` and hands a clone to the host
//!    *before* issuing the operation that will be acknowledged.
//! 2. Any number of callers [`wait`](Acknowledgement::wait) on it. Each
//!    [`AckWait`] registers its waker on first poll.
//! 3. The host calls [`resolve`](Acknowledgement::resolve) from its
//!    notification. All registered waiters are woken; later waits complete
//!    immediately.
//!
//! Dropping an [`AckWait`] before resolution deregisters its waker. The
//! acknowledged operation itself is unaffected: cancellation only stops the
//! caller from being blocked.
//!
//! Everything here is single-threaded (`Rc` + `RefCell`), matching the UI
//! thread model of the hosts this crate targets.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;
use core::pin::Pin;
use core::task::{Context, Poll, Waker};

#[derive(Default)]
struct AckState {
    resolved: bool,
    waiters: Vec<Option<Waker>>,
}

/// A one-shot, multi-waiter acknowledgment resolved by the host.
///
/// Cloning is cheap and every clone refers to the same acknowledgment.
#[derive(Clone, Default)]
pub struct Acknowledgement {
    state: Rc<RefCell<AckState>>,
}

impl fmt::Debug for Acknowledgement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("Acknowledgement")
            .field("resolved", &state.resolved)
            .field("waiters", &state.waiters.iter().flatten().count())
            .finish()
    }
}

impl Acknowledgement {
    /// Creates an unresolved acknowledgment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an acknowledgment that is already resolved.
    #[must_use]
    pub fn resolved() -> Self {
        let ack = Self::new();
        ack.resolve();
        ack
    }

    /// Marks the acknowledgment as received and wakes every waiter.
    ///
    /// Resolving twice is harmless.
    pub fn resolve(&self) {
        let wakers: Vec<Waker> = {
            let mut state = self.state.borrow_mut();
            if state.resolved {
                return;
            }
            state.resolved = true;
            state.waiters.drain(..).flatten().collect()
        };
        // Wake outside the borrow: a waker may poll synchronously.
        for waker in wakers {
            waker.wake();
        }
    }

    /// Returns whether the host has acknowledged.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.state.borrow().resolved
    }

    /// Returns a future that completes once the acknowledgment is resolved.
    #[must_use]
    pub fn wait(&self) -> AckWait {
        AckWait {
            state: Rc::clone(&self.state),
            slot: None,
        }
    }

    /// Number of currently registered waiters.
    #[must_use]
    pub fn waiter_count(&self) -> usize {
        self.state.borrow().waiters.iter().flatten().count()
    }

    /// Returns `true` if both handles refer to the same acknowledgment.
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }
}

/// Future returned by [`Acknowledgement::wait`].
///
/// Dropping it before completion deregisters the waiter.
#[must_use = "futures do nothing unless polled"]
pub struct AckWait {
    state: Rc<RefCell<AckState>>,
    slot: Option<usize>,
}

impl fmt::Debug for AckWait {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AckWait")
            .field("slot", &self.slot)
            .finish_non_exhaustive()
    }
}

impl Future for AckWait {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let this = self.get_mut();
        let mut state = this.state.borrow_mut();
        if state.resolved {
            this.slot = None;
            return Poll::Ready(());
        }
        match this.slot {
            Some(idx) => {
                let entry = &mut state.waiters[idx];
                if !entry.as_ref().is_some_and(|w| w.will_wake(cx.waker())) {
                    *entry = Some(cx.waker().clone());
                }
            }
            None => {
                let waker = Some(cx.waker().clone());
                let idx = if let Some(free) = state.waiters.iter().position(Option::is_none) {
                    state.waiters[free] = waker;
                    free
                } else {
                    state.waiters.push(waker);
                    state.waiters.len() - 1
                };
                this.slot = Some(idx);
            }
        }
        Poll::Pending
    }
}

impl Drop for AckWait {
    fn drop(&mut self) {
        let Some(idx) = self.slot.take() else {
            return;
        };
        if let Ok(mut state) = self.state.try_borrow_mut() {
            if !state.resolved && idx < state.waiters.len() {
                state.waiters[idx] = None;
            }
        }
    }
}
