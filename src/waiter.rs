//! Waiter bookkeeping for one side of the rendezvous.
//!
//! Waiters live in an arena keyed by [`WaiterId`], while a separate FIFO of
//! ids holds the ones still waiting for a match. A waiter is *pending* while
//! linked, *resolved* once a match assigned it a value, and *withdrawn* once
//! someone other than its owner cancelled it. Resolved and withdrawn waiters
//! are unlinked but stay registered until the owner observes them.

use std::collections::{HashMap, VecDeque};
use std::task::{Poll, Waker};
use std::{fmt, mem};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct WaiterId(u64);

impl fmt::Display for WaiterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

enum WaiterState<R, P> {
    Pending { waker: Waker, payload: P },
    Resolved(R),
    Withdrawn(P),
}

/// What a cancellation request found.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Cancel<R, P> {
    /// No match happened; the payload goes back to the owner.
    Withdrawn(P),
    /// A match won the race; its value stands.
    Resolved(R),
}

/// A waiter taken off the front of the list by a match.
pub(crate) struct Matched<P> {
    pub(crate) id: WaiterId,
    pub(crate) payload: P,
    pub(crate) waker: Waker,
}

/// FIFO of waiters resolved with `R`, each carrying a `P` while pending.
pub(crate) struct WaiterList<R, P = ()> {
    next_id: u64,
    order: VecDeque<WaiterId>,
    waiters: HashMap<WaiterId, WaiterState<R, P>>,
}

impl<R, P> WaiterList<R, P> {
    pub(crate) fn new() -> Self {
        WaiterList {
            next_id: 0,
            order: VecDeque::new(),
            waiters: HashMap::new(),
        }
    }

    /// Number of linked (pending) waiters.
    pub(crate) fn len(&self) -> usize {
        self.order.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub(crate) fn push(&mut self, waker: Waker, payload: P) -> WaiterId {
        let id = WaiterId(self.next_id);
        self.next_id += 1;
        self.waiters
            .insert(id, WaiterState::Pending { waker, payload });
        self.order.push_back(id);
        id
    }

    /// Resolves the longest-waiting waiter with `value`.
    ///
    /// Hands `value` back when nobody is waiting. The returned waker must be
    /// woken by the caller once it no longer holds the queue state.
    pub(crate) fn resolve_front(&mut self, value: R) -> Result<Matched<P>, R> {
        let Some(id) = self.order.pop_front() else {
            return Err(value);
        };
        let state = self
            .waiters
            .get_mut(&id)
            .unwrap_or_else(|| panic!("linked waiter {id} is not registered"));
        match mem::replace(state, WaiterState::Resolved(value)) {
            WaiterState::Pending { waker, payload } => Ok(Matched { id, payload, waker }),
            WaiterState::Resolved(_) => panic!("waiter {id} resolved twice"),
            WaiterState::Withdrawn(_) => panic!("withdrawn waiter {id} is still linked"),
        }
    }

    /// Takes the resolution of `id`, or refreshes its waker while pending.
    ///
    /// A replaced waker is handed back so the caller can drop it once it no
    /// longer holds the queue state. A withdrawn waiter stays pending until
    /// its owner cancels it.
    pub(crate) fn poll(&mut self, id: WaiterId, waker: &Waker) -> (Poll<R>, Option<Waker>) {
        let state = self
            .waiters
            .get_mut(&id)
            .unwrap_or_else(|| panic!("waiter {id} is not registered"));
        match state {
            WaiterState::Pending {
                waker: registered, ..
            } => {
                let stale = (!registered.will_wake(waker))
                    .then(|| mem::replace(registered, waker.clone()));
                return (Poll::Pending, stale);
            }
            WaiterState::Withdrawn(_) => return (Poll::Pending, None),
            WaiterState::Resolved(_) => {}
        }
        match self.waiters.remove(&id) {
            Some(WaiterState::Resolved(value)) => (Poll::Ready(value), None),
            _ => unreachable!("waiter {id} changed state during poll"),
        }
    }

    /// Attempts the pending -> cancelled transition for `id` on behalf of its
    /// owner.
    ///
    /// Either way the waiter is gone from the list and the arena afterwards.
    pub(crate) fn cancel(&mut self, id: WaiterId) -> Cancel<R, P> {
        match self.waiters.remove(&id) {
            Some(WaiterState::Pending { payload, .. }) => {
                self.unlink(id);
                Cancel::Withdrawn(payload)
            }
            Some(WaiterState::Withdrawn(payload)) => Cancel::Withdrawn(payload),
            Some(WaiterState::Resolved(value)) => Cancel::Resolved(value),
            None => panic!("waiter {id} is not registered"),
        }
    }

    /// Unlinks `id` if it is still pending, keeping its payload for the owner.
    ///
    /// Returns the owner's waker on success. Resolved, withdrawn and unknown
    /// waiters are left alone.
    pub(crate) fn withdraw(&mut self, id: WaiterId) -> Option<Waker> {
        match self.waiters.remove(&id)? {
            WaiterState::Pending { waker, payload } => {
                self.waiters.insert(id, WaiterState::Withdrawn(payload));
                self.unlink(id);
                Some(waker)
            }
            other => {
                self.waiters.insert(id, other);
                None
            }
        }
    }

    fn unlink(&mut self, id: WaiterId) {
        let pos = self
            .order
            .iter()
            .position(|linked| *linked == id)
            .unwrap_or_else(|| panic!("pending waiter {id} is not linked"));
        self.order.remove(pos);
    }
}

impl<R, P> fmt::Debug for WaiterList<R, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WaiterList")
            .field("pending", &self.order.len())
            .field("registered", &self.waiters.len())
            .finish()
    }
}
