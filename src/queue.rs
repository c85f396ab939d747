use std::cell::{RefCell, RefMut};
use std::future::{poll_fn, Future};
use std::pin::{pin, Pin};
use std::task::{Poll, Waker};
use std::{fmt, mem};

use crate::error::{Cancelled, NoConsumerAvailable, NoProducerAvailable, TaskDoneError};
use crate::trace;
use crate::waiter::{Cancel, WaiterId, WaiterList};

mod get;
mod join;
mod put;

pub use get::Get;
pub use join::Join;
pub use put::Put;

/// Zero-capacity queue handing every item straight from a producer to a
/// consumer.
///
/// Meant for a single-threaded cooperative executor: the queue is `!Sync`, and
/// every state change happens synchronously inside one call, so matches and
/// cancellations never interleave.
pub struct RendezvousQueue<T> {
    state: RefCell<State<T>>,
}

struct State<T> {
    consumers: WaiterList<T>,
    producers: WaiterList<(), T>,
    unfinished_tasks: usize,
    joiners: Vec<Waker>,
}

impl<T> State<T> {
    fn offer(&mut self, item: T) -> Result<Waker, T> {
        let matched = self.consumers.resolve_front(item)?;
        self.unfinished_tasks += 1;
        trace::debug_event!(consumer = %matched.id, "item handed to waiting consumer");
        Ok(matched.waker)
    }

    fn take(&mut self) -> Option<(T, Waker)> {
        let matched = self.producers.resolve_front(()).ok()?;
        self.unfinished_tasks += 1;
        trace::debug_event!(producer = %matched.id, "item taken from waiting producer");
        Some((matched.payload, matched.waker))
    }
}

impl<T> RendezvousQueue<T> {
    pub fn new() -> Self {
        RendezvousQueue {
            state: RefCell::new(State {
                consumers: WaiterList::new(),
                producers: WaiterList::new(),
                unfinished_tasks: 0,
                joiners: Vec::new(),
            }),
        }
    }

    fn state_mut(&self) -> RefMut<'_, State<T>> {
        self.state.borrow_mut()
    }

    /// Hands `item` to the longest-waiting consumer without suspending.
    pub fn put_nowait(&self, item: T) -> Result<(), NoConsumerAvailable<T>> {
        let consumer = self
            .state_mut()
            .offer(item)
            .map_err(NoConsumerAvailable::new)?;
        consumer.wake();
        Ok(())
    }

    /// Takes the item of the longest-waiting producer without suspending.
    pub fn get_nowait(&self) -> Result<T, NoProducerAvailable> {
        let (item, producer) = self.state_mut().take().ok_or(NoProducerAvailable)?;
        producer.wake();
        Ok(item)
    }

    /// Waits until a consumer accepts `item`.
    ///
    /// Use [`Put::cancel`] to withdraw and get the item back.
    pub fn put(&self, item: T) -> Put<'_, T> {
        Put::new(self, item)
    }

    /// Waits until a producer offers an item.
    ///
    /// Use [`Get::cancel`] to withdraw without losing a delivered item.
    pub fn get(&self) -> Get<'_, T> {
        Get::new(self)
    }

    /// Like [`put`](Self::put), but cancels once `signal` completes.
    ///
    /// If a consumer took the item before the signal was observed, the
    /// cancellation is absorbed and `Ok(())` is returned.
    pub async fn put_until<S>(&self, item: T, signal: S) -> Result<(), Cancelled<T>>
    where
        S: Future,
    {
        let mut put = self.put(item);
        let mut signal = pin!(signal);
        let cancel = poll_fn(|cx| {
            if signal.as_mut().poll(cx).is_ready() {
                return Poll::Ready(true);
            }
            Pin::new(&mut put).poll(cx).map(|()| false)
        })
        .await;
        if cancel {
            put.cancel()
        } else {
            Ok(())
        }
    }

    /// Like [`get`](Self::get), but cancels once `signal` completes.
    ///
    /// If a producer already delivered before the signal was observed, the
    /// item is returned instead of [`Cancelled`].
    pub async fn get_until<S>(&self, signal: S) -> Result<T, Cancelled>
    where
        S: Future,
    {
        let mut get = self.get();
        let mut signal = pin!(signal);
        let item = poll_fn(|cx| {
            if signal.as_mut().poll(cx).is_ready() {
                return Poll::Ready(None);
            }
            Pin::new(&mut get).poll(cx).map(Some)
        })
        .await;
        match item {
            Some(item) => Ok(item),
            None => get.cancel(),
        }
    }

    /// Withdraws the suspended operation identified by `ticket`, on behalf of
    /// whoever owns it.
    ///
    /// Returns `true` if the waiter was still pending. It is unlinked on the
    /// spot, so no later match can reach it, and its owner is woken. The
    /// operation's future then stays pending: its owner observes the
    /// withdrawal through [`Put::cancel`] or [`Get::cancel`], which report
    /// [`Cancelled`] and hand a put's item back.
    ///
    /// Returns `false` if a match already resolved the waiter, or the
    /// operation already finished. The match stands in that case.
    pub fn withdraw(&self, ticket: Ticket) -> bool {
        let owner = {
            let mut state = self.state_mut();
            match ticket.role {
                Role::Producer => state.producers.withdraw(ticket.id),
                Role::Consumer => state.consumers.withdraw(ticket.id),
            }
        };
        let Some(owner) = owner else {
            return false;
        };
        trace::debug_event!(waiter = %ticket.id, role = ?ticket.role, "waiter withdrawn by request");
        owner.wake();
        true
    }

    /// Always `0`, items are never stored.
    pub const fn len(&self) -> usize {
        0
    }

    /// Always `0`.
    pub const fn capacity(&self) -> usize {
        0
    }

    /// Always `true`.
    pub const fn is_empty(&self) -> bool {
        true
    }

    /// Always `false`, a rendezvous queue has no buffer to fill.
    pub const fn is_full(&self) -> bool {
        false
    }

    /// Number of suspended gets waiting for a producer.
    pub fn waiting_consumers(&self) -> usize {
        self.state.borrow().consumers.len()
    }

    /// Number of suspended puts waiting for a consumer.
    pub fn waiting_producers(&self) -> usize {
        self.state.borrow().producers.len()
    }

    /// Number of transferred items not yet acknowledged by
    /// [`task_done`](Self::task_done).
    pub fn unfinished_tasks(&self) -> usize {
        self.state.borrow().unfinished_tasks
    }

    /// Marks one transferred item as processed.
    ///
    /// When the count reaches zero every pending [`join`](Self::join) completes.
    pub fn task_done(&self) -> Result<(), TaskDoneError> {
        let joiners = {
            let mut state = self.state_mut();
            state.unfinished_tasks = state
                .unfinished_tasks
                .checked_sub(1)
                .ok_or(TaskDoneError::new())?;
            if state.unfinished_tasks > 0 {
                return Ok(());
            }
            mem::take(&mut state.joiners)
        };
        joiners.into_iter().for_each(Waker::wake);
        Ok(())
    }

    /// Waits until every transferred item was marked with
    /// [`task_done`](Self::task_done).
    pub fn join(&self) -> Join<'_, T> {
        Join::new(self)
    }

    fn put_or_park(&self, item: T, waker: &Waker) -> Option<WaiterId> {
        let mut state = self.state_mut();
        match state.offer(item) {
            Ok(consumer) => {
                drop(state);
                consumer.wake();
                None
            }
            Err(item) => {
                debug_assert!(state.consumers.is_empty());
                let id = state.producers.push(waker.clone(), item);
                trace::debug_event!(producer = %id, "no consumer waiting, producer parked");
                Some(id)
            }
        }
    }

    fn get_or_park(&self, waker: &Waker) -> Result<T, WaiterId> {
        let mut state = self.state_mut();
        match state.take() {
            Some((item, producer)) => {
                drop(state);
                producer.wake();
                Ok(item)
            }
            None => {
                debug_assert!(state.producers.is_empty());
                let id = state.consumers.push(waker.clone(), ());
                trace::debug_event!(consumer = %id, "no producer waiting, consumer parked");
                Err(id)
            }
        }
    }

    fn poll_producer(&self, id: WaiterId, waker: &Waker) -> Poll<()> {
        // `_stale` is dropped after the state borrow ends
        let (poll, _stale) = self.state_mut().producers.poll(id, waker);
        poll
    }

    fn poll_consumer(&self, id: WaiterId, waker: &Waker) -> Poll<T> {
        let (poll, _stale) = self.state_mut().consumers.poll(id, waker);
        poll
    }

    fn cancel_producer(&self, id: WaiterId) -> Cancel<(), T> {
        let outcome = self.state_mut().producers.cancel(id);
        match &outcome {
            Cancel::Withdrawn(_) => trace::debug_event!(producer = %id, "producer withdrawn"),
            Cancel::Resolved(()) => {
                trace::debug_event!(producer = %id, "cancellation absorbed, item already accepted")
            }
        }
        outcome
    }

    fn cancel_consumer(&self, id: WaiterId) -> Cancel<T, ()> {
        let outcome = self.state_mut().consumers.cancel(id);
        match &outcome {
            Cancel::Withdrawn(()) => trace::debug_event!(consumer = %id, "consumer withdrawn"),
            Cancel::Resolved(_) => {
                trace::debug_event!(consumer = %id, "cancellation absorbed, item already delivered")
            }
        }
        outcome
    }

    fn poll_join(&self, waker: &Waker) -> Poll<()> {
        let mut state = self.state_mut();
        if state.unfinished_tasks == 0 {
            return Poll::Ready(());
        }
        if !state.joiners.iter().any(|joiner| joiner.will_wake(waker)) {
            state.joiners.push(waker.clone());
        }
        Poll::Pending
    }
}

/// Identifies a suspended [`Put`] or [`Get`] for
/// [`RendezvousQueue::withdraw`].
///
/// Only meaningful for the queue that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    role: Role,
    id: WaiterId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Producer,
    Consumer,
}

impl Ticket {
    fn producer(id: WaiterId) -> Self {
        Ticket {
            role: Role::Producer,
            id,
        }
    }

    fn consumer(id: WaiterId) -> Self {
        Ticket {
            role: Role::Consumer,
            id,
        }
    }
}

impl<T> Default for RendezvousQueue<T> {
    fn default() -> Self {
        RendezvousQueue::new()
    }
}

impl<T> fmt::Debug for RendezvousQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("RendezvousQueue")
            .field("consumers", &state.consumers)
            .field("producers", &state.producers)
            .field("unfinished_tasks", &state.unfinished_tasks)
            .finish()
    }
}
