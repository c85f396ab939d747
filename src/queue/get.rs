use std::future::Future;
use std::mem;
use std::pin::Pin;
use std::task::{Context, Poll};

use super::{RendezvousQueue, Ticket};
use crate::error::Cancelled;
use crate::trace;
use crate::waiter::{Cancel, WaiterId};

/// Future returned by [`RendezvousQueue::get`].
///
/// # Cancellation
///
/// Withdraw a suspended `Get` with [`Get::cancel`], never by dropping it. A
/// producer may already have delivered to it without it being polled since;
/// `cancel` returns that item, while dropping the future destroys it and
/// only leaves a `warn` log event behind.
///
/// ```
/// use std::future::Future;
/// use std::pin::Pin;
/// use std::task::Context;
/// use noop_waker::noop_waker;
/// use rendezvous_queue::RendezvousQueue;
///
/// let queue = RendezvousQueue::new();
/// let waker = noop_waker();
/// let mut get = queue.get();
/// assert!(Pin::new(&mut get).poll(&mut Context::from_waker(&waker)).is_pending());
///
/// // Delivered, but the owner gave up before polling again.
/// queue.put_nowait("late").unwrap();
/// assert_eq!(get.cancel(), Ok("late"));
/// ```
#[must_use = "futures do nothing unless polled"]
pub struct Get<'a, T> {
    queue: &'a RendezvousQueue<T>,
    state: GetState,
}

#[derive(Clone, Copy)]
enum GetState {
    Idle,
    Waiting(WaiterId),
    Done,
}

impl<'a, T> Get<'a, T> {
    pub(super) fn new(queue: &'a RendezvousQueue<T>) -> Self {
        Get {
            queue,
            state: GetState::Idle,
        }
    }

    /// Ticket of the parked consumer, for [`RendezvousQueue::withdraw`].
    ///
    /// `None` before the first poll and after completion.
    pub fn ticket(&self) -> Option<Ticket> {
        match self.state {
            GetState::Waiting(id) => Some(Ticket::consumer(id)),
            GetState::Idle | GetState::Done => None,
        }
    }

    /// Withdraws the request.
    ///
    /// If a producer already delivered, its item is returned and nothing is
    /// cancelled. This is the only way to stop waiting without risking the
    /// loss of a delivered item.
    ///
    /// # Panics
    ///
    /// Panics if the future already completed.
    pub fn cancel(mut self) -> Result<T, Cancelled> {
        match mem::replace(&mut self.state, GetState::Done) {
            GetState::Idle => Err(Cancelled::consumer()),
            GetState::Waiting(id) => match self.queue.cancel_consumer(id) {
                Cancel::Withdrawn(()) => Err(Cancelled::consumer()),
                Cancel::Resolved(item) => Ok(item),
            },
            GetState::Done => panic!("`Get` cancelled after completion"),
        }
    }
}

impl<T> Future for Get<'_, T> {
    type Output = T;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<T> {
        let this = &mut *self;
        let poll = match this.state {
            GetState::Idle => match this.queue.get_or_park(cx.waker()) {
                Ok(item) => Poll::Ready(item),
                Err(id) => {
                    this.state = GetState::Waiting(id);
                    return Poll::Pending;
                }
            },
            GetState::Waiting(id) => this.queue.poll_consumer(id, cx.waker()),
            GetState::Done => panic!("`Get` polled after completion"),
        };
        if poll.is_ready() {
            this.state = GetState::Done;
        }
        poll
    }
}

impl<T> Drop for Get<'_, T> {
    fn drop(&mut self) {
        if let GetState::Waiting(id) = self.state {
            if let Cancel::Resolved(item) = self.queue.cancel_consumer(id) {
                trace::warn_event!(consumer = %id, "dropped `Get` discards a delivered item");
                drop(item);
            }
        }
    }
}
