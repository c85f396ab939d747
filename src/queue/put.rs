use std::future::Future;
use std::mem;
use std::pin::Pin;
use std::task::{Context, Poll};

use super::{RendezvousQueue, Ticket};
use crate::error::Cancelled;
use crate::trace;
use crate::waiter::{Cancel, WaiterId};

/// Future returned by [`RendezvousQueue::put`].
///
/// Completes once a consumer accepted the item. Nothing happens until the
/// first poll.
#[must_use = "futures do nothing unless polled"]
pub struct Put<'a, T> {
    queue: &'a RendezvousQueue<T>,
    state: PutState<T>,
}

enum PutState<T> {
    Idle(T),
    Waiting(WaiterId),
    Done,
}

impl<T> Unpin for Put<'_, T> {}

impl<'a, T> Put<'a, T> {
    pub(super) fn new(queue: &'a RendezvousQueue<T>, item: T) -> Self {
        Put {
            queue,
            state: PutState::Idle(item),
        }
    }

    /// Ticket of the parked producer, for [`RendezvousQueue::withdraw`].
    ///
    /// `None` before the first poll and after completion.
    pub fn ticket(&self) -> Option<Ticket> {
        match self.state {
            PutState::Waiting(id) => Some(Ticket::producer(id)),
            PutState::Idle(_) | PutState::Done => None,
        }
    }

    /// Withdraws the offer.
    ///
    /// Returns the item inside [`Cancelled`] if no consumer took it yet. If a
    /// consumer already accepted it the transfer stands and `Ok(())` is
    /// returned.
    ///
    /// # Panics
    ///
    /// Panics if the future already completed.
    pub fn cancel(mut self) -> Result<(), Cancelled<T>> {
        match mem::replace(&mut self.state, PutState::Done) {
            PutState::Idle(item) => Err(Cancelled::new(item)),
            PutState::Waiting(id) => match self.queue.cancel_producer(id) {
                Cancel::Withdrawn(item) => Err(Cancelled::new(item)),
                Cancel::Resolved(()) => Ok(()),
            },
            PutState::Done => panic!("`Put` cancelled after completion"),
        }
    }
}

impl<T> Future for Put<'_, T> {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let this = &mut *self;
        match mem::replace(&mut this.state, PutState::Done) {
            PutState::Idle(item) => match this.queue.put_or_park(item, cx.waker()) {
                None => Poll::Ready(()),
                Some(id) => {
                    this.state = PutState::Waiting(id);
                    Poll::Pending
                }
            },
            PutState::Waiting(id) => {
                let poll = this.queue.poll_producer(id, cx.waker());
                if poll.is_pending() {
                    this.state = PutState::Waiting(id);
                }
                poll
            }
            PutState::Done => panic!("`Put` polled after completion"),
        }
    }
}

impl<T> Drop for Put<'_, T> {
    fn drop(&mut self) {
        if let PutState::Waiting(id) = self.state {
            if let Cancel::Withdrawn(_item) = self.queue.cancel_producer(id) {
                trace::debug_event!(producer = %id, "dropped `Put` discards its item");
            }
        }
    }
}
