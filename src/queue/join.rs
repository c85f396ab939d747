use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use super::RendezvousQueue;

/// Future returned by [`RendezvousQueue::join`].
#[must_use = "futures do nothing unless polled"]
pub struct Join<'a, T> {
    queue: &'a RendezvousQueue<T>,
}

impl<'a, T> Join<'a, T> {
    pub(super) fn new(queue: &'a RendezvousQueue<T>) -> Self {
        Join { queue }
    }
}

impl<T> Future for Join<'_, T> {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        self.queue.poll_join(cx.waker())
    }
}
