//! Errors reported by [`RendezvousQueue`](crate::RendezvousQueue) operations.

use std::fmt;

/// Returned by [`put_nowait`](crate::RendezvousQueue::put_nowait) when no
/// consumer is waiting.
///
/// The rejected item is handed back, it is never buffered.
#[derive(thiserror::Error, Clone, PartialEq, Eq)]
#[error("no consumer is waiting on the rendezvous queue")]
pub struct NoConsumerAvailable<T> {
    item: T,
}

impl<T> NoConsumerAvailable<T> {
    pub(crate) const fn new(item: T) -> Self {
        NoConsumerAvailable { item }
    }

    pub fn into_item(self) -> T {
        self.item
    }
}

impl<T> fmt::Debug for NoConsumerAvailable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NoConsumerAvailable")
            .field("item", &format_args!("<...>"))
            .finish()
    }
}

/// Returned by [`get_nowait`](crate::RendezvousQueue::get_nowait) when no
/// producer is waiting.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("no producer is waiting on the rendezvous queue")]
pub struct NoProducerAvailable;

/// The wait was withdrawn before any match happened.
///
/// A cancelled put carries its item back to the caller. A cancelled get uses
/// the default `T = ()` since nothing was consumed.
#[derive(thiserror::Error, Clone, PartialEq, Eq)]
#[error("rendezvous operation was cancelled before a match")]
pub struct Cancelled<T = ()> {
    item: T,
}

impl<T> Cancelled<T> {
    pub(crate) const fn new(item: T) -> Self {
        Cancelled { item }
    }

    pub fn into_item(self) -> T {
        self.item
    }
}

impl Cancelled {
    pub(crate) const fn consumer() -> Self {
        Cancelled { item: () }
    }
}

impl Default for Cancelled {
    fn default() -> Self {
        Cancelled::consumer()
    }
}

impl<T> fmt::Debug for Cancelled<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cancelled")
            .field("item", &format_args!("<...>"))
            .finish()
    }
}

/// [`task_done`](crate::RendezvousQueue::task_done) was called more times
/// than items were transferred.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("task_done() called more times than items were transferred")]
pub struct TaskDoneError(());

impl TaskDoneError {
    pub(crate) const fn new() -> Self {
        TaskDoneError(())
    }
}
