//! Rendezvous operations spawned as tokio tasks.
//!
//! Each task runs a [`Put`] or [`Get`] against a oneshot cancel signal and
//! publishes the operation's [`Ticket`] while it is parked. Cancelling through
//! the handle withdraws a parked waiter on the spot, so a match attempted
//! after [`OperationHandle::cancel`] returned can no longer reach it. A waiter
//! that a match already resolved keeps its result.

use std::cell::Cell;
use std::future::{poll_fn, Future};
use std::pin::{pin, Pin};
use std::rc::Rc;
use std::task::{Context, Poll};

use rendezvous_queue::{Cancelled, Get, Put, RendezvousQueue, Ticket};
use tokio::sync::oneshot;
use tokio::task::{AbortHandle, JoinError, JoinHandle};

/// Handle of a task spawned by [`spawn_put`].
pub type PutHandle<T> = OperationHandle<T, Result<(), Cancelled<T>>>;

/// Handle of a task spawned by [`spawn_get`].
pub type GetHandle<T> = OperationHandle<T, Result<T, Cancelled>>;

/// Spawns `queue.put(item)` onto the current `LocalSet`.
///
/// # Panics
///
/// Panics outside of a `LocalSet`, like [`tokio::task::spawn_local`].
pub fn spawn_put<T: 'static>(queue: Rc<RendezvousQueue<T>>, item: T) -> PutHandle<T> {
    let (cancel, signal) = cancel_signal();
    let parked = Rc::new(Cell::new(None));
    let task = tokio::task::spawn_local({
        let queue = queue.clone();
        let parked = parked.clone();
        async move {
            let mut put = queue.put(item);
            match run_until(&mut put, signal, &parked, Put::ticket).await {
                Some(()) => Ok(()),
                None => put.cancel(),
            }
        }
    });
    OperationHandle {
        queue,
        parked,
        task,
        cancel: Some(cancel),
    }
}

/// Spawns `queue.get()` onto the current `LocalSet`.
///
/// # Panics
///
/// Panics outside of a `LocalSet`, like [`tokio::task::spawn_local`].
pub fn spawn_get<T: 'static>(queue: Rc<RendezvousQueue<T>>) -> GetHandle<T> {
    let (cancel, signal) = cancel_signal();
    let parked = Rc::new(Cell::new(None));
    let task = tokio::task::spawn_local({
        let queue = queue.clone();
        let parked = parked.clone();
        async move {
            let mut get = queue.get();
            match run_until(&mut get, signal, &parked, Get::ticket).await {
                Some(item) => Ok(item),
                None => get.cancel(),
            }
        }
    });
    OperationHandle {
        queue,
        parked,
        task,
        cancel: Some(cancel),
    }
}

/// Handle to a spawned rendezvous operation.
///
/// Dropping it detaches the task, it does not cancel it.
pub struct OperationHandle<T, O> {
    queue: Rc<RendezvousQueue<T>>,
    parked: Rc<Cell<Option<Ticket>>>,
    task: JoinHandle<O>,
    cancel: Option<oneshot::Sender<()>>,
}

impl<T, O> OperationHandle<T, O> {
    /// Requests cancellation of the operation.
    ///
    /// A parked waiter is withdrawn before this returns, and the task then
    /// reports [`Cancelled`]. If a match already resolved the waiter the
    /// request is absorbed and the task reports the match.
    ///
    /// Returns `false` if the task already finished or cancellation was
    /// requested before.
    pub fn cancel(&mut self) -> bool {
        if self.task.is_finished() {
            return false;
        }
        let Some(cancel) = self.cancel.take() else {
            return false;
        };
        if let Some(ticket) = self.parked.get() {
            self.queue.withdraw(ticket);
        }
        cancel.send(()).is_ok()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Aborts the task, dropping the operation.
    ///
    /// Unlike [`cancel`](Self::cancel) this loses the item of a put that was
    /// not accepted yet, and of a get that was already served.
    pub fn abort(&self) {
        self.task.abort();
    }

    pub fn abort_handle(&self) -> AbortHandle {
        self.task.abort_handle()
    }
}

impl<T, O> Future for OperationHandle<T, O> {
    type Output = Result<O, JoinError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.task).poll(cx)
    }
}

/// Polls `op` until it completes or `signal` fires, keeping `parked` in sync
/// with the operation's ticket.
///
/// Returns `None` when the signal fired first; the caller then cancels `op`.
async fn run_until<F, S>(
    op: &mut F,
    signal: S,
    parked: &Cell<Option<Ticket>>,
    ticket: impl Fn(&F) -> Option<Ticket>,
) -> Option<F::Output>
where
    F: Future + Unpin,
    S: Future,
{
    let mut signal = pin!(signal);
    let output = poll_fn(|cx| {
        if signal.as_mut().poll(cx).is_ready() {
            return Poll::Ready(None);
        }
        let poll = Pin::new(&mut *op).poll(cx);
        parked.set(ticket(&*op));
        poll.map(Some)
    })
    .await;
    parked.set(None);
    output
}

fn cancel_signal() -> (oneshot::Sender<()>, impl Future<Output = ()>) {
    let (tx, rx) = oneshot::channel();
    let signal = async move {
        if rx.await.is_err() {
            // Handle dropped without cancelling
            std::future::pending::<()>().await;
        }
    };
    (tx, signal)
}
