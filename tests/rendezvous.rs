use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, Wake, Waker};

use rendezvous_queue::{NoProducerAvailable, RendezvousQueue, TaskDoneError};

mod support;

use support::{poll_once, Flag};

#[test]
fn put_nowait_without_consumer_hands_item_back() {
    let queue = RendezvousQueue::<Option<u8>>::new();

    let err = queue.put_nowait(None).unwrap_err();
    assert_eq!(err.into_item(), None);
    assert_eq!(queue.waiting_consumers(), 0);
    assert_eq!(queue.waiting_producers(), 0);
}

#[test]
fn get_nowait_without_producer() {
    let queue = RendezvousQueue::<u8>::new();
    assert_eq!(queue.get_nowait(), Err(NoProducerAvailable));
}

#[test]
fn queued_puts_are_taken_in_order() {
    let queue = RendezvousQueue::new();
    let mut puts = vec![queue.put(1), queue.put(2), queue.put(3)];
    for put in &mut puts {
        assert!(poll_once(put).is_pending());
    }
    assert_eq!(queue.waiting_producers(), 3);

    for expected in 1..=3 {
        let mut get = queue.get();
        assert_eq!(poll_once(&mut get), Poll::Ready(expected));
    }

    for put in &mut puts {
        assert_eq!(poll_once(put), Poll::Ready(()));
    }
    assert_eq!(queue.waiting_producers(), 0);
}

#[test]
fn put_nowait_serves_longest_waiting_get() {
    let queue = RendezvousQueue::new();
    let mut gets = vec![queue.get(), queue.get(), queue.get()];
    for get in &mut gets {
        assert!(poll_once(get).is_pending());
    }

    queue.put_nowait("a").unwrap();
    assert_eq!(queue.waiting_consumers(), 2);
    queue.put_nowait("b").unwrap();
    queue.put_nowait("c").unwrap();
    assert_eq!(queue.waiting_consumers(), 0);
    assert!(queue.put_nowait("d").is_err());

    let received: Vec<_> = gets
        .iter_mut()
        .map(|get| match poll_once(get) {
            Poll::Ready(item) => item,
            Poll::Pending => panic!("get was not served"),
        })
        .collect();
    assert_eq!(received, ["a", "b", "c"]);
}

#[test]
fn get_completes_one_step_before_put_acknowledges() {
    let queue = RendezvousQueue::new();
    let (producer, waker) = Flag::waker();
    let mut cx = Context::from_waker(&waker);

    let mut put = queue.put(4);
    assert!(Pin::new(&mut put).poll(&mut cx).is_pending());
    assert!(!producer.is_woken());

    let mut get = queue.get();
    assert_eq!(poll_once(&mut get), Poll::Ready(4));
    assert!(producer.is_woken());
    assert_eq!(queue.waiting_producers(), 0);

    assert_eq!(Pin::new(&mut put).poll(&mut cx), Poll::Ready(()));
}

#[test]
fn put_nowait_wakes_the_parked_get() {
    let queue = RendezvousQueue::new();
    let (consumer, waker) = Flag::waker();
    let mut cx = Context::from_waker(&waker);

    let mut get = queue.get();
    assert!(Pin::new(&mut get).poll(&mut cx).is_pending());
    queue.put_nowait(11).unwrap();

    assert!(consumer.is_woken());
    assert_eq!(Pin::new(&mut get).poll(&mut cx), Poll::Ready(11));
}

#[test]
fn only_one_side_is_ever_pending() {
    let queue = RendezvousQueue::new();

    let mut get = queue.get();
    assert!(poll_once(&mut get).is_pending());

    let mut put = queue.put(1);
    assert_eq!(poll_once(&mut put), Poll::Ready(()));
    assert_eq!(queue.waiting_consumers(), 0);
    assert_eq!(queue.waiting_producers(), 0);
    assert_eq!(poll_once(&mut get), Poll::Ready(1));

    let mut put = queue.put(2);
    assert!(poll_once(&mut put).is_pending());
    assert!(queue.put_nowait(3).is_err());
    assert_eq!(queue.get_nowait(), Ok(2));
    assert_eq!(queue.get_nowait(), Err(NoProducerAvailable));
}

#[test]
fn reports_zero_capacity() {
    let queue = RendezvousQueue::new();
    let mut put = queue.put(());
    assert!(poll_once(&mut put).is_pending());

    assert_eq!(queue.len(), 0);
    assert_eq!(queue.capacity(), 0);
    assert!(queue.is_empty());
    assert!(!queue.is_full());
}

#[test]
fn join_waits_for_task_done() {
    let queue = RendezvousQueue::new();
    let (joiner, waker) = Flag::waker();
    let mut cx = Context::from_waker(&waker);

    assert_eq!(poll_once(&mut queue.join()), Poll::Ready(()));

    let mut get = queue.get();
    assert!(poll_once(&mut get).is_pending());
    queue.put_nowait(1).unwrap();
    assert_eq!(queue.unfinished_tasks(), 1);

    let mut put = queue.put(2);
    assert!(poll_once(&mut put).is_pending());
    assert_eq!(queue.get_nowait(), Ok(2));
    assert_eq!(queue.unfinished_tasks(), 2);

    let mut join = queue.join();
    assert!(Pin::new(&mut join).poll(&mut cx).is_pending());

    queue.task_done().unwrap();
    assert!(!joiner.is_woken());
    queue.task_done().unwrap();
    assert!(joiner.is_woken());
    assert_eq!(Pin::new(&mut join).poll(&mut cx), Poll::Ready(()));

    let err: TaskDoneError = queue.task_done().unwrap_err();
    assert_eq!(
        err.to_string(),
        "task_done() called more times than items were transferred"
    );
}

thread_local! {
    static SHARED: RendezvousQueue<u8> = RendezvousQueue::new();
}

/// Waker that inspects the thread's queue when its last clone goes away.
struct InspectOnDrop;

impl Wake for InspectOnDrop {
    fn wake(self: Arc<Self>) {}
}

impl Drop for InspectOnDrop {
    fn drop(&mut self) {
        SHARED.with(|queue| assert_eq!(queue.waiting_consumers(), 1));
    }
}

#[test]
fn replaced_waker_is_dropped_outside_queue_state() {
    SHARED.with(|queue| {
        let mut get = queue.get();
        let first = Waker::from(Arc::new(InspectOnDrop));
        assert!(Pin::new(&mut get)
            .poll(&mut Context::from_waker(&first))
            .is_pending());
        drop(first);

        // Registers a different waker, releasing the last `InspectOnDrop`.
        assert!(poll_once(&mut get).is_pending());

        queue.put_nowait(1).unwrap();
        assert_eq!(poll_once(&mut get), Poll::Ready(1));
    });
}
