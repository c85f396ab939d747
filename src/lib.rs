//! Zero-capacity rendezvous queue for single-threaded async executors.
//!
//! A [`RendezvousQueue`] never stores an item: a put completes only when a get
//! takes the item from it, and the other way around. Waiting operations are
//! matched in arrival order.
//!
//! Cancelling a waiting operation races with a match on the same waiter. The
//! match always wins once it happened: a cancelled put whose item was already
//! taken reports success, and a cancelled get that was already served returns
//! its item.
//!
//! # Examples
//!
//! ### Producer parks until a consumer arrives
//!
//! ```
//! use std::future::Future;
//! use std::pin::Pin;
//! use std::task::{Context, Poll};
//! use noop_waker::noop_waker;
//! use rendezvous_queue::RendezvousQueue;
//!
//! let queue = RendezvousQueue::new();
//! let waker = noop_waker();
//! let mut cx = Context::from_waker(&waker);
//!
//! let mut put = queue.put("hello");
//! assert!(Pin::new(&mut put).poll(&mut cx).is_pending());
//! assert_eq!(queue.waiting_producers(), 1);
//!
//! assert_eq!(queue.get_nowait(), Ok("hello"));
//! assert_eq!(Pin::new(&mut put).poll(&mut cx), Poll::Ready(()));
//! assert!(queue.is_empty());
//! ```
//!
//! ### Withdrawn put gets its item back
//!
//! ```
//! use std::future::Future;
//! use std::pin::Pin;
//! use std::task::Context;
//! use noop_waker::noop_waker;
//! use rendezvous_queue::RendezvousQueue;
//!
//! let queue = RendezvousQueue::new();
//! let waker = noop_waker();
//! let mut cx = Context::from_waker(&waker);
//!
//! let mut put = queue.put(5);
//! assert!(Pin::new(&mut put).poll(&mut cx).is_pending());
//!
//! let cancelled = put.cancel().unwrap_err();
//! assert_eq!(cancelled.into_item(), 5);
//! assert_eq!(queue.put_nowait(6).unwrap_err().into_item(), 6);
//! ```
//!
//! ### Served get keeps its item despite cancellation
//!
//! ```
//! use std::future::Future;
//! use std::pin::Pin;
//! use std::task::Context;
//! use noop_waker::noop_waker;
//! use rendezvous_queue::RendezvousQueue;
//!
//! let queue = RendezvousQueue::new();
//! let waker = noop_waker();
//! let mut cx = Context::from_waker(&waker);
//!
//! let mut get = queue.get();
//! assert!(Pin::new(&mut get).poll(&mut cx).is_pending());
//! queue.put_nowait('x').unwrap();
//!
//! assert_eq!(get.cancel(), Ok('x'));
//! ```
//!
//! ### Not shareable across threads
//!
//! ```compile_fail
//! use rendezvous_queue::RendezvousQueue;
//!
//! fn assert_sync<T: Sync>() {}
//! assert_sync::<RendezvousQueue<u8>>();
//! ```

pub mod error;
mod queue;
mod trace;
mod waiter;

pub use error::{Cancelled, NoConsumerAvailable, NoProducerAvailable, TaskDoneError};
pub use queue::{Get, Join, Put, RendezvousQueue, Ticket};
