//! Tokio bindings for [`rendezvous_queue`].
//!
//! The queue is `!Send`, so operations run as local tasks on a
//! [`LocalSet`](tokio::task::LocalSet) and share the queue through an `Rc`.
//!
//! # Examples
//!
//! ```
//! use std::rc::Rc;
//! use rendezvous_queue::RendezvousQueue;
//! use rendezvous_queue_tokio::{spawn_get, spawn_put};
//!
//! let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! let local = tokio::task::LocalSet::new();
//! local.block_on(&rt, async {
//!     let queue = Rc::new(RendezvousQueue::new());
//!     let get = spawn_get(queue.clone());
//!     let put = spawn_put(queue.clone(), 7);
//!
//!     assert_eq!(get.await.unwrap(), Ok(7));
//!     assert_eq!(put.await.unwrap(), Ok(()));
//! });
//! ```
//!
//! A cancelled put hands its item back:
//!
//! ```
//! use std::rc::Rc;
//! use rendezvous_queue::RendezvousQueue;
//! use rendezvous_queue_tokio::spawn_put;
//!
//! let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! let local = tokio::task::LocalSet::new();
//! local.block_on(&rt, async {
//!     let queue = Rc::new(RendezvousQueue::new());
//!     let mut put = spawn_put(queue.clone(), "unsent");
//!     assert!(put.cancel());
//!
//!     let cancelled = put.await.unwrap().unwrap_err();
//!     assert_eq!(cancelled.into_item(), "unsent");
//! });
//! ```

pub mod task;

pub use task::{spawn_get, spawn_put, GetHandle, OperationHandle, PutHandle};
