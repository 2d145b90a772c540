//! # Prometheus Fair Queue
//!
//! A two-dimensional weighted fair queueing scheduler for resource-constrained
//! workloads.
//!
//! This library multiplexes many independent producers of deferred work onto a
//! shared resource with finite capacity. Capacity is allocated proportionally
//! among registered *priority classes* according to configurable share counts,
//! while outstanding work is bounded along two independent dimensions: a
//! request-count dimension and a byte/size dimension.
//!
//! ## Core Problem Solved
//!
//! Shared backends (a disk, a GPU, an inference endpoint) serve requests from
//! many producers with very different demand profiles:
//!
//! - **Proportional service**: a class with 2 shares should receive roughly
//!   twice the service of a class with 1 share over any sufficiently long window
//! - **Two-dimensional cost**: a request consumes both an operation slot and
//!   bandwidth; neither axis alone captures its true cost
//! - **Bounded history**: a class that was idle for a while should compete
//!   immediately on resuming, not wait out debt accumulated long ago
//! - **No work skipping**: the most-owed class is always served next, even when
//!   its head request is too large for the remaining capacity
//!
//! ## Example
//!
//! ```rust
//! use prometheus_fair_queue::config::FairQueueConfig;
//! use prometheus_fair_queue::core::{FairQueue, ResourceTicket};
//!
//! let mut queue = FairQueue::new(FairQueueConfig::with_capacity(128, 1 << 20));
//!
//! let interactive = queue.register_priority_class(10);
//! let batch = queue.register_priority_class(1);
//!
//! queue.queue(
//!     &interactive,
//!     ResourceTicket::new(1, 4096),
//!     Box::new(|| {
//!         // issue the underlying request here
//!         Ok(())
//!     }),
//! );
//!
//! queue.dispatch_requests();
//!
//! // once the underlying request truly completes:
//! queue.notify_requests_finished(ResourceTicket::new(1, 4096), 1);
//! # let _ = batch;
//! ```
//!
//! ## Concurrency Model
//!
//! The scheduler is single-threaded and cooperative: all mutating operations
//! must be invoked serially from one logical thread of control. Invoking an
//! action is a synchronous call; any asynchronous continuation of the
//! underlying work is the action's own concern, and the queue learns of true
//! completion only via [`core::FairQueue::notify_requests_finished`].
//!
//! For complete examples, see `tests/fair_queue_test.rs`.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core scheduling types: tickets, priority classes, and the fair queue.
pub mod core;
/// Configuration models for queues and capacity limits.
pub mod config;
/// Builders to construct fair queues from configuration.
pub mod builders;
/// Shared utilities.
pub mod util;
