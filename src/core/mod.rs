//! Core scheduling abstractions and capacity accounting.

pub mod error;
pub mod fair_queue;
pub mod priority_class;
pub mod ticket;

pub use error::{AppResult, FairQueueError};
pub use fair_queue::FairQueue;
pub use priority_class::{Action, PriorityClass, PriorityClassHandle};
pub use ticket::ResourceTicket;

pub(crate) use priority_class::PendingRequest;
