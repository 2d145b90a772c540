//! Configuration models for queues and capacity limits.

pub mod queue;

pub use queue::{FairQueueConfig, SchedulerConfig};
