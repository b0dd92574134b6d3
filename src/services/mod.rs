//! Domain operation services
//!
//! Four façades grouping broker operations by domain for external callers.
//! Each holds the one shared [`BrokerClient`](crate::client::BrokerClient)
//! and delegates; no independent state, no independent invariants.

pub mod broker;
pub mod connection;
pub mod queue;
pub mod topic;

pub use broker::BrokerService;
pub use connection::ConnectionService;
pub use queue::QueueService;
pub use topic::TopicService;
