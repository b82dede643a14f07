//! Fan-out/join execution coordinator.
//!
//! Dispatches a batch of heterogeneous work units onto a bounded worker pool,
//! tracks per-unit completion under mixed synchronous/asynchronous execution
//! modes, and unblocks a waiting caller exactly once when every unit has
//! signaled completion.

pub mod coordinator;
pub mod listeners;
pub mod timer;

pub use fanjoin_utils_rs::concurrent::CompletionBarrier;
