//! # sentinel-client
//!
//! The Sentinel message pipeline: per-channel message store, lifecycle
//! state machine (scanning → sent | blocked), poll-based synchronization
//! against the persistence endpoint, TTL expiry, and direct-message
//! resolution.
//!
//! All mutable state is owned by a single pipeline task spawned with
//! [`pipeline::spawn_pipeline`]; callers talk to it through the returned
//! [`pipeline::PipelineHandle`] and listen on the event channel.

pub mod compose;
pub mod config;
pub mod events;
pub mod expiry;
pub mod gateway;
pub mod pipeline;
pub mod store;

mod error;

pub use config::ClientConfig;
pub use error::PipelineError;
pub use pipeline::{spawn_pipeline, PipelineHandle};
