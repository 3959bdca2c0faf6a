//! # sentinel-api
//!
//! Wire contract and authenticated HTTP client for the Sentinel endpoints:
//! risk scan, message fetch, and direct-message provisioning/listing.
//! The session context (bearer token) is created at authentication and
//! handed to the client explicitly; nothing here reads ambient state.

pub mod client;
pub mod session;
pub mod wire;

mod error;

pub use client::ApiClient;
pub use error::ApiError;
pub use session::SessionContext;

pub use reqwest::StatusCode;
