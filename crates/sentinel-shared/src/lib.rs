//! # sentinel-shared
//!
//! Domain model and pure logic shared by every Sentinel crate: message and
//! channel types, the rule-based fallback risk classifier, and the
//! send-time integrity fingerprint.  No I/O lives here.

pub mod classifier;
pub mod constants;
pub mod fingerprint;
pub mod types;
