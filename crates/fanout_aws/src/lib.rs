//! AWS-oriented clients and the batch invocation dispatcher.
//!
//! This crate owns SDK integration details (Lambda invocation, S3 object
//! access) and exposes a single runtime module boundary for the envelope,
//! logging, and suppression primitives shared with non-AWS callers.

pub mod adapters;
pub mod clients;
pub mod dispatch;
pub mod runtime;
