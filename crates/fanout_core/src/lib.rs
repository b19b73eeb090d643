//! Shared invocation contract primitives.
//!
//! This crate owns the wire envelope, reply decoding, the structured operator
//! log format, and the fault-suppressing call wrappers. It intentionally
//! excludes AWS SDK concerns; those live in `crates/fanout_aws`.

pub mod contract;
pub mod logging;
pub mod suppress;
