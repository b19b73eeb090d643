//! Fault-suppressing call wrappers.
//!
//! Best-effort orchestration code often wants "run this, log if it blows up,
//! keep going". These helpers wrap a fallible operation so that failure is
//! converted to `None` after exactly one operator log record; nothing
//! propagates to the caller. Arguments travel through closure capture, so the
//! wrappers apply to any signature.

use std::fmt::Display;
use std::future::Future;

use serde_json::json;

use crate::logging::log_error;

const COMPONENT: &str = "suppress";

/// Runs `op`, returning its value on success and `None` on failure.
///
/// Failure emits a single error record identifying `context` and carrying the
/// error's display form as the diagnostic.
pub fn suppress<T, E, F>(context: &str, op: F) -> Option<T>
where
    E: Display,
    F: FnOnce() -> Result<T, E>,
{
    suppress_inner(context, None, op())
}

/// Like [`suppress`], with an extra operator-facing message included in the
/// log record when the operation fails.
pub fn suppress_with_message<T, E, F>(context: &str, error_message: &str, op: F) -> Option<T>
where
    E: Display,
    F: FnOnce() -> Result<T, E>,
{
    suppress_inner(context, Some(error_message), op())
}

/// Async form of [`suppress`].
pub async fn suppress_async<T, E, Fut>(context: &str, op: Fut) -> Option<T>
where
    E: Display,
    Fut: Future<Output = Result<T, E>>,
{
    suppress_inner(context, None, op.await)
}

/// Async form of [`suppress_with_message`].
pub async fn suppress_async_with_message<T, E, Fut>(
    context: &str,
    error_message: &str,
    op: Fut,
) -> Option<T>
where
    E: Display,
    Fut: Future<Output = Result<T, E>>,
{
    suppress_inner(context, Some(error_message), op.await)
}

fn suppress_inner<T, E: Display>(
    context: &str,
    error_message: Option<&str>,
    result: Result<T, E>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(error) => {
            log_error(
                COMPONENT,
                "operation_failed",
                json!({
                    "context": context,
                    "message": error_message,
                    "error": error.to_string(),
                }),
            );
            None
        }
    }
}
