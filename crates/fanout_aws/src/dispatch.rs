//! Bounded-concurrency fan-out over synchronous invocations.
//!
//! The dispatcher submits one invocation task per payload, keeps at most
//! `max_concurrency` of them in flight, and drains completions in whatever
//! order tasks finish. Individual failures are classified and logged; they
//! never cancel sibling tasks and the batch itself never fails.

use fanout_core::contract::{decode_reply, ContractError, InvocationReply};
use fanout_core::logging::log_error;
use futures::stream::{self, StreamExt};
use serde_json::{json, Value};

use crate::adapters::invoke::{InvokeError, SyncInvoker};

const COMPONENT: &str = "batch_dispatcher";

pub const DEFAULT_MAX_CONCURRENCY: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchConfig {
    /// Upper bound on invocations in flight at once.
    pub max_concurrency: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }
}

/// What became of one submitted payload.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemOutcome {
    /// The function ran and reported a success status.
    Succeeded(InvocationReply),
    /// The function ran but reported a non-success status.
    FailedStatus { status_code: u16, message: String },
    /// The invocation produced no result at all.
    Incomplete(InvokeError),
    /// A result arrived but was not the expected reply structure.
    Malformed(ContractError),
}

impl ItemOutcome {
    pub fn is_anomaly(&self) -> bool {
        !matches!(self, Self::Succeeded(_))
    }
}

/// One completed task: the payload's submission position plus its outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemReport {
    pub index: usize,
    pub outcome: ItemOutcome,
}

/// Per-item outcomes in completion order. Exactly one report per payload.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BatchReport {
    pub items: Vec<ItemReport>,
}

impl BatchReport {
    pub fn anomalies(&self) -> impl Iterator<Item = &ItemReport> {
        self.items.iter().filter(|item| item.outcome.is_anomaly())
    }

    pub fn is_clean(&self) -> bool {
        self.anomalies().next().is_none()
    }
}

/// Fans a payload sequence out to concurrent synchronous invocations.
pub struct BatchDispatcher<I: SyncInvoker> {
    invoker: I,
    config: BatchConfig,
}

impl<I: SyncInvoker> BatchDispatcher<I> {
    pub fn new(invoker: I, config: BatchConfig) -> Self {
        Self { invoker, config }
    }

    pub fn invoker(&self) -> &I {
        &self.invoker
    }

    /// Invokes every payload and waits for all of them to resolve.
    ///
    /// Each anomaly is logged as it completes and carried in the returned
    /// report so callers can react programmatically instead of scraping logs.
    pub async fn invoke_await_batched(&self, payloads: &[Value]) -> BatchReport {
        // A zero-slot buffer would never poll any task.
        let in_flight_limit = self.config.max_concurrency.min(payloads.len()).max(1);

        let tasks = payloads.iter().enumerate().map(|(index, payload)| async move {
            (index, self.invoker.invoke(payload).await)
        });

        let mut completions = stream::iter(tasks).buffer_unordered(in_flight_limit);
        let mut items = Vec::with_capacity(payloads.len());
        while let Some((index, result)) = completions.next().await {
            let outcome = classify_completion(result);
            log_anomaly(index, &outcome);
            items.push(ItemReport { index, outcome });
        }

        BatchReport { items }
    }
}

fn classify_completion(result: Result<Value, InvokeError>) -> ItemOutcome {
    let value = match result {
        Ok(value) => value,
        Err(error) => return ItemOutcome::Incomplete(error),
    };

    match decode_reply(&value) {
        Ok(reply) if reply.is_success() => ItemOutcome::Succeeded(reply),
        Ok(reply) => ItemOutcome::FailedStatus {
            status_code: reply.status_code,
            message: reply.failure_message().to_string(),
        },
        Err(error) => ItemOutcome::Malformed(error),
    }
}

fn log_anomaly(index: usize, outcome: &ItemOutcome) {
    match outcome {
        ItemOutcome::Succeeded(_) => {}
        ItemOutcome::Incomplete(error) => log_error(
            COMPONENT,
            "invocation_incomplete",
            json!({
                "index": index,
                "detail": "invocation returned no result, did not complete",
                "error": error.to_string(),
            }),
        ),
        ItemOutcome::FailedStatus {
            status_code,
            message,
        } => log_error(
            COMPONENT,
            "invocation_failed",
            json!({
                "index": index,
                "status_code": status_code,
                "message": message,
            }),
        ),
        ItemOutcome::Malformed(error) => log_error(
            COMPONENT,
            "invocation_reply_malformed",
            json!({
                "index": index,
                "error": error.to_string(),
            }),
        ),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;

    /// Fake invoker whose behavior is scripted by a `behavior` field in each
    /// payload. Tracks call and in-flight counts for the batch invariants.
    #[derive(Default)]
    struct ScriptedInvoker {
        calls: AtomicUsize,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    #[async_trait]
    impl SyncInvoker for ScriptedInvoker {
        async fn invoke(&self, payload: &Value) -> Result<Value, InvokeError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(5)).await;
            self.calls.fetch_add(1, Ordering::SeqCst);

            let result = match payload.get("behavior").and_then(Value::as_str) {
                Some("fail") => {
                    let message = payload
                        .get("message")
                        .and_then(Value::as_str)
                        .unwrap_or("scripted failure");
                    Ok(json!({"statusCode": 500, "message": message}))
                }
                Some("vanish") => Err(InvokeError::Transport("connection reset".to_string())),
                Some("garbage") => Ok(json!(true)),
                _ => Ok(json!({"statusCode": 200, "body": payload.clone()})),
            };

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            result
        }
    }

    fn dispatcher(max_concurrency: usize) -> BatchDispatcher<ScriptedInvoker> {
        BatchDispatcher::new(ScriptedInvoker::default(), BatchConfig { max_concurrency })
    }

    fn ok_payloads(count: usize) -> Vec<Value> {
        (0..count).map(|run| json!({"run": run})).collect()
    }

    #[tokio::test]
    async fn every_payload_yields_exactly_one_report() {
        let dispatcher = dispatcher(4);
        let payloads = vec![
            json!({"run": 0}),
            json!({"behavior": "fail"}),
            json!({"behavior": "vanish"}),
            json!({"behavior": "garbage"}),
            json!({"run": 4}),
        ];

        let report = dispatcher.invoke_await_batched(&payloads).await;

        assert_eq!(report.items.len(), payloads.len());
        let mut indexes: Vec<usize> = report.items.iter().map(|item| item.index).collect();
        indexes.sort_unstable();
        assert_eq!(indexes, vec![0, 1, 2, 3, 4]);
        assert_eq!(
            dispatcher.invoker().calls.load(Ordering::SeqCst),
            payloads.len()
        );
    }

    #[tokio::test]
    async fn all_success_batch_is_clean() {
        let dispatcher = dispatcher(8);
        let report = dispatcher.invoke_await_batched(&ok_payloads(3)).await;

        assert!(report.is_clean());
        assert_eq!(report.items.len(), 3);
        for item in &report.items {
            assert!(matches!(item.outcome, ItemOutcome::Succeeded(_)));
        }
    }

    #[tokio::test]
    async fn failed_status_carries_message_verbatim() {
        let dispatcher = dispatcher(8);
        let payloads = vec![
            json!({"run": 0}),
            json!({"behavior": "fail", "message": "quota exceeded"}),
        ];

        let report = dispatcher.invoke_await_batched(&payloads).await;

        let anomalies: Vec<_> = report.anomalies().collect();
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].index, 1);
        assert_eq!(
            anomalies[0].outcome,
            ItemOutcome::FailedStatus {
                status_code: 500,
                message: "quota exceeded".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn missing_result_does_not_stop_siblings() {
        let dispatcher = dispatcher(2);
        let payloads = vec![
            json!({"run": 0}),
            json!({"behavior": "vanish"}),
            json!({"run": 2}),
            json!({"run": 3}),
        ];

        let report = dispatcher.invoke_await_batched(&payloads).await;

        assert_eq!(report.items.len(), 4);
        assert_eq!(dispatcher.invoker().calls.load(Ordering::SeqCst), 4);
        let incomplete: Vec<_> = report
            .items
            .iter()
            .filter(|item| matches!(item.outcome, ItemOutcome::Incomplete(_)))
            .collect();
        assert_eq!(incomplete.len(), 1);
        assert_eq!(incomplete[0].index, 1);
        let successes = report
            .items
            .iter()
            .filter(|item| matches!(item.outcome, ItemOutcome::Succeeded(_)))
            .count();
        assert_eq!(successes, 3);
    }

    #[tokio::test]
    async fn malformed_reply_is_reported_not_fatal() {
        let dispatcher = dispatcher(8);
        let payloads = vec![json!({"behavior": "garbage"}), json!({"run": 1})];

        let report = dispatcher.invoke_await_batched(&payloads).await;

        assert_eq!(report.items.len(), 2);
        let malformed = report
            .items
            .iter()
            .find(|item| item.index == 0)
            .expect("garbage item should be reported");
        assert!(matches!(malformed.outcome, ItemOutcome::Malformed(_)));
    }

    #[tokio::test]
    async fn in_flight_never_exceeds_configured_bound() {
        let dispatcher = dispatcher(3);
        let report = dispatcher.invoke_await_batched(&ok_payloads(12)).await;

        assert_eq!(report.items.len(), 12);
        assert!(dispatcher.invoker().max_in_flight.load(Ordering::SeqCst) <= 3);
    }

    #[tokio::test]
    async fn empty_batch_completes_without_invocations() {
        let dispatcher = dispatcher(4);
        let report = dispatcher.invoke_await_batched(&[]).await;

        assert!(report.items.is_empty());
        assert!(report.is_clean());
        assert_eq!(dispatcher.invoker().calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn default_config_bounds_at_two_hundred() {
        assert_eq!(BatchConfig::default().max_concurrency, 200);
    }
}
