use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_lambda::operation::invoke::InvokeOutput;
use aws_sdk_lambda::primitives::Blob;
use aws_sdk_lambda::types::{InvocationType, LogType};
use fanout_core::contract::{decode_invocation_response, encode_envelope};
use serde_json::Value;

use crate::adapters::invoke::{InvokeError, SyncInvoker};

/// Explicit wiring for a [`LambdaInvoker`]; no ambient client state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LambdaInvokerConfig {
    /// Name or ARN of the function every call targets.
    pub function_name: String,
    /// Per-call deadline for synchronous invocations. `None` leaves the call
    /// bounded only by the SDK's own transport timeouts.
    pub timeout: Option<Duration>,
}

impl LambdaInvokerConfig {
    pub fn new(function_name: impl Into<String>) -> Self {
        Self {
            function_name: function_name.into(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Client for one remote function, wrapping the AWS Lambda SDK.
#[derive(Debug, Clone)]
pub struct LambdaInvoker {
    client: aws_sdk_lambda::Client,
    config: LambdaInvokerConfig,
}

impl LambdaInvoker {
    pub fn new(client: aws_sdk_lambda::Client, config: LambdaInvokerConfig) -> Self {
        Self { client, config }
    }

    /// Builds the SDK client from the ambient AWS environment (region,
    /// credentials chain) and wires it to `config`.
    pub async fn from_env(config: LambdaInvokerConfig) -> Self {
        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self::new(aws_sdk_lambda::Client::new(&aws_config), config)
    }

    pub fn function_name(&self) -> &str {
        &self.config.function_name
    }

    /// Invokes the function synchronously and returns the decoded `body` of
    /// its reply.
    pub async fn invoke(&self, payload: &Value) -> Result<Value, InvokeError> {
        let response = self
            .send_invocation(payload, InvocationType::RequestResponse)
            .await?;

        if let Some(function_error) = response.function_error() {
            return Err(InvokeError::Function(function_error.to_string()));
        }

        let response_bytes = response
            .payload()
            .ok_or_else(|| InvokeError::Transport("response carried no payload".to_string()))?;
        decode_invocation_response(response_bytes.as_ref()).map_err(InvokeError::Decode)
    }

    /// Invokes the function asynchronously. Success means the service
    /// accepted the event; the function's own outcome is never observed.
    pub async fn invoke_fire_and_forget(&self, payload: &Value) -> Result<(), InvokeError> {
        self.send_invocation(payload, InvocationType::Event)
            .await
            .map(|_| ())
    }

    async fn send_invocation(
        &self,
        payload: &Value,
        invocation_type: InvocationType,
    ) -> Result<InvokeOutput, InvokeError> {
        let envelope_bytes = encode_envelope(payload).map_err(InvokeError::Encode)?;

        let request = self
            .client
            .invoke()
            .function_name(&self.config.function_name)
            .invocation_type(invocation_type)
            .log_type(LogType::None)
            .payload(Blob::new(envelope_bytes))
            .send();

        let response = match self.config.timeout {
            Some(limit) => tokio::time::timeout(limit, request).await.map_err(|_| {
                InvokeError::DeadlineExceeded {
                    seconds: limit.as_secs(),
                }
            })?,
            None => request.await,
        };

        response.map_err(|error| {
            InvokeError::Transport(format!("failed to invoke function: {error}"))
        })
    }
}

#[async_trait]
impl SyncInvoker for LambdaInvoker {
    async fn invoke(&self, payload: &Value) -> Result<Value, InvokeError> {
        LambdaInvoker::invoke(self, payload).await
    }
}
