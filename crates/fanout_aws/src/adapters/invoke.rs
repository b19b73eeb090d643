use async_trait::async_trait;
use fanout_core::contract::ContractError;
use serde_json::Value;

/// Why a single invocation produced no usable result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvokeError {
    /// The outbound payload could not be encoded into the wire envelope.
    Encode(ContractError),
    /// The invocation request never completed at the service level.
    Transport(String),
    /// The service ran the function but the function itself errored.
    Function(String),
    /// The response arrived but could not be decoded.
    Decode(ContractError),
    /// The call did not finish within the configured deadline.
    DeadlineExceeded { seconds: u64 },
}

impl std::fmt::Display for InvokeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Encode(error) => write!(f, "{error}"),
            Self::Transport(detail) => write!(f, "invocation transport failed: {detail}"),
            Self::Function(detail) => write!(f, "invoked function reported an error: {detail}"),
            Self::Decode(error) => write!(f, "{error}"),
            Self::DeadlineExceeded { seconds } => {
                write!(f, "invocation deadline exceeded after {seconds}s")
            }
        }
    }
}

impl std::error::Error for InvokeError {}

/// Seam for one synchronous ("request/response") invocation.
///
/// Implementations encode the payload into the wire envelope, wait for the
/// function to finish, and hand back the decoded `body` of its response.
#[async_trait]
pub trait SyncInvoker: Send + Sync {
    async fn invoke(&self, payload: &Value) -> Result<Value, InvokeError>;
}
