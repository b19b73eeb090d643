use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Status code a reply must carry to count as successful.
pub const SUCCESS_STATUS_CODE: u16 = 200;

/// Wire envelope applied to every outbound invocation payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InvocationEnvelope<T> {
    pub body: T,
}

/// Decoded reply carried inside a synchronous invocation result.
///
/// The invoked function reports its own outcome through `statusCode` and, on
/// failure, a human-readable `message`. Both fields are conventions, not a
/// schema, so everything beyond `statusCode` is optional.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InvocationReply {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl InvocationReply {
    pub fn is_success(&self) -> bool {
        self.status_code == SUCCESS_STATUS_CODE
    }

    /// Failure message for operator logs; replies that omit `message` still
    /// produce a stable line.
    pub fn failure_message(&self) -> &str {
        self.message.as_deref().unwrap_or("(no message in reply)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContractError {
    Encode(String),
    Decode(String),
    MissingBody,
    MalformedReply(String),
}

impl std::fmt::Display for ContractError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Encode(detail) => write!(f, "failed to encode invocation payload: {detail}"),
            Self::Decode(detail) => write!(f, "failed to decode invocation response: {detail}"),
            Self::MissingBody => f.write_str("invocation response has no body field"),
            Self::MalformedReply(detail) => {
                write!(f, "invocation reply is not the expected structure: {detail}")
            }
        }
    }
}

impl std::error::Error for ContractError {}

/// Wraps `payload` in the `{"body": ...}` envelope and serializes it to the
/// byte form the invocation service accepts.
pub fn encode_envelope(payload: &Value) -> Result<Vec<u8>, ContractError> {
    serde_json::to_vec(&InvocationEnvelope { body: payload })
        .map_err(|error| ContractError::Encode(error.to_string()))
}

/// Parses a synchronous invocation response and extracts the logical result.
///
/// The response bytes must decode as a JSON object carrying a `body` field;
/// the `body` value is the result the caller cares about.
pub fn decode_invocation_response(bytes: &[u8]) -> Result<Value, ContractError> {
    let decoded: Value =
        serde_json::from_slice(bytes).map_err(|error| ContractError::Decode(error.to_string()))?;
    match decoded {
        Value::Object(mut fields) => fields.remove("body").ok_or(ContractError::MissingBody),
        other => Err(ContractError::Decode(format!(
            "expected a JSON object, got {}",
            json_kind(&other)
        ))),
    }
}

/// Interprets an invocation result as an [`InvocationReply`].
///
/// Functions fronted by an HTTP gateway return their reply as a JSON-encoded
/// string body; direct invocations return an object. Both shapes are accepted.
pub fn decode_reply(result: &Value) -> Result<InvocationReply, ContractError> {
    let reply_value: Value = match result {
        Value::String(text) => serde_json::from_str(text)
            .map_err(|error| ContractError::MalformedReply(error.to_string()))?,
        Value::Object(_) => result.clone(),
        other => {
            return Err(ContractError::MalformedReply(format!(
                "expected an object or JSON string, got {}",
                json_kind(other)
            )))
        }
    };

    serde_json::from_value(reply_value)
        .map_err(|error| ContractError::MalformedReply(error.to_string()))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
