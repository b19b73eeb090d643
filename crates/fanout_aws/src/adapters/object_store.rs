use async_trait::async_trait;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    Transport(String),
    Encode(String),
    Decode(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(detail) => write!(f, "object store request failed: {detail}"),
            Self::Encode(detail) => write!(f, "failed to encode object body: {detail}"),
            Self::Decode(detail) => write!(f, "failed to decode object body: {detail}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// Seam for whole-object JSON access against a key-addressed bucket.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Lists object keys under `prefix`, one path segment deep.
    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, StoreError>;

    /// Fetches an object and parses its body as JSON.
    async fn get_json(&self, key: &str) -> Result<Value, StoreError>;

    /// Serializes `value` as JSON and stores it under `key`.
    async fn put_json(&self, key: &str, value: &Value) -> Result<(), StoreError>;
}
