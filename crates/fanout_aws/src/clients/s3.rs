use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use serde_json::Value;

use crate::adapters::object_store::{ObjectStore, StoreError};

/// Client for whole-object JSON access against one bucket.
#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3ObjectStore {
    pub fn new(client: aws_sdk_s3::Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    /// Builds the SDK client from the ambient AWS environment and binds it to
    /// `bucket`.
    pub async fn from_env(bucket: impl Into<String>) -> Self {
        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self::new(aws_sdk_s3::Client::new(&aws_config), bucket)
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(prefix)
            .delimiter("/")
            .into_paginator()
            .send();

        let mut keys = Vec::new();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|error| {
                StoreError::Transport(format!("failed to list objects: {error}"))
            })?;
            for object in page.contents() {
                if let Some(key) = object.key() {
                    keys.push(key.to_string());
                }
            }
        }

        Ok(keys)
    }

    async fn get_json(&self, key: &str) -> Result<Value, StoreError> {
        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|error| StoreError::Transport(format!("failed to get object: {error}")))?;

        let bytes = response
            .body
            .collect()
            .await
            .map_err(|error| {
                StoreError::Transport(format!("failed to read object body: {error}"))
            })?
            .into_bytes();

        serde_json::from_slice(&bytes).map_err(|error| StoreError::Decode(error.to_string()))
    }

    async fn put_json(&self, key: &str, value: &Value) -> Result<(), StoreError> {
        let body = serde_json::to_vec(value).map_err(|error| StoreError::Encode(error.to_string()))?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .send()
            .await
            .map(|_| ())
            .map_err(|error| StoreError::Transport(format!("failed to put object: {error}")))
    }
}
